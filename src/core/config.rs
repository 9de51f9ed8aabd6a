use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Corpus languages with a stopword list and a prepared target index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Eng,
    Ger,
    Lat,
    Swe,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Eng => "eng",
            Language::Ger => "ger",
            Language::Lat => "lat",
            Language::Swe => "swe",
        }
    }

    /// English targets are indexed without part-of-speech tags.
    pub fn pos_disabled(&self) -> bool {
        matches!(self, Language::Eng)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Where inference should run. Serialized as `auto`, `cpu` or a CUDA ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceChoice {
    #[default]
    Auto,
    Cpu,
    Cuda(usize),
}

impl FromStr for DeviceChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(DeviceChoice::Auto),
            "cpu" => Ok(DeviceChoice::Cpu),
            other => {
                let ordinal = other.strip_prefix("cuda:").unwrap_or(other);
                ordinal
                    .parse::<usize>()
                    .map(DeviceChoice::Cuda)
                    .map_err(|_| format!("expected `auto`, `cpu` or a CUDA ordinal, got {s:?}"))
            }
        }
    }
}

impl fmt::Display for DeviceChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceChoice::Auto => f.write_str("auto"),
            DeviceChoice::Cpu => f.write_str("cpu"),
            DeviceChoice::Cuda(i) => write!(f, "{i}"),
        }
    }
}

impl Serialize for DeviceChoice {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DeviceChoice {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Resolved parameters of one substitution run. Written verbatim to
/// `config.json` in the output directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub basedir: PathBuf,
    pub lang: Language,
    pub model: String,
    pub strip_accents: bool,
    pub random_targets: bool,
    pub max_samples: usize,
    pub max_window_size: usize,
    pub batch_size: usize,
    pub device: DeviceChoice,
    pub top_k: usize,
    pub seed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stopwords: Option<PathBuf>,
}

impl RunConfig {
    pub fn new(basedir: impl Into<PathBuf>, lang: Language) -> Self {
        Self {
            basedir: basedir.into(),
            lang,
            model: "bert-large-uncased".to_string(),
            strip_accents: false,
            random_targets: false,
            max_samples: 4000,
            max_window_size: 50,
            batch_size: 4000,
            device: DeviceChoice::Auto,
            top_k: 11,
            seed: 42,
            model_dir: None,
            stopwords: None,
        }
    }

    pub fn layout(&self) -> RunLayout {
        RunLayout::from_config(self)
    }
}

/// Filesystem locations derived from a [`RunConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    pub tokenized_dir: PathBuf,
    pub model_dir: PathBuf,
    pub corpus_file: PathBuf,
    pub index_file: PathBuf,
    pub output_dir: PathBuf,
    pub stopwords_file: PathBuf,
}

impl RunLayout {
    pub fn from_config(config: &RunConfig) -> Self {
        let lang_dir = config
            .basedir
            .join(format!("semeval2020_ulscd_{}", config.lang));
        let model_name = model_name(&config.model);
        let suffix = if config.strip_accents {
            "_strip_accents"
        } else {
            ""
        };

        let tokenized_dir = lang_dir.join(format!("{model_name}{suffix}"));
        let model_dir = config.model_dir.clone().unwrap_or_else(|| {
            lang_dir
                .join(format!("mlm_pretraining_{model_name}{suffix}"))
                .join("model")
        });

        let (index_name, output_subdir) = if config.random_targets {
            ("random_indices_in_tokens.json", "random_subs_masked")
        } else if config.lang.pos_disabled() {
            ("target_indices_in_tokens_nopos.json", "subs_masked_nopos")
        } else {
            ("target_indices_in_tokens.json", "subs_masked")
        };

        let stopwords_file = config.stopwords.clone().unwrap_or_else(|| {
            config
                .basedir
                .join("stopwords")
                .join(format!("{}.txt", config.lang))
        });

        Self {
            corpus_file: tokenized_dir.join("all.jsonlist"),
            index_file: tokenized_dir.join(index_name),
            output_dir: tokenized_dir.join(output_subdir),
            tokenized_dir,
            model_dir,
            stopwords_file,
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.output_dir.join("config.json")
    }
}

/// Output file for one target term inside `dir`.
pub fn term_file_in(dir: &Path, term: &str) -> PathBuf {
    dir.join(format!("{term}_substitutes.jsonlist"))
}

/// Short model name used in directory names: `org/bert-base` becomes `bert-base`.
pub fn model_name(model: &str) -> &str {
    model
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_uses_nopos_index() {
        let config = RunConfig::new("/data", Language::Eng);
        let layout = config.layout();
        let tokenized = PathBuf::from("/data/semeval2020_ulscd_eng/bert-large-uncased");
        assert_eq!(layout.tokenized_dir, tokenized);
        assert_eq!(
            layout.index_file,
            tokenized.join("target_indices_in_tokens_nopos.json")
        );
        assert_eq!(layout.output_dir, tokenized.join("subs_masked_nopos"));
        assert_eq!(
            layout.model_dir,
            PathBuf::from("/data/semeval2020_ulscd_eng/mlm_pretraining_bert-large-uncased/model")
        );
    }

    #[test]
    fn random_targets_override_language_choice() {
        let mut config = RunConfig::new("/data", Language::Ger);
        config.random_targets = true;
        config.strip_accents = true;
        config.model = "dbmdz/bert-base-german-cased".into();
        let layout = config.layout();
        let tokenized =
            PathBuf::from("/data/semeval2020_ulscd_ger/bert-base-german-cased_strip_accents");
        assert_eq!(layout.index_file, tokenized.join("random_indices_in_tokens.json"));
        assert_eq!(layout.output_dir, tokenized.join("random_subs_masked"));
    }

    #[test]
    fn tagged_languages_use_pos_index() {
        let layout = RunConfig::new("/data", Language::Swe).layout();
        assert!(layout.index_file.ends_with("target_indices_in_tokens.json"));
        assert!(layout.output_dir.ends_with("subs_masked"));
        assert_eq!(layout.stopwords_file, PathBuf::from("/data/stopwords/swe.txt"));
    }

    #[test]
    fn device_choice_parses() {
        assert_eq!("auto".parse::<DeviceChoice>(), Ok(DeviceChoice::Auto));
        assert_eq!("CPU".parse::<DeviceChoice>(), Ok(DeviceChoice::Cpu));
        assert_eq!("1".parse::<DeviceChoice>(), Ok(DeviceChoice::Cuda(1)));
        assert_eq!("cuda:2".parse::<DeviceChoice>(), Ok(DeviceChoice::Cuda(2)));
        assert!("gpu".parse::<DeviceChoice>().is_err());
    }

    #[test]
    fn config_serializes_device_as_string() -> serde_json::Result<()> {
        let mut config = RunConfig::new("/data", Language::Lat);
        config.device = DeviceChoice::Cuda(0);
        let value = serde_json::to_value(&config)?;
        assert_eq!(value["device"], "0");
        assert_eq!(value["lang"], "lat");
        assert!(value.get("model_dir").is_none());
        let back: RunConfig = serde_json::from_value(value)?;
        assert_eq!(back, config);
        Ok(())
    }
}

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::core::{Language, Result, SubstituteError};

/// Language-specific stopwords excluded from substitute lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl StopwordSet {
    /// Read one word per line; blank lines and `#` comments are ignored.
    pub fn load(path: &Path, language: Language) -> Result<Self> {
        if !path.exists() {
            return Err(SubstituteError::MissingInput(path.to_path_buf()));
        }
        let set = Self::parse(&fs::read_to_string(path)?);
        tracing::info!(language = %language, stopwords = set.len(), "Loaded stopwords");
        Ok(set)
    }

    /// Like [`StopwordSet::load`], but falls back to the built-in list of
    /// `language` when `path` does not exist.
    pub fn load_or_builtin(path: &Path, language: Language) -> Result<Self> {
        if path.exists() {
            return Self::load(path, language);
        }
        let set = Self::builtin(language);
        tracing::info!(
            language = %language,
            stopwords = set.len(),
            missing = %path.display(),
            "Using built-in stopwords"
        );
        Ok(set)
    }

    pub fn builtin(language: Language) -> Self {
        let words = match language {
            Language::Eng => ENGLISH,
            Language::Ger => GERMAN,
            Language::Lat => LATIN,
            Language::Swe => SWEDISH,
        };
        words.iter().copied().collect()
    }

    pub fn parse(content: &str) -> Self {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for StopwordSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            words: iter.into_iter().map(Into::into).collect(),
        }
    }
}

const ENGLISH: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

const GERMAN: &[&str] = &[
    "aber", "alle", "allem", "allen", "aller", "alles", "als", "also", "am", "an", "ander",
    "andere", "anderen", "auch", "auf", "aus", "bei", "bin", "bis", "bist", "da", "damit",
    "dann", "das", "dass", "dein", "deine", "dem", "den", "der", "des", "dich", "die", "dies",
    "diese", "diesem", "diesen", "dieser", "dieses", "dir", "doch", "dort", "du", "durch",
    "ein", "eine", "einem", "einen", "einer", "eines", "er", "es", "euer", "eure", "für",
    "hat", "hatte", "hatten", "hier", "hin", "ich", "ihm", "ihn", "ihr", "ihre", "ihrem",
    "ihren", "ihrer", "im", "in", "indem", "ins", "ist", "jede", "jedem", "jeden", "jeder",
    "jetzt", "kann", "kein", "keine", "man", "mein", "meine", "mich", "mir", "mit", "muss",
    "nach", "nicht", "nichts", "noch", "nun", "nur", "ob", "oder", "ohne", "sehr", "sein",
    "seine", "seinem", "seinen", "seiner", "sich", "sie", "sind", "so", "solche", "soll",
    "sondern", "über", "um", "und", "uns", "unser", "unter", "viel", "vom", "von", "vor",
    "war", "waren", "was", "weil", "welche", "wenn", "wer", "werden", "wie", "wieder", "will",
    "wir", "wird", "wo", "zu", "zum", "zur", "zwar", "zwischen",
];

const LATIN: &[&str] = &[
    "a", "ab", "ac", "ad", "adhuc", "aliquis", "an", "ante", "apud", "at", "atque", "aut",
    "autem", "cum", "cur", "de", "deinde", "dum", "ego", "enim", "ergo", "es", "est", "et",
    "etiam", "etsi", "ex", "fio", "haud", "hic", "iam", "idem", "igitur", "ille", "in",
    "infra", "inter", "interim", "ipse", "is", "ita", "magis", "modo", "mox", "nam", "ne",
    "nec", "necque", "neque", "nisi", "non", "nos", "o", "ob", "per", "possum", "post", "pro",
    "quae", "quam", "quare", "qui", "quia", "quicumque", "quidem", "quilibet", "quis",
    "quisnam", "quisquam", "quisque", "quisquis", "quo", "quoniam", "sed", "si", "sic", "sive",
    "sub", "sui", "sum", "super", "suus", "tam", "tamen", "trans", "tu", "tum", "ubi", "uel",
    "uero", "unus", "ut", "vel", "vero",
];

const SWEDISH: &[&str] = &[
    "alla", "allt", "att", "av", "blev", "bli", "blir", "blivit", "de", "dem", "den", "denna",
    "deras", "dess", "dessa", "det", "detta", "dig", "din", "dina", "ditt", "du", "där", "då",
    "efter", "ej", "eller", "en", "er", "era", "ert", "ett", "från", "för", "ha", "hade", "han",
    "hans", "har", "henne", "hennes", "hon", "honom", "hur", "här", "i", "icke", "ingen", "inom",
    "inte", "jag", "ju", "kan", "kunde", "man", "med", "mellan", "men", "mig", "min", "mina",
    "mitt", "mot", "mycket", "ni", "nu", "när", "någon", "något", "några", "och", "om", "oss",
    "på", "samma", "sedan", "sig", "sin", "sina", "sitta", "själv", "skulle", "som", "så",
    "sådan", "till", "under", "upp", "ut", "utan", "vad", "var", "vara", "varför", "varit",
    "varje", "vars", "vem", "vi", "vid", "vilka", "vilken", "vår", "våra", "vårt", "än", "är",
    "åt", "över",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_comments_and_blanks() {
        let set = StopwordSet::parse("# english\nthe\n\n  and \nof\n");
        assert_eq!(set.len(), 3);
        assert!(set.contains("and"));
        assert!(!set.contains("# english"));
    }

    #[test]
    fn missing_file_falls_back_to_builtin_list() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let set = StopwordSet::load_or_builtin(&dir.path().join("ger.txt"), Language::Ger)?;
        assert_eq!(set, StopwordSet::builtin(Language::Ger));
        assert!(set.contains("und"));
        assert!(!set.contains("the"));
        Ok(())
    }

    #[test]
    fn present_file_wins_over_builtin_list() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("eng.txt");
        fs::write(&path, "cat\n")?;
        let set = StopwordSet::load_or_builtin(&path, Language::Eng)?;
        assert_eq!(set.len(), 1);
        assert!(!set.contains("the"));
        Ok(())
    }

    #[test]
    fn every_language_has_a_builtin_list() {
        for language in [Language::Eng, Language::Ger, Language::Lat, Language::Swe] {
            assert!(!StopwordSet::builtin(language).is_empty(), "{language}");
        }
    }
}

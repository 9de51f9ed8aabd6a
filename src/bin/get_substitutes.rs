use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lexsub::core::{DeviceChoice, Language, RunConfig};
use lexsub::pipelines::substitution::run_pretrained;

/// Mask each occurrence of every target term and save the top-k substitutes
/// predicted by a pretrained BERT model.
#[derive(Parser, Debug)]
#[command(name = "get_substitutes", version)]
struct Args {
    /// Base data directory
    #[arg(long)]
    basedir: PathBuf,

    /// Corpus language
    #[arg(long, value_enum, default_value_t = Language::Eng)]
    lang: Language,

    /// Base model the corpus was tokenized for
    #[arg(long, default_value = "bert-large-uncased")]
    model: String,

    /// Strip accents when tokenizing
    #[arg(long)]
    strip_accents: bool,

    /// Use random targets rather than the curated targets
    #[arg(long)]
    random_targets: bool,

    /// Max samples per target
    #[arg(long, default_value_t = 4000)]
    max_samples: usize,

    /// Max window radius (in word-piece tokens)
    #[arg(long, default_value_t = 50)]
    max_window_size: usize,

    /// Batch size
    #[arg(long, default_value_t = 4000)]
    batch_size: usize,

    /// `auto`, `cpu`, or a CUDA ordinal
    #[arg(long, default_value = "auto")]
    device: DeviceChoice,

    /// Top-k terms to keep
    #[arg(long, default_value_t = 11)]
    top_k: usize,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Pretrained model directory (defaults to the masked-LM pretraining output)
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Stopword file (default `<basedir>/stopwords/<lang>.txt`, then the built-in list)
    #[arg(long)]
    stopwords: Option<PathBuf>,
}

impl From<Args> for RunConfig {
    fn from(args: Args) -> Self {
        RunConfig {
            basedir: args.basedir,
            lang: args.lang,
            model: args.model,
            strip_accents: args.strip_accents,
            random_targets: args.random_targets,
            max_samples: args.max_samples,
            max_window_size: args.max_window_size,
            batch_size: args.batch_size,
            device: args.device,
            top_k: args.top_k,
            seed: args.seed,
            model_dir: args.model_dir,
            stopwords: args.stopwords,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let config = RunConfig::from(Args::parse());
    let output_dir = config.layout().output_dir;

    let summary = run_pretrained(&config).context("computing substitutes")?;

    tracing::info!(
        written = summary.written.len(),
        skipped = summary.skipped.len(),
        output_dir = %output_dir.display(),
        "Done"
    );
    Ok(())
}

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "reviewlens")]
#[command(
    author,
    version,
    about = "Keyword and LLM classification of Korean cosmetics reviews"
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Application config (YAML)
    #[arg(short, long, global = true, env = "REVIEWLENS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Lexicon file, overrides the config
    #[arg(long, global = true)]
    pub lexicon: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify every review with the keyword pipeline
    Classify {
        #[command(flatten)]
        io: IoArgs,

        /// Worker threads (defaults to the number of CPUs)
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Show which rule decided a single review
    Explain {
        /// Review text
        #[arg(short, long)]
        text: String,

        /// Star rating (1-5)
        #[arg(short, long, default_value = "5")]
        rating: i64,

        /// Purchase tag, e.g. 재구매
        #[arg(long)]
        purchase_tag: Option<String>,
    },

    /// Classify, then re-judge ambiguous reviews through the LLM
    Enrich(EnrichArgs),

    /// Inspect lexicons
    Lexicon {
        #[command(subcommand)]
        command: LexiconCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum LexiconCommands {
    /// Print the active lexicon as YAML
    Dump {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a lexicon file
    Check {
        /// Lexicon file
        path: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct EnrichArgs {
    #[command(flatten)]
    pub io: IoArgs,

    /// Checkpoint file for resuming
    #[arg(long, default_value = "reviewlens-checkpoint.json")]
    pub checkpoint: PathBuf,

    /// Token usage log, appended across runs
    #[arg(long, default_value = "reviewlens-usage.json")]
    pub usage_log: PathBuf,

    /// Discard an existing checkpoint
    #[arg(long)]
    pub restart: bool,

    /// Which reviews to send
    #[arg(long, value_enum)]
    pub scope: Option<ScopeArg>,

    /// Maximum number of reviews to send
    #[arg(long)]
    pub max_samples: Option<usize>,

    /// Model name
    #[arg(long, env = "REVIEWLENS_MODEL")]
    pub model: Option<String>,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "REVIEWLENS_BASE_URL")]
    pub base_url: Option<String>,

    /// Concurrent calls per batch
    #[arg(long)]
    pub concurrency: Option<usize>,
}

#[derive(Args, Debug)]
pub struct IoArgs {
    /// Reviews as a JSON array, an export object or JSON lines
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output JSON lines (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write a summary JSON
    #[arg(short, long)]
    pub summary: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeArg {
    Ambiguous,
    All,
}

//! reviewlens
//!
//! Classifies Korean cosmetics reviews with a keyword rule pipeline and
//! optionally re-judges ambiguous ones through an LLM.

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod config;
mod ingest;
mod output;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);
    describe_metrics();

    match &cli.command {
        Commands::Classify { io, workers } => commands::classify(&cli, io, *workers).await,
        Commands::Explain {
            text,
            rating,
            purchase_tag,
        } => commands::explain(&cli, text, *rating, purchase_tag.clone()),
        Commands::Enrich(args) => commands::enrich(&cli, args).await,
        Commands::Lexicon { command } => commands::lexicon(&cli, command),
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("reviewlens=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reviewlens=info"))
    };

    // logs go to stderr so JSON lines on stdout stay clean
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Register metric descriptions; no exporter is installed
fn describe_metrics() {
    metrics::describe_counter!(
        "reviewlens_reviews_classified_total",
        "Reviews classified by the keyword pipeline, by sentiment"
    );
    metrics::describe_counter!(
        "reviewlens_enrichment_calls_total",
        "LLM enrichment calls by outcome"
    );
    metrics::describe_counter!(
        "reviewlens_enrichment_tokens_total",
        "Tokens consumed by successful enrichment calls"
    );
    metrics::describe_histogram!(
        "reviewlens_enrichment_call_duration_seconds",
        metrics::Unit::Seconds,
        "Wall time of one enrichment call including retries"
    );
}

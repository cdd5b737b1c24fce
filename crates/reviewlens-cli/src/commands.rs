//! Subcommand handlers

use crate::cli::{Cli, EnrichArgs, IoArgs, LexiconCommands};
use crate::config::{AppConfig, EnrichOverrides};
use crate::ingest::Ingestor;
use crate::output;
use anyhow::{Context, Result};
use reviewlens_classifiers::{BatchClassifier, BatchSummary, KeywordClassifier, Lexicon};
use reviewlens_core::{AnalyzedReview, Rating, Review, ReviewMeta};
use reviewlens_enrich::{
    select, EnrichmentJob, JobReport, MergeStats, Merger, OpenAiProvider, UsageLog, UsageSummary,
};
use serde::Serialize;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Summary written by `enrich --summary`
#[derive(Debug, Serialize)]
struct EnrichSummary {
    classification: BatchSummary,
    job: JobReport,
    merge: MergeStats,
    usage: UsageSummary,
}

/// Ingest and classify with the keyword pipeline
async fn classify_input(
    config: &AppConfig,
    lexicon: &Lexicon,
    io: &IoArgs,
    workers: Option<usize>,
) -> Result<Vec<AnalyzedReview>> {
    let classifier = Arc::new(KeywordClassifier::with_lexicon(
        lexicon,
        config.classifier.rules.clone(),
    )?);
    let batch = match workers.or(config.workers) {
        Some(workers) => BatchClassifier::with_workers(classifier, workers),
        None => BatchClassifier::new(classifier),
    };

    let reviews = Ingestor::new(&config.brand_aliases).load(&io.input)?;
    Ok(batch.classify_all(reviews).await?)
}

fn log_summary(summary: &BatchSummary) {
    info!(
        total = summary.total,
        pos = summary.sentiment.pos,
        neu = summary.sentiment.neu,
        neg = summary.sentiment.neg,
        average_rating = summary.average_rating,
        rebuy = summary.rebuy_count,
        brands = summary.brands.len(),
        "Classification summary"
    );
}

pub async fn classify(cli: &Cli, io: &IoArgs, workers: Option<usize>) -> Result<()> {
    let config = AppConfig::load(cli)?;
    let lexicon = config.classifier.resolve_lexicon()?;

    let rows = classify_input(&config, &lexicon, io, workers).await?;
    output::write_rows(&rows, io.output.as_deref())?;

    let summary = BatchSummary::from_rows(&rows);
    log_summary(&summary);
    if let Some(path) = &io.summary {
        output::write_json(&summary, path)?;
    }
    Ok(())
}

pub fn explain(cli: &Cli, text: &str, rating: i64, purchase_tag: Option<String>) -> Result<()> {
    let config = AppConfig::load(cli)?;
    let classifier = KeywordClassifier::from_config(&config.classifier)?;

    let review = Review::new(text, Rating::clamped(rating)).with_meta(ReviewMeta {
        purchase_tag,
        ..Default::default()
    });
    let explanation = classifier.explain(&review);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &explanation)?;
    writeln!(out)?;
    Ok(())
}

pub async fn enrich(cli: &Cli, args: &EnrichArgs) -> Result<()> {
    let EnrichArgs {
        io,
        checkpoint,
        usage_log,
        restart,
        scope,
        max_samples,
        model,
        base_url,
        concurrency,
    } = args;

    let mut config = AppConfig::load(cli)?;
    config.apply_enrich_overrides(EnrichOverrides {
        scope: *scope,
        max_samples: *max_samples,
        model: model.clone(),
        base_url: base_url.clone(),
        concurrency: *concurrency,
    });
    let enrichment = config.enrichment.clone();
    let lexicon = config.classifier.resolve_lexicon()?;

    let mut rows = classify_input(&config, &lexicon, io, None).await?;
    let selected = select(&rows, &enrichment.selection);
    info!(
        reviews = rows.len(),
        selected = selected.len(),
        scope = ?enrichment.selection.scope,
        "Selected reviews for enrichment"
    );
    if selected.is_empty() {
        info!("Nothing to enrich, writing keyword results");
        output::write_rows(&rows, io.output.as_deref())?;
        if let Some(path) = &io.summary {
            output::write_json(&BatchSummary::from_rows(&rows), path)?;
        }
        return Ok(());
    }

    let provider = OpenAiProvider::from_env(
        enrichment.provider.base_url.clone(),
        enrichment.provider.model.clone(),
        &enrichment.provider.api_key_env,
    )?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing in-flight calls and saving the checkpoint");
            flag.store(true, Ordering::SeqCst);
        }
    });

    let job = EnrichmentJob::new(Arc::new(provider), enrichment.clone(), checkpoint)
        .with_shutdown(shutdown);
    let report = job.run(&rows, &selected, *restart).await?;

    let mut log = UsageLog::load_or_default(usage_log)
        .with_context(|| format!("failed to read usage log {}", usage_log.display()))?;
    for record in &report.usage {
        log.push(record.clone());
    }
    log.save(usage_log)?;
    let usage = log.summary(&enrichment.pricing);
    info!(
        calls = usage.calls,
        total_tokens = usage.total_tokens,
        estimated_cost_usd = usage.estimated_cost_usd,
        "Token usage to date"
    );

    let merge = Merger::new(&lexicon)?.merge(&mut rows, &report.entries);
    if report.interrupted {
        warn!(
            completed = report.entries.len(),
            selected = report.selected,
            "Writing partially enriched output"
        );
    }
    output::write_rows(&rows, io.output.as_deref())?;

    let classification = BatchSummary::from_rows(&rows);
    log_summary(&classification);
    if let Some(path) = &io.summary {
        output::write_json(
            &EnrichSummary {
                classification,
                job: report,
                merge,
                usage,
            },
            path,
        )?;
    }
    Ok(())
}

pub fn lexicon(cli: &Cli, command: &LexiconCommands) -> Result<()> {
    match command {
        LexiconCommands::Dump { output } => {
            let config = AppConfig::load(cli)?;
            let yaml = config.classifier.resolve_lexicon()?.to_yaml()?;
            match output {
                Some(path) => {
                    std::fs::write(path, yaml)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!(path = %path.display(), "Lexicon written");
                }
                None => print!("{yaml}"),
            }
        }
        LexiconCommands::Check { path } => {
            let lexicon = Lexicon::from_file(path)?;
            KeywordClassifier::with_lexicon(&lexicon, Default::default())?;
            info!(
                path = %path.display(),
                positive = lexicon.positive.len(),
                negative = lexicon.negative.len(),
                skin_issue = lexicon.skin_issue.len(),
                "Lexicon is valid"
            );
        }
    }
    Ok(())
}

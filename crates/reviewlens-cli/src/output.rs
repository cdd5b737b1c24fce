//! JSON-lines rows and JSON summaries

use anyhow::Context;
use reviewlens_core::AnalyzedReview;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Write one flat JSON object per row; stdout when `path` is `None`
pub fn write_rows(rows: &[AnalyzedReview], path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let file = create(path)?;
            let mut writer = BufWriter::new(file);
            write_jsonl(rows, &mut writer)?;
            writer.flush()?;
            info!(path = %path.display(), rows = rows.len(), "Rows written");
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            write_jsonl(rows, &mut writer)?;
            writer.flush()?;
        }
    }
    Ok(())
}

fn write_jsonl<W: Write>(rows: &[AnalyzedReview], writer: &mut W) -> anyhow::Result<()> {
    for row in rows {
        serde_json::to_writer(&mut *writer, row)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Write a pretty-printed JSON document
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> anyhow::Result<()> {
    let file = create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    info!(path = %path.display(), "Summary written");
    Ok(())
}

fn create(path: &Path) -> anyhow::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    File::create(path).with_context(|| format!("failed to create {}", path.display()))
}

//! `lessonsmith extract`: run text extraction on a reference document.

use std::path::Path;

use anyhow::{Context, Result};

use lessonsmith_core::ingest;

/// Execute the `lessonsmith extract` command.
///
/// Prints the extraction as JSON. Unsupported and unreadable documents are
/// reported in the output, not as a command failure.
pub async fn run_extract(path: &Path) -> Result<()> {
    let extraction = ingest::extract_text(path).await;
    tracing::info!(
        path = %path.display(),
        status = %extraction.status,
        chars = extraction.text.len(),
        "extraction finished"
    );
    let json = serde_json::to_string_pretty(&extraction).context("failed to serialize extraction")?;
    println!("{json}");
    Ok(())
}

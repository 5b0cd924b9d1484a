//! `cppsamples parse`: show how one sample file is understood.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::sample;

/// Parse one sample file.
#[derive(Args, Debug, Clone)]
pub struct ParseCommand {
    /// Sample file to parse
    file: PathBuf,

    /// Rewrite line references in intent and description relative to the code block
    #[arg(long)]
    translate_refs: bool,

    /// Expand `[text](cpp/...)` shorthand links to full cppreference URLs
    #[arg(long)]
    expand_links: bool,
}

impl ParseCommand {
    pub async fn execute(self) -> Result<()> {
        let contents = tokio::fs::read_to_string(&self.file)
            .await
            .with_context(|| format!("Failed to read sample file {}", self.file.display()))?;

        let mut record = sample::parse(&contents, &self.file)?;
        if self.translate_refs {
            record.intent = record.intent_text();
            record.description = record.description_text();
        }
        if self.expand_links {
            record.intent = sample::expand_reference_links(&record.intent);
            record.description = sample::expand_reference_links(&record.description);
        }

        let json = serde_json::to_string_pretty(&record).context("Failed to serialize sample")?;
        println!("{json}");
        Ok(())
    }
}

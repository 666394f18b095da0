//! Common utility functions shared across CLI commands.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use imprint_core::{CandidateFile, DetectorSession, SelectionSource, VerificationVerdict};
use serde::Serialize;
use tracing::{debug, info};

/// Stage `file` in `session` the way the file picker would.
pub async fn stage_file(session: &mut DetectorSession, file: &Path) -> Result<()> {
    let candidate = CandidateFile::from_path(file);
    debug!(path = %file.display(), media_type = %candidate.media_type, "Selecting file");

    let ticket = session
        .select_file(SelectionSource::Picker(vec![candidate]))
        .with_context(|| format!("Cannot analyse {}", file.display()))?;
    let Some(ticket) = ticket else {
        bail!("No file selected");
    };

    session.commit_preview(ticket.load().await);

    if let Some(err) = session.error() {
        return Err(err.clone())
            .with_context(|| format!("Failed to read file: {}", file.display()));
    }

    if let Some(slot) = session.slot() {
        info!(path = %file.display(), bytes = slot.len(), "Staged image");
    }
    Ok(())
}

/// Machine-readable verification output.
#[derive(Serialize)]
pub struct VerifyReport<'a> {
    pub file: &'a str,
    pub fingerprint: &'a str,
    pub analyzed_at: String,
    pub verdict: &'a VerificationVerdict,
}

impl<'a> VerifyReport<'a> {
    pub fn new(
        file: &'a str,
        fingerprint: &'a str,
        analyzed_at: DateTime<Utc>,
        verdict: &'a VerificationVerdict,
    ) -> Self {
        Self {
            file,
            fingerprint,
            analyzed_at: analyzed_at.to_rfc3339(),
            verdict,
        }
    }
}

fn yes_no(set: bool, yes: &str, no: &str) -> String {
    if set {
        yes.yellow().to_string()
    } else {
        no.green().to_string()
    }
}

/// Print a boxed verdict banner followed by the individual signals.
pub fn print_verdict(verdict: &VerificationVerdict) {
    let banner = format!("║{:^40}║", verdict.label());
    println!();
    if verdict.is_authentic() {
        println!("{}", "╔════════════════════════════════════════╗".green());
        println!("{}", banner.green().bold());
        println!("{}", "╚════════════════════════════════════════╝".green());
    } else {
        println!("{}", "╔════════════════════════════════════════╗".red());
        println!("{}", banner.red().bold());
        println!("{}", "╚════════════════════════════════════════╝".red());
    }
    println!();
    println!("   {} {}", "Confidence:".dimmed(), verdict.confidence());
    println!(
        "   {} {}",
        "Watermark:".dimmed(),
        yes_no(verdict.watermark_found(), "Found", "Not found")
    );
    println!(
        "   {} {}",
        "Metadata:".dimmed(),
        yes_no(verdict.metadata_valid(), "Valid", "Not valid")
    );
    println!(
        "   {} {}",
        "Ledger:".dimmed(),
        yes_no(verdict.on_ledger(), "Recorded", "Not recorded")
    );

    if let Some(content) = verdict.watermark_content() {
        println!("   {} {}", "Watermark content:".dimmed(), content);
    }

    if let Some(metadata) = verdict.auxiliary_metadata() {
        if !metadata.is_empty() {
            println!("   {}", "Metadata entries:".dimmed());
            for (key, value) in metadata {
                let value = value
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| value.to_string());
                println!("     {key}: {value}");
            }
        }
    }
}

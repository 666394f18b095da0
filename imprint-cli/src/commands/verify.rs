//! Verify command implementation.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use imprint_core::{
    analyze, AnalysisConfig, AnalysisService, DetectorSession, HttpAnalysisClient,
    MockAnalysisService,
};
use tracing::{info, warn};

use crate::utils::{print_verdict, stage_file, VerifyReport};
use crate::MockProfile;

/// Flags accepted by `imprint verify`.
pub struct VerifyOptions {
    pub endpoint: Option<String>,
    pub timeout: Option<u64>,
    pub mock: Option<MockProfile>,
    pub json: bool,
    pub quiet: bool,
}

fn build_service(options: &VerifyOptions) -> Result<Box<dyn AnalysisService>> {
    if let Some(profile) = options.mock {
        warn!(profile = ?profile, "Using MOCK analysis service");
        if !options.quiet && !options.json {
            eprintln!("{}", "Using MOCK analysis service (no image leaves this machine)".yellow());
        }
        return Ok(Box::new(MockAnalysisService::new(profile.signals())));
    }

    let mut config = AnalysisConfig::from_env();
    if let Some(endpoint) = &options.endpoint {
        config = config.with_endpoint(endpoint.clone());
    }
    if let Some(secs) = options.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    let client = HttpAnalysisClient::with_config(config).context("Invalid analysis configuration")?;
    Ok(Box::new(client))
}

/// Execute the verify command.
pub async fn execute(file: PathBuf, options: VerifyOptions) -> Result<()> {
    let service = build_service(&options)?;

    let mut session = DetectorSession::new();
    stage_file(&mut session, &file).await?;

    let verdict = analyze(&mut session, service.as_ref())
        .await
        .context("Analysis failed")?;
    let analyzed_at = chrono::Utc::now();

    let fingerprint = session
        .slot()
        .map(|slot| slot.fingerprint().to_string())
        .unwrap_or_default();

    info!(
        path = %file.display(),
        authentic = verdict.is_authentic(),
        confidence = verdict.confidence().percent(),
        "Verification complete"
    );

    if options.quiet {
        return Ok(());
    }

    if options.json {
        let name = file.display().to_string();
        let report = VerifyReport::new(&name, &fingerprint, analyzed_at, &verdict);
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
        return Ok(());
    }

    print_verdict(&verdict);
    println!(
        "   {} {}",
        "Fingerprint:".dimmed(),
        fingerprint.get(..16).unwrap_or(&fingerprint)
    );
    println!(
        "   {} {}",
        "Analyzed at:".dimmed(),
        analyzed_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    Ok(())
}

//! Score command implementation.

use anyhow::{Context, Result};
use imprint_core::{fuse, VerificationSignals};
use tracing::debug;

use crate::utils::print_verdict;

/// Execute the score command.
pub fn execute(signals: VerificationSignals, json: bool) -> Result<()> {
    let verdict = fuse(&signals);
    debug!(signals = signals.count(), "Scored signals offline");

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&verdict).context("Failed to serialize verdict")?
        );
    } else {
        print_verdict(&verdict);
    }
    Ok(())
}

//! Preview command implementation.

use std::path::PathBuf;

use anyhow::Result;
use imprint_core::DetectorSession;

use crate::utils::stage_file;

/// Execute the preview command.
pub async fn execute(file: PathBuf) -> Result<()> {
    let mut session = DetectorSession::new();
    stage_file(&mut session, &file).await?;

    if let Some(slot) = session.slot() {
        println!("{}", slot.preview());
    }
    Ok(())
}

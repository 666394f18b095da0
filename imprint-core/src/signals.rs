//! Authenticity signals reported by the remote analysis service.
//!
//! The service answers a verification upload with
//!
//! ```json
//! { "verification": {
//!     "watermark_found": true,
//!     "metadata_valid": false,
//!     "on_blockchain": false,
//!     "watermark_content": "AI-generated by ...",
//!     "metadata": { "Software": "..." }
//! } }
//! ```
//!
//! and with `{ "error": "..." }` on failure. Any other fields the service adds
//! (its own confidence, labels) are ignored; the verdict is always derived
//! locally by [`crate::fusion::fuse`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{DetectorError, Result, GENERIC_FAILURE_MESSAGE};

/// The three independent indicators returned for one analysed image.
///
/// Produced once per successful analysis call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationSignals {
    /// Steganographic marker detected.
    pub watermark_found: bool,
    /// Embedded metadata passed validation.
    pub metadata_valid: bool,
    /// A matching record exists in the external ledger.
    #[serde(rename = "on_blockchain")]
    pub on_ledger: bool,
    /// Decoded watermark payload. Only present when `watermark_found`.
    #[serde(default)]
    pub watermark_content: Option<String>,
    /// Extra metadata, for display only.
    #[serde(default, rename = "metadata")]
    pub auxiliary_metadata: Option<Map<String, Value>>,
}

impl VerificationSignals {
    /// Signals with no optional payloads.
    pub fn new(watermark_found: bool, metadata_valid: bool, on_ledger: bool) -> Self {
        Self {
            watermark_found,
            metadata_valid,
            on_ledger,
            watermark_content: None,
            auxiliary_metadata: None,
        }
    }

    /// Number of signals that are set, in `0..=3`.
    pub fn count(&self) -> u8 {
        [self.watermark_found, self.metadata_valid, self.on_ledger]
            .into_iter()
            .filter(|set| *set)
            .count() as u8
    }

    /// Drop a watermark payload the service sent without a detected watermark.
    fn normalized(mut self) -> Self {
        if !self.watermark_found && self.watermark_content.is_some() {
            debug!("Discarding watermark_content reported without watermark_found");
            self.watermark_content = None;
        }
        self
    }
}

/// Successful response body.
#[derive(Debug, Deserialize)]
pub struct AnalysisEnvelope {
    pub verification: VerificationSignals,
}

/// Failure response body. Every field is optional: a failing status is a
/// failure regardless of what the body contains.
#[derive(Debug, Default, Deserialize)]
pub struct ServiceFailure {
    #[serde(default)]
    pub error: Option<String>,
}

/// Interpret a raw HTTP status and body from the analysis service.
///
/// - non-2xx: [`DetectorError::RemoteAnalysis`] carrying the body's `error`
///   string verbatim, or a generic message when there is none
/// - 2xx with an unexpected shape: [`DetectorError::MalformedResponse`]
pub fn parse_analysis_body(status: u16, body: &[u8]) -> Result<VerificationSignals> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_slice::<ServiceFailure>(body)
            .ok()
            .and_then(|failure| failure.error)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
        warn!(status, message = %message, "Analysis service reported failure");
        return Err(DetectorError::RemoteAnalysis(message));
    }

    let envelope: AnalysisEnvelope = serde_json::from_slice(body).map_err(|e| {
        warn!(status, error = %e, "Analysis response did not match expected shape");
        DetectorError::MalformedResponse(e.to_string())
    })?;

    let signals = envelope.verification.normalized();
    debug!(
        watermark_found = signals.watermark_found,
        metadata_valid = signals.metadata_valid,
        on_ledger = signals.on_ledger,
        "Parsed verification signals"
    );
    Ok(signals)
}

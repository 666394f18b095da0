//! Imprint Core - client pipeline for AI-image detection
//!
//! This crate stages a user-selected image, submits it to a remote analysis
//! service, and fuses the service's independent signals into one verdict.
//!
//! # Features
//!
//! - Image intake from a file picker or drag-and-drop, with media-type validation
//! - Data-URI preview encoding and SHA3-256 fingerprints of staged images
//! - Explicit session state machine (`Empty → Staged → Analyzing → Verified | Failed`)
//! - Stale-result protection: late completions for a replaced image are discarded
//! - Deterministic signal fusion into an authenticity verdict and confidence
//!
//! # Example
//!
//! ```no_run
//! use imprint_core::{
//!     analyze, CandidateFile, DetectorSession, MockAnalysisService, SelectionSource,
//!     VerificationSignals,
//! };
//!
//! # async fn example() -> imprint_core::Result<()> {
//! let mut session = DetectorSession::new();
//! let file = CandidateFile::from_bytes("cat.jpg", "image/jpeg", std::fs::read("cat.jpg").unwrap());
//!
//! if let Some(ticket) = session.select_file(SelectionSource::Picker(vec![file]))? {
//!     session.commit_preview(ticket.load().await);
//! }
//!
//! // Use the mock service for testing (in production, use HttpAnalysisClient)
//! let service = MockAnalysisService::new(VerificationSignals::new(true, false, false));
//! let verdict = analyze(&mut session, &service).await?;
//! assert!(!verdict.is_authentic());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod fusion;
pub mod intake;
pub mod session;
pub mod signals;

#[cfg(feature = "network")]
pub mod analysis;
#[cfg(feature = "network")]
pub mod config;

// Re-export main types for convenience
pub use error::{DetectorError, ErrorKind, Result, GENERIC_FAILURE_MESSAGE};
pub use fusion::{fuse, Confidence, VerificationVerdict};
pub use intake::{
    encode_preview, is_image_media_type, media_type_from_path, CandidateFile, DragState,
    FileBody, LoadedImage, ReadTicket, SelectionSource, UploadSlot,
};
pub use session::{AnalysisOutcome, AnalysisTicket, Commit, DetectorSession, Phase};
pub use signals::{parse_analysis_body, VerificationSignals};

// Network-dependent exports (not available in Wasm)
#[cfg(feature = "network")]
pub use analysis::{analyze, AnalysisService, HttpAnalysisClient, MockAnalysisService};
#[cfg(feature = "network")]
pub use config::AnalysisConfig;

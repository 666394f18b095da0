//! Exit codes following sysexits.h conventions.
//!
//! These codes provide semantic meaning for different failure modes,
//! enabling scripts and CI systems to handle errors appropriately.

use imprint_core::{DetectorError, ErrorKind};

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Invalid configuration (bad endpoint URL, zero timeout).
/// Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: i32 = 64;

/// Data format error (not an image, malformed service response).
/// Maps to EX_DATAERR from sysexits.h.
pub const DATA_ERROR: i32 = 65;

/// Cannot open input file.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// Analysis service unavailable or reporting failure.
/// Maps to EX_UNAVAILABLE from sysexits.h.
pub const SERVICE_UNAVAILABLE: i32 = 69;

/// Represents an exit code with its error message.
pub struct ExitCode {
    pub code: i32,
    pub message: String,
}

impl ExitCode {
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        let detector = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<DetectorError>());

        let code = match detector.map(DetectorError::kind) {
            Some(ErrorKind::InvalidMediaType | ErrorKind::MalformedResponse) => DATA_ERROR,
            Some(ErrorKind::ReadFailed) => INPUT_ERROR,
            Some(ErrorKind::RemoteAnalysis) => SERVICE_UNAVAILABLE,
            Some(ErrorKind::InvalidConfig) => USAGE_ERROR,
            Some(ErrorKind::NoImageStaged | ErrorKind::AnalysisInProgress) => GENERAL_ERROR,
            None if err
                .chain()
                .any(|cause| cause.downcast_ref::<std::io::Error>().is_some()) =>
            {
                INPUT_ERROR
            }
            None => GENERAL_ERROR,
        };

        Self { code, message }
    }
}

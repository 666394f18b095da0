use thiserror::Error;

/// Message shown when the analysis service fails without saying why.
pub const GENERIC_FAILURE_MESSAGE: &str = "Verification failed";

/// Message shown when a non-image file is selected.
pub const INVALID_MEDIA_TYPE_MESSAGE: &str = "Please upload an image file";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectorError {
    #[error("Please upload an image file (got '{media_type}')")]
    InvalidMediaType { media_type: String },

    #[error("No image staged for analysis")]
    NoImageStaged,

    #[error("An analysis is already in progress for this image")]
    AnalysisInProgress,

    /// The service reported a failure, or the transport itself failed.
    /// The message is surfaced to the user verbatim.
    #[error("{0}")]
    RemoteAnalysis(String),

    #[error("Malformed analysis response: {0}")]
    MalformedResponse(String),

    #[error("Failed to read image: {0}")]
    ReadFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Coarse classification of a [`DetectorError`], for diagnostics and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidMediaType,
    NoImageStaged,
    AnalysisInProgress,
    RemoteAnalysis,
    MalformedResponse,
    ReadFailed,
    InvalidConfig,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidMediaType => "invalid_media_type",
            Self::NoImageStaged => "no_image_staged",
            Self::AnalysisInProgress => "analysis_in_progress",
            Self::RemoteAnalysis => "remote_analysis",
            Self::MalformedResponse => "malformed_response",
            Self::ReadFailed => "read_failed",
            Self::InvalidConfig => "invalid_config",
        }
    }
}

impl DetectorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidMediaType { .. } => ErrorKind::InvalidMediaType,
            Self::NoImageStaged => ErrorKind::NoImageStaged,
            Self::AnalysisInProgress => ErrorKind::AnalysisInProgress,
            Self::RemoteAnalysis(_) => ErrorKind::RemoteAnalysis,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Self::ReadFailed(_) => ErrorKind::ReadFailed,
            Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
        }
    }

    /// The text a user should see for this error.
    ///
    /// Malformed responses are presented like any other remote failure; the
    /// detail stays available through `Display` for logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidMediaType { .. } => INVALID_MEDIA_TYPE_MESSAGE.to_string(),
            Self::MalformedResponse(_) => GENERIC_FAILURE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DetectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_message_is_verbatim() {
        let err = DetectorError::RemoteAnalysis("service unavailable".into());
        assert_eq!(err.to_string(), "service unavailable");
        assert_eq!(err.user_message(), "service unavailable");
    }

    #[test]
    fn test_malformed_response_user_message_is_generic() {
        let err = DetectorError::MalformedResponse("missing field `on_blockchain`".into());
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
        assert!(err.to_string().contains("on_blockchain"));
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn test_invalid_media_type_message() {
        let err = DetectorError::InvalidMediaType {
            media_type: "text/plain".into(),
        };
        assert_eq!(err.user_message(), INVALID_MEDIA_TYPE_MESSAGE);
        assert!(err.to_string().contains("text/plain"));
        assert_eq!(err.kind().as_str(), "invalid_media_type");
    }
}

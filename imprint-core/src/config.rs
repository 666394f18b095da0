//! Analysis client configuration
//!
//! Loaded from environment variables with defaults that match a locally
//! running analysis service.

use std::time::Duration;

use url::Url;

use crate::error::{DetectorError, Result};

/// Default analysis endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/verify";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

/// Configuration for [`crate::HttpAnalysisClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Endpoint receiving the multipart upload (default: `http://localhost:5000/verify`)
    pub endpoint: String,
    /// Request timeout (default: 30s)
    pub timeout: Duration,
    /// Multipart field name for the image (default: `image`)
    pub field_name: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            field_name: IMAGE_FIELD.to_string(),
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from environment variables
    ///
    /// - `IMPRINT_ANALYSIS_URL`: analysis endpoint
    /// - `IMPRINT_TIMEOUT_SECS`: request timeout in seconds
    pub fn from_env() -> Self {
        let endpoint = std::env::var("IMPRINT_ANALYSIS_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let timeout = std::env::var("IMPRINT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        Self {
            endpoint,
            timeout,
            ..Default::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check the endpoint is an absolute http(s) URL and the timeout is non-zero.
    pub fn validate(&self) -> Result<Url> {
        let url = Url::parse(&self.endpoint).map_err(|e| {
            DetectorError::InvalidConfig(format!("invalid endpoint '{}': {e}", self.endpoint))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(DetectorError::InvalidConfig(format!(
                "endpoint must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.timeout.is_zero() {
            return Err(DetectorError::InvalidConfig(
                "timeout must be greater than zero".into(),
            ));
        }

        Ok(url)
    }
}

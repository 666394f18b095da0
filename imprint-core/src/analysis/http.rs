//! HTTP client for the remote analysis service.
//!
//! Sends the staged image as a single multipart part and interprets the JSON
//! answer with [`crate::signals::parse_analysis_body`].

use std::time::Instant;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use tracing::{debug, info, instrument, warn};

use super::AnalysisService;
use crate::config::AnalysisConfig;
use crate::error::{DetectorError, Result};
use crate::session::AnalysisTicket;
use crate::signals::{parse_analysis_body, VerificationSignals};

/// Analysis client speaking the service's multipart/JSON contract.
///
/// ```no_run
/// use imprint_core::{AnalysisConfig, HttpAnalysisClient};
///
/// # fn example() -> imprint_core::Result<()> {
/// let config = AnalysisConfig::default().with_endpoint("https://detector.example/verify");
/// let client = HttpAnalysisClient::with_config(config)?;
/// # Ok(())
/// # }
/// ```
pub struct HttpAnalysisClient {
    client: Client,
    endpoint: Url,
    config: AnalysisConfig,
}

impl HttpAnalysisClient {
    /// Create a client configured from the environment.
    pub fn new() -> Result<Self> {
        Self::with_config(AnalysisConfig::from_env())
    }

    #[instrument(level = "debug", skip_all, fields(
        endpoint = %config.endpoint,
        timeout_ms = config.timeout.as_millis() as u64
    ))]
    pub fn with_config(config: AnalysisConfig) -> Result<Self> {
        let endpoint = config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                warn!(error = %e, "Failed to create HTTP client");
                DetectorError::InvalidConfig(format!("Failed to create HTTP client: {e}"))
            })?;

        debug!("Analysis client created");
        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn build_form(&self, ticket: &AnalysisTicket) -> Result<Form> {
        let part = Part::bytes(ticket.bytes().to_vec())
            .file_name(ticket.file_name().to_string())
            .mime_str(ticket.media_type())
            .map_err(|_| DetectorError::InvalidMediaType {
                media_type: ticket.media_type().to_string(),
            })?;
        Ok(Form::new().part(self.config.field_name.clone(), part))
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisClient {
    #[instrument(
        level = "info",
        skip_all,
        fields(
            endpoint = %self.endpoint,
            file = ticket.file_name(),
            bytes = ticket.bytes().len()
        )
    )]
    async fn analyze(&self, ticket: &AnalysisTicket) -> Result<VerificationSignals> {
        let start = Instant::now();
        let form = self.build_form(ticket)?;

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!(
                    error = %e,
                    timeout = e.is_timeout(),
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Analysis request failed"
                );
                DetectorError::RemoteAnalysis(format!("Analysis request failed: {e}"))
            })?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        let body = response.bytes().await.map_err(|e| {
            warn!(error = %e, "Failed to read analysis response body");
            DetectorError::RemoteAnalysis(format!("Failed to read analysis response: {e}"))
        })?;

        let signals = parse_analysis_body(status.as_u16(), &body)?;

        info!(
            latency_ms = start.elapsed().as_millis() as u64,
            signals = signals.count(),
            "Analysis completed"
        );
        Ok(signals)
    }

    fn service_id(&self) -> &'static str {
        "http"
    }
}

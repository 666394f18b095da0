//! Mock analysis service for testing.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::AnalysisService;
use crate::error::{DetectorError, Result};
use crate::session::AnalysisTicket;
use crate::signals::VerificationSignals;

/// Answers every request with the same result without touching the network.
pub struct MockAnalysisService {
    response: Result<VerificationSignals>,
    calls: AtomicUsize,
}

impl MockAnalysisService {
    /// Always report `signals`.
    pub fn new(signals: VerificationSignals) -> Self {
        Self::from_result(Ok(signals))
    }

    /// Always fail as the service would with `{"error": message}`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::from_result(Err(DetectorError::RemoteAnalysis(message.into())))
    }

    pub fn from_result(response: Result<VerificationSignals>) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of requests answered so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisService for MockAnalysisService {
    async fn analyze(&self, _ticket: &AnalysisTicket) -> Result<VerificationSignals> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }

    fn service_id(&self) -> &'static str {
        "mock"
    }
}

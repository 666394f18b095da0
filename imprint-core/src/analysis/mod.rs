//! Remote analysis services.
//!
//! - **HTTP** - multipart upload to the analysis endpoint
//! - **Mock** - canned signals or canned failures for testing
//!
//! ```no_run
//! use imprint_core::{analyze, CandidateFile, DetectorSession, HttpAnalysisClient, SelectionSource};
//!
//! # async fn example() -> imprint_core::Result<()> {
//! let client = HttpAnalysisClient::new()?;
//! let mut session = DetectorSession::new();
//!
//! let file = CandidateFile::from_path("cat.jpg");
//! if let Some(ticket) = session.select_file(SelectionSource::Picker(vec![file]))? {
//!     session.commit_preview(ticket.load().await);
//! }
//!
//! let verdict = analyze(&mut session, &client).await?;
//! println!("{} ({})", verdict.label(), verdict.confidence());
//! # Ok(())
//! # }
//! ```

mod http;
mod mock;

pub use http::HttpAnalysisClient;
pub use mock::MockAnalysisService;

use async_trait::async_trait;
use tracing::instrument;

use crate::error::{DetectorError, Result};
use crate::fusion::VerificationVerdict;
use crate::session::{AnalysisTicket, DetectorSession};
use crate::signals::VerificationSignals;

/// A service that inspects an image and reports its authenticity signals.
///
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Submit the ticket's image and return the reported signals.
    async fn analyze(&self, ticket: &AnalysisTicket) -> Result<VerificationSignals>;

    /// Short identifier for logs.
    fn service_id(&self) -> &'static str;
}

/// Analyse the staged image and commit the result in one step.
///
/// Holding `&mut DetectorSession` across the request means nothing else can
/// touch the session meanwhile; interactive callers that must stay responsive
/// use [`DetectorSession::begin_analysis`] and
/// [`DetectorSession::complete_analysis`] directly.
#[instrument(level = "debug", skip_all, fields(service = service.service_id()))]
pub async fn analyze(
    session: &mut DetectorSession,
    service: &dyn AnalysisService,
) -> Result<VerificationVerdict> {
    let ticket = session.begin_analysis()?;
    let outcome = ticket.run(service).await;
    session.complete_analysis(outcome);

    match (session.verdict(), session.error()) {
        (Some(verdict), _) => Ok(verdict.clone()),
        (None, Some(err)) => Err(err.clone()),
        (None, None) => Err(DetectorError::NoImageStaged),
    }
}

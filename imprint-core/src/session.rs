//! The detector session: sole owner of the staged image, its verdict and the
//! current error.
//!
//! ```text
//! Empty ──select──▶ Staged ──begin──▶ Analyzing ──complete──▶ Verified | Failed
//!                     ▲                                          │
//!                     └──────────────── select ─────────────────┘
//! ```
//!
//! Both suspension points (reading a file, the remote call) are split into a
//! synchronous start that hands out a ticket and a synchronous commit that
//! takes the ticket's result back. Every ticket carries the session
//! generation it was issued under; a commit whose generation is no longer
//! current is discarded, so a late result can never land on a newer image.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{DetectorError, Result};
use crate::fusion::{fuse, VerificationVerdict};
use crate::intake::{DragState, LoadedImage, ReadTicket, SelectionSource, UploadSlot};
use crate::signals::VerificationSignals;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Empty,
    Staged,
    Analyzing,
    Verified,
    Failed,
}

#[derive(Debug, Default)]
enum SlotState {
    #[default]
    Empty,
    Staged(UploadSlot),
    Analyzing(UploadSlot),
    Verified(UploadSlot, VerificationVerdict),
    Failed(UploadSlot, DetectorError),
}

impl SlotState {
    fn phase(&self) -> Phase {
        match self {
            Self::Empty => Phase::Empty,
            Self::Staged(_) => Phase::Staged,
            Self::Analyzing(_) => Phase::Analyzing,
            Self::Verified(..) => Phase::Verified,
            Self::Failed(..) => Phase::Failed,
        }
    }

    fn slot(&self) -> Option<&UploadSlot> {
        match self {
            Self::Empty => None,
            Self::Staged(slot)
            | Self::Analyzing(slot)
            | Self::Verified(slot, _)
            | Self::Failed(slot, _) => Some(slot),
        }
    }

    fn into_slot(self) -> Option<UploadSlot> {
        match self {
            Self::Empty => None,
            Self::Staged(slot)
            | Self::Analyzing(slot)
            | Self::Verified(slot, _)
            | Self::Failed(slot, _) => Some(slot),
        }
    }
}

/// Whether a completed operation changed the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    Applied,
    /// The result belonged to a superseded image and was dropped.
    Discarded,
}

/// Handle for one remote analysis of the staged image.
#[derive(Debug, Clone)]
pub struct AnalysisTicket {
    generation: u64,
    file_name: String,
    media_type: String,
    bytes: Arc<[u8]>,
    fingerprint: String,
}

impl AnalysisTicket {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Pair this ticket with the result of its request.
    pub fn complete_with(self, result: Result<VerificationSignals>) -> AnalysisOutcome {
        AnalysisOutcome {
            generation: self.generation,
            result,
        }
    }

    /// Send the image to `service` and collect the outcome.
    #[cfg(feature = "network")]
    pub async fn run(self, service: &dyn crate::analysis::AnalysisService) -> AnalysisOutcome {
        let result = service.analyze(&self).await;
        self.complete_with(result)
    }
}

/// Result of one analysis, to be committed with [`DetectorSession::complete_analysis`].
#[derive(Debug)]
pub struct AnalysisOutcome {
    generation: u64,
    result: Result<VerificationSignals>,
}

impl AnalysisOutcome {
    pub fn result(&self) -> &Result<VerificationSignals> {
        &self.result
    }
}

/// State of one detector form.
#[derive(Debug, Default)]
pub struct DetectorSession {
    state: SlotState,
    generation: u64,
    /// Intake errors; these never touch the staged slot.
    notice: Option<DetectorError>,
    drag: DragState,
}

impl DetectorSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn slot(&self) -> Option<&UploadSlot> {
        self.state.slot()
    }

    pub fn verdict(&self) -> Option<&VerificationVerdict> {
        match &self.state {
            SlotState::Verified(_, verdict) => Some(verdict),
            _ => None,
        }
    }

    /// The error to show, most recent first.
    pub fn error(&self) -> Option<&DetectorError> {
        match (&self.notice, &self.state) {
            (Some(notice), _) => Some(notice),
            (None, SlotState::Failed(_, err)) => Some(err),
            _ => None,
        }
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self.state, SlotState::Analyzing(_))
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn drag_enter(&mut self) {
        self.drag = DragState::Active;
    }

    pub fn drag_over(&mut self) {}

    pub fn drag_leave(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Accept a picker or drop selection.
    ///
    /// Only the first file is considered. A non-image is rejected with
    /// [`DetectorError::InvalidMediaType`] and leaves any staged image as it
    /// was. An accepted file supersedes every outstanding ticket; the slot is
    /// populated once the returned [`ReadTicket`] is loaded and committed.
    pub fn select_file(&mut self, source: SelectionSource) -> Result<Option<ReadTicket>> {
        if source.is_drop() {
            self.drag = DragState::Idle;
        }

        let file = match source.validated_first() {
            Ok(Some(file)) => file,
            Ok(None) => return Ok(None),
            Err(err) => {
                warn!(error = %err, "Rejected file selection");
                self.notice = Some(err.clone());
                return Err(err);
            }
        };

        self.generation += 1;
        self.state = match std::mem::take(&mut self.state) {
            SlotState::Analyzing(slot) => {
                debug!("Selection superseded in-flight analysis");
                SlotState::Staged(slot)
            }
            other => other,
        };

        debug!(
            file = %file.name,
            media_type = %file.media_type,
            generation = self.generation,
            "Accepted file selection"
        );
        Ok(Some(ReadTicket::new(self.generation, file)))
    }

    /// Stage a loaded image, clearing the previous verdict and error.
    pub fn commit_preview(&mut self, loaded: LoadedImage) -> Commit {
        if loaded.generation != self.generation {
            warn!(
                ticket = loaded.generation,
                current = self.generation,
                "Discarding preview for superseded selection"
            );
            return Commit::Discarded;
        }

        match loaded.outcome {
            Ok(slot) => {
                self.generation += 1;
                debug!(
                    file = slot.file_name(),
                    bytes = slot.len(),
                    fingerprint = &slot.fingerprint()[..16],
                    "Staged image"
                );
                self.state = SlotState::Staged(slot);
                self.notice = None;
            }
            Err(err) => {
                warn!(error = %err, "Failed to stage image");
                self.notice = Some(err);
            }
        }
        Commit::Applied
    }

    /// Start analysing the staged image.
    ///
    /// Fails with [`DetectorError::NoImageStaged`] when nothing is staged and
    /// [`DetectorError::AnalysisInProgress`] while a request is outstanding.
    /// A failed or verified image may be analysed again.
    pub fn begin_analysis(&mut self) -> Result<AnalysisTicket> {
        let slot = match std::mem::take(&mut self.state) {
            SlotState::Empty => return Err(DetectorError::NoImageStaged),
            SlotState::Analyzing(slot) => {
                self.state = SlotState::Analyzing(slot);
                return Err(DetectorError::AnalysisInProgress);
            }
            other => other.into_slot().ok_or(DetectorError::NoImageStaged)?,
        };

        let ticket = AnalysisTicket {
            generation: self.generation,
            file_name: slot.file_name().to_string(),
            media_type: slot.media_type().to_string(),
            bytes: slot.shared_bytes(),
            fingerprint: slot.fingerprint().to_string(),
        };
        self.state = SlotState::Analyzing(slot);
        self.notice = None;

        debug!(generation = self.generation, "Analysis started");
        Ok(ticket)
    }

    /// Apply an analysis result, unless the image changed since it started.
    pub fn complete_analysis(&mut self, outcome: AnalysisOutcome) -> Commit {
        if outcome.generation != self.generation || !self.is_analyzing() {
            warn!(
                ticket = outcome.generation,
                current = self.generation,
                "Discarding analysis result for superseded image"
            );
            return Commit::Discarded;
        }

        let Some(slot) = std::mem::take(&mut self.state).into_slot() else {
            return Commit::Discarded;
        };

        self.state = match outcome.result {
            Ok(signals) => {
                let verdict = fuse(&signals);
                info!(
                    file = slot.file_name(),
                    authentic = verdict.is_authentic(),
                    confidence = verdict.confidence().percent(),
                    "Analysis verified"
                );
                SlotState::Verified(slot, verdict)
            }
            Err(err) => {
                warn!(file = slot.file_name(), error = %err, "Analysis failed");
                SlotState::Failed(slot, err)
            }
        };
        self.notice = None;
        Commit::Applied
    }

    /// Clear the image, verdict and error, and invalidate all tickets.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = SlotState::Empty;
        self.notice = None;
        self.drag = DragState::Idle;
        debug!(generation = self.generation, "Session reset");
    }

    /// Hide the current error; a failed image returns to staged.
    pub fn dismiss_error(&mut self) {
        self.notice = None;
        self.state = match std::mem::take(&mut self.state) {
            SlotState::Failed(slot, _) => SlotState::Staged(slot),
            other => other,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::intake::{CandidateFile, DragState};

    fn image(name: &str, bytes: &[u8]) -> SelectionSource {
        SelectionSource::Picker(vec![CandidateFile::from_bytes(
            name,
            "image/jpeg",
            bytes.to_vec(),
        )])
    }

    fn text_file() -> SelectionSource {
        SelectionSource::Picker(vec![CandidateFile::from_bytes(
            "notes.txt",
            "text/plain",
            b"hello".to_vec(),
        )])
    }

    async fn stage(session: &mut DetectorSession, name: &str, bytes: &[u8]) {
        let ticket = session.select_file(image(name, bytes)).unwrap().unwrap();
        let loaded = ticket.load().await;
        assert_eq!(session.commit_preview(loaded), Commit::Applied);
    }

    fn verify(session: &mut DetectorSession, signals: VerificationSignals) {
        let ticket = session.begin_analysis().unwrap();
        let outcome = ticket.complete_with(Ok(signals));
        assert_eq!(session.complete_analysis(outcome), Commit::Applied);
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = DetectorSession::new();
        assert_eq!(session.phase(), Phase::Empty);
        assert!(session.slot().is_none());
        assert!(session.verdict().is_none());
        assert!(session.error().is_none());
        assert!(!session.is_analyzing());
    }

    #[tokio::test]
    async fn test_select_stages_after_load() {
        let mut session = DetectorSession::new();
        let ticket = session.select_file(image("cat.jpg", b"cat")).unwrap().unwrap();

        // Not populated until the preview is committed
        assert_eq!(session.phase(), Phase::Empty);

        let loaded = ticket.load().await;
        assert_eq!(session.commit_preview(loaded), Commit::Applied);
        assert_eq!(session.phase(), Phase::Staged);

        let slot = session.slot().unwrap();
        assert_eq!(slot.file_name(), "cat.jpg");
        assert!(slot.preview().starts_with("data:image/jpeg;base64,"));
        assert!(session.verdict().is_none());
    }

    #[test]
    fn test_non_image_rejected_on_empty_session() {
        let mut session = DetectorSession::new();
        let err = session.select_file(text_file()).unwrap_err();

        assert!(matches!(err, DetectorError::InvalidMediaType { .. }));
        assert_eq!(session.phase(), Phase::Empty);
        assert!(matches!(
            session.error(),
            Some(DetectorError::InvalidMediaType { .. })
        ));
    }

    #[tokio::test]
    async fn test_non_image_leaves_staged_slot_and_verdict() {
        let mut session = DetectorSession::new();
        stage(&mut session, "cat.jpg", b"cat").await;
        verify(&mut session, VerificationSignals::new(true, false, false));

        assert!(session.select_file(text_file()).is_err());

        assert_eq!(session.phase(), Phase::Verified);
        assert_eq!(session.slot().unwrap().file_name(), "cat.jpg");
        assert!(session.verdict().is_some());
    }

    #[tokio::test]
    async fn test_new_image_clears_verdict_and_error() {
        let mut session = DetectorSession::new();
        stage(&mut session, "cat.jpg", b"cat").await;
        verify(&mut session, VerificationSignals::new(true, true, false));
        let _ = session.select_file(text_file());
        assert!(session.error().is_some());

        stage(&mut session, "dog.png", b"dog").await;

        assert_eq!(session.phase(), Phase::Staged);
        assert!(session.verdict().is_none());
        assert!(session.error().is_none());
        assert_eq!(session.slot().unwrap().file_name(), "dog.png");
    }

    #[test]
    fn test_begin_without_image() {
        let mut session = DetectorSession::new();
        assert_eq!(
            session.begin_analysis().unwrap_err(),
            DetectorError::NoImageStaged
        );
    }

    #[tokio::test]
    async fn test_no_concurrent_analysis() {
        let mut session = DetectorSession::new();
        stage(&mut session, "cat.jpg", b"cat").await;

        let _ticket = session.begin_analysis().unwrap();
        assert!(session.is_analyzing());
        assert_eq!(
            session.begin_analysis().unwrap_err(),
            DetectorError::AnalysisInProgress
        );
        assert!(session.is_analyzing());
    }

    #[tokio::test]
    async fn test_verified_verdict() {
        let mut session = DetectorSession::new();
        stage(&mut session, "cat.jpg", b"cat").await;
        verify(&mut session, VerificationSignals::new(false, false, false));

        assert_eq!(session.phase(), Phase::Verified);
        let verdict = session.verdict().unwrap();
        assert!(verdict.is_authentic());
        assert_eq!(verdict.confidence().percent(), 95);
        assert!(!session.is_analyzing());
    }

    #[tokio::test]
    async fn test_failure_keeps_slot_and_allows_retry() {
        let mut session = DetectorSession::new();
        stage(&mut session, "cat.jpg", b"cat").await;

        let ticket = session.begin_analysis().unwrap();
        let outcome =
            ticket.complete_with(Err(DetectorError::RemoteAnalysis("service unavailable".into())));
        assert_eq!(session.complete_analysis(outcome), Commit::Applied);

        assert_eq!(session.phase(), Phase::Failed);
        assert!(!session.is_analyzing());
        assert!(session.verdict().is_none());
        assert_eq!(session.error().unwrap().user_message(), "service unavailable");
        assert_eq!(session.slot().unwrap().file_name(), "cat.jpg");

        // Retry without re-uploading
        verify(&mut session, VerificationSignals::new(true, true, true));
        assert_eq!(session.phase(), Phase::Verified);
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn test_late_result_discarded_after_new_image() {
        let mut session = DetectorSession::new();
        stage(&mut session, "cat.jpg", b"cat").await;
        let stale = session.begin_analysis().unwrap();

        stage(&mut session, "dog.png", b"dog").await;

        let outcome = stale.complete_with(Ok(VerificationSignals::new(true, true, true)));
        assert_eq!(session.complete_analysis(outcome), Commit::Discarded);
        assert_eq!(session.phase(), Phase::Staged);
        assert!(session.verdict().is_none());
        assert_eq!(session.slot().unwrap().file_name(), "dog.png");
    }

    #[tokio::test]
    async fn test_selection_alone_invalidates_in_flight_result() {
        let mut session = DetectorSession::new();
        stage(&mut session, "cat.jpg", b"cat").await;
        let stale = session.begin_analysis().unwrap();

        // New selection accepted, preview not yet loaded
        let _pending = session.select_file(image("dog.png", b"dog")).unwrap().unwrap();
        assert!(!session.is_analyzing());

        let outcome = stale.complete_with(Ok(VerificationSignals::new(false, false, false)));
        assert_eq!(session.complete_analysis(outcome), Commit::Discarded);
        assert!(session.verdict().is_none());
    }

    #[tokio::test]
    async fn test_late_failure_discarded_after_new_image() {
        let mut session = DetectorSession::new();
        stage(&mut session, "cat.jpg", b"cat").await;
        let stale = session.begin_analysis().unwrap();
        stage(&mut session, "dog.png", b"dog").await;

        let outcome = stale.complete_with(Err(DetectorError::RemoteAnalysis("boom".into())));
        assert_eq!(session.complete_analysis(outcome), Commit::Discarded);
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn test_superseded_preview_discarded() {
        let mut session = DetectorSession::new();
        let first = session.select_file(image("cat.jpg", b"cat")).unwrap().unwrap();
        let second = session.select_file(image("dog.png", b"dog")).unwrap().unwrap();

        let second_loaded = second.load().await;
        let first_loaded = first.load().await;

        assert_eq!(session.commit_preview(first_loaded), Commit::Discarded);
        assert_eq!(session.commit_preview(second_loaded), Commit::Applied);
        assert_eq!(session.slot().unwrap().file_name(), "dog.png");
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let mut session = DetectorSession::new();
        stage(&mut session, "cat.jpg", b"cat").await;
        let in_flight = session.begin_analysis().unwrap();

        session.reset();
        assert_eq!(session.phase(), Phase::Empty);
        assert!(session.slot().is_none());
        assert!(session.error().is_none());

        let outcome = in_flight.complete_with(Ok(VerificationSignals::new(true, false, false)));
        assert_eq!(session.complete_analysis(outcome), Commit::Discarded);
        assert_eq!(session.phase(), Phase::Empty);
    }

    #[tokio::test]
    async fn test_dismiss_error_returns_failed_to_staged() {
        let mut session = DetectorSession::new();
        stage(&mut session, "cat.jpg", b"cat").await;
        let ticket = session.begin_analysis().unwrap();
        session.complete_analysis(ticket.complete_with(Err(DetectorError::MalformedResponse(
            "missing field".into(),
        ))));

        session.dismiss_error();
        assert_eq!(session.phase(), Phase::Staged);
        assert!(session.error().is_none());
    }

    #[test]
    fn test_drag_state_reset_on_drop() {
        let mut session = DetectorSession::new();
        session.drag_enter();
        session.drag_over();
        assert_eq!(session.drag_state(), DragState::Active);

        let dropped = SelectionSource::Drop(vec![CandidateFile::from_bytes(
            "notes.txt",
            "text/plain",
            vec![],
        )]);
        assert!(session.select_file(dropped).is_err());
        assert_eq!(session.drag_state(), DragState::Idle);

        session.drag_enter();
        let dropped = SelectionSource::Drop(vec![CandidateFile::from_bytes(
            "cat.jpg",
            "image/jpeg",
            b"cat".to_vec(),
        )]);
        assert!(session.select_file(dropped).unwrap().is_some());
        assert_eq!(session.drag_state(), DragState::Idle);

        session.drag_enter();
        session.drag_leave();
        assert_eq!(session.drag_state(), DragState::Idle);
    }

    #[tokio::test]
    async fn test_failure_after_rejected_selection_is_shown() {
        let mut session = DetectorSession::new();
        stage(&mut session, "cat.jpg", b"cat").await;
        let ticket = session.begin_analysis().unwrap();

        assert!(session.select_file(text_file()).is_err());
        assert_eq!(
            session.error().map(DetectorError::kind),
            Some(ErrorKind::InvalidMediaType)
        );

        let outcome =
            ticket.complete_with(Err(DetectorError::RemoteAnalysis("service unavailable".into())));
        assert_eq!(session.complete_analysis(outcome), Commit::Applied);
        assert_eq!(session.phase(), Phase::Failed);
        assert_eq!(
            session.error().map(DetectorError::user_message).as_deref(),
            Some("service unavailable")
        );
    }

    #[tokio::test]
    async fn test_verdict_clears_rejected_selection_notice() {
        let mut session = DetectorSession::new();
        stage(&mut session, "cat.jpg", b"cat").await;
        let ticket = session.begin_analysis().unwrap();
        assert!(session.select_file(text_file()).is_err());

        let outcome = ticket.complete_with(Ok(VerificationSignals::new(false, false, false)));
        assert_eq!(session.complete_analysis(outcome), Commit::Applied);
        assert_eq!(session.phase(), Phase::Verified);
        assert!(session.error().is_none());
    }

    #[test]
    fn test_empty_selection_changes_nothing() {
        let mut session = DetectorSession::new();
        assert!(session
            .select_file(SelectionSource::Drop(vec![]))
            .unwrap()
            .is_none());
        assert_eq!(session.phase(), Phase::Empty);
        assert!(session.error().is_none());
    }
}

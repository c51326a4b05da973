//! Inspection orchestration: the analyze/reset state machine.
//!
//! analyze: → Loading → encode → classify → Result(v) | Error(msg)
//!          then record(v) on a detached task (Result path only).
//! reset:   → Idle, in-flight request (if any) becomes stale.
//!
//! Every request gets a generation number when it enters Loading. A
//! completion whose generation is no longer current is dropped, so a slow
//! superseded response can never overwrite newer state.

use crate::capture::{self, ImageSource};
use crate::llm::{Classify, Verdict};
use crate::store::Record;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;

/// What the user currently sees.
#[derive(Debug, Clone, PartialEq)]
pub enum InspectionState {
    Idle,
    Loading,
    Result(Verdict),
    Error(String),
}

impl InspectionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, InspectionState::Loading)
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        match self {
            InspectionState::Result(v) => Some(v),
            _ => None,
        }
    }
}

/// One user-triggered analysis.
#[derive(Debug, Clone)]
pub struct InspectionRequest {
    pub path: PathBuf,
    pub source: ImageSource,
}

impl InspectionRequest {
    pub fn upload(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            source: ImageSource::Upload,
        }
    }

    pub fn camera(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            source: ImageSource::Camera,
        }
    }
}

/// A request that has entered Loading and is waiting to be run.
#[derive(Debug)]
pub struct Ticket {
    generation: u64,
    request: InspectionRequest,
}

struct Session {
    state: InspectionState,
    generation: u64,
    /// Image the current state was derived from.
    preview: Option<PathBuf>,
}

/// Owns the inspection state and sequences encoder → classifier → store.
pub struct Inspector<C, R> {
    classifier: C,
    recorder: Arc<R>,
    session: Mutex<Session>,
    /// Detached persistence tasks. Only `flush_persistence` ever awaits them.
    persistence: Mutex<Vec<JoinHandle<()>>>,
}

impl<C: Classify, R: Record> Inspector<C, R> {
    pub fn new(classifier: C, recorder: R) -> Self {
        Self {
            classifier,
            recorder: Arc::new(recorder),
            session: Mutex::new(Session {
                state: InspectionState::Idle,
                generation: 0,
                preview: None,
            }),
            persistence: Mutex::new(Vec::new()),
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> InspectionState {
        self.session().state.clone()
    }

    pub fn preview(&self) -> Option<PathBuf> {
        self.session().preview.clone()
    }

    /// True while a request is Loading; triggers should be disabled.
    pub fn is_busy(&self) -> bool {
        self.session().state.is_loading()
    }

    /// Enter Loading for `request` unless one is already Loading.
    ///
    /// The transition happens synchronously, so a second trigger that
    /// arrives before the first request is polled is refused.
    pub fn try_begin(&self, request: InspectionRequest) -> Option<Ticket> {
        let mut session = self.session();
        if session.state.is_loading() {
            log::info!(
                "[PIPELINE] Ignoring {:?} trigger for {} — analysis in progress",
                request.source,
                request.path.display()
            );
            return None;
        }
        Some(Self::enter_loading(&mut session, request))
    }

    fn enter_loading(session: &mut Session, request: InspectionRequest) -> Ticket {
        session.generation += 1;
        session.state = InspectionState::Loading;
        session.preview = Some(request.path.clone());
        log::info!(
            "[PIPELINE] #{} {:?} image: {}",
            session.generation,
            request.source,
            request.path.display()
        );
        Ticket {
            generation: session.generation,
            request,
        }
    }

    /// Analyze one image, superseding any request still Loading.
    ///
    /// Returns the state this request settled into, or `None` when a newer
    /// request or a reset made it stale.
    pub async fn analyze(&self, request: InspectionRequest) -> Option<InspectionState> {
        let ticket = {
            let mut session = self.session();
            Self::enter_loading(&mut session, request)
        };
        self.complete(ticket).await
    }

    /// Run a ticket obtained from [`Inspector::try_begin`] to completion.
    pub async fn complete(&self, ticket: Ticket) -> Option<InspectionState> {
        let start = std::time::Instant::now();
        let outcome = self.classify_file(&ticket.request.path).await;

        let state = {
            let mut session = self.session();
            if session.generation != ticket.generation {
                log::info!(
                    "[PIPELINE] #{} superseded after {}ms — discarding result",
                    ticket.generation,
                    start.elapsed().as_millis()
                );
                return None;
            }

            session.state = match outcome {
                Ok(verdict) => InspectionState::Result(verdict),
                Err(e) => {
                    log::error!("[PIPELINE] #{} failed: {}", ticket.generation, e);
                    InspectionState::Error(format!("Analysis Failed: {}", e))
                }
            };
            session.state.clone()
        };

        log::info!(
            "[PIPELINE] #{} settled in {}ms",
            ticket.generation,
            start.elapsed().as_millis()
        );

        if let InspectionState::Result(verdict) = &state {
            self.dispatch_record(verdict.clone());
        }
        Some(state)
    }

    async fn classify_file(&self, path: &Path) -> Result<Verdict, crate::error::InspectError> {
        let image = capture::encode(path).await?;
        self.classifier.classify(&image).await
    }

    /// Fire-and-forget: spawn the insert and return immediately.
    fn dispatch_record(&self, verdict: Verdict) {
        let recorder = Arc::clone(&self.recorder);
        let handle = tokio::spawn(async move {
            recorder.record(&verdict).await;
        });

        let mut pending = self
            .persistence
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    /// Return to Idle. Clears the verdict/error and the preview.
    ///
    /// Does not cancel an in-flight request; its result will be discarded.
    pub fn reset(&self) {
        let mut session = self.session();
        if matches!(session.state, InspectionState::Idle) && session.preview.is_none() {
            return;
        }
        session.generation += 1;
        session.state = InspectionState::Idle;
        session.preview = None;
        log::info!("[PIPELINE] Reset to idle");
    }

    /// Wait for detached persistence tasks. Shutdown use only.
    pub async fn flush_persistence(&self) {
        let pending: Vec<JoinHandle<()>> = std::mem::take(
            &mut *self
                .persistence
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for handle in pending {
            if let Err(e) = handle.await {
                log::error!("[PIPELINE] Persistence task panicked: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::EncodedImage;
    use crate::error::InspectError;

    struct Unreachable;

    impl Classify for Unreachable {
        async fn classify(&self, _image: &EncodedImage) -> Result<Verdict, InspectError> {
            panic!("classifier must not be called");
        }
    }

    struct NoStore;

    impl Record for NoStore {
        async fn record(&self, _verdict: &Verdict) {}
    }

    #[test]
    fn reset_from_idle_is_a_no_op() {
        let inspector = Inspector::new(Unreachable, NoStore);
        inspector.reset();
        inspector.reset();
        assert_eq!(inspector.state(), InspectionState::Idle);
        assert!(inspector.preview().is_none());
        assert_eq!(inspector.session().generation, 0);
    }

    #[test]
    fn try_begin_refuses_while_loading() {
        let inspector = Inspector::new(Unreachable, NoStore);
        let first = inspector.try_begin(InspectionRequest::upload("a.jpg"));
        assert!(first.is_some());
        assert!(inspector.is_busy());
        assert_eq!(inspector.preview(), Some(PathBuf::from("a.jpg")));

        assert!(inspector
            .try_begin(InspectionRequest::camera("b.jpg"))
            .is_none());
        assert_eq!(inspector.preview(), Some(PathBuf::from("a.jpg")));
    }

    #[tokio::test]
    async fn reset_makes_pending_ticket_stale() {
        let inspector = Inspector::new(Unreachable, NoStore);
        let ticket = inspector
            .try_begin(InspectionRequest::upload("/nonexistent/insulator.jpg"))
            .unwrap();
        inspector.reset();

        // Encoding fails (missing file) before the classifier is reached;
        // the error is stale and must not replace Idle.
        assert!(inspector.complete(ticket).await.is_none());
        assert_eq!(inspector.state(), InspectionState::Idle);
    }

    #[tokio::test]
    async fn unreadable_file_ends_in_error_state() {
        let inspector = Inspector::new(Unreachable, NoStore);
        let state = inspector
            .analyze(InspectionRequest::upload("/nonexistent/insulator.jpg"))
            .await
            .unwrap();
        match state {
            InspectionState::Error(msg) => {
                assert!(msg.starts_with("Analysis Failed: Could not read file data"))
            }
            other => panic!("expected error, got {:?}", other),
        }
        assert!(!inspector.is_busy());
    }
}

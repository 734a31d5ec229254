//! Live sessions owned by the host.
//!
//! Each session id maps to a slot whose state is a [`LoadState`]: the slot
//! exists as soon as a start is requested and shows `loading` until the
//! repository answers. All access goes through one mutex; no lock is held
//! across an await.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use rand::{SeedableRng, rngs::StdRng};
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;
use vocab_study::{
    ComprehensiveOptions, ComprehensiveSession, LearnOptions, LearnSession, LoadState,
    StudyConfig, StudyError, StudySession, VocabularyEntry,
};

use super::{
    model::{Progress, QuestionView, SessionView},
    scheduler::{TimerFired, TokioScheduler},
};
use crate::{error::ApiError, metrics};

/// Which kind of session a client asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Learn(LearnOptions),
    Comprehensive(ComprehensiveOptions),
}

impl SessionKind {
    pub const fn mode(&self) -> &'static str {
        match self {
            Self::Learn(_) => "learn",
            Self::Comprehensive(_) => "comprehensive",
        }
    }
}

/// Enough to (re)build a session once its items are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRequest {
    pub set_id: Uuid,
    pub kind: SessionKind,
}

#[derive(Debug)]
pub enum HostedSession {
    Learn(LearnSession<StdRng, TokioScheduler>),
    Comprehensive(ComprehensiveSession<StdRng, TokioScheduler>),
}

impl HostedSession {
    fn start(
        kind: SessionKind,
        entries: Vec<VocabularyEntry>,
        config: StudyConfig,
        scheduler: TokioScheduler,
    ) -> Result<Self, StudyError> {
        let rng = StdRng::from_entropy();
        Ok(match kind {
            SessionKind::Learn(options) => {
                Self::Learn(LearnSession::start(entries, options, config, rng, scheduler)?)
            }
            SessionKind::Comprehensive(options) => Self::Comprehensive(
                ComprehensiveSession::start(entries, options, config, rng, scheduler)?,
            ),
        })
    }

    pub fn study(&self) -> &dyn StudySession {
        match self {
            Self::Learn(session) => session,
            Self::Comprehensive(session) => session,
        }
    }

    pub fn study_mut(&mut self) -> &mut dyn StudySession {
        match self {
            Self::Learn(session) => session,
            Self::Comprehensive(session) => session,
        }
    }

    pub fn hint(&mut self) -> Result<String, StudyError> {
        match self {
            Self::Learn(session) => session.hint(),
            Self::Comprehensive(_) => Err(StudyError::HintUnavailable),
        }
    }

    pub fn retry_incorrect(&mut self) -> Result<(), StudyError> {
        match self {
            Self::Comprehensive(session) => session.retry_incorrect(),
            Self::Learn(_) => Err(StudyError::InvalidTransition(
                "retrying incorrect answers is only offered after a comprehensive pass",
            )),
        }
    }

    fn fill_view(&self, view: &mut SessionView) {
        let (index, total) = match self {
            Self::Learn(session) => {
                view.phase = Some(session.phase());
                view.round = session.round();
                view.review = session.review_entries().map(<[_]>::to_vec);
                (session.current_index(), session.questions().len())
            }
            Self::Comprehensive(session) => {
                view.stage = Some(session.stage());
                view.round = session.round();
                (session.current_index(), session.questions().len())
            }
        };

        let study = self.study();
        view.question = study.current_question().map(QuestionView::from);
        view.progress = view.question.is_some().then_some(Progress { index, total });
        view.feedback = study.feedback().cloned();
        view.finished = study.is_finished();
    }
}

#[derive(Debug)]
struct Slot {
    request: SessionRequest,
    state: LoadState<HostedSession>,
    last_active: Instant,
}

impl Slot {
    fn view(&self, id: Uuid) -> SessionView {
        let mut view = SessionView {
            id,
            set_id: self.request.set_id,
            mode: self.request.kind.mode(),
            status: self.state.as_str(),
            error: self
                .state
                .error()
                .map(|err| ApiError::Study(err.clone()).body()),
            phase: None,
            stage: None,
            round: 0,
            question: None,
            progress: None,
            feedback: None,
            review: None,
            finished: false,
        };
        if let Some(session) = self.state.ready() {
            session.fill_view(&mut view);
        }
        view
    }
}

#[derive(Debug, Clone)]
pub struct SessionRegistry {
    slots: Arc<Mutex<HashMap<Uuid, Slot>>>,
    timer_tx: UnboundedSender<TimerFired>,
    config: StudyConfig,
    max_sessions: usize,
}

impl SessionRegistry {
    pub fn new(
        timer_tx: UnboundedSender<TimerFired>,
        config: StudyConfig,
        max_sessions: usize,
    ) -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
            timer_tx,
            config,
            max_sessions,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, Slot>>, ApiError> {
        self.slots.lock().map_err(|_| {
            tracing::error!("session registry lock poisoned");
            ApiError::Internal("session registry unavailable".to_string())
        })
    }

    pub fn len(&self) -> usize {
        self.lock().map_or(0, |slots| slots.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Claim a slot in the `loading` state.
    pub fn reserve(&self, request: SessionRequest) -> Result<Uuid, ApiError> {
        let mut slots = self.lock()?;
        if slots.len() >= self.max_sessions {
            tracing::warn!(max = self.max_sessions, "session limit reached");
            return Err(ApiError::Capacity);
        }

        let id = Uuid::new_v4();
        slots.insert(
            id,
            Slot {
                request,
                state: LoadState::Loading,
                last_active: Instant::now(),
            },
        );
        Ok(id)
    }

    /// Turn a `loading` slot into a running session or a failed load.
    pub fn complete_load(
        &self,
        id: Uuid,
        loaded: Result<Vec<VocabularyEntry>, StudyError>,
    ) -> Result<SessionView, ApiError> {
        let mut slots = self.lock()?;
        let slot = slots.get_mut(&id).ok_or(ApiError::SessionNotFound(id))?;

        let scheduler = TokioScheduler::new(id, self.timer_tx.clone());
        let started = loaded.and_then(|entries| {
            HostedSession::start(slot.request.kind, entries, self.config, scheduler)
        });
        match &started {
            Ok(_) => {
                let mode = slot.request.kind.mode();
                tracing::info!(session_id = %id, set_id = %slot.request.set_id, mode, "session ready");
                metrics::record_session_started(mode);
            }
            Err(err) => {
                tracing::warn!(session_id = %id, %err, "session failed to load");
            }
        }

        slot.state = started.into();
        slot.last_active = Instant::now();
        Ok(slot.view(id))
    }

    /// Put a failed slot back into `loading` and hand out what to load.
    pub fn begin_reload(&self, id: Uuid) -> Result<SessionRequest, ApiError> {
        let mut slots = self.lock()?;
        let slot = slots.get_mut(&id).ok_or(ApiError::SessionNotFound(id))?;
        if !matches!(slot.state, LoadState::Failed(_)) {
            return Err(ApiError::NotReloadable(id));
        }
        slot.state = LoadState::Loading;
        slot.last_active = Instant::now();
        Ok(slot.request)
    }

    /// Render a session. Reading counts as activity for the idle sweep.
    pub fn view(&self, id: Uuid) -> Result<SessionView, ApiError> {
        let mut slots = self.lock()?;
        let slot = slots.get_mut(&id).ok_or(ApiError::SessionNotFound(id))?;
        slot.last_active = Instant::now();
        Ok(slot.view(id))
    }

    /// Run `f` against a ready session.
    pub fn with_ready<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut HostedSession) -> Result<T, StudyError>,
    ) -> Result<T, ApiError> {
        let mut slots = self.lock()?;
        let slot = slots.get_mut(&id).ok_or(ApiError::SessionNotFound(id))?;
        slot.last_active = Instant::now();
        match &mut slot.state {
            LoadState::Loading => Err(ApiError::SessionLoading(id)),
            LoadState::Failed(err) => Err(ApiError::Study(err.clone())),
            LoadState::Ready(session) => Ok(f(session)?),
        }
    }

    /// Tear a session down and forget it.
    pub fn remove(&self, id: Uuid) -> Result<(), ApiError> {
        let mut slot = self
            .lock()?
            .remove(&id)
            .ok_or(ApiError::SessionNotFound(id))?;
        if let Some(session) = slot.state.ready_mut() {
            session.study_mut().teardown();
        }
        tracing::info!(session_id = %id, "session ended");
        Ok(())
    }

    /// Deliver a fired timer to its session.
    pub fn fire(&self, fired: TimerFired) {
        let Ok(mut slots) = self.lock() else {
            return;
        };
        let Some(session) = slots
            .get_mut(&fired.session_id)
            .and_then(|slot| slot.state.ready_mut())
        else {
            return;
        };
        if !session.study_mut().fire(fired.timer) {
            tracing::trace!(session_id = %fired.session_id, timer = fired.timer.0, "stale timer ignored");
        }
    }

    /// Tear down sessions untouched for `max_idle`. Returns how many went.
    ///
    /// Slots still loading are left alone; their load owns them until it completes.
    pub fn sweep_idle(&self, max_idle: Duration) -> usize {
        let Ok(mut slots) = self.lock() else {
            return 0;
        };
        let mut expired: Vec<_> = slots
            .extract_if(|_, slot| {
                !matches!(slot.state, LoadState::Loading) && slot.last_active.elapsed() >= max_idle
            })
            .collect();
        drop(slots);

        for (id, slot) in &mut expired {
            if let Some(session) = slot.state.ready_mut() {
                session.study_mut().teardown();
            }
            tracing::info!(session_id = %id, "idle session swept");
        }
        expired.len()
    }
}

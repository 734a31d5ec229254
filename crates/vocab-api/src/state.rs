use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver};
use vocab_study::{StudyConfig, VocabularyRepository};

use crate::{
    ApiConfig,
    study::{SessionRegistry, TimerFired},
};

#[derive(Clone)]
pub struct ApiState {
    pub repo: Arc<dyn VocabularyRepository>,
    pub registry: SessionRegistry,
}

impl ApiState {
    /// Build the state together with the receiving end of the session timers,
    /// which the timer dispatcher job consumes.
    pub fn new(
        repo: Arc<dyn VocabularyRepository>,
        study: StudyConfig,
        max_sessions: usize,
    ) -> (Self, UnboundedReceiver<TimerFired>) {
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let state = Self {
            repo,
            registry: SessionRegistry::new(timer_tx, study, max_sessions),
        };
        (state, timer_rx)
    }

    pub fn from_config(
        config: &ApiConfig,
        repo: Arc<dyn VocabularyRepository>,
    ) -> (Self, UnboundedReceiver<TimerFired>) {
        Self::new(repo, config.study_config(), config.max_sessions)
    }
}

impl std::fmt::Debug for ApiState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiState")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

//! Core engine for adaptive vocabulary study sessions.
//!
//! The crate turns a vocabulary set into question sequences and drives the
//! two session kinds over them:
//!
//! - [`LearnSession`]: quiz, review and spelling phases over two halves of
//!   the set, asking missed questions again until every one is answered
//!   correctly
//! - [`ComprehensiveSession`]: one pass over the whole set with alternating
//!   multiple-choice and spelling questions, followed by an optional retry of
//!   the missed entries
//!
//! Randomness ([`StudyRng`]) and delayed transitions ([`Scheduler`]) are
//! injected, so a session driven by a seeded RNG and a [`ManualScheduler`]
//! is fully deterministic. Nothing here performs I/O apart from the
//! [`VocabularyRepository`] seam used by [`load_entries`].

pub mod answer;
pub mod config;
pub mod entry;
pub mod error;
pub mod generator;
pub mod loader;
pub mod question;
pub mod rng;
pub mod scheduler;
pub mod session;

pub use answer::AnswerMatcher;
pub use config::{FeedbackDelays, HintPenalty, StudyConfig};
pub use entry::{Direction, Language, VocabularyEntry};
pub use error::{RepositoryError, StudyError};
pub use generator::{EntryOrder, KindPolicy, QuestionRequest, generate};
pub use loader::{InMemoryRepository, LoadState, VocabularyRepository, load_entries};
pub use question::{Pass, Question, QuestionId, QuestionKind};
pub use rng::{InOrder, StudyRng};
pub use scheduler::{CancelHandle, ManualScheduler, Scheduler, TimerId};
pub use session::{
    AnswerOutcome, AnswerRecord, ComprehensiveOptions, ComprehensiveSession, LearnOptions,
    LearnSession, Phase, PhaseKind, PhaseScores, Score, ScoreSummary, SoundCue, Stage, StudyMode,
    StudySession,
};

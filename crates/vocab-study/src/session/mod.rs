//! Study session state machines and the bookkeeping they share.
//!
//! - `learn`: multi-phase quiz / review / spelling with retry-until-correct
//! - `comprehensive`: one alternating pass with retry-of-incorrect afterwards
//! - `split`: which slice of the set each Learn phase works on

pub mod comprehensive;
pub mod learn;
pub mod split;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::StudyError,
    question::{Question, QuestionKind},
    scheduler::TimerId,
};

pub use comprehensive::{ComprehensiveOptions, ComprehensiveSession, Stage};
pub use learn::{LearnOptions, LearnSession};
pub use split::split_for_phase;

/// Stages of a Learn session, in path order for the mixed mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Quiz1,
    Review1,
    Spell1,
    Quiz2,
    Review2,
    Spell2,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Quiz,
    Review,
    Spell,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Half {
    First,
    Second,
}

impl Phase {
    pub const fn kind(self) -> PhaseKind {
        match self {
            Self::Quiz1 | Self::Quiz2 => PhaseKind::Quiz,
            Self::Review1 | Self::Review2 => PhaseKind::Review,
            Self::Spell1 | Self::Spell2 => PhaseKind::Spell,
            Self::Completed => PhaseKind::Completed,
        }
    }

    /// Which half of the set the phase belongs to; `None` once completed.
    pub const fn half(self) -> Option<Half> {
        match self {
            Self::Quiz1 | Self::Review1 | Self::Spell1 => Some(Half::First),
            Self::Quiz2 | Self::Review2 | Self::Spell2 => Some(Half::Second),
            Self::Completed => None,
        }
    }

    pub const fn first(mode: StudyMode) -> Self {
        match mode {
            StudyMode::Mixed | StudyMode::QuizOnly => Self::Quiz1,
            StudyMode::SpellOnly => Self::Spell1,
        }
    }

    /// Successor on the path `mode` follows.
    pub const fn next(self, mode: StudyMode) -> Self {
        match (mode, self) {
            (StudyMode::Mixed, Self::Quiz1) => Self::Review1,
            (StudyMode::Mixed, Self::Review1) => Self::Spell1,
            (StudyMode::Mixed, Self::Spell1) => Self::Quiz2,
            (StudyMode::Mixed, Self::Quiz2) => Self::Review2,
            (StudyMode::Mixed, Self::Review2) => Self::Spell2,
            (StudyMode::QuizOnly, Self::Quiz1) => Self::Quiz2,
            _ => Self::Completed,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quiz1 => "quiz1",
            Self::Review1 => "review1",
            Self::Spell1 => "spell1",
            Self::Quiz2 => "quiz2",
            Self::Review2 => "review2",
            Self::Spell2 => "spell2",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Learn-mode restriction chosen before the session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyMode {
    #[default]
    Mixed,
    QuizOnly,
    SpellOnly,
}

impl StudyMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mixed => "mixed",
            Self::QuizOnly => "quiz_only",
            Self::SpellOnly => "spell_only",
        }
    }
}

/// Correct answers out of answers given. `correct <= total` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    pub correct: u32,
    pub total: u32,
}

impl Score {
    pub(crate) const fn record(&mut self, is_correct: bool) {
        self.total += 1;
        if is_correct {
            self.correct += 1;
        }
    }

    /// Fraction in `0.0..=1.0`; an empty score counts as zero.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(self.total)
        }
    }

    pub const fn merge(self, other: Self) -> Self {
        Self {
            correct: self.correct + other.correct,
            total: self.total + other.total,
        }
    }
}

/// Per-phase tallies of a Learn session. Review phases carry no score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PhaseScores {
    pub quiz1: Score,
    pub spell1: Score,
    pub quiz2: Score,
    pub spell2: Score,
}

impl PhaseScores {
    pub const fn get(&self, phase: Phase) -> Option<&Score> {
        match phase {
            Phase::Quiz1 => Some(&self.quiz1),
            Phase::Spell1 => Some(&self.spell1),
            Phase::Quiz2 => Some(&self.quiz2),
            Phase::Spell2 => Some(&self.spell2),
            Phase::Review1 | Phase::Review2 | Phase::Completed => None,
        }
    }

    pub(crate) const fn get_mut(&mut self, phase: Phase) -> Option<&mut Score> {
        match phase {
            Phase::Quiz1 => Some(&mut self.quiz1),
            Phase::Spell1 => Some(&mut self.spell1),
            Phase::Quiz2 => Some(&mut self.quiz2),
            Phase::Spell2 => Some(&mut self.spell2),
            Phase::Review1 | Phase::Review2 | Phase::Completed => None,
        }
    }

    pub const fn overall(&self) -> Score {
        self.quiz1
            .merge(self.spell1)
            .merge(self.quiz2)
            .merge(self.spell2)
    }
}

/// One submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_index: usize,
    pub submitted_text: String,
    pub is_correct: bool,
    pub time_spent_ms: u64,
    pub hinted: bool,
    pub answered_at: DateTime<Utc>,
    pub question: Question,
}

/// Sound the presentation layer plays alongside feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    Correct,
    Incorrect,
}

/// Result of an accepted submission, shown until the session advances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub correct_answer: String,
    pub cue: SoundCue,
}

impl AnswerOutcome {
    pub(crate) fn new(is_correct: bool, correct_answer: &str) -> Self {
        Self {
            is_correct,
            correct_answer: correct_answer.to_string(),
            cue: if is_correct {
                SoundCue::Correct
            } else {
                SoundCue::Incorrect
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScoreSummary {
    Learn {
        overall: Score,
        phases: PhaseScores,
        hints_used: u32,
    },
    Comprehensive {
        overall: Score,
        multiple_choice: Score,
        spelling: Score,
    },
}

impl ScoreSummary {
    pub const fn overall(&self) -> Score {
        match self {
            Self::Learn { overall, .. } | Self::Comprehensive { overall, .. } => *overall,
        }
    }
}

/// The operations a presentation layer drives, common to both session kinds.
pub trait StudySession {
    fn current_question(&self) -> Option<&Question>;

    fn submit_answer(&mut self, text: &str) -> Result<AnswerOutcome, StudyError>;

    /// Explicit "continue": leaves a review phase or skips the feedback wait.
    fn advance(&mut self) -> Result<(), StudyError>;

    /// Deliver a timer scheduled by this session. Returns whether it was honoured.
    fn fire(&mut self, timer: TimerId) -> bool;

    fn feedback(&self) -> Option<&AnswerOutcome>;

    fn score_summary(&self) -> ScoreSummary;

    fn is_finished(&self) -> bool;

    /// Start over from the full item list with fresh randomization.
    fn restart(&mut self) -> Result<(), StudyError>;

    /// Cancel anything pending. The session ignores every timer afterwards.
    fn teardown(&mut self);
}

/// Tallies by question kind over a sequence of answers.
pub(crate) fn score_by_kind<'a>(
    answers: impl IntoIterator<Item = &'a AnswerRecord>,
    kind: Option<QuestionKind>,
) -> Score {
    let mut score = Score::default();
    for answer in answers {
        if kind.is_none_or(|k| answer.question.kind == k) {
            score.record(answer.is_correct);
        }
    }
    score
}

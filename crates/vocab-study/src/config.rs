use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::answer::AnswerMatcher;

/// What a hint costs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintPenalty {
    /// Hinted answers are scored like any other.
    #[default]
    None,
    /// A hinted answer is scored and requeued as if it were wrong.
    TreatAsIncorrect,
}

/// How long answer feedback stays on screen before the session moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackDelays {
    pub learn_correct_ms: u64,
    pub learn_incorrect_ms: u64,
    pub comprehensive_ms: u64,
}

impl FeedbackDelays {
    pub const fn learn(&self, is_correct: bool) -> Duration {
        if is_correct {
            Duration::from_millis(self.learn_correct_ms)
        } else {
            Duration::from_millis(self.learn_incorrect_ms)
        }
    }

    pub const fn comprehensive(&self) -> Duration {
        Duration::from_millis(self.comprehensive_ms)
    }
}

impl Default for FeedbackDelays {
    fn default() -> Self {
        Self {
            learn_correct_ms: 1000,
            learn_incorrect_ms: 2000,
            comprehensive_ms: 1000,
        }
    }
}

/// Engine-wide settings shared by every session a host creates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyConfig {
    #[serde(default)]
    pub feedback: FeedbackDelays,
    #[serde(default)]
    pub hint_penalty: HintPenalty,
    #[serde(default)]
    pub matcher: AnswerMatcher,
}

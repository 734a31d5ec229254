use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use vocab_study::{
    AnswerOutcome, Direction, Phase, Question, QuestionKind, ScoreSummary, Stage, StudyMode,
    VocabularyEntry,
};

use crate::error::ErrorBody;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct StartLearnRequest {
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub mode: StudyMode,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct StartComprehensiveRequest {
    #[serde(default)]
    pub direction: Direction,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnswerRequest {
    #[validate(length(max = 200, message = "answer must be at most 200 characters"))]
    pub text: String,
}

/// A question as shown to the learner; the expected answer stays server side.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: String,
    pub prompt: String,
    pub kind: QuestionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub direction: Direction,
    /// BCP 47 tag for speaking the prompt aloud
    pub prompt_speech: &'static str,
    pub phonetic: Option<String>,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id.to_string(),
            prompt: question.prompt.clone(),
            kind: question.kind,
            options: question.options.clone(),
            direction: question.direction,
            prompt_speech: question.direction.prompt_language().speech_tag(),
            phonetic: question.source_entry.phonetic.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Progress {
    /// Zero based position of the current question
    pub index: usize,
    pub total: usize,
}

/// Everything a client needs to render a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub set_id: Uuid,
    pub mode: &'static str,
    /// `loading`, `failed` or `ready`
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    pub round: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<AnswerOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<Vec<VocabularyEntry>>,
    pub finished: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HintResponse {
    pub hint: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreResponse {
    pub accuracy: f64,
    #[serde(flatten)]
    pub summary: ScoreSummary,
}

impl From<ScoreSummary> for ScoreResponse {
    fn from(summary: ScoreSummary) -> Self {
        Self {
            accuracy: summary.overall().accuracy(),
            summary,
        }
    }
}

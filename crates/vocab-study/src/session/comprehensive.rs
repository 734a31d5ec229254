//! Comprehensive mode: one pass over the whole set with alternating question
//! kinds, then a result screen from which the learner can retry what they
//! missed or start over.

use std::{collections::HashSet, time::Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{
    AnswerOutcome, AnswerRecord, ScoreSummary, StudySession, learn::usable_entries, score_by_kind,
};
use crate::{
    Direction, VocabularyEntry,
    config::StudyConfig,
    error::StudyError,
    generator::{EntryOrder, KindPolicy, QuestionRequest, generate},
    question::{Pass, Question, QuestionKind},
    rng::StudyRng,
    scheduler::{CancelHandle, Scheduler, TimerId},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComprehensiveOptions {
    #[serde(default)]
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Answering,
    Feedback,
    ShowResult,
}

#[derive(Debug)]
pub struct ComprehensiveSession<R: StudyRng, S: Scheduler> {
    /// The full set, kept for restarts and used as the distractor pool.
    entries: Vec<VocabularyEntry>,
    options: ComprehensiveOptions,
    config: StudyConfig,
    rng: R,
    scheduler: S,
    /// Items of the current pass.
    items: Vec<VocabularyEntry>,
    questions: Vec<Question>,
    current_index: usize,
    answers: Vec<AnswerRecord>,
    stage: Stage,
    feedback: Option<AnswerOutcome>,
    pending: Option<(TimerId, CancelHandle)>,
    round: u32,
    next_timer: u64,
    torn_down: bool,
    shown_at: Instant,
}

impl<R: StudyRng, S: Scheduler> ComprehensiveSession<R, S> {
    pub fn start(
        entries: Vec<VocabularyEntry>,
        options: ComprehensiveOptions,
        config: StudyConfig,
        rng: R,
        scheduler: S,
    ) -> Result<Self, StudyError> {
        let entries = usable_entries(entries)?;

        let mut session = Self {
            items: Vec::new(),
            entries,
            options,
            config,
            rng,
            scheduler,
            questions: Vec::new(),
            current_index: 0,
            answers: Vec::new(),
            stage: Stage::Answering,
            feedback: None,
            pending: None,
            round: 0,
            next_timer: 0,
            torn_down: false,
            shown_at: Instant::now(),
        };
        session.begin_pass(session.entries.clone(), 0)?;

        tracing::info!(items = session.entries.len(), "comprehensive session started");
        Ok(session)
    }

    pub const fn stage(&self) -> Stage {
        self.stage
    }

    pub const fn options(&self) -> ComprehensiveOptions {
        self.options
    }

    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }

    /// Entries the current pass is asking about.
    pub fn items(&self) -> &[VocabularyEntry] {
        &self.items
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    /// Retry passes taken since the last start or restart.
    pub const fn round(&self) -> u32 {
        self.round
    }

    pub fn incorrect_count(&self) -> usize {
        self.answers.iter().filter(|a| !a.is_correct).count()
    }

    pub const fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub const fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Start a new pass over the entries answered incorrectly in this one.
    pub fn retry_incorrect(&mut self) -> Result<(), StudyError> {
        self.ensure_live()?;
        if self.stage != Stage::ShowResult {
            return Err(StudyError::InvalidTransition(
                "retry is only available once the pass is finished",
            ));
        }

        let mut seen = HashSet::new();
        let missed: Vec<_> = self
            .answers
            .iter()
            .filter(|a| !a.is_correct)
            .map(|a| &a.question.source_entry)
            .filter(|entry| seen.insert(entry.id))
            .cloned()
            .collect();
        if missed.is_empty() {
            return Err(StudyError::NothingToRetry);
        }

        tracing::debug!(missed = missed.len(), round = self.round + 1, "retrying incorrect");
        self.cancel_pending();
        self.begin_pass(missed, self.round + 1)
    }

    fn ensure_live(&self) -> Result<(), StudyError> {
        if self.torn_down {
            return Err(StudyError::InvalidTransition("session has been torn down"));
        }
        Ok(())
    }

    fn begin_pass(&mut self, items: Vec<VocabularyEntry>, round: u32) -> Result<(), StudyError> {
        let questions = generate(
            &QuestionRequest {
                entries: &items,
                pool: &self.entries,
                direction: self.options.direction,
                kinds: KindPolicy::Alternating,
                order: EntryOrder::Shuffled,
                pass: Pass::Comprehensive { round },
            },
            &mut self.rng,
        )?;

        self.items = items;
        self.questions = questions;
        self.current_index = 0;
        self.answers.clear();
        self.stage = Stage::Answering;
        self.feedback = None;
        self.round = round;
        self.shown_at = Instant::now();
        Ok(())
    }

    fn proceed(&mut self) {
        self.feedback = None;
        self.current_index += 1;
        if self.current_index < self.questions.len() {
            self.stage = Stage::Answering;
            self.shown_at = Instant::now();
        } else {
            self.stage = Stage::ShowResult;
            tracing::info!(
                correct = self.answers.len() - self.incorrect_count(),
                total = self.answers.len(),
                round = self.round,
                "comprehensive pass finished"
            );
        }
    }

    fn cancel_pending(&mut self) {
        if let Some((_, handle)) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
    }
}

impl<R: StudyRng, S: Scheduler> StudySession for ComprehensiveSession<R, S> {
    fn current_question(&self) -> Option<&Question> {
        match self.stage {
            Stage::Answering | Stage::Feedback => self.questions.get(self.current_index),
            Stage::ShowResult => None,
        }
    }

    fn submit_answer(&mut self, text: &str) -> Result<AnswerOutcome, StudyError> {
        self.ensure_live()?;
        match self.stage {
            Stage::Answering => {}
            Stage::Feedback => return Err(StudyError::FeedbackPending),
            Stage::ShowResult => {
                return Err(StudyError::NoActiveQuestion("show_result".to_string()));
            }
        }
        let question = self
            .questions
            .get(self.current_index)
            .cloned()
            .ok_or_else(|| StudyError::NoActiveQuestion("answering".to_string()))?;
        let is_correct = question.evaluate(text, &self.config.matcher)?;
        let outcome = AnswerOutcome::new(is_correct, &question.correct_answer);

        self.answers.push(AnswerRecord {
            question_index: self.current_index,
            submitted_text: text.to_string(),
            is_correct,
            time_spent_ms: u64::try_from(self.shown_at.elapsed().as_millis()).unwrap_or(u64::MAX),
            hinted: false,
            answered_at: Utc::now(),
            question,
        });
        self.feedback = Some(outcome.clone());
        self.stage = Stage::Feedback;

        self.next_timer += 1;
        let timer = TimerId(self.next_timer);
        let handle = self
            .scheduler
            .schedule_once(self.config.feedback.comprehensive(), timer);
        self.pending = Some((timer, handle));

        Ok(outcome)
    }

    fn advance(&mut self) -> Result<(), StudyError> {
        self.ensure_live()?;
        match self.stage {
            Stage::Feedback => {
                self.cancel_pending();
                self.proceed();
                Ok(())
            }
            Stage::Answering => Err(StudyError::InvalidTransition(
                "the current question has not been answered",
            )),
            Stage::ShowResult => Err(StudyError::InvalidTransition(
                "the pass is finished; restart or retry instead",
            )),
        }
    }

    fn fire(&mut self, timer: TimerId) -> bool {
        if self.torn_down {
            return false;
        }
        match self.pending {
            Some((pending, _)) if pending == timer => {
                self.pending = None;
                self.proceed();
                true
            }
            _ => false,
        }
    }

    fn feedback(&self) -> Option<&AnswerOutcome> {
        self.feedback.as_ref()
    }

    fn score_summary(&self) -> ScoreSummary {
        ScoreSummary::Comprehensive {
            overall: score_by_kind(&self.answers, None),
            multiple_choice: score_by_kind(&self.answers, Some(QuestionKind::MultipleChoice)),
            spelling: score_by_kind(&self.answers, Some(QuestionKind::Spelling)),
        }
    }

    fn is_finished(&self) -> bool {
        self.stage == Stage::ShowResult
    }

    fn restart(&mut self) -> Result<(), StudyError> {
        self.ensure_live()?;
        self.cancel_pending();
        self.begin_pass(self.entries.clone(), 0)?;
        tracing::debug!("comprehensive session restarted");
        Ok(())
    }

    fn teardown(&mut self) {
        self.cancel_pending();
        self.torn_down = true;
    }
}

impl<R: StudyRng, S: Scheduler> Drop for ComprehensiveSession<R, S> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

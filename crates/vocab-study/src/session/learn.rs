//! Learn mode: quiz, review and spelling phases over two halves of a set.
//!
//! A question phase only ends once every question in it has been answered
//! correctly. Whatever was missed is asked again, in its original order,
//! until nothing is left. Review phases are pauses that show the half's
//! vocabulary and wait for an explicit continue.

use std::{collections::BTreeSet, time::Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{
    AnswerOutcome, AnswerRecord, Phase, PhaseKind, PhaseScores, ScoreSummary, StudyMode,
    StudySession, split_for_phase,
};
use crate::{
    Direction, VocabularyEntry,
    config::{HintPenalty, StudyConfig},
    error::StudyError,
    generator::{EntryOrder, KindPolicy, QuestionRequest, generate},
    question::{Pass, Question, QuestionKind},
    rng::StudyRng,
    scheduler::{CancelHandle, Scheduler, TimerId},
};

/// What the learner picks before a Learn session starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnOptions {
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub mode: StudyMode,
}

#[derive(Debug)]
struct LearnState {
    phase: Phase,
    questions: Vec<Question>,
    current_index: usize,
    answers: Vec<AnswerRecord>,
    incorrect: BTreeSet<usize>,
    scores: PhaseScores,
    /// Requeue rounds completed in the current phase.
    round: u32,
    feedback: Option<AnswerOutcome>,
    pending: Option<(TimerId, CancelHandle)>,
    hinted: bool,
    hints_used: u32,
    shown_at: Instant,
}

impl LearnState {
    fn new() -> Self {
        Self {
            phase: Phase::Quiz1,
            questions: Vec::new(),
            current_index: 0,
            answers: Vec::new(),
            incorrect: BTreeSet::new(),
            scores: PhaseScores::default(),
            round: 0,
            feedback: None,
            pending: None,
            hinted: false,
            hints_used: 0,
            shown_at: Instant::now(),
        }
    }
}

#[derive(Debug)]
pub struct LearnSession<R: StudyRng, S: Scheduler> {
    entries: Vec<VocabularyEntry>,
    options: LearnOptions,
    config: StudyConfig,
    rng: R,
    scheduler: S,
    state: LearnState,
    next_timer: u64,
    torn_down: bool,
}

impl<R: StudyRng, S: Scheduler> LearnSession<R, S> {
    /// Start a session over `entries`, which also serve as the distractor pool.
    pub fn start(
        entries: Vec<VocabularyEntry>,
        options: LearnOptions,
        config: StudyConfig,
        rng: R,
        scheduler: S,
    ) -> Result<Self, StudyError> {
        let entries = usable_entries(entries)?;

        let mut session = Self {
            entries,
            options,
            config,
            rng,
            scheduler,
            state: LearnState::new(),
            next_timer: 0,
            torn_down: false,
        };
        session.enter_phase(Phase::first(options.mode))?;

        tracing::info!(
            items = session.entries.len(),
            mode = options.mode.as_str(),
            "learn session started"
        );
        Ok(session)
    }

    pub const fn phase(&self) -> Phase {
        self.state.phase
    }

    pub const fn options(&self) -> LearnOptions {
        self.options
    }

    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }

    pub fn questions(&self) -> &[Question] {
        &self.state.questions
    }

    pub const fn current_index(&self) -> usize {
        self.state.current_index
    }

    /// Answers of the current pass. Cleared whenever the pass is replaced.
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.state.answers
    }

    pub const fn incorrect_indices(&self) -> &BTreeSet<usize> {
        &self.state.incorrect
    }

    pub const fn scores(&self) -> &PhaseScores {
        &self.state.scores
    }

    pub const fn round(&self) -> u32 {
        self.state.round
    }

    pub const fn hints_used(&self) -> u32 {
        self.state.hints_used
    }

    pub const fn is_showing_feedback(&self) -> bool {
        self.state.feedback.is_some()
    }

    pub const fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub const fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// The half being reviewed, only while in a review phase.
    pub fn review_entries(&self) -> Option<&[VocabularyEntry]> {
        (self.state.phase.kind() == PhaseKind::Review)
            .then(|| split_for_phase(&self.entries, self.state.phase, self.options.mode))
    }

    /// Reveal the first two characters of a spelling answer.
    pub fn hint(&mut self) -> Result<String, StudyError> {
        self.ensure_live()?;
        if self.state.feedback.is_some() {
            return Err(StudyError::FeedbackPending);
        }
        let question = self.active_question()?;
        if question.kind != QuestionKind::Spelling {
            return Err(StudyError::HintUnavailable);
        }
        let hint = question.hint();

        if !self.state.hinted {
            self.state.hinted = true;
            self.state.hints_used += 1;
        }
        Ok(hint)
    }

    fn ensure_live(&self) -> Result<(), StudyError> {
        if self.torn_down {
            return Err(StudyError::InvalidTransition("session has been torn down"));
        }
        Ok(())
    }

    fn active_question(&self) -> Result<&Question, StudyError> {
        self.current_question()
            .ok_or_else(|| StudyError::NoActiveQuestion(self.state.phase.to_string()))
    }

    /// Move to `phase`, skipping any phase whose half is empty.
    fn enter_phase(&mut self, mut phase: Phase) -> Result<(), StudyError> {
        let mode = self.options.mode;
        loop {
            let items = split_for_phase(&self.entries, phase, mode);
            if phase != Phase::Completed && items.is_empty() {
                phase = phase.next(mode);
                continue;
            }

            let (kinds, order) = match phase.kind() {
                PhaseKind::Quiz => (KindPolicy::AllMultipleChoice, EntryOrder::AsGiven),
                PhaseKind::Spell => (KindPolicy::AllSpelling, EntryOrder::Shuffled),
                PhaseKind::Review | PhaseKind::Completed => {
                    self.replace_pass(phase, Vec::new());
                    return Ok(());
                }
            };
            let questions = generate(
                &QuestionRequest {
                    entries: items,
                    pool: &self.entries,
                    direction: self.options.direction,
                    kinds,
                    order,
                    pass: Pass::Learn { phase },
                },
                &mut self.rng,
            )?;
            self.replace_pass(phase, questions);
            return Ok(());
        }
    }

    fn replace_pass(&mut self, phase: Phase, questions: Vec<Question>) {
        tracing::debug!(%phase, questions = questions.len(), "entering phase");
        let state = &mut self.state;
        state.phase = phase;
        state.questions = questions;
        state.current_index = 0;
        state.answers.clear();
        state.incorrect.clear();
        state.round = 0;
        state.feedback = None;
        state.hinted = false;
        state.shown_at = Instant::now();
    }

    /// Ask the missed questions again, keeping their relative order.
    fn requeue_incorrect(&mut self) {
        let state = &mut self.state;
        let incorrect = std::mem::take(&mut state.incorrect);
        let previous = std::mem::take(&mut state.questions);
        state.questions = previous
            .into_iter()
            .enumerate()
            .filter_map(|(index, question)| incorrect.contains(&index).then_some(question))
            .collect();
        state.current_index = 0;
        state.answers.clear();
        state.round += 1;
        state.shown_at = Instant::now();

        tracing::debug!(
            phase = %state.phase,
            remaining = state.questions.len(),
            round = state.round,
            "requeued incorrect questions"
        );
    }

    /// Leave the feedback state and move to the next question, requeue or phase.
    fn proceed(&mut self) -> Result<(), StudyError> {
        self.state.feedback = None;
        self.state.hinted = false;
        self.state.current_index += 1;

        if self.state.current_index < self.state.questions.len() {
            self.state.shown_at = Instant::now();
            return Ok(());
        }
        if self.state.incorrect.is_empty() {
            let next = self.state.phase.next(self.options.mode);
            self.enter_phase(next)?;
            if next == Phase::Completed {
                let overall = self.state.scores.overall();
                tracing::info!(
                    correct = overall.correct,
                    total = overall.total,
                    "learn session completed"
                );
            }
        } else {
            self.requeue_incorrect();
        }
        Ok(())
    }

    fn schedule_advance(&mut self, is_correct: bool) {
        self.next_timer += 1;
        let timer = TimerId(self.next_timer);
        let handle = self
            .scheduler
            .schedule_once(self.config.feedback.learn(is_correct), timer);
        self.state.pending = Some((timer, handle));
    }

    fn cancel_pending(&mut self) {
        if let Some((_, handle)) = self.state.pending.take() {
            self.scheduler.cancel(handle);
        }
    }
}

impl<R: StudyRng, S: Scheduler> StudySession for LearnSession<R, S> {
    /// `None` during review phases and once completed.
    fn current_question(&self) -> Option<&Question> {
        self.state.questions.get(self.state.current_index)
    }

    fn submit_answer(&mut self, text: &str) -> Result<AnswerOutcome, StudyError> {
        self.ensure_live()?;
        if self.state.feedback.is_some() {
            return Err(StudyError::FeedbackPending);
        }
        let question = self.active_question()?.clone();
        let judged = question.evaluate(text, &self.config.matcher)?;

        let hinted = self.state.hinted;
        let is_correct =
            judged && !(hinted && self.config.hint_penalty == HintPenalty::TreatAsIncorrect);
        let outcome = AnswerOutcome::new(is_correct, &question.correct_answer);

        let state = &mut self.state;
        let index = state.current_index;
        if let Some(score) = state.scores.get_mut(state.phase) {
            score.record(is_correct);
        }
        if !is_correct {
            state.incorrect.insert(index);
        }
        state.answers.push(AnswerRecord {
            question_index: index,
            submitted_text: text.to_string(),
            is_correct,
            time_spent_ms: u64::try_from(state.shown_at.elapsed().as_millis()).unwrap_or(u64::MAX),
            hinted,
            answered_at: Utc::now(),
            question,
        });
        state.feedback = Some(outcome.clone());

        self.schedule_advance(is_correct);
        Ok(outcome)
    }

    fn advance(&mut self) -> Result<(), StudyError> {
        self.ensure_live()?;
        if self.state.feedback.is_some() {
            self.cancel_pending();
            return self.proceed();
        }
        match self.state.phase.kind() {
            PhaseKind::Review => self.enter_phase(self.state.phase.next(self.options.mode)),
            PhaseKind::Completed => Err(StudyError::InvalidTransition(
                "the session is already completed",
            )),
            PhaseKind::Quiz | PhaseKind::Spell => Err(StudyError::InvalidTransition(
                "the current question has not been answered",
            )),
        }
    }

    fn fire(&mut self, timer: TimerId) -> bool {
        if self.torn_down {
            return false;
        }
        match self.state.pending {
            Some((pending, _)) if pending == timer => {
                self.state.pending = None;
                if let Err(err) = self.proceed() {
                    tracing::error!(%err, "failed to advance after feedback");
                }
                true
            }
            _ => false,
        }
    }

    fn feedback(&self) -> Option<&AnswerOutcome> {
        self.state.feedback.as_ref()
    }

    fn score_summary(&self) -> ScoreSummary {
        ScoreSummary::Learn {
            overall: self.state.scores.overall(),
            phases: self.state.scores,
            hints_used: self.state.hints_used,
        }
    }

    fn is_finished(&self) -> bool {
        self.state.phase == Phase::Completed
    }

    fn restart(&mut self) -> Result<(), StudyError> {
        self.ensure_live()?;
        self.cancel_pending();
        self.state = LearnState::new();
        self.enter_phase(Phase::first(self.options.mode))?;
        tracing::debug!("learn session restarted");
        Ok(())
    }

    fn teardown(&mut self) {
        self.cancel_pending();
        self.torn_down = true;
    }
}

impl<R: StudyRng, S: Scheduler> Drop for LearnSession<R, S> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

/// Drop entries missing either side and refuse an empty result.
pub(crate) fn usable_entries(
    entries: Vec<VocabularyEntry>,
) -> Result<Vec<VocabularyEntry>, StudyError> {
    let available = entries.len();
    let usable: Vec<_> = entries.into_iter().filter(VocabularyEntry::is_complete).collect();
    if usable.len() < available {
        tracing::warn!(
            skipped = available - usable.len(),
            "ignoring vocabulary entries with an empty side"
        );
    }
    if usable.is_empty() {
        return Err(StudyError::InsufficientData {
            required: 1,
            available: 0,
        });
    }
    Ok(usable)
}

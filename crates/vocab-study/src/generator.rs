//! Question generation shared by every quiz-like mode.
//!
//! Multiple-choice distractors come from a candidate pool that may be wider
//! than the entries being asked about (Learn mode passes the whole set).
//! Spelling questions ask for the other language than multiple choice does,
//! so one session exercises recall in both directions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    Direction, VocabularyEntry,
    error::StudyError,
    question::{Pass, Question, QuestionId, QuestionKind},
    rng::StudyRng,
};

/// Options shown for a multiple-choice question, correct answer included.
pub const OPTION_COUNT: usize = 4;

/// Which kind each generated question gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindPolicy {
    AllMultipleChoice,
    AllSpelling,
    /// Even positions multiple choice, odd positions spelling.
    Alternating,
}

impl KindPolicy {
    pub const fn kind_at(self, position: usize) -> QuestionKind {
        match self {
            Self::AllMultipleChoice => QuestionKind::MultipleChoice,
            Self::AllSpelling => QuestionKind::Spelling,
            Self::Alternating if position % 2 == 0 => QuestionKind::MultipleChoice,
            Self::Alternating => QuestionKind::Spelling,
        }
    }
}

/// Whether the entry order is randomized before questions are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOrder {
    Shuffled,
    AsGiven,
}

#[derive(Debug, Clone, Copy)]
pub struct QuestionRequest<'a> {
    pub entries: &'a [VocabularyEntry],
    /// Where distractors are drawn from.
    pub pool: &'a [VocabularyEntry],
    pub direction: Direction,
    pub kinds: KindPolicy,
    pub order: EntryOrder,
    pub pass: Pass,
}

/// Turn entries into an ordered list of questions.
///
/// Either the whole list is returned or nothing is: an empty `entries`
/// slice fails with [`StudyError::InsufficientData`] before any question
/// exists.
pub fn generate<R: StudyRng + ?Sized>(
    request: &QuestionRequest<'_>,
    rng: &mut R,
) -> Result<Vec<Question>, StudyError> {
    if request.entries.is_empty() {
        return Err(StudyError::InsufficientData {
            required: 1,
            available: 0,
        });
    }

    let mut entries = request.entries.to_vec();
    if request.order == EntryOrder::Shuffled {
        rng.shuffle(&mut entries);
    }

    let questions = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let kind = request.kinds.kind_at(index);
            build_question(entry, kind, index, request, rng)
        })
        .collect::<Vec<_>>();

    tracing::trace!(
        pass = %request.pass,
        count = questions.len(),
        "generated questions"
    );

    Ok(questions)
}

fn build_question<R: StudyRng + ?Sized>(
    entry: VocabularyEntry,
    kind: QuestionKind,
    index: usize,
    request: &QuestionRequest<'_>,
    rng: &mut R,
) -> Question {
    let direction = match kind {
        QuestionKind::MultipleChoice => request.direction,
        QuestionKind::Spelling => request.direction.reversed(),
    };
    let prompt = direction.prompt_of(&entry).to_string();
    let correct_answer = direction.answer_of(&entry).to_string();

    let options = (kind == QuestionKind::MultipleChoice)
        .then(|| build_options(&correct_answer, request.pool, direction, rng));

    Question {
        id: QuestionId {
            entry: entry.id,
            pass: request.pass,
            index,
        },
        prompt,
        correct_answer,
        kind,
        options,
        direction,
        source_entry: entry,
    }
}

/// Correct answer plus up to three distinct distractors, in random order.
///
/// When the pool has fewer than three other distinct answers the list is
/// simply shorter; nothing is invented to pad it.
pub fn build_options<R: StudyRng + ?Sized>(
    correct: &str,
    pool: &[VocabularyEntry],
    direction: Direction,
    rng: &mut R,
) -> Vec<String> {
    let candidates = distinct_alternatives(correct, pool, direction);
    let mut options = Vec::with_capacity(OPTION_COUNT);
    options.push(correct.to_string());
    options.extend(rng.pick_random(&candidates, OPTION_COUNT - 1));
    rng.shuffle(&mut options);
    options
}

fn distinct_alternatives(correct: &str, pool: &[VocabularyEntry], direction: Direction) -> Vec<String> {
    let mut seen = HashSet::new();
    pool.iter()
        .map(|e| direction.answer_of(e))
        .filter(|answer| *answer != correct && seen.insert(*answer))
        .map(str::to_string)
        .collect()
}

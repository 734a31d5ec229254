use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};

use rand::{SeedableRng, rngs::StdRng};
use vocab_study::{
    ComprehensiveOptions, ComprehensiveSession, Direction, EntryOrder, InOrder, KindPolicy,
    LearnOptions, LearnSession, ManualScheduler, Pass, Phase, Question, QuestionKind,
    QuestionRequest, Score, Stage, StudyConfig, StudyError, StudyMode, StudySession,
    VocabularyEntry, generate,
};

fn words(pairs: &[(&str, &str)]) -> Vec<VocabularyEntry> {
    pairs
        .iter()
        .map(|(en, vi)| VocabularyEntry::new(*en, *vi))
        .collect()
}

fn animals() -> Vec<VocabularyEntry> {
    words(&[
        ("cat", "mèo"),
        ("dog", "chó"),
        ("bird", "chim"),
        ("fish", "cá"),
        ("horse", "ngựa"),
        ("buffalo", "trâu"),
        ("pig", "lợn"),
    ])
}

fn wrong_answer(question: &Question) -> String {
    match &question.options {
        Some(options) => options
            .iter()
            .find(|o| **o != question.correct_answer)
            .expect("question has a distractor")
            .clone(),
        None => format!("{}x", question.correct_answer),
    }
}

/// Submit an answer and let the feedback timer run out.
fn answer_and_wait<S: StudySession>(
    session: &mut S,
    scheduler: impl Fn(&mut S) -> &mut ManualScheduler,
    correct: bool,
) {
    let question = session
        .current_question()
        .expect("a question is active")
        .clone();
    let text = if correct {
        question.correct_answer.clone()
    } else {
        wrong_answer(&question)
    };
    session.submit_answer(&text).expect("answer accepted");

    let fired = scheduler(session).elapse(Duration::from_secs(2));
    assert_eq!(fired.len(), 1);
    assert!(session.fire(fired[0]));
}

fn learn_scheduler<R: vocab_study::StudyRng>(
    s: &mut LearnSession<R, ManualScheduler>,
) -> &mut ManualScheduler {
    s.scheduler_mut()
}

fn comprehensive_scheduler<R: vocab_study::StudyRng>(
    s: &mut ComprehensiveSession<R, ManualScheduler>,
) -> &mut ManualScheduler {
    s.scheduler_mut()
}

#[test]
fn test_learn_all_correct_completes_with_full_scores() {
    let entries = words(&[("cat", "mèo"), ("dog", "chó"), ("bird", "chim"), ("fish", "cá")]);
    let mut session = LearnSession::start(
        entries,
        LearnOptions {
            direction: Direction::EnglishToVietnamese,
            mode: StudyMode::Mixed,
        },
        StudyConfig::default(),
        StdRng::seed_from_u64(7),
        ManualScheduler::new(),
    )
    .expect("session starts");

    let mut visited = vec![session.phase()];
    while !session.is_finished() {
        if session.current_question().is_some() {
            answer_and_wait(&mut session, learn_scheduler, true);
        } else {
            session.advance().expect("review continues");
        }
        if visited.last() != Some(&session.phase()) {
            visited.push(session.phase());
        }
    }

    assert_eq!(
        visited,
        vec![
            Phase::Quiz1,
            Phase::Review1,
            Phase::Spell1,
            Phase::Quiz2,
            Phase::Review2,
            Phase::Spell2,
            Phase::Completed
        ]
    );
    let full = Score { correct: 2, total: 2 };
    let scores = session.scores();
    assert_eq!(scores.quiz1, full);
    assert_eq!(scores.spell1, full);
    assert_eq!(scores.quiz2, full);
    assert_eq!(scores.spell2, full);
    assert!((session.score_summary().overall().accuracy() - 1.0).abs() < f64::EPSILON);
    assert!(session.current_question().is_none());
}

#[test]
fn test_comprehensive_two_items_cross_direction() {
    let mut session = ComprehensiveSession::start(
        words(&[("cat", "mèo"), ("dog", "chó")]),
        ComprehensiveOptions {
            direction: Direction::EnglishToVietnamese,
        },
        StudyConfig::default(),
        InOrder,
        ManualScheduler::new(),
    )
    .expect("session starts");

    let first = &session.questions()[0];
    assert_eq!(first.kind, QuestionKind::MultipleChoice);
    assert_eq!(first.prompt, "cat");
    assert_eq!(first.correct_answer, "mèo");

    let second = &session.questions()[1];
    assert_eq!(second.kind, QuestionKind::Spelling);
    assert_eq!(second.prompt, "chó");
    assert_eq!(second.correct_answer, "dog");

    // free text that is not an offered option is refused without a record
    assert!(matches!(
        session.submit_answer("meo"),
        Err(StudyError::InvalidSubmission(_))
    ));
    assert!(session.answers().is_empty());

    let outcome = session.submit_answer("chó").expect("option accepted");
    assert!(!outcome.is_correct);
    assert_eq!(outcome.correct_answer, "mèo");
    assert_eq!(session.answers().len(), 1);
}

#[test]
fn test_empty_list_rejected_before_any_question() {
    let learn = LearnSession::start(
        Vec::new(),
        LearnOptions::default(),
        StudyConfig::default(),
        InOrder,
        ManualScheduler::new(),
    );
    assert!(matches!(learn, Err(StudyError::InsufficientData { .. })));

    let comprehensive = ComprehensiveSession::start(
        Vec::new(),
        ComprehensiveOptions::default(),
        StudyConfig::default(),
        InOrder,
        ManualScheduler::new(),
    );
    assert!(matches!(
        comprehensive,
        Err(StudyError::InsufficientData { .. })
    ));
}

#[test]
fn test_small_pool_not_padded() {
    let entries = words(&[("cat", "mèo"), ("dog", "chó")]);
    let questions = generate(
        &QuestionRequest {
            entries: &entries[..1],
            pool: &entries,
            direction: Direction::EnglishToVietnamese,
            kinds: KindPolicy::AllMultipleChoice,
            order: EntryOrder::AsGiven,
            pass: Pass::Learn { phase: Phase::Quiz1 },
        },
        &mut StdRng::seed_from_u64(1),
    )
    .expect("questions generated");

    let options = questions[0].options.as_ref().expect("multiple choice");
    assert_eq!(options.len(), 2);
    assert!(options.contains(&"mèo".to_string()));
    assert!(options.contains(&"chó".to_string()));
}

#[test]
fn test_option_integrity_across_seeds() {
    let mut entries = animals();
    // duplicate translation must not show up twice
    entries.push(VocabularyEntry::new("kitty", "mèo"));

    for seed in 0..50 {
        let questions = generate(
            &QuestionRequest {
                entries: &entries,
                pool: &entries,
                direction: Direction::EnglishToVietnamese,
                kinds: KindPolicy::AllMultipleChoice,
                order: EntryOrder::Shuffled,
                pass: Pass::Comprehensive { round: 0 },
            },
            &mut StdRng::seed_from_u64(seed),
        )
        .expect("questions generated");

        for q in &questions {
            let options = q.options.as_ref().expect("multiple choice");
            assert!(options.len() <= 4);
            assert_eq!(
                options.iter().filter(|o| **o == q.correct_answer).count(),
                1
            );
            let distinct: HashSet<_> = options.iter().collect();
            assert_eq!(distinct.len(), options.len());
        }
    }
}

#[test]
fn test_spelling_ignores_case_and_outer_whitespace() {
    let mut session = LearnSession::start(
        animals(),
        LearnOptions {
            direction: Direction::VietnameseToEnglish,
            mode: StudyMode::SpellOnly,
        },
        StudyConfig::default(),
        StdRng::seed_from_u64(3),
        ManualScheduler::new(),
    )
    .expect("session starts");

    let variants: [fn(&str) -> String; 3] = [
        |s| s.to_uppercase(),
        |s| format!("  {s}\t"),
        |s| format!("\n{}", s.to_lowercase()),
    ];
    let mut turn = 0;
    while let Some(q) = session.current_question().cloned() {
        assert_eq!(q.kind, QuestionKind::Spelling);
        let text = variants[turn % variants.len()](&q.correct_answer);
        let outcome = session.submit_answer(&text).expect("answer accepted");
        assert!(outcome.is_correct, "{text:?} should match {:?}", q.correct_answer);
        session.advance().expect("feedback skipped");
        turn += 1;
    }
    assert!(session.is_finished());
}

#[test]
fn test_learn_converges_after_repeated_misses() {
    for seed in 0..10 {
        let entries = animals();
        let mut session = LearnSession::start(
            entries.clone(),
            LearnOptions {
                direction: Direction::EnglishToVietnamese,
                mode: StudyMode::QuizOnly,
            },
            StudyConfig::default(),
            StdRng::seed_from_u64(seed),
            ManualScheduler::new(),
        )
        .expect("session starts");

        let mut misses: HashMap<_, u32> = HashMap::new();
        let mut correct_ids = HashSet::new();
        let mut last = (session.phase(), Score::default());

        while !session.is_finished() {
            let phase = session.phase();
            let q = session.current_question().expect("quiz question").clone();
            let missed = misses.entry(q.source_entry.id).or_default();
            // every item is missed twice before it is answered
            let correct = *missed >= 2;
            if !correct {
                *missed += 1;
            } else {
                correct_ids.insert(q.source_entry.id);
            }
            answer_and_wait(&mut session, learn_scheduler, correct);

            let score = *session.scores().get(phase).expect("quiz phase is scored");
            if last.0 == phase {
                assert!(score.correct >= last.1.correct);
            }
            assert!(score.correct <= score.total);
            if session.phase() != phase {
                assert!(session.incorrect_indices().is_empty());
            }
            last = (phase, score);
        }

        assert_eq!(correct_ids.len(), entries.len());
        let overall = session.scores().overall();
        assert_eq!(overall.correct as usize, entries.len());
        assert_eq!(overall.total as usize, entries.len() * 3);
    }
}

#[test]
fn test_comprehensive_alternates_kinds() {
    for seed in 0..20 {
        let session = ComprehensiveSession::start(
            animals(),
            ComprehensiveOptions::default(),
            StudyConfig::default(),
            StdRng::seed_from_u64(seed),
            ManualScheduler::new(),
        )
        .expect("session starts");

        for (index, q) in session.questions().iter().enumerate() {
            let expected = if index % 2 == 0 {
                QuestionKind::MultipleChoice
            } else {
                QuestionKind::Spelling
            };
            assert_eq!(q.kind, expected);
        }
    }
}

#[test]
fn test_retry_covers_exactly_the_missed_items() {
    let mut session = ComprehensiveSession::start(
        animals(),
        ComprehensiveOptions::default(),
        StudyConfig::default(),
        StdRng::seed_from_u64(11),
        ManualScheduler::new(),
    )
    .expect("session starts");

    let mut missed = HashSet::new();
    let mut turn = 0;
    while session.stage() != Stage::ShowResult {
        let id = session
            .current_question()
            .expect("question active")
            .source_entry
            .id;
        let correct = turn % 3 != 0;
        if !correct {
            missed.insert(id);
        }
        answer_and_wait(&mut session, comprehensive_scheduler, correct);
        turn += 1;
    }
    assert_eq!(session.incorrect_count(), missed.len());

    session.retry_incorrect().expect("retry starts");
    let retried: HashSet<_> = session
        .questions()
        .iter()
        .map(|q| q.source_entry.id)
        .collect();
    assert_eq!(retried, missed);
    assert_eq!(session.questions().len(), missed.len());

    // a clean retry pass leaves nothing to retry
    while session.stage() != Stage::ShowResult {
        answer_and_wait(&mut session, comprehensive_scheduler, true);
    }
    assert_eq!(session.retry_incorrect(), Err(StudyError::NothingToRetry));
}

#[test]
fn test_teardown_mid_feedback_ignores_late_timer() {
    let mut session = ComprehensiveSession::start(
        animals(),
        ComprehensiveOptions::default(),
        StudyConfig::default(),
        StdRng::seed_from_u64(5),
        ManualScheduler::new(),
    )
    .expect("session starts");

    let answer = session
        .current_question()
        .expect("question active")
        .correct_answer
        .clone();
    session.submit_answer(&answer).expect("answer accepted");
    session.teardown();

    assert!(session.scheduler_mut().elapse(Duration::from_secs(5)).is_empty());
    assert_eq!(session.stage(), Stage::Feedback);
}

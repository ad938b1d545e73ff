use std::fs;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use examsim::bank::QuestionBank;
use examsim::bank::loader::{self, BankNotice, BankRequest, BankSource};
use examsim::engine::ledger::Category;
use examsim::engine::percentages::PercentageConfig;
use examsim::session::machine::{AnswerOutcome, ExamMachine, ExamPhase, ExamSettings};
use examsim::session::result::FinishReason;
use examsim::session::timer::TickOutcome;
use examsim::store::{JsonStore, MemoryStore, StoragePort};
use examsim::{ExamError, ValidationError};

const BANK_JSON: &str = r#"[
    {"id": 1, "question": "Capital of France?", "options": ["A) Paris", "B) Rome", "C) Madrid", "D) Berlin"], "correctAnswer": "A"},
    {"id": 2, "question": "2 + 2?", "options": ["A) 3", "B) 4", "C) 5", "D) 22"], "correctAnswer": "B"},
    {"id": 3, "question": "Largest planet?", "options": ["A) Mars", "B) Venus", "C) Jupiter", "D) Earth"], "correctAnswer": "C"},
    {"id": 4, "question": "H2O is?", "options": ["A) Salt", "B) Sugar", "C) Air", "D) Water"], "correctAnswer": "D"},
    {"id": 5, "question": "Opposite of hot?", "options": ["A) Cold", "B) Warm", "C) Wet", "D) Dry"], "correctAnswer": "A"},
    {"id": 6, "question": "Broken entry", "options": ["A) only one"], "correctAnswer": "A"}
]"#;

fn bank() -> QuestionBank {
    QuestionBank::from_json(BANK_JSON).unwrap().bank
}

fn machine_with(store: Box<dyn StoragePort>, seed: u64) -> ExamMachine {
    ExamMachine::new(bank(), store, SmallRng::seed_from_u64(seed))
}

fn settings(count: usize, timer_minutes: Option<u32>) -> ExamSettings {
    ExamSettings {
        question_count: count,
        timer_minutes,
        percentages: PercentageConfig::default(),
    }
}

/// Answer every question correctly by looking up the display letter of the
/// correct option.
fn answer_all_correctly(machine: &mut ExamMachine) {
    let ids: Vec<u32> = machine.session().unwrap().order().to_vec();
    for id in ids {
        let question = machine.bank().get(id).unwrap().clone();
        let display = machine
            .session()
            .unwrap()
            .option_order(id)
            .correct_display_letter(&question);
        assert_eq!(
            machine.select_answer(id, display).unwrap(),
            AnswerOutcome::Correct
        );
    }
}

#[test]
fn invalid_entries_are_skipped_when_parsing() {
    let parsed = QuestionBank::from_json(BANK_JSON).unwrap();
    assert_eq!(parsed.bank.len(), 5);
    assert_eq!(parsed.skipped, 1);
}

#[test]
fn full_exam_scores_sixty() {
    let mut machine = machine_with(Box::new(MemoryStore::new()), 1);
    machine.start(&settings(5, None)).unwrap();
    answer_all_correctly(&mut machine);
    assert!(machine.finish());

    let report = machine.report().unwrap();
    assert_eq!(report.score.correct, 5);
    assert_eq!(report.score.official_score, 60.0);
    assert_eq!(report.score.percentage, 100);
    assert_eq!(report.reason, FinishReason::Manual);
    assert!(report.review.iter().all(|r| r.feedback.is_none()));
    assert_eq!(machine.ledger().breakdown(machine.bank()).count(Category::Correct), 5);
}

#[test]
fn unbalanced_percentages_are_rejected() {
    let mut machine = machine_with(Box::new(MemoryStore::new()), 2);
    let bad = ExamSettings {
        question_count: 3,
        timer_minutes: None,
        percentages: PercentageConfig {
            new: 50,
            incorrect: 30,
            correct: 10,
        },
    };
    let err = machine.start(&bad).unwrap_err();
    assert!(matches!(
        err,
        ExamError::Validation(ValidationError::PercentageTotal { total: 90 })
    ));
    assert!(matches!(machine.phase(), ExamPhase::Configuring));
}

#[test]
fn second_answer_is_ignored() {
    let store = MemoryStore::new();
    let mut machine = machine_with(Box::new(store.clone()), 3);
    machine.start(&settings(2, None)).unwrap();
    let first = machine.answer_current(0).unwrap();
    assert_ne!(first, AnswerOutcome::AlreadyAnswered);
    let saves = store.save_count();

    assert_eq!(machine.answer_current(1).unwrap(), AnswerOutcome::AlreadyAnswered);
    assert_eq!(store.save_count(), saves);
    assert_eq!(machine.session().unwrap().answered_count(), 1);
}

#[test]
fn timer_expiry_finishes_exactly_once() {
    let mut machine = machine_with(Box::new(MemoryStore::new()), 4);
    machine.start(&settings(3, Some(1))).unwrap();
    machine.answer_current(0).unwrap();

    let mut expirations = 0;
    for _ in 0..120 {
        if machine.tick() == TickOutcome::Expired {
            expirations += 1;
        }
    }
    assert_eq!(expirations, 1);
    assert_eq!(machine.attempts().len(), 1);

    let report = machine.report().unwrap();
    assert_eq!(report.reason, FinishReason::TimeUp);
    assert_eq!(report.score.total, 3);
    assert_eq!(report.score.unanswered, 2);
    assert!(!machine.finish());
}

#[test]
fn history_survives_restart_with_json_store() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut machine = machine_with(Box::new(store), 5);
        machine.start(&settings(5, None)).unwrap();
        answer_all_correctly(&mut machine);
        machine.finish();
    }

    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let machine = machine_with(Box::new(store), 6);
    assert_eq!(machine.ledger().len(), 5);
    assert_eq!(machine.ledger().exam_attempts, 1);
    assert_eq!(machine.attempts().len(), 1);
    assert_eq!(machine.attempts()[0].correct, 5);
}

#[test]
fn attempt_history_is_capped() {
    let mut machine = machine_with(Box::new(MemoryStore::new()), 7).with_history_cap(3);
    for _ in 0..5 {
        machine.start(&settings(1, None)).unwrap();
        machine.finish();
        machine.restart();
    }
    assert_eq!(machine.attempts().len(), 3);
    assert_eq!(machine.ledger().exam_attempts, 5);
}

#[test]
fn broken_bank_file_falls_back_to_sample() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bank.json");
    fs::write(&path, "{ not json").unwrap();

    let loaded = loader::load(&BankRequest {
        path: Some(path),
        url: None,
        data_dir: None,
    });
    assert_eq!(loaded.source, BankSource::Fallback);
    assert!(!loaded.bank.is_empty());
    assert!(matches!(
        loaded.notices.as_slice(),
        [BankNotice::FellBack { .. }]
    ));
}

#[test]
fn bank_in_data_dir_is_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(loader::BANK_FILE_NAME), BANK_JSON).unwrap();

    let loaded = loader::load(&BankRequest {
        path: None,
        url: None,
        data_dir: Some(dir.path().to_path_buf()),
    });
    assert!(matches!(loaded.source, BankSource::File(_)));
    assert_eq!(loaded.bank.len(), 5);
    assert_eq!(loaded.notices, vec![BankNotice::Skipped { count: 1 }]);
}

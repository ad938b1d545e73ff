use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bank::{QuestionBank, QuestionId};

/// Past-performance bucket a question falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    New,
    Incorrect,
    Correct,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::New, Category::Incorrect, Category::Correct];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::New => "new",
            Category::Incorrect => "incorrect",
            Category::Correct => "correct",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub answered: bool,
    #[serde(alias = "correct")]
    pub last_correct: bool,
    pub attempts: u32,
    pub correct_count: u32,
}

impl HistoryRecord {
    fn record(&mut self, correct: bool) {
        self.answered = true;
        self.last_correct = correct;
        self.attempts = self.attempts.saturating_add(1);
        if correct {
            self.correct_count = self.correct_count.saturating_add(1);
        }
    }

    pub fn category(&self) -> Category {
        match (self.answered, self.last_correct) {
            (false, _) => Category::New,
            (true, false) => Category::Incorrect,
            (true, true) => Category::Correct,
        }
    }

    pub fn wrong_count(&self) -> u32 {
        self.attempts.saturating_sub(self.correct_count)
    }
}

/// Per-question answer history plus the number of exams ever started.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryLedger {
    #[serde(default)]
    pub exam_attempts: u32,
    #[serde(default)]
    records: BTreeMap<QuestionId, HistoryRecord>,
}

/// Counts shown on the configuration screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LedgerBreakdown {
    pub new: usize,
    pub incorrect: usize,
    pub correct: usize,
    /// Correct answers summed over questions currently in the correct bucket.
    pub total_correct_answers: u32,
    /// Wrong answers summed over questions currently in the incorrect bucket.
    pub total_wrong_answers: u32,
}

impl LedgerBreakdown {
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::New => self.new,
            Category::Incorrect => self.incorrect,
            Category::Correct => self.correct,
        }
    }

    pub fn total(&self) -> usize {
        self.new + self.incorrect + self.correct
    }
}

impl HistoryLedger {
    pub fn record(&self, id: QuestionId) -> Option<&HistoryRecord> {
        self.records.get(&id)
    }

    pub fn category(&self, id: QuestionId) -> Category {
        self.records
            .get(&id)
            .map(HistoryRecord::category)
            .unwrap_or(Category::New)
    }

    /// Record one answer for `id`, creating the record on first use.
    pub fn record_answer(&mut self, id: QuestionId, correct: bool) -> HistoryRecord {
        let record = self.records.entry(id).or_default();
        record.record(correct);
        *record
    }

    pub fn note_exam_started(&mut self) {
        self.exam_attempts = self.exam_attempts.saturating_add(1);
    }

    pub fn reset(&mut self) {
        self.records.clear();
        self.exam_attempts = 0;
    }

    /// Repair records loaded from disk that break `correct_count <= attempts`.
    pub fn normalize(&mut self) {
        for record in self.records.values_mut() {
            record.correct_count = record.correct_count.min(record.attempts);
            if record.attempts == 0 {
                record.answered = false;
                record.last_correct = false;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Category counts over the questions in `bank`. Records for questions that
    /// are no longer in the bank are ignored.
    pub fn breakdown(&self, bank: &QuestionBank) -> LedgerBreakdown {
        let mut out = LedgerBreakdown::default();
        for id in bank.ids() {
            match self.records.get(&id) {
                Some(r) if r.answered && r.last_correct => {
                    out.correct += 1;
                    out.total_correct_answers += r.correct_count;
                }
                Some(r) if r.answered => {
                    out.incorrect += 1;
                    out.total_wrong_answers += r.wrong_count();
                }
                _ => out.new += 1,
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::tests::sample_bank;

    #[test]
    fn test_unknown_question_is_new() {
        let ledger = HistoryLedger::default();
        assert_eq!(ledger.category(42), Category::New);
        assert!(ledger.record(42).is_none());
    }

    #[test]
    fn test_record_answer_updates_counts() {
        let mut ledger = HistoryLedger::default();
        ledger.record_answer(1, false);
        let r = ledger.record_answer(1, true);
        assert_eq!(r.attempts, 2);
        assert_eq!(r.correct_count, 1);
        assert!(r.last_correct);
        assert_eq!(ledger.category(1), Category::Correct);

        ledger.record_answer(1, false);
        assert_eq!(ledger.category(1), Category::Incorrect);
        assert_eq!(ledger.record(1).unwrap().attempts, 3);
    }

    #[test]
    fn test_reset_clears_records_and_attempts() {
        let mut ledger = HistoryLedger::default();
        ledger.record_answer(3, true);
        ledger.note_exam_started();
        ledger.reset();
        assert!(ledger.is_empty());
        assert_eq!(ledger.exam_attempts, 0);
    }

    #[test]
    fn test_breakdown_over_bank() {
        let bank = sample_bank(5);
        let mut ledger = HistoryLedger::default();
        ledger.record_answer(1, true);
        ledger.record_answer(1, true);
        ledger.record_answer(2, false);
        ledger.record_answer(2, false);
        ledger.record_answer(2, true);
        ledger.record_answer(2, false);
        // Not in the bank; ignored.
        ledger.record_answer(99, true);

        let b = ledger.breakdown(&bank);
        assert_eq!((b.new, b.incorrect, b.correct), (3, 1, 1));
        assert_eq!(b.total_correct_answers, 2);
        assert_eq!(b.total_wrong_answers, 3);
        assert_eq!(b.total(), 5);
    }

    #[test]
    fn test_legacy_correct_field_and_normalize() {
        let json = r#"{"exam_attempts": 2, "records": {
            "1": {"answered": true, "correct": true, "attempts": 1, "correct_count": 4},
            "2": {"answered": true, "correct": false, "attempts": 0, "correct_count": 0}
        }}"#;
        let mut ledger: HistoryLedger = serde_json::from_str(json).unwrap();
        ledger.normalize();
        assert_eq!(ledger.record(1).unwrap().correct_count, 1);
        assert_eq!(ledger.category(1), Category::Correct);
        assert_eq!(ledger.category(2), Category::New);
    }

    #[test]
    fn test_breakdown_tolerates_inconsistent_counts() {
        let json = r#"{"records": {
            "1": {"attempts": 1, "correct_count": 4, "answered": true, "last_correct": false}
        }}"#;
        let ledger: HistoryLedger = serde_json::from_str(json).unwrap();
        assert_eq!(ledger.record(1).unwrap().wrong_count(), 0);

        let b = ledger.breakdown(&sample_bank(2));
        assert_eq!((b.new, b.incorrect, b.correct), (1, 1, 0));
        assert_eq!(b.total_wrong_answers, 0);
    }
}

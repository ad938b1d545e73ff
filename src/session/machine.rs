use std::mem;

use rand::rngs::SmallRng;
use tracing::{debug, info, warn};

use crate::bank::{Letter, QuestionBank, QuestionId};
use crate::engine::ledger::{HistoryLedger, LedgerBreakdown};
use crate::engine::percentages::PercentageConfig;
use crate::engine::selection::select_questions;
use crate::error::{ExamError, ValidationError};
use crate::session::exam::ExamSession;
use crate::session::result::{AttemptOverview, AttemptSummary, ExamReport, FinishReason};
use crate::session::timer::TickOutcome;
use crate::store::{AttemptHistoryData, LedgerData, StoragePort};

pub const DEFAULT_HISTORY_CAP: usize = 50;

/// Parameters for one exam.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExamSettings {
    pub question_count: usize,
    /// `None` runs the exam untimed.
    pub timer_minutes: Option<u32>,
    pub percentages: PercentageConfig,
}

impl Default for ExamSettings {
    fn default() -> Self {
        Self {
            question_count: 20,
            timer_minutes: None,
            percentages: PercentageConfig::default(),
        }
    }
}

impl ExamSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.percentages.validate()?;
        if self.question_count == 0 {
            return Err(ValidationError::QuestionCount);
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub enum ExamPhase {
    Configuring,
    InProgress(ExamSession),
    Finished(ExamReport),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
    /// The question already had an answer; nothing changed.
    AlreadyAnswered,
}

/// Owns everything an exam run touches: the bank, the history ledger, the
/// attempt log, the storage port, the RNG and the current phase.
pub struct ExamMachine {
    bank: QuestionBank,
    ledger: HistoryLedger,
    attempts: Vec<AttemptSummary>,
    store: Box<dyn StoragePort>,
    rng: SmallRng,
    phase: ExamPhase,
    history_cap: usize,
}

impl ExamMachine {
    /// Build a machine in `Configuring`, loading history from `store`.
    pub fn new(bank: QuestionBank, store: Box<dyn StoragePort>, rng: SmallRng) -> Self {
        let mut ledger = store.load_ledger().ledger;
        ledger.normalize();
        let attempts = store.load_attempts().attempts;
        debug!(
            records = ledger.len(),
            attempts = attempts.len(),
            "history loaded"
        );
        Self {
            bank,
            ledger,
            attempts,
            store,
            rng,
            phase: ExamPhase::Configuring,
            history_cap: DEFAULT_HISTORY_CAP,
        }
    }

    pub fn with_history_cap(mut self, cap: usize) -> Self {
        self.set_history_cap(cap);
        self
    }

    /// Change the attempt-history cap, dropping the oldest entries if needed.
    pub fn set_history_cap(&mut self, cap: usize) {
        self.history_cap = cap.max(1);
        self.trim_attempts();
    }

    pub fn phase(&self) -> &ExamPhase {
        &self.phase
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn ledger(&self) -> &HistoryLedger {
        &self.ledger
    }

    pub fn attempts(&self) -> &[AttemptSummary] {
        &self.attempts
    }

    pub fn session(&self) -> Option<&ExamSession> {
        match &self.phase {
            ExamPhase::InProgress(session) => Some(session),
            _ => None,
        }
    }

    pub fn report(&self) -> Option<&ExamReport> {
        match &self.phase {
            ExamPhase::Finished(report) => Some(report),
            _ => None,
        }
    }

    pub fn breakdown(&self) -> LedgerBreakdown {
        self.ledger.breakdown(&self.bank)
    }

    pub fn overview(&self) -> AttemptOverview {
        AttemptOverview::from_attempts(&self.attempts)
    }

    /// Select questions and begin an exam. Only legal from `Configuring`; on
    /// error the phase is unchanged.
    pub fn start(&mut self, settings: &ExamSettings) -> Result<(), ExamError> {
        if !matches!(self.phase, ExamPhase::Configuring) {
            return Err(ExamError::NotConfiguring);
        }
        settings.validate()?;
        let order = select_questions(
            &self.bank,
            &self.ledger,
            settings.question_count,
            &settings.percentages,
            &mut self.rng,
        )?;

        let mut session = ExamSession::new(order, settings.timer_minutes, &mut self.rng);
        session.snapshot_categories(&self.ledger);
        self.ledger.note_exam_started();
        self.persist_ledger();
        info!(
            questions = session.len(),
            timer_minutes = ?settings.timer_minutes,
            attempt = self.ledger.exam_attempts,
            "exam started"
        );
        self.phase = ExamPhase::InProgress(session);
        Ok(())
    }

    /// Record the option shown under display letter `display` for question
    /// `id`. Each question takes one answer; later calls report
    /// `AlreadyAnswered` and change nothing.
    pub fn select_answer(
        &mut self,
        id: QuestionId,
        display: Letter,
    ) -> Result<AnswerOutcome, ExamError> {
        let ExamPhase::InProgress(session) = &mut self.phase else {
            return Err(ExamError::NotInProgress);
        };
        let question = self
            .bank
            .get(id)
            .filter(|_| session.contains(id))
            .ok_or(ExamError::UnknownQuestion(id))?;

        let canonical = session.option_order(id).canonical(display);
        if !session.record_answer(id, canonical) {
            return Ok(AnswerOutcome::AlreadyAnswered);
        }
        let correct = canonical == question.correct_answer;
        self.ledger.record_answer(id, correct);
        self.persist_ledger();

        Ok(if correct {
            AnswerOutcome::Correct
        } else {
            AnswerOutcome::Incorrect
        })
    }

    /// Answer the current question by display position (0 = A).
    pub fn answer_current(&mut self, display_index: usize) -> Result<AnswerOutcome, ExamError> {
        let display =
            Letter::from_index(display_index).ok_or(ExamError::OptionOutOfRange(display_index))?;
        let id = self
            .session()
            .and_then(ExamSession::current_id)
            .ok_or(ExamError::NotInProgress)?;
        self.select_answer(id, display)
    }

    pub fn next(&mut self) -> bool {
        self.session_mut().is_some_and(ExamSession::next)
    }

    pub fn prev(&mut self) -> bool {
        self.session_mut().is_some_and(ExamSession::prev)
    }

    pub fn go_to(&mut self, position: usize) -> bool {
        self.session_mut().is_some_and(|s| s.go_to(position))
    }

    /// End the exam now. A no-op unless an exam is in progress.
    pub fn finish(&mut self) -> bool {
        self.finish_with(FinishReason::Manual)
    }

    /// Advance the countdown by one second, finishing the exam when it runs
    /// out. Ticks outside a timed exam are ignored.
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = match self.session_mut().and_then(|s| s.timer.as_mut()) {
            Some(timer) => timer.tick(),
            None => TickOutcome::Inactive,
        };
        if outcome == TickOutcome::Expired {
            info!("time is up");
            self.finish_with(FinishReason::TimeUp);
        }
        outcome
    }

    /// Leave the results screen and discard the report.
    pub fn restart(&mut self) -> bool {
        if matches!(self.phase, ExamPhase::Finished(_)) {
            self.phase = ExamPhase::Configuring;
            true
        } else {
            false
        }
    }

    /// Forget every answer, the attempt counter, and the attempt history.
    pub fn reset_history(&mut self) {
        self.ledger.reset();
        self.attempts.clear();
        self.persist_ledger();
        self.persist_attempts();
        info!("history reset");
    }

    fn session_mut(&mut self) -> Option<&mut ExamSession> {
        match &mut self.phase {
            ExamPhase::InProgress(session) => Some(session),
            _ => None,
        }
    }

    fn finish_with(&mut self, reason: FinishReason) -> bool {
        if !matches!(self.phase, ExamPhase::InProgress(_)) {
            return false;
        }
        let ExamPhase::InProgress(mut session) = mem::replace(&mut self.phase, ExamPhase::Configuring)
        else {
            return false;
        };
        if let Some(timer) = session.timer.as_mut() {
            timer.cancel();
        }

        let report = ExamReport::build(&session, &self.bank, reason, &mut self.rng);
        info!(
            ?reason,
            correct = report.score.correct,
            total = report.score.total,
            score = report.score.official_score,
            "exam finished"
        );
        self.attempts.push(report.summary());
        self.trim_attempts();
        self.persist_attempts();
        self.phase = ExamPhase::Finished(report);
        true
    }

    fn trim_attempts(&mut self) {
        if self.attempts.len() > self.history_cap {
            let excess = self.attempts.len() - self.history_cap;
            self.attempts.drain(..excess);
        }
    }

    fn persist_ledger(&self) {
        let data = LedgerData::new(self.ledger.clone());
        if let Err(e) = self.store.save_ledger(&data) {
            warn!(error = %e, "failed to save answer history");
        }
    }

    fn persist_attempts(&self) {
        let data = AttemptHistoryData::new(self.attempts.clone());
        if let Err(e) = self.store.save_attempts(&data) {
            warn!(error = %e, "failed to save attempt history");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::SeedableRng;

    use super::*;
    use crate::bank::tests::sample_bank;
    use crate::engine::shuffle::OptionOrder;
    use crate::store::MemoryStore;

    fn machine_with(bank: QuestionBank, store: &MemoryStore) -> ExamMachine {
        ExamMachine::new(
            bank,
            Box::new(store.clone()),
            SmallRng::seed_from_u64(21),
        )
    }

    fn settings(count: usize) -> ExamSettings {
        ExamSettings {
            question_count: count,
            ..ExamSettings::default()
        }
    }

    fn correct_display(machine: &ExamMachine, id: QuestionId) -> Letter {
        let session = machine.session().unwrap();
        let question = machine.bank().get(id).unwrap();
        session.option_order(id).correct_display_letter(question)
    }

    #[test]
    fn test_start_rejects_unbalanced_percentages() {
        let store = MemoryStore::new();
        let mut m = machine_with(sample_bank(10), &store);
        let bad = ExamSettings {
            percentages: PercentageConfig {
                new: 50,
                incorrect: 30,
                correct: 10,
            },
            ..settings(5)
        };
        assert_eq!(
            m.start(&bad),
            Err(ExamError::Validation(ValidationError::PercentageTotal {
                total: 90
            }))
        );
        assert!(matches!(m.phase(), ExamPhase::Configuring));
        assert_eq!(m.ledger().exam_attempts, 0);
    }

    #[test]
    fn test_start_rejects_zero_count_and_empty_bank() {
        let store = MemoryStore::new();
        let mut m = machine_with(sample_bank(3), &store);
        assert_eq!(
            m.start(&settings(0)),
            Err(ExamError::Validation(ValidationError::QuestionCount))
        );

        let mut empty = machine_with(QuestionBank::default(), &store);
        assert_eq!(empty.start(&settings(5)), Err(ExamError::EmptyBank));
        assert!(matches!(empty.phase(), ExamPhase::Configuring));
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let store = MemoryStore::new();
        let mut m = machine_with(sample_bank(5), &store);
        m.start(&settings(3)).unwrap();
        assert_eq!(m.start(&settings(3)), Err(ExamError::NotConfiguring));
        assert_eq!(m.session().unwrap().len(), 3);
    }

    #[test]
    fn test_start_counts_attempt_and_persists() {
        let store = MemoryStore::new();
        let mut m = machine_with(sample_bank(5), &store);
        m.start(&settings(5)).unwrap();
        assert_eq!(m.ledger().exam_attempts, 1);
        assert_eq!(store.ledger().ledger.exam_attempts, 1);
    }

    #[test]
    fn test_second_answer_is_ignored() {
        let store = MemoryStore::new();
        let mut m = machine_with(sample_bank(4), &store);
        m.start(&settings(4)).unwrap();
        let id = m.session().unwrap().current_id().unwrap();
        let right = correct_display(&m, id);
        let wrong = Letter::ALL.into_iter().find(|&l| l != right).unwrap();

        assert_eq!(m.select_answer(id, wrong), Ok(AnswerOutcome::Incorrect));
        assert_eq!(m.select_answer(id, right), Ok(AnswerOutcome::AlreadyAnswered));
        assert_eq!(m.select_answer(id, wrong), Ok(AnswerOutcome::AlreadyAnswered));

        let record = m.ledger().record(id).unwrap();
        assert_eq!(record.attempts, 1);
        assert!(!record.last_correct);
        assert_eq!(m.session().unwrap().answer_display(id), Some(wrong));
    }

    #[test]
    fn test_answer_errors() {
        let store = MemoryStore::new();
        let mut m = machine_with(sample_bank(10), &store);
        assert_eq!(m.answer_current(0), Err(ExamError::NotInProgress));
        m.start(&settings(2)).unwrap();
        assert_eq!(m.answer_current(4), Err(ExamError::OptionOutOfRange(4)));
        let outside = (1..=10)
            .find(|id| !m.session().unwrap().contains(*id))
            .unwrap();
        assert_eq!(
            m.select_answer(outside, Letter::A),
            Err(ExamError::UnknownQuestion(outside))
        );
    }

    #[test]
    fn test_full_exam_scores_and_records() {
        let store = MemoryStore::new();
        let mut m = machine_with(sample_bank(5), &store);
        m.start(&settings(5)).unwrap();

        // Answer the first correctly, skip the rest.
        let id = m.session().unwrap().current_id().unwrap();
        let right = correct_display(&m, id);
        assert_eq!(
            m.answer_current(right.index()),
            Ok(AnswerOutcome::Correct)
        );
        assert!(m.next());
        assert!(m.finish());

        let report = m.report().unwrap();
        assert_eq!(report.score.correct, 1);
        assert_eq!(report.score.unanswered, 4);
        assert_eq!(report.score.official_score, 12.0);
        assert_eq!(report.reason, FinishReason::Manual);
        assert_eq!(m.attempts().len(), 1);
        assert_eq!(store.attempts().attempts.len(), 1);
    }

    #[test]
    fn test_finish_outside_exam_is_noop() {
        let store = MemoryStore::new();
        let mut m = machine_with(sample_bank(3), &store);
        assert!(!m.finish());
        m.start(&settings(3)).unwrap();
        assert!(m.finish());
        assert!(!m.finish());
        assert_eq!(m.attempts().len(), 1);
        assert!(!m.next());
    }

    #[test]
    fn test_timer_expiry_finishes_once() {
        let store = MemoryStore::new();
        let mut m = machine_with(sample_bank(3), &store);
        m.start(&ExamSettings {
            timer_minutes: Some(1),
            ..settings(3)
        })
        .unwrap();
        for _ in 0..59 {
            assert!(matches!(m.tick(), TickOutcome::Running(_)));
        }
        assert_eq!(m.tick(), TickOutcome::Expired);
        assert_eq!(m.report().unwrap().reason, FinishReason::TimeUp);
        assert_eq!(m.tick(), TickOutcome::Inactive);
        assert_eq!(m.attempts().len(), 1);
    }

    #[test]
    fn test_untimed_exam_ignores_ticks() {
        let store = MemoryStore::new();
        let mut m = machine_with(sample_bank(3), &store);
        m.start(&settings(3)).unwrap();
        assert_eq!(m.tick(), TickOutcome::Inactive);
        assert!(m.session().is_some());
    }

    #[test]
    fn test_restart_returns_to_configuring() {
        let store = MemoryStore::new();
        let mut m = machine_with(sample_bank(3), &store);
        assert!(!m.restart());
        m.start(&settings(2)).unwrap();
        m.finish();
        assert!(m.restart());
        assert!(matches!(m.phase(), ExamPhase::Configuring));
        m.start(&settings(2)).unwrap();
        assert_eq!(m.ledger().exam_attempts, 2);
    }

    #[test]
    fn test_new_session_reshuffles_options() {
        let store = MemoryStore::new();
        let mut m = machine_with(sample_bank(20), &store);

        m.start(&settings(20)).unwrap();
        let first: HashMap<QuestionId, OptionOrder> = {
            let session = m.session().unwrap();
            session
                .order()
                .iter()
                .map(|&id| (id, session.option_order(id)))
                .collect()
        };
        let session = m.session().unwrap();
        assert!(first.iter().all(|(&id, &o)| session.option_order(id) == o));
        m.finish();
        m.restart();

        m.start(&settings(20)).unwrap();
        let session = m.session().unwrap();
        assert_eq!(session.len(), 20);
        let changed = session
            .order()
            .iter()
            .filter(|&&id| first.get(&id) != Some(&session.option_order(id)))
            .count();
        assert!(changed > 0, "option orders carried over between sessions");
    }

    #[test]
    fn test_history_cap_keeps_most_recent() {
        let store = MemoryStore::new();
        let mut m = machine_with(sample_bank(2), &store).with_history_cap(3);
        for _ in 0..5 {
            m.start(&settings(1)).unwrap();
            m.finish();
            m.restart();
        }
        assert_eq!(m.attempts().len(), 3);
        assert_eq!(store.attempts().attempts.len(), 3);
        m.set_history_cap(1);
        assert_eq!(m.attempts().len(), 1);
    }

    #[test]
    fn test_reset_history_clears_everything() {
        let store = MemoryStore::new();
        let mut m = machine_with(sample_bank(3), &store);
        m.start(&settings(3)).unwrap();
        m.answer_current(0).unwrap();
        m.finish();
        m.restart();

        m.reset_history();
        assert!(m.ledger().is_empty());
        assert_eq!(m.ledger().exam_attempts, 0);
        assert!(m.attempts().is_empty());
        assert!(store.ledger().ledger.is_empty());
        assert_eq!(m.breakdown().new, 3);
    }

    #[test]
    fn test_failing_store_does_not_block() {
        let store = MemoryStore::failing();
        let mut m = machine_with(sample_bank(3), &store);
        m.start(&settings(3)).unwrap();
        m.answer_current(1).unwrap();
        assert!(m.finish());
        assert_eq!(m.attempts().len(), 1);
        assert_eq!(m.ledger().len(), 1);
    }

    #[test]
    fn test_history_is_loaded_from_store() {
        let store = MemoryStore::new();
        {
            let mut m = machine_with(sample_bank(3), &store);
            m.start(&settings(3)).unwrap();
            m.answer_current(0).unwrap();
            m.finish();
        }
        let m = machine_with(sample_bank(3), &store);
        assert_eq!(m.ledger().len(), 1);
        assert_eq!(m.ledger().exam_attempts, 1);
        assert_eq!(m.overview().count, 1);
    }
}

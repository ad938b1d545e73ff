use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::bank::{Letter, QuestionId};
use crate::engine::ledger::{Category, HistoryLedger};
use crate::engine::shuffle::{OptionOrder, OptionShuffler};
use crate::session::timer::Countdown;

/// Working state of one exam. Discarded when the exam finishes; only the
/// aggregate report outlives it.
#[derive(Clone, Debug)]
pub struct ExamSession {
    order: Vec<QuestionId>,
    position: usize,
    /// Canonical letter chosen per question.
    answers: HashMap<QuestionId, Letter>,
    options: OptionShuffler,
    /// Category of each question when the exam began, for the badge.
    categories: HashMap<QuestionId, Category>,
    pub started_at: DateTime<Utc>,
    pub timer: Option<Countdown>,
}

impl ExamSession {
    pub fn new<R: Rng + ?Sized>(
        order: Vec<QuestionId>,
        timer_minutes: Option<u32>,
        rng: &mut R,
    ) -> Self {
        let options = OptionShuffler::for_questions(&order, rng);
        Self {
            order,
            position: 0,
            answers: HashMap::new(),
            options,
            categories: HashMap::new(),
            started_at: Utc::now(),
            timer: timer_minutes.map(Countdown::start),
        }
    }

    pub fn order(&self) -> &[QuestionId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn current_id(&self) -> Option<QuestionId> {
        self.order.get(self.position).copied()
    }

    pub fn is_last(&self) -> bool {
        self.position + 1 >= self.order.len()
    }

    pub fn contains(&self, id: QuestionId) -> bool {
        self.options.get(id).is_some()
    }

    pub fn option_order(&self, id: QuestionId) -> OptionOrder {
        self.options.get(id).unwrap_or_default()
    }

    pub(crate) fn snapshot_categories(&mut self, ledger: &HistoryLedger) {
        self.categories = self
            .order
            .iter()
            .map(|&id| (id, ledger.category(id)))
            .collect();
    }

    pub fn category(&self, id: QuestionId) -> Category {
        self.categories.get(&id).copied().unwrap_or(Category::New)
    }

    pub fn answer(&self, id: QuestionId) -> Option<Letter> {
        self.answers.get(&id).copied()
    }

    /// Display letter the user picked for `id`, if any.
    pub fn answer_display(&self, id: QuestionId) -> Option<Letter> {
        self.answer(id).map(|c| self.option_order(id).display(c))
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// Store the canonical answer for `id`. Returns false if it was already
    /// answered; the first answer stands.
    pub(crate) fn record_answer(&mut self, id: QuestionId, canonical: Letter) -> bool {
        if self.answers.contains_key(&id) {
            return false;
        }
        self.answers.insert(id, canonical);
        true
    }

    pub fn next(&mut self) -> bool {
        self.go_to(self.position + 1)
    }

    pub fn prev(&mut self) -> bool {
        match self.position.checked_sub(1) {
            Some(p) => self.go_to(p),
            None => false,
        }
    }

    /// Jump to `position`, clamped to the exam. Returns whether it moved.
    pub fn go_to(&mut self, position: usize) -> bool {
        let target = position.min(self.order.len().saturating_sub(1));
        let moved = target != self.position;
        self.position = target;
        moved
    }

    /// Fraction of questions answered, 0.0..=1.0.
    pub fn progress(&self) -> f64 {
        if self.order.is_empty() {
            0.0
        } else {
            self.answers.len() as f64 / self.order.len() as f64
        }
    }

    pub fn elapsed_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds().max(0)
    }
}

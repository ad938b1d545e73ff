use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::bank::{QuestionBank, QuestionId};
use crate::engine::ledger::{Category, HistoryLedger};
use crate::engine::percentages::PercentageConfig;
use crate::error::ExamError;

/// The bank split into past-performance categories, in bank order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Partition {
    pub new: Vec<QuestionId>,
    pub incorrect: Vec<QuestionId>,
    pub correct: Vec<QuestionId>,
}

impl Partition {
    pub fn of(bank: &QuestionBank, ledger: &HistoryLedger) -> Self {
        let mut out = Self::default();
        for id in bank.ids() {
            out.bucket_mut(ledger.category(id)).push(id);
        }
        out
    }

    pub fn bucket(&self, category: Category) -> &[QuestionId] {
        match category {
            Category::New => &self.new,
            Category::Incorrect => &self.incorrect,
            Category::Correct => &self.correct,
        }
    }

    fn bucket_mut(&mut self, category: Category) -> &mut Vec<QuestionId> {
        match category {
            Category::New => &mut self.new,
            Category::Incorrect => &mut self.incorrect,
            Category::Correct => &mut self.correct,
        }
    }
}

/// `ceil(count * percent / 100)`, capped at what the category has.
pub fn category_target(count: usize, percent: u8, available: usize) -> usize {
    (count * percent as usize).div_ceil(100).min(available)
}

/// Draw the ordered question list for one exam.
///
/// Each category contributes `ceil(count * pct / 100)` questions (or all it has).
/// Any shortfall is filled from the whole bank, and the combined list is
/// shuffled so category blocks are not visible. The result always holds exactly
/// `min(count, bank.len())` distinct ids.
pub fn select_questions<R: Rng + ?Sized>(
    bank: &QuestionBank,
    ledger: &HistoryLedger,
    count: usize,
    percentages: &PercentageConfig,
    rng: &mut R,
) -> Result<Vec<QuestionId>, ExamError> {
    if bank.is_empty() {
        return Err(ExamError::EmptyBank);
    }
    let count = count.min(bank.len());
    let partition = Partition::of(bank, ledger);

    let mut selected: Vec<QuestionId> = Vec::with_capacity(count);
    for category in Category::ALL {
        let mut pool = partition.bucket(category).to_vec();
        let target = category_target(count, percentages.get(category), pool.len());
        pool.shuffle(rng);
        selected.extend_from_slice(&pool[..target]);
        debug!(
            category = category.as_str(),
            available = pool.len(),
            target,
            "category draw"
        );
    }

    if selected.len() < count {
        let mut seen: HashSet<QuestionId> = selected.iter().copied().collect();
        let mut everything: Vec<QuestionId> = bank.ids().collect();
        everything.shuffle(rng);
        for id in everything {
            if selected.len() >= count {
                break;
            }
            if seen.insert(id) {
                selected.push(id);
            }
        }
    }

    // Rounding every category up can overshoot the requested count.
    selected.shuffle(rng);
    selected.truncate(count);
    Ok(selected)
}

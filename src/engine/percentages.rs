use serde::{Deserialize, Serialize};

use crate::engine::ledger::Category;
use crate::error::ValidationError;

/// Share of an exam drawn from each past-performance category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentageConfig {
    #[serde(default = "default_new")]
    pub new: u8,
    #[serde(default = "default_incorrect")]
    pub incorrect: u8,
    #[serde(default = "default_correct")]
    pub correct: u8,
}

fn default_new() -> u8 {
    80
}
fn default_incorrect() -> u8 {
    15
}
fn default_correct() -> u8 {
    5
}

impl Default for PercentageConfig {
    fn default() -> Self {
        Self {
            new: default_new(),
            incorrect: default_incorrect(),
            correct: default_correct(),
        }
    }
}

impl PercentageConfig {
    pub fn total(&self) -> u32 {
        self.new as u32 + self.incorrect as u32 + self.correct as u32
    }

    pub fn is_balanced(&self) -> bool {
        self.total() == 100
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_balanced() {
            Ok(())
        } else {
            Err(ValidationError::PercentageTotal {
                total: self.total(),
            })
        }
    }

    pub fn get(&self, category: Category) -> u8 {
        match category {
            Category::New => self.new,
            Category::Incorrect => self.incorrect,
            Category::Correct => self.correct,
        }
    }

    fn slot(&mut self, category: Category) -> &mut u8 {
        match category {
            Category::New => &mut self.new,
            Category::Incorrect => &mut self.incorrect,
            Category::Correct => &mut self.correct,
        }
    }

    /// Set one category (clamped to 0..=100) and rebalance the other two so the
    /// total returns to 100. The larger of the other two absorbs the difference
    /// first; whatever it cannot absorb without going below zero or above 100
    /// goes to the remaining one.
    pub fn set(&mut self, category: Category, value: i32) {
        *self.slot(category) = value.clamp(0, 100) as u8;

        let others: Vec<Category> = Category::ALL
            .into_iter()
            .filter(|&c| c != category)
            .collect();
        let (first, second) = if self.get(others[1]) > self.get(others[0]) {
            (others[1], others[0])
        } else {
            (others[0], others[1])
        };

        for target in [first, second] {
            let diff = self.total() as i32 - 100;
            if diff == 0 {
                break;
            }
            let adjusted = (self.get(target) as i32 - diff).clamp(0, 100);
            *self.slot(target) = adjusted as u8;
        }
    }

    /// Step a category by `delta` percentage points.
    pub fn nudge(&mut self, category: Category, delta: i32) {
        let current = self.get(category) as i32;
        self.set(category, current + delta);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

use serde::{Deserialize, Serialize};

/// Points awarded for a perfect exam.
pub const MAX_SCORE: f64 = 60.0;

/// Weighted score out of 60, rounded to two decimals. An empty exam scores 0.
pub fn official_score(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = MAX_SCORE * correct as f64 / total as f64;
    (raw * 100.0).round() / 100.0
}

pub fn format_score(score: f64) -> String {
    format!("{score:.2}")
}

/// Share of correct answers as a rounded integer 0..=100.
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * correct as f64 / total as f64).round() as u32
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Correct,
    Wrong,
    Unanswered,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Excellent,
    Good,
    NeedsPractice,
}

impl Verdict {
    pub fn from_percentage(pct: u32) -> Self {
        match pct {
            75.. => Verdict::Excellent,
            50.. => Verdict::Good,
            _ => Verdict::NeedsPractice,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScoreSheet {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub unanswered: usize,
    pub official_score: f64,
    pub percentage: u32,
}

impl ScoreSheet {
    pub fn tally(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        let mut sheet = Self::default();
        for outcome in outcomes {
            sheet.total += 1;
            match outcome {
                Outcome::Correct => sheet.correct += 1,
                Outcome::Wrong => sheet.incorrect += 1,
                Outcome::Unanswered => sheet.unanswered += 1,
            }
        }
        sheet.official_score = official_score(sheet.correct, sheet.total);
        sheet.percentage = percentage(sheet.correct, sheet.total);
        sheet
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::from_percentage(self.percentage)
    }
}

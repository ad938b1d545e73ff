use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::bank::{QuestionBank, QuestionId};
use crate::engine::feedback::pick_feedback;
use crate::engine::scoring::{Outcome, ScoreSheet, Verdict};
use crate::session::exam::ExamSession;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    #[default]
    Manual,
    TimeUp,
}

/// One question on the results screen.
#[derive(Clone, Debug, PartialEq)]
pub struct ReviewEntry {
    pub position: usize,
    pub question_id: QuestionId,
    pub prompt: String,
    pub chosen: Option<String>,
    pub correct: String,
    pub outcome: Outcome,
    pub feedback: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ExamReport {
    pub score: ScoreSheet,
    pub review: Vec<ReviewEntry>,
    pub finished_at: DateTime<Utc>,
    pub reason: FinishReason,
    pub elapsed_secs: i64,
}

impl ExamReport {
    pub fn build<R: Rng + ?Sized>(
        session: &ExamSession,
        bank: &QuestionBank,
        reason: FinishReason,
        rng: &mut R,
    ) -> Self {
        let mut review = Vec::with_capacity(session.len());
        for (position, &id) in session.order().iter().enumerate() {
            let Some(question) = bank.get(id) else {
                continue;
            };
            let chosen = session.answer(id);
            let outcome = match chosen {
                None => Outcome::Unanswered,
                Some(letter) if letter == question.correct_answer => Outcome::Correct,
                Some(_) => Outcome::Wrong,
            };
            review.push(ReviewEntry {
                position,
                question_id: id,
                prompt: question.prompt.clone(),
                chosen: chosen.map(|l| question.option_text(l).to_string()),
                correct: question.correct_text().to_string(),
                outcome,
                feedback: pick_feedback(outcome, rng),
            });
        }

        Self {
            score: ScoreSheet::tally(review.iter().map(|e| e.outcome)),
            review,
            finished_at: Utc::now(),
            reason,
            elapsed_secs: session.elapsed_secs(),
        }
    }

    pub fn verdict(&self) -> Verdict {
        self.score.verdict()
    }

    pub fn summary(&self) -> AttemptSummary {
        AttemptSummary {
            timestamp: self.finished_at,
            total: self.score.total,
            correct: self.score.correct,
            incorrect: self.score.incorrect,
            unanswered: self.score.unanswered,
            percentage: self.score.percentage,
            official_score: self.score.official_score,
            reason: self.reason,
        }
    }
}

/// Persisted outcome of one finished exam.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttemptSummary {
    pub timestamp: DateTime<Utc>,
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub unanswered: usize,
    pub percentage: u32,
    pub official_score: f64,
    #[serde(default)]
    pub reason: FinishReason,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttemptOverview {
    pub count: usize,
    pub mean_percentage: u32,
    /// Up to five percentages, most recent first.
    pub recent: Vec<u32>,
}

impl AttemptOverview {
    pub const RECENT: usize = 5;

    pub fn from_attempts(attempts: &[AttemptSummary]) -> Self {
        if attempts.is_empty() {
            return Self::default();
        }
        let sum: u64 = attempts.iter().map(|a| a.percentage as u64).sum();
        let mean = (sum as f64 / attempts.len() as f64).round() as u32;
        Self {
            count: attempts.len(),
            mean_percentage: mean,
            recent: attempts
                .iter()
                .rev()
                .take(Self::RECENT)
                .map(|a| a.percentage)
                .collect(),
        }
    }
}

use rand::Rng;
use rust_i18n::t;

use crate::engine::scoring::Outcome;

pub const POOL_SIZE: usize = 5;

/// Feedback line for a reviewed question, drawn uniformly from the pool for its
/// outcome. Correct answers get none.
pub fn pick_feedback<R: Rng + ?Sized>(outcome: Outcome, rng: &mut R) -> Option<String> {
    let idx = rng.gen_range(0..POOL_SIZE);
    let text = match outcome {
        Outcome::Correct => return None,
        Outcome::Wrong => match idx {
            0 => t!("feedback.wrong.0"),
            1 => t!("feedback.wrong.1"),
            2 => t!("feedback.wrong.2"),
            3 => t!("feedback.wrong.3"),
            _ => t!("feedback.wrong.4"),
        },
        Outcome::Unanswered => match idx {
            0 => t!("feedback.unanswered.0"),
            1 => t!("feedback.unanswered.1"),
            2 => t!("feedback.unanswered.2"),
            3 => t!("feedback.unanswered.3"),
            _ => t!("feedback.unanswered.4"),
        },
    };
    Some(text.into_owned())
}

use std::collections::HashMap;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::bank::{Letter, OPTION_COUNT, Question, QuestionId};

/// Display order of one question's options.
///
/// `slots[d]` is the canonical letter shown at display position `d`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OptionOrder {
    slots: [Letter; OPTION_COUNT],
}

impl Default for OptionOrder {
    fn default() -> Self {
        Self::identity()
    }
}

impl OptionOrder {
    pub fn identity() -> Self {
        Self { slots: Letter::ALL }
    }

    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut slots = Letter::ALL;
        slots.shuffle(rng);
        Self { slots }
    }

    /// Canonical letter behind a display letter.
    pub fn canonical(&self, display: Letter) -> Letter {
        self.slots[display.index()]
    }

    /// Display letter a canonical option is shown under.
    pub fn display(&self, canonical: Letter) -> Letter {
        let pos = self
            .slots
            .iter()
            .position(|&c| c == canonical)
            .unwrap_or(canonical.index());
        Letter::ALL[pos]
    }

    pub fn correct_display_letter(&self, question: &Question) -> Letter {
        self.display(question.correct_answer)
    }

    /// `(display, canonical)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Letter, Letter)> + '_ {
        Letter::ALL.into_iter().zip(self.slots.iter().copied())
    }
}

/// Per-session memo of option orders. Dropped together with the session, so a
/// new session always reshuffles.
#[derive(Clone, Debug, Default)]
pub struct OptionShuffler {
    orders: HashMap<QuestionId, OptionOrder>,
}

impl OptionShuffler {
    /// Shuffle every question in `ids` up front.
    pub fn for_questions<R: Rng + ?Sized>(ids: &[QuestionId], rng: &mut R) -> Self {
        let mut shuffler = Self::default();
        for &id in ids {
            shuffler.order_for(id, rng);
        }
        shuffler
    }

    /// Order for `id`, generated on first request and reused afterwards.
    pub fn order_for<R: Rng + ?Sized>(&mut self, id: QuestionId, rng: &mut R) -> OptionOrder {
        *self
            .orders
            .entry(id)
            .or_insert_with(|| OptionOrder::shuffled(rng))
    }

    pub fn get(&self, id: QuestionId) -> Option<OptionOrder> {
        self.orders.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::bank::tests::sample_bank;

    #[test]
    fn test_order_is_bijection() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..100 {
            let order = OptionOrder::shuffled(&mut rng);
            let canon: HashSet<Letter> = order.iter().map(|(_, c)| c).collect();
            assert_eq!(canon.len(), OPTION_COUNT);
            for letter in Letter::ALL {
                assert_eq!(order.canonical(order.display(letter)), letter);
                assert_eq!(order.display(order.canonical(letter)), letter);
            }
        }
    }

    #[test]
    fn test_correct_display_letter_points_at_correct_text() {
        let bank = sample_bank(8);
        let mut rng = SmallRng::seed_from_u64(3);
        for q in bank.questions() {
            let order = OptionOrder::shuffled(&mut rng);
            let shown = order.correct_display_letter(q);
            assert_eq!(q.option_text(order.canonical(shown)), q.correct_text());
        }
    }

    #[test]
    fn test_memoized_order_is_stable() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut shuffler = OptionShuffler::default();
        let first = shuffler.order_for(7, &mut rng);
        for _ in 0..10 {
            assert_eq!(shuffler.order_for(7, &mut rng), first);
        }
        assert_eq!(shuffler.get(7), Some(first));
        assert_eq!(shuffler.len(), 1);
    }

    #[test]
    fn test_for_questions_covers_every_id() {
        let mut rng = SmallRng::seed_from_u64(9);
        let shuffler = OptionShuffler::for_questions(&[3, 1, 2], &mut rng);
        assert_eq!(shuffler.len(), 3);
        assert!(shuffler.get(2).is_some());
        assert!(shuffler.get(4).is_none());
    }

    #[test]
    fn test_identity_order() {
        let order = OptionOrder::identity();
        for letter in Letter::ALL {
            assert_eq!(order.display(letter), letter);
        }
    }
}

//! Number-sequence catalog and distractor synthesis.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use tracing::{debug, instrument};

/// Difficulty tier of a sequence question.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    /// Arithmetic and doubling sequences.
    Easy,
    /// Squares, powers and Fibonacci-like sequences.
    Medium,
    /// Mixed-operation sequences.
    Hard,
}

/// A "what comes next" sequence puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    /// Sequence shown to the player, ending in `?`.
    pub question: &'static str,
    /// The missing term.
    pub answer: i64,
    /// Difficulty tier.
    pub difficulty: Difficulty,
}

const fn q(question: &'static str, answer: i64, difficulty: Difficulty) -> Question {
    Question {
        question,
        answer,
        difficulty,
    }
}

const EASY: [Question; 5] = [
    q("3, 6, 9, 12, ?", 15, Difficulty::Easy),
    q("2, 5, 8, 11, ?", 14, Difficulty::Easy),
    q("2, 4, 6, 8, ?", 10, Difficulty::Easy),
    q("2, 4, 8, 16, ?", 32, Difficulty::Easy),
    q("2, 6, 10, 14, ?", 18, Difficulty::Easy),
];

const MEDIUM: [Question; 5] = [
    q("2, 5, 10, 17, ?", 26, Difficulty::Medium),
    q("1, 4, 9, 16, ?", 25, Difficulty::Medium),
    q("3, 9, 27, 81, ?", 243, Difficulty::Medium),
    q("1, 1, 2, 3, ?", 5, Difficulty::Medium),
    q("10, 7, 4, 1, ?", -2, Difficulty::Medium),
];

const HARD: [Question; 5] = [
    q("5, 11, 23, 47, ?", 95, Difficulty::Hard),
    q("1, 2, 6, 24, ?", 120, Difficulty::Hard),
    q("7, 10, 8, 11, ?", 9, Difficulty::Hard),
    q("2, 3, 5, 8, ?", 12, Difficulty::Hard),
    q("2, 4, 12, 48, ?", 240, Difficulty::Hard),
];

/// Every question in the catalog, easy to hard.
pub fn catalog() -> impl Iterator<Item = &'static Question> {
    EASY.iter().chain(MEDIUM.iter()).chain(HARD.iter())
}

/// Questions of a single difficulty tier.
pub fn questions_for(difficulty: Difficulty) -> &'static [Question] {
    match difficulty {
        Difficulty::Easy => &EASY,
        Difficulty::Medium => &MEDIUM,
        Difficulty::Hard => &HARD,
    }
}

/// One question per difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuestionSet {
    /// Easy pick.
    pub easy: Question,
    /// Medium pick.
    pub medium: Question,
    /// Hard pick.
    pub hard: Question,
}

impl QuestionSet {
    /// Questions in play order.
    pub fn in_order(&self) -> [Question; 3] {
        [self.easy, self.medium, self.hard]
    }

    /// The pick for a given tier.
    pub fn get(&self, difficulty: Difficulty) -> &Question {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }
}

fn pick<R: Rng + ?Sized>(bucket: &[Question; 5], rng: &mut R) -> Question {
    bucket[rng.random_range(0..bucket.len())]
}

/// Picks one question uniformly at random from each tier, independently.
#[instrument(skip(rng))]
pub fn pick_one_question_per_difficulty<R: Rng + ?Sized>(rng: &mut R) -> QuestionSet {
    let set = QuestionSet {
        easy: pick(&EASY, rng),
        medium: pick(&MEDIUM, rng),
        hard: pick(&HARD, rng),
    };
    debug!(
        easy = set.easy.question,
        medium = set.medium.question,
        hard = set.hard.question,
        "Picked level 1 questions"
    );
    set
}

/// Produces three distinct wrong answers near `correct`.
///
/// Tries `correct + 1..=10`, `correct - 1..=5` and `floor(correct * 1.5)`
/// first, then fills remaining slots with `correct - 10..=9` jitter.
#[instrument(skip(rng))]
pub fn synthesize_distractors<R: Rng + ?Sized>(correct: i64, rng: &mut R) -> [i64; 3] {
    // Offsets that would leave the i64 range are skipped; the float cast saturates.
    let candidates = [
        correct.checked_add(rng.random_range(1..=10)),
        correct.checked_sub(rng.random_range(1..=5)),
        Some((correct as f64 * 1.5).floor() as i64),
    ];

    let mut picked = Vec::with_capacity(3);
    for candidate in candidates.into_iter().flatten() {
        if candidate != correct && !picked.contains(&candidate) {
            picked.push(candidate);
        }
    }

    while picked.len() < 3 {
        let Some(candidate) = correct.checked_add(rng.random_range(-10..10)) else {
            continue;
        };
        if candidate != correct && !picked.contains(&candidate) {
            picked.push(candidate);
        }
    }

    [picked[0], picked[1], picked[2]]
}

/// The answer plus three distractors, shuffled.
pub fn answer_options<R: Rng + ?Sized>(question: &Question, rng: &mut R) -> Vec<i64> {
    let mut options = synthesize_distractors(question.answer, rng).to_vec();
    options.push(question.answer);
    options.shuffle(rng);
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use strum::IntoEnumIterator;

    #[test]
    fn catalog_has_five_per_tier() {
        for difficulty in Difficulty::iter() {
            assert_eq!(
                catalog().filter(|q| q.difficulty == difficulty).count(),
                5,
                "tier {difficulty}"
            );
        }
    }

    #[test]
    fn tiers_hold_only_their_difficulty() {
        for difficulty in Difficulty::iter() {
            assert!(questions_for(difficulty).iter().all(|q| q.difficulty == difficulty));
        }
    }

    #[test]
    fn zero_answer_still_gets_three_distractors() {
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..200 {
            let wrong = synthesize_distractors(0, &mut rng);
            assert!(!wrong.contains(&0));
            assert!(wrong[0] != wrong[1] && wrong[1] != wrong[2] && wrong[0] != wrong[2]);
        }
    }

    #[test]
    fn extreme_answers_do_not_overflow() {
        let mut rng = StdRng::seed_from_u64(1);
        for correct in [i64::MAX, i64::MAX - 1, i64::MAX - 3, i64::MIN, i64::MIN + 1, i64::MIN + 4] {
            for _ in 0..50 {
                let wrong = synthesize_distractors(correct, &mut rng);
                assert!(!wrong.contains(&correct), "{correct}");
                assert!(wrong[0] != wrong[1] && wrong[1] != wrong[2] && wrong[0] != wrong[2]);
            }
        }
    }

    #[test]
    fn options_contain_answer_once() {
        let mut rng = StdRng::seed_from_u64(3);
        for question in catalog() {
            let options = answer_options(question, &mut rng);
            assert_eq!(options.len(), 4);
            assert_eq!(options.iter().filter(|&&o| o == question.answer).count(), 1);
        }
    }

    #[test]
    fn difficulty_displays_lowercase() {
        assert_eq!(Difficulty::Medium.to_string(), "medium");
        assert_eq!(serde_json::to_string(&Difficulty::Hard).unwrap(), "\"hard\"");
    }
}

//! Tests for question selection and distractor synthesis.

use pattern_challenge::{Difficulty, catalog, pick_one_question_per_difficulty, synthesize_distractors};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn test_each_pick_matches_its_tier() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..100 {
        let set = pick_one_question_per_difficulty(&mut rng);
        assert_eq!(set.easy.difficulty, Difficulty::Easy);
        assert_eq!(set.medium.difficulty, Difficulty::Medium);
        assert_eq!(set.hard.difficulty, Difficulty::Hard);
        for question in set.in_order() {
            assert!(catalog().any(|q| *q == question), "picked question not in catalog");
        }
    }
}

#[test]
fn test_every_question_is_eventually_picked() {
    let mut rng = StdRng::seed_from_u64(21);
    let mut seen = std::collections::HashSet::new();
    for _ in 0..500 {
        for question in pick_one_question_per_difficulty(&mut rng).in_order() {
            seen.insert(question.question);
        }
    }
    assert_eq!(seen.len(), 15);
}

#[test]
fn test_distractors_distinct_and_wrong() {
    let mut rng = StdRng::seed_from_u64(99);
    for correct in -50..=300 {
        let wrong = synthesize_distractors(correct, &mut rng);
        assert!(!wrong.contains(&correct), "distractor equals answer {correct}");
        assert_ne!(wrong[0], wrong[1]);
        assert_ne!(wrong[1], wrong[2]);
        assert_ne!(wrong[0], wrong[2]);
    }
}

#[test]
fn test_distractors_for_catalog_answers() {
    let mut rng = StdRng::seed_from_u64(5);
    for question in catalog() {
        let wrong = synthesize_distractors(question.answer, &mut rng);
        assert!(!wrong.contains(&question.answer));
        // Offsets stay near the answer: at most +10, -10, or the x1.5 jump.
        let far = (question.answer as f64 * 1.5).floor() as i64;
        for w in wrong {
            assert!((w - question.answer).abs() <= 10 || w == far, "{w} too far from {}", question.answer);
        }
    }
}

#[test]
fn test_distractors_near_integer_limits() {
    let mut rng = StdRng::seed_from_u64(1);
    let edges = (0..12).map(|k| i64::MAX - k).chain((0..12).map(|k| i64::MIN + k));
    for correct in edges {
        let wrong = synthesize_distractors(correct, &mut rng);
        assert!(!wrong.contains(&correct), "distractor equals answer {correct}");
        assert_ne!(wrong[0], wrong[1]);
        assert_ne!(wrong[1], wrong[2]);
        assert_ne!(wrong[0], wrong[2]);
    }
}

//! End-to-end play-through tests over the in-process backend.

use async_trait::async_trait;
use pattern_challenge::{
    AnswerOutcome, BackendError, BackendErrorKind, GameBackend, GameOrchestrator, GameSession,
    GameStage, GridOutcome, GridSolution, Level2Verdict, LevelView, MemoryStore, QuestionStatus,
    RemovalOutcome, SessionPatch, SessionStore, Shape, ShapeColor, StoreBackend,
    correct_solution,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

type Game = GameOrchestrator<StoreBackend<MemoryStore>>;

async fn start(store: &MemoryStore, id: &str, seed: u64) -> Game {
    GameOrchestrator::start_with_rng(StoreBackend::new(store.clone()), id, StdRng::seed_from_u64(seed))
        .await
        .expect("Failed to start game")
}

fn current_answer<B: GameBackend>(game: &GameOrchestrator<B>) -> i64 {
    match game.view() {
        LevelView::Level1 { question, .. } => question.answer,
        other => panic!("Expected level 1, got {:?}", other),
    }
}

fn wrong_option<B: GameBackend>(game: &GameOrchestrator<B>) -> i64 {
    match game.view() {
        LevelView::Level1 { question, options, .. } => *options
            .iter()
            .find(|o| **o != question.answer)
            .expect("No wrong option"),
        other => panic!("Expected level 1, got {:?}", other),
    }
}

async fn finish_level1<B: GameBackend>(game: &mut GameOrchestrator<B>) {
    for _ in 0..3 {
        let answer = current_answer(game);
        game.answer(answer).await.expect("Answer failed");
    }
}

async fn finish_level2<B: GameBackend>(game: &mut GameOrchestrator<B>) {
    for (shape, assignment) in correct_solution() {
        game.set_shape_color(shape, assignment.color).expect("Set color failed");
        game.set_shape_count(shape, assignment.count).expect("Set count failed");
    }
    assert_eq!(game.check_grid().await.expect("Check failed"), GridOutcome::Solved);
}

fn point_ids<B: GameBackend>(game: &GameOrchestrator<B>, outliers: bool) -> Vec<String> {
    match game.view() {
        LevelView::Level3 { points, .. } => points
            .iter()
            .filter(|p| *p.is_outlier() == outliers && !*p.removed())
            .map(|p| p.id().clone())
            .collect(),
        other => panic!("Expected level 3, got {:?}", other),
    }
}

#[tokio::test]
async fn test_full_play_through() {
    let store = MemoryStore::new();
    let mut game = start(&store, "abc123xyz", 1).await;
    assert_eq!(game.stage(), GameStage::Level1);

    let first = current_answer(&game);
    assert!(matches!(
        game.answer(first).await.expect("Answer failed"),
        AnswerOutcome::Correct { .. }
    ));
    let second = current_answer(&game);
    game.answer(second).await.expect("Answer failed");
    let third = current_answer(&game);
    assert_eq!(game.answer(third).await.expect("Answer failed"), AnswerOutcome::LevelComplete);

    assert_eq!(game.stage(), GameStage::Level2);
    let stored = store.get("abc123xyz").expect("Get failed").expect("Missing");
    assert!(stored.level1_completed);
    assert_eq!(stored.current_level, 2);

    finish_level2(&mut game).await;
    assert_eq!(game.stage(), GameStage::Level3);
    let stored = store.get("abc123xyz").expect("Get failed").expect("Missing");
    assert!(stored.level2_completed);
    assert_eq!(stored.current_level, 3);

    let outliers = point_ids(&game, true);
    assert_eq!(outliers.len(), 5);
    for (i, id) in outliers.iter().enumerate() {
        let outcome = game.click_point(id).await.expect("Click failed");
        if i < 4 {
            assert_eq!(outcome, RemovalOutcome::Removed { remaining: 4 - i as u32 });
            assert_eq!(game.session().outliers_remaining, 4 - i as u32);
        } else {
            assert_eq!(outcome, RemovalOutcome::Cleared);
        }
    }

    assert_eq!(game.stage(), GameStage::Completed);
    let stored = store.get("abc123xyz").expect("Get failed").expect("Missing");
    assert!(stored.level3_completed);
    assert!(stored.game_completed);
    assert_eq!(stored.outliers_remaining, 0);

    game.play_again().await.expect("Reset failed");
    assert_eq!(game.stage(), GameStage::Level1);
    let stored = store.get("abc123xyz").expect("Get failed").expect("Missing");
    assert_eq!(stored, GameSession::new("abc123xyz".to_string()));
}

#[tokio::test]
async fn test_wrong_answer_locks_question_until_retry() {
    let store = MemoryStore::new();
    let mut game = start(&store, "lock", 2).await;

    let wrong = wrong_option(&game);
    let answer = current_answer(&game);
    assert_eq!(
        game.answer(wrong).await.expect("Answer failed"),
        AnswerOutcome::Incorrect { answer }
    );
    match game.view() {
        LevelView::Level1 { status, number, .. } => {
            assert_eq!(status, QuestionStatus::Missed { selected: wrong });
            assert_eq!(number, 1);
        }
        other => panic!("Expected level 1, got {:?}", other),
    }

    // Once missed, even the right answer is ignored.
    assert_eq!(game.answer(answer).await.expect("Answer failed"), AnswerOutcome::Ignored);

    game.retry_level().await.expect("Retry failed");
    assert_eq!(game.stage(), GameStage::Level1);
    match game.view() {
        LevelView::Level1 { status, number, .. } => {
            assert_eq!(status, QuestionStatus::Awaiting);
            assert_eq!(number, 1);
        }
        other => panic!("Expected level 1, got {:?}", other),
    }
    let stored = store.get("lock").expect("Get failed").expect("Missing");
    assert!(!stored.level1_completed);
}

#[tokio::test]
async fn test_resume_from_stored_progress() {
    let store = MemoryStore::new();
    store.create("resume").expect("Create failed");
    store
        .update(
            "resume",
            &SessionPatch::default().level1_completed(true).current_level(2),
        )
        .expect("Update failed");

    let game = start(&store, "resume", 3).await;
    assert_eq!(game.stage(), GameStage::Level2);
}

#[tokio::test]
async fn test_gate_violation_falls_back() {
    let store = MemoryStore::new();
    store.create("gate").expect("Create failed");
    store
        .update("gate", &SessionPatch::default().current_level(3))
        .expect("Update failed");

    let game = start(&store, "gate", 4).await;
    assert_eq!(game.stage(), GameStage::Level1);
}

#[tokio::test]
async fn test_incomplete_and_incorrect_grid() {
    let store = MemoryStore::new();
    let mut game = start(&store, "grid", 5).await;
    finish_level1(&mut game).await;

    game.set_shape_color(Shape::Triangle, ShapeColor::Purple).expect("Set failed");
    assert_eq!(game.check_grid().await.expect("Check failed"), GridOutcome::Incomplete);

    for (shape, assignment) in correct_solution() {
        game.set_shape_color(shape, assignment.color).expect("Set color failed");
        game.set_shape_count(shape, assignment.count + 1).expect("Set count failed");
    }
    assert_eq!(game.check_grid().await.expect("Check failed"), GridOutcome::Incorrect);
    assert_eq!(game.stage(), GameStage::Level2);
    assert!(!store.get("grid").expect("Get failed").expect("Missing").level2_completed);

    game.retry_level().await.expect("Retry failed");
    match game.view() {
        LevelView::Level2 { grid, .. } => {
            assert!(grid.cells().all(|(_, c)| c.color.is_none() && c.count.is_none()));
        }
        other => panic!("Expected level 2, got {:?}", other),
    }
}

#[tokio::test]
async fn test_cluster_click_and_level3_retry() {
    let store = MemoryStore::new();
    let mut game = start(&store, "plot", 6).await;
    finish_level1(&mut game).await;
    finish_level2(&mut game).await;

    let cluster = point_ids(&game, false);
    assert_eq!(cluster.len(), 20);
    assert_eq!(
        game.click_point(&cluster[0]).await.expect("Click failed"),
        RemovalOutcome::NotAnOutlier
    );
    assert_eq!(game.session().outliers_remaining, 5);

    let outliers = point_ids(&game, true);
    game.click_point(&outliers[0]).await.expect("Click failed");
    game.click_point(&outliers[1]).await.expect("Click failed");
    assert_eq!(game.session().outliers_remaining, 3);
    assert_eq!(
        game.click_point(&outliers[0]).await.expect("Click failed"),
        RemovalOutcome::Ignored
    );

    game.retry_level().await.expect("Retry failed");
    assert_eq!(game.stage(), GameStage::Level3);
    assert_eq!(game.session().outliers_remaining, 5);
    assert_eq!(point_ids(&game, true).len(), 5);
}

#[tokio::test]
async fn test_actions_rejected_at_wrong_stage() {
    let store = MemoryStore::new();
    let mut game = start(&store, "stage", 7).await;

    assert!(game.set_shape_color(Shape::Square, ShapeColor::Yellow).is_err());
    assert!(game.check_grid().await.is_err());
    assert!(game.click_point("outlier-0").await.is_err());
}

/// Store-backed backend whose updates can be switched to fail.
struct FlakyBackend {
    inner: StoreBackend<MemoryStore>,
    failing: Arc<AtomicBool>,
}

#[async_trait]
impl GameBackend for FlakyBackend {
    async fn load_session(&self, id: &str) -> Result<GameSession, BackendError> {
        self.inner.load_session(id).await
    }

    async fn update_session(&self, id: &str, patch: &SessionPatch) -> Result<GameSession, BackendError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(BackendError::new(BackendErrorKind::Transport(
                "connection refused".to_string(),
            )));
        }
        self.inner.update_session(id, patch).await
    }

    async fn validate_level2(
        &self,
        id: &str,
        solution: &GridSolution,
    ) -> Result<Level2Verdict, BackendError> {
        self.inner.validate_level2(id, solution).await
    }
}

#[tokio::test]
async fn test_backend_failure_leaves_state_unchanged() {
    let store = MemoryStore::new();
    let failing = Arc::new(AtomicBool::new(false));
    let backend = FlakyBackend {
        inner: StoreBackend::new(store.clone()),
        failing: failing.clone(),
    };
    let mut game = GameOrchestrator::start_with_rng(backend, "flaky", StdRng::seed_from_u64(8))
        .await
        .expect("Failed to start game");

    let first = current_answer(&game);
    game.answer(first).await.expect("Answer failed");
    let second = current_answer(&game);
    game.answer(second).await.expect("Answer failed");

    failing.store(true, Ordering::SeqCst);
    let third = current_answer(&game);
    assert!(game.answer(third).await.is_err());
    assert_eq!(game.stage(), GameStage::Level1);
    assert!(!game.session().level1_completed);
    assert_eq!(current_answer(&game), third, "question should still be on screen");

    failing.store(false, Ordering::SeqCst);
    assert_eq!(game.answer(third).await.expect("Answer failed"), AnswerOutcome::LevelComplete);
    assert_eq!(game.stage(), GameStage::Level2);
    assert!(store.get("flaky").expect("Get failed").expect("Missing").level1_completed);
}

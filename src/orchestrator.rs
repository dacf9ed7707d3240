//! Sequences the three levels over a session and its transient level state.
//!
//! The persisted [`GameSession`] decides which [`GameStage`] is showing; the
//! orchestrator owns the matching ephemeral controller (quiz, grid or plot)
//! and rebuilds it whenever the stage changes or the level is retried.
//! Every state change goes through the backend first, so a failed call leaves
//! both the session snapshot and the controller untouched.

use crate::backend::{BackendError, GameBackend};
use crate::levels::{
    AnswerOutcome, CLUES, DataPoint, LogicGrid, OutlierPlot, Question, QuestionStatus,
    RemovalOutcome, STORY, SequenceQuiz, Shape, ShapeColor,
};
use crate::session::{GameSession, INITIAL_OUTLIERS, SessionPatch};
use derive_more::{Display, Error, From};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, instrument, warn};

/// Which level the player is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum GameStage {
    /// Sequence quiz.
    #[display("level 1")]
    Level1,
    /// Logic grid.
    #[display("level 2")]
    Level2,
    /// Outlier plot.
    #[display("level 3")]
    Level3,
    /// All levels done.
    #[display("completed")]
    Completed,
}

impl GameStage {
    /// Stage shown for a session.
    ///
    /// `currentLevel` is honored only when the preceding level's flag is set;
    /// otherwise the lowest level whose gate is open is shown.
    pub fn of(session: &GameSession) -> Self {
        if session.game_completed {
            return Self::Completed;
        }
        match session.current_level {
            3 if session.level2_completed && session.level1_completed => Self::Level3,
            2 | 3 if session.level1_completed => Self::Level2,
            _ => Self::Level1,
        }
    }
}

/// Patch recording completion of the level shown at `stage`.
pub fn completion_patch(stage: GameStage) -> SessionPatch {
    match stage {
        GameStage::Level1 => SessionPatch::default().level1_completed(true).current_level(2),
        GameStage::Level2 => SessionPatch::default().level2_completed(true).current_level(3),
        GameStage::Level3 => SessionPatch::default()
            .level3_completed(true)
            .game_completed(true),
        GameStage::Completed => SessionPatch::default(),
    }
}

/// Patch restoring a brand-new play-through.
pub fn reset_patch() -> SessionPatch {
    SessionPatch::default()
        .current_level(1)
        .level1_completed(false)
        .level2_completed(false)
        .level3_completed(false)
        .game_completed(false)
        .outliers_remaining(INITIAL_OUTLIERS)
}

/// Patch sent when the level at `stage` is retried.
pub fn retry_patch(stage: GameStage) -> SessionPatch {
    match stage {
        GameStage::Level1 => SessionPatch::default().current_level(1),
        GameStage::Level2 => SessionPatch::default().level2_solution(None),
        GameStage::Level3 => SessionPatch::default().outliers_remaining(INITIAL_OUTLIERS),
        GameStage::Completed => reset_patch(),
    }
}

/// Error raised by a player action.
#[derive(Debug, Clone, Display, Error, From)]
pub enum PlayError {
    /// The action belongs to a level that is not showing.
    #[display("{} is not available at {}", action, stage)]
    WrongStage {
        /// Attempted action.
        action: &'static str,
        /// Stage actually showing.
        stage: GameStage,
    },
    /// The backend call failed; nothing changed.
    #[display("{}", _0)]
    #[from]
    Backend(BackendError),
}

/// Result of a level 2 check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridOutcome {
    /// Some color or count is missing; nothing was submitted.
    Incomplete,
    /// Submitted and rejected.
    Incorrect,
    /// Submitted and accepted; the game moved to level 3.
    Solved,
}

/// Everything a front end needs to draw the current level.
#[derive(Debug, Clone, Copy)]
pub enum LevelView<'a> {
    /// Sequence quiz.
    Level1 {
        /// Question on screen.
        question: &'a Question,
        /// 1-based question number.
        number: usize,
        /// Questions in the level.
        total: usize,
        /// Shuffled answer options.
        options: &'a [i64],
        /// Whether the question is open, missed or finished.
        status: QuestionStatus,
    },
    /// Logic grid.
    Level2 {
        /// Puzzle story.
        story: &'static str,
        /// Clues.
        clues: &'static [&'static str],
        /// Current form entries.
        grid: &'a LogicGrid,
    },
    /// Outlier plot.
    Level3 {
        /// Every point, removed ones flagged.
        points: &'a [DataPoint],
        /// Outliers left on the plot.
        remaining: u32,
    },
    /// Finished game.
    Completed,
}

#[derive(Debug, Clone)]
enum ActiveLevel {
    Quiz(SequenceQuiz),
    Grid(LogicGrid),
    Plot(OutlierPlot),
    Done,
}

impl ActiveLevel {
    fn stage(&self) -> GameStage {
        match self {
            Self::Quiz(_) => GameStage::Level1,
            Self::Grid(_) => GameStage::Level2,
            Self::Plot(_) => GameStage::Level3,
            Self::Done => GameStage::Completed,
        }
    }

    fn fresh(stage: GameStage, rng: &mut StdRng) -> Self {
        match stage {
            GameStage::Level1 => Self::Quiz(SequenceQuiz::new(rng)),
            GameStage::Level2 => Self::Grid(LogicGrid::new()),
            GameStage::Level3 => Self::Plot(OutlierPlot::generate(rng)),
            GameStage::Completed => Self::Done,
        }
    }
}

/// Drives one session through the three levels.
pub struct GameOrchestrator<B> {
    backend: B,
    session: GameSession,
    active: ActiveLevel,
    rng: StdRng,
}

impl<B: GameBackend> GameOrchestrator<B> {
    /// Loads (or creates) `session_id` and prepares its current level.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the session cannot be loaded.
    pub async fn start(backend: B, session_id: &str) -> Result<Self, BackendError> {
        Self::start_with_rng(backend, session_id, StdRng::from_rng(&mut rand::rng())).await
    }

    /// Like [`GameOrchestrator::start`] with a caller-supplied RNG.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the session cannot be loaded.
    #[instrument(skip(backend, rng))]
    pub async fn start_with_rng(
        backend: B,
        session_id: &str,
        mut rng: StdRng,
    ) -> Result<Self, BackendError> {
        let session = backend.load_session(session_id).await?;
        let stage = GameStage::of(&session);
        info!(session_id, %stage, "Game started");
        let active = ActiveLevel::fresh(stage, &mut rng);
        Ok(Self {
            backend,
            session,
            active,
            rng,
        })
    }

    /// Latest session snapshot.
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Stage currently showing.
    pub fn stage(&self) -> GameStage {
        self.active.stage()
    }

    /// The backend in use.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Snapshot of the current level for rendering.
    pub fn view(&self) -> LevelView<'_> {
        match &self.active {
            ActiveLevel::Quiz(quiz) => LevelView::Level1 {
                question: quiz.current_question(),
                number: quiz.question_number(),
                total: quiz.total_questions(),
                options: quiz.options(),
                status: quiz.status(),
            },
            ActiveLevel::Grid(grid) => LevelView::Level2 {
                story: STORY,
                clues: &CLUES,
                grid,
            },
            ActiveLevel::Plot(plot) => LevelView::Level3 {
                points: plot.points(),
                remaining: plot.outliers_remaining(),
            },
            ActiveLevel::Done => LevelView::Completed,
        }
    }

    fn wrong_stage(&self, action: &'static str) -> PlayError {
        warn!(action, stage = %self.stage(), "Action not available");
        PlayError::WrongStage {
            action,
            stage: self.stage(),
        }
    }

    /// Sends `patch`, adopts the returned session and rebuilds the level
    /// controller if the stage changed.
    async fn apply(&mut self, patch: SessionPatch) -> Result<(), BackendError> {
        let session = self.backend.update_session(&self.session.id, &patch).await?;
        self.session = session;
        let stage = GameStage::of(&self.session);
        if stage != self.active.stage() {
            info!(session_id = %self.session.id, from = %self.active.stage(), to = %stage, "Stage changed");
            self.active = ActiveLevel::fresh(stage, &mut self.rng);
        }
        Ok(())
    }

    /// Picks an option in the sequence quiz.
    ///
    /// # Errors
    ///
    /// Returns [`PlayError`] outside level 1 or if recording completion fails.
    #[instrument(skip(self), fields(session_id = %self.session.id))]
    pub async fn answer(&mut self, selected: i64) -> Result<AnswerOutcome, PlayError> {
        let outcome = match &self.active {
            ActiveLevel::Quiz(quiz) => quiz.grade(selected),
            _ => return Err(self.wrong_stage("answer")),
        };

        if outcome == AnswerOutcome::LevelComplete {
            self.apply(completion_patch(GameStage::Level1)).await?;
            info!("Level 1 complete");
        } else if let ActiveLevel::Quiz(quiz) = &mut self.active {
            quiz.answer(selected, &mut self.rng);
        }
        Ok(outcome)
    }

    /// Sets a color in the logic grid form.
    ///
    /// # Errors
    ///
    /// Returns [`PlayError::WrongStage`] outside level 2.
    pub fn set_shape_color(&mut self, shape: Shape, color: ShapeColor) -> Result<(), PlayError> {
        if let ActiveLevel::Grid(grid) = &mut self.active {
            grid.set_color(shape, color);
            return Ok(());
        }
        Err(self.wrong_stage("set color"))
    }

    /// Sets a count in the logic grid form.
    ///
    /// # Errors
    ///
    /// Returns [`PlayError::WrongStage`] outside level 2.
    pub fn set_shape_count(&mut self, shape: Shape, count: u32) -> Result<(), PlayError> {
        if let ActiveLevel::Grid(grid) = &mut self.active {
            grid.set_count(shape, count);
            return Ok(());
        }
        Err(self.wrong_stage("set count"))
    }

    /// Submits the logic grid form if every row is filled.
    ///
    /// # Errors
    ///
    /// Returns [`PlayError`] outside level 2 or if the backend fails.
    #[instrument(skip(self), fields(session_id = %self.session.id))]
    pub async fn check_grid(&mut self) -> Result<GridOutcome, PlayError> {
        let solution = match &self.active {
            ActiveLevel::Grid(grid) => grid.to_solution(),
            _ => return Err(self.wrong_stage("check solution")),
        };
        let Some(solution) = solution else {
            debug!("Grid incomplete, not submitting");
            return Ok(GridOutcome::Incomplete);
        };

        let verdict = self
            .backend
            .validate_level2(&self.session.id, &solution)
            .await?;
        if !verdict.correct {
            return Ok(GridOutcome::Incorrect);
        }

        self.apply(completion_patch(GameStage::Level2)).await?;
        info!("Level 2 complete");
        Ok(GridOutcome::Solved)
    }

    /// Clicks a point on the outlier plot.
    ///
    /// Each removal records the new outlier count; the last one also marks
    /// level 3 and the game complete.
    ///
    /// # Errors
    ///
    /// Returns [`PlayError`] outside level 3 or if the backend fails.
    #[instrument(skip(self), fields(session_id = %self.session.id))]
    pub async fn click_point(&mut self, point_id: &str) -> Result<RemovalOutcome, PlayError> {
        let outcome = match &self.active {
            ActiveLevel::Plot(plot) => plot.classify(point_id),
            _ => return Err(self.wrong_stage("click point")),
        };

        match outcome {
            RemovalOutcome::Removed { remaining } => {
                self.apply(SessionPatch::default().outliers_remaining(remaining))
                    .await?;
                if let ActiveLevel::Plot(plot) = &mut self.active {
                    plot.click(point_id);
                }
            }
            RemovalOutcome::Cleared => {
                let patch = completion_patch(GameStage::Level3).outliers_remaining(0);
                self.apply(patch).await?;
                info!("Level 3 complete, game complete");
            }
            RemovalOutcome::NotAnOutlier | RemovalOutcome::Ignored => {}
        }
        Ok(outcome)
    }

    /// Restarts the current level with fresh transient data.
    ///
    /// Level 1 also resets `currentLevel` to 1; level 2 clears stored notes;
    /// level 3 restores the outlier count. From the completed screen this is
    /// a full reset.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the update fails; nothing changes then.
    #[instrument(skip(self), fields(session_id = %self.session.id, stage = %self.stage()))]
    pub async fn retry_level(&mut self) -> Result<(), BackendError> {
        let stage = self.stage();
        self.apply(retry_patch(stage)).await?;
        if self.active.stage() == stage {
            self.active = ActiveLevel::fresh(stage, &mut self.rng);
        }
        info!("Level retried");
        Ok(())
    }

    /// Clears all progress and returns to level 1.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the update fails; nothing changes then.
    #[instrument(skip(self), fields(session_id = %self.session.id))]
    pub async fn play_again(&mut self) -> Result<(), BackendError> {
        self.apply(reset_patch()).await?;
        self.active = ActiveLevel::fresh(GameStage::Level1, &mut self.rng);
        info!("Game reset");
        Ok(())
    }
}

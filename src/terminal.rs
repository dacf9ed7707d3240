//! Line-based terminal front end.
//!
//! Reads one command per line from stdin, forwards it to the orchestrator and
//! prints the resulting level view. Failed backend calls print a generic
//! notice; the player retries by entering the command again.

use crate::backend::GameBackend;
use crate::levels::{AnswerOutcome, QuestionStatus, RemovalOutcome, Shape, ShapeColor};
use crate::orchestrator::{GameOrchestrator, GridOutcome, LevelView, PlayError};
use crate::session::GameSession;
use std::fmt::Write as _;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, instrument, warn};

const HELP: &str = "\
Commands:
  <number>                      answer the sequence question (level 1)
  set <shape> <color> <count>   fill a grid row, e.g. `set triangle purple 4` (level 2)
  check                         check the grid (level 2)
  click <point-id>              remove a point, e.g. `click normal-3` (level 3)
  retry                         restart the current level
  again                         start over after finishing
  help                          show this list
  quit                          leave the game";

/// One parsed line of player input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Pick an answer option.
    Answer(i64),
    /// Fill a grid row.
    Set {
        /// Row.
        shape: Shape,
        /// Color.
        color: ShapeColor,
        /// Count.
        count: u32,
    },
    /// Submit the grid.
    Check,
    /// Click a plot point.
    Click(String),
    /// Restart the level.
    Retry,
    /// Full reset.
    Again,
    /// Show commands.
    Help,
    /// Exit.
    Quit,
}

/// Parses a line of input.
///
/// # Errors
///
/// Returns a message for the player when the line is not a command.
pub fn parse_input(line: &str) -> Result<Input, String> {
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return Err("Type `help` for commands.".to_string());
    };

    if let Ok(number) = first.parse::<i64>() {
        return Ok(Input::Answer(number));
    }

    match first.to_ascii_lowercase().as_str() {
        "set" => {
            let (Some(shape), Some(color), Some(count)) = (words.next(), words.next(), words.next()) else {
                return Err("Usage: set <shape> <color> <count>".to_string());
            };
            let shape = shape
                .parse::<Shape>()
                .map_err(|_| format!("Unknown shape `{}`", shape))?;
            let color = color
                .parse::<ShapeColor>()
                .map_err(|_| format!("Unknown color `{}`", color))?;
            let count = count
                .parse::<u32>()
                .ok()
                .filter(|c| (1..=10).contains(c))
                .ok_or_else(|| format!("Count must be between 1 and 10, got `{}`", count))?;
            Ok(Input::Set { shape, color, count })
        }
        "check" => Ok(Input::Check),
        "click" => words
            .next()
            .map(|id| Input::Click(id.to_string()))
            .ok_or_else(|| "Usage: click <point-id>".to_string()),
        "retry" => Ok(Input::Retry),
        "again" => Ok(Input::Again),
        "help" | "?" => Ok(Input::Help),
        "quit" | "exit" | "q" => Ok(Input::Quit),
        other => Err(format!("Unknown command `{}`. Type `help` for commands.", other)),
    }
}

fn progress_line(session: &GameSession) -> String {
    let mark = |done: bool| if done { "x" } else { " " };
    format!(
        "[{}] Level 1   [{}] Level 2   [{}] Level 3",
        mark(session.level1_completed),
        mark(session.level2_completed),
        mark(session.level3_completed)
    )
}

/// Renders the progress bar and current level as text.
///
/// # Errors
///
/// Returns [`std::fmt::Error`] if writing to the buffer fails.
pub fn render(session: &GameSession, view: &LevelView<'_>) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "\n{}", progress_line(session))?;

    match view {
        LevelView::Level1 {
            question,
            number,
            total,
            options,
            status,
        } => {
            writeln!(out, "Level 1: Number Patterns  (question {number} of {total}, {})", question.difficulty)?;
            writeln!(out, "  {}", question.question)?;
            let choices: Vec<String> = options.iter().map(|o| o.to_string()).collect();
            writeln!(out, "  Options: {}", choices.join("   "))?;
            if let QuestionStatus::Missed { selected } = status {
                writeln!(
                    out,
                    "  You picked {selected}; the answer was {}. Type `retry` to try the level again.",
                    question.answer
                )?;
            }
        }
        LevelView::Level2 { story, clues, grid } => {
            writeln!(out, "Level 2: Logic Grid\n  {story}")?;
            for (i, clue) in clues.iter().enumerate() {
                writeln!(out, "  {}. {}", i + 1, clue)?;
            }
            for (shape, cell) in grid.cells() {
                let color = cell.color.map(|c| c.to_string()).unwrap_or_else(|| "?".to_string());
                let count = cell.count.map(|c| c.to_string()).unwrap_or_else(|| "?".to_string());
                writeln!(out, "  {shape:<9} {color:<7} {count}")?;
            }
        }
        LevelView::Level3 { points, remaining } => {
            writeln!(out, "Level 3: Outlier Detection  ({remaining} outliers remaining)")?;
            for point in points.iter().filter(|p| !*p.removed()) {
                writeln!(out, "  {:<10} x={:>5.1} y={:>5.1}", point.id(), point.x(), point.y())?;
            }
        }
        LevelView::Completed => {
            writeln!(out, "You finished all three levels! Type `again` to play once more.")?;
        }
    }
    Ok(out)
}

fn report_failure(err: &PlayError) {
    match err {
        PlayError::WrongStage { action, stage } => {
            println!("You can't {action} at {stage}.");
        }
        PlayError::Backend(e) => {
            warn!(error = %e, "Backend call failed");
            println!("Something went wrong. Please try again.");
        }
    }
}

async fn execute<B: GameBackend>(game: &mut GameOrchestrator<B>, input: Input) -> Result<(), PlayError> {
    match input {
        Input::Answer(selected) => match game.answer(selected).await? {
            AnswerOutcome::Correct { .. } => println!("Correct! Moving to the next question."),
            AnswerOutcome::LevelComplete => println!("Level 1 complete!"),
            AnswerOutcome::Incorrect { .. } => println!("That's not quite right."),
            AnswerOutcome::Ignored => println!("This question is settled. Type `retry` to start the level again."),
        },
        Input::Set { shape, color, count } => {
            game.set_shape_color(shape, color)?;
            game.set_shape_count(shape, count)?;
        }
        Input::Check => match game.check_grid().await? {
            GridOutcome::Incomplete => println!("Please fill in all colors and counts before checking."),
            GridOutcome::Incorrect => println!("Some of your answers are incorrect. Review the clues and try again."),
            GridOutcome::Solved => println!("You solved the logic puzzle correctly!"),
        },
        Input::Click(id) => match game.click_point(&id).await? {
            RemovalOutcome::Removed { remaining } => println!("Outlier removed! {remaining} more to go."),
            RemovalOutcome::Cleared => println!("You've removed all outliers!"),
            RemovalOutcome::NotAnOutlier => {
                println!("Not an outlier. That point belongs to the main cluster.")
            }
            RemovalOutcome::Ignored => println!("No such point on the plot."),
        },
        Input::Retry => game.retry_level().await?,
        Input::Again => game.play_again().await?,
        Input::Help => println!("{HELP}"),
        Input::Quit => {}
    }
    Ok(())
}

/// Runs the read-eval-print loop until `quit` or end of input.
///
/// # Errors
///
/// Returns an error if stdin cannot be read or a view fails to render.
#[instrument(skip(game), fields(session_id = %game.session().id))]
pub async fn run<B: GameBackend>(mut game: GameOrchestrator<B>) -> anyhow::Result<()> {
    println!("Pattern & Logic Challenge - session {}", game.session().id);
    println!("Type `help` for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{}", render(game.session(), &game.view())?);
        let Some(line) = lines.next_line().await? else {
            debug!("End of input");
            break;
        };

        match parse_input(&line) {
            Ok(Input::Quit) => break,
            Ok(input) => {
                if let Err(e) = execute(&mut game, input).await {
                    report_failure(&e);
                }
            }
            Err(message) => println!("{message}"),
        }
    }

    println!("Goodbye! Resume with --session {}", game.session().id);
    Ok(())
}

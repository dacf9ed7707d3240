//! Level 2: shape/color/count logic grid with a fixed oracle.
//!
//! The clues are context for the player; validation is a lookup against the
//! one known assignment, never derived from the clues.

use derive_new::new;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::{debug, info, instrument};

/// Shapes hidden in the classroom.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Shape {
    /// Triangle.
    Triangle,
    /// Circle.
    Circle,
    /// Square.
    Square,
    /// Hexagon.
    Hexagon,
    /// Octagon.
    Octagon,
}

/// Colors a shape can take.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ShapeColor {
    /// Purple.
    Purple,
    /// Green.
    Green,
    /// Red.
    Red,
    /// Yellow.
    Yellow,
    /// Brown.
    Brown,
}

/// Color and count claimed for one shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct ShapeAssignment {
    /// Claimed color.
    pub color: ShapeColor,
    /// Claimed number hidden.
    pub count: u32,
}

/// A full or partial answer, keyed by shape.
pub type GridSolution = BTreeMap<Shape, ShapeAssignment>;

/// Story shown above the clues.
pub const STORY: &str = "Nina is a kindergarten teacher, and today the children are learning about \
colors and shapes. She has hidden around the classroom a unique number of each of five shapes her \
class are to find and count. Each type of shape is in a particular color.";

/// Clues shown to the player.
pub const CLUES: [&str; 9] = [
    "The triangles are the purple shapes. There are less than 6 triangles.",
    "Neither the squares nor the hexagons are green.",
    "The number of circles is not 4. The circles are not red or yellow.",
    "There are less octagons than there are yellow shapes.",
    "There are either 6 or 7 of the brown shapes.",
    "The number of yellow shapes is greater than 4.",
    "The smallest number of shapes hidden in the classroom applies to the red shapes.",
    "The hexagons are not the yellow shapes.",
    "There are less brown shapes than green shapes.",
];

const ANSWER_KEY: [(Shape, ShapeColor, u32); 5] = [
    (Shape::Triangle, ShapeColor::Purple, 4),
    (Shape::Circle, ShapeColor::Green, 7),
    (Shape::Square, ShapeColor::Yellow, 5),
    (Shape::Hexagon, ShapeColor::Brown, 6),
    (Shape::Octagon, ShapeColor::Red, 3),
];

/// The one correct assignment.
pub fn correct_solution() -> GridSolution {
    ANSWER_KEY
        .iter()
        .map(|&(shape, color, count)| (shape, ShapeAssignment::new(color, count)))
        .collect()
}

/// Outcome of a level 2 check, as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level2Verdict {
    /// Every shape matched.
    pub correct: bool,
    /// The answer key.
    pub correct_solution: GridSolution,
}

/// Raw level 2 body as posted by clients: shape name to `{color, count}`.
pub type Level2Submission = serde_json::Map<String, serde_json::Value>;

fn verdict(correct: bool) -> Level2Verdict {
    info!(correct, "Validated level 2 solution");
    Level2Verdict {
        correct,
        correct_solution: correct_solution(),
    }
}

/// Checks a submitted assignment against the answer key.
///
/// Every shape must be present with the exact color and count.
#[instrument(skip(submitted), fields(shapes = submitted.len()))]
pub fn validate_level2(submitted: &GridSolution) -> Level2Verdict {
    verdict(ANSWER_KEY.iter().all(|&(shape, color, count)| {
        submitted.get(&shape) == Some(&ShapeAssignment::new(color, count))
    }))
}

/// Checks an untyped submission against the answer key.
///
/// Only the five known shape keys are read; other keys are ignored. A missing
/// shape, an unknown color or a non-integer count is simply wrong.
#[instrument(skip(submitted), fields(keys = submitted.len()))]
pub fn validate_level2_submission(submitted: &Level2Submission) -> Level2Verdict {
    verdict(ANSWER_KEY.iter().all(|&(shape, color, count)| {
        submitted.get(&shape.to_string()).is_some_and(|entry| {
            entry.get("color").and_then(serde_json::Value::as_str) == Some(color.to_string().as_str())
                && entry.get("count").and_then(serde_json::Value::as_u64) == Some(u64::from(count))
        })
    }))
}

/// One editable row of the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DraftCell {
    /// Chosen color, if any.
    pub color: Option<ShapeColor>,
    /// Entered count, if any.
    pub count: Option<u32>,
}

/// Transient level 2 form state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicGrid {
    cells: BTreeMap<Shape, DraftCell>,
}

impl Default for LogicGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl LogicGrid {
    /// Creates an empty grid.
    pub fn new() -> Self {
        Self {
            cells: Shape::iter().map(|shape| (shape, DraftCell::default())).collect(),
        }
    }

    /// Rows in display order.
    pub fn cells(&self) -> impl Iterator<Item = (Shape, DraftCell)> + '_ {
        self.cells.iter().map(|(shape, cell)| (*shape, *cell))
    }

    /// Sets a row's color.
    pub fn set_color(&mut self, shape: Shape, color: ShapeColor) {
        debug!(%shape, %color, "Set grid color");
        self.cells.entry(shape).or_default().color = Some(color);
    }

    /// Sets a row's count.
    pub fn set_count(&mut self, shape: Shape, count: u32) {
        debug!(%shape, count, "Set grid count");
        self.cells.entry(shape).or_default().count = Some(count);
    }

    /// The full assignment, or `None` while any color or count is missing.
    ///
    /// A count of zero counts as missing.
    pub fn to_solution(&self) -> Option<GridSolution> {
        self.cells
            .iter()
            .map(|(shape, cell)| match (cell.color, cell.count) {
                (Some(color), Some(count)) if count > 0 => {
                    Some((*shape, ShapeAssignment::new(color, count)))
                }
                _ => None,
            })
            .collect()
    }

    /// Clears every row.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

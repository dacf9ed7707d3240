//! The three puzzle levels: pure validators plus their transient view state.

mod logic_grid;
mod outlier_plot;
mod question_bank;
mod sequence_quiz;

pub use logic_grid::{
    CLUES, DraftCell, GridSolution, Level2Verdict, LogicGrid, STORY, Shape, ShapeAssignment,
    ShapeColor, Level2Submission, correct_solution, validate_level2, validate_level2_submission,
};
pub use outlier_plot::{CLUSTER_POINTS, DataPoint, OutlierPlot, RemovalOutcome};
pub use question_bank::{
    Difficulty, Question, QuestionSet, answer_options, catalog, pick_one_question_per_difficulty,
    questions_for, synthesize_distractors,
};
pub use sequence_quiz::{AnswerOutcome, QuestionStatus, SequenceQuiz, check_answer};

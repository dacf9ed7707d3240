//! Level 1: three sequence questions answered in order.

use crate::levels::question_bank::{Question, answer_options, pick_one_question_per_difficulty};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, instrument};

/// Returns true when `selected` is the question's answer.
pub fn check_answer(question: &Question, selected: i64) -> bool {
    selected == question.answer
}

/// Where the current question stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum QuestionStatus {
    /// Waiting for a pick.
    Awaiting,
    /// A wrong option was picked; only a retry continues the level.
    Missed {
        /// The wrong pick.
        selected: i64,
    },
    /// The last question was answered correctly.
    Finished,
}

/// Result of picking an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Correct; the quiz moved on to question `next` (1-based).
    Correct {
        /// Number of the question now shown.
        next: usize,
    },
    /// Correct answer to the final question.
    LevelComplete,
    /// Wrong pick.
    Incorrect {
        /// The answer that was expected.
        answer: i64,
    },
    /// The question is already resolved; the pick was ignored.
    Ignored,
}

/// Transient level 1 state: the picked questions and current options.
#[derive(Debug, Clone)]
pub struct SequenceQuiz {
    questions: [Question; 3],
    index: usize,
    options: Vec<i64>,
    status: QuestionStatus,
}

impl SequenceQuiz {
    /// Picks a fresh question per tier and prepares the first one.
    #[instrument(skip(rng))]
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let questions = pick_one_question_per_difficulty(rng).in_order();
        let options = answer_options(&questions[0], rng);
        Self {
            questions,
            index: 0,
            options,
            status: QuestionStatus::Awaiting,
        }
    }

    /// The question on screen.
    pub fn current_question(&self) -> &Question {
        &self.questions[self.index]
    }

    /// All three questions in play order.
    pub fn questions(&self) -> &[Question; 3] {
        &self.questions
    }

    /// 1-based number of the current question.
    pub fn question_number(&self) -> usize {
        self.index + 1
    }

    /// Total questions in the level.
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Shuffled options for the current question.
    pub fn options(&self) -> &[i64] {
        &self.options
    }

    /// Status of the current question.
    pub fn status(&self) -> QuestionStatus {
        self.status
    }

    /// Grades a pick without changing state.
    pub fn grade(&self, selected: i64) -> AnswerOutcome {
        if self.status != QuestionStatus::Awaiting {
            return AnswerOutcome::Ignored;
        }
        let question = self.current_question();
        if !check_answer(question, selected) {
            AnswerOutcome::Incorrect {
                answer: question.answer,
            }
        } else if self.index + 1 == self.questions.len() {
            AnswerOutcome::LevelComplete
        } else {
            AnswerOutcome::Correct {
                next: self.index + 2,
            }
        }
    }

    /// Grades a pick and advances, locks or finishes the quiz accordingly.
    #[instrument(skip(self, rng), fields(question = self.question_number()))]
    pub fn answer<R: Rng + ?Sized>(&mut self, selected: i64, rng: &mut R) -> AnswerOutcome {
        let outcome = self.grade(selected);
        match outcome {
            AnswerOutcome::Correct { next } => {
                self.index += 1;
                self.options = answer_options(&self.questions[self.index], rng);
                self.status = QuestionStatus::Awaiting;
                debug!(next, "Advanced to next question");
            }
            AnswerOutcome::LevelComplete => {
                self.status = QuestionStatus::Finished;
                info!("All sequence questions answered");
            }
            AnswerOutcome::Incorrect { answer } => {
                self.status = QuestionStatus::Missed { selected };
                debug!(selected, answer, "Wrong answer");
            }
            AnswerOutcome::Ignored => debug!(selected, "Pick ignored"),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::question_bank::Difficulty;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn questions_run_easy_to_hard() {
        let quiz = SequenceQuiz::new(&mut StdRng::seed_from_u64(1));
        let tiers: Vec<_> = quiz.questions().iter().map(|q| q.difficulty).collect();
        assert_eq!(tiers, vec![Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]);
    }

    #[test]
    fn three_correct_answers_finish_the_level() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut quiz = SequenceQuiz::new(&mut rng);
        let a = quiz.current_question().answer;
        assert_eq!(quiz.answer(a, &mut rng), AnswerOutcome::Correct { next: 2 });
        let a = quiz.current_question().answer;
        assert_eq!(quiz.answer(a, &mut rng), AnswerOutcome::Correct { next: 3 });
        let a = quiz.current_question().answer;
        assert_eq!(quiz.answer(a, &mut rng), AnswerOutcome::LevelComplete);
        assert_eq!(quiz.status(), QuestionStatus::Finished);
    }

    #[test]
    fn wrong_answer_locks_the_question() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut quiz = SequenceQuiz::new(&mut rng);
        let answer = quiz.current_question().answer;
        let wrong = quiz.options().iter().copied().find(|&o| o != answer).unwrap();

        assert_eq!(quiz.answer(wrong, &mut rng), AnswerOutcome::Incorrect { answer });
        assert_eq!(quiz.answer(answer, &mut rng), AnswerOutcome::Ignored);
        assert_eq!(quiz.question_number(), 1);
    }
}

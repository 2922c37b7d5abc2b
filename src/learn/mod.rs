//! Learn - quizzes and page gating
//!
//! Course and quiz content is data supplied by the host; this module only
//! holds the rules: how an attempt advances, how it is scored, and which
//! pages need a connected wallet.

mod gate;
mod quiz;

pub use gate::{require_connected, AccessDenied};
pub use quiz::{grade, AnswerOption, Question, Quiz, QuizAttempt, QuizError, QuizResult};

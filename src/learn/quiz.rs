//! Quiz - attempt state machine and scoring

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("quiz {0} has no questions")]
    Empty(String),
    #[error("unknown option {option} for question {question}")]
    UnknownOption { question: String, option: String },
    #[error("question {0} has not been answered")]
    Unanswered(String),
    #[error("quiz already submitted")]
    Submitted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(alias = "question")]
    pub prompt: String,
    pub options: Vec<AnswerOption>,
    pub correct_answer: String,
}

impl Question {
    pub fn has_option(&self, option_id: &str) -> bool {
        self.options.iter().any(|o| o.id == option_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    pub quiz_id: String,
    pub correct: usize,
    pub total: usize,
    pub percentage: f64,
    pub threshold: u8,
    pub passed: bool,
}

/// Score answers (by question position) against a percentage threshold.
///
/// Missing answers count as wrong. Pass is decided in integers, so
/// 7/10 against 70 passes.
pub fn grade(quiz: &Quiz, answers: &[Option<String>], threshold: u8) -> Result<QuizResult, QuizError> {
    let total = quiz.questions.len();
    if total == 0 {
        return Err(QuizError::Empty(quiz.id.clone()));
    }

    let correct = quiz
        .questions
        .iter()
        .zip(answers.iter().map(Some).chain(std::iter::repeat(None)))
        .filter(|(q, a)| matches!(a, Some(Some(answer)) if *answer == q.correct_answer))
        .count();

    Ok(QuizResult {
        quiz_id: quiz.id.clone(),
        correct,
        total,
        percentage: correct as f64 / total as f64 * 100.0,
        threshold,
        passed: correct * 100 >= threshold as usize * total,
    })
}

/// One pass through a quiz, question by question.
#[derive(Debug, Clone)]
pub struct QuizAttempt<'a> {
    quiz: &'a Quiz,
    threshold: u8,
    current: usize,
    answers: Vec<Option<String>>,
    result: Option<QuizResult>,
}

impl<'a> QuizAttempt<'a> {
    pub fn start(quiz: &'a Quiz, threshold: u8) -> Result<Self, QuizError> {
        if quiz.questions.is_empty() {
            return Err(QuizError::Empty(quiz.id.clone()));
        }
        Ok(Self { quiz, threshold, current: 0, answers: vec![None; quiz.questions.len()], result: None })
    }

    pub fn current_index(&self) -> usize { self.current }

    pub fn current_question(&self) -> &'a Question { &self.quiz.questions[self.current] }

    pub fn selected(&self) -> Option<&str> { self.answers[self.current].as_deref() }

    pub fn is_last(&self) -> bool { self.current + 1 == self.quiz.questions.len() }

    /// Percentage of the way through, counting the current question.
    pub fn progress(&self) -> f64 {
        (self.current + 1) as f64 / self.quiz.questions.len() as f64 * 100.0
    }

    pub fn result(&self) -> Option<&QuizResult> { self.result.as_ref() }

    /// Record (or replace) the answer for the current question.
    pub fn select(&mut self, option_id: &str) -> Result<(), QuizError> {
        if self.result.is_some() {
            return Err(QuizError::Submitted);
        }
        let question = self.current_question();
        if !question.has_option(option_id) {
            return Err(QuizError::UnknownOption { question: question.id.clone(), option: option_id.into() });
        }
        self.answers[self.current] = Some(option_id.to_string());
        Ok(())
    }

    /// Next question, or the graded result once the last one is answered.
    pub fn advance(&mut self) -> Result<Option<&QuizResult>, QuizError> {
        if self.result.is_some() {
            return Err(QuizError::Submitted);
        }
        if self.selected().is_none() {
            return Err(QuizError::Unanswered(self.current_question().id.clone()));
        }
        if !self.is_last() {
            self.current += 1;
            return Ok(None);
        }
        self.result = Some(grade(self.quiz, &self.answers, self.threshold)?);
        Ok(self.result.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz(n: usize) -> Quiz {
        Quiz {
            id: "blockchain-basics".into(),
            title: "Blockchain Basics".into(),
            description: String::new(),
            questions: (0..n)
                .map(|i| Question {
                    id: format!("q{}", i + 1),
                    prompt: format!("Question {}", i + 1),
                    options: ["a", "b", "c", "d"].iter().map(|id| AnswerOption { id: id.to_string(), text: id.to_uppercase() }).collect(),
                    correct_answer: "a".into(),
                })
                .collect(),
        }
    }

    fn answers(correct: usize, total: usize) -> Vec<Option<String>> {
        (0..total).map(|i| Some(if i < correct { "a" } else { "b" }.to_string())).collect()
    }

    #[test]
    fn four_of_five_passes() {
        let result = grade(&quiz(5), &answers(4, 5), 70).unwrap();
        assert_eq!(result.correct, 4);
        assert_eq!(result.percentage, 80.0);
        assert!(result.passed);
    }

    #[test]
    fn three_of_five_fails() {
        let result = grade(&quiz(5), &answers(3, 5), 70).unwrap();
        assert_eq!(result.percentage, 60.0);
        assert!(!result.passed);
    }

    #[test]
    fn exactly_at_threshold_passes() {
        assert!(grade(&quiz(10), &answers(7, 10), 70).unwrap().passed);
        assert!(!grade(&quiz(10), &answers(6, 10), 70).unwrap().passed);
    }

    #[test]
    fn missing_answers_are_wrong() {
        let result = grade(&quiz(3), &[Some("a".into())], 70).unwrap();
        assert_eq!(result.correct, 1);
        assert_eq!(result.total, 3);
    }

    #[test]
    fn empty_quiz_is_rejected() {
        assert_eq!(grade(&quiz(0), &[], 70).unwrap_err(), QuizError::Empty("blockchain-basics".into()));
        assert!(QuizAttempt::start(&quiz(0), 70).is_err());
    }

    #[test]
    fn attempt_walks_questions_then_grades() {
        let quiz = quiz(2);
        let mut attempt = QuizAttempt::start(&quiz, 70).unwrap();
        assert_eq!(attempt.progress(), 50.0);

        assert_eq!(attempt.advance().unwrap_err(), QuizError::Unanswered("q1".into()));
        assert!(matches!(attempt.select("z"), Err(QuizError::UnknownOption { .. })));

        attempt.select("b").unwrap();
        attempt.select("a").unwrap();
        assert_eq!(attempt.advance().unwrap(), None);
        assert_eq!(attempt.current_index(), 1);
        assert!(attempt.is_last());

        attempt.select("c").unwrap();
        let result = attempt.advance().unwrap().cloned().unwrap();
        assert_eq!(result.correct, 1);
        assert!(!result.passed);
        assert_eq!(attempt.select("a").unwrap_err(), QuizError::Submitted);
    }

    #[test]
    fn deserializes_page_shaped_questions() {
        let q: Question = serde_json::from_str(
            r#"{"id": "q1", "question": "What is a block?", "options": [{"id": "a", "text": "A record"}], "correctAnswer": "a"}"#,
        )
        .unwrap();
        assert_eq!(q.prompt, "What is a block?");
        assert_eq!(q.correct_answer, "a");
    }
}

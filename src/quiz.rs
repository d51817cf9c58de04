//! Quiz questions and the state of one quiz run.

use serde::{Deserialize, Serialize};

/// One multiple-choice question as produced by the tutor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer_index: usize,
    pub explanation: String,
}

impl QuizQuestion {
    /// A question is usable when it has options and the answer index points at one.
    pub fn is_valid(&self) -> bool {
        !self.question.trim().is_empty()
            && !self.options.is_empty()
            && self.correct_answer_index < self.options.len()
    }

    pub fn correct_option(&self) -> Option<&str> {
        self.options
            .get(self.correct_answer_index)
            .map(String::as_str)
    }
}

/// Outcome of answering the current question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Incorrect { correct_index: usize },
    /// The current question was already answered; the score is unchanged
    AlreadyAnswered,
}

/// Final tally of a finished quiz.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuizResult {
    pub score: usize,
    pub total: usize,
}

impl QuizResult {
    pub fn is_perfect(&self) -> bool {
        self.score == self.total
    }
}

/// A quiz in progress.
///
/// Each question is answered once; [`QuizSession::advance`] moves on and the
/// session finishes after the last question.
#[derive(Clone, Debug)]
pub struct QuizSession {
    questions: Vec<QuizQuestion>,
    current: usize,
    score: usize,
    selected: Option<usize>,
    finished: bool,
}

impl QuizSession {
    /// Start a quiz. Returns `None` when there is nothing to ask.
    pub fn start(questions: Vec<QuizQuestion>) -> Option<Self> {
        let questions: Vec<_> = questions.into_iter().filter(QuizQuestion::is_valid).collect();
        if questions.is_empty() {
            return None;
        }
        Some(Self {
            questions,
            current: 0,
            score: 0,
            selected: None,
            finished: false,
        })
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        if self.finished {
            None
        } else {
            self.questions.get(self.current)
        }
    }

    /// Zero-based index of the current question and the question count.
    pub fn progress(&self) -> (usize, usize) {
        (self.current, self.questions.len())
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_answered(&self) -> bool {
        self.selected.is_some()
    }

    pub fn is_last_question(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    pub fn answer(&mut self, index: usize) -> AnswerOutcome {
        if self.selected.is_some() || self.finished {
            return AnswerOutcome::AlreadyAnswered;
        }
        self.selected = Some(index);
        let correct_index = self.questions[self.current].correct_answer_index;
        if index == correct_index {
            self.score += 1;
            AnswerOutcome::Correct
        } else {
            AnswerOutcome::Incorrect { correct_index }
        }
    }

    /// Move past an answered question. Returns the result once the quiz is over.
    ///
    /// Does nothing until the current question has been answered.
    pub fn advance(&mut self) -> Option<QuizResult> {
        if self.finished {
            return self.result();
        }
        if self.selected.is_none() {
            return None;
        }
        if self.is_last_question() {
            self.finished = true;
        } else {
            self.current += 1;
            self.selected = None;
        }
        self.result()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn result(&self) -> Option<QuizResult> {
        self.finished.then_some(QuizResult {
            score: self.score,
            total: self.questions.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: usize) -> QuizQuestion {
        QuizQuestion {
            question: "満月のとき、月はどこにある？".to_string(),
            options: vec![
                "太陽と地球のあいだ".to_string(),
                "地球をはさんで太陽の反対がわ".to_string(),
                "太陽のうしろ".to_string(),
            ],
            correct_answer_index: correct,
            explanation: "太陽の光をぜんぶ正面から受けているよ。".to_string(),
        }
    }

    #[test]
    fn test_empty_quiz_does_not_start() {
        assert!(QuizSession::start(vec![]).is_none());
        assert!(QuizSession::start(vec![question(7)]).is_none());
    }

    #[test]
    fn test_full_run() {
        let mut session = QuizSession::start(vec![question(1), question(0)]).unwrap();
        assert_eq!(session.progress(), (0, 2));

        assert_eq!(session.answer(1), AnswerOutcome::Correct);
        assert_eq!(session.answer(0), AnswerOutcome::AlreadyAnswered);
        assert_eq!(session.score(), 1);
        assert!(session.advance().is_none());

        assert_eq!(session.answer(2), AnswerOutcome::Incorrect { correct_index: 0 });
        let result = session.advance().unwrap();
        assert_eq!(result, QuizResult { score: 1, total: 2 });
        assert!(!result.is_perfect());
        assert!(session.current_question().is_none());
    }

    #[test]
    fn test_advance_requires_answer() {
        let mut session = QuizSession::start(vec![question(0), question(0)]).unwrap();
        assert!(session.advance().is_none());
        assert_eq!(session.progress(), (0, 2));
    }

    #[test]
    fn test_question_json_shape() {
        let json = r#"{"question":"q","options":["a","b"],"correctAnswerIndex":1,"explanation":"e"}"#;
        let q: QuizQuestion = serde_json::from_str(json).unwrap();
        assert_eq!(q.correct_option(), Some("b"));
        assert!(q.is_valid());
    }
}

//! Final score summary, built from the bank and the session state.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::store::SessionState;
use crate::question::{QuestionBank, QuestionId};

/// Outcome of one question, listed in bank order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub number: usize,
    pub id: QuestionId,
    pub question: String,
    /// `None` when the question was skipped or timed out.
    pub your_answer: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizReport {
    pub entries: Vec<ReportEntry>,
    pub correct: usize,
    /// Bank size, not the number of answered questions.
    pub total: usize,
    pub finished: bool,
}

impl QuizReport {
    pub fn build(bank: &QuestionBank, state: &SessionState) -> Self {
        let entries = bank
            .questions()
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let record = state.answer(q.id);
                ReportEntry {
                    number: i + 1,
                    id: q.id,
                    question: q.question.clone(),
                    your_answer: record.map(|r| r.answer.clone()),
                    correct_answer: q.correct_answer.clone(),
                    is_correct: record.is_some_and(|r| r.is_correct),
                }
            })
            .collect();

        Self {
            entries,
            correct: state.correct_count(),
            total: bank.len(),
            finished: state.finished,
        }
    }

    pub fn answered(&self) -> usize {
        self.entries.iter().filter(|e| e.your_answer.is_some()).count()
    }
}

impl fmt::Display for QuizReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Quiz Results")?;
        for entry in &self.entries {
            writeln!(f)?;
            writeln!(f, "{}: {}", entry.number, entry.question)?;
            writeln!(
                f,
                "  Your answer: {}",
                entry.your_answer.as_deref().unwrap_or("-")
            )?;
            writeln!(f, "  Correct answer: {}", entry.correct_answer)?;
            writeln!(
                f,
                "  {}",
                if entry.is_correct { "Correct" } else { "Incorrect" }
            )?;
        }
        writeln!(f)?;
        write!(f, "Score: {} / {}", self.correct, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::Question;
    use crate::session::store::{reduce, Action};

    #[test]
    fn report_lists_bank_order_and_score() {
        let bank = QuestionBank::new(vec![
            Question::new(10, "first", ["A", "B"], "A"),
            Question::new(20, "second", ["C", "D"], "C"),
            Question::new(30, "third", ["E", "F"], "F"),
        ])
        .unwrap();

        let state = reduce(
            SessionState::default(),
            &Action::RecordAnswer {
                id: QuestionId(30),
                option: "F".into(),
                is_correct: true,
            },
        );
        let state = reduce(
            state,
            &Action::RecordAnswer {
                id: QuestionId(10),
                option: "B".into(),
                is_correct: false,
            },
        );

        let report = QuizReport::build(&bank, &state);
        let ids: Vec<_> = report.entries.iter().map(|e| e.id.0).collect();
        assert_eq!(ids, vec![10, 20, 30]);
        assert_eq!(report.entries[1].your_answer, None);
        assert!(!report.entries[1].is_correct);
        assert_eq!(report.correct, 1);
        assert_eq!(report.total, 3);
        assert_eq!(report.answered(), 2);
    }

    #[test]
    fn display_ends_with_score() {
        let bank = QuestionBank::sample();
        let report = QuizReport::build(&bank, &SessionState::default());
        let text = report.to_string();
        assert!(text.starts_with("Quiz Results"));
        assert!(text.ends_with("Score: 0 / 5"));
    }
}

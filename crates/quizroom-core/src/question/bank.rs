//! Static question bank.
//!
//! The bank is loaded once at startup and never mutated afterwards; sessions
//! work on their own clone. Banks are read from TOML (`[[questions]]`) or
//! JSON (either `{"questions": [...]}` or a bare array).

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::model::{Question, QuestionId};
use crate::error::{Result, ValidationError};

/// Validated, read-only collection of questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

#[derive(Deserialize)]
struct BankFile {
    questions: Vec<Question>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonBank {
    Wrapped(BankFile),
    Bare(Vec<Question>),
}

impl QuestionBank {
    /// Build a bank, rejecting anything a session could not play.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyBank`] for an empty list, and the
    /// per-question variants for duplicate ids, missing options, duplicate
    /// options, or a correct answer that is not among the options.
    pub fn new(questions: Vec<Question>) -> Result<Self, ValidationError> {
        if questions.is_empty() {
            return Err(ValidationError::EmptyBank);
        }

        let mut seen = HashSet::new();
        for q in &questions {
            if !seen.insert(q.id) {
                return Err(ValidationError::DuplicateId(q.id));
            }
            validate_question(q)?;
        }

        Ok(Self { questions })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ValidationError> {
        let file: BankFile = toml::from_str(content).map_err(|e| ValidationError::ParseFailed {
            path: "<toml>".into(),
            message: e.to_string(),
        })?;
        Self::new(file.questions)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ValidationError> {
        let parsed: JsonBank =
            serde_json::from_str(content).map_err(|e| ValidationError::ParseFailed {
                path: "<json>".into(),
                message: e.to_string(),
            })?;
        let questions = match parsed {
            JsonBank::Wrapped(file) => file.questions,
            JsonBank::Bare(questions) => questions,
        };
        Self::new(questions)
    }

    /// Load a bank file; `.json` files are parsed as JSON, everything else as TOML.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read, or a validation error
    /// if it cannot be parsed or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let bank = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        };

        let bank = bank.map_err(|e| match e {
            ValidationError::ParseFailed { message, .. } => ValidationError::ParseFailed {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;

        tracing::debug!(path = %path.display(), questions = bank.len(), "loaded question bank");
        Ok(bank)
    }

    /// Built-in bank used when no file is supplied.
    pub fn sample() -> Self {
        Self {
            questions: vec![
                Question::new(
                    1,
                    "Which keyword declares an immutable binding in Rust?",
                    ["let", "mut", "const fn", "static mut"],
                    "let",
                ),
                Question::new(
                    2,
                    "What does the `?` operator do on an `Err` value?",
                    [
                        "Returns it early from the function",
                        "Panics",
                        "Ignores it",
                        "Converts it to `None`",
                    ],
                    "Returns it early from the function",
                ),
                Question::new(
                    3,
                    "Which trait allows a type to be duplicated with a bitwise copy?",
                    ["Copy", "Clone", "Default", "Send"],
                    "Copy",
                ),
                Question::new(
                    4,
                    "Which smart pointer provides shared ownership across threads?",
                    ["Arc", "Rc", "Box", "Cell"],
                    "Arc",
                ),
                Question::new(
                    5,
                    "What is the type of the string literal \"hi\"?",
                    ["&'static str", "String", "&String", "str"],
                    "&'static str",
                ),
            ],
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// A constructed bank always holds at least one question.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

fn validate_question(q: &Question) -> Result<(), ValidationError> {
    if q.options.is_empty() {
        return Err(ValidationError::NoOptions(q.id));
    }

    let mut seen = HashSet::new();
    for option in &q.options {
        if !seen.insert(option.as_str()) {
            return Err(ValidationError::DuplicateOption {
                id: q.id,
                option: option.clone(),
            });
        }
    }

    if !seen.contains(q.correct_answer.as_str()) {
        return Err(ValidationError::AnswerNotAnOption {
            id: q.id,
            answer: q.correct_answer.clone(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn empty_bank_is_rejected() {
        assert_eq!(QuestionBank::new(vec![]), Err(ValidationError::EmptyBank));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = QuestionBank::new(vec![
            Question::new(1, "a", ["x", "y"], "x"),
            Question::new(1, "b", ["x", "y"], "y"),
        ]);
        assert_eq!(result, Err(ValidationError::DuplicateId(QuestionId(1))));
    }

    #[test]
    fn answer_must_be_an_option() {
        let result = QuestionBank::new(vec![Question::new(4, "a", ["x", "y"], "z")]);
        assert!(matches!(
            result,
            Err(ValidationError::AnswerNotAnOption { id: QuestionId(4), .. })
        ));
    }

    #[test]
    fn duplicate_options_are_rejected() {
        let result = QuestionBank::new(vec![Question::new(2, "a", ["x", "x"], "x")]);
        assert!(matches!(result, Err(ValidationError::DuplicateOption { .. })));
    }

    #[test]
    fn question_without_options_is_rejected() {
        let empty: [&str; 0] = [];
        let result = QuestionBank::new(vec![Question::new(9, "a", empty, "x")]);
        assert_eq!(result, Err(ValidationError::NoOptions(QuestionId(9))));
    }

    #[test]
    fn parses_toml_bank() {
        let toml = r#"
            [[questions]]
            id = 1
            question = "Capital of France?"
            options = ["Paris", "Rome"]
            correct_answer = "Paris"

            [[questions]]
            id = 2
            question = "2 + 3?"
            options = ["4", "5"]
            correct_answer = "5"
        "#;
        let bank = QuestionBank::from_toml_str(toml).unwrap();
        assert_eq!(bank.len(), 2);
        assert_eq!(bank.get(QuestionId(2)).unwrap().correct_answer, "5");
    }

    #[test]
    fn parses_bare_json_array() {
        let json = r#"[{"id": 1, "question": "Q", "options": ["A", "B"], "correctAnswer": "A"}]"#;
        let bank = QuestionBank::from_json_str(json).unwrap();
        assert_eq!(bank.questions()[0].question, "Q");
    }

    #[test]
    fn malformed_json_reports_parse_failure() {
        let result = QuestionBank::from_json_str("{not json");
        assert!(matches!(result, Err(ValidationError::ParseFailed { .. })));
    }

    #[test]
    fn load_reads_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.json");
        std::fs::write(
            &path,
            r#"{"questions": [{"id": 5, "question": "Q", "options": ["A"], "correct_answer": "A"}]}"#,
        )
        .unwrap();
        let bank = QuestionBank::load(&path).unwrap();
        assert_eq!(bank.len(), 1);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = QuestionBank::load(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(CoreError::Io(_))));
    }

    #[test]
    fn load_parse_failure_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "questions = 3").unwrap();
        match QuestionBank::load(&path) {
            Err(CoreError::Validation(ValidationError::ParseFailed { path: p, .. })) => {
                assert_eq!(p, path)
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn sample_bank_is_valid() {
        let sample = QuestionBank::sample();
        assert_eq!(
            QuestionBank::new(sample.questions().to_vec()).unwrap(),
            sample
        );
    }
}

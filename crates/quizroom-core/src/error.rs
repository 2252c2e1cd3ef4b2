//! Core error types for quizroom-core.
//!
//! This module defines the error hierarchy using thiserror. Bank and
//! configuration problems surface at startup; misuse of a running session
//! surfaces as [`QuizError`].

use std::path::PathBuf;
use thiserror::Error;

use crate::question::QuestionId;

/// Core error type for quizroom-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Question bank validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Home/config directory could not be prepared
    #[error("Config directory unavailable: {0}")]
    DirUnavailable(String),
}

/// Question bank validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// A quiz cannot start without questions
    #[error("Question bank is empty")]
    EmptyBank,

    /// Two questions share the same identifier
    #[error("Duplicate question id {0}")]
    DuplicateId(QuestionId),

    /// Question has no options to choose from
    #[error("Question {0} has no options")]
    NoOptions(QuestionId),

    /// Same option text listed twice for one question
    #[error("Question {id} lists option '{option}' more than once")]
    DuplicateOption { id: QuestionId, option: String },

    /// Correct answer must be one of the options
    #[error("Question {id}: correct answer '{answer}' is not one of its options")]
    AnswerNotAnOption { id: QuestionId, answer: String },

    /// Bank file could not be parsed
    #[error("Failed to parse question bank {path}: {message}")]
    ParseFailed { path: PathBuf, message: String },
}

/// Errors produced by operations on a running quiz.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
    /// Skip is withheld on the last remaining question
    #[error("Cannot skip the last remaining question")]
    SkipUnavailable,

    /// Every question has already been resolved
    #[error("Quiz is already finished")]
    AlreadyFinished,

    /// Option index typed by the user is out of range
    #[error("Option {index} out of range (1-{len})")]
    OptionOutOfRange { index: usize, len: usize },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

//! # Quizroom Core Library
//!
//! This library provides the core logic for Quizroom, a timed
//! multiple-choice quiz. The CLI binary is a thin terminal front end over
//! the same core library.
//!
//! ## Architecture
//!
//! - **Session Store**: answers recorded so far plus the finished flag,
//!   changed only through [`Action`]s applied by the pure [`reduce`]
//! - **Question Sequencer**: owns the shrinking pool of unresolved questions
//!   and draws the next one uniformly at random
//! - **Countdown**: per-question one-shot expiry plus a progress tick, both
//!   cancelled whenever the question changes
//! - **Runner**: single-task event loop feeding user input and timer signals
//!   to the session one at a time
//!
//! ## Key Components
//!
//! - [`QuizSession`]: store and sequencer wired together
//! - [`QuizRunner`]: real-time driver with a [`Renderer`] boundary
//! - [`QuestionBank`]: validated, read-only question source
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod question;
pub mod session;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, QuizError, ValidationError};
pub use events::Event;
pub use question::{Question, QuestionBank, QuestionId};
pub use session::{
    reduce, Action, AnswerRecord, QuestionSequencer, QuestionView, QuizReport, QuizRunner,
    QuizSession, Renderer, ReportEntry, SequencerOptions, SessionInput, SessionState,
    SessionStore, Transition, UserInput,
};
pub use storage::Config;
pub use timer::{Countdown, CountdownHandle, CountdownSettings, TimerSignal};

mod quiz;
mod report;
mod runner;
mod sequencer;
mod store;

pub use quiz::{QuizSession, SessionInput};
pub use report::{QuizReport, ReportEntry};
pub use runner::{QuizRunner, Renderer, UserInput};
pub use sequencer::{QuestionSequencer, QuestionView, SequencerOptions, Transition};
pub use store::{reduce, Action, AnswerRecord, SessionState, SessionStore};

mod bank;
mod model;

pub use bank::QuestionBank;
pub use model::{Question, QuestionId};

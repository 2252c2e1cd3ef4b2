use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::question::QuestionId;

/// Every state change in a quiz session produces an Event.
/// Renderers consume them; `--json` output prints them one per line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        total: usize,
        question_time_ms: u64,
        at: DateTime<Utc>,
    },
    QuestionPresented {
        question_id: QuestionId,
        number: usize,
        total: usize,
        prompt: String,
        /// Options in display order.
        options: Vec<String>,
        can_skip: bool,
        at: DateTime<Utc>,
    },
    AnswerRecorded {
        question_id: QuestionId,
        answer: String,
        is_correct: bool,
        at: DateTime<Utc>,
    },
    QuestionSkipped {
        question_id: QuestionId,
        at: DateTime<Utc>,
    },
    /// Countdown expired before the user acted.
    QuestionTimedOut {
        question_id: QuestionId,
        at: DateTime<Utc>,
    },
    SessionFinished {
        correct: usize,
        total: usize,
        at: DateTime<Utc>,
    },
    /// User quit before every question was resolved.
    SessionAbandoned {
        resolved: usize,
        total: usize,
        at: DateTime<Utc>,
    },
}

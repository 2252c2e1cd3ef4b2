//! Session state store.
//!
//! State changes go through a closed set of [`Action`]s applied by the pure
//! [`reduce`] function. [`SessionStore`] wraps the current state and
//! publishes every new state on a `watch` channel so renderers can observe
//! it without holding a reference to the store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::question::QuestionId;

/// The user's answer to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub answer: String,
    pub is_correct: bool,
}

/// Answers recorded so far plus the finished flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub answers: BTreeMap<QuestionId, AnswerRecord>,
    pub finished: bool,
}

impl SessionState {
    pub fn answer(&self, id: QuestionId) -> Option<&AnswerRecord> {
        self.answers.get(&id)
    }

    pub fn correct_count(&self) -> usize {
        self.answers.values().filter(|a| a.is_correct).count()
    }
}

/// State transitions understood by [`reduce`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    RecordAnswer {
        id: QuestionId,
        option: String,
        is_correct: bool,
    },
    MarkFinished,
}

/// Apply one action, producing the next state.
pub fn reduce(mut state: SessionState, action: &Action) -> SessionState {
    match action {
        Action::RecordAnswer {
            id,
            option,
            is_correct,
        } => {
            state.answers.insert(
                *id,
                AnswerRecord {
                    answer: option.clone(),
                    is_correct: *is_correct,
                },
            );
        }
        Action::MarkFinished => state.finished = true,
    }
    state
}

/// Owner of the session state for one quiz run.
#[derive(Debug)]
pub struct SessionStore {
    state: SessionState,
    notify: watch::Sender<SessionState>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (notify, _) = watch::channel(SessionState::default());
        Self {
            state: SessionState::default(),
            notify,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.finished
    }

    /// Observe every state the store moves through.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.notify.subscribe()
    }

    pub fn dispatch(&mut self, action: Action) {
        tracing::debug!(?action, "session dispatch");
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, &action);
        self.notify.send_replace(self.state.clone());
    }

    pub fn record_answer(&mut self, id: QuestionId, option: impl Into<String>, is_correct: bool) {
        self.dispatch(Action::RecordAnswer {
            id,
            option: option.into(),
            is_correct,
        });
    }

    /// Idempotent; observers are not notified again once finished.
    pub fn mark_finished(&mut self) {
        if self.state.finished {
            return;
        }
        self.dispatch(Action::MarkFinished);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

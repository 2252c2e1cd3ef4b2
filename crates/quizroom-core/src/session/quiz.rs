//! A quiz session: the store and the sequencer wired together.
//!
//! [`QuizSession::apply`] is the single entry point for the three inbound
//! events (answer, skip, timeout). It is synchronous and deterministic for a
//! given seed; timing lives in the runner.

use chrono::Utc;

use super::report::QuizReport;
use super::sequencer::{QuestionSequencer, QuestionView, SequencerOptions, Transition};
use super::store::{SessionState, SessionStore};
use crate::error::QuizError;
use crate::events::Event;
use crate::question::QuestionBank;

/// Inbound event for a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    Answer(String),
    /// 0-based position in the displayed options.
    AnswerIndex(usize),
    Skip,
    Timeout,
}

#[derive(Debug)]
pub struct QuizSession {
    bank: QuestionBank,
    store: SessionStore,
    sequencer: QuestionSequencer,
}

impl QuizSession {
    pub fn new(bank: QuestionBank, options: SequencerOptions) -> Self {
        let sequencer = QuestionSequencer::new(&bank, options);
        tracing::info!(questions = bank.len(), "quiz session started");
        Self {
            bank,
            store: SessionStore::new(),
            sequencer,
        }
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn state(&self) -> &SessionState {
        self.store.state()
    }

    pub fn sequencer(&self) -> &QuestionSequencer {
        &self.sequencer
    }

    pub fn is_finished(&self) -> bool {
        self.store.is_finished()
    }

    pub fn view(&self) -> Option<QuestionView> {
        self.sequencer.view()
    }

    pub fn report(&self) -> QuizReport {
        QuizReport::build(&self.bank, self.store.state())
    }

    /// Event describing the current question, if any.
    pub fn presented_event(&self) -> Option<Event> {
        let view = self.view()?;
        Some(Event::QuestionPresented {
            question_id: view.id,
            number: view.number,
            total: view.total,
            prompt: view.prompt,
            options: view.options,
            can_skip: view.can_skip,
            at: Utc::now(),
        })
    }

    /// Apply one inbound event.
    ///
    /// Returns the events it produced: the resolution of the current question
    /// followed by either the next `QuestionPresented` or `SessionFinished`.
    pub fn apply(&mut self, input: SessionInput) -> Result<Vec<Event>, QuizError> {
        let (transition, resolution) = match input {
            SessionInput::Answer(option) => {
                let t = self.sequencer.select_answer(&mut self.store, &option)?;
                (t, self.answer_event(t))
            }
            SessionInput::AnswerIndex(index) => {
                let t = self.sequencer.select_option(&mut self.store, index)?;
                (t, self.answer_event(t))
            }
            SessionInput::Skip => {
                let t = self.sequencer.skip(&mut self.store)?;
                let event = Event::QuestionSkipped {
                    question_id: t.resolved,
                    at: Utc::now(),
                };
                (t, event)
            }
            SessionInput::Timeout => {
                let t = self.sequencer.time_out(&mut self.store)?;
                let event = Event::QuestionTimedOut {
                    question_id: t.resolved,
                    at: Utc::now(),
                };
                (t, event)
            }
        };

        let mut events = vec![resolution];
        if transition.finished() {
            let state = self.store.state();
            tracing::info!(
                correct = state.correct_count(),
                total = self.bank.len(),
                "quiz session finished"
            );
            events.push(Event::SessionFinished {
                correct: state.correct_count(),
                total: self.bank.len(),
                at: Utc::now(),
            });
        } else if let Some(presented) = self.presented_event() {
            events.push(presented);
        }
        Ok(events)
    }

    fn answer_event(&self, t: Transition) -> Event {
        let record = self.store.state().answer(t.resolved);
        Event::AnswerRecorded {
            question_id: t.resolved,
            answer: record.map(|r| r.answer.clone()).unwrap_or_default(),
            is_correct: record.is_some_and(|r| r.is_correct),
            at: Utc::now(),
        }
    }
}

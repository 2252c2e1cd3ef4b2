//! Event loop that drives a [`QuizSession`] in real time.
//!
//! The loop runs on a single task and handles one event at a time: user
//! input from a channel, or a signal from the current countdown. A fresh
//! countdown is started whenever the current question changes, after the
//! previous one has been dropped (and its tasks aborted). Progress ticks
//! only update the renderer; a question times out solely on the expiry
//! signal.

use chrono::Utc;
use tokio::sync::mpsc;

use super::quiz::{QuizSession, SessionInput};
use super::report::QuizReport;
use super::sequencer::QuestionView;
use crate::error::QuizError;
use crate::events::Event;
use crate::question::QuestionId;
use crate::timer::{Countdown, CountdownHandle, CountdownSettings, TimerSignal};

/// Input coming from the user side of the rendering boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    Select(String),
    /// 0-based option position.
    Choose(usize),
    Skip,
    Quit,
}

/// Presentation side of a running quiz.
pub trait Renderer {
    fn present(&mut self, view: &QuestionView);

    /// Countdown progress for the current question, in `[0, 1]`.
    fn progress(&mut self, _question: QuestionId, _fraction: f64) {}

    fn event(&mut self, _event: &Event) {}

    /// User input that the session refused.
    fn rejected(&mut self, _error: &QuizError) {}

    fn finish(&mut self, report: &QuizReport);
}

pub struct QuizRunner {
    session: QuizSession,
    settings: CountdownSettings,
}

impl QuizRunner {
    pub fn new(session: QuizSession, settings: CountdownSettings) -> Self {
        Self { session, settings }
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    /// Run until every question is resolved, the user quits, or the input
    /// channel closes. Must be called inside a tokio runtime.
    pub async fn run<R: Renderer>(
        mut self,
        mut input: mpsc::Receiver<UserInput>,
        renderer: &mut R,
    ) -> QuizReport {
        let (tx, mut signals) = mpsc::unbounded_channel();
        let mut countdown = Countdown::new(self.settings, tx);

        renderer.event(&Event::SessionStarted {
            total: self.session.bank().len(),
            question_time_ms: u64::try_from(self.settings.duration.as_millis())
                .unwrap_or(u64::MAX),
            at: Utc::now(),
        });

        if let Some(event) = self.session.presented_event() {
            renderer.event(&event);
        }
        let mut timer = self.present(&mut countdown, renderer);

        while !self.session.is_finished() {
            let next = tokio::select! {
                biased;
                Some(signal) = signals.recv() => {
                    if !countdown.is_current(&signal) {
                        continue;
                    }
                    match signal {
                        TimerSignal::Progress { fraction, .. } => {
                            if let Some(view) = self.session.view() {
                                renderer.progress(view.id, fraction);
                            }
                            continue;
                        }
                        TimerSignal::Expired { .. } => SessionInput::Timeout,
                    }
                }
                received = input.recv() => match received {
                    Some(UserInput::Select(option)) => SessionInput::Answer(option),
                    Some(UserInput::Choose(index)) => SessionInput::AnswerIndex(index),
                    Some(UserInput::Skip) => SessionInput::Skip,
                    Some(UserInput::Quit) | None => break,
                },
            };

            match self.session.apply(next) {
                Ok(events) => {
                    drop(timer.take());
                    for event in &events {
                        renderer.event(event);
                    }
                    timer = self.present(&mut countdown, renderer);
                }
                Err(error) => {
                    tracing::warn!(%error, "input rejected");
                    renderer.rejected(&error);
                }
            }
        }

        drop(timer);

        if !self.session.is_finished() {
            let sequencer = self.session.sequencer();
            renderer.event(&Event::SessionAbandoned {
                resolved: sequencer.resolved(),
                total: sequencer.total(),
                at: Utc::now(),
            });
        }

        let report = self.session.report();
        renderer.finish(&report);
        report
    }

    /// Show the current question and arm its countdown.
    fn present<R: Renderer>(
        &self,
        countdown: &mut Countdown,
        renderer: &mut R,
    ) -> Option<CountdownHandle> {
        let view = self.session.view()?;
        renderer.present(&view);
        Some(countdown.start())
    }
}

//! Per-question countdown.
//!
//! Each [`Countdown::start`] spawns two tasks sharing one start instant:
//! a one-shot expiry and a recurring progress tick. Neither touches session
//! state; they only send [`TimerSignal`]s to the driver loop. The returned
//! [`CountdownHandle`] aborts both tasks when dropped, and every signal
//! carries the generation it was started with so anything already queued
//! for a previous question can be discarded.
//!
//! Only the expiry signal ends a question. The tick stops on its own once
//! elapsed time reaches the duration but never reports expiry.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Smallest tick period accepted; `tokio::time::interval` rejects zero.
const MIN_TICK: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownSettings {
    /// Time allowed per question. Zero means the question times out at once.
    pub duration: Duration,
    pub tick_interval: Duration,
}

impl CountdownSettings {
    pub fn new(duration: Duration, tick_interval: Duration) -> Self {
        Self {
            duration,
            tick_interval: tick_interval.max(MIN_TICK),
        }
    }

    pub fn from_millis(duration_ms: u64, tick_interval_ms: u64) -> Self {
        Self::new(
            Duration::from_millis(duration_ms),
            Duration::from_millis(tick_interval_ms),
        )
    }
}

impl Default for CountdownSettings {
    fn default() -> Self {
        Self::from_millis(5_000, 10)
    }
}

/// Message sent from countdown tasks to whoever drives the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerSignal {
    /// Fraction of the duration elapsed, in `[0, 1]`.
    Progress { generation: u64, fraction: f64 },
    Expired { generation: u64 },
}

impl TimerSignal {
    pub fn generation(&self) -> u64 {
        match self {
            TimerSignal::Progress { generation, .. } | TimerSignal::Expired { generation } => {
                *generation
            }
        }
    }
}

/// `elapsed / duration`, clamped to `[0, 1]`. A zero duration is always complete.
pub fn progress_fraction(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

/// Starts countdowns and tracks which one is current.
#[derive(Debug)]
pub struct Countdown {
    settings: CountdownSettings,
    signals: UnboundedSender<TimerSignal>,
    generation: u64,
}

impl Countdown {
    pub fn new(settings: CountdownSettings, signals: UnboundedSender<TimerSignal>) -> Self {
        Self {
            settings,
            signals,
            generation: 0,
        }
    }

    pub fn settings(&self) -> CountdownSettings {
        self.settings
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True if `signal` belongs to the most recently started countdown.
    pub fn is_current(&self, signal: &TimerSignal) -> bool {
        signal.generation() == self.generation
    }

    /// Start a fresh countdown. Must be called inside a tokio runtime.
    ///
    /// Signals from earlier countdowns stop being current immediately, even
    /// if their handle is still alive.
    pub fn start(&mut self) -> CountdownHandle {
        self.generation += 1;
        let generation = self.generation;
        let CountdownSettings {
            duration,
            tick_interval,
        } = self.settings;
        let start = Instant::now();

        let expiry_tx = self.signals.clone();
        let expiry = tokio::spawn(async move {
            time::sleep_until(start + duration).await;
            let _ = expiry_tx.send(TimerSignal::Expired { generation });
        });

        let tick_tx = self.signals.clone();
        let ticker = tokio::spawn(async move {
            let mut interval = time::interval_at(start + tick_interval, tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let elapsed = start.elapsed();
                let fraction = progress_fraction(elapsed, duration);
                if tick_tx
                    .send(TimerSignal::Progress {
                        generation,
                        fraction,
                    })
                    .is_err()
                {
                    break;
                }
                if elapsed >= duration {
                    break;
                }
            }
        });

        tracing::trace!(generation, ?duration, "countdown started");
        CountdownHandle {
            generation,
            expiry,
            ticker,
        }
    }
}

/// Owns the two tasks of one countdown; dropping it cancels both.
#[derive(Debug)]
pub struct CountdownHandle {
    generation: u64,
    expiry: JoinHandle<()>,
    ticker: JoinHandle<()>,
}

impl CountdownHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.expiry.abort();
        self.ticker.abort();
        tracing::trace!(generation = self.generation, "countdown cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn drain(rx: &mut mpsc::UnboundedReceiver<TimerSignal>) -> Vec<TimerSignal> {
        let mut out = Vec::new();
        while let Ok(signal) = rx.try_recv() {
            out.push(signal);
        }
        out
    }

    fn expired_count(signals: &[TimerSignal]) -> usize {
        signals
            .iter()
            .filter(|s| matches!(s, TimerSignal::Expired { .. }))
            .count()
    }

    #[test]
    fn progress_fraction_is_clamped() {
        let d = Duration::from_millis(100);
        assert_eq!(progress_fraction(Duration::ZERO, d), 0.0);
        assert_eq!(progress_fraction(Duration::from_millis(50), d), 0.5);
        assert_eq!(progress_fraction(Duration::from_millis(250), d), 1.0);
        assert_eq!(progress_fraction(Duration::from_millis(5), Duration::ZERO), 1.0);
    }

    #[test]
    fn zero_tick_interval_is_raised() {
        let settings = CountdownSettings::from_millis(100, 0);
        assert_eq!(settings.tick_interval, MIN_TICK);
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_fires_once_after_duration() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut countdown = Countdown::new(CountdownSettings::from_millis(50, 10), tx);
        let _handle = countdown.start();

        time::sleep(Duration::from_millis(49)).await;
        assert_eq!(expired_count(&drain(&mut rx)), 0);

        time::sleep(Duration::from_millis(100)).await;
        let signals = drain(&mut rx);
        assert_eq!(expired_count(&signals), 1);
        assert!(signals.iter().all(|s| countdown.is_current(s)));
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_report_progress_and_stop() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut countdown = Countdown::new(CountdownSettings::from_millis(50, 10), tx);
        let _handle = countdown.start();

        time::sleep(Duration::from_millis(500)).await;
        let fractions: Vec<f64> = drain(&mut rx)
            .into_iter()
            .filter_map(|s| match s {
                TimerSignal::Progress { fraction, .. } => Some(fraction),
                TimerSignal::Expired { .. } => None,
            })
            .collect();

        assert_eq!(fractions.len(), 5);
        assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
        assert!(fractions.iter().all(|f| (0.0..=1.0).contains(f)));
        assert_eq!(fractions.last().copied(), Some(1.0));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_cancels_both_tasks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut countdown = Countdown::new(CountdownSettings::from_millis(50, 10), tx);
        let handle = countdown.start();

        time::sleep(Duration::from_millis(25)).await;
        handle.cancel();
        drain(&mut rx);

        time::sleep(Duration::from_millis(200)).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_invalidates_previous_generation() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut countdown = Countdown::new(CountdownSettings::from_millis(50, 10), tx);
        let first = countdown.start();
        let first_generation = first.generation();

        time::sleep(Duration::from_millis(30)).await;
        drop(first);
        let stale = drain(&mut rx);
        assert!(stale.iter().all(|s| s.generation() == first_generation));

        let _second = countdown.start();
        assert!(stale.iter().all(|s| !countdown.is_current(s)));

        time::sleep(Duration::from_millis(100)).await;
        let signals = drain(&mut rx);
        assert_eq!(expired_count(&signals), 1);
        assert!(signals.iter().all(|s| countdown.is_current(s)));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_expires_immediately() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut countdown = Countdown::new(CountdownSettings::from_millis(0, 10), tx);
        let _handle = countdown.start();

        let first = rx.recv().await.unwrap();
        assert_eq!(first, TimerSignal::Expired { generation: 1 });
    }
}

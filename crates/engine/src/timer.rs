//! Cancellable gravity timer.
//!
//! Owned by the engine task and polled from its `select!` loop. While disarmed
//! [`GravityTimer::tick`] never completes.

use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

#[derive(Debug, Default)]
pub struct GravityTimer {
    interval: Option<Interval>,
    period_ms: f64,
}

impl GravityTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start ticking every `period_ms`, first tick one full period from now.
    ///
    /// Replaces any running schedule.
    pub fn arm(&mut self, period_ms: f64) {
        let period = Duration::from_secs_f64(period_ms.max(1.0) / 1000.0);
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
        self.period_ms = period_ms;
    }

    pub fn disarm(&mut self) {
        self.interval = None;
    }

    pub fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Current period while armed.
    pub fn period_ms(&self) -> Option<f64> {
        self.interval.as_ref().map(|_| self.period_ms)
    }

    /// Make the timer match the session: armed at `period_ms` while playing.
    ///
    /// An unchanged period keeps the running schedule.
    pub fn sync(&mut self, playing: bool, period_ms: f64) {
        if !playing {
            self.disarm();
        } else if self.period_ms() != Some(period_ms) {
            self.arm(period_ms);
        }
    }

    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

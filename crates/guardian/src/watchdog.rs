//! Liveness watchdog.

use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// How often the watched process is probed.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Polls a process until it is gone, then hands over to a cleanup action.
pub struct Watchdog<F> {
    pid: u32,
    is_alive: F,
    interval: Duration,
}

impl<F> Watchdog<F>
where
    F: Fn(u32) -> bool,
{
    pub fn new(pid: u32, is_alive: F) -> Self {
        Self {
            pid,
            is_alive,
            interval: POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Resolve once a probe reports the process dead.
    pub async fn wait_for_exit(&self) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if !(self.is_alive)(self.pid) {
                tracing::info!(pid = self.pid, "Watched process exited");
                return;
            }
        }
    }

    /// Wait for the process to exit, then run `on_death`.
    ///
    /// The poll loop has ended before `on_death` starts, so a slow cleanup
    /// can never be triggered a second time.
    pub async fn run<C, Fut>(self, on_death: C) -> Fut::Output
    where
        C: FnOnce() -> Fut,
        Fut: Future,
    {
        self.wait_for_exit().await;
        drop(self);
        on_death().await
    }
}

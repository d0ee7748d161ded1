//! Single-shot debounce timer for remote suggest requests.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::DebounceConfig;

/// Coalesces rapid keystrokes into one suggest request.
///
/// At most one timer is armed at a time. Scheduling again replaces the pending
/// timer; cancelling disarms it without running the action. Must be used from
/// within a Tokio runtime.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(config: &DebounceConfig) -> Self {
        Self {
            delay: config.delay(),
            pending: None,
        }
    }

    /// The delay applied by [`Debouncer::schedule`].
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm the timer with the configured delay, replacing any pending one.
    pub fn schedule<F>(&mut self, fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.schedule_after(self.delay, fire);
    }

    /// Arm the timer with an explicit delay, replacing any pending one.
    pub fn schedule_after<F>(&mut self, delay: Duration, fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        debug!(delay_ms = delay.as_millis() as u64, "Debounce armed");
        self.pending = Some(tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            fire();
        }));
    }

    /// Disarm the pending timer, if any. The action will not run.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Whether a timer is armed and has not fired yet.
    pub fn is_armed(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

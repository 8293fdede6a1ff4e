use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Periodic background task bound to the lifetime of its handle.
///
/// Dropping the handle aborts the task, so a wizard that goes away can never
/// leave a timer writing drafts behind it.
pub struct AutosaveTask {
    handle: JoinHandle<()>,
}

impl AutosaveTask {
    /// Run `tick` every `period`. The first tick fires one period after the
    /// spawn, not immediately.
    pub fn spawn<F, Fut>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                tick().await;
            }
        });
        Self { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for AutosaveTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

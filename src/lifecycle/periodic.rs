//! Cancellable fixed-interval background task.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::lifecycle::shutdown::Shutdown;

/// Runs an async callback on a fixed period in its own tokio task.
///
/// The first tick fires immediately. Callbacks never overlap: a tick that
/// overruns the period causes the missed ticks to be skipped. [`stop`]
/// waits for an in-flight callback to finish, after which no further
/// callback runs.
///
/// [`stop`]: PeriodicTask::stop
#[derive(Debug)]
pub struct PeriodicTask {
    name: &'static str,
    shutdown: Shutdown,
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    /// Spawn the task. Must be called from within a tokio runtime.
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let shutdown = Shutdown::new();
        let mut stop_rx = shutdown.subscribe();
        let period = period.max(Duration::from_millis(1));

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            tracing::debug!(task = name, period_ms = period.as_millis() as u64, "Periodic task started");
            loop {
                tokio::select! {
                    biased;
                    _ = stop_rx.recv() => break,
                    _ = ticker.tick() => tick().await,
                }
            }
            tracing::debug!(task = name, "Periodic task stopped");
        });

        Self {
            name,
            shutdown,
            handle,
        }
    }

    /// Stop the task and wait for it to exit.
    pub async fn stop(self) {
        self.shutdown.trigger();
        if let Err(e) = self.handle.await {
            tracing::warn!(task = self.name, error = %e, "Periodic task ended abnormally");
        }
    }
}

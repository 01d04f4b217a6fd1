//! Cancellable periodic background work

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::debug;

/// A job that runs every `period` until cancelled or dropped
///
/// The first run happens one full period after scheduling. A run that
/// overruns its period delays the next one instead of bunching them up.
pub struct ScheduledTask {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Spawns `job` on the current tokio runtime
    ///
    /// ### Arguments
    ///
    /// * `name` - Label used in log output
    /// * `period` - Time between runs; must be non-zero
    /// * `job` - Produces the future for each run
    pub fn every<F, Fut>(name: &'static str, period: Duration, mut job: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                debug!("Running scheduled task {}", name);
                job().await;
            }
        });
        debug!("Scheduled task {} every {:?}", name, period);
        Self { name, handle }
    }

    pub fn cancel(self) {
        // Dropping aborts the task
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
        debug!("Cancelled scheduled task {}", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_task(period: Duration) -> (ScheduledTask, Arc<AtomicUsize>) {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let task = ScheduledTask::every("count", period, move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        (task, runs)
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_once_per_period() {
        let (task, runs) = counting_task(Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);
        assert!(!task.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_runs() {
        let (task, runs) = counting_task(Duration::from_secs(10));

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        task.cancel();
        tokio::time::sleep(Duration::from_secs(100)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}

// Background polling: a periodic task with an explicit, idempotent stop.
// The metrics poller refreshes the cluster trend windows every tick.

use crate::history::ClusterHistory;
use crate::prometheus_repo::PrometheusRepo;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{RwLock, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};

/// Handle to a running poll loop. `stop` may be called any number of times; dropping the
/// handle without stopping aborts the task so no tick outlives its owner.
pub struct PollHandle {
    name: &'static str,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Signals the loop and waits for it to exit. An in-flight tick finishes first.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
            && !e.is_cancelled()
        {
            tracing::warn!(error = %e, poller = self.name, "poller task failed");
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Runs `tick` immediately and then every `period` until stopped. Ticks never overlap;
/// a tick that overruns the period makes the loop skip the missed ticks.
pub fn spawn<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> PollHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(poller = name, period_ms = period.as_millis() as u64, "poller started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    tracing::debug!(poller = name, "poll tick");
                    tick().await;
                }
                _ = &mut shutdown_rx => {
                    break;
                }
            }
        }
        tracing::info!(poller = name, "poller stopped");
    });
    PollHandle {
        name,
        shutdown_tx: Some(shutdown_tx),
        task: Some(task),
    }
}

/// Polls the metrics aggregator and records every result into `history`.
pub fn spawn_metrics_poller(
    repo: Arc<PrometheusRepo>,
    history: Arc<RwLock<ClusterHistory>>,
    period: Duration,
) -> PollHandle {
    spawn("metrics", period, move || {
        let repo = repo.clone();
        let history = history.clone();
        async move {
            let result = repo.fetch_resource_samples().await;
            let mut history = history.write().await;
            history.record(&result, &mut rand::rng());
            tracing::debug!(
                nodes = result.items.len(),
                fallback = result.used_fallback,
                "metrics history updated"
            );
        }
    })
}

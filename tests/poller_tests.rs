// Cancellable polling task tests

use homelab_status::history::{BACKFILL_POINTS, ClusterHistory};
use homelab_status::poller::{spawn, spawn_metrics_poller};
use homelab_status::prometheus_repo::PrometheusRepo;
use homelab_status::registry::Registry;
use homelab_status::routes::http_client;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tokio::time::{Duration, sleep};

fn counting_poller(count: Arc<AtomicUsize>) -> homelab_status::poller::PollHandle {
    spawn("test", Duration::from_millis(20), move || {
        let count = count.clone();
        async move {
            count.fetch_add(1, Ordering::SeqCst);
        }
    })
}

#[tokio::test]
async fn ticks_immediately_and_periodically() {
    let count = Arc::new(AtomicUsize::new(0));
    let mut handle = counting_poller(count.clone());
    assert_eq!(handle.name(), "test");
    sleep(Duration::from_millis(110)).await;
    handle.stop().await;
    assert!(count.load(Ordering::SeqCst) >= 2);
}

#[tokio::test]
async fn stop_is_idempotent_and_halts_ticks() {
    let count = Arc::new(AtomicUsize::new(0));
    let mut handle = counting_poller(count.clone());
    sleep(Duration::from_millis(30)).await;
    assert!(handle.is_running());

    handle.stop().await;
    handle.stop().await;
    assert!(!handle.is_running());

    let after_stop = count.load(Ordering::SeqCst);
    sleep(Duration::from_millis(80)).await;
    assert_eq!(count.load(Ordering::SeqCst), after_stop);
}

#[tokio::test]
async fn dropping_the_handle_aborts_the_task() {
    let count = Arc::new(AtomicUsize::new(0));
    let handle = counting_poller(count.clone());
    sleep(Duration::from_millis(30)).await;
    drop(handle);
    sleep(Duration::from_millis(10)).await;

    let after_drop = count.load(Ordering::SeqCst);
    sleep(Duration::from_millis(80)).await;
    assert_eq!(count.load(Ordering::SeqCst), after_drop);
}

#[tokio::test]
async fn metrics_poller_seeds_history_on_first_tick() {
    let registry = Arc::new(Registry::default());
    let client = http_client(Duration::from_millis(300)).unwrap();
    let repo = Arc::new(PrometheusRepo::new(client, None, registry));
    let history = Arc::new(RwLock::new(ClusterHistory::new(20)));

    let mut handle = spawn_metrics_poller(repo, history.clone(), Duration::from_secs(3600));
    sleep(Duration::from_millis(100)).await;
    handle.stop().await;

    let snapshot = history.read().await.snapshot();
    assert_eq!(snapshot.cpu.len(), BACKFILL_POINTS);
    assert_eq!(snapshot.memory.len(), BACKFILL_POINTS);
    // Unconfigured backend: everything recorded is fallback data.
    assert!(snapshot.cpu.iter().all(|p| p.synthetic));
}

//! Background worker that drains the click queue into the analytics store.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::ClickRepository;

/// Number of retries after the first failed write.
const MAX_RETRIES: usize = 3;

/// Consumes click events until every sender is dropped.
///
/// At most `concurrency` writes are in flight at once. Each write is retried
/// with jittered exponential backoff; an event that still fails is logged and
/// dropped. Returns only after all in-flight writes have finished, so awaiting
/// the worker's join handle after shutdown drains the queue.
pub async fn run_click_worker<R>(
    mut rx: mpsc::Receiver<ClickEvent>,
    repository: Arc<R>,
    concurrency: usize,
) where
    R: ClickRepository + ?Sized + 'static,
{
    let concurrency = concurrency.max(1);
    let permits = Arc::new(Semaphore::new(concurrency));

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let repository = repository.clone();

        tokio::spawn(async move {
            persist_click(repository.as_ref(), event).await;
            drop(permit);
        });
    }

    // Wait for in-flight writes.
    let _ = permits.acquire_many(concurrency as u32).await;
    tracing::info!("Click worker stopped");
}

/// Writes one event with retry. Never fails; the outcome is logged and counted.
pub async fn persist_click<R>(repository: &R, event: ClickEvent)
where
    R: ClickRepository + ?Sized,
{
    let strategy = ExponentialBackoff::from_millis(10)
        .max_delay(Duration::from_secs(1))
        .map(jitter)
        .take(MAX_RETRIES);

    let short_code = event.short_code.clone();

    match Retry::start(strategy, || repository.record(event.clone())).await {
        Ok(()) => {
            tracing::debug!(short_code = %short_code, "click recorded");
            metrics::counter!("tinylink_clicks_recorded_total").increment(1);
        }
        Err(e) => {
            tracing::warn!(short_code = %short_code, error = %e, "failed to record click, dropping");
            metrics::counter!("tinylink_clicks_dropped_total").increment(1);
        }
    }
}

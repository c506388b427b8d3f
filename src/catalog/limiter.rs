//! Bounded fan-out over a batch with index-preserving results.

use futures::FutureExt;
use futures::future::join_all;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

/// A task panicked while the limiter was running it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerPanic(pub String);

impl WorkerPanic {
    fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        Self(message)
    }
}

impl From<WorkerPanic> for crate::error::ValidationError {
    fn from(panic: WorkerPanic) -> Self {
        crate::error::ValidationError::WorkerPanicked(panic.0)
    }
}

/// Run `task` over every item with at most `concurrency` calls in flight.
///
/// Exactly `min(concurrency, items.len())` workers are started (at least one).
/// Each worker claims the next unclaimed index from a shared counter until the
/// batch is drained, and reports `(index, outcome)` to this coordinating task,
/// which places it. `out[i]` always belongs to `items[i]`, whatever order the
/// calls finish in. A task that panics yields `Err(E::from(WorkerPanic))` for
/// its index; the rest of the batch is unaffected. Returns after every worker
/// has finished.
pub async fn run_batch<'a, T, R, E, F, Fut>(
    items: &'a [T],
    concurrency: usize,
    task: F,
) -> Vec<Result<R, E>>
where
    F: Fn(&'a T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
    E: From<WorkerPanic>,
{
    if items.is_empty() {
        return Vec::new();
    }

    let worker_count = concurrency.clamp(1, items.len());
    let next_index = AtomicUsize::new(0);
    let (result_tx, mut result_rx) = mpsc::unbounded_channel::<(usize, Result<R, E>)>();

    let workers: Vec<_> = (0..worker_count)
        .map(|_| {
            let result_tx = result_tx.clone();
            let next_index = &next_index;
            let task = &task;
            async move {
                loop {
                    let index = next_index.fetch_add(1, Ordering::Relaxed);
                    let Some(item) = items.get(index) else {
                        break;
                    };

                    let outcome = AssertUnwindSafe(async { task(item).await })
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|payload| {
                            Err(E::from(WorkerPanic::from_payload(payload)))
                        });

                    if result_tx.send((index, outcome)).is_err() {
                        break;
                    }
                }
            }
        })
        .collect();
    drop(result_tx);

    join_all(workers).await;

    let mut slots: Vec<Option<Result<R, E>>> = (0..items.len()).map(|_| None).collect();
    while let Some((index, outcome)) = result_rx.recv().await {
        slots[index] = Some(outcome);
    }

    slots
        .into_iter()
        .map(|slot| {
            slot.unwrap_or_else(|| Err(E::from(WorkerPanic("no result reported".to_string()))))
        })
        .collect()
}

//! Bounded-parallel fan-out with a completion barrier.
//!
//! [`dispatch`] spawns one task per item, lets at most `width` of them run at a time,
//! and only returns once every task has finished. A task that panics does not take the
//! round down with it: its item comes back as it was before the task started, tagged
//! as [`Completion::Crashed`].

use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};
use tracing::warn;

/// How one item's task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion<T> {
    Done(T),
    /// The worker panicked or was cancelled. `item` is the pre-dispatch snapshot.
    Crashed { item: T, reason: String },
}

impl<T> Completion<T> {
    pub fn into_inner(self) -> T {
        match self {
            Completion::Done(item) | Completion::Crashed { item, .. } => item,
        }
    }
}

/// Runs `worker` once per item, at most `width` at a time.
///
/// Results come back in input order, one per item, regardless of how tasks ended.
pub async fn dispatch<T, F, Fut>(items: Vec<T>, width: usize, worker: F) -> Vec<Completion<T>>
where
    T: Clone + Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
{
    let semaphore: Arc<Semaphore> = Arc::new(Semaphore::new(width.max(1)));
    let mut handles: Vec<(JoinHandle<T>, T)> = Vec::with_capacity(items.len());

    for item in items {
        let snapshot: T = item.clone();
        let work = worker(item);
        let semaphore: Arc<Semaphore> = Arc::clone(&semaphore);

        let handle: JoinHandle<T> = tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            work.await
        });
        handles.push((handle, snapshot));
    }

    let mut completions: Vec<Completion<T>> = Vec::with_capacity(handles.len());
    for (idx, (handle, snapshot)) in handles.into_iter().enumerate() {
        match handle.await {
            Ok(item) => completions.push(Completion::Done(item)),
            Err(e) => {
                let reason: String = describe(e);
                warn!("worker for item {idx} crashed: {reason}");
                completions.push(Completion::Crashed {
                    item: snapshot,
                    reason,
                });
            }
        }
    }
    completions
}

fn describe(e: JoinError) -> String {
    if e.is_cancelled() {
        return "task cancelled".to_string();
    }
    panic_message(e.into_panic())
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        return format!("panicked: {msg}");
    }
    if let Some(msg) = payload.downcast_ref::<String>() {
        return format!("panicked: {msg}");
    }
    "panicked".to_string()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

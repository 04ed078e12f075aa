//! Fan-out/fan-in of tasks sharing one cancellation scope
//!
//! A [`TaskGroup`] spawns tasks under a child of the caller's
//! [`CancellationToken`]. The first task that fails cancels the scope; the
//! others are expected to stop at their next suspension point. Joining always
//! waits for every spawned task.

use crate::error::{CloudError, Result};
use futures_util::future::join_all;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

const NO_FAILURE: usize = usize::MAX;

/// Error type of tasks run in a [`TaskGroup`]
pub trait TaskError: From<JoinError> + Send + 'static {
    /// True when the error only reflects the cancelled scope
    fn is_cancelled(&self) -> bool;
}

impl TaskError for CloudError {
    fn is_cancelled(&self) -> bool {
        CloudError::is_cancelled(self)
    }
}

pub struct TaskGroup<T, E = CloudError> {
    token: CancellationToken,
    first_failure: Arc<AtomicUsize>,
    handles: Vec<JoinHandle<std::result::Result<T, E>>>,
}

impl<T: Send + 'static, E: TaskError> TaskGroup<T, E> {
    /// Create a group whose scope is cancelled together with `parent`
    pub fn new(parent: &CancellationToken) -> Self {
        Self {
            token: parent.child_token(),
            first_failure: Arc::new(AtomicUsize::new(NO_FAILURE)),
            handles: Vec::new(),
        }
    }

    /// Token of the group scope
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Spawn a task; `task` receives the scope token
    ///
    /// Returns the index of the task, which is also its position in the joined results.
    pub fn spawn<F, Fut>(&mut self, task: F) -> usize
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>> + Send + 'static,
    {
        let index = self.handles.len();
        let token = self.token.clone();
        let first_failure = Arc::clone(&self.first_failure);
        let fut = task(token.clone());

        self.handles.push(tokio::spawn(async move {
            // Cancels the scope on error and on panic; disarmed on success.
            let guard = token.clone().drop_guard();
            let result = fut.await;
            match &result {
                Ok(_) => {
                    let _ = guard.disarm();
                }
                Err(err) => {
                    // Errors caused by the cancellation itself never claim the first slot.
                    if !err.is_cancelled() || !token.is_cancelled() {
                        let _ = first_failure.compare_exchange(
                            NO_FAILURE,
                            index,
                            Ordering::AcqRel,
                            Ordering::Acquire,
                        );
                    }
                    drop(guard);
                }
            }
            result
        }));

        index
    }

    /// Wait for every task and return the outcome of each, in spawn order
    pub async fn join_all(self) -> Vec<std::result::Result<T, E>> {
        join_all(self.handles)
            .await
            .into_iter()
            .map(|joined| joined.map_err(E::from).and_then(|r| r))
            .collect()
    }

    /// Wait for every task; fail with the error that triggered cancellation
    pub async fn join_first_error(self) -> std::result::Result<Vec<T>, E> {
        let first_failure = Arc::clone(&self.first_failure);
        let results = self.join_all().await;

        let failed = first_failure.load(Ordering::Acquire);
        let mut values = Vec::with_capacity(results.len());
        let mut fallback = None;

        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(value) => values.push(value),
                Err(err) if index == failed => return Err(err),
                Err(err) => {
                    // a real failure (e.g. a panic) beats a sibling's cancellation
                    if fallback
                        .as_ref()
                        .is_none_or(|f: &E| f.is_cancelled() && !err.is_cancelled())
                    {
                        fallback = Some(err);
                    }
                }
            }
        }

        match fallback {
            // Reachable on outside cancellation or when a task panicked.
            Some(err) => Err(err),
            None => Ok(values),
        }
    }
}

/// Run `fut` unless `token` is cancelled first
///
/// A result that is already available when the task is polled wins over the
/// cancellation, so an outcome observed together with a sibling's failure is kept.
pub async fn until_cancelled<T, F>(token: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        result = fut => result,
        _ = token.cancelled() => Err(CloudError::Cancelled),
    }
}

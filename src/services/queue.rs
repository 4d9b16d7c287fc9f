// src/services/queue.rs

//! Rate-limited request queue.
//!
//! Serializes outbound calls so that no two task bodies overlap and
//! successive task starts are at least `interval` apart. Tasks start in
//! submission order.
//!
//! A single drain task runs while the queue is non-empty. It is spawned
//! by the first submission into an idle queue and exits once the queue
//! is empty again; later submissions start a fresh one.

use std::collections::VecDeque;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::error::{AppError, Result};
use crate::models::HttpConfig;

type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

#[derive(Default)]
struct QueueState {
    jobs: VecDeque<Job>,
    draining: bool,
    last_start: Option<Instant>,
}

struct Inner {
    state: Mutex<QueueState>,
    interval: Duration,
    task_timeout: Option<Duration>,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// FIFO queue enforcing a minimum interval between task starts.
///
/// Cloning is cheap; clones share the same queue.
#[derive(Clone)]
pub struct RateLimitedQueue {
    inner: Arc<Inner>,
}

impl RateLimitedQueue {
    /// Create a queue with the given minimum interval between task starts.
    pub fn new(interval: Duration) -> Self {
        Self::with_task_timeout(interval, None)
    }

    /// Create a queue that also fails any task running longer than
    /// `task_timeout`, so one stalled call cannot block the queue.
    pub fn with_task_timeout(interval: Duration, task_timeout: Option<Duration>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(QueueState::default()),
                interval,
                task_timeout,
            }),
        }
    }

    /// Create a queue from HTTP settings.
    pub fn from_config(config: &HttpConfig) -> Self {
        Self::with_task_timeout(config.request_interval(), config.task_timeout())
    }

    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    /// Number of tasks waiting to start.
    pub fn pending(&self) -> usize {
        self.inner.state().jobs.len()
    }

    /// Enqueue a task and return a future of its own outcome.
    ///
    /// The task is enqueued immediately, before the returned future is
    /// polled. A failing task only fails its own future. Must be called
    /// from within a tokio runtime.
    ///
    /// A task may submit further tasks, but must not await them: they
    /// start only after the submitting task has finished.
    pub fn submit<F, Fut, T>(
        &self,
        task: F,
    ) -> impl Future<Output = Result<T>> + Send + 'static + use<F, Fut, T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let task_timeout = self.inner.task_timeout;

        let job: Job = Box::pin(async move {
            let outcome = match task_timeout {
                Some(after) => tokio::time::timeout(after, task())
                    .await
                    .unwrap_or(Err(AppError::Timeout { after })),
                None => task().await,
            };
            // The caller may have dropped its future; nothing to deliver then.
            let _ = tx.send(outcome);
        });

        self.enqueue(job);

        async move { rx.await.unwrap_or(Err(AppError::QueueClosed)) }
    }

    fn enqueue(&self, job: Job) {
        let start_drain = {
            let mut state = self.inner.state();
            state.jobs.push_back(job);
            !std::mem::replace(&mut state.draining, true)
        };

        if start_drain {
            log::debug!("Request queue: starting drain loop");
            tokio::spawn(drain(Arc::clone(&self.inner)));
        }
    }
}

async fn drain(inner: Arc<Inner>) {
    loop {
        let (job, wait) = {
            let mut state = inner.state();
            let Some(job) = state.jobs.pop_front() else {
                state.draining = false;
                log::debug!("Request queue: drained");
                return;
            };
            let wait = state
                .last_start
                .map(|started| inner.interval.saturating_sub(started.elapsed()))
                .unwrap_or_default();
            (job, wait)
        };

        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }

        inner.state().last_start = Some(Instant::now());

        // A panicking task drops its sender, so its caller sees QueueClosed.
        if AssertUnwindSafe(job).catch_unwind().await.is_err() {
            log::error!("Request queue: task panicked");
        }
    }
}

//! Deferred task execution
//!
//! Work posted to a [`TaskQueue`] runs after the dispatch that posted it has
//! returned. The controller uses this to resubscribe after a rebind.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use tokio::runtime::Handle;
use tracing::trace;

/// A unit of deferred work
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Schedules tasks onto the next turn of the host's loop
pub trait TaskQueue: Send + Sync {
    /// Queue a task; it must not run before this call returns
    fn post(&self, task: Task);
}

/// FIFO queue drained explicitly by the owning loop
#[derive(Default)]
pub struct LocalTaskQueue {
    tasks: Mutex<VecDeque<Task>>,
}

impl LocalTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued tasks
    pub fn pending(&self) -> usize {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Run the tasks queued before this call. Tasks they post run on the
    /// next call. Returns the number of tasks run.
    pub fn run_pending(&self) -> usize {
        let batch: Vec<Task> = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        let count = batch.len();
        for task in batch {
            task();
        }
        if count > 0 {
            trace!(count, "Ran deferred tasks");
        }
        count
    }
}

impl TaskQueue for LocalTaskQueue {
    fn post(&self, task: Task) {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(task);
    }
}

impl std::fmt::Debug for LocalTaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalTaskQueue")
            .field("pending", &self.pending())
            .finish()
    }
}

/// Queue backed by a tokio runtime
#[derive(Debug, Clone)]
pub struct TokioTaskQueue {
    handle: Handle,
}

impl TokioTaskQueue {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Queue bound to the runtime of the calling task
    ///
    /// Panics outside a tokio runtime, like [`Handle::current`].
    pub fn current() -> Self {
        Self::new(Handle::current())
    }
}

impl TaskQueue for TokioTaskQueue {
    fn post(&self, task: Task) {
        self.handle.spawn(async move { task() });
    }
}

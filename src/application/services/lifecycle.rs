//! Lifecycle - one-shot shutdown signal shared by the background tasks

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::application::errors::BotError;

/// Handed to each background task. Completion is reported by consuming it,
/// so a task can report at most once.
pub struct ShutdownSignal {
    token: CancellationToken,
    completed: Arc<AtomicUsize>,
}

impl ShutdownSignal {
    /// Resolves once shutdown has been requested
    pub async fn wait(&self) {
        self.token.cancelled().await;
    }

    pub fn is_fired(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn report_done(self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Owns the shutdown token and the tasks watching it
pub struct Lifecycle {
    token: CancellationToken,
    tracker: TaskTracker,
    completed: Arc<AtomicUsize>,
    tasks: Vec<JoinHandle<()>>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            tracker: TaskTracker::new(),
            completed: Arc::new(AtomicUsize::new(0)),
            tasks: Vec::new(),
        }
    }

    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            token: self.token.clone(),
            completed: Arc::clone(&self.completed),
        }
    }

    /// Spawn a task that was given a signal from [`Lifecycle::signal`]
    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.push(self.tracker.spawn(task));
    }

    /// Number of spawned tasks
    pub fn tracked(&self) -> usize {
        self.tasks.len()
    }

    /// Number of tasks that reported completion
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Fire the signal and wait for every task to finish. A task that
    /// failed is reported only after all the others are done.
    pub async fn shutdown(self) -> Result<usize, BotError> {
        self.token.cancel();
        self.tracker.close();
        self.tracker.wait().await;

        let mut failure = None;
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::error!("Background task failed: {}", e);
                failure.get_or_insert(e);
            }
        }

        match failure {
            Some(e) => Err(BotError::Internal(format!("background task failed: {}", e))),
            None => Ok(self.completed.load(Ordering::SeqCst)),
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

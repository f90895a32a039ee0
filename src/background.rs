//! Background task execution.
//!
//! A small worker pool for CPU-bound work (export serialization). Work runs on
//! worker threads; completions are queued and their callbacks run only when
//! the owner calls [`BackgroundExecutor::process_results`], so callbacks
//! always execute on the owner's thread, between interactions.

use crate::constants::DEFAULT_WORKER_COUNT;
use crate::export::ExportJob;
use crate::services::{ExportCallback, TaskOffload};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

/// Outcome of a background task
pub type TaskResult<T> = Result<T, String>;

type Job = Box<dyn FnOnce() + Send + 'static>;
type Callback = Box<dyn FnOnce(Box<dyn Any + Send>) + Send + 'static>;

struct Completion {
    id: u64,
    name: String,
    result: Box<dyn Any + Send>,
}

pub struct BackgroundExecutor {
    job_tx: Mutex<Option<Sender<Job>>>,
    result_tx: Sender<Completion>,
    result_rx: Mutex<Receiver<Completion>>,
    callbacks: Mutex<HashMap<u64, Callback>>,
    next_id: AtomicU64,
    workers: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for BackgroundExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundExecutor")
            .field("workers", &self.workers.len())
            .field("pending", &self.pending_count())
            .finish()
    }
}

impl BackgroundExecutor {
    /// Start an executor with `workers` threads (at least one).
    pub fn new(workers: usize) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (result_tx, result_rx) = mpsc::channel::<Completion>();
        let job_rx = Arc::new(Mutex::new(job_rx));

        let workers = (0..workers.max(1))
            .filter_map(|i| {
                let job_rx = Arc::clone(&job_rx);
                std::thread::Builder::new()
                    .name(format!("datagrid-worker-{}", i))
                    .spawn(move || worker_loop(job_rx))
                    .map_err(|e| tracing::error!("Failed to start worker {}: {}", i, e))
                    .ok()
            })
            .collect();

        Self {
            job_tx: Mutex::new(Some(job_tx)),
            result_tx,
            result_rx: Mutex::new(result_rx),
            callbacks: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            workers,
        }
    }

    pub fn with_default_workers() -> Self {
        Self::new(DEFAULT_WORKER_COUNT)
    }

    /// Run `work` on a worker; `callback` runs in a later `process_results`.
    pub fn spawn<T, W, C>(&self, name: &str, work: W, callback: C)
    where
        T: Send + 'static,
        W: FnOnce() -> TaskResult<T> + Send + 'static,
        C: FnOnce(TaskResult<T>) + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let name = name.to_string();

        self.callbacks.lock().insert(
            id,
            Box::new(move |result: Box<dyn Any + Send>| match result.downcast::<TaskResult<T>>() {
                Ok(result) => callback(*result),
                Err(_) => callback(Err("task result type mismatch".to_string())),
            }),
        );

        let result_tx = self.result_tx.clone();
        let task_name = name.clone();
        let job: Job = Box::new(move || {
            let result: TaskResult<T> = catch_unwind(AssertUnwindSafe(work))
                .unwrap_or_else(|_| Err(format!("task '{}' panicked", task_name)));
            // Receiver gone means the executor was dropped; nothing to report to
            let _ = result_tx.send(Completion {
                id,
                name: task_name,
                result: Box::new(result),
            });
        });

        let sent = match self.job_tx.lock().as_ref() {
            Some(tx) => tx.send(job).is_ok(),
            None => false,
        };

        if sent {
            tracing::debug!(task = %name, id, "Spawned background task");
        } else {
            tracing::error!(task = %name, "Background workers unavailable");
            let callback = self.callbacks.lock().remove(&id);
            if let Some(callback) = callback {
                callback(Box::new(TaskResult::<T>::Err(
                    "background workers unavailable".to_string(),
                )));
            }
        }
    }

    /// Run callbacks for every finished task. Returns how many ran.
    pub fn process_results(&self) -> usize {
        let mut processed = 0;
        loop {
            let completion = match self.result_rx.lock().try_recv() {
                Ok(completion) => completion,
                Err(_) => break,
            };

            // Lock released before the callback runs so it may spawn again
            let callback = self.callbacks.lock().remove(&completion.id);
            match callback {
                Some(callback) => {
                    tracing::debug!(task = %completion.name, id = completion.id, "Background task finished");
                    callback(completion.result);
                    processed += 1;
                }
                None => {
                    tracing::warn!(task = %completion.name, "No callback for finished task");
                }
            }
        }
        processed
    }

    /// Tasks spawned whose callbacks have not run yet
    pub fn pending_count(&self) -> usize {
        self.callbacks.lock().len()
    }

    pub fn has_pending(&self) -> bool {
        self.pending_count() > 0
    }
}

fn worker_loop(job_rx: Arc<Mutex<Receiver<Job>>>) {
    loop {
        let job = job_rx.lock().recv();
        match job {
            Ok(job) => job(),
            Err(_) => break,
        }
    }
}

impl Drop for BackgroundExecutor {
    fn drop(&mut self) {
        // Closing the job channel ends every worker loop
        self.job_tx.lock().take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

impl TaskOffload for BackgroundExecutor {
    fn submit(&self, job: ExportJob, on_complete: ExportCallback) {
        let name = format!("export-{}", job.id);
        self.spawn(&name, move || Ok(job.run()), on_complete);
    }
}

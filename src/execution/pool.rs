//! Worker Pool
//!
//! A fixed set of named OS threads draining a shared job queue. Parallel
//! flows submit to a pool handed to them by the caller; the pool's
//! lifecycle (creation, sizing, shutdown) belongs to the caller alone.
//!
//! Dropping the last handle shuts the pool down: queued jobs still run,
//! then the workers are joined.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, error, warn};
use parking_lot::Mutex;

use crate::config::PoolConfig;
use crate::error::{FlowError, Result};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Caller-owned thread pool.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use flowrunner::execution::WorkerPool;
///
/// let pool = Arc::new(WorkerPool::new(4));
/// // ... hand `pool` to parallel flows ...
/// pool.shutdown();
/// ```
pub struct WorkerPool {
    sender: Mutex<Option<Sender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    size: usize,
}

impl WorkerPool {
    /// Starts a pool with `size` workers.
    ///
    /// A `size` of zero is raised to one worker. Use
    /// [`from_config`](Self::from_config) to reject zero instead.
    pub fn new(size: usize) -> Self {
        Self::spawn(size, "flowrunner-worker")
    }

    /// Starts a pool from validated settings.
    ///
    /// # Errors
    ///
    /// [`FlowError::InvalidConfig`] if `config.workers` is zero or the
    /// thread name is blank.
    pub fn from_config(config: &PoolConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::spawn(config.workers, &config.thread_name))
    }

    fn spawn(size: usize, thread_name: &str) -> Self {
        let size = size.max(1);
        let (sender, receiver): (Sender<Job>, Receiver<Job>) = channel();
        let receiver = Arc::new(Mutex::new(receiver));

        let mut workers = Vec::with_capacity(size);
        for index in 0..size {
            let receiver = Arc::clone(&receiver);
            let spawned = thread::Builder::new()
                .name(format!("{}-{}", thread_name, index))
                .spawn(move || worker_loop(receiver));

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => error!("Failed to spawn worker thread {}: {}", index, e),
            }
        }

        debug!("Started worker pool with {} threads", workers.len());

        Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
            size,
        }
    }

    /// Number of workers requested.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_shutdown(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Queues a job.
    ///
    /// # Errors
    ///
    /// [`FlowError::Interrupted`] once the pool has been shut down.
    pub fn submit<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.lock();
        let Some(sender) = sender.as_ref() else {
            return Err(FlowError::Interrupted);
        };
        sender.send(Box::new(job)).map_err(|_| FlowError::Interrupted)
    }

    /// Stops accepting jobs, lets queued jobs finish and joins the workers.
    ///
    /// Calling it again is a no-op.
    pub fn shutdown(&self) {
        // Dropping the sender ends each worker once the queue is empty
        drop(self.sender.lock().take());

        let workers: Vec<JoinHandle<()>> = self.workers.lock().drain(..).collect();
        let current = thread::current().id();
        for handle in workers {
            if handle.thread().id() == current {
                continue;
            }
            if handle.join().is_err() {
                warn!("A worker thread panicked during shutdown");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(receiver: Arc<Mutex<Receiver<Job>>>) {
    loop {
        let job = receiver.lock().recv();
        match job {
            Ok(job) => {
                if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                    error!(
                        "A job panicked on worker '{}'",
                        thread::current().name().unwrap_or("unnamed")
                    );
                }
            }
            Err(_) => break,
        }
    }
}

//! Parallel Executor
//!
//! Submits one task per unit to a caller-supplied [`WorkerPool`] and waits
//! for every task to finish before looking at any result (bulk join, no
//! cancel-on-first-failure).
//!
//! Units that fail on their own come back as ordinary `FAILED` reports.
//! Pool interruption and faults escaping a task (a panic, or a fatal error
//! from a nested parallel flow) abort the whole parallel step instead.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;

use log::{debug, error};

use crate::error::{FlowError, Result};
use crate::execution::WorkerPool;
use crate::work::{Context, Report, WorkUnit};

type TaskOutcome = std::thread::Result<Result<Option<Report>>>;

/// Runs units concurrently on a shared pool.
#[derive(Clone)]
pub struct ParallelExecutor {
    pool: Arc<WorkerPool>,
}

impl ParallelExecutor {
    pub fn new(pool: Arc<WorkerPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// Executes every unit against `context` and returns their reports in
    /// submission order. Units that produce no report are left out.
    pub fn execute_in_parallel(&self, works: &[WorkUnit], context: &Context) -> Result<Vec<Report>> {
        let mut pending: Vec<(&WorkUnit, Receiver<TaskOutcome>)> = Vec::with_capacity(works.len());

        for work in works {
            let (tx, rx) = channel();
            let task_work = Arc::clone(work);
            let task_context = context.clone();

            let submitted = self.pool.submit(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| task_work.execute(&task_context)));
                if let Err(e) = tx.send(outcome) {
                    error!("Failed to send result of work unit '{}': {}", task_work.name(), e);
                }
            });

            if let Err(e) = submitted {
                // Already-submitted tasks keep running; wait for them first
                Self::drain(pending);
                return Err(e);
            }
            pending.push((work, rx));
        }

        // Join everything before interpreting any outcome
        let outcomes: Vec<(&WorkUnit, Option<TaskOutcome>)> = pending
            .into_iter()
            .map(|(work, rx)| (work, rx.recv().ok()))
            .collect();

        let mut reports = Vec::with_capacity(outcomes.len());
        for (work, outcome) in outcomes {
            let name = work.name().to_string();
            match outcome {
                None => return Err(FlowError::InterruptedWaiting(name)),
                Some(Err(payload)) => {
                    return Err(FlowError::WorkPanicked {
                        work: name,
                        message: panic_message(payload.as_ref()),
                    })
                }
                Some(Ok(Err(e))) => {
                    return Err(FlowError::Nested {
                        work: name,
                        source: Box::new(e),
                    })
                }
                Some(Ok(Ok(Some(report)))) => reports.push(report),
                Some(Ok(Ok(None))) => debug!("Work unit '{}' produced no report", name),
            }
        }

        Ok(reports)
    }

    fn drain(pending: Vec<(&WorkUnit, Receiver<TaskOutcome>)>) {
        for (_, rx) in pending {
            let _ = rx.recv();
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "task panicked".to_string()
    }
}

//! Parallel Flow
//!
//! Fans its units out onto a caller-owned [`WorkerPool`], waits for all of
//! them and aggregates their reports under a [`ParallelPolicy`].
//!
//! The pool is never created, resized or shut down here. Nesting parallel
//! flows on one pool needs enough workers for the outer tasks to wait on
//! the inner ones.

use std::sync::Arc;

use log::debug;

use crate::error::{FlowError, Result};
use crate::execution::WorkerPool;
use crate::work::{execute_resumable, Context, Report, Work, WorkUnit};

use super::executor::ParallelExecutor;
use super::parallel_report::{ParallelPolicy, ParallelReport};
use super::{generated_name, validate_name, Flow};

/// Units executed concurrently against the same context.
pub struct ParallelFlow {
    name: String,
    works: Vec<WorkUnit>,
    executor: ParallelExecutor,
    policy: ParallelPolicy,
}

impl ParallelFlow {
    pub fn new(
        name: impl Into<String>,
        works: Vec<WorkUnit>,
        pool: Arc<WorkerPool>,
        policy: ParallelPolicy,
    ) -> Result<Self> {
        let name = name.into();
        validate_name("parallel flow", &name)?;
        Ok(Self {
            name,
            works,
            executor: ParallelExecutor::new(pool),
            policy,
        })
    }

    pub fn builder() -> ParallelFlowBuilder {
        ParallelFlowBuilder::new()
    }

    pub fn policy(&self) -> ParallelPolicy {
        self.policy
    }

    pub fn works(&self) -> &[WorkUnit] {
        &self.works
    }

    fn run(&self, context: &Context) -> Result<Option<Report>> {
        debug!(
            "Parallel flow '{}': dispatching {} units ({:?})",
            self.name,
            self.works.len(),
            self.policy
        );

        let mut report = ParallelReport::new(self.policy);
        report.add_all(self.executor.execute_in_parallel(&self.works, context)?);
        Ok(Some(Report::Parallel(report)))
    }
}

impl Work for ParallelFlow {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, context: &Context) -> Result<Option<Report>> {
        execute_resumable(&self.name, context, |ctx| self.run(ctx))
    }
}

impl Flow for ParallelFlow {}

/// Fluent construction of a [`ParallelFlow`].
///
/// A pool must be supplied with [`with`](Self::with); there is no default.
pub struct ParallelFlowBuilder {
    name: String,
    works: Vec<WorkUnit>,
    pool: Option<Arc<WorkerPool>>,
    policy: ParallelPolicy,
}

impl ParallelFlowBuilder {
    fn new() -> Self {
        Self {
            name: generated_name(),
            works: Vec::new(),
            pool: None,
            policy: ParallelPolicy::default(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn execute(mut self, work: WorkUnit) -> Self {
        self.works.push(work);
        self
    }

    pub fn execute_all(mut self, works: Vec<WorkUnit>) -> Self {
        self.works.extend(works);
        self
    }

    /// Pool the units run on. The caller keeps ownership of its lifecycle.
    pub fn with(mut self, pool: Arc<WorkerPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn policy(mut self, policy: ParallelPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> Result<ParallelFlow> {
        let pool = self.pool.ok_or_else(|| FlowError::InvalidDefinition {
            flow: "parallel flow",
            reason: "a worker pool is required".to_string(),
        })?;
        ParallelFlow::new(self.name, self.works, pool, self.policy)
    }

    pub fn build_unit(self) -> Result<WorkUnit> {
        Ok(Arc::new(self.build()?))
    }
}

//! Repeat Flow
//!
//! Runs a unit at least once and keeps running it while a predicate over
//! its last report holds. A `WAITING` report breaks the loop immediately.

use std::sync::Arc;

use log::debug;

use crate::error::{FlowError, Result};
use crate::work::{execute_resumable, Context, NoOpWork, Report, ReportPredicate, Status, Work, WorkUnit};

use super::{generated_name, validate_name, Flow};

/// `do { work } while predicate(report)`.
pub struct RepeatFlow {
    name: String,
    work: WorkUnit,
    predicate: ReportPredicate,
}

impl RepeatFlow {
    /// # Errors
    ///
    /// [`FlowError::InvalidDefinition`] if `name` is blank or the predicate
    /// is `Times(0)`.
    pub fn new(name: impl Into<String>, work: WorkUnit, predicate: ReportPredicate) -> Result<Self> {
        let name = name.into();
        validate_name("repeat flow", &name)?;
        if let ReportPredicate::Times(0) = predicate {
            return Err(FlowError::InvalidDefinition {
                flow: "repeat flow",
                reason: "times must be at least 1".to_string(),
            });
        }
        Ok(Self {
            name,
            work,
            predicate,
        })
    }

    pub fn builder() -> RepeatFlowBuilder {
        RepeatFlowBuilder::new()
    }

    fn run(&self, context: &Context) -> Result<Option<Report>> {
        let mut condition = self.predicate.evaluator();
        let mut iterations = 0usize;
        loop {
            iterations += 1;
            let Some(report) = self.work.execute(context)? else {
                return Ok(None);
            };
            if report.status() == Status::Waiting || !condition.apply(&report) {
                debug!(
                    "Repeat flow '{}' finished after {} iteration(s) ({})",
                    self.name,
                    iterations,
                    report.status()
                );
                return Ok(Some(report));
            }
        }
    }
}

impl Work for RepeatFlow {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, context: &Context) -> Result<Option<Report>> {
        execute_resumable(&self.name, context, |ctx| self.run(ctx))
    }
}

impl Flow for RepeatFlow {}

/// Fluent construction of a [`RepeatFlow`].
pub struct RepeatFlowBuilder {
    name: String,
    work: Option<WorkUnit>,
    predicate: ReportPredicate,
}

impl RepeatFlowBuilder {
    fn new() -> Self {
        Self {
            name: generated_name(),
            work: None,
            predicate: ReportPredicate::default(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn repeat(mut self, work: WorkUnit) -> Self {
        self.work = Some(work);
        self
    }

    /// Keeps looping while `predicate` holds.
    pub fn until(mut self, predicate: ReportPredicate) -> Self {
        self.predicate = predicate;
        self
    }

    /// Runs the unit exactly `times` times (unless it waits).
    pub fn times(self, times: u32) -> Self {
        self.until(ReportPredicate::times(times))
    }

    pub fn build(self) -> Result<RepeatFlow> {
        let work = self.work.unwrap_or_else(|| Arc::new(NoOpWork::new()));
        RepeatFlow::new(self.name, work, self.predicate)
    }

    pub fn build_unit(self) -> Result<WorkUnit> {
        Ok(Arc::new(self.build()?))
    }
}

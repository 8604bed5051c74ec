//! Sequential Flow
//!
//! Runs its units one after another against the same context and stops at
//! the first unit that fails or waits.

use std::sync::Arc;

use log::debug;

use crate::error::Result;
use crate::work::{execute_resumable, Context, Report, Work, WorkUnit};

use super::{generated_name, validate_name, Flow};

/// Units executed strictly in order.
pub struct SequentialFlow {
    name: String,
    works: Vec<WorkUnit>,
}

impl SequentialFlow {
    /// # Errors
    ///
    /// [`FlowError::InvalidDefinition`](crate::error::FlowError) if `name` is blank.
    pub fn new(name: impl Into<String>, works: Vec<WorkUnit>) -> Result<Self> {
        let name = name.into();
        validate_name("sequential flow", &name)?;
        Ok(Self { name, works })
    }

    pub fn builder() -> SequentialFlowBuilder {
        SequentialFlowBuilder::new()
    }

    pub fn works(&self) -> &[WorkUnit] {
        &self.works
    }

    fn run(&self, context: &Context) -> Result<Option<Report>> {
        let mut last = None;
        for work in &self.works {
            last = work.execute(context)?;
            if let Some(report) = &last {
                if report.status().is_blocking() {
                    debug!(
                        "Sequential flow '{}' stopped at '{}' ({})",
                        self.name,
                        work.name(),
                        report.status()
                    );
                    break;
                }
            }
        }
        Ok(last)
    }
}

impl Work for SequentialFlow {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, context: &Context) -> Result<Option<Report>> {
        execute_resumable(&self.name, context, |ctx| self.run(ctx))
    }
}

impl Flow for SequentialFlow {}

/// Fluent construction of a [`SequentialFlow`].
///
/// # Example
///
/// ```
/// use flowrunner::flow::SequentialFlow;
/// use flowrunner::work::{FnWork, Report, WorkExt};
///
/// let flow = SequentialFlow::builder()
///     .named("etl")
///     .execute(FnWork::new("extract", |ctx| Report::completed(ctx)).into_unit())
///     .then(FnWork::new("load", |ctx| Report::completed(ctx)).into_unit())
///     .build()
///     .unwrap();
/// assert_eq!(flow.works().len(), 2);
/// ```
pub struct SequentialFlowBuilder {
    name: String,
    works: Vec<WorkUnit>,
}

impl SequentialFlowBuilder {
    fn new() -> Self {
        Self {
            name: generated_name(),
            works: Vec::new(),
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

    pub fn then(mut self, work: WorkUnit) -> Self {
        self.works.push(work);
        self
    }

    pub fn then_all(mut self, works: Vec<WorkUnit>) -> Self {
        self.works.extend(works);
        self
    }

    pub fn build(self) -> Result<SequentialFlow> {
        SequentialFlow::new(self.name, self.works)
    }

    /// Builds straight into a shareable unit.
    pub fn build_unit(self) -> Result<WorkUnit> {
        Ok(Arc::new(self.build()?))
    }
}

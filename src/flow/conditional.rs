//! Conditional Flow
//!
//! Runs an initial unit, then one of two branches depending on a predicate
//! over the initial report.

use std::sync::Arc;

use log::debug;

use crate::error::Result;
use crate::work::{execute_resumable, Context, NoOpWork, Report, ReportPredicate, Status, Work, WorkUnit};

use super::{generated_name, validate_name, Flow};

/// `if predicate(initial) { on_true } else { on_false }`.
pub struct ConditionalFlow {
    name: String,
    initial: WorkUnit,
    predicate: ReportPredicate,
    on_true: WorkUnit,
    on_false: Option<WorkUnit>,
}

impl ConditionalFlow {
    /// Without `on_false`, or with a no-op one, a false predicate returns
    /// the initial report.
    pub fn new(
        name: impl Into<String>,
        initial: WorkUnit,
        predicate: ReportPredicate,
        on_true: WorkUnit,
        on_false: Option<WorkUnit>,
    ) -> Result<Self> {
        let name = name.into();
        validate_name("conditional flow", &name)?;
        Ok(Self {
            name,
            initial,
            predicate,
            on_true,
            on_false: on_false.filter(|work| !work.is_noop()),
        })
    }

    pub fn builder() -> ConditionalFlowBuilder {
        ConditionalFlowBuilder::new()
    }

    fn run(&self, context: &Context) -> Result<Option<Report>> {
        let Some(report) = self.initial.execute(context)? else {
            debug!("Conditional flow '{}': initial unit produced no report", self.name);
            return Ok(None);
        };

        if report.status() == Status::Waiting {
            return Ok(Some(report));
        }

        if self.predicate.evaluator().apply(&report) {
            debug!("Conditional flow '{}': taking then-branch", self.name);
            self.on_true.execute(context)
        } else if let Some(on_false) = &self.on_false {
            debug!("Conditional flow '{}': taking otherwise-branch", self.name);
            on_false.execute(context)
        } else {
            Ok(Some(report))
        }
    }
}

impl Work for ConditionalFlow {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, context: &Context) -> Result<Option<Report>> {
        execute_resumable(&self.name, context, |ctx| self.run(ctx))
    }
}

impl Flow for ConditionalFlow {}

/// Fluent construction of a [`ConditionalFlow`].
///
/// Unset units default to a no-op and the predicate to
/// [`ReportPredicate::AlwaysFalse`].
pub struct ConditionalFlowBuilder {
    name: String,
    initial: Option<WorkUnit>,
    predicate: ReportPredicate,
    on_true: Option<WorkUnit>,
    on_false: Option<WorkUnit>,
}

impl ConditionalFlowBuilder {
    fn new() -> Self {
        Self {
            name: generated_name(),
            initial: None,
            predicate: ReportPredicate::default(),
            on_true: None,
            on_false: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn execute(mut self, initial: WorkUnit) -> Self {
        self.initial = Some(initial);
        self
    }

    pub fn when(mut self, predicate: ReportPredicate) -> Self {
        self.predicate = predicate;
        self
    }

    pub fn then(mut self, work: WorkUnit) -> Self {
        self.on_true = Some(work);
        self
    }

    pub fn otherwise(mut self, work: WorkUnit) -> Self {
        self.on_false = Some(work);
        self
    }

    pub fn build(self) -> Result<ConditionalFlow> {
        let initial = self.initial.unwrap_or_else(|| Arc::new(NoOpWork::new()));
        let on_true = self.on_true.unwrap_or_else(|| Arc::new(NoOpWork::new()));
        ConditionalFlow::new(self.name, initial, self.predicate, on_true, self.on_false)
    }

    pub fn build_unit(self) -> Result<WorkUnit> {
        Ok(Arc::new(self.build()?))
    }
}

//! Execution Outcomes
//!
//! [`Status`] is the three-valued result of running a unit of work and
//! [`Report`] is the envelope handed back to the caller.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::WorkError;
use crate::flow::ParallelReport;

use super::context::Context;

/// Outcome of one execution.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Completed,
    Failed,
    /// Suspended; the graph must be re-invoked later with the same context.
    Waiting,
}

impl Status {
    /// Returns true if this status stops a sequence or a loop.
    pub fn is_blocking(self) -> bool {
        matches!(self, Status::Failed | Status::Waiting)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Completed => write!(f, "COMPLETED"),
            Status::Failed => write!(f, "FAILED"),
            Status::Waiting => write!(f, "WAITING"),
        }
    }
}

/// Report produced by a single work unit.
#[derive(Debug, Clone)]
pub struct WorkReport {
    status: Status,
    context: Context,
    error: Option<WorkError>,
}

impl WorkReport {
    pub fn new(status: Status, context: Context) -> Self {
        Self {
            status,
            context,
            error: None,
        }
    }

    pub fn with_error(status: Status, context: Context, error: WorkError) -> Self {
        Self {
            status,
            context,
            error: Some(error),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn error(&self) -> Option<&WorkError> {
        self.error.as_ref()
    }
}

/// Result of executing a work unit or a flow.
///
/// Never mutated once returned to a caller.
#[derive(Debug, Clone)]
pub enum Report {
    Work(WorkReport),
    Parallel(ParallelReport),
}

impl Report {
    /// Creates a plain report with the given status.
    pub fn new(status: Status, context: &Context) -> Self {
        Report::Work(WorkReport::new(status, context.clone()))
    }

    pub fn completed(context: &Context) -> Self {
        Self::new(Status::Completed, context)
    }

    pub fn waiting(context: &Context) -> Self {
        Self::new(Status::Waiting, context)
    }

    /// Creates a failed report carrying the cause.
    pub fn failed<E>(context: &Context, error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        let error: WorkError = WorkError::from(error.into());
        Report::Work(WorkReport::with_error(
            Status::Failed,
            context.clone(),
            error,
        ))
    }

    pub fn status(&self) -> Status {
        match self {
            Report::Work(report) => report.status(),
            Report::Parallel(report) => report.status(),
        }
    }

    /// Context of the run.
    ///
    /// For a parallel report this is a new context merged from every
    /// child report, see [`ParallelReport::context`].
    pub fn context(&self) -> Context {
        match self {
            Report::Work(report) => report.context().clone(),
            Report::Parallel(report) => report.context(),
        }
    }

    /// First error attached to this report or any of its children.
    pub fn error(&self) -> Option<WorkError> {
        match self {
            Report::Work(report) => report.error().cloned(),
            Report::Parallel(report) => report.error(),
        }
    }

    pub fn as_parallel(&self) -> Option<&ParallelReport> {
        match self {
            Report::Parallel(report) => Some(report),
            Report::Work(_) => None,
        }
    }
}

impl From<WorkReport> for Report {
    fn from(report: WorkReport) -> Self {
        Report::Work(report)
    }
}

impl From<ParallelReport> for Report {
    fn from(report: ParallelReport) -> Self {
        Report::Parallel(report)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.error() {
            Some(error) => write!(f, "Report {{ status: {}, error: {} }}", self.status(), error),
            None => write!(f, "Report {{ status: {} }}", self.status()),
        }
    }
}

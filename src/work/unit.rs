//! Units of Work
//!
//! The [`Work`] trait is the single execution contract shared by atomic
//! work and every flow, which is what allows flows to nest.
//!
//! # Resumability
//!
//! [`execute_resumable`] wraps a unit's logic with the status cache kept in
//! the [`Context`]: a unit whose name already has a status other than
//! `WAITING` is not run again; its cached status is returned instead. Two
//! distinct units sharing a name therefore share this state.
//!
//! Flows and [`HumanWork`] are always resumable. Plain [`FnWork`] is not;
//! wrap it with [`WorkExt::resumable`] to opt in.

use std::fmt;
use std::sync::Arc;

use log::debug;
use uuid::Uuid;

use crate::error::Result;

use super::context::Context;
use super::report::{Report, Status};

/// A named, executable unit.
///
/// Implementations must convert their own failures into a report with
/// [`Status::Failed`] carrying the cause. An `Err` is reserved for fatal
/// infrastructure errors such as a broken worker pool.
pub trait Work: Send + Sync {
    fn name(&self) -> &str;

    /// Runs the unit. `Ok(None)` means the unit produced no report.
    fn execute(&self, context: &Context) -> Result<Option<Report>>;

    /// Returns true for placeholder units that do nothing.
    fn is_noop(&self) -> bool {
        false
    }
}

/// Keeps `name` unless it is blank, in which case a random one is used.
fn name_or_generated(name: String) -> String {
    if name.trim().is_empty() {
        Uuid::new_v4().to_string()
    } else {
        name
    }
}

/// Shared handle to any unit of work.
pub type WorkUnit = Arc<dyn Work>;

/// Runs `logic` unless `name` already has a terminal status in `context`,
/// then records the resulting status under `name`.
pub fn execute_resumable<F>(name: &str, context: &Context, logic: F) -> Result<Option<Report>>
where
    F: FnOnce(&Context) -> Result<Option<Report>>,
{
    if let Some(last) = context.status(name) {
        if last != Status::Waiting {
            debug!("Skipping '{}' (already {})", name, last);
            return Ok(Some(Report::new(last, context)));
        }
    }

    let report = logic(context)?;
    if let Some(report) = &report {
        context.set_status(name, report.status());
    }
    Ok(report)
}

/// Resumable wrapper around another unit.
pub struct Resumable<W> {
    inner: W,
}

impl<W: Work> Resumable<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Work> Work for Resumable<W> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn execute(&self, context: &Context) -> Result<Option<Report>> {
        execute_resumable(self.inner.name(), context, |ctx| self.inner.execute(ctx))
    }

    fn is_noop(&self) -> bool {
        self.inner.is_noop()
    }
}

/// Conversions available on every sized unit.
pub trait WorkExt: Work + Sized + 'static {
    fn resumable(self) -> Resumable<Self> {
        Resumable::new(self)
    }

    fn into_unit(self) -> WorkUnit {
        Arc::new(self)
    }
}

impl<W: Work + Sized + 'static> WorkExt for W {}

type WorkFn = dyn Fn(&Context) -> Report + Send + Sync;

/// Unit of work backed by a closure.
///
/// A blank name is replaced by a random one.
pub struct FnWork {
    name: String,
    logic: Box<WorkFn>,
}

impl FnWork {
    pub fn new<F>(name: impl Into<String>, logic: F) -> Self
    where
        F: Fn(&Context) -> Report + Send + Sync + 'static,
    {
        Self {
            name: name_or_generated(name.into()),
            logic: Box::new(logic),
        }
    }

    /// Builds a unit from fallible logic: `Ok` completes, `Err` fails with
    /// the error attached.
    pub fn from_result<F, E>(name: impl Into<String>, logic: F) -> Self
    where
        F: Fn(&Context) -> std::result::Result<(), E> + Send + Sync + 'static,
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self::new(name, move |ctx| match logic(ctx) {
            Ok(()) => Report::completed(ctx),
            Err(e) => Report::failed(ctx, e),
        })
    }
}

impl Work for FnWork {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, context: &Context) -> Result<Option<Report>> {
        Ok(Some((self.logic)(context)))
    }
}

impl fmt::Debug for FnWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnWork").field("name", &self.name).finish()
    }
}

/// Step that waits for a human decision.
///
/// Always reports `WAITING`. An external caller releases it by recording a
/// terminal status for its name in the context and re-running the graph.
/// A blank name is replaced by a random one, readable through `name()`.
#[derive(Debug, Clone)]
pub struct HumanWork {
    name: String,
}

impl HumanWork {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name_or_generated(name.into()),
        }
    }
}

impl Work for HumanWork {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, context: &Context) -> Result<Option<Report>> {
        execute_resumable(&self.name, context, |ctx| Ok(Some(Report::waiting(ctx))))
    }
}

/// Completes immediately without touching the context.
#[derive(Debug, Clone)]
pub struct NoOpWork {
    name: String,
}

impl NoOpWork {
    pub fn new() -> Self {
        Self {
            name: Uuid::new_v4().to_string(),
        }
    }
}

impl Default for NoOpWork {
    fn default() -> Self {
        Self::new()
    }
}

impl Work for NoOpWork {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, context: &Context) -> Result<Option<Report>> {
        Ok(Some(Report::completed(context)))
    }

    fn is_noop(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(name: &str, status: Status, counter: Arc<AtomicUsize>) -> FnWork {
        FnWork::new(name, move |ctx| {
            counter.fetch_add(1, Ordering::SeqCst);
            Report::new(status, ctx)
        })
    }

    #[test]
    fn test_completed_work_is_not_rerun() {
        let counter = Arc::new(AtomicUsize::new(0));
        let work = counting("once", Status::Completed, counter.clone()).resumable();
        let context = Context::new();

        let first = work.execute(&context).unwrap().unwrap();
        let second = work.execute(&context).unwrap().unwrap();

        assert_eq!(first.status(), Status::Completed);
        assert_eq!(second.status(), Status::Completed);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(context.status("once"), Some(Status::Completed));
    }

    #[test]
    fn test_failed_work_is_not_rerun() {
        let counter = Arc::new(AtomicUsize::new(0));
        let work = counting("broken", Status::Failed, counter.clone()).resumable();
        let context = Context::new();

        work.execute(&context).unwrap();
        let again = work.execute(&context).unwrap().unwrap();

        assert_eq!(again.status(), Status::Failed);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_waiting_work_runs_again() {
        let counter = Arc::new(AtomicUsize::new(0));
        let work = counting("pending", Status::Waiting, counter.clone()).resumable();
        let context = Context::new();

        work.execute(&context).unwrap();
        work.execute(&context).unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(context.status("pending"), Some(Status::Waiting));
    }

    #[test]
    fn test_cleared_status_runs_again() {
        let counter = Arc::new(AtomicUsize::new(0));
        let work = counting("again", Status::Completed, counter.clone()).resumable();
        let context = Context::new();

        work.execute(&context).unwrap();
        context.clear_status("again");
        work.execute(&context).unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_same_name_shares_status() {
        let counter = Arc::new(AtomicUsize::new(0));
        let first = counting("shared", Status::Completed, counter.clone()).resumable();
        let second = counting("shared", Status::Completed, counter.clone()).resumable();
        let context = Context::new();

        first.execute(&context).unwrap();
        second.execute(&context).unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_no_report_leaves_status_unset() {
        struct Silent;
        impl Work for Silent {
            fn name(&self) -> &str {
                "silent"
            }
            fn execute(&self, _context: &Context) -> Result<Option<Report>> {
                Ok(None)
            }
        }

        let context = Context::new();
        let report = Silent.resumable().execute(&context).unwrap();

        assert!(report.is_none());
        assert_eq!(context.status("silent"), None);
    }

    #[test]
    fn test_plain_fn_work_is_not_resumable() {
        let counter = Arc::new(AtomicUsize::new(0));
        let work = counting("plain", Status::Completed, counter.clone());
        let context = Context::new();

        work.execute(&context).unwrap();
        work.execute(&context).unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(context.status("plain"), None);
    }

    #[test]
    fn test_from_result_captures_error() {
        let work = FnWork::from_result("parse", |ctx: &Context| {
            let raw = ctx.get("raw").and_then(|v| v.as_str().map(str::to_string));
            raw.ok_or("missing 'raw'").map(|_| ())
        });
        let context = Context::new();

        let report = work.execute(&context).unwrap().unwrap();
        assert_eq!(report.status(), Status::Failed);
        assert_eq!(report.error().unwrap().to_string(), "missing 'raw'");

        context.put("raw", "data");
        let report = work.execute(&context).unwrap().unwrap();
        assert_eq!(report.status(), Status::Completed);
        assert!(report.error().is_none());
    }

    #[test]
    fn test_human_work_waits_until_released() {
        let approval = HumanWork::new("approval");
        let context = Context::new();

        let report = approval.execute(&context).unwrap().unwrap();
        assert_eq!(report.status(), Status::Waiting);

        context.set_status("approval", Status::Completed);
        let report = approval.execute(&context).unwrap().unwrap();
        assert_eq!(report.status(), Status::Completed);
    }

    #[test]
    fn test_blank_names_are_generated() {
        let work = FnWork::new("", |ctx| Report::completed(ctx));
        let human = HumanWork::new("  ");
        let other = FnWork::new("", |ctx| Report::completed(ctx)).resumable();

        assert!(!work.name().trim().is_empty());
        assert!(!human.name().trim().is_empty());
        assert_ne!(work.name(), other.name());

        let context = Context::new();
        work.resumable().execute(&context).unwrap();
        assert_eq!(context.status(""), None);
    }

    #[test]
    fn test_noop_detection() {
        assert!(NoOpWork::new().is_noop());
        assert!(NoOpWork::new().resumable().is_noop());
        assert!(!HumanWork::new("approval").is_noop());
        assert!(!FnWork::new("fn", |ctx| Report::completed(ctx)).is_noop());
    }

    #[test]
    fn test_noop_work_completes() {
        let noop = NoOpWork::new();
        let context = Context::new();

        let report = noop.execute(&context).unwrap().unwrap();
        assert_eq!(report.status(), Status::Completed);
        assert!(!noop.name().is_empty());
        assert!(context.statuses().is_empty());
    }
}

//! Report Predicates
//!
//! Boolean tests over a [`Report`] that drive conditional branching and
//! repeat loops.
//!
//! All variants except [`ReportPredicate::Times`] are stateless. Counting
//! state is never stored in the predicate itself: a flow asks for a fresh
//! [`PredicateEvaluator`] on every execution and threads it through its
//! loop, so one predicate can be shared by many flows and runs.

use std::fmt;
use std::sync::Arc;

use super::report::{Report, Status};

type PredicateFn = dyn Fn(&Report) -> bool + Send + Sync;

/// Condition evaluated against a report.
#[derive(Clone, Default)]
pub enum ReportPredicate {
    AlwaysTrue,
    #[default]
    AlwaysFalse,
    Completed,
    Failed,
    Waiting,
    /// True until the n-th evaluation within one execution, false from it on.
    Times(u32),
    Custom(Arc<PredicateFn>),
}

impl ReportPredicate {
    /// "Run exactly `times` times" when used as a repeat condition.
    pub fn times(times: u32) -> Self {
        ReportPredicate::Times(times)
    }

    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&Report) -> bool + Send + Sync + 'static,
    {
        ReportPredicate::Custom(Arc::new(predicate))
    }

    /// Starts a new evaluation sequence with its own counter.
    pub fn evaluator(&self) -> PredicateEvaluator<'_> {
        match self {
            ReportPredicate::Times(times) => {
                PredicateEvaluator::Counting(TimesPredicate::new(*times))
            }
            other => PredicateEvaluator::Stateless(other),
        }
    }

    /// Evaluates the predicate once.
    ///
    /// A `Times` predicate evaluated this way sees a single call; loops
    /// should go through [`evaluator`](Self::evaluator) instead.
    pub fn apply(&self, report: &Report) -> bool {
        match self {
            ReportPredicate::AlwaysTrue => true,
            ReportPredicate::AlwaysFalse => false,
            ReportPredicate::Completed => report.status() == Status::Completed,
            ReportPredicate::Failed => report.status() == Status::Failed,
            ReportPredicate::Waiting => report.status() == Status::Waiting,
            ReportPredicate::Times(times) => TimesPredicate::new(*times).apply(report),
            ReportPredicate::Custom(f) => f(report),
        }
    }
}

impl fmt::Debug for ReportPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportPredicate::AlwaysTrue => write!(f, "AlwaysTrue"),
            ReportPredicate::AlwaysFalse => write!(f, "AlwaysFalse"),
            ReportPredicate::Completed => write!(f, "Completed"),
            ReportPredicate::Failed => write!(f, "Failed"),
            ReportPredicate::Waiting => write!(f, "Waiting"),
            ReportPredicate::Times(times) => write!(f, "Times({})", times),
            ReportPredicate::Custom(_) => write!(f, "Custom"),
        }
    }
}

/// Counts evaluations and turns false once the configured count is reached.
///
/// `Times(0)` is false from the first evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimesPredicate {
    times: u32,
    counter: u32,
}

impl TimesPredicate {
    pub fn new(times: u32) -> Self {
        Self { times, counter: 0 }
    }

    pub fn apply(&mut self, _report: &Report) -> bool {
        self.counter = self.counter.saturating_add(1);
        self.counter < self.times
    }

    /// Number of evaluations so far.
    pub fn count(&self) -> u32 {
        self.counter
    }
}

/// One evaluation sequence of a [`ReportPredicate`].
///
/// Only built by [`ReportPredicate::evaluator`], which routes `Times` to
/// `Counting` and everything else to `Stateless`.
#[derive(Debug)]
pub enum PredicateEvaluator<'a> {
    Stateless(&'a ReportPredicate),
    Counting(TimesPredicate),
}

impl PredicateEvaluator<'_> {
    pub fn apply(&mut self, report: &Report) -> bool {
        match self {
            PredicateEvaluator::Counting(times) => times.apply(report),
            PredicateEvaluator::Stateless(predicate) => predicate.apply(report),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::work::Context;

    fn report(status: Status) -> Report {
        Report::new(status, &Context::new())
    }

    #[test]
    fn test_constant_predicates() {
        let completed = report(Status::Completed);
        assert!(ReportPredicate::AlwaysTrue.apply(&completed));
        assert!(!ReportPredicate::AlwaysFalse.apply(&completed));
    }

    #[test]
    fn test_status_predicates() {
        let completed = report(Status::Completed);
        let failed = report(Status::Failed);
        let waiting = report(Status::Waiting);

        assert!(ReportPredicate::Completed.apply(&completed));
        assert!(!ReportPredicate::Completed.apply(&failed));
        assert!(ReportPredicate::Failed.apply(&failed));
        assert!(!ReportPredicate::Failed.apply(&waiting));
        assert!(ReportPredicate::Waiting.apply(&waiting));
        assert!(!ReportPredicate::Waiting.apply(&completed));
    }

    #[test]
    fn test_custom_predicate() {
        let has_total = ReportPredicate::custom(|r| r.context().contains_key("total"));
        let context = Context::new();
        let r = Report::completed(&context);

        assert!(!has_total.apply(&r));
        context.put("total", 10);
        assert!(has_total.apply(&r));
    }

    #[test]
    fn test_times_predicate_false_on_nth_call() {
        let r = report(Status::Completed);
        let mut times = TimesPredicate::new(3);

        assert!(times.apply(&r));
        assert!(times.apply(&r));
        assert!(!times.apply(&r));
        assert_eq!(times.count(), 3);
    }

    #[test]
    fn test_evaluators_do_not_share_counters() {
        let predicate = ReportPredicate::times(2);
        let r = report(Status::Completed);

        let mut first = predicate.evaluator();
        assert!(first.apply(&r));

        let mut second = predicate.evaluator();
        assert!(second.apply(&r));

        assert!(!first.apply(&r));
        assert!(!second.apply(&r));
    }

    #[test]
    fn test_times_one_is_false_immediately() {
        let r = report(Status::Failed);
        assert!(!ReportPredicate::times(1).apply(&r));
    }

    #[test]
    fn test_times_zero_never_holds() {
        let r = report(Status::Completed);
        let mut times = TimesPredicate::new(0);

        assert!(!times.apply(&r));
        assert!(!times.apply(&r));
    }

    #[test]
    fn test_evaluator_routes_times_to_counter() {
        let predicate = ReportPredicate::times(3);
        assert!(matches!(predicate.evaluator(), PredicateEvaluator::Counting(_)));
        assert!(matches!(
            ReportPredicate::Completed.evaluator(),
            PredicateEvaluator::Stateless(_)
        ));
    }

    #[test]
    fn test_default_is_always_false() {
        assert!(!ReportPredicate::default().apply(&report(Status::Completed)));
    }
}

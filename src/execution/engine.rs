//! Workflow Engine
//!
//! A registry of named flows plus the entry points that run them. The
//! engine adds nothing to execution semantics: `run` delegates straight to
//! the flow.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};
use parking_lot::RwLock;

use crate::error::{FlowError, Result};
use crate::flow::Flow;
use crate::work::{Context, Report, Status, Work};

use super::instance::Instance;

/// Workflow engine.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use flowrunner::execution::Engine;
/// use flowrunner::flow::SequentialFlow;
/// use flowrunner::work::{Context, FnWork, Report, Status, WorkExt};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let flow = SequentialFlow::builder()
///         .named("greet")
///         .execute(FnWork::new("hello", |ctx| Report::completed(ctx)).into_unit())
///         .build()?;
///
///     let engine = Engine::new();
///     engine.add(Arc::new(flow));
///
///     let report = engine.run_named("greet", &Context::new())?;
///     assert_eq!(report.map(|r| r.status()), Some(Status::Completed));
///     Ok(())
/// }
/// ```
#[derive(Default)]
pub struct Engine {
    flows: RwLock<HashMap<String, Arc<dyn Flow>>>,
}

impl Engine {
    /// Creates an engine with no registered flows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a flow under its name, returning any flow it replaces.
    pub fn add(&self, flow: Arc<dyn Flow>) -> Option<Arc<dyn Flow>> {
        let name = flow.name().to_string();
        debug!("Registering flow '{}'", name);
        self.flows.write().insert(name, flow)
    }

    pub fn remove(&self, name: &str) -> Option<Arc<dyn Flow>> {
        self.flows.write().remove(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Flow>> {
        self.flows.read().get(name).cloned()
    }

    /// Names of all registered flows, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.flows.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.flows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.read().is_empty()
    }

    /// Runs `flow` against `context` and returns its report.
    pub fn run(&self, flow: &dyn Flow, context: &Context) -> Result<Option<Report>> {
        info!("Running workflow '{}'", flow.name());
        flow.execute(context)
    }

    /// Runs a registered flow.
    ///
    /// # Errors
    ///
    /// [`FlowError::UnknownFlow`] if nothing is registered under `name`,
    /// otherwise whatever the flow raises.
    pub fn run_named(&self, name: &str, context: &Context) -> Result<Option<Report>> {
        let flow = self
            .get(name)
            .ok_or_else(|| FlowError::UnknownFlow(name.to_string()))?;
        self.run(flow.as_ref(), context)
    }

    /// Runs (or resumes) an instance against its own context.
    pub fn run_instance(&self, instance: &Instance) -> Result<Option<Report>> {
        debug!("Running instance '{}' of '{}'", instance.id(), instance.flow());
        self.run_named(instance.flow(), instance.context())
    }

    /// Extension point for external events about a work unit.
    ///
    /// Not wired into execution; always returns `None`.
    pub fn notify(&self, name: &str, work_name: &str, status: Status) -> Option<Report> {
        debug!(
            "Ignoring notification for '{}' in flow '{}' ({})",
            work_name, name, status
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::WorkerPool;
    use crate::flow::testing::CountingWork;
    use crate::flow::{ConditionalFlow, ParallelFlow, RepeatFlow, SequentialFlow};
    use crate::work::{FnWork, ReportPredicate, WorkExt, WorkUnit};
    use serde_json::json;

    fn simple_flow(name: &str) -> (SequentialFlow, CountingWork) {
        let work = CountingWork::new("step", Status::Completed);
        let flow = SequentialFlow::new(name, vec![work.unit()]).unwrap();
        (flow, work)
    }

    #[test]
    fn test_run_delegates_to_flow() {
        let engine = Engine::new();
        let (flow, work) = simple_flow("simple");

        let report = engine.run(&flow, &Context::new()).unwrap().unwrap();

        assert_eq!(report.status(), Status::Completed);
        assert_eq!(work.count(), 1);
    }

    #[test]
    fn test_add_get_remove() {
        let engine = Engine::new();
        assert!(engine.is_empty());

        let (flow, _) = simple_flow("alpha");
        assert!(engine.add(Arc::new(flow)).is_none());
        let (flow, _) = simple_flow("beta");
        engine.add(Arc::new(flow));

        assert_eq!(engine.len(), 2);
        assert_eq!(engine.names(), vec!["alpha", "beta"]);
        assert!(engine.get("alpha").is_some());

        let removed = engine.remove("alpha").unwrap();
        assert_eq!(removed.name(), "alpha");
        assert!(engine.get("alpha").is_none());
        assert!(engine.remove("alpha").is_none());
    }

    #[test]
    fn test_add_replaces_same_name() {
        let engine = Engine::new();
        let (first, _) = simple_flow("same");
        let (second, _) = simple_flow("same");

        engine.add(Arc::new(first));
        assert!(engine.add(Arc::new(second)).is_some());
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn test_run_named_unknown_flow() {
        let engine = Engine::new();
        let result = engine.run_named("missing", &Context::new());
        assert!(matches!(result, Err(FlowError::UnknownFlow(name)) if name == "missing"));
    }

    #[test]
    fn test_run_instance_resumes_waiting_flow() {
        let engine = Engine::new();
        let after = CountingWork::new("after", Status::Completed);
        let flow = SequentialFlow::builder()
            .named("approval")
            .execute(crate::work::HumanWork::new("review").into_unit())
            .then(after.unit())
            .build()
            .unwrap();
        engine.add(Arc::new(flow));

        let instance = Instance::new("approval");
        let report = engine.run_instance(&instance).unwrap().unwrap();
        assert_eq!(report.status(), Status::Waiting);

        instance.context().set_status("review", Status::Completed);
        let report = engine.run_instance(&instance).unwrap().unwrap();

        assert_eq!(report.status(), Status::Completed);
        assert_eq!(after.count(), 1);
        assert!(instance.context().is_completed());
    }

    #[test]
    fn test_notify_is_a_no_op() {
        let engine = Engine::new();
        let (flow, work) = simple_flow("simple");
        engine.add(Arc::new(flow));

        assert!(engine.notify("simple", "step", Status::Completed).is_none());
        assert_eq!(work.count(), 0);
    }

    #[test]
    fn test_compose_workflow_from_separate_flows() {
        let printed = CountingWork::new("print foo", Status::Completed);
        let hello = CountingWork::new("hello", Status::Completed);
        let world = CountingWork::new("world", Status::Completed);
        let done = CountingWork::new("done", Status::Completed);
        let pool = Arc::new(WorkerPool::new(2));

        let repeat = RepeatFlow::builder()
            .named("print foo 3 times")
            .repeat(printed.unit())
            .times(3)
            .build_unit()
            .unwrap();
        let parallel = ParallelFlow::builder()
            .named("print hello and world in parallel")
            .execute(hello.unit())
            .execute(world.unit())
            .with(pool.clone())
            .build_unit()
            .unwrap();
        let conditional = ConditionalFlow::builder()
            .execute(parallel)
            .when(ReportPredicate::Completed)
            .then(done.unit())
            .build_unit()
            .unwrap();
        let workflow = SequentialFlow::builder()
            .execute(repeat)
            .then(conditional)
            .build()
            .unwrap();

        let engine = Engine::new();
        let context = Context::new();
        let report = engine.run(&workflow, &context).unwrap().unwrap();
        pool.shutdown();

        assert_eq!(report.status(), Status::Completed);
        assert_eq!(printed.count(), 3);
        assert_eq!(hello.count(), 1);
        assert_eq!(world.count(), 1);
        assert_eq!(done.count(), 1);
    }

    #[test]
    fn test_context_shares_data_between_work_units() {
        fn word_count(partition: u32) -> WorkUnit {
            FnWork::new(format!("count partition {}", partition), move |ctx| {
                let key = format!("partition{}", partition);
                let Some(text) = ctx.get(&key).and_then(|v| v.as_str().map(str::to_string)) else {
                    return Report::failed(ctx, format!("missing {}", key));
                };
                ctx.put(format!("wordCountInPartition{}", partition), text.split(' ').count());
                Report::completed(ctx)
            })
            .into_unit()
        }

        let aggregate = FnWork::new("aggregate word counts", |ctx| {
            let total: u64 = ctx
                .values()
                .iter()
                .filter(|(key, _)| key.contains("InPartition"))
                .filter_map(|(_, value)| value.as_u64())
                .sum();
            ctx.put("totalCount", total);
            Report::completed(ctx)
        });

        let pool = Arc::new(WorkerPool::new(2));
        let workflow = SequentialFlow::builder()
            .execute(
                ParallelFlow::builder()
                    .execute(word_count(1))
                    .execute(word_count(2))
                    .with(pool.clone())
                    .build_unit()
                    .unwrap(),
            )
            .then(aggregate.into_unit())
            .build()
            .unwrap();

        let context = Context::new();
        context.put("partition1", "hello foo");
        context.put("partition2", "hello bar baz");
        let report = Engine::new().run(&workflow, &context).unwrap().unwrap();

        assert_eq!(report.status(), Status::Completed);
        assert_eq!(context.get("totalCount"), Some(json!(5)));
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let a = CountingWork::new("a", Status::Completed);
        let b = CountingWork::new("b", Status::Completed);
        let pool = Arc::new(WorkerPool::new(2));
        let workflow = SequentialFlow::builder()
            .named("graph")
            .execute(a.unit())
            .then(
                ParallelFlow::builder()
                    .named("fan")
                    .execute(b.unit())
                    .with(pool)
                    .build_unit()
                    .unwrap(),
            )
            .build()
            .unwrap();
        let engine = Engine::new();
        let context = Context::new();

        engine.run(&workflow, &context).unwrap();
        let report = engine.run(&workflow, &context).unwrap().unwrap();

        assert_eq!(report.status(), Status::Completed);
        assert_eq!(a.count(), 1);
        assert_eq!(b.count(), 1);
        assert!(context.is_completed());
    }
}

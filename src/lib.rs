//! FlowRunner - Composable Workflow Execution
//!
//! Small units of work are combined into flows (sequence, conditional
//! branch, repeat loop and parallel fan-out) which are units of work
//! themselves, so flows nest freely. A run executes against one shared
//! [`Context`]; re-running the same graph with the same context skips every
//! unit already recorded as completed or failed, which is how waiting
//! (human-approval) steps are resumed.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`work`]: Context, reports, predicates and the `Work` contract
//! - [`flow`]: Sequential, conditional, repeat and parallel flows
//! - [`execution`]: Engine facade, run instances and the worker pool
//! - [`config`]: Worker pool configuration
//! - [`error`]: Error types
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use flowrunner::{Context, Engine, ParallelFlow, SequentialFlow, Status, WorkerPool};
//! use flowrunner::work::{FnWork, Report, WorkExt};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = Arc::new(WorkerPool::new(2));
//!
//!     let workflow = SequentialFlow::builder()
//!         .named("report")
//!         .execute(
//!             ParallelFlow::builder()
//!                 .execute(FnWork::new("left", |ctx| { ctx.put("l", 1); Report::completed(ctx) }).into_unit())
//!                 .execute(FnWork::new("right", |ctx| { ctx.put("r", 2); Report::completed(ctx) }).into_unit())
//!                 .with(pool.clone())
//!                 .build_unit()?,
//!         )
//!         .build()?;
//!
//!     let context = Context::new();
//!     let report = Engine::new().run(&workflow, &context)?;
//!     assert_eq!(report.map(|r| r.status()), Some(Status::Completed));
//!
//!     pool.shutdown();
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod execution;
pub mod flow;
pub mod work;

// Re-export commonly used types
pub use config::{load_config, PoolConfig};
pub use error::{FlowError, Result};
pub use execution::{Engine, Instance, WorkerPool};
pub use flow::{ConditionalFlow, Flow, ParallelFlow, ParallelPolicy, ParallelReport, RepeatFlow, SequentialFlow};
pub use work::{Context, Report, ReportPredicate, Status, Work, WorkUnit};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "FlowRunner";

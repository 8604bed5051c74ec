//! Work Model
//!
//! The leaf types every flow is built from.
//!
//! # Structure
//!
//! - [`context`]: Shared run context (values and status cache)
//! - [`report`]: Execution status and result envelope
//! - [`predicate`]: Report predicates for branching and looping
//! - [`unit`]: The `Work` contract and atomic work units

pub mod context;
pub mod predicate;
pub mod report;
pub mod unit;

pub use context::{Context, ContextSnapshot};
pub use predicate::{PredicateEvaluator, ReportPredicate, TimesPredicate};
pub use report::{Report, Status, WorkReport};
pub use unit::{execute_resumable, FnWork, HumanWork, NoOpWork, Resumable, Work, WorkExt, WorkUnit};

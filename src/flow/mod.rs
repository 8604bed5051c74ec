//! Flow Composition
//!
//! Composite units built from other units. Every flow implements
//! [`Work`], so flows nest arbitrarily, and every flow is resumable under
//! its own name.
//!
//! # Structure
//!
//! - [`sequential`]: Run units in order, stop at the first blocker
//! - [`conditional`]: Branch on a predicate over the first unit's report
//! - [`repeat`]: Loop a unit while a predicate holds
//! - [`parallel`]: Fan units out onto a worker pool and join
//! - [`executor`]: The submit-and-join machinery behind parallel flows
//! - [`parallel_report`]: Policy-driven aggregation of parallel results

pub mod conditional;
pub mod executor;
pub mod parallel;
pub mod parallel_report;
pub mod repeat;
pub mod sequential;

pub use conditional::{ConditionalFlow, ConditionalFlowBuilder};
pub use executor::ParallelExecutor;
pub use parallel::{ParallelFlow, ParallelFlowBuilder};
pub use parallel_report::{ParallelPolicy, ParallelReport};
pub use repeat::{RepeatFlow, RepeatFlowBuilder};
pub use sequential::{SequentialFlow, SequentialFlowBuilder};

use uuid::Uuid;

use crate::error::{FlowError, Result};
use crate::work::Work;

/// A composite unit of work.
pub trait Flow: Work {}

/// Name given to flows built without [`named`](SequentialFlowBuilder::named).
fn generated_name() -> String {
    Uuid::new_v4().to_string()
}

fn validate_name(flow: &'static str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(FlowError::InvalidDefinition {
            flow,
            reason: "name must not be empty".to_string(),
        });
    }
    Ok(())
}

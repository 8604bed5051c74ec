//! Error Types
//!
//! Two kinds of failure exist in a run:
//!
//! - A work unit's own failure is *not* an error here. Work logic captures
//!   it and returns a [`Report`](crate::work::Report) with status
//!   [`Status::Failed`](crate::work::Status) and the cause attached as a
//!   [`WorkError`].
//! - Infrastructure failures ([`FlowError`]) abort the enclosing step and
//!   propagate to the caller through `?`. Only the parallel executor and the
//!   construction/configuration surfaces produce them.

use std::sync::Arc;

use thiserror::Error;

/// Error attached to a failed report.
///
/// Shared so reports stay cheap to clone and can cross worker threads.
pub type WorkError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Fatal errors raised while building or running flows.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("the parallel flow was interrupted while submitting work units")]
    Interrupted,

    #[error("the parallel flow was interrupted while waiting for the result of work unit '{0}'")]
    InterruptedWaiting(String),

    #[error("unable to execute work unit '{work}': {message}")]
    WorkPanicked { work: String, message: String },

    #[error("unable to execute work unit '{work}'")]
    Nested {
        work: String,
        #[source]
        source: Box<FlowError>,
    },

    #[error("invalid {flow} definition: {reason}")]
    InvalidDefinition { flow: &'static str, reason: String },

    #[error("no flow registered under the name '{0}'")]
    UnknownFlow(String),

    #[error("failed to read config file '{path}': {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, FlowError>;

impl FlowError {
    /// Name of the work unit this error points at, when known.
    pub fn work_name(&self) -> Option<&str> {
        match self {
            Self::InterruptedWaiting(work)
            | Self::WorkPanicked { work, .. }
            | Self::Nested { work, .. } => Some(work),
            _ => None,
        }
    }
}

//! Flow Instances
//!
//! An instance is one run of a registered flow: it pairs the flow name with
//! the context that run owns, so a run that stopped on `WAITING` can be
//! picked up again later with the same state.

use uuid::Uuid;

use crate::work::Context;

/// A single run of a named flow.
#[derive(Debug, Clone)]
pub struct Instance {
    id: String,
    flow: String,
    context: Context,
}

impl Instance {
    /// Creates an instance with a random id.
    pub fn new(flow: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), flow)
    }

    /// Creates an instance with a caller-chosen id; an empty id is replaced
    /// by a random one.
    pub fn with_id(id: impl Into<String>, flow: impl Into<String>) -> Self {
        let id = id.into();
        let id = if id.trim().is_empty() {
            Uuid::new_v4().to_string()
        } else {
            id
        };

        Self {
            id,
            flow: flow.into(),
            context: Context::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Name of the flow this instance runs.
    pub fn flow(&self) -> &str {
        &self.flow
    }

    pub fn context(&self) -> &Context {
        &self.context
    }
}

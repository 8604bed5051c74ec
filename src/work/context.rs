//! Run Context
//!
//! Shared key/value store plus the per-name status cache that makes
//! re-invocation resumable. One context is created by the caller per run
//! and handed to the top-level flow.
//!
//! Cloning a [`Context`] is cheap and yields a handle to the *same* run
//! state, so parallel branches can write into it concurrently. Writers to
//! the same key race; branches are expected to use disjoint keys.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::report::Status;

#[derive(Default)]
struct Shared {
    values: RwLock<HashMap<String, Value>>,
    statuses: RwLock<HashMap<String, Status>>,
}

/// Run-scoped values and work statuses.
#[derive(Clone, Default)]
pub struct Context {
    shared: Arc<Shared>,
}

impl Context {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value, replacing any previous value under `key`.
    pub fn put(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.shared.values.write().insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.shared.values.read().get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.shared.values.read().contains_key(key)
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.shared.values.write().remove(key)
    }

    /// Copy of all values.
    pub fn values(&self) -> HashMap<String, Value> {
        self.shared.values.read().clone()
    }

    /// Last recorded status of the work unit called `name`.
    pub fn status(&self, name: &str) -> Option<Status> {
        self.shared.statuses.read().get(name).copied()
    }

    pub fn set_status(&self, name: impl Into<String>, status: Status) {
        self.shared.statuses.write().insert(name.into(), status);
    }

    /// Forgets the status of one work unit so it runs again.
    pub fn clear_status(&self, name: &str) -> Option<Status> {
        self.shared.statuses.write().remove(name)
    }

    /// Forgets every recorded status.
    pub fn clear_statuses(&self) {
        self.shared.statuses.write().clear();
    }

    /// Copy of all recorded statuses.
    pub fn statuses(&self) -> HashMap<String, Status> {
        self.shared.statuses.read().clone()
    }

    /// Returns true when at least one status is recorded and all of them
    /// are [`Status::Completed`].
    pub fn is_completed(&self) -> bool {
        let statuses = self.shared.statuses.read();
        !statuses.is_empty() && statuses.values().all(|s| *s == Status::Completed)
    }

    /// Returns true if both handles refer to the same run state.
    pub fn same_as(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Copies every value and status of `other` into this context,
    /// overwriting on key collision.
    pub(crate) fn merge_from(&self, other: &Context) {
        if self.same_as(other) {
            return;
        }
        let values = other.values();
        let statuses = other.statuses();
        self.shared.values.write().extend(values);
        self.shared.statuses.write().extend(statuses);
    }

    /// Serialisable copy of the current state.
    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot {
            values: self.values(),
            statuses: self.statuses(),
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("values", &*self.shared.values.read())
            .field("statuses", &*self.shared.statuses.read())
            .finish()
    }
}

/// Point-in-time copy of a [`Context`].
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ContextSnapshot {
    pub values: HashMap<String, Value>,
    pub statuses: HashMap<String, Status>,
}

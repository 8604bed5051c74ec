//! Workflow Execution Module
//!
//! Provides the engine facade that registers and runs flows, the
//! caller-owned worker pool used by parallel flows, and run instances.
//!
//! # Architecture
//!
//! - [`engine`]: Flow registry and run entry points
//! - [`instance`]: A named run with its own context
//! - [`pool`]: Fixed-size worker thread pool

pub mod engine;
pub mod instance;
pub mod pool;

pub use engine::Engine;
pub use instance::Instance;
pub use pool::WorkerPool;

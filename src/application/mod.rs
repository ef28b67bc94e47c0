//! Application layer containing the batching core.
//!
//! The `Registry` is the entry point callers submit work through. Each
//! destination has a `BatchWorker` running on its own `tokio` task, fed by a
//! bounded pending queue and flushed on a fixed timer.

pub mod queue;
pub mod registry;
pub mod worker;

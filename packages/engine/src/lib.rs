//! # recap-engine - queue store and scheduling services
//!
//! Wires the pure decision logic of `recap-algo` to a durable SQLite store:
//!
//! - [`storage`] - queue-entry and memory-state repositories behind a single
//!   `Mutex<Connection>` writer
//! - [`services`] - mistake ingestion, curveball/follow-up injection, review
//!   recording, and daily selection assembly
//! - [`config`] / [`logging`] - host-facing environment configuration and
//!   tracing setup
//!
//! All operations are synchronous and bounded-cost (linear in the pending
//! entry count); callers apply their own cancellation around surrounding
//! I/O, not inside this crate.

pub mod config;
pub mod logging;
pub mod services;
pub mod storage;

pub use recap_algo as algo;

pub use config::EngineConfig;
pub use services::ConceptRegistry;
pub use storage::{Storage, StorageError, StorageResult};

//! Audit layer: turns a manifest into an outdated-dependency report
//!
//! # Modules
//!
//! - [`pipeline`]: Per-package cache check, registry refresh and write-back
//! - [`scheduler`]: Bounded-concurrency batches over a whole manifest
//! - [`types`]: Report entries and target version selection
//! - [`command`]: `npm i` upgrade command builder
//! - [`session`]: Session files for replaying a report from the cache
//! - [`render`]: Text and JSON output
//! - [`error`]: Report-level error type

pub mod command;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod types;

//! Version management layer for npm dependency auditing
//!
//! This module provides the building blocks of the metadata refresh pipeline:
//! fetching abbreviated package metadata, caching it, and comparing versions.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Registry   │────▶│    Cache    │◀────│   SemVer    │
//! │  (fetch)    │     │  (storage)  │     │  (compare)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                   │
//!        ▼                   ▼
//! ┌─────────────┐     ┌─────────────┐
//! │ Registries  │     │PackageStore │
//! │   (npm)     │     │   (trait)   │
//! └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: SQLite-based package record cache
//! - [`store`]: Storage trait the pipeline depends on
//! - [`registry`]: Registry trait for fetching metadata from remote sources
//! - [`registries`]: Concrete registry implementations (npm)
//! - [`semver`]: Lenient version parsing and outdated classification
//! - [`error`]: Error types for cache and registry operations
//! - [`types`]: Records and metadata shared across the layer

pub mod cache;
pub mod error;
pub mod registries;
pub mod registry;
pub mod semver;
pub mod store;
pub mod types;

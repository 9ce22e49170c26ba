//! Authoritative world state for the Fabula ground-truth core.
//!
//! This crate owns the in-memory world aggregate and its persistence:
//!
//! - [`world`] -- the [`WorldState`] aggregate of six JSON sub-documents
//!   and the typed query surface over them.
//! - [`store`] -- the file-backed [`StateStore`]: strict load with schema
//!   validation, atomic save, snapshot and restore.
//! - [`config`] -- YAML store configuration with defaulted file names.
//! - [`error`] -- the [`StateError`] type.
//!
//! The aggregate is deliberately stored as raw [`serde_json::Value`]
//! documents so that the delta engine can address any leaf by dotted
//! path; the typed schemas in `fabula-types` are applied once, at load.

pub mod config;
pub mod error;
pub mod store;
pub mod world;

pub use config::{ConfigError, FileNames, StoreConfig};
pub use error::StateError;
pub use store::StateStore;
pub use world::WorldState;

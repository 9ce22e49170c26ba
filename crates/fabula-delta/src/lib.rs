//! The delta engine: turning planned effects into committed world change.
//!
//! The pipeline for one scene is:
//!
//! 1. [`expand`] -- rewrite shorthand effect paths (`actor.`, `target.`,
//!    `relationship.`) into absolute paths against a [`PathBinding`];
//!    fail-fast on unbound roles.
//! 2. [`apply`] -- apply (or dry-run) one effect against the
//!    [`fabula_state::WorldState`], with all checks done before any
//!    mutation.
//! 3. [`batch`] -- apply a whole batch best-effort, producing an
//!    [`ApplyReport`] of committed deltas and rejected effects.
//!
//! [`slot`] holds the shared mutable path resolver the apply step uses.

pub mod apply;
pub mod batch;
pub mod error;
pub mod expand;
pub mod slot;

pub use apply::{apply_delta, validate_delta};
pub use batch::{apply_deltas, ApplyReport};
pub use error::DeltaError;
pub use expand::{expand_effects, expand_shorthand_path, PathBinding};
pub use slot::resolve_slot_mut;

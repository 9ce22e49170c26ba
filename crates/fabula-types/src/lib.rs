//! Shared types for the Fabula ground-truth core.
//!
//! Fabula tracks the symbolic state of a serialized drama's world --
//! characters, relationships, secrets, assets, and open narrative threads --
//! and applies validated mutations to it between prose-generation passes.
//! This crate holds the types every other Fabula crate agrees on:
//!
//! - [`ids`] -- String-backed typed identifiers (`char_varo` style slugs).
//! - [`docs`] -- Typed schemas for the persisted JSON sub-documents.
//! - [`effect`] -- The [`Effect`] mutation instruction, its [`Op`] table,
//!   and the provenance-stamped [`CommittedDelta`] record.
//! - [`operator`] -- The read-only [`Operator`] catalog shapes.

pub mod docs;
pub mod effect;
pub mod ids;
pub mod operator;

// Re-export primary types at crate root.
pub use docs::{
    Assets, Bdi, Character, CharacterStatus, DecayPolicy, LedgerEntry, Location, Office,
    Relationship, Secret, SecretStats, SecretStatus, Thread, ThreadStatus, ThreadUrgency,
    WorldDoc, WorldTime,
};
pub use effect::{CommittedDelta, Effect, FailedEffect, Op};
pub use ids::{
    CharacterId, HolderId, LocationId, OfficeId, OperatorId, RelationshipId, SecretId, ThreadId,
};
pub use operator::{Operator, Prereq};

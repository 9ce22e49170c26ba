//! Error types for the delta engine.
//!
//! Every variant here describes one rejected effect. Within a batch these
//! are folded into the apply report as [`fabula_types::FailedEffect`]
//! entries rather than aborting the batch; the expander is the one
//! fail-fast surface, since an unbound shorthand root poisons every
//! effect that uses it.

/// Reasons a single effect cannot be expanded or applied.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeltaError {
    /// The effect path does not resolve to a slot in the world aggregate.
    #[error("could not resolve path: {0}")]
    UnresolvablePath(String),

    /// A shorthand `target.` path was used with no target bound.
    #[error("effect path requires a target, but none is bound")]
    NoTargetBound,

    /// A shorthand `relationship.` path was used with no relationship
    /// bound.
    #[error("effect path requires a relationship, but none is bound")]
    NoRelationshipBound,

    /// A numeric operation found a non-numeric value at its path.
    #[error("expected number at {path}")]
    ExpectedNumber {
        /// The offending effect path.
        path: String,
    },

    /// An array operation found a non-array value at its path.
    #[error("expected array at {path}")]
    ExpectedArray {
        /// The offending effect path.
        path: String,
    },

    /// The effect is missing a payload field its operation requires.
    #[error("{op} effect is missing required field `{field}`")]
    MissingField {
        /// The operation name.
        op: &'static str,
        /// The absent field.
        field: &'static str,
    },

    /// A transfer source holder has no ledger entry.
    #[error("unknown ledger holder: {0}")]
    UnknownHolder(String),

    /// A transfer would overdraw its source holder.
    #[error("insufficient funds: {holder} has {balance} denarii, needs {amount}")]
    InsufficientFunds {
        /// The source holder.
        holder: String,
        /// The holder's current balance.
        balance: f64,
        /// The amount the transfer asked for.
        amount: f64,
    },

    /// A transfer amount is negative.
    #[error("transfer amount must not be negative")]
    NegativeTransfer,

    /// A transfer names the same holder as both source and destination.
    #[error("transfer source and destination are the same holder: {0}")]
    SelfTransfer(String),

    /// A numeric operation produced a non-finite result.
    #[error("arithmetic produced a non-finite number")]
    NonFinite,
}

//! Effects, operations, and committed delta records.
//!
//! An [`Effect`] is the atomic unit of state change: an operation, a dotted
//! path into the world aggregate, and operation-specific payload fields.
//! Effects are ephemeral value objects built by planners and consumed exactly
//! once by the delta engine; only their *result* persists, optionally logged
//! as a [`CommittedDelta`] with provenance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::ids::HolderId;

/// The operation an effect performs at its resolved path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    /// Overwrite the resolved path with `value` verbatim (any JSON type).
    Set,
    /// Numeric addition onto the current value (null reads as zero).
    Add,
    /// Numeric subtraction from the current value (null reads as zero).
    Subtract,
    /// Numeric multiplication of the current value (used for decay factors).
    Multiply,
    /// Push `value` onto the array at the resolved path.
    Append,
    /// Remove the first array element equal to `value` (or matching `match`).
    Remove,
    /// Move `denarii` from ledger holder `from` to ledger holder `to`.
    Transfer,
}

impl Op {
    /// The lowercase wire name of the operation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Append => "append",
            Self::Remove => "remove",
            Self::Transfer => "transfer",
        }
    }
}

impl core::fmt::Display for Op {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One atomic state mutation instruction.
///
/// The `path` may be shorthand (`actor.`, `target.`, `relationship.`) until
/// it passes through the expander, after which it is absolute
/// (`characters.<id>.`, `relationships.<id>.`, `world.`, `assets.`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    /// Dotted path to the mutation target.
    pub path: String,
    /// The operation to perform.
    pub op: Op,
    /// Payload for `set`/`add`/`subtract`/`multiply`/`append`/`remove`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Source ledger holder for `transfer`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<HolderId>,
    /// Destination ledger holder for `transfer`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<HolderId>,
    /// Amount moved by `transfer`, in denarii.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denarii: Option<f64>,
    /// Object pattern for `remove`: the first array element whose fields all
    /// equal the pattern's is removed. Used when elements are objects with
    /// no stable identity value.
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub r#match: Option<Value>,
}

impl Effect {
    /// Build a bare effect with no payload fields.
    fn bare(path: impl Into<String>, op: Op) -> Self {
        Self {
            path: path.into(),
            op,
            value: None,
            from: None,
            to: None,
            denarii: None,
            r#match: None,
        }
    }

    /// A `set` effect overwriting `path` with `value`.
    pub fn set(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::bare(path, Op::Set)
        }
    }

    /// An `add` effect adding `amount` to the number at `path`.
    pub fn add(path: impl Into<String>, amount: f64) -> Self {
        Self {
            value: Some(Value::from(amount)),
            ..Self::bare(path, Op::Add)
        }
    }

    /// A `subtract` effect removing `amount` from the number at `path`.
    pub fn subtract(path: impl Into<String>, amount: f64) -> Self {
        Self {
            value: Some(Value::from(amount)),
            ..Self::bare(path, Op::Subtract)
        }
    }

    /// A `multiply` effect scaling the number at `path` by `factor`.
    pub fn multiply(path: impl Into<String>, factor: f64) -> Self {
        Self {
            value: Some(Value::from(factor)),
            ..Self::bare(path, Op::Multiply)
        }
    }

    /// An `append` effect pushing `value` onto the array at `path`.
    pub fn append(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::bare(path, Op::Append)
        }
    }

    /// A `remove` effect deleting the first element of the array at `path`
    /// equal to `value`.
    pub fn remove(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::bare(path, Op::Remove)
        }
    }

    /// A `transfer` effect moving `denarii` from one ledger holder to
    /// another.
    pub fn transfer(
        from: impl Into<HolderId>,
        to: impl Into<HolderId>,
        denarii: f64,
    ) -> Self {
        Self {
            from: Some(from.into()),
            to: Some(to.into()),
            denarii: Some(denarii),
            ..Self::bare("assets.ledger", Op::Transfer)
        }
    }
}

/// A successfully applied effect with provenance, kept for the episode's
/// delta log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommittedDelta {
    /// Record id (UUID v7, time-ordered).
    pub id: Uuid,
    /// The scene or episode that produced the effect.
    pub provenance: String,
    /// The effect as applied, with its path fully expanded.
    pub effect: Effect,
    /// When the effect was committed.
    pub committed_at: DateTime<Utc>,
}

impl CommittedDelta {
    /// Stamp an applied effect with provenance and a fresh record id.
    pub fn record(effect: Effect, provenance: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            provenance: provenance.into(),
            effect,
            committed_at: Utc::now(),
        }
    }
}

/// A rejected effect paired with the reason it failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedEffect {
    /// The effect that could not be applied.
    pub effect: Effect,
    /// Human-readable failure reason.
    pub error: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn op_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Op::Subtract).unwrap(), "\"subtract\"");
        assert_eq!(Op::Transfer.to_string(), "transfer");
    }

    #[test]
    fn effect_wire_shape_skips_absent_fields() {
        let effect = Effect::add("actor.stats.wealth", 10.0);
        let value = serde_json::to_value(&effect).unwrap();
        assert_eq!(
            value,
            json!({ "path": "actor.stats.wealth", "op": "add", "value": 10.0 }),
        );
    }

    #[test]
    fn transfer_effect_carries_ledger_fields() {
        let effect = Effect::transfer("char_varo", "treasury", 250.0);
        let value = serde_json::to_value(&effect).unwrap();
        assert_eq!(
            value,
            json!({
                "path": "assets.ledger",
                "op": "transfer",
                "from": "char_varo",
                "to": "treasury",
                "denarii": 250.0
            }),
        );
    }

    #[test]
    fn effect_deserializes_match_field() {
        let effect: Effect = serde_json::from_value(json!({
            "path": "assets.contracts",
            "op": "remove",
            "match": { "id": "contract_grain" }
        }))
        .unwrap();
        assert_eq!(effect.op, Op::Remove);
        assert_eq!(
            effect.r#match.and_then(|m| m.get("id").cloned()),
            Some(json!("contract_grain")),
        );
    }

    #[test]
    fn committed_delta_stamps_provenance() {
        let delta = CommittedDelta::record(Effect::add("world.global.unrest", 5.0), "ep02_sc04");
        assert_eq!(delta.provenance, "ep02_sc04");
        assert_eq!(delta.effect.op, Op::Add);
    }
}

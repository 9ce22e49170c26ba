//! Applying a single effect to the world aggregate.
//!
//! Each operation checks everything it needs before mutating, so a
//! rejected effect leaves the world exactly as it found it; that property
//! is what lets a batch keep going past a failure.
//!
//! Numeric operations read an absent or `null` leaf as zero, which lets
//! an `add` introduce a stat the character never had. Results must be
//! finite; `NaN` and infinities are rejected rather than written into the
//! world.

use fabula_expr::values_equal;
use fabula_state::WorldState;
use fabula_types::{Effect, Op};
use serde_json::{Number, Value};

use crate::error::DeltaError;
use crate::slot::resolve_slot_mut;

/// The effect's `value` payload, required by most operations.
fn require_value(effect: &Effect) -> Result<&Value, DeltaError> {
    effect.value.as_ref().ok_or(DeltaError::MissingField {
        op: effect.op.as_str(),
        field: "value",
    })
}

/// Read a slot as a number, with `null` standing in for zero.
fn slot_number(slot: &Value, path: &str) -> Result<f64, DeltaError> {
    match slot {
        Value::Null => Ok(0.0),
        Value::Number(n) => n.as_f64().ok_or(DeltaError::NonFinite),
        _ => Err(DeltaError::ExpectedNumber {
            path: path.to_owned(),
        }),
    }
}

/// Wrap an arithmetic result, rejecting non-finite values.
fn finite(result: f64) -> Result<Value, DeltaError> {
    Number::from_f64(result)
        .map(Value::Number)
        .ok_or(DeltaError::NonFinite)
}

/// Does a `remove` pattern select this array element?
///
/// An object pattern matches when every one of its fields equals the
/// element's; any other pattern matches by whole-value equality.
fn matches_pattern(entry: &Value, pattern: &Value) -> bool {
    match pattern {
        Value::Object(fields) => fields
            .iter()
            .all(|(key, want)| entry.get(key).is_some_and(|have| values_equal(have, want))),
        other => values_equal(entry, other),
    }
}

// Float arithmetic cannot overflow; non-finite results are rejected by
// `finite` before they reach the world.
#[allow(clippy::arithmetic_side_effects)]
fn apply_arithmetic(state: &mut WorldState, effect: &Effect) -> Result<(), DeltaError> {
    let operand = require_value(effect)?
        .as_f64()
        .ok_or_else(|| DeltaError::ExpectedNumber {
            path: effect.path.clone(),
        })?;
    let slot = resolve_slot_mut(state, &effect.path, true)?;
    let current = slot_number(slot, &effect.path)?;
    let result = match effect.op {
        Op::Add => current + operand,
        Op::Subtract => current - operand,
        _ => current * operand,
    };
    *slot = finite(result)?;
    Ok(())
}

fn apply_append(state: &mut WorldState, effect: &Effect) -> Result<(), DeltaError> {
    let value = require_value(effect)?.clone();
    let slot = resolve_slot_mut(state, &effect.path, false)?;
    match slot {
        Value::Array(items) => {
            items.push(value);
            Ok(())
        }
        _ => Err(DeltaError::ExpectedArray {
            path: effect.path.clone(),
        }),
    }
}

fn apply_remove(state: &mut WorldState, effect: &Effect) -> Result<(), DeltaError> {
    let pattern = match (&effect.r#match, &effect.value) {
        (Some(pattern), _) => pattern.clone(),
        (None, Some(value)) => value.clone(),
        (None, None) => {
            return Err(DeltaError::MissingField {
                op: "remove",
                field: "value",
            });
        }
    };
    let slot = resolve_slot_mut(state, &effect.path, false)?;
    let Value::Array(items) = slot else {
        return Err(DeltaError::ExpectedArray {
            path: effect.path.clone(),
        });
    };
    // Removing an element that is already gone is not an error; the world
    // is in the state the effect asked for.
    if let Some(position) = items.iter().position(|entry| matches_pattern(entry, &pattern)) {
        items.remove(position);
    }
    Ok(())
}

#[allow(clippy::arithmetic_side_effects)] // balances are finite-checked f64
fn apply_transfer(state: &mut WorldState, effect: &Effect) -> Result<(), DeltaError> {
    let missing = |field| DeltaError::MissingField {
        op: "transfer",
        field,
    };
    let from = effect.from.as_ref().ok_or_else(|| missing("from"))?;
    let to = effect.to.as_ref().ok_or_else(|| missing("to"))?;
    let amount = effect.denarii.ok_or_else(|| missing("denarii"))?;
    if !amount.is_finite() {
        return Err(DeltaError::NonFinite);
    }
    if amount < 0.0 {
        return Err(DeltaError::NegativeTransfer);
    }
    // Source and destination resolve to the same ledger entry; crediting
    // it after the debit would mint `amount` out of nothing.
    if from == to {
        return Err(DeltaError::SelfTransfer(from.to_string()));
    }

    let ledger = state
        .assets
        .get_mut("ledger")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| DeltaError::ExpectedArray {
            path: effect.path.clone(),
        })?;
    let entry_for = |entries: &[Value], holder: &str| {
        entries
            .iter()
            .position(|entry| entry.get("holder").and_then(Value::as_str) == Some(holder))
    };

    let source = entry_for(ledger, from.as_str())
        .ok_or_else(|| DeltaError::UnknownHolder(from.to_string()))?;
    let source_balance = ledger
        .get(source)
        .and_then(|entry| entry.get("balance"))
        .and_then(Value::as_f64)
        .ok_or_else(|| DeltaError::ExpectedNumber {
            path: format!("assets.ledger.{from}.balance"),
        })?;
    if source_balance < amount {
        return Err(DeltaError::InsufficientFunds {
            holder: from.to_string(),
            balance: source_balance,
            amount,
        });
    }

    // A first payment to a new holder creates their ledger entry.
    let destination = match entry_for(ledger, to.as_str()) {
        Some(index) => index,
        None => {
            ledger.push(serde_json::json!({ "holder": to.as_str(), "balance": 0.0 }));
            ledger.len().saturating_sub(1)
        }
    };
    let destination_balance = ledger
        .get(destination)
        .and_then(|entry| entry.get("balance"))
        .and_then(Value::as_f64)
        .ok_or_else(|| DeltaError::ExpectedNumber {
            path: format!("assets.ledger.{to}.balance"),
        })?;

    let debited = finite(source_balance - amount)?;
    let credited = finite(destination_balance + amount)?;
    if let Some(entry) = ledger.get_mut(source).and_then(Value::as_object_mut) {
        entry.insert(String::from("balance"), debited);
    }
    if let Some(entry) = ledger.get_mut(destination).and_then(Value::as_object_mut) {
        entry.insert(String::from("balance"), credited);
    }
    Ok(())
}

/// Apply one fully-expanded effect to the world.
///
/// # Errors
///
/// Returns a [`DeltaError`] describing the rejection; the world is
/// untouched on any error.
pub fn apply_delta(state: &mut WorldState, effect: &Effect) -> Result<(), DeltaError> {
    match effect.op {
        Op::Set => {
            let value = require_value(effect)?.clone();
            let slot = resolve_slot_mut(state, &effect.path, true)?;
            *slot = value;
            Ok(())
        }
        Op::Add | Op::Subtract | Op::Multiply => apply_arithmetic(state, effect),
        Op::Append => apply_append(state, effect),
        Op::Remove => apply_remove(state, effect),
        Op::Transfer => apply_transfer(state, effect),
    }
}

/// Check whether an effect would apply, without changing the world.
///
/// Runs the effect against a scratch copy; at episode scale the clone is
/// cheaper than maintaining a parallel dry-run code path.
///
/// # Errors
///
/// Returns the same [`DeltaError`] that [`apply_delta`] would.
pub fn validate_delta(state: &WorldState, effect: &Effect) -> Result<(), DeltaError> {
    let mut scratch = state.clone();
    apply_delta(&mut scratch, effect)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state() -> WorldState {
        WorldState {
            world: json!({ "global": { "unrest": 30.0 } }),
            characters: json!([
                { "id": "char_varo",
                  "stats": { "wealth": 800.0, "influence": null },
                  "status": { "alive": true },
                  "bdi": { "beliefs": ["belief_milo_loyal"] } }
            ]),
            relationships: json!([
                { "id": "rel_varo_milo", "from": "char_varo", "to": "char_milo",
                  "weights": { "trust": 20.0 } }
            ]),
            secrets: json!([]),
            assets: json!({
                "ledger": [
                    { "holder": "char_varo", "balance": 800.0 },
                    { "holder": "treasury", "balance": 5000.0 }
                ],
                "contracts": [
                    { "id": "contract_grain", "holder": "char_varo" }
                ]
            }),
            threads: json!([]),
        }
    }

    #[test]
    fn set_overwrites_and_creates_leaves() {
        let mut s = state();
        apply_delta(&mut s, &Effect::set("characters.char_varo.status.wanted", true)).unwrap();
        apply_delta(&mut s, &Effect::set("characters.char_varo.status.mood", "grim")).unwrap();
        let status = &s.characters[0]["status"];
        assert_eq!(status["wanted"], json!(true));
        assert_eq!(status["mood"], json!("grim"));
    }

    #[test]
    fn arithmetic_reads_null_as_zero() {
        let mut s = state();
        apply_delta(&mut s, &Effect::add("characters.char_varo.stats.wealth", 50.0)).unwrap();
        apply_delta(&mut s, &Effect::add("characters.char_varo.stats.influence", 5.0)).unwrap();
        apply_delta(
            &mut s,
            &Effect::multiply("relationships.rel_varo_milo.weights.trust", 0.5),
        )
        .unwrap();
        let stats = &s.characters[0]["stats"];
        assert_eq!(stats["wealth"], json!(850.0));
        assert_eq!(stats["influence"], json!(5.0));
        assert_eq!(s.relationships[0]["weights"]["trust"], json!(10.0));
    }

    #[test]
    fn arithmetic_rejects_non_numeric_slot() {
        let mut s = state();
        let err = apply_delta(&mut s, &Effect::add("characters.char_varo.status.alive", 1.0))
            .unwrap_err();
        assert!(matches!(err, DeltaError::ExpectedNumber { .. }));
        // Rejection left the slot untouched.
        assert_eq!(s.characters[0]["status"]["alive"], json!(true));
    }

    #[test]
    fn append_and_remove_on_arrays() {
        let mut s = state();
        apply_delta(
            &mut s,
            &Effect::append("characters.char_varo.bdi.beliefs", "belief_milo_traitor"),
        )
        .unwrap();
        apply_delta(
            &mut s,
            &Effect::remove("characters.char_varo.bdi.beliefs", "belief_milo_loyal"),
        )
        .unwrap();
        assert_eq!(
            s.characters[0]["bdi"]["beliefs"],
            json!(["belief_milo_traitor"]),
        );
        // Removing again is a no-op.
        apply_delta(
            &mut s,
            &Effect::remove("characters.char_varo.bdi.beliefs", "belief_milo_loyal"),
        )
        .unwrap();
    }

    #[test]
    fn remove_by_match_pattern() {
        let mut s = state();
        let mut effect = Effect::remove("assets.contracts", Value::Null);
        effect.value = None;
        effect.r#match = Some(json!({ "id": "contract_grain" }));
        apply_delta(&mut s, &effect).unwrap();
        assert_eq!(s.assets["contracts"], json!([]));
    }

    #[test]
    fn append_to_non_array_is_rejected() {
        let mut s = state();
        let err = apply_delta(
            &mut s,
            &Effect::append("characters.char_varo.stats.wealth", 1.0),
        )
        .unwrap_err();
        assert!(matches!(err, DeltaError::ExpectedArray { .. }));
    }

    #[test]
    fn transfer_moves_funds_and_conserves_total() {
        let mut s = state();
        let before: f64 = 5800.0;
        apply_delta(&mut s, &Effect::transfer("treasury", "char_varo", 250.0)).unwrap();
        assert_eq!(s.assets["ledger"][0]["balance"], json!(1050.0));
        assert_eq!(s.assets["ledger"][1]["balance"], json!(4750.0));
        let total: f64 = s.assets["ledger"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e["balance"].as_f64())
            .sum();
        assert!((total - before).abs() < f64::EPSILON);
    }

    #[test]
    fn transfer_creates_destination_entry() {
        let mut s = state();
        apply_delta(&mut s, &Effect::transfer("treasury", "char_milo", 100.0)).unwrap();
        assert_eq!(
            s.assets["ledger"][2],
            json!({ "holder": "char_milo", "balance": 100.0 }),
        );
    }

    #[test]
    fn transfer_guards() {
        let mut s = state();
        let err =
            apply_delta(&mut s, &Effect::transfer("char_varo", "treasury", 10_000.0)).unwrap_err();
        assert!(matches!(err, DeltaError::InsufficientFunds { .. }));
        assert!(err.to_string().contains("insufficient funds"));

        let err =
            apply_delta(&mut s, &Effect::transfer("char_ghost", "treasury", 1.0)).unwrap_err();
        assert!(matches!(err, DeltaError::UnknownHolder(_)));

        let err =
            apply_delta(&mut s, &Effect::transfer("treasury", "char_varo", -5.0)).unwrap_err();
        assert_eq!(err, DeltaError::NegativeTransfer);

        // Nothing moved.
        assert_eq!(s.assets["ledger"][1]["balance"], json!(5000.0));
    }

    #[test]
    fn self_transfer_is_rejected_and_mints_nothing() {
        let mut s = state();
        let err =
            apply_delta(&mut s, &Effect::transfer("treasury", "treasury", 40.0)).unwrap_err();
        assert_eq!(err, DeltaError::SelfTransfer(String::from("treasury")));

        let total: f64 = s.assets["ledger"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e["balance"].as_f64())
            .sum();
        assert_eq!(s.assets["ledger"][1]["balance"], json!(5000.0));
        assert!((total - 5800.0).abs() < f64::EPSILON);
    }

    #[test]
    fn validate_leaves_world_untouched() {
        let s = state();
        validate_delta(&s, &Effect::add("characters.char_varo.stats.wealth", 50.0)).unwrap();
        assert_eq!(s.characters[0]["stats"]["wealth"], json!(800.0));
        assert!(validate_delta(&s, &Effect::set("nowhere.at.all", 1)).is_err());
    }
}

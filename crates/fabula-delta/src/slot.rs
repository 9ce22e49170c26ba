//! Mutable slot resolution over the world aggregate.
//!
//! An absolute effect path (`characters.char_varo.stats.wealth`) is
//! resolved into a `&mut serde_json::Value` slot in two steps: the first
//! segment selects a sub-document of the [`WorldState`], and the remaining
//! segments walk it. Walking uses the same segment grammar as expression
//! paths (`fabula_expr::parse_segment`), so what a prereq can read, an
//! effect can write.
//!
//! Arrays admit two addressing modes per segment: a numeric segment is a
//! plain index, and any other segment is a keyed lookup matching the
//! element's `id` or `holder` field. Keyed lookup is what lets effects
//! address `characters.char_varo` and `assets.ledger.treasury.balance`
//! without knowing list positions.

use fabula_expr::{parse_segment, Accessor};
use fabula_state::WorldState;
use serde_json::Value;

use crate::error::DeltaError;

/// Select the sub-document a path roots in.
fn document_mut<'s>(state: &'s mut WorldState, root: &str) -> Option<&'s mut Value> {
    match root {
        "world" => Some(&mut state.world),
        "characters" => Some(&mut state.characters),
        "relationships" => Some(&mut state.relationships),
        "secrets" => Some(&mut state.secrets),
        "assets" => Some(&mut state.assets),
        "threads" => Some(&mut state.threads),
        _ => None,
    }
}

/// Descend one named step into an object or array.
fn descend_name<'v>(
    cur: &'v mut Value,
    name: &str,
    create: bool,
    path: &str,
) -> Result<&'v mut Value, DeltaError> {
    let missing = || DeltaError::UnresolvablePath(path.to_owned());
    match cur {
        Value::Object(map) => {
            if create && !map.contains_key(name) {
                map.insert(name.to_owned(), Value::Null);
            }
            map.get_mut(name).ok_or_else(missing)
        }
        Value::Array(items) => {
            let index = if let Ok(index) = name.parse::<usize>() {
                index
            } else {
                items
                    .iter()
                    .position(|entry| {
                        entry.get("id").and_then(Value::as_str) == Some(name)
                            || entry.get("holder").and_then(Value::as_str) == Some(name)
                    })
                    .ok_or_else(missing)?
            };
            items.get_mut(index).ok_or_else(missing)
        }
        _ => Err(missing()),
    }
}

/// Resolve one full segment, including its optional bracket accessor.
fn step<'v>(
    cur: &'v mut Value,
    segment: &str,
    create_leaf: bool,
    path: &str,
) -> Result<&'v mut Value, DeltaError> {
    let missing = || DeltaError::UnresolvablePath(path.to_owned());
    let (name, accessor) = parse_segment(segment);
    let named = descend_name(cur, name, create_leaf && accessor.is_none(), path)?;
    match accessor {
        None => Ok(named),
        Some(Accessor::Index(index)) => match named {
            Value::Array(items) => items.get_mut(index).ok_or_else(missing),
            _ => Err(missing()),
        },
        Some(Accessor::Key(key)) => match named {
            Value::Object(map) => {
                if create_leaf && !map.contains_key(&key) {
                    map.insert(key.clone(), Value::Null);
                }
                map.get_mut(&key).ok_or_else(missing)
            }
            _ => Err(missing()),
        },
    }
}

/// Resolve an absolute effect path into a mutable slot.
///
/// With `create_leaf`, a missing *final* key on an object is created as
/// `null` so that `set` and the read-absent-as-zero arithmetic ops can
/// introduce new leaves; intermediate segments must always exist.
///
/// # Errors
///
/// Returns [`DeltaError::UnresolvablePath`] when the root names no
/// sub-document or any segment fails to resolve.
pub fn resolve_slot_mut<'s>(
    state: &'s mut WorldState,
    path: &str,
    create_leaf: bool,
) -> Result<&'s mut Value, DeltaError> {
    let mut parts = path.split('.');
    let root = parts.next().unwrap_or_default();
    let mut cur =
        document_mut(state, root).ok_or_else(|| DeltaError::UnresolvablePath(path.to_owned()))?;
    let segments: Vec<&str> = parts.collect();
    let last = segments.len().saturating_sub(1);
    for (i, segment) in segments.iter().enumerate() {
        cur = step(cur, segment, create_leaf && i == last, path)?;
    }
    Ok(cur)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state() -> WorldState {
        WorldState {
            world: json!({ "global": { "unrest": 30.0 } }),
            characters: json!([
                { "id": "char_varo", "stats": { "wealth": 800.0 } },
                { "id": "char_milo", "stats": { "wealth": 60.0 } }
            ]),
            relationships: json!([]),
            secrets: json!([]),
            assets: json!({
                "ledger": [ { "holder": "treasury", "balance": 5000.0 } ]
            }),
            threads: json!([]),
        }
    }

    #[test]
    fn keyed_array_lookup_by_id_and_holder() {
        let mut s = state();
        let slot = resolve_slot_mut(&mut s, "characters.char_milo.stats.wealth", false).unwrap();
        assert_eq!(*slot, json!(60.0));
        let slot = resolve_slot_mut(&mut s, "assets.ledger.treasury.balance", false).unwrap();
        assert_eq!(*slot, json!(5000.0));
    }

    #[test]
    fn numeric_index_and_bracket_accessor() {
        let mut s = state();
        let slot = resolve_slot_mut(&mut s, "assets.ledger.0.holder", false).unwrap();
        assert_eq!(*slot, json!("treasury"));
        let slot = resolve_slot_mut(&mut s, "assets.ledger[0].balance", false).unwrap();
        assert_eq!(*slot, json!(5000.0));
        let slot = resolve_slot_mut(&mut s, r#"world.global["unrest"]"#, false).unwrap();
        assert_eq!(*slot, json!(30.0));
    }

    #[test]
    fn create_leaf_only_creates_final_key() {
        let mut s = state();
        let slot =
            resolve_slot_mut(&mut s, "characters.char_varo.stats.influence", true).unwrap();
        assert_eq!(*slot, Value::Null);
        // Intermediate objects are never invented.
        assert!(matches!(
            resolve_slot_mut(&mut s, "characters.char_varo.gear.sword", true),
            Err(DeltaError::UnresolvablePath(_)),
        ));
    }

    #[test]
    fn unknown_root_or_key_is_unresolvable() {
        let mut s = state();
        for path in ["inventory.gold", "characters.char_nobody.stats.wealth", "world.time.year"] {
            assert!(matches!(
                resolve_slot_mut(&mut s, path, false),
                Err(DeltaError::UnresolvablePath(_)),
            ));
        }
    }
}

//! The in-memory world aggregate and its query surface.
//!
//! [`WorldState`] holds the six mutable sub-documents as raw
//! [`serde_json::Value`] trees. Keeping the documents untyped at rest is
//! what lets the delta engine address arbitrary leaves through dotted
//! paths; the typed schemas in `fabula-types` validate each document at
//! load time and back the query methods here, which deserialize individual
//! entries on demand.
//!
//! All lookups are linear scans. At single-episode scale (dozens of
//! characters, a few hundred relationships) this is well under any
//! measurable cost; do not index unless profiling says otherwise.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use fabula_types::{
    Character, CharacterId, Relationship, Secret, Thread, ThreadStatus, ThreadUrgency,
};

/// The canonical in-memory world snapshot: six independently-persisted
/// sub-documents.
///
/// Cross-references between documents (character ids, relationship
/// endpoints, secret holders) are not enforced at load time; they are
/// expected to resolve at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    /// `world.json` -- time, locations, global metrics.
    pub world: Value,
    /// `characters.json` -- list of characters.
    pub characters: Value,
    /// `relationships.json` -- directed weighted edges.
    pub relationships: Value,
    /// `secrets.json` -- secrets and their holders.
    pub secrets: Value,
    /// `assets.json` -- inventories, ledger, networks, offices.
    pub assets: Value,
    /// `threads.json` -- open narrative questions.
    pub threads: Value,
}

/// Find a list element whose `id` field equals `id`.
fn find_by_id<'v>(list: &'v Value, id: &str) -> Option<&'v Value> {
    list.as_array()?
        .iter()
        .find(|entry| entry.get("id").and_then(Value::as_str) == Some(id))
}

/// Deserialize a document entry into its typed schema.
///
/// Entries passed typed validation at load time, so a `None` here means
/// the entry was mutated into a shape the schema no longer accepts.
fn typed<T: serde::de::DeserializeOwned>(value: &Value) -> Option<T> {
    serde_json::from_value(value.clone()).ok()
}

impl WorldState {
    /// Look up a character by id.
    pub fn character(&self, id: &CharacterId) -> Option<Character> {
        self.character_value(id.as_str()).and_then(typed)
    }

    /// Borrow a character's raw JSON object, e.g. for an evaluation
    /// context's `actor`/`target` root.
    pub fn character_value(&self, id: &str) -> Option<&Value> {
        find_by_id(&self.characters, id)
    }

    /// Look up the directed relationship from one character to another.
    pub fn relationship_between(
        &self,
        from: &CharacterId,
        to: &CharacterId,
    ) -> Option<Relationship> {
        self.relationship_value_between(from.as_str(), to.as_str())
            .and_then(typed)
    }

    /// Borrow the raw JSON object of a directed relationship.
    pub fn relationship_value_between(&self, from: &str, to: &str) -> Option<&Value> {
        self.relationships.as_array()?.iter().find(|edge| {
            edge.get("from").and_then(Value::as_str) == Some(from)
                && edge.get("to").and_then(Value::as_str) == Some(to)
        })
    }

    /// All secrets currently held by a character.
    pub fn secrets_held_by(&self, id: &CharacterId) -> Vec<Secret> {
        self.secrets
            .as_array()
            .map(|secrets| {
                secrets
                    .iter()
                    .filter(|secret| {
                        secret
                            .get("holders")
                            .and_then(Value::as_array)
                            .is_some_and(|holders| {
                                holders.iter().any(|h| h.as_str() == Some(id.as_str()))
                            })
                    })
                    .filter_map(typed)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All threads still open.
    pub fn open_threads(&self) -> Vec<Thread> {
        self.threads_where(|thread| thread.status == ThreadStatus::Open)
    }

    /// Open threads that must be addressed in the next episode.
    pub fn urgent_threads(&self) -> Vec<Thread> {
        self.threads_where(|thread| {
            thread.status == ThreadStatus::Open && thread.urgency == ThreadUrgency::High
        })
    }

    fn threads_where(&self, keep: impl Fn(&Thread) -> bool) -> Vec<Thread> {
        self.threads
            .as_array()
            .map(|threads| {
                threads
                    .iter()
                    .filter_map(typed::<Thread>)
                    .filter(|t| keep(t))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The cash balance of a ledger holder, if an entry exists.
    pub fn ledger_balance(&self, holder: &str) -> Option<f64> {
        self.assets
            .get("ledger")
            .and_then(Value::as_array)?
            .iter()
            .find(|entry| entry.get("holder").and_then(Value::as_str) == Some(holder))
            .and_then(|entry| entry.get("balance"))
            .and_then(Value::as_f64)
    }

    /// Sum of all ledger balances. Conserved across any successful
    /// `transfer`, which makes it a cheap integrity probe.
    pub fn ledger_total(&self) -> f64 {
        self.assets
            .get("ledger")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| entry.get("balance").and_then(Value::as_f64))
                    .sum()
            })
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> WorldState {
        WorldState {
            world: json!({
                "time": { "year": 690, "season": "summer", "episode": 3 },
                "global": { "unrest": 40.0 }
            }),
            characters: json!([
                { "id": "char_varo", "name": "Varo",
                  "stats": { "wealth": 800.0 },
                  "status": { "alive": true, "location_id": "loc_forum" } },
                { "id": "char_milo", "name": "Milo",
                  "stats": { "wealth": 60.0 },
                  "status": { "alive": true, "location_id": "loc_subura" } }
            ]),
            relationships: json!([
                { "id": "rel_varo_milo", "from": "char_varo", "to": "char_milo",
                  "weights": { "trust": 20.0, "fear": 55.0 } }
            ]),
            secrets: json!([
                { "id": "secret_grain_fraud", "holders": ["char_varo"],
                  "stats": { "legal_value": 60.0, "public_damage": 40.0, "credibility": 80.0 } }
            ]),
            assets: json!({
                "ledger": [
                    { "holder": "char_varo", "balance": 800.0 },
                    { "holder": "treasury", "balance": 5000.0 }
                ],
                "offices": []
            }),
            threads: json!([
                { "id": "thread_granary", "question": "Who burned the granary?",
                  "status": "open", "urgency": "high" },
                { "id": "thread_debt", "question": "Will Milo repay Varo?",
                  "status": "open" },
                { "id": "thread_old", "question": "Old business.",
                  "status": "resolved", "urgency": "high" }
            ]),
        }
    }

    #[test]
    fn character_lookup_by_id() {
        let state = sample();
        let varo = state.character(&CharacterId::new("char_varo")).unwrap();
        assert_eq!(varo.name, "Varo");
        assert!(state.character(&CharacterId::new("char_nobody")).is_none());
    }

    #[test]
    fn relationship_lookup_is_directed() {
        let state = sample();
        let from = CharacterId::new("char_varo");
        let to = CharacterId::new("char_milo");
        assert!(state.relationship_between(&from, &to).is_some());
        assert!(state.relationship_between(&to, &from).is_none());
    }

    #[test]
    fn secrets_held_by_filters_holders() {
        let state = sample();
        let held = state.secrets_held_by(&CharacterId::new("char_varo"));
        assert_eq!(held.len(), 1);
        assert!(state
            .secrets_held_by(&CharacterId::new("char_milo"))
            .is_empty());
    }

    #[test]
    fn thread_listings_respect_status_and_urgency() {
        let state = sample();
        assert_eq!(state.open_threads().len(), 2);
        let urgent = state.urgent_threads();
        assert_eq!(urgent.len(), 1);
        assert_eq!(urgent.first().unwrap().id.as_str(), "thread_granary");
    }

    #[test]
    fn ledger_queries() {
        let state = sample();
        assert_eq!(state.ledger_balance("char_varo"), Some(800.0));
        assert_eq!(state.ledger_balance("char_nobody"), None);
        let total = state.ledger_total();
        assert!((total - 5800.0).abs() < f64::EPSILON);
    }

    #[test]
    fn snapshot_clone_is_deep() {
        let state = sample();
        let mut copy = state.clone();
        copy.characters = json!([]);
        assert!(copy.character(&CharacterId::new("char_varo")).is_none());
        // The original is untouched.
        assert!(state.character(&CharacterId::new("char_varo")).is_some());
    }
}

//! Typed schemas for the persisted world sub-documents.
//!
//! Each JSON file the state store manages has a struct here that captures the
//! fields the core reads. The live aggregate keeps the documents as raw
//! [`serde_json::Value`] trees so the delta engine can address arbitrary
//! leaves; these types exist for load-time validation and for the typed query
//! surface. Every struct carries a flattened `extra` map so authored
//! documents may include fields the core does not model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::{
    CharacterId, HolderId, LocationId, OfficeId, RelationshipId, SecretId, ThreadId,
};

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// world.json
// ---------------------------------------------------------------------------

/// The `world.json` document: calendar, locations, global metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldDoc {
    /// Where the serialized drama currently sits in its calendar.
    pub time: WorldTime,
    /// Named places characters can occupy.
    #[serde(default)]
    pub locations: Vec<Location>,
    /// Global numeric metrics (e.g. `unrest`, `grain_price`).
    #[serde(default)]
    pub global: BTreeMap<String, f64>,
    /// Fields the core does not model, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Calendar position within the serialized drama.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldTime {
    /// In-world year.
    pub year: i32,
    /// In-world season name.
    pub season: String,
    /// Episode counter, incremented by the orchestrator between runs.
    pub episode: u32,
}

/// A named place in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Location id referenced from character status.
    pub id: LocationId,
    /// Display name.
    pub name: String,
    /// Fields the core does not model, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// characters.json
// ---------------------------------------------------------------------------

/// One entry in the `characters.json` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// Character id.
    pub id: CharacterId,
    /// Display name.
    pub name: String,
    /// Numeric stats. The declared range is 0--100, but the range is
    /// advisory: the delta engine never clamps (see the design notes).
    #[serde(default)]
    pub stats: BTreeMap<String, f64>,
    /// Mutable status flags.
    pub status: CharacterStatus,
    /// Belief/desire/intention lists, read by the expression evaluator's
    /// derived paths and mutated only by the upstream planner.
    #[serde(default)]
    pub bdi: Bdi,
    /// Fields the core does not model, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Mutable status flags for a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterStatus {
    /// Whether the character is alive.
    #[serde(default = "default_true")]
    pub alive: bool,
    /// Current location, resolved by the `location` derived path.
    pub location_id: LocationId,
    /// Whether the character is injured.
    #[serde(default)]
    pub injured: bool,
    /// Whether the character is wanted by the authorities.
    #[serde(default)]
    pub wanted: bool,
}

/// Belief/desire/intention lists for a character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bdi {
    /// What the character believes to be true.
    #[serde(default)]
    pub beliefs: Vec<String>,
    /// What the character wants.
    #[serde(default)]
    pub desires: Vec<String>,
    /// What the character currently intends to do.
    #[serde(default)]
    pub intentions: Vec<String>,
}

// ---------------------------------------------------------------------------
// relationships.json
// ---------------------------------------------------------------------------

/// A directed weighted edge between two characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Relationship id.
    pub id: RelationshipId,
    /// Source character.
    pub from: CharacterId,
    /// Destination character.
    pub to: CharacterId,
    /// Typed weights (e.g. `loyalty`, `fear`, `trust`, `resentment`).
    /// Each key is independently optional; declared bounds are advisory.
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,
    /// Fields the core does not model, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// secrets.json
// ---------------------------------------------------------------------------

/// A secret held by one or more characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Secret {
    /// Secret id.
    pub id: SecretId,
    /// Characters who currently know the secret. Drives the `knowledge`
    /// derived path.
    #[serde(default)]
    pub holders: Vec<CharacterId>,
    /// Leverage stats for the secret.
    pub stats: SecretStats,
    /// How the secret loses potency over episodes.
    #[serde(default)]
    pub decay: DecayPolicy,
    /// Lifecycle status. The orchestrator flips `active` to `inert` when
    /// decayed stats fall below its threshold.
    #[serde(default)]
    pub status: SecretStatus,
    /// Fields the core does not model, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Leverage stats for a secret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecretStats {
    /// Worth as evidence in a legal proceeding.
    pub legal_value: f64,
    /// Damage to the subject's standing if made public.
    pub public_damage: f64,
    /// How believable the secret is without corroboration.
    pub credibility: f64,
}

/// Decay policy for a secret's stats.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecayPolicy {
    /// Half-life in episodes. Zero means the secret does not decay.
    #[serde(default)]
    pub half_life_episodes: u32,
    /// Which stat names decay (e.g. `public_damage`, `credibility`).
    #[serde(default)]
    pub decays: Vec<String>,
}

/// Lifecycle status of a secret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretStatus {
    /// The secret still carries leverage.
    #[default]
    Active,
    /// Decay has drained the secret below usefulness.
    Inert,
}

// ---------------------------------------------------------------------------
// assets.json
// ---------------------------------------------------------------------------

/// The `assets.json` document: inventories, contracts, cash, networks,
/// and public offices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assets {
    /// Grain inventory entries (opaque to the core).
    #[serde(default)]
    pub grain: Vec<Value>,
    /// Standing contracts between characters (opaque to the core).
    #[serde(default)]
    pub contracts: Vec<Value>,
    /// The cash ledger, keyed by holder. The only collection with a
    /// domain invariant: `transfer` may not drive a balance negative.
    #[serde(default)]
    pub ledger: Vec<LedgerEntry>,
    /// Informant and client networks (opaque to the core).
    #[serde(default)]
    pub networks: Vec<Value>,
    /// Public offices and the powers they confer. Drives the `offices`
    /// derived path.
    #[serde(default)]
    pub offices: Vec<Office>,
    /// Fields the core does not model, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One holder's cash balance, denominated in denarii.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Who holds the cash.
    pub holder: HolderId,
    /// Current balance in denarii.
    pub balance: f64,
}

/// A public office with an owner and a set of powers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Office {
    /// Office id.
    pub id: OfficeId,
    /// Display name (e.g. "Praetor Urbanus").
    pub name: String,
    /// Current owner, if the office is filled.
    #[serde(default)]
    pub owner: Option<CharacterId>,
    /// Powers conferred by the office (e.g. `SUBPOENA`, `EDICT`).
    #[serde(default)]
    pub powers: Vec<String>,
    /// Fields the core does not model, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// threads.json
// ---------------------------------------------------------------------------

/// An open narrative question tracked across episodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    /// Thread id.
    pub id: ThreadId,
    /// The unresolved question the thread tracks.
    pub question: String,
    /// Lifecycle status.
    #[serde(default)]
    pub status: ThreadStatus,
    /// How urgently the planner should address the thread.
    #[serde(default)]
    pub urgency: ThreadUrgency,
    /// Fields the core does not model, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Lifecycle status of a narrative thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadStatus {
    /// Still unresolved.
    #[default]
    Open,
    /// Answered on screen.
    Resolved,
    /// Dropped without resolution.
    Abandoned,
}

/// Urgency level of a narrative thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadUrgency {
    /// Background texture; may simmer indefinitely.
    Low,
    /// Should progress within a few episodes.
    #[default]
    Normal,
    /// Must be addressed in the next episode.
    High,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn character_deserializes_with_defaults() {
        let value = json!({
            "id": "char_varo",
            "name": "Varo",
            "status": { "location_id": "loc_forum" }
        });
        let character: Character = serde_json::from_value(value).unwrap();
        assert!(character.status.alive);
        assert!(!character.status.wanted);
        assert!(character.stats.is_empty());
        assert!(character.bdi.beliefs.is_empty());
    }

    #[test]
    fn character_preserves_unknown_fields() {
        let value = json!({
            "id": "char_varo",
            "name": "Varo",
            "status": { "location_id": "loc_forum" },
            "voice": "gravelly"
        });
        let character: Character = serde_json::from_value(value).unwrap();
        assert_eq!(
            character.extra.get("voice").and_then(Value::as_str),
            Some("gravelly"),
        );
        let back = serde_json::to_value(&character).unwrap();
        assert_eq!(back.get("voice").and_then(Value::as_str), Some("gravelly"));
    }

    #[test]
    fn secret_status_defaults_to_active() {
        let value = json!({
            "id": "secret_grain_fraud",
            "holders": ["char_varo"],
            "stats": { "legal_value": 60.0, "public_damage": 40.0, "credibility": 80.0 }
        });
        let secret: Secret = serde_json::from_value(value).unwrap();
        assert_eq!(secret.status, SecretStatus::Active);
        assert_eq!(secret.decay.half_life_episodes, 0);
    }

    #[test]
    fn thread_urgency_orders() {
        assert!(ThreadUrgency::High > ThreadUrgency::Normal);
        assert!(ThreadUrgency::Normal > ThreadUrgency::Low);
    }

    #[test]
    fn assets_document_roundtrip() {
        let value = json!({
            "grain": [],
            "contracts": [],
            "ledger": [
                { "holder": "char_varo", "balance": 120.0 },
                { "holder": "treasury", "balance": 5000.0 }
            ],
            "networks": [],
            "offices": [
                { "id": "office_praetor", "name": "Praetor Urbanus",
                  "owner": "char_cassia", "powers": ["SUBPOENA", "EDICT"] }
            ]
        });
        let assets: Assets = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(assets.ledger.len(), 2);
        assert_eq!(assets.offices.first().unwrap().powers.len(), 2);
        let back = serde_json::to_value(&assets).unwrap();
        assert_eq!(back, value);
    }
}

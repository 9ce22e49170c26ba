//! Best-effort batch application.
//!
//! A scene resolves into a batch of effects. Batches are applied
//! effect-by-effect: each success is stamped into a [`CommittedDelta`]
//! with the batch's provenance, each rejection is recorded as a
//! [`FailedEffect`], and the batch keeps going. Because a single apply
//! never mutates on failure, the world after a partially failed batch is
//! exactly the world with only the successful effects applied.

use fabula_state::WorldState;
use fabula_types::{CommittedDelta, Effect, FailedEffect};
use serde::Serialize;
use tracing::{debug, warn};

use crate::apply::apply_delta;

/// The outcome of one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplyReport {
    /// True when every effect in the batch applied.
    pub success: bool,
    /// Effects that applied, in order, with provenance stamps.
    pub applied: Vec<CommittedDelta>,
    /// Effects that were rejected, with their reasons.
    pub failed: Vec<FailedEffect>,
}

/// Apply a batch of fully-expanded effects to the world.
///
/// `provenance` names the scene or episode that produced the batch and is
/// recorded on every committed delta.
pub fn apply_deltas(
    state: &mut WorldState,
    effects: &[Effect],
    provenance: &str,
) -> ApplyReport {
    let mut applied = Vec::with_capacity(effects.len());
    let mut failed = Vec::new();

    for effect in effects {
        match apply_delta(state, effect) {
            Ok(()) => {
                let delta = CommittedDelta::record(effect.clone(), provenance);
                debug!(id = %delta.id, path = %delta.effect.path, op = %delta.effect.op, "delta committed");
                applied.push(delta);
            }
            Err(error) => {
                warn!(
                    path = %effect.path,
                    op = %effect.op,
                    %error,
                    "effect rejected"
                );
                failed.push(FailedEffect {
                    effect: effect.clone(),
                    error: error.to_string(),
                });
            }
        }
    }

    debug!(
        provenance,
        applied = applied.len(),
        failed = failed.len(),
        "batch applied"
    );
    ApplyReport {
        success: failed.is_empty(),
        applied,
        failed,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state() -> WorldState {
        WorldState {
            world: json!({ "global": { "unrest": 30.0 } }),
            characters: json!([
                { "id": "char_varo", "stats": { "wealth": 800.0 } }
            ]),
            relationships: json!([]),
            secrets: json!([]),
            assets: json!({ "ledger": [] }),
            threads: json!([]),
        }
    }

    #[test]
    fn batch_keeps_going_past_a_failure() {
        let mut s = state();
        let effects = vec![
            fabula_types::Effect::add("characters.char_varo.stats.wealth", 50.0),
            fabula_types::Effect::add("characters.char_ghost.stats.wealth", 50.0),
            fabula_types::Effect::add("world.global.unrest", 5.0),
        ];

        let report = apply_deltas(&mut s, &effects, "ep01_sc02");
        assert!(!report.success);
        assert_eq!(report.applied.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].error.contains("could not resolve path"));

        // Both successful effects landed; the failure changed nothing.
        assert_eq!(s.characters[0]["stats"]["wealth"], json!(850.0));
        assert_eq!(s.world["global"]["unrest"], json!(35.0));
    }

    #[test]
    fn committed_deltas_carry_provenance_and_order() {
        let mut s = state();
        let effects = vec![
            fabula_types::Effect::add("world.global.unrest", 1.0),
            fabula_types::Effect::add("world.global.unrest", 2.0),
        ];
        let report = apply_deltas(&mut s, &effects, "ep02_sc01");
        assert!(report.success);
        let deltas = &report.applied;
        assert!(deltas.iter().all(|d| d.provenance == "ep02_sc01"));
        assert!(deltas[0].committed_at <= deltas[1].committed_at);
    }
}

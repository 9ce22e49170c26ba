//! Operator catalog document types.
//!
//! An operator is a named, reusable action template: a list of prerequisite
//! expressions gating when it may be chosen, and a list of effect templates
//! (with shorthand paths) applied when it fires. The catalog is loaded from
//! `operators.json` and never mutated by this core; the narrative planner
//! selects operators and the delta engine applies their effects.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::effect::Effect;
use crate::ids::OperatorId;

/// A single prerequisite expression, e.g.
/// `{ "expr": "actor.stats.wealth > target.stats.wealth * 10" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prereq {
    /// The expression source text.
    pub expr: String,
}

impl Prereq {
    /// Wrap an expression string.
    pub fn new(expr: impl Into<String>) -> Self {
        Self { expr: expr.into() }
    }
}

impl From<&str> for Prereq {
    fn from(expr: &str) -> Self {
        Self::new(expr)
    }
}

/// One entry in the `operators.json` catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operator {
    /// Operator id.
    pub id: OperatorId,
    /// Display name (e.g. "Call in a debt").
    pub name: String,
    /// Thematic family (e.g. `finance`, `intrigue`), used by the planner
    /// for variety heuristics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    /// Prerequisites that must all hold for an actor/target pair.
    #[serde(default)]
    pub prereqs: Vec<Prereq>,
    /// Effect templates with shorthand paths, expanded per binding at
    /// application time.
    #[serde(default)]
    pub effects: Vec<Effect>,
    /// Fields the core does not model, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn operator_deserializes_from_catalog_shape() {
        let value = json!({
            "id": "op_blackmail",
            "name": "Blackmail with a secret",
            "family": "intrigue",
            "prereqs": [
                { "expr": "actor.knowledge exists" },
                { "expr": "target.stats.dignitas > 50" }
            ],
            "effects": [
                { "path": "relationship.weights.fear", "op": "add", "value": 15 },
                { "path": "actor.stats.wealth", "op": "add", "value": 100 }
            ]
        });
        let operator: Operator = serde_json::from_value(value).unwrap();
        assert_eq!(operator.id.as_str(), "op_blackmail");
        assert_eq!(operator.prereqs.len(), 2);
        assert_eq!(operator.effects.len(), 2);
    }

    #[test]
    fn prereqs_default_to_empty() {
        let operator: Operator =
            serde_json::from_value(json!({ "id": "op_noop", "name": "Do nothing" })).unwrap();
        assert!(operator.prereqs.is_empty());
        assert!(operator.effects.is_empty());
        assert!(operator.family.is_none());
    }
}

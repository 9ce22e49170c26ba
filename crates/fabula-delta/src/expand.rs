//! Shorthand path expansion.
//!
//! Operator effects are authored against the roles of a scene (`actor.`,
//! `target.`, `relationship.`), not against concrete ids. Before
//! application, each effect path is rewritten against a [`PathBinding`]
//! into an absolute path rooted at a world sub-document
//! (`characters.<id>.`, `relationships.<id>.`); absolute paths pass
//! through untouched.
//!
//! Expansion is fail-fast: an effect that names an unbound role rejects
//! the whole batch before anything touches the world, since a planner
//! that emitted `target.` effects without a target made a structural
//! mistake, not a runtime one.

use fabula_types::{CharacterId, Effect, RelationshipId};

use crate::error::DeltaError;

/// The concrete ids bound to a scene's roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathBinding {
    /// The acting character.
    pub actor_id: CharacterId,
    /// The target character, when the scene has one.
    pub target_id: Option<CharacterId>,
    /// The actor-to-target relationship, when one exists.
    pub relationship_id: Option<RelationshipId>,
}

impl PathBinding {
    /// A binding with only an actor.
    pub const fn solo(actor_id: CharacterId) -> Self {
        Self {
            actor_id,
            target_id: None,
            relationship_id: None,
        }
    }

    /// A binding with an actor and a target.
    pub const fn with_target(actor_id: CharacterId, target_id: CharacterId) -> Self {
        Self {
            actor_id,
            target_id: Some(target_id),
            relationship_id: None,
        }
    }

    /// Attach the actor-to-target relationship id.
    #[must_use]
    pub fn and_relationship(mut self, relationship_id: RelationshipId) -> Self {
        self.relationship_id = Some(relationship_id);
        self
    }
}

/// Rewrite one shorthand path against the binding.
///
/// # Errors
///
/// Returns [`DeltaError::NoTargetBound`] or
/// [`DeltaError::NoRelationshipBound`] when the path names a role the
/// binding does not carry.
pub fn expand_shorthand_path(path: &str, binding: &PathBinding) -> Result<String, DeltaError> {
    if let Some(rest) = path.strip_prefix("actor.") {
        return Ok(format!("characters.{}.{rest}", binding.actor_id));
    }
    if let Some(rest) = path.strip_prefix("target.") {
        let target = binding.target_id.as_ref().ok_or(DeltaError::NoTargetBound)?;
        return Ok(format!("characters.{target}.{rest}"));
    }
    if let Some(rest) = path.strip_prefix("relationship.") {
        let rel = binding
            .relationship_id
            .as_ref()
            .ok_or(DeltaError::NoRelationshipBound)?;
        return Ok(format!("relationships.{rel}.{rest}"));
    }
    Ok(path.to_owned())
}

/// Expand every effect in a batch, failing on the first unbound role.
///
/// # Errors
///
/// Propagates the first [`expand_shorthand_path`] failure; no partially
/// expanded batch is returned.
pub fn expand_effects(
    effects: &[Effect],
    binding: &PathBinding,
) -> Result<Vec<Effect>, DeltaError> {
    effects
        .iter()
        .map(|effect| {
            let path = expand_shorthand_path(&effect.path, binding)?;
            Ok(Effect {
                path,
                ..effect.clone()
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fabula_types::Op;

    fn binding() -> PathBinding {
        PathBinding::with_target(
            CharacterId::new("char_varo"),
            CharacterId::new("char_milo"),
        )
        .and_relationship(RelationshipId::new("rel_varo_milo"))
    }

    #[test]
    fn actor_and_target_shorthands_expand() {
        let b = binding();
        assert_eq!(
            expand_shorthand_path("actor.stats.wealth", &b).unwrap(),
            "characters.char_varo.stats.wealth",
        );
        assert_eq!(
            expand_shorthand_path("target.status.injured", &b).unwrap(),
            "characters.char_milo.status.injured",
        );
        assert_eq!(
            expand_shorthand_path("relationship.weights.trust", &b).unwrap(),
            "relationships.rel_varo_milo.weights.trust",
        );
    }

    #[test]
    fn absolute_paths_pass_through() {
        let b = binding();
        assert_eq!(
            expand_shorthand_path("world.global.unrest", &b).unwrap(),
            "world.global.unrest",
        );
        assert_eq!(
            expand_shorthand_path("assets.ledger", &b).unwrap(),
            "assets.ledger",
        );
    }

    #[test]
    fn unbound_target_rejects_eagerly() {
        let solo = PathBinding::solo(CharacterId::new("char_varo"));
        assert_eq!(
            expand_shorthand_path("target.stats.wealth", &solo),
            Err(DeltaError::NoTargetBound),
        );
        assert_eq!(
            expand_shorthand_path("relationship.weights.trust", &solo),
            Err(DeltaError::NoRelationshipBound),
        );
    }

    #[test]
    fn batch_expansion_fails_fast() {
        let solo = PathBinding::solo(CharacterId::new("char_varo"));
        let effects = vec![
            Effect::add("actor.stats.wealth", 10.0),
            Effect::subtract("target.stats.wealth", 10.0),
        ];
        assert_eq!(
            expand_effects(&effects, &solo),
            Err(DeltaError::NoTargetBound),
        );

        let expanded = expand_effects(&effects, &binding()).unwrap();
        assert_eq!(expanded.len(), 2);
        let first = expanded.first().unwrap();
        assert_eq!(first.path, "characters.char_varo.stats.wealth");
        assert_eq!(first.op, Op::Add);
    }
}

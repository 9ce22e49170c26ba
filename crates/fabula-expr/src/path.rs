//! Context path resolution, including derived paths.
//!
//! A dotted path's first segment selects a *context root* (`actor`,
//! `target`, `world`, `relationship`); the remaining segments walk plain
//! nested objects and arrays, with an optional trailing accessor per
//! segment (`prop[0]`, `prop["key"]`). Three paths under `actor`/`target`
//! are *derived* -- computed from cross-referenced collections rather than
//! stored on the character:
//!
//! - `offices` -- flattened `powers.<power>` strings over every office in
//!   the assets document whose `owner` is the character.
//! - `knowledge` -- ids of every secret whose `holders` include the
//!   character.
//! - `location` -- shorthand for `status.location_id`.
//!
//! Resolution distinguishes two failure modes: a missing context root is an
//! error, while traversal past a null/missing leaf yields *undefined*
//! (`Ok(None)`) so existence checks can tell "missing" apart from "wrong
//! type" at the caller's discretion.

use serde_json::Value;

use crate::error::ExprError;

/// The roots and collections an expression may read.
///
/// Every field is optional; referencing a missing root fails with
/// "context not available". The `assets` and `secrets` documents back the
/// derived paths and are not addressable roots themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvalContext<'a> {
    /// The acting character's JSON object.
    pub actor: Option<&'a Value>,
    /// The target character's JSON object.
    pub target: Option<&'a Value>,
    /// The world document.
    pub world: Option<&'a Value>,
    /// The actor-to-target relationship object.
    pub relationship: Option<&'a Value>,
    /// The full assets document (for the `offices` derived path).
    pub assets: Option<&'a Value>,
    /// The full secrets list (for the `knowledge` derived path).
    pub secrets: Option<&'a Value>,
}

impl<'a> EvalContext<'a> {
    /// An empty context with no roots bound.
    pub const fn new() -> Self {
        Self {
            actor: None,
            target: None,
            world: None,
            relationship: None,
            assets: None,
            secrets: None,
        }
    }

    /// Bind the acting character.
    #[must_use]
    pub const fn with_actor(mut self, actor: &'a Value) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Bind the target character.
    #[must_use]
    pub const fn with_target(mut self, target: &'a Value) -> Self {
        self.target = Some(target);
        self
    }

    /// Bind the world document.
    #[must_use]
    pub const fn with_world(mut self, world: &'a Value) -> Self {
        self.world = Some(world);
        self
    }

    /// Bind the actor-to-target relationship.
    #[must_use]
    pub const fn with_relationship(mut self, relationship: &'a Value) -> Self {
        self.relationship = Some(relationship);
        self
    }

    /// Bind the assets document for derived office lookups.
    #[must_use]
    pub const fn with_assets(mut self, assets: &'a Value) -> Self {
        self.assets = Some(assets);
        self
    }

    /// Bind the secrets list for derived knowledge lookups.
    #[must_use]
    pub const fn with_secrets(mut self, secrets: &'a Value) -> Self {
        self.secrets = Some(secrets);
        self
    }
}

/// A parsed trailing accessor on a path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessor {
    /// `[0]` -- numeric array index.
    Index(usize),
    /// `["key"]` / `['key']` -- quoted object key.
    Key(String),
}

/// Split a segment into its name and optional bracket accessor.
///
/// A malformed bracket suffix is treated as part of the name; it will then
/// fail to resolve like any other unknown key.
pub fn parse_segment(segment: &str) -> (&str, Option<Accessor>) {
    let Some(open) = segment.find('[') else {
        return (segment, None);
    };
    if !segment.ends_with(']') {
        return (segment, None);
    }
    let name = segment.get(..open).unwrap_or(segment);
    let inner = segment
        .get(open.saturating_add(1)..segment.len().saturating_sub(1))
        .unwrap_or("");

    let quoted = (inner.starts_with('"') && inner.ends_with('"') && inner.len() >= 2)
        || (inner.starts_with('\'') && inner.ends_with('\'') && inner.len() >= 2);
    let accessor = if quoted {
        inner
            .get(1..inner.len().saturating_sub(1))
            .map(|key| Accessor::Key(key.to_owned()))
    } else {
        inner.parse::<usize>().ok().map(Accessor::Index)
    };

    match accessor {
        Some(accessor) => (name, Some(accessor)),
        // Unparseable accessor: fall back to the raw segment.
        None => (segment, None),
    }
}

/// One traversal step into `current` by segment name.
///
/// Objects are stepped by key; arrays accept a bare numeric segment as an
/// index. Anything else (including numeric traversal into a non-array)
/// yields `None`.
fn access_name<'v>(current: &'v Value, name: &str) -> Option<&'v Value> {
    match current {
        Value::Object(map) => map.get(name),
        Value::Array(items) => name.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn access<'v>(value: &'v Value, accessor: &Accessor) -> Option<&'v Value> {
    match accessor {
        Accessor::Index(i) => value.as_array().and_then(|items| items.get(*i)),
        Accessor::Key(key) => value.as_object().and_then(|map| map.get(key)),
    }
}

/// Walk `segments` down from `start`, returning `None` once any step fails.
pub fn walk<'v>(start: &'v Value, segments: &[&str]) -> Option<&'v Value> {
    let mut current = start;
    for segment in segments {
        let (name, accessor) = parse_segment(segment);
        current = access_name(current, name)?;
        if let Some(accessor) = accessor {
            current = access(current, &accessor)?;
        }
    }
    Some(current)
}

/// Resolve a dotted context path against an evaluation context.
///
/// `Ok(None)` means the path traversed past a missing or null value
/// (*undefined*); `Err` means the context root itself was unknown or not
/// supplied, or a derived lookup lacked its backing collection.
///
/// # Errors
///
/// Returns [`ExprError::UnknownContext`] for a first segment outside
/// `actor`/`target`/`world`/`relationship`, and
/// [`ExprError::ContextNotAvailable`] when the selected root (or the
/// `assets`/`secrets` collection a derived path needs) is missing.
pub fn resolve_path(ctx: &EvalContext<'_>, path: &str) -> Result<Option<Value>, ExprError> {
    let mut parts = path.split('.');
    let root = parts.next().unwrap_or_default();
    let rest: Vec<&str> = parts.collect();

    match root {
        "actor" => resolve_character(ctx, ctx.actor, &rest, "actor"),
        "target" => resolve_character(ctx, ctx.target, &rest, "target"),
        "world" => {
            let world = ctx
                .world
                .ok_or_else(|| ExprError::ContextNotAvailable(String::from("world")))?;
            Ok(walk(world, &rest).cloned())
        }
        "relationship" => {
            let relationship = ctx
                .relationship
                .ok_or_else(|| ExprError::ContextNotAvailable(String::from("relationship")))?;
            Ok(walk(relationship, &rest).cloned())
        }
        other => Err(ExprError::UnknownContext(other.to_owned())),
    }
}

fn resolve_character(
    ctx: &EvalContext<'_>,
    root: Option<&Value>,
    rest: &[&str],
    role: &str,
) -> Result<Option<Value>, ExprError> {
    let character =
        root.ok_or_else(|| ExprError::ContextNotAvailable(role.to_owned()))?;

    match rest {
        ["offices"] => derived_offices(ctx, character, role).map(Some),
        ["knowledge"] => derived_knowledge(ctx, character, role).map(Some),
        ["location"] => Ok(walk(character, &["status", "location_id"]).cloned()),
        _ => Ok(walk(character, rest).cloned()),
    }
}

fn character_id<'v>(character: &'v Value, role: &str) -> Result<&'v str, ExprError> {
    character
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| ExprError::UnresolvablePath(format!("{role}.id")))
}

/// Derived path: flattened `powers.<power>` strings for every office the
/// character owns. A full linear scan of the offices list on every access,
/// which is fine at single-episode scale.
fn derived_offices(
    ctx: &EvalContext<'_>,
    character: &Value,
    role: &str,
) -> Result<Value, ExprError> {
    let assets = ctx
        .assets
        .ok_or_else(|| ExprError::ContextNotAvailable(String::from("assets")))?;
    let id = character_id(character, role)?;

    let mut powers = Vec::new();
    if let Some(offices) = assets.get("offices").and_then(Value::as_array) {
        for office in offices {
            if office.get("owner").and_then(Value::as_str) != Some(id) {
                continue;
            }
            if let Some(list) = office.get("powers").and_then(Value::as_array) {
                for power in list.iter().filter_map(Value::as_str) {
                    powers.push(Value::String(format!("powers.{power}")));
                }
            }
        }
    }
    Ok(Value::Array(powers))
}

/// Derived path: ids of every secret whose holders include the character.
fn derived_knowledge(
    ctx: &EvalContext<'_>,
    character: &Value,
    role: &str,
) -> Result<Value, ExprError> {
    let secrets = ctx
        .secrets
        .ok_or_else(|| ExprError::ContextNotAvailable(String::from("secrets")))?;
    let id = character_id(character, role)?;

    let mut known = Vec::new();
    if let Some(secrets) = secrets.as_array() {
        for secret in secrets {
            let holds = secret
                .get("holders")
                .and_then(Value::as_array)
                .is_some_and(|holders| {
                    holders.iter().any(|h| h.as_str() == Some(id))
                });
            if holds {
                if let Some(secret_id) = secret.get("id") {
                    known.push(secret_id.clone());
                }
            }
        }
    }
    Ok(Value::Array(known))
}

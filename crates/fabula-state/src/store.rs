//! File-backed persistence for the world aggregate.
//!
//! A [`StateStore`] owns one [`WorldState`] plus the read-only operator
//! catalog and authoring constraints, all loaded from a directory of JSON
//! sub-documents. Load is strict: every file must exist, parse, and pass
//! its typed schema, or the load fails and nothing downstream runs.
//!
//! Saves write the six mutable documents atomically (temp file then
//! rename), so a crash mid-save never leaves a half-written document on
//! disk. The operator catalog and constraints are authored inputs and are
//! never written back.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use fabula_types::{Assets, Character, Operator, Relationship, Secret, Thread, WorldDoc};

use crate::config::StoreConfig;
use crate::error::StateError;
use crate::world::WorldState;

/// The file-backed world store.
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
    files: crate::config::FileNames,
    state: WorldState,
    operators: Vec<Operator>,
    constraints: Value,
}

/// Read one sub-document: file -> JSON `Value`, validated against the
/// typed schema `T` (the `Value` is kept, the typed form is discarded).
fn load_document<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<Value, StateError> {
    let path = dir.join(name);
    if !path.exists() {
        return Err(StateError::MissingDocument {
            name: name.to_owned(),
        });
    }
    let text = fs::read_to_string(&path).map_err(|source| StateError::Io {
        name: name.to_owned(),
        source,
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|source| StateError::Parse {
        name: name.to_owned(),
        source,
    })?;
    serde_json::from_value::<T>(value.clone()).map_err(|source| StateError::Schema {
        name: name.to_owned(),
        source,
    })?;
    Ok(value)
}

/// Write a document atomically: serialize to `<name>.tmp`, then rename
/// over the target. Rename within one directory is atomic on the
/// platforms we run on.
fn save_document(dir: &Path, name: &str, value: &Value) -> Result<(), StateError> {
    let text =
        serde_json::to_string_pretty(value).map_err(|source| StateError::Serialize {
            name: name.to_owned(),
            source,
        })?;
    let tmp = dir.join(format!("{name}.tmp"));
    let target = dir.join(name);
    let io = |source| StateError::Io {
        name: name.to_owned(),
        source,
    };
    fs::write(&tmp, text).map_err(io)?;
    fs::rename(&tmp, &target).map_err(io)?;
    Ok(())
}

impl StateStore {
    /// Load a complete store from the configured directory.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::MissingDocument`] if any sub-document file is
    /// absent, [`StateError::Parse`] if one is not valid JSON, or
    /// [`StateError::Schema`] if one does not conform to its schema. Any
    /// failure aborts the whole load.
    pub fn load(config: &StoreConfig) -> Result<Self, StateError> {
        let dir = &config.dir;
        let files = &config.files;

        let state = WorldState {
            world: load_document::<WorldDoc>(dir, &files.world)?,
            characters: load_document::<Vec<Character>>(dir, &files.characters)?,
            relationships: load_document::<Vec<Relationship>>(dir, &files.relationships)?,
            secrets: load_document::<Vec<Secret>>(dir, &files.secrets)?,
            assets: load_document::<Assets>(dir, &files.assets)?,
            threads: load_document::<Vec<Thread>>(dir, &files.threads)?,
        };

        let operators_value = load_document::<Vec<Operator>>(dir, &files.operators)?;
        let operators: Vec<Operator> =
            serde_json::from_value(operators_value).map_err(|source| StateError::Schema {
                name: files.operators.clone(),
                source,
            })?;

        // Constraints are free-form authored guidance; no schema to apply.
        let constraints = load_document::<Value>(dir, &files.constraints)?;

        debug!(
            dir = %dir.display(),
            operators = operators.len(),
            "loaded world store"
        );

        Ok(Self {
            dir: dir.clone(),
            files: files.clone(),
            state,
            operators,
            constraints,
        })
    }

    /// Persist the six mutable sub-documents back to the store directory.
    ///
    /// Each document is written to a temp file and renamed into place, so
    /// individual documents are never left half-written. The operator
    /// catalog and constraints file are not written.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Serialize`] or [`StateError::Io`] on the
    /// first document that fails; later documents are not attempted.
    pub fn save(&self) -> Result<(), StateError> {
        save_document(&self.dir, &self.files.world, &self.state.world)?;
        save_document(&self.dir, &self.files.characters, &self.state.characters)?;
        save_document(
            &self.dir,
            &self.files.relationships,
            &self.state.relationships,
        )?;
        save_document(&self.dir, &self.files.secrets, &self.state.secrets)?;
        save_document(&self.dir, &self.files.assets, &self.state.assets)?;
        save_document(&self.dir, &self.files.threads, &self.state.threads)?;
        debug!(dir = %self.dir.display(), "saved world store");
        Ok(())
    }

    /// A deep copy of the current world, for rollback.
    pub fn snapshot(&self) -> WorldState {
        self.state.clone()
    }

    /// Replace the current world with a previously taken snapshot.
    pub fn restore(&mut self, snapshot: WorldState) {
        debug!("restored world snapshot");
        self.state = snapshot;
    }

    /// The current world aggregate.
    pub const fn state(&self) -> &WorldState {
        &self.state
    }

    /// Mutable access to the world aggregate, for the delta engine.
    pub const fn state_mut(&mut self) -> &mut WorldState {
        &mut self.state
    }

    /// The authored operator catalog.
    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    /// Find an operator by id.
    pub fn operator(&self, id: &str) -> Option<&Operator> {
        self.operators.iter().find(|op| op.id.as_str() == id)
    }

    /// The authored constraints document.
    pub const fn constraints(&self) -> &Value {
        &self.constraints
    }
}

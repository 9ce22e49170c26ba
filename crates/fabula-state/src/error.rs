//! Error types for the `fabula-state` crate.
//!
//! Store failures are the one place in the core where errors propagate to
//! the caller instead of folding into a result report: a missing or
//! malformed sub-document at load time means there is no world to operate
//! on, and the calling pipeline must abort rather than run against a
//! partial aggregate.

/// Errors from loading, validating, or persisting the world aggregate.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// A required sub-document file does not exist.
    #[error("missing state document: {name}")]
    MissingDocument {
        /// File name of the absent document.
        name: String,
    },

    /// Reading or writing a sub-document file failed.
    #[error("failed to access {name}: {source}")]
    Io {
        /// File name of the affected document.
        name: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A sub-document file is not valid JSON.
    #[error("malformed JSON in {name}: {source}")]
    Parse {
        /// File name of the malformed document.
        name: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A sub-document parsed as JSON but does not conform to its schema.
    #[error("{name} failed schema validation: {source}")]
    Schema {
        /// File name of the invalid document.
        name: String,
        /// The underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Serializing a sub-document for persistence failed.
    #[error("failed to serialize {name}: {source}")]
    Serialize {
        /// File name of the affected document.
        name: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

//! Error types for cmgen.
//!
//! Every failure the definition model, registry, validator and generators can
//! raise is a [`GenError`]. The CLI wraps these in `anyhow` for reporting.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for generator operations
pub type GenResult<T> = Result<T, GenError>;

#[derive(Error, Debug)]
pub enum GenError {
    /// A required attribute (name, path, library kind, install dir) was omitted
    #[error("{entity} is missing required field '{field}'")]
    MissingField { entity: String, field: &'static str },

    /// A relative path was supplied where an absolute one is required
    #[error("the path of {entity} must be absolute, got '{path}'")]
    InvalidPath { entity: String, path: PathBuf },

    /// Two definitions share one logical name
    #[error("two definitions are named '{name}': {existing} and {duplicate}")]
    DuplicateName {
        name: String,
        existing: PathBuf,
        duplicate: PathBuf,
    },

    /// Visibility or terminal-type violation
    #[error("module '{module}' has an illegal dependency on '{target}': {reason}")]
    IllegalDependency {
        module: String,
        target: String,
        reason: String,
    },

    /// A dependency requires keys its target never declares
    #[error(
        "'{dependent}' dependency on '{target}' has invalid required keys: {required} is not a subset of {available}"
    )]
    InvalidKey {
        dependent: String,
        target: String,
        required: String,
        available: String,
    },

    /// Unknown kind, malformed include entry, install mismatch, malformed build mode
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A deferred reference names a project or module that is not registered
    #[error("{what} '{name}' was not found")]
    UnknownTarget { what: &'static str, name: String },

    /// Phase-two initialization (resolution + validation) of a project failed
    #[error("failed to load project '{project}': {source}")]
    Dependency {
        project: String,
        #[source]
        source: Box<GenError>,
    },

    /// The loading collaborator could not produce a definition
    #[error("failed to load definition from {path}: {message}")]
    Load { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GenError {
    /// Shorthand for [`GenError::Configuration`].
    pub fn config(message: impl Into<String>) -> Self {
        GenError::Configuration(message.into())
    }

    /// The innermost error, looking through `Dependency` wrappers.
    pub fn root_cause(&self) -> &GenError {
        match self {
            GenError::Dependency { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

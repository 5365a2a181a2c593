// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Core error types for mvnmap
///
/// Each variant corresponds to one class of anomaly so that an embedding
/// build tool can tell configuration trouble apart from policy violations.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed artifact coordinate or identity field
    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    /// Malformed glob pattern in a packaging rule
    #[error("Invalid glob pattern '{glob}': {reason}")]
    Glob { glob: String, reason: String },

    /// Two applicable packaging rules disagree on the target package
    #[error("Artifact {artifact} assigned to more than one package: '{first}' and '{second}'")]
    PackageConflict {
        artifact: String,
        first: String,
        second: String,
    },

    /// Configuration content that cannot be acted upon
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A configuration file exists but could not be parsed
    #[error("Failed to parse configuration file {}: {reason}", .path.display())]
    ConfigParse { path: PathBuf, reason: String },

    /// Mandatory packaging rules that never matched any artifact
    #[error("There are unmatched packaging rules: {}", .0.join(", "))]
    UnmatchedRules(Vec<String>),

    /// Dependency map fragment with an unusable shape
    #[error("Invalid dependency map fragment: {0}")]
    Fragment(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML reading or writing errors
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Result type alias using mvnmap's Error type
pub type Result<T> = std::result::Result<T, Error>;

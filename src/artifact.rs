// src/artifact.rs

//! Artifact identity
//!
//! An artifact is identified by the five coordinates groupId, artifactId,
//! extension, classifier and version. Stereotype, namespace and the file
//! backing the artifact travel alongside the identity but never take part
//! in equality or hashing.

use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Version meaning "unspecified, any version"
pub const DEFAULT_VERSION: &str = "SYSTEM";

/// Extension assumed when a coordinate does not name one
pub const DEFAULT_EXTENSION: &str = "jar";

/// Immutable artifact identity
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactId {
    group_id: String,
    artifact_id: String,
    extension: String,
    classifier: String,
    version: String,
    stereotype: Option<String>,
    namespace: Option<String>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl ArtifactId {
    /// Create an artifact from explicit coordinates
    ///
    /// Empty extension and version fall back to `jar` and `SYSTEM`.
    pub fn new(
        group_id: &str,
        artifact_id: &str,
        extension: &str,
        classifier: &str,
        version: &str,
    ) -> Result<Self> {
        if group_id.is_empty() {
            return Err(Error::InvalidArtifact("groupId must not be empty".to_string()));
        }
        if artifact_id.is_empty() {
            return Err(Error::InvalidArtifact(
                "artifactId must not be empty".to_string(),
            ));
        }

        Ok(Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            extension: non_empty_or(extension, DEFAULT_EXTENSION),
            classifier: classifier.to_string(),
            version: non_empty_or(version, DEFAULT_VERSION),
            stereotype: None,
            namespace: None,
            path: None,
        })
    }

    /// Parse a colon-delimited coordinate
    ///
    /// Accepted forms are `gid:aid`, `gid:aid:ver`, `gid:aid:ext:ver` and
    /// `gid:aid:ext:cla:ver`.
    pub fn of(coordinates: &str) -> Result<Self> {
        let parts: Vec<&str> = coordinates.split(':').collect();

        let (group_id, artifact_id, extension, classifier, version) = match parts.as_slice() {
            [g, a] => (*g, *a, "", "", ""),
            [g, a, v] => (*g, *a, "", "", *v),
            [g, a, e, v] => (*g, *a, *e, "", *v),
            [g, a, e, c, v] => (*g, *a, *e, *c, *v),
            _ => {
                return Err(Error::InvalidArtifact(format!(
                    "coordinates '{}' must have between 2 and 5 colon-separated fields, found {}",
                    coordinates,
                    parts.len()
                )));
            }
        };

        Self::new(group_id, artifact_id, extension, classifier, version)
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn classifier(&self) -> &str {
        &self.classifier
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Semantic role such as "pom", "raw", "effective" or "native"
    pub fn stereotype(&self) -> Option<&str> {
        self.stereotype.as_deref()
    }

    /// Provenance tag attached after resolution
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// File backing this artifact, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether the version is the `SYSTEM` sentinel
    pub fn is_versionless(&self) -> bool {
        self.version == DEFAULT_VERSION
    }

    /// Copy of this artifact with a different version
    pub fn with_version(&self, version: &str) -> Self {
        let mut copy = self.clone();
        copy.version = non_empty_or(version, DEFAULT_VERSION);
        copy
    }

    /// Copy of this artifact with the version reset to `SYSTEM`
    pub fn without_version(&self) -> Self {
        self.with_version(DEFAULT_VERSION)
    }

    /// Copy of this artifact backed by the given file
    pub fn with_path(&self, path: impl Into<PathBuf>) -> Self {
        let mut copy = self.clone();
        copy.path = Some(path.into());
        copy
    }

    /// Copy of this artifact with a different stereotype (empty clears it)
    pub fn with_stereotype(&self, stereotype: &str) -> Self {
        let mut copy = self.clone();
        copy.stereotype = optional(stereotype);
        copy
    }

    /// Copy of this artifact tagged with a namespace (empty clears it)
    pub fn with_namespace(&self, namespace: &str) -> Self {
        let mut copy = self.clone();
        copy.namespace = optional(namespace);
        copy
    }

    /// Copy of this artifact stripped of path, stereotype and namespace
    pub fn identity(&self) -> Self {
        Self {
            stereotype: None,
            namespace: None,
            path: None,
            ..self.clone()
        }
    }
}

fn non_empty_or(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl PartialEq for ArtifactId {
    fn eq(&self, other: &Self) -> bool {
        self.group_id == other.group_id
            && self.artifact_id == other.artifact_id
            && self.extension == other.extension
            && self.classifier == other.classifier
            && self.version == other.version
    }
}

impl Eq for ArtifactId {}

impl Hash for ArtifactId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.group_id.hash(state);
        self.artifact_id.hash(state);
        self.extension.hash(state);
        self.classifier.hash(state);
        self.version.hash(state);
    }
}

impl PartialOrd for ArtifactId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ArtifactId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (
            &self.group_id,
            &self.artifact_id,
            &self.extension,
            &self.classifier,
            &self.version,
        )
            .cmp(&(
                &other.group_id,
                &other.artifact_id,
                &other.extension,
                &other.classifier,
                &other.version,
            ))
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.extension)?;
        if !self.classifier.is_empty() {
            write!(f, ":{}", self.classifier)?;
        }
        write!(f, ":{}", self.version)
    }
}

impl FromStr for ArtifactId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::of(s)
    }
}

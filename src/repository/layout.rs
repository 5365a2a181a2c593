// src/repository/layout.rs

//! Simple repository layouts
//!
//! Each layout is a pure function from artifact coordinates to a relative
//! path. A [`LayoutRepository`] wraps one layout with an optional root
//! directory and a filter condition.

use super::condition::Condition;
use super::{
    effective_namespace, ArtifactContext, Repository, RepositoryConfigurator, RepositoryPath,
};
use crate::artifact::ArtifactId;
use crate::config::RepositoryDescriptor;
use crate::error::Result;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Context property appended to JPP file names
pub const SUFFIX_PROPERTY: &str = "suffix";

/// Directory layout of a simple repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `group.id-artifactId[-version][-classifier].extension`
    Flat,
    /// `group/id/artifactId/version/artifactId-version[-classifier].extension`
    Maven,
    /// `[dir/]artifactId[-version][-classifier][-suffix].extension`
    Jpp,
}

impl Layout {
    /// Relative path of an artifact; `version` is `None` for versionless artifacts
    pub fn artifact_path(
        self,
        artifact: &ArtifactId,
        version: Option<&str>,
        context: &ArtifactContext,
    ) -> Option<String> {
        match self {
            Layout::Flat => Some(flat_path(artifact, version)),
            Layout::Maven => version.map(|v| maven_path(artifact, v)),
            Layout::Jpp => Some(jpp_path(artifact, version, context)),
        }
    }
}

fn push_classifier_and_extension(path: &mut String, artifact: &ArtifactId) {
    if !artifact.classifier().is_empty() {
        path.push('-');
        path.push_str(artifact.classifier());
    }
    if !artifact.extension().is_empty() {
        path.push('.');
        path.push_str(artifact.extension());
    }
}

fn flat_path(artifact: &ArtifactId, version: Option<&str>) -> String {
    let mut path = format!(
        "{}-{}",
        artifact.group_id().replace('/', "."),
        artifact.artifact_id()
    );
    if let Some(version) = version {
        path.push('-');
        path.push_str(version);
    }
    push_classifier_and_extension(&mut path, artifact);
    path
}

fn maven_path(artifact: &ArtifactId, version: &str) -> String {
    let mut path = format!(
        "{}/{}/{}/{}-{}",
        artifact.group_id().replace('.', "/"),
        artifact.artifact_id(),
        version,
        artifact.artifact_id(),
        version
    );
    push_classifier_and_extension(&mut path, artifact);
    path
}

fn jpp_path(artifact: &ArtifactId, version: Option<&str>, context: &ArtifactContext) -> String {
    let group_id = artifact.group_id();
    let pattern = if group_id == "JPP" {
        artifact.artifact_id().to_string()
    } else {
        format!("{}/{}", group_id, artifact.artifact_id())
    };

    let mut path = pattern
        .strip_prefix("JPP/")
        .map(str::to_string)
        .unwrap_or(pattern);

    if let Some(version) = version {
        path.push('-');
        path.push_str(version);
    }
    if !artifact.classifier().is_empty() {
        path.push('-');
        path.push_str(artifact.classifier());
    }
    if let Some(suffix) = context.property(SUFFIX_PROPERTY).filter(|s| !s.is_empty()) {
        path.push('-');
        path.push_str(suffix);
    }
    if !artifact.extension().is_empty() {
        path.push('.');
        path.push_str(artifact.extension());
    }
    path
}

/// Repository backed by one simple layout
#[derive(Debug, Clone)]
pub struct LayoutRepository {
    layout: Layout,
    namespace: String,
    root: Option<PathBuf>,
    filter: Condition,
}

impl LayoutRepository {
    pub fn new(layout: Layout, namespace: &str, root: Option<PathBuf>, filter: Condition) -> Self {
        Self {
            layout,
            namespace: namespace.to_string(),
            root,
            filter,
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }
}

fn create(
    layout: Layout,
    descriptor: &RepositoryDescriptor,
    namespace: &str,
) -> Result<Box<dyn Repository>> {
    let root = descriptor
        .properties
        .get("root")
        .filter(|r| !r.is_empty())
        .map(PathBuf::from);
    let filter = Condition::from_filter(descriptor.filter.as_ref())?;

    Ok(Box::new(LayoutRepository::new(
        layout,
        &effective_namespace(descriptor, namespace),
        root,
        filter,
    )))
}

pub(super) fn create_flat(
    _: &mut RepositoryConfigurator<'_>,
    descriptor: &RepositoryDescriptor,
    namespace: &str,
) -> Result<Box<dyn Repository>> {
    create(Layout::Flat, descriptor, namespace)
}

pub(super) fn create_maven(
    _: &mut RepositoryConfigurator<'_>,
    descriptor: &RepositoryDescriptor,
    namespace: &str,
) -> Result<Box<dyn Repository>> {
    create(Layout::Maven, descriptor, namespace)
}

pub(super) fn create_jpp(
    _: &mut RepositoryConfigurator<'_>,
    descriptor: &RepositoryDescriptor,
    namespace: &str,
) -> Result<Box<dyn Repository>> {
    create(Layout::Jpp, descriptor, namespace)
}

impl Repository for LayoutRepository {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn primary_path(&self, artifact: &ArtifactId, context: &ArtifactContext) -> Option<RepositoryPath> {
        if !self.filter.evaluate(artifact, context) {
            return None;
        }

        let version = (!artifact.is_versionless()).then(|| artifact.version());
        let relative = PathBuf::from(self.layout.artifact_path(artifact, version, context)?);

        let path = match &self.root {
            Some(root) => root.join(relative),
            None => relative,
        };

        Some(RepositoryPath::new(path, &self.namespace))
    }

    fn root_paths(&self) -> BTreeSet<PathBuf> {
        self.root.iter().cloned().collect()
    }
}

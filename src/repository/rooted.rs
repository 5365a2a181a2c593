// src/repository/rooted.rs

//! Repository relocated under a fixed root directory

use super::{
    effective_namespace, ArtifactContext, Repository, RepositoryConfigurator, RepositoryPath,
};
use crate::artifact::ArtifactId;
use crate::config::RepositoryDescriptor;
use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Debug)]
pub struct RootedRepository {
    root: PathBuf,
    child: Box<dyn Repository>,
}

impl RootedRepository {
    pub fn new(root: impl Into<PathBuf>, child: Box<dyn Repository>) -> Self {
        Self {
            root: root.into(),
            child,
        }
    }

    fn rooted(&self, mut path: RepositoryPath) -> RepositoryPath {
        path.path = self.root.join(&path.path);
        path
    }
}

impl Repository for RootedRepository {
    fn namespace(&self) -> &str {
        self.child.namespace()
    }

    fn primary_path(&self, artifact: &ArtifactId, context: &ArtifactContext) -> Option<RepositoryPath> {
        self.child
            .primary_path(artifact, context)
            .map(|path| self.rooted(path))
    }

    fn all_paths(&self, artifact: &ArtifactId, context: &ArtifactContext) -> Vec<RepositoryPath> {
        self.child
            .all_paths(artifact, context)
            .into_iter()
            .map(|path| self.rooted(path))
            .collect()
    }

    fn root_paths(&self) -> BTreeSet<PathBuf> {
        let roots: BTreeSet<PathBuf> = self
            .child
            .root_paths()
            .into_iter()
            .map(|root| self.root.join(root))
            .collect();

        if roots.is_empty() {
            BTreeSet::from([self.root.clone()])
        } else {
            roots
        }
    }
}

pub(super) fn create(
    configurator: &mut RepositoryConfigurator<'_>,
    descriptor: &RepositoryDescriptor,
    namespace: &str,
) -> Result<Box<dyn Repository>> {
    let root = descriptor
        .properties
        .get("root")
        .filter(|r| !r.is_empty())
        .ok_or_else(|| {
            Error::Configuration(format!(
                "rooted repository '{}' requires a 'root' property",
                descriptor.id
            ))
        })?;

    let child_id = descriptor
        .configuration
        .as_ref()
        .and_then(|c| match c.children.as_slice() {
            [single] if single.name == "repository" && !single.text().is_empty() => {
                Some(single.text())
            }
            _ => None,
        })
        .ok_or_else(|| {
            Error::Configuration(format!(
                "rooted repository '{}' expects configuration with exactly one <repository> child",
                descriptor.id
            ))
        })?;

    let namespace = effective_namespace(descriptor, namespace);
    let child = configurator.configure_with_namespace(child_id, &namespace)?;

    Ok(Box::new(RootedRepository::new(root, child)))
}

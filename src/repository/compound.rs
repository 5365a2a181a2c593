// src/repository/compound.rs

//! Ordered composition of repositories
//!
//! The first child that accepts an artifact decides its primary path.
//! Configured as:
//!
//! ```xml
//! <repository>
//!   <id>install</id>
//!   <type>compound</type>
//!   <properties><prefix>usr/share</prefix></properties>
//!   <configuration>
//!     <repositories>
//!       <repository>install-native</repository>
//!       <repository>install-jar</repository>
//!     </repositories>
//!   </configuration>
//! </repository>
//! ```

use super::{
    effective_namespace, ArtifactContext, Repository, RepositoryConfigurator, RepositoryPath,
};
use crate::artifact::ArtifactId;
use crate::config::RepositoryDescriptor;
use crate::error::{Error, Result};
use crate::xml::Element;
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Debug)]
pub struct CompoundRepository {
    namespace: String,
    prefix: Option<PathBuf>,
    children: Vec<Box<dyn Repository>>,
}

impl CompoundRepository {
    pub fn new(namespace: &str, prefix: Option<PathBuf>, children: Vec<Box<dyn Repository>>) -> Self {
        Self {
            namespace: namespace.to_string(),
            prefix,
            children,
        }
    }

    fn prefixed(&self, mut path: RepositoryPath) -> RepositoryPath {
        if let Some(prefix) = &self.prefix {
            path.path = prefix.join(&path.path);
        }
        path
    }
}

impl Repository for CompoundRepository {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn primary_path(&self, artifact: &ArtifactId, context: &ArtifactContext) -> Option<RepositoryPath> {
        self.children
            .iter()
            .find_map(|child| child.primary_path(artifact, context))
            .map(|path| self.prefixed(path))
    }

    fn all_paths(&self, artifact: &ArtifactId, context: &ArtifactContext) -> Vec<RepositoryPath> {
        self.children
            .iter()
            .flat_map(|child| child.all_paths(artifact, context))
            .map(|path| self.prefixed(path))
            .collect()
    }

    fn root_paths(&self) -> BTreeSet<PathBuf> {
        let mut roots: BTreeSet<PathBuf> = self
            .children
            .iter()
            .flat_map(|child| child.root_paths())
            .map(|root| match &self.prefix {
                Some(prefix) => prefix.join(root),
                None => root,
            })
            .collect();

        if roots.is_empty() {
            roots.extend(self.prefix.iter().cloned());
        }
        roots
    }
}

/// Child repository ids listed in a compound repository configuration
fn child_ids(configuration: Option<&Element>) -> Result<Vec<String>> {
    let Some(configuration) = configuration else {
        return Ok(Vec::new());
    };

    let invalid = |message: &str| Error::Configuration(format!("compound repository {}", message));

    let repositories = match configuration.children.as_slice() {
        [] => return Ok(Vec::new()),
        [single] if single.name == "repositories" => single,
        _ => {
            return Err(invalid(
                "expects configuration with exactly one child element: <repositories>",
            ));
        }
    };

    repositories
        .children
        .iter()
        .map(|child| {
            if child.name != "repository" || child.text().is_empty() || !child.children.is_empty() {
                return Err(invalid(
                    "expects all children of <repositories> to be <repository> text nodes",
                ));
            }
            Ok(child.text().to_string())
        })
        .collect()
}

pub(super) fn create(
    configurator: &mut RepositoryConfigurator<'_>,
    descriptor: &RepositoryDescriptor,
    namespace: &str,
) -> Result<Box<dyn Repository>> {
    let namespace = effective_namespace(descriptor, namespace);
    let prefix = descriptor
        .properties
        .get("prefix")
        .filter(|p| !p.is_empty())
        .map(PathBuf::from);

    let children = child_ids(descriptor.configuration.as_ref())?
        .iter()
        .map(|id| configurator.configure_with_namespace(id, &namespace))
        .collect::<Result<Vec<_>>>()?;

    Ok(Box::new(CompoundRepository::new(&namespace, prefix, children)))
}

// src/repository/mod.rs

//! Artifact repositories
//!
//! A repository maps an artifact to the path it is installed at. This
//! module provides:
//! - The [`Repository`] trait and the values passed through it
//! - Simple layouts (flat, maven, jpp) in `layout`
//! - Compositions of other repositories (compound, rooted)
//! - Filter conditions deciding whether a repository accepts an artifact
//! - [`RepositoryConfigurator`], which instantiates repositories from
//!   configuration descriptors through a registry of factories

mod compound;
mod condition;
mod layout;
mod rooted;

pub use compound::CompoundRepository;
pub use condition::{Condition, StringExpr};
pub use layout::{Layout, LayoutRepository, SUFFIX_PROPERTY};
pub use rooted::RootedRepository;

use crate::artifact::ArtifactId;
use crate::config::{Configuration, RepositoryDescriptor};
use crate::error::{Error, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Extra information about an artifact consulted by filters and layouts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactContext {
    properties: BTreeMap<String, String>,
}

impl ArtifactContext {
    pub fn new(properties: BTreeMap<String, String>) -> Self {
        Self { properties }
    }

    /// Builder-style helper adding one property
    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }
}

/// Path produced by a repository, tagged with that repository's namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryPath {
    pub path: PathBuf,
    pub namespace: String,
}

impl RepositoryPath {
    pub fn new(path: impl Into<PathBuf>, namespace: &str) -> Self {
        Self {
            path: path.into(),
            namespace: namespace.to_string(),
        }
    }
}

/// Maps artifacts to installation paths
pub trait Repository: fmt::Debug {
    /// Namespace recorded for artifacts placed through this repository
    fn namespace(&self) -> &str;

    /// Preferred path of the artifact, or `None` if this repository does
    /// not accept it
    fn primary_path(&self, artifact: &ArtifactId, context: &ArtifactContext) -> Option<RepositoryPath>;

    /// Every path the artifact may be found at, preferred path first
    fn all_paths(&self, artifact: &ArtifactId, context: &ArtifactContext) -> Vec<RepositoryPath> {
        self.primary_path(artifact, context).into_iter().collect()
    }

    /// Top-level directories this repository installs into
    fn root_paths(&self) -> BTreeSet<PathBuf>;
}

/// Creates a repository of one type from its descriptor
///
/// The namespace argument is the namespace inherited from an enclosing
/// repository, or empty.
pub type RepositoryFactory =
    fn(&mut RepositoryConfigurator<'_>, &RepositoryDescriptor, &str) -> Result<Box<dyn Repository>>;

/// Instantiates repositories by id from the effective configuration
///
/// Comes with factories for the types `flat`, `maven`, `jpp`, `compound`
/// and `rooted`; more can be registered.
pub struct RepositoryConfigurator<'a> {
    configuration: &'a Configuration,
    factories: HashMap<String, RepositoryFactory>,
    in_progress: Vec<String>,
}

impl<'a> RepositoryConfigurator<'a> {
    pub fn new(configuration: &'a Configuration) -> Self {
        let mut configurator = Self {
            configuration,
            factories: HashMap::new(),
            in_progress: Vec::new(),
        };

        configurator.register("flat", layout::create_flat);
        configurator.register("maven", layout::create_maven);
        configurator.register("jpp", layout::create_jpp);
        configurator.register("compound", compound::create);
        configurator.register("rooted", rooted::create);

        configurator
    }

    /// Register (or replace) the factory for a repository type
    pub fn register(&mut self, repository_type: &str, factory: RepositoryFactory) {
        self.factories.insert(repository_type.to_string(), factory);
    }

    /// Instantiate the repository with the given id
    pub fn configure(&mut self, id: &str) -> Result<Box<dyn Repository>> {
        self.configure_with_namespace(id, "")
    }

    /// Instantiate a repository, overriding its namespace when `namespace`
    /// is non-empty
    pub fn configure_with_namespace(&mut self, id: &str, namespace: &str) -> Result<Box<dyn Repository>> {
        let configuration = self.configuration;
        let descriptor = configuration
            .repository(id)
            .ok_or_else(|| Error::Configuration(format!("Repository '{}' is not configured", id)))?;

        if descriptor.repository_type.is_empty() {
            return Err(Error::Configuration(format!(
                "Repository '{}' has missing type",
                id
            )));
        }

        let factory = *self.factories.get(&descriptor.repository_type).ok_or_else(|| {
            Error::Configuration(format!(
                "Unable to create repository of type '{}': no suitable factory found",
                descriptor.repository_type
            ))
        })?;

        if self.in_progress.iter().any(|pending| pending == id) {
            let mut chain = self.in_progress.clone();
            chain.push(id.to_string());
            return Err(Error::Configuration(format!(
                "Cyclic repository configuration: {}",
                chain.join(" -> ")
            )));
        }

        debug!(
            "Configuring repository '{}' of type '{}'",
            id, descriptor.repository_type
        );

        self.in_progress.push(id.to_string());
        let repository = factory(self, descriptor, namespace);
        self.in_progress.pop();

        repository
    }
}

/// Namespace of a repository: inherited if given, else its own property
fn effective_namespace(descriptor: &RepositoryDescriptor, inherited: &str) -> String {
    if inherited.is_empty() {
        descriptor
            .properties
            .get("namespace")
            .cloned()
            .unwrap_or_default()
    } else {
        inherited.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::Element;

    pub(crate) fn descriptor(id: &str, repository_type: &str) -> RepositoryDescriptor {
        RepositoryDescriptor {
            id: id.to_string(),
            repository_type: repository_type.to_string(),
            ..Default::default()
        }
    }

    pub(crate) fn compound_configuration(children: &[&str]) -> Element {
        let mut repositories = Element::new("repositories");
        for child in children {
            repositories = repositories.with_child(Element::new("repository").with_text(child));
        }
        Element::new("configuration").with_child(repositories)
    }

    #[test]
    fn test_unknown_repository_id() {
        let config = Configuration::default();
        let result = RepositoryConfigurator::new(&config).configure("missing");
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_unknown_and_missing_type() {
        let mut config = Configuration::default();
        config.repositories.push(descriptor("odd", "nonsense"));
        config.repositories.push(descriptor("untyped", ""));

        let mut configurator = RepositoryConfigurator::new(&config);
        assert!(matches!(configurator.configure("odd"), Err(Error::Configuration(_))));
        assert!(matches!(configurator.configure("untyped"), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_custom_factory_is_used() {
        fn create_fixed(
            _: &mut RepositoryConfigurator<'_>,
            descriptor: &RepositoryDescriptor,
            namespace: &str,
        ) -> Result<Box<dyn Repository>> {
            Ok(Box::new(LayoutRepository::new(
                Layout::Flat,
                &effective_namespace(descriptor, namespace),
                Some(PathBuf::from("custom")),
                Condition::default(),
            )))
        }

        let mut config = Configuration::default();
        config.repositories.push(descriptor("mine", "custom"));

        let mut configurator = RepositoryConfigurator::new(&config);
        configurator.register("custom", create_fixed);

        let repo = configurator.configure("mine").unwrap();
        let path = repo
            .primary_path(&ArtifactId::of("g:a").unwrap(), &ArtifactContext::default())
            .unwrap();
        assert_eq!(path.path, PathBuf::from("custom/g-a.jar"));
    }

    #[test]
    fn test_self_referencing_compound_is_rejected() {
        let mut config = Configuration::default();
        let mut looped = descriptor("loop", "compound");
        looped.configuration = Some(compound_configuration(&["loop"]));
        config.repositories.push(looped);

        let result = RepositoryConfigurator::new(&config).configure("loop");
        match result {
            Err(Error::Configuration(message)) => assert!(message.contains("loop -> loop")),
            other => panic!("expected cycle error, got {:?}", other),
        }
    }

    #[test]
    fn test_namespace_property() {
        let mut config = Configuration::default();
        let mut repo = descriptor("jar", "jpp");
        repo.properties.insert("namespace".to_string(), "own".to_string());
        config.repositories.push(repo);

        let mut configurator = RepositoryConfigurator::new(&config);
        assert_eq!(configurator.configure("jar").unwrap().namespace(), "own");
        assert_eq!(
            configurator
                .configure_with_namespace("jar", "inherited")
                .unwrap()
                .namespace(),
            "inherited"
        );
    }
}

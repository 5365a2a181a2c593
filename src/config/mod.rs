// src/config/mod.rs

//! Layered configuration
//!
//! This module provides:
//! - The typed configuration model (repositories, packaging rules and the
//!   build, resolver and installer settings)
//! - The two-way merge that folds configuration layers into one
//! - Reading configuration documents from XML
//! - The configurator that locates, merges and caches all layers

mod loader;
mod merge;
mod reader;

pub use loader::{ConfigLocations, Configurator};
pub use merge::merge;
pub use reader::{load_configuration_file, parse_configuration};

use crate::artifact::ArtifactId;
use crate::error::Result;
use crate::rules::{EffectiveRule, RuleEngine};
use crate::xml::Element;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Effective or partial configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub properties: BTreeMap<String, String>,
    pub repositories: Vec<RepositoryDescriptor>,
    pub build_settings: BuildSettings,
    pub artifact_management: Vec<PackagingRule>,
    pub resolver_settings: ResolverSettings,
    pub installer_settings: InstallerSettings,
}

impl Configuration {
    /// Find a repository descriptor by id
    pub fn repository(&self, id: &str) -> Option<&RepositoryDescriptor> {
        self.repositories.iter().find(|r| r.id == id)
    }

    /// Compute the effective packaging rule for one artifact
    ///
    /// Builds a throwaway rule engine, so matched markers are not retained.
    pub fn effective_rule(&self, artifact: &ArtifactId) -> Result<EffectiveRule> {
        let mut engine = RuleEngine::new(self.artifact_management.clone())?;
        engine.effective_rule(artifact)
    }
}

/// Repository descriptor as written in configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RepositoryDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub repository_type: String,
    pub properties: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<Element>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Element>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSettings {
    pub debug: Option<bool>,
    pub skip_tests: Option<bool>,
    pub compiler_source: Option<String>,
    pub skipped_plugins: Vec<ArtifactGlob>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverSettings {
    pub debug: Option<bool>,
    pub local_repositories: Vec<String>,
    pub metadata_repositories: Vec<String>,
    pub ignore_duplicate_metadata: Option<bool>,
    pub prefixes: Vec<String>,
    pub blacklist: Vec<ArtifactGlob>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallerSettings {
    pub debug: Option<bool>,
    pub metadata_dir: Option<String>,
    pub enable_raw_poms: Option<bool>,
    pub enable_effective_poms: Option<bool>,
}

/// Artifact-shaped pattern or template
///
/// Used both as the glob a packaging rule matches against and as the alias
/// template a rule produces. Empty fields mean "unconstrained" in a glob and
/// "inherit from the source artifact" in a template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactGlob {
    pub stereotype: String,
    pub group_id: String,
    pub artifact_id: String,
    pub extension: String,
    pub classifier: String,
    pub version: String,
}

impl fmt::Display for ArtifactGlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}",
            self.group_id, self.artifact_id, self.extension, self.classifier, self.version
        )?;
        if !self.stereotype.is_empty() {
            write!(f, " [{}]", self.stereotype)?;
        }
        Ok(())
    }
}

/// Packaging rule as authored in configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagingRule {
    pub artifact_glob: ArtifactGlob,
    pub target_package: Option<String>,
    pub target_repository: Option<String>,
    pub files: Vec<String>,
    pub versions: Vec<String>,
    pub aliases: Vec<ArtifactGlob>,
    pub optional: bool,
    /// Set once the rule applied to at least one artifact
    #[serde(skip)]
    pub matched: bool,
}

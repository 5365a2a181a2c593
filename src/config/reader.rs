// src/config/reader.rs

//! Reading configuration documents
//!
//! Maps the XML element tree of a configuration file onto the typed model.
//! Unknown elements are ignored so that newer files stay readable.

use super::{
    ArtifactGlob, BuildSettings, Configuration, InstallerSettings, PackagingRule,
    RepositoryDescriptor, ResolverSettings,
};
use crate::error::{Error, Result};
use crate::xml::Element;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

type ParseResult<T> = std::result::Result<T, String>;

/// Load one configuration file
///
/// A file that does not exist or cannot be read is an expected absence and
/// yields `Ok(None)`. A file that exists but is malformed is an error.
pub fn load_configuration_file(path: &Path) -> Result<Option<Configuration>> {
    if !path.is_file() {
        let reason = if path.exists() {
            "not a regular file"
        } else {
            "no such file"
        };
        debug!("Skipping configuration file {}: {}", path.display(), reason);
        return Ok(None);
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!("Skipping configuration file {}: {}", path.display(), e);
            return Ok(None);
        }
    };

    parse_configuration(&content, path).map(Some)
}

/// Parse a configuration document; `origin` is only used in error messages
pub fn parse_configuration(content: &str, origin: &Path) -> Result<Configuration> {
    let parse_error = |reason: String| Error::ConfigParse {
        path: origin.to_path_buf(),
        reason,
    };

    let root = Element::parse(content).map_err(|e| parse_error(e.to_string()))?;
    if root.name != "configuration" {
        return Err(parse_error(format!(
            "root element must be <configuration>, found <{}>",
            root.name
        )));
    }

    read_configuration(&root).map_err(parse_error)
}

fn read_configuration(root: &Element) -> ParseResult<Configuration> {
    let mut config = Configuration::default();

    for child in &root.children {
        match child.name.as_str() {
            "properties" => config.properties = read_properties(child),
            "repositories" => {
                for repo in child.children_named("repository") {
                    config.repositories.push(read_repository(repo)?);
                }
            }
            "buildSettings" => config.build_settings = read_build_settings(child)?,
            "artifactManagement" => {
                for rule in child.children_named("rule") {
                    config.artifact_management.push(read_rule(rule)?);
                }
            }
            "resolverSettings" => config.resolver_settings = read_resolver_settings(child)?,
            "installerSettings" => config.installer_settings = read_installer_settings(child)?,
            other => debug!("Ignoring unknown configuration element <{}>", other),
        }
    }

    Ok(config)
}

fn read_properties(element: &Element) -> BTreeMap<String, String> {
    element
        .children
        .iter()
        .map(|p| (p.name.clone(), p.text().to_string()))
        .collect()
}

fn read_bool(element: &Element) -> ParseResult<bool> {
    match element.text() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(format!(
            "<{}> must be 'true' or 'false', found '{}'",
            element.name, other
        )),
    }
}

fn optional_bool(parent: &Element, name: &str) -> ParseResult<Option<bool>> {
    parent.child(name).map(read_bool).transpose()
}

fn optional_string(parent: &Element, name: &str) -> Option<String> {
    parent.child_text(name).map(str::to_string)
}

fn string_list(parent: &Element, list: &str, item: &str) -> Vec<String> {
    parent
        .child(list)
        .map(|l| l.children_named(item).map(|i| i.text().to_string()).collect())
        .unwrap_or_default()
}

fn glob_list(parent: &Element, list: &str, item: &str) -> Vec<ArtifactGlob> {
    parent
        .child(list)
        .map(|l| l.children_named(item).map(read_glob).collect())
        .unwrap_or_default()
}

fn read_glob(element: &Element) -> ArtifactGlob {
    let field = |name: &str| element.child_text(name).unwrap_or_default().to_string();
    ArtifactGlob {
        stereotype: field("stereotype"),
        group_id: field("groupId"),
        artifact_id: field("artifactId"),
        extension: field("extension"),
        classifier: field("classifier"),
        version: field("version"),
    }
}

fn read_repository(element: &Element) -> ParseResult<RepositoryDescriptor> {
    let id = element
        .child_text("id")
        .ok_or_else(|| "<repository> requires an <id>".to_string())?;

    Ok(RepositoryDescriptor {
        id: id.to_string(),
        repository_type: element.child_text("type").unwrap_or_default().to_string(),
        properties: element.child("properties").map(read_properties).unwrap_or_default(),
        configuration: element.child("configuration").cloned(),
        filter: element.child("filter").cloned(),
    })
}

fn read_build_settings(element: &Element) -> ParseResult<BuildSettings> {
    Ok(BuildSettings {
        debug: optional_bool(element, "debug")?,
        skip_tests: optional_bool(element, "skipTests")?,
        compiler_source: optional_string(element, "compilerSource"),
        skipped_plugins: glob_list(element, "skippedPlugins", "plugin"),
    })
}

fn read_rule(element: &Element) -> ParseResult<PackagingRule> {
    Ok(PackagingRule {
        artifact_glob: element.child("artifactGlob").map(read_glob).unwrap_or_default(),
        target_package: optional_string(element, "targetPackage"),
        target_repository: optional_string(element, "targetRepository"),
        files: string_list(element, "files", "file"),
        versions: string_list(element, "versions", "version"),
        aliases: glob_list(element, "aliases", "alias"),
        optional: optional_bool(element, "optional")?.unwrap_or(false),
        matched: false,
    })
}

fn read_resolver_settings(element: &Element) -> ParseResult<ResolverSettings> {
    Ok(ResolverSettings {
        debug: optional_bool(element, "debug")?,
        local_repositories: string_list(element, "localRepositories", "repository"),
        metadata_repositories: string_list(element, "metadataRepositories", "repository"),
        ignore_duplicate_metadata: optional_bool(element, "ignoreDuplicateMetadata")?,
        prefixes: string_list(element, "prefixes", "prefix"),
        blacklist: glob_list(element, "blacklist", "artifact"),
    })
}

fn read_installer_settings(element: &Element) -> ParseResult<InstallerSettings> {
    Ok(InstallerSettings {
        debug: optional_bool(element, "debug")?,
        metadata_dir: optional_string(element, "metadataDir"),
        enable_raw_poms: optional_bool(element, "enableRawPoms")?,
        enable_effective_poms: optional_bool(element, "enableEffectivePoms")?,
    })
}

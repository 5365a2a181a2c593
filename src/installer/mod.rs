// src/installer/mod.rs

//! Artifact installation
//!
//! An installation run resolves the effective packaging rule of every
//! requested artifact, routes it to an output package, computes its target
//! paths through the configured repositories and finally materializes each
//! package under the installation root:
//!
//! 1. payload files are hard-linked or copied, extra targets become
//!    relative symbolic links
//! 2. dependency map metadata is written per package
//! 3. a manifest of installed paths is written per package
//!
//! The [`Installer`] accumulates state across artifacts and is not meant
//! to be shared between threads without external locking.

mod files;
mod metadata;
mod package;

pub use files::{install_file, relativize};
pub use metadata::PackageMetadata;
pub use package::{Package, DEFAULT_PACKAGE, FILE_MODE, MAIN_PACKAGE, NOINSTALL_PACKAGE};

use crate::artifact::{ArtifactId, DEFAULT_VERSION};
use crate::config::Configuration;
use crate::error::{Error, Result};
use crate::repository::{ArtifactContext, Repository, RepositoryConfigurator, RepositoryPath};
use crate::rules::{EffectiveRule, RuleEngine};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Repository receiving artifact payloads unless a rule names another
pub const INSTALL_REPOSITORY: &str = "install";
/// Repository receiving raw descriptors
pub const RAW_POM_REPOSITORY: &str = "install-raw-pom";
/// Repository receiving effective descriptors
pub const EFFECTIVE_POM_REPOSITORY: &str = "install-effective-pom";

const DEFAULT_METADATA_DIR: &str = "usr/share/maven-metadata";
const POM_EXTENSION: &str = "pom";

/// One artifact to install
#[derive(Debug, Clone)]
pub struct InstallArtifact {
    /// Identity; its path is the payload file, absent for descriptor-only artifacts
    pub artifact: ArtifactId,
    pub raw_model: Option<PathBuf>,
    pub effective_model: Option<PathBuf>,
    /// Context properties consulted by repository filters (e.g. `native`)
    pub properties: BTreeMap<String, String>,
}

impl InstallArtifact {
    pub fn new(artifact: ArtifactId) -> Self {
        Self {
            artifact,
            raw_model: None,
            effective_model: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_raw_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.raw_model = Some(path.into());
        self
    }

    pub fn with_effective_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.effective_model = Some(path.into());
        self
    }

    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }
}

/// Parameters of a complete installation run
#[derive(Debug, Clone, Default)]
pub struct InstallationRequest {
    pub artifacts: Vec<InstallArtifact>,
    /// Base name of metadata files and of default target file names
    pub base_package_name: String,
    pub install_root: PathBuf,
    /// Directory receiving `.mfiles*` manifests; the current directory if unset
    pub manifest_dir: Option<PathBuf>,
    /// Fail if a mandatory packaging rule matched no artifact
    pub check_unmatched_rules: bool,
}

/// Outcome of an installation run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstallationResult {
    /// Installed artifacts per package name (`""` is the main package)
    pub installed: BTreeMap<String, Vec<ArtifactId>>,
    /// Artifacts routed to the no-install package
    pub skipped: Vec<ArtifactId>,
    /// Artifacts no repository could place
    pub unresolved: Vec<ArtifactId>,
    /// Written manifest files
    pub manifests: Vec<PathBuf>,
}

/// Target of one file role: identity and where it goes
#[derive(Debug, Clone)]
struct Target {
    artifact: ArtifactId,
    path: RepositoryPath,
}

#[derive(Debug)]
struct InstallerSettings {
    metadata_dir: PathBuf,
    enable_raw_poms: bool,
    enable_effective_poms: bool,
}

/// Accumulates artifacts into packages and materializes them
#[derive(Debug)]
pub struct Installer {
    configuration: Configuration,
    settings: InstallerSettings,
    base_package_name: String,
    install_repo: Box<dyn Repository>,
    raw_pom_repo: Box<dyn Repository>,
    effective_pom_repo: Box<dyn Repository>,
    target_repos: HashMap<String, Box<dyn Repository>>,
    rules: RuleEngine,
    packages: Vec<Package>,
    skipped: Vec<ArtifactId>,
    unresolved: Vec<ArtifactId>,
}

impl Installer {
    /// Configure repositories and packaging rules for one run
    pub fn new(configuration: &Configuration, base_package_name: &str) -> Result<Self> {
        let mut configurator = RepositoryConfigurator::new(configuration);
        let install_repo = configurator.configure(INSTALL_REPOSITORY)?;
        let raw_pom_repo = configurator.configure(RAW_POM_REPOSITORY)?;
        let effective_pom_repo = configurator.configure(EFFECTIVE_POM_REPOSITORY)?;

        // Fail early on literal target repositories; templated ones are
        // configured once their backreferences are known.
        let mut target_repos = HashMap::new();
        for rule in &configuration.artifact_management {
            if let Some(id) = rule.target_repository.as_deref()
                && !id.is_empty()
                && !id.contains('@')
                && !target_repos.contains_key(id)
            {
                target_repos.insert(id.to_string(), configurator.configure(id)?);
            }
        }

        let installer_settings = &configuration.installer_settings;
        let settings = InstallerSettings {
            metadata_dir: PathBuf::from(
                installer_settings
                    .metadata_dir
                    .as_deref()
                    .filter(|d| !d.is_empty())
                    .unwrap_or(DEFAULT_METADATA_DIR),
            ),
            enable_raw_poms: installer_settings.enable_raw_poms.unwrap_or(true),
            enable_effective_poms: installer_settings.enable_effective_poms.unwrap_or(true),
        };

        Ok(Self {
            configuration: configuration.clone(),
            settings,
            base_package_name: base_package_name.to_string(),
            install_repo,
            raw_pom_repo,
            effective_pom_repo,
            target_repos,
            rules: RuleEngine::new(configuration.artifact_management.clone())?,
            packages: Vec::new(),
            skipped: Vec::new(),
            unresolved: Vec::new(),
        })
    }

    fn package_index(&mut self, name: &str) -> usize {
        let name = package::normalize_name(name);
        if let Some(index) = self.packages.iter().position(|p| p.name() == name) {
            return index;
        }
        self.packages.push(Package::new(name));
        self.packages.len() - 1
    }

    fn payload_repository(&mut self, rule: &EffectiveRule) -> Result<&dyn Repository> {
        let Some(id) = rule.target_repository.as_deref().filter(|id| !id.is_empty()) else {
            return Ok(self.install_repo.as_ref());
        };

        if !self.target_repos.contains_key(id) {
            let repository = RepositoryConfigurator::new(&self.configuration).configure(id)?;
            self.target_repos.insert(id.to_string(), repository);
        }
        self.target_repos
            .get(id)
            .map(|repo| repo.as_ref())
            .ok_or_else(|| Error::Configuration(format!("Repository '{}' is not configured", id)))
    }

    /// Identities the artifact is installed as, one per file x version
    fn jpp_artifacts(&self, artifact: &ArtifactId, rule: &EffectiveRule) -> Result<Vec<ArtifactId>> {
        let default_file = format!("{}/{}", self.base_package_name, artifact.artifact_id());
        let files: Vec<&str> = if rule.files.is_empty() {
            vec![default_file.as_str()]
        } else {
            rule.files.iter().map(String::as_str).collect()
        };
        let versions: Vec<&str> = if rule.versions.is_empty() {
            vec![DEFAULT_VERSION]
        } else {
            rule.versions.iter().map(String::as_str).collect()
        };

        let mut jpp_artifacts = Vec::new();
        for file in files {
            let path = Path::new(file);
            if path.is_absolute() {
                return Err(Error::Configuration(format!(
                    "Absolute target file paths are not supported: artifact {}, path {}",
                    artifact, file
                )));
            }

            let name = path.file_name().map(|n| n.to_string_lossy()).ok_or_else(|| {
                Error::Configuration(format!(
                    "Target file '{}' of artifact {} has no file name",
                    file, artifact
                ))
            })?;
            let group = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
                Some(parent) => format!("JPP/{}", parent.display()),
                None => "JPP".to_string(),
            };

            for version in &versions {
                let jpp = ArtifactId::new(
                    &group,
                    &name,
                    artifact.extension(),
                    artifact.classifier(),
                    version,
                )?
                .with_stereotype(artifact.stereotype().unwrap_or_default());

                if !jpp_artifacts.contains(&jpp) {
                    jpp_artifacts.push(jpp);
                }
            }
        }

        Ok(jpp_artifacts)
    }

    /// Resolve every identity through a repository; `None` if any is refused
    fn resolve_targets(
        repository: &dyn Repository,
        artifacts: &[ArtifactId],
        context: &ArtifactContext,
    ) -> Option<Vec<Target>> {
        artifacts
            .iter()
            .map(|artifact| {
                repository.primary_path(artifact, context).map(|path| Target {
                    artifact: artifact.clone(),
                    path,
                })
            })
            .collect()
    }

    fn log_plan(artifact: &ArtifactId, source: &Path, targets: &[Target]) {
        info!("Installing artifact {} from {}", artifact, source.display());
        for target in targets {
            info!(
                "  as {} [{}] at {}",
                target.artifact,
                target.path.namespace,
                target.path.path.display()
            );
        }
    }

    /// Route one artifact to its package and buffer its files and metadata
    pub fn add_artifact(&mut self, request: &InstallArtifact) -> Result<()> {
        let mut artifact = request.artifact.clone();

        let pom_only = artifact.path().is_none();
        if pom_only {
            if artifact.extension() != POM_EXTENSION {
                return Err(Error::InvalidArtifact(format!(
                    "artifact {} has no file and is not a POM artifact",
                    artifact
                )));
            }
            let raw_model = request.raw_model.as_deref().ok_or_else(|| {
                Error::InvalidArtifact(format!(
                    "POM artifact {} has no descriptor file",
                    artifact
                ))
            })?;
            artifact = artifact.with_path(raw_model).with_stereotype(POM_EXTENSION);
        }

        let rule = self.rules.effective_rule(&artifact)?;
        let package_name = rule.target_package.clone().unwrap_or_default();
        let package = self.package_index(&package_name);

        if !self.packages[package].is_installable() {
            info!("Skipping installation of artifact {}: package is not installable", artifact);
            self.skipped.push(artifact.identity());
            return Ok(());
        }

        let source = artifact.path().map(Path::to_path_buf).unwrap_or_default();
        if !source.is_file() {
            return Err(Error::InvalidArtifact(format!(
                "file {} of artifact {} does not exist",
                source.display(),
                artifact
            )));
        }

        let context = ArtifactContext::new(request.properties.clone());
        let jpp_artifacts = self.jpp_artifacts(&artifact, &rule)?;

        let payload_repository = self.payload_repository(&rule)?;
        let Some(targets) = Self::resolve_targets(payload_repository, &jpp_artifacts, &context)
        else {
            warn!(
                "Skipping installation of artifact {}: no suitable repository found to store the artifact in",
                artifact
            );
            self.unresolved.push(artifact.identity());
            return Ok(());
        };

        let pom_artifacts: Vec<ArtifactId> = jpp_artifacts
            .iter()
            .map(|jpp| {
                ArtifactId::new(
                    jpp.group_id(),
                    jpp.artifact_id(),
                    POM_EXTENSION,
                    jpp.classifier(),
                    jpp.version(),
                )
            })
            .collect::<Result<_>>()?;

        let mut descriptor_roles = Vec::new();
        let mut refused_role = None;
        if !pom_only {
            let roles = [
                (
                    request.raw_model.as_deref(),
                    self.settings.enable_raw_poms,
                    self.raw_pom_repo.as_ref(),
                    "raw descriptor",
                ),
                (
                    request.effective_model.as_deref(),
                    self.settings.enable_effective_poms,
                    self.effective_pom_repo.as_ref(),
                    "effective descriptor",
                ),
            ];

            for (model, enabled, repository, role) in roles {
                let Some(model) = model.filter(|_| enabled) else {
                    continue;
                };
                match Self::resolve_targets(repository, &pom_artifacts, &context) {
                    Some(role_targets) => descriptor_roles.push((model.to_path_buf(), role_targets)),
                    None => {
                        refused_role = Some(role);
                        break;
                    }
                }
            }
        }

        if let Some(role) = refused_role {
            warn!(
                "Skipping installation of artifact {}: no suitable repository found to store its {}",
                artifact, role
            );
            self.unresolved.push(artifact.identity());
            return Ok(());
        }

        Self::log_plan(&artifact, &source, &targets);

        let package = &mut self.packages[package];
        buffer_files(package, &source, &targets);
        for (model, role_targets) in &descriptor_roles {
            debug!("Installing descriptor {}", model.display());
            buffer_files(package, model, role_targets);
        }

        let identity = artifact.identity();
        for target in &targets {
            let jpp = target.artifact.identity();
            let namespace = target.path.namespace.as_str();

            package
                .metadata_mut()
                .add_mapping(identity.with_namespace(namespace), jpp.clone());
            for alias in &rule.aliases {
                package
                    .metadata_mut()
                    .add_mapping(alias.identity().with_namespace(namespace), jpp.clone());
            }
        }
        package.add_artifact(identity);

        Ok(())
    }

    /// Fail if a mandatory packaging rule has not matched any artifact
    pub fn check_unmatched_rules(&self) -> Result<()> {
        self.rules.check_unmatched()
    }

    /// Materialize every package under `root`
    pub fn finish(mut self, root: &Path, manifest_dir: &Path) -> Result<InstallationResult> {
        if root.exists() && !root.is_dir() {
            return Err(Error::Configuration(format!(
                "Installation root {} exists but is not a directory",
                root.display()
            )));
        }
        std::fs::create_dir_all(root)?;

        if !self.skipped.is_empty() {
            match self.packages.iter_mut().find(|p| p.is_installable()) {
                Some(package) => {
                    for artifact in &self.skipped {
                        package.metadata_mut().add_skipped(artifact.clone());
                    }
                }
                None => debug!(
                    "No installable package to record {} skipped artifacts in",
                    self.skipped.len()
                ),
            }
        }

        let mut result = InstallationResult {
            skipped: self.skipped,
            unresolved: self.unresolved,
            ..Default::default()
        };

        for package in self.packages.iter().filter(|p| p.is_installable()) {
            let manifest = package.install(
                &self.base_package_name,
                root,
                &self.settings.metadata_dir,
                manifest_dir,
            )?;
            result.manifests.push(manifest);
            result
                .installed
                .insert(package.name().to_string(), package.artifacts().to_vec());
        }

        Ok(result)
    }
}

fn buffer_files(package: &mut Package, source: &Path, targets: &[Target]) {
    let Some((primary, links)) = targets.split_first() else {
        return;
    };

    package.add_file(source, &primary.path.path, FILE_MODE);
    for link in links {
        package.add_symlink(&link.path.path, &primary.path.path);
    }
}

/// Run a complete installation
pub fn install(configuration: &Configuration, request: &InstallationRequest) -> Result<InstallationResult> {
    let mut installer = Installer::new(configuration, &request.base_package_name)?;

    for artifact in &request.artifacts {
        installer.add_artifact(artifact)?;
    }

    if request.check_unmatched_rules {
        installer.check_unmatched_rules()?;
    }

    let manifest_dir = request
        .manifest_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    installer.finish(&request.install_root, &manifest_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ArtifactGlob, PackagingRule, RepositoryDescriptor};
    use std::fs;
    use tempfile::TempDir;

    fn jpp_repository(id: &str, root: &str) -> RepositoryDescriptor {
        let mut descriptor = RepositoryDescriptor {
            id: id.to_string(),
            repository_type: "jpp".to_string(),
            ..Default::default()
        };
        descriptor.properties.insert("root".to_string(), root.to_string());
        descriptor
    }

    fn configuration() -> Configuration {
        let mut config = Configuration::default();
        config.repositories.push(jpp_repository(INSTALL_REPOSITORY, "repo/jar"));
        config.repositories.push(jpp_repository(RAW_POM_REPOSITORY, "repo/raw-pom"));
        config
            .repositories
            .push(jpp_repository(EFFECTIVE_POM_REPOSITORY, "repo/effective-pom"));
        config
    }

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_install_repository_is_an_error() {
        let result = Installer::new(&Configuration::default(), "pkg");
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_default_target_file_is_base_name_and_artifact_id() {
        let temp = TempDir::new().unwrap();
        let jar = write_file(temp.path(), "aid.jar", "jar");
        let pom = write_file(temp.path(), "aid.pom", "<project/>");

        let artifact = ArtifactId::of("gid:aid:1.0").unwrap().with_path(&jar);
        let request = InstallationRequest {
            artifacts: vec![InstallArtifact::new(artifact).with_raw_model(&pom)],
            base_package_name: "pkg".to_string(),
            install_root: temp.path().join("root"),
            manifest_dir: Some(temp.path().to_path_buf()),
            check_unmatched_rules: false,
        };

        let result = install(&configuration(), &request).unwrap();
        let root = temp.path().join("root");

        assert!(root.join("repo/jar/pkg/aid.jar").is_file());
        assert!(root.join("repo/raw-pom/pkg/aid.pom").is_file());
        assert!(!root.join("repo/effective-pom/pkg/aid.pom").exists());
        assert_eq!(result.installed[""].len(), 1);
        assert!(temp.path().join(".mfiles").is_file());
    }

    #[test]
    fn test_versions_and_files_create_symlinks() {
        let temp = TempDir::new().unwrap();
        let jar = write_file(temp.path(), "aid.jar", "jar");

        let mut config = configuration();
        config.artifact_management.push(PackagingRule {
            files: vec!["a/@1".to_string(), "@1".to_string()],
            versions: vec!["1".to_string(), "SYSTEM".to_string()],
            artifact_glob: ArtifactGlob {
                artifact_id: "{*}".to_string(),
                ..Default::default()
            },
            ..Default::default()
        });

        let request = InstallationRequest {
            artifacts: vec![InstallArtifact::new(
                ArtifactId::of("gid:aid").unwrap().with_path(&jar),
            )],
            base_package_name: "pkg".to_string(),
            install_root: temp.path().join("root"),
            manifest_dir: Some(temp.path().to_path_buf()),
            check_unmatched_rules: true,
        };
        install(&config, &request).unwrap();

        let jars = temp.path().join("root/repo/jar");
        assert!(fs::symlink_metadata(jars.join("a/aid-1.jar")).unwrap().is_file());
        assert_eq!(fs::read_link(jars.join("a/aid.jar")).unwrap(), PathBuf::from("aid-1.jar"));
        assert_eq!(fs::read_link(jars.join("aid-1.jar")).unwrap(), PathBuf::from("a/aid-1.jar"));
        assert_eq!(fs::read_link(jars.join("aid.jar")).unwrap(), PathBuf::from("a/aid-1.jar"));
    }

    #[test]
    fn test_noinstall_package_skips_artifact() {
        let temp = TempDir::new().unwrap();
        let jar = write_file(temp.path(), "aid.jar", "jar");
        let other = write_file(temp.path(), "other.jar", "jar");

        let mut config = configuration();
        config.artifact_management.push(PackagingRule {
            artifact_glob: ArtifactGlob {
                artifact_id: "aid".to_string(),
                ..Default::default()
            },
            target_package: Some(NOINSTALL_PACKAGE.to_string()),
            ..Default::default()
        });

        let request = InstallationRequest {
            artifacts: vec![
                InstallArtifact::new(ArtifactId::of("gid:aid").unwrap().with_path(&jar)),
                InstallArtifact::new(ArtifactId::of("gid:other").unwrap().with_path(&other)),
            ],
            base_package_name: "pkg".to_string(),
            install_root: temp.path().join("root"),
            manifest_dir: Some(temp.path().to_path_buf()),
            check_unmatched_rules: false,
        };
        let result = install(&config, &request).unwrap();

        assert_eq!(result.skipped.len(), 1);
        assert!(!temp.path().join("root/repo/jar/pkg/aid.jar").exists());
        assert!(temp.path().join("root/repo/jar/pkg/other.jar").exists());
        assert!(!temp.path().join(".mfiles-__noinstall").exists());

        let metadata =
            fs::read_to_string(temp.path().join("root/usr/share/maven-metadata/pkg.xml")).unwrap();
        assert!(metadata.contains("<skippedArtifacts>"));
    }

    #[test]
    fn test_unresolvable_artifact_is_skipped_with_warning() {
        let temp = TempDir::new().unwrap();
        let jar = write_file(temp.path(), "aid.jar", "jar");

        let mut config = configuration();
        config.repositories[0].filter = Some(
            crate::xml::Element::new("filter").with_child(crate::xml::Element::new("false")),
        );

        let request = InstallationRequest {
            artifacts: vec![InstallArtifact::new(
                ArtifactId::of("gid:aid").unwrap().with_path(&jar),
            )],
            base_package_name: "pkg".to_string(),
            install_root: temp.path().join("root"),
            manifest_dir: Some(temp.path().to_path_buf()),
            check_unmatched_rules: false,
        };
        let result = install(&config, &request).unwrap();

        assert_eq!(result.unresolved.len(), 1);
        assert!(result.installed[""].is_empty());
    }

    #[test]
    fn test_target_repository_with_backreference() {
        let temp = TempDir::new().unwrap();
        let jar = write_file(temp.path(), "aid.jar", "jar");

        let mut config = configuration();
        config.repositories.push(jpp_repository("repo-aid", "repo/custom"));
        config.artifact_management.push(PackagingRule {
            artifact_glob: ArtifactGlob {
                artifact_id: "{*}".to_string(),
                ..Default::default()
            },
            target_repository: Some("repo-@1".to_string()),
            ..Default::default()
        });

        let request = InstallationRequest {
            artifacts: vec![InstallArtifact::new(
                ArtifactId::of("gid:aid").unwrap().with_path(&jar),
            )],
            base_package_name: "pkg".to_string(),
            install_root: temp.path().join("root"),
            manifest_dir: Some(temp.path().to_path_buf()),
            check_unmatched_rules: false,
        };
        install(&config, &request).unwrap();

        assert!(temp.path().join("root/repo/custom/pkg/aid.jar").is_file());
        assert!(!temp.path().join("root/repo/jar").exists());
    }

    #[test]
    fn test_absolute_target_file_is_rejected() {
        let temp = TempDir::new().unwrap();
        let jar = write_file(temp.path(), "aid.jar", "jar");

        let mut config = configuration();
        config.artifact_management.push(PackagingRule {
            files: vec!["/abs/aid".to_string()],
            ..Default::default()
        });

        let mut installer = Installer::new(&config, "pkg").unwrap();
        let result = installer.add_artifact(&InstallArtifact::new(
            ArtifactId::of("gid:aid").unwrap().with_path(&jar),
        ));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_pom_only_artifact_uses_raw_descriptor() {
        let temp = TempDir::new().unwrap();
        let pom = write_file(temp.path(), "parent.pom", "<project/>");

        let request = InstallationRequest {
            artifacts: vec![
                InstallArtifact::new(ArtifactId::of("gid:parent:pom:1.0").unwrap())
                    .with_raw_model(&pom),
            ],
            base_package_name: "pkg".to_string(),
            install_root: temp.path().join("root"),
            manifest_dir: Some(temp.path().to_path_buf()),
            check_unmatched_rules: false,
        };
        install(&configuration(), &request).unwrap();

        assert!(temp.path().join("root/repo/jar/pkg/parent.pom").is_file());
        assert!(!temp.path().join("root/repo/raw-pom").exists());
    }

    #[test]
    fn test_payload_less_jar_is_invalid() {
        let mut installer = Installer::new(&configuration(), "pkg").unwrap();
        let result = installer.add_artifact(&InstallArtifact::new(ArtifactId::of("gid:aid").unwrap()));
        assert!(matches!(result, Err(Error::InvalidArtifact(_))));
    }

    #[test]
    fn test_root_that_is_a_file_is_rejected() {
        let temp = TempDir::new().unwrap();
        let root = write_file(temp.path(), "root", "not a dir");

        let installer = Installer::new(&configuration(), "pkg").unwrap();
        let result = installer.finish(&root, temp.path());
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}

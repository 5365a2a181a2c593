// src/installer/package.rs

//! Output packages
//!
//! Every artifact is routed to one package. A package buffers the files it
//! will place and the metadata it will write until the run is finished.

use super::files::{install_content, install_file, install_symlink, relativize, root_relative};
use super::metadata::PackageMetadata;
use crate::artifact::ArtifactId;
use crate::error::Result;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the main package
pub const MAIN_PACKAGE: &str = "";
/// Alias of the main package usable in configuration
pub const DEFAULT_PACKAGE: &str = "__default";
/// Package whose artifacts are not installed at all
pub const NOINSTALL_PACKAGE: &str = "__noinstall";

/// Mode of installed regular files
pub const FILE_MODE: u32 = 0o644;

#[derive(Debug, Clone, PartialEq, Eq)]
enum TargetFile {
    Regular {
        source: PathBuf,
        target: PathBuf,
        mode: u32,
    },
    Symlink {
        link: PathBuf,
        destination: PathBuf,
    },
}

impl TargetFile {
    fn path(&self) -> &Path {
        match self {
            TargetFile::Regular { target, .. } => target,
            TargetFile::Symlink { link, .. } => link,
        }
    }
}

#[derive(Debug)]
pub struct Package {
    name: String,
    suffix: String,
    targets: Vec<TargetFile>,
    metadata: PackageMetadata,
    artifacts: Vec<ArtifactId>,
}

/// Canonical package name: the main package aliases collapse to `""`
pub fn normalize_name(name: &str) -> &str {
    if name == DEFAULT_PACKAGE {
        MAIN_PACKAGE
    } else {
        name
    }
}

impl Package {
    pub fn new(name: &str) -> Self {
        let name = normalize_name(name);
        let suffix = if name.is_empty() {
            String::new()
        } else {
            format!("-{}", name)
        };

        Self {
            name: name.to_string(),
            suffix,
            targets: Vec::new(),
            metadata: PackageMetadata::default(),
            artifacts: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Suffix appended to metadata and manifest file names
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn is_installable(&self) -> bool {
        self.name != NOINSTALL_PACKAGE
    }

    pub fn metadata(&self) -> &PackageMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut PackageMetadata {
        &mut self.metadata
    }

    /// Artifacts routed to this package, in order of addition
    pub fn artifacts(&self) -> &[ArtifactId] {
        &self.artifacts
    }

    pub fn add_artifact(&mut self, artifact: ArtifactId) {
        self.artifacts.push(artifact);
    }

    /// Buffer a regular file; `target` is relative to the installation root
    pub fn add_file(&mut self, source: &Path, target: &Path, mode: u32) {
        self.targets.push(TargetFile::Regular {
            source: source.to_path_buf(),
            target: root_relative(target),
            mode,
        });
    }

    /// Buffer a symbolic link at `link` pointing to the file at `target`
    ///
    /// Both paths are relative to the installation root; the link itself
    /// stores the path of `target` relative to the directory of `link`.
    pub fn add_symlink(&mut self, link: &Path, target: &Path) {
        let link = root_relative(link);
        let destination = relativize(&link, &root_relative(target));
        self.targets.push(TargetFile::Symlink { link, destination });
    }

    /// Every installed path, relative to the root, metadata file included
    fn installed_paths(&self, metadata_file: Option<&Path>) -> BTreeSet<PathBuf> {
        self.targets
            .iter()
            .map(|t| t.path().to_path_buf())
            .chain(metadata_file.map(Path::to_path_buf))
            .collect()
    }

    /// Place all buffered files under `root`, write the metadata into
    /// `metadata_dir` and the file list into `manifest_dir`
    ///
    /// Returns the path of the written manifest.
    pub fn install(
        &self,
        base_name: &str,
        root: &Path,
        metadata_dir: &Path,
        manifest_dir: &Path,
    ) -> Result<PathBuf> {
        info!(
            "Installing package '{}{}' into {}",
            base_name,
            self.suffix,
            root.display()
        );

        let metadata_file = if self.metadata.is_empty() {
            None
        } else {
            let relative = root_relative(metadata_dir).join(format!("{}{}.xml", base_name, self.suffix));
            install_content(self.metadata.to_xml()?.as_bytes(), &root.join(&relative), FILE_MODE)?;
            debug!("Wrote package metadata {}", relative.display());
            Some(relative)
        };

        for target in &self.targets {
            match target {
                TargetFile::Regular {
                    source,
                    target,
                    mode,
                } => {
                    debug!("Installing {} as {}", source.display(), target.display());
                    install_file(source, &root.join(target), *mode)?;
                }
                TargetFile::Symlink { link, destination } => {
                    debug!("Linking {} -> {}", link.display(), destination.display());
                    install_symlink(destination, &root.join(link))?;
                }
            }
        }

        fs::create_dir_all(manifest_dir)?;
        let manifest = manifest_dir.join(format!(".mfiles{}", self.suffix));
        let mut content = String::new();
        for path in self.installed_paths(metadata_file.as_deref()) {
            content.push('/');
            content.push_str(&path.to_string_lossy());
            content.push('\n');
        }
        fs::write(&manifest, content)?;

        Ok(manifest)
    }
}

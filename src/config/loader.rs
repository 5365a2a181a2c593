// src/config/loader.rs

//! Locating and caching the effective configuration
//!
//! Configuration layers are searched in precedence order:
//!
//! 1. reactor directory `.xmvn/config.d/*`, then `.xmvn/configuration.xml`
//! 2. `$XDG_CONFIG_HOME/xmvn/{config.d/*,configuration.xml}`
//! 3. `$XDG_DATA_HOME/xmvn/{config.d/*,configuration.xml}`
//! 4. each entry of `$XDG_CONFIG_DIRS`, then each entry of `$XDG_DATA_DIRS`
//! 5. the embedded default configuration
//!
//! Layers are merged lowest precedence first, so each file found earlier
//! in the list dominates the files found after it.

use super::merge::merge;
use super::reader::{load_configuration_file, parse_configuration};
use super::Configuration;
use crate::error::Result;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

const DEFAULT_CONFIGURATION: &str = include_str!("default_configuration.xml");

/// Directories searched for configuration layers
#[derive(Debug, Clone, Default)]
pub struct ConfigLocations {
    /// Reactor configuration directory, usually `$PWD/.xmvn`
    pub reactor_dir: Option<PathBuf>,
    pub xdg_config_home: Option<PathBuf>,
    pub xdg_data_home: Option<PathBuf>,
    pub xdg_config_dirs: Vec<PathBuf>,
    pub xdg_data_dirs: Vec<PathBuf>,
    /// Compatibility level; `<file>-<suffix>` is preferred when it exists
    pub compat_suffix: Option<String>,
}

impl ConfigLocations {
    /// Build the standard search path from the process environment
    pub fn from_env() -> Self {
        let home = env_or_default("HOME", "/");
        let home = PathBuf::from(home);

        let default_config_home = home.join(".config");
        let default_data_home = home.join(".local").join("share");

        Self {
            reactor_dir: env::current_dir().ok().map(|cwd| cwd.join(".xmvn")),
            xdg_config_home: Some(PathBuf::from(env_or_default(
                "XDG_CONFIG_HOME",
                &default_config_home.to_string_lossy(),
            ))),
            xdg_data_home: Some(PathBuf::from(env_or_default(
                "XDG_DATA_HOME",
                &default_data_home.to_string_lossy(),
            ))),
            xdg_config_dirs: split_paths(&env_or_default("XDG_CONFIG_DIRS", "/etc/xdg")),
            xdg_data_dirs: split_paths(&env_or_default(
                "XDG_DATA_DIRS",
                "/usr/local/share:/usr/share",
            )),
            compat_suffix: env::var("XMVN_COMPAT").ok().filter(|s| !s.is_empty()),
        }
    }

    /// Existing configuration files, highest precedence first
    pub fn config_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        if let Some(reactor) = &self.reactor_dir {
            self.add_config_dir(&mut files, &reactor.join("config.d"));
            self.add_config_file(&mut files, &reactor.join("configuration.xml"), true);
        }

        let bases = self
            .xdg_config_home
            .iter()
            .chain(self.xdg_data_home.iter())
            .chain(self.xdg_config_dirs.iter())
            .chain(self.xdg_data_dirs.iter());

        for base in bases {
            if !base.is_absolute() {
                debug!(
                    "Skipping XDG configuration directory {}: path is not absolute",
                    base.display()
                );
                continue;
            }
            let base = base.join("xmvn");
            self.add_config_dir(&mut files, &base.join("config.d"));
            self.add_config_file(&mut files, &base.join("configuration.xml"), true);
        }

        files
    }

    fn compat_variant(&self, path: &Path) -> Option<PathBuf> {
        self.compat_suffix
            .as_ref()
            .map(|suffix| PathBuf::from(format!("{}-{}", path.display(), suffix)))
    }

    fn add_config_file(&self, files: &mut Vec<PathBuf>, file: &Path, use_compat: bool) {
        let mut file = file.to_path_buf();
        if use_compat {
            if let Some(compat) = self.compat_variant(&file).filter(|f| f.is_file()) {
                file = compat;
            }
        }

        if !file.is_file() {
            let reason = if file.exists() {
                "not a regular file"
            } else {
                "no such file"
            };
            debug!("Skipping configuration file {}: {}", file.display(), reason);
            return;
        }

        files.push(file);
    }

    fn add_config_dir(&self, files: &mut Vec<PathBuf>, directory: &Path) {
        let mut directory = directory.to_path_buf();
        if let Some(compat) = self.compat_variant(&directory).filter(|d| d.is_dir()) {
            directory = compat;
        }

        let entries = match fs::read_dir(&directory) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(
                    "Skipping configuration directory {}: {}",
                    directory.display(),
                    e
                );
                return;
            }
        };

        let mut children: Vec<PathBuf> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
        children.sort();

        for child in children {
            self.add_config_file(files, &child, false);
        }
    }
}

fn env_or_default(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => {
            debug!(
                "Environment variable ${} is unset or empty, using default value: {}",
                key, default
            );
            default.to_string()
        }
    }
}

fn split_paths(value: &str) -> Vec<PathBuf> {
    value
        .split(':')
        .filter(|part| !part.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Loads and caches the effective configuration
///
/// The first successful load is cached for the lifetime of the configurator;
/// concurrent callers block on the lock until it is available.
#[derive(Debug)]
pub struct Configurator {
    locations: ConfigLocations,
    cached: Mutex<Option<Arc<Configuration>>>,
    cached_default: Mutex<Option<Arc<Configuration>>>,
}

impl Configurator {
    pub fn new(locations: ConfigLocations) -> Self {
        Self {
            locations,
            cached: Mutex::new(None),
            cached_default: Mutex::new(None),
        }
    }

    /// Configurator searching the standard locations of this process
    pub fn from_env() -> Self {
        Self::new(ConfigLocations::from_env())
    }

    /// Embedded configuration used as the ultimate fallback
    pub fn default_configuration(&self) -> Result<Arc<Configuration>> {
        let mut cached = self.cached_default.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(config) = cached.as_ref() {
            return Ok(Arc::clone(config));
        }

        let config = Arc::new(parse_configuration(
            DEFAULT_CONFIGURATION,
            Path::new("<embedded default configuration>"),
        )?);
        *cached = Some(Arc::clone(&config));
        Ok(config)
    }

    /// Effective configuration merged from every layer
    pub fn configuration(&self) -> Result<Arc<Configuration>> {
        let mut cached = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(config) = cached.as_ref() {
            return Ok(Arc::clone(config));
        }

        let config = Arc::new(self.load_configuration()?);
        *cached = Some(Arc::clone(&config));
        Ok(config)
    }

    fn load_configuration(&self) -> Result<Configuration> {
        let files = self.locations.config_files();

        if files.is_empty() {
            warn!("No configuration files were found. Using default embedded configuration.");
        } else {
            debug!("Configuration files used:");
            for file in &files {
                debug!("  * {}", file.display());
            }
        }

        let mut config = (*self.default_configuration()?).clone();
        for file in files.iter().rev() {
            if let Some(layer) = load_configuration_file(file)? {
                config = merge(Some(layer), &config);
            }
        }

        Ok(config)
    }

    /// Render the effective configuration as JSON and log it at debug level
    pub fn dump_configuration(&self) -> Result<String> {
        let config = self.configuration()?;
        let dump = serde_json::to_string_pretty(&*config)
            .map_err(|e| crate::Error::Configuration(format!("Failed to serialize configuration: {}", e)))?;
        debug!("Effective configuration:\n{}", dump);
        Ok(dump)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn metadata_dir_config(dir: &str) -> String {
        format!(
            "<configuration><installerSettings><metadataDir>{}</metadataDir></installerSettings>\
             <resolverSettings><prefixes><prefix>/{}</prefix></prefixes></resolverSettings></configuration>",
            dir, dir
        )
    }

    #[test]
    fn test_default_configuration_is_valid() {
        let configurator = Configurator::new(ConfigLocations::default());
        let config = configurator.default_configuration().unwrap();

        assert!(config.repository("install").is_some());
        assert!(config.repository("install-raw-pom").is_some());
        assert!(config.repository("install-effective-pom").is_some());
        assert!(config.installer_settings.metadata_dir.is_some());
    }

    #[test]
    fn test_no_files_yields_default() {
        let configurator = Configurator::new(ConfigLocations::default());
        let config = configurator.configuration().unwrap();
        let default = configurator.default_configuration().unwrap();
        assert_eq!(*config, *default);
    }

    #[test]
    fn test_layers_merge_by_precedence() {
        let temp = TempDir::new().unwrap();
        let reactor = temp.path().join(".xmvn");
        let user = temp.path().join("user");
        let system = temp.path().join("system");

        write(&reactor.join("configuration.xml"), &metadata_dir_config("reactor"));
        write(&user.join("xmvn/configuration.xml"), &metadata_dir_config("user"));
        write(&system.join("xmvn/config.d/10-system.xml"), &metadata_dir_config("system"));

        let locations = ConfigLocations {
            reactor_dir: Some(reactor),
            xdg_config_home: Some(user),
            xdg_config_dirs: vec![system],
            ..Default::default()
        };
        assert_eq!(locations.config_files().len(), 3);

        let configurator = Configurator::new(locations);
        let config = configurator.configuration().unwrap();

        assert_eq!(config.installer_settings.metadata_dir.as_deref(), Some("reactor"));

        let prefixes = &config.resolver_settings.prefixes;
        assert_eq!(&prefixes[..3], ["/reactor", "/user", "/system"]);
    }

    #[test]
    fn test_config_dir_entries_are_sorted() {
        let temp = TempDir::new().unwrap();
        let reactor = temp.path().join(".xmvn");
        write(&reactor.join("config.d/b.xml"), &metadata_dir_config("b"));
        write(&reactor.join("config.d/a.xml"), &metadata_dir_config("a"));

        let locations = ConfigLocations {
            reactor_dir: Some(reactor.clone()),
            ..Default::default()
        };
        let files = locations.config_files();
        assert_eq!(files, [reactor.join("config.d/a.xml"), reactor.join("config.d/b.xml")]);
    }

    #[test]
    fn test_relative_xdg_paths_are_skipped() {
        let locations = ConfigLocations {
            xdg_config_dirs: vec![PathBuf::from("relative/dir")],
            ..Default::default()
        };
        assert!(locations.config_files().is_empty());
    }

    #[test]
    fn test_compat_file_is_preferred() {
        let temp = TempDir::new().unwrap();
        let reactor = temp.path().join(".xmvn");
        write(&reactor.join("configuration.xml"), &metadata_dir_config("plain"));
        write(&reactor.join("configuration.xml-legacy"), &metadata_dir_config("compat"));

        let locations = ConfigLocations {
            reactor_dir: Some(reactor),
            compat_suffix: Some("legacy".to_string()),
            ..Default::default()
        };
        let config = Configurator::new(locations).configuration().unwrap();
        assert_eq!(config.installer_settings.metadata_dir.as_deref(), Some("compat"));
    }

    #[test]
    fn test_malformed_layer_is_an_error() {
        let temp = TempDir::new().unwrap();
        let reactor = temp.path().join(".xmvn");
        write(&reactor.join("configuration.xml"), "<configuration><broken>");

        let locations = ConfigLocations {
            reactor_dir: Some(reactor),
            ..Default::default()
        };
        assert!(Configurator::new(locations).configuration().is_err());
    }

    #[test]
    fn test_configuration_is_cached() {
        let configurator = Configurator::new(ConfigLocations::default());
        let first = configurator.configuration().unwrap();
        let second = configurator.configuration().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_dump_configuration_is_json() {
        let configurator = Configurator::new(ConfigLocations::default());
        let dump = configurator.dump_configuration().unwrap();
        let value: serde_json::Value = serde_json::from_str(&dump).unwrap();
        assert!(value.get("repositories").is_some());
    }
}

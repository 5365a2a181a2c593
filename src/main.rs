// src/main.rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mvnmap::config::Configurator;
use mvnmap::depmap::DependencyMap;
use mvnmap::installer::{self, InstallArtifact, InstallationRequest};
use mvnmap::repository::{ArtifactContext, RepositoryConfigurator};
use mvnmap::ArtifactId;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "mvnmap")]
#[command(author, version, about = "Map Java build artifacts onto a system installation layout", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install artifacts into a root directory
    Install {
        /// Installation root
        #[arg(short, long)]
        root: PathBuf,
        /// Base package name
        #[arg(short, long)]
        package: String,
        /// Directory receiving .mfiles manifests (default: current directory)
        #[arg(short, long)]
        manifest_dir: Option<PathBuf>,
        /// Fail if a mandatory packaging rule matched no artifact
        #[arg(long)]
        check_unmatched: bool,
        /// Artifacts as COORDINATES=FILE; a POM coordinate takes its descriptor as FILE
        #[arg(required = true)]
        artifacts: Vec<String>,
    },
    /// Print the effective configuration as JSON
    Config,
    /// Translate an artifact through the system dependency map
    Translate {
        /// Artifact coordinates (gid:aid[:ext[:cla]][:ver])
        coordinates: String,
        /// Only follow mappings of this namespace
        #[arg(short, long)]
        namespace: Option<String>,
    },
    /// Print where a repository would place an artifact
    Locate {
        /// Artifact coordinates (gid:aid[:ext[:cla]][:ver])
        coordinates: String,
        /// Repository ID
        #[arg(short, long, default_value = "install")]
        repository: String,
    },
}

/// Split a `COORDINATES=FILE` argument into an installable artifact
fn parse_install_artifact(argument: &str) -> Result<InstallArtifact> {
    let (coordinates, file) = argument
        .split_once('=')
        .with_context(|| format!("Expected COORDINATES=FILE, got '{}'", argument))?;

    let artifact = ArtifactId::of(coordinates)?;
    if artifact.extension() == "pom" {
        return Ok(InstallArtifact::new(artifact).with_raw_model(file));
    }
    Ok(InstallArtifact::new(artifact.with_path(file)))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let configurator = Configurator::from_env();

    match cli.command {
        Commands::Install {
            root,
            package,
            manifest_dir,
            check_unmatched,
            artifacts,
        } => {
            let configuration = configurator.configuration()?;
            debug!("Effective configuration: {}", configurator.dump_configuration()?);

            let request = InstallationRequest {
                artifacts: artifacts
                    .iter()
                    .map(|a| parse_install_artifact(a))
                    .collect::<Result<_>>()?,
                base_package_name: package,
                install_root: root,
                manifest_dir,
                check_unmatched_rules: check_unmatched,
            };

            info!(
                "Installing {} artifacts into {}",
                request.artifacts.len(),
                request.install_root.display()
            );
            let result = installer::install(&configuration, &request)?;

            for (name, installed) in &result.installed {
                let name = if name.is_empty() { "(main)" } else { name };
                println!("Package {}: {} artifact(s)", name, installed.len());
                for artifact in installed {
                    println!("  {}", artifact);
                }
            }
            for artifact in &result.skipped {
                println!("Skipped: {}", artifact);
            }
            for artifact in &result.unresolved {
                println!("Unresolved: {}", artifact);
            }
            for manifest in &result.manifests {
                println!("Manifest: {}", manifest.display());
            }

            Ok(())
        }
        Commands::Config => {
            println!("{}", configurator.dump_configuration()?);
            Ok(())
        }
        Commands::Translate {
            coordinates,
            namespace,
        } => {
            let configuration = configurator.configuration()?;
            let artifact = ArtifactId::of(&coordinates)?;
            let map = DependencyMap::from_settings(&configuration.resolver_settings);

            let translated = map.translate(&artifact, namespace.as_deref());
            if translated.is_empty() {
                println!("No mapping found for {}", artifact);
            }
            for target in &translated {
                match target.namespace() {
                    Some(ns) => println!("{} [{}]", target, ns),
                    None => println!("{}", target),
                }
            }

            Ok(())
        }
        Commands::Locate {
            coordinates,
            repository,
        } => {
            let configuration = configurator.configuration()?;
            let artifact = ArtifactId::of(&coordinates)?;
            let repo = RepositoryConfigurator::new(&configuration).configure(&repository)?;
            let context = ArtifactContext::default();

            match repo.primary_path(&artifact, &context) {
                Some(primary) => println!("Primary: {} [{}]", primary.path.display(), primary.namespace),
                None => println!("Repository '{}' cannot store {}", repository, artifact),
            }
            for path in repo.all_paths(&artifact, &context) {
                println!("  {} [{}]", path.path.display(), path.namespace);
            }

            Ok(())
        }
    }
}

// src/config/merge.rs

//! Two-way configuration merge
//!
//! The dominant layer keeps every scalar it sets; scalars it leaves unset
//! (`None` or empty) are filled from the recessive layer. Lists are
//! concatenated with the recessive entries after the dominant ones, and
//! property keys already present in the dominant layer win.

use super::{BuildSettings, Configuration, InstallerSettings, ResolverSettings};
use std::collections::BTreeMap;

/// Merge `recessive` into `dominant` and return the result
///
/// A missing dominant layer starts out as an empty configuration. The
/// recessive layer is only borrowed and never modified.
pub fn merge(dominant: Option<Configuration>, recessive: &Configuration) -> Configuration {
    let mut dominant = dominant.unwrap_or_default();

    merge_properties(&mut dominant.properties, &recessive.properties);
    dominant
        .repositories
        .extend(recessive.repositories.iter().cloned());
    merge_build_settings(&mut dominant.build_settings, &recessive.build_settings);
    dominant
        .artifact_management
        .extend(recessive.artifact_management.iter().cloned());
    merge_resolver_settings(&mut dominant.resolver_settings, &recessive.resolver_settings);
    merge_installer_settings(
        &mut dominant.installer_settings,
        &recessive.installer_settings,
    );

    dominant
}

fn merge_properties(dominant: &mut BTreeMap<String, String>, recessive: &BTreeMap<String, String>) {
    for (key, value) in recessive {
        dominant
            .entry(key.clone())
            .or_insert_with(|| value.clone());
    }
}

fn fill_flag(dominant: &mut Option<bool>, recessive: Option<bool>) {
    if dominant.is_none() {
        *dominant = recessive;
    }
}

fn fill_string(dominant: &mut Option<String>, recessive: &Option<String>) {
    if dominant.as_deref().is_none_or(str::is_empty) {
        *dominant = recessive.clone();
    }
}

fn merge_build_settings(dominant: &mut BuildSettings, recessive: &BuildSettings) {
    fill_flag(&mut dominant.debug, recessive.debug);
    fill_flag(&mut dominant.skip_tests, recessive.skip_tests);
    fill_string(&mut dominant.compiler_source, &recessive.compiler_source);
    dominant
        .skipped_plugins
        .extend(recessive.skipped_plugins.iter().cloned());
}

fn merge_resolver_settings(dominant: &mut ResolverSettings, recessive: &ResolverSettings) {
    fill_flag(&mut dominant.debug, recessive.debug);
    fill_flag(
        &mut dominant.ignore_duplicate_metadata,
        recessive.ignore_duplicate_metadata,
    );
    dominant
        .local_repositories
        .extend(recessive.local_repositories.iter().cloned());
    dominant
        .metadata_repositories
        .extend(recessive.metadata_repositories.iter().cloned());
    dominant.prefixes.extend(recessive.prefixes.iter().cloned());
    dominant.blacklist.extend(recessive.blacklist.iter().cloned());
}

fn merge_installer_settings(dominant: &mut InstallerSettings, recessive: &InstallerSettings) {
    fill_flag(&mut dominant.debug, recessive.debug);
    fill_string(&mut dominant.metadata_dir, &recessive.metadata_dir);
    fill_flag(&mut dominant.enable_raw_poms, recessive.enable_raw_poms);
    fill_flag(
        &mut dominant.enable_effective_poms,
        recessive.enable_effective_poms,
    );
}

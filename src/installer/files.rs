// src/installer/files.rs

//! Low-level file placement under an installation root

use crate::error::Result;
use std::fs;
use std::io;
use std::os::unix::fs::{symlink, PermissionsExt};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Strip leading `/` so that a repository path can be joined onto a root
pub fn root_relative(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .collect()
}

/// Lexically normalize a relative path (`.` dropped, `..` folded)
fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir if matches!(parts.last(), Some(Component::Normal(_))) => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.iter().collect()
}

/// Path of `target` relative to the directory containing `link`
///
/// Both paths are relative to the same root.
pub fn relativize(link: &Path, target: &Path) -> PathBuf {
    let link = normalize(link);
    let target = normalize(target);

    let base: Vec<Component<'_>> = link
        .parent()
        .map(|p| p.components().collect())
        .unwrap_or_default();
    let target_parts: Vec<Component<'_>> = target.components().collect();

    let common = base
        .iter()
        .zip(target_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base.len() {
        relative.push("..");
    }
    for part in &target_parts[common..] {
        relative.push(part.as_os_str());
    }
    relative
}

fn remove_existing(target: &Path) -> io::Result<()> {
    match fs::symlink_metadata(target) {
        Ok(meta) if meta.is_dir() => Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} exists and is a directory", target.display()),
        )),
        Ok(_) => fs::remove_file(target),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

fn create_parent(target: &Path) -> io::Result<()> {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Place `source` at `target` by hard link, falling back to a copy, then
/// set its permission bits
///
/// An existing file at `target` is replaced.
pub fn install_file(source: &Path, target: &Path, mode: u32) -> Result<()> {
    create_parent(target)?;
    remove_existing(target)?;

    if let Err(e) = fs::hard_link(source, target) {
        debug!(
            "Hard link {} -> {} failed ({}), copying instead",
            target.display(),
            source.display(),
            e
        );
        fs::copy(source, target)?;
    }

    fs::set_permissions(target, fs::Permissions::from_mode(mode))?;
    Ok(())
}

/// Write `content` to `target`, replacing an existing file
pub fn install_content(content: &[u8], target: &Path, mode: u32) -> Result<()> {
    create_parent(target)?;
    remove_existing(target)?;
    fs::write(target, content)?;
    fs::set_permissions(target, fs::Permissions::from_mode(mode))?;
    Ok(())
}

/// Create a symbolic link at `link` pointing to `destination`, replacing an
/// existing file
pub fn install_symlink(destination: &Path, link: &Path) -> Result<()> {
    create_parent(link)?;
    remove_existing(link)?;
    symlink(destination, link)?;
    Ok(())
}

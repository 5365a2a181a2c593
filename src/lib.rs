// src/lib.rs

//! Mvnmap
//!
//! Maps Java build artifacts onto a system installation layout.
//!
//! # Architecture
//!
//! - Layered configuration: XML fragments from XDG locations merged over a
//!   built-in default
//! - Packaging rules: glob-matched rules decide the package, file names,
//!   versions and aliases of every artifact
//! - Repositories: pluggable layouts (flat, maven, jpp) composed through
//!   compound and rooted repositories, guarded by filter conditions
//! - Dependency map: transitive artifact translation read back from the
//!   metadata written at installation time

pub mod artifact;
pub mod config;
pub mod depmap;
mod error;
pub mod installer;
pub mod repository;
pub mod rules;
pub mod xml;

pub use artifact::ArtifactId;
pub use error::{Error, Result};

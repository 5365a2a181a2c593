// src/depmap/reader.rs

//! Dependency map fragment reader
//!
//! A fragment is either a well-formed XML document, the same document
//! compressed with gzip, or legacy text consisting of bare concatenated
//! `<dependency>` elements with no enclosing root.

use crate::artifact::ArtifactId;
use crate::error::{Error, Result};
use crate::xml::Element;
use flate2::read::GzDecoder;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// One `(source, namespace) -> target` edge read from a fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub from: ArtifactId,
    pub to: ArtifactId,
    pub namespace: String,
}

/// Read every mapping of one fragment file
///
/// Never fails: a missing, unreadable or malformed fragment contributes no
/// mappings and is only logged.
pub fn read_fragment(path: &Path) -> Vec<Mapping> {
    if !path.exists() {
        debug!("Skipping dependency map fragment {}: no such file", path.display());
        return Vec::new();
    }

    match read_content(path).and_then(|content| parse_fragment(&content)) {
        Ok(mappings) => {
            debug!(
                "Read {} mappings from dependency map fragment {}",
                mappings.len(),
                path.display()
            );
            mappings
        }
        Err(e) => {
            warn!(
                "Ignoring dependency map fragment {}: {}",
                path.display(),
                e
            );
            Vec::new()
        }
    }
}

fn read_content(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;

    if bytes.starts_with(&GZIP_MAGIC) {
        let mut gz = GzDecoder::new(bytes.as_slice());
        let mut decompressed = String::new();
        gz.read_to_string(&mut decompressed)?;
        debug!(
            "Decompressed dependency map fragment {}: {} bytes",
            path.display(),
            decompressed.len()
        );
        return Ok(decompressed);
    }

    String::from_utf8(bytes).map_err(|e| Error::Fragment(format!("not valid UTF-8: {}", e)))
}

fn is_xml_document(content: &str) -> bool {
    content
        .trim_start_matches('\u{feff}')
        .trim_start()
        .get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("<?xml"))
}

/// Parse fragment content into mappings
///
/// A `<dependency>` without `<maven>` invalidates the whole fragment; one
/// without `<jpp>` is skipped on its own.
pub fn parse_fragment(content: &str) -> Result<Vec<Mapping>> {
    let root = if is_xml_document(content) {
        Element::parse(content)?
    } else {
        Element::parse(&format!("<dependencies>{}</dependencies>", content))?
    };

    let mut mappings = Vec::new();

    for dependency in root.descendants("dependency") {
        let maven = dependency.child("maven").ok_or_else(|| {
            Error::Fragment("<dependency> is missing its <maven> element".to_string())
        })?;
        let from = read_artifact(maven)?;

        let Some(jpp) = dependency.child("jpp") else {
            debug!("Skipping dependency map entry for {}: no <jpp> element", from);
            continue;
        };
        let to = read_artifact(jpp)?;

        let namespace = dependency
            .attribute("namespace")
            .map(str::trim)
            .or_else(|| dependency.child_text("namespace"))
            .unwrap_or_default()
            .to_string();

        mappings.push(Mapping {
            from,
            to,
            namespace,
        });
    }

    Ok(mappings)
}

fn single_text<'a>(element: &'a Element, name: &str) -> Result<Option<&'a str>> {
    let mut found = element.children_named(name);
    let first = found.next();
    if found.next().is_some() {
        return Err(Error::Fragment(format!(
            "<{}> must not contain more than one <{}>",
            element.name, name
        )));
    }
    Ok(first.map(|e| e.text()))
}

fn required_text<'a>(element: &'a Element, name: &str) -> Result<&'a str> {
    single_text(element, name)?
        .ok_or_else(|| Error::Fragment(format!("<{}> is missing its <{}>", element.name, name)))
}

fn read_artifact(element: &Element) -> Result<ArtifactId> {
    let group_id = required_text(element, "groupId")?;
    let artifact_id = required_text(element, "artifactId")?;
    let extension = single_text(element, "extension")?.unwrap_or_default();
    let classifier = single_text(element, "classifier")?.unwrap_or_default();
    let version = single_text(element, "version")?.unwrap_or_default();

    ArtifactId::new(group_id, artifact_id, extension, classifier, version)
}

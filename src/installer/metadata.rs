// src/installer/metadata.rs

//! Per-package dependency map metadata
//!
//! Written in the same shape the dependency map reader understands:
//!
//! ```xml
//! <dependencyMap>
//!   <dependency namespace="ns">
//!     <maven><groupId>gid</groupId><artifactId>aid</artifactId><version>SYSTEM</version></maven>
//!     <jpp><groupId>JPP</groupId><artifactId>aid</artifactId><version>SYSTEM</version></jpp>
//!   </dependency>
//!   <skippedArtifacts>
//!     <skippedArtifact><groupId>gid</groupId><artifactId>other</artifactId></skippedArtifact>
//!   </skippedArtifacts>
//! </dependencyMap>
//! ```

use crate::artifact::{ArtifactId, DEFAULT_EXTENSION};
use crate::error::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackageMetadata {
    mappings: Vec<(ArtifactId, ArtifactId)>,
    skipped: Vec<ArtifactId>,
}

impl PackageMetadata {
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty() && self.skipped.is_empty()
    }

    /// Record that `from` (carrying its namespace) is installed as `to`
    pub fn add_mapping(&mut self, from: ArtifactId, to: ArtifactId) {
        let exists = self
            .mappings
            .iter()
            .any(|(f, t)| f == &from && t == &to && f.namespace() == from.namespace());
        if !exists {
            self.mappings.push((from, to));
        }
    }

    pub fn add_skipped(&mut self, artifact: ArtifactId) {
        if !self.skipped.contains(&artifact) {
            self.skipped.push(artifact);
        }
    }

    pub fn mappings(&self) -> &[(ArtifactId, ArtifactId)] {
        &self.mappings
    }

    pub fn skipped(&self) -> &[ArtifactId] {
        &self.skipped
    }

    /// Render the metadata document
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new("dependencyMap")))?;

        for (from, to) in &self.mappings {
            let mut dependency = BytesStart::new("dependency");
            if let Some(namespace) = from.namespace() {
                dependency.push_attribute(("namespace", namespace));
            }
            writer.write_event(Event::Start(dependency))?;
            write_artifact(&mut writer, "maven", from, true)?;
            write_artifact(&mut writer, "jpp", to, true)?;
            writer.write_event(Event::End(BytesEnd::new("dependency")))?;
        }

        if !self.skipped.is_empty() {
            writer.write_event(Event::Start(BytesStart::new("skippedArtifacts")))?;
            for artifact in &self.skipped {
                write_artifact(&mut writer, "skippedArtifact", artifact, false)?;
            }
            writer.write_event(Event::End(BytesEnd::new("skippedArtifacts")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("dependencyMap")))?;

        let mut xml = String::from_utf8_lossy(&writer.into_inner()).into_owned();
        xml.push('\n');
        Ok(xml)
    }
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_artifact(
    writer: &mut Writer<Vec<u8>>,
    element: &str,
    artifact: &ArtifactId,
    with_version: bool,
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(element)))?;

    write_text_element(writer, "groupId", artifact.group_id())?;
    write_text_element(writer, "artifactId", artifact.artifact_id())?;
    if artifact.extension() != DEFAULT_EXTENSION {
        write_text_element(writer, "extension", artifact.extension())?;
    }
    if !artifact.classifier().is_empty() {
        write_text_element(writer, "classifier", artifact.classifier())?;
    }
    if with_version {
        write_text_element(writer, "version", artifact.version())?;
    }

    writer.write_event(Event::End(BytesEnd::new(element)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depmap::parse_fragment;
    use crate::xml::Element;

    #[test]
    fn test_written_metadata_reads_back() {
        let mut metadata = PackageMetadata::default();
        metadata.add_mapping(
            ArtifactId::of("gid:aid").unwrap().with_namespace("ns"),
            ArtifactId::of("JPP:aid").unwrap(),
        );
        metadata.add_mapping(
            ArtifactId::of("gid:aid:pom:tests:1.0").unwrap(),
            ArtifactId::of("JPP/sub:aid:pom:tests:1.0").unwrap(),
        );

        let xml = metadata.to_xml().unwrap();
        assert!(xml.starts_with("<?xml"));

        let mappings = parse_fragment(&xml).unwrap();
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[0].namespace, "ns");
        assert_eq!(mappings[0].from.to_string(), "gid:aid:jar:SYSTEM");
        assert_eq!(mappings[1].to.to_string(), "JPP/sub:aid:pom:tests:1.0");
    }

    #[test]
    fn test_duplicate_mappings_are_dropped() {
        let mut metadata = PackageMetadata::default();
        let from = ArtifactId::of("gid:aid").unwrap();
        let to = ArtifactId::of("JPP:aid").unwrap();
        metadata.add_mapping(from.clone(), to.clone());
        metadata.add_mapping(from.clone(), to.clone());
        metadata.add_mapping(from.with_namespace("ns"), to);

        assert_eq!(metadata.mappings().len(), 2);
    }

    #[test]
    fn test_skipped_artifacts_are_listed() {
        let mut metadata = PackageMetadata::default();
        metadata.add_skipped(ArtifactId::of("gid:skipped").unwrap());
        assert!(!metadata.is_empty());

        let root = Element::parse(&metadata.to_xml().unwrap()).unwrap();
        let skipped = root.descendants("skippedArtifact");
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].child_text("artifactId"), Some("skipped"));
        assert!(root.descendants("dependency").is_empty());
    }
}

// src/repository/condition.rs

//! Repository filter conditions
//!
//! A `<filter>` element holds exactly one boolean expression:
//!
//! ```xml
//! <filter>
//!   <and>
//!     <equals><extension/><string>so</string></equals>
//!     <defined>native</defined>
//!   </and>
//! </filter>
//! ```
//!
//! Boolean expressions: `true`, `false`, `not`, `and`, `or`, `xor`, `equals`
//! and `defined`. String expressions: `groupId`, `artifactId`, `extension`,
//! `classifier`, `version`, `string`, `property` and `null`.

use super::ArtifactContext;
use crate::artifact::ArtifactId;
use crate::error::{Error, Result};
use crate::xml::Element;

/// Compiled boolean expression evaluated against an artifact and its context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Literal(bool),
    Not(Box<Condition>),
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Xor(Box<Condition>, Box<Condition>),
    Equals(StringExpr, StringExpr),
    Defined(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringExpr {
    GroupId,
    ArtifactId,
    Extension,
    Classifier,
    Version,
    Literal(String),
    Property(String),
    Null,
}

impl Default for Condition {
    fn default() -> Self {
        Condition::Literal(true)
    }
}

impl Condition {
    /// Compile a `<filter>` element; a missing filter always holds
    pub fn from_filter(filter: Option<&Element>) -> Result<Self> {
        let Some(filter) = filter else {
            return Ok(Self::default());
        };

        require_children(filter, 1)?;
        parse_boolean(&filter.children[0])
    }

    pub fn evaluate(&self, artifact: &ArtifactId, context: &ArtifactContext) -> bool {
        match self {
            Condition::Literal(value) => *value,
            Condition::Not(inner) => !inner.evaluate(artifact, context),
            Condition::And(terms) => terms.iter().all(|t| t.evaluate(artifact, context)),
            Condition::Or(terms) => terms.iter().any(|t| t.evaluate(artifact, context)),
            Condition::Xor(left, right) => {
                left.evaluate(artifact, context) != right.evaluate(artifact, context)
            }
            Condition::Equals(left, right) => {
                left.evaluate(artifact, context) == right.evaluate(artifact, context)
            }
            Condition::Defined(name) => context.property(name).is_some(),
        }
    }
}

impl StringExpr {
    fn evaluate<'a>(&'a self, artifact: &'a ArtifactId, context: &'a ArtifactContext) -> Option<&'a str> {
        match self {
            StringExpr::GroupId => Some(artifact.group_id()),
            StringExpr::ArtifactId => Some(artifact.artifact_id()),
            StringExpr::Extension => Some(artifact.extension()),
            StringExpr::Classifier => Some(artifact.classifier()),
            StringExpr::Version => Some(artifact.version()),
            StringExpr::Literal(value) => Some(value),
            StringExpr::Property(name) => context.property(name),
            StringExpr::Null => None,
        }
    }
}

fn invalid(message: String) -> Error {
    Error::Configuration(format!("Invalid repository filter: {}", message))
}

fn require_text(element: &Element, required: bool) -> Result<()> {
    let has_text = !element.text().is_empty();
    match (required, has_text) {
        (true, false) => Err(invalid(format!("<{}> must have text content", element.name))),
        (false, true) => Err(invalid(format!("<{}> does not allow text content", element.name))),
        _ => Ok(()),
    }
}

fn require_children(element: &Element, count: usize) -> Result<()> {
    if element.children.len() == count {
        return Ok(());
    }
    Err(invalid(match count {
        0 => format!("<{}> does not allow child elements", element.name),
        1 => format!("<{}> requires exactly one child element", element.name),
        n => format!("<{}> must have exactly {} child elements", element.name, n),
    }))
}

fn require_at_least(element: &Element, count: usize) -> Result<()> {
    if element.children.len() >= count {
        return Ok(());
    }
    Err(invalid(format!(
        "<{}> requires at least {} child elements",
        element.name, count
    )))
}

fn leaf(element: &Element, text: bool) -> Result<()> {
    require_text(element, text)?;
    require_children(element, 0)
}

fn parse_boolean(element: &Element) -> Result<Condition> {
    match element.name.as_str() {
        "true" => leaf(element, false).map(|_| Condition::Literal(true)),
        "false" => leaf(element, false).map(|_| Condition::Literal(false)),
        "not" => {
            require_text(element, false)?;
            require_children(element, 1)?;
            Ok(Condition::Not(Box::new(parse_boolean(&element.children[0])?)))
        }
        "and" | "or" => {
            require_text(element, false)?;
            require_at_least(element, 2)?;
            let terms = element
                .children
                .iter()
                .map(parse_boolean)
                .collect::<Result<Vec<_>>>()?;
            Ok(if element.name == "and" {
                Condition::And(terms)
            } else {
                Condition::Or(terms)
            })
        }
        "xor" => {
            require_text(element, false)?;
            require_children(element, 2)?;
            Ok(Condition::Xor(
                Box::new(parse_boolean(&element.children[0])?),
                Box::new(parse_boolean(&element.children[1])?),
            ))
        }
        "equals" => {
            require_text(element, false)?;
            require_children(element, 2)?;
            Ok(Condition::Equals(
                parse_string(&element.children[0])?,
                parse_string(&element.children[1])?,
            ))
        }
        "defined" => {
            leaf(element, true)?;
            Ok(Condition::Defined(element.text().to_string()))
        }
        other => Err(invalid(format!("unknown boolean expression <{}>", other))),
    }
}

fn parse_string(element: &Element) -> Result<StringExpr> {
    let field = |expr: StringExpr| leaf(element, false).map(|_| expr);

    match element.name.as_str() {
        "groupId" => field(StringExpr::GroupId),
        "artifactId" => field(StringExpr::ArtifactId),
        "extension" => field(StringExpr::Extension),
        "classifier" => field(StringExpr::Classifier),
        "version" => field(StringExpr::Version),
        "null" => field(StringExpr::Null),
        "string" => {
            leaf(element, true)?;
            Ok(StringExpr::Literal(element.text().to_string()))
        }
        "property" => {
            leaf(element, true)?;
            Ok(StringExpr::Property(element.text().to_string()))
        }
        other => Err(invalid(format!("unknown string expression <{}>", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condition(xml: &str) -> Result<Condition> {
        let filter = Element::parse(xml).unwrap();
        Condition::from_filter(Some(&filter))
    }

    fn artifact() -> ArtifactId {
        ArtifactId::of("org.example:lib:so:1.0").unwrap()
    }

    #[test]
    fn test_missing_filter_always_holds() {
        let cond = Condition::from_filter(None).unwrap();
        assert!(cond.evaluate(&artifact(), &ArtifactContext::default()));
    }

    #[test]
    fn test_literals_and_connectives() {
        let ctx = ArtifactContext::default();
        let eval = |xml: &str| condition(xml).unwrap().evaluate(&artifact(), &ctx);

        assert!(eval("<filter><true/></filter>"));
        assert!(!eval("<filter><false/></filter>"));
        assert!(eval("<filter><not><false/></not></filter>"));
        assert!(!eval("<filter><and><true/><true/><false/></and></filter>"));
        assert!(eval("<filter><or><false/><true/></or></filter>"));
        assert!(eval("<filter><xor><false/><true/></xor></filter>"));
        assert!(!eval("<filter><xor><true/><true/></xor></filter>"));
    }

    #[test]
    fn test_equals_on_fields_and_properties() {
        let ctx = ArtifactContext::default().with_property("native", "true");
        let eval = |xml: &str| condition(xml).unwrap().evaluate(&artifact(), &ctx);

        assert!(eval("<filter><equals><extension/><string>so</string></equals></filter>"));
        assert!(!eval("<filter><equals><groupId/><string>other</string></equals></filter>"));
        assert!(eval("<filter><equals><property>native</property><string>true</string></equals></filter>"));
        assert!(eval("<filter><equals><property>missing</property><null/></equals></filter>"));
        assert!(eval("<filter><defined>native</defined></filter>"));
        assert!(!eval("<filter><defined>missing</defined></filter>"));
    }

    #[test]
    fn test_malformed_conditions_are_rejected() {
        for xml in [
            "<filter/>",
            "<filter><true/><true/></filter>",
            "<filter><true>x</true></filter>",
            "<filter><not/></filter>",
            "<filter><and><true/></and></filter>",
            "<filter><equals><groupId/></equals></filter>",
            "<filter><defined/></filter>",
            "<filter><maybe/></filter>",
            "<filter><equals><groupId/><number>1</number></equals></filter>",
        ] {
            assert!(
                matches!(condition(xml), Err(Error::Configuration(_))),
                "expected rejection of {}",
                xml
            );
        }
    }
}

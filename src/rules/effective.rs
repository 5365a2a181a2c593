// src/rules/effective.rs

//! Folding applicable packaging rules into one effective rule

use crate::artifact::ArtifactId;
use crate::config::{ArtifactGlob, PackagingRule};
use crate::error::{Error, Result};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref BACKREFERENCE: Regex = Regex::new(r"@(\d+)").unwrap();
}

/// Packaging decision for one concrete artifact
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectiveRule {
    /// Package receiving the artifact; `None` means the main package
    pub target_package: Option<String>,
    /// Repository receiving the payload; `None` means the default one
    pub target_repository: Option<String>,
    /// Extra file name templates, backreferences already expanded
    pub files: Vec<String>,
    /// Extra version templates, backreferences already expanded
    pub versions: Vec<String>,
    /// Additional identities the artifact is installed as
    pub aliases: Vec<ArtifactId>,
}

impl EffectiveRule {
    /// Fold one applicable rule into this effective rule
    ///
    /// `captures` holds every capture group of the rule's matchers, numbered
    /// from `@1` in field order.
    pub(super) fn apply(
        &mut self,
        artifact: &ArtifactId,
        rule: &PackagingRule,
        captures: &[String],
    ) -> Result<()> {
        if let Some(template) = rule.target_package.as_deref().filter(|t| !t.is_empty()) {
            let package = expand_backreferences(template, captures);
            match self.target_package.as_deref() {
                None | Some("") => self.target_package = Some(package),
                Some(existing) if existing == package => {}
                Some(existing) => {
                    return Err(Error::PackageConflict {
                        artifact: artifact.to_string(),
                        first: existing.to_string(),
                        second: package,
                    });
                }
            }
        }

        if self.target_repository.is_none() {
            self.target_repository = rule
                .target_repository
                .as_deref()
                .filter(|r| !r.is_empty())
                .map(|r| expand_backreferences(r, captures));
        }

        for template in &rule.aliases {
            let alias = expand_alias(artifact, template, captures)?;
            if !self.aliases.contains(&alias) {
                self.aliases.push(alias);
            }
        }

        push_expanded(&mut self.files, &rule.files, captures);
        push_expanded(&mut self.versions, &rule.versions, captures);

        Ok(())
    }
}

fn push_expanded(target: &mut Vec<String>, templates: &[String], captures: &[String]) {
    for template in templates {
        let value = expand_backreferences(template, captures);
        if !target.contains(&value) {
            target.push(value);
        }
    }
}

/// Replace every `@N` token with the N-th capture (1-based) and trim
///
/// Tokens referring to a capture that does not exist are left as written.
pub fn expand_backreferences(template: &str, captures: &[String]) -> String {
    BACKREFERENCE
        .replace_all(template, |caps: &Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|index| captures.get(index))
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .trim()
        .to_string()
}

fn expand_alias(
    artifact: &ArtifactId,
    template: &ArtifactGlob,
    captures: &[String],
) -> Result<ArtifactId> {
    let field = |value: &str, inherited: &str| {
        let expanded = expand_backreferences(value, captures);
        if expanded.is_empty() {
            inherited.to_string()
        } else {
            expanded
        }
    };

    let alias = ArtifactId::new(
        &field(&template.group_id, artifact.group_id()),
        &field(&template.artifact_id, artifact.artifact_id()),
        &field(&template.extension, artifact.extension()),
        &field(&template.classifier, artifact.classifier()),
        &field(&template.version, artifact.version()),
    )?;

    let stereotype = field(&template.stereotype, artifact.stereotype().unwrap_or_default());
    Ok(alias.with_stereotype(&stereotype))
}

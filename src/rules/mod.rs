// src/rules/mod.rs

//! Packaging rule resolution
//!
//! This module provides:
//! - Glob compilation for rule patterns (`glob`)
//! - The rule engine that folds every applicable rule into one
//!   [`EffectiveRule`] per artifact, and reports mandatory rules that
//!   never matched anything

mod effective;
mod glob;

pub use effective::{expand_backreferences, EffectiveRule};
pub use glob::{glob_to_regex, GlobMatcher};

use crate::artifact::ArtifactId;
use crate::config::PackagingRule;
use crate::error::{Error, Result};
use tracing::{debug, error};

/// Rule with its glob fields compiled
///
/// Matchers are kept in the fixed field order stereotype, groupId,
/// artifactId, extension, classifier, version. Backreference numbering
/// depends on that order.
#[derive(Debug)]
struct CompiledRule {
    rule: PackagingRule,
    matchers: Vec<(Field, GlobMatcher)>,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Stereotype,
    GroupId,
    ArtifactId,
    Extension,
    Classifier,
    Version,
}

impl Field {
    fn value(self, artifact: &ArtifactId) -> &str {
        match self {
            Field::Stereotype => artifact.stereotype().unwrap_or_default(),
            Field::GroupId => artifact.group_id(),
            Field::ArtifactId => artifact.artifact_id(),
            Field::Extension => artifact.extension(),
            Field::Classifier => artifact.classifier(),
            Field::Version => artifact.version(),
        }
    }
}

impl CompiledRule {
    fn compile(rule: PackagingRule) -> Result<Self> {
        let glob = &rule.artifact_glob;
        let fields = [
            (Field::Stereotype, &glob.stereotype),
            (Field::GroupId, &glob.group_id),
            (Field::ArtifactId, &glob.artifact_id),
            (Field::Extension, &glob.extension),
            (Field::Classifier, &glob.classifier),
            (Field::Version, &glob.version),
        ];

        let mut matchers = Vec::new();
        for (field, pattern) in fields {
            if let Some(matcher) = GlobMatcher::compile(pattern)? {
                matchers.push((field, matcher));
            }
        }

        Ok(Self { rule, matchers })
    }

    /// Captures of every matcher in order, or `None` if any field fails
    fn captures(&self, artifact: &ArtifactId) -> Option<Vec<String>> {
        let mut captures = Vec::new();
        for (field, matcher) in &self.matchers {
            captures.extend(matcher.captures(field.value(artifact))?);
        }
        Some(captures)
    }
}

/// Resolves effective packaging rules for a sequence of artifacts
///
/// The engine remembers which rules applied to at least one artifact so
/// that mandatory rules that never matched can be reported once the run is
/// over.
#[derive(Debug)]
pub struct RuleEngine {
    rules: Vec<CompiledRule>,
}

impl RuleEngine {
    /// Compile an ordered rule list; a malformed glob aborts
    pub fn new(rules: Vec<PackagingRule>) -> Result<Self> {
        let rules = rules
            .into_iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Fold every rule applicable to `artifact` into one effective rule
    pub fn effective_rule(&mut self, artifact: &ArtifactId) -> Result<EffectiveRule> {
        // Every applicable rule is marked before folding, so a conflict
        // does not leave later rules looking unmatched.
        let mut applicable = Vec::new();
        for (index, compiled) in self.rules.iter_mut().enumerate() {
            let Some(captures) = compiled.captures(artifact) else {
                continue;
            };

            debug!(
                "Packaging rule {} applies to {}",
                compiled.rule.artifact_glob, artifact
            );
            compiled.rule.matched = true;
            applicable.push((index, captures));
        }

        let mut effective = EffectiveRule::default();
        for (index, captures) in applicable {
            effective.apply(artifact, &self.rules[index].rule, &captures)?;
        }

        Ok(effective)
    }

    /// Rules in authoring order, with their matched markers
    pub fn rules(&self) -> impl Iterator<Item = &PackagingRule> {
        self.rules.iter().map(|c| &c.rule)
    }

    /// Mandatory rules that have not matched any artifact so far
    pub fn unmatched_rules(&self) -> Vec<&PackagingRule> {
        self.rules()
            .filter(|rule| !rule.optional && !rule.matched)
            .collect()
    }

    /// Fail with every unmatched mandatory rule listed
    pub fn check_unmatched(&self) -> Result<()> {
        let unmatched = self.unmatched_rules();
        if unmatched.is_empty() {
            return Ok(());
        }

        let globs: Vec<String> = unmatched
            .iter()
            .map(|rule| rule.artifact_glob.to_string())
            .collect();
        for glob in &globs {
            error!("Unmatched packaging rule: {}", glob);
        }

        Err(Error::UnmatchedRules(globs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArtifactGlob;

    fn rule(glob: ArtifactGlob) -> PackagingRule {
        PackagingRule {
            artifact_glob: glob,
            ..Default::default()
        }
    }

    fn artifact(coordinates: &str) -> ArtifactId {
        ArtifactId::of(coordinates).unwrap()
    }

    #[test]
    fn test_rule_without_globs_matches_everything() {
        let mut engine = RuleEngine::new(vec![PackagingRule {
            target_package: Some("all".to_string()),
            ..Default::default()
        }])
        .unwrap();

        let effective = engine.effective_rule(&artifact("a:b")).unwrap();
        assert_eq!(effective.target_package.as_deref(), Some("all"));
        assert!(engine.unmatched_rules().is_empty());
    }

    #[test]
    fn test_backreferences_span_fields_in_order() {
        let mut engine = RuleEngine::new(vec![PackagingRule {
            artifact_glob: ArtifactGlob {
                group_id: "org.{foo,bar}".to_string(),
                artifact_id: "{*}-{core,api}".to_string(),
                ..Default::default()
            },
            target_package: Some("@1-@2-@3".to_string()),
            files: vec!["@2/@3".to_string()],
            ..Default::default()
        }])
        .unwrap();

        let effective = engine.effective_rule(&artifact("org.bar:lib-api")).unwrap();
        assert_eq!(effective.target_package.as_deref(), Some("bar-lib-api"));
        assert_eq!(effective.files, ["lib/api"]);
    }

    #[test]
    fn test_stereotype_is_matched_first() {
        let mut engine = RuleEngine::new(vec![PackagingRule {
            artifact_glob: ArtifactGlob {
                stereotype: "{native}".to_string(),
                artifact_id: "{*}".to_string(),
                ..Default::default()
            },
            target_package: Some("@2-@1".to_string()),
            ..Default::default()
        }])
        .unwrap();

        let plain = engine.effective_rule(&artifact("g:x")).unwrap();
        assert!(plain.target_package.is_none());

        let native = engine
            .effective_rule(&artifact("g:x").with_stereotype("native"))
            .unwrap();
        assert_eq!(native.target_package.as_deref(), Some("x-native"));
    }

    #[test]
    fn test_first_target_package_wins_and_conflicts_abort() {
        let mut engine = RuleEngine::new(vec![
            PackagingRule {
                artifact_glob: ArtifactGlob {
                    artifact_id: "{a,b}".to_string(),
                    ..Default::default()
                },
                target_package: Some("pkg-@1".to_string()),
                ..Default::default()
            },
            PackagingRule {
                artifact_glob: ArtifactGlob {
                    artifact_id: "b".to_string(),
                    ..Default::default()
                },
                target_package: Some("other".to_string()),
                ..Default::default()
            },
        ])
        .unwrap();

        let a = engine.effective_rule(&artifact("g:a")).unwrap();
        assert_eq!(a.target_package.as_deref(), Some("pkg-a"));

        let b = engine.effective_rule(&artifact("g:b"));
        assert!(matches!(b, Err(Error::PackageConflict { .. })));
    }

    #[test]
    fn test_conflict_still_marks_every_applicable_rule() {
        let mut engine = RuleEngine::new(vec![
            PackagingRule {
                target_package: Some("first".to_string()),
                ..Default::default()
            },
            PackagingRule {
                target_package: Some("second".to_string()),
                ..Default::default()
            },
            rule(ArtifactGlob {
                artifact_id: "x".to_string(),
                ..Default::default()
            }),
        ])
        .unwrap();

        let result = engine.effective_rule(&artifact("g:x"));
        assert!(matches!(result, Err(Error::PackageConflict { .. })));
        assert!(engine.unmatched_rules().is_empty());
        assert!(engine.check_unmatched().is_ok());
    }

    #[test]
    fn test_unmatched_stereotype_rule_is_distinguishable() {
        let engine = RuleEngine::new(vec![rule(ArtifactGlob {
            stereotype: "native".to_string(),
            ..Default::default()
        })])
        .unwrap();

        match engine.check_unmatched() {
            Err(Error::UnmatchedRules(globs)) => assert_eq!(globs, ["::::: [native]"]),
            other => panic!("expected unmatched rules, got {:?}", other),
        }
    }

    #[test]
    fn test_aliases_are_collected_without_duplicates() {
        let alias = ArtifactGlob {
            group_id: "alias".to_string(),
            ..Default::default()
        };
        let mut engine = RuleEngine::new(vec![
            PackagingRule {
                aliases: vec![alias.clone()],
                ..Default::default()
            },
            PackagingRule {
                aliases: vec![alias],
                ..Default::default()
            },
        ])
        .unwrap();

        let effective = engine.effective_rule(&artifact("g:a:1.0")).unwrap();
        assert_eq!(effective.aliases.len(), 1);
        assert_eq!(effective.aliases[0].to_string(), "alias:a:jar:1.0");
    }

    #[test]
    fn test_unmatched_mandatory_rules_are_reported() {
        let mut engine = RuleEngine::new(vec![
            rule(ArtifactGlob {
                artifact_id: "used".to_string(),
                ..Default::default()
            }),
            rule(ArtifactGlob {
                artifact_id: "unused".to_string(),
                ..Default::default()
            }),
            PackagingRule {
                artifact_glob: ArtifactGlob {
                    artifact_id: "optional".to_string(),
                    ..Default::default()
                },
                optional: true,
                ..Default::default()
            },
        ])
        .unwrap();

        engine.effective_rule(&artifact("g:used")).unwrap();

        match engine.check_unmatched() {
            Err(Error::UnmatchedRules(globs)) => assert_eq!(globs, [":unused:::"]),
            other => panic!("expected unmatched rules, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_glob_aborts_engine_construction() {
        let result = RuleEngine::new(vec![rule(ArtifactGlob {
            group_id: "{oops".to_string(),
            ..Default::default()
        })]);
        assert!(matches!(result, Err(Error::Glob { .. })));
    }
}

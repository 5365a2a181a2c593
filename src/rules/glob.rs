// src/rules/glob.rs

//! Glob patterns used in packaging rules
//!
//! Syntax: `?` matches one character, `*` any run of characters, `{a,b}`
//! an alternation that also becomes a capture group, and `\` takes the next
//! character literally. Everything else matches itself.

use crate::error::{Error, Result};
use regex::Regex;

/// Translate a glob into an anchored regular expression source
///
/// Returns `Ok(None)` for an empty glob, which places no constraint on the
/// matched field.
pub fn glob_to_regex(glob: &str) -> Result<Option<String>> {
    if glob.is_empty() {
        return Ok(None);
    }

    let invalid = |reason: &str| Error::Glob {
        glob: glob.to_string(),
        reason: reason.to_string(),
    };

    let mut regex = String::with_capacity(glob.len() * 2 + 2);
    regex.push('^');

    let mut in_alternative = false;
    let mut chars = glob.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => push_literal(&mut regex, escaped),
                None => return Err(invalid("escape sequence ends prematurely")),
            },
            '?' => regex.push('.'),
            '*' => regex.push_str(".*"),
            '{' if in_alternative => return Err(invalid("nested alternatives are not supported")),
            '{' => {
                in_alternative = true;
                regex.push('(');
            }
            ',' if in_alternative => regex.push('|'),
            '}' if in_alternative => {
                in_alternative = false;
                regex.push(')');
            }
            '}' => return Err(invalid("alternative closed without being opened")),
            other => push_literal(&mut regex, other),
        }
    }

    if in_alternative {
        return Err(invalid("alternative not closed"));
    }

    regex.push('$');
    Ok(Some(regex))
}

fn push_literal(regex: &mut String, c: char) {
    let mut buf = [0u8; 4];
    regex.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

/// Compiled glob pattern
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    glob: String,
    regex: Regex,
}

impl GlobMatcher {
    /// Compile a glob; an empty glob yields `Ok(None)` ("matches anything")
    pub fn compile(glob: &str) -> Result<Option<Self>> {
        let Some(source) = glob_to_regex(glob)? else {
            return Ok(None);
        };

        let regex = Regex::new(&source).map_err(|e| Error::Glob {
            glob: glob.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Some(Self {
            glob: glob.to_string(),
            regex,
        }))
    }

    /// The glob this matcher was compiled from
    pub fn glob(&self) -> &str {
        &self.glob
    }

    pub fn is_match(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }

    /// Match `input` and return the text of every capture group in order
    ///
    /// Groups that did not participate in the match yield an empty string.
    pub fn captures(&self, input: &str) -> Option<Vec<String>> {
        let captures = self.regex.captures(input)?;
        Some(
            captures
                .iter()
                .skip(1)
                .map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect(),
        )
    }
}

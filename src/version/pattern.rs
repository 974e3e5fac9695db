//! Regular expressions that locate version-bearing objects
//!
//! A pattern such as `folder/file-(.*).tgz` serves three purposes:
//! - its leading literal directories become the listing prefix (`folder/`)
//! - anchored, it filters listed object names
//! - unanchored, its capturing group yields the raw version text

use regex::Regex;

use crate::version::error::VersionError;

/// Characters that carry meaning in a regular expression when unescaped.
const REGEXP_SPECIAL_CHARS: &[char] = &[
    '\\', '*', '.', '[', ']', '(', ')', '{', '}', '?', '|', '^', '$', '+',
];

/// Name of the capturing group preferred when a pattern has several groups.
const VERSION_GROUP_NAME: &str = "version";

/// Compute the literal listing prefix of a pattern.
///
/// Walks the `/`-separated sections and keeps every leading section that
/// contains only plain characters or escaped special characters, unescaping
/// them. Stops at the first section containing regexp syntax.
///
/// Examples:
/// - "folder/file-(.*).tgz" -> "folder/"
/// - "a/b\.c/d-(.*)" -> "a/b.c/"
/// - "(.*).tgz" -> ""
pub fn compute_prefix(pattern: &str) -> String {
    let literal_sections: Vec<String> = pattern
        .split('/')
        .map_while(unescape_literal_section)
        .collect();

    if literal_sections.is_empty() {
        return String::new();
    }

    format!("{}/", literal_sections.join("/"))
}

fn unescape_literal_section(section: &str) -> Option<String> {
    let mut literal = String::with_capacity(section.len());
    let mut chars = section.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(escaped) if is_special(escaped) => literal.push(escaped),
                _ => return None,
            }
        } else if is_special(c) {
            return None;
        } else {
            literal.push(c);
        }
    }

    Some(literal)
}

fn is_special(c: char) -> bool {
    REGEXP_SPECIAL_CHARS.contains(&c)
}

/// A compiled version pattern
#[derive(Debug, Clone)]
pub struct VersionPattern {
    source: String,
    anchored: Regex,
    unanchored: Regex,
    version_group: Option<usize>,
}

impl VersionPattern {
    /// Compile a pattern, failing with [`VersionError::Pattern`] when it is not
    /// a valid regular expression.
    pub fn new(pattern: &str) -> Result<Self, VersionError> {
        let unanchored = Regex::new(pattern)?;
        let anchored = Regex::new(&format!("^{}$", pattern))?;

        let version_group = match unanchored.captures_len() {
            // only the implicit whole-match group
            1 => None,
            2 => Some(1),
            _ => Some(
                unanchored
                    .capture_names()
                    .position(|name| name == Some(VERSION_GROUP_NAME))
                    .unwrap_or(1),
            ),
        };

        Ok(Self {
            source: pattern.to_string(),
            anchored,
            unanchored,
            version_group,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Literal listing prefix, see [`compute_prefix`]
    pub fn prefix(&self) -> String {
        compute_prefix(&self.source)
    }

    /// Everything up to and including the final `/` of the pattern text.
    ///
    /// Returns an empty string when the pattern has no `/`.
    pub fn parent_dir(&self) -> &str {
        match self.source.rfind('/') {
            Some(index) => &self.source[..=index],
            None => "",
        }
    }

    /// Whether `name` matches the whole pattern
    pub fn is_match(&self, name: &str) -> bool {
        self.anchored.is_match(name)
    }

    /// Names that match the whole pattern, in input order
    pub fn match_names<'a>(&self, names: &'a [String]) -> Vec<&'a str> {
        names
            .iter()
            .map(String::as_str)
            .filter(|name| self.is_match(name))
            .collect()
    }

    /// Raw version text captured from `path`.
    ///
    /// Uses the group named `version` when the pattern has several groups,
    /// otherwise the first group. Returns `None` when the pattern has no
    /// capturing group or does not match `path`. A group that did not take
    /// part in the match yields an empty string.
    pub fn extract_version_text<'p>(&self, path: &'p str) -> Option<&'p str> {
        let group = self.version_group?;
        let captures = self.unanchored.captures(path)?;
        Some(captures.get(group).map_or("", |m| m.as_str()))
    }
}

impl PartialEq for VersionPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for VersionPattern {}

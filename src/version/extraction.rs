//! Versions extracted from object names

use crate::version::error::VersionError;
use crate::version::pattern::VersionPattern;
use crate::version::value::VersionValue;

/// A version-bearing object name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Path of the object in the bucket
    pub path: String,
    /// Parsed version
    pub version: VersionValue,
    /// Raw text captured by the pattern
    pub version_text: String,
}

impl Extraction {
    /// Extract the version of a single path.
    ///
    /// Returns `Ok(None)` when the pattern captures nothing from `path`, and an
    /// error when the captured text is not a valid version.
    pub fn from_path(path: &str, pattern: &VersionPattern) -> Result<Option<Self>, VersionError> {
        let Some(text) = pattern.extract_version_text(path) else {
            return Ok(None);
        };

        let version = VersionValue::parse(text)?;

        Ok(Some(Self {
            path: path.to_string(),
            version,
            version_text: text.to_string(),
        }))
    }
}

/// Collection of extractions, ordered ascending once sorted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionSet {
    extractions: Vec<Extraction>,
}

impl ExtractionSet {
    /// Extract versions from every listed name that matches `pattern`.
    ///
    /// Names the pattern captures nothing from are skipped; captured text that
    /// fails to parse aborts the whole build. The result keeps input order.
    pub fn build(names: &[String], pattern: &VersionPattern) -> Result<Self, VersionError> {
        let mut extractions = Vec::new();
        for name in pattern.match_names(names) {
            if let Some(extraction) = Extraction::from_path(name, pattern)? {
                extractions.push(extraction);
            }
        }

        Ok(Self { extractions })
    }

    /// Stable ascending sort by version
    pub fn sort_ascending(&mut self) {
        self.extractions.sort_by(|a, b| a.version.cmp(&b.version));
    }

    /// Put `extraction` in front of all others
    pub fn prepend(&mut self, extraction: Extraction) {
        self.extractions.insert(0, extraction);
    }

    /// Last extraction, the newest once sorted
    pub fn latest(&self) -> Option<&Extraction> {
        self.extractions.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Extraction> {
        self.extractions.iter()
    }

    pub fn len(&self) -> usize {
        self.extractions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractions.is_empty()
    }
}

impl From<Vec<Extraction>> for ExtractionSet {
    fn from(extractions: Vec<Extraction>) -> Self {
        Self { extractions }
    }
}

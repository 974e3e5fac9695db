//! Pattern-mode version selector

use tracing::debug;

use crate::version::error::VersionError;
use crate::version::extraction::{Extraction, ExtractionSet};
use crate::version::pattern::VersionPattern;
use crate::version::selector::VersionSelector;
use crate::version::types::ObservedVersion;

/// Selects new object paths from a sorted extraction set
///
/// Reports every path whose version is strictly newer than the previous
/// path's. Without a usable previous path only the latest path is reported.
pub struct PatternVersionSelector<'a> {
    candidates: &'a ExtractionSet,
    pattern: &'a VersionPattern,
}

impl<'a> PatternVersionSelector<'a> {
    pub fn new(candidates: &'a ExtractionSet, pattern: &'a VersionPattern) -> Self {
        Self {
            candidates,
            pattern,
        }
    }
}

impl VersionSelector for PatternVersionSelector<'_> {
    fn select_new(
        &self,
        previous: Option<&ObservedVersion>,
    ) -> Result<Vec<ObservedVersion>, VersionError> {
        let Some(latest) = self.candidates.latest() else {
            return Ok(vec![]);
        };

        let previous = match previous.and_then(ObservedVersion::path) {
            Some(path) => Extraction::from_path(path, self.pattern)?,
            None => None,
        };

        let Some(previous) = previous else {
            debug!("No usable previous path, reporting latest {}", latest.path);
            return Ok(vec![ObservedVersion::Path(latest.path.clone())]);
        };

        Ok(self
            .candidates
            .iter()
            .filter(|extraction| extraction.version > previous.version)
            .map(|extraction| ObservedVersion::Path(extraction.path.clone()))
            .collect())
    }
}

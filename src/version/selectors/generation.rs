//! Generation-mode version selector

use crate::version::error::VersionError;
use crate::version::selector::VersionSelector;
use crate::version::types::ObservedVersion;

/// Selects new generations of a single object
///
/// Unlike pattern mode there is no fallback to the latest generation once a
/// previous generation is known: nothing newer means nothing to report.
pub struct GenerationVersionSelector {
    generations: Vec<i64>,
}

impl GenerationVersionSelector {
    pub fn new(generations: Vec<i64>) -> Self {
        Self { generations }
    }
}

impl VersionSelector for GenerationVersionSelector {
    fn select_new(
        &self,
        previous: Option<&ObservedVersion>,
    ) -> Result<Vec<ObservedVersion>, VersionError> {
        let Some(previous) = previous.and_then(ObservedVersion::generation) else {
            return Ok(self
                .generations
                .iter()
                .max()
                .map(|max| vec![ObservedVersion::Generation(*max)])
                .unwrap_or_default());
        };

        let mut newer: Vec<i64> = self
            .generations
            .iter()
            .copied()
            .filter(|generation| *generation > previous)
            .collect();
        newer.sort_unstable();

        Ok(newer.into_iter().map(ObservedVersion::Generation).collect())
    }
}

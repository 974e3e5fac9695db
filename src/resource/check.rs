//! `check`: report versions newer than the last observed one

use tracing::info;

use crate::config::{AddressingMode, SourceConfig};
use crate::resource::bucket_extractions;
use crate::resource::error::ResourceError;
use crate::resource::models::{CheckRequest, CheckResponse};
use crate::storage::Storage;
use crate::version::extraction::Extraction;
use crate::version::pattern::VersionPattern;
use crate::version::selector::VersionSelector;
use crate::version::selectors::{GenerationVersionSelector, PatternVersionSelector};
use crate::version::types::ObservedVersion;

pub struct CheckCommand<'a, S: Storage> {
    storage: &'a S,
}

impl<'a, S: Storage> CheckCommand<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// Returns new versions, oldest first. An empty result is not an error.
    pub async fn run(&self, request: &CheckRequest) -> Result<CheckResponse, ResourceError> {
        let config = SourceConfig::try_from(&request.source)?;
        let previous = request.version.as_ref();

        let versions = match &config.mode {
            AddressingMode::Pattern(pattern) => {
                self.check_by_pattern(&config, pattern, previous).await?
            }
            AddressingMode::FixedObject(path) => {
                self.check_by_generation(&config, path, previous).await?
            }
        };

        info!("Found {} new version(s)", versions.len());
        Ok(versions)
    }

    async fn check_by_pattern(
        &self,
        config: &SourceConfig,
        pattern: &VersionPattern,
        previous: Option<&ObservedVersion>,
    ) -> Result<CheckResponse, ResourceError> {
        let mut candidates = bucket_extractions(self.storage, &config.bucket, pattern).await?;

        // Prepended after sorting: a listed object always ranks as latest.
        if let Some(initial) = config.bootstrap.as_ref().and_then(|b| b.version.path())
            && let Some(extraction) = Extraction::from_path(initial, pattern)?
        {
            candidates.prepend(extraction);
        }

        Ok(PatternVersionSelector::new(&candidates, pattern).select_new(previous)?)
    }

    async fn check_by_generation(
        &self,
        config: &SourceConfig,
        path: &str,
        previous: Option<&ObservedVersion>,
    ) -> Result<CheckResponse, ResourceError> {
        let mut generations = self
            .storage
            .list_object_generations(&config.bucket, path)
            .await?;

        if let Some(initial) = config.bootstrap.as_ref().and_then(|b| b.version.generation()) {
            generations.push(initial);
        }

        Ok(GenerationVersionSelector::new(generations).select_new(previous)?)
    }
}

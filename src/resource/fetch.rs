//! Fetch resolution: what `in` retrieves or materializes, decided without I/O

use crate::config::{AddressingMode, SourceConfig};
use crate::resource::error::ResourceError;
use crate::version::extraction::ExtractionSet;
use crate::version::pattern::VersionPattern;
use crate::version::types::ObservedVersion;

/// A concrete object, generation-qualified in fixed-object mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectTarget {
    pub path: String,
    pub generation: Option<i64>,
}

impl ObjectTarget {
    pub fn path(path: &str) -> Self {
        Self {
            path: path.to_string(),
            generation: None,
        }
    }

    pub fn generation(path: &str, generation: i64) -> Self {
        Self {
            path: path.to_string(),
            generation: Some(generation),
        }
    }

    /// The version reported for this target
    pub fn version(&self) -> ObservedVersion {
        match self.generation {
            Some(generation) => ObservedVersion::Generation(generation),
            None => ObservedVersion::Path(self.path.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchPlan<'a> {
    /// Write the bootstrap content locally; nothing is downloaded
    Materialize {
        target: ObjectTarget,
        content: Vec<u8>,
    },
    /// Download the target from storage
    Download(ObjectTarget),
    /// No path was requested: list the bucket and take the newest match
    Latest(&'a VersionPattern),
}

pub struct FetchResolver<'a> {
    config: &'a SourceConfig,
}

impl<'a> FetchResolver<'a> {
    pub fn new(config: &'a SourceConfig) -> Self {
        Self { config }
    }

    pub fn resolve(&self, requested: Option<&ObservedVersion>) -> Result<FetchPlan<'a>, ResourceError> {
        let target = match &self.config.mode {
            AddressingMode::Pattern(pattern) => match requested.and_then(ObservedVersion::path) {
                Some(path) => ObjectTarget::path(path),
                None => return Ok(FetchPlan::Latest(pattern)),
            },
            AddressingMode::FixedObject(path) => {
                let generation = requested
                    .and_then(ObservedVersion::generation)
                    .ok_or(ResourceError::MissingGeneration)?;
                ObjectTarget::generation(path, generation)
            }
        };

        Ok(match &self.config.bootstrap {
            Some(bootstrap) if bootstrap.version == target.version() => FetchPlan::Materialize {
                target,
                content: bootstrap.content.clone(),
            },
            _ => FetchPlan::Download(target),
        })
    }

    /// The newest extraction of a sorted listing
    pub fn latest(candidates: &ExtractionSet) -> Result<ObjectTarget, ResourceError> {
        candidates
            .latest()
            .map(|extraction| ObjectTarget::path(&extraction.path))
            .ok_or(ResourceError::NoMatch)
    }
}

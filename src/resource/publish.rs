//! Publish resolution: what `out` uploads and how the result is reported

use std::path::{Path, PathBuf};

use globset::GlobBuilder;
use walkdir::WalkDir;

use crate::config::{AddressingMode, SourceConfig};
use crate::resource::error::ResourceError;
use crate::storage::StorageError;
use crate::version::types::ObservedVersion;

/// The local file to upload and the object it becomes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishPlan {
    pub local_path: PathBuf,
    pub destination: String,
}

pub struct PublishResolver<'a> {
    config: &'a SourceConfig,
}

impl<'a> PublishResolver<'a> {
    pub fn new(config: &'a SourceConfig) -> Self {
        Self { config }
    }

    pub fn resolve(&self, source_dir: &Path, file_pattern: &str) -> Result<PublishPlan, ResourceError> {
        let local_path = locate(source_dir, file_pattern)?;
        let destination = self.destination(&local_path);

        Ok(PublishPlan {
            local_path,
            destination,
        })
    }

    /// Pattern mode uploads next to the pattern's directory under the local
    /// file name; fixed-object mode always overwrites the configured path.
    pub fn destination(&self, local_path: &Path) -> String {
        match &self.config.mode {
            AddressingMode::Pattern(pattern) => {
                let file_name = local_path
                    .file_name()
                    .map(|name| name.to_string_lossy())
                    .unwrap_or_default();
                format!("{}{}", pattern.parent_dir(), file_name)
            }
            AddressingMode::FixedObject(path) => path.clone(),
        }
    }

    /// The version reported for an upload to `destination`
    ///
    /// # Arguments
    /// * `destination` - The uploaded object path
    /// * `generation` - Generation returned by the upload, `None` without versioning
    pub fn reported_version(
        &self,
        destination: &str,
        generation: Option<i64>,
    ) -> Result<ObservedVersion, ResourceError> {
        match &self.config.mode {
            AddressingMode::Pattern(_) => Ok(ObservedVersion::Path(destination.to_string())),
            AddressingMode::FixedObject(_) => generation
                .map(ObservedVersion::Generation)
                .ok_or_else(|| StorageError::NotVersioned(self.config.bucket.clone()).into()),
        }
    }
}

/// Lexically cleans a relative glob: empty and `.` segments are dropped and
/// `..` removes the segment before it.
fn clean_pattern(pattern: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in pattern.split('/') {
        match segment {
            "" | "." => {}
            ".." if segments.last().is_some_and(|last| *last != "..") => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }
    segments.join("/")
}

/// Finds the single file under `source_dir` matching `pattern`.
///
/// `*` does not cross directory separators. Directories never match, while
/// symlinks to regular files do.
pub fn locate(source_dir: &Path, pattern: &str) -> Result<PathBuf, ResourceError> {
    let cleaned = clean_pattern(pattern);
    let matcher = GlobBuilder::new(&cleaned)
        .literal_separator(true)
        .build()?
        .compile_matcher();

    let mut walker = WalkDir::new(source_dir)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name();
    if !cleaned.contains("**") {
        walker = walker.max_depth(cleaned.split('/').count());
    }

    let mut matches = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(source_dir) else {
            continue;
        };
        if matcher.is_match(relative) {
            matches.push(entry.into_path());
        }
    }

    match matches.len() {
        0 => Err(ResourceError::NoFile(pattern.to_string())),
        1 => Ok(matches.remove(0)),
        _ => Err(ResourceError::AmbiguousFile {
            pattern: pattern.to_string(),
            matches,
        }),
    }
}

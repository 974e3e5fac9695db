use std::path::PathBuf;

use thiserror::Error;

use crate::archive::ArchiveError;
use crate::config::ConfigError;
use crate::storage::StorageError;
use crate::version::error::VersionError;

/// Errors surfaced by the check, in and out commands
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("no extractions could be found - is your regexp correct?")]
    NoMatch,

    #[error("version.generation is required when versioned_file is set")]
    MissingGeneration,

    #[error("no matches found for pattern: {0}")]
    NoFile(String),

    #[error("more than one match found for pattern: {pattern}\n{matches:?}")]
    AmbiguousFile {
        pattern: String,
        matches: Vec<PathBuf>,
    },

    #[error("invalid file pattern: {0}")]
    FilePattern(#[from] globset::Error),

    #[error("failed to walk source directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

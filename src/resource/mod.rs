//! Resource commands driven by the external scheduler
//!
//! # Architecture
//!
//! ```text
//!   stdin JSON            ┌──────────────┐      ┌─────────────┐
//!  ─────────────▶ models ─▶│ CheckCommand │─────▶│  Selectors  │
//!                         │  InCommand   │─────▶│FetchResolver│
//!                         │  OutCommand  │─────▶│PublishRes.  │
//!                         └──────┬───────┘      └─────────────┘
//!                                │
//!                                ▼
//!                         ┌──────────────┐
//!                         │   Storage    │
//!                         └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`check`]: Reports versions newer than the last observed one
//! - [`in_command`]: Fetches a version into a destination directory
//! - [`out_command`]: Publishes a local file as a new version
//! - [`fetch`]: Decides what a fetch retrieves or materializes
//! - [`publish`]: Decides what a publish uploads and reports
//! - [`models`]: Request and response shapes
//! - [`error`]: Command-level error type

pub mod check;
pub mod error;
pub mod fetch;
pub mod in_command;
pub mod models;
pub mod out_command;
pub mod publish;

use tracing::{debug, warn};

pub use check::CheckCommand;
pub use error::ResourceError;
pub use in_command::InCommand;
pub use out_command::OutCommand;

use crate::storage::Storage;
use crate::version::extraction::ExtractionSet;
use crate::version::pattern::VersionPattern;

/// Last `/`-separated component of an object path
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Lists the bucket once under the pattern's prefix and returns the sorted extractions
pub(crate) async fn bucket_extractions<S: Storage>(
    storage: &S,
    bucket: &str,
    pattern: &VersionPattern,
) -> Result<ExtractionSet, ResourceError> {
    let prefix = pattern.prefix();
    let names = storage.list_object_names(bucket, &prefix).await?;
    debug!("Listed {} objects under '{}'", names.len(), prefix);

    let mut extractions = ExtractionSet::build(&names, pattern)?;
    extractions.sort_ascending();

    Ok(extractions)
}

/// Resolves an object URL, logging and discarding any failure
pub(crate) async fn try_resolve_url<S: Storage>(
    storage: &S,
    bucket: &str,
    path: &str,
    generation: Option<i64>,
) -> Option<String> {
    match storage.resolve_url(bucket, path, generation).await {
        Ok(url) => Some(url),
        Err(e) => {
            warn!("Failed to resolve URL for {}: {}", path, e);
            None
        }
    }
}

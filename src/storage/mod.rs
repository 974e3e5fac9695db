//! Storage capability for fetching and publishing bucket objects
//!
//! The version layer never talks to a backend directly; commands go through
//! the [`Storage`] trait so the backend can be swapped or mocked.
//!
//! # Modules
//!
//! - [`gcs`]: Google Cloud Storage JSON API implementation
//! - [`error`]: Error type for backend operations

pub mod error;
pub mod gcs;

use std::path::Path;

#[cfg(test)]
use mockall::automock;

pub use error::StorageError;
pub use gcs::GcsStorage;

/// Object attributes applied on upload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    pub content_type: Option<String>,
    pub predefined_acl: Option<String>,
    pub cache_control: Option<String>,
}

/// Trait for reading and writing objects in a bucket
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// Lists the names of the live objects whose names start with `prefix`
    async fn list_object_names(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<String>, StorageError>;

    /// Lists every stored generation of the object at `path`
    ///
    /// # Returns
    /// * `Ok(Vec<i64>)` - Generations in backend order
    /// * `Err(StorageError::NotVersioned)` - If the bucket has versioning disabled
    async fn list_object_generations(
        &self,
        bucket: &str,
        path: &str,
    ) -> Result<Vec<i64>, StorageError>;

    /// Uploads `local_path` to `path`
    ///
    /// # Returns
    /// * `Ok(Some(generation))` - In a versioned bucket
    /// * `Ok(None)` - In a bucket without versioning
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        local_path: &Path,
        options: &UploadOptions,
    ) -> Result<Option<i64>, StorageError>;

    /// Downloads `path` (at `generation` when given) into `destination`
    async fn download(
        &self,
        bucket: &str,
        path: &str,
        generation: Option<i64>,
        destination: &Path,
    ) -> Result<(), StorageError>;

    /// Resolves the `gs://` URL of an existing object
    async fn resolve_url(
        &self,
        bucket: &str,
        path: &str,
        generation: Option<i64>,
    ) -> Result<String, StorageError>;

    /// Deletes `path` (only `generation` when given)
    async fn delete(
        &self,
        bucket: &str,
        path: &str,
        generation: Option<i64>,
    ) -> Result<(), StorageError>;
}

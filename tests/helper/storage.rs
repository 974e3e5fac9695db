//! In-memory storage for integration tests

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use gcs_resource::storage::{Storage, StorageError, UploadOptions};

/// First generation handed out by a fresh bucket
const FIRST_GENERATION: i64 = 1000;

#[derive(Debug, Clone)]
struct StoredObject {
    generation: i64,
    content: Vec<u8>,
    options: UploadOptions,
}

#[derive(Debug)]
struct State {
    objects: BTreeMap<String, Vec<StoredObject>>,
    next_generation: i64,
}

/// A single bucket kept in memory.
///
/// Every write gets a new generation. Without versioning only the newest
/// generation of an object is retained.
pub struct FakeStorage {
    bucket: String,
    versioned: bool,
    state: Mutex<State>,
}

impl FakeStorage {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            versioned: true,
            state: Mutex::new(State {
                objects: BTreeMap::new(),
                next_generation: FIRST_GENERATION,
            }),
        }
    }

    pub fn unversioned(mut self) -> Self {
        self.versioned = false;
        self
    }

    pub fn with_object(self, path: &str, content: &[u8]) -> Self {
        self.put(path, content.to_vec(), UploadOptions::default());
        self
    }

    /// Stores a new generation of `path` and returns it
    pub fn put(&self, path: &str, content: Vec<u8>, options: UploadOptions) -> i64 {
        let mut state = self.state.lock().unwrap();
        let generation = state.next_generation;
        state.next_generation += 1;

        let history = state.objects.entry(path.to_string()).or_default();
        if !self.versioned {
            history.clear();
        }
        history.push(StoredObject {
            generation,
            content,
            options,
        });

        generation
    }

    /// Content of the newest generation of `path`
    pub fn content(&self, path: &str) -> Option<Vec<u8>> {
        self.latest(path).map(|object| object.content)
    }

    /// Options the newest generation of `path` was uploaded with
    pub fn options(&self, path: &str) -> Option<UploadOptions> {
        self.latest(path).map(|object| object.options)
    }

    pub fn generations(&self, path: &str) -> Vec<i64> {
        let state = self.state.lock().unwrap();
        state
            .objects
            .get(path)
            .map(|history| history.iter().map(|object| object.generation).collect())
            .unwrap_or_default()
    }

    fn latest(&self, path: &str) -> Option<StoredObject> {
        let state = self.state.lock().unwrap();
        state.objects.get(path).and_then(|history| history.last().cloned())
    }

    fn find(&self, path: &str, generation: Option<i64>) -> Result<StoredObject, StorageError> {
        let state = self.state.lock().unwrap();
        let history = state
            .objects
            .get(path)
            .ok_or_else(|| StorageError::NotFound(path.to_string()))?;

        let object = match generation {
            Some(generation) => history.iter().find(|o| o.generation == generation),
            None => history.last(),
        };

        object
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    fn check_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        if bucket != self.bucket {
            return Err(StorageError::NotFound(bucket.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FakeStorage {
    async fn list_object_names(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<String>, StorageError> {
        self.check_bucket(bucket)?;

        let state = self.state.lock().unwrap();
        Ok(state
            .objects
            .keys()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn list_object_generations(
        &self,
        bucket: &str,
        path: &str,
    ) -> Result<Vec<i64>, StorageError> {
        self.check_bucket(bucket)?;
        if !self.versioned {
            return Err(StorageError::NotVersioned(bucket.to_string()));
        }

        Ok(self.generations(path))
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        local_path: &Path,
        options: &UploadOptions,
    ) -> Result<Option<i64>, StorageError> {
        self.check_bucket(bucket)?;

        let content = std::fs::read(local_path)?;
        let generation = self.put(path, content, options.clone());

        Ok(self.versioned.then_some(generation))
    }

    async fn download(
        &self,
        bucket: &str,
        path: &str,
        generation: Option<i64>,
        destination: &Path,
    ) -> Result<(), StorageError> {
        self.check_bucket(bucket)?;
        if generation.is_some() && !self.versioned {
            return Err(StorageError::NotVersioned(bucket.to_string()));
        }

        let object = self.find(path, generation)?;
        std::fs::write(destination, object.content)?;
        Ok(())
    }

    async fn resolve_url(
        &self,
        bucket: &str,
        path: &str,
        generation: Option<i64>,
    ) -> Result<String, StorageError> {
        self.check_bucket(bucket)?;

        let object = self.find(path, generation)?;
        Ok(match generation {
            Some(_) => format!("gs://{}/{}#{}", bucket, path, object.generation),
            None => format!("gs://{}/{}", bucket, path),
        })
    }

    async fn delete(
        &self,
        bucket: &str,
        path: &str,
        generation: Option<i64>,
    ) -> Result<(), StorageError> {
        self.check_bucket(bucket)?;

        let mut state = self.state.lock().unwrap();
        let history = state
            .objects
            .get_mut(path)
            .ok_or_else(|| StorageError::NotFound(path.to_string()))?;

        match generation {
            Some(generation) => history.retain(|object| object.generation != generation),
            None => history.clear(),
        }
        if history.is_empty() {
            state.objects.remove(path);
        }

        Ok(())
    }
}

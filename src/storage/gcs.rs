//! Google Cloud Storage JSON API implementation

use std::path::Path;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::config::{StorageSettings, USER_AGENT};
use crate::storage::{Storage, StorageError, UploadOptions};

/// Bytes escaped when an object or bucket name is used as one path segment
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// One page of `objects.list`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectList {
    #[serde(default)]
    items: Vec<ObjectResource>,
    next_page_token: Option<String>,
}

/// Object metadata; the API encodes int64 fields as strings
#[derive(Debug, Deserialize)]
struct ObjectResource {
    name: String,
    generation: String,
}

impl ObjectResource {
    fn generation(&self) -> Result<i64, StorageError> {
        self.generation.parse().map_err(|_| {
            StorageError::InvalidResponse(format!(
                "invalid generation '{}' for {}",
                self.generation, self.name
            ))
        })
    }
}

#[derive(Debug, Deserialize)]
struct BucketResource {
    versioning: Option<Versioning>,
}

#[derive(Debug, Deserialize)]
struct Versioning {
    #[serde(default)]
    enabled: bool,
}

/// Storage implementation for the Cloud Storage JSON API
pub struct GcsStorage {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl GcsStorage {
    pub fn new(settings: &StorageSettings) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            base_url: settings.endpoint.clone(),
            access_token: settings.access_token.clone(),
        })
    }

    fn encode(segment: &str) -> String {
        utf8_percent_encode(segment, PATH_SEGMENT).to_string()
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, StorageError> {
        let raw = format!("{}{}", self.base_url, path);
        let parsed = if params.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, params)
        };
        parsed.map_err(|e| StorageError::InvalidRequest(format!("{}: {}", raw, e)))
    }

    fn bucket_path(bucket: &str) -> String {
        format!("/storage/v1/b/{}", Self::encode(bucket))
    }

    fn objects_path(bucket: &str) -> String {
        format!("{}/o", Self::bucket_path(bucket))
    }

    fn object_path(bucket: &str, name: &str) -> String {
        format!("{}/{}", Self::objects_path(bucket), Self::encode(name))
    }

    fn generation_param(generation: Option<i64>) -> Vec<(&'static str, String)> {
        generation
            .map(|g| vec![("generation", g.to_string())])
            .unwrap_or_default()
    }

    /// Sends a request, mapping 404 to `NotFound` and other failures to `InvalidResponse`
    async fn send(&self, request: RequestBuilder, subject: &str) -> Result<Response, StorageError> {
        let request = match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound(subject.to_string()));
        }

        if !status.is_success() {
            warn!("Storage API returned status {} for {}", status, subject);
            return Err(StorageError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        Ok(response)
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, StorageError> {
        response.json().await.map_err(|e| {
            warn!("Failed to parse storage API response: {}", e);
            StorageError::InvalidResponse(e.to_string())
        })
    }

    /// Lists objects under `prefix`, following `nextPageToken` until exhausted
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        versions: bool,
    ) -> Result<Vec<ObjectResource>, StorageError> {
        let mut objects = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![("prefix", prefix.to_string())];
            if versions {
                params.push(("versions", "true".to_string()));
            }
            if let Some(token) = &page_token {
                params.push(("pageToken", token.clone()));
            }

            let url = self.url(&Self::objects_path(bucket), &params)?;
            let response = self.send(self.client.get(url), bucket).await?;
            let page: ObjectList = Self::parse(response).await?;
            objects.extend(page.items);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!("Listed {} objects in {} under '{}'", objects.len(), bucket, prefix);
        Ok(objects)
    }

    async fn is_versioned(&self, bucket: &str) -> Result<bool, StorageError> {
        let url = self.url(
            &Self::bucket_path(bucket),
            &[("fields", "versioning".to_string())],
        )?;
        let response = self.send(self.client.get(url), bucket).await?;
        let resource: BucketResource = Self::parse(response).await?;

        Ok(resource.versioning.is_some_and(|v| v.enabled))
    }

    async fn object_attrs(
        &self,
        bucket: &str,
        path: &str,
        generation: Option<i64>,
    ) -> Result<ObjectResource, StorageError> {
        let url = self.url(
            &Self::object_path(bucket, path),
            &Self::generation_param(generation),
        )?;
        let response = self.send(self.client.get(url), path).await?;

        Self::parse(response).await
    }
}

#[async_trait::async_trait]
impl Storage for GcsStorage {
    async fn list_object_names(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<String>, StorageError> {
        let objects = self.list_objects(bucket, prefix, false).await?;
        Ok(objects.into_iter().map(|object| object.name).collect())
    }

    async fn list_object_generations(
        &self,
        bucket: &str,
        path: &str,
    ) -> Result<Vec<i64>, StorageError> {
        if !self.is_versioned(bucket).await? {
            return Err(StorageError::NotVersioned(bucket.to_string()));
        }

        self.list_objects(bucket, path, true)
            .await?
            .iter()
            .filter(|object| object.name == path)
            .map(ObjectResource::generation)
            .collect()
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        local_path: &Path,
        options: &UploadOptions,
    ) -> Result<Option<i64>, StorageError> {
        let versioned = self.is_versioned(bucket).await?;
        let file = tokio::fs::File::open(local_path).await?;
        let length = file.metadata().await?.len();

        let mut params = vec![
            ("uploadType", "media".to_string()),
            ("name", path.to_string()),
        ];
        if let Some(acl) = &options.predefined_acl {
            params.push(("predefinedAcl", acl.clone()));
        }

        let url = self.url(
            &format!("/upload{}", Self::objects_path(bucket)),
            &params,
        )?;
        let content_type = options
            .content_type
            .as_deref()
            .unwrap_or(DEFAULT_CONTENT_TYPE);
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, length)
            .body(reqwest::Body::from(file));
        let object: ObjectResource = Self::parse(self.send(request, path).await?).await?;
        let generation = object.generation()?;

        if let Some(cache_control) = &options.cache_control {
            let url = self.url(
                &Self::object_path(bucket, path),
                &Self::generation_param(Some(generation)),
            )?;
            let request = self
                .client
                .patch(url)
                .json(&serde_json::json!({ "cacheControl": cache_control }));
            self.send(request, path).await?;
        }

        debug!("Uploaded {} to {} (generation {})", local_path.display(), path, generation);
        Ok(versioned.then_some(generation))
    }

    async fn download(
        &self,
        bucket: &str,
        path: &str,
        generation: Option<i64>,
        destination: &Path,
    ) -> Result<(), StorageError> {
        if generation.is_some() && !self.is_versioned(bucket).await? {
            return Err(StorageError::NotVersioned(bucket.to_string()));
        }

        let mut params = vec![("alt", "media".to_string())];
        params.extend(Self::generation_param(generation));
        let url = self.url(&Self::object_path(bucket, path), &params)?;
        let mut response = self.send(self.client.get(url), path).await?;

        let mut file = tokio::fs::File::create(destination).await?;
        let written: Result<(), StorageError> = async {
            while let Some(chunk) = response.chunk().await? {
                file.write_all(&chunk).await?;
            }
            file.flush().await?;
            Ok(())
        }
        .await;

        if let Err(err) = written {
            drop(file);
            if let Err(cleanup) = tokio::fs::remove_file(destination).await {
                warn!("Failed to remove partial download {}: {}", destination.display(), cleanup);
            }
            return Err(err);
        }

        debug!("Downloaded {} to {}", path, destination.display());
        Ok(())
    }

    async fn resolve_url(
        &self,
        bucket: &str,
        path: &str,
        generation: Option<i64>,
    ) -> Result<String, StorageError> {
        let object = self.object_attrs(bucket, path, generation).await?;

        Ok(match generation {
            Some(_) => format!("gs://{}/{}#{}", bucket, object.name, object.generation()?),
            None => format!("gs://{}/{}", bucket, object.name),
        })
    }

    async fn delete(
        &self,
        bucket: &str,
        path: &str,
        generation: Option<i64>,
    ) -> Result<(), StorageError> {
        let url = self.url(
            &Self::object_path(bucket, path),
            &Self::generation_param(generation),
        )?;
        self.send(self.client.delete(url), path).await?;

        debug!("Deleted {} from {}", path, bucket);
        Ok(())
    }
}

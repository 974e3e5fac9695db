//! `in`: fetch a version into a destination directory

use std::path::Path;

use tracing::info;

use crate::archive;
use crate::config::{GENERATION_FILE, SourceConfig, URL_FILE, VERSION_FILE};
use crate::resource::error::ResourceError;
use crate::resource::fetch::{FetchPlan, FetchResolver, ObjectTarget};
use crate::resource::models::{InRequest, VersionResponse, metadata};
use crate::resource::{base_name, bucket_extractions, try_resolve_url};
use crate::storage::Storage;
use crate::version::extraction::Extraction;

pub struct InCommand<'a, S: Storage> {
    storage: &'a S,
}

impl<'a, S: Storage> InCommand<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// Fetches the requested version into `destination`.
    ///
    /// Besides the artifact itself this writes marker files: `version` with the
    /// captured version text in pattern mode, `generation` in fixed-object
    /// mode, and `url` whenever the object URL resolved.
    pub async fn run(
        &self,
        destination: &Path,
        request: &InRequest,
    ) -> Result<VersionResponse, ResourceError> {
        let config = SourceConfig::try_from(&request.source)?;
        tokio::fs::create_dir_all(destination).await?;

        let skip_download = request.params.skip_download(config.skip_download)?;

        let (target, bootstrap_content) =
            match FetchResolver::new(&config).resolve(request.version.as_ref())? {
                FetchPlan::Materialize { target, content } => (target, Some(content)),
                FetchPlan::Download(target) => (target, None),
                FetchPlan::Latest(pattern) => {
                    let candidates =
                        bucket_extractions(self.storage, &config.bucket, pattern).await?;
                    (FetchResolver::latest(&candidates)?, None)
                }
            };

        let local_path = destination.join(base_name(&target.path));

        let url = match bootstrap_content {
            Some(content) => {
                info!("Materializing initial version at {}", local_path.display());
                tokio::fs::write(&local_path, content).await?;
                None
            }
            None => {
                if skip_download {
                    info!("Skipping download of {}", target.path);
                } else {
                    self.download(&config, &target, &local_path, request.params.unpack)
                        .await?;
                }

                let url =
                    try_resolve_url(self.storage, &config.bucket, &target.path, target.generation)
                        .await;
                if let Some(url) = &url {
                    tokio::fs::write(destination.join(URL_FILE), url).await?;
                }
                url
            }
        };

        self.write_version_marker(&config, &target, destination)
            .await?;

        Ok(VersionResponse {
            version: target.version(),
            metadata: metadata(&target.path, url.as_deref()),
        })
    }

    async fn download(
        &self,
        config: &SourceConfig,
        target: &ObjectTarget,
        local_path: &Path,
        unpack: bool,
    ) -> Result<(), ResourceError> {
        info!("Downloading {} to {}", target.path, local_path.display());
        self.storage
            .download(&config.bucket, &target.path, target.generation, local_path)
            .await?;

        if unpack {
            let path = local_path.to_path_buf();
            tokio::task::spawn_blocking(move || archive::unpack(&path))
                .await
                .map_err(std::io::Error::other)??;
        }

        Ok(())
    }

    async fn write_version_marker(
        &self,
        config: &SourceConfig,
        target: &ObjectTarget,
        destination: &Path,
    ) -> Result<(), ResourceError> {
        if let Some(generation) = target.generation {
            tokio::fs::write(destination.join(GENERATION_FILE), generation.to_string()).await?;
        } else if let Some(pattern) = config.pattern()
            && let Some(extraction) = Extraction::from_path(&target.path, pattern)?
        {
            tokio::fs::write(destination.join(VERSION_FILE), extraction.version_text).await?;
        }

        Ok(())
    }
}

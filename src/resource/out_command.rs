//! `out`: publish a local file as a new version

use std::path::Path;

use tracing::info;

use crate::config::SourceConfig;
use crate::resource::error::ResourceError;
use crate::resource::models::{OutRequest, VersionResponse, metadata};
use crate::resource::publish::PublishResolver;
use crate::resource::try_resolve_url;
use crate::storage::Storage;

pub struct OutCommand<'a, S: Storage> {
    storage: &'a S,
}

impl<'a, S: Storage> OutCommand<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    pub async fn run(
        &self,
        source_dir: &Path,
        request: &OutRequest,
    ) -> Result<VersionResponse, ResourceError> {
        let config = SourceConfig::try_from(&request.source)?;
        request.params.validate()?;

        let resolver = PublishResolver::new(&config);
        let plan = resolver.resolve(source_dir, &request.params.file)?;

        info!("Uploading {} to {}", plan.local_path.display(), plan.destination);
        let generation = self
            .storage
            .upload(
                &config.bucket,
                &plan.destination,
                &plan.local_path,
                &request.params.upload_options(),
            )
            .await?;

        let version = resolver.reported_version(&plan.destination, generation)?;
        let url = try_resolve_url(
            self.storage,
            &config.bucket,
            &plan.destination,
            version.generation(),
        )
        .await;

        Ok(VersionResponse {
            metadata: metadata(&plan.destination, url.as_deref()),
            version,
        })
    }
}

use std::path::Path;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::config::Builder;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{Client, config::BehaviorVersion, config::Credentials, config::Region};
use tracing::info;

use crate::config::settings::WorkerConfig;
use crate::modules::job::error::JobError;
use crate::modules::job::model::StorageTarget;
use crate::modules::job::pipeline::ArtifactStore;

/// S3 (or S3-compatible, e.g. MinIO) uploader.
///
/// Connection details come with each job, so a client is built per upload on
/// top of the SDK's default configuration (env, profile, session tokens,
/// instance and task roles).
#[derive(Clone)]
pub struct StorageService {
    sdk_config: SdkConfig,
    default_region: String,
    force_path_style: bool,
}

impl StorageService {
    pub async fn new(config: &WorkerConfig) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.default_s3_region.clone()))
            .load()
            .await;

        info!("✅ Loaded AWS SDK configuration");
        Self::with_sdk_config(sdk_config, config)
    }

    pub fn with_sdk_config(sdk_config: SdkConfig, config: &WorkerConfig) -> Self {
        Self {
            sdk_config,
            default_region: config.default_s3_region.clone(),
            force_path_style: config.s3_force_path_style,
        }
    }

    /// Static keys only when the job supplies both; otherwise the default chain applies.
    fn job_credentials(target: &StorageTarget) -> Option<Credentials> {
        match (&target.access_key, &target.secret_key) {
            (Some(access), Some(secret)) => Some(Credentials::new(
                access.as_str(),
                secret.as_str(),
                None,
                None,
                "job",
            )),
            _ => None,
        }
    }

    fn region(&self, target: &StorageTarget) -> String {
        target
            .region
            .clone()
            .unwrap_or_else(|| self.default_region.clone())
    }

    fn client_for(&self, target: &StorageTarget) -> Client {
        let mut builder = Builder::from(&self.sdk_config)
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(self.region(target)))
            .force_path_style(self.force_path_style);

        if let Some(credentials) = Self::job_credentials(target) {
            builder = builder.credentials_provider(credentials);
        }
        if let Some(endpoint) = &target.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        Client::from_conf(builder.build())
    }
}

#[async_trait]
impl ArtifactStore for StorageService {
    async fn upload(
        &self,
        target: &StorageTarget,
        local_path: &Path,
        key: &str,
        content_type: &str,
    ) -> Result<(), JobError> {
        let client = self.client_for(target);

        let body = ByteStream::from_path(local_path).await.map_err(|e| {
            JobError::Upload(format!("failed to read {}: {}", local_path.display(), e))
        })?;

        client
            .put_object()
            .bucket(&target.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                JobError::Upload(format!(
                    "failed to upload s3://{}/{}: {}",
                    target.bucket,
                    key,
                    DisplayErrorContext(&e)
                ))
            })?;

        info!("✅ Uploaded s3://{}/{}", target.bucket, key);
        Ok(())
    }
}

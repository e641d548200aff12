//! Capabilities the orchestrator drives. Production adapters live under
//! `infrastructure`; tests swap in doubles.

use std::path::Path;

use async_trait::async_trait;

use super::error::JobError;
use super::model::{Callback, GenerationParams, StatusEvent, StorageTarget};

/// Produces the media file for a job.
#[async_trait]
pub trait ArtifactGenerator: Send + Sync {
    /// Writes a clip matching `params` to `output_path`. Enforces its own timeout.
    async fn generate(&self, output_path: &Path, params: &GenerationParams)
    -> Result<(), JobError>;
}

/// Moves a finished artifact into object storage.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Uploads `local_path` to `target.bucket` under `key`, tagged with `content_type`.
    async fn upload(
        &self,
        target: &StorageTarget,
        local_path: &Path,
        key: &str,
        content_type: &str,
    ) -> Result<(), JobError>;
}

/// Delivers status callbacks. One attempt per call, no retries.
#[async_trait]
pub trait StatusNotifier: Send + Sync {
    async fn notify(&self, callback: &Callback, event: &StatusEvent) -> Result<(), JobError>;
}

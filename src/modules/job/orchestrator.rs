use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::FutureExt;
use tempfile::TempDir;
use tracing::{error, info, warn};

use super::error::JobError;
use super::model::{
    ARTIFACT_FILE_NAME, ExecutionResult, JobRequest, JobStatus, StatusEvent, StatusUpdate,
};
use super::pipeline::{ArtifactGenerator, ArtifactStore, StatusNotifier};

const LOCAL_ARTIFACT_NAME: &str = "out.mp4";

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

pub fn artifact_content_type() -> String {
    mime_guess::from_path(ARTIFACT_FILE_NAME)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Tracks the last emitted status so transitions only ever move forward.
#[derive(Debug, Default)]
struct Lifecycle {
    current: Option<JobStatus>,
}

impl Lifecycle {
    fn advance(&mut self, next: JobStatus) -> bool {
        if next.can_follow(self.current) {
            self.current = Some(next);
            true
        } else {
            false
        }
    }

    fn is_finished(&self) -> bool {
        self.current.is_some_and(|status| status.is_terminal())
    }
}

/// Runs one job: generate, upload, and report status along the way.
///
/// The result depends only on generation and upload. Every webhook call is
/// attempted once and its failure logged; none of them can change the outcome.
pub struct JobOrchestrator {
    generator: Arc<dyn ArtifactGenerator>,
    store: Arc<dyn ArtifactStore>,
    notifier: Arc<dyn StatusNotifier>,
    scratch_root: Option<PathBuf>,
}

impl JobOrchestrator {
    pub fn new(
        generator: Arc<dyn ArtifactGenerator>,
        store: Arc<dyn ArtifactStore>,
        notifier: Arc<dyn StatusNotifier>,
    ) -> Self {
        Self {
            generator,
            store,
            notifier,
            scratch_root: None,
        }
    }

    pub fn with_scratch_root(mut self, root: Option<PathBuf>) -> Self {
        self.scratch_root = root;
        self
    }

    pub async fn execute(&self, job: &JobRequest) -> ExecutionResult {
        let mut lifecycle = Lifecycle::default();
        info!(job_id = %job.job_id, params = ?job.params, "▶️ Starting job");

        self.emit(job, &mut lifecycle, StatusUpdate::Running).await;

        // A panicking collaborator still ends in `failed`; the scratch dir drops with the future.
        let outcome = AssertUnwindSafe(self.run_pipeline(job, &mut lifecycle))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(JobError::Aborted(panic_message(payload.as_ref()))));

        let result = match outcome {
            Ok(output_key) => {
                info!(job_id = %job.job_id, key = %output_key, "✅ Job completed");
                self.emit(
                    job,
                    &mut lifecycle,
                    StatusUpdate::Done {
                        output_s3_key: output_key.clone(),
                        preview_s3_key: None,
                    },
                )
                .await;
                ExecutionResult::success(output_key)
            }
            Err(e) => {
                let message = e.to_string();
                error!(job_id = %job.job_id, error = %message, "❌ Job failed");
                self.emit(
                    job,
                    &mut lifecycle,
                    StatusUpdate::Failed {
                        error: message.clone(),
                    },
                )
                .await;
                ExecutionResult::failure(message)
            }
        };

        debug_assert!(lifecycle.is_finished());
        result
    }

    /// Scratch space lives exactly as long as this call, whatever the outcome.
    async fn run_pipeline(
        &self,
        job: &JobRequest,
        lifecycle: &mut Lifecycle,
    ) -> Result<String, JobError> {
        let scratch = self.scratch_dir()?;
        let result = self
            .generate_and_upload(job, lifecycle, &scratch.path().join(LOCAL_ARTIFACT_NAME))
            .await;

        let scratch_path = scratch.path().to_path_buf();
        if let Err(e) = scratch.close() {
            warn!(
                job_id = %job.job_id,
                path = %scratch_path.display(),
                error = %e,
                "Failed to remove scratch directory"
            );
        }

        result
    }

    async fn generate_and_upload(
        &self,
        job: &JobRequest,
        lifecycle: &mut Lifecycle,
        local_path: &Path,
    ) -> Result<String, JobError> {
        info!(job_id = %job.job_id, path = %local_path.display(), "🎬 Generating artifact");
        self.generator.generate(local_path, &job.params).await?;

        self.emit(job, lifecycle, StatusUpdate::Uploading).await;

        let output_key = job.output_key();
        info!(
            job_id = %job.job_id,
            bucket = %job.storage.bucket,
            key = %output_key,
            "⬆️ Uploading artifact"
        );
        self.store
            .upload(&job.storage, local_path, &output_key, &artifact_content_type())
            .await?;

        Ok(output_key)
    }

    fn scratch_dir(&self) -> Result<TempDir, JobError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("video-job-");

        let dir = match &self.scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };

        dir.map_err(|e| JobError::Generation(format!("failed to create scratch directory: {}", e)))
    }

    /// Best-effort delivery: the error is logged and dropped right here.
    async fn emit(&self, job: &JobRequest, lifecycle: &mut Lifecycle, update: StatusUpdate) {
        let status = update.status();
        if !lifecycle.advance(status) {
            error!(
                job_id = %job.job_id,
                status = %status,
                previous = ?lifecycle.current,
                "Refusing out-of-order status"
            );
            return;
        }

        let event = StatusEvent::new(&job.job_id, update);
        let delivery = AssertUnwindSafe(self.notifier.notify(&job.webhook, &event))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(JobError::Notify(panic_message(payload.as_ref()))));

        match delivery {
            Ok(()) => info!(job_id = %job.job_id, status = %status, "📣 Status delivered"),
            Err(e) => warn!(
                job_id = %job.job_id,
                status = %status,
                error = %e,
                "Status notification failed, continuing"
            ),
        }
    }
}

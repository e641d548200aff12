use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_DURATION_S: u32 = 5;
pub const DEFAULT_FPS: u32 = 24;
pub const DEFAULT_WIDTH: u32 = 1280;
pub const DEFAULT_HEIGHT: u32 = 720;

/// Name of the uploaded object under the job's output prefix.
pub const ARTIFACT_FILE_NAME: &str = "video.mp4";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Validate)]
pub struct GenerationParams {
    #[validate(range(min = 1, message = "params.duration_s must be at least 1"))]
    pub duration_s: u32,
    #[validate(range(min = 1, message = "params.fps must be at least 1"))]
    pub fps: u32,
    #[validate(range(min = 1, message = "params.width must be at least 1"))]
    pub width: u32,
    #[validate(range(min = 1, message = "params.height must be at least 1"))]
    pub height: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            duration_s: DEFAULT_DURATION_S,
            fps: DEFAULT_FPS,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

/// Where the artifact goes, plus the per-job storage connection settings.
#[derive(Clone, Default, Validate)]
pub struct StorageTarget {
    #[validate(length(min = 1, message = "s3.bucket is required"))]
    pub bucket: String,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl fmt::Debug for StorageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageTarget")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .field("access_key", &self.access_key.as_ref().map(|_| "<redacted>"))
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Clone, Default, Validate)]
pub struct Callback {
    #[validate(length(min = 1, message = "webhook.url is required"))]
    pub url: String,
    /// Sent as `X-Webhook-Secret`; `None` when absent or empty.
    pub secret: Option<String>,
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("url", &self.url)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A validated job. Built once per invocation and never mutated.
#[derive(Debug, Clone, Validate)]
pub struct JobRequest {
    #[validate(length(min = 1, message = "job_id is required"))]
    pub job_id: String,
    #[validate(nested)]
    pub params: GenerationParams,
    #[validate(nested)]
    pub storage: StorageTarget,
    #[validate(length(min = 1, message = "output_prefix is required"))]
    pub output_prefix: String,
    #[validate(nested)]
    pub webhook: Callback,
}

impl JobRequest {
    /// Fixed per prefix: jobs sharing an `output_prefix` overwrite each other.
    pub fn output_key(&self) -> String {
        format!("{}/{}", self.output_prefix, ARTIFACT_FILE_NAME)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Uploading,
    Done,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Running => "running",
            JobStatus::Uploading => "uploading",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }

    /// Whether `self` may be emitted right after `previous` (`None` = nothing emitted yet).
    pub fn can_follow(&self, previous: Option<JobStatus>) -> bool {
        matches!(
            (previous, self),
            (None, JobStatus::Running)
                | (Some(JobStatus::Running), JobStatus::Uploading)
                | (Some(JobStatus::Running), JobStatus::Failed)
                | (Some(JobStatus::Uploading), JobStatus::Done)
                | (Some(JobStatus::Uploading), JobStatus::Failed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StatusUpdate {
    Running,
    Uploading,
    Done {
        output_s3_key: String,
        preview_s3_key: Option<String>,
    },
    Failed {
        error: String,
    },
}

impl StatusUpdate {
    pub fn status(&self) -> JobStatus {
        match self {
            StatusUpdate::Running => JobStatus::Running,
            StatusUpdate::Uploading => JobStatus::Uploading,
            StatusUpdate::Done { .. } => JobStatus::Done,
            StatusUpdate::Failed { .. } => JobStatus::Failed,
        }
    }
}

/// Body of a webhook call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEvent {
    pub job_id: String,
    #[serde(flatten)]
    pub update: StatusUpdate,
}

impl StatusEvent {
    pub fn new(job_id: &str, update: StatusUpdate) -> Self {
        Self {
            job_id: job_id.to_string(),
            update,
        }
    }

    pub fn status(&self) -> JobStatus {
        self.update.status()
    }
}

/// What the invocation returns to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub ok: bool,
    #[serde(rename = "output_s3_key", skip_serializing_if = "Option::is_none")]
    pub output_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn success(output_key: String) -> Self {
        Self {
            ok: true,
            output_key: Some(output_key),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            output_key: None,
            error: Some(error.into()),
        }
    }
}

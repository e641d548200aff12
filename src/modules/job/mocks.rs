//! Test doubles for the pipeline traits.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::error::JobError;
use super::model::{Callback, GenerationParams, JobStatus, StatusEvent, StorageTarget};
use super::pipeline::{ArtifactGenerator, ArtifactStore, StatusNotifier};

#[derive(Default)]
pub struct MockGenerator {
    pub fail_with: Option<String>,
    pub panic_with: Option<String>,
    pub delay: Option<Duration>,
    pub calls: Mutex<Vec<(PathBuf, GenerationParams)>>,
}

impl MockGenerator {
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn panicking(message: &str) -> Self {
        Self {
            panic_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_output_path(&self) -> Option<PathBuf> {
        self.calls.lock().unwrap().last().map(|(path, _)| path.clone())
    }
}

#[async_trait]
impl ArtifactGenerator for MockGenerator {
    async fn generate(
        &self,
        output_path: &Path,
        params: &GenerationParams,
    ) -> Result<(), JobError> {
        self.calls
            .lock()
            .unwrap()
            .push((output_path.to_path_buf(), *params));

        // Leave a partial file behind on failure too, so cleanup is exercised.
        tokio::fs::write(output_path, b"fake mp4 bytes")
            .await
            .map_err(|e| JobError::Generation(e.to_string()))?;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.panic_with {
            panic!("{}", message);
        }

        match &self.fail_with {
            Some(message) => Err(JobError::Generation(message.clone())),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRecord {
    pub bucket: String,
    pub key: String,
    pub content_type: String,
    pub local_path: PathBuf,
    pub file_present: bool,
}

#[derive(Default)]
pub struct MockStore {
    pub fail_with: Option<String>,
    pub uploads: Mutex<Vec<UploadRecord>>,
}

impl MockStore {
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn uploads(&self) -> Vec<UploadRecord> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactStore for MockStore {
    async fn upload(
        &self,
        target: &StorageTarget,
        local_path: &Path,
        key: &str,
        content_type: &str,
    ) -> Result<(), JobError> {
        self.uploads.lock().unwrap().push(UploadRecord {
            bucket: target.bucket.clone(),
            key: key.to_string(),
            content_type: content_type.to_string(),
            local_path: local_path.to_path_buf(),
            file_present: local_path.exists(),
        });

        match &self.fail_with {
            Some(message) => Err(JobError::Upload(message.clone())),
            None => Ok(()),
        }
    }
}

/// Records every event it is handed, then optionally pretends delivery failed.
#[derive(Default)]
pub struct RecordingNotifier {
    pub always_fail: bool,
    pub always_panic: bool,
    pub events: Mutex<Vec<StatusEvent>>,
}

impl RecordingNotifier {
    pub fn unreachable() -> Self {
        Self {
            always_fail: true,
            ..Self::default()
        }
    }

    pub fn panicking() -> Self {
        Self {
            always_panic: true,
            ..Self::default()
        }
    }

    /// Polls until a terminal status was recorded or `limit` elapses.
    pub async fn wait_for_terminal(&self, limit: Duration) -> Vec<JobStatus> {
        let deadline = tokio::time::Instant::now() + limit;
        loop {
            let statuses = self.statuses();
            if statuses.iter().any(JobStatus::is_terminal)
                || tokio::time::Instant::now() >= deadline
            {
                return statuses;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    pub fn events(&self) -> Vec<StatusEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<JobStatus> {
        self.events().iter().map(StatusEvent::status).collect()
    }
}

#[async_trait]
impl StatusNotifier for RecordingNotifier {
    async fn notify(&self, _callback: &Callback, event: &StatusEvent) -> Result<(), JobError> {
        self.events.lock().unwrap().push(event.clone());

        if self.always_panic {
            panic!("notifier exploded on {}", event.status());
        }
        if self.always_fail {
            Err(JobError::Notify("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

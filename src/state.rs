use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::settings::WorkerConfig;
use crate::infrastructure::generator::ffmpeg::FfmpegGenerator;
use crate::infrastructure::storage::s3::StorageService;
use crate::infrastructure::webhook::client::WebhookNotifier;
use crate::modules::job::error::JobError;
use crate::modules::job::pipeline::{ArtifactGenerator, ArtifactStore, StatusNotifier};

#[derive(Clone)]
pub struct AppState {
    pub config: WorkerConfig,
    pub generator: Arc<dyn ArtifactGenerator>,
    pub storage: Arc<dyn ArtifactStore>,
    pub notifier: Arc<dyn StatusNotifier>,
    /// Held for the duration of a job so the worker never runs two at once.
    pub job_slot: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(
        config: WorkerConfig,
        generator: Arc<dyn ArtifactGenerator>,
        storage: Arc<dyn ArtifactStore>,
        notifier: Arc<dyn StatusNotifier>,
    ) -> Self {
        Self {
            config,
            generator,
            storage,
            notifier,
            job_slot: Arc::new(Mutex::new(())),
        }
    }

    /// Wires the production adapters from configuration.
    pub async fn from_config(config: WorkerConfig) -> Result<Self, JobError> {
        let generator = FfmpegGenerator::new(config.ffmpeg_bin.clone(), config.generation_timeout());
        let storage = StorageService::new(&config).await;
        let notifier = WebhookNotifier::new(config.webhook_timeout())?;

        Ok(Self::new(
            config,
            Arc::new(generator),
            Arc::new(storage),
            Arc::new(notifier),
        ))
    }
}

use std::path::PathBuf;
use std::time::Duration;

use crate::config::env::{self, EnvKey};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct WorkerConfig {
    pub ffmpeg_bin: String,
    pub generation_timeout_secs: u64,
    pub webhook_timeout_secs: u64,
    /// Parent directory for per-job scratch dirs; the system temp dir when unset.
    pub scratch_root: Option<PathBuf>,
    pub default_s3_region: String,
    pub s3_force_path_style: bool,
    pub serve_port: Option<u16>,
    pub job_input_path: Option<PathBuf>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            ffmpeg_bin: "ffmpeg".to_string(),
            generation_timeout_secs: 600,
            webhook_timeout_secs: 20,
            scratch_root: None,
            default_s3_region: "us-east-1".to_string(),
            s3_force_path_style: true,
            serve_port: None,
            job_input_path: None,
        }
    }
}

impl WorkerConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let serve_port = match env::get_opt(EnvKey::ServePort) {
            Some(raw) => Some(raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                key: EnvKey::ServePort.as_str(),
                value: raw.clone(),
            })?),
            None => None,
        };

        Ok(Self {
            ffmpeg_bin: env::get_or(EnvKey::FfmpegBin, &defaults.ffmpeg_bin),
            generation_timeout_secs: env::get_parsed(
                EnvKey::GenerationTimeoutSecs,
                defaults.generation_timeout_secs,
            ),
            webhook_timeout_secs: env::get_parsed(
                EnvKey::WebhookTimeoutSecs,
                defaults.webhook_timeout_secs,
            ),
            scratch_root: env::get_opt(EnvKey::ScratchRoot).map(PathBuf::from),
            default_s3_region: env::get_or(EnvKey::DefaultS3Region, &defaults.default_s3_region),
            s3_force_path_style: env::get_parsed(
                EnvKey::S3ForcePathStyle,
                defaults.s3_force_path_style,
            ),
            serve_port,
            job_input_path: env::get_opt(EnvKey::JobInputPath).map(PathBuf::from),
        })
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs.max(1))
    }

    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(self.webhook_timeout_secs.max(1))
    }
}

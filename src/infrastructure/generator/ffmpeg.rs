use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::info;

use crate::modules::job::error::JobError;
use crate::modules::job::model::GenerationParams;
use crate::modules::job::pipeline::ArtifactGenerator;

/// Placeholder generator: renders a solid black clip with ffmpeg's `lavfi`
/// source. Swap in a real model pipeline behind [`ArtifactGenerator`].
pub struct FfmpegGenerator {
    binary: String,
    timeout: Duration,
}

impl FfmpegGenerator {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    fn build_args(&self, output_path: &Path, params: &GenerationParams) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-y".to_string(),
            "-f".to_string(),
            "lavfi".to_string(),
            "-i".to_string(),
            format!(
                "color=c=black:s={}x{}:r={}",
                params.width, params.height, params.fps
            ),
            "-t".to_string(),
            params.duration_s.to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            output_path.to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl ArtifactGenerator for FfmpegGenerator {
    async fn generate(
        &self,
        output_path: &Path,
        params: &GenerationParams,
    ) -> Result<(), JobError> {
        let args = self.build_args(output_path, params);
        info!(
            "🎥 Rendering {}x{} @ {}fps for {}s",
            params.width, params.height, params.fps, params.duration_s
        );

        let mut command = Command::new(&self.binary);
        command.args(&args).stdin(Stdio::null()).kill_on_drop(true);

        let output = match timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(JobError::Generation(format!(
                    "failed to run {}: {}",
                    self.binary, e
                )));
            }
            Err(_) => {
                return Err(JobError::Generation(format!(
                    "{} timed out after {}s",
                    self.binary,
                    self.timeout.as_secs()
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr
                .lines()
                .rev()
                .map(str::trim)
                .find(|line| !line.is_empty());

            return Err(JobError::Generation(match detail {
                Some(detail) => format!("{} exited with {}: {}", self.binary, output.status, detail),
                None => format!("{} exited with {}", self.binary, output.status),
            }));
        }

        match tokio::fs::metadata(output_path).await {
            Ok(meta) if meta.len() > 0 => Ok(()),
            _ => Err(JobError::Generation(format!(
                "{} produced no output at {}",
                self.binary,
                output_path.display()
            ))),
        }
    }
}

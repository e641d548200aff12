use std::env;
use std::str::FromStr;

pub enum EnvKey {
    FfmpegBin,
    GenerationTimeoutSecs,
    WebhookTimeoutSecs,
    ScratchRoot,
    DefaultS3Region,
    S3ForcePathStyle,
    ServePort,
    JobInputPath,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::FfmpegBin => "FFMPEG_BIN",
            EnvKey::GenerationTimeoutSecs => "GENERATION_TIMEOUT_SECS",
            EnvKey::WebhookTimeoutSecs => "WEBHOOK_TIMEOUT_SECS",
            EnvKey::ScratchRoot => "WORKER_TMP_DIR",
            EnvKey::DefaultS3Region => "DEFAULT_S3_REGION",
            EnvKey::S3ForcePathStyle => "S3_FORCE_PATH_STYLE",
            EnvKey::ServePort => "WORKER_SERVE_PORT",
            EnvKey::JobInputPath => "JOB_INPUT_PATH",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

/// Like [`get`], but treats an empty value the same as an unset one.
pub fn get_opt(key: EnvKey) -> Option<String> {
    get(key).ok().filter(|v| !v.trim().is_empty())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    get_opt(key).unwrap_or_else(|| default.to_string())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    parse_or(get_opt(key), default)
}

pub fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    match value {
        Some(val) => val.trim().parse::<T>().unwrap_or(default),
        None => default,
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::model::ExecutionResult;

/// Envelope the host delivers: `{"input": {...}}`.
#[derive(Debug, Default, Deserialize)]
pub struct JobEvent {
    pub input: Option<RawJobInput>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawJobInput {
    pub job_id: Option<String>,
    pub params: Option<RawParams>,
    pub s3: Option<RawS3Config>,
    pub output_prefix: Option<String>,
    pub webhook: Option<RawWebhook>,
}

/// Numbers arrive as JSON integers or integer strings, so they stay untyped here.
#[derive(Debug, Default, Deserialize)]
pub struct RawParams {
    pub duration_s: Option<Value>,
    pub fps: Option<Value>,
    pub width: Option<Value>,
    pub height: Option<Value>,
}

#[derive(Default, Deserialize)]
pub struct RawS3Config {
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl std::fmt::Debug for RawS3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawS3Config")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .finish_non_exhaustive()
    }
}

#[derive(Default, Deserialize)]
pub struct RawWebhook {
    pub url: Option<String>,
    pub secret: Option<String>,
}

impl std::fmt::Debug for RawWebhook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawWebhook")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// Local test API reply, shaped like a serverless host's `runsync` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunSyncResponse {
    pub id: String,
    pub status: String,
    pub output: ExecutionResult,
}

use thiserror::Error;

/// Failures a job can run into, split by the stage that produced them.
///
/// `Generation` and `Upload` decide the job's outcome. `Notify` never does:
/// it is logged and dropped wherever it happens.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("invalid job request: {0}")]
    Validation(String),

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("pipeline aborted: {0}")]
    Aborted(String),

    #[error("webhook delivery failed: {0}")]
    Notify(String),
}

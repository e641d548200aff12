use serde_json::Value;
use tracing::{error, warn};

use super::error::JobError;
use super::model::ExecutionResult;
use super::orchestrator::JobOrchestrator;
use super::validator;
use crate::state::AppState;

pub struct JobService;

impl JobService {
    /// Entry point for raw request bodies. Unparseable JSON is a validation failure.
    pub async fn handle_raw(state: &AppState, body: &[u8]) -> ExecutionResult {
        match serde_json::from_slice::<Value>(body) {
            Ok(event) => Self::handle(state, event).await,
            Err(e) => Self::reject(JobError::Validation(format!("malformed job event: {}", e))),
        }
    }

    /// Validates the event and runs it. Always returns a structured result.
    ///
    /// The job runs on its own task, so dropping the caller's future (e.g. a
    /// disconnected HTTP client) does not cancel it mid-pipeline.
    pub async fn handle(state: &AppState, event: Value) -> ExecutionResult {
        let job = match validator::validate_event(event) {
            Ok(job) => job,
            Err(e) => return Self::reject(e),
        };

        let job_id = job.job_id.clone();
        let state = state.clone();
        let run = tokio::spawn(async move {
            let _slot = state.job_slot.lock().await;

            JobOrchestrator::new(
                state.generator.clone(),
                state.storage.clone(),
                state.notifier.clone(),
            )
            .with_scratch_root(state.config.scratch_root.clone())
            .execute(&job)
            .await
        });

        match run.await {
            Ok(result) => result,
            Err(e) => {
                error!(job_id = %job_id, error = %e, "❌ Job task aborted");
                ExecutionResult::failure(format!("job task aborted: {}", e))
            }
        }
    }

    fn reject(error: JobError) -> ExecutionResult {
        warn!(error = %error, "Rejected job request");
        ExecutionResult::failure(error.to_string())
    }
}

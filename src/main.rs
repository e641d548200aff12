use anyhow::Context;
use dotenvy::dotenv;
use tokio::io::AsyncReadExt;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod infrastructure;
mod modules;
mod routes;
mod state;

use config::settings::WorkerConfig;
use modules::job::model::ExecutionResult;
use modules::job::service::JobService;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // stdout is reserved for the job output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = WorkerConfig::new().context("Failed to load worker configuration")?;
    let state = AppState::from_config(config)
        .await
        .context("Failed to initialise worker")?;

    match state.config.serve_port {
        Some(port) => serve(state, port).await,
        None => run_once(state).await,
    }
}

async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Local job API running on http://0.0.0.0:{}", port);

    axum::serve(listener, app::create_app(state))
        .await
        .context("Server error")
}

/// One-shot mode: one event in, one result out, then exit.
async fn run_once(state: AppState) -> anyhow::Result<()> {
    let output = match read_event(&state.config).await {
        Ok(raw) => JobService::handle_raw(&state, raw.as_bytes()).await,
        Err(e) => {
            error!("❌ Could not read job event: {:#}", e);
            ExecutionResult::failure(format!("could not read job event: {:#}", e))
        }
    };

    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}

async fn read_event(config: &WorkerConfig) -> anyhow::Result<String> {
    match &config.job_input_path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display())),
        None => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .context("reading stdin")?;
            Ok(raw)
        }
    }
}

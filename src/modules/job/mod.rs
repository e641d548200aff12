use axum::Router;
use axum::routing::post;
use crate::state::AppState;

pub mod dto;
pub mod error;
pub mod handler;
pub mod model;
pub mod orchestrator;
pub mod pipeline;
pub mod service;
pub mod validator;

#[cfg(test)]
pub mod mocks;

pub fn router() -> Router<AppState> {
    Router::new().route("/runsync", post(handler::run_sync))
}

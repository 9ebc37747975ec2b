//! Health check endpoint
//!
//! `/health` and `/healthz` answer 200 while the process runs. The body
//! reports whether a database connection could be taken from the pool.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;

use super::response::json_response;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    /// `online` or `degraded`
    pub status: &'static str,
    pub version: &'static str,
    /// Uptime in seconds
    pub uptime: u64,
    pub timestamp: String,
    pub database: bool,
    pub dev_mode: bool,
}

fn build_health_response(state: &AppState) -> HealthResponse {
    let database = state.services.db.conn().is_ok();
    HealthResponse {
        healthy: true,
        status: if database { "online" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        database,
        dev_mode: state.args.dev_mode,
    }
}

/// Liveness probe
pub fn health_check(state: &AppState) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &build_health_response(state))
}

//! Health check endpoints
//!
//! - /health, /healthz - liveness probe (is the service running?)
//! - /ready, /readyz   - readiness probe (can the service reach its store?)
//! - /version          - build information

use bytes::Bytes;
use hyper::{Response, StatusCode};
use http_body_util::Full;
use serde::Serialize;
use std::sync::Arc;

use crate::routes::respond::json_response;
use crate::server::AppState;

/// Health response body
#[derive(Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub status: &'static str,
    pub version: &'static str,
    /// Seconds since process start
    pub uptime: u64,
    pub timestamp: String,
    pub mode: String,
    #[serde(rename = "nodeId")]
    pub node_id: String,
    pub store: StoreHealth,
}

/// Document store reachability
#[derive(Serialize)]
pub struct StoreHealth {
    pub connected: bool,
    pub database: String,
}

fn build_health_response(state: &AppState, store_connected: bool) -> HealthResponse {
    let args = &state.args;

    let status = if store_connected { "online" } else { "degraded" };

    HealthResponse {
        healthy: true,
        status,
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        mode: if args.dev_mode {
            "development".to_string()
        } else {
            "production".to_string()
        },
        node_id: args.node_id.to_string(),
        store: StoreHealth {
            connected: store_connected,
            database: args.mongodb_db.clone(),
        },
    }
}

/// Handle liveness probe (/health, /healthz)
///
/// Returns 200 OK whenever the service is running; store status is
/// informational here.
pub async fn health_check(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let store_connected = state.mongo.ping().await.is_ok();
    json_response(StatusCode::OK, &build_health_response(&state, store_connected))
}

/// Handle readiness probe (/ready, /readyz)
///
/// Returns 200 OK only when the document store answers a ping; use this
/// for load-balancer checks.
pub async fn readiness_check(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let store_connected = state.mongo.ping().await.is_ok();
    let status = if store_connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    json_response(status, &build_health_response(&state, store_connected))
}

/// Version information for deployment verification
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    pub service: &'static str,
}

/// Handle version endpoint (/version)
pub fn version_info() -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &VersionResponse {
            version: env!("CARGO_PKG_VERSION"),
            service: "refuge",
        },
    )
}

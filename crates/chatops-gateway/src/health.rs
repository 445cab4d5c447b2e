use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use tracing::warn;

use crate::gateway_server::ChatopsGatewayState;

const HEALTHY: &str = "healthy";
const UNHEALTHY: &str = "unhealthy";

pub(crate) async fn handle_health(State(state): State<Arc<ChatopsGatewayState>>) -> Response {
    let database = match state.dispatcher.resolver().store().ping().await {
        Ok(()) => HEALTHY,
        Err(error) => {
            warn!(error = %error, "repository store health check failed");
            UNHEALTHY
        }
    };
    let overall = if database == HEALTHY { HEALTHY } else { UNHEALTHY };
    let status = if overall == HEALTHY {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(json!({
            "status": overall,
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            "services": {
                "database": database,
            },
        })),
    )
        .into_response()
}

pub(crate) async fn handle_liveness() -> &'static str {
    "alive"
}

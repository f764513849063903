use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{error::ApiResult, state::AppState};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: HashMap<String, String>,
}

/// Health check endpoint
///
/// Reports the store state and the configured model backend. The backend
/// itself is not contacted.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service status", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResult<Json<HealthResponse>> {
    let mut services = HashMap::new();

    let store_ok = state.store.list_threads().await.is_ok();
    services.insert(
        "store".to_string(),
        if store_ok { "available" } else { "unavailable" }.to_string(),
    );
    services.insert("model".to_string(), state.config.llm.model.clone());
    services.insert("model_backend".to_string(), state.config.llm.base_url.clone());

    Ok(Json(HealthResponse {
        status: if store_ok { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    }))
}

use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{db, AppState};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

/// Liveness and store-reachability probe. Always answers 200; the `database`
/// field reports whether the store responded to a ping.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service health", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match db::check_connection(&state.db).await {
        Ok(_) => "connected",
        Err(_) => "not initialized",
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        database: database.to_string(),
    })
}

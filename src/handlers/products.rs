use axum::{extract::State, response::Json};

use crate::{entities::product, errors::ServiceError, AppState};

/// Lists the full produce catalog, ordered by name.
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Catalog",
    responses(
        (status = 200, description = "Every catalog product, name ascending", body = Vec<product::Model>),
        (status = 503, description = "Store unreachable", body = crate::errors::ErrorResponse),
        (status = 500, description = "Query failure", body = crate::errors::ErrorResponse)
    )
)]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<product::Model>>, ServiceError> {
    let products = state.catalog.list_products().await?;
    Ok(Json(products))
}

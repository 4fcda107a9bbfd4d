use std::str::FromStr;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::order::{self, OrderStatus};
use crate::errors::ServiceError;
use crate::services::orders::PlaceOrderRequest;
use crate::AppState;

/// Acknowledgment body for a placed order. `order_id` carries the
/// customer-facing tracking code, distinct from the internal `id`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlaceOrderResponse {
    pub id: Uuid,
    pub order_id: String,
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusMessage {
    pub message: String,
}

/// Places a bulk produce order.
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = PlaceOrderResponse),
        (status = 400, description = "Validation failure", body = crate::errors::ErrorResponse),
        (status = 503, description = "Store unreachable", body = crate::errors::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::errors::ErrorResponse)
    )
)]
pub async fn place_order(
    State(state): State<AppState>,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<PlaceOrderResponse>), ServiceError> {
    let placed = state.orders.place_order(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(PlaceOrderResponse {
            id: placed.id,
            order_id: placed.order_number,
            message: "Order placed successfully".to_string(),
        }),
    ))
}

/// Looks an order up by its tracking code, case-insensitively.
#[utoipa::path(
    get,
    path = "/api/orders/{order_id}",
    tag = "Orders",
    params(
        ("order_id" = String, Path, description = "Customer-facing order code (case-insensitive)")
    ),
    responses(
        (status = 200, description = "The matching order", body = order::Model),
        (status = 404, description = "No order with that code", body = crate::errors::ErrorResponse)
    )
)]
pub async fn track_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<order::Model>, ServiceError> {
    let order = state.orders.get_order_by_number(&order_id).await?;
    Ok(Json(order))
}

/// Lists every order, newest first.
#[utoipa::path(
    get,
    path = "/api/admin/orders",
    tag = "Admin",
    responses(
        (status = 200, description = "All orders, newest first", body = Vec<order::Model>),
        (status = 503, description = "Store unreachable", body = crate::errors::ErrorResponse)
    )
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
) -> Result<Json<Vec<order::Model>>, ServiceError> {
    let orders = state.orders.list_orders().await?;
    Ok(Json(orders))
}

/// Updates an order's status by internal id.
#[utoipa::path(
    put,
    path = "/api/admin/orders/{id}",
    tag = "Admin",
    params(
        ("id" = String, Path, description = "Internal order identifier")
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = StatusMessage),
        (status = 400, description = "Invalid status value", body = crate::errors::ErrorResponse),
        (status = 404, description = "No such order", body = crate::errors::ErrorResponse)
    )
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> Result<Json<StatusMessage>, ServiceError> {
    let raw_status = request.status.unwrap_or_default();
    let status = OrderStatus::from_str(&raw_status)
        .map_err(|_| ServiceError::InvalidStatus(raw_status.clone()))?;

    // Identifiers that do not parse cannot name an existing order.
    let order_id = Uuid::parse_str(&id)
        .map_err(|_| ServiceError::NotFound("Order not found".to_string()))?;

    state.orders.update_status(order_id, status).await?;

    Ok(Json(StatusMessage {
        message: "Order status updated successfully".to_string(),
    }))
}

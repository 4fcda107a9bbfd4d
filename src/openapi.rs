use axum::response::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Harvest API",
        version = "1.0.0",
        description = r#"
# Harvest Bulk Produce API

Backend for bulk produce sales: a seeded product catalog, bulk order
placement, order tracking by code, and delivery administration.

## Error Handling

Failing endpoints return a consistent error body:

```json
{
  "error": "Bad Request",
  "message": "Validation error: All fields are required",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#
    ),
    tags(
        (name = "Catalog", description = "Produce catalog endpoints"),
        (name = "Orders", description = "Order placement and tracking endpoints"),
        (name = "Admin", description = "Administrative order endpoints"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        crate::handlers::products::list_products,
        crate::handlers::orders::place_order,
        crate::handlers::orders::track_order,
        crate::handlers::orders::list_all_orders,
        crate::handlers::orders::update_order_status,
        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            crate::entities::product::Model,
            crate::entities::product::ProductCategory,
            crate::entities::order::Model,
            crate::entities::order::OrderStatus,
            crate::services::orders::PlaceOrderRequest,
            crate::handlers::orders::PlaceOrderResponse,
            crate::handlers::orders::UpdateOrderStatusRequest,
            crate::handlers::orders::StatusMessage,
            crate::handlers::health::HealthResponse,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

/// Serves the generated OpenAPI document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_covers_the_api() {
        let openapi = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Harvest API"));
        assert!(json.contains("/api/products"));
        assert!(json.contains("/api/orders"));
        assert!(json.contains("/api/admin/orders"));
    }
}

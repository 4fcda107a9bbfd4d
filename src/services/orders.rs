use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::order::{self, Entity as OrderEntity, OrderStatus};
use crate::entities::product::Entity as ProductEntity;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Customer-facing order codes: prefix plus 8 uppercase hex characters.
const ORDER_NUMBER_PREFIX: &str = "ORD-";
const ORDER_NUMBER_SUFFIX_LEN: usize = 8;

/// How many collision-checked attempts to make before giving up. The suffix
/// space is 16^8, so a second attempt is already vanishingly rare.
const ORDER_NUMBER_ATTEMPTS: usize = 5;

/// Wire-level order placement request. Fields are optional so that presence
/// is validated here, in order, rather than by the JSON deserializer.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub buyer_name: Option<String>,
    #[serde(default)]
    pub delivery_address: Option<String>,
}

/// Acknowledgment returned for a successfully placed order.
#[derive(Debug, Serialize)]
pub struct PlacedOrder {
    pub id: Uuid,
    pub order_number: String,
}

#[derive(Debug)]
struct ValidatedOrder {
    product_id: String,
    product_name: String,
    quantity: i32,
    buyer_name: String,
    delivery_address: String,
}

/// Checks the placement request field by field, short-circuiting on the first
/// failure so the caller always sees the earliest applicable message.
fn validate_request(request: &PlaceOrderRequest) -> Result<ValidatedOrder, ServiceError> {
    fn non_empty(value: &Option<String>) -> Option<&str> {
        value.as_deref().filter(|s| !s.trim().is_empty())
    }

    let (Some(product_id), Some(product_name), Some(quantity), Some(buyer_name), Some(address)) = (
        non_empty(&request.product_id),
        non_empty(&request.product_name),
        request.quantity,
        non_empty(&request.buyer_name),
        non_empty(&request.delivery_address),
    ) else {
        return Err(ServiceError::ValidationError(
            "All fields are required".to_string(),
        ));
    };

    if !(1..=10_000).contains(&quantity) {
        return Err(ServiceError::ValidationError(
            "Quantity must be between 1 and 10,000".to_string(),
        ));
    }

    let buyer_name = buyer_name.trim();
    let address = address.trim();
    if buyer_name.chars().count() < 2 || address.chars().count() < 10 {
        return Err(ServiceError::ValidationError(
            "Invalid buyer name or address".to_string(),
        ));
    }

    Ok(ValidatedOrder {
        product_id: product_id.trim().to_string(),
        product_name: product_name.to_string(),
        quantity: quantity as i32,
        buyer_name: buyer_name.to_string(),
        delivery_address: address.to_string(),
    })
}

fn generate_order_number() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!(
        "{}{}",
        ORDER_NUMBER_PREFIX,
        hex[..ORDER_NUMBER_SUFFIX_LEN].to_ascii_uppercase()
    )
}

/// Service for placing, tracking, and administering produce orders.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderService {
    /// Creates a new order service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Places a new order: validates the request, resolves the referenced
    /// product, allocates a unique order code, and persists the row with
    /// status Pending.
    #[instrument(skip(self, request))]
    pub async fn place_order(
        &self,
        request: PlaceOrderRequest,
    ) -> Result<PlacedOrder, ServiceError> {
        let valid = validate_request(&request)?;

        // An order must reference a real catalog product.
        let unknown_product = || {
            ServiceError::ValidationError(format!(
                "Order references an unknown product ({})",
                valid.product_id
            ))
        };
        let product_id = Uuid::parse_str(&valid.product_id).map_err(|_| unknown_product())?;
        if self.find_product(product_id).await?.is_none() {
            return Err(unknown_product());
        }

        let db = &*self.db_pool;
        let now = Utc::now();
        let order_id = Uuid::new_v4();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for order placement");
            ServiceError::from_db(e)
        })?;

        let order_number = self.reserve_order_number(&txn).await?;

        let order_active_model = order::ActiveModel {
            id: Set(order_id),
            order_number: Set(order_number.clone()),
            product_id: Set(product_id),
            product_name: Set(valid.product_name),
            quantity: Set(valid.quantity),
            buyer_name: Set(valid.buyer_name),
            delivery_address: Set(valid.delivery_address),
            status: Set(OrderStatus::Pending.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let order_model = order_active_model.insert(&txn).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to create order in database");
            ServiceError::from_db(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to commit order placement transaction");
            ServiceError::from_db(e)
        })?;

        info!(order_id = %order_id, order_number = %order_number, "Order placed successfully");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::OrderPlaced {
                    order_id,
                    order_number: order_number.clone(),
                })
                .await
            {
                warn!(error = %e, order_id = %order_id, "Failed to send order placed event");
            }
        }

        Ok(PlacedOrder {
            id: order_model.id,
            order_number: order_model.order_number,
        })
    }

    /// Retrieves an order by its customer-facing code. The lookup is
    /// case-insensitive: codes are uppercased before the exact match.
    #[instrument(skip(self))]
    pub async fn get_order_by_number(&self, code: &str) -> Result<order::Model, ServiceError> {
        let db = &*self.db_pool;
        let normalized = code.trim().to_ascii_uppercase();

        let order = OrderEntity::find()
            .filter(order::Column::OrderNumber.eq(normalized.clone()))
            .one(db)
            .await
            .map_err(ServiceError::from_db)?;

        order.ok_or_else(|| {
            info!(order_number = %normalized, "Order not found");
            ServiceError::NotFound("Order not found".to_string())
        })
    }

    /// Lists every order, newest first.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<order::Model>, ServiceError> {
        let db = &*self.db_pool;

        let orders = OrderEntity::find()
            .order_by_desc(order::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::from_db)?;

        info!(count = orders.len(), "Orders listed successfully");
        Ok(orders)
    }

    /// Updates an order's status by internal id.
    ///
    /// The lifecycle is one-way: a delivered order cannot be moved back to
    /// pending. Re-applying the current status is accepted and leaves the row
    /// untouched.
    #[instrument(skip(self), fields(order_id = %order_id, new_status = %new_status))]
    pub async fn update_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<order::Model, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to start transaction for status update");
            ServiceError::from_db(e)
        })?;

        let order = OrderEntity::find_by_id(order_id)
            .one(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to find order for status update");
                ServiceError::from_db(e)
            })?;

        let order = order.ok_or_else(|| {
            warn!(order_id = %order_id, "Order not found for status update");
            ServiceError::NotFound("Order not found".to_string())
        })?;

        let current = OrderStatus::from_str(&order.status).map_err(|_| {
            ServiceError::InternalError(format!(
                "Order {} carries unknown status {:?}",
                order.id, order.status
            ))
        })?;

        if current == new_status {
            info!(order_id = %order_id, status = %current, "Status unchanged; nothing to update");
            return Ok(order);
        }

        if current == OrderStatus::Delivered && new_status == OrderStatus::Pending {
            return Err(ServiceError::InvalidOperation(
                "A delivered order cannot be moved back to pending".to_string(),
            ));
        }

        let old_status = order.status.clone();

        let mut order_active_model: order::ActiveModel = order.into();
        order_active_model.status = Set(new_status.to_string());
        order_active_model.updated_at = Set(now);

        let updated_order = order_active_model.update(&txn).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to update order status");
            ServiceError::from_db(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to commit status update transaction");
            ServiceError::from_db(e)
        })?;

        info!(order_id = %order_id, old_status = %old_status, new_status = %new_status, "Order status updated successfully");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::OrderStatusChanged {
                    order_id,
                    old_status,
                    new_status: new_status.to_string(),
                })
                .await
            {
                warn!(error = %e, order_id = %order_id, "Failed to send order status changed event");
            }
        }

        Ok(updated_order)
    }

    async fn find_product(
        &self,
        product_id: Uuid,
    ) -> Result<Option<crate::entities::product::Model>, ServiceError> {
        ProductEntity::find_by_id(product_id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::from_db)
    }

    /// Allocates a fresh order code, checked against the unique constraint so
    /// the uniqueness contract is explicit rather than probabilistic.
    async fn reserve_order_number<C: ConnectionTrait>(
        &self,
        conn: &C,
    ) -> Result<String, ServiceError> {
        for _ in 0..ORDER_NUMBER_ATTEMPTS {
            let candidate = generate_order_number();
            let taken = OrderEntity::find()
                .filter(order::Column::OrderNumber.eq(candidate.clone()))
                .count(conn)
                .await
                .map_err(ServiceError::from_db)?;
            if taken == 0 {
                return Ok(candidate);
            }
            warn!(order_number = %candidate, "Order number collision; retrying");
        }

        Err(ServiceError::InternalError(
            "Could not allocate a unique order number".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    fn full_request() -> PlaceOrderRequest {
        PlaceOrderRequest {
            product_id: Some(Uuid::new_v4().to_string()),
            product_name: Some("Tomatoes".to_string()),
            quantity: Some(25),
            buyer_name: Some("Jo Smith".to_string()),
            delivery_address: Some("123 Main Street, Springfield".to_string()),
        }
    }

    #[test]
    fn valid_request_passes() {
        let valid = validate_request(&full_request()).expect("request should validate");
        assert_eq!(valid.quantity, 25);
        assert_eq!(valid.buyer_name, "Jo Smith");
    }

    #[rstest]
    #[case::no_product_id(PlaceOrderRequest { product_id: None, ..full_request() })]
    #[case::no_product_name(PlaceOrderRequest { product_name: None, ..full_request() })]
    #[case::no_quantity(PlaceOrderRequest { quantity: None, ..full_request() })]
    #[case::no_buyer(PlaceOrderRequest { buyer_name: None, ..full_request() })]
    #[case::no_address(PlaceOrderRequest { delivery_address: None, ..full_request() })]
    #[case::blank_buyer(PlaceOrderRequest { buyer_name: Some("   ".into()), ..full_request() })]
    fn missing_fields_are_rejected_first(#[case] request: PlaceOrderRequest) {
        let err = validate_request(&request).unwrap_err();
        assert_matches!(
            err,
            ServiceError::ValidationError(msg) if msg == "All fields are required"
        );
    }

    #[rstest]
    #[case(0)]
    #[case(-1)]
    #[case(10_001)]
    fn out_of_range_quantities_are_rejected(#[case] quantity: i64) {
        let request = PlaceOrderRequest {
            quantity: Some(quantity),
            ..full_request()
        };
        let err = validate_request(&request).unwrap_err();
        assert_matches!(
            err,
            ServiceError::ValidationError(msg) if msg == "Quantity must be between 1 and 10,000"
        );
    }

    #[rstest]
    #[case(1)]
    #[case(10_000)]
    fn boundary_quantities_are_accepted(#[case] quantity: i64) {
        let request = PlaceOrderRequest {
            quantity: Some(quantity),
            ..full_request()
        };
        assert!(validate_request(&request).is_ok());
    }

    #[test]
    fn short_buyer_name_is_rejected() {
        let request = PlaceOrderRequest {
            buyer_name: Some(" J ".to_string()),
            ..full_request()
        };
        let err = validate_request(&request).unwrap_err();
        assert_matches!(
            err,
            ServiceError::ValidationError(msg) if msg == "Invalid buyer name or address"
        );
    }

    #[test]
    fn short_address_is_rejected_and_boundary_accepted() {
        let nine = "12 Main S".to_string();
        assert_eq!(nine.len(), 9);
        let err = validate_request(&PlaceOrderRequest {
            delivery_address: Some(nine),
            ..full_request()
        })
        .unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(_));

        let ten = "12 Main St".to_string();
        assert_eq!(ten.len(), 10);
        assert!(validate_request(&PlaceOrderRequest {
            delivery_address: Some(ten),
            ..full_request()
        })
        .is_ok());
    }

    #[test]
    fn trimmed_lengths_are_what_count() {
        // 10 raw characters but only 9 after trimming
        let padded = " 12 Main S".to_string();
        let err = validate_request(&PlaceOrderRequest {
            delivery_address: Some(padded),
            ..full_request()
        })
        .unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(_));
    }

    #[test]
    fn order_numbers_have_the_public_shape() {
        for _ in 0..100 {
            let code = generate_order_number();
            let suffix = code.strip_prefix("ORD-").expect("prefix");
            assert_eq!(suffix.len(), 8);
            assert!(suffix
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn order_numbers_do_not_repeat_in_practice() {
        let codes: std::collections::HashSet<String> =
            (0..256).map(|_| generate_order_number()).collect();
        assert_eq!(codes.len(), 256);
    }
}

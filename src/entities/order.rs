use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

/// Order lifecycle state. Persisted as its exact string form; the admin
/// status-update endpoint only accepts these two spellings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum OrderStatus {
    Pending,
    Delivered,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = Order)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Internal identifier, distinct from the customer-facing order code
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Customer-facing order code ("ORD-" + 8 uppercase hex characters),
    /// globally unique and immutable once assigned
    #[sea_orm(unique)]
    pub order_number: String,

    pub product_id: Uuid,

    /// Denormalized copy of the product name so historical orders stay
    /// readable if the catalog record ever changes
    pub product_name: String,

    pub quantity: i32,
    pub buyer_name: String,
    pub delivery_address: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_parsing_is_exact() {
        assert_eq!(
            OrderStatus::from_str("Pending").unwrap(),
            OrderStatus::Pending
        );
        assert_eq!(
            OrderStatus::from_str("Delivered").unwrap(),
            OrderStatus::Delivered
        );
        assert!(OrderStatus::from_str("pending").is_err());
        assert!(OrderStatus::from_str("Shipped").is_err());
    }

    #[test]
    fn status_displays_its_persisted_form() {
        assert_eq!(OrderStatus::Pending.to_string(), "Pending");
        assert_eq!(OrderStatus::Delivered.to_string(), "Delivered");
    }
}

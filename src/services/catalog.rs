use std::sync::Arc;

use sea_orm::{EntityTrait, QueryOrder};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::product::{self, Entity as ProductEntity};
use crate::errors::ServiceError;

/// Read-only access to the seeded produce catalog.
#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DbPool>,
}

impl CatalogService {
    /// Creates a new catalog service instance
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Lists every product, ordered by name ascending. No pagination; the
    /// catalog is a small fixed set.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<product::Model>, ServiceError> {
        let db = &*self.db_pool;

        let products = ProductEntity::find()
            .order_by_asc(product::Column::Name)
            .all(db)
            .await
            .map_err(ServiceError::from_db)?;

        info!(count = products.len(), "Products listed successfully");
        Ok(products)
    }

    /// Fetches a single product by id.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(
        &self,
        product_id: Uuid,
    ) -> Result<Option<product::Model>, ServiceError> {
        let db = &*self.db_pool;

        ProductEntity::find_by_id(product_id)
            .one(db)
            .await
            .map_err(ServiceError::from_db)
    }
}

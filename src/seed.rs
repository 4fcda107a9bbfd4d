//! Startup catalog seeding.
//!
//! The catalog is fixed: twelve bulk-produce products inserted the first time
//! the service starts against an empty store. A non-empty product table is
//! left untouched, so re-running the binary never duplicates rows.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{EntityTrait, PaginatorTrait, Set};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::product::{self, Entity as ProductEntity, ProductCategory};
use crate::errors::ServiceError;

const SEED_UNIT: &str = "kg";

fn seed_products() -> Vec<(&'static str, Decimal, ProductCategory)> {
    use ProductCategory::{Fruit, Vegetable};
    vec![
        ("Tomatoes", dec!(2.50), Vegetable),
        ("Potatoes", dec!(1.80), Vegetable),
        ("Onions", dec!(1.50), Vegetable),
        ("Carrots", dec!(2.00), Vegetable),
        ("Spinach", dec!(3.00), Vegetable),
        ("Cabbage", dec!(1.20), Vegetable),
        ("Apples", dec!(3.50), Fruit),
        ("Bananas", dec!(2.20), Fruit),
        ("Oranges", dec!(4.00), Fruit),
        ("Mangoes", dec!(5.50), Fruit),
        ("Grapes", dec!(6.00), Fruit),
        ("Watermelon", dec!(1.00), Fruit),
    ]
}

/// Seeds the product catalog if the table is empty.
///
/// Returns the number of rows inserted (0 when the catalog already exists).
#[instrument(skip(db))]
pub async fn seed_catalog(db: &DbPool) -> Result<u64, ServiceError> {
    let existing = ProductEntity::find()
        .count(db)
        .await
        .map_err(ServiceError::from_db)?;

    if existing > 0 {
        info!(existing, "Product catalog already seeded; skipping");
        return Ok(0);
    }

    let now = Utc::now();
    let rows: Vec<product::ActiveModel> = seed_products()
        .into_iter()
        .map(|(name, price, category)| product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            price_per_unit: Set(price),
            unit: Set(SEED_UNIT.to_string()),
            image_url: Set(None),
            category: Set(category.to_string()),
            created_at: Set(now),
        })
        .collect();

    let inserted = rows.len() as u64;
    ProductEntity::insert_many(rows)
        .exec(db)
        .await
        .map_err(ServiceError::from_db)?;

    info!(inserted, "Seeded product catalog");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_list_is_twelve_split_evenly() {
        let products = seed_products();
        assert_eq!(products.len(), 12);
        let vegetables = products
            .iter()
            .filter(|(_, _, c)| *c == ProductCategory::Vegetable)
            .count();
        let fruits = products
            .iter()
            .filter(|(_, _, c)| *c == ProductCategory::Fruit)
            .count();
        assert_eq!(vegetables, 6);
        assert_eq!(fruits, 6);
    }

    #[test]
    fn seed_prices_are_positive() {
        for (name, price, _) in seed_products() {
            assert!(price > Decimal::ZERO, "{} must have a positive price", name);
        }
    }
}

//! Harvest API Library
//!
//! This crate provides the core functionality for the Harvest API: a produce
//! catalog, bulk order placement, order tracking, and delivery administration.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod seed;
pub mod services;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::services::{catalog::CatalogService, orders::OrderService};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<db::DbPool>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub catalog: CatalogService,
    pub orders: OrderService,
}

impl AppState {
    pub fn new(
        db: Arc<db::DbPool>,
        config: config::AppConfig,
        event_sender: events::EventSender,
    ) -> Self {
        let catalog = CatalogService::new(db.clone());
        let orders = OrderService::new(db.clone(), Some(Arc::new(event_sender.clone())));
        Self {
            db,
            config,
            event_sender,
            catalog,
            orders,
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<axum::Json<T>, errors::ServiceError>;

/// Routes mounted under `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/products", get(handlers::products::list_products))
        // Orders (public)
        .route("/orders", post(handlers::orders::place_order))
        .route("/orders/{order_id}", get(handlers::orders::track_order))
        // Orders (admin)
        .route("/admin/orders", get(handlers::orders::list_all_orders))
        .route(
            "/admin/orders/{id}",
            put(handlers::orders::update_order_status),
        )
        // Service health
        .route("/health", get(handlers::health::health_check))
        // Generated API document
        .route("/openapi.json", get(openapi::openapi_json))
}

/// Builds the full application router around the shared state.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "harvest-api up" }))
        .nest("/api", api_routes())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

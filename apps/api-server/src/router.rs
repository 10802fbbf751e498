//! Router configuration for the HTTP API.
//!
//! ```text
//! /health                      open
//! /api/v1/customers/**  ┐
//! /api/v1/products/**   ├──►   X-API-KEY checked by auth::require_api_key
//! /api/v1/invoices/**   ┘
//! ```

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth;
use crate::handlers::{self, customer, invoice, product};
use crate::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Customers
        .route(
            "/customers",
            get(customer::list_customers).post(customer::create_customer),
        )
        .route(
            "/customers/{id}",
            get(customer::get_customer).put(customer::update_customer),
        )
        .route("/customers/{id}/status", put(customer::update_customer_status))
        // Products
        .route(
            "/products",
            get(product::list_products).post(product::create_product),
        )
        .route("/products/all", get(product::all_products))
        .route("/products/search", get(product::search_products))
        .route("/products/upload", post(product::upload_products))
        .route("/products/{id}", put(product::update_product))
        .route("/products/{id}/status", put(product::update_product_status))
        // Invoices
        .route(
            "/invoices",
            get(invoice::list_invoices).post(invoice::create_invoice),
        )
        .route("/invoices/revenue", get(invoice::revenue))
        .route("/invoices/export/excel", get(invoice::export_excel))
        .route("/invoices/{id}", put(invoice::update_invoice))
        .route("/invoices/{id}/export", get(invoice::export_pdf))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_v1)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use pos_db::Database;

    #[tokio::test]
    async fn test_router_creation() {
        let config = ServerConfig::for_tests();
        let db = Database::new(config.db_config()).await.unwrap();
        let _router = create_router(AppState::new(db, config));
    }
}

//! Application state for the HTTP server.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::services::{CustomerService, InvoiceService, ProductService};
use pos_db::Database;

/// Shared application state passed to all handlers.
///
/// Services hold their own repository handles, each a clone of the one
/// pool, so cloning the state per request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ServerConfig>,
    pub customers: CustomerService,
    pub products: ProductService,
    pub invoices: InvoiceService,
}

impl AppState {
    /// Wires every service to its repositories.
    pub fn new(db: Database, config: ServerConfig) -> Self {
        let customers = CustomerService::new(db.customers());
        let products = ProductService::new(db.products());
        let invoices = InvoiceService::new(db.invoices(), db.customers(), db.products());

        AppState {
            db,
            config: Arc::new(config),
            customers,
            products,
            invoices,
        }
    }
}

//! Service layer.
//!
//! Each service owns the repositories it needs, handed over at construction
//! time, and holds all branching business logic. Handlers stay thin.

pub mod customer_service;
pub mod invoice_service;
pub mod product_service;

pub use customer_service::CustomerService;
pub use invoice_service::{ExcelReport, InvoiceService};
pub use product_service::ProductService;

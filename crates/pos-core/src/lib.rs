//! # pos-core: Pure Business Logic for the POS Back-Office
//!
//! Entities, transfer objects, mappers and validation rules shared by the
//! database layer and the HTTP API. Nothing in this crate performs I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    POS Back-Office Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                HTTP handlers (apps/api-server)                  │   │
//! │  │    customers ── products ── invoices ── exports ── revenue      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ services                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ pos-core (THIS CRATE) ★                         │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────┐  │   │
//! │  │   │  types  │ │   dto   │ │ mapper  │ │validation│ │ report │  │   │
//! │  │   │Customer │ │ *Dto    │ │entity ⇄ │ │  field   │ │filename│  │   │
//! │  │   │Product  │ │criteria │ │  DTO    │ │  errors  │ │revenue │  │   │
//! │  │   │Invoice  │ │ Page    │ │         │ │          │ │        │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └──────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    pos-db (Database Layer)                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Persisted entities (Customer, Product, Invoice, ApiKey)
//! - [`dto`] - Request/response/criteria shapes crossing the HTTP boundary
//! - [`mapper`] - Entity ⇄ DTO translation
//! - [`money`] - Integer-cents money type
//! - [`page`] - Pagination request and page envelope
//! - [`validation`] - Boundary validation returning field errors
//! - [`report`] - Excel report filename rules and revenue aggregation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use pos_core::report::excel_report_filename;
//!
//! let name = excel_report_filename(Some("Jane Doe"), Some(5), Some(2024)).unwrap();
//! assert_eq!(name, "invoice_report_Jane_Doe_5_2024.xlsx");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod dto;
pub mod error;
pub mod mapper;
pub mod money;
pub mod page;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, FieldError, FieldErrors, ValidationError};
pub use money::Money;
pub use page::{Page, PageRequest};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Page size used when the client does not send one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Maximum number of line items on a single invoice.
pub const MAX_INVOICE_ITEMS: usize = 100;

/// Maximum quantity of a single product on one invoice line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest unit price a product may have, in cents (10,000,000.00).
///
/// Keeps `MAX_ITEM_QUANTITY * MAX_INVOICE_ITEMS` lines at this price far
/// inside i64, so invoice and revenue totals stay exact.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000;

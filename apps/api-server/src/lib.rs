//! # POS API
//!
//! REST back office for a point of sale: customers, products, invoices,
//! PDF and Excel exports, revenue reports.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              POS API                                    │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │CustomerService │  │ ProductService │  │  InvoiceService            ││
//! │  │                │  │                │  │                            ││
//! │  │ • List / Get   │  │ • List / Search│  │ • Search by criteria       ││
//! │  │ • Create       │  │ • Create       │  │ • Create / Update          ││
//! │  │ • Update       │  │ • Update       │  │ • Export PDF / Excel       ││
//! │  │ • Toggle status│  │ • Set status   │  │ • Revenue                  ││
//! │  │                │  │ • CSV import   │  │                            ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                               │  │
//! │  │                                                                   │  │
//! │  │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────┐│  │
//! │  │  │    SQLite    │  │   Exports    │  │    API key auth          ││  │
//! │  │  │   (pos-db)   │  │              │  │                          ││  │
//! │  │  │ Primary data │  │ lopdf        │  │ X-API-KEY header         ││  │
//! │  │  │ store        │  │ xlsxwriter   │  │ api_keys table           ││  │
//! │  │  └──────────────┘  └──────────────┘  └──────────────────────────┘│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `HOST` - bind address (default: 0.0.0.0)
//! - `PORT` - HTTP port (default: 8080)
//! - `DATABASE_PATH` - SQLite file, `:memory:` for a throwaway database
//! - `DB_MAX_CONNECTIONS` - pool size (default: 5)
//! - `API_KEY_REQUIRED` - enforce `X-API-KEY` (default: true)
//! - `BOOTSTRAP_API_KEY` - key stored at startup when none is active
//! - `MAX_UPLOAD_BYTES` - request body limit (default: 10 MiB)

pub mod auth;
pub mod config;
pub mod error;
pub mod export;
pub mod handlers;
pub mod import;
pub mod router;
pub mod services;
pub mod state;

// Re-exports
pub use config::ServerConfig;
pub use error::{ApiError, ServiceError};
pub use router::create_router;
pub use state::AppState;

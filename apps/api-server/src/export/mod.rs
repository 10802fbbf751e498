//! # Report Rendering
//!
//! CPU-bound renderers for invoice documents. Both return the whole file as
//! bytes so a failure never leaves a half-written response behind.
//!
//! ```text
//! ┌──────────────┬──────────────────────┬──────────────────────────────────┐
//! │ Renderer     │ Crate                │ Output                           │
//! ├──────────────┼──────────────────────┼──────────────────────────────────┤
//! │ pdf          │ lopdf                │ one invoice, A4, paginated       │
//! │ excel        │ rust_xlsxwriter      │ one row per invoice line item    │
//! └──────────────┴──────────────────────┴──────────────────────────────────┘
//! ```
//!
//! Callers run these on `tokio::task::spawn_blocking`.

pub mod excel;
pub mod pdf;

/// Rendering failures.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("Excel rendering failed: {0}")]
    Excel(#[from] rust_xlsxwriter::XlsxError),

    #[error("Report total exceeds the supported amount range")]
    TotalOverflow,
}

impl From<lopdf::Error> for ExportError {
    fn from(err: lopdf::Error) -> Self {
        ExportError::Pdf(err.to_string())
    }
}

//! # Domain Types
//!
//! Persisted entities of the POS back-office.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │     Invoice     │   │   InvoiceItem   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  customer_id    │◄──│  invoice_id     │       │
//! │  │  name           │   │  invoice_date   │   │  product_id ────┼──┐    │
//! │  │  phone_number   │   │  total_cents    │   │  unit_price     │  │    │
//! │  │  status         │   │  items          │   │  quantity       │  │    │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘  │    │
//! │                                                                    │    │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐  │    │
//! │  │     Status      │   │     ApiKey      │   │    Product      │◄─┘    │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Active         │   │  id (i64)       │   │  id             │       │
//! │  │  Deactive       │   │  api_key        │   │  price_cents    │       │
//! │  └─────────────────┘   │  active         │   │  quantity       │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Invoice items copy the product name and unit price at the moment the
//! invoice is written. Later price changes never rewrite old invoices.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;

// =============================================================================
// Status
// =============================================================================

/// Two-valued lifecycle flag shared by customers and products.
///
/// Stored as TEXT (`'Active'` / `'Deactive'`), serialized the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum Status {
    Active,
    Deactive,
}

impl Status {
    /// The other of the two states.
    #[inline]
    pub const fn toggled(self) -> Status {
        match self {
            Status::Active => Status::Deactive,
            Status::Deactive => Status::Active,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Deactive => "Deactive",
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::Active
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ValidationError;

    /// Case-insensitive, so `?status=ACTIVE` works as well as `?status=Active`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Status::Active),
            "deactive" => Ok(Status::Deactive),
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: vec!["Active".to_string(), "Deactive".to_string()],
            }),
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer that invoices are issued to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub name: String,

    pub phone_number: String,

    pub status: Status,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Customer {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
///
/// Dates are date-only; the catalog has never tracked time of day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Identifier; generated as a UUID v4 when the client does not send one.
    pub id: String,

    pub name: String,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Stock on hand.
    pub quantity: i64,

    pub status: Status,

    pub created_at: NaiveDate,

    pub updated_at: NaiveDate,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }

    /// Whether `requested` units can be taken from stock.
    #[inline]
    pub fn has_stock(&self, requested: i64) -> bool {
        self.quantity >= requested
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// An invoice header plus its items.
///
/// `customer_name` is not a column of `invoices`; repositories fill it from a
/// join so listing and export never need a second query per row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: String,

    pub customer_id: String,

    pub customer_name: String,

    pub invoice_date: NaiveDate,

    /// Sum of all item line totals, in cents.
    pub total_cents: i64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Loaded separately from `invoice_items`.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<InvoiceItem>,
}

impl Invoice {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Sum of the line totals of `items`.
    pub fn compute_total(items: &[InvoiceItem]) -> CoreResult<Money> {
        Money::checked_sum(items.iter().map(InvoiceItem::line_total))
            .ok_or_else(|| CoreError::AmountOverflow("invoice total".to_string()))
    }
}

// =============================================================================
// Invoice Item
// =============================================================================

/// One line of an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InvoiceItem {
    pub id: String,

    pub invoice_id: String,

    pub product_id: String,

    /// Product name at the time of sale.
    pub product_name: String,

    /// Unit price at the time of sale, in cents.
    pub unit_price_cents: i64,

    pub quantity: i64,

    /// `unit_price_cents * quantity`.
    pub line_total_cents: i64,
}

impl InvoiceItem {
    /// Builds a line from the current state of `product`.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use pos_core::{InvoiceItem, Product, Status};
    ///
    /// let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    /// let product = Product {
    ///     id: "p-1".into(),
    ///     name: "Coffee".into(),
    ///     price_cents: 350,
    ///     quantity: 10,
    ///     status: Status::Active,
    ///     created_at: day,
    ///     updated_at: day,
    /// };
    ///
    /// let item = InvoiceItem::snapshot("inv-1", &product, 2).unwrap();
    /// assert_eq!(item.product_name, "Coffee");
    /// assert_eq!(item.line_total_cents, 700);
    /// ```
    pub fn snapshot(invoice_id: &str, product: &Product, quantity: i64) -> CoreResult<InvoiceItem> {
        let line_total = product
            .price()
            .checked_multiply_quantity(quantity)
            .ok_or_else(|| CoreError::AmountOverflow(format!("line total of product {}", product.id)))?;

        Ok(InvoiceItem {
            id: uuid::Uuid::new_v4().to_string(),
            invoice_id: invoice_id.to_string(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity,
            line_total_cents: line_total.cents(),
        })
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// API Key
// =============================================================================

/// A key accepted in the `X-API-KEY` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ApiKey {
    pub id: i64,

    pub api_key: String,

    pub active: bool,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

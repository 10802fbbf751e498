//! # Transfer Objects
//!
//! Shapes that cross the HTTP boundary. All of them use camelCase JSON and
//! export TypeScript definitions for the web frontend.
//!
//! ```text
//! ┌──────────────────────┬──────────────────────────────────────────────────┐
//! │ Direction            │ Types                                            │
//! ├──────────────────────┼──────────────────────────────────────────────────┤
//! │ request body         │ CustomerSaveDto, ProductSaveDto, InvoiceSaveDto  │
//! │ query string         │ InvoiceSearchCriteria, InvoiceExportCriteria,    │
//! │                      │ RevenueQuery, StatusQuery, NameQuery             │
//! │ response body        │ CustomerDto, ProductDto, InvoiceDto,             │
//! │                      │ RevenueShowDto                                   │
//! └──────────────────────┴──────────────────────────────────────────────────┘
//! ```
//!
//! Request bodies default missing fields instead of failing deserialization,
//! so validation can report every missing field at once.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use ts_rs::TS;

use crate::types::Status;

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomerDto {
    pub id: String,
    pub name: String,
    pub phone_number: String,
    pub status: Status,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /customers` and `PUT /customers/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct CustomerSaveDto {
    pub name: String,
    pub phone_number: String,
}

// =============================================================================
// Product
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub quantity: i64,
    pub status: Status,
    #[ts(as = "String")]
    pub created_at: NaiveDate,
    #[ts(as = "String")]
    pub updated_at: NaiveDate,
}

/// Body of `POST /products` and `PUT /products/{id}`.
///
/// `id` is honored on create only. `status` is accepted for compatibility
/// but new products always start Active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct ProductSaveDto {
    pub id: Option<String>,
    pub name: String,
    pub price_cents: i64,
    pub quantity: i64,
    pub status: Option<Status>,
}

// =============================================================================
// Invoice
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InvoiceItemDto {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub line_total_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InvoiceDto {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    #[ts(as = "String")]
    pub invoice_date: NaiveDate,
    pub total_cents: i64,
    pub items: Vec<InvoiceItemDto>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct InvoiceItemSaveDto {
    pub product_id: String,
    pub quantity: i64,
}

/// Body of `POST /invoices` and `PUT /invoices/{id}`.
///
/// A missing `invoiceDate` means today.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct InvoiceSaveDto {
    pub customer_id: String,
    #[ts(as = "Option<String>")]
    pub invoice_date: Option<NaiveDate>,
    pub items: Vec<InvoiceItemSaveDto>,
}

// =============================================================================
// Query Strings
// =============================================================================

/// Filters for `GET /invoices`. Every present field narrows the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct InvoiceSearchCriteria {
    pub customer_id: Option<String>,
    /// Substring of the customer name.
    pub customer_name: Option<String>,
    /// Inclusive lower bound on the invoice date.
    #[ts(as = "Option<String>")]
    #[serde(deserialize_with = "blank_as_none")]
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on the invoice date.
    #[ts(as = "Option<String>")]
    #[serde(deserialize_with = "blank_as_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(deserialize_with = "blank_as_none")]
    pub month: Option<u32>,
    #[serde(deserialize_with = "blank_as_none")]
    pub year: Option<i32>,
}

impl InvoiceSearchCriteria {
    pub fn is_empty(&self) -> bool {
        self.customer_id.is_none()
            && self.customer_name.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.month.is_none()
            && self.year.is_none()
    }
}

/// Filters for `GET /invoices/export/excel`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct InvoiceExportCriteria {
    #[serde(deserialize_with = "blank_as_none")]
    pub customer_id: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub month: Option<u32>,
    #[serde(deserialize_with = "blank_as_none")]
    pub year: Option<i32>,
}

impl InvoiceExportCriteria {
    /// At least one of customer, month or year is set.
    pub fn has_any(&self) -> bool {
        self.customer_id.is_some() || self.month.is_some() || self.year.is_some()
    }

    /// Drops a blank customer id so it counts as not selected.
    pub fn normalized(mut self) -> Self {
        self.customer_id = self
            .customer_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        self
    }

    /// The same filter expressed as a search.
    pub fn to_search(&self) -> InvoiceSearchCriteria {
        InvoiceSearchCriteria {
            customer_id: self.customer_id.clone(),
            month: self.month,
            year: self.year,
            ..InvoiceSearchCriteria::default()
        }
    }
}

/// Query values sent empty (`?month=`) are treated as absent.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// `?status=` of the status endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct StatusQuery {
    pub status: Status,
}

/// `?name=` of the product search endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NameQuery {
    pub name: Option<String>,
}

/// `?date=&revenueBy=` of `GET /invoices/revenue`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueQuery {
    pub date: NaiveDate,
    pub revenue_by: String,
}

// =============================================================================
// Revenue
// =============================================================================

/// One slice of a revenue breakdown (a day or a month).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RevenueBucketDto {
    /// `2024-05-17` for days, `2024-05` for months.
    pub period: String,
    pub revenue_cents: i64,
    pub invoice_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RevenueShowDto {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub revenue_by: String,
    #[ts(as = "String")]
    pub period_start: NaiveDate,
    #[ts(as = "String")]
    pub period_end: NaiveDate,
    pub total_revenue_cents: i64,
    pub invoice_count: i64,
    pub breakdown: Vec<RevenueBucketDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_dto_defaults_missing_fields() {
        let dto: CustomerSaveDto = serde_json::from_str(r#"{"name":"Ann"}"#).unwrap();
        assert_eq!(dto.name, "Ann");
        assert_eq!(dto.phone_number, "");
    }

    #[test]
    fn test_invoice_save_dto_camel_case() {
        let dto: InvoiceSaveDto = serde_json::from_str(
            r#"{"customerId":"c1","invoiceDate":"2024-05-01","items":[{"productId":"p1","quantity":2}]}"#,
        )
        .unwrap();
        assert_eq!(dto.customer_id, "c1");
        assert_eq!(dto.invoice_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(dto.items[0].quantity, 2);
    }

    #[test]
    fn test_export_criteria() {
        let none = InvoiceExportCriteria::default();
        assert!(!none.has_any());

        let year_only = InvoiceExportCriteria {
            year: Some(2024),
            ..Default::default()
        };
        assert!(year_only.has_any());
        assert_eq!(year_only.to_search().year, Some(2024));
        assert!(year_only.to_search().customer_name.is_none());
    }

    #[test]
    fn test_blank_criteria_are_absent() {
        let criteria: InvoiceExportCriteria =
            serde_json::from_str(r#"{"customerId":"","month":"","year":" "}"#).unwrap();
        assert_eq!(criteria, InvoiceExportCriteria::default());
        assert!(!criteria.has_any());

        let criteria: InvoiceExportCriteria =
            serde_json::from_str(r#"{"customerId":"","month":"5","year":"2024"}"#).unwrap();
        assert_eq!(criteria.customer_id, None);
        assert_eq!(criteria.month, Some(5));
        assert_eq!(criteria.year, Some(2024));

        let search: InvoiceSearchCriteria =
            serde_json::from_str(r#"{"startDate":"","endDate":"2024-05-31","month":""}"#).unwrap();
        assert_eq!(search.start_date, None);
        assert_eq!(search.end_date, NaiveDate::from_ymd_opt(2024, 5, 31));
        assert!(search.month.is_none());

        assert!(serde_json::from_str::<InvoiceExportCriteria>(r#"{"month":"may"}"#).is_err());
    }

    #[test]
    fn test_export_criteria_normalized() {
        let criteria = InvoiceExportCriteria {
            customer_id: Some("   ".into()),
            ..Default::default()
        }
        .normalized();
        assert!(!criteria.has_any());

        let criteria = InvoiceExportCriteria {
            customer_id: Some(" c-1 ".into()),
            ..Default::default()
        }
        .normalized();
        assert_eq!(criteria.customer_id.as_deref(), Some("c-1"));
    }
}

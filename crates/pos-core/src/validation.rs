//! # Validation Module
//!
//! Boundary validation for request bodies and query strings.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  └── Shape and types; missing body fields default to empty             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Handler                                                      │
//! │  └── THIS MODULE: validate_* returns every failing field at once       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Service                                                      │
//! │  └── Rules that need the database (customer exists, stock left)        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: Database (SQLite)                                            │
//! │  └── NOT NULL, CHECK and foreign key constraints                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pos_core::dto::CustomerSaveDto;
//! use pos_core::validation::validate_customer_save;
//!
//! let dto = CustomerSaveDto { name: String::new(), phone_number: "abc".into() };
//! let errors = validate_customer_save(&dto).unwrap_err();
//! assert_eq!(errors.len(), 2);
//! ```

use crate::dto::{
    CustomerSaveDto, InvoiceExportCriteria, InvoiceSaveDto, InvoiceSearchCriteria, ProductSaveDto,
};
use crate::error::{FieldErrors, ValidationError};
use crate::{MAX_INVOICE_ITEMS, MAX_ITEM_QUANTITY, MAX_PRICE_CENTS};

/// Result type for single-field validators.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_SEARCH_LEN: usize = 100;

// =============================================================================
// Field Validators
// =============================================================================

/// Non-empty after trimming and at most `max` characters.
pub fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a phone number.
///
/// ## Rules
/// - Optional leading `+`
/// - Digits, spaces, dashes and dots as separators
/// - 7 to 15 digits in total
///
/// ## Example
/// ```rust
/// use pos_core::validation::validate_phone_number;
///
/// assert!(validate_phone_number("+84 901-234-567").is_ok());
/// assert!(validate_phone_number("12345").is_err());
/// ```
pub fn validate_phone_number(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phoneNumber".to_string(),
        });
    }

    let body = phone.strip_prefix('+').unwrap_or(phone);
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "phoneNumber".to_string(),
        reason: reason.to_string(),
    };

    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '.'))
    {
        return Err(invalid("must contain only digits and separators"));
    }

    let digits = body.chars().filter(|c| c.is_ascii_digit()).count();
    if !(7..=15).contains(&digits) {
        return Err(invalid("must contain between 7 and 15 digits"));
    }

    Ok(())
}

/// Validates an invoice line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Stock on hand may be zero, never negative.
pub fn validate_stock(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Example
/// ```rust
/// use pos_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());  // $10.99
/// assert!(validate_price_cents(0).is_ok());     // Free item
/// assert!(validate_price_cents(-100).is_err()); // Invalid
/// assert!(validate_price_cents(i64::MAX).is_err()); // Above MAX_PRICE_CENTS
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "priceCents".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Month number 1 to 12.
pub fn validate_month(month: u32) -> ValidationResult<()> {
    if !(1..=12).contains(&month) {
        return Err(ValidationError::OutOfRange {
            field: "month".to_string(),
            min: 1,
            max: 12,
        });
    }

    Ok(())
}

/// Validates a UUID string.
///
/// ## Example
/// ```rust
/// use pos_core::validation::validate_uuid;
///
/// assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id.trim()).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

/// Trims a search term; empty becomes `None`.
pub fn validate_search_term(term: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    if term.chars().count() > MAX_SEARCH_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_SEARCH_LEN,
        });
    }

    Ok(Some(term.to_string()))
}

// =============================================================================
// Request Validators
// =============================================================================

/// Body of customer create and update.
pub fn validate_customer_save(dto: &CustomerSaveDto) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.check(validate_text("name", &dto.name, MAX_NAME_LEN));
    errors.check(validate_phone_number(&dto.phone_number));
    errors.into_result()
}

/// Body of product create and update.
///
/// A client-supplied `id` may be any non-blank string of at most 64 chars.
pub fn validate_product_save(dto: &ProductSaveDto) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if let Some(id) = dto.id.as_deref().filter(|id| !id.trim().is_empty()) {
        errors.check(validate_text("id", id, 64));
    }
    errors.check(validate_text("name", &dto.name, MAX_NAME_LEN));
    errors.check(validate_price_cents(dto.price_cents));
    errors.check(validate_stock(dto.quantity));
    errors.into_result()
}

/// Body of invoice create and update.
///
/// Checks shape only; customer and product existence are service rules.
pub fn validate_invoice_save(dto: &InvoiceSaveDto) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.check(validate_uuid("customerId", &dto.customer_id));

    if dto.items.is_empty() {
        errors.push(ValidationError::Required {
            field: "items".to_string(),
        });
    } else if dto.items.len() > MAX_INVOICE_ITEMS {
        errors.push(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_INVOICE_ITEMS as i64,
        });
    }

    for (index, item) in dto.items.iter().enumerate() {
        if let Err(err) = validate_text("productId", &item.product_id, 64) {
            errors.push(err.at(format!("items[{index}].productId")));
        }
        if let Err(err) = validate_quantity(item.quantity) {
            errors.push(err.at(format!("items[{index}].quantity")));
        }
    }

    errors.into_result()
}

/// Query of the invoice search.
pub fn validate_search_criteria(criteria: &InvoiceSearchCriteria) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if let Some(month) = criteria.month {
        errors.check(validate_month(month));
    }
    if let Some(name) = criteria.customer_name.as_deref() {
        errors.check(validate_search_term(Some(name)).map_err(|e| e.at("customerName")));
    }
    if let (Some(start), Some(end)) = (criteria.start_date, criteria.end_date) {
        if start > end {
            errors.push(ValidationError::InvalidFormat {
                field: "endDate".to_string(),
                reason: "must not be before startDate".to_string(),
            });
        }
    }
    errors.into_result()
}

/// Query of the Excel export. The "at least one criterion" rule lives in
/// [`crate::report::excel_report_filename`].
pub fn validate_export_criteria(criteria: &InvoiceExportCriteria) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if let Some(month) = criteria.month {
        errors.check(validate_month(month));
    }
    errors.into_result()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::InvoiceItemSaveDto;

    #[test]
    fn test_validate_text() {
        assert!(validate_text("name", "Coffee", 10).is_ok());
        assert!(validate_text("name", "   ", 10).is_err());
        assert!(validate_text("name", &"A".repeat(11), 10).is_err());
    }

    #[test]
    fn test_validate_phone_number() {
        assert!(validate_phone_number("0901234567").is_ok());
        assert!(validate_phone_number("+1 555.123.4567").is_ok());
        assert!(validate_phone_number("").is_err());
        assert!(validate_phone_number("090-ABC-4567").is_err());
        assert!(validate_phone_number("1234567890123456").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price_cap() {
        assert!(validate_price_cents(MAX_PRICE_CENTS).is_ok());
        assert!(validate_price_cents(MAX_PRICE_CENTS + 1).is_err());
        assert!(validate_price_cents(i64::MAX / 2 + 1).is_err());
    }

    #[test]
    fn test_validate_month() {
        assert!(validate_month(1).is_ok());
        assert!(validate_month(12).is_ok());
        assert!(validate_month(0).is_err());
        assert!(validate_month(13).is_err());
    }

    #[test]
    fn test_search_term_trims_to_none() {
        assert_eq!(validate_search_term(None).unwrap(), None);
        assert_eq!(validate_search_term(Some("  ")).unwrap(), None);
        assert_eq!(
            validate_search_term(Some(" tea ")).unwrap(),
            Some("tea".to_string())
        );
        assert!(validate_search_term(Some(&"x".repeat(101))).is_err());
    }

    #[test]
    fn test_product_save_collects_every_field() {
        let dto = ProductSaveDto {
            id: None,
            name: String::new(),
            price_cents: -1,
            quantity: -5,
            status: None,
        };
        let errors = validate_product_save(&dto).unwrap_err();
        let fields: Vec<_> = errors.0.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "priceCents", "quantity"]);
    }

    #[test]
    fn test_invoice_save_item_paths() {
        let dto = InvoiceSaveDto {
            customer_id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
            invoice_date: None,
            items: vec![
                InvoiceItemSaveDto {
                    product_id: "p1".into(),
                    quantity: 1,
                },
                InvoiceItemSaveDto {
                    product_id: String::new(),
                    quantity: 0,
                },
            ],
        };
        let errors = validate_invoice_save(&dto).unwrap_err();
        let fields: Vec<_> = errors.0.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["items[1].productId", "items[1].quantity"]);
    }

    #[test]
    fn test_invoice_save_requires_items() {
        let dto = InvoiceSaveDto {
            customer_id: "not-a-uuid".into(),
            ..InvoiceSaveDto::default()
        };
        let errors = validate_invoice_save(&dto).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_search_criteria_date_order() {
        use chrono::NaiveDate;

        let criteria = InvoiceSearchCriteria {
            start_date: NaiveDate::from_ymd_opt(2024, 5, 2),
            end_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            month: Some(13),
            ..Default::default()
        };
        let errors = validate_search_criteria(&criteria).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}

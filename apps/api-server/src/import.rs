//! # Product CSV Import
//!
//! Parses an uploaded catalog file into products. Every row is parsed and
//! checked before anything is returned, so one bad row rejects the file.
//!
//! ## Format
//! ```text
//! id,name,price,quantity          ← header required, `id` column optional
//! ,Latte Regular,3.50,40          ← blank id: one is generated
//! SKU-9,Croissant,2.5,12          ← price in major units, max 2 decimals
//! ```

use chrono::NaiveDate;
use serde::Deserialize;

use pos_core::dto::ProductSaveDto;
use pos_core::mapper::ProductMapper;
use pos_core::validation::validate_product_save;
use pos_core::{Money, Product};

const REQUIRED_COLUMNS: [&str; 3] = ["name", "price", "quantity"];

/// A rejected upload, pointing at the offending line (1 = header).
#[derive(Debug, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct ImportError {
    pub line: u64,
    pub message: String,
}

impl ImportError {
    fn at(line: u64, message: impl Into<String>) -> Self {
        ImportError {
            line,
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProductRow {
    #[serde(default)]
    id: Option<String>,
    name: String,
    price: String,
    quantity: i64,
}

/// True when `file_name` ends in `.csv`, ignoring case.
pub fn is_csv_file_name(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(".csv")
}

/// Parses `bytes` into Active products dated `today`.
///
/// `new_id` is called for every row without an id.
pub fn parse_products(
    bytes: &[u8],
    today: NaiveDate,
    mut new_id: impl FnMut() -> String,
) -> Result<Vec<Product>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| ImportError::at(1, e.to_string()))?
        .clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h.eq_ignore_ascii_case(column)) {
            return Err(ImportError::at(1, format!("missing column '{column}'")));
        }
    }
    // Header matching is case-insensitive, field names are not
    let headers = csv::StringRecord::from(
        headers
            .iter()
            .map(|h| h.to_ascii_lowercase())
            .collect::<Vec<_>>(),
    );

    let mut products = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or(0);
            ImportError::at(line, e.to_string())
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let row: ProductRow = record
            .deserialize(Some(&headers))
            .map_err(|e| ImportError::at(line, e.to_string()))?;

        let price = Money::parse_decimal(&row.price)
            .map_err(|e| ImportError::at(line, e.to_string()))?;

        let dto = ProductSaveDto {
            id: row.id,
            name: row.name,
            price_cents: price.cents(),
            quantity: row.quantity,
            status: None,
        };
        if let Err(errors) = validate_product_save(&dto) {
            let detail = errors
                .0
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ImportError::at(line, detail));
        }

        products.push(ProductMapper::to_entity(dto, new_id(), today));
    }

    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pos_core::Status;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn parse(csv: &str) -> Result<Vec<Product>, ImportError> {
        let mut n = 0;
        parse_products(csv.as_bytes(), today(), || {
            n += 1;
            format!("gen-{n}")
        })
    }

    #[test]
    fn test_csv_file_name() {
        assert!(is_csv_file_name("products.csv"));
        assert!(is_csv_file_name("PRODUCTS.CSV"));
        assert!(!is_csv_file_name("products.xlsx"));
        assert!(!is_csv_file_name("csv"));
    }

    #[test]
    fn test_parses_rows() {
        let products = parse("id,name,price,quantity\n,Latte,3.5,40\nSKU-9, Croissant ,2,12\n").unwrap();
        assert_eq!(products.len(), 2);

        assert_eq!(products[0].id, "gen-1");
        assert_eq!(products[0].price_cents, 350);
        assert_eq!(products[0].status, Status::Active);
        assert_eq!(products[0].created_at, today());

        assert_eq!(products[1].id, "SKU-9");
        assert_eq!(products[1].name, "Croissant");
        assert_eq!(products[1].price_cents, 200);
    }

    #[test]
    fn test_id_column_is_optional() {
        let products = parse("Name,Price,Quantity\nTea,1.25,3\n").unwrap();
        assert_eq!(products[0].id, "gen-1");
        assert_eq!(products[0].price_cents, 125);
    }

    #[test]
    fn test_bad_row_reports_its_line() {
        let err = parse("name,price,quantity\nTea,1,3\nCake,1.999,3\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.message.contains("two decimal"));

        let err = parse("name,price,quantity\nTea,1,lots\n").unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_missing_column() {
        let err = parse("name,quantity\nTea,3\n").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("price"));
    }

    #[test]
    fn test_negative_stock_rejected() {
        assert!(parse("name,price,quantity\nTea,1,-1\n").is_err());
    }
}

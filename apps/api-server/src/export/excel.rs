//! # Invoice Excel Report
//!
//! One worksheet, one row per invoice line item, rendered into memory.
//!
//! | A          | B    | C           | D        | E          | F       | G   | H          | I          |
//! |------------|------|-------------|----------|------------|---------|-----|------------|------------|
//! | Invoice ID | Date | Customer ID | Customer | Product ID | Product | Qty | Unit Price | Line Total |

use rust_xlsxwriter::{Format, FormatAlign, Workbook};

use super::ExportError;
use pos_core::{Invoice, Money};

const SHEET_NAME: &str = "Invoices";

const HEADERS: [(&str, f64); 9] = [
    ("Invoice ID", 38.0),
    ("Invoice Date", 14.0),
    ("Customer ID", 38.0),
    ("Customer Name", 24.0),
    ("Product ID", 20.0),
    ("Product Name", 30.0),
    ("Quantity", 10.0),
    ("Unit Price", 12.0),
    ("Line Total", 12.0),
];

/// Renders the line items of `invoices` to `.xlsx` bytes.
///
/// A trailing row sums the line totals. An empty slice still yields a
/// workbook with the header row.
pub fn render_invoice_report(invoices: &[Invoice]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();

    let header = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_background_color("#D9E1F2");
    let money = Format::new().set_num_format("#,##0.00");
    let total_label = Format::new().set_bold();
    let total_money = Format::new().set_bold().set_num_format("#,##0.00");

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, (title, width)) in HEADERS.iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, *title, &header)?;
        sheet.set_column_width(col, *width)?;
    }
    sheet.set_freeze_panes(1, 0)?;

    let mut row: u32 = 1;
    let mut grand_total = Money::zero();

    for invoice in invoices {
        let date = invoice.invoice_date.format("%Y-%m-%d").to_string();
        for item in &invoice.items {
            sheet.write_string(row, 0, &invoice.id)?;
            sheet.write_string(row, 1, &date)?;
            sheet.write_string(row, 2, &invoice.customer_id)?;
            sheet.write_string(row, 3, &invoice.customer_name)?;
            sheet.write_string(row, 4, &item.product_id)?;
            sheet.write_string(row, 5, &item.product_name)?;
            sheet.write_number(row, 6, item.quantity as f64)?;
            sheet.write_number_with_format(
                row,
                7,
                Money::from_cents(item.unit_price_cents).as_major_f64(),
                &money,
            )?;
            sheet.write_number_with_format(row, 8, item.line_total().as_major_f64(), &money)?;

            grand_total = grand_total
                .checked_add(item.line_total())
                .ok_or(ExportError::TotalOverflow)?;
            row += 1;
        }
    }

    sheet.write_string_with_format(row, 7, "Total", &total_label)?;
    sheet.write_number_with_format(row, 8, grand_total.as_major_f64(), &total_money)?;

    let bytes = workbook.save_to_buffer()?;
    Ok(bytes)
}

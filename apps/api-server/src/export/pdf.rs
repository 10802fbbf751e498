//! # Invoice PDF
//!
//! Renders one invoice on A4 pages with the built-in Helvetica fonts.
//!
//! ## Page Layout
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ INVOICE                                       │
//! │ Invoice ID / Date / Customer / Customer ID    │
//! │                                               │
//! │ Product            Unit Price   Qty   Total   │  ← repeated on every page
//! │ ───────────────────────────────────────────── │
//! │ Latte Regular          3.50      2     7.00   │
//! │ ...                                           │
//! │                                 Total: $7.00  │  ← last page only
//! │                                   Page 1 of 1 │
//! └───────────────────────────────────────────────┘
//! ```

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use super::ExportError;
use pos_core::Invoice;

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;
const LINE_HEIGHT: i64 = 16;

/// Left edge of product, unit price, quantity and line total.
const COLUMNS: [i64; 4] = [MARGIN, 330, 420, 475];

const REGULAR: &str = "F1";
const BOLD: &str = "F2";

/// Longest product name printed before truncation.
const MAX_NAME_CHARS: usize = 42;

/// Renders `invoice` (items loaded) to PDF bytes.
pub fn render_invoice(invoice: &Invoice) -> Result<Vec<u8>, ExportError> {
    let mut pages = PageWriter::new();

    pages.text(MARGIN, BOLD, 20, "INVOICE");
    pages.advance(2);
    pages.text(MARGIN, REGULAR, 11, &format!("Invoice ID: {}", invoice.id));
    pages.advance(1);
    pages.text(
        MARGIN,
        REGULAR,
        11,
        &format!("Date: {}", invoice.invoice_date.format("%Y-%m-%d")),
    );
    pages.advance(1);
    pages.text(MARGIN, REGULAR, 11, &format!("Customer: {}", invoice.customer_name));
    pages.advance(1);
    pages.text(
        MARGIN,
        REGULAR,
        11,
        &format!("Customer ID: {}", invoice.customer_id),
    );
    pages.advance(2);
    pages.table_header();

    for item in &invoice.items {
        if !pages.has_room(1) {
            pages.new_page();
            pages.table_header();
        }
        pages.text(COLUMNS[0], REGULAR, 10, &truncate(&item.product_name));
        pages.text(
            COLUMNS[1],
            REGULAR,
            10,
            &item_price(item.unit_price_cents),
        );
        pages.text(COLUMNS[2], REGULAR, 10, &item.quantity.to_string());
        pages.text(COLUMNS[3], REGULAR, 10, &item_price(item.line_total_cents));
        pages.advance(1);
    }

    if !pages.has_room(2) {
        pages.new_page();
    }
    pages.rule();
    pages.advance(1);
    pages.text(
        COLUMNS[2],
        BOLD,
        12,
        &format!("Total: {}", invoice.total()),
    );

    let page_ops = pages.finish();
    build_document(page_ops)
}

fn item_price(cents: i64) -> String {
    pos_core::Money::from_cents(cents).to_decimal_string()
}

fn truncate(name: &str) -> String {
    if name.chars().count() <= MAX_NAME_CHARS {
        return name.to_string();
    }
    let mut short: String = name.chars().take(MAX_NAME_CHARS - 3).collect();
    short.push_str("...");
    short
}

/// The standard Type1 fonts only cover Latin-1; anything else prints as `?`.
fn pdf_text(text: &str) -> Object {
    let bytes: Vec<u8> = text
        .chars()
        .map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
        .collect();
    Object::String(bytes, lopdf::StringFormat::Literal)
}

// =============================================================================
// Page Writer
// =============================================================================

/// Accumulates content operations, starting a new page when one is full.
struct PageWriter {
    pages: Vec<Vec<Operation>>,
    y: i64,
}

impl PageWriter {
    fn new() -> Self {
        PageWriter {
            pages: vec![Vec::new()],
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn current(&mut self) -> &mut Vec<Operation> {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn text(&mut self, x: i64, font: &str, size: i64, text: &str) {
        let y = self.y;
        let ops = self.current();
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![Object::Name(font.as_bytes().to_vec()), Object::Integer(size)],
        ));
        ops.push(Operation::new(
            "Td",
            vec![Object::Integer(x), Object::Integer(y)],
        ));
        ops.push(Operation::new("Tj", vec![pdf_text(text)]));
        ops.push(Operation::new("ET", vec![]));
    }

    /// Horizontal line just above the current baseline.
    fn rule(&mut self) {
        let y = self.y + LINE_HEIGHT / 2;
        let ops = self.current();
        ops.push(Operation::new(
            "m",
            vec![Object::Integer(MARGIN), Object::Integer(y)],
        ));
        ops.push(Operation::new(
            "l",
            vec![Object::Integer(PAGE_WIDTH - MARGIN), Object::Integer(y)],
        ));
        ops.push(Operation::new("S", vec![]));
    }

    fn table_header(&mut self) {
        for (x, title) in COLUMNS
            .iter()
            .zip(["Product", "Unit Price", "Qty", "Line Total"])
        {
            self.text(*x, BOLD, 10, title);
        }
        self.advance(1);
        self.rule();
    }

    fn advance(&mut self, lines: i64) {
        self.y -= lines * LINE_HEIGHT;
    }

    /// Room for `lines` more lines above the footer.
    fn has_room(&self, lines: i64) -> bool {
        self.y - lines * LINE_HEIGHT >= MARGIN + 2 * LINE_HEIGHT
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.y = PAGE_HEIGHT - MARGIN;
    }

    /// Adds "Page n of N" footers and hands back each page's operations.
    fn finish(mut self) -> Vec<Vec<Operation>> {
        let total = self.pages.len();
        for (index, ops) in self.pages.iter_mut().enumerate() {
            ops.push(Operation::new("BT", vec![]));
            ops.push(Operation::new(
                "Tf",
                vec![Object::Name(REGULAR.as_bytes().to_vec()), Object::Integer(9)],
            ));
            ops.push(Operation::new(
                "Td",
                vec![
                    Object::Integer(PAGE_WIDTH - MARGIN - 60),
                    Object::Integer(MARGIN / 2),
                ],
            ));
            ops.push(Operation::new(
                "Tj",
                vec![pdf_text(&format!("Page {} of {}", index + 1, total))],
            ));
            ops.push(Operation::new("ET", vec![]));
        }
        self.pages
    }
}

// =============================================================================
// Document Assembly
// =============================================================================

fn build_document(page_ops: Vec<Vec<Operation>>) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR => regular_id,
            BOLD => bold_id,
        },
    });

    let mut kids = Vec::with_capacity(page_ops.len());
    for operations in page_ops {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(PAGE_WIDTH),
            Object::Integer(PAGE_HEIGHT),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    Ok(buffer)
}

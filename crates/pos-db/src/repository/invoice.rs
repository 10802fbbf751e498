//! # Invoice Repository
//!
//! Invoice headers, their items, and the stock movements they cause.
//!
//! ## Write Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create(invoice)                  update(invoice)                       │
//! │  ───────────────                  ───────────────                       │
//! │  BEGIN                            BEGIN                                 │
//! │  INSERT invoices                  SELECT old items                      │
//! │  for each item:                   restore stock of old items            │
//! │    UPDATE products                DELETE old items                      │
//! │      SET quantity -= n            UPDATE invoices (NotFound if 0 rows)  │
//! │      WHERE quantity >= n          for each new item:                    │
//! │        AND status = 'Active'        guarded stock decrement             │
//! │    INSERT invoice_items             INSERT invoice_items                │
//! │  COMMIT                           COMMIT                                │
//! │                                                                         │
//! │  Any error drops the transaction, which rolls everything back.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, info};

use super::like_pattern;
use crate::error::{DbError, DbResult};
use pos_core::dto::InvoiceSearchCriteria;
use pos_core::{Invoice, InvoiceItem, PageRequest};

const SELECT_INVOICE: &str = r#"
    SELECT
        i.id,
        i.customer_id,
        c.name AS customer_name,
        i.invoice_date,
        i.total_cents,
        i.created_at,
        i.updated_at
    FROM invoices i
    INNER JOIN customers c ON c.id = i.customer_id
"#;

const SELECT_ITEM: &str = r#"
    SELECT id, invoice_id, product_id, product_name, unit_price_cents, quantity, line_total_cents
    FROM invoice_items
"#;

/// Invoice ids bound per item lookup.
const ITEM_LOOKUP_CHUNK: usize = 500;

/// Repository for invoice database operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// One page of matching invoices, newest invoice date first, with items.
    pub async fn find_by_criteria(
        &self,
        criteria: &InvoiceSearchCriteria,
        page: PageRequest,
    ) -> DbResult<(Vec<Invoice>, i64)> {
        debug!(?criteria, page = page.page, size = page.limit(), "Searching invoices");

        let mut count = QueryBuilder::<Sqlite>::new(
            "SELECT COUNT(*) FROM invoices i INNER JOIN customers c ON c.id = i.customer_id",
        );
        push_criteria(&mut count, criteria);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut select = QueryBuilder::<Sqlite>::new(SELECT_INVOICE);
        push_criteria(&mut select, criteria);
        select
            .push(" ORDER BY i.invoice_date DESC, i.created_at DESC, i.id LIMIT ")
            .push_bind(i64::from(page.limit()))
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let mut invoices = select
            .build_query_as::<Invoice>()
            .fetch_all(&self.pool)
            .await?;
        self.attach_items(&mut invoices).await?;

        debug!(count = invoices.len(), total, "Invoice search returned");
        Ok((invoices, total))
    }

    /// Every matching invoice in date order, with items. Used by reports.
    pub async fn find_all_by_criteria(
        &self,
        criteria: &InvoiceSearchCriteria,
    ) -> DbResult<Vec<Invoice>> {
        let mut select = QueryBuilder::<Sqlite>::new(SELECT_INVOICE);
        push_criteria(&mut select, criteria);
        select.push(" ORDER BY i.invoice_date, i.created_at, i.id");

        let mut invoices = select
            .build_query_as::<Invoice>()
            .fetch_all(&self.pool)
            .await?;
        self.attach_items(&mut invoices).await?;

        Ok(invoices)
    }

    /// ## Returns
    /// * `Ok(Some(Invoice))` - Invoice found, items loaded
    /// * `Ok(None)` - Invoice not found
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!("{SELECT_INVOICE} WHERE i.id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(invoice) = invoice else {
            return Ok(None);
        };

        let mut invoices = vec![invoice];
        self.attach_items(&mut invoices).await?;
        Ok(invoices.pop())
    }

    /// `(invoice_date, total_cents)` of every invoice dated within
    /// `start..=end`.
    pub async fn revenue_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<(NaiveDate, i64)>> {
        let rows = sqlx::query_as::<_, (NaiveDate, i64)>(
            r#"
            SELECT invoice_date, total_cents
            FROM invoices
            WHERE invoice_date >= ?1 AND invoice_date <= ?2
            ORDER BY invoice_date
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        debug!(%start, %end, count = rows.len(), "Loaded revenue rows");
        Ok(rows)
    }

    /// Loads items for all `invoices`, keeping insert order.
    async fn attach_items(&self, invoices: &mut [Invoice]) -> DbResult<()> {
        if invoices.is_empty() {
            return Ok(());
        }

        // One IN (...) per chunk keeps each statement under SQLite's bind limit
        let mut items = Vec::new();
        for chunk in invoices.chunks(ITEM_LOOKUP_CHUNK) {
            let mut select = QueryBuilder::<Sqlite>::new(SELECT_ITEM);
            select.push(" WHERE invoice_id IN (");
            let mut ids = select.separated(", ");
            for invoice in chunk {
                ids.push_bind(invoice.id.clone());
            }
            ids.push_unseparated(") ORDER BY invoice_id, rowid");

            items.extend(
                select
                    .build_query_as::<InvoiceItem>()
                    .fetch_all(&self.pool)
                    .await?,
            );
        }

        let mut by_invoice: HashMap<String, Vec<InvoiceItem>> = HashMap::new();
        for item in items {
            by_invoice
                .entry(item.invoice_id.clone())
                .or_default()
                .push(item);
        }

        for invoice in invoices.iter_mut() {
            invoice.items = by_invoice.remove(&invoice.id).unwrap_or_default();
        }

        Ok(())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts the invoice and its items and takes the items out of stock.
    ///
    /// ## Returns
    /// * `Err(DbError::InsufficientStock)` - a product lacks stock or is inactive
    /// * `Err(DbError::ForeignKeyViolation)` - customer or product missing
    pub async fn create(&self, invoice: &Invoice) -> DbResult<()> {
        debug!(id = %invoice.id, items = invoice.items.len(), "Creating invoice");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO invoices (id, customer_id, invoice_date, total_cents, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.customer_id)
        .bind(invoice.invoice_date)
        .bind(invoice.total_cents)
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await?;

        insert_items_taking_stock(&mut *tx, &invoice.items).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            id = %invoice.id,
            total_cents = invoice.total_cents,
            "Invoice created"
        );
        Ok(())
    }

    /// Replaces header and items, returning the old items to stock first.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Invoice doesn't exist
    /// * `Err(DbError::InsufficientStock)` - a product lacks stock or is inactive
    pub async fn update(&self, invoice: &Invoice) -> DbResult<()> {
        debug!(id = %invoice.id, items = invoice.items.len(), "Updating invoice");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let old_items = sqlx::query_as::<_, InvoiceItem>(&format!(
            "{SELECT_ITEM} WHERE invoice_id = ?1"
        ))
        .bind(&invoice.id)
        .fetch_all(&mut *tx)
        .await?;

        for item in &old_items {
            sqlx::query("UPDATE products SET quantity = quantity + ?2 WHERE id = ?1")
                .bind(&item.product_id)
                .bind(item.quantity)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = ?1")
            .bind(&invoice.id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query(
            r#"
            UPDATE invoices SET
                customer_id = ?2,
                invoice_date = ?3,
                total_cents = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.customer_id)
        .bind(invoice.invoice_date)
        .bind(invoice.total_cents)
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", &invoice.id));
        }

        insert_items_taking_stock(&mut *tx, &invoice.items).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            id = %invoice.id,
            restored = old_items.len(),
            items = invoice.items.len(),
            "Invoice updated"
        );
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Appends the WHERE clause for `criteria`. Every present field is ANDed.
fn push_criteria(builder: &mut QueryBuilder<'_, Sqlite>, criteria: &InvoiceSearchCriteria) {
    builder.push(" WHERE 1 = 1");

    if let Some(customer_id) = &criteria.customer_id {
        builder
            .push(" AND i.customer_id = ")
            .push_bind(customer_id.clone());
    }
    if let Some(name) = &criteria.customer_name {
        builder
            .push(" AND c.name LIKE ")
            .push_bind(like_pattern(name))
            .push(r" ESCAPE '\'");
    }
    if let Some(start) = criteria.start_date {
        builder.push(" AND i.invoice_date >= ").push_bind(start);
    }
    if let Some(end) = criteria.end_date {
        builder.push(" AND i.invoice_date <= ").push_bind(end);
    }
    if let Some(month) = criteria.month {
        builder
            .push(" AND CAST(strftime('%m', i.invoice_date) AS INTEGER) = ")
            .push_bind(i64::from(month));
    }
    if let Some(year) = criteria.year {
        builder
            .push(" AND CAST(strftime('%Y', i.invoice_date) AS INTEGER) = ")
            .push_bind(i64::from(year));
    }
}

/// Takes each item out of stock, then inserts it.
async fn insert_items_taking_stock(
    conn: &mut SqliteConnection,
    items: &[InvoiceItem],
) -> DbResult<()> {
    for item in items {
        let taken = sqlx::query(
            r#"
            UPDATE products SET quantity = quantity - ?2
            WHERE id = ?1 AND status = 'Active' AND quantity >= ?2
            "#,
        )
        .bind(&item.product_id)
        .bind(item.quantity)
        .execute(&mut *conn)
        .await?;

        if taken.rows_affected() == 0 {
            return Err(DbError::InsufficientStock {
                product_id: item.product_id.clone(),
            });
        }

        sqlx::query(
            r#"
            INSERT INTO invoice_items (
                id, invoice_id, product_id, product_name,
                unit_price_cents, quantity, line_total_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&item.id)
        .bind(&item.invoice_id)
        .bind(&item.product_id)
        .bind(&item.product_name)
        .bind(item.unit_price_cents)
        .bind(item.quantity)
        .bind(item.line_total_cents)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

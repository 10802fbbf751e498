//! # Customer Repository
//!
//! Database operations for customers. Customers are never deleted;
//! deactivation is a status change.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use pos_core::{Customer, PageRequest};

const SELECT_CUSTOMER: &str = r#"
    SELECT id, name, phone_number, status, created_at, updated_at
    FROM customers
"#;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// One page of customers ordered by name, plus the total row count.
    pub async fn find_page(&self, page: PageRequest) -> DbResult<(Vec<Customer>, i64)> {
        debug!(page = page.page, size = page.limit(), "Listing customers");

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        let customers = sqlx::query_as::<_, Customer>(&format!(
            "{SELECT_CUSTOMER} ORDER BY name, id LIMIT ?1 OFFSET ?2"
        ))
        .bind(i64::from(page.limit()))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok((customers, total))
    }

    /// ## Returns
    /// * `Ok(Some(Customer))` - Customer found
    /// * `Ok(None)` - Customer not found
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer =
            sqlx::query_as::<_, Customer>(&format!("{SELECT_CUSTOMER} WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(customer)
    }

    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, phone_number, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone_number)
        .bind(customer.status)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Writes every mutable column. `created_at` is never touched.
    pub async fn update(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, status = %customer.status, "Updating customer");

        let result = sqlx::query(
            r#"
            UPDATE customers
            SET name = ?2, phone_number = ?3, status = ?4, updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone_number)
        .bind(customer.status)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.id));
        }

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Tests
// =============================================================================

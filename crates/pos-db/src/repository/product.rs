//! # Product Repository
//!
//! Database operations for catalog products.
//!
//! ## Key Operations
//! - Listing and name search filtered by status
//! - CRUD operations
//! - Bulk insert for CSV imports (one transaction)
//!
//! ## Name Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET /products/search?name=cof                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  WHERE status = 'Active' AND name LIKE '%cof%' ESCAPE '\'               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Coffee Beans 1kg    ← MATCH (ASCII case-insensitive)                  │
//! │  Iced Coffee         ← MATCH                                           │
//! │  Green Tea           ✗                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use super::like_pattern;
use crate::error::{DbError, DbResult};
use pos_core::{PageRequest, Product, Status};

const SELECT_PRODUCT: &str = r#"
    SELECT id, name, price_cents, quantity, status, created_at, updated_at
    FROM products
"#;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Every product with `status`, ordered by name.
    pub async fn find_all_by_status(&self, status: Status) -> DbResult<Vec<Product>> {
        let products =
            sqlx::query_as::<_, Product>(&format!(
                "{SELECT_PRODUCT} WHERE status = ?1 ORDER BY name, id"
            ))
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        debug!(status = %status, count = products.len(), "Listed products");
        Ok(products)
    }

    /// Products with `status` whose name contains `name`, ordered by name.
    pub async fn find_by_status_and_name_like(
        &self,
        status: Status,
        name: &str,
    ) -> DbResult<Vec<Product>> {
        debug!(status = %status, name = %name, "Searching products");

        let products = sqlx::query_as::<_, Product>(&format!(
            r"{SELECT_PRODUCT} WHERE status = ?1 AND name LIKE ?2 ESCAPE '\' ORDER BY name, id"
        ))
        .bind(status)
        .bind(like_pattern(name))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// One page of products with `status`, optionally narrowed by a name
    /// substring, plus the total number of matching rows.
    pub async fn find_page_by_status(
        &self,
        status: Status,
        name: Option<&str>,
        page: PageRequest,
    ) -> DbResult<(Vec<Product>, i64)> {
        debug!(
            status = %status,
            name = ?name,
            page = page.page,
            size = page.limit(),
            "Paging products"
        );

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM products");
        push_filters(&mut count, status, name);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Sqlite>::new(SELECT_PRODUCT);
        push_filters(&mut select, status, name);
        select
            .push(" ORDER BY name, id LIMIT ")
            .push_bind(i64::from(page.limit()))
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let products = select
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;

        Ok((products, total))
    }

    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - id already exists
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Inserting product");

        insert_query(product).execute(&self.pool).await?;
        Ok(())
    }

    /// Inserts all products or none of them.
    pub async fn insert_many(&self, products: &[Product]) -> DbResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for product in products {
            insert_query(product).execute(&mut *tx).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(count = products.len(), "Bulk inserted products");
        Ok(())
    }

    /// Writes every mutable column. `created_at` is never touched.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                price_cents = ?3,
                quantity = ?4,
                status = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.quantity)
        .bind(product.status)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, status: Status, name: Option<&str>) {
    builder.push(" WHERE status = ").push_bind(status);
    if let Some(name) = name {
        builder
            .push(" AND name LIKE ")
            .push_bind(like_pattern(name))
            .push(r" ESCAPE '\'");
    }
}

fn insert_query(
    product: &Product,
) -> sqlx::query::Query<'_, Sqlite, sqlx::sqlite::SqliteArguments<'_>> {
    sqlx::query(
        r#"
        INSERT INTO products (id, name, price_cents, quantity, status, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&product.id)
    .bind(&product.name)
    .bind(product.price_cents)
    .bind(product.quantity)
    .bind(product.status)
    .bind(product.created_at)
    .bind(product.updated_at)
}

// =============================================================================
// Tests
// =============================================================================

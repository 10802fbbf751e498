//! # Repository Module
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Service                                                               │
//! │       │                                                                 │
//! │       │  self.products.find_by_id("p-1")                               │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── find_all_by_status(&self, status)                                 │
//! │  ├── find_page_by_status(&self, status, name, page)                    │
//! │  ├── find_by_id(&self, id)                                             │
//! │  ├── insert(&self, product) / insert_many(&self, products)             │
//! │  └── update(&self, product)                                            │
//! │       │                                                                 │
//! │       │  SQL with bound parameters                                     │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every query is written out by hand. Dynamic filters go through
//! `sqlx::QueryBuilder` so values are always bound, never formatted in.
//!
//! ## Available Repositories
//!
//! - [`customer::CustomerRepository`] - Customer CRUD and paging
//! - [`product::ProductRepository`] - Catalog listing, search, bulk import
//! - [`invoice::InvoiceRepository`] - Criteria search, invoice + stock writes, revenue
//! - [`api_key::ApiKeyRepository`] - API key lookup

pub mod api_key;
pub mod customer;
pub mod invoice;
pub mod product;

/// `%term%` for a `LIKE ... ESCAPE '\'` clause, with `%`, `_` and `\` in
/// the term matched literally.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("tea"), "%tea%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}

//! Product service implementation.
//!
//! Catalog listing only ever shows Active products. Deactivated products stay
//! in the database so old invoice lines keep resolving.
//!
//! ## CSV Upload
//! ```text
//! file name ──► ends in .csv? ──no──► InvalidFormat (nothing parsed)
//!                    │
//!                   yes
//!                    ▼
//!              parse every row ──error──► InvalidFormat("line N: ...")
//!                    │
//!                    ▼
//!              insert_many (one transaction)
//! ```

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::import;
use pos_core::dto::{ProductDto, ProductSaveDto};
use pos_core::mapper::ProductMapper;
use pos_core::validation::{validate_product_save, validate_search_term};
use pos_core::{Page, PageRequest, Product, Status};
use pos_db::ProductRepository;

/// Product service implementation.
#[derive(Debug, Clone)]
pub struct ProductService {
    products: ProductRepository,
}

impl ProductService {
    /// Create a new product service.
    pub fn new(products: ProductRepository) -> Self {
        ProductService { products }
    }

    /// Every Active product.
    pub async fn find_all(&self) -> ServiceResult<Vec<ProductDto>> {
        let products = self.products.find_all_by_status(Status::Active).await?;
        Ok(products.into_iter().map(ProductMapper::to_dto).collect())
    }

    /// One page of Active products.
    pub async fn find_all_paged(&self, page: PageRequest) -> ServiceResult<Page<ProductDto>> {
        self.find_all_by_status_and_name(None, page).await
    }

    /// Active products whose name contains `name`. A blank term lists all.
    pub async fn find_by_name_like(&self, name: &str) -> ServiceResult<Vec<ProductDto>> {
        let Some(term) = search_term(Some(name))? else {
            return self.find_all().await;
        };

        let products = self
            .products
            .find_by_status_and_name_like(Status::Active, &term)
            .await?;
        Ok(products.into_iter().map(ProductMapper::to_dto).collect())
    }

    /// One page of Active products, narrowed by name when given.
    pub async fn find_all_by_status_and_name(
        &self,
        name: Option<&str>,
        page: PageRequest,
    ) -> ServiceResult<Page<ProductDto>> {
        let term = search_term(name)?;
        let (products, total) = self
            .products
            .find_page_by_status(Status::Active, term.as_deref(), page)
            .await?;
        Ok(Page::new(products, page, total).map(ProductMapper::to_dto))
    }

    /// Creates a product. Status is always Active; the id is generated
    /// unless the client supplied one.
    pub async fn save(&self, input: ProductSaveDto) -> ServiceResult<ProductDto> {
        validate_product_save(&input)?;

        let product = ProductMapper::to_entity(
            input,
            Uuid::new_v4().to_string(),
            Utc::now().date_naive(),
        );
        self.products.insert(&product).await?;

        info!(id = %product.id, "Product created");
        Ok(ProductMapper::to_dto(product))
    }

    /// Overwrites name, price and quantity.
    pub async fn update_product(&self, id: &str, input: ProductSaveDto) -> ServiceResult<ProductDto> {
        let mut product = self.load(id).await?;
        validate_product_save(&input)?;

        ProductMapper::apply_update(&mut product, input, Utc::now().date_naive());
        self.products.update(&product).await?;

        info!(id = %product.id, "Product updated");
        Ok(ProductMapper::to_dto(product))
    }

    /// Sets the status to exactly `status`, even if unchanged.
    pub async fn update_product_status(&self, id: &str, status: Status) -> ServiceResult<ProductDto> {
        let mut product = self.load(id).await?;

        product.status = status;
        product.updated_at = Utc::now().date_naive();
        self.products.update(&product).await?;

        info!(id = %product.id, status = %status, "Product status set");
        Ok(ProductMapper::to_dto(product))
    }

    /// Imports a catalog file: all rows are saved, or none.
    pub async fn save_products_from_csv(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> ServiceResult<Vec<ProductDto>> {
        if !import::is_csv_file_name(file_name) {
            warn!(file_name = %file_name, "Rejected non-CSV upload");
            return Err(ServiceError::InvalidFormat(format!(
                "'{file_name}' is not a .csv file"
            )));
        }

        let products = import::parse_products(bytes, Utc::now().date_naive(), || {
            Uuid::new_v4().to_string()
        })
        .map_err(|e| ServiceError::InvalidFormat(e.to_string()))?;

        self.products.insert_many(&products).await?;

        info!(file_name = %file_name, count = products.len(), "Products imported from CSV");
        Ok(products.into_iter().map(ProductMapper::to_dto).collect())
    }

    async fn load(&self, id: &str) -> ServiceResult<Product> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", id))
    }
}

fn search_term(name: Option<&str>) -> ServiceResult<Option<String>> {
    validate_search_term(name).map_err(|err| {
        let mut errors = pos_core::FieldErrors::new();
        errors.push(err);
        ServiceError::Validation(errors)
    })
}

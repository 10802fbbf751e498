//! `/api/v1/products`

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use tracing::debug;

use super::page_response;
use crate::error::{ApiResult, ServiceError};
use crate::state::AppState;
use pos_core::dto::{NameQuery, ProductDto, ProductSaveDto, StatusQuery};
use pos_core::PageRequest;

/// Multipart field holding the uploaded CSV.
const UPLOAD_FIELD: &str = "file";

/// `GET /products?page=&size=&name=`
pub async fn list_products(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
    Query(query): Query<NameQuery>,
) -> ApiResult<Response> {
    let products = match query.name.as_deref() {
        Some(name) => {
            state
                .products
                .find_all_by_status_and_name(Some(name), page)
                .await?
        }
        None => state.products.find_all_paged(page).await?,
    };
    Ok(page_response(products))
}

/// `GET /products/all`
pub async fn all_products(State(state): State<AppState>) -> ApiResult<Json<Vec<ProductDto>>> {
    Ok(Json(state.products.find_all().await?))
}

/// `GET /products/search?name=`
pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> ApiResult<Json<Vec<ProductDto>>> {
    let name = query.name.unwrap_or_default();
    Ok(Json(state.products.find_by_name_like(&name).await?))
}

/// `POST /products`
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<ProductSaveDto>,
) -> ApiResult<(StatusCode, Json<ProductDto>)> {
    let product = state.products.save(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /products/{id}`
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ProductSaveDto>,
) -> ApiResult<Json<ProductDto>> {
    Ok(Json(state.products.update_product(&id, input).await?))
}

/// `PUT /products/{id}/status?status=`
pub async fn update_product_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> ApiResult<Json<ProductDto>> {
    Ok(Json(
        state
            .products
            .update_product_status(&id, query.status)
            .await?,
    ))
}

/// `POST /products/upload`, multipart with a `file` field.
pub async fn upload_products(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Vec<ProductDto>>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::InvalidFormat(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServiceError::InvalidFormat(e.to_string()))?;
        debug!(file_name = %file_name, size = bytes.len(), "Received product upload");

        let saved = state
            .products
            .save_products_from_csv(&file_name, &bytes)
            .await?;
        return Ok((StatusCode::CREATED, Json(saved)));
    }

    Err(ServiceError::BadRequest(format!("Missing multipart field '{UPLOAD_FIELD}'")).into())
}

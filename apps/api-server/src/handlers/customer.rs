//! `/api/v1/customers`

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};

use super::page_response;
use crate::error::ApiResult;
use crate::state::AppState;
use pos_core::dto::{CustomerDto, CustomerSaveDto, StatusQuery};
use pos_core::PageRequest;

/// `GET /customers?page=&size=`
pub async fn list_customers(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> ApiResult<Response> {
    let customers = state.customers.find_all_customers(page).await?;
    Ok(page_response(customers))
}

/// `GET /customers/{id}`
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CustomerDto>> {
    Ok(Json(state.customers.find_by_id(&id).await?))
}

/// `POST /customers`
pub async fn create_customer(
    State(state): State<AppState>,
    Json(input): Json<CustomerSaveDto>,
) -> ApiResult<(StatusCode, Json<CustomerDto>)> {
    let customer = state.customers.create_customer(input).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// `PUT /customers/{id}`
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<CustomerSaveDto>,
) -> ApiResult<Json<CustomerDto>> {
    Ok(Json(state.customers.update_customer(&id, input).await?))
}

/// `PUT /customers/{id}/status?status=`
pub async fn update_customer_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> ApiResult<Json<CustomerDto>> {
    Ok(Json(
        state
            .customers
            .update_customer_status(&id, query.status)
            .await?,
    ))
}

//! `/api/v1/invoices`

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::page_response;
use crate::error::{ApiError, ApiResult, ServiceError};
use crate::state::AppState;
use pos_core::dto::{
    InvoiceDto, InvoiceExportCriteria, InvoiceSaveDto, InvoiceSearchCriteria, RevenueQuery,
    RevenueShowDto,
};
use pos_core::PageRequest;

const PDF_CONTENT_TYPE: &str = "application/pdf";
const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// `GET /invoices?customerId=&customerName=&startDate=&endDate=&month=&year=&page=&size=`
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(criteria): Query<InvoiceSearchCriteria>,
    Query(page): Query<PageRequest>,
) -> ApiResult<Response> {
    let invoices = state.invoices.find_by_criteria(criteria, page).await?;
    Ok(page_response(invoices))
}

/// `POST /invoices`
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(input): Json<InvoiceSaveDto>,
) -> ApiResult<(StatusCode, Json<InvoiceDto>)> {
    let invoice = state.invoices.create_invoice(input).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

/// `PUT /invoices/{id}`
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<InvoiceSaveDto>,
) -> ApiResult<Json<InvoiceDto>> {
    Ok(Json(state.invoices.update_invoice(&id, input).await?))
}

/// `GET /invoices/{id}/export`: the invoice as PDF, 204 when it does not exist.
pub async fn export_pdf(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    match state.invoices.export_invoice_to_pdf(&id).await {
        Ok(bytes) => Ok((
            [
                (header::CONTENT_TYPE, PDF_CONTENT_TYPE),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"invoice.pdf\"",
                ),
            ],
            bytes,
        )
            .into_response()),
        Err(ServiceError::NotFound { .. }) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(err) => Err(err.into()),
    }
}

/// `GET /invoices/export/excel?customerId=&month=&year=`
pub async fn export_excel(
    State(state): State<AppState>,
    Query(criteria): Query<InvoiceExportCriteria>,
) -> ApiResult<Response> {
    let report = state
        .invoices
        .export_invoice_to_excel_by_filter(criteria)
        .await?;

    let disposition = attachment_header(&report.file_name)?;
    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static(XLSX_CONTENT_TYPE),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report.bytes,
    )
        .into_response())
}

/// `GET /invoices/revenue?date=&revenueBy=`
pub async fn revenue(
    State(state): State<AppState>,
    Query(query): Query<RevenueQuery>,
) -> ApiResult<Json<RevenueShowDto>> {
    Ok(Json(
        state
            .invoices
            .get_invoices_revenue(query.date, &query.revenue_by)
            .await?,
    ))
}

/// `attachment` disposition with an ASCII `filename` and, when the name has
/// other characters, an RFC 5987 `filename*`.
fn attachment_header(file_name: &str) -> Result<HeaderValue, ApiError> {
    let value = if file_name.is_ascii() {
        format!("attachment; filename=\"{file_name}\"")
    } else {
        let fallback: String = file_name
            .chars()
            .map(|c| if c.is_ascii() { c } else { '_' })
            .collect();
        let encoded: String = file_name
            .bytes()
            .map(|b| match b {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                    (b as char).to_string()
                }
                _ => format!("%{b:02X}"),
            })
            .collect();
        format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
    };

    HeaderValue::from_str(&value).map_err(|e| ServiceError::Export(e.to_string()).into())
}

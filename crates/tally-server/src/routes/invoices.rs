//! Invoice Routes
//!
//! HTTP handlers that delegate to InvoiceService for business logic, plus
//! the date-constraint lookup and file exports.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tally::{DateRange, InvoiceChanges, InvoiceNumber, InvoiceQuery, NewInvoice};
use uuid::Uuid;
use validator::Validate;

use super::{domain_error, validation_error, ApiError};
use crate::adapters::ExportFormat;
use crate::models::{
    CreateInvoiceRequest, DateConstraintsQuery, DateConstraintsResponse, ExportQuery,
    InvoiceListQuery, InvoiceListResponse, InvoiceResponse, UpdateInvoiceRequest,
};
use crate::AppState;

/// List Invoices (paged, newest first)
#[utoipa::path(
    get,
    path = "/api/invoices",
    params(InvoiceListQuery),
    responses(
        (status = 200, description = "One page of invoices", body = InvoiceListResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Invoice"
)]
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(params): Query<InvoiceListQuery>,
) -> Result<Json<InvoiceListResponse>, ApiError> {
    let query = InvoiceQuery {
        page: params.page.unwrap_or(1).max(1),
        limit: state.config.page_limit(params.limit),
        search: params.search,
        dates: DateRange {
            start: params.start_date,
            end: params.end_date,
        },
    };

    let page = state
        .invoice_service
        .search(&query)
        .await
        .map_err(domain_error)?;

    Ok(Json(InvoiceListResponse {
        total_pages: page.total.div_ceil(u64::from(query.limit)),
        data: page.data.into_iter().map(Into::into).collect(),
        total: page.total,
        page: query.page,
        limit: query.limit,
    }))
}

/// Create new Invoice
#[utoipa::path(
    post,
    path = "/api/invoices",
    request_body = CreateInvoiceRequest,
    responses(
        (status = 201, description = "Invoice created with computed totals", body = InvoiceResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Invoice number already exists")
    ),
    tag = "Invoice"
)]
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(payload): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceResponse>), ApiError> {
    payload.validate().map_err(validation_error)?;

    let draft = NewInvoice::try_from(payload).map_err(domain_error)?;
    let invoice = state
        .invoice_service
        .create(draft)
        .await
        .map_err(domain_error)?;

    Ok((StatusCode::CREATED, Json(invoice.into())))
}

/// Get Invoice by ID
#[utoipa::path(
    get,
    path = "/api/invoices/{id}",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice found", body = InvoiceResponse),
        (status = 404, description = "Invoice not found")
    ),
    tag = "Invoice"
)]
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    let invoice = state
        .invoice_service
        .get_by_id(id)
        .await
        .map_err(domain_error)?;

    Ok(Json(invoice.into()))
}

/// Update Invoice
#[utoipa::path(
    put,
    path = "/api/invoices/{id}",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    request_body = UpdateInvoiceRequest,
    responses(
        (status = 200, description = "Invoice updated, totals recomputed", body = InvoiceResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Invoice not found"),
        (status = 409, description = "Invoice number already exists")
    ),
    tag = "Invoice"
)]
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInvoiceRequest>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    payload.validate().map_err(validation_error)?;

    let changes = InvoiceChanges::try_from(payload).map_err(domain_error)?;
    let invoice = state
        .invoice_service
        .update(id, changes)
        .await
        .map_err(domain_error)?;

    Ok(Json(invoice.into()))
}

/// Delete Invoice
#[utoipa::path(
    delete,
    path = "/api/invoices/{id}",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 204, description = "Invoice and its items deleted"),
        (status = 404, description = "Invoice not found")
    ),
    tag = "Invoice"
)]
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .invoice_service
        .delete(id)
        .await
        .map_err(domain_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Allowed date range for an invoice number
#[utoipa::path(
    get,
    path = "/api/invoices/date-constraints/{invoice_number}",
    params(
        ("invoice_number" = String, Path, description = "Invoice number, e.g. AB12345678"),
        DateConstraintsQuery
    ),
    responses(
        (status = 200, description = "Neighbouring invoices and the dates they allow", body = DateConstraintsResponse),
        (status = 400, description = "Malformed invoice number")
    ),
    tag = "Invoice"
)]
pub async fn get_date_constraints(
    State(state): State<AppState>,
    Path(invoice_number): Path<String>,
    Query(query): Query<DateConstraintsQuery>,
) -> Result<Json<DateConstraintsResponse>, ApiError> {
    let number: InvoiceNumber = invoice_number.parse().map_err(domain_error)?;

    let constraints = state
        .invoice_service
        .date_constraints(&number, query.exclude_id)
        .await
        .map_err(domain_error)?;

    Ok(Json(constraints.into()))
}

/// Export Invoices as CSV, PDF or Excel
#[utoipa::path(
    get,
    path = "/api/invoices/export/{format}",
    params(
        ("format" = ExportFormat, Path, description = "csv, pdf or excel"),
        ExportQuery
    ),
    responses(
        (status = 200, description = "File download"),
        (status = 400, description = "Unknown format"),
        (status = 500, description = "Rendering failed")
    ),
    tag = "Invoice"
)]
pub async fn export_invoices(
    State(state): State<AppState>,
    Path(format): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let format: ExportFormat = format
        .parse()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    let invoices = state
        .invoice_service
        .export(&query.into())
        .await
        .map_err(domain_error)?;

    let body = tokio::task::spawn_blocking(move || format.render(&invoices))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| {
            tracing::error!("Failed to render {} export: {}", format, e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    let file_name = format.file_name(chrono::Utc::now().date_naive());
    let headers = [
        (header::CONTENT_TYPE, format.content_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", file_name),
        ),
    ];

    Ok((headers, body).into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/invoices", get(list_invoices).post(create_invoice))
        .route(
            "/api/invoices/date-constraints/:invoice_number",
            get(get_date_constraints),
        )
        .route("/api/invoices/export/:format", get(export_invoices))
        .route(
            "/api/invoices/:id",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
}

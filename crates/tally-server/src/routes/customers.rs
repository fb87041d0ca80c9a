//! Customer Routes
//!
//! HTTP handlers that delegate to CustomerService for business logic.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use super::{domain_error, validation_error, ApiError};
use crate::models::{
    CreateCustomerRequest, CustomerCodeQuery, CustomerResponse, UpdateCustomerRequest,
};
use crate::AppState;

/// List all Customers
#[utoipa::path(
    get,
    path = "/api/customers",
    responses(
        (status = 200, description = "List of all Customers, newest first", body = Vec<CustomerResponse>),
        (status = 500, description = "Internal server error")
    ),
    tag = "Customer"
)]
pub async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<CustomerResponse>>, ApiError> {
    let customers = state
        .customer_service
        .list_all()
        .await
        .map_err(domain_error)?;

    Ok(Json(customers.into_iter().map(Into::into).collect()))
}

/// Create new Customer
#[utoipa::path(
    post,
    path = "/api/customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = CustomerResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Customer code already exists")
    ),
    tag = "Customer"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<CustomerResponse>), ApiError> {
    payload.validate().map_err(validation_error)?;

    let customer = state
        .customer_service
        .create(
            payload.code,
            payload.name,
            payload.zip_code,
            payload.address,
            payload.phone,
        )
        .await
        .map_err(domain_error)?;

    Ok((StatusCode::CREATED, Json(customer.into())))
}

/// Find a Customer by business code
#[utoipa::path(
    get,
    path = "/api/customers/by-code",
    params(CustomerCodeQuery),
    responses(
        (status = 200, description = "Customer, or null when no customer has the code", body = CustomerResponse)
    ),
    tag = "Customer"
)]
pub async fn get_customer_by_code(
    State(state): State<AppState>,
    Query(query): Query<CustomerCodeQuery>,
) -> Result<Json<Option<CustomerResponse>>, ApiError> {
    let customer = state
        .customer_service
        .find_by_code(&query.code)
        .await
        .map_err(domain_error)?;

    Ok(Json(customer.map(Into::into)))
}

/// Get Customer by ID
#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer found", body = CustomerResponse),
        (status = 404, description = "Customer not found")
    ),
    tag = "Customer"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let customer = state
        .customer_service
        .get_by_id(id)
        .await
        .map_err(domain_error)?;

    Ok(Json(customer.into()))
}

/// Update Customer
#[utoipa::path(
    put,
    path = "/api/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer ID")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = CustomerResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Customer not found"),
        (status = 409, description = "Customer code already exists")
    ),
    tag = "Customer"
)]
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> Result<Json<CustomerResponse>, ApiError> {
    payload.validate().map_err(validation_error)?;

    let customer = state
        .customer_service
        .update(id, payload.into())
        .await
        .map_err(domain_error)?;

    Ok(Json(customer.into()))
}

/// Delete Customer
#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 204, description = "Customer deleted"),
        (status = 404, description = "Customer not found")
    ),
    tag = "Customer"
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .customer_service
        .delete(id)
        .await
        .map_err(domain_error)?;

    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/customers", get(list_customers).post(create_customer))
        .route("/api/customers/by-code", get(get_customer_by_code))
        .route(
            "/api/customers/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}

#[cfg(test)]
mod tests {
    use crate::models::CustomerResponse;
    use crate::routes::test_support::{app, json, send};
    use axum::http::StatusCode;
    use serde_json::json as body;

    #[tokio::test]
    async fn test_customer_lifecycle() {
        let app = app();

        let (status, bytes) = send(
            &app,
            "POST",
            "/api/customers",
            Some(body!({"code": "C001", "name": "Acme", "phone": "02-1234-5678"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let created: CustomerResponse = json(&bytes);

        let (status, bytes) = send(&app, "GET", "/api/customers/by-code?code=C001", None).await;
        assert_eq!(status, StatusCode::OK);
        let found: Option<CustomerResponse> = json(&bytes);
        assert_eq!(found.unwrap().id, created.id);

        let (status, bytes) = send(
            &app,
            "PUT",
            &format!("/api/customers/{}", created.id),
            Some(body!({"name": "Acme Ltd"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let updated: CustomerResponse = json(&bytes);
        assert_eq!(updated.name, "Acme Ltd");
        assert_eq!(updated.code, "C001");

        let uri = format!("/api/customers/{}", created.id);
        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_code_is_null() {
        let (status, bytes) = send(&app(), "GET", "/api/customers/by-code?code=NOPE", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(bytes, b"null");
    }

    #[tokio::test]
    async fn test_duplicate_code_and_invalid_payload() {
        let app = app();
        let payload = body!({"code": "C001", "name": "Acme"});

        let (status, _) = send(&app, "POST", "/api/customers", Some(payload.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = send(&app, "POST", "/api/customers", Some(payload)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(
            &app,
            "POST",
            "/api/customers",
            Some(body!({"code": "", "name": "Nobody"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

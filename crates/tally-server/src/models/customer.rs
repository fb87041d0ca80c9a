//! Customer DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use tally::{Customer, CustomerChanges};

/// Create Customer request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, max = 20, message = "Customer code must be 1-20 characters"))]
    pub code: String,
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(max = 10, message = "Zip code must be at most 10 characters"))]
    pub zip_code: Option<String>,
    #[validate(length(max = 200, message = "Address must be at most 200 characters"))]
    pub address: Option<String>,
    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,
}

/// Update Customer request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 1, max = 20, message = "Customer code must be 1-20 characters"))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 10, message = "Zip code must be at most 10 characters"))]
    pub zip_code: Option<String>,
    #[validate(length(max = 200, message = "Address must be at most 200 characters"))]
    pub address: Option<String>,
    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,
}

impl From<UpdateCustomerRequest> for CustomerChanges {
    fn from(req: UpdateCustomerRequest) -> Self {
        Self {
            code: req.code,
            name: req.name,
            zip_code: req.zip_code,
            address: req.address,
            phone: req.phone,
        }
    }
}

/// Lookup by business code
#[derive(Debug, Deserialize, IntoParams)]
pub struct CustomerCodeQuery {
    pub code: String,
}

/// Customer response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerResponse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub zip_code: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            code: customer.code,
            name: customer.name,
            zip_code: customer.zip_code,
            address: customer.address,
            phone: customer.phone,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        }
    }
}

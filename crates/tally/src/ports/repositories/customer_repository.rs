//! Customer Repository Port
//!
//! Abstract interface for Customer persistence operations.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{errors::DomainError, Customer};

/// Repository interface for Customer entities
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Find a Customer by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, DomainError>;

    /// Find a Customer by its business code
    async fn find_by_code(&self, code: &str) -> Result<Option<Customer>, DomainError>;

    /// Find all Customers, newest first
    async fn find_all(&self) -> Result<Vec<Customer>, DomainError>;

    /// Save a Customer (insert or update)
    async fn save(&self, customer: &Customer) -> Result<Customer, DomainError>;

    /// Delete a Customer by ID
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

//! Customer Application Service (Use Case)
//!
//! Orchestrates domain operations for Customer management. Customer codes are
//! unique business keys.

use std::sync::Arc;
use uuid::Uuid;

use tally::{Customer, CustomerChanges, CustomerRepository, DomainError};

/// Application service for Customer operations
pub struct CustomerService<R: CustomerRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: CustomerRepository + ?Sized> CustomerService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Get all Customers, newest first
    pub async fn list_all(&self) -> Result<Vec<Customer>, DomainError> {
        self.repo.find_all().await
    }

    /// Get a Customer by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Customer, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Customer", id))
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<Customer>, DomainError> {
        self.repo.find_by_code(code.trim()).await
    }

    /// Create a new Customer
    pub async fn create(
        &self,
        code: String,
        name: String,
        zip_code: Option<String>,
        address: Option<String>,
        phone: Option<String>,
    ) -> Result<Customer, DomainError> {
        let code = code.trim().to_string();
        if self.repo.find_by_code(&code).await?.is_some() {
            return Err(DomainError::conflict(format!(
                "Customer code {} already exists",
                code
            )));
        }

        let customer = Customer::new(code, name, zip_code, address, phone);
        let saved = self.repo.save(&customer).await?;

        tracing::info!("Created Customer: {} ({}) - {}", saved.code, saved.id, saved.name);

        Ok(saved)
    }

    /// Update a Customer
    pub async fn update(
        &self,
        id: Uuid,
        mut changes: CustomerChanges,
    ) -> Result<Customer, DomainError> {
        let current = self.get_by_id(id).await?;

        if let Some(code) = changes.code.take() {
            let code = code.trim().to_string();
            if let Some(other) = self.repo.find_by_code(&code).await? {
                if other.id != id {
                    return Err(DomainError::conflict(format!(
                        "Customer code {} already exists",
                        code
                    )));
                }
            }
            changes.code = Some(code);
        }

        let saved = self.repo.save(&current.apply(changes)).await?;

        tracing::info!("Updated Customer: {} ({})", saved.code, saved.id);

        Ok(saved)
    }

    /// Delete a Customer
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.repo.delete(id).await? {
            return Err(DomainError::not_found("Customer", id));
        }

        tracing::info!("Deleted Customer: {}", id);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally::memory::InMemoryCustomerRepository;

    fn service() -> CustomerService<InMemoryCustomerRepository> {
        CustomerService::new(Arc::new(InMemoryCustomerRepository::new()))
    }

    async fn create(service: &CustomerService<InMemoryCustomerRepository>, code: &str) -> Customer {
        service
            .create(code.to_string(), format!("Customer {}", code), None, None, None)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_trims_code_and_rejects_duplicates() {
        let service = service();
        let created = service
            .create(" C001 ".to_string(), "Acme".to_string(), None, None, None)
            .await
            .unwrap();
        assert_eq!(created.code, "C001");

        let err = service
            .create("C001".to_string(), "Again".to_string(), None, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_find_by_code() {
        let service = service();
        create(&service, "C001").await;

        assert!(service.find_by_code("C001").await.unwrap().is_some());
        assert!(service.find_by_code("C999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_to_taken_code_conflicts() {
        let service = service();
        create(&service, "C001").await;
        let second = create(&service, "C002").await;

        let err = service
            .update(
                second.id,
                CustomerChanges {
                    code: Some("C001".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        // Keeping its own code is fine
        let updated = service
            .update(
                second.id,
                CustomerChanges {
                    code: Some("C002".to_string()),
                    phone: Some("02-1234-5678".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.phone.as_deref(), Some("02-1234-5678"));
    }

    #[tokio::test]
    async fn test_missing_customer_is_not_found() {
        let service = service();
        let id = Uuid::new_v4();

        assert!(matches!(
            service.get_by_id(id).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
        assert!(matches!(
            service.delete(id).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
    }
}

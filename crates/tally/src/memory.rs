//! In-memory repository implementations.
//!
//! Same semantics as the PostgreSQL adapters, including the unique business
//! keys (customer code, invoice number). Used by tests and local tooling.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Customer, DomainError, Invoice, InvoiceNumber, InvoiceRef};
use crate::ports::{
    matches_search, CustomerRepository, ExportFilter, InvoiceQuery, InvoiceRepository, Page,
};

/// In-memory customer store
#[derive(Clone, Default)]
pub struct InMemoryCustomerRepository {
    customers: Arc<RwLock<Vec<Customer>>>,
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored customers
    pub async fn len(&self) -> usize {
        self.customers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.customers.read().await.is_empty()
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, DomainError> {
        let customers = self.customers.read().await;
        Ok(customers.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Customer>, DomainError> {
        let customers = self.customers.read().await;
        Ok(customers.iter().find(|c| c.code == code).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Customer>, DomainError> {
        let customers = self.customers.read().await;
        let mut all: Vec<Customer> = customers.iter().rev().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn save(&self, customer: &Customer) -> Result<Customer, DomainError> {
        let mut customers = self.customers.write().await;

        if customers
            .iter()
            .any(|c| c.code == customer.code && c.id != customer.id)
        {
            return Err(DomainError::conflict(format!(
                "Customer code {} already exists",
                customer.code
            )));
        }

        match customers.iter_mut().find(|c| c.id == customer.id) {
            Some(existing) => *existing = customer.clone(),
            None => customers.push(customer.clone()),
        }

        Ok(customer.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut customers = self.customers.write().await;
        let before = customers.len();
        customers.retain(|c| c.id != id);
        Ok(customers.len() < before)
    }
}

/// In-memory invoice store
#[derive(Clone, Default)]
pub struct InMemoryInvoiceRepository {
    invoices: Arc<RwLock<Vec<Invoice>>>,
}

impl InMemoryInvoiceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored invoices
    pub async fn len(&self) -> usize {
        self.invoices.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.invoices.read().await.is_empty()
    }

    /// Same-track refs other than `exclude_id`
    async fn track(&self, number: &InvoiceNumber, exclude_id: Option<Uuid>) -> Vec<InvoiceRef> {
        let invoices = self.invoices.read().await;
        invoices
            .iter()
            .filter(|i| i.prefix() == number.prefix())
            .filter(|i| Some(i.id) != exclude_id)
            .map(Invoice::to_ref)
            .collect()
    }
}

#[async_trait]
impl InvoiceRepository for InMemoryInvoiceRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, DomainError> {
        let invoices = self.invoices.read().await;
        Ok(invoices.iter().find(|i| i.id == id).cloned())
    }

    async fn find_by_number(
        &self,
        number: &InvoiceNumber,
        exclude_id: Option<Uuid>,
    ) -> Result<Option<InvoiceRef>, DomainError> {
        Ok(self
            .track(number, exclude_id)
            .await
            .into_iter()
            .find(|r| r.invoice_number == number.as_str()))
    }

    async fn find_nearest_before(
        &self,
        number: &InvoiceNumber,
        exclude_id: Option<Uuid>,
    ) -> Result<Option<InvoiceRef>, DomainError> {
        Ok(self
            .track(number, exclude_id)
            .await
            .into_iter()
            .filter(|r| r.invoice_number.as_str() < number.as_str())
            .max_by(|a, b| a.invoice_number.cmp(&b.invoice_number)))
    }

    async fn find_nearest_after(
        &self,
        number: &InvoiceNumber,
        exclude_id: Option<Uuid>,
    ) -> Result<Option<InvoiceRef>, DomainError> {
        Ok(self
            .track(number, exclude_id)
            .await
            .into_iter()
            .filter(|r| r.invoice_number.as_str() > number.as_str())
            .min_by(|a, b| a.invoice_number.cmp(&b.invoice_number)))
    }

    async fn search(&self, query: &InvoiceQuery) -> Result<Page<Invoice>, DomainError> {
        let invoices = self.invoices.read().await;
        let mut matched: Vec<Invoice> = invoices
            .iter()
            .rev()
            .filter(|i| query.dates.contains(i.invoice_date))
            .filter(|i| matches_search(i, query.search.as_deref()))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matched.len() as u64;
        let data = matched
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .collect();

        Ok(Page { data, total })
    }

    async fn find_for_export(&self, filter: &ExportFilter) -> Result<Vec<Invoice>, DomainError> {
        let invoices = self.invoices.read().await;
        Ok(invoices
            .iter()
            .filter(|i| filter.dates.contains(i.invoice_date))
            .filter(|i| matches_search(i, filter.search.as_deref()))
            .cloned()
            .collect())
    }

    async fn save(&self, invoice: &Invoice) -> Result<Invoice, DomainError> {
        let mut invoices = self.invoices.write().await;

        if invoices
            .iter()
            .any(|i| i.invoice_number == invoice.invoice_number && i.id != invoice.id)
        {
            return Err(DomainError::conflict(format!(
                "Invoice number {} already exists",
                invoice.invoice_number
            )));
        }

        match invoices.iter_mut().find(|i| i.id == invoice.id) {
            Some(existing) => *existing = invoice.clone(),
            None => invoices.push(invoice.clone()),
        }

        Ok(invoice.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut invoices = self.invoices.write().await;
        let before = invoices.len();
        invoices.retain(|i| i.id != id);
        Ok(invoices.len() < before)
    }
}

//! Invoice Application Service (Use Case)
//!
//! Orchestrates domain operations for Invoice management: issuing, editing,
//! searching, neighbour date constraints and export selection.

use std::sync::Arc;
use uuid::Uuid;

use tally::{
    resolve_date_constraints, sort_for_export, DateConstraints, DomainError, ExportFilter, Invoice,
    InvoiceChanges, InvoiceNumber, InvoiceQuery, InvoiceRepository, NeighborPolicy, NewInvoice,
    Page,
};

/// Application service for Invoice operations
pub struct InvoiceService<R: InvoiceRepository + ?Sized> {
    repo: Arc<R>,
    policy: NeighborPolicy,
}

impl<R: InvoiceRepository + ?Sized> InvoiceService<R> {
    pub fn new(repo: Arc<R>, policy: NeighborPolicy) -> Self {
        Self { repo, policy }
    }

    /// Paged search, newest first
    pub async fn search(&self, query: &InvoiceQuery) -> Result<Page<Invoice>, DomainError> {
        self.repo.search(query).await
    }

    /// Get an Invoice by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Invoice, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Invoice", id))
    }

    /// Issue a new Invoice
    pub async fn create(&self, draft: NewInvoice) -> Result<Invoice, DomainError> {
        self.ensure_number_free(&draft.invoice_number, None).await?;

        let invoice = Invoice::new(draft)?;
        let saved = self.repo.save(&invoice).await?;

        tracing::info!(
            "Created Invoice: {} ({}) - {} items, total {}",
            saved.invoice_number,
            saved.id,
            saved.items.len(),
            saved.tax_included_amount
        );

        Ok(saved)
    }

    /// Update an Invoice; totals are recomputed from the resulting items
    pub async fn update(&self, id: Uuid, changes: InvoiceChanges) -> Result<Invoice, DomainError> {
        let current = self.get_by_id(id).await?;

        if let Some(number) = &changes.invoice_number {
            self.ensure_number_free(number, Some(id)).await?;
        }

        let updated = current.apply(changes)?;

        let saved = self.repo.save(&updated).await?;

        tracing::info!("Updated Invoice: {} ({})", saved.invoice_number, saved.id);

        Ok(saved)
    }

    /// Delete an Invoice together with its items
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.repo.delete(id).await? {
            return Err(DomainError::not_found("Invoice", id));
        }

        tracing::info!("Deleted Invoice: {}", id);

        Ok(())
    }

    /// Allowed date range for `number`, ignoring the invoice `exclude_id`
    pub async fn date_constraints(
        &self,
        number: &InvoiceNumber,
        exclude_id: Option<Uuid>,
    ) -> Result<DateConstraints, DomainError> {
        resolve_date_constraints(self.repo.as_ref(), number, exclude_id, self.policy).await
    }

    /// Invoices for a report, grouped by track then ordered by date and number
    pub async fn export(&self, filter: &ExportFilter) -> Result<Vec<Invoice>, DomainError> {
        let mut invoices = self.repo.find_for_export(filter).await?;
        sort_for_export(&mut invoices);

        tracing::info!("Selected {} invoices for export", invoices.len());

        Ok(invoices)
    }

    async fn ensure_number_free(
        &self,
        number: &InvoiceNumber,
        exclude_id: Option<Uuid>,
    ) -> Result<(), DomainError> {
        if self.repo.find_by_number(number, exclude_id).await?.is_some() {
            return Err(DomainError::conflict(format!(
                "Invoice number {} already exists",
                number
            )));
        }
        Ok(())
    }
}

//! PostgreSQL implementation of InvoiceRepository
//!
//! Invoices live in `invoices`, their items in `invoice_items` (ordered by
//! `position`). Saving replaces the item set inside one transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use tally::{
    DateRange, DomainError, ExportFilter, Invoice, InvoiceItem, InvoiceNumber, InvoiceQuery,
    InvoiceRef, InvoiceRepository, Page,
};

use super::map_sqlx_error;

/// PostgreSQL implementation of InvoiceRepository
pub struct PgInvoiceRepository {
    pool: PgPool,
}

impl PgInvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load items for a batch of invoices, grouped by invoice ID
    async fn load_items(
        &self,
        invoice_ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, Vec<InvoiceItem>>, DomainError> {
        if invoice_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, InvoiceItemRow>(LOAD_ITEMS)
        .bind(invoice_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let mut grouped: HashMap<Uuid, Vec<InvoiceItem>> = HashMap::new();
        for row in rows {
            grouped.entry(row.invoice_id).or_default().push(row.into());
        }
        Ok(grouped)
    }

    /// Attach items to a list of invoice rows, keeping row order
    async fn with_items(&self, rows: Vec<InvoiceRow>) -> Result<Vec<Invoice>, DomainError> {
        let mut items = self.load_items(rows.iter().map(|r| r.id).collect()).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let invoice_items = items.remove(&row.id).unwrap_or_default();
                row.into_invoice(invoice_items)
            })
            .collect())
    }

    async fn find_ref(
        &self,
        sql: &str,
        number: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<Option<InvoiceRef>, DomainError> {
        let row = sqlx::query_as::<_, InvoiceRefRow>(sql)
            .bind(number)
            .bind(exclude_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }
}

/// Internal row types for sqlx mapping
#[derive(sqlx::FromRow)]
struct InvoiceRow {
    id: Uuid,
    invoice_number: String,
    invoice_date: NaiveDate,
    is_voided: bool,
    is_blank: bool,
    is_dual_format: bool,
    customer_code: Option<String>,
    buyer: String,
    tax_excluded_amount: Decimal,
    tax: Decimal,
    tax_included_amount: Decimal,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl InvoiceRow {
    fn into_invoice(self, items: Vec<InvoiceItem>) -> Invoice {
        Invoice {
            id: self.id,
            invoice_number: self.invoice_number,
            invoice_date: self.invoice_date,
            is_voided: self.is_voided,
            is_blank: self.is_blank,
            is_dual_format: self.is_dual_format,
            customer_code: self.customer_code,
            buyer: self.buyer,
            items,
            tax_excluded_amount: self.tax_excluded_amount,
            tax: self.tax,
            tax_included_amount: self.tax_included_amount,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct InvoiceItemRow {
    id: Uuid,
    invoice_id: Uuid,
    product_name: String,
    quantity: i32,
    amount: Decimal,
    unit_price: Decimal,
}

impl From<InvoiceItemRow> for InvoiceItem {
    fn from(row: InvoiceItemRow) -> Self {
        Self {
            id: row.id,
            product_name: row.product_name,
            quantity: row.quantity,
            amount: row.amount,
            unit_price: row.unit_price,
        }
    }
}

#[derive(sqlx::FromRow)]
struct InvoiceRefRow {
    id: Uuid,
    invoice_number: String,
    invoice_date: NaiveDate,
}

impl From<InvoiceRefRow> for InvoiceRef {
    fn from(row: InvoiceRefRow) -> Self {
        Self {
            id: row.id,
            invoice_number: row.invoice_number,
            invoice_date: row.invoice_date,
        }
    }
}

/// Escape LIKE wildcards so user input matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Append the shared WHERE clause for search and export queries
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, search: Option<&str>, dates: &DateRange) {
    qb.push(" WHERE TRUE");

    if let Some(start) = dates.start {
        qb.push(" AND invoice_date >= ").push_bind(start);
    }
    if let Some(end) = dates.end {
        qb.push(" AND invoice_date <= ").push_bind(end);
    }
    if let Some(needle) = search.map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(needle));
        qb.push(" AND (invoice_number ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR buyer ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR customer_code ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

const LOAD_ITEMS: &str = r#"
    SELECT id, invoice_id, product_name, quantity, amount, unit_price
    FROM invoice_items
    WHERE invoice_id = ANY($1)
    ORDER BY invoice_id, position
"#;

const FIND_BY_NUMBER: &str = r#"
    SELECT id, invoice_number, invoice_date FROM invoices
    WHERE invoice_number = $1 AND ($2::uuid IS NULL OR id <> $2)
"#;

const FIND_NEAREST_BEFORE: &str = r#"
    SELECT id, invoice_number, invoice_date FROM invoices
    WHERE LEFT(invoice_number, 2) = LEFT($1, 2)
      AND invoice_number < $1
      AND ($2::uuid IS NULL OR id <> $2)
    ORDER BY invoice_number DESC
    LIMIT 1
"#;

const FIND_NEAREST_AFTER: &str = r#"
    SELECT id, invoice_number, invoice_date FROM invoices
    WHERE LEFT(invoice_number, 2) = LEFT($1, 2)
      AND invoice_number > $1
      AND ($2::uuid IS NULL OR id <> $2)
    ORDER BY invoice_number ASC
    LIMIT 1
"#;

#[async_trait]
impl InvoiceRepository for PgInvoiceRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, DomainError> {
        let row = sqlx::query_as::<_, InvoiceRow>("SELECT * FROM invoices WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        match row {
            Some(row) => Ok(self.with_items(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_by_number(
        &self,
        number: &InvoiceNumber,
        exclude_id: Option<Uuid>,
    ) -> Result<Option<InvoiceRef>, DomainError> {
        self.find_ref(FIND_BY_NUMBER, number.as_str(), exclude_id)
            .await
    }

    async fn find_nearest_before(
        &self,
        number: &InvoiceNumber,
        exclude_id: Option<Uuid>,
    ) -> Result<Option<InvoiceRef>, DomainError> {
        self.find_ref(FIND_NEAREST_BEFORE, number.as_str(), exclude_id)
            .await
    }

    async fn find_nearest_after(
        &self,
        number: &InvoiceNumber,
        exclude_id: Option<Uuid>,
    ) -> Result<Option<InvoiceRef>, DomainError> {
        self.find_ref(FIND_NEAREST_AFTER, number.as_str(), exclude_id)
            .await
    }

    async fn search(&self, query: &InvoiceQuery) -> Result<Page<Invoice>, DomainError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM invoices");
        push_filters(&mut count_qb, query.search.as_deref(), &query.dates);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM invoices");
        push_filters(&mut qb, query.search.as_deref(), &query.dates);
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(i64::from(query.limit))
            .push(" OFFSET ")
            .push_bind(query.offset() as i64);

        let rows = qb
            .build_query_as::<InvoiceRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(Page {
            data: self.with_items(rows).await?,
            total: total.max(0) as u64,
        })
    }

    async fn find_for_export(&self, filter: &ExportFilter) -> Result<Vec<Invoice>, DomainError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM invoices");
        push_filters(&mut qb, filter.search.as_deref(), &filter.dates);

        let rows = qb
            .build_query_as::<InvoiceRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        self.with_items(rows).await
    }

    async fn save(&self, invoice: &Invoice) -> Result<Invoice, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        // Check if exists
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM invoices WHERE id = $1)")
                .bind(invoice.id)
                .fetch_one(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;

        let row = if exists {
            // Update
            sqlx::query_as::<_, InvoiceRow>(
                r#"
                UPDATE invoices
                SET invoice_number = $2, invoice_date = $3, is_voided = $4, is_blank = $5,
                    is_dual_format = $6, customer_code = $7, buyer = $8,
                    tax_excluded_amount = $9, tax = $10, tax_included_amount = $11,
                    updated_at = NOW()
                WHERE id = $1
                RETURNING *
                "#,
            )
            .bind(invoice.id)
            .bind(&invoice.invoice_number)
            .bind(invoice.invoice_date)
            .bind(invoice.is_voided)
            .bind(invoice.is_blank)
            .bind(invoice.is_dual_format)
            .bind(&invoice.customer_code)
            .bind(&invoice.buyer)
            .bind(invoice.tax_excluded_amount)
            .bind(invoice.tax)
            .bind(invoice.tax_included_amount)
            .fetch_one(&mut *tx)
            .await
        } else {
            // Insert
            sqlx::query_as::<_, InvoiceRow>(
                r#"
                INSERT INTO invoices (
                    id, invoice_number, invoice_date, is_voided, is_blank, is_dual_format,
                    customer_code, buyer, tax_excluded_amount, tax, tax_included_amount,
                    created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                RETURNING *
                "#,
            )
            .bind(invoice.id)
            .bind(&invoice.invoice_number)
            .bind(invoice.invoice_date)
            .bind(invoice.is_voided)
            .bind(invoice.is_blank)
            .bind(invoice.is_dual_format)
            .bind(&invoice.customer_code)
            .bind(&invoice.buyer)
            .bind(invoice.tax_excluded_amount)
            .bind(invoice.tax)
            .bind(invoice.tax_included_amount)
            .bind(invoice.created_at)
            .bind(invoice.updated_at)
            .fetch_one(&mut *tx)
            .await
        }
        .map_err(map_sqlx_error)?;

        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
            .bind(invoice.id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        if !invoice.items.is_empty() {
            let mut qb = QueryBuilder::<Postgres>::new(
                "INSERT INTO invoice_items (id, invoice_id, position, product_name, quantity, amount, unit_price) ",
            );
            qb.push_values(invoice.items.iter().enumerate(), |mut b, (position, item)| {
                b.push_bind(item.id)
                    .push_bind(invoice.id)
                    .push_bind(position as i32)
                    .push_bind(item.product_name.clone())
                    .push_bind(item.quantity)
                    .push_bind(item.amount)
                    .push_bind(item.unit_price);
            });
            qb.build()
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(row.into_invoice(invoice.items.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_neutralises_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("Acme"), "Acme");
    }

    #[test]
    fn test_push_filters_binds_only_present_filters() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM invoices");
        push_filters(&mut qb, Some("  "), &DateRange::default());
        assert_eq!(qb.sql(), "SELECT * FROM invoices WHERE TRUE");

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM invoices");
        let dates = DateRange {
            start: NaiveDate::from_ymd_opt(2024, 1, 1),
            end: NaiveDate::from_ymd_opt(2024, 1, 31),
        };
        push_filters(&mut qb, Some("AB"), &dates);
        assert_eq!(
            qb.sql(),
            "SELECT * FROM invoices WHERE TRUE AND invoice_date >= $1 AND invoice_date <= $2 \
             AND (invoice_number ILIKE $3 OR buyer ILIKE $4 OR customer_code ILIKE $5)"
        );
    }

    #[test]
    fn test_load_items_selects_only_mapped_columns() {
        let select = LOAD_ITEMS
            .split("FROM")
            .next()
            .unwrap_or_default()
            .trim()
            .trim_start_matches("SELECT");
        let columns: Vec<&str> = select.split(',').map(str::trim).collect();

        assert_eq!(
            columns,
            vec!["id", "invoice_id", "product_name", "quantity", "amount", "unit_price"]
        );
        assert!(LOAD_ITEMS.contains("ORDER BY invoice_id, position"));
    }
}

//! PostgreSQL implementation of CustomerRepository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use tally::{Customer, CustomerRepository, DomainError};

use super::map_sqlx_error;

/// PostgreSQL implementation of CustomerRepository
pub struct PgCustomerRepository {
    pool: PgPool,
}

impl PgCustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: Uuid,
    code: String,
    name: String,
    zip_code: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row.id,
            code: row.code,
            name: row.name,
            zip_code: row.zip_code,
            address: row.address,
            phone: row.phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl CustomerRepository for PgCustomerRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, DomainError> {
        let row = sqlx::query_as::<_, CustomerRow>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Customer>, DomainError> {
        let row = sqlx::query_as::<_, CustomerRow>("SELECT * FROM customers WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn find_all(&self) -> Result<Vec<Customer>, DomainError> {
        let rows =
            sqlx::query_as::<_, CustomerRow>("SELECT * FROM customers ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn save(&self, customer: &Customer) -> Result<Customer, DomainError> {
        // Check if exists
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)")
                .bind(customer.id)
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        let row = if exists {
            // Update
            sqlx::query_as::<_, CustomerRow>(
                r#"
                UPDATE customers
                SET code = $2, name = $3, zip_code = $4, address = $5, phone = $6,
                    updated_at = NOW()
                WHERE id = $1
                RETURNING *
                "#,
            )
            .bind(customer.id)
            .bind(&customer.code)
            .bind(&customer.name)
            .bind(&customer.zip_code)
            .bind(&customer.address)
            .bind(&customer.phone)
            .fetch_one(&self.pool)
            .await
        } else {
            // Insert
            sqlx::query_as::<_, CustomerRow>(
                r#"
                INSERT INTO customers (id, code, name, zip_code, address, phone, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
                "#,
            )
            .bind(customer.id)
            .bind(&customer.code)
            .bind(&customer.name)
            .bind(&customer.zip_code)
            .bind(&customer.address)
            .bind(&customer.phone)
            .bind(customer.created_at)
            .bind(customer.updated_at)
            .fetch_one(&self.pool)
            .await
        }
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

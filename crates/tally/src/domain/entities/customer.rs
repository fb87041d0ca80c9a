//! Customer - Party invoices are issued to, keyed by a short business code

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Customer record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub zip_code: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields of a customer that may be changed after creation
#[derive(Debug, Clone, Default)]
pub struct CustomerChanges {
    pub code: Option<String>,
    pub name: Option<String>,
    pub zip_code: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl Customer {
    /// Create a new Customer with generated ID and timestamps
    pub fn new(
        code: String,
        name: String,
        zip_code: Option<String>,
        address: Option<String>,
        phone: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            code,
            name,
            zip_code,
            address,
            phone,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update, leaving unspecified fields untouched
    pub fn apply(self, changes: CustomerChanges) -> Self {
        Self {
            code: changes.code.unwrap_or(self.code),
            name: changes.name.unwrap_or(self.name),
            zip_code: changes.zip_code.or(self.zip_code),
            address: changes.address.or(self.address),
            phone: changes.phone.or(self.phone),
            updated_at: Utc::now(),
            ..self
        }
    }
}

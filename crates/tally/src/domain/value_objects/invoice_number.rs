//! InvoiceNumber - Two-letter track prefix followed by an 8-digit sequence

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

const PREFIX_LEN: usize = 2;
const SEQUENCE_LEN: usize = 8;

/// Largest sequence representable in eight digits
pub const MAX_SEQUENCE: u32 = 99_999_999;

/// Validated invoice number such as `AB12345678`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
    /// Build a number from a prefix and a sequence, `None` when either is out of shape
    pub fn from_parts(prefix: &str, sequence: u32) -> Option<Self> {
        if !is_valid_prefix(prefix) || sequence > MAX_SEQUENCE {
            return None;
        }
        Some(Self(format!("{}{:08}", prefix, sequence)))
    }

    /// The two-letter track, e.g. `AB`
    pub fn prefix(&self) -> &str {
        &self.0[..PREFIX_LEN]
    }

    /// Numeric part of the number
    pub fn sequence(&self) -> u32 {
        // Digits were checked at construction, eight of them always fit in u32.
        self.0[PREFIX_LEN..].parse().unwrap_or_default()
    }

    /// Number one below in the same track, `None` below zero
    pub fn predecessor(&self) -> Option<Self> {
        let sequence = self.sequence().checked_sub(1)?;
        Self::from_parts(self.prefix(), sequence)
    }

    /// Number one above in the same track, `None` past the 8-digit maximum
    pub fn successor(&self) -> Option<Self> {
        Self::from_parts(self.prefix(), self.sequence() + 1)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_valid_prefix(prefix: &str) -> bool {
    prefix.len() == PREFIX_LEN && prefix.bytes().all(|b| b.is_ascii_uppercase())
}

impl std::fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for InvoiceNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let well_formed = s.len() == PREFIX_LEN + SEQUENCE_LEN
            && s.is_ascii()
            && is_valid_prefix(&s[..PREFIX_LEN])
            && s[PREFIX_LEN..].bytes().all(|b| b.is_ascii_digit());

        if !well_formed {
            return Err(DomainError::validation(format!(
                "Invalid invoice number '{}': expected two uppercase letters followed by eight digits (e.g. AB12345678)",
                s
            )));
        }

        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for InvoiceNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InvoiceNumber> for String {
    fn from(number: InvoiceNumber) -> Self {
        number.0
    }
}

impl AsRef<str> for InvoiceNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

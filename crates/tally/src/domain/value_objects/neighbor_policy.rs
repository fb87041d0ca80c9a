//! NeighborPolicy - How the neighbours of an invoice number are located

use serde::{Deserialize, Serialize};

/// Strategy used when resolving the invoices around a given number
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NeighborPolicy {
    /// Exact lookups of `sequence - 1` and `sequence + 1`
    Adjacent,
    /// Closest existing numbers below and above, tolerating gaps
    #[default]
    Nearest,
}

impl std::fmt::Display for NeighborPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NeighborPolicy::Adjacent => write!(f, "adjacent"),
            NeighborPolicy::Nearest => write!(f, "nearest"),
        }
    }
}

impl std::str::FromStr for NeighborPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "adjacent" => Ok(NeighborPolicy::Adjacent),
            "nearest" => Ok(NeighborPolicy::Nearest),
            _ => Err(format!("Unknown neighbor policy: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Adjacent".parse(), Ok(NeighborPolicy::Adjacent));
        assert_eq!(" nearest ".parse(), Ok(NeighborPolicy::Nearest));
        assert!("sequential".parse::<NeighborPolicy>().is_err());
    }

    #[test]
    fn test_default_tolerates_gaps() {
        assert_eq!(NeighborPolicy::default(), NeighborPolicy::Nearest);
    }
}

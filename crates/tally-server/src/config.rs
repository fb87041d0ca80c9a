//! Server configuration
//!
//! Read from Shuttle secrets at start-up. Every key is optional; invalid
//! values are logged and replaced by the default.

use tally::NeighborPolicy;

/// Runtime settings for the API server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Allowed CORS origins; empty means permissive
    pub cors_allowed_origins: Vec<String>,
    pub neighbor_policy: NeighborPolicy,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cors_allowed_origins: Vec::new(),
            neighbor_policy: NeighborPolicy::default(),
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

impl Config {
    pub fn from_secrets(secrets: &shuttle_runtime::SecretStore) -> Self {
        Self::from_lookup(|key| secrets.get(key))
    }

    /// Build from any key lookup (secrets, environment, test maps)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let neighbor_policy = match lookup("INVOICE_NEIGHBOR_POLICY") {
            Some(value) => value.parse::<NeighborPolicy>().unwrap_or_else(|e| {
                tracing::warn!("⚠️  {} - using {}", e, defaults.neighbor_policy);
                defaults.neighbor_policy
            }),
            None => defaults.neighbor_policy,
        };

        let max_page_size =
            parse_positive(&lookup, "MAX_PAGE_SIZE").unwrap_or(defaults.max_page_size);
        let default_page_size = parse_positive(&lookup, "DEFAULT_PAGE_SIZE")
            .unwrap_or(defaults.default_page_size)
            .min(max_page_size);

        Self {
            cors_allowed_origins,
            neighbor_policy,
            default_page_size,
            max_page_size,
        }
    }

    /// Effective page size for a request
    pub fn page_limit(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size)
    }
}

fn parse_positive<F>(lookup: &F, key: &str) -> Option<u32>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            tracing::warn!("⚠️  Invalid {}={:?} - using default", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(config(&[]), Config::default());
        assert_eq!(Config::default().neighbor_policy, NeighborPolicy::Nearest);
    }

    #[test]
    fn test_reads_all_keys() {
        let c = config(&[
            ("CORS_ALLOWED_ORIGINS", "http://localhost:5173, https://books.example.com"),
            ("INVOICE_NEIGHBOR_POLICY", "adjacent"),
            ("DEFAULT_PAGE_SIZE", "25"),
            ("MAX_PAGE_SIZE", "50"),
        ]);

        assert_eq!(
            c.cors_allowed_origins,
            vec!["http://localhost:5173", "https://books.example.com"]
        );
        assert_eq!(c.neighbor_policy, NeighborPolicy::Adjacent);
        assert_eq!(c.default_page_size, 25);
        assert_eq!(c.max_page_size, 50);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let c = config(&[
            ("INVOICE_NEIGHBOR_POLICY", "closest"),
            ("DEFAULT_PAGE_SIZE", "zero"),
            ("MAX_PAGE_SIZE", "0"),
        ]);
        assert_eq!(c, Config::default());
    }

    #[test]
    fn test_default_page_size_never_exceeds_max() {
        let c = config(&[("DEFAULT_PAGE_SIZE", "500"), ("MAX_PAGE_SIZE", "40")]);
        assert_eq!(c.default_page_size, 40);
    }

    #[test]
    fn test_page_limit_clamps() {
        let c = Config::default();
        assert_eq!(c.page_limit(None), 10);
        assert_eq!(c.page_limit(Some(0)), 1);
        assert_eq!(c.page_limit(Some(1000)), 100);
        assert_eq!(c.page_limit(Some(30)), 30);
    }
}

//! Demo configuration loaded from environment variables.

/// Destination configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `BUCKET` — bus bucket events are published to (default: `"bank"`)
/// - `SUBSET` — subset within the bucket (default: `"account"`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub bucket: String,
    pub subset: String,
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bucket: std::env::var("BUCKET").unwrap_or_else(|_| "bank".to_string()),
            subset: std::env::var("SUBSET").unwrap_or_else(|_| "account".to_string()),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bucket: "bank".to_string(),
            subset: "account".to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.bucket, "bank");
        assert_eq!(config.subset, "account");
        assert_eq!(config.log_level, "info");
    }
}

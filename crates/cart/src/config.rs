//! Cart store configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CART_STORAGE_NAMESPACE` - Prefix of the storage key (default: `@GoMarketplace`)
//! - `CART_WRITE_MAX_ATTEMPTS` - Attempts per snapshot write, at least 1 (default: 3)
//! - `CART_WRITE_RETRY_BACKOFF_MS` - Delay before the first retry, doubled
//!   after each failure (default: 200)

use std::time::Duration;

use thiserror::Error;

/// Default storage key namespace.
pub const DEFAULT_NAMESPACE: &str = "@GoMarketplace";

/// Suffix appended to the namespace to form the cart's storage key.
pub const PRODUCTS_KEY_SUFFIX: &str = "products";

const DEFAULT_WRITE_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_WRITE_RETRY_BACKOFF_MS: u64 = 200;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Storage key namespace, e.g. `@GoMarketplace`
    pub namespace: String,
    /// Retry policy for background snapshot writes
    pub write_retry: RetryPolicy,
}

/// How the background writer retries a failed snapshot write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per snapshot, including the first
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_WRITE_MAX_ATTEMPTS,
            initial_backoff: Duration::from_millis(DEFAULT_WRITE_RETRY_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_backoff.saturating_mul(1 << exponent)
    }
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            write_retry: RetryPolicy::default(),
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let namespace = get_or_default(&lookup, "CART_STORAGE_NAMESPACE", DEFAULT_NAMESPACE);
        if namespace.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "CART_STORAGE_NAMESPACE".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let max_attempts = get_or_default(
            &lookup,
            "CART_WRITE_MAX_ATTEMPTS",
            &DEFAULT_WRITE_MAX_ATTEMPTS.to_string(),
        )
        .parse::<u32>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("CART_WRITE_MAX_ATTEMPTS".to_string(), e.to_string())
        })?;
        if max_attempts == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CART_WRITE_MAX_ATTEMPTS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let backoff_ms = get_or_default(
            &lookup,
            "CART_WRITE_RETRY_BACKOFF_MS",
            &DEFAULT_WRITE_RETRY_BACKOFF_MS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("CART_WRITE_RETRY_BACKOFF_MS".to_string(), e.to_string())
        })?;

        Ok(Self {
            namespace,
            write_retry: RetryPolicy {
                max_attempts,
                initial_backoff: Duration::from_millis(backoff_ms),
            },
        })
    }

    /// Storage key holding the cart, e.g. `@GoMarketplace:products`.
    #[must_use]
    pub fn storage_key(&self) -> String {
        format!("{}:{PRODUCTS_KEY_SUFFIX}", self.namespace)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a variable with a default value.
fn get_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| default.to_string())
}

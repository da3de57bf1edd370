//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional and fall back to the built-in defaults.
//!
//! - `TIDEPOOL_DATA_DIR` - Directory for persisted state (default: `./data`)
//! - `TIDEPOOL_TAX_RATE` - Flat tax rate (default: 0.08)
//! - `TIDEPOOL_FREE_SHIPPING_THRESHOLD` - Subtotal above which shipping is
//!   free (default: 100)
//! - `TIDEPOOL_SHIPPING_FEE` - Flat shipping fee below the threshold
//!   (default: 12.99)
//! - `TIDEPOOL_SIMULATED_LATENCY_MS` - Simulated auth round-trip latency
//!   (default: 1000)
//! - `TIDEPOOL_CHECKOUT_LATENCY_MS` - Simulated order-processing latency
//!   (default: 1500)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

use tidepool_core::Price;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory where persisted cart/session records live.
    pub data_dir: PathBuf,
    /// Pricing knobs for the checkout calculator.
    pub pricing: PricingConfig,
    /// Simulated latency for login/register/update round trips.
    pub simulated_latency: Duration,
    /// Simulated latency for order processing at checkout.
    pub checkout_latency: Duration,
}

/// Pricing configuration for the checkout calculator.
#[derive(Debug, Clone)]
pub struct PricingConfig {
    /// Flat tax rate applied to the subtotal.
    pub tax_rate: Decimal,
    /// Subtotal above which shipping is free.
    pub free_shipping_threshold: Price,
    /// Flat shipping fee charged at or below the threshold.
    pub shipping_fee: Price,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(8, 2),                      // 8%
            free_shipping_threshold: Price::from_cents(10000), // 100.00
            shipping_fee: Price::from_cents(1299),             // 12.99
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            pricing: PricingConfig::default(),
            simulated_latency: Duration::from_millis(1000),
            checkout_latency: Duration::from_millis(1500),
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present. Unset
    /// variables fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a set variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let defaults = Self::default();

        let data_dir = std::env::var("TIDEPOOL_DATA_DIR")
            .map_or(defaults.data_dir, PathBuf::from);

        let pricing = PricingConfig {
            tax_rate: get_parsed_or("TIDEPOOL_TAX_RATE", defaults.pricing.tax_rate)?,
            free_shipping_threshold: get_price_or(
                "TIDEPOOL_FREE_SHIPPING_THRESHOLD",
                defaults.pricing.free_shipping_threshold,
            )?,
            shipping_fee: get_price_or("TIDEPOOL_SHIPPING_FEE", defaults.pricing.shipping_fee)?,
        };

        let simulated_latency = get_millis_or(
            "TIDEPOOL_SIMULATED_LATENCY_MS",
            defaults.simulated_latency,
        )?;
        let checkout_latency =
            get_millis_or("TIDEPOOL_CHECKOUT_LATENCY_MS", defaults.checkout_latency)?;

        Ok(Self {
            data_dir,
            pricing,
            simulated_latency,
            checkout_latency,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an environment variable, falling back to a default when unset.
fn get_parsed_or<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Parse a decimal environment variable into a `Price`.
fn get_price_or(key: &str, default: Price) -> Result<Price, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => {
            let amount = Decimal::from_str(&raw)
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
            Ok(Price::new(amount))
        }
        Err(_) => Ok(default),
    }
}

/// Parse a millisecond environment variable into a `Duration`.
fn get_millis_or(key: &str, default: Duration) -> Result<Duration, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => {
            let millis = raw
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
            Ok(Duration::from_millis(millis))
        }
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pricing_values() {
        let pricing = PricingConfig::default();
        assert_eq!(pricing.tax_rate, Decimal::new(8, 2));
        assert_eq!(pricing.free_shipping_threshold, Price::from_cents(10000));
        assert_eq!(pricing.shipping_fee, Price::from_cents(1299));
    }

    #[test]
    fn test_default_latencies() {
        let config = StoreConfig::default();
        assert_eq!(config.simulated_latency, Duration::from_millis(1000));
        assert_eq!(config.checkout_latency, Duration::from_millis(1500));
    }
}

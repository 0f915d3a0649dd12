//! Application configuration loaded from environment variables.

use std::str::FromStr;

use domain::{Money, PricingPolicy};

/// Server and pricing configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `FLAT_SHIPPING_CENTS`: shipping charged at or below the threshold (default: `999`)
/// - `FREE_SHIPPING_THRESHOLD_CENTS`: subtotals above this ship free (default: `5000`)
/// - `TAX_RATE_BPS`: tax rate in basis points (default: `1000`, i.e. 10%)
///
/// Unparseable numbers fall back to their defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub flat_shipping_cents: i64,
    pub free_shipping_threshold_cents: i64,
    pub tax_rate_bps: u32,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parsed(&lookup, "PORT").unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            flat_shipping_cents: parsed(&lookup, "FLAT_SHIPPING_CENTS")
                .unwrap_or(defaults.flat_shipping_cents),
            free_shipping_threshold_cents: parsed(&lookup, "FREE_SHIPPING_THRESHOLD_CENTS")
                .unwrap_or(defaults.free_shipping_threshold_cents),
            tax_rate_bps: parsed(&lookup, "TAX_RATE_BPS").unwrap_or(defaults.tax_rate_bps),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the cart pricing rules.
    pub fn pricing(&self) -> PricingPolicy {
        PricingPolicy {
            flat_shipping: Money::from_cents(self.flat_shipping_cents),
            free_shipping_threshold: Money::from_cents(self.free_shipping_threshold_cents),
            tax_rate_bps: self.tax_rate_bps,
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|value| value.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        let pricing = PricingPolicy::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            flat_shipping_cents: pricing.flat_shipping.cents(),
            free_shipping_threshold_cents: pricing.free_shipping_threshold.cents(),
            tax_rate_bps: pricing.tax_rate_bps,
        }
    }
}

//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::AppError;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Pricing policy.
    #[serde(default)]
    pub pricing: PricingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait for a pooled connection.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    8
}

/// JWT settings as read from configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for verifying tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    86400 // 24 hours
}

/// Pricing and reporting rates.
///
/// Both rates are fractions in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PricingConfig {
    /// Discount applied to an order's total when its exclusive flag is set.
    #[serde(default = "default_exclusive_discount_rate")]
    pub exclusive_discount_rate: Decimal,
    /// Commission share reported by order statistics.
    #[serde(default = "default_commission_rate")]
    pub commission_rate: Decimal,
}

fn default_exclusive_discount_rate() -> Decimal {
    Decimal::new(10, 2)
}

fn default_commission_rate() -> Decimal {
    Decimal::new(10, 2)
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            exclusive_discount_rate: default_exclusive_discount_rate(),
            commission_rate: default_commission_rate(),
        }
    }
}

impl PricingConfig {
    /// Checks that both rates are fractions in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` naming the offending rate.
    pub fn validate(&self) -> Result<(), AppError> {
        for (name, rate) in [
            ("exclusive_discount_rate", self.exclusive_discount_rate),
            ("commission_rate", self.commission_rate),
        ] {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(AppError::Config(format!(
                    "pricing.{name} must be between 0 and 1, got {rate}"
                )));
            }
        }
        Ok(())
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources are layered `config/default`, `config/{RUN_MODE}`, then
    /// `PLAYDESK__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or the pricing
    /// rates are out of range.
    pub fn load() -> Result<Self, AppError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("PLAYDESK").separator("__"))
            .build()?;

        let app: Self = config.try_deserialize()?;
        app.pricing.validate()?;
        Ok(app)
    }
}

//! Configuration types for the payroll service.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML configuration file. Every section and
//! field is optional; anything left out takes its default.

use serde::Deserialize;
use std::path::PathBuf;

use crate::calculation::{DEFAULT_CURRENCY_SCALE, DEFAULT_HOURS_PER_DAY};

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the API listens on (e.g., "127.0.0.1:8080").
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Pay computation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PayrollSettings {
    /// Working hours per day, used to derive the hourly overtime rate.
    pub hours_per_day: u32,
    /// Decimal places of the currency's minor unit.
    pub currency_scale: u32,
}

impl Default for PayrollSettings {
    fn default() -> Self {
        Self {
            hours_per_day: DEFAULT_HOURS_PER_DAY,
            currency_scale: DEFAULT_CURRENCY_SCALE,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive (e.g., "info", "payroll_engine=debug").
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// The complete service configuration.
///
/// # Example
///
/// ```
/// use payroll_engine::config::PayrollConfig;
///
/// let config = PayrollConfig::default();
/// assert_eq!(config.payroll.hours_per_day, 8);
/// assert_eq!(config.payroll.currency_scale, 2);
/// assert_eq!(config.server.bind_address, "127.0.0.1:8080");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct PayrollConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Pay computation settings.
    pub payroll: PayrollSettings,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Optional YAML file of records to load into the in-memory store.
    pub seed_file: Option<PathBuf>,
}

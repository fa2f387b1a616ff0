//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the service
//! configuration and seed data from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{PayrollError, PayrollResult};
use crate::store::SeedData;

use super::types::PayrollConfig;

/// Largest accepted currency scale; rust_decimal holds at most 28 fractional digits.
const MAX_CURRENCY_SCALE: u32 = 28;

/// Loads and provides access to the service configuration.
///
/// # File Format
///
/// ```text
/// server:
///   bind_address: "0.0.0.0:8080"
/// payroll:
///   hours_per_day: 8
///   currency_scale: 2
/// logging:
///   level: info
/// seed_file: ./config/seed.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/payroll.yaml").unwrap();
/// println!("Listening on {}", loader.config().server.bind_address);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified YAML file.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - The file is missing (`ConfigNotFound`)
    /// - The file contains invalid YAML or out-of-range values (`ConfigParseError`)
    pub fn load<P: AsRef<Path>>(path: P) -> PayrollResult<Self> {
        let path = path.as_ref();
        let config = Self::load_yaml::<PayrollConfig>(path)?;
        Self::validate(&config, path)?;
        Ok(Self { config })
    }

    /// Wraps an already built configuration.
    pub fn from_config(config: PayrollConfig) -> Self {
        Self { config }
    }

    /// Loads seed records for the in-memory store.
    pub fn load_seed<P: AsRef<Path>>(path: P) -> PayrollResult<SeedData> {
        Self::load_yaml::<SeedData>(path.as_ref())
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> PayrollResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| PayrollError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| PayrollError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn validate(config: &PayrollConfig, path: &Path) -> PayrollResult<()> {
        let invalid = |message: &str| PayrollError::ConfigParseError {
            path: path.display().to_string(),
            message: message.to_string(),
        };

        if config.payroll.hours_per_day == 0 {
            return Err(invalid("payroll.hours_per_day must be greater than zero"));
        }
        if config.payroll.currency_scale > MAX_CURRENCY_SCALE {
            return Err(invalid("payroll.currency_scale must be at most 28"));
        }
        Ok(())
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }
}

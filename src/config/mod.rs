//! Configuration loading and management for the payroll service.
//!
//! This module loads the service configuration (server address, pay
//! computation settings, logging) and optional seed data from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/payroll.yaml").unwrap();
//! println!("Hours per day: {}", config.config().payroll.hours_per_day);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{LoggingConfig, PayrollConfig, PayrollSettings, ServerConfig};

//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer on top of the Betax
//! HTTP client, and provides configuration loading and logging setup.

pub mod adapters;
pub mod config;
pub mod logging;

pub use adapters::*;
pub use config::{AppConfig, DriverConfig, HistoryConfig, LogFormat, LoggingConfig, MapConfig};
pub use logging::{LoggingError, init_logging};

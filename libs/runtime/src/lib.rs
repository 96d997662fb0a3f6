//! Shared runtime plumbing for the roommate profile tools: layered
//! configuration, home directory resolution and logging setup.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{default_logging_config, AppConfig, AppSection, CliArgs, LoggingConfig, Section};

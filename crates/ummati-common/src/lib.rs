//! Common types for Ummati infrastructure: errors, configuration and settings

#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod settings;
pub mod tags;
pub mod telemetry;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

//! # Pagevault Config
//!
//! Connection parameter resolution for the Pagevault store backend.
//!
//! This crate provides:
//! - [`ConnectionParams`]: the immutable five-field connection record
//! - Resolution order: compiled-in defaults → persisted config file →
//!   environment overrides (an override always wins, per field)
//! - The persisted configuration file (plain JSON, read with a real
//!   parser) under the host content directory
//!
//! # Example
//!
//! ```ignore
//! use pagevault_config::ConnectionParams;
//!
//! // Defaults merged with the persisted file and any PAGEVAULT_* overrides
//! let params = ConnectionParams::resolve(Some(config_path.as_ref()));
//! ```

pub mod file;
pub mod params;

pub use file::{ConfigError, default_path, load, save};
pub use params::ConnectionParams;

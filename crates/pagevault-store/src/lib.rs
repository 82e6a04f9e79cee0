//! # Pagevault Store
//!
//! Redis-backed storage for rendered pages, replacing the host cache
//! engine's filesystem backend.
//!
//! This crate provides:
//! - [`Store`]: the per-process client (existence check, timed get,
//!   value-plus-timestamp set, prefix flush)
//! - Two interchangeable driver engines behind one interface: the
//!   `redis` crate and a pure RESP socket-protocol implementation
//! - The server-side scan-and-delete invalidation script
//! - Key namespacing for multi-install isolation
//!
//! # Example
//!
//! ```ignore
//! use pagevault_store::{Store, StoreOptions};
//!
//! let mut store = Store::new(StoreOptions::from_env("wp_"));
//! if store.init().await {
//!     store.add("page:/home", b"<html>...</html>").await;
//!     let cached = store.get("page:/home").await?;
//! }
//! ```

pub mod client;
pub mod config;
pub mod driver;
pub mod error;
pub mod keys;
pub mod script;

pub use client::Store;
pub use config::StoreOptions;
pub use driver::{Driver, DriverKind};
pub use error::{StoreError, StoreResult};

//! # Pagevault
//!
//! Redis-backed storage backend for a page-cache accelerator: rendered
//! pages are stored as key/value entries instead of files, and the host
//! cache engine's generated bootstrap is patched so early-stage page
//! serving reads from the store.
//!
//! This umbrella crate re-exports the member crates:
//!
//! - [`config`]: connection parameter resolution and the persisted
//!   configuration file
//! - [`store`]: the store client, the two driver engines and the
//!   server-side prefix invalidation script
//! - [`bootstrap`]: the bootstrap integration contract
//!
//! # Example
//!
//! ```ignore
//! use pagevault::{Store, StoreOptions};
//!
//! let mut store = Store::new(StoreOptions::from_env("wp_"));
//! if store.init().await {
//!     store.add("page:/home", b"<html>...</html>").await;
//! } else {
//!     // Fall back to the filesystem backend; the failure is surfaced
//!     // through store.pending_notice().
//! }
//! ```

pub use pagevault_bootstrap as bootstrap;
pub use pagevault_config as config;
pub use pagevault_store as store;

pub use pagevault_config::ConnectionParams;
pub use pagevault_store::{DriverKind, Store, StoreError, StoreOptions};

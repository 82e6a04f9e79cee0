//! Store client configuration.
//!
//! Settings the connection record does not carry: key namespacing, entry
//! expiry, timeouts and the driver selection. Driver choice happens once
//! at startup, by configuration, and is held for the process lifetime.

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

use crate::driver::DriverKind;

/// Environment override for the namespacing salt.
pub const ENV_SALT: &str = "PAGEVAULT_SALT";
/// Environment override for the driver selection (`native` or `resp`).
pub const ENV_DRIVER: &str = "PAGEVAULT_DRIVER";

/// Configuration for a [`Store`](crate::Store) instance.
#[derive(Clone, Debug)]
pub struct StoreOptions {
    /// Override path of the persisted connection config; `None` resolves
    /// from defaults and environment overrides only.
    pub config_path: Option<PathBuf>,

    /// Multi-tenant/install prefix applied to every key.
    pub tenant_prefix: String,

    /// Optional deployment salt prepended before the tenant prefix, for
    /// isolation across environments sharing one store.
    pub salt: Option<String>,

    /// Entry expiry. Zero writes unexpiring entries.
    pub expiry: Duration,

    /// Bound on connection establishment.
    pub connect_timeout: Duration,

    /// Bound on a single store round trip.
    pub op_timeout: Duration,

    /// Driver engine, selected once at startup.
    pub driver: DriverKind,
}

impl StoreOptions {
    /// Creates options with compiled-in defaults for the given tenant
    /// prefix.
    pub fn new(tenant_prefix: impl Into<String>) -> Self {
        Self {
            config_path: None,
            tenant_prefix: tenant_prefix.into(),
            salt: None,
            expiry: Duration::ZERO,
            connect_timeout: Duration::from_secs(5),
            op_timeout: Duration::from_secs(5),
            driver: DriverKind::Native,
        }
    }

    /// Like [`StoreOptions::new`], with the salt and driver selection
    /// read from `PAGEVAULT_SALT` and `PAGEVAULT_DRIVER`.
    pub fn from_env(tenant_prefix: impl Into<String>) -> Self {
        let mut options = Self::new(tenant_prefix);
        options.salt = env::var(ENV_SALT).ok().filter(|v| !v.is_empty());
        if let Ok(v) = env::var(ENV_DRIVER)
            && !v.is_empty()
        {
            match v.parse() {
                Ok(kind) => options.driver = kind,
                Err(_) => warn!(name = ENV_DRIVER, value = %v, "ignoring unknown driver override"),
            }
        }
        options
    }
}

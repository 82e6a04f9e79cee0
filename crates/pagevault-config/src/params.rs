//! Connection parameter resolution.
//!
//! A [`ConnectionParams`] record is built fresh on every store
//! initialization attempt by merging, in order: compiled-in defaults,
//! the persisted configuration file, and environment overrides. Each
//! override replaces its field unconditionally and independently of the
//! other four.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::warn;

/// Environment override for the connection scheme.
pub const ENV_SCHEME: &str = "PAGEVAULT_SCHEME";
/// Environment override for the host (or unix socket path).
pub const ENV_HOST: &str = "PAGEVAULT_HOST";
/// Environment override for the TCP port.
pub const ENV_PORT: &str = "PAGEVAULT_PORT";
/// Environment override for the database index.
pub const ENV_DB: &str = "PAGEVAULT_DB";
/// Environment override for the password.
pub const ENV_PWD: &str = "PAGEVAULT_PWD";

/// Scheme value selecting a unix domain socket transport.
pub const UNIX_SCHEME: &str = "unix";

/// Immutable connection record for the store.
///
/// Serialized as the persisted configuration file; missing fields fall
/// back to the compiled-in defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParams {
    /// `"unix"` or a network scheme. `None` selects plain TCP.
    #[serde(default)]
    pub scheme: Option<String>,

    /// Hostname, or the socket path when the scheme is `"unix"`.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port; ignored for unix sockets.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database index selected after connecting.
    #[serde(default)]
    pub db: i64,

    /// Optional password.
    #[serde(default)]
    pub pwd: Option<String>,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    6379
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            scheme: None,
            host: default_host(),
            port: default_port(),
            db: 0,
            pwd: None,
        }
    }
}

impl ConnectionParams {
    /// Resolves the effective connection parameters.
    ///
    /// Total function: an absent, unreadable or malformed config file
    /// falls back to defaults, and a missing override leaves the
    /// underlying value in place. With `config_path` of `None` only
    /// defaults and overrides apply.
    pub fn resolve(config_path: Option<&Path>) -> Self {
        let mut params = config_path
            .and_then(crate::file::load)
            .unwrap_or_default();
        params.apply_env_overrides();
        params
    }

    /// Whether the configured transport is a unix domain socket.
    pub fn is_unix(&self) -> bool {
        self.scheme.as_deref() == Some(UNIX_SCHEME)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(v) = env_override(ENV_SCHEME) {
            self.scheme = Some(v);
        }
        if let Some(v) = env_override(ENV_HOST) {
            self.host = v;
        }
        if let Some(v) = env_override(ENV_PORT) {
            match v.parse() {
                Ok(port) => self.port = port,
                Err(_) => warn!(name = ENV_PORT, value = %v, "ignoring unparsable override"),
            }
        }
        if let Some(v) = env_override(ENV_DB) {
            match v.parse() {
                Ok(db) => self.db = db,
                Err(_) => warn!(name = ENV_DB, value = %v, "ignoring unparsable override"),
            }
        }
        if let Some(v) = env_override(ENV_PWD) {
            self.pwd = Some(v);
        }
    }
}

/// Reads an override identifier; an empty value counts as unset.
fn env_override(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};

    // Env vars are process globals; tests touching them take this lock.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ALL_OVERRIDES: [&str; 5] = [ENV_SCHEME, ENV_HOST, ENV_PORT, ENV_DB, ENV_PWD];

    fn env_guard() -> MutexGuard<'static, ()> {
        let guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for name in ALL_OVERRIDES {
            unsafe { env::remove_var(name) };
        }
        guard
    }

    fn set(name: &str, value: &str) {
        unsafe { env::set_var(name, value) };
    }

    #[test]
    fn defaults_without_file_or_overrides() {
        let _guard = env_guard();
        let params = ConnectionParams::resolve(None);
        assert_eq!(params, ConnectionParams::default());
        assert_eq!(params.host, "localhost");
        assert_eq!(params.port, 6379);
        assert_eq!(params.db, 0);
        assert!(params.scheme.is_none());
        assert!(params.pwd.is_none());
    }

    #[test]
    fn override_wins_over_persisted_value() {
        let _guard = env_guard();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let persisted = ConnectionParams {
            host: "db.internal".to_string(),
            port: 6380,
            ..Default::default()
        };
        crate::file::save(&path, &persisted).unwrap();

        set(ENV_HOST, "override.internal");
        let params = ConnectionParams::resolve(Some(&path));
        assert_eq!(params.host, "override.internal");
        // The other four fields resolve independently of the host override.
        assert_eq!(params.port, 6380);
        assert_eq!(params.db, 0);
        assert!(params.scheme.is_none());
        assert!(params.pwd.is_none());
    }

    #[test]
    fn each_override_applies_independently() {
        let _guard = env_guard();
        set(ENV_SCHEME, "unix");
        set(ENV_HOST, "/run/redis.sock");
        set(ENV_PORT, "7000");
        set(ENV_DB, "3");
        set(ENV_PWD, "secret");
        let params = ConnectionParams::resolve(None);
        assert_eq!(params.scheme.as_deref(), Some("unix"));
        assert_eq!(params.host, "/run/redis.sock");
        assert_eq!(params.port, 7000);
        assert_eq!(params.db, 3);
        assert_eq!(params.pwd.as_deref(), Some("secret"));
        assert!(params.is_unix());
    }

    #[test]
    fn empty_override_counts_as_unset() {
        let _guard = env_guard();
        set(ENV_HOST, "");
        set(ENV_PWD, "");
        let params = ConnectionParams::resolve(None);
        assert_eq!(params.host, "localhost");
        assert!(params.pwd.is_none());
    }

    #[test]
    fn unparsable_numeric_override_keeps_underlying_value() {
        let _guard = env_guard();
        set(ENV_PORT, "not-a-port");
        set(ENV_DB, "4");
        let params = ConnectionParams::resolve(None);
        assert_eq!(params.port, 6379);
        assert_eq!(params.db, 4);
    }
}

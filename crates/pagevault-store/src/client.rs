//! The store client.
//!
//! One lazily-established connection per process, namespaced key
//! addressing, and the prefix invalidation entry point. The client is an
//! explicit per-process context object; the host constructs one and
//! threads it to every consumer.

use pagevault_config::ConnectionParams;
use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use crate::config::StoreOptions;
use crate::driver::{self, Driver};
use crate::error::{StoreError, StoreResult};
use crate::keys::{modified_key, namespaced};
use crate::script::flush_script;

/// Per-process store client.
///
/// Invariant: the driver is `Some` iff `connected` is true. Connection
/// failures never escape [`Store::init`]; they become the pending notice
/// and the host falls back to its filesystem backend. Failures of
/// operations issued after a successful connection propagate to the
/// caller.
pub struct Store {
    options: StoreOptions,
    driver: Option<Box<dyn Driver>>,
    connected: bool,
    // Collapses repeated invalidation triggers within one request
    // lifecycle to a single round trip.
    cleared: bool,
    notice: Option<String>,
}

impl Store {
    pub fn new(options: StoreOptions) -> Self {
        Self {
            options,
            driver: None,
            connected: false,
            cleared: false,
            notice: None,
        }
    }

    /// Establishes the connection if none exists yet.
    ///
    /// Returns `true` when connected, already or newly. Idempotent while
    /// connected; after a failed attempt the next call retries. The
    /// connection record is resolved fresh on every attempt.
    pub async fn init(&mut self) -> bool {
        if self.connected {
            return true;
        }
        let params = ConnectionParams::resolve(self.options.config_path.as_deref());
        let attempt = timeout(
            self.options.connect_timeout,
            driver::connect(self.options.driver, &params),
        );
        match attempt.await {
            Ok(Ok(driver)) => {
                self.driver = Some(driver);
                self.connected = true;
                self.notice = None;
                debug!(driver = ?self.options.driver, "store connected");
                true
            }
            Ok(Err(e)) => {
                self.record_failure(format!("connection failed: {e}"));
                false
            }
            Err(_) => {
                self.record_failure(format!(
                    "connection timed out after {:?}",
                    self.options.connect_timeout
                ));
                false
            }
        }
    }

    /// Current connected flag.
    pub fn is_active(&self) -> bool {
        self.connected
    }

    /// Last connection failure, awaiting acknowledgement. Overwritten by
    /// the next failure, never accumulated.
    pub fn pending_notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Clears the pending notice once it has been surfaced.
    pub fn acknowledge_notice(&mut self) {
        self.notice = None;
    }

    #[instrument(skip(self), fields(store.operation = "EXISTS"))]
    pub async fn exists(&mut self, key: &str) -> StoreResult<bool> {
        let key = self.key(key);
        let op_timeout = self.options.op_timeout;
        let driver = self.driver.as_mut().ok_or(StoreError::NotConnected)?;
        Self::bounded(op_timeout, driver.exists(&key)).await
    }

    #[instrument(skip(self), fields(store.operation = "GET"))]
    pub async fn get(&mut self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let key = self.key(key);
        let op_timeout = self.options.op_timeout;
        let driver = self.driver.as_mut().ok_or(StoreError::NotConnected)?;
        Self::bounded(op_timeout, driver.get(&key)).await
    }

    /// Modification timestamp of `key`, in the shape [`Store::get`]
    /// returns it: the raw value of the `-modified` sibling, a decimal
    /// Unix-timestamp string.
    #[instrument(skip(self), fields(store.operation = "MTIME"))]
    pub async fn mtime(&mut self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.get(&modified_key(key)).await
    }

    /// Writes `key` and its `-modified` sibling (current Unix time), each
    /// with the configured expiry.
    ///
    /// The two writes are independent and not atomic as a pair; a
    /// value-written/timestamp-not-written outcome is a valid post-state
    /// callers must tolerate.
    #[instrument(skip(self, value), fields(store.operation = "ADD"))]
    pub async fn add(
        &mut self,
        key: &str,
        value: &[u8],
    ) -> (StoreResult<()>, StoreResult<()>) {
        let stamp = unix_now().to_string();
        let value_outcome = self.set(key, value).await;
        let stamp_outcome = self.set(&modified_key(key), stamp.as_bytes()).await;
        (value_outcome, stamp_outcome)
    }

    /// Deletes every key under `prefix` (empty for the entire namespace)
    /// via the server-side scan-and-delete script. Returns the deleted
    /// count.
    ///
    /// Per-process guard: after the first successful call, later calls
    /// return 0 without a round trip. A failed call leaves the guard
    /// unset so the next trigger retries.
    #[instrument(skip(self), fields(store.operation = "CLEAR"))]
    pub async fn clear(&mut self, prefix: &str) -> StoreResult<u64> {
        if self.cleared {
            debug!("clear already ran in this process");
            return Ok(0);
        }
        let script = flush_script(&self.key(prefix));
        let op_timeout = self.options.op_timeout;
        let driver = self.driver.as_mut().ok_or(StoreError::NotConnected)?;
        let deleted = Self::bounded(op_timeout, driver.run_script(&script)).await?;
        self.cleared = true;
        debug!(store.deleted = deleted, "prefix flushed");
        Ok(deleted.max(0) as u64)
    }

    async fn set(&mut self, key: &str, value: &[u8]) -> StoreResult<()> {
        let key = self.key(key);
        let expiry = self.options.expiry;
        let op_timeout = self.options.op_timeout;
        let driver = self.driver.as_mut().ok_or(StoreError::NotConnected)?;
        Self::bounded(op_timeout, driver.set_with_expiry(&key, value, expiry)).await
    }

    fn key(&self, logical: &str) -> String {
        namespaced(
            self.options.salt.as_deref(),
            &self.options.tenant_prefix,
            logical,
        )
    }

    fn record_failure(&mut self, msg: String) {
        warn!(notice = %msg, "store connection failed");
        self.notice = Some(msg);
    }

    async fn bounded<T>(
        op_timeout: Duration,
        fut: impl Future<Output = StoreResult<T>>,
    ) -> StoreResult<T> {
        match timeout(op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(op_timeout)),
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

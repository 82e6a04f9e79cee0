//! Client engine backed by the `redis` crate.

use async_trait::async_trait;
use pagevault_config::ConnectionParams;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use std::time::Duration;
use tracing::debug;

use super::Driver;
use crate::error::StoreResult;

/// Driver speaking through the `redis` crate.
///
/// One multiplexed connection, established once and never refreshed.
/// Auth and database selection run as explicit commands after the
/// transport connects, so a reconnecting manager could not silently
/// drop that state.
pub struct NativeDriver {
    conn: MultiplexedConnection,
}

impl NativeDriver {
    /// Connects and completes the handshake: transport first, then an
    /// explicit `AUTH` when a password is configured, then `SELECT`.
    pub async fn connect(params: &ConnectionParams) -> StoreResult<Self> {
        let addr = if params.is_unix() {
            ConnectionAddr::Unix(params.host.clone().into())
        } else {
            ConnectionAddr::Tcp(params.host.clone(), params.port)
        };
        let info = ConnectionInfo {
            addr,
            redis: RedisConnectionInfo::default(),
        };
        let client = Client::open(info)?;
        let conn = client.get_multiplexed_async_connection().await?;

        let mut driver = Self { conn };
        if let Some(pwd) = params.pwd.as_deref() {
            driver.authenticate(pwd).await?;
        }
        driver.select_db(params.db).await?;
        debug!(host = %params.host, unix = params.is_unix(), "native driver connected");
        Ok(driver)
    }
}

#[async_trait]
impl Driver for NativeDriver {
    async fn authenticate(&mut self, pwd: &str) -> StoreResult<()> {
        redis::cmd("AUTH")
            .arg(pwd)
            .query_async::<()>(&mut self.conn)
            .await?;
        Ok(())
    }

    async fn select_db(&mut self, db: i64) -> StoreResult<()> {
        redis::cmd("SELECT")
            .arg(db)
            .query_async::<()>(&mut self.conn)
            .await?;
        Ok(())
    }

    async fn get(&mut self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let value: Option<Vec<u8>> = self.conn.get(key).await?;
        Ok(value)
    }

    async fn set_with_expiry(
        &mut self,
        key: &str,
        value: &[u8],
        expiry: Duration,
    ) -> StoreResult<()> {
        if expiry.is_zero() {
            self.conn.set::<_, _, ()>(key, value).await?;
        } else {
            self.conn
                .set_ex::<_, _, ()>(key, value, expiry.as_secs())
                .await?;
        }
        Ok(())
    }

    async fn exists(&mut self, key: &str) -> StoreResult<bool> {
        let exists: bool = self.conn.exists(key).await?;
        Ok(exists)
    }

    async fn run_script(&mut self, body: &str) -> StoreResult<i64> {
        // redis::Script handles EVALSHA/EVAL itself; this engine takes
        // the script body alone.
        let result: i64 = redis::Script::new(body)
            .invoke_async(&mut self.conn)
            .await?;
        Ok(result)
    }
}

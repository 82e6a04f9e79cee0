//! Driver abstraction over the two client engines.
//!
//! The engines differ in timed-set call signature, credential handling
//! (the native engine issues an explicit `AUTH` step, the socket-protocol
//! engine threads the password through its connection options) and script
//! invocation convention (the socket-protocol engine sends an explicit
//! zero key count). None of that may leak to callers; the [`Driver`]
//! trait is the whole surface.

mod native;
mod resp;

pub use native::NativeDriver;
pub use resp::RespDriver;

use async_trait::async_trait;
use pagevault_config::ConnectionParams;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{StoreError, StoreResult};

/// Driver engine selector, chosen once at startup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DriverKind {
    /// The `redis` crate client.
    #[default]
    Native,
    /// Pure RESP socket-protocol client.
    Resp,
}

impl FromStr for DriverKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "native" => Ok(Self::Native),
            "resp" | "socket" => Ok(Self::Resp),
            other => Err(StoreError::UnknownDriver(other.to_string())),
        }
    }
}

/// Capability interface shared by both client engines.
#[async_trait]
pub trait Driver: Send {
    async fn authenticate(&mut self, pwd: &str) -> StoreResult<()>;

    async fn select_db(&mut self, db: i64) -> StoreResult<()>;

    async fn get(&mut self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Writes `value` under `key`. A zero `expiry` writes an unexpiring
    /// entry.
    async fn set_with_expiry(
        &mut self,
        key: &str,
        value: &[u8],
        expiry: Duration,
    ) -> StoreResult<()>;

    async fn exists(&mut self, key: &str) -> StoreResult<bool>;

    /// Evaluates a server-side script that takes no key arguments and
    /// returns an integer.
    async fn run_script(&mut self, body: &str) -> StoreResult<i64>;
}

/// Connects the selected engine and completes its handshake
/// (authentication plus database selection).
pub async fn connect(
    kind: DriverKind,
    params: &ConnectionParams,
) -> StoreResult<Box<dyn Driver>> {
    match kind {
        DriverKind::Native => Ok(Box::new(NativeDriver::connect(params).await?)),
        DriverKind::Resp => Ok(Box::new(RespDriver::connect(params).await?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_kind_parses_known_names() {
        assert_eq!("native".parse::<DriverKind>().unwrap(), DriverKind::Native);
        assert_eq!("resp".parse::<DriverKind>().unwrap(), DriverKind::Resp);
        assert_eq!("socket".parse::<DriverKind>().unwrap(), DriverKind::Resp);
        assert!(matches!(
            "pecl".parse::<DriverKind>(),
            Err(StoreError::UnknownDriver(_))
        ));
    }
}

//! Error types for store operations.
//!
//! Connection-time failures are caught at the `init` boundary and become
//! the pending notice; everything here covers the per-operation tier,
//! which propagates to the caller once a connection exists.

use std::io;
use std::time::Duration;

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Operation issued before a successful `init`.
    #[error("store is not connected")]
    NotConnected,

    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    /// Error surfaced by the native driver.
    #[error("driver error: {0}")]
    Driver(#[from] redis::RedisError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed or unexpected wire data on the socket-protocol driver.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Error reply from the server (`-ERR ...`).
    #[error("server error: {0}")]
    Server(String),

    #[error("unknown driver `{0}`")]
    UnknownDriver(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
#[error("Failed to connect to {endpoint}: {source}")]
pub struct ConnectError {
    pub endpoint: String,
    #[source]
    pub source: io::Error,
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Connection closed by the daemon")]
    Closed,
    #[error("Malformed status line {0:?}")]
    MalformedLine(String),
    #[error("Invalid number {value:?} for {key:?}")]
    InvalidNumber { key: String, value: String },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("D-Bus call failed: {0}")]
    Bus(#[from] zbus::Error),
}

/// Everything that ends a watch cycle and forces a reconnect.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

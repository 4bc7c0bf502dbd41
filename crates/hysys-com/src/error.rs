//! Error types for the HYSYS COM bridge client.

use std::time::Duration;

use thiserror::Error;

/// Errors from the HYSYS COM bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Failed to spawn WINE bridge process: {0}")]
    SpawnFailed(#[from] std::io::Error),

    #[error("WINE not found. Install WINE and ensure 'wine' is in PATH.")]
    WineNotFound,

    #[error("Bridge executable not found at: {0}")]
    BridgeExeNotFound(String),

    #[error("Bridge process not running")]
    NotRunning,

    #[error("Failed to send command to bridge: {0}")]
    SendFailed(String),

    #[error("Failed to read response from bridge: {0}")]
    ReadFailed(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A remote failure, surfaced with whatever diagnostic text the COM
    /// automation layer produced. Never translated or retried.
    #[error("Bridge returned error: {0}")]
    Bridge(String),

    #[error("Unexpected response data")]
    UnexpectedResponse,

    /// The open/attach selector was neither 0 nor 1.
    #[error("Argument for case flag is not valid: {0} (expected 0 to open, 1 to attach)")]
    InvalidCaseFlag(i32),

    #[error("Solver still running after {waited:?}")]
    SolverTimeout { waited: Duration },
}

pub type Result<T> = std::result::Result<T, BridgeError>;

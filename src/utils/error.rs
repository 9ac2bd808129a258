//! Error types for driver-load-bench
//!
//! Two classes of failure exist:
//! - `LoadError`: fatal conditions (unreachable backend, index setup, bad
//!   configuration, a workload thread that failed to report). These abort
//!   the run.
//! - `OperationError`: a single backend call failed inside a worker loop.
//!   These are counted and logged, never propagated out of the worker.

use std::io;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Backend setup failed: {0}")]
    Setup(#[from] OperationError),

    #[error("Worker error: {0}")]
    Worker(String),
}

/// Connection-related errors
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("Failed to connect to {host}:{port}: {source}")]
    ConnectFailed {
        host: String,
        port: u16,
        source: io::Error,
    },

    #[error("Invalid backend address '{0}' (expected host:port)")]
    InvalidAddress(String),

    #[error("{addr} did not answer PING: {reason}")]
    Unreachable { addr: String, reason: String },

    #[error("Connection balancer needs at least one connection")]
    EmptyPool,
}

/// Failure of a single backend call
#[derive(Error, Debug)]
pub enum OperationError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Unexpected response to {command}: {actual}")]
    UnexpectedResponse { command: String, actual: String },
}

pub type Result<T> = std::result::Result<T, LoadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_error_into_load_error() {
        let err: LoadError = OperationError::Server("ERR unknown command".to_string()).into();
        assert!(matches!(err, LoadError::Setup(_)));
        assert_eq!(
            err.to_string(),
            "Backend setup failed: Server error: ERR unknown command"
        );
    }

    #[test]
    fn test_unreachable_message() {
        let err = ConnectionError::Unreachable {
            addr: "10.0.0.5:6380".to_string(),
            reason: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "10.0.0.5:6380 did not answer PING: connection refused"
        );
    }
}

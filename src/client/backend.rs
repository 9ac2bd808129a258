//! Backend trait for command execution
//!
//! `Backend` is the seam between the load engine and the wire. Connection
//! pools implement it for real servers; tests implement it with canned
//! replies. It takes `&self` so a single backend can be shared by every
//! worker thread of a run.

use crate::utils::{OperationError, RespValue};

/// Command execution against one backend node
pub trait Backend: Send + Sync {
    /// Execute a command with string arguments and return the raw reply.
    ///
    /// Server error replies are returned as `RespValue::Error`, not as `Err`;
    /// `Err` means the command never produced a reply.
    fn execute(&self, args: &[&str]) -> Result<RespValue, OperationError>;

    /// Human-readable identity used in logs
    fn describe(&self) -> String;
}

/// Common commands built on top of `Backend`
pub trait BackendExt: Backend {
    /// Execute and turn server error replies into `OperationError::Server`
    fn call(&self, args: &[&str]) -> Result<RespValue, OperationError> {
        match self.execute(args)? {
            RespValue::Error(e) => Err(OperationError::Server(e)),
            other => Ok(other),
        }
    }

    /// Send PING and verify PONG response
    fn ping(&self) -> Result<(), OperationError> {
        match self.call(&["PING"])? {
            RespValue::SimpleString(s) if s == "PONG" => Ok(()),
            other => Err(unexpected("PING", &other)),
        }
    }

    /// Send FLUSHDB command
    fn flushdb(&self) -> Result<(), OperationError> {
        self.call(&["FLUSHDB"]).map(|_| ())
    }

    /// Send DBSIZE command
    fn dbsize(&self) -> Result<i64, OperationError> {
        let reply = self.call(&["DBSIZE"])?;
        reply.as_i64().ok_or_else(|| unexpected("DBSIZE", &reply))
    }
}

impl<T: Backend + ?Sized> BackendExt for T {}

/// Build an `UnexpectedResponse` error for `command`
pub fn unexpected(command: &str, actual: &RespValue) -> OperationError {
    OperationError::UnexpectedResponse {
        command: command.to_string(),
        actual: format!("{:?}", actual),
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedBackend;
    use super::*;

    #[test]
    fn test_ping() {
        let backend = ScriptedBackend::constant("b", RespValue::SimpleString("PONG".into()));
        assert!(backend.ping().is_ok());
    }

    #[test]
    fn test_ping_rejects_other_reply() {
        let backend = ScriptedBackend::constant("b", RespValue::Integer(1));
        assert!(matches!(
            backend.ping(),
            Err(OperationError::UnexpectedResponse { .. })
        ));
    }

    #[test]
    fn test_call_maps_server_error() {
        let backend = ScriptedBackend::constant("b", RespValue::Error("LOADING".into()));
        match backend.flushdb() {
            Err(OperationError::Server(msg)) => assert_eq!(msg, "LOADING"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_dbsize() {
        let backend = ScriptedBackend::constant("b", RespValue::Integer(12345));
        assert_eq!(backend.dbsize().unwrap(), 12345);
        assert_eq!(backend.commands(), vec!["DBSIZE".to_string()]);
    }
}

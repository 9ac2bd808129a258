//! Per-node connection pool
//!
//! Every worker thread needs its own socket for the duration of a command.
//! The pool hands out idle connections and opens new ones on demand; the
//! idle list lock is only held to pop or push, never across a round trip.

use parking_lot::Mutex;
use tracing::debug;

use super::backend::Backend;
use super::raw_connection::{ConnectionFactory, RawConnection};
use crate::config::ServerAddress;
use crate::utils::{OperationError, RespValue};

/// Lazily-filled pool of connections to one backend node
pub struct ConnectionPool {
    addr: ServerAddress,
    factory: ConnectionFactory,
    idle: Mutex<Vec<RawConnection>>,
    max_idle: usize,
}

impl ConnectionPool {
    pub fn new(addr: ServerAddress, factory: ConnectionFactory, max_idle: usize) -> Self {
        Self {
            addr,
            factory,
            idle: Mutex::new(Vec::with_capacity(max_idle)),
            max_idle,
        }
    }

    /// Number of connections currently parked in the pool
    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }

    fn checkout(&self) -> Result<RawConnection, OperationError> {
        if let Some(conn) = self.idle.lock().pop() {
            return Ok(conn);
        }
        debug!("Opening new connection to {}", self.addr);
        Ok(self.factory.create(&self.addr)?)
    }

    fn checkin(&self, conn: RawConnection) {
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(conn);
        }
    }
}

impl Backend for ConnectionPool {
    fn execute(&self, args: &[&str]) -> Result<RespValue, OperationError> {
        let mut conn = self.checkout()?;
        // A connection that failed mid-command may hold a partial reply, so
        // it is dropped instead of returned.
        let reply = conn.execute(args)?;
        self.checkin(conn);
        Ok(reply)
    }

    fn describe(&self) -> String {
        self.addr.to_string()
    }
}

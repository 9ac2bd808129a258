//! Round-robin connection balancer
//!
//! Spreads read traffic across replica nodes. The connection list is fixed
//! at construction; only the offset cursor moves, under its own lock.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use super::backend::{Backend, BackendExt};
use super::pool::ConnectionPool;
use super::raw_connection::ConnectionFactory;
use crate::config::ServerAddress;
use crate::utils::ConnectionError;

/// Cyclic selector over a fixed, non-empty list of connections
pub struct ConnectionBalancer<C> {
    connections: Vec<C>,
    offset: Mutex<usize>,
}

impl<C> ConnectionBalancer<C> {
    /// Create a balancer over `connections`. Fails on an empty list.
    pub fn new(connections: Vec<C>) -> Result<Self, ConnectionError> {
        if connections.is_empty() {
            return Err(ConnectionError::EmptyPool);
        }
        Ok(Self {
            connections,
            offset: Mutex::new(0),
        })
    }

    /// Next connection in round-robin order
    pub fn get(&self) -> &C {
        let idx = {
            let mut offset = self.offset.lock();
            if *offset >= self.connections.len() {
                *offset = 0;
            }
            let idx = *offset;
            *offset += 1;
            idx
        };
        &self.connections[idx]
    }
}

impl ConnectionBalancer<Arc<dyn Backend>> {
    /// Create a balancer after checking that every backend answers PING.
    /// The first unreachable backend aborts construction.
    pub fn verified(backends: Vec<Arc<dyn Backend>>) -> Result<Self, ConnectionError> {
        for backend in &backends {
            backend.ping().map_err(|e| ConnectionError::Unreachable {
                addr: backend.describe(),
                reason: e.to_string(),
            })?;
        }
        Self::new(backends)
    }

    /// Open a pool per address and build a verified balancer over them
    pub fn connect(
        addrs: &[ServerAddress],
        factory: &ConnectionFactory,
        max_idle: usize,
    ) -> Result<Self, ConnectionError> {
        let backends: Vec<Arc<dyn Backend>> = addrs
            .iter()
            .map(|addr| {
                Arc::new(ConnectionPool::new(addr.clone(), factory.clone(), max_idle))
                    as Arc<dyn Backend>
            })
            .collect();

        let nodes = backends
            .iter()
            .map(|b| b.describe())
            .collect::<Vec<_>>()
            .join(", ");
        let balancer = Self::verified(backends)?;
        info!("Read balancer ready over {} node(s): {}", addrs.len(), nodes);
        Ok(balancer)
    }
}

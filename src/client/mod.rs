//! Client connection layer

pub mod backend;
pub mod balancer;
pub mod pool;
pub mod raw_connection;

pub use backend::{Backend, BackendExt};
pub use balancer::ConnectionBalancer;
pub use pool::ConnectionPool;
pub use raw_connection::{ConnectionFactory, RawConnection};

//! Utility modules

pub mod error;
pub mod resp;

pub use error::{ConnectionError, LoadError, OperationError, Result};
pub use resp::{RespDecoder, RespEncoder, RespValue};

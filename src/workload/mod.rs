//! Workload kinds and the driver operations they issue

pub mod key_format;
pub mod repository;
pub mod search_ops;
pub mod workload_kind;

pub use key_format::{driver_key, extract_driver_ids, parse_driver_id};
pub use repository::{DriverRepository, DriverStore};
pub use search_ops::{create_driver_index, parse_search_keys};
pub use workload_kind::WorkloadKind;

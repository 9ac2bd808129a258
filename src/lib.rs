//! driver-load-bench library
//!
//! Mixed read/write load harness for a geospatial driver-location store on
//! Valkey/Redis with the search module.

pub mod benchmark;
pub mod client;
pub mod config;
pub mod dataset;
pub mod metrics;
pub mod utils;
pub mod workload;

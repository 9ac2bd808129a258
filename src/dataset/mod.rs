//! Driver data model and synthetic data generation

pub mod driver;
pub mod generator;
pub mod geohash;

pub use driver::{join_tariffs, Driver, Location, Tariff};
pub use generator::{DriverGenerator, BASE_LOCATION};

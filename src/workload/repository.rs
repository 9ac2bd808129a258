//! Driver repository: the four backend operations the workers drive
//!
//! Writes always go to the primary. Every read picks the next node from the
//! read balancer; a search and the per-driver reads that hydrate its results
//! use the same node.

use std::sync::Arc;

use crate::client::backend::unexpected;
use crate::client::{Backend, BackendExt, ConnectionBalancer};
use crate::config::SearchConfig;
use crate::dataset::{Driver, Location, Tariff};
use crate::utils::OperationError;

use super::key_format::{driver_key, extract_driver_ids};
use super::search_ops::{order_query, parse_search_keys, radius_query};

/// Backend operations consumed by the load workers
pub trait DriverStore: Send + Sync {
    /// Create or overwrite the driver hash
    fn upsert_driver(&self, driver: &Driver) -> Result<(), OperationError>;

    /// Read one driver; `None` when the key does not exist
    fn get_driver(&self, id: u64) -> Result<Option<Driver>, OperationError>;

    /// Drivers within `radius_km` of `center`, ordered by driver id ascending
    fn drivers_in_radius(
        &self,
        center: Location,
        radius_km: f64,
        limit: usize,
    ) -> Result<Vec<Driver>, OperationError>;

    /// Active drivers under a geohash prefix serving any of `tariffs`,
    /// best score first
    fn drivers_for_order(
        &self,
        geohash_prefix: &str,
        tariffs: &[Tariff],
        limit: usize,
    ) -> Result<Vec<Driver>, OperationError>;
}

/// `DriverStore` over a primary and a read balancer
pub struct DriverRepository {
    primary: Arc<dyn Backend>,
    readers: ConnectionBalancer<Arc<dyn Backend>>,
    search: SearchConfig,
}

impl DriverRepository {
    pub fn new(
        primary: Arc<dyn Backend>,
        readers: ConnectionBalancer<Arc<dyn Backend>>,
        search: SearchConfig,
    ) -> Self {
        Self {
            primary,
            readers,
            search,
        }
    }

    fn fetch_driver(&self, backend: &dyn Backend, id: u64) -> Result<Option<Driver>, OperationError> {
        let key = driver_key(&self.search.key_prefix, id);
        let reply = backend.call(&["HGETALL", &key])?;
        let fields = reply
            .clone()
            .into_field_map()
            .ok_or_else(|| unexpected("HGETALL", &reply))?;

        if fields.is_empty() {
            return Ok(None);
        }
        Ok(Some(Driver::from_fields(&fields)))
    }

    /// Run an FT.SEARCH and hydrate every well-formed hit from the same node
    fn search_drivers(
        &self,
        query: &str,
        sort_field: &str,
        order: &str,
        limit: usize,
    ) -> Result<Vec<Driver>, OperationError> {
        let backend = self.readers.get();
        let limit = limit.to_string();
        let reply = backend.call(&[
            "FT.SEARCH",
            &self.search.index_name,
            query,
            "SORTBY",
            sort_field,
            order,
            "LIMIT",
            "0",
            &limit,
        ])?;

        let keys = parse_search_keys(&reply);
        let ids = extract_driver_ids(&keys, &self.search.key_prefix);

        let mut drivers = Vec::with_capacity(ids.len());
        for id in ids {
            // A hit that vanished or failed to load is dropped, not fatal
            if let Ok(Some(driver)) = self.fetch_driver(backend.as_ref(), id) {
                drivers.push(driver);
            }
        }
        Ok(drivers)
    }
}

impl DriverStore for DriverRepository {
    fn upsert_driver(&self, driver: &Driver) -> Result<(), OperationError> {
        let key = driver_key(&self.search.key_prefix, driver.id);
        let fields = driver.to_fields();

        let mut args: Vec<&str> = Vec::with_capacity(2 + fields.len() * 2);
        args.push("HSET");
        args.push(&key);
        for (name, value) in &fields {
            args.push(name);
            args.push(value);
        }

        self.primary.call(&args).map(|_| ())
    }

    fn get_driver(&self, id: u64) -> Result<Option<Driver>, OperationError> {
        let backend = self.readers.get();
        self.fetch_driver(backend.as_ref(), id)
    }

    fn drivers_in_radius(
        &self,
        center: Location,
        radius_km: f64,
        limit: usize,
    ) -> Result<Vec<Driver>, OperationError> {
        self.search_drivers(&radius_query(center, radius_km), "driver_id", "ASC", limit)
    }

    fn drivers_for_order(
        &self,
        geohash_prefix: &str,
        tariffs: &[Tariff],
        limit: usize,
    ) -> Result<Vec<Driver>, OperationError> {
        self.search_drivers(&order_query(geohash_prefix, tariffs), "score", "DESC", limit)
    }
}

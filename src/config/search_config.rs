//! Search index and query shape configuration

use super::cli::CliArgs;

/// Key prefix of driver hashes; the index covers exactly this prefix
pub const DRIVER_KEY_PREFIX: &str = "driver:";

/// Search configuration shared by the index setup and the read workloads
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub index_name: String,
    pub key_prefix: String,
    /// Radius of the geo search, kilometres
    pub radius_km: f64,
    /// LIMIT of the radius search
    pub radius_limit: usize,
    /// LIMIT of the geohash/tariff search
    pub order_limit: usize,
    /// Characters of geohash used as the search prefix
    pub geohash_precision: usize,
}

impl SearchConfig {
    pub fn from_cli(args: &CliArgs) -> Self {
        Self {
            index_name: args.index_name.clone(),
            key_prefix: DRIVER_KEY_PREFIX.to_string(),
            radius_km: args.radius_km,
            radius_limit: args.radius_limit,
            order_limit: args.order_limit,
            geohash_precision: args.geohash_precision,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            index_name: "index".to_string(),
            key_prefix: DRIVER_KEY_PREFIX.to_string(),
            radius_km: 5.0,
            radius_limit: 30,
            order_limit: 5,
            geohash_precision: 10,
        }
    }
}

//! Search index management and query building (FT.CREATE, FT.SEARCH)

use tracing::{info, warn};

use crate::client::{Backend, BackendExt};
use crate::config::SearchConfig;
use crate::dataset::{join_tariffs, Location, Tariff};
use crate::utils::{OperationError, RespValue};

/// Create the driver index over `driver:` hashes.
///
/// An index that already exists is accepted as-is.
pub fn create_driver_index(
    backend: &dyn Backend,
    config: &SearchConfig,
) -> Result<(), OperationError> {
    let args = [
        "FT.CREATE",
        config.index_name.as_str(),
        "ON",
        "HASH",
        "PREFIX",
        "1",
        config.key_prefix.as_str(),
        "SCHEMA",
        "driver_id",
        "NUMERIC",
        "SORTABLE",
        "location",
        "GEO",
        "geo_hash",
        "TEXT",
        "active_tariffs",
        "TAG",
        "SEPARATOR",
        "|",
        "score",
        "NUMERIC",
        "SORTABLE",
        "active",
        "TAG",
        "phone_charge_percent",
        "NUMERIC",
        "NOINDEX",
        "last_updated_time",
        "NUMERIC",
        "NOINDEX",
    ];

    match backend.call(&args) {
        Ok(_) => {
            info!("Created search index '{}'", config.index_name);
            Ok(())
        }
        Err(OperationError::Server(e)) if e.to_lowercase().contains("already exists") => {
            warn!("Search index '{}' already exists, reusing it", config.index_name);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Query text of the radius search
pub fn radius_query(center: Location, radius_km: f64) -> String {
    format!(
        "@location:[{:.6} {:.6} {:.6} km]",
        center.lng, center.lat, radius_km
    )
}

/// Query text of the geohash-prefix + tariff search over active drivers
pub fn order_query(geohash_prefix: &str, tariffs: &[Tariff]) -> String {
    let mut parts = Vec::with_capacity(3);
    if !geohash_prefix.is_empty() {
        parts.push(format!("@geo_hash:{}*", geohash_prefix));
    }
    parts.push("@active:{true}".to_string());
    parts.push(format!("@active_tariffs:{{{}}}", join_tariffs(tariffs)));
    parts.join(" ")
}

/// Parse an FT.SEARCH reply into document keys.
///
/// The reply is `[total, key, fields, key, fields, ...]`. A trailing key
/// with no fields entry, and non-text keys, are dropped. Anything that is
/// not an array yields no keys.
pub fn parse_search_keys(response: &RespValue) -> Vec<String> {
    let Some(arr) = response.as_array() else {
        return Vec::new();
    };
    if arr.len() < 2 {
        return Vec::new();
    }

    arr[1..]
        .chunks_exact(2)
        .filter_map(|pair| pair[0].as_str().map(str::to_string))
        .collect()
}

//! Synthetic driver generation
//!
//! Drivers are scattered around a fixed city centre with uniformly random
//! offsets. Each worker owns its own generator so no RNG state is shared.

use std::time::{SystemTime, UNIX_EPOCH};

use super::driver::{Driver, Location, Tariff};
use super::geohash;

/// Centre of the generated area (Tashkent)
pub const BASE_LOCATION: Location = Location {
    lat: 41.2995,
    lng: 69.2401,
};

/// Full width of the offset window in degrees, per axis
const SPREAD_DEGREES: f64 = 20.0;

/// Share of generated drivers that are active
const ACTIVE_RATIO: f64 = 0.8;

/// Random driver/location/tariff source for one worker
pub struct DriverGenerator {
    rng: fastrand::Rng,
    geohash_precision: usize,
}

impl DriverGenerator {
    /// `seed == 0` picks a random seed
    pub fn new(seed: u64, geohash_precision: usize) -> Self {
        let seed = if seed == 0 { fastrand::u64(..) } else { seed };
        Self {
            rng: fastrand::Rng::with_seed(seed),
            geohash_precision,
        }
    }

    /// Random point within the generated area
    pub fn location(&mut self) -> Location {
        Location {
            lat: BASE_LOCATION.lat + (self.rng.f64() - 0.5) * SPREAD_DEGREES,
            lng: BASE_LOCATION.lng + (self.rng.f64() - 0.5) * SPREAD_DEGREES,
        }
    }

    /// Random point plus its geohash
    pub fn location_with_hash(&mut self) -> (Location, String) {
        let location = self.location();
        let hash = geohash::encode(location.lat, location.lng, self.geohash_precision);
        (location, hash)
    }

    /// One or two distinct tariffs
    pub fn tariffs(&mut self) -> Vec<Tariff> {
        let count = self.rng.usize(1..=2);
        let mut all = Tariff::ALL;
        self.rng.shuffle(&mut all);
        all[..count].to_vec()
    }

    /// Full driver record for `id`
    pub fn driver(&mut self, id: u64) -> Driver {
        let (location, geo_hash) = self.location_with_hash();
        let hours_ago = self.rng.u64(0..24);
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Driver {
            id,
            geo_hash,
            location,
            active_tariffs: self.tariffs(),
            score: self.rng.i64(0..=100),
            charge: self.rng.i64(0..=100),
            active: self.rng.f64() < ACTIVE_RATIO,
            last_updated_time: now.saturating_sub(hours_ago * 3600).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locations_stay_in_window() {
        let mut gen = DriverGenerator::new(7, 10);
        for _ in 0..1000 {
            let loc = gen.location();
            assert!((loc.lat - BASE_LOCATION.lat).abs() <= SPREAD_DEGREES / 2.0);
            assert!((loc.lng - BASE_LOCATION.lng).abs() <= SPREAD_DEGREES / 2.0);
        }
    }

    #[test]
    fn test_tariffs_distinct_one_or_two() {
        let mut gen = DriverGenerator::new(11, 10);
        for _ in 0..200 {
            let tariffs = gen.tariffs();
            assert!((1..=2).contains(&tariffs.len()));
            if tariffs.len() == 2 {
                assert_ne!(tariffs[0], tariffs[1]);
            }
        }
    }

    #[test]
    fn test_driver_fields_in_range() {
        let mut gen = DriverGenerator::new(3, 10);
        let driver = gen.driver(99);
        assert_eq!(driver.id, 99);
        assert_eq!(driver.geo_hash.len(), 10);
        assert!((0..=100).contains(&driver.score));
        assert!((0..=100).contains(&driver.charge));
        assert!(driver.last_updated_time.parse::<u64>().is_ok());
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = DriverGenerator::new(1234, 8);
        let mut b = DriverGenerator::new(1234, 8);
        assert_eq!(a.location_with_hash(), b.location_with_hash());
        assert_eq!(a.tariffs(), b.tariffs());
    }
}

//! Driver record and its hash encoding

use std::collections::HashMap;

/// Geographic point in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

/// Service class a driver can accept orders for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tariff {
    Start,
    Comfort,
    ComfortPlus,
    Business,
    Premium,
}

impl Tariff {
    pub const ALL: [Tariff; 5] = [
        Tariff::Start,
        Tariff::Comfort,
        Tariff::ComfortPlus,
        Tariff::Business,
        Tariff::Premium,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tariff::Start => "start",
            Tariff::Comfort => "comfort",
            Tariff::ComfortPlus => "comfort+",
            Tariff::Business => "business",
            Tariff::Premium => "premium",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == s)
    }
}

/// Join tariffs with the tag separator used by the index
pub fn join_tariffs(tariffs: &[Tariff]) -> String {
    tariffs
        .iter()
        .map(Tariff::as_str)
        .collect::<Vec<_>>()
        .join("|")
}

/// One driver as stored in the backend hash `driver:<id>`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Driver {
    pub id: u64,
    pub geo_hash: String,
    pub location: Location,
    pub active_tariffs: Vec<Tariff>,
    /// Rating, 0..=100
    pub score: i64,
    /// Phone battery percentage, 0..=100
    pub charge: i64,
    pub active: bool,
    /// Unix timestamp (seconds) as text
    pub last_updated_time: String,
}

impl Driver {
    /// Field/value pairs written with HSET
    pub fn to_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("driver_id", self.id.to_string()),
            (
                "location",
                format!("{:.6},{:.6}", self.location.lat, self.location.lng),
            ),
            ("geo_hash", self.geo_hash.clone()),
            ("active_tariffs", join_tariffs(&self.active_tariffs)),
            ("score", self.score.to_string()),
            ("active", self.active.to_string()),
            ("phone_charge_percent", self.charge.to_string()),
            ("last_updated_time", self.last_updated_time.clone()),
        ]
    }

    /// Rebuild a driver from an HGETALL map.
    ///
    /// Parsing is lenient: a missing or malformed field leaves the default
    /// value in place instead of rejecting the record.
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        let mut driver = Driver::default();

        if let Some(id) = fields.get("driver_id").and_then(|v| v.parse().ok()) {
            driver.id = id;
        }

        if let Some((lat, lng)) = fields.get("location").and_then(|v| v.split_once(',')) {
            if let Ok(lat) = lat.trim().parse() {
                driver.location.lat = lat;
            }
            if let Ok(lng) = lng.trim().parse() {
                driver.location.lng = lng;
            }
        }

        if let Some(geo_hash) = fields.get("geo_hash") {
            driver.geo_hash = geo_hash.clone();
        }

        if let Some(tariffs) = fields.get("active_tariffs") {
            driver.active_tariffs = tariffs.split('|').filter_map(Tariff::parse).collect();
        }

        if let Some(score) = fields.get("score").and_then(|v| v.parse().ok()) {
            driver.score = score;
        }

        driver.active = fields.get("active").map(|v| v == "true").unwrap_or(false);

        if let Some(charge) = fields.get("phone_charge_percent").and_then(|v| v.parse().ok()) {
            driver.charge = charge;
        }

        if let Some(updated) = fields.get("last_updated_time") {
            driver.last_updated_time = updated.clone();
        }

        driver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Driver {
        Driver {
            id: 42,
            geo_hash: "tzk3xq1b2c".to_string(),
            location: Location {
                lat: 41.2995,
                lng: 69.2401,
            },
            active_tariffs: vec![Tariff::Comfort, Tariff::ComfortPlus],
            score: 87,
            charge: 55,
            active: true,
            last_updated_time: "1760000000".to_string(),
        }
    }

    #[test]
    fn test_fields_layout() {
        let fields: HashMap<_, _> = sample().to_fields().into_iter().collect();
        assert_eq!(fields["driver_id"], "42");
        assert_eq!(fields["location"], "41.299500,69.240100");
        assert_eq!(fields["active_tariffs"], "comfort|comfort+");
        assert_eq!(fields["active"], "true");
        assert_eq!(fields["phone_charge_percent"], "55");
        assert_eq!(fields.len(), 8);
    }

    #[test]
    fn test_from_fields_restores_record() {
        let map: HashMap<String, String> = sample()
            .to_fields()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert_eq!(Driver::from_fields(&map), sample());
    }

    #[test]
    fn test_from_fields_is_lenient() {
        let map: HashMap<String, String> = [
            ("driver_id", "abc"),
            ("location", "41.5"),
            ("score", "77"),
            ("active_tariffs", "start|teleport"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let driver = Driver::from_fields(&map);
        assert_eq!(driver.id, 0);
        assert_eq!(driver.location, Location::default());
        assert_eq!(driver.score, 77);
        assert_eq!(driver.active_tariffs, vec![Tariff::Start]);
        assert!(!driver.active);
    }

    #[test]
    fn test_tariff_parse() {
        assert_eq!(Tariff::parse("comfort+"), Some(Tariff::ComfortPlus));
        assert_eq!(Tariff::parse("economy"), None);
        assert_eq!(join_tariffs(&[Tariff::Start, Tariff::Premium]), "start|premium");
    }
}

//! Workload kind definitions

use serde::Serialize;

use crate::config::QuotaPolicy;

/// The four traffic shapes driven concurrently during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkloadKind {
    /// Upsert a full driver record (HSET)
    Write,
    /// Read one driver by id (HGETALL)
    SingleRead,
    /// Geo radius search sorted by driver id
    RadiusRead,
    /// Geohash prefix + tariff tag search sorted by score
    PrefixRead,
}

impl WorkloadKind {
    pub const ALL: [WorkloadKind; 4] = [
        WorkloadKind::Write,
        WorkloadKind::SingleRead,
        WorkloadKind::RadiusRead,
        WorkloadKind::PrefixRead,
    ];

    /// Display name used in logs and the summary
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Write => "Create/Update",
            Self::SingleRead => "Single GET",
            Self::RadiusRead => "List GET in Radius",
            Self::PrefixRead => "List GET in Geohash",
        }
    }

    /// Short identifier used for thread names and JSON keys
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Write => "write",
            Self::SingleRead => "single-read",
            Self::RadiusRead => "radius-read",
            Self::PrefixRead => "prefix-read",
        }
    }

    /// Whether the kind mutates data (routed to the primary)
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Write)
    }

    /// Whether the kind draws driver ids from an `IdSequencer`
    pub fn uses_id_sequence(&self) -> bool {
        matches!(self, Self::Write | Self::SingleRead)
    }

    /// Behaviour when a worker hits its quota before the deadline.
    /// Single-key readers sit out the rest of the budget; everyone else
    /// returns immediately.
    pub fn default_quota_policy(&self) -> QuotaPolicy {
        match self {
            Self::SingleRead => QuotaPolicy::SleepUntilDeadline,
            _ => QuotaPolicy::Stop,
        }
    }
}

impl std::fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

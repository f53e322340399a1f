//! Timezone-aware clock abstraction.
//!
//! The engine never reads the system clock itself; callers sample an
//! [`Clock`] implementation each tick and pass the instant in. This keeps
//! all wall-clock comparisons in the configured IANA zone regardless of the
//! host locale, and lets tests drive the engine with a fixed clock.

use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::types::MiqatError;

/// Zone of the reference deployment.
pub const DEFAULT_ZONE: Tz = chrono_tz::Asia::Karachi;

/// Source of "now" expressed as the target zone's wall-clock fields.
pub trait Clock: Send + Sync {
    /// Current wall-clock time in the target timezone.
    fn now(&self) -> NaiveDateTime;
}

/// Real clock resolved through a fixed IANA zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneClock {
    zone: Tz,
}

impl ZoneClock {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    /// Resolves an IANA zone name (e.g. `"Asia/Karachi"`).
    ///
    /// # Errors
    /// Returns `UnknownZone` if the name is not in the zone database.
    pub fn from_name(name: &str) -> Result<Self, MiqatError> {
        name.parse()
            .map(Self::new)
            .map_err(|_| MiqatError::unknown_zone(name))
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }
}

impl Default for ZoneClock {
    fn default() -> Self {
        Self::new(DEFAULT_ZONE)
    }
}

impl Clock for ZoneClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.zone).naive_local()
    }
}

/// Clock pinned to one instant, for tests and simulations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_from_name_resolves_karachi() {
        let clock = ZoneClock::from_name("Asia/Karachi").unwrap();
        assert_eq!(clock.zone(), DEFAULT_ZONE);
    }

    #[test]
    fn test_from_name_rejects_unknown() {
        let res = ZoneClock::from_name("Mars/Olympus_Mons");
        assert!(matches!(res, Err(MiqatError::UnknownZone { .. })));
    }

    #[test]
    fn test_fixed_clock_returns_its_instant() {
        let instant = NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap();
        assert_eq!(FixedClock(instant).now(), instant);
    }

    #[test]
    fn test_zone_clock_does_not_panic() {
        let _ = ZoneClock::default().now();
    }
}

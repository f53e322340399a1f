use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Provider key for the sunrise timing.
pub const SUNRISE_KEY: &str = "Sunrise";

/// The five daily prayers, in chronological order.
///
/// `ORDER` is the iteration and tie-break order for next-prayer selection
/// and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prayer {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    pub const ORDER: [Prayer; 5] = [
        Prayer::Fajr,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    /// The key this prayer uses in a provider timing set.
    pub fn key(&self) -> &'static str {
        match self {
            Prayer::Fajr => "Fajr",
            Prayer::Dhuhr => "Dhuhr",
            Prayer::Asr => "Asr",
            Prayer::Maghrib => "Maghrib",
            Prayer::Isha => "Isha",
        }
    }
}

impl fmt::Display for Prayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Calculation method selector for the timings provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    /// University of Islamic Sciences, Karachi.
    Karachi,
    /// Umm al-Qura University, Makkah.
    UmmAlQura,
}

impl Method {
    /// Wire identifier used in provider queries.
    pub fn id(&self) -> u8 {
        match self {
            Method::Karachi => 1,
            Method::UmmAlQura => 4,
        }
    }
}

impl Default for Method {
    fn default() -> Self {
        Self::Karachi
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Karachi => "Islamic Sciences, Karachi",
            Method::UmmAlQura => "Umm al Qura",
        };
        write!(f, "{}", s)
    }
}

/// Jurisprudence school selector for the Asr calculation.
///
/// The provider treats Shafi as its default; only Hanafi goes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum School {
    Shafi,
    Hanafi,
}

impl School {
    /// Wire identifier used in provider queries.
    pub fn id(&self) -> u8 {
        match self {
            School::Shafi => 0,
            School::Hanafi => 1,
        }
    }
}

impl Default for School {
    fn default() -> Self {
        Self::Shafi
    }
}

impl fmt::Display for School {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            School::Shafi => "Shafi (Standard)",
            School::Hanafi => "Hanafi",
        };
        write!(f, "{}", s)
    }
}

/// A validated "HH:MM" wall-clock time (hour 0-23, minute 0-59).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClockTime {
    pub hour: u8,
    pub minute: u8,
}

impl ClockTime {
    /// Parses `"HH:MM"`. `name` labels the timing in the error.
    ///
    /// # Errors
    /// Returns `InvalidTime` for anything that is not a valid hour/minute
    /// pair.
    pub fn parse(name: &str, value: &str) -> Result<Self, MiqatError> {
        let invalid = || MiqatError::invalid_time(name, value);
        let (hour, minute) = value.split_once(':').ok_or_else(invalid)?;
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        if hour > 23 || minute > 59 {
            return Err(invalid());
        }
        Ok(Self { hour, minute })
    }

    /// Places this time at second zero on a calendar date.
    pub fn on(self, date: NaiveDate) -> NaiveDateTime {
        // Bounds are enforced at parse time.
        date.and_hms_opt(self.hour.into(), self.minute.into(), 0)
            .expect("hour and minute validated at parse")
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// A provider timing set: event name to "HH:MM" string, one timezone.
///
/// The key set is provider-defined (Fajr, Sunrise, Dhuhr, Asr, Sunset,
/// Maghrib, Isha, Imsak, Midnight observed); the engine requires only the
/// five [`Prayer::ORDER`] keys plus [`SUNRISE_KEY`]. A snapshot is immutable
/// once built and is replaced wholesale, never patched in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timings(BTreeMap<String, String>);

impl Timings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// The raw "HH:MM" string for a canonical prayer, if present.
    pub fn prayer(&self, prayer: Prayer) -> Option<&str> {
        self.get(prayer.key())
    }

    pub fn sunrise(&self) -> Option<&str> {
        self.get(SUNRISE_KEY)
    }

    /// All entries, for display layers that render the full list.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Timings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// One tick's countdown result. Ephemeral: recomputed every second and
/// replaced wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    /// The next upcoming prayer (today, or tomorrow's Fajr after rollover).
    pub next_prayer: Prayer,
    /// Whole milliseconds until `next_prayer`.
    pub until_next_ms: u64,
    /// Whole milliseconds until sunrise; `None` when the provider set has
    /// no sunrise entry.
    pub until_sunrise_ms: Option<u64>,
    /// Whole milliseconds until the first instant of the next calendar day.
    pub until_midnight_ms: u64,
}

impl Countdown {
    /// `until_next_ms` as zero-padded "HH:MM:SS".
    pub fn until_next_hms(&self) -> String {
        crate::format::format_hms(self.until_next_ms)
    }

    pub fn until_sunrise_hms(&self) -> Option<String> {
        self.until_sunrise_ms.map(crate::format::format_hms)
    }

    pub fn until_midnight_hms(&self) -> String {
        crate::format::format_hms(self.until_midnight_ms)
    }
}

/// Errors from miqat operations.
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
pub enum MiqatError {
    /// A timing the engine depends on is absent from the set.
    #[error("required timing '{name}' is missing from the timing set")]
    MissingTiming { name: String },

    /// A timing string does not parse to a valid hour/minute pair.
    #[error("invalid time string {value:?} for '{name}'")]
    InvalidTime { name: String, value: String },

    /// The configured IANA timezone name is not recognized.
    #[error("unknown timezone {name:?}")]
    UnknownZone { name: String },

    /// Transport or decode failure while fetching timings.
    #[error("network error: {0}")]
    Network(String),
}

impl MiqatError {
    /// Creates a `MissingTiming` error.
    pub fn missing_timing(name: impl Into<String>) -> Self {
        Self::MissingTiming { name: name.into() }
    }

    /// Creates an `InvalidTime` error.
    pub fn invalid_time(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidTime {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Creates an `UnknownZone` error.
    pub fn unknown_zone(name: impl Into<String>) -> Self {
        Self::UnknownZone { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_is_chronological_names() {
        let keys: Vec<&str> = Prayer::ORDER.iter().map(|p| p.key()).collect();
        assert_eq!(keys, ["Fajr", "Dhuhr", "Asr", "Maghrib", "Isha"]);
    }

    #[test]
    fn test_selector_wire_ids() {
        assert_eq!(Method::Karachi.id(), 1);
        assert_eq!(Method::UmmAlQura.id(), 4);
        assert_eq!(School::Shafi.id(), 0);
        assert_eq!(School::Hanafi.id(), 1);
    }

    #[test]
    fn test_clock_time_parse_valid() {
        let t = ClockTime::parse("Fajr", "05:09").unwrap();
        assert_eq!((t.hour, t.minute), (5, 9));
        assert_eq!(t.to_string(), "05:09");
    }

    #[test]
    fn test_clock_time_parse_rejects_garbage() {
        for bad in ["", "0509", "24:00", "12:60", "ab:cd", "5"] {
            let res = ClockTime::parse("Fajr", bad);
            assert!(
                matches!(res, Err(MiqatError::InvalidTime { .. })),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn test_timings_deserialize_from_provider_shape() {
        let timings: Timings =
            serde_json::from_str(r#"{"Fajr":"05:00","Sunrise":"06:20","Isha":"19:30"}"#).unwrap();
        assert_eq!(timings.prayer(Prayer::Fajr), Some("05:00"));
        assert_eq!(timings.sunrise(), Some("06:20"));
        assert_eq!(timings.prayer(Prayer::Dhuhr), None);
        assert_eq!(timings.len(), 3);
    }
}

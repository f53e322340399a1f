//! # miqat
//!
//! Prayer-time countdowns for a fixed location: given a set of "HH:MM"
//! timings in one IANA timezone, deterministically resolve the next
//! upcoming prayer and produce millisecond countdowns to it, to sunrise,
//! and to local midnight, suitable for once-per-second re-evaluation.
//!
//! ## Modules
//!
//! - `types`: Core types (Prayer, Timings, Countdown, selectors)
//! - `engine`: Pure next-prayer resolution and countdown computation
//! - `clock`: Timezone-aware clock abstraction
//! - `format`: Display string helpers (HH:MM:SS, 12-hour form)
//! - `watch`: Caller-side retained state and the per-second cycle
//! - `network`: AlAdhan timings fetch (optional)
//!
//! ## Usage
//!
//! ```rust
//! use miqat::prelude::*;
//! use chrono::NaiveDate;
//!
//! let timings: Timings = [
//!     ("Fajr", "05:00"),
//!     ("Sunrise", "06:20"),
//!     ("Dhuhr", "12:15"),
//!     ("Asr", "15:45"),
//!     ("Maghrib", "18:10"),
//!     ("Isha", "19:30"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let now = NaiveDate::from_ymd_opt(2025, 3, 10)
//!     .unwrap()
//!     .and_hms_opt(18, 0, 0)
//!     .unwrap();
//!
//! let countdown = resolve(&timings, now).unwrap();
//! assert_eq!(countdown.next_prayer, Prayer::Maghrib);
//! assert_eq!(countdown.until_next_hms(), "00:10:00");
//! ```

pub mod clock;
pub mod engine;
pub mod format;
pub mod types;
pub mod watch;

#[cfg(feature = "async")]
pub mod network;

pub use clock::{Clock, DEFAULT_ZONE, FixedClock, ZoneClock};
pub use engine::resolve;
pub use types::{ClockTime, Countdown, Method, MiqatError, Prayer, School, Timings};
pub use watch::{PrayerWatch, WatchConfig};

#[cfg(feature = "async")]
pub use network::aladhan::TimingsClient;

pub mod prelude {
    pub use crate::clock::{Clock, FixedClock, ZoneClock};
    pub use crate::format::{format_hms, to_twelve_hour};
    pub use crate::resolve;
    pub use crate::types::*;
    pub use crate::watch::{PrayerWatch, WatchConfig};
}

use chrono::NaiveDateTime;

/// Resolves just the next prayer and its countdown.
///
/// Thin wrapper over [`engine::resolve`] for callers that do not need the
/// sunrise and midnight values.
pub fn next_prayer(timings: &Timings, now: NaiveDateTime) -> Result<(Prayer, u64), MiqatError> {
    let countdown = engine::resolve(timings, now)?;
    Ok((countdown.next_prayer, countdown.until_next_ms))
}

//! Countdown engine: next-prayer resolution and auxiliary countdowns.
//!
//! [`resolve`] is a pure function over a timing snapshot and an explicit
//! "now"; it has no side effects and never reads a clock, so identical
//! inputs always produce an identical [`Countdown`].

use chrono::{Duration, NaiveDateTime, NaiveTime};
use smallvec::SmallVec;

use crate::types::{ClockTime, Countdown, MiqatError, Prayer, SUNRISE_KEY, Timings};

/// Resolves the next prayer and the sunrise/midnight countdowns for `now`.
///
/// Candidates are built on `now`'s calendar date, in [`Prayer::ORDER`]. A
/// candidate strictly earlier than `now` has passed; one equal to `now` has
/// not. The earliest survivor wins, ties going to the earlier ORDER
/// position. When every prayer today has passed, the result is always
/// tomorrow's Fajr.
///
/// # Errors
/// `MissingTiming` when the Fajr key is absent (the rollover fallback would
/// be impossible, so the set is unresolvable); `InvalidTime` when a
/// consulted timing string is not a valid "HH:MM" pair.
///
/// # Example
/// ```rust
/// use chrono::NaiveDate;
/// use miqat::{Prayer, Timings};
///
/// let timings: Timings = [("Fajr", "05:00"), ("Maghrib", "18:10")]
///     .into_iter()
///     .collect();
/// let now = NaiveDate::from_ymd_opt(2025, 3, 10)
///     .unwrap()
///     .and_hms_opt(18, 0, 0)
///     .unwrap();
///
/// let countdown = miqat::resolve(&timings, now).unwrap();
/// assert_eq!(countdown.next_prayer, Prayer::Maghrib);
/// assert_eq!(countdown.until_next_ms, 600_000);
/// ```
pub fn resolve(timings: &Timings, now: NaiveDateTime) -> Result<Countdown, MiqatError> {
    let today = now.date();

    // Fajr anchors the day rollover; without it the next prayer is
    // unresolvable no matter the time of day.
    let fajr = match timings.prayer(Prayer::Fajr) {
        Some(raw) => ClockTime::parse(Prayer::Fajr.key(), raw)?,
        None => return Err(MiqatError::missing_timing(Prayer::Fajr.key())),
    };

    let mut candidates: SmallVec<[(Prayer, NaiveDateTime); 5]> = SmallVec::new();
    for prayer in Prayer::ORDER {
        let Some(raw) = timings.prayer(prayer) else {
            continue;
        };
        let at = ClockTime::parse(prayer.key(), raw)?.on(today);
        if at < now {
            // Already passed today.
            continue;
        }
        candidates.push((prayer, at));
    }

    // Earliest upcoming wins; ORDER position breaks ties.
    let (next_prayer, next_at) = candidates
        .into_iter()
        .reduce(|best, cand| if best.1 <= cand.1 { best } else { cand })
        .unwrap_or_else(|| (Prayer::Fajr, fajr.on(today + Duration::days(1))));

    let until_sunrise_ms = match timings.get(SUNRISE_KEY) {
        Some(raw) => {
            let sunrise = ClockTime::parse(SUNRISE_KEY, raw)?;
            let mut at = sunrise.on(today);
            if at < now {
                at = sunrise.on(today + Duration::days(1));
            }
            Some(ms_until(at, now))
        }
        None => None,
    };

    // Always the day boundary in the target zone, independent of any
    // provider "Midnight" entry.
    let next_day_start = (today + Duration::days(1)).and_time(NaiveTime::MIN);

    Ok(Countdown {
        next_prayer,
        until_next_ms: ms_until(next_at, now),
        until_sunrise_ms,
        until_midnight_ms: ms_until(next_day_start, now),
    })
}

fn ms_until(later: NaiveDateTime, now: NaiveDateTime) -> u64 {
    (later - now).num_milliseconds().max(0) as u64
}

//! Caller-side state for the countdown cycle.
//!
//! [`PrayerWatch`] owns what the engine itself never retains: the current
//! selectors, the most recent timing snapshot, and the most recent
//! countdown. Snapshots are swapped wholesale; a generation counter guards
//! against an in-flight fetch landing after the selectors it was issued for
//! have been superseded.

use chrono_tz::Tz;

use crate::clock::{Clock, DEFAULT_ZONE};
use crate::engine;
use crate::types::{Countdown, Method, MiqatError, School, Timings};

/// Address string of the reference deployment.
pub const DEFAULT_ADDRESS: &str = "Karachi,Pakistan";

/// Fixed-location configuration: lookup address, target zone, selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    pub address: String,
    pub zone: Tz,
    pub method: Method,
    pub school: School,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            zone: DEFAULT_ZONE,
            method: Method::default(),
            school: School::default(),
        }
    }
}

impl WatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn zone(mut self, zone: Tz) -> Self {
        self.zone = zone;
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn school(mut self, school: School) -> Self {
        self.school = school;
        self
    }
}

/// Retained state between ticks: config, latest timings, latest countdown.
#[derive(Debug)]
pub struct PrayerWatch {
    config: WatchConfig,
    timings: Option<Timings>,
    latest: Option<Countdown>,
    generation: u64,
}

impl PrayerWatch {
    pub fn new(config: WatchConfig) -> Self {
        Self {
            config,
            timings: None,
            latest: None,
            generation: 0,
        }
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// Identifies the current selector state; bumped on every change.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn timings(&self) -> Option<&Timings> {
        self.timings.as_ref()
    }

    /// The countdown from the most recent tick, if any.
    pub fn latest(&self) -> Option<&Countdown> {
        self.latest.as_ref()
    }

    /// Selects a calculation method. A change bumps the generation, so any
    /// fetch still in flight for the old selection will be discarded;
    /// trigger a new fetch afterwards.
    pub fn set_method(&mut self, method: Method) -> u64 {
        if self.config.method != method {
            self.config.method = method;
            self.generation += 1;
        }
        self.generation
    }

    /// Selects a jurisprudence school. Same generation semantics as
    /// [`set_method`](Self::set_method).
    pub fn set_school(&mut self, school: School) -> u64 {
        if self.config.school != school {
            self.config.school = school;
            self.generation += 1;
        }
        self.generation
    }

    /// Installs a fetched snapshot, wholesale, if `generation` still
    /// matches the current selector state. Returns whether it was applied.
    pub fn apply_timings(&mut self, generation: u64, timings: Timings) -> bool {
        if generation != self.generation {
            log::debug!(
                "discarding stale timings fetch (generation {generation}, current {})",
                self.generation
            );
            return false;
        }
        log::debug!("applying timing snapshot with {} entries", timings.len());
        self.timings = Some(timings);
        true
    }

    /// Recomputes the countdown from a fresh clock sample.
    ///
    /// `Ok(None)` while no timing snapshot is loaded (the "no data
    /// available" state).
    ///
    /// # Errors
    /// Propagates engine errors for an unresolvable or malformed snapshot.
    pub fn tick(&mut self, clock: &dyn Clock) -> Result<Option<&Countdown>, MiqatError> {
        let Some(timings) = &self.timings else {
            self.latest = None;
            return Ok(None);
        };
        let countdown = engine::resolve(timings, clock.now())?;
        self.latest = Some(countdown);
        Ok(self.latest.as_ref())
    }
}

#[cfg(feature = "async")]
impl PrayerWatch {
    /// Fetches a fresh timing set with the current selectors and applies it
    /// under the generation captured before the request went out.
    ///
    /// # Errors
    /// On failure the previous snapshot is kept (stale data beats no data)
    /// and the fetch error is returned for the caller to log or ignore.
    pub async fn refresh(
        &mut self,
        client: &crate::network::aladhan::TimingsClient,
    ) -> Result<(), MiqatError> {
        let generation = self.generation;
        match client.fetch(self.config.method, self.config.school).await {
            Ok(timings) => {
                self.apply_timings(generation, timings);
                Ok(())
            }
            Err(err) => {
                log::warn!("timings fetch failed, keeping previous snapshot: {err}");
                Err(err)
            }
        }
    }

    /// Drives [`tick`](Self::tick) once per second. The timer stops when
    /// the returned future is dropped, so tearing down the consuming task
    /// leaves no orphaned ticker behind.
    ///
    /// # Errors
    /// Returns the first engine error; ticks with no snapshot loaded are
    /// skipped, not errors.
    pub async fn run(
        &mut self,
        clock: &dyn Clock,
        mut on_tick: impl FnMut(&Countdown),
    ) -> Result<(), MiqatError> {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(1));
        loop {
            ticker.tick().await;
            if let Some(countdown) = self.tick(clock)? {
                on_tick(countdown);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::types::Prayer;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn sample_timings() -> Timings {
        [
            ("Fajr", "05:00"),
            ("Sunrise", "06:20"),
            ("Dhuhr", "12:15"),
            ("Asr", "15:45"),
            ("Maghrib", "18:10"),
            ("Isha", "19:30"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_tick_without_data_is_none() {
        let mut watch = PrayerWatch::new(WatchConfig::default());
        let result = watch.tick(&FixedClock(at(18, 0, 0))).unwrap();
        assert!(result.is_none());
        assert!(watch.latest().is_none());
    }

    #[test]
    fn test_tick_replaces_latest_wholesale() {
        let mut watch = PrayerWatch::new(WatchConfig::default());
        let generation = watch.generation();
        assert!(watch.apply_timings(generation, sample_timings()));

        watch.tick(&FixedClock(at(18, 0, 0))).unwrap();
        assert_eq!(watch.latest().unwrap().next_prayer, Prayer::Maghrib);

        watch.tick(&FixedClock(at(18, 20, 0))).unwrap();
        assert_eq!(watch.latest().unwrap().next_prayer, Prayer::Isha);
    }

    #[test]
    fn test_selector_change_discards_stale_fetch() {
        let mut watch = PrayerWatch::new(WatchConfig::default());
        let stale = watch.generation();
        let current = watch.set_method(Method::UmmAlQura);
        assert!(current > stale);

        assert!(!watch.apply_timings(stale, sample_timings()));
        assert!(watch.timings().is_none());

        assert!(watch.apply_timings(current, sample_timings()));
        assert!(watch.timings().is_some());
    }

    #[test]
    fn test_reselecting_same_value_keeps_generation() {
        let mut watch = PrayerWatch::new(WatchConfig::default());
        let g0 = watch.generation();
        assert_eq!(watch.set_method(Method::Karachi), g0);
        assert_eq!(watch.set_school(School::Shafi), g0);
        assert!(watch.set_school(School::Hanafi) > g0);
    }

    #[test]
    fn test_config_setters_chain() {
        let config = WatchConfig::new()
            .address("Makkah,Saudi Arabia")
            .method(Method::UmmAlQura)
            .school(School::Hanafi);
        assert_eq!(config.address, "Makkah,Saudi Arabia");
        assert_eq!(config.method, Method::UmmAlQura);
        assert_eq!(config.school, School::Hanafi);
        assert_eq!(config.zone, DEFAULT_ZONE);
    }

    #[cfg(feature = "async")]
    #[tokio::test(start_paused = true)]
    async fn test_run_ticks_once_per_second_until_dropped() {
        let mut watch = PrayerWatch::new(WatchConfig::default());
        let generation = watch.generation();
        watch.apply_timings(generation, sample_timings());

        let clock = FixedClock(at(18, 0, 0));
        let mut ticks = 0u32;
        let result = tokio::time::timeout(
            std::time::Duration::from_millis(3500),
            watch.run(&clock, |_| ticks += 1),
        )
        .await;

        assert!(result.is_err(), "run() only ends when its future is dropped");
        assert_eq!(ticks, 4);
    }
}

//! Entry-time resolution.
//!
//! Signals carry a bare `HH:MM` in the signal provider's time zone. The
//! resolver pins that to a calendar date and converts it into the
//! operator's zone.
//!
//! Date selection is a heuristic: the date is "today" in the operator's
//! zone, moved back one day while the local hour is below `rollover_hour`,
//! on the assumption that early-morning signals belong to the previous
//! evening's session. Near the threshold this picks the wrong day.
//! Times that fall in a DST gap are shifted forward by one hour; ambiguous
//! times resolve to the earlier instant.

use std::time::Duration;

use chrono::{DateTime, Days, LocalResult, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::error::SignalError;

/// How the current instant relates to a resolved entry target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lateness {
    /// The target is in the future by this much.
    Wait(Duration),
    /// The target has passed but within the grace window.
    Due,
    /// The target passed by more than the grace window.
    Late(Duration),
}

/// Converts signal times-of-day into absolute local timestamps.
#[derive(Debug, Clone)]
pub struct EntryTimeResolver {
    signal_tz: Tz,
    local_tz: Tz,
    rollover_hour: u32,
    grace: Duration,
}

impl EntryTimeResolver {
    #[must_use]
    pub const fn new(signal_tz: Tz, local_tz: Tz, rollover_hour: u32, grace: Duration) -> Self {
        Self {
            signal_tz,
            local_tz,
            rollover_hour,
            grace,
        }
    }

    #[must_use]
    pub const fn grace(&self) -> Duration {
        self.grace
    }

    #[must_use]
    pub const fn local_tz(&self) -> Tz {
        self.local_tz
    }

    /// Resolve `time_of_day` (signal zone) against `now` into local time.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::InvalidEntryTime`] when the wall-clock time
    /// cannot be mapped onto the signal zone even after the DST shift.
    pub fn resolve(
        &self,
        time_of_day: NaiveTime,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Tz>, SignalError> {
        let local = now.with_timezone(&self.local_tz);
        let mut date = local.date_naive();
        if local.hour() < self.rollover_hour {
            date = date.checked_sub_days(Days::new(1)).unwrap_or(date);
        }
        let target = self.localize(date, time_of_day)?;
        Ok(target.with_timezone(&self.local_tz))
    }

    /// Classify `now` against a resolved target.
    #[must_use]
    pub fn check_lateness(&self, target: DateTime<Tz>, now: DateTime<Utc>) -> Lateness {
        let target = target.with_timezone(&Utc);
        if target > now {
            return (target - now)
                .to_std()
                .map_or(Lateness::Due, Lateness::Wait);
        }
        let late = (now - target).to_std().unwrap_or_default();
        if late > self.grace {
            Lateness::Late(late)
        } else {
            Lateness::Due
        }
    }

    fn localize(&self, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Tz>, SignalError> {
        let naive = date.and_time(time);
        match self.signal_tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => Ok(dt),
            LocalResult::Ambiguous(earliest, _) => Ok(earliest),
            LocalResult::None => {
                let shifted = naive + chrono::TimeDelta::hours(1);
                self.signal_tz
                    .from_local_datetime(&shifted)
                    .earliest()
                    .ok_or_else(|| SignalError::InvalidEntryTime {
                        value: time.format("%H:%M").to_string(),
                        reason: format!("does not exist in {} on {date}", self.signal_tz),
                    })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn resolver() -> EntryTimeResolver {
        EntryTimeResolver::new(
            chrono_tz::America::New_York,
            chrono_tz::Africa::Windhoek,
            7,
            Duration::from_secs(5),
        )
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn converts_signal_time_into_local_zone() {
        // 10:59 EDT == 14:59 UTC == 16:59 in Windhoek (UTC+2).
        let now = Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap();
        let target = resolver().resolve(hm(10, 59), now).unwrap();

        assert_eq!(target.timezone(), chrono_tz::Africa::Windhoek);
        assert_eq!(target.hour(), 16);
        assert_eq!(target.minute(), 59);
        assert_eq!(
            target.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2026, 6, 15, 14, 59, 0).unwrap()
        );
    }

    #[test]
    fn early_local_hour_rolls_back_one_day() {
        // 03:00 UTC == 05:00 on the 15th in Windhoek, below the rollover
        // hour, so 23:30 is read as New York's evening of the 14th.
        let resolver = resolver();
        let now = Utc.with_ymd_and_hms(2026, 6, 15, 3, 0, 0).unwrap();
        let target = resolver.resolve(hm(23, 30), now).unwrap();
        assert_eq!(
            target.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2026, 6, 15, 3, 30, 0).unwrap()
        );
        assert_eq!(
            resolver.check_lateness(target, now),
            Lateness::Wait(Duration::from_secs(30 * 60))
        );
    }

    #[test]
    fn just_after_local_midnight_keeps_the_evening_session() {
        // 22:10 UTC on the 14th == 00:10 on the 15th in Windhoek
        // == 18:10 on the 14th in New York.
        let now = Utc.with_ymd_and_hms(2026, 6, 14, 22, 10, 0).unwrap();
        let target = resolver().resolve(hm(18, 15), now).unwrap();
        assert_eq!(
            target.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2026, 6, 14, 22, 15, 0).unwrap()
        );
    }

    #[test]
    fn at_rollover_hour_uses_today() {
        // 05:00 UTC == 07:00 Windhoek.
        let now = Utc.with_ymd_and_hms(2026, 6, 15, 5, 0, 0).unwrap();
        let target = resolver().resolve(hm(1, 5), now).unwrap();
        assert_eq!(
            target.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2026, 6, 15, 5, 5, 0).unwrap()
        );
    }

    #[test]
    fn dst_gap_shifts_forward() {
        // 2026-03-08 02:30 does not exist in New York.
        let now = Utc.with_ymd_and_hms(2026, 3, 8, 12, 0, 0).unwrap();
        let target = resolver().resolve(hm(2, 30), now).unwrap();
        assert_eq!(
            target.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2026, 3, 8, 7, 30, 0).unwrap()
        );
    }

    #[test]
    fn lateness_beyond_grace_is_late() {
        let resolver = resolver();
        let now =
            Utc.with_ymd_and_hms(2026, 6, 15, 14, 59, 5).unwrap() + TimeDelta::milliseconds(100);
        let target = resolver.resolve(hm(10, 59), now).unwrap();

        assert_eq!(
            resolver.check_lateness(target, now),
            Lateness::Late(Duration::from_millis(5100))
        );
    }

    #[test]
    fn lateness_within_grace_is_due() {
        let resolver = resolver();
        let now = Utc.with_ymd_and_hms(2026, 6, 15, 14, 59, 4).unwrap();
        let target = resolver.resolve(hm(10, 59), now).unwrap();
        assert_eq!(resolver.check_lateness(target, now), Lateness::Due);

        let exact = Utc.with_ymd_and_hms(2026, 6, 15, 14, 59, 5).unwrap();
        assert_eq!(resolver.check_lateness(target, exact), Lateness::Due);
    }

    #[test]
    fn future_target_waits() {
        let resolver = resolver();
        let now = Utc.with_ymd_and_hms(2026, 6, 15, 14, 58, 58).unwrap();
        let target = resolver.resolve(hm(10, 59), now).unwrap();
        assert_eq!(
            resolver.check_lateness(target, now),
            Lateness::Wait(Duration::from_secs(2))
        );
    }
}

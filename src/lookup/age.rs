/// Account-age estimation
///
/// Account ids are handed out roughly in order, so an id can be placed on a
/// timeline by interpolating from a few accounts whose creation date is
/// known. The anchors and the id rate below are uncalibrated approximations:
/// estimates are a heuristic, not a platform-verified fact, and the whole
/// table is meant to be replaced once a better calibration source exists.
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Utc};
use lazy_static::lazy_static;
use std::fmt;

/// Ids assigned per day, applied linearly around the nearest anchor
pub const IDS_PER_DAY: i64 = 20_000_000;

const MILLIS_PER_DAY: i128 = 86_400_000;

/// Known (id, creation date) anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferencePoint {
    pub id: i64,
    pub created_at: NaiveDateTime,
}

lazy_static! {
    /// Anchors in lookup order; ties go to the earlier entry
    pub static ref REFERENCE_POINTS: [ReferencePoint; 4] = [
        anchor(100_000_000, 2013, 8, 1),
        anchor(1_273_841_502, 2020, 8, 13),
        anchor(1_500_000_000, 2021, 5, 1),
        anchor(2_000_000_000, 2022, 12, 1),
    ];
}

/// Build an anchor at midnight of the given date
///
/// The table is a compile-time constant, so an invalid date is a typo in the
/// table itself. It panics on first use of `REFERENCE_POINTS` (covered by
/// `test_reference_table`) instead of silently moving every estimate.
fn anchor(id: i64, year: i32, month: u32, day: u32) -> ReferencePoint {
    let created_at = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_else(|| panic!("invalid reference date {}-{}-{}", year, month, day));
    ReferencePoint { id, created_at }
}

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock (UTC)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

/// Clock frozen at a given instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Calendar difference decomposed into years, months and days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountAge {
    pub years: i64,
    pub months: i64,
    pub days: i64,
}

impl AccountAge {
    /// Calendar-accurate difference from `from` to `to`
    ///
    /// Whole months are counted first (month arithmetic clamps to the last
    /// day of shorter months), the remainder is expressed in whole days.
    /// A `to` earlier than `from` yields negated components.
    pub fn between(from: NaiveDateTime, to: NaiveDateTime) -> Self {
        if to < from {
            return Self::between(to, from).negated();
        }

        let mut total_months = i64::from(to.year() - from.year()) * 12
            + i64::from(to.month())
            - i64::from(from.month());
        let mut anchor = add_months(from, total_months);
        if anchor > to {
            total_months -= 1;
            anchor = add_months(from, total_months);
        }

        Self {
            years: total_months / 12,
            months: total_months % 12,
            days: (to - anchor).num_days(),
        }
    }

    fn negated(self) -> Self {
        Self {
            years: -self.years,
            months: -self.months,
            days: -self.days,
        }
    }
}

impl fmt::Display for AccountAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} years, {} months, {} days",
            self.years, self.months, self.days
        )
    }
}

fn add_months(start: NaiveDateTime, months: i64) -> NaiveDateTime {
    u32::try_from(months)
        .ok()
        .and_then(|months| start.checked_add_months(Months::new(months)))
        .unwrap_or(NaiveDateTime::MAX)
}

/// Estimated creation instant and age of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeEstimate {
    pub created_at: NaiveDateTime,
    pub age: AccountAge,
}

impl AgeEstimate {
    /// Creation date as shown to users, e.g. `August 01, 2013`
    pub fn created_label(&self) -> String {
        self.created_at.format("%B %d, %Y").to_string()
    }
}

/// Reference point numerically closest to `user_id`
pub fn closest_reference(user_id: i64) -> &'static ReferencePoint {
    let points: &'static [ReferencePoint; 4] = &REFERENCE_POINTS;
    let mut closest = &points[0];
    for point in points.iter().skip(1) {
        if distance(point.id, user_id) < distance(closest.id, user_id) {
            closest = point;
        }
    }
    closest
}

fn distance(a: i64, b: i64) -> u128 {
    (i128::from(a) - i128::from(b)).unsigned_abs()
}

/// Interpolate the creation instant of `user_id` from the closest anchor
pub fn estimate_creation(user_id: i64) -> NaiveDateTime {
    let reference = closest_reference(user_id);
    let id_difference = i128::from(user_id) - i128::from(reference.id);
    let offset_ms = id_difference * MILLIS_PER_DAY / i128::from(IDS_PER_DAY);

    i64::try_from(offset_ms)
        .ok()
        .and_then(Duration::try_milliseconds)
        .and_then(|offset| reference.created_at.checked_add_signed(offset))
        .unwrap_or(if offset_ms < 0 {
            NaiveDateTime::MIN
        } else {
            NaiveDateTime::MAX
        })
}

/// Estimate creation instant and age of `user_id` as of `clock.now()`
pub fn estimate(user_id: i64, clock: &dyn Clock) -> AgeEstimate {
    let created_at = estimate_creation(user_id);
    AgeEstimate {
        created_at,
        age: AccountAge::between(created_at, clock.now()),
    }
}

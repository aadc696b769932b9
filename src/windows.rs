//! Time-window enumeration for bucketing archives.
//!
//! Windows are half-open `[start, end)`, emitted ascending, contiguous, and
//! non-overlapping. Month and year steps use calendar arithmetic, never
//! fixed-duration multiples, so month-length differences cannot drift.

use anyhow::{bail, Result};
use std::fmt;
use std::str::FromStr;
use time::{Date, Duration, Month, PrimitiveDateTime, Time};

/// Unit of one archive window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Granularity {
    Hour,
    Day,
    Month,
    Year,
}

impl FromStr for Granularity {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "h" => Ok(Self::Hour),
            "d" => Ok(Self::Day),
            "m" => Ok(Self::Month),
            "y" => Ok(Self::Year),
            other => bail!("unknown interval '{other}'; expected one of 'h', 'd', 'm', 'y'"),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Hour => "h",
            Self::Day => "d",
            Self::Month => "m",
            Self::Year => "y",
        };
        f.write_str(s)
    }
}

/// Half-open `[start, end)` bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: PrimitiveDateTime,
    pub end: PrimitiveDateTime,
}

/// Truncate `dt` down to the granularity boundary.
pub fn align_down(dt: PrimitiveDateTime, g: Granularity) -> PrimitiveDateTime {
    let date = dt.date();
    match g {
        Granularity::Hour => PrimitiveDateTime::new(
            date,
            Time::from_hms(dt.hour(), 0, 0).expect("hour already valid"),
        ),
        Granularity::Day => date.midnight(),
        Granularity::Month => first_of(date.year(), date.month()).midnight(),
        Granularity::Year => first_of(date.year(), Month::January).midnight(),
    }
}

fn first_of(year: i32, month: Month) -> Date {
    Date::from_calendar_date(year, month, 1).expect("day 1 exists in every month")
}

/// Start of the unit after `dt`, which must already be aligned.
fn step(dt: PrimitiveDateTime, g: Granularity) -> PrimitiveDateTime {
    match g {
        Granularity::Hour => dt + Duration::HOUR,
        Granularity::Day => dt + Duration::DAY,
        Granularity::Month => {
            let (year, month) = match dt.month() {
                Month::December => (dt.year() + 1, Month::January),
                m => (dt.year(), m.next()),
            };
            first_of(year, month).midnight()
        }
        Granularity::Year => first_of(dt.year() + 1, Month::January).midnight(),
    }
}

/// Enumerate one window per unit over `[align_down(start), align_down(end)]`,
/// both endpoint units included.
pub fn plan_windows(
    start: PrimitiveDateTime,
    end: PrimitiveDateTime,
    g: Granularity,
) -> Vec<TimeWindow> {
    let aligned_end = align_down(end, g);
    let mut cur = align_down(start, g);
    let mut windows = Vec::new();
    while cur <= aligned_end {
        let next = step(cur, g);
        windows.push(TimeWindow { start: cur, end: next });
        cur = next;
    }
    windows
}

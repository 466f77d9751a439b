// @file: src/utils/time.rs
// @description: Epoch to wall-clock conversion, calendar-day arithmetic and ISO-8601 bound checks.
// @author: LAS.

use chrono::{DateTime, Days, Local, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use std::fmt;
use std::str::FromStr;
use crate::error::{IngestError, Result};


//
// CLOCK ZONE
//

/// Zone used to turn epoch seconds into the naive wall-clock timestamps that
/// index every series. `Local` follows the host's timezone database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClockZone {
    #[default]
    Local,
    Named(Tz),
}

impl FromStr for ClockZone {
    type Err = IngestError;

    fn from_str(raw: &str) -> Result<Self> {
        let trimmed: &str = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("local") {
            return Ok(ClockZone::Local);
        }

        trimmed
            .parse::<Tz>()
            .map(ClockZone::Named)
            .map_err(|e| IngestError::Config(format!("Unknown timezone '{}': {}", trimmed, e)))
    }
}

impl fmt::Display for ClockZone {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClockZone::Local => write!(f, "local"),
            ClockZone::Named(tz) => write!(f, "{}", tz.name()),
        }
    }
}


//
// CONVERSIONS
//

/// Converts whole epoch seconds to a wall-clock timestamp in `zone`.
pub fn epoch_to_wall_clock(epoch: i64, zone: &ClockZone) -> Result<NaiveDateTime> {
    let utc: DateTime<Utc> = DateTime::<Utc>::from_timestamp(epoch, 0)
        .ok_or_else(|| IngestError::DateOutOfRange(format!("epoch {} is not representable", epoch)))?;

    let wall: NaiveDateTime = match zone {
        ClockZone::Local => utc.with_timezone(&Local).naive_local(),
        ClockZone::Named(tz) => utc.with_timezone(tz).naive_local(),
    };

    Ok(wall)
}

/// Same wall-clock time on the next calendar date.
pub fn next_calendar_day(moment: NaiveDateTime) -> Result<NaiveDateTime> {
    moment
        .checked_add_days(Days::new(1))
        .ok_or_else(|| IngestError::DateOutOfRange(format!("{} + 1 day overflows", moment)))
}

/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]` or a bare `YYYY-MM-DD`.
pub fn validate_time_bound(raw: &str) -> Result<()> {
    let value: &str = raw.trim();

    let accepted: bool = DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok();

    if accepted {
        Ok(())
    } else {
        Err(IngestError::InvalidTimeBound(format!("'{}' is not an ISO-8601 timestamp", raw)))
    }
}

//! Count start and end time
//!
//! Observations record 24-hour times (`730`, `0730`, `7:30`, `13:05`).
//! Destinations take a 12-hour clock with minutes in 15-minute steps.

use crate::{Error, Result};
use chrono::{NaiveTime, Timelike};
use serde::Serialize;
use std::fmt;

vocabulary! {
    pub enum Meridiem {
        Am => "AM",
        Pm => "PM",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportTime {
    /// 1..=12
    pub hour: u32,
    /// 0, 15, 30 or 45
    pub minute: u32,
    pub meridiem: Meridiem,
}

impl fmt::Display for ReportTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02} {}", self.hour, self.minute, self.meridiem)
    }
}

/// Parse a 24-hour time; malformed input is a `ValueFormat` error naming `field`
pub fn parse_count_time(field: &str, value: &str) -> Result<NaiveTime> {
    let trimmed = value.trim();
    let parsed = if trimmed.contains(':') {
        NaiveTime::parse_from_str(trimmed, "%H:%M")
    } else if trimmed.len() == 3 || trimmed.len() == 4 {
        NaiveTime::parse_from_str(&format!("{:0>4}", trimmed), "%H%M")
    } else {
        return Err(Error::value_format(field, trimmed));
    };
    parsed.map_err(|_| Error::value_format(field, trimmed))
}

/// Round to the nearest quarter hour and convert to a 12-hour clock
///
/// Rounding up to the hour carries into the next hour (23:53 becomes 12:00 AM).
pub fn report_time(time: NaiveTime) -> ReportTime {
    // round(minute / 15) * 15 without floating point
    let mut minute = (time.minute() * 2 + 15) / 30 * 15;
    let mut hour = time.hour();
    if minute == 60 {
        minute = 0;
        hour = (hour + 1) % 24;
    }

    let meridiem = if hour < 12 { Meridiem::Am } else { Meridiem::Pm };
    let hour = match hour % 12 {
        0 => 12,
        h => h,
    };

    ReportTime {
        hour,
        minute,
        meridiem,
    }
}

/// Optional observation value to a report time
pub fn translate_time(field: &str, value: Option<&str>) -> Result<Option<ReportTime>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_count_time(field, v).map(|t| Some(report_time(t))),
    }
}

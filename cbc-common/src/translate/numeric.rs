//! Numeric parsing and report rounding

use crate::{Error, Result};

/// Snow depth minimum used when only the maximum was recorded
pub const SNOW_DEPTH_MIN_DEFAULT: f64 = 0.0;
/// Snow depth maximum used when only the minimum was recorded
pub const SNOW_DEPTH_MAX_DEFAULT: f64 = 1.0;

/// Parse a finite number; anything else is a `ValueFormat` error naming `field`
pub fn parse_number(field: &str, value: &str) -> Result<f64> {
    let trimmed = value.trim();
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(Error::value_format(field, trimmed)),
    }
}

/// Like [`parse_number`], but absent or blank input is `None`
pub fn parse_optional_number(field: &str, value: Option<&str>) -> Result<Option<f64>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_number(field, v).map(Some),
    }
}

/// Nearest integer, halves rounded up toward positive infinity (2.5 -> 3, -2.5 -> -2)
pub fn round_for_report(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Optional numeric field rounded for a destination that rejects decimals
pub fn reported_number(field: &str, value: Option<&str>) -> Result<Option<i64>> {
    Ok(parse_optional_number(field, value)?.map(round_for_report))
}

/// One snow depth figure from independent min and max observations
///
/// Mean of min and max, rounded. A missing bound takes its default.
pub fn snow_depth_reported(min: Option<&str>, max: Option<&str>) -> Result<i64> {
    let min = parse_optional_number("snow depth min", min)?.unwrap_or(SNOW_DEPTH_MIN_DEFAULT);
    let max = parse_optional_number("snow depth max", max)?.unwrap_or(SNOW_DEPTH_MAX_DEFAULT);
    Ok(round_for_report((min + max) / 2.0))
}

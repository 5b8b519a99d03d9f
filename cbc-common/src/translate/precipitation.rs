//! Rain and snow composite
//!
//! Two independent observations per half-day period collapse into one
//! {type, intensity} value for destinations that record precipitation as a
//! single choice.

use super::vocab::PrecipitationLevel;
use serde::{Serialize, Serializer};
use std::fmt;

vocabulary! {
    pub enum PrecipitationType {
        Rain => "rain",
        Snow => "snow",
        Combination => "combination",
    }
}

vocabulary! {
    pub enum Intensity {
        Light => "light",
        Heavy => "heavy",
    }
}

impl Intensity {
    fn of(level: PrecipitationLevel) -> Option<Self> {
        match level {
            PrecipitationLevel::Light => Some(Intensity::Light),
            PrecipitationLevel::Heavy => Some(Intensity::Heavy),
            _ => None,
        }
    }
}

/// Composite precipitation for one period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precipitation {
    None,
    NotAvailable,
    Observed {
        kind: PrecipitationType,
        /// Absent when no observation carried an intensity
        intensity: Option<Intensity>,
    },
}

impl fmt::Display for Precipitation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precipitation::None => f.write_str("none"),
            Precipitation::NotAvailable => f.write_str("not available"),
            Precipitation::Observed {
                kind,
                intensity: Some(intensity),
            } => write!(f, "{} {}", intensity, kind),
            Precipitation::Observed {
                kind,
                intensity: None,
            } => write!(f, "{}", kind),
        }
    }
}

impl Serialize for Precipitation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Combine rain and snow for one period
///
/// Returns `None` when the pair is only partially known (for example rain
/// reported and snow never recorded); the caller decides whether that is fatal.
pub fn combine(
    rain: Option<PrecipitationLevel>,
    snow: Option<PrecipitationLevel>,
) -> Option<Precipitation> {
    use PrecipitationLevel as Level;

    let (rain, snow) = (rain?, snow?);
    match (rain, snow) {
        (Level::None, Level::None) => Some(Precipitation::None),
        (Level::Unknown, Level::Unknown) => Some(Precipitation::NotAvailable),
        (r, s) if r.is_present() && s.is_present() => Some(Precipitation::Observed {
            kind: PrecipitationType::Combination,
            // Heavy wins over light
            intensity: Intensity::of(r).max(Intensity::of(s)),
        }),
        (r, Level::None) if r.is_present() => Some(Precipitation::Observed {
            kind: PrecipitationType::Rain,
            intensity: Intensity::of(r),
        }),
        (Level::None, s) if s.is_present() => Some(Precipitation::Observed {
            kind: PrecipitationType::Snow,
            intensity: Intensity::of(s),
        }),
        _ => None,
    }
}

impl PartialOrd for Intensity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Intensity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        let rank = |i: &Intensity| match i {
            Intensity::Light => 0,
            Intensity::Heavy => 1,
        };
        rank(self).cmp(&rank(other))
    }
}

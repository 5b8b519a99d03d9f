//! MOU destination vocabulary
//!
//! The MOU form uses its own cloud and ice terms, compass abbreviations for
//! wind, one composite precipitation value per period and a single snow depth.

use super::precipitation::{combine, Precipitation};
use super::vocab::{CloudCover, PrecipitationLevel, WaterCondition, WindDirection};
use crate::{Error, Result};

vocabulary! {
    pub enum MouCloudCover {
        Clear => "clear",
        PartlyCloudy => "partly cloudy",
        Overcast => "overcast",
        LightFog => "light fog",
        ModerateFog => "moderate fog",
        NotAvailable => "not available",
    }
}

vocabulary! {
    pub enum MouWindDirection {
        North => "N",
        Northeast => "NE",
        East => "E",
        Southeast => "SE",
        South => "S",
        Southwest => "SW",
        West => "W",
        Northwest => "NW",
        Calm => "calm",
        Variable => "variable",
        NotAvailable => "not available",
    }
}

vocabulary! {
    pub enum MouIce {
        Frozen => "frozen",
        PartlyFrozen => "partly frozen",
        Open => "open",
        NotAvailable => "not available",
    }
}

pub fn cloud_cover(cover: Option<CloudCover>) -> MouCloudCover {
    match cover {
        Some(CloudCover::Clear) => MouCloudCover::Clear,
        Some(CloudCover::PartlyClear | CloudCover::PartlyCloudy) => MouCloudCover::PartlyCloudy,
        Some(CloudCover::Cloudy) => MouCloudCover::Overcast,
        Some(CloudCover::LocalFog) => MouCloudCover::LightFog,
        Some(CloudCover::Foggy) => MouCloudCover::ModerateFog,
        Some(CloudCover::Unknown) | None => MouCloudCover::NotAvailable,
    }
}

pub fn wind_direction(direction: Option<WindDirection>) -> MouWindDirection {
    match direction {
        Some(WindDirection::North) => MouWindDirection::North,
        Some(WindDirection::Northeast) => MouWindDirection::Northeast,
        Some(WindDirection::East) => MouWindDirection::East,
        Some(WindDirection::Southeast) => MouWindDirection::Southeast,
        Some(WindDirection::South) => MouWindDirection::South,
        Some(WindDirection::Southwest) => MouWindDirection::Southwest,
        Some(WindDirection::West) => MouWindDirection::West,
        Some(WindDirection::Northwest) => MouWindDirection::Northwest,
        Some(WindDirection::Calm) => MouWindDirection::Calm,
        Some(WindDirection::Variable) => MouWindDirection::Variable,
        Some(WindDirection::Unknown) | None => MouWindDirection::NotAvailable,
    }
}

/// Ice on still or moving water; "partly open" reads as partly frozen
pub fn ice(condition: Option<WaterCondition>) -> MouIce {
    match condition {
        Some(WaterCondition::Frozen) => MouIce::Frozen,
        Some(WaterCondition::PartlyFrozen | WaterCondition::PartlyOpen) => MouIce::PartlyFrozen,
        Some(WaterCondition::Open) => MouIce::Open,
        Some(WaterCondition::Unknown) | None => MouIce::NotAvailable,
    }
}

/// Composite precipitation, required for each period
pub fn precipitation(
    period: &str,
    rain: Option<PrecipitationLevel>,
    snow: Option<PrecipitationLevel>,
) -> Result<Precipitation> {
    combine(rain, snow).ok_or_else(|| {
        Error::MissingRequiredField(format!(
            "precipitation {}: rain and snow must both be recorded",
            period
        ))
    })
}

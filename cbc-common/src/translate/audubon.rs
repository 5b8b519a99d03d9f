//! Audubon destination vocabulary
//!
//! The Audubon form takes the normalized vocabulary nearly as is, with its own
//! "unknown" choices, and records precipitation as four independent
//! selections. `NotAvailable` means leave the field untouched.

use super::vocab::{CloudCover, PrecipitationLevel, WaterCondition, WindDirection};

vocabulary! {
    pub enum AudubonWindDirection {
        Unknown => "unknown",
        Calm => "calm",
        East => "east",
        North => "north",
        Northeast => "northeast",
        Northwest => "northwest",
        South => "south",
        Southeast => "southeast",
        Southwest => "southwest",
        West => "west",
        Variable => "variable",
        NotAvailable => "not available",
    }
}

vocabulary! {
    pub enum AudubonWater {
        Unknown => "unknown",
        Frozen => "frozen",
        Open => "open",
        PartlyFrozen => "partly frozen",
        PartlyOpen => "partly open",
        NotAvailable => "not available",
    }
}

vocabulary! {
    pub enum AudubonCloudCover {
        Unknown => "unknown",
        Clear => "clear",
        Cloudy => "cloudy",
        Foggy => "foggy",
        LocalFog => "local fog",
        PartlyClear => "partly clear",
        PartlyCloudy => "partly cloudy",
        NotAvailable => "not available",
    }
}

vocabulary! {
    /// One rain or snow checkbox group
    pub enum AudubonPrecipitation {
        None => "none",
        Light => "light",
        Heavy => "heavy",
        Unknown => "unknown",
    }
}

pub fn wind_direction(direction: Option<WindDirection>) -> AudubonWindDirection {
    match direction {
        Some(WindDirection::Unknown) => AudubonWindDirection::Unknown,
        Some(WindDirection::Calm) => AudubonWindDirection::Calm,
        Some(WindDirection::North) => AudubonWindDirection::North,
        Some(WindDirection::Northeast) => AudubonWindDirection::Northeast,
        Some(WindDirection::East) => AudubonWindDirection::East,
        Some(WindDirection::Southeast) => AudubonWindDirection::Southeast,
        Some(WindDirection::South) => AudubonWindDirection::South,
        Some(WindDirection::Southwest) => AudubonWindDirection::Southwest,
        Some(WindDirection::West) => AudubonWindDirection::West,
        Some(WindDirection::Northwest) => AudubonWindDirection::Northwest,
        Some(WindDirection::Variable) => AudubonWindDirection::Variable,
        None => AudubonWindDirection::NotAvailable,
    }
}

pub fn water(condition: Option<WaterCondition>) -> AudubonWater {
    match condition {
        Some(WaterCondition::Unknown) => AudubonWater::Unknown,
        Some(WaterCondition::Frozen) => AudubonWater::Frozen,
        Some(WaterCondition::Open) => AudubonWater::Open,
        Some(WaterCondition::PartlyFrozen) => AudubonWater::PartlyFrozen,
        Some(WaterCondition::PartlyOpen) => AudubonWater::PartlyOpen,
        None => AudubonWater::NotAvailable,
    }
}

pub fn cloud_cover(cover: Option<CloudCover>) -> AudubonCloudCover {
    match cover {
        Some(CloudCover::Unknown) => AudubonCloudCover::Unknown,
        Some(CloudCover::Clear) => AudubonCloudCover::Clear,
        Some(CloudCover::Cloudy) => AudubonCloudCover::Cloudy,
        Some(CloudCover::Foggy) => AudubonCloudCover::Foggy,
        Some(CloudCover::LocalFog) => AudubonCloudCover::LocalFog,
        Some(CloudCover::PartlyClear) => AudubonCloudCover::PartlyClear,
        Some(CloudCover::PartlyCloudy) => AudubonCloudCover::PartlyCloudy,
        None => AudubonCloudCover::NotAvailable,
    }
}

/// Absent, unrecognized or intensity-less observations select "unknown"
pub fn precipitation(level: Option<PrecipitationLevel>) -> AudubonPrecipitation {
    match level {
        Some(PrecipitationLevel::None) => AudubonPrecipitation::None,
        Some(PrecipitationLevel::Light) => AudubonPrecipitation::Light,
        Some(PrecipitationLevel::Heavy) => AudubonPrecipitation::Heavy,
        Some(PrecipitationLevel::Present | PrecipitationLevel::Unknown) | None => {
            AudubonPrecipitation::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_normalized_term_keeps_its_name() {
        for direction in WindDirection::ALL {
            assert_eq!(wind_direction(Some(*direction)).as_str(), direction.as_str());
        }
        for cover in CloudCover::ALL {
            assert_eq!(cloud_cover(Some(*cover)).as_str(), cover.as_str());
        }
        for condition in WaterCondition::ALL {
            assert_eq!(water(Some(*condition)).as_str(), condition.as_str());
        }
    }

    #[test]
    fn test_out_of_vocabulary_is_not_available() {
        assert_eq!(
            wind_direction(WindDirection::parse(Some("sideways"))),
            AudubonWindDirection::NotAvailable
        );
        assert_eq!(cloud_cover(None), AudubonCloudCover::NotAvailable);
    }

    #[test]
    fn test_precipitation_defaults_to_unknown() {
        assert_eq!(precipitation(None), AudubonPrecipitation::Unknown);
        assert_eq!(
            precipitation(Some(PrecipitationLevel::Present)),
            AudubonPrecipitation::Unknown
        );
        assert_eq!(
            precipitation(Some(PrecipitationLevel::Heavy)),
            AudubonPrecipitation::Heavy
        );
    }
}

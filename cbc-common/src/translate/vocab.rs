//! Normalized observation vocabulary
//!
//! The terms operators enter in the observations source. Parsing is by exact
//! match after trimming and lower-casing; anything else is out of vocabulary.

use crate::db::models::normalize;

vocabulary! {
    pub enum CloudCover {
        Clear => "clear",
        PartlyClear => "partly clear",
        PartlyCloudy => "partly cloudy",
        Cloudy => "cloudy",
        Foggy => "foggy",
        LocalFog => "local fog",
        Unknown => "unknown",
    }
}

vocabulary! {
    pub enum WindDirection {
        Unknown => "unknown",
        Calm => "calm",
        North => "north",
        Northeast => "northeast",
        East => "east",
        Southeast => "southeast",
        South => "south",
        Southwest => "southwest",
        West => "west",
        Northwest => "northwest",
        Variable => "variable",
    }
}

vocabulary! {
    /// Still or moving water condition
    pub enum WaterCondition {
        Unknown => "unknown",
        Frozen => "frozen",
        Open => "open",
        PartlyFrozen => "partly frozen",
        PartlyOpen => "partly open",
    }
}

vocabulary! {
    /// One rain or snow observation for a half-day period
    pub enum PrecipitationLevel {
        None => "none",
        Light => "light",
        Heavy => "heavy",
        /// Observed without an intensity
        Present => "present",
        Unknown => "unknown",
    }
}

impl CloudCover {
    pub fn parse(value: Option<&str>) -> Option<Self> {
        value.and_then(|v| Self::from_term(&normalize(v)))
    }
}

impl WindDirection {
    /// Full names or compass abbreviations
    pub fn parse(value: Option<&str>) -> Option<Self> {
        let term = normalize(value?);
        Self::from_term(&term).or(match term.as_str() {
            "n" => Some(WindDirection::North),
            "ne" => Some(WindDirection::Northeast),
            "e" => Some(WindDirection::East),
            "se" => Some(WindDirection::Southeast),
            "s" => Some(WindDirection::South),
            "sw" => Some(WindDirection::Southwest),
            "w" => Some(WindDirection::West),
            "nw" => Some(WindDirection::Northwest),
            _ => None,
        })
    }
}

impl WaterCondition {
    pub fn parse(value: Option<&str>) -> Option<Self> {
        value.and_then(|v| Self::from_term(&normalize(v)))
    }
}

impl PrecipitationLevel {
    pub fn parse(value: Option<&str>) -> Option<Self> {
        let term = normalize(value?);
        Self::from_term(&term).or(match term.as_str() {
            "yes" => Some(PrecipitationLevel::Present),
            "no" => Some(PrecipitationLevel::None),
            _ => None,
        })
    }

    /// Light, heavy or present
    pub fn is_present(self) -> bool {
        matches!(
            self,
            PrecipitationLevel::Light | PrecipitationLevel::Heavy | PrecipitationLevel::Present
        )
    }
}

use std::fmt;
use std::str::FromStr;

use crate::OrbitError;

/// Where along an orbit an impulse is notionally applied.
///
/// `Unspecified` stands for the semi-major-axis reference: radius `a` and
/// speed `h/a`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ManeuverPoint {
    #[default]
    Unspecified = 0,
    Periapsis = 1,
    Apoapsis = 2,
}

impl TryFrom<u8> for ManeuverPoint {
    type Error = OrbitError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Unspecified),
            1 => Ok(Self::Periapsis),
            2 => Ok(Self::Apoapsis),
            other => Err(OrbitError::UnknownManeuverPoint(other.to_string())),
        }
    }
}

impl FromStr for ManeuverPoint {
    type Err = OrbitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unspecified" | "sma" => Ok(Self::Unspecified),
            "periapsis" | "pe" => Ok(Self::Periapsis),
            "apoapsis" | "ap" => Ok(Self::Apoapsis),
            _ => Err(OrbitError::UnknownManeuverPoint(s.to_string())),
        }
    }
}

impl fmt::Display for ManeuverPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unspecified => "unspecified",
            Self::Periapsis => "periapsis",
            Self::Apoapsis => "apoapsis",
        };
        f.write_str(label)
    }
}

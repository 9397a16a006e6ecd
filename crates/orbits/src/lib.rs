//! Two-body conic orbits about a catalog of celestial bodies.
//!
//! An [`Orbit`] is an immutable elliptic or hyperbolic conic about a parent
//! [`Body`]. Points along it are resolved from true anomaly, mean anomaly or
//! elapsed time through the [`anomaly`] module, and pairs of orbits sharing a
//! parent can be searched for their next Hohmann transfer window.

pub mod anomaly;
pub mod body;
pub mod orbit;
pub mod point;
mod window;

pub use anomaly::OrbitPoint;
pub use body::{Body, PlanetarySystem};
pub use orbit::{Conic, Orbit, OrbitalElements};
pub use point::ManeuverPoint;
pub use window::WINDOW_PHASE_TOLERANCE_RAD;

use thiserror::Error;

/// Construction and precondition failures raised by orbits and bodies.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrbitError {
    #[error("semi-major axis must be a finite length greater than 0 m (got {0} m)")]
    NonPositiveSemiMajorAxis(f64),
    #[error("eccentricity must be a non-negative number (got {0})")]
    InvalidEccentricity(f64),
    #[error("parabolic orbits are unsupported")]
    Parabolic,
    #[error("eccentricity {eccentricity} is not {expected}")]
    EccentricityMismatch { eccentricity: f64, expected: Conic },
    #[error("hyperbolic orbits have no apoapsis point")]
    NoApoapsis,
    #[error("'{0}' is not a valid orbital maneuver point")]
    UnknownManeuverPoint(String),
    #[error("invalid body '{name}': {reason}")]
    InvalidBody { name: String, reason: &'static str },
    #[error("body '{0}' not found in planetary system")]
    UnknownBody(String),
    #[error("body '{0}' already exists in planetary system")]
    DuplicateBody(String),
    #[error("parent '{parent}' of body '{name}' does not exist in this system")]
    MissingParent { name: String, parent: String },
}

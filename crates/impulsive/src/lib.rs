//! Impulsive maneuver calculus on top of `conic_orbits`, plus classical transfer approximations.

pub mod maneuver;
pub mod transfers;

pub use maneuver::{Maneuver, ManeuverError, ManeuverKind};
pub use transfers::{HohmannResult, hohmann};

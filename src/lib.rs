//! Patched-conic mission planning.
//!
//! The engine lives in the workspace crates; this crate re-exports them so
//! front-ends (the `mission` and `windows` binaries, integration tests) can
//! depend on a single library.

pub use conic_config as config;
pub use conic_core as common;
pub use conic_export as export;
pub use conic_impulsive as impulsive;
pub use conic_mission as mission;
pub use conic_orbits as orbits;
pub use conic_propulsion as propulsion;

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

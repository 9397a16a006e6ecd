//! Analytic estimators for impulsive transfers in the coplanar, circular limit.
//!
//! Used as a cross-check on the general maneuver calculus and for quick survey output.

use std::f64::consts::PI;
use std::sync::Arc;

use conic_orbits::{Body, ManeuverPoint, Orbit, OrbitError};

/// Result for a Hohmann transfer between circular, coplanar orbits of radii r1 and r2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HohmannResult {
    pub dv1_m_s: f64,      // signed: negative for inward (retro) burn
    pub dv2_m_s: f64,      // signed: negative for retro capture when arriving inward
    pub dv_total_m_s: f64, // |dv1| + |dv2|
    pub tof_seconds: f64,
}

/// Compute the classical Hohmann transfer between two circular coplanar orbits
/// about `parent`.
///
/// Inputs:
/// - `r1_m`: initial circular orbit radius (m)
/// - `r2_m`: target circular orbit radius (m)
///
/// Fails when either radius is not strictly positive.
pub fn hohmann(parent: &Arc<Body>, r1_m: f64, r2_m: f64) -> Result<HohmannResult, OrbitError> {
    let departure = Orbit::circular_from_radius(Arc::clone(parent), r1_m)?;
    let arrival = Orbit::circular_from_radius(Arc::clone(parent), r2_m)?;
    let transfer = Orbit::elliptic_from_radii(Arc::clone(parent), r1_m.min(r2_m), r1_m.max(r2_m))?;

    // Transfer speeds at r1 and r2
    let pe_speed = transfer.periapsis_speed_m_s();
    let ap_speed = transfer.speed_at(ManeuverPoint::Apoapsis)?;
    let (v_t1, v_t2) = if r1_m <= r2_m {
        (pe_speed, ap_speed)
    } else {
        (ap_speed, pe_speed)
    };

    let dv1 = v_t1 - departure.periapsis_speed_m_s();
    let dv2 = arrival.periapsis_speed_m_s() - v_t2;

    Ok(HohmannResult {
        dv1_m_s: dv1,
        dv2_m_s: dv2,
        dv_total_m_s: dv1.abs() + dv2.abs(),
        tof_seconds: PI / transfer.mean_motion_rad_s(),
    })
}

use std::sync::Arc;

use conic_planner::config::load_system;
use conic_planner::impulsive::{Maneuver, ManeuverKind, hohmann};
use conic_planner::orbits::{ManeuverPoint, Orbit, PlanetarySystem};

fn kerbol() -> PlanetarySystem {
    load_system("configs/bodies").expect("catalog")
}

/// Vis-viva burn from a circular orbit of radius `r` onto a hyperbola with the given excess speed.
fn circular_to_hyperbolic(mu: f64, r: f64, excess: f64) -> f64 {
    (excess * excess + 2.0 * mu / r).sqrt() - (mu / r).sqrt()
}

#[test]
fn hohmann_symmetry_and_time_match() {
    let system = kerbol();
    let sun = system.get("Kerbol").unwrap();
    let r1 = system.get("Kerbin").unwrap().orbit.as_ref().unwrap().semi_major_axis_m();
    let r2 = system.get("Duna").unwrap().orbit.as_ref().unwrap().semi_major_axis_m();
    let h12 = hohmann(sun, r1, r2).unwrap();
    let h21 = hohmann(sun, r2, r1).unwrap();

    assert!((h12.dv_total_m_s - h21.dv_total_m_s).abs() < 1e-6);
    assert!((h12.tof_seconds - h21.tof_seconds).abs() < 1e-6);
    assert!(h12.dv1_m_s > 0.0);
    assert!(h21.dv1_m_s < 0.0);
}

#[test]
fn escape_from_a_circular_planet_matches_the_patched_estimate() {
    let system = kerbol();
    let kerbin = system.get("Kerbin").unwrap();
    let duna_a = system.get("Duna").unwrap().orbit.as_ref().unwrap().semi_major_axis_m();
    let parking = Orbit::circular_from_altitude(Arc::clone(kerbin), 100_000.0).unwrap();

    let escape = Maneuver::escape(
        &parking,
        duna_a,
        ManeuverPoint::Periapsis,
        ManeuverPoint::Unspecified,
    )
    .unwrap();
    let kerbin_orbit = kerbin.orbit.as_ref().unwrap();
    let excess = hohmann(kerbin_orbit.parent(), kerbin_orbit.semi_major_axis_m(), duna_a)
        .unwrap()
        .dv1_m_s
        .abs();
    let estimate = circular_to_hyperbolic(kerbin.mu_m3_s2, parking.periapsis_radius_m(), excess);

    assert_eq!(escape.kind, ManeuverKind::Escape);
    assert!((escape.delta_v_m_s - estimate).abs() < 1e-6, "{} vs {estimate}", escape.delta_v_m_s);
    assert_eq!(escape.next.parent().name, "Kerbol");
    let leg = escape.escape_leg.as_ref().unwrap();
    assert!((leg.excess_speed_m_s().unwrap() - excess).abs() < 1e-6);
}

#[test]
fn mun_capture_matches_the_patched_estimate() {
    let system = kerbol();
    let kerbin = system.get("Kerbin").unwrap();
    let mun = system.get("Mun").unwrap();
    let source = kerbin.radius_from_altitude(80_000.0);
    let parking = Orbit::circular_from_altitude(Arc::clone(mun), 20_000.0).unwrap();

    let capture = Maneuver::capture(source, &parking, ManeuverPoint::Unspecified).unwrap();
    let mun_a = mun.orbit.as_ref().unwrap().semi_major_axis_m();
    let excess = hohmann(kerbin, source, mun_a).unwrap().dv2_m_s.abs();
    let estimate = circular_to_hyperbolic(mun.mu_m3_s2, parking.periapsis_radius_m(), excess);

    assert!((capture.delta_v_m_s - estimate).abs() < 1e-6, "{} vs {estimate}", capture.delta_v_m_s);
    assert_eq!(capture.initial.parent().name, "Kerbin");
    assert_eq!(capture.next, parking);
    assert!(capture.capture_leg.as_ref().unwrap().is_hyperbolic());
}

#[test]
fn eve_assist_patches_two_heliocentric_legs() {
    let system = kerbol();
    let eve = system.get("Eve").unwrap();
    let kerbin_a = system.get("Kerbin").unwrap().orbit.as_ref().unwrap().semi_major_axis_m();
    let moho_a = system.get("Moho").unwrap().orbit.as_ref().unwrap().semi_major_axis_m();

    let assist = Maneuver::gravity_assist(
        kerbin_a,
        eve,
        200_000.0,
        moho_a,
        ManeuverPoint::Unspecified,
    )
    .unwrap();

    assert_eq!(assist.kind, ManeuverKind::GravityAssist);
    assert!(assist.delta_v_m_s >= 0.0);
    assert_eq!(assist.initial.parent().name, "Kerbol");
    assert_eq!(assist.next.parent().name, "Kerbol");
    let inbound = assist.capture_leg.as_ref().unwrap();
    let outbound = assist.escape_leg.as_ref().unwrap();
    assert_eq!(inbound.parent().name, "Eve");
    assert!((inbound.periapsis().altitude_m - 200_000.0).abs() < 1e-3);
    assert!((outbound.periapsis_radius_m() - inbound.periapsis_radius_m()).abs() < 1e-3);
    assert!(
        (assist.delta_v_m_s
            - (inbound.periapsis_speed_m_s() - outbound.periapsis_speed_m_s()).abs())
        .abs()
            < 1e-9
    );
}

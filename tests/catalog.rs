use conic_planner::config::{BodyConfig, build_system, load_bodies, load_system, load_vessel_configs};
use conic_planner::orbits::WINDOW_PHASE_TOLERANCE_RAD;

const BODIES: &str = "configs/bodies";

#[test]
fn shipped_catalog_builds_the_kerbol_system() {
    let system = load_system(BODIES).expect("catalog");
    assert_eq!(system.len(), 17);

    let roots: Vec<_> = system.roots().map(|b| b.name.as_str()).collect();
    assert_eq!(roots, ["Kerbol"]);

    let planets = system.children("Kerbol").unwrap();
    assert_eq!(planets.len(), 7);
    assert_eq!(system.children("Jool").unwrap().len(), 5);

    let mut siblings: Vec<_> = system
        .siblings("Kerbin")
        .unwrap()
        .into_iter()
        .map(|b| b.name.clone())
        .collect();
    siblings.sort();
    assert_eq!(siblings, ["Dres", "Duna", "Eeloo", "Eve", "Jool", "Moho"]);
}

#[test]
fn spheres_of_influence_match_known_values() {
    let system = load_system(BODIES).unwrap();
    let kerbin = system.get("Kerbin").unwrap();
    assert!((kerbin.sphere_of_influence_m() / 1_000.0 - 84_159.0).abs() < 1.0);
    let mun = system.get("mun").unwrap();
    assert!((mun.sphere_of_influence_m() / 1_000.0 - 2_429.6).abs() < 0.5);
    assert!(system.get("Kerbol").unwrap().sphere_of_influence_m().is_infinite());

    let stable = system.stable_apoapsis_radius_m("Kerbin").unwrap();
    let mun_orbit = mun.orbit.as_ref().unwrap();
    assert!((stable - (mun_orbit.periapsis_radius_m() - mun.sphere_of_influence_m())).abs() < 1e-6);
}

#[test]
fn kerbin_orbit_is_circular_and_starts_at_half_turn() {
    let system = load_system(BODIES).unwrap();
    let orbit = system.get("Kerbin").unwrap().orbit.as_ref().unwrap();
    assert!(orbit.is_circular());
    assert!((orbit.mean_anomaly_at_epoch_rad() - std::f64::consts::PI).abs() < 1e-12);
    assert!((orbit.semi_major_axis_m() - 13_599_840_256.0).abs() < 1e-3);
    // Kerbin's sidereal year is 9,203,545 s
    assert!((orbit.period_s().unwrap() - 9_203_545.0).abs() < 10.0);
}

#[test]
fn catalog_records_survive_a_toml_round_trip() {
    let records = load_bodies(BODIES).unwrap();
    let back: Vec<BodyConfig> = records
        .iter()
        .map(|r| toml::from_str(&toml::to_string(r).unwrap()).unwrap())
        .collect();
    assert_eq!(back, records);
    assert_eq!(build_system(&back).unwrap().len(), 17);
}

#[test]
fn shipped_vessels_load() {
    let vessels = load_vessel_configs("configs/vessels").unwrap();
    assert_eq!(vessels.len(), 6);
    for config in &vessels {
        let vessel = config.to_vessel().unwrap();
        assert!(vessel.available_delta_v_m_s() > 0.0, "{}", vessel.name);
    }
}

#[test]
fn every_kerbin_sibling_has_a_window_that_lines_up() {
    let system = load_system(BODIES).unwrap();
    let kerbin = system.get("Kerbin").unwrap().orbit.as_ref().unwrap();
    for since in [0.0, 1.0e6, 3.3e7] {
        for sibling in system.siblings("Kerbin").unwrap() {
            let target = sibling.orbit.as_ref().unwrap();
            let wait = kerbin
                .next_transfer_window_s(target, since)
                .unwrap_or_else(|| panic!("{} from {since}", sibling.name));
            assert!(wait >= 0.0);
            assert!(wait <= 1.5 * kerbin.synodic_period_s(target).unwrap());
            let error = kerbin.transfer_phase_error_rad(target, since + wait).unwrap();
            assert!(
                error.abs() <= WINDOW_PHASE_TOLERANCE_RAD,
                "{} from {since}: wait {wait} error {error}",
                sibling.name
            );
        }
    }
}

//! Configuration models and loaders for the conic planner.
//!
//! Files speak kilometres and degrees; everything handed to the rest of the
//! workspace is converted to SI at load time.

pub mod bodies;
pub mod mission;

use std::fs::File;
use std::path::{Path, PathBuf};

use conic_orbits::{OrbitError, PlanetarySystem};
use conic_propulsion::PropulsionError;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub use bodies::{BodyConfig, OrbitConfig, build_system};
pub use mission::{
    CalendarConfig, EngineConfig, MissionScript, StartConfig, StepAction, StepConfig,
    VesselConfig,
};

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid orbit or body: {0}")]
    Orbit(#[from] OrbitError),
    #[error("invalid vessel: {0}")]
    Propulsion(#[from] PropulsionError),
    #[error("body '{0}' needs either `mu_m3_s2` or `mass_kg`")]
    MissingGravity(String),
    #[error("body '{0}' has an orbit but no parent")]
    OrbitWithoutParent(String),
    #[error("body '{0}' has a parent but no orbit")]
    ParentWithoutOrbit(String),
    #[error("parent '{parent}' of body '{name}' is not in the catalog")]
    UnknownParent { name: String, parent: String },
    #[error("body '{0}' is defined more than once")]
    DuplicateBody(String),
    #[error("bodies {0:?} form a parent cycle")]
    ParentCycle(Vec<String>),
    #[error("calendar needs positive day and year lengths")]
    InvalidCalendar,
}

/// Load body records from a YAML list, a single TOML file, or a directory of TOML files.
pub fn load_bodies<P: AsRef<Path>>(path: P) -> Result<Vec<BodyConfig>, ConfigError> {
    load_records(path)
}

/// Load a body catalog and build the planetary system it describes.
pub fn load_system<P: AsRef<Path>>(path: P) -> Result<PlanetarySystem, ConfigError> {
    let path = path.as_ref();
    let records = load_bodies(path)?;
    let system = build_system(&records)?;
    debug!(path = %path.display(), bodies = system.len(), "loaded planetary system");
    Ok(system)
}

/// Load vessel configurations from a YAML file or a directory of TOML files.
pub fn load_vessel_configs<P: AsRef<Path>>(path: P) -> Result<Vec<VesselConfig>, ConfigError> {
    load_records(path)
}

/// Load a mission script (TOML, or YAML for any other extension).
pub fn load_mission_script<P: AsRef<Path>>(path: P) -> Result<MissionScript, ConfigError> {
    load_single(path)
}

/// Load a standalone calendar definition.
pub fn load_calendar<P: AsRef<Path>>(path: P) -> Result<CalendarConfig, ConfigError> {
    load_single(path)
}

fn is_toml(path: &Path) -> bool {
    path.extension().map(|ext| ext == "toml").unwrap_or(false)
}

fn load_single<T, P>(path: P) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if is_toml(path) {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if is_toml(path) {
        let contents = std::fs::read_to_string(path)?;
        let record: T = toml::from_str(&contents)?;
        Ok(vec![record])
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_toml(path))
        .collect();
    entries.sort();
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        let record: T = toml::from_str(&contents)?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const STAR: &str = r#"
name = "Kerbol"
mass_kg = 1.7565459e28
radius_km = 261600.0
atmosphere_height_km = 600.0
"#;

    const PLANET: &str = r#"
name = "Kerbin"
parent = "Kerbol"
mass_kg = 5.2915158e22
radius_km = 600.0
atmosphere_height_km = 70.0

[orbit]
semi_major_axis_km = 13599840.256
mean_anomaly_at_epoch_rad = 3.14
"#;

    #[test]
    fn directory_of_toml_files_in_any_order() {
        let dir = tempfile::tempdir().unwrap();
        // sorted file order puts the child first
        std::fs::write(dir.path().join("a_kerbin.toml"), PLANET).unwrap();
        std::fs::write(dir.path().join("b_kerbol.toml"), STAR).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let system = load_system(dir.path()).unwrap();
        assert_eq!(system.len(), 2);
        let kerbin = system.get("Kerbin").unwrap();
        assert_eq!(kerbin.parent().unwrap().name, "Kerbol");
        assert!((kerbin.radius_m - 600_000.0).abs() < 1e-9);
        assert!((kerbin.atmosphere_height_m - 70_000.0).abs() < 1e-9);
    }

    #[test]
    fn yaml_list_of_bodies() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "- name: Earth\n  mu_m3_s2: 3.986e14\n  radius_km: 6371.0\n\
             - name: Moon\n  parent: Earth\n  mu_m3_s2: 4.9048695e12\n  radius_km: 1737.4\n  \
             orbit:\n    semi_major_axis_km: 384400.0\n    eccentricity: 0.0549\n    inclination_deg: 5.145"
        )
        .unwrap();

        let records = load_bodies(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        let system = build_system(&records).unwrap();
        let moon = system.get("moon").unwrap();
        let orbit = moon.orbit.as_ref().unwrap();
        assert!((orbit.inclination_rad().to_degrees() - 5.145).abs() < 1e-9);
        assert!((orbit.semi_major_axis_m() - 384_400_000.0).abs() < 1e-3);
    }

    #[test]
    fn unreadable_paths_surface_io_errors() {
        let err = load_bodies("does/not/exist.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.toml"), "name = ").unwrap();
        assert!(matches!(load_bodies(dir.path()), Err(ConfigError::Toml(_))));
    }
}

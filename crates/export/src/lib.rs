//! Export helpers for mission ledgers.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to open export target: {0}")]
    Io(#[from] io::Error),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

pub mod ledger {
    use std::io::Write;

    use conic_core::units::m_to_km;
    use conic_mission::{EntryAction, Mission};
    use conic_orbits::Orbit;
    use serde::Serialize;

    use crate::ExportError;

    /// One CSV/JSON row per ledger entry.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct LedgerRow {
        pub index: usize,
        pub description: String,
        pub action: String,
        pub body: String,
        pub point: String,
        pub delta_v_m_s: f64,
        pub burn_time_s: Option<f64>,
        pub propellant_used_kg: f64,
        pub mass_after_kg: f64,
        pub delta_v_remaining_m_s: f64,
        pub periapsis_altitude_km: f64,
        /// Empty for hyperbolic orbits.
        pub apoapsis_altitude_km: Option<f64>,
    }

    /// Flatten a mission into rows. Payload drops report the orbit they happen on.
    pub fn rows(mission: &Mission) -> Vec<LedgerRow> {
        let mut rows = Vec::with_capacity(mission.entries().len());
        let mut orbit: Option<&Orbit> = None;
        for (index, entry) in mission.entries().iter().enumerate() {
            let (action, point) = match &entry.action {
                EntryAction::Orbital { maneuver, .. } => {
                    orbit = Some(&maneuver.next);
                    (maneuver.kind.to_string(), maneuver.point.to_string())
                }
                EntryAction::PayloadDrop { .. } => ("payload drop".to_string(), String::new()),
            };
            let current = orbit.unwrap_or(mission.orbit());
            let body = current.parent();
            rows.push(LedgerRow {
                index,
                description: entry.description.clone(),
                action,
                body: body.name.clone(),
                point,
                delta_v_m_s: entry.delta_v_m_s,
                burn_time_s: entry.duration_s,
                propellant_used_kg: entry.used_propellant_kg(),
                mass_after_kg: entry.next_vessel.mass_kg(),
                delta_v_remaining_m_s: entry.next_vessel.available_delta_v_m_s(),
                periapsis_altitude_km: m_to_km(body.altitude_from_radius(current.periapsis_radius_m())),
                apoapsis_altitude_km: current
                    .apoapsis()
                    .map(|ap| m_to_km(ap.altitude_m)),
            });
        }
        rows
    }

    /// Write the ledger as CSV with a header row.
    pub fn write_csv<W: Write>(writer: W, mission: &Mission) -> Result<(), ExportError> {
        let mut csv = csv::Writer::from_writer(writer);
        for row in rows(mission) {
            csv.serialize(row)?;
        }
        csv.flush()?;
        Ok(())
    }
}

pub mod summary {
    use std::io::Write;

    use conic_mission::Mission;
    use serde::Serialize;

    use crate::ExportError;
    use crate::ledger::{LedgerRow, rows};

    /// JSON document for a whole mission.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct MissionSummary {
        pub name: String,
        pub vessel: String,
        pub feasible: bool,
        pub total_delta_v_m_s: f64,
        pub total_burn_time_s: Option<f64>,
        pub total_propellant_kg: f64,
        pub final_mass_kg: f64,
        pub final_orbit: String,
        pub entries: Vec<LedgerRow>,
    }

    impl MissionSummary {
        pub fn new(mission: &Mission) -> Self {
            Self {
                name: mission.description().to_string(),
                vessel: mission.vessel().name.clone(),
                feasible: mission.is_feasible(),
                total_delta_v_m_s: mission.total_delta_v_m_s(),
                total_burn_time_s: mission.total_burn_time_s(),
                total_propellant_kg: mission.total_propellant_kg(),
                final_mass_kg: mission.vessel().mass_kg(),
                final_orbit: mission.orbit().to_string(),
                entries: rows(mission),
            }
        }
    }

    pub fn write_json<W: Write>(mut writer: W, mission: &Mission) -> Result<(), ExportError> {
        serde_json::to_writer_pretty(&mut writer, &MissionSummary::new(mission))?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use conic_impulsive::Maneuver;
    use conic_mission::Mission;
    use conic_orbits::{Body, Orbit};
    use conic_propulsion::{Engine, Vessel};

    use super::*;

    fn mission() -> Mission {
        let kerbin =
            Arc::new(Body::from_mass("Kerbin", 5.2915158e22, 600_000.0, 70_000.0, None).unwrap());
        let orbit = Orbit::circular_from_altitude(kerbin, 80_000.0).unwrap();
        let vessel =
            Vessel::new("Scout", Engine::new(345.0, 60_000.0).unwrap(), 1_000.0, 500.0).unwrap();
        let mut mission = Mission::new("Export", vessel, orbit.clone());
        mission.add_maneuver(Maneuver::change_apoapsis(&orbit, 1_000_000.0).unwrap(), "Raise");
        mission.add_payload_drop(100.0, "Drop").unwrap();
        mission
    }

    #[test]
    fn rows_follow_the_ledger() {
        let mission = mission();
        let rows = ledger::rows(&mission);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].action, "identity");
        assert_eq!(rows[1].action, "change apoapsis");
        assert_eq!(rows[1].point, "periapsis");
        assert!((rows[1].apoapsis_altitude_km.unwrap() - 400.0).abs() < 1e-6);
        assert_eq!(rows[2].action, "payload drop");
        assert_eq!(rows[2].body, "Kerbin");
        assert_eq!(rows[2].periapsis_altitude_km, rows[1].periapsis_altitude_km);
        assert!((rows[1].mass_after_kg - rows[2].mass_after_kg - 100.0).abs() < 1e-9);
    }

    #[test]
    fn csv_has_a_header_and_one_line_per_entry() {
        let mut buffer = Vec::new();
        ledger::write_csv(&mut buffer, &mission()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("index,description,action,body,point,delta_v_m_s"));
        assert!(lines[3].contains("Drop"));
    }

    #[test]
    fn json_summary_writes_to_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ledger.json");
        let writer = writer_for_path(&path).unwrap();
        summary::write_json(writer, &mission()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["name"], "Export");
        assert_eq!(value["feasible"], true);
        assert_eq!(value["entries"].as_array().unwrap().len(), 3);
    }
}

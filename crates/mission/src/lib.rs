//! Ordered mission ledgers.
//!
//! A [`Mission`] starts with an identity entry on the starting orbit and then
//! records, in order, every maneuver and payload drop applied to the vessel.
//! Orbital entries split their impulse into two equal half burns centred on the
//! maneuver point.

pub mod script;

use std::fmt;

use conic_config::ConfigError;
use conic_impulsive::{Maneuver, ManeuverError, ManeuverKind};
use conic_orbits::{Orbit, OrbitError};
use conic_propulsion::{PropulsionError, Vessel, VesselBurn};
use thiserror::Error;
use tracing::{debug, warn};

pub use script::run_script;

/// Description given to the first ledger entry.
pub const INITIAL_DESCRIPTION: &str = "Initial";

#[derive(Debug, Error)]
pub enum MissionError {
    #[error("maneuver failed: {0}")]
    Maneuver(#[from] ManeuverError),
    #[error(transparent)]
    Orbit(#[from] OrbitError),
    #[error("vessel update failed: {0}")]
    Propulsion(#[from] PropulsionError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("step {index}: {reason}")]
    InvalidStep { index: usize, reason: String },
    #[error("step {index} ({description}) failed: {source}")]
    Step {
        index: usize,
        description: String,
        #[source]
        source: Box<MissionError>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryAction {
    /// An impulsive maneuver flown as two half burns.
    Orbital {
        maneuver: Maneuver,
        burns: [VesselBurn; 2],
    },
    PayloadDrop { mass_kg: f64 },
}

/// One line of the mission ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionEntry {
    pub description: String,
    pub initial_vessel: Vessel,
    pub next_vessel: Vessel,
    pub delta_v_m_s: f64,
    /// `None` when a burn of this entry never completes.
    pub duration_s: Option<f64>,
    pub action: EntryAction,
}

impl MissionEntry {
    pub fn orbital(vessel: &Vessel, maneuver: Maneuver, description: impl Into<String>) -> Self {
        let half = maneuver.delta_v_m_s / 2.0;
        let first = vessel.burn(half, 1.0);
        let second = first.final_vessel().burn(half, 1.0);
        let duration_s = match (first.duration_s, second.duration_s) {
            (Some(a), Some(b)) => Some(a + b),
            _ => None,
        };
        Self {
            description: description.into(),
            initial_vessel: vessel.clone(),
            next_vessel: second.final_vessel(),
            delta_v_m_s: maneuver.delta_v_m_s,
            duration_s,
            action: EntryAction::Orbital {
                maneuver,
                burns: [first, second],
            },
        }
    }

    pub fn payload_drop(
        vessel: &Vessel,
        mass_kg: f64,
        description: impl Into<String>,
    ) -> Result<Self, MissionError> {
        Ok(Self {
            description: description.into(),
            initial_vessel: vessel.clone(),
            next_vessel: vessel.remove_dry_mass(mass_kg)?,
            delta_v_m_s: 0.0,
            duration_s: Some(0.0),
            action: EntryAction::PayloadDrop { mass_kg },
        })
    }

    pub fn maneuver(&self) -> Option<&Maneuver> {
        match &self.action {
            EntryAction::Orbital { maneuver, .. } => Some(maneuver),
            EntryAction::PayloadDrop { .. } => None,
        }
    }

    pub fn used_propellant_kg(&self) -> f64 {
        self.initial_vessel.propellant_mass_kg - self.next_vessel.propellant_mass_kg
    }

    pub fn is_complete(&self) -> bool {
        self.duration_s.is_some()
    }
}

impl fmt::Display for MissionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.action {
            EntryAction::Orbital { maneuver, .. } => write!(f, "{}: {maneuver}", self.description)?,
            EntryAction::PayloadDrop { mass_kg } => {
                write!(f, "{}: drop {mass_kg:.1} kg", self.description)?
            }
        }
        match self.duration_s {
            Some(s) => write!(f, ", {s:.1} s"),
            None => write!(f, ", never completes"),
        }
    }
}

/// Ordered log of everything that happens to one vessel.
#[derive(Debug, Clone, PartialEq)]
pub struct Mission {
    description: String,
    entries: Vec<MissionEntry>,
    orbit: Orbit,
}

impl Mission {
    pub fn new(description: impl Into<String>, vessel: Vessel, orbit: Orbit) -> Self {
        let initial = MissionEntry::orbital(&vessel, Maneuver::identity(&orbit), INITIAL_DESCRIPTION);
        Self {
            description: description.into(),
            entries: vec![initial],
            orbit,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn entries(&self) -> &[MissionEntry] {
        &self.entries
    }

    /// The vessel after the last entry.
    pub fn vessel(&self) -> &Vessel {
        // `new` always pushes the initial entry
        &self.entries[self.entries.len() - 1].next_vessel
    }

    /// The resulting orbit of the last orbital entry.
    pub fn orbit(&self) -> &Orbit {
        &self.orbit
    }

    pub fn add_maneuver(&mut self, maneuver: Maneuver, description: impl Into<String>) -> &mut Self {
        let joins_patch = matches!(
            maneuver.kind,
            ManeuverKind::Capture | ManeuverKind::GravityAssist
        );
        if !joins_patch && maneuver.initial != self.orbit {
            warn!(
                kind = %maneuver.kind,
                current = %self.orbit,
                initial = %maneuver.initial,
                "maneuver does not start on the current orbit"
            );
        }
        let entry = MissionEntry::orbital(self.vessel(), maneuver, description);
        debug!(
            entry = %entry,
            propellant_kg = entry.next_vessel.propellant_mass_kg,
            "mission entry"
        );
        if let EntryAction::Orbital { maneuver, .. } = &entry.action {
            self.orbit = maneuver.next.clone();
        }
        self.entries.push(entry);
        self
    }

    pub fn add_payload_drop(
        &mut self,
        mass_kg: f64,
        description: impl Into<String>,
    ) -> Result<&mut Self, MissionError> {
        let entry = MissionEntry::payload_drop(self.vessel(), mass_kg, description)?;
        debug!(entry = %entry, dry_mass_kg = entry.next_vessel.dry_mass_kg, "mission entry");
        self.entries.push(entry);
        Ok(self)
    }

    pub fn total_delta_v_m_s(&self) -> f64 {
        self.entries.iter().map(|e| e.delta_v_m_s).sum()
    }

    /// Summed burn time, or `None` once any burn fails to complete.
    pub fn total_burn_time_s(&self) -> Option<f64> {
        self.entries.iter().map(|e| e.duration_s).sum()
    }

    pub fn total_propellant_kg(&self) -> f64 {
        self.entries.iter().map(MissionEntry::used_propellant_kg).sum()
    }

    /// Every burn completes with the propellant on board.
    pub fn is_feasible(&self) -> bool {
        self.entries.iter().all(MissionEntry::is_complete)
    }
}

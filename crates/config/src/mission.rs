//! Vessel records and mission scripts.
//!
//! A mission script names a vessel, a starting orbit and an ordered list of
//! steps. Steps refer to bodies by name; they are resolved against a
//! [`PlanetarySystem`] when the script is run.

use std::sync::Arc;

use conic_core::angle::deg_to_rad;
use conic_core::time::Calendar;
use conic_core::units::{km_to_m, kn_to_n};
use conic_orbits::{ManeuverPoint, Orbit, PlanetarySystem};
use conic_propulsion::{Engine, Vessel};
use serde::{Deserialize, Deserializer, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineConfig {
    pub isp_seconds: f64,
    pub thrust_kn: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VesselConfig {
    pub name: String,
    pub dry_mass_kg: f64,
    #[serde(default)]
    pub propellant_mass_kg: f64,
    pub engine: EngineConfig,
}

impl VesselConfig {
    pub fn to_vessel(&self) -> Result<Vessel, ConfigError> {
        let engine = Engine::new(self.engine.isp_seconds, kn_to_n(self.engine.thrust_kn))?;
        Ok(Vessel::new(
            &self.name,
            engine,
            self.dry_mass_kg,
            self.propellant_mass_kg,
        )?)
    }
}

/// Day and year lengths used when printing times.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalendarConfig {
    pub hours_per_day: f64,
    pub days_per_year: u32,
}

impl CalendarConfig {
    pub fn calendar(&self) -> Result<Calendar, ConfigError> {
        if !(self.hours_per_day > 0.0) || self.days_per_year == 0 {
            return Err(ConfigError::InvalidCalendar);
        }
        Ok(Calendar {
            hours_per_day: self.hours_per_day,
            days_per_year: self.days_per_year,
        })
    }
}

/// Starting orbit of a mission.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StartConfig {
    pub body: String,
    pub periapsis_altitude_km: f64,
    /// Defaults to the periapsis altitude (a circular orbit).
    #[serde(default)]
    pub apoapsis_altitude_km: Option<f64>,
    #[serde(default)]
    pub inclination_deg: f64,
}

impl StartConfig {
    pub fn orbit(&self, system: &PlanetarySystem) -> Result<Orbit, ConfigError> {
        let body = system.get(&self.body)?;
        let pe = km_to_m(self.periapsis_altitude_km);
        let ap = km_to_m(self.apoapsis_altitude_km.unwrap_or(self.periapsis_altitude_km));
        let orbit = Orbit::elliptic_from_altitudes(Arc::clone(body), pe.min(ap), pe.max(ap))?;
        Ok(orbit.with_inclination(deg_to_rad(self.inclination_deg)))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MissionScript {
    pub name: String,
    #[serde(default)]
    pub calendar: Option<CalendarConfig>,
    pub vessel: VesselConfig,
    pub start: StartConfig,
    #[serde(default)]
    pub steps: Vec<StepConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StepConfig {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub action: StepAction,
}

/// One scripted mission step. Altitudes are measured above the body the
/// vessel orbits at that point of the mission unless stated otherwise.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepAction {
    ChangeApoapsis {
        altitude_km: f64,
    },
    ChangePeriapsis {
        altitude_km: f64,
    },
    /// Raise or lower the opposite apsis to match the one at `at`.
    Circularize {
        #[serde(deserialize_with = "maneuver_point")]
        at: ManeuverPoint,
    },
    ChangeInclination {
        inclination_deg: f64,
        #[serde(default = "periapsis", deserialize_with = "maneuver_point")]
        point: ManeuverPoint,
    },
    /// Change inclination to that of another body's orbit.
    MatchInclination {
        body: String,
        #[serde(default = "periapsis", deserialize_with = "maneuver_point")]
        point: ManeuverPoint,
    },
    /// Leave the current body. The transfer targets the orbit of body `to`
    /// (at `to_point`), or an altitude above the current body's parent.
    Escape {
        to: Option<String>,
        #[serde(default, deserialize_with = "maneuver_point")]
        to_point: ManeuverPoint,
        target_altitude_km: Option<f64>,
        #[serde(default = "periapsis", deserialize_with = "maneuver_point")]
        point: ManeuverPoint,
        #[serde(default, deserialize_with = "maneuver_point")]
        source_point: ManeuverPoint,
    },
    /// Brake into a parking orbit about `body`, arriving from the orbit of
    /// `from` or, without one, from the current transfer orbit.
    Capture {
        body: String,
        periapsis_altitude_km: f64,
        apoapsis_altitude_km: Option<f64>,
        #[serde(default)]
        inclination_deg: f64,
        from: Option<String>,
        #[serde(default, deserialize_with = "maneuver_point")]
        from_point: ManeuverPoint,
        #[serde(default, deserialize_with = "maneuver_point")]
        target_point: ManeuverPoint,
    },
    GravityAssist {
        body: String,
        altitude_km: f64,
        to: String,
        #[serde(default, deserialize_with = "maneuver_point")]
        to_point: ManeuverPoint,
        from: Option<String>,
        #[serde(default, deserialize_with = "maneuver_point")]
        from_point: ManeuverPoint,
        #[serde(default, deserialize_with = "maneuver_point")]
        point: ManeuverPoint,
    },
    /// Detach dry mass without changing orbit.
    PayloadDrop {
        mass_kg: f64,
    },
}

fn periapsis() -> ManeuverPoint {
    ManeuverPoint::Periapsis
}

fn maneuver_point<'de, D>(deserializer: D) -> Result<ManeuverPoint, D::Error>
where
    D: Deserializer<'de>,
{
    let tag = String::deserialize(deserializer)?;
    tag.parse().map_err(serde::de::Error::custom)
}

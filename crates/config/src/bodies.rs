//! Body catalog records and the planetary system built from them.

use std::collections::BTreeSet;
use std::sync::Arc;

use conic_core::angle::deg_to_rad;
use conic_core::units::km_to_m;
use conic_orbits::{Body, Orbit, OrbitalElements, PlanetarySystem};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One body of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mu_m3_s2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass_kg: Option<f64>,
    pub radius_km: f64,
    #[serde(default)]
    pub atmosphere_height_km: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbit: Option<OrbitConfig>,
}

/// Orbit of a body around its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitConfig {
    pub semi_major_axis_km: f64,
    #[serde(default)]
    pub eccentricity: f64,
    #[serde(default)]
    pub inclination_deg: f64,
    #[serde(default)]
    pub argument_of_periapsis_deg: f64,
    #[serde(default)]
    pub longitude_of_ascending_node_deg: f64,
    #[serde(default)]
    pub mean_anomaly_at_epoch_rad: f64,
}

impl OrbitConfig {
    pub fn elements(&self) -> OrbitalElements {
        OrbitalElements::new(km_to_m(self.semi_major_axis_km), self.eccentricity)
            .with_inclination(deg_to_rad(self.inclination_deg))
            .with_argument_of_periapsis(deg_to_rad(self.argument_of_periapsis_deg))
            .with_longitude_of_ascending_node(deg_to_rad(self.longitude_of_ascending_node_deg))
            .with_mean_anomaly_at_epoch(self.mean_anomaly_at_epoch_rad)
    }
}

impl BodyConfig {
    /// Build the runtime body. `parent` must be the resolved body named by `self.parent`.
    pub fn to_body(&self, parent: Option<Arc<Body>>) -> Result<Body, ConfigError> {
        let orbit = match (parent, &self.orbit) {
            (Some(parent), Some(orbit)) => Some(Orbit::from_elements(parent, orbit.elements())?),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::ParentWithoutOrbit(self.name.clone())),
            (None, Some(_)) => return Err(ConfigError::OrbitWithoutParent(self.name.clone())),
        };
        let radius = km_to_m(self.radius_km);
        let atmosphere = km_to_m(self.atmosphere_height_km);
        let body = match (self.mu_m3_s2, self.mass_kg) {
            (Some(mu), _) => Body::new(&self.name, mu, radius, atmosphere, orbit)?,
            (None, Some(mass)) => Body::from_mass(&self.name, mass, radius, atmosphere, orbit)?,
            (None, None) => return Err(ConfigError::MissingGravity(self.name.clone())),
        };
        Ok(body)
    }
}

/// Build a planetary system from catalog records listed in any order.
pub fn build_system(records: &[BodyConfig]) -> Result<PlanetarySystem, ConfigError> {
    let mut names = BTreeSet::new();
    for record in records {
        if !names.insert(record.name.as_str()) {
            return Err(ConfigError::DuplicateBody(record.name.clone()));
        }
    }
    for record in records {
        if let Some(parent) = &record.parent {
            if !names.contains(parent.as_str()) {
                return Err(ConfigError::UnknownParent {
                    name: record.name.clone(),
                    parent: parent.clone(),
                });
            }
        }
    }

    let mut system = PlanetarySystem::new();
    let mut pending: Vec<&BodyConfig> = records.iter().collect();
    while !pending.is_empty() {
        let mut waiting = Vec::new();
        for record in &pending {
            let parent = match &record.parent {
                None => None,
                Some(name) => match system.get(name) {
                    Ok(parent) => Some(Arc::clone(parent)),
                    Err(_) => {
                        waiting.push(*record);
                        continue;
                    }
                },
            };
            system.add_body(record.to_body(parent)?)?;
        }
        if waiting.len() == pending.len() {
            return Err(ConfigError::ParentCycle(
                waiting.iter().map(|r| r.name.clone()).collect(),
            ));
        }
        pending = waiting;
    }
    Ok(system)
}

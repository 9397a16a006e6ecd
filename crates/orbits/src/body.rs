//! Celestial bodies and the planetary system catalog.
//!
//! A [`PlanetarySystem`] is built once, explicitly, and then only read. Each
//! [`Body`] optionally owns the [`Orbit`] it follows around its parent; the
//! orbit in turn holds the parent through an `Arc`, so the tree only points
//! upwards and never forms a cycle.

use std::collections::BTreeMap;
use std::sync::Arc;

use conic_core::constants::GRAVITATIONAL_CONSTANT;

use crate::{Orbit, OrbitError};

/// A celestial body.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub name: String,
    /// Standard gravitational parameter (`m^3/s^2`)
    pub mu_m3_s2: f64,
    /// Mean radius (`m`)
    pub radius_m: f64,
    /// Height of the atmosphere above the surface, zero when airless (`m`)
    pub atmosphere_height_m: f64,
    /// Orbit around the parent body; `None` for the root of a system.
    pub orbit: Option<Orbit>,
}

impl Body {
    pub fn new(
        name: impl Into<String>,
        mu_m3_s2: f64,
        radius_m: f64,
        atmosphere_height_m: f64,
        orbit: Option<Orbit>,
    ) -> Result<Self, OrbitError> {
        let name = name.into();
        let reason = if !(mu_m3_s2 > 0.0) {
            Some("gravitational parameter must be greater than 0")
        } else if !(radius_m > 0.0) {
            Some("radius must be greater than 0 m")
        } else if !(atmosphere_height_m >= 0.0) {
            Some("atmosphere height cannot be less than 0 m")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(OrbitError::InvalidBody { name, reason });
        }

        Ok(Self {
            name,
            mu_m3_s2,
            radius_m,
            atmosphere_height_m,
            orbit,
        })
    }

    /// Build a body from its mass rather than its gravitational parameter.
    pub fn from_mass(
        name: impl Into<String>,
        mass_kg: f64,
        radius_m: f64,
        atmosphere_height_m: f64,
        orbit: Option<Orbit>,
    ) -> Result<Self, OrbitError> {
        Self::new(
            name,
            GRAVITATIONAL_CONSTANT * mass_kg,
            radius_m,
            atmosphere_height_m,
            orbit,
        )
    }

    pub fn mass_kg(&self) -> f64 {
        self.mu_m3_s2 / GRAVITATIONAL_CONSTANT
    }

    /// The body this one orbits, if any.
    pub fn parent(&self) -> Option<&Arc<Body>> {
        self.orbit.as_ref().map(Orbit::parent)
    }

    /// Laplace sphere of influence, `a · (m/M)^0.4`. Infinite for a root body.
    pub fn sphere_of_influence_m(&self) -> f64 {
        match &self.orbit {
            Some(orbit) => {
                orbit.semi_major_axis_m() * (self.mu_m3_s2 / orbit.parent().mu_m3_s2).powf(0.4)
            }
            None => f64::INFINITY,
        }
    }

    /// Surface gravity (`m/s^2`).
    pub fn surface_gravity_m_s2(&self) -> f64 {
        self.mu_m3_s2 / (self.radius_m * self.radius_m)
    }

    /// Surface escape velocity (`m/s`).
    pub fn escape_velocity_m_s(&self) -> f64 {
        (2.0 * self.surface_gravity_m_s2() * self.radius_m).sqrt()
    }

    pub fn gravitational_acceleration_m_s2(&self, altitude_m: f64) -> f64 {
        let r = self.radius_from_altitude(altitude_m);
        self.mu_m3_s2 / (r * r)
    }

    pub fn altitude_from_radius(&self, radius_m: f64) -> f64 {
        radius_m - self.radius_m
    }

    pub fn radius_from_altitude(&self, altitude_m: f64) -> f64 {
        altitude_m + self.radius_m
    }

    /// Two handles refer to the same body when they share an allocation or a name.
    pub fn same_as(&self, other: &Body) -> bool {
        std::ptr::eq(self, other) || self.name == other.name
    }
}

/// Name-indexed, read-only catalog of bodies.
#[derive(Debug, Clone, Default)]
pub struct PlanetarySystem {
    bodies: BTreeMap<String, Arc<Body>>,
}

impl PlanetarySystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a body. Its parent, if any, must already be part of the system.
    pub fn add_body(&mut self, body: Body) -> Result<Arc<Body>, OrbitError> {
        if self.bodies.contains_key(&body.name) {
            return Err(OrbitError::DuplicateBody(body.name));
        }
        if let Some(parent) = body.parent() {
            if !self.bodies.contains_key(&parent.name) {
                return Err(OrbitError::MissingParent {
                    name: body.name.clone(),
                    parent: parent.name.clone(),
                });
            }
        }
        let body = Arc::new(body);
        self.bodies.insert(body.name.clone(), Arc::clone(&body));
        Ok(body)
    }

    /// Look a body up by name, falling back to a case-insensitive match.
    pub fn get(&self, name: &str) -> Result<&Arc<Body>, OrbitError> {
        if let Some(body) = self.bodies.get(name) {
            return Ok(body);
        }
        self.bodies
            .values()
            .find(|b| b.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| OrbitError::UnknownBody(name.to_string()))
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Arc<Body>> {
        self.bodies.values()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Bodies without a parent orbit.
    pub fn roots(&self) -> impl Iterator<Item = &Arc<Body>> {
        self.bodies.values().filter(|b| b.orbit.is_none())
    }

    pub fn children(&self, name: &str) -> Result<Vec<&Arc<Body>>, OrbitError> {
        let body = self.get(name)?;
        Ok(self
            .bodies
            .values()
            .filter(|b| b.parent().is_some_and(|p| p.same_as(body)))
            .collect())
    }

    /// Other bodies orbiting the same parent.
    pub fn siblings(&self, name: &str) -> Result<Vec<&Arc<Body>>, OrbitError> {
        let body = self.get(name)?;
        let Some(parent) = body.parent() else {
            return Ok(Vec::new());
        };
        Ok(self
            .children(&parent.name)?
            .into_iter()
            .filter(|b| !b.same_as(body))
            .collect())
    }

    /// Highest apoapsis that stays clear of every moon's sphere of influence;
    /// the body's own SOI when it has no moons.
    pub fn stable_apoapsis_radius_m(&self, name: &str) -> Result<f64, OrbitError> {
        let body = self.get(name)?;
        let limit = self
            .children(name)?
            .into_iter()
            .filter_map(|c| {
                c.orbit
                    .as_ref()
                    .map(|o| o.periapsis_radius_m() - c.sphere_of_influence_m())
            })
            .fold(f64::INFINITY, f64::min);
        Ok(if limit.is_finite() {
            limit
        } else {
            body.sphere_of_influence_m()
        })
    }
}

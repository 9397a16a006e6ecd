//! Engine and vessel mass properties, and the rocket equation tying them to delta-v.

use std::fmt;

use conic_core::constants::G0;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropulsionError {
    #[error("specific impulse must be greater than 0 s (got {0} s)")]
    SpecificImpulse(f64),
    #[error("thrust must be greater than 0 N (got {0} N)")]
    Thrust(f64),
    #[error("dry mass must be greater than 0 kg (got {0} kg)")]
    DryMass(f64),
    #[error("propellant mass cannot be negative (got {0} kg)")]
    PropellantMass(f64),
}

/// A single engine (or a cluster treated as one).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Engine {
    pub isp_seconds: f64,
    pub thrust_newtons: f64,
}

impl Engine {
    pub fn new(isp_seconds: f64, thrust_newtons: f64) -> Result<Self, PropulsionError> {
        if !(isp_seconds > 0.0) {
            return Err(PropulsionError::SpecificImpulse(isp_seconds));
        }
        if !(thrust_newtons > 0.0) {
            return Err(PropulsionError::Thrust(thrust_newtons));
        }
        Ok(Self {
            isp_seconds,
            thrust_newtons,
        })
    }

    /// Effective exhaust velocity, `g0 · Isp` (`m/s`).
    pub fn natural_delta_v_m_s(&self) -> f64 {
        G0 * self.isp_seconds
    }

    /// Propellant consumed per second at full thrust (`kg/s`).
    pub fn propellant_flow_kg_s(&self) -> f64 {
        self.thrust_newtons / self.natural_delta_v_m_s()
    }

    /// Tsiolkovsky: `g0 · Isp · ln((dry + propellant) / dry)`.
    pub fn available_delta_v_m_s(&self, dry_mass_kg: f64, propellant_mass_kg: f64) -> f64 {
        self.natural_delta_v_m_s() * ((dry_mass_kg + propellant_mass_kg) / dry_mass_kg).ln()
    }

    /// Propellant needed to give `dry_mass_kg` the requested delta-v.
    pub fn propellant_mass_kg(&self, dry_mass_kg: f64, delta_v_m_s: f64) -> f64 {
        dry_mass_kg * ((delta_v_m_s / self.natural_delta_v_m_s()).exp() - 1.0)
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Isp {:.1} s, thrust {:.1} kN, flow {:.3} kg/s",
            self.isp_seconds,
            self.thrust_newtons / 1_000.0,
            self.propellant_flow_kg_s()
        )
    }
}

/// A vessel with one engine and a propellant load.
#[derive(Debug, Clone, PartialEq)]
pub struct Vessel {
    pub name: String,
    pub engine: Engine,
    pub dry_mass_kg: f64,
    pub propellant_mass_kg: f64,
}

impl Vessel {
    pub fn new(
        name: impl Into<String>,
        engine: Engine,
        dry_mass_kg: f64,
        propellant_mass_kg: f64,
    ) -> Result<Self, PropulsionError> {
        if !(dry_mass_kg > 0.0) {
            return Err(PropulsionError::DryMass(dry_mass_kg));
        }
        if !(propellant_mass_kg >= 0.0) {
            return Err(PropulsionError::PropellantMass(propellant_mass_kg));
        }
        Ok(Self {
            name: name.into(),
            engine,
            dry_mass_kg,
            propellant_mass_kg,
        })
    }

    /// Convenience accessor for total mass.
    pub fn mass_kg(&self) -> f64 {
        self.dry_mass_kg + self.propellant_mass_kg
    }

    pub fn available_delta_v_m_s(&self) -> f64 {
        self.engine
            .available_delta_v_m_s(self.dry_mass_kg, self.propellant_mass_kg)
    }

    /// Acceleration at full thrust (`m/s^2`).
    pub fn acceleration_m_s2(&self) -> f64 {
        self.engine.thrust_newtons / self.mass_kg()
    }

    pub fn weight_n(&self, gravitational_acceleration_m_s2: f64) -> f64 {
        self.mass_kg() * gravitational_acceleration_m_s2
    }

    pub fn thrust_to_weight(&self, gravitational_acceleration_m_s2: f64) -> f64 {
        self.engine.thrust_newtons / self.weight_n(gravitational_acceleration_m_s2)
    }

    pub fn add_propellant(&self, kg: f64) -> Self {
        Self {
            propellant_mass_kg: self.propellant_mass_kg + kg,
            ..self.clone()
        }
    }

    /// Saturates at an empty tank.
    pub fn remove_propellant(&self, kg: f64) -> Self {
        Self {
            propellant_mass_kg: (self.propellant_mass_kg - kg).max(0.0),
            ..self.clone()
        }
    }

    pub fn add_dry_mass(&self, kg: f64) -> Self {
        Self {
            dry_mass_kg: self.dry_mass_kg + kg,
            ..self.clone()
        }
    }

    /// Drop payload or stages. The vessel must keep some dry mass.
    pub fn remove_dry_mass(&self, kg: f64) -> Result<Self, PropulsionError> {
        let dry = self.dry_mass_kg - kg;
        if !(dry > 0.0) {
            return Err(PropulsionError::DryMass(dry));
        }
        Ok(Self {
            dry_mass_kg: dry,
            ..self.clone()
        })
    }

    /// Burn for `delta_v_m_s` at a fraction of full thrust (clamped to `[0, 1]`).
    pub fn burn(&self, delta_v_m_s: f64, thrust_ratio: f64) -> VesselBurn {
        VesselBurn::new(self, delta_v_m_s, thrust_ratio)
    }

    /// Burn a given propellant mass.
    pub fn burn_propellant(&self, propellant_kg: f64, thrust_ratio: f64) -> VesselBurn {
        if propellant_kg < 0.0 {
            return self.burn(0.0, thrust_ratio);
        }
        if propellant_kg > self.propellant_mass_kg {
            return self.burn(f64::INFINITY, thrust_ratio);
        }
        let remaining = self
            .engine
            .available_delta_v_m_s(self.dry_mass_kg, self.propellant_mass_kg - propellant_kg);
        self.burn(self.available_delta_v_m_s() - remaining, thrust_ratio)
    }

    /// Burn for a duration.
    pub fn burn_for(&self, seconds: f64, thrust_ratio: f64) -> VesselBurn {
        let ratio = thrust_ratio.clamp(0.0, 1.0);
        self.burn_propellant(self.engine.propellant_flow_kg_s() * seconds * ratio, ratio)
    }
}

impl fmt::Display for Vessel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.1} t ({:.1} t dry, {:.1} t propellant), {:.1} m/s available",
            self.name,
            self.mass_kg() / 1_000.0,
            self.dry_mass_kg / 1_000.0,
            self.propellant_mass_kg / 1_000.0,
            self.available_delta_v_m_s()
        )
    }
}

/// Propellant and time a vessel spends on one burn.
#[derive(Debug, Clone, PartialEq)]
pub struct VesselBurn {
    /// The vessel before the burn.
    pub vessel: Vessel,
    pub delta_v_m_s: f64,
    pub thrust_ratio: f64,
    pub used_propellant_kg: f64,
    /// `None` when the burn cannot complete: no thrust, or not enough propellant.
    pub duration_s: Option<f64>,
}

impl VesselBurn {
    fn new(vessel: &Vessel, delta_v_m_s: f64, thrust_ratio: f64) -> Self {
        let thrust_ratio = thrust_ratio.clamp(0.0, 1.0);
        let burn = |delta_v_m_s, used_propellant_kg, duration_s| Self {
            vessel: vessel.clone(),
            delta_v_m_s,
            thrust_ratio,
            used_propellant_kg,
            duration_s,
        };

        if !(delta_v_m_s > 0.0) {
            return burn(0.0, 0.0, Some(0.0));
        }
        if thrust_ratio == 0.0 {
            return burn(delta_v_m_s, 0.0, None);
        }
        let available = vessel.available_delta_v_m_s();
        if delta_v_m_s > available {
            return burn(delta_v_m_s, vessel.propellant_mass_kg, None);
        }

        let left = vessel
            .engine
            .propellant_mass_kg(vessel.dry_mass_kg, available - delta_v_m_s);
        let used = (vessel.propellant_mass_kg - left).max(0.0);
        let seconds = used / (vessel.engine.propellant_flow_kg_s() * thrust_ratio);
        burn(delta_v_m_s, used, Some(seconds))
    }

    pub fn thrust_n(&self) -> f64 {
        self.vessel.engine.thrust_newtons * self.thrust_ratio
    }

    /// Share of the propellant load spent; a dry tank counts as fully spent.
    pub fn used_propellant_ratio(&self) -> f64 {
        if self.vessel.propellant_mass_kg == 0.0 {
            1.0
        } else {
            self.used_propellant_kg / self.vessel.propellant_mass_kg
        }
    }

    pub fn is_complete(&self) -> bool {
        self.duration_s.is_some()
    }

    /// The vessel after the burn.
    pub fn final_vessel(&self) -> Vessel {
        self.vessel.remove_propellant(self.used_propellant_kg)
    }
}

impl fmt::Display for VesselBurn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dv {:.1} m/s, propellant {:.1} kg, ",
            self.delta_v_m_s, self.used_propellant_kg
        )?;
        match self.duration_s {
            Some(s) => write!(f, "{s:.3} s")?,
            None => write!(f, "never completes")?,
        }
        write!(f, ", thrust {:.1} kN", self.thrust_n() / 1_000.0)
    }
}

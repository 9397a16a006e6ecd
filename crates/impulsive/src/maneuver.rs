//! Impulsive maneuvers between conic orbits.
//!
//! Every constructor is a pure function of its inputs. The resulting orbit of
//! an apsis or plane change keeps the initial orbit's plane; elliptic results
//! also keep its epoch phase. Escape, capture and gravity assists are patched
//! conics: the heliocentric (or parent-centric) transfer ellipse is the
//! maneuver's initial/next orbit, and the hyperbolic leg about the body being
//! left, entered or flown by is carried alongside.

use std::fmt;
use std::sync::Arc;

use conic_orbits::anomaly::asymptote_true_anomaly;
use conic_orbits::{Body, ManeuverPoint, Orbit, OrbitError};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ManeuverError {
    #[error(transparent)]
    Orbit(#[from] OrbitError),
    #[error("periapsis can only be changed on an elliptic orbit")]
    PeriapsisOnHyperbola,
    #[error("a hyperbolic orbit has no apoapsis to change inclination at")]
    InclinationAtHyperbolicApoapsis,
    #[error("body '{0}' has no orbit around a parent body")]
    BodyWithoutOrbit(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManeuverKind {
    Identity,
    ChangeApoapsis,
    ChangePeriapsis,
    ChangeInclination,
    Escape,
    Capture,
    GravityAssist,
}

impl fmt::Display for ManeuverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Identity => "identity",
            Self::ChangeApoapsis => "change apoapsis",
            Self::ChangePeriapsis => "change periapsis",
            Self::ChangeInclination => "change inclination",
            Self::Escape => "escape",
            Self::Capture => "capture",
            Self::GravityAssist => "gravity assist",
        })
    }
}

/// One impulsive state transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Maneuver {
    pub kind: ManeuverKind,
    pub initial: Orbit,
    pub next: Orbit,
    /// Magnitude of the impulse (`m/s`).
    pub delta_v_m_s: f64,
    pub point: ManeuverPoint,
    /// Inbound hyperbola about the captured/assisting body.
    pub capture_leg: Option<Orbit>,
    /// Outbound hyperbola about the escaped/assisting body.
    pub escape_leg: Option<Orbit>,
}

impl Maneuver {
    fn simple(
        kind: ManeuverKind,
        initial: &Orbit,
        next: Orbit,
        delta_v_m_s: f64,
        point: ManeuverPoint,
    ) -> Self {
        Self {
            kind,
            initial: initial.clone(),
            next,
            delta_v_m_s,
            point,
            capture_leg: None,
            escape_leg: None,
        }
        .logged()
    }

    fn logged(self) -> Self {
        debug!(
            kind = %self.kind,
            body = %self.next.parent().name,
            point = %self.point,
            delta_v_m_s = self.delta_v_m_s,
            "maneuver"
        );
        self
    }

    /// No-op: stays on `orbit`, costs nothing.
    pub fn identity(orbit: &Orbit) -> Self {
        Self::simple(
            ManeuverKind::Identity,
            orbit,
            orbit.clone(),
            0.0,
            ManeuverPoint::Unspecified,
        )
    }

    /// Burn at periapsis to move the opposite apsis to `target_m`.
    ///
    /// A target below the current periapsis swaps the apsides; a negative
    /// target is the signed apoapsis marker of an escape hyperbola.
    pub fn change_apoapsis(orbit: &Orbit, target_m: f64) -> Result<Self, ManeuverError> {
        let parent = Arc::clone(orbit.parent());
        let pe = orbit.periapsis_radius_m();
        let next = if target_m >= pe {
            Orbit::elliptic_from_radii(parent, pe, target_m)?
        } else if target_m >= 0.0 {
            Orbit::elliptic_from_radii(parent, target_m, pe)?
        } else {
            Orbit::hyperbolic_from_radii(parent, pe, target_m)?
        };
        let next = oriented_like(orbit, next);
        let delta_v = (orbit.periapsis_speed_m_s() - next.periapsis_speed_m_s()).abs();
        Ok(Self::simple(
            ManeuverKind::ChangeApoapsis,
            orbit,
            next,
            delta_v,
            ManeuverPoint::Periapsis,
        ))
    }

    /// Burn at apoapsis to move the opposite apsis to `target_m`. Elliptic only.
    pub fn change_periapsis(orbit: &Orbit, target_m: f64) -> Result<Self, ManeuverError> {
        let Some(ap_speed) = orbit.apoapsis_speed_m_s() else {
            return Err(ManeuverError::PeriapsisOnHyperbola);
        };
        let parent = Arc::clone(orbit.parent());
        let ap = orbit.apoapsis_radius_m();
        let next = if target_m <= ap {
            Orbit::elliptic_from_radii(parent, target_m, ap)?
        } else {
            Orbit::elliptic_from_radii(parent, ap, target_m)?
        };
        let next = oriented_like(orbit, next);
        let next_ap_speed = next.speed_at(ManeuverPoint::Apoapsis)?;
        Ok(Self::simple(
            ManeuverKind::ChangePeriapsis,
            orbit,
            next,
            (ap_speed - next_ap_speed).abs(),
            ManeuverPoint::Apoapsis,
        ))
    }

    /// Rotate the orbital plane to `inclination_rad`, burning at `point`.
    pub fn change_inclination(
        orbit: &Orbit,
        inclination_rad: f64,
        point: ManeuverPoint,
    ) -> Result<Self, ManeuverError> {
        if orbit.is_hyperbolic() && point == ManeuverPoint::Apoapsis {
            return Err(ManeuverError::InclinationAtHyperbolicApoapsis);
        }
        let speed = orbit.speed_at(point)?;
        let next = orbit.with_inclination(inclination_rad);
        let delta_i = (next.inclination_rad() - orbit.inclination_rad()).abs();
        Ok(Self::simple(
            ManeuverKind::ChangeInclination,
            orbit,
            next,
            2.0 * speed * (delta_i * 0.5).sin(),
            point,
        ))
    }

    /// Leave the parking orbit's parent on a transfer towards `target_radius_m`
    /// (measured about the grandparent).
    ///
    /// `point` is where on the parking orbit the burn happens; `source_body_point`
    /// is where on its own orbit the parent body is at departure.
    pub fn escape(
        parking: &Orbit,
        target_radius_m: f64,
        point: ManeuverPoint,
        source_body_point: ManeuverPoint,
    ) -> Result<Self, ManeuverError> {
        let body = parking.parent();
        let body_orbit = orbit_of(body)?;
        let source_m = body_orbit.radius_at(source_body_point)?;

        let transfer = transfer_ellipse(body_orbit, source_m, target_radius_m)?;
        let transfer_speed = if source_m < target_radius_m {
            transfer.periapsis_speed_m_s()
        } else {
            transfer.speed_at(ManeuverPoint::Apoapsis)?
        };
        let excess = (body_orbit.speed_at(source_body_point)? - transfer_speed).abs();

        let hyperbola = Orbit::hyperbolic_from_excess_speed(
            Arc::clone(body),
            parking.radius_at(point)?,
            excess,
        )?
        .with_inclination(parking.inclination_rad());
        let delta_v = (hyperbola.periapsis_speed_m_s() - parking.speed_at(point)?).abs();

        Ok(Self {
            kind: ManeuverKind::Escape,
            initial: parking.clone(),
            next: transfer,
            delta_v_m_s: delta_v,
            point,
            capture_leg: None,
            escape_leg: Some(hyperbola),
        }
        .logged())
    }

    /// Arrive from `source_radius_m` (about the parking orbit's grandparent) and
    /// brake into `parking` at its periapsis.
    pub fn capture(
        source_radius_m: f64,
        parking: &Orbit,
        target_body_point: ManeuverPoint,
    ) -> Result<Self, ManeuverError> {
        let body = parking.parent();
        let body_orbit = orbit_of(body)?;
        let target_m = body_orbit.radius_at(target_body_point)?;

        let transfer = transfer_ellipse(body_orbit, source_radius_m, target_m)?;
        let transfer_speed = if source_radius_m > target_m {
            transfer.periapsis_speed_m_s()
        } else {
            transfer.speed_at(ManeuverPoint::Apoapsis)?
        };
        let excess = (body_orbit.speed_at(target_body_point)? - transfer_speed).abs();

        let hyperbola = Orbit::hyperbolic_from_excess_speed(
            Arc::clone(body),
            parking.periapsis_radius_m(),
            excess,
        )?
        .with_inclination(parking.inclination_rad());
        let delta_v = (parking.periapsis_speed_m_s() - hyperbola.periapsis_speed_m_s()).abs();

        Ok(Self {
            kind: ManeuverKind::Capture,
            initial: transfer,
            next: parking.clone(),
            delta_v_m_s: delta_v,
            point: ManeuverPoint::Periapsis,
            capture_leg: Some(hyperbola),
            escape_leg: None,
        }
        .logged())
    }

    /// Fly by `assist_body` at `assist_altitude_m` on the way from
    /// `source_radius_m` to `target_radius_m`, burning at the flyby periapsis
    /// to patch the inbound and outbound hyperbolae together.
    pub fn gravity_assist(
        source_radius_m: f64,
        assist_body: &Arc<Body>,
        assist_altitude_m: f64,
        target_radius_m: f64,
        assist_body_point: ManeuverPoint,
    ) -> Result<Self, ManeuverError> {
        let body_orbit = orbit_of(assist_body)?;
        let assist_m = body_orbit.radius_at(assist_body_point)?;
        let body_speed = body_orbit.speed_at(assist_body_point)?;

        let inbound = transfer_ellipse(body_orbit, source_radius_m, assist_m)?;
        let inbound_speed = if source_radius_m > assist_m {
            inbound.periapsis_speed_m_s()
        } else {
            inbound.speed_at(ManeuverPoint::Apoapsis)?
        };
        let outbound = transfer_ellipse(body_orbit, assist_m, target_radius_m)?;
        let outbound_speed = if assist_m < target_radius_m {
            outbound.periapsis_speed_m_s()
        } else {
            outbound.speed_at(ManeuverPoint::Apoapsis)?
        };

        let flyby_m = assist_body.radius_from_altitude(assist_altitude_m);
        let capture = Orbit::hyperbolic_from_excess_speed(
            Arc::clone(assist_body),
            flyby_m,
            (body_speed - inbound_speed).abs(),
        )?;
        let escape = Orbit::hyperbolic_from_excess_speed(
            Arc::clone(assist_body),
            flyby_m,
            (body_speed - outbound_speed).abs(),
        )?;
        let delta_v = (capture.periapsis_speed_m_s() - escape.periapsis_speed_m_s()).abs();

        Ok(Self {
            kind: ManeuverKind::GravityAssist,
            initial: inbound,
            next: outbound,
            delta_v_m_s: delta_v,
            point: ManeuverPoint::Periapsis,
            capture_leg: Some(capture),
            escape_leg: Some(escape),
        }
        .logged())
    }

    /// Angle between the escape burn and the hyperbola's outbound asymptote,
    /// `acos(-1/e)`. Only escapes and gravity assists have one.
    pub fn impulse_angle_rad(&self) -> Option<f64> {
        self.escape_leg
            .as_ref()
            .map(|leg| asymptote_true_anomaly(leg.eccentricity()))
    }
}

impl fmt::Display for Maneuver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if self.point != ManeuverPoint::Unspecified {
            write!(f, " at {}", self.point)?;
        }
        write!(f, ": {:.1} m/s", self.delta_v_m_s)
    }
}

fn orbit_of(body: &Body) -> Result<&Orbit, ManeuverError> {
    body.orbit
        .as_ref()
        .ok_or_else(|| ManeuverError::BodyWithoutOrbit(body.name.clone()))
}

/// Ellipse about the body's own parent between two radii, in the body's plane.
fn transfer_ellipse(body_orbit: &Orbit, from_m: f64, to_m: f64) -> Result<Orbit, OrbitError> {
    let ellipse = Orbit::elliptic_from_radii(
        Arc::clone(body_orbit.parent()),
        from_m.min(to_m),
        from_m.max(to_m),
    )?;
    Ok(ellipse.with_inclination(body_orbit.inclination_rad()))
}

/// Carry the plane, and for bound results the epoch phase, of `from` over to `to`.
fn oriented_like(from: &Orbit, to: Orbit) -> Orbit {
    let to = to.with_plane(
        from.inclination_rad(),
        from.argument_of_periapsis_rad(),
        from.longitude_of_ascending_node_rad(),
    );
    if to.is_elliptic() && from.is_elliptic() {
        to.with_mean_anomaly_at_epoch(from.mean_anomaly_at_epoch_rad())
    } else {
        to
    }
}

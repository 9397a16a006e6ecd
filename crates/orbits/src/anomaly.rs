//! Conversions between mean, eccentric and true anomaly, and the
//! [`OrbitPoint`] state derived from them.
//!
//! Kepler's equation is inverted by bisection on true anomaly, using the
//! closed-form true → mean map as a monotonic comparator. Elliptic mean
//! anomalies live in `[0, 2π)`. Hyperbolic ones are signed and unbounded:
//! negative values are on the inbound leg, before periapsis passage.

use std::f64::consts::{PI, TAU};

use conic_core::angle::{normalize_positive, normalize_signed};

use crate::Body;
use crate::orbit::{Conic, Shape};

/// Width of the true-anomaly bracket at which the mean → true bisection stops.
pub const ANOMALY_TOLERANCE_RAD: f64 = 1e-15;

/// A bracket of width π reaches the tolerance after ~52 halvings; the cap only
/// matters when rounding stops the bracket from shrinking.
const MAX_HALVINGS: u32 = 128;

/// True anomaly of the outbound asymptote of a hyperbola, `acos(-1/e)`.
pub fn asymptote_true_anomaly(eccentricity: f64) -> f64 {
    (-1.0 / eccentricity).clamp(-1.0, 1.0).acos()
}

/// Eccentric (elliptic) or hyperbolic (hyperbolic) anomaly for a true anomaly.
///
/// `cos E = (e + cos ν) / (1 + e cos ν)`. Elliptic results are reflected into
/// `(π, 2π)` when `ν > π`. Hyperbolic results carry the sign of `ν` folded into
/// `(-π, π]` and are infinite outside the asymptote cone. Arguments that round
/// out of the `acos`/`acosh` domain are clamped back into it.
pub fn eccentric_from_true(true_anomaly: f64, eccentricity: f64, conic: Conic) -> f64 {
    let e = eccentricity;
    match conic {
        Conic::Elliptic => {
            let nu = normalize_positive(true_anomaly);
            let cos_nu = nu.cos();
            let cos_ecc = ((e + cos_nu) / (1.0 + e * cos_nu)).clamp(-1.0, 1.0);
            let ecc = cos_ecc.acos();
            if nu > PI { TAU - ecc } else { ecc }
        }
        Conic::Hyperbolic => {
            let nu = normalize_signed(true_anomaly);
            if nu.abs() >= asymptote_true_anomaly(e) {
                return f64::INFINITY.copysign(nu);
            }
            let cos_nu = nu.cos();
            let cosh_h = ((e + cos_nu) / (1.0 + e * cos_nu)).max(1.0);
            let h = cosh_h.acosh();
            if nu < 0.0 { -h } else { h }
        }
    }
}

/// Kepler's equation: `M = E - e sin E` or `M = e sinh H - H`.
pub fn mean_from_eccentric(eccentric_anomaly: f64, eccentricity: f64, conic: Conic) -> f64 {
    let e = eccentricity;
    match conic {
        Conic::Elliptic => eccentric_anomaly - e * eccentric_anomaly.sin(),
        Conic::Hyperbolic if eccentric_anomaly.is_infinite() => eccentric_anomaly,
        Conic::Hyperbolic => e * eccentric_anomaly.sinh() - eccentric_anomaly,
    }
}

pub fn mean_from_true(true_anomaly: f64, eccentricity: f64, conic: Conic) -> f64 {
    mean_from_eccentric(
        eccentric_from_true(true_anomaly, eccentricity, conic),
        eccentricity,
        conic,
    )
}

/// Invert Kepler's equation by bisection. The result is in `[0, 2π)`.
///
/// Elliptic: `M` is wrapped to `[0, 2π)`; exactly `0` and `π` are the apsides
/// and return immediately, anything else is searched in the half-plane
/// `[0, π)` or `[π, 2π)` holding it. Hyperbolic: `M` keeps its sign and the
/// search runs between periapsis and the matching asymptote.
pub fn true_from_mean(mean_anomaly: f64, eccentricity: f64, conic: Conic) -> f64 {
    match conic {
        Conic::Elliptic => {
            let m = normalize_positive(mean_anomaly);
            if m == 0.0 || m == PI {
                return m;
            }
            let (lo, hi) = if m < PI { (0.0, PI) } else { (PI, TAU) };
            bisect(lo, hi, m, |nu| mean_from_true(nu, eccentricity, conic))
        }
        Conic::Hyperbolic => {
            if mean_anomaly == 0.0 {
                return 0.0;
            }
            let limit = asymptote_true_anomaly(eccentricity);
            let (lo, hi) = if mean_anomaly > 0.0 {
                (0.0, limit)
            } else {
                (-limit, 0.0)
            };
            let nu = bisect(lo, hi, mean_anomaly, |nu| {
                mean_from_true(nu, eccentricity, conic)
            });
            normalize_positive(nu)
        }
    }
}

fn bisect(mut lo: f64, mut hi: f64, target: f64, forward: impl Fn(f64) -> f64) -> f64 {
    let mut halvings = 0;
    while hi - lo > ANOMALY_TOLERANCE_RAD && halvings < MAX_HALVINGS {
        let mid = (lo + hi) * 0.5;
        if forward(mid) < target {
            lo = mid;
        } else {
            hi = mid;
        }
        halvings += 1;
    }
    (lo + hi) * 0.5
}

/// State of an orbit at one anomaly.
#[derive(Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub struct OrbitPoint {
    /// Mean anomaly (`rad`); signed for hyperbolic orbits.
    pub mean_anomaly: f64,
    /// Eccentric or hyperbolic anomaly (`rad`).
    pub eccentric_anomaly: f64,
    /// True anomaly in `[0, 2π)` (`rad`).
    pub true_anomaly: f64,
    /// `ν + ω + Ω` in `[0, 2π)` (`rad`).
    pub angular_position: f64,
    pub radius_m: f64,
    pub altitude_m: f64,
    pub speed_m_s: f64,
    /// Time since periapsis passage (`s`); negative on the inbound leg of a hyperbola.
    pub time_since_periapsis_s: f64,
    pub gravitational_acceleration_m_s2: f64,
}

impl OrbitPoint {
    pub(crate) fn periapsis(shape: &Shape, parent: &Body) -> Self {
        let radius = shape.periapsis_radius();
        Self::closed_form(shape, parent, 0.0, radius, 0.0)
    }

    /// Elliptic only; a hyperbola has no apoapsis point.
    pub(crate) fn apoapsis(shape: &Shape, parent: &Body) -> Option<Self> {
        let period = shape.period?;
        let radius = shape.apoapsis_radius();
        Some(Self::closed_form(shape, parent, PI, radius, period * 0.5))
    }

    fn closed_form(shape: &Shape, parent: &Body, anomaly: f64, radius: f64, time: f64) -> Self {
        let altitude = parent.altitude_from_radius(radius);
        Self {
            mean_anomaly: anomaly,
            eccentric_anomaly: anomaly,
            true_anomaly: anomaly,
            angular_position: angular_position(anomaly, shape),
            radius_m: radius,
            altitude_m: altitude,
            speed_m_s: shape.angular_momentum / radius,
            time_since_periapsis_s: time,
            gravitational_acceleration_m_s2: parent.gravitational_acceleration_m_s2(altitude),
        }
    }

    pub(crate) fn from_true_anomaly(shape: &Shape, parent: &Body, true_anomaly: f64) -> Self {
        let nu = normalize_positive(true_anomaly);
        let ecc = eccentric_from_true(nu, shape.eccentricity, shape.conic);
        let mean = mean_from_eccentric(ecc, shape.eccentricity, shape.conic);
        Self::resolved(shape, parent, mean, ecc, nu)
    }

    pub(crate) fn from_mean_anomaly(shape: &Shape, parent: &Body, mean_anomaly: f64) -> Self {
        let mean = match shape.conic {
            Conic::Elliptic => normalize_positive(mean_anomaly),
            Conic::Hyperbolic => mean_anomaly,
        };
        let nu = true_from_mean(mean, shape.eccentricity, shape.conic);
        let ecc = eccentric_from_true(nu, shape.eccentricity, shape.conic);
        Self::resolved(shape, parent, mean, ecc, nu)
    }

    fn resolved(shape: &Shape, parent: &Body, mean: f64, ecc: f64, nu: f64) -> Self {
        let (a, e) = (shape.semi_major_axis, shape.eccentricity);
        let radius = match shape.conic {
            Conic::Elliptic => a * (1.0 - e * ecc.cos()),
            Conic::Hyperbolic => a * (e * ecc.cosh() - 1.0),
        };
        let altitude = parent.altitude_from_radius(radius);

        let mut time = mean / shape.mean_motion;
        if let Some(period) = shape.period {
            if time < 0.0 {
                time += period;
            }
        }

        Self {
            mean_anomaly: mean,
            eccentric_anomaly: ecc,
            true_anomaly: nu,
            angular_position: angular_position(nu, shape),
            radius_m: radius,
            altitude_m: altitude,
            speed_m_s: shape.speed_at_radius(radius),
            time_since_periapsis_s: time,
            gravitational_acceleration_m_s2: parent.gravitational_acceleration_m_s2(altitude),
        }
    }
}

fn angular_position(true_anomaly: f64, shape: &Shape) -> f64 {
    normalize_positive(
        true_anomaly + shape.longitude_of_ascending_node + shape.argument_of_periapsis,
    )
}

//! Immutable two-body conics.
//!
//! The semi-major axis is stored as a positive magnitude for both conics;
//! formulas branch on [`Conic`] instead of relying on the sign convention for
//! hyperbolae. Everything derivable from the elements is computed once, at
//! construction.

use std::f64::consts::TAU;
use std::fmt;
use std::sync::Arc;

use conic_core::angle::{normalize_inclination, normalize_positive, rad_to_deg};
use conic_core::units::m_to_km;

use crate::anomaly::OrbitPoint;
use crate::{Body, ManeuverPoint, OrbitError};

/// The two supported conic sections. Parabolic orbits are not modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conic {
    /// `0 ≤ e < 1`
    Elliptic,
    /// `e > 1`
    Hyperbolic,
}

impl Conic {
    /// Classify an eccentricity.
    pub fn of(eccentricity: f64) -> Result<Self, OrbitError> {
        if !(eccentricity >= 0.0) || !eccentricity.is_finite() {
            Err(OrbitError::InvalidEccentricity(eccentricity))
        } else if eccentricity < 1.0 {
            Ok(Self::Elliptic)
        } else if eccentricity > 1.0 {
            Ok(Self::Hyperbolic)
        } else {
            Err(OrbitError::Parabolic)
        }
    }
}

impl fmt::Display for Conic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Elliptic => "elliptic",
            Self::Hyperbolic => "hyperbolic",
        })
    }
}

/// Classical elements, SI units and radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalElements {
    pub semi_major_axis_m: f64,
    pub eccentricity: f64,
    pub inclination_rad: f64,
    pub argument_of_periapsis_rad: f64,
    pub longitude_of_ascending_node_rad: f64,
    pub mean_anomaly_at_epoch_rad: f64,
}

impl OrbitalElements {
    /// Equatorial elements with periapsis at the reference direction at epoch.
    pub fn new(semi_major_axis_m: f64, eccentricity: f64) -> Self {
        Self {
            semi_major_axis_m,
            eccentricity,
            inclination_rad: 0.0,
            argument_of_periapsis_rad: 0.0,
            longitude_of_ascending_node_rad: 0.0,
            mean_anomaly_at_epoch_rad: 0.0,
        }
    }

    pub fn with_inclination(mut self, rad: f64) -> Self {
        self.inclination_rad = rad;
        self
    }

    pub fn with_argument_of_periapsis(mut self, rad: f64) -> Self {
        self.argument_of_periapsis_rad = rad;
        self
    }

    pub fn with_longitude_of_ascending_node(mut self, rad: f64) -> Self {
        self.longitude_of_ascending_node_rad = rad;
        self
    }

    pub fn with_mean_anomaly_at_epoch(mut self, rad: f64) -> Self {
        self.mean_anomaly_at_epoch_rad = rad;
        self
    }
}

/// Elements plus the quantities every point query needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Shape {
    pub conic: Conic,
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub argument_of_periapsis: f64,
    pub longitude_of_ascending_node: f64,
    pub mu: f64,
    pub angular_momentum: f64,
    pub mean_motion: f64,
    pub period: Option<f64>,
}

impl Shape {
    fn new(mu: f64, conic: Conic, elements: &OrbitalElements) -> Self {
        let a = elements.semi_major_axis_m;
        let mut shape = Self {
            conic,
            semi_major_axis: a,
            eccentricity: elements.eccentricity,
            inclination: normalize_inclination(elements.inclination_rad),
            argument_of_periapsis: normalize_positive(elements.argument_of_periapsis_rad),
            longitude_of_ascending_node: normalize_positive(
                elements.longitude_of_ascending_node_rad,
            ),
            mu,
            angular_momentum: 0.0,
            mean_motion: (mu / (a * a * a)).sqrt(),
            period: match conic {
                Conic::Elliptic => Some(TAU / mu.sqrt() * a.powf(1.5)),
                Conic::Hyperbolic => None,
            },
        };
        let (pe, ap) = (shape.periapsis_radius(), shape.apoapsis_radius());
        shape.angular_momentum = (2.0 * mu * (ap * pe / (pe + ap))).sqrt();
        shape
    }

    pub fn periapsis_radius(&self) -> f64 {
        let (a, e) = (self.semi_major_axis, self.eccentricity);
        match self.conic {
            Conic::Elliptic => a * (1.0 - e),
            Conic::Hyperbolic => a * (e - 1.0),
        }
    }

    /// Negative for hyperbolae.
    pub fn apoapsis_radius(&self) -> f64 {
        let (a, e) = (self.semi_major_axis, self.eccentricity);
        match self.conic {
            Conic::Elliptic => a * (1.0 + e),
            Conic::Hyperbolic => -a * (1.0 + e),
        }
    }

    /// Vis-viva.
    pub fn speed_at_radius(&self, radius: f64) -> f64 {
        let inverse_a = match self.conic {
            Conic::Elliptic => -1.0 / self.semi_major_axis,
            Conic::Hyperbolic => 1.0 / self.semi_major_axis,
        };
        (self.mu * (2.0 / radius + inverse_a)).max(0.0).sqrt()
    }
}

/// An elliptic or hyperbolic orbit about a parent body.
#[derive(Clone)]
pub struct Orbit {
    parent: Arc<Body>,
    shape: Shape,
    mean_anomaly_at_epoch: f64,
    periapsis: OrbitPoint,
    apoapsis: Option<OrbitPoint>,
    at_epoch: OrbitPoint,
}

impl Orbit {
    /// Build an orbit whose eccentricity must match `conic`.
    pub fn new(
        parent: Arc<Body>,
        conic: Conic,
        elements: OrbitalElements,
    ) -> Result<Self, OrbitError> {
        let a = elements.semi_major_axis_m;
        if !(a > 0.0) || !a.is_finite() {
            return Err(OrbitError::NonPositiveSemiMajorAxis(a));
        }
        let actual = Conic::of(elements.eccentricity)?;
        if actual != conic {
            return Err(OrbitError::EccentricityMismatch {
                eccentricity: elements.eccentricity,
                expected: conic,
            });
        }
        Ok(Self::assemble(parent, conic, &elements))
    }

    /// Build an orbit, classifying the conic from the eccentricity.
    pub fn from_elements(parent: Arc<Body>, elements: OrbitalElements) -> Result<Self, OrbitError> {
        let conic = Conic::of(elements.eccentricity)?;
        Self::new(parent, conic, elements)
    }

    pub fn elliptic(parent: Arc<Body>, elements: OrbitalElements) -> Result<Self, OrbitError> {
        Self::new(parent, Conic::Elliptic, elements)
    }

    pub fn hyperbolic(parent: Arc<Body>, elements: OrbitalElements) -> Result<Self, OrbitError> {
        Self::new(parent, Conic::Hyperbolic, elements)
    }

    fn assemble(parent: Arc<Body>, conic: Conic, elements: &OrbitalElements) -> Self {
        let shape = Shape::new(parent.mu_m3_s2, conic, elements);
        let mean_anomaly_at_epoch = match conic {
            Conic::Elliptic => normalize_positive(elements.mean_anomaly_at_epoch_rad),
            Conic::Hyperbolic => elements.mean_anomaly_at_epoch_rad,
        };
        let periapsis = OrbitPoint::periapsis(&shape, &parent);
        let apoapsis = OrbitPoint::apoapsis(&shape, &parent);
        let at_epoch = OrbitPoint::from_mean_anomaly(&shape, &parent, mean_anomaly_at_epoch);
        Self {
            parent,
            shape,
            mean_anomaly_at_epoch,
            periapsis,
            apoapsis,
            at_epoch,
        }
    }

    pub fn circular_from_radius(parent: Arc<Body>, radius_m: f64) -> Result<Self, OrbitError> {
        Self::elliptic(parent, OrbitalElements::new(radius_m, 0.0))
    }

    pub fn circular_from_altitude(parent: Arc<Body>, altitude_m: f64) -> Result<Self, OrbitError> {
        let radius = parent.radius_from_altitude(altitude_m);
        Self::circular_from_radius(parent, radius)
    }

    /// Circular orbit at the edge of the parent's sphere of influence. Fails for
    /// a root body, whose sphere of influence is unbounded.
    pub fn circular_at_soi_edge(parent: Arc<Body>) -> Result<Self, OrbitError> {
        if parent.orbit.is_none() {
            return Err(OrbitError::InvalidBody {
                name: parent.name.clone(),
                reason: "a root body has an unbounded sphere of influence",
            });
        }
        let radius = parent.sphere_of_influence_m();
        Self::circular_from_radius(parent, radius)
    }

    /// Ellipse through two apsides, `periapsis_m ≤ apoapsis_m`.
    pub fn elliptic_from_radii(
        parent: Arc<Body>,
        periapsis_m: f64,
        apoapsis_m: f64,
    ) -> Result<Self, OrbitError> {
        let e = (apoapsis_m - periapsis_m) / (apoapsis_m + periapsis_m);
        let a = periapsis_m / (1.0 - e);
        Self::elliptic(parent, OrbitalElements::new(a, e))
    }

    pub fn elliptic_from_altitudes(
        parent: Arc<Body>,
        periapsis_altitude_m: f64,
        apoapsis_altitude_m: f64,
    ) -> Result<Self, OrbitError> {
        let pe = parent.radius_from_altitude(periapsis_altitude_m);
        let ap = parent.radius_from_altitude(apoapsis_altitude_m);
        Self::elliptic_from_radii(parent, pe, ap)
    }

    /// Hyperbola from its periapsis and the signed apoapsis marker, which must
    /// be negative and larger in magnitude than the periapsis.
    pub fn hyperbolic_from_radii(
        parent: Arc<Body>,
        periapsis_m: f64,
        apoapsis_m: f64,
    ) -> Result<Self, OrbitError> {
        let a = (-apoapsis_m - periapsis_m) * 0.5;
        if !(a > 0.0) {
            return Err(OrbitError::NonPositiveSemiMajorAxis(a));
        }
        let e = periapsis_m / a + 1.0;
        Self::hyperbolic(parent, OrbitalElements::new(a, e))
    }

    /// Hyperbola with the given periapsis and speed at infinity.
    pub fn hyperbolic_from_excess_speed(
        parent: Arc<Body>,
        periapsis_m: f64,
        excess_speed_m_s: f64,
    ) -> Result<Self, OrbitError> {
        let e = 1.0 + excess_speed_m_s * excess_speed_m_s * periapsis_m / parent.mu_m3_s2;
        let a = periapsis_m / (e - 1.0);
        Self::hyperbolic(parent, OrbitalElements::new(a, e))
    }

    /// Same shape and phase in a different plane.
    pub fn with_plane(
        &self,
        inclination_rad: f64,
        argument_of_periapsis_rad: f64,
        longitude_of_ascending_node_rad: f64,
    ) -> Self {
        let elements = self
            .elements()
            .with_inclination(inclination_rad)
            .with_argument_of_periapsis(argument_of_periapsis_rad)
            .with_longitude_of_ascending_node(longitude_of_ascending_node_rad);
        Self::assemble(Arc::clone(&self.parent), self.shape.conic, &elements)
    }

    pub fn with_inclination(&self, inclination_rad: f64) -> Self {
        self.with_plane(
            inclination_rad,
            self.shape.argument_of_periapsis,
            self.shape.longitude_of_ascending_node,
        )
    }

    pub fn with_mean_anomaly_at_epoch(&self, mean_anomaly_rad: f64) -> Self {
        let elements = self.elements().with_mean_anomaly_at_epoch(mean_anomaly_rad);
        Self::assemble(Arc::clone(&self.parent), self.shape.conic, &elements)
    }

    /// Circular orbit with the same semi-major axis, plane and epoch phase.
    pub fn circularize(&self) -> Self {
        if self.is_circular() {
            return self.clone();
        }
        let elements = OrbitalElements {
            eccentricity: 0.0,
            ..self.elements()
        };
        Self::assemble(Arc::clone(&self.parent), Conic::Elliptic, &elements)
    }

    pub fn parent(&self) -> &Arc<Body> {
        &self.parent
    }

    pub fn conic(&self) -> Conic {
        self.shape.conic
    }

    pub fn is_elliptic(&self) -> bool {
        self.shape.conic == Conic::Elliptic
    }

    pub fn is_hyperbolic(&self) -> bool {
        self.shape.conic == Conic::Hyperbolic
    }

    pub fn is_circular(&self) -> bool {
        self.is_elliptic() && self.shape.eccentricity == 0.0
    }

    /// Whether both orbits are about the same body.
    pub fn shares_parent(&self, other: &Orbit) -> bool {
        self.parent.same_as(&other.parent)
    }

    pub fn elements(&self) -> OrbitalElements {
        OrbitalElements {
            semi_major_axis_m: self.shape.semi_major_axis,
            eccentricity: self.shape.eccentricity,
            inclination_rad: self.shape.inclination,
            argument_of_periapsis_rad: self.shape.argument_of_periapsis,
            longitude_of_ascending_node_rad: self.shape.longitude_of_ascending_node,
            mean_anomaly_at_epoch_rad: self.mean_anomaly_at_epoch,
        }
    }

    pub fn semi_major_axis_m(&self) -> f64 {
        self.shape.semi_major_axis
    }

    pub fn eccentricity(&self) -> f64 {
        self.shape.eccentricity
    }

    /// In `[0, π]`.
    pub fn inclination_rad(&self) -> f64 {
        self.shape.inclination
    }

    pub fn argument_of_periapsis_rad(&self) -> f64 {
        self.shape.argument_of_periapsis
    }

    pub fn longitude_of_ascending_node_rad(&self) -> f64 {
        self.shape.longitude_of_ascending_node
    }

    pub fn mean_anomaly_at_epoch_rad(&self) -> f64 {
        self.mean_anomaly_at_epoch
    }

    /// Specific angular momentum (`m^2/s`).
    pub fn angular_momentum_m2_s(&self) -> f64 {
        self.shape.angular_momentum
    }

    /// Mean motion (`rad/s`), `√(μ/a³)`.
    pub fn mean_motion_rad_s(&self) -> f64 {
        self.shape.mean_motion
    }

    /// Orbital period; `None` for hyperbolae.
    pub fn period_s(&self) -> Option<f64> {
        self.shape.period
    }

    pub fn periapsis(&self) -> &OrbitPoint {
        &self.periapsis
    }

    /// `None` for hyperbolae.
    pub fn apoapsis(&self) -> Option<&OrbitPoint> {
        self.apoapsis.as_ref()
    }

    /// The point the orbit is at when its clock reads zero.
    pub fn point_at_epoch(&self) -> &OrbitPoint {
        &self.at_epoch
    }

    pub fn periapsis_radius_m(&self) -> f64 {
        self.shape.periapsis_radius()
    }

    /// Apoapsis radius; for a hyperbola this is the negative marker `-a(1+e)`.
    pub fn apoapsis_radius_m(&self) -> f64 {
        self.shape.apoapsis_radius()
    }

    pub fn periapsis_speed_m_s(&self) -> f64 {
        self.periapsis.speed_m_s
    }

    pub fn apoapsis_speed_m_s(&self) -> Option<f64> {
        self.apoapsis.map(|p| p.speed_m_s)
    }

    /// Specific orbital energy (`J/kg`).
    pub fn specific_energy_j_kg(&self) -> f64 {
        let e = self.shape.mu / (2.0 * self.shape.semi_major_axis);
        match self.shape.conic {
            Conic::Elliptic => -e,
            Conic::Hyperbolic => e,
        }
    }

    pub fn semi_minor_axis_m(&self) -> f64 {
        let e = self.shape.eccentricity;
        self.shape.semi_major_axis * (1.0 - e * e).abs().sqrt()
    }

    pub fn semi_latus_rectum_m(&self) -> f64 {
        let e = self.shape.eccentricity;
        self.shape.semi_major_axis * (1.0 - e * e).abs()
    }

    /// Distance from the centre of the conic to the parent's centre.
    pub fn focal_offset_m(&self) -> f64 {
        self.shape.semi_major_axis * self.shape.eccentricity
    }

    /// Speed left at infinity; `None` for bound orbits.
    pub fn excess_speed_m_s(&self) -> Option<f64> {
        match self.shape.conic {
            Conic::Elliptic => None,
            Conic::Hyperbolic => Some((self.shape.mu / self.shape.semi_major_axis).sqrt()),
        }
    }

    /// Radius at a maneuver point; `Unspecified` is the semi-major axis.
    pub fn radius_at(&self, point: ManeuverPoint) -> Result<f64, OrbitError> {
        match point {
            ManeuverPoint::Unspecified => Ok(self.shape.semi_major_axis),
            ManeuverPoint::Periapsis => Ok(self.periapsis.radius_m),
            ManeuverPoint::Apoapsis => self
                .apoapsis
                .map(|p| p.radius_m)
                .ok_or(OrbitError::NoApoapsis),
        }
    }

    /// Speed at a maneuver point; `Unspecified` is `h/a`.
    pub fn speed_at(&self, point: ManeuverPoint) -> Result<f64, OrbitError> {
        match point {
            ManeuverPoint::Unspecified => {
                Ok(self.shape.angular_momentum / self.shape.semi_major_axis)
            }
            ManeuverPoint::Periapsis => Ok(self.periapsis.speed_m_s),
            ManeuverPoint::Apoapsis => self
                .apoapsis
                .map(|p| p.speed_m_s)
                .ok_or(OrbitError::NoApoapsis),
        }
    }

    pub fn point_by_true_anomaly(&self, true_anomaly_rad: f64) -> OrbitPoint {
        OrbitPoint::from_true_anomaly(&self.shape, &self.parent, true_anomaly_rad)
    }

    pub fn point_by_mean_anomaly(&self, mean_anomaly_rad: f64) -> OrbitPoint {
        OrbitPoint::from_mean_anomaly(&self.shape, &self.parent, mean_anomaly_rad)
    }

    /// Point reached `elapsed_s` seconds after epoch.
    pub fn point_by_elapsed_time(&self, elapsed_s: f64) -> OrbitPoint {
        self.point_by_mean_anomaly(self.mean_anomaly_at_epoch + self.shape.mean_motion * elapsed_s)
    }

    /// Point at a fraction of a revolution past periapsis.
    pub fn point_by_period_ratio(&self, ratio: f64) -> OrbitPoint {
        self.point_by_mean_anomaly(TAU * ratio)
    }
}

impl PartialEq for Orbit {
    fn eq(&self, other: &Self) -> bool {
        self.shares_parent(other)
            && self.shape == other.shape
            && self.mean_anomaly_at_epoch == other.mean_anomaly_at_epoch
    }
}

impl fmt::Debug for Orbit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orbit")
            .field("parent", &self.parent.name)
            .field("conic", &self.shape.conic)
            .field("semi_major_axis_m", &self.shape.semi_major_axis)
            .field("eccentricity", &self.shape.eccentricity)
            .field("inclination_rad", &self.shape.inclination)
            .field("argument_of_periapsis_rad", &self.shape.argument_of_periapsis)
            .field(
                "longitude_of_ascending_node_rad",
                &self.shape.longitude_of_ascending_node,
            )
            .field("mean_anomaly_at_epoch_rad", &self.mean_anomaly_at_epoch)
            .finish()
    }
}

impl fmt::Display for Orbit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} orbit about {}: pe {:.1} km, ",
            self.shape.conic,
            self.parent.name,
            m_to_km(self.parent.altitude_from_radius(self.periapsis_radius_m())),
        )?;
        match self.apoapsis {
            Some(ap) => write!(f, "ap {:.1} km, ", m_to_km(ap.altitude_m))?,
            None => write!(f, "escape, ")?,
        }
        write!(
            f,
            "e {:.4}, i {:.2}°",
            self.shape.eccentricity,
            rad_to_deg(self.shape.inclination)
        )
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;

    const EARTH_MU: f64 = 3.986e14;

    fn earth() -> Arc<Body> {
        Arc::new(Body::new("Earth", EARTH_MU, 6_371_000.0, 100_000.0, None).unwrap())
    }

    #[test]
    fn rejects_invalid_elements() {
        let e = earth();
        assert_eq!(
            Orbit::from_elements(e.clone(), OrbitalElements::new(0.0, 0.1)).unwrap_err(),
            OrbitError::NonPositiveSemiMajorAxis(0.0)
        );
        assert!(matches!(
            Orbit::from_elements(e.clone(), OrbitalElements::new(7.0e6, -0.1)),
            Err(OrbitError::InvalidEccentricity(_))
        ));
        assert_eq!(
            Orbit::from_elements(e.clone(), OrbitalElements::new(7.0e6, 1.0)).unwrap_err(),
            OrbitError::Parabolic
        );
        assert!(matches!(
            Orbit::elliptic(e.clone(), OrbitalElements::new(7.0e6, 1.5)),
            Err(OrbitError::EccentricityMismatch { expected: Conic::Elliptic, .. })
        ));
        assert!(matches!(
            Orbit::hyperbolic(e, OrbitalElements::new(7.0e6, 0.5)),
            Err(OrbitError::EccentricityMismatch { expected: Conic::Hyperbolic, .. })
        ));
    }

    #[test]
    fn angles_are_normalised_at_construction() {
        let orbit = Orbit::from_elements(
            earth(),
            OrbitalElements::new(7.0e6, 0.1)
                .with_inclination(PI + 0.25)
                .with_argument_of_periapsis(-0.5)
                .with_longitude_of_ascending_node(3.0 * PI),
        )
        .unwrap();
        assert!((orbit.inclination_rad() - 0.25).abs() < 1e-12);
        assert!((orbit.argument_of_periapsis_rad() - (TAU - 0.5)).abs() < 1e-12);
        assert!((orbit.longitude_of_ascending_node_rad() - PI).abs() < 1e-12);
    }

    #[test]
    fn leo_period_and_speed() {
        let orbit = Orbit::circular_from_radius(earth(), 7_000_000.0).unwrap();
        let period = orbit.period_s().unwrap();
        assert!((period - 5_828.7).abs() < 1.0, "period {period}");
        assert!((orbit.periapsis_speed_m_s() - 7_546.0).abs() < 1.0);
        assert_eq!(orbit.periapsis_speed_m_s(), orbit.apoapsis_speed_m_s().unwrap());
        assert!((orbit.mean_motion_rad_s() - TAU / period).abs() < 1e-12);
    }

    #[test]
    fn elliptic_apsides_and_derived_geometry() {
        let orbit = Orbit::elliptic_from_radii(earth(), 7.0e6, 42.164e6).unwrap();
        assert!((orbit.periapsis_radius_m() - 7.0e6).abs() < 1e-3);
        assert!((orbit.apoapsis_radius_m() - 42.164e6).abs() < 1e-3);
        assert!((orbit.eccentricity() - 35.164 / 49.164).abs() < 1e-12);

        let a = orbit.semi_major_axis_m();
        let e = orbit.eccentricity();
        assert!((orbit.specific_energy_j_kg() + EARTH_MU / (2.0 * a)).abs() < 1e-6);
        assert!((orbit.semi_minor_axis_m() - a * (1.0 - e * e).sqrt()).abs() < 1e-6);
        assert!((orbit.focal_offset_m() - (a - 7.0e6)).abs() < 1e-3);
        assert!(orbit.excess_speed_m_s().is_none());

        // h = r·v at both apsides
        let h = orbit.angular_momentum_m2_s();
        assert!((orbit.periapsis_speed_m_s() * 7.0e6 - h).abs() / h < 1e-12);
        let ap_speed = orbit.apoapsis_speed_m_s().unwrap();
        assert!((ap_speed * 42.164e6 - h).abs() / h < 1e-12);
    }

    #[test]
    fn hyperbolic_orbits_expose_only_a_periapsis() {
        let orbit = Orbit::hyperbolic_from_excess_speed(earth(), 6_700_000.0, 3_000.0).unwrap();
        assert!(orbit.is_hyperbolic());
        assert!(orbit.period_s().is_none());
        assert!(orbit.apoapsis().is_none());
        assert!(orbit.apoapsis_radius_m() < 0.0);
        assert_eq!(orbit.radius_at(ManeuverPoint::Apoapsis), Err(OrbitError::NoApoapsis));
        assert_eq!(orbit.speed_at(ManeuverPoint::Apoapsis), Err(OrbitError::NoApoapsis));
        assert!((orbit.periapsis_radius_m() - 6_700_000.0).abs() < 1e-3);
        assert!((orbit.excess_speed_m_s().unwrap() - 3_000.0).abs() < 1e-6);
        assert!(orbit.specific_energy_j_kg() > 0.0);

        let expected = (3_000.0_f64.powi(2) + 2.0 * EARTH_MU / 6_700_000.0).sqrt();
        assert!((orbit.periapsis_speed_m_s() - expected).abs() < 1e-6);
    }

    #[test]
    fn hyperbola_from_signed_radii_round_trips() {
        let orbit = Orbit::hyperbolic_from_radii(earth(), 7.0e6, -50.0e6).unwrap();
        assert!((orbit.periapsis_radius_m() - 7.0e6).abs() < 1e-3);
        assert!((orbit.apoapsis_radius_m() + 50.0e6).abs() < 1e-3);
        assert!(Orbit::hyperbolic_from_radii(earth(), 7.0e6, -5.0e6).is_err());
    }

    #[test]
    fn unspecified_point_is_the_semi_major_axis_reference() {
        let orbit = Orbit::elliptic_from_radii(earth(), 7.0e6, 9.0e6).unwrap();
        assert_eq!(orbit.radius_at(ManeuverPoint::Unspecified).unwrap(), 8.0e6);
        let v = orbit.speed_at(ManeuverPoint::Unspecified).unwrap();
        assert!((v - orbit.angular_momentum_m2_s() / 8.0e6).abs() < 1e-9);
    }

    #[test]
    fn circularize_keeps_size_plane_and_phase() {
        let orbit = Orbit::from_elements(
            earth(),
            OrbitalElements::new(9.0e6, 0.2)
                .with_inclination(0.3)
                .with_mean_anomaly_at_epoch(1.1),
        )
        .unwrap();
        let round = orbit.circularize();
        assert!(round.is_circular());
        assert_eq!(round.semi_major_axis_m(), orbit.semi_major_axis_m());
        assert_eq!(round.inclination_rad(), orbit.inclination_rad());
        assert_eq!(round.mean_anomaly_at_epoch_rad(), 1.1);
        assert_eq!(round.circularize(), round);
    }

    #[test]
    fn elapsed_time_advances_mean_anomaly_linearly() {
        let orbit = Orbit::from_elements(
            earth(),
            OrbitalElements::new(8.0e6, 0.3).with_mean_anomaly_at_epoch(0.5),
        )
        .unwrap();
        let dt = 600.0;
        let point = orbit.point_by_elapsed_time(dt);
        let expected = 0.5 + orbit.mean_motion_rad_s() * dt;
        assert!((point.mean_anomaly - expected).abs() < 1e-12);
        let half = orbit.point_by_period_ratio(0.5);
        assert!((half.radius_m - orbit.apoapsis_radius_m()).abs() < 1e-3);
        let full = orbit.point_by_elapsed_time(orbit.period_s().unwrap());
        assert!((full.radius_m - orbit.point_at_epoch().radius_m).abs() < 1e-3);
    }

    #[test]
    fn soi_edge_needs_a_parented_body() {
        assert!(matches!(
            Orbit::circular_at_soi_edge(earth()),
            Err(OrbitError::InvalidBody { name, .. }) if name == "Earth"
        ));

        let moon_orbit =
            Orbit::circular_from_radius(earth(), 384_400_000.0).unwrap();
        let moon =
            Arc::new(Body::new("Moon", 4.904_869_5e12, 1_737_400.0, 0.0, Some(moon_orbit)).unwrap());
        let edge = Orbit::circular_at_soi_edge(Arc::clone(&moon)).unwrap();
        assert!((edge.semi_major_axis_m() - moon.sphere_of_influence_m()).abs() < 1e-6);
        assert!(edge.is_circular());
    }
}

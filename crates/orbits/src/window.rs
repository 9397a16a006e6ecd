//! Hohmann phasing between two orbits about the same body.

use std::f64::consts::{PI, SQRT_2, TAU};

use conic_core::angle::normalize_signed;
use tracing::{debug, warn};

use crate::Orbit;

/// Bisection stops once the time bracket is narrower than this.
const WINDOW_TOLERANCE_S: f64 = 1e-3;
const MAX_HALVINGS: u32 = 200;
/// A bisection result is a window only if the lead lands this close to the phase angle.
pub const WINDOW_PHASE_TOLERANCE_RAD: f64 = 1e-6;
/// Phase-error samples per synodic period in [`Orbit::next_transfer_window_s`].
const SAMPLES_PER_SYNODIC_PERIOD: u32 = 16;

impl Orbit {
    /// Angle the target must lead this orbit by at departure for a Hohmann
    /// transfer to arrive together with it. `None` when the parents differ.
    pub fn phase_angle(&self, target: &Orbit) -> Option<f64> {
        if !self.shares_parent(target) {
            return None;
        }
        let ratio = self.semi_major_axis_m() / target.semi_major_axis_m() + 1.0;
        Some(PI * (1.0 - 1.0 / (2.0 * SQRT_2) * (ratio * ratio * ratio).sqrt()))
    }

    /// Time between successive alignments of two bound orbits.
    pub fn synodic_period_s(&self, other: &Orbit) -> Option<f64> {
        let (t1, t2) = (self.period_s()?, other.period_s()?);
        Some(1.0 / (1.0 / t1 - 1.0 / t2).abs())
    }

    /// Bisect one inner period after `since_epoch_s` for the moment the
    /// outer orbit leads the inner one by the Hohmann phase angle.
    ///
    /// The search only covers `[0, T_inner)`. When the alignment falls outside
    /// that range the bisection settles on an edge of it, so the result is a
    /// window only if [`Orbit::transfer_phase_error_rad`] is within
    /// [`WINDOW_PHASE_TOLERANCE_RAD`] there; [`Orbit::next_transfer_window_s`]
    /// does that check.
    ///
    /// `None` when either orbit is unbound, the parents differ, or the orbits
    /// have the same size and therefore never drift into alignment.
    pub fn time_to_next_transfer_window_s(&self, other: &Orbit, since_epoch_s: f64) -> Option<f64> {
        let (inner, outer, inner_period) = self.window_pair(other)?;
        let target = inner.phase_angle(outer)?;

        let (mut lo, mut hi) = (0.0, inner_period);
        let mut halvings = 0;
        while hi - lo > WINDOW_TOLERANCE_S && halvings < MAX_HALVINGS {
            let mid = (lo + hi) * 0.5;
            if lead_rad(inner, outer, since_epoch_s + mid) - target > 0.0 {
                lo = mid;
            } else {
                hi = mid;
            }
            halvings += 1;
        }

        let wait = (lo + hi) * 0.5;
        debug!(
            inner = %inner.parent().name,
            phase_angle_rad = target,
            wait_s = wait,
            halvings,
            "transfer window bisection"
        );
        Some(wait)
    }

    /// Lead of the outer orbit over the inner one at `since_epoch_s`, minus
    /// the Hohmann phase angle, folded into `(-π, π]`.
    pub fn transfer_phase_error_rad(&self, other: &Orbit, since_epoch_s: f64) -> Option<f64> {
        let (inner, outer, _) = self.window_pair(other)?;
        let target = inner.phase_angle(outer)?;
        Some(normalize_signed(lead_rad(inner, outer, since_epoch_s) - target))
    }

    /// Seconds after `since_epoch_s` until the next transfer window.
    ///
    /// Samples the phase error every sixteenth of a synodic period, then
    /// bisects the first sample pair where it falls through zero without
    /// wrapping. The scan spans one and a half synodic periods. `None` under
    /// the same conditions as [`Orbit::time_to_next_transfer_window_s`], or
    /// when nothing in the scan lines up.
    pub fn next_transfer_window_s(&self, other: &Orbit, since_epoch_s: f64) -> Option<f64> {
        self.window_pair(other)?;
        let synodic = self.synodic_period_s(other)?;
        let step = synodic / SAMPLES_PER_SYNODIC_PERIOD as f64;

        let mut lo = 0.0;
        let mut error_lo = self.transfer_phase_error_rad(other, since_epoch_s)?;
        if error_lo.abs() <= WINDOW_PHASE_TOLERANCE_RAD {
            return Some(0.0);
        }
        for sample in 1..=SAMPLES_PER_SYNODIC_PERIOD * 3 / 2 {
            let hi = sample as f64 * step;
            let error_hi = self.transfer_phase_error_rad(other, since_epoch_s + hi)?;
            if error_lo > 0.0 && error_hi <= 0.0 && error_lo - error_hi < PI {
                let wait = self.bisect_window(other, since_epoch_s, lo, hi);
                let error = self.transfer_phase_error_rad(other, since_epoch_s + wait)?;
                if error.abs() <= WINDOW_PHASE_TOLERANCE_RAD {
                    debug!(sample, wait_s = wait, "transfer window");
                    return Some(wait);
                }
            }
            lo = hi;
            error_lo = error_hi;
        }
        warn!(
            from = %self.parent().name,
            since_epoch_s,
            "no transfer window lines up within a synodic period"
        );
        None
    }

    /// Narrow `[lo, hi]`, where the phase error falls through zero, to the window tolerance.
    fn bisect_window(&self, other: &Orbit, since_epoch_s: f64, mut lo: f64, mut hi: f64) -> f64 {
        let mut halvings = 0;
        while hi - lo > WINDOW_TOLERANCE_S && halvings < MAX_HALVINGS {
            let mid = (lo + hi) * 0.5;
            match self.transfer_phase_error_rad(other, since_epoch_s + mid) {
                Some(error) if error > 0.0 => lo = mid,
                _ => hi = mid,
            }
            halvings += 1;
        }
        (lo + hi) * 0.5
    }

    /// Inner orbit, outer orbit and inner period for a window search.
    fn window_pair<'a>(&'a self, other: &'a Orbit) -> Option<(&'a Orbit, &'a Orbit, f64)> {
        if !self.shares_parent(other) {
            return None;
        }
        let (Some(own_period), Some(other_period)) = (self.period_s(), other.period_s()) else {
            return None;
        };
        if self.semi_major_axis_m() == other.semi_major_axis_m() {
            return None;
        }
        Some(if self.semi_major_axis_m() < other.semi_major_axis_m() {
            (self, other, own_period)
        } else {
            (other, self, other_period)
        })
    }
}

/// Angle by which `outer` leads `inner` at time `t`, in `[0, 2π)`.
fn lead_rad(inner: &Orbit, outer: &Orbit, t: f64) -> f64 {
    let lead = outer.point_by_elapsed_time(t).angular_position
        - inner.point_by_elapsed_time(t).angular_position;
    if lead < 0.0 { lead + TAU } else { lead }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{Body, OrbitalElements};

    fn sun() -> Arc<Body> {
        Arc::new(Body::new("Sun", 1.327_124_4e20, 6.957e8, 0.0, None).unwrap())
    }

    fn circular(parent: &Arc<Body>, a: f64, mean_anomaly: f64) -> Orbit {
        Orbit::from_elements(
            Arc::clone(parent),
            OrbitalElements::new(a, 0.0).with_mean_anomaly_at_epoch(mean_anomaly),
        )
        .unwrap()
    }

    #[test]
    fn earth_to_mars_phase_angle() {
        let sun = sun();
        let earth = circular(&sun, 1.496e11, 0.0);
        let mars = circular(&sun, 2.279e11, 0.0);
        let theta = earth.phase_angle(&mars).unwrap();
        // Classic result: Mars leads by ~44°
        assert!((theta.to_degrees() - 44.3).abs() < 0.5, "theta {}", theta.to_degrees());
    }

    #[test]
    fn equal_orbits_have_zero_phase_and_no_window() {
        let sun = sun();
        let a = circular(&sun, 1.0e11, 0.0);
        let b = circular(&sun, 1.0e11, 1.0);
        assert!(a.phase_angle(&b).unwrap().abs() < 1e-12);
        assert_eq!(a.time_to_next_transfer_window_s(&b, 0.0), None);
    }

    #[test]
    fn window_lands_on_the_phase_angle() {
        let sun = sun();
        let inner = circular(&sun, 1.496e11, 0.0);
        let outer = circular(&sun, 2.279e11, 2.0);
        let wait = inner.time_to_next_transfer_window_s(&outer, 0.0).unwrap();
        assert!(wait >= 0.0 && wait < inner.period_s().unwrap());

        let theta = inner.phase_angle(&outer).unwrap();
        let mut lead = outer.point_by_elapsed_time(wait).angular_position
            - inner.point_by_elapsed_time(wait).angular_position;
        if lead < 0.0 {
            lead += TAU;
        }
        assert!((lead - theta).abs() < 1e-6, "lead {lead} theta {theta}");

        // argument order does not matter
        let swapped = outer.time_to_next_transfer_window_s(&inner, 0.0).unwrap();
        assert!((swapped - wait).abs() < 1e-9);
    }

    #[test]
    fn windows_more_than_one_inner_period_away_are_found() {
        let sun = sun();
        let inner = circular(&sun, 1.496e11, 0.0);
        // lead starts just short of the ~44° phase angle and has to wrap first
        let outer = circular(&sun, 2.279e11, 0.7);
        let inner_period = inner.period_s().unwrap();

        let edge = inner.time_to_next_transfer_window_s(&outer, 0.0).unwrap();
        let miss = inner.transfer_phase_error_rad(&outer, edge).unwrap();
        assert!(miss.abs() > WINDOW_PHASE_TOLERANCE_RAD, "edge {edge} error {miss}");

        let wait = inner.next_transfer_window_s(&outer, 0.0).unwrap();
        assert!(wait > inner_period, "wait {wait}");
        assert!(wait < inner.synodic_period_s(&outer).unwrap());
        let error = inner.transfer_phase_error_rad(&outer, wait).unwrap();
        assert!(error.abs() <= WINDOW_PHASE_TOLERANCE_RAD, "error {error}");
        assert_eq!(outer.next_transfer_window_s(&inner, 0.0), Some(wait));
    }

    #[test]
    fn window_inside_the_first_period_is_kept() {
        let sun = sun();
        let inner = circular(&sun, 1.496e11, 0.0);
        let outer = circular(&sun, 2.279e11, 2.0);
        let direct = inner.time_to_next_transfer_window_s(&outer, 0.0).unwrap();
        let next = inner.next_transfer_window_s(&outer, 0.0).unwrap();
        assert!((next - direct).abs() < 1e-2, "next {next} direct {direct}");
    }

    #[test]
    fn search_starting_just_after_a_window_waits_a_synodic_period() {
        let sun = sun();
        let inner = circular(&sun, 1.496e11, 0.0);
        let outer = circular(&sun, 2.279e11, 2.0);
        let first = inner.next_transfer_window_s(&outer, 0.0).unwrap();
        let second = inner.next_transfer_window_s(&outer, first + 1.0).unwrap();
        let synodic = inner.synodic_period_s(&outer).unwrap();
        assert!((second + 1.0 - synodic).abs() < 1.0, "second {second} synodic {synodic}");
    }

    #[test]
    fn orbits_about_different_bodies_never_align() {
        let sun = sun();
        let other = Arc::new(Body::new("Other", 1.0e20, 1.0e8, 0.0, None).unwrap());
        let a = circular(&sun, 1.0e11, 0.0);
        let b = circular(&other, 2.0e11, 0.0);
        assert!(a.phase_angle(&b).is_none());
        assert!(a.time_to_next_transfer_window_s(&b, 0.0).is_none());
        assert!(a.next_transfer_window_s(&b, 0.0).is_none());
        assert!(a.transfer_phase_error_rad(&b, 0.0).is_none());
    }

    #[test]
    fn synodic_period_of_earth_and_mars() {
        let sun = sun();
        let earth = circular(&sun, 1.496e11, 0.0);
        let mars = circular(&sun, 2.279e11, 0.0);
        let days = earth.synodic_period_s(&mars).unwrap() / 86_400.0;
        assert!((days - 780.0).abs() < 5.0, "synodic {days} d");
    }
}

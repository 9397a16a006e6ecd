//! Core units, constants, and shared primitives for the conic planner workspace.
//!
//! Everything in the workspace computes in SI units (metres, seconds, radians,
//! kilograms). Configuration and CLI surfaces speak kilometres and degrees and
//! convert through the helpers in [`units`].

/// Physical constants expressed in SI units (unless stated otherwise).
pub mod constants {
    /// Newtonian gravitational constant (m³/(kg·s²)), 2014 CODATA value.
    pub const GRAVITATIONAL_CONSTANT: f64 = 6.674_08e-11;
    /// Standard gravity at Earth's surface (m/s²).
    pub const G0: f64 = 9.80665;
    /// Seconds per Julian day.
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
}

/// Basic unit conversion helpers.
pub mod units {
    /// Convert kilometres to metres.
    #[inline]
    pub fn km_to_m(v: f64) -> f64 {
        v * 1_000.0
    }

    /// Convert metres to kilometres.
    #[inline]
    pub fn m_to_km(v: f64) -> f64 {
        v / 1_000.0
    }

    /// Convert metres per second to kilometres per second.
    #[inline]
    pub fn ms_to_kms(v: f64) -> f64 {
        v / 1_000.0
    }

    /// Convert kilometres per second to metres per second.
    #[inline]
    pub fn kms_to_ms(v: f64) -> f64 {
        v * 1_000.0
    }

    /// Convert tonnes to kilograms.
    #[inline]
    pub fn t_to_kg(v: f64) -> f64 {
        v * 1_000.0
    }

    /// Convert kilonewtons to newtons.
    #[inline]
    pub fn kn_to_n(v: f64) -> f64 {
        v * 1_000.0
    }
}

/// Angle normalisation helpers. All angles are plain `f64` radians.
pub mod angle {
    use std::f64::consts::{PI, TAU};

    /// Remainder of a full turn, keeping the sign of the input.
    #[inline]
    pub fn normalize(rad: f64) -> f64 {
        rad % TAU
    }

    /// Wrap into `[0, 2π)`.
    #[inline]
    pub fn normalize_positive(rad: f64) -> f64 {
        let r = normalize(rad);
        let r = if r < 0.0 { r + TAU } else { r };
        // `-tiny + TAU` can round up to exactly TAU
        if r >= TAU { 0.0 } else { r }
    }

    /// Inclinations live in `[0, π]`; anything past a half turn folds back by π.
    #[inline]
    pub fn normalize_inclination(rad: f64) -> f64 {
        let r = normalize_positive(rad);
        if r > PI { r - PI } else { r }
    }

    /// Fold into `(-π, π]`.
    #[inline]
    pub fn normalize_signed(rad: f64) -> f64 {
        let r = normalize_positive(rad);
        if r > PI { r - TAU } else { r }
    }

    #[inline]
    pub fn deg_to_rad(deg: f64) -> f64 {
        deg.to_radians()
    }

    #[inline]
    pub fn rad_to_deg(rad: f64) -> f64 {
        rad.to_degrees()
    }
}

/// Lightweight time utilities shared across crates.
pub mod time {
    use std::fmt;

    use super::constants::SECONDS_PER_DAY;

    /// Convert days to seconds.
    #[inline]
    pub fn days_to_seconds(days: f64) -> f64 {
        days * SECONDS_PER_DAY
    }

    /// Convert seconds to days.
    #[inline]
    pub fn seconds_to_days(seconds: f64) -> f64 {
        seconds / SECONDS_PER_DAY
    }

    /// Day and year lengths used to present elapsed time. Game systems often
    /// use days and years that have nothing to do with Earth's.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Calendar {
        pub hours_per_day: f64,
        pub days_per_year: u32,
    }

    impl Calendar {
        pub const EARTH: Calendar = Calendar {
            hours_per_day: 24.0,
            days_per_year: 365,
        };

        /// Six-hour days, 426-day years.
        pub const KERBIN: Calendar = Calendar {
            hours_per_day: 6.0,
            days_per_year: 426,
        };

        pub fn day_seconds(&self) -> f64 {
            self.hours_per_day * 3_600.0
        }

        pub fn year_seconds(&self) -> f64 {
            self.day_seconds() * self.days_per_year as f64
        }

        /// Split an elapsed duration into whole years, whole days and the
        /// remaining seconds of the day.
        pub fn split(&self, seconds: f64) -> Elapsed {
            let negative = seconds < 0.0;
            let s = seconds.abs();
            let years = (s / self.year_seconds()).floor();
            let rest = s - years * self.year_seconds();
            let days = (rest / self.day_seconds()).floor();
            Elapsed {
                negative,
                years: years as u64,
                days: days as u32,
                seconds_of_day: rest - days * self.day_seconds(),
            }
        }

        /// Seconds since epoch for a 1-based calendar date.
        pub fn date_to_seconds(&self, year: u32, day: u32, seconds_of_day: f64) -> Option<f64> {
            if year < 1
                || day < 1
                || day > self.days_per_year
                || !(0.0..self.day_seconds()).contains(&seconds_of_day)
            {
                return None;
            }
            Some(
                (year - 1) as f64 * self.year_seconds()
                    + (day - 1) as f64 * self.day_seconds()
                    + seconds_of_day,
            )
        }
    }

    impl Default for Calendar {
        fn default() -> Self {
            Self::EARTH
        }
    }

    /// Elapsed time broken down by a [`Calendar`].
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Elapsed {
        pub negative: bool,
        pub years: u64,
        pub days: u32,
        pub seconds_of_day: f64,
    }

    impl fmt::Display for Elapsed {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let total = self.seconds_of_day.floor() as u64;
            let (h, m, s) = (total / 3_600, (total / 60) % 60, total % 60);
            if self.negative {
                write!(f, "-")?;
            }
            write!(f, "{}y {}d {:02}:{:02}:{:02}", self.years, self.days, h, m, s)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{PI, TAU};

    use super::angle::*;
    use super::time::Calendar;

    #[test]
    fn positive_normalisation_wraps_negative_angles() {
        assert!((normalize_positive(-PI / 2.0) - 1.5 * PI).abs() < 1e-12);
        assert_eq!(normalize_positive(TAU), 0.0);
        assert!((normalize_positive(5.0 * PI) - PI).abs() < 1e-12);
    }

    #[test]
    fn inclination_folds_past_half_turn() {
        let folded = normalize_inclination(deg_to_rad(190.0));
        assert!((rad_to_deg(folded) - 10.0).abs() < 1e-9);
        assert!((normalize_inclination(PI) - PI).abs() < 1e-12);
    }

    #[test]
    fn kerbin_calendar_splits_years_and_days() {
        let cal = Calendar::KERBIN;
        let t = cal.date_to_seconds(3, 10, 3_600.0).unwrap();
        let e = cal.split(t);
        assert_eq!(e.years, 2);
        assert_eq!(e.days, 9);
        assert!((e.seconds_of_day - 3_600.0).abs() < 1e-6);
        assert_eq!(e.to_string(), "2y 9d 01:00:00");
        assert!(cal.date_to_seconds(1, 427, 0.0).is_none());
    }
}

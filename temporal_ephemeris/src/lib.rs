//! Analytic ephemeris for the bodies and angles a birth profile needs.
//!
//! Positions come from truncated series (Sun, Moon) and closed-form
//! spherical astronomy (sidereal time, ascendant). Accuracy is a few
//! hundredths of a degree between 1900 and 2100, which is far below the
//! width of a zodiac sign and well inside a minute for new-moon timing.

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod calc;
mod search;

pub use calc::*;
pub use search::*;

pub type JulianDay = f64;

/// Julian day of 2000-01-01 12:00 TT.
pub const J2000: JulianDay = 2451545.0;
pub const DAYS_PER_CENTURY: f64 = 36525.0;
pub const SYNODIC_MONTH: f64 = 29.530588861;

// ---------------------------
// ## Enumerations
// ---------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Body {
    Sun,
    Moon,
}

// ---------------------------
// ## Error Handling
// ---------------------------

#[derive(Debug, Clone, PartialEq, Error)]
#[error("CalculationError {{ code: {code} message: {message} }}")]
pub struct CalculationError {
    pub code: i32,
    pub message: String,
}

impl CalculationError {
    pub fn no_convergence(what: &str, near: JulianDay) -> Self {
        CalculationError {
            code: -1,
            message: format!("{what} did not converge near JD {near:.5}"),
        }
    }
}

// ---------------------------
// ## Time Scales
// ---------------------------

/// Julian day for a proleptic Gregorian calendar date. `hour` is fractional
/// and may fall outside 0..24; the excess simply shifts the day count.
pub fn julday(year: i32, month: u32, day: u32, hour: f64) -> JulianDay {
    let (mut y, mut m) = (year as f64, month as f64);
    if month <= 2 {
        y -= 1.0;
        m += 12.0;
    }
    let a = (y / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();
    (365.25 * (y + 4716.0)).floor() + (30.6001 * (m + 1.0)).floor() + day as f64 + b - 1524.5
        + hour / 24.0
}

pub fn date_to_julian_day(date_time: &DateTime<Utc>) -> JulianDay {
    let hour = date_time.hour() as f64
        + date_time.minute() as f64 / 60.0
        + (date_time.second() as f64 + date_time.nanosecond() as f64 / 1_000_000_000.0) / 3600.0;
    julday(date_time.year(), date_time.month(), date_time.day(), hour)
}

/// Difference TT - UT in seconds, from the Espenak-Meeus polynomials.
pub fn delta_t_seconds(decimal_year: f64) -> f64 {
    let y = decimal_year;
    if y < 1900.0 {
        let t = (y - 1820.0) / 100.0;
        -20.0 + 32.0 * t * t
    } else if y < 1920.0 {
        let t = y - 1900.0;
        -2.79 + 1.494119 * t - 0.0598939 * t.powi(2) + 0.0061966 * t.powi(3) - 0.000197 * t.powi(4)
    } else if y < 1941.0 {
        let t = y - 1920.0;
        21.20 + 0.84493 * t - 0.076100 * t.powi(2) + 0.0020936 * t.powi(3)
    } else if y < 1961.0 {
        let t = y - 1950.0;
        29.07 + 0.407 * t - t.powi(2) / 233.0 + t.powi(3) / 2547.0
    } else if y < 1986.0 {
        let t = y - 1975.0;
        45.45 + 1.067 * t - t.powi(2) / 260.0 - t.powi(3) / 718.0
    } else if y < 2005.0 {
        let t = y - 2000.0;
        63.86 + 0.3345 * t - 0.060374 * t.powi(2)
            + 0.0017275 * t.powi(3)
            + 0.000651814 * t.powi(4)
            + 0.00002373599 * t.powi(5)
    } else if y < 2050.0 {
        let t = y - 2000.0;
        62.92 + 0.32217 * t + 0.005589 * t.powi(2)
    } else {
        let u = (y - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u - 0.5628 * (2150.0 - y)
    }
}

pub fn ut_to_tt(jd_ut: JulianDay) -> JulianDay {
    let decimal_year = 2000.0 + (jd_ut - J2000) / 365.25;
    jd_ut + delta_t_seconds(decimal_year) / 86400.0
}

pub fn julian_centuries(jd: JulianDay) -> f64 {
    (jd - J2000) / DAYS_PER_CENTURY
}

pub fn normalize_degrees(angle: f64) -> f64 {
    angle.rem_euclid(360.0)
}

/// Wraps an angle into [-180, 180).
pub fn signed_degrees(angle: f64) -> f64 {
    (angle + 180.0).rem_euclid(360.0) - 180.0
}

use tracing::trace;

use super::*;

const MAX_ITERATIONS: usize = 32;

/// Mean daily motion of the Moon relative to the Sun, in degrees.
const ELONGATION_RATE: f64 = 360.0 / SYNODIC_MONTH;

/// Mean daily motion of the Sun, in degrees.
const SOLAR_RATE: f64 = 360.0 / 365.2422;

/// Moon minus Sun longitude in [0, 360).
pub fn elongation(jd_ut: JulianDay) -> f64 {
    normalize_degrees(moon_longitude(jd_ut) - sun_longitude(jd_ut))
}

fn refine_new_moon(guess: JulianDay) -> Result<JulianDay, CalculationError> {
    let mut jd = guess;
    for _ in 0..MAX_ITERATIONS {
        let error = signed_degrees(elongation(jd));
        jd -= error / ELONGATION_RATE;
        if error.abs() < 1e-7 {
            return Ok(jd);
        }
    }
    Err(CalculationError::no_convergence("new moon search", guess))
}

/// The last new moon at or before `jd_ut`.
pub fn new_moon_before(jd_ut: JulianDay) -> Result<JulianDay, CalculationError> {
    let mut new_moon = refine_new_moon(jd_ut - elongation(jd_ut) / ELONGATION_RATE)?;
    if new_moon > jd_ut {
        new_moon = refine_new_moon(new_moon - SYNODIC_MONTH)?;
    }
    trace!(jd_ut, new_moon, "new moon located");
    Ok(new_moon)
}

/// The first new moon strictly after `jd_ut`.
pub fn new_moon_after(jd_ut: JulianDay) -> Result<JulianDay, CalculationError> {
    let previous = new_moon_before(jd_ut)?;
    // A lunation never exceeds 29.9 days, so this lands between the next
    // new moon and the one after it.
    new_moon_before(previous + SYNODIC_MONTH + 1.5)
}

/// The instant nearest `near_jd` at which the Sun's apparent longitude
/// equals `target` degrees.
pub fn solar_longitude_crossing(target: f64, near_jd: JulianDay) -> Result<JulianDay, CalculationError> {
    let mut jd = near_jd;
    for _ in 0..MAX_ITERATIONS {
        let error = signed_degrees(target - sun_longitude(jd));
        jd += error / SOLAR_RATE;
        if error.abs() < 1e-8 {
            return Ok(jd);
        }
    }
    Err(CalculationError::no_convergence("solar longitude search", near_jd))
}

/// December solstice of `year`, as a UT Julian day.
pub fn december_solstice(year: i32) -> Result<JulianDay, CalculationError> {
    solar_longitude_crossing(270.0, julday(year, 12, 21, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const MINUTE: f64 = 1.0 / 1440.0;

    #[test]
    fn test_new_moon_before_lunar_new_year_2024() {
        // New moon of 2024-02-09 22:59 UT.
        let nm = new_moon_before(julday(2024, 2, 10, 0.0)).unwrap();
        assert_abs_diff_eq!(nm, julday(2024, 2, 9, 22.0 + 59.0 / 60.0), epsilon = 3.0 * MINUTE);
    }

    #[test]
    fn test_new_moon_before_never_returns_future() {
        let just_before = julday(2024, 2, 9, 22.0);
        let nm = new_moon_before(just_before).unwrap();
        assert!(nm <= just_before);
        assert!(just_before - nm > 29.0);
    }

    #[test]
    fn test_new_moon_after_is_one_lunation_later() {
        let jd = julday(2024, 2, 10, 0.0);
        let before = new_moon_before(jd).unwrap();
        let after = new_moon_after(jd).unwrap();
        assert!(after > jd);
        let gap = after - before;
        assert!(gap > 29.2 && gap < 29.9, "{gap}");
    }

    #[test]
    fn test_december_solstice_2023() {
        // 2023-12-22 03:27 UT.
        let solstice = december_solstice(2023).unwrap();
        assert_abs_diff_eq!(solstice, julday(2023, 12, 22, 3.45), epsilon = 5.0 * MINUTE);
        assert_abs_diff_eq!(sun_longitude(solstice), 270.0, epsilon = 1e-6);
    }

    #[test]
    fn test_solar_crossing_wraps_through_zero() {
        let equinox = solar_longitude_crossing(0.0, julday(2024, 3, 15, 0.0)).unwrap();
        assert_abs_diff_eq!(equinox, julday(2024, 3, 20, 3.1), epsilon = 10.0 * MINUTE);
    }
}

use super::*;

// Periodic terms for the Moon's longitude: multiples of D, M, M', F and the
// coefficient in millionths of a degree.
const MOON_LONGITUDE_TERMS: [(f64, f64, f64, f64, f64); 34] = [
    (0.0, 0.0, 1.0, 0.0, 6288774.0),
    (2.0, 0.0, -1.0, 0.0, 1274027.0),
    (2.0, 0.0, 0.0, 0.0, 658314.0),
    (0.0, 0.0, 2.0, 0.0, 213618.0),
    (0.0, 1.0, 0.0, 0.0, -185116.0),
    (0.0, 0.0, 0.0, 2.0, -114332.0),
    (2.0, 0.0, -2.0, 0.0, 58793.0),
    (2.0, -1.0, -1.0, 0.0, 57066.0),
    (2.0, 0.0, 1.0, 0.0, 53322.0),
    (2.0, -1.0, 0.0, 0.0, 45758.0),
    (0.0, 1.0, -1.0, 0.0, -40923.0),
    (1.0, 0.0, 0.0, 0.0, -34720.0),
    (0.0, 1.0, 1.0, 0.0, -30383.0),
    (2.0, 0.0, 0.0, -2.0, 15327.0),
    (0.0, 0.0, 1.0, 2.0, -12528.0),
    (0.0, 0.0, 1.0, -2.0, 10980.0),
    (4.0, 0.0, -1.0, 0.0, 10675.0),
    (0.0, 0.0, 3.0, 0.0, 10034.0),
    (4.0, 0.0, -2.0, 0.0, 8548.0),
    (2.0, 1.0, -1.0, 0.0, -7888.0),
    (2.0, 1.0, 0.0, 0.0, -6766.0),
    (1.0, 0.0, -1.0, 0.0, -5163.0),
    (1.0, 1.0, 0.0, 0.0, 4987.0),
    (2.0, -1.0, 1.0, 0.0, 4036.0),
    (2.0, 0.0, 2.0, 0.0, 3994.0),
    (4.0, 0.0, 0.0, 0.0, 3861.0),
    (2.0, 0.0, -3.0, 0.0, 3665.0),
    (0.0, 1.0, -2.0, 0.0, -2689.0),
    (2.0, 0.0, -1.0, 2.0, -2602.0),
    (2.0, -1.0, -2.0, 0.0, 2390.0),
    (1.0, 0.0, 1.0, 0.0, -2348.0),
    (2.0, -2.0, 0.0, 0.0, 2236.0),
    (0.0, 1.0, 2.0, 0.0, -2120.0),
    (0.0, 2.0, 0.0, 0.0, -2069.0),
];

/// Apparent geocentric ecliptic longitude of the Sun, in degrees.
pub fn sun_longitude(jd_ut: JulianDay) -> f64 {
    let t = julian_centuries(ut_to_tt(jd_ut));
    let mean_longitude = 280.46646 + 36000.76983 * t + 0.0003032 * t * t;
    let mean_anomaly = (357.52911 + 35999.05029 * t - 0.0001537 * t * t).to_radians();
    let center = (1.914602 - 0.004817 * t - 0.000014 * t * t) * mean_anomaly.sin()
        + (0.019993 - 0.000101 * t) * (2.0 * mean_anomaly).sin()
        + 0.000289 * (3.0 * mean_anomaly).sin();
    let omega = (125.04 - 1934.136 * t).to_radians();
    normalize_degrees(mean_longitude + center - 0.00569 - 0.00478 * omega.sin())
}

/// Apparent geocentric ecliptic longitude of the Moon, in degrees.
pub fn moon_longitude(jd_ut: JulianDay) -> f64 {
    let t = julian_centuries(ut_to_tt(jd_ut));
    let (t2, t3, t4) = (t * t, t.powi(3), t.powi(4));

    let mean_longitude =
        218.3164477 + 481267.88123421 * t - 0.0015786 * t2 + t3 / 538841.0 - t4 / 65194000.0;
    let elongation =
        297.8501921 + 445267.1114034 * t - 0.0018819 * t2 + t3 / 545868.0 - t4 / 113065000.0;
    let sun_anomaly = 357.5291092 + 35999.0502909 * t - 0.0001536 * t2 + t3 / 24490000.0;
    let moon_anomaly =
        134.9633964 + 477198.8675055 * t + 0.0087414 * t2 + t3 / 69699.0 - t4 / 14712000.0;
    let latitude_argument =
        93.2720950 + 483202.0175233 * t - 0.0036539 * t2 - t3 / 3526000.0 + t4 / 863310000.0;

    // Eccentricity of the Earth's orbit scales the terms that involve M.
    let eccentricity = 1.0 - 0.002516 * t - 0.0000074 * t2;

    let mut sum: f64 = MOON_LONGITUDE_TERMS
        .iter()
        .map(|&(d, m, mp, f, coefficient)| {
            let argument = d * elongation + m * sun_anomaly + mp * moon_anomaly + f * latitude_argument;
            coefficient * eccentricity.powi(m.abs() as i32) * argument.to_radians().sin()
        })
        .sum();

    let a1 = (119.75 + 131.849 * t).to_radians();
    let a2 = (53.09 + 479264.290 * t).to_radians();
    sum += 3958.0 * a1.sin()
        + 1962.0 * (mean_longitude - latitude_argument).to_radians().sin()
        + 318.0 * a2.sin();

    normalize_degrees(mean_longitude + sum / 1_000_000.0 + nutation_in_longitude(t, mean_longitude))
}

/// Nutation in longitude in degrees, from the four largest terms.
fn nutation_in_longitude(t: f64, moon_mean_longitude: f64) -> f64 {
    let omega = (125.04452 - 1934.136261 * t).to_radians();
    let sun_mean_longitude = (280.4665 + 36000.7698 * t).to_radians();
    let moon_mean_longitude = moon_mean_longitude.to_radians();
    let arcseconds = -17.20 * omega.sin() - 1.32 * (2.0 * sun_mean_longitude).sin()
        - 0.23 * (2.0 * moon_mean_longitude).sin()
        + 0.21 * (2.0 * omega).sin();
    arcseconds / 3600.0
}

pub fn longitude(body: Body, jd_ut: JulianDay) -> f64 {
    match body {
        Body::Sun => sun_longitude(jd_ut),
        Body::Moon => moon_longitude(jd_ut),
    }
}

pub fn mean_obliquity(jd_ut: JulianDay) -> f64 {
    let t = julian_centuries(jd_ut);
    23.439291 - 0.0130042 * t
}

/// Greenwich mean sidereal time, in degrees.
pub fn sidereal_time(jd_ut: JulianDay) -> f64 {
    let days = jd_ut - J2000;
    let t = days / DAYS_PER_CENTURY;
    normalize_degrees(
        280.46061837 + 360.98564736629 * days + 0.000387933 * t * t - t.powi(3) / 38710000.0,
    )
}

/// Ecliptic longitude of the point rising on the eastern horizon for an
/// observer at `latitude` (north positive) and `longitude` (east positive).
pub fn ascendant(jd_ut: JulianDay, latitude: f64, longitude: f64) -> f64 {
    let armc = normalize_degrees(sidereal_time(jd_ut) + longitude).to_radians();
    let obliquity = mean_obliquity(jd_ut).to_radians();
    let y = armc.cos();
    let x = -(armc.sin() * obliquity.cos() + latitude.to_radians().tan() * obliquity.sin());
    normalize_degrees(y.atan2(x).to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_sun_position_at_j2000() {
        assert_abs_diff_eq!(sun_longitude(J2000), 280.37, epsilon = 0.02);
    }

    #[test]
    fn test_sun_position_near_equinox() {
        // March equinox 2024 fell on 03-20 03:06 UT.
        let jd = julday(2024, 3, 20, 3.1);
        assert_abs_diff_eq!(signed_degrees(sun_longitude(jd)), 0.0, epsilon = 0.02);
    }

    #[test]
    fn test_moon_position_at_j2000() {
        assert_abs_diff_eq!(moon_longitude(J2000), 223.32, epsilon = 0.05);
    }

    #[test]
    fn test_longitude_dispatch() {
        let jd = julday(1991, 6, 18, 7.0);
        assert_eq!(longitude(Body::Sun, jd), sun_longitude(jd));
        assert_eq!(longitude(Body::Moon, jd), moon_longitude(jd));
    }

    #[test]
    fn test_sidereal_time_at_j2000() {
        assert_abs_diff_eq!(sidereal_time(J2000), 280.46061837, epsilon = 1e-6);
    }

    #[test]
    fn test_ascendant_on_the_equator_without_obliquity_tilt() {
        // On the equator the rising point sits a quarter turn east of the
        // meridian, give or take the obliquity correction.
        let jd = J2000;
        let asc = ascendant(jd, 0.0, 0.0);
        let expected = normalize_degrees(sidereal_time(jd) + 90.0);
        assert!(signed_degrees(asc - expected).abs() < 2.5, "asc {asc} vs {expected}");
    }

    #[test]
    fn test_ascendant_tracks_sun_at_sunrise() {
        // Tokyo, 1974-11-04 07:00 JST: the Sun had risen shortly before.
        let jd = julday(1974, 11, 3, 22.0);
        let asc = ascendant(jd, 35.6895, 139.6917);
        let sun = sun_longitude(jd);
        assert!(asc > sun && asc - sun < 15.0, "asc {asc} sun {sun}");
    }
}

use serde::{Deserialize, Serialize};
use temporal_ephemeris::{ascendant, date_to_julian_day, longitude, Body, CalculationError};
use thiserror::Error;
use tracing::{debug, warn};

use crate::lunar::{day_stem_branch, lunar_date, LunarDate, Nayin, StemBranch};
use crate::{temporal, BirthRecord, ValidationError, ZodiacSign};

// ---------------------------
// ## Error Handling
// ---------------------------

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("celestial provider unavailable: {0}")]
    Unavailable(String),
    #[error("celestial provider rejected input: {0}")]
    Rejected(String),
    #[error(transparent)]
    Calculation(#[from] CalculationError),
}

impl From<ValidationError> for LookupError {
    fn from(err: ValidationError) -> Self {
        LookupError::Rejected(err.to_string())
    }
}

// ---------------------------
// ## Structures
// ---------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub sign: ZodiacSign,
    /// Tropical ecliptic longitude in degrees, [0, 360).
    pub longitude: f64,
}

impl Placement {
    pub fn at(longitude: f64) -> Self {
        Placement { sign: ZodiacSign::from_longitude(longitude), longitude }
    }
}

/// Everything a profile needs from the sky and the calendar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CelestialReading {
    pub sun: Placement,
    pub moon: Placement,
    pub ascendant: Placement,
    pub day_stem_branch: StemBranch,
    pub day_texture: Nayin,
    pub lunar_date: LunarDate,
}

/// A source of zodiac placements and calendar terms for one birth record.
pub trait CelestialLookup {
    fn lookup(&self, birth: &BirthRecord) -> Result<CelestialReading, LookupError>;
}

/// Built-in provider backed by the analytic series in `temporal_ephemeris`.
/// Positions use the zone-resolved UTC instant; calendar terms use the
/// civil birth date.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticEphemeris;

impl AnalyticEphemeris {
    pub fn new() -> Self {
        AnalyticEphemeris
    }
}

impl CelestialLookup for AnalyticEphemeris {
    fn lookup(&self, birth: &BirthRecord) -> Result<CelestialReading, LookupError> {
        let utc = temporal::localize(birth)?;
        let jd_ut = date_to_julian_day(&utc);
        let location = birth.location();

        let sun = Placement::at(longitude(Body::Sun, jd_ut));
        let moon = Placement::at(longitude(Body::Moon, jd_ut));
        let rising = Placement::at(ascendant(jd_ut, location.latitude, location.longitude));

        let day = day_stem_branch(birth.year(), birth.month(), birth.day());
        let lunar = lunar_date(birth.year(), birth.month(), birth.day()).map_err(|err| {
            warn!(civil = %birth.civil(), error = %err, "lunar date search failed");
            err
        })?;

        debug!(
            jd_ut,
            sun = %sun.sign,
            moon = %moon.sign,
            ascendant = %rising.sign,
            day = %day,
            lunar = %lunar,
            "celestial lookup complete"
        );

        Ok(CelestialReading {
            sun,
            moon,
            ascendant: rising,
            day_stem_branch: day,
            day_texture: day.nayin(),
            lunar_date: lunar,
        })
    }
}

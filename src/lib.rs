// src/lib.rs

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

pub mod config;
pub mod ephemeris;
pub mod logging;
pub mod lunar;
pub mod numerology;
pub mod pinnacles;
pub mod profile;
pub mod temporal;

pub use config::{ConfigError, EngineConfig, LocationDefaults};
pub use ephemeris::{AnalyticEphemeris, CelestialLookup, CelestialReading, LookupError};
pub use lunar::{EarthlyBranch, Element, HeavenlyStem, LunarDate, Nayin, StemBranch};
pub use numerology::{digit_sum, reduce, reduce_force_single, LifePathNumber, MASTER_NUMBERS};
pub use pinnacles::{Pinnacle, PinnacleCycle, PlanetaryCycles};
pub use profile::{AnalysisContext, FateEngine, LayerKind, Profile};
pub use temporal::{normalize, DayCountMode, UniversalInstant};
pub use temporal_ephemeris::JulianDay;

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;

// ---------------------------
// ## Enumerations
// ---------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZodiacSign {
    Aries = 0,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    /// Tropical sign for an ecliptic longitude in degrees.
    pub fn from_longitude(longitude: f64) -> Self {
        let sign_index = (longitude.rem_euclid(360.0) / 30.0).floor() as usize;
        // rem_euclid can round up to exactly 360.0 for tiny negative inputs
        Self::ALL[sign_index % 12]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Aries",
            ZodiacSign::Taurus => "Taurus",
            ZodiacSign::Gemini => "Gemini",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Leo",
            ZodiacSign::Virgo => "Virgo",
            ZodiacSign::Libra => "Libra",
            ZodiacSign::Scorpio => "Scorpio",
            ZodiacSign::Sagittarius => "Sagittarius",
            ZodiacSign::Capricorn => "Capricorn",
            ZodiacSign::Aquarius => "Aquarius",
            ZodiacSign::Pisces => "Pisces",
        }
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ---------------------------
// ## Structures
// ---------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Location { latitude, longitude }
    }

    pub fn tokyo() -> Self { Location { latitude: 35.6895, longitude: 139.6917 } }
    pub fn osaka() -> Self { Location { latitude: 34.6937, longitude: 135.5023 } }
    pub fn sapporo() -> Self { Location { latitude: 43.0618, longitude: 141.3545 } }
    pub fn new_york() -> Self { Location { latitude: 40.7128, longitude: -74.0060 } }
    pub fn greenwich() -> Self { Location { latitude: 51.4769, longitude: 0.0 } }

    /// "LAT, LNG" with both coordinates printed the way they were entered.
    pub fn vector(&self) -> String {
        format!("{:?}, {:?}", self.latitude, self.longitude)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ValidationError::LatitudeOutOfRange(self.latitude));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ValidationError::LongitudeOutOfRange(self.longitude));
        }
        Ok(())
    }
}

/// A naive wall-clock date and time, before any timezone is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CivilDateTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

impl CivilDateTime {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        CivilDateTime { year, month, day, hour, minute }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&self.year) {
            return Err(ValidationError::YearOutOfRange(self.year));
        }
        if !(1..=12).contains(&self.month) {
            return Err(ValidationError::MonthOutOfRange(self.month));
        }
        if NaiveDate::from_ymd_opt(self.year, self.month, self.day).is_none() {
            return Err(ValidationError::DayOutOfRange {
                year: self.year,
                month: self.month,
                day: self.day,
            });
        }
        if self.hour > 23 {
            return Err(ValidationError::HourOutOfRange(self.hour));
        }
        if self.minute > 59 {
            return Err(ValidationError::MinuteOutOfRange(self.minute));
        }
        Ok(())
    }
}

impl fmt::Display for CivilDateTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute
        )
    }
}

/// Validated, immutable input to one analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct BirthRecord {
    name: String,
    civil: CivilDateTime,
    location: Location,
    timezone: Tz,
}

impl BirthRecord {
    pub fn new(
        name: impl Into<String>,
        civil: CivilDateTime,
        location: Location,
        timezone: &str,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let record = Self::validated(name, civil, location, timezone);
        if let Err(err) = &record {
            debug!(%civil, timezone, error = %err, "rejected birth record");
        }
        record
    }

    fn validated(
        name: String,
        civil: CivilDateTime,
        location: Location,
        timezone: &str,
    ) -> Result<Self, ValidationError> {
        civil.validate()?;
        location.validate()?;
        let timezone: Tz = timezone
            .parse()
            .map_err(|_| ValidationError::UnknownTimezone(timezone.to_string()))?;
        let record = BirthRecord { name, civil, location, timezone };
        // Reject wall-clock times skipped by a DST transition up front.
        temporal::localize(&record)?;
        Ok(record)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn civil(&self) -> CivilDateTime {
        self.civil
    }

    pub fn year(&self) -> i32 {
        self.civil.year
    }

    pub fn month(&self) -> u32 {
        self.civil.month
    }

    pub fn day(&self) -> u32 {
        self.civil.day
    }

    pub fn hour(&self) -> u32 {
        self.civil.hour
    }

    pub fn minute(&self) -> u32 {
        self.civil.minute
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn timezone_name(&self) -> &'static str {
        self.timezone.name()
    }
}

// ---------------------------
// ## Error Handling
// ---------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("year {0} is outside 1900..=2100")]
    YearOutOfRange(i32),
    #[error("month {0} is outside 1..=12")]
    MonthOutOfRange(u32),
    #[error("{year:04}-{month:02} has no day {day}")]
    DayOutOfRange { year: i32, month: u32, day: u32 },
    #[error("hour {0} is outside 0..=23")]
    HourOutOfRange(u32),
    #[error("minute {0} is outside 0..=59")]
    MinuteOutOfRange(u32),
    #[error("latitude {0} is outside -90..=90")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside -180..=180")]
    LongitudeOutOfRange(f64),
    #[error("unknown IANA timezone {0:?}")]
    UnknownTimezone(String),
    #[error("{civil} does not exist in {timezone}")]
    NonexistentLocalTime { civil: CivilDateTime, timezone: String },
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("invalid birth record: {0}")]
    Validation(#[from] ValidationError),
    #[error("celestial lookup failed: {0}")]
    Lookup(#[from] LookupError),
}

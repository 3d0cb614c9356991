//! Converts a birth record's wall-clock time into a universal day count.

use chrono::{DateTime, LocalResult, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use temporal_ephemeris::{date_to_julian_day, julday, JulianDay};
use tracing::debug;

use crate::{BirthRecord, ValidationError};

/// Hours subtracted from the civil time in [`DayCountMode::FixedOffset`].
pub const DEFAULT_REFERENCE_OFFSET_HOURS: f64 = 9.0;

/// How the layer-0 day count treats the birth timezone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayCountMode {
    /// Subtract a fixed reference offset from the civil hour, whatever the
    /// zone. Matches historical profiles for UTC+9 births.
    #[default]
    FixedOffset,
    /// Use the zone-resolved UTC instant.
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniversalInstant {
    pub utc: DateTime<Utc>,
    pub day_count: JulianDay,
}

/// Resolves the record's wall-clock time in its IANA zone. A repeated hour
/// resolves to its standard-time occurrence.
pub fn localize(birth: &BirthRecord) -> Result<DateTime<Utc>, ValidationError> {
    let civil = birth.civil();
    let naive = NaiveDate::from_ymd_opt(civil.year, civil.month, civil.day)
        .and_then(|date| date.and_hms_opt(civil.hour, civil.minute, 0))
        .ok_or(ValidationError::DayOutOfRange {
            year: civil.year,
            month: civil.month,
            day: civil.day,
        })?;

    let local = match birth.timezone().from_local_datetime(&naive) {
        LocalResult::Single(local) => local,
        LocalResult::Ambiguous(_, standard) => standard,
        LocalResult::None => {
            return Err(ValidationError::NonexistentLocalTime {
                civil,
                timezone: birth.timezone_name().to_string(),
            })
        }
    };
    Ok(local.with_timezone(&Utc))
}

pub fn normalize(
    birth: &BirthRecord,
    mode: DayCountMode,
    reference_offset_hours: f64,
) -> Result<UniversalInstant, ValidationError> {
    let utc = localize(birth)?;
    let day_count = match mode {
        DayCountMode::FixedOffset => {
            let hour = birth.hour() as f64 + birth.minute() as f64 / 60.0 - reference_offset_hours;
            julday(birth.year(), birth.month(), birth.day(), hour)
        }
        DayCountMode::Resolved => date_to_julian_day(&utc),
    };
    debug!(%utc, day_count, ?mode, "normalized birth instant");
    Ok(UniversalInstant { utc, day_count })
}

//! Sexagenary day terms, nayin textures and the Chinese lunisolar date.
//!
//! Lunisolar rules, evaluated in China Standard Time (UTC+8):
//! - a month begins on the civil day of a new moon;
//! - the month containing the December solstice is month 11;
//! - when 13 months separate two consecutive month-11 starts, the first
//!   month in that span without a principal solar term is the leap month
//!   and repeats the number of the month before it.

use serde::{Deserialize, Serialize};
use std::fmt;
use temporal_ephemeris::{
    december_solstice, julday, new_moon_after, new_moon_before, sun_longitude, CalculationError,
    JulianDay,
};
use tracing::trace;

const CHINA_OFFSET_DAYS: f64 = 8.0 / 24.0;

/// Offset that maps a Julian day number onto the sexagenary cycle.
const SEXAGENARY_EPOCH_OFFSET: i64 = 49;

// ---------------------------
// ## Enumerations
// ---------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeavenlyStem {
    Jia,
    Yi,
    Bing,
    Ding,
    Wu,
    Ji,
    Geng,
    Xin,
    Ren,
    Gui,
}

impl HeavenlyStem {
    const ALL: [HeavenlyStem; 10] = [
        HeavenlyStem::Jia,
        HeavenlyStem::Yi,
        HeavenlyStem::Bing,
        HeavenlyStem::Ding,
        HeavenlyStem::Wu,
        HeavenlyStem::Ji,
        HeavenlyStem::Geng,
        HeavenlyStem::Xin,
        HeavenlyStem::Ren,
        HeavenlyStem::Gui,
    ];

    pub fn hanzi(&self) -> &'static str {
        match self {
            HeavenlyStem::Jia => "甲",
            HeavenlyStem::Yi => "乙",
            HeavenlyStem::Bing => "丙",
            HeavenlyStem::Ding => "丁",
            HeavenlyStem::Wu => "戊",
            HeavenlyStem::Ji => "己",
            HeavenlyStem::Geng => "庚",
            HeavenlyStem::Xin => "辛",
            HeavenlyStem::Ren => "壬",
            HeavenlyStem::Gui => "癸",
        }
    }

    pub fn element(&self) -> Element {
        match self {
            HeavenlyStem::Jia | HeavenlyStem::Yi => Element::Wood,
            HeavenlyStem::Bing | HeavenlyStem::Ding => Element::Fire,
            HeavenlyStem::Wu | HeavenlyStem::Ji => Element::Earth,
            HeavenlyStem::Geng | HeavenlyStem::Xin => Element::Metal,
            HeavenlyStem::Ren | HeavenlyStem::Gui => Element::Water,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EarthlyBranch {
    Zi,
    Chou,
    Yin,
    Mao,
    Chen,
    Si,
    Wu,
    Wei,
    Shen,
    You,
    Xu,
    Hai,
}

impl EarthlyBranch {
    const ALL: [EarthlyBranch; 12] = [
        EarthlyBranch::Zi,
        EarthlyBranch::Chou,
        EarthlyBranch::Yin,
        EarthlyBranch::Mao,
        EarthlyBranch::Chen,
        EarthlyBranch::Si,
        EarthlyBranch::Wu,
        EarthlyBranch::Wei,
        EarthlyBranch::Shen,
        EarthlyBranch::You,
        EarthlyBranch::Xu,
        EarthlyBranch::Hai,
    ];

    pub fn hanzi(&self) -> &'static str {
        match self {
            EarthlyBranch::Zi => "子",
            EarthlyBranch::Chou => "丑",
            EarthlyBranch::Yin => "寅",
            EarthlyBranch::Mao => "卯",
            EarthlyBranch::Chen => "辰",
            EarthlyBranch::Si => "巳",
            EarthlyBranch::Wu => "午",
            EarthlyBranch::Wei => "未",
            EarthlyBranch::Shen => "申",
            EarthlyBranch::You => "酉",
            EarthlyBranch::Xu => "戌",
            EarthlyBranch::Hai => "亥",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl Element {
    fn from_hanzi(c: char) -> Option<Self> {
        match c {
            '木' => Some(Element::Wood),
            '火' => Some(Element::Fire),
            '土' => Some(Element::Earth),
            '金' => Some(Element::Metal),
            '水' => Some(Element::Water),
            _ => None,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Element::Wood => "Wood",
            Element::Fire => "Fire",
            Element::Earth => "Earth",
            Element::Metal => "Metal",
            Element::Water => "Water",
        };
        write!(f, "{}", name)
    }
}

// ---------------------------
// ## Sexagenary Terms
// ---------------------------

const NAYIN_NAMES: [&str; 30] = [
    "海中金", "炉中火", "大林木", "路旁土", "剑锋金", "山头火",
    "涧下水", "城头土", "白蜡金", "杨柳木", "泉中水", "屋上土",
    "霹雳火", "松柏木", "长流水", "沙中金", "山下火", "平地木",
    "壁上土", "金箔金", "覆灯火", "天河水", "大驿土", "钗钏金",
    "桑柘木", "大溪水", "沙中土", "天上火", "石榴木", "大海水",
];

/// One of the sixty stem-branch pairs, 0 = 甲子 ... 59 = 癸亥.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StemBranch(u8);

impl StemBranch {
    pub fn from_index(index: i64) -> Self {
        StemBranch(index.rem_euclid(60) as u8)
    }

    pub fn index(&self) -> u8 {
        self.0
    }

    pub fn stem(&self) -> HeavenlyStem {
        HeavenlyStem::ALL[(self.0 % 10) as usize]
    }

    pub fn branch(&self) -> EarthlyBranch {
        EarthlyBranch::ALL[(self.0 % 12) as usize]
    }

    pub fn nayin(&self) -> Nayin {
        Nayin { name: NAYIN_NAMES[(self.0 / 2) as usize] }
    }
}

impl fmt::Display for StemBranch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.stem().hanzi(), self.branch().hanzi())
    }
}

/// The "sound" element shared by two consecutive stem-branch pairs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Nayin {
    name: &'static str,
}

impl Nayin {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn element(&self) -> Element {
        self.name
            .chars()
            .last()
            .and_then(Element::from_hanzi)
            .unwrap_or(Element::Earth)
    }
}

impl fmt::Display for Nayin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Julian day number (integer day count at noon) of a Gregorian date.
pub fn julian_day_number(year: i32, month: u32, day: u32) -> i64 {
    julday(year, month, day, 12.0).round() as i64
}

pub fn day_stem_branch(year: i32, month: u32, day: u32) -> StemBranch {
    StemBranch::from_index(julian_day_number(year, month, day) + SEXAGENARY_EPOCH_OFFSET)
}

// ---------------------------
// ## Lunisolar Date
// ---------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LunarDate {
    pub month: u8,
    pub day: u8,
    pub leap: bool,
}

impl fmt::Display for LunarDate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.leap {
            write!(f, "闰")?;
        }
        write!(f, "{}月{}日", self.month, self.day)
    }
}

/// Civil day number in UTC+8 containing the instant `jd`.
fn china_day(jd: JulianDay) -> i64 {
    (jd + 0.5 + CHINA_OFFSET_DAYS).floor() as i64
}

/// UT instant at which China-time civil day `day` begins.
fn china_day_start(day: i64) -> JulianDay {
    day as f64 - 0.5 - CHINA_OFFSET_DAYS
}

#[derive(Debug, Clone, Copy)]
struct MonthStart {
    day: i64,
    new_moon: JulianDay,
}

/// Start of the month that contains the December solstice of `year`.
fn month_eleven_start(year: i32) -> Result<MonthStart, CalculationError> {
    let solstice_day = china_day(december_solstice(year)?);
    let new_moon = new_moon_before(china_day_start(solstice_day + 1) - 1e-6)?;
    Ok(MonthStart { day: china_day(new_moon), new_moon })
}

fn has_principal_term(from_day: i64, to_day: i64) -> bool {
    let term = |day: i64| (sun_longitude(china_day_start(day)) / 30.0).floor() as i64;
    term(from_day) != term(to_day)
}

/// Lunisolar month and day for a Gregorian calendar date.
pub fn lunar_date(year: i32, month: u32, day: u32) -> Result<LunarDate, CalculationError> {
    let target = julian_day_number(year, month, day);

    let this_year = month_eleven_start(year)?;
    let (first, last) = if target >= this_year.day {
        (this_year, month_eleven_start(year + 1)?)
    } else {
        (month_eleven_start(year - 1)?, this_year)
    };

    let mut starts = vec![first];
    let mut cursor = first.new_moon;
    // A sui holds 12 or 13 months; the bound only guards the loop.
    for _ in 0..14 {
        let new_moon = new_moon_after(cursor + 1.0)?;
        let start = MonthStart { day: china_day(new_moon), new_moon };
        if start.day >= last.day {
            break;
        }
        starts.push(start);
        cursor = new_moon;
    }

    let leap_year = starts.len() == 13;
    let mut numbered: Vec<(u8, bool)> = Vec::with_capacity(starts.len());
    let mut leap_assigned = false;
    for (i, start) in starts.iter().enumerate() {
        let entry = match numbered.last() {
            None => (11, false),
            Some(&(previous, _)) => {
                let end_day = starts.get(i + 1).map_or(last.day, |next| next.day);
                if leap_year && !leap_assigned && !has_principal_term(start.day, end_day) {
                    leap_assigned = true;
                    (previous, true)
                } else {
                    (previous % 12 + 1, false)
                }
            }
        };
        numbered.push(entry);
    }

    let index = starts
        .iter()
        .rposition(|start| start.day <= target)
        .unwrap_or(0);
    let (lunar_month, leap) = numbered[index];
    let lunar_day = (target - starts[index].day + 1) as u8;
    trace!(year, month, day, lunar_month, lunar_day, leap, "lunar date resolved");

    Ok(LunarDate { month: lunar_month, day: lunar_day, leap })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_stem_branch() {
        assert_eq!(day_stem_branch(2000, 1, 1).to_string(), "戊午");
        assert_eq!(day_stem_branch(1974, 11, 4).to_string(), "己酉");
        assert_eq!(day_stem_branch(1984, 2, 2).to_string(), "丙寅");
        assert_eq!(day_stem_branch(2000, 1, 1).index(), 54);
    }

    #[test]
    fn test_consecutive_days_advance_the_cycle() {
        let a = day_stem_branch(2023, 12, 31);
        let b = day_stem_branch(2024, 1, 1);
        assert_eq!((a.index() + 1) % 60, b.index());
    }

    #[test]
    fn test_stem_and_branch_parts() {
        let term = StemBranch::from_index(0);
        assert_eq!(term.stem(), HeavenlyStem::Jia);
        assert_eq!(term.branch(), EarthlyBranch::Zi);
        assert_eq!(term.stem().element(), Element::Wood);
        let last = StemBranch::from_index(-1);
        assert_eq!(last.index(), 59);
        assert_eq!(last.to_string(), "癸亥");
    }

    #[test]
    fn test_nayin() {
        assert_eq!(StemBranch::from_index(0).nayin().name(), "海中金");
        assert_eq!(StemBranch::from_index(1).nayin().name(), "海中金");
        assert_eq!(StemBranch::from_index(0).nayin().element(), Element::Metal);
        let day = day_stem_branch(1974, 11, 4);
        assert_eq!(day.nayin().to_string(), "大驿土");
        assert_eq!(day.nayin().element(), Element::Earth);
        assert_eq!(StemBranch::from_index(59).nayin().element(), Element::Water);
    }

    #[test]
    fn test_lunar_dates() {
        let cases = [
            ((2000, 1, 1), (11, false, 25)),
            ((2024, 2, 10), (1, false, 1)),
            ((1974, 11, 4), (9, false, 21)),
            ((1984, 2, 2), (1, false, 1)),
            ((1990, 1, 27), (1, false, 1)),
        ];
        for ((y, m, d), (month, leap, day)) in cases {
            let date = lunar_date(y, m, d).unwrap();
            assert_eq!(date, LunarDate { month, day, leap }, "{y}-{m}-{d}");
        }
    }

    #[test]
    fn test_leap_months() {
        assert_eq!(lunar_date(2023, 3, 22).unwrap(), LunarDate { month: 2, day: 1, leap: true });
        assert_eq!(lunar_date(2023, 4, 19).unwrap(), LunarDate { month: 2, day: 29, leap: true });
        assert_eq!(lunar_date(2023, 4, 20).unwrap(), LunarDate { month: 3, day: 1, leap: false });
        assert_eq!(lunar_date(2020, 5, 23).unwrap(), LunarDate { month: 4, day: 1, leap: true });
        assert_eq!(lunar_date(2020, 6, 21).unwrap(), LunarDate { month: 5, day: 1, leap: false });
        assert_eq!(lunar_date(2017, 6, 24).unwrap(), LunarDate { month: 6, day: 1, leap: false });
        assert_eq!(lunar_date(2017, 7, 23).unwrap(), LunarDate { month: 6, day: 1, leap: true });
        assert_eq!(lunar_date(2033, 12, 22).unwrap(), LunarDate { month: 11, day: 1, leap: true });
    }

    #[test]
    fn test_lunar_date_display() {
        assert_eq!(LunarDate { month: 9, day: 21, leap: false }.to_string(), "9月21日");
        assert_eq!(LunarDate { month: 2, day: 1, leap: true }.to_string(), "闰2月1日");
    }
}

//! Life chapters ("pinnacles") and the age-driven planetary cycle labels.
//!
//! Four pinnacle numbers come from the birth month, day and year, each
//! first forced to a single digit. The first chapter ends at
//! `36 - life path` (life path forced to one digit), and each of the next
//! two lasts nine years; the fourth is open-ended.

use serde::{Deserialize, Serialize};

use crate::numerology::{reduce, reduce_force_single, LifePathNumber};

pub const FIRST_CHAPTER_BASE_AGE: i32 = 36;
pub const CHAPTER_LENGTH: i32 = 9;
pub const SATURN_RETURN_YEARS: f64 = 29.5;
pub const JUPITER_CYCLE_YEARS: i32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pinnacle {
    pub ordinal: u8,
    pub number: u32,
    pub age_start: i32,
    /// Inclusive; `None` for the open-ended fourth chapter.
    pub age_end: Option<i32>,
}

impl Pinnacle {
    pub fn stage_name(&self) -> &'static str {
        match self.ordinal {
            1 => "1st Pinnacle (Formation)",
            2 => "2nd Pinnacle (Production)",
            3 => "3rd Pinnacle (Maturation)",
            _ => "4th Pinnacle (Integration)",
        }
    }

    pub fn period_range(&self) -> String {
        match self.age_end {
            Some(end) => format!("Age {} - {}", self.age_start, end),
            None => format!("Age {}+", self.age_start),
        }
    }

    /// Membership by upper bound only; ages below the first chapter's start
    /// still belong to it.
    fn covers(&self, age: i32) -> bool {
        self.age_end.map_or(true, |end| age <= end)
    }
}

/// Upper (inclusive) ages of chapters one to three.
pub fn age_boundaries(life_path: LifePathNumber) -> [i32; 3] {
    let first = FIRST_CHAPTER_BASE_AGE - life_path.single_digit() as i32;
    let second = first + CHAPTER_LENGTH;
    [first, second, second + CHAPTER_LENGTH]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnacleCycle {
    pub pinnacles: [Pinnacle; 4],
    /// Age the current chapter is evaluated at.
    pub age: i32,
}

impl PinnacleCycle {
    pub fn compute(year: u32, month: u32, day: u32, life_path: LifePathNumber, age: i32) -> Self {
        let month_base = reduce_force_single(month);
        let day_base = reduce_force_single(day);
        let year_base = reduce_force_single(year);

        let first = reduce(month_base + day_base);
        let second = reduce(day_base + year_base);
        // The third sums the first two as reduced, master numbers included.
        let third = reduce(first + second);
        let fourth = reduce(month_base + year_base);

        let [end_1, end_2, end_3] = age_boundaries(life_path);
        let pinnacles = [
            Pinnacle { ordinal: 1, number: first, age_start: 0, age_end: Some(end_1) },
            Pinnacle { ordinal: 2, number: second, age_start: end_1 + 1, age_end: Some(end_2) },
            Pinnacle { ordinal: 3, number: third, age_start: end_2 + 1, age_end: Some(end_3) },
            Pinnacle { ordinal: 4, number: fourth, age_start: end_3 + 1, age_end: None },
        ];
        PinnacleCycle { pinnacles, age }
    }

    fn index_for_age(pinnacles: &[Pinnacle; 4], age: i32) -> usize {
        pinnacles
            .iter()
            .position(|pinnacle| pinnacle.covers(age))
            .unwrap_or(pinnacles.len() - 1)
    }

    pub fn current(&self) -> &Pinnacle {
        self.chapter_for_age(self.age)
    }

    pub fn chapter_for_age(&self, age: i32) -> &Pinnacle {
        &self.pinnacles[Self::index_for_age(&self.pinnacles, age)]
    }

    pub fn numbers(&self) -> [u32; 4] {
        self.pinnacles.map(|pinnacle| pinnacle.number)
    }
}

/// Descriptive cycle labels derived from age alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetaryCycles {
    pub saturn_round: i32,
    pub jupiter_phase: i32,
}

impl PlanetaryCycles {
    pub fn for_age(age: i32) -> Self {
        PlanetaryCycles {
            saturn_round: (age as f64 / SATURN_RETURN_YEARS).floor() as i32 + 1,
            jupiter_phase: age.rem_euclid(JUPITER_CYCLE_YEARS),
        }
    }

    pub fn saturn_label(&self) -> String {
        format!("Round {}", self.saturn_round)
    }

    pub fn jupiter_label(&self) -> String {
        format!("Year {}/{}", self.jupiter_phase, JUPITER_CYCLE_YEARS)
    }
}

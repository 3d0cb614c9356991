use serde::{Deserialize, Serialize};
use std::fmt;

/// Values that `reduce` leaves untouched.
pub const MASTER_NUMBERS: [u32; 3] = [11, 22, 33];

/// Sum of the base-10 digits of `n`.
pub fn digit_sum(mut n: u32) -> u32 {
    let mut sum = 0;
    while n > 0 {
        sum += n % 10;
        n /= 10;
    }
    sum
}

pub fn is_master(n: u32) -> bool {
    MASTER_NUMBERS.contains(&n)
}

/// Standard reduction: digit-sum until the value is a single digit or a
/// master number.
pub fn reduce(mut n: u32) -> u32 {
    while n > 9 && !is_master(n) {
        n = digit_sum(n);
    }
    n
}

/// Digit-sum until a single digit remains, master numbers included. Used
/// for calculation bases where 11/22/33 would break the arithmetic.
pub fn reduce_force_single(mut n: u32) -> u32 {
    while n > 9 {
        n = digit_sum(n);
    }
    n
}

/// Life path: the reduced sum of birth year, month and day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LifePathNumber(u32);

impl LifePathNumber {
    pub fn from_date(year: u32, month: u32, day: u32) -> Self {
        LifePathNumber(reduce(year + month + day))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn is_master(self) -> bool {
        is_master(self.0)
    }

    /// The life path forced to one digit (11 -> 2, 22 -> 4, 33 -> 6).
    pub fn single_digit(self) -> u32 {
        reduce_force_single(self.0)
    }
}

impl fmt::Display for LifePathNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

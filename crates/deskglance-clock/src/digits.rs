use std::fmt;

use chrono::Timelike;
use serde::{Deserialize, Serialize};

/// Hour as shown on the dial: unchanged in 24-hour mode, otherwise 1–12
/// with midnight and noon both shown as 12.
pub fn display_hour(hour: u32, is_24_hour: bool) -> u32 {
    if is_24_hour {
        return hour;
    }
    match hour % 12 {
        0 => 12,
        h => h,
    }
}

/// Six independently rendered digits, tens then ones for hour, minute, second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClockDigits {
    pub h1: u8,
    pub h2: u8,
    pub m1: u8,
    pub m2: u8,
    pub s1: u8,
    pub s2: u8,
}

impl ClockDigits {
    pub fn from_time<T: Timelike>(time: &T, is_24_hour: bool) -> Self {
        Self::from_parts(display_hour(time.hour(), is_24_hour), time.minute(), time.second())
    }

    /// Each part must be below 100.
    pub fn from_parts(hour: u32, minute: u32, second: u32) -> Self {
        let (h1, h2) = split(hour);
        let (m1, m2) = split(minute);
        let (s1, s2) = split(second);
        Self {
            h1,
            h2,
            m1,
            m2,
            s1,
            s2,
        }
    }

    pub fn as_array(&self) -> [u8; 6] {
        [self.h1, self.h2, self.m1, self.m2, self.s1, self.s2]
    }
}

fn split(value: u32) -> (u8, u8) {
    ((value / 10 % 10) as u8, (value % 10) as u8)
}

impl fmt::Display for ClockDigits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}{}:{}{}",
            self.h1, self.h2, self.m1, self.m2, self.s1, self.s2
        )
    }
}

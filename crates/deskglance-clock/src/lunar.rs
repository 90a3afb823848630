//! Lunar-calendar annotation for the clock face.
//!
//! The clock only needs a converter; [`SexagenaryConverter`] covers the
//! stem-branch cycle and zodiac, which are pure arithmetic. Lunisolar month
//! and day names need the published tables, so converters backed by them
//! fill `month_name` and `day_name`.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

const HEAVENLY_STEMS: [&str; 10] = ["甲", "乙", "丙", "丁", "戊", "己", "庚", "辛", "壬", "癸"];
const EARTHLY_BRANCHES: [&str; 12] = [
    "子", "丑", "寅", "卯", "辰", "巳", "午", "未", "申", "酉", "戌", "亥",
];
const ZODIAC: [&str; 12] = [
    "鼠", "牛", "虎", "兔", "龙", "蛇", "马", "羊", "猴", "鸡", "狗", "猪",
];

/// Start of the stem-branch year, approximated as 立春 on 4 February.
const YEAR_BOUNDARY: (u32, u32) = (2, 4);
/// 2000-01-07, a 甲子 day, counted from 0001-01-01 = 1.
const JIAZI_DAY_FROM_CE: i32 = 730_126;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LunarInfo {
    /// e.g. 丙午
    pub ganzhi_year: String,
    pub zodiac: String,
    pub ganzhi_day: String,
    /// e.g. 九月
    pub month_name: Option<String>,
    /// e.g. 初八
    pub day_name: Option<String>,
}

impl fmt::Display for LunarInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}年", self.ganzhi_year, self.zodiac)?;
        match (&self.month_name, &self.day_name) {
            (Some(month), Some(day)) => write!(f, " {}{}", month, day),
            _ => write!(f, " {}日", self.ganzhi_day),
        }
    }
}

/// Pure conversion from a civil date to its lunar annotation.
pub trait LunarConverter: Send + Sync + 'static {
    fn convert(&self, date: NaiveDate) -> LunarInfo;
}

impl<F> LunarConverter for F
where
    F: Fn(NaiveDate) -> LunarInfo + Send + Sync + 'static,
{
    fn convert(&self, date: NaiveDate) -> LunarInfo {
        self(date)
    }
}

/// Stem-branch year and day with the zodiac animal; no month or day names.
#[derive(Debug, Clone, Copy, Default)]
pub struct SexagenaryConverter;

impl SexagenaryConverter {
    /// Position in the sixty-cycle, 0 = 甲子.
    pub fn year_cycle(date: NaiveDate) -> usize {
        let year = if (date.month(), date.day()) < YEAR_BOUNDARY {
            date.year() - 1
        } else {
            date.year()
        };
        (year - 4).rem_euclid(60) as usize
    }

    pub fn day_cycle(date: NaiveDate) -> usize {
        (date.num_days_from_ce() - JIAZI_DAY_FROM_CE).rem_euclid(60) as usize
    }
}

fn cycle_name(index: usize) -> String {
    format!("{}{}", HEAVENLY_STEMS[index % 10], EARTHLY_BRANCHES[index % 12])
}

impl LunarConverter for SexagenaryConverter {
    fn convert(&self, date: NaiveDate) -> LunarInfo {
        let year = Self::year_cycle(date);
        LunarInfo {
            ganzhi_year: cycle_name(year),
            zodiac: ZODIAC[year % 12].to_string(),
            ganzhi_day: cycle_name(Self::day_cycle(date)),
            month_name: None,
            day_name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_year_pillar() {
        let info = SexagenaryConverter.convert(date(2024, 6, 1));
        assert_eq!(info.ganzhi_year, "甲辰");
        assert_eq!(info.zodiac, "龙");

        let info = SexagenaryConverter.convert(date(2026, 10, 18));
        assert_eq!(info.ganzhi_year, "丙午");
        assert_eq!(info.zodiac, "马");
    }

    #[test]
    fn test_year_changes_at_boundary() {
        assert_eq!(SexagenaryConverter.convert(date(2024, 2, 3)).ganzhi_year, "癸卯");
        assert_eq!(SexagenaryConverter.convert(date(2024, 2, 4)).ganzhi_year, "甲辰");
    }

    #[test]
    fn test_day_pillar() {
        assert_eq!(SexagenaryConverter.convert(date(2000, 1, 7)).ganzhi_day, "甲子");
        assert_eq!(SexagenaryConverter.convert(date(2000, 1, 8)).ganzhi_day, "乙丑");
        assert_eq!(SexagenaryConverter.convert(date(2000, 1, 1)).ganzhi_day, "戊午");
        assert_eq!(SexagenaryConverter.convert(date(2000, 3, 7)).ganzhi_day, "甲子");
    }

    #[test]
    fn test_display_without_month_names() {
        let info = SexagenaryConverter.convert(date(2000, 1, 7));
        assert_eq!(info.to_string(), "己卯兔年 甲子日");
    }

    #[test]
    fn test_closure_converter() {
        let converter = |d: NaiveDate| LunarInfo {
            ganzhi_year: "丙午".into(),
            zodiac: "马".into(),
            ganzhi_day: String::new(),
            month_name: Some("九月".into()),
            day_name: Some(format!("初{}", d.day() - 10)),
        };
        let info = converter.convert(date(2026, 10, 18));
        assert_eq!(info.to_string(), "丙午马年 九月初8");
    }
}

//! Advisory holiday checks for due dates.
//!
//! Nothing here moves a date. A flagged due date is surfaced to an agent, who
//! re-picks it through the normal modification path.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, FixedHoliday};
use crate::payments::ScheduleItem;

/// a concrete holiday in a given year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum HolidayWarning {
    Holiday { date: NaiveDate, name: String },
    Weekend { date: NaiveDate, weekday: Weekday },
}

impl HolidayWarning {
    pub fn date(&self) -> NaiveDate {
        match self {
            HolidayWarning::Holiday { date, .. } | HolidayWarning::Weekend { date, .. } => *date,
        }
    }
}

/// holiday rules; holiday lists are derived per call, never cached
#[derive(Debug, Clone, PartialEq)]
pub struct HolidayCalendar {
    fixed: Vec<FixedHoliday>,
    flag_weekends: bool,
}

impl HolidayCalendar {
    pub fn new(fixed: Vec<FixedHoliday>, flag_weekends: bool) -> Self {
        Self { fixed, flag_weekends }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.fixed_holidays.clone(), config.flag_weekends)
    }

    /// all holidays from `first_year` to `last_year` inclusive, sorted by date
    pub fn holidays_between(&self, first_year: i32, last_year: i32) -> Vec<Holiday> {
        let mut holidays: Vec<Holiday> = (first_year..=last_year)
            .flat_map(|year| self.holidays_in(year))
            .collect();
        holidays.sort_by_key(|h| h.date);
        holidays
    }

    fn holidays_in(&self, year: i32) -> Vec<Holiday> {
        let mut holidays: Vec<Holiday> = self
            .fixed
            .iter()
            .filter_map(|f| {
                NaiveDate::from_ymd_opt(year, f.month, f.day).map(|date| Holiday {
                    date,
                    name: f.name.clone(),
                })
            })
            .collect();

        if let Some(easter) = easter_sunday(year) {
            if let Some(good_friday) = easter.checked_sub_days(Days::new(2)) {
                holidays.push(Holiday {
                    date: good_friday,
                    name: "Good Friday".to_string(),
                });
            }
            if let Some(easter_monday) = easter.checked_add_days(Days::new(1)) {
                holidays.push(Holiday {
                    date: easter_monday,
                    name: "Easter Monday".to_string(),
                });
            }
        }
        holidays
    }

    /// warning for a single due date, if any
    pub fn check(&self, date: NaiveDate) -> Option<HolidayWarning> {
        if let Some(holiday) = self.holidays_in(date.year()).into_iter().find(|h| h.date == date) {
            return Some(HolidayWarning::Holiday {
                date,
                name: holiday.name,
            });
        }
        self.check_weekend(date)
    }

    fn check_weekend(&self, date: NaiveDate) -> Option<HolidayWarning> {
        let weekday = date.weekday();
        if self.flag_weekends && matches!(weekday, Weekday::Sat | Weekday::Sun) {
            return Some(HolidayWarning::Weekend { date, weekday });
        }
        None
    }

    /// one warning per flagged due date in the schedule
    pub fn check_schedule(&self, items: &[ScheduleItem]) -> Vec<HolidayWarning> {
        let (Some(first), Some(last)) = (
            items.iter().map(|i| i.due_date()).min(),
            items.iter().map(|i| i.due_date()).max(),
        ) else {
            return Vec::new();
        };

        let holidays = self.holidays_between(first.year(), last.year());
        items
            .iter()
            .filter_map(|item| {
                let date = item.due_date();
                match holidays.iter().find(|h| h.date == date) {
                    Some(h) => Some(HolidayWarning::Holiday {
                        date,
                        name: h.name.clone(),
                    }),
                    None => self.check_weekend(date),
                }
            })
            .collect()
    }
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// Easter Sunday in the Gregorian calendar (Meeus/Jones/Butcher)
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = ((h + l - 7 * m + 114) % 31) + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::decimal::Rate;
use crate::errors::{Result, ScheduleError};

/// payment frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentFrequency {
    Weekly,
    BiWeekly,
    /// every 15 days, not anchored to the 1st and 15th
    TwiceMonthly,
    Monthly,
}

impl PaymentFrequency {
    pub const ALL: [PaymentFrequency; 4] = [
        PaymentFrequency::Weekly,
        PaymentFrequency::BiWeekly,
        PaymentFrequency::TwiceMonthly,
        PaymentFrequency::Monthly,
    ];

    /// number of payment periods in a year
    pub fn periods_per_year(&self) -> u32 {
        match self {
            PaymentFrequency::Weekly => 52,
            PaymentFrequency::BiWeekly => 26,
            PaymentFrequency::TwiceMonthly => 24,
            PaymentFrequency::Monthly => 12,
        }
    }

    /// interest rate for a single period
    pub fn periodic_rate(&self, annual_rate: Rate) -> Decimal {
        annual_rate.as_decimal() / Decimal::from(self.periods_per_year())
    }

    /// number of payments covering a term expressed in months, rounded up.
    /// `None` when the count does not fit in a `u32`.
    pub fn payments_for_term(&self, term_months: u32) -> Option<u32> {
        let periods = u64::from(term_months) * u64::from(self.periods_per_year());
        u32::try_from(periods.div_ceil(12)).ok()
    }

    /// due date `index` steps after the anchor.
    ///
    /// Monthly steps are measured from the anchor rather than chained, so a
    /// clamped month end (Jan 31 -> Feb 29) does not drag later dates back.
    pub fn due_date(&self, anchor: NaiveDate, index: u32) -> Result<NaiveDate> {
        let stepped = match self {
            PaymentFrequency::Weekly => anchor.checked_add_days(Days::new(7 * index as u64)),
            PaymentFrequency::BiWeekly => anchor.checked_add_days(Days::new(14 * index as u64)),
            PaymentFrequency::TwiceMonthly => {
                anchor.checked_add_days(Days::new(15 * index as u64))
            }
            PaymentFrequency::Monthly => anchor.checked_add_months(Months::new(index)),
        };

        stepped.ok_or_else(|| ScheduleError::InvalidDate {
            message: format!("{} step {} from {} is out of range", self, index, anchor),
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentFrequency::Weekly => "weekly",
            PaymentFrequency::BiWeekly => "bi-weekly",
            PaymentFrequency::TwiceMonthly => "twice-monthly",
            PaymentFrequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentFrequency {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(PaymentFrequency::Weekly),
            "bi-weekly" | "biweekly" => Ok(PaymentFrequency::BiWeekly),
            "twice-monthly" | "semi-monthly" => Ok(PaymentFrequency::TwiceMonthly),
            "monthly" => Ok(PaymentFrequency::Monthly),
            other => Err(ScheduleError::InvalidConfiguration {
                message: format!("unknown payment frequency: {}", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_periods_per_year_table() {
        let table: Vec<u32> = PaymentFrequency::ALL
            .iter()
            .map(|f| f.periods_per_year())
            .collect();
        assert_eq!(table, vec![52, 26, 24, 12]);
    }

    #[test]
    fn test_periodic_rate() {
        let rate = Rate::from_percentage(24);
        assert_eq!(PaymentFrequency::Monthly.periodic_rate(rate), dec!(0.02));
        assert_eq!(PaymentFrequency::TwiceMonthly.periodic_rate(rate), dec!(0.01));
        assert_eq!(PaymentFrequency::BiWeekly.periodic_rate(Rate::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_payments_for_term() {
        assert_eq!(PaymentFrequency::Monthly.payments_for_term(12), Some(12));
        assert_eq!(PaymentFrequency::Weekly.payments_for_term(12), Some(52));
        assert_eq!(PaymentFrequency::BiWeekly.payments_for_term(12), Some(26));
        assert_eq!(PaymentFrequency::TwiceMonthly.payments_for_term(12), Some(24));
        // 3 * 52 / 12 = 13 exactly
        assert_eq!(PaymentFrequency::Weekly.payments_for_term(3), Some(13));
        // 1 * 26 / 12 = 2.17, rounded up
        assert_eq!(PaymentFrequency::BiWeekly.payments_for_term(1), Some(3));
    }

    #[test]
    fn test_payments_for_term_overflow() {
        assert_eq!(PaymentFrequency::Weekly.payments_for_term(1_073_741_823), None);
        assert_eq!(PaymentFrequency::Monthly.payments_for_term(u32::MAX), Some(u32::MAX));
    }

    #[test]
    fn test_fixed_day_steps() {
        let start = date(2024, 1, 1);
        assert_eq!(PaymentFrequency::Weekly.due_date(start, 2).unwrap(), date(2024, 1, 15));
        assert_eq!(PaymentFrequency::BiWeekly.due_date(start, 2).unwrap(), date(2024, 1, 29));
        assert_eq!(PaymentFrequency::TwiceMonthly.due_date(start, 2).unwrap(), date(2024, 1, 31));
        assert_eq!(PaymentFrequency::Monthly.due_date(start, 0).unwrap(), start);
    }

    #[test]
    fn test_monthly_step_preserves_day_of_month() {
        let start = date(2024, 1, 31);
        let monthly = PaymentFrequency::Monthly;
        assert_eq!(monthly.due_date(start, 1).unwrap(), date(2024, 2, 29));
        assert_eq!(monthly.due_date(start, 2).unwrap(), date(2024, 3, 31));
        assert_eq!(monthly.due_date(start, 3).unwrap(), date(2024, 4, 30));
        assert_eq!(monthly.due_date(start, 13).unwrap(), date(2025, 2, 28));
    }

    #[test]
    fn test_string_forms() {
        for freq in PaymentFrequency::ALL {
            assert_eq!(freq.as_str().parse::<PaymentFrequency>().unwrap(), freq);
            let json = serde_json::to_string(&freq).unwrap();
            assert_eq!(json, format!("\"{}\"", freq.as_str()));
        }
        assert_eq!("BiWeekly".parse::<PaymentFrequency>().unwrap(), PaymentFrequency::BiWeekly);
        assert!("fortnightly".parse::<PaymentFrequency>().is_err());
    }
}

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{Result, ScheduleError};
use crate::frequency::PaymentFrequency;
use crate::types::PaymentTerm;

/// terms of a loan as originated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub annual_rate: Rate,
    pub frequency: PaymentFrequency,
    pub term: PaymentTerm,
}

impl LoanTerms {
    pub fn new(principal: Money, annual_rate: Rate, frequency: PaymentFrequency, term: PaymentTerm) -> Self {
        Self {
            principal,
            annual_rate,
            frequency,
            term,
        }
    }

    /// monthly-style loan with a term in months
    pub fn with_term_months(
        principal: Money,
        annual_rate: Rate,
        frequency: PaymentFrequency,
        term_months: u32,
    ) -> Self {
        Self::new(principal, annual_rate, frequency, PaymentTerm::Months(term_months))
    }

    /// loan with an explicit payment count
    pub fn with_payments(
        principal: Money,
        annual_rate: Rate,
        frequency: PaymentFrequency,
        number_of_payments: u32,
    ) -> Self {
        Self::new(principal, annual_rate, frequency, PaymentTerm::Payments(number_of_payments))
    }

    /// resolved payment count
    pub fn number_of_payments(&self) -> Result<u32> {
        match self.term {
            PaymentTerm::Months(months) => self.frequency.payments_for_term(months).ok_or_else(|| {
                ScheduleError::not_computable(format!(
                    "{} months of {} payments overflows the payment count",
                    months, self.frequency
                ))
            }),
            PaymentTerm::Payments(count) => Ok(count),
        }
    }
}

/// fees taken from the contract, resolved by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FeeConfiguration {
    /// flat penalty charged per failed payment
    pub origination_fee: Money,
    pub processing_fee: Money,
    /// one-time fee rolled into the balance on each modification
    pub brokerage_fee: Money,
}

impl FeeConfiguration {
    pub fn new(origination_fee: Money, processing_fee: Money, brokerage_fee: Money) -> Self {
        Self {
            origination_fee,
            processing_fee,
            brokerage_fee,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, fee) in [
            ("origination_fee", self.origination_fee),
            ("processing_fee", self.processing_fee),
            ("brokerage_fee", self.brokerage_fee),
        ] {
            if fee.is_negative() {
                return Err(ScheduleError::InvalidConfiguration {
                    message: format!("{} cannot be negative: {}", name, fee),
                });
            }
        }
        Ok(())
    }
}

/// a holiday observed on the same calendar day every year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedHoliday {
    pub name: String,
    pub month: u32,
    pub day: u32,
}

impl FixedHoliday {
    pub fn new(name: &str, month: u32, day: u32) -> Self {
        Self {
            name: name.to_string(),
            month,
            day,
        }
    }
}

/// engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// allowed gap between a requested payment amount and the computed one
    pub payment_tolerance: Money,
    pub fixed_holidays: Vec<FixedHoliday>,
    /// also warn on saturday and sunday due dates
    pub flag_weekends: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            payment_tolerance: Money::from(dec!(0.01)),
            fixed_holidays: vec![
                FixedHoliday::new("New Year's Day", 1, 1),
                FixedHoliday::new("Canada Day", 7, 1),
                FixedHoliday::new("Remembrance Day", 11, 11),
                FixedHoliday::new("Christmas Day", 12, 25),
                FixedHoliday::new("Boxing Day", 12, 26),
            ],
            flag_weekends: false,
        }
    }
}

impl EngineConfig {
    /// load from json, missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| ScheduleError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.payment_tolerance.is_negative() {
            return Err(ScheduleError::InvalidConfiguration {
                message: format!("payment tolerance cannot be negative: {}", self.payment_tolerance),
            });
        }
        for holiday in &self.fixed_holidays {
            // 2000 is a leap year, so Feb 29 is accepted
            if chrono::NaiveDate::from_ymd_opt(2000, holiday.month, holiday.day).is_none() {
                return Err(ScheduleError::InvalidConfiguration {
                    message: format!(
                        "invalid holiday date {:02}-{:02} for {}",
                        holiday.month, holiday.day, holiday.name
                    ),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_resolution() {
        let principal = Money::from_major(1_000);
        let rate = Rate::from_percentage(29);

        let by_months = LoanTerms::with_term_months(principal, rate, PaymentFrequency::BiWeekly, 6);
        assert_eq!(by_months.number_of_payments(), Ok(13));

        let explicit = LoanTerms::with_payments(principal, rate, PaymentFrequency::BiWeekly, 10);
        assert_eq!(explicit.number_of_payments(), Ok(10));

        let endless = LoanTerms::with_term_months(principal, rate, PaymentFrequency::Weekly, u32::MAX);
        assert!(matches!(endless.number_of_payments(), Err(ScheduleError::NotComputable { .. })));
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.payment_tolerance, Money::CENT);
        assert_eq!(config.fixed_holidays.len(), 5);
        assert!(!config.flag_weekends);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_partial_json() {
        let config = EngineConfig::from_json(r#"{ "payment_tolerance": "0.05", "flag_weekends": true }"#).unwrap();
        assert_eq!(config.payment_tolerance, Money::from(dec!(0.05)));
        assert!(config.flag_weekends);
        assert_eq!(config.fixed_holidays, EngineConfig::default().fixed_holidays);
    }

    #[test]
    fn test_config_rejects_bad_values() {
        assert!(EngineConfig::from_json(r#"{ "payment_tolerance": "-0.01" }"#).is_err());
        assert!(EngineConfig::from_json(
            r#"{ "fixed_holidays": [{ "name": "Nowhere Day", "month": 2, "day": 30 }] }"#
        )
        .is_err());
        assert!(EngineConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_negative_fee_rejected() {
        let fees = FeeConfiguration::new(Money::from_major(55), Money::ZERO, Money::from_major(-1));
        assert!(fees.validate().is_err());
        assert!(FeeConfiguration::default().validate().is_ok());
    }
}

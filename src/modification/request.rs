use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{Result, ScheduleError};
use crate::frequency::PaymentFrequency;
use crate::payments::ScheduleItem;

/// new terms for the unsettled part of a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModificationRequest {
    /// amount the agent quoted to the borrower
    pub payment_amount: Money,
    pub frequency: PaymentFrequency,
    pub number_of_payments: u32,
    pub start_date: NaiveDate,
    /// overrides the loan's current rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_rate: Option<Rate>,
    /// manually adjusted dates and amounts, used verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_schedule: Option<Vec<ScheduleItem>>,
}

impl ModificationRequest {
    pub fn builder() -> ModificationRequestBuilder {
        ModificationRequestBuilder::new()
    }
}

/// builder for modification requests
#[derive(Debug, Default)]
pub struct ModificationRequestBuilder {
    payment_amount: Option<Money>,
    frequency: Option<PaymentFrequency>,
    number_of_payments: Option<u32>,
    start_date: Option<NaiveDate>,
    annual_rate: Option<Rate>,
    edited_schedule: Option<Vec<ScheduleItem>>,
}

impl ModificationRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn payment_amount(mut self, amount: Money) -> Self {
        self.payment_amount = Some(amount);
        self
    }

    pub fn frequency(mut self, frequency: PaymentFrequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn number_of_payments(mut self, count: u32) -> Self {
        self.number_of_payments = Some(count);
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn annual_rate(mut self, rate: Rate) -> Self {
        self.annual_rate = Some(rate);
        self
    }

    pub fn edited_schedule(mut self, items: Vec<ScheduleItem>) -> Self {
        self.edited_schedule = Some(items);
        self
    }

    pub fn build(self) -> Result<ModificationRequest> {
        let payment_amount = self.payment_amount.ok_or(ScheduleError::MissingParameter {
            name: "payment_amount",
        })?;

        let frequency = self.frequency.ok_or(ScheduleError::MissingParameter {
            name: "frequency",
        })?;

        let number_of_payments = self.number_of_payments.ok_or(ScheduleError::MissingParameter {
            name: "number_of_payments",
        })?;

        let start_date = self.start_date.ok_or(ScheduleError::MissingParameter {
            name: "start_date",
        })?;

        Ok(ModificationRequest {
            payment_amount,
            frequency,
            number_of_payments,
            start_date,
            annual_rate: self.annual_rate,
            edited_schedule: self.edited_schedule,
        })
    }
}

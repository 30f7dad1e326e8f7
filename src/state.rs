use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::FeeConfiguration;
use crate::decimal::{Money, Rate};
use crate::errors::{Result, ScheduleError};
use crate::types::{LoanId, PaymentRecord};

/// current state of a loan as read by the servicing workflow.
///
/// The engine never loads or stores this; the caller reads it inside the
/// transaction that will apply the resulting changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanState {
    pub loan_id: LoanId,
    pub remaining_balance: Money,
    pub annual_rate: Rate,
    pub fees: FeeConfiguration,
    pub payments: Vec<PaymentRecord>,
}

impl LoanState {
    pub fn new(
        loan_id: LoanId,
        remaining_balance: Money,
        annual_rate: Rate,
        fees: FeeConfiguration,
        payments: Vec<PaymentRecord>,
    ) -> Self {
        Self {
            loan_id,
            remaining_balance,
            annual_rate,
            fees,
            payments,
        }
    }

    /// payments eligible for cancellation or replacement
    pub fn future_set(&self, today: NaiveDate) -> Vec<&PaymentRecord> {
        self.payments.iter().filter(|p| p.is_future(today)).collect()
    }

    /// failed payments whose due date has passed
    pub fn failed_past(&self, today: NaiveDate) -> Vec<&PaymentRecord> {
        self.payments.iter().filter(|p| p.is_failed_past(today)).collect()
    }

    /// highest payment number among settled records, 0 when none
    pub fn last_settled_number(&self) -> u32 {
        self.payments
            .iter()
            .filter(|p| p.status.is_settled())
            .map(|p| p.payment_number)
            .max()
            .unwrap_or(0)
    }

    pub fn total_settled(&self) -> Money {
        self.payments
            .iter()
            .filter(|p| p.status.is_settled())
            .map(|p| p.amount)
            .sum()
    }

    pub fn validate(&self) -> Result<()> {
        if self.remaining_balance.is_negative() {
            return Err(ScheduleError::InvalidConfiguration {
                message: format!("remaining balance cannot be negative: {}", self.remaining_balance),
            });
        }
        if !self.remaining_balance.is_currency_precision() {
            return Err(ScheduleError::not_computable(format!(
                "remaining balance {} is below currency precision",
                self.remaining_balance
            )));
        }
        for fee in [self.fees.origination_fee, self.fees.brokerage_fee] {
            if !fee.is_currency_precision() {
                return Err(ScheduleError::not_computable(format!(
                    "fee {} is below currency precision",
                    fee
                )));
            }
        }
        if let Some(p) = self.payments.iter().find(|p| !p.interest.is_currency_precision()) {
            return Err(ScheduleError::not_computable(format!(
                "payment {} interest {} is below currency precision",
                p.payment_number, p.interest
            )));
        }
        if self.annual_rate.is_negative() {
            return Err(ScheduleError::InvalidConfiguration {
                message: format!("interest rate cannot be negative: {}", self.annual_rate),
            });
        }
        self.fees.validate()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ScheduleError::InvalidConfiguration {
            message: e.to_string(),
        })
    }

    /// get json representation of current state
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("JSON error: {}", e))
    }
}

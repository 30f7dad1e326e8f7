use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::LoanTerms;
use crate::decimal::{Money, Rate};
use crate::errors::{Result, ScheduleError};
use crate::frequency::PaymentFrequency;
use crate::payments::breakdown::compute_breakdown;
use crate::payments::calculator::compute_payment;
use crate::payments::schedule::{allocate_schedule, build_schedule, ScheduleItem};
use crate::types::PaymentRecord;

/// fully allocated schedule for a newly originated loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub principal: Money,
    pub annual_rate: Rate,
    pub frequency: PaymentFrequency,
    pub payment_amount: Money,
    pub items: Vec<ScheduleItem>,
    pub total_interest: Money,
    pub total_paid: Money,
}

impl AmortizationSchedule {
    /// compute the payment, lay out due dates from `first_due_date` and
    /// allocate interest and principal to every item
    #[instrument(skip(terms), fields(principal = %terms.principal, frequency = %terms.frequency))]
    pub fn generate(terms: &LoanTerms, first_due_date: NaiveDate) -> Result<Self> {
        let number_of_payments = terms.number_of_payments()?;

        let payment_amount =
            compute_payment(terms.principal, terms.annual_rate, terms.frequency, number_of_payments)
                .ok_or_else(|| {
                    ScheduleError::not_computable(format!(
                        "principal {}, rate {}, {} payments",
                        terms.principal, terms.annual_rate, number_of_payments
                    ))
                })?;

        let dates = build_schedule(first_due_date, terms.frequency, payment_amount, number_of_payments)?;
        if dates.is_empty() {
            return Err(ScheduleError::EmptySchedule);
        }

        let breakdown = compute_breakdown(
            terms.principal,
            payment_amount,
            terms.annual_rate,
            terms.frequency,
            number_of_payments,
        )?;
        let items = allocate_schedule(&dates, &breakdown.steps);

        let total_interest = breakdown.total_interest();
        let total_paid = breakdown.total_principal() + total_interest;

        debug!(%payment_amount, number_of_payments, %total_interest, "generated schedule");

        Ok(Self {
            principal: terms.principal,
            annual_rate: terms.annual_rate,
            frequency: terms.frequency,
            payment_amount,
            items,
            total_interest,
            total_paid,
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first_due_date(&self) -> Option<NaiveDate> {
        self.items.first().map(|i| i.due_date())
    }

    pub fn last_due_date(&self) -> Option<NaiveDate> {
        self.items.last().map(|i| i.due_date())
    }

    /// pending records numbered from `first_payment_number`, ready for insertion
    pub fn into_records(&self, first_payment_number: u32) -> Result<Vec<PaymentRecord>> {
        records_from_items(&self.items, first_payment_number)
    }

    /// get json representation of the schedule
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("JSON error: {}", e))
    }
}

/// payment number `offset` places after `first_payment_number`
pub(crate) fn payment_number(first_payment_number: u32, offset: usize) -> Result<u32> {
    u32::try_from(offset)
        .ok()
        .and_then(|offset| first_payment_number.checked_add(offset))
        .ok_or_else(|| ScheduleError::InvalidConfiguration {
            message: format!(
                "payment number {} + {} is out of range",
                first_payment_number, offset
            ),
        })
}

/// pending records for allocated items, numbered consecutively
pub(crate) fn records_from_items(
    items: &[ScheduleItem],
    first_payment_number: u32,
) -> Result<Vec<PaymentRecord>> {
    items
        .iter()
        .enumerate()
        .map(|(offset, item)| {
            let number = payment_number(first_payment_number, offset)?;
            let (interest, principal) = item.allocation().unwrap_or((Money::ZERO, Money::ZERO));
            Ok(PaymentRecord::pending(number, item.due_date(), item.amount(), interest, principal))
        })
        .collect()
}

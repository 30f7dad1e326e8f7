use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::Result;
use crate::frequency::PaymentFrequency;
use crate::payments::breakdown::BreakdownStep;

/// one entry of a payment schedule.
///
/// Items come out of [`build_schedule`] unallocated and only carry interest
/// and principal once a breakdown has been applied to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleItem {
    Unallocated {
        due_date: NaiveDate,
        amount: Money,
    },
    Allocated {
        due_date: NaiveDate,
        amount: Money,
        interest: Money,
        principal: Money,
        remaining_balance: Money,
    },
}

impl ScheduleItem {
    pub fn new(due_date: NaiveDate, amount: Money) -> Self {
        ScheduleItem::Unallocated { due_date, amount }
    }

    pub fn due_date(&self) -> NaiveDate {
        match self {
            ScheduleItem::Unallocated { due_date, .. } | ScheduleItem::Allocated { due_date, .. } => {
                *due_date
            }
        }
    }

    pub fn amount(&self) -> Money {
        match self {
            ScheduleItem::Unallocated { amount, .. } | ScheduleItem::Allocated { amount, .. } => {
                *amount
            }
        }
    }

    pub fn is_allocated(&self) -> bool {
        matches!(self, ScheduleItem::Allocated { .. })
    }

    /// (interest, principal) once allocated
    pub fn allocation(&self) -> Option<(Money, Money)> {
        match self {
            ScheduleItem::Allocated { interest, principal, .. } => Some((*interest, *principal)),
            ScheduleItem::Unallocated { .. } => None,
        }
    }

    /// attach a breakdown step, replacing any earlier allocation
    pub fn allocate(&self, step: &BreakdownStep) -> ScheduleItem {
        ScheduleItem::Allocated {
            due_date: self.due_date(),
            amount: self.amount(),
            interest: step.interest,
            principal: step.principal,
            remaining_balance: step.remaining_balance,
        }
    }
}

/// due dates for `number_of_payments` fixed payments, the first on `start_date`.
///
/// A zero count yields an empty schedule, which callers must reject.
pub fn build_schedule(
    start_date: NaiveDate,
    frequency: PaymentFrequency,
    amount: Money,
    number_of_payments: u32,
) -> Result<Vec<ScheduleItem>> {
    (0..number_of_payments)
        .map(|i| Ok(ScheduleItem::new(frequency.due_date(start_date, i)?, amount)))
        .collect()
}

/// pair each item with its breakdown step
pub fn allocate_schedule(items: &[ScheduleItem], steps: &[BreakdownStep]) -> Vec<ScheduleItem> {
    items
        .iter()
        .zip(steps)
        .map(|(item, step)| item.allocate(step))
        .collect()
}

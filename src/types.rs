use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{Result, ScheduleError};

/// unique identifier for a loan
pub type LoanId = Uuid;

/// how the length of a schedule is fixed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentTerm {
    /// term in months, converted to a payment count through the frequency
    Months(u32),
    /// explicit number of payments
    Payments(u32),
}

/// payment record status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// scheduled, not yet collected
    Pending,
    /// collected through the payment rail
    Confirmed,
    /// collection attempted and returned
    Failed,
    /// removed from the schedule
    Cancelled,
    Paid,
    /// recorded by an agent outside the payment rail
    Manual,
    Rebate,
}

impl PaymentStatus {
    /// terminal success states
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Confirmed
                | PaymentStatus::Paid
                | PaymentStatus::Manual
                | PaymentStatus::Rebate
        )
    }

    /// still awaiting resolution
    pub fn is_unresolved(&self) -> bool {
        matches!(self, PaymentStatus::Pending | PaymentStatus::Failed)
    }

    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        match self {
            PaymentStatus::Pending => next != PaymentStatus::Pending,
            PaymentStatus::Failed => next == PaymentStatus::Cancelled,
            _ => false,
        }
    }
}

/// a persisted payment owned by the servicing workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub payment_number: u32,
    pub due_date: NaiveDate,
    pub amount: Money,
    pub interest: Money,
    pub principal: Money,
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PaymentRecord {
    pub fn pending(
        payment_number: u32,
        due_date: NaiveDate,
        amount: Money,
        interest: Money,
        principal: Money,
    ) -> Self {
        Self {
            payment_number,
            due_date,
            amount,
            interest,
            principal,
            status: PaymentStatus::Pending,
            notes: None,
        }
    }

    /// not settled and either due on or after `today`, or left unresolved in the past
    pub fn is_future(&self, today: NaiveDate) -> bool {
        if self.status.is_settled() || self.status == PaymentStatus::Cancelled {
            return false;
        }
        self.due_date >= today || self.status.is_unresolved()
    }

    /// failed collection whose due date has passed
    pub fn is_failed_past(&self, today: NaiveDate) -> bool {
        self.status == PaymentStatus::Failed && self.due_date < today
    }

    /// append to the notes, keeping anything already recorded
    pub fn append_note(&mut self, note: &str) {
        self.notes = Some(match self.notes.take() {
            Some(existing) if !existing.trim().is_empty() => format!("{}; {}", existing, note),
            _ => note.to_string(),
        });
    }

    /// copy of this record moved to `next`, with an audit note
    pub fn transitioned(&self, next: PaymentStatus, note: &str) -> Result<PaymentRecord> {
        if !self.status.can_transition_to(next) {
            return Err(ScheduleError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        let mut record = self.clone();
        record.status = next;
        record.append_note(note);
        Ok(record)
    }
}

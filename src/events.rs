use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::frequency::PaymentFrequency;
use crate::types::LoanId;

/// audit events emitted by schedule lifecycle operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    ScheduleStopped {
        loan_id: LoanId,
        cancelled_payments: Vec<u32>,
        timestamp: DateTime<Utc>,
    },
    ScheduleModified {
        loan_id: LoanId,
        previous_balance: Money,
        failed_penalty: Money,
        brokerage_fee: Money,
        new_balance: Money,
        payment_amount: Money,
        frequency: PaymentFrequency,
        removed_payments: Vec<u32>,
        created_payments: Vec<u32>,
        first_due_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },
    PaymentMismatchRejected {
        loan_id: LoanId,
        provided: Money,
        computed: Money,
        timestamp: DateTime<Utc>,
    },
    /// payments that leave the balance undiminished
    NegativeAmortizationDetected {
        loan_id: LoanId,
        deferred_payments: Vec<u32>,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

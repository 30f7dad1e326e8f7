use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ScheduleError};
use crate::state::LoanState;
use crate::types::{LoanId, PaymentRecord, PaymentStatus};

/// records to update when a loan's schedule is stopped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopOutcome {
    pub loan_id: LoanId,
    /// future-set records already moved to `cancelled`, notes appended
    pub to_cancel: Vec<PaymentRecord>,
    pub stopped_at: DateTime<Utc>,
}

impl StopOutcome {
    pub fn cancelled_numbers(&self) -> Vec<u32> {
        self.to_cancel.iter().map(|p| p.payment_number).collect()
    }
}

/// cancel every record in the future set as of `today`
pub fn stop_future_schedule(
    state: &LoanState,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<StopOutcome> {
    let note = format!("Stopped on {}", super::audit_timestamp(now));
    let to_cancel = cancel_future_set(state, today, &note)?;

    if to_cancel.is_empty() {
        return Err(ScheduleError::NothingToStop);
    }

    Ok(StopOutcome {
        loan_id: state.loan_id,
        to_cancel,
        stopped_at: now,
    })
}

/// cancelled copies of the future set, each with `note` appended
pub(crate) fn cancel_future_set(
    state: &LoanState,
    today: NaiveDate,
    note: &str,
) -> Result<Vec<PaymentRecord>> {
    state
        .future_set(today)
        .into_iter()
        .map(|record| record.transitioned(PaymentStatus::Cancelled, note))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeeConfiguration;
    use crate::decimal::{Money, Rate};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(number: u32, due: NaiveDate, status: PaymentStatus) -> PaymentRecord {
        PaymentRecord {
            status,
            ..PaymentRecord::pending(number, due, Money::from_major(175), Money::from_major(12), Money::from_major(163))
        }
    }

    fn state(payments: Vec<PaymentRecord>) -> LoanState {
        LoanState::new(
            Uuid::new_v4(),
            Money::from_major(500),
            Rate::from_percentage(29),
            FeeConfiguration::default(),
            payments,
        )
    }

    #[test]
    fn test_stop_cancels_pending_and_unresolved() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 9, 30, 0).unwrap();
        let mut failed = record(4, date(2024, 4, 15), PaymentStatus::Failed);
        failed.notes = Some("NSF".to_string());

        let loan = state(vec![
            record(1, date(2024, 1, 15), PaymentStatus::Confirmed),
            record(2, date(2024, 2, 15), PaymentStatus::Confirmed),
            record(3, date(2024, 3, 15), PaymentStatus::Confirmed),
            failed,
            record(5, date(2024, 6, 15), PaymentStatus::Pending),
            record(6, date(2024, 7, 15), PaymentStatus::Pending),
        ]);

        let outcome = stop_future_schedule(&loan, now.date_naive(), now).unwrap();

        assert_eq!(outcome.cancelled_numbers(), vec![4, 5, 6]);
        assert!(outcome.to_cancel.iter().all(|p| p.status == PaymentStatus::Cancelled));
        assert_eq!(
            outcome.to_cancel[0].notes.as_deref(),
            Some("NSF; Stopped on 2024-06-15T09:30:00Z")
        );
        assert_eq!(
            outcome.to_cancel[1].notes.as_deref(),
            Some("Stopped on 2024-06-15T09:30:00Z")
        );
        assert_eq!(outcome.stopped_at, now);
    }

    #[test]
    fn test_nothing_to_stop() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
        let loan = state(vec![
            record(1, date(2024, 1, 15), PaymentStatus::Confirmed),
            record(2, date(2024, 7, 15), PaymentStatus::Cancelled),
        ]);
        assert_eq!(stop_future_schedule(&loan, now.date_naive(), now).unwrap_err(), ScheduleError::NothingToStop);

        let empty = state(vec![]);
        assert_eq!(stop_future_schedule(&empty, now.date_naive(), now).unwrap_err(), ScheduleError::NothingToStop);
    }

    #[test]
    fn test_today_decides_future_set() {
        let loan = state(vec![
            record(1, date(2024, 6, 14), PaymentStatus::Confirmed),
            record(2, date(2024, 6, 15), PaymentStatus::Paid),
            record(3, date(2024, 6, 15), PaymentStatus::Cancelled),
        ]);
        // a settled record dated today is still left alone
        let now = Utc.with_ymd_and_hms(2024, 6, 16, 1, 0, 0).unwrap();
        assert_eq!(
            stop_future_schedule(&loan, date(2024, 6, 15), now).unwrap_err(),
            ScheduleError::NothingToStop
        );

        let loan = state(vec![
            record(1, date(2024, 6, 15), PaymentStatus::Pending),
        ]);
        let outcome = stop_future_schedule(&loan, date(2024, 6, 15), now).unwrap();
        assert_eq!(outcome.cancelled_numbers(), vec![1]);
        assert_eq!(
            outcome.to_cancel[0].notes.as_deref(),
            Some("Stopped on 2024-06-16T01:00:00Z")
        );
    }
}

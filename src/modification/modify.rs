use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decimal::{Money, Rate};
use crate::errors::{Result, ScheduleError};
use crate::frequency::PaymentFrequency;
use crate::modification::request::ModificationRequest;
use crate::modification::stop::cancel_future_set;
use crate::payments::amortization::{payment_number, records_from_items};
use crate::payments::{allocate_schedule, breakdown_amounts, build_schedule, compute_payment, ScheduleItem};
use crate::state::LoanState;
use crate::types::{LoanId, PaymentRecord};

/// replacement schedule for the unsettled part of a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModificationOutcome {
    pub loan_id: LoanId,
    pub previous_balance: Money,
    pub failed_penalty: Money,
    pub brokerage_fee: Money,
    pub new_balance: Money,
    pub annual_rate: Rate,
    pub frequency: PaymentFrequency,
    /// payment the engine computed for the new balance
    pub computed_payment: Money,
    /// superseded future-set records, for the caller to delete
    pub to_remove: Vec<PaymentRecord>,
    /// new pending records continuing the settled numbering
    pub to_create: Vec<PaymentRecord>,
    /// the new schedule with its breakdown, one item per created record
    pub schedule: Vec<ScheduleItem>,
    /// payment numbers in `to_create` that leave the balance undiminished
    pub deferred_payments: Vec<u32>,
    pub modified_at: DateTime<Utc>,
}

impl ModificationOutcome {
    pub fn removed_numbers(&self) -> Vec<u32> {
        self.to_remove.iter().map(|p| p.payment_number).collect()
    }

    pub fn created_numbers(&self) -> Vec<u32> {
        self.to_create.iter().map(|p| p.payment_number).collect()
    }

    pub fn first_due_date(&self) -> Option<NaiveDate> {
        self.to_create.first().map(|p| p.due_date)
    }

    /// get json representation of the outcome
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("JSON error: {}", e))
    }
}

/// flat origination fee plus the scheduled interest of every failed past payment
pub fn failed_payment_penalty(state: &LoanState, today: NaiveDate) -> Money {
    state
        .failed_past(today)
        .into_iter()
        .map(|p| state.fees.origination_fee + p.interest)
        .sum()
}

/// remaining balance with the brokerage fee and failed-payment penalties rolled in
pub fn modified_balance(state: &LoanState, today: NaiveDate) -> Money {
    state.remaining_balance + state.fees.brokerage_fee + failed_payment_penalty(state, today)
}

/// rebuild the future schedule on the rolled-up balance.
///
/// `today` decides which records are past due; `now` only stamps the notes.
pub fn modify_schedule(
    state: &LoanState,
    request: &ModificationRequest,
    tolerance: Money,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<ModificationOutcome> {
    state.validate()?;

    let failed_penalty = failed_payment_penalty(state, today);
    let new_balance = state.remaining_balance + state.fees.brokerage_fee + failed_penalty;
    let annual_rate = request.annual_rate.unwrap_or(state.annual_rate);

    let computed_payment =
        compute_payment(new_balance, annual_rate, request.frequency, request.number_of_payments)
            .ok_or_else(|| {
                ScheduleError::not_computable(format!(
                    "balance {}, rate {}, {} payments",
                    new_balance, annual_rate, request.number_of_payments
                ))
            })?;

    debug!(%failed_penalty, %new_balance, %computed_payment, "rolled up modification balance");

    if !request.payment_amount.within(computed_payment, tolerance) {
        return Err(ScheduleError::PaymentMismatch {
            provided: request.payment_amount,
            computed: computed_payment,
            tolerance,
        });
    }

    let note = format!("Superseded by modification on {}", super::audit_timestamp(now));
    let to_remove = cancel_future_set(state, today, &note)?;

    let items = match &request.edited_schedule {
        Some(edited) => edited
            .iter()
            .map(|item| ScheduleItem::new(item.due_date(), item.amount()))
            .collect(),
        None => build_schedule(
            request.start_date,
            request.frequency,
            request.payment_amount,
            request.number_of_payments,
        )?,
    };
    if items.is_empty() {
        return Err(ScheduleError::EmptySchedule);
    }

    let breakdown = breakdown_amounts(
        new_balance,
        items.iter().map(|item| item.amount()),
        annual_rate,
        request.frequency,
    )?;
    let allocated = allocate_schedule(&items, &breakdown.steps);

    let first_number = payment_number(state.last_settled_number(), 1)?;
    let to_create = records_from_items(&allocated, first_number)?;
    let deferred_payments = breakdown
        .deferred_steps()
        .into_iter()
        .map(|i| payment_number(first_number, i))
        .collect::<Result<Vec<_>>>()?;

    Ok(ModificationOutcome {
        loan_id: state.loan_id,
        previous_balance: state.remaining_balance,
        failed_penalty,
        brokerage_fee: state.fees.brokerage_fee,
        new_balance,
        annual_rate,
        frequency: request.frequency,
        computed_payment,
        to_remove,
        to_create,
        schedule: allocated,
        deferred_payments,
        modified_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeeConfiguration;
    use crate::types::PaymentStatus;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2024, 6, 15)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 14, 0, 0).unwrap()
    }

    fn record(number: u32, due: NaiveDate, status: PaymentStatus, interest: Money) -> PaymentRecord {
        PaymentRecord {
            status,
            ..PaymentRecord::pending(number, due, Money::from_major(200), interest, Money::from_major(200) - interest)
        }
    }

    fn sample_state() -> LoanState {
        LoanState::new(
            Uuid::new_v4(),
            Money::from_major(1_000),
            Rate::from_percentage(29),
            FeeConfiguration::new(Money::from_major(55), Money::from_major(10), Money::from_major(50)),
            vec![
                record(1, date(2024, 3, 1), PaymentStatus::Confirmed, Money::from_major(30)),
                record(2, date(2024, 4, 1), PaymentStatus::Paid, Money::from_major(25)),
                record(3, date(2024, 5, 1), PaymentStatus::Failed, Money::from_major(20)),
                record(4, date(2024, 6, 1), PaymentStatus::Pending, Money::from_major(18)),
                record(5, date(2024, 7, 1), PaymentStatus::Pending, Money::from_major(15)),
            ],
        )
    }

    fn request(amount: Money) -> ModificationRequest {
        ModificationRequest::builder()
            .payment_amount(amount)
            .frequency(PaymentFrequency::Monthly)
            .number_of_payments(6)
            .start_date(date(2024, 7, 1))
            .build()
            .unwrap()
    }

    #[test]
    fn test_balance_rollup() {
        let state = sample_state();
        assert_eq!(failed_payment_penalty(&state, today()), Money::from_major(75));
        assert_eq!(modified_balance(&state, today()), Money::from_major(1_125));
    }

    #[test]
    fn test_modify_replaces_future_schedule() {
        let state = sample_state();
        let outcome = modify_schedule(&state, &request(Money::from(dec!(203.67))), Money::CENT, today(), now()).unwrap();

        assert_eq!(outcome.new_balance, Money::from_major(1_125));
        assert_eq!(outcome.failed_penalty, Money::from_major(75));
        assert_eq!(outcome.computed_payment, Money::from(dec!(203.67)));

        assert_eq!(outcome.removed_numbers(), vec![3, 4, 5]);
        assert!(outcome.to_remove.iter().all(|p| p.status == PaymentStatus::Cancelled));
        assert_eq!(
            outcome.to_remove[0].notes.as_deref(),
            Some("Superseded by modification on 2024-06-15T14:00:00Z")
        );

        assert_eq!(outcome.created_numbers(), vec![3, 4, 5, 6, 7, 8]);
        assert_eq!(outcome.first_due_date(), Some(date(2024, 7, 1)));
        assert_eq!(outcome.to_create[5].due_date, date(2024, 12, 1));
        assert!(outcome.to_create.iter().all(|p| p.status == PaymentStatus::Pending));

        let principal: Money = outcome.to_create.iter().map(|p| p.principal).sum();
        assert_eq!(principal, Money::from_major(1_125));
        assert!(outcome.deferred_payments.is_empty());

        assert_eq!(outcome.schedule.len(), 6);
        match outcome.schedule.last().unwrap() {
            ScheduleItem::Allocated { remaining_balance, .. } => assert!(remaining_balance.is_zero()),
            ScheduleItem::Unallocated { .. } => unreachable!(),
        }
    }

    #[test]
    fn test_mismatch_returns_computed_amount() {
        let state = sample_state();
        let err = modify_schedule(&state, &request(Money::from(dec!(203.69))), Money::CENT, today(), now()).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::PaymentMismatch {
                provided: Money::from(dec!(203.69)),
                computed: Money::from(dec!(203.67)),
                tolerance: Money::CENT,
            }
        );

        // one cent off is within tolerance
        assert!(modify_schedule(&state, &request(Money::from(dec!(203.68))), Money::CENT, today(), now()).is_ok());
    }

    #[test]
    fn test_edited_schedule_used_verbatim() {
        let state = sample_state();
        let edited = vec![
            ScheduleItem::new(date(2024, 7, 3), Money::from(dec!(203.67))),
            ScheduleItem::new(date(2024, 8, 2), Money::from(dec!(203.67))),
            ScheduleItem::new(date(2024, 9, 4), Money::from(dec!(250.00))),
            ScheduleItem::new(date(2024, 10, 1), Money::from(dec!(203.67))),
            ScheduleItem::new(date(2024, 11, 1), Money::from(dec!(203.67))),
            ScheduleItem::new(date(2024, 12, 2), Money::from(dec!(203.67))),
        ];
        let mut req = request(Money::from(dec!(203.67)));
        req.edited_schedule = Some(edited.clone());

        let outcome = modify_schedule(&state, &req, Money::CENT, today(), now()).unwrap();
        let dates: Vec<NaiveDate> = outcome.to_create.iter().map(|p| p.due_date).collect();
        let expected: Vec<NaiveDate> = edited.iter().map(|i| i.due_date()).collect();
        assert_eq!(dates, expected);
        assert_eq!(outcome.to_create[2].amount, Money::from(dec!(250.00)));

        let principal: Money = outcome.to_create.iter().map(|p| p.principal).sum();
        assert_eq!(principal, Money::from_major(1_125));
    }

    #[test]
    fn test_empty_edited_schedule_rejected() {
        let state = sample_state();
        let mut req = request(Money::from(dec!(203.67)));
        req.edited_schedule = Some(vec![]);
        assert_eq!(
            modify_schedule(&state, &req, Money::CENT, today(), now()).unwrap_err(),
            ScheduleError::EmptySchedule
        );
    }

    #[test]
    fn test_numbering_starts_at_one_without_history() {
        let state = LoanState {
            payments: vec![],
            fees: FeeConfiguration::default(),
            ..sample_state()
        };
        let amount = compute_payment(Money::from_major(1_000), Rate::from_percentage(29), PaymentFrequency::Monthly, 6).unwrap();
        let outcome = modify_schedule(&state, &request(amount), Money::CENT, today(), now()).unwrap();
        assert_eq!(outcome.created_numbers(), vec![1, 2, 3, 4, 5, 6]);
        assert!(outcome.to_remove.is_empty());
    }

    #[test]
    fn test_rate_override() {
        let state = sample_state();
        let amount = compute_payment(Money::from_major(1_125), Rate::ZERO, PaymentFrequency::Monthly, 6).unwrap();
        let mut req = request(amount);
        req.annual_rate = Some(Rate::ZERO);

        let outcome = modify_schedule(&state, &req, Money::CENT, today(), now()).unwrap();
        assert_eq!(outcome.computed_payment, Money::from(dec!(187.50)));
        assert!(outcome.to_create.iter().all(|p| p.interest.is_zero()));
    }

    #[test]
    fn test_today_is_independent_of_utc_date() {
        let state = sample_state();
        // evening of May 1 for the lender, already May 2 in UTC
        let now = Utc.with_ymd_and_hms(2024, 5, 2, 2, 0, 0).unwrap();
        let amount = compute_payment(Money::from_major(1_050), Rate::from_percentage(29), PaymentFrequency::Monthly, 6).unwrap();

        let outcome = modify_schedule(&state, &request(amount), Money::CENT, date(2024, 5, 1), now).unwrap();
        assert_eq!(outcome.failed_penalty, Money::ZERO);
        assert_eq!(outcome.new_balance, Money::from_major(1_050));
        assert_eq!(
            outcome.to_remove[0].notes.as_deref(),
            Some("Superseded by modification on 2024-05-02T02:00:00Z")
        );
    }

    #[test]
    fn test_numbering_overflow_is_an_error() {
        let mut state = sample_state();
        state.payments[1].payment_number = u32::MAX;

        let err = modify_schedule(&state, &request(Money::from(dec!(203.67))), Money::CENT, today(), now())
            .unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidConfiguration { .. }));
    }
}

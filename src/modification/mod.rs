//! Stop and modify operations on an in-flight schedule.
//!
//! Both operations read a [`LoanState`] snapshot and return the records the
//! caller must update, delete or insert. Applying them is the caller's job and
//! must happen as one atomic replace; concurrent modifications of the same
//! loan have to be serialized by the caller.

pub mod modify;
pub mod request;
pub mod stop;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::config::EngineConfig;
use crate::errors::{Result, ScheduleError};
use crate::events::{Event, EventStore};
use crate::holidays::{HolidayCalendar, HolidayWarning};
use crate::state::LoanState;

pub use modify::{failed_payment_penalty, modified_balance, modify_schedule, ModificationOutcome};
pub use request::{ModificationRequest, ModificationRequestBuilder};
pub use stop::{stop_future_schedule, StopOutcome};

/// requested change to a loan's schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScheduleChange {
    Stop,
    Modify(ModificationRequest),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScheduleChangeOutcome {
    Stopped(StopOutcome),
    Modified {
        outcome: ModificationOutcome,
        holiday_warnings: Vec<HolidayWarning>,
    },
}

/// runs lifecycle operations against caller-supplied loan state
#[derive(Debug, Clone)]
pub struct ScheduleModifier {
    config: EngineConfig,
    calendar: HolidayCalendar,
}

impl ScheduleModifier {
    pub fn new(config: EngineConfig) -> Self {
        let calendar = HolidayCalendar::from_config(&config);
        Self { config, calendar }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn calendar(&self) -> &HolidayCalendar {
        &self.calendar
    }

    /// cancel the future set of `state` as of the lender's `today`
    #[instrument(name = "schedule.stop", skip_all, fields(loan_id = %state.loan_id, %today), err)]
    pub fn stop(
        &self,
        state: &LoanState,
        today: NaiveDate,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<StopOutcome> {
        let outcome = stop_future_schedule(state, today, time_provider.now())?;

        info!(cancelled = outcome.to_cancel.len(), "stopped schedule");
        events.emit(Event::ScheduleStopped {
            loan_id: state.loan_id,
            cancelled_payments: outcome.cancelled_numbers(),
            timestamp: outcome.stopped_at,
        });

        Ok(outcome)
    }

    /// replace the future set of `state` with a schedule built from `request`
    #[instrument(name = "schedule.modify", skip_all, fields(loan_id = %state.loan_id, %today), err)]
    pub fn modify(
        &self,
        state: &LoanState,
        request: &ModificationRequest,
        today: NaiveDate,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<ModificationOutcome> {
        let now = time_provider.now();

        let outcome = match modify_schedule(state, request, self.config.payment_tolerance, today, now) {
            Ok(outcome) => outcome,
            Err(ScheduleError::PaymentMismatch { provided, computed, tolerance }) => {
                warn!(%provided, %computed, "payment amount rejected");
                events.emit(Event::PaymentMismatchRejected {
                    loan_id: state.loan_id,
                    provided,
                    computed,
                    timestamp: now,
                });
                return Err(ScheduleError::PaymentMismatch { provided, computed, tolerance });
            }
            Err(e) => return Err(e),
        };

        if !outcome.deferred_payments.is_empty() {
            warn!(payments = ?outcome.deferred_payments, "payments do not cover interest");
            events.emit(Event::NegativeAmortizationDetected {
                loan_id: state.loan_id,
                deferred_payments: outcome.deferred_payments.clone(),
                timestamp: now,
            });
        }

        info!(
            new_balance = %outcome.new_balance,
            removed = outcome.to_remove.len(),
            created = outcome.to_create.len(),
            "modified schedule"
        );
        events.emit(Event::ScheduleModified {
            loan_id: state.loan_id,
            previous_balance: outcome.previous_balance,
            failed_penalty: outcome.failed_penalty,
            brokerage_fee: outcome.brokerage_fee,
            new_balance: outcome.new_balance,
            payment_amount: request.payment_amount,
            frequency: outcome.frequency,
            removed_payments: outcome.removed_numbers(),
            created_payments: outcome.created_numbers(),
            first_due_date: outcome.first_due_date().unwrap_or(request.start_date),
            timestamp: now,
        });

        Ok(outcome)
    }

    /// dispatch a stop or modify, attaching holiday warnings to a new schedule
    pub fn apply(
        &self,
        state: &LoanState,
        change: &ScheduleChange,
        today: NaiveDate,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<ScheduleChangeOutcome> {
        match change {
            ScheduleChange::Stop => self
                .stop(state, today, time_provider, events)
                .map(ScheduleChangeOutcome::Stopped),
            ScheduleChange::Modify(request) => {
                let outcome = self.modify(state, request, today, time_provider, events)?;
                let holiday_warnings = self.calendar.check_schedule(&outcome.schedule);
                Ok(ScheduleChangeOutcome::Modified {
                    outcome,
                    holiday_warnings,
                })
            }
        }
    }
}

impl Default for ScheduleModifier {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

pub(crate) fn audit_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

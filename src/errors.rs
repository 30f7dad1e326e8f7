use thiserror::Error;

use crate::decimal::Money;
use crate::types::PaymentStatus;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("payment not computable: {reason}")]
    NotComputable {
        reason: String,
    },

    #[error("payment amount mismatch: provided {provided}, computed {computed} (tolerance {tolerance})")]
    PaymentMismatch {
        provided: Money,
        computed: Money,
        tolerance: Money,
    },

    #[error("nothing to stop: no pending or unresolved payments")]
    NothingToStop,

    #[error("resulting schedule is empty")]
    EmptySchedule,

    #[error("missing modification parameter: {name}")]
    MissingParameter {
        name: &'static str,
    },

    #[error("invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },
}

impl ScheduleError {
    pub(crate) fn not_computable(reason: impl Into<String>) -> Self {
        ScheduleError::NotComputable {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;

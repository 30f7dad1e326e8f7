pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod frequency;
pub mod holidays;
pub mod modification;
pub mod payments;
pub mod state;
pub mod types;

// re-export key types
pub use config::{EngineConfig, FeeConfiguration, FixedHoliday, LoanTerms};
pub use decimal::{Money, Rate};
pub use errors::{Result, ScheduleError};
pub use events::{Event, EventStore};
pub use frequency::PaymentFrequency;
pub use holidays::{easter_sunday, Holiday, HolidayCalendar, HolidayWarning};
pub use modification::{
    ModificationOutcome, ModificationRequest, ScheduleChange, ScheduleChangeOutcome,
    ScheduleModifier, StopOutcome,
};
pub use payments::{
    build_schedule, compute_breakdown, compute_payment, AmortizationSchedule, Breakdown,
    BreakdownStep, ScheduleItem,
};
pub use state::LoanState;
pub use types::{LoanId, PaymentRecord, PaymentStatus, PaymentTerm};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;

pub mod amortization;
pub mod breakdown;
pub mod calculator;
pub mod schedule;

pub use amortization::AmortizationSchedule;
pub use breakdown::{breakdown_amounts, compute_breakdown, Breakdown, BreakdownStep};
pub use calculator::compute_payment;
pub use schedule::{allocate_schedule, build_schedule, ScheduleItem};

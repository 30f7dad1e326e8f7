use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{Result, ScheduleError};
use crate::frequency::PaymentFrequency;

/// interest/principal split of one payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownStep {
    pub interest: Money,
    pub principal: Money,
    /// balance after this payment, carried into the next step
    pub remaining_balance: Money,
}

/// per-payment allocation of a balance across a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub opening_balance: Money,
    pub steps: Vec<BreakdownStep>,
}

impl Breakdown {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn total_interest(&self) -> Money {
        self.steps.iter().map(|s| s.interest).sum()
    }

    pub fn total_principal(&self) -> Money {
        self.steps.iter().map(|s| s.principal).sum()
    }

    /// indexes where the payment did not cover the period's interest, so the
    /// balance failed to decrease
    pub fn deferred_steps(&self) -> Vec<usize> {
        let mut previous = self.opening_balance;
        let mut deferred = Vec::new();
        for (i, step) in self.steps.iter().enumerate() {
            if step.remaining_balance >= previous && !previous.is_zero() {
                deferred.push(i);
            }
            previous = step.remaining_balance;
        }
        deferred
    }
}

/// breakdown of `number_of_payments` equal payments against `total_balance`
pub fn compute_breakdown(
    total_balance: Money,
    payment_amount: Money,
    annual_rate: Rate,
    frequency: PaymentFrequency,
    number_of_payments: u32,
) -> Result<Breakdown> {
    breakdown_amounts(
        total_balance,
        std::iter::repeat(payment_amount).take(number_of_payments as usize),
        annual_rate,
        frequency,
    )
}

/// breakdown of an arbitrary sequence of payment amounts.
///
/// Interest accrues on the pre-payment balance each period. Principal is the
/// rest of the payment, floored at zero and capped at the remaining balance,
/// except on the final step where it is the whole remaining balance so the
/// schedule always retires the debt exactly.
pub fn breakdown_amounts<I>(
    total_balance: Money,
    amounts: I,
    annual_rate: Rate,
    frequency: PaymentFrequency,
) -> Result<Breakdown>
where
    I: IntoIterator<Item = Money>,
{
    if total_balance.is_negative() {
        return Err(ScheduleError::not_computable(format!(
            "negative balance {}",
            total_balance
        )));
    }
    if !total_balance.is_currency_precision() {
        return Err(ScheduleError::not_computable(format!(
            "balance {} is below currency precision",
            total_balance
        )));
    }
    if annual_rate.is_negative() {
        return Err(ScheduleError::not_computable(format!(
            "negative rate {}",
            annual_rate
        )));
    }

    let periodic_rate = frequency.periodic_rate(annual_rate);
    let opening_balance = total_balance;
    let mut remaining = opening_balance;

    let mut amounts = amounts.into_iter().peekable();
    let mut steps = Vec::with_capacity(amounts.size_hint().0);

    while let Some(amount) = amounts.next() {
        let interest = (remaining * periodic_rate).round_currency();
        let principal = if amounts.peek().is_none() {
            remaining
        } else {
            (amount - interest).max(Money::ZERO).min(remaining).round_currency()
        };
        remaining = (remaining - principal).round_currency();

        steps.push(BreakdownStep {
            interest,
            principal,
            remaining_balance: remaining,
        });
    }

    Ok(Breakdown {
        opening_balance,
        steps,
    })
}

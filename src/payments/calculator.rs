use rust_decimal::Decimal;
use tracing::debug;

use crate::decimal::{Money, Rate};
use crate::frequency::PaymentFrequency;

/// fixed periodic payment for a fully amortizing loan.
///
/// Returns `None` when the inputs cannot produce a payment: a non-positive
/// principal or count, a negative rate, or a degenerate `(1+r)^n - 1`.
pub fn compute_payment(
    principal: Money,
    annual_rate: Rate,
    frequency: PaymentFrequency,
    number_of_payments: u32,
) -> Option<Money> {
    if !principal.is_positive() || annual_rate.is_negative() || number_of_payments == 0 {
        return None;
    }

    let r = frequency.periodic_rate(annual_rate);

    if r.is_zero() {
        let amount = principal / Decimal::from(number_of_payments);
        return Some(amount.round_currency());
    }

    // P * r * (1 + r)^n / ((1 + r)^n - 1)
    let compound = compound_factor(r, number_of_payments)?;
    let denominator = compound - Decimal::ONE;
    if denominator.is_zero() {
        return None;
    }

    let numerator = principal.as_decimal().checked_mul(r)?.checked_mul(compound)?;
    let amount = Money::from_decimal(numerator.checked_div(denominator)?).round_currency();

    debug!(%principal, %annual_rate, %frequency, number_of_payments, %amount, "computed payment");
    Some(amount)
}

/// (1 + r)^n, `None` on overflow
pub(crate) fn compound_factor(r: Decimal, n: u32) -> Option<Decimal> {
    let base = Decimal::ONE.checked_add(r)?;
    let mut compound = Decimal::ONE;
    for _ in 0..n {
        compound = compound.checked_mul(base)?;
    }
    Some(compound)
}

//! Level-payment annuity primitives shared by every calculator.
//!
//! Rates here are periodic decimals (0.004167 for 5% a year paid monthly).

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::types::{Money, Rate};

/// `(1 + rate)^periods`, or `None` when the result leaves the decimal range.
pub fn growth_factor(rate: Rate, periods: u32) -> Option<Decimal> {
    (Decimal::ONE + rate).checked_powi(i64::from(periods))
}

/// Discount factor `1 - (1 + rate)^-periods`. Tends to 1 once the growth
/// factor overflows.
fn annuity_discount(rate: Rate, periods: u32) -> Decimal {
    match growth_factor(rate, periods) {
        Some(factor) if !factor.is_zero() => Decimal::ONE - Decimal::ONE / factor,
        _ => Decimal::ONE,
    }
}

/// Level payment that amortizes `principal` over `periods` at `rate`.
///
/// `P * r * (1+r)^n / ((1+r)^n - 1)`, evaluated as `P * r / (1 - (1+r)^-n)`
/// so large horizons never overflow. Zero when any of the three inputs is
/// non-positive; `None` only when the payment itself leaves the decimal
/// range.
pub fn annuity_payment(rate: Rate, periods: u32, principal: Money) -> Option<Money> {
    if rate <= Decimal::ZERO || periods == 0 || principal <= Decimal::ZERO {
        return Some(Decimal::ZERO);
    }

    let discount = annuity_discount(rate, periods);
    if discount.is_zero() {
        // Rate too small to register at 28 digits.
        return Some(principal / Decimal::from(periods));
    }

    principal.checked_mul(rate)?.checked_div(discount)
}

/// Principal that a level `payment` retires over `periods` at `rate`.
/// Inverse of [`annuity_payment`]; `None` when the principal leaves the
/// decimal range.
pub fn annuity_present_value(rate: Rate, periods: u32, payment: Money) -> Option<Money> {
    if rate <= Decimal::ZERO || periods == 0 || payment <= Decimal::ZERO {
        return Some(Decimal::ZERO);
    }

    let discount = annuity_discount(rate, periods);
    if discount.is_zero() {
        return payment.checked_mul(Decimal::from(periods));
    }

    payment.checked_mul(discount)?.checked_div(rate)
}

/// One period of interest-then-principal reduction, floored at zero.
/// `None` when a payment below the accrued interest grows the balance out
/// of the decimal range.
pub fn amortize_period(balance: Money, rate: Rate, payment: Money) -> Option<Money> {
    let interest = if rate > Decimal::ZERO {
        balance.checked_mul(rate)?
    } else {
        Decimal::ZERO
    };
    let next = balance.checked_add(interest)?.checked_sub(payment)?;
    Some(next.max(Decimal::ZERO))
}

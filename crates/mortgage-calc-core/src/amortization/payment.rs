//! Periodic mortgage payments.
//!
//! Everything is derived from the canonical monthly payment
//! `M = P * r * (1+r)^n / ((1+r)^n - 1)` with `r = rate / 100 / 12` and
//! `n = years * 12`. Other frequencies are conversions of `M`; accelerated
//! frequencies split `M` instead of re-spreading twelve payments, which
//! retires principal faster.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use tracing::debug;

use super::schedule;
use crate::error::MortgageError;
use crate::time_value::{amortize_period, annuity_payment};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::MortgageResult;

/// Longest horizon any schedule or balance projection will run.
pub const MAX_AMORTIZATION_YEARS: u32 = 100;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    Weekly,
    Biweekly,
    #[default]
    Monthly,
    /// Once every two months.
    Bimonthly,
    #[serde(alias = "acceleratedWeekly")]
    AcceleratedWeekly,
    #[serde(alias = "acceleratedBiweekly")]
    AcceleratedBiweekly,
}

impl PaymentFrequency {
    pub const ALL: [PaymentFrequency; 6] = [
        PaymentFrequency::Weekly,
        PaymentFrequency::Biweekly,
        PaymentFrequency::Monthly,
        PaymentFrequency::Bimonthly,
        PaymentFrequency::AcceleratedWeekly,
        PaymentFrequency::AcceleratedBiweekly,
    ];

    pub fn payments_per_year(self) -> u32 {
        match self {
            PaymentFrequency::Weekly | PaymentFrequency::AcceleratedWeekly => 52,
            PaymentFrequency::Biweekly | PaymentFrequency::AcceleratedBiweekly => 26,
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::Bimonthly => 6,
        }
    }

    pub fn is_accelerated(self) -> bool {
        matches!(
            self,
            PaymentFrequency::AcceleratedWeekly | PaymentFrequency::AcceleratedBiweekly
        )
    }

    /// Convert the canonical monthly payment to this frequency. `None` when
    /// the converted payment leaves the decimal range.
    pub fn from_monthly(self, monthly: Money) -> Option<Money> {
        match self {
            PaymentFrequency::Weekly => monthly.checked_mul(dec!(12)).map(|m| m / dec!(52)),
            PaymentFrequency::Biweekly => monthly.checked_mul(dec!(12)).map(|m| m / dec!(26)),
            PaymentFrequency::Monthly => Some(monthly),
            PaymentFrequency::Bimonthly => monthly.checked_mul(dec!(2)),
            PaymentFrequency::AcceleratedWeekly => Some(monthly / dec!(4)),
            PaymentFrequency::AcceleratedBiweekly => Some(monthly / dec!(2)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentFrequency::Weekly => "weekly",
            PaymentFrequency::Biweekly => "biweekly",
            PaymentFrequency::Monthly => "monthly",
            PaymentFrequency::Bimonthly => "bimonthly",
            PaymentFrequency::AcceleratedWeekly => "accelerated_weekly",
            PaymentFrequency::AcceleratedBiweekly => "accelerated_biweekly",
        }
    }
}

impl fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentFrequency {
    type Err = MortgageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "weekly" => Ok(PaymentFrequency::Weekly),
            "biweekly" => Ok(PaymentFrequency::Biweekly),
            "monthly" => Ok(PaymentFrequency::Monthly),
            "bimonthly" => Ok(PaymentFrequency::Bimonthly),
            "acceleratedweekly" => Ok(PaymentFrequency::AcceleratedWeekly),
            "acceleratedbiweekly" => Ok(PaymentFrequency::AcceleratedBiweekly),
            _ => Err(MortgageError::invalid(
                "frequency",
                format!("Unknown payment frequency '{s}'"),
            )),
        }
    }
}

/// Loan parameters shared by the payment summary and the schedule builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanInputs {
    /// Amount financed.
    pub principal: Money,
    /// Nominal annual rate as a percentage (5 = 5%).
    pub annual_rate_percent: Percent,
    pub amortization_years: u32,
    #[serde(default)]
    pub payment_frequency: PaymentFrequency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub frequency: PaymentFrequency,
    /// Payment due each period at the chosen frequency.
    pub periodic_payment: Money,
    /// Canonical monthly payment the periodic payment is derived from.
    pub monthly_payment: Money,
    pub payments_per_year: u32,
    pub annual_payment: Money,
    /// Sum of all payments until the loan is retired.
    pub total_paid: Money,
    pub total_interest: Money,
    /// Years until payoff at this frequency.
    pub payoff_years: Decimal,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Monthly periodic rate for a nominal annual percentage.
pub fn monthly_rate(annual_rate_percent: Percent) -> Rate {
    annual_rate_percent / dec!(100) / dec!(12)
}

/// Canonical monthly payment. Zero when the rate, horizon or principal is
/// zero; negative principal is rejected.
pub fn monthly_payment(
    principal: Money,
    annual_rate_percent: Percent,
    amortization_years: u32,
) -> MortgageResult<Money> {
    validate_principal(principal)?;
    let periods = amortization_years.saturating_mul(12);
    annuity_payment(monthly_rate(annual_rate_percent), periods, principal)
        .ok_or_else(payment_overflow)
}

/// Payment due each period at `frequency`.
pub fn compute_periodic_payment(
    principal: Money,
    annual_rate_percent: Percent,
    amortization_years: u32,
    frequency: PaymentFrequency,
) -> MortgageResult<Money> {
    let monthly = monthly_payment(principal, annual_rate_percent, amortization_years)?;
    frequency.from_monthly(monthly).ok_or_else(payment_overflow)
}

pub(crate) fn payment_overflow() -> MortgageError {
    MortgageError::invalid(
        "annual_rate_percent",
        "Payment is too large to represent for this rate and principal",
    )
}

/// Outstanding balance after `periods_elapsed` monthly payments, applying
/// interest then principal each month. Never negative.
pub fn remaining_balance(
    principal: Money,
    annual_rate_percent: Percent,
    monthly_payment: Money,
    periods_elapsed: u32,
) -> MortgageResult<Money> {
    validate_principal(principal)?;
    if monthly_payment < Decimal::ZERO {
        return Err(MortgageError::invalid(
            "monthly_payment",
            "Payment cannot be negative",
        ));
    }

    if periods_elapsed > MAX_AMORTIZATION_YEARS * 12 {
        return Err(MortgageError::invalid(
            "periods_elapsed",
            format!("Cannot project beyond {MAX_AMORTIZATION_YEARS} years"),
        ));
    }

    let rate = monthly_rate(annual_rate_percent);
    let mut balance = principal;
    for _ in 0..periods_elapsed {
        if balance.is_zero() {
            break;
        }
        balance = amortize_period(balance, rate, monthly_payment).ok_or_else(|| {
            MortgageError::invalid(
                "monthly_payment",
                "Payment is below the interest and the balance overflows",
            )
        })?;
    }
    Ok(balance)
}

/// Payment summary for a loan, with totals taken from the simulated payoff
/// at the chosen frequency.
pub fn calculate_payment(input: &LoanInputs) -> MortgageResult<ComputationOutput<PaymentSummary>> {
    let start = Instant::now();
    debug!(
        principal = %input.principal,
        rate = %input.annual_rate_percent,
        years = input.amortization_years,
        frequency = %input.payment_frequency,
        "calculating mortgage payment"
    );

    let mut warnings = Vec::new();
    let simulated = schedule::simulate(input)?;
    let monthly = monthly_payment(
        input.principal,
        input.annual_rate_percent,
        input.amortization_years,
    )?;

    if simulated.periodic_payment.is_zero() && input.principal > Decimal::ZERO {
        warnings.push(
            "Rate or amortization is zero; payment reported as 0 until both are filled in"
                .to_string(),
        );
    }

    let ppy = input.payment_frequency.payments_per_year();
    let annual_payment = simulated
        .periodic_payment
        .checked_mul(Decimal::from(ppy))
        .ok_or_else(payment_overflow)?;
    let summary = PaymentSummary {
        frequency: input.payment_frequency,
        periodic_payment: simulated.periodic_payment,
        monthly_payment: monthly,
        payments_per_year: ppy,
        annual_payment,
        total_paid: simulated.total_paid,
        total_interest: simulated.total_interest,
        payoff_years: simulated.payoff_years,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment amortization, monthly compounding",
        input,
        warnings,
        elapsed,
        summary,
    ))
}

pub(crate) fn validate_loan(input: &LoanInputs) -> MortgageResult<()> {
    validate_principal(input.principal)?;
    if input.amortization_years > MAX_AMORTIZATION_YEARS {
        return Err(MortgageError::invalid(
            "amortization_years",
            format!("Amortization cannot exceed {MAX_AMORTIZATION_YEARS} years"),
        ));
    }
    Ok(())
}

pub(crate) fn validate_principal(principal: Money) -> MortgageResult<()> {
    if principal < Decimal::ZERO {
        return Err(MortgageError::invalid(
            "principal",
            "Principal cannot be negative",
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

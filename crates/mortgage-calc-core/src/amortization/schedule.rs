//! Payoff schedule at the borrower's chosen payment frequency.
//!
//! Each period accrues `annual_rate / 100 / payments_per_year` on the
//! outstanding balance, then applies the payment. The last payment is
//! trimmed to what is owed. Rows are aggregated per year.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, trace};

use super::payment::{compute_periodic_payment, payment_overflow, validate_loan, LoanInputs};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::MortgageResult;

/// Balance below which the loan is considered retired.
const BALANCE_EPSILON: Decimal = dec!(0.01);

/// Hard stop for the simulation, as a multiple of the scheduled periods.
/// Every-two-months payments run one period past the nominal horizon.
const MAX_PERIOD_MULTIPLE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleYear {
    pub year: u32,
    pub payments: u32,
    pub interest_paid: Money,
    pub principal_paid: Money,
    pub ending_balance: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub periodic_payment: Money,
    pub payments_per_year: u32,
    pub periodic_rate: Rate,
    pub schedule: Vec<ScheduleYear>,
    pub total_interest: Money,
    pub total_paid: Money,
    pub payoff_periods: u32,
    pub payoff_years: Decimal,
    /// Non-zero only when nothing amortizes (zero payment).
    pub remaining_balance: Money,
}

/// Year-by-year payoff schedule wrapped in the standard envelope.
pub fn build_schedule(
    input: &LoanInputs,
) -> MortgageResult<ComputationOutput<AmortizationSchedule>> {
    let start = Instant::now();
    debug!(
        principal = %input.principal,
        rate = %input.annual_rate_percent,
        years = input.amortization_years,
        frequency = %input.payment_frequency,
        "building amortization schedule"
    );

    let mut warnings = Vec::new();
    let schedule = simulate(input)?;

    if schedule.remaining_balance > BALANCE_EPSILON {
        warnings.push(format!(
            "Loan not retired: {} outstanding after {} payments",
            schedule.remaining_balance.round_dp(2),
            schedule.payoff_periods
        ));
    }
    let scheduled_periods = input
        .amortization_years
        .saturating_mul(input.payment_frequency.payments_per_year());
    if input.payment_frequency.is_accelerated() && schedule.payoff_periods > 0 {
        let saved = Decimal::from(input.amortization_years) - schedule.payoff_years;
        warnings.push(format!(
            "Accelerated payments retire the loan {} years early ({} of {} scheduled payments)",
            saved.round_dp(2),
            schedule.payoff_periods,
            scheduled_periods
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Amortization schedule, interest-then-principal per payment period",
        input,
        warnings,
        elapsed,
        schedule,
    ))
}

pub(crate) fn simulate(input: &LoanInputs) -> MortgageResult<AmortizationSchedule> {
    validate_loan(input)?;

    let frequency = input.payment_frequency;
    let ppy = frequency.payments_per_year();
    let payment = compute_periodic_payment(
        input.principal,
        input.annual_rate_percent,
        input.amortization_years,
        frequency,
    )?;
    let rate = input.annual_rate_percent / dec!(100) / Decimal::from(ppy);

    let mut balance = input.principal;
    let mut rows: Vec<ScheduleYear> = Vec::new();
    let mut total_interest = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;
    let mut period: u32 = 0;

    if payment > Decimal::ZERO {
        let max_periods = input
            .amortization_years
            .saturating_mul(ppy)
            .saturating_mul(MAX_PERIOD_MULTIPLE);

        let mut year_interest = Decimal::ZERO;
        let mut year_principal = Decimal::ZERO;
        let mut year_payments: u32 = 0;

        while period < max_periods && balance > BALANCE_EPSILON {
            period += 1;
            let interest = balance.checked_mul(rate).ok_or_else(payment_overflow)?;
            let owed = balance.checked_add(interest).ok_or_else(payment_overflow)?;
            let paid = payment.min(owed);
            balance = owed - paid;

            year_interest = accumulate(year_interest, interest)?;
            year_principal = accumulate(year_principal, paid - interest)?;
            year_payments += 1;
            total_interest = accumulate(total_interest, interest)?;
            total_paid = accumulate(total_paid, paid)?;

            let year_end = period % ppy == 0;
            if year_end || balance <= BALANCE_EPSILON || period == max_periods {
                let row = ScheduleYear {
                    year: (period - 1) / ppy + 1,
                    payments: year_payments,
                    interest_paid: year_interest,
                    principal_paid: year_principal,
                    ending_balance: balance,
                };
                trace!(year = row.year, balance = %row.ending_balance, "schedule year");
                rows.push(row);
                year_interest = Decimal::ZERO;
                year_principal = Decimal::ZERO;
                year_payments = 0;
            }
        }
    }

    let payoff_years = if ppy > 0 {
        Decimal::from(period) / Decimal::from(ppy)
    } else {
        Decimal::ZERO
    };

    Ok(AmortizationSchedule {
        periodic_payment: payment,
        payments_per_year: ppy,
        periodic_rate: rate,
        schedule: rows,
        total_interest,
        total_paid,
        payoff_periods: period,
        payoff_years,
        remaining_balance: if balance > BALANCE_EPSILON {
            balance
        } else {
            Decimal::ZERO
        },
    })
}

fn accumulate(total: Money, amount: Money) -> MortgageResult<Money> {
    total.checked_add(amount).ok_or_else(payment_overflow)
}

//! Maximum purchase price from income, debts and the GDS/TDS ceilings.
//!
//! The allowed housing payment is the smaller of the GDS ceiling and what
//! the TDS ceiling leaves after existing debts. Only `principal_interest_share`
//! of it (80% by default) is treated as mortgage payment; the loan that payment
//! carries, plus the down payment, is the maximum price.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::amortization::monthly_rate;
use crate::error::MortgageError;
use crate::rules::LendingRules;
use crate::time_value::annuity_present_value;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::MortgageResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffordabilityInput {
    pub annual_household_income: Money,
    #[serde(default)]
    pub monthly_debt_payments: Money,
    #[serde(default)]
    pub proposed_down_payment: Money,
    pub annual_rate_percent: Percent,
    pub amortization_years: u32,
    #[serde(default)]
    pub rules: LendingRules,
}

/// Which debt-service ceiling bounds the payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitingRatio {
    Gds,
    Tds,
    /// Nothing is affordable.
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffordabilityAssessment {
    pub monthly_income: Money,
    pub max_gds_payment: Money,
    pub max_tds_payment: Money,
    pub max_mortgage_payment_from_tds: Money,
    pub max_allowed_payment: Money,
    pub max_principal_interest: Money,
    pub max_principal: Money,
    pub max_home_price: Money,
    pub limiting_ratio: LimitingRatio,
}

impl AffordabilityAssessment {
    fn zero() -> Self {
        Self {
            monthly_income: Decimal::ZERO,
            max_gds_payment: Decimal::ZERO,
            max_tds_payment: Decimal::ZERO,
            max_mortgage_payment_from_tds: Decimal::ZERO,
            max_allowed_payment: Decimal::ZERO,
            max_principal_interest: Decimal::ZERO,
            max_principal: Decimal::ZERO,
            max_home_price: Decimal::ZERO,
            limiting_ratio: LimitingRatio::None,
        }
    }
}

/// Maximum home price for a household. Partially filled forms (no income,
/// rate or amortization yet) yield an all-zero assessment rather than an
/// error.
pub fn assess_affordability(
    annual_income: Money,
    monthly_debts: Money,
    down_payment: Money,
    annual_rate_percent: Percent,
    amortization_years: u32,
    rules: &LendingRules,
) -> MortgageResult<AffordabilityAssessment> {
    if monthly_debts < Decimal::ZERO {
        return Err(MortgageError::invalid(
            "monthly_debt_payments",
            "Monthly debts cannot be negative",
        ));
    }
    if down_payment < Decimal::ZERO {
        return Err(MortgageError::invalid(
            "proposed_down_payment",
            "Down payment cannot be negative",
        ));
    }
    if annual_income <= Decimal::ZERO
        || annual_rate_percent <= Decimal::ZERO
        || amortization_years == 0
    {
        return Ok(AffordabilityAssessment::zero());
    }

    let monthly_income = annual_income / dec!(12);
    let max_gds_payment = monthly_income * rules.gds_ratio;
    let max_tds_payment = monthly_income * rules.tds_ratio;
    let max_from_tds = (max_tds_payment - monthly_debts).max(Decimal::ZERO);
    let max_allowed_payment = max_gds_payment.min(max_from_tds);

    let limiting_ratio = if max_allowed_payment.is_zero() {
        LimitingRatio::None
    } else if max_gds_payment <= max_from_tds {
        LimitingRatio::Gds
    } else {
        LimitingRatio::Tds
    };

    let max_principal_interest = max_allowed_payment * rules.principal_interest_share;
    let max_principal = annuity_present_value(
        monthly_rate(annual_rate_percent),
        amortization_years.saturating_mul(12),
        max_principal_interest,
    )
    .ok_or_else(principal_overflow)?;
    let max_home_price = max_principal
        .checked_add(down_payment)
        .ok_or_else(principal_overflow)?;

    Ok(AffordabilityAssessment {
        monthly_income,
        max_gds_payment,
        max_tds_payment,
        max_mortgage_payment_from_tds: max_from_tds,
        max_allowed_payment,
        max_principal_interest,
        max_principal,
        max_home_price,
        limiting_ratio,
    })
}

fn principal_overflow() -> MortgageError {
    MortgageError::invalid(
        "annual_household_income",
        "Maximum mortgage is too large to represent",
    )
}

/// [`assess_affordability`] wrapped in the standard envelope.
pub fn analyze_affordability(
    input: &AffordabilityInput,
) -> MortgageResult<ComputationOutput<AffordabilityAssessment>> {
    let start = Instant::now();
    debug!(
        income = %input.annual_household_income,
        debts = %input.monthly_debt_payments,
        down = %input.proposed_down_payment,
        rate = %input.annual_rate_percent,
        years = input.amortization_years,
        "assessing affordability"
    );
    let rules = &input.rules;
    rules.validate()?;

    let assessment = assess_affordability(
        input.annual_household_income,
        input.monthly_debt_payments,
        input.proposed_down_payment,
        input.annual_rate_percent,
        input.amortization_years,
        rules,
    )?;

    let mut warnings = Vec::new();
    if assessment.monthly_income.is_zero() {
        warnings.push(
            "Income, rate and amortization are all required; affordability reported as 0"
                .to_string(),
        );
    } else {
        warnings.push(format!(
            "Assumes {}% of the allowed housing payment covers principal and interest; \
             the remainder is reserved for property tax, heat and condo fees",
            (rules.principal_interest_share * dec!(100)).normalize()
        ));
        if assessment.limiting_ratio == LimitingRatio::None {
            warnings.push("Existing debts exhaust the TDS ceiling".to_string());
        }
        let minimum_down = rules.minimum_down_payment(assessment.max_home_price);
        if assessment.max_home_price > Decimal::ZERO && input.proposed_down_payment < minimum_down
        {
            warnings.push(format!(
                "Down payment is below the {} minimum required at the maximum price",
                minimum_down.round_dp(2)
            ));
        }
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "GDS/TDS debt service ceilings with inverse amortization",
        input,
        warnings,
        elapsed,
        assessment,
    ))
}

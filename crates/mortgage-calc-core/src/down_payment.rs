//! Minimum down payment and mortgage default insurance.
//!
//! The premium is financed: it is added to the loan rather than paid at
//! closing. Insurance is mandatory below 20% down and unavailable on homes
//! priced at or above the insured ceiling.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::MortgageError;
use crate::rules::LendingRules;
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::MortgageResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownPaymentInput {
    pub home_price: Money,
    pub proposed_down_payment: Money,
    #[serde(default)]
    pub rules: LendingRules,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownPaymentAssessment {
    pub home_price: Money,
    pub proposed_down_payment: Money,
    pub minimum_required_down_payment: Money,
    pub meets_minimum: bool,
    pub down_payment_percent: Percent,
    pub requires_insurance: bool,
    /// Fraction of the loan (0.031 = 3.10%). Zero when uninsured, and below
    /// the lowest premium tier.
    pub insurance_premium_rate: Rate,
    pub insurance_premium_amount: Money,
    /// `home_price - proposed_down_payment`, floored at zero.
    pub loan_principal: Money,
    pub total_financed_amount: Money,
}

/// Assess a proposed down payment against the minimum-down and premium
/// tables in `rules`.
pub fn assess_down_payment(
    home_price: Money,
    proposed_down_payment: Money,
    rules: &LendingRules,
) -> MortgageResult<DownPaymentAssessment> {
    if home_price <= Decimal::ZERO {
        return Err(MortgageError::invalid(
            "home_price",
            "Home price must be positive",
        ));
    }
    if proposed_down_payment < Decimal::ZERO {
        return Err(MortgageError::invalid(
            "proposed_down_payment",
            "Down payment cannot be negative",
        ));
    }

    let minimum = rules.minimum_down_payment(home_price);
    let down_payment_percent = proposed_down_payment
        .checked_div(home_price)
        .and_then(|share| share.checked_mul(dec!(100)))
        .ok_or_else(|| {
            MortgageError::invalid(
                "proposed_down_payment",
                "Down payment is out of proportion to the home price",
            )
        })?;
    let requires_insurance = down_payment_percent < rules.insurance_free_down_percent
        && rules.insurance_available(home_price);

    let loan_principal = (home_price - proposed_down_payment).max(Decimal::ZERO);
    let premium_rate = if requires_insurance {
        rules.premium_rate(down_payment_percent)
    } else {
        Decimal::ZERO
    };
    let financed = loan_principal
        .checked_mul(premium_rate)
        .and_then(|premium| Some((premium, loan_principal.checked_add(premium)?)));
    let (premium, total_financed_amount) = financed.ok_or_else(|| {
        MortgageError::invalid("home_price", "Financed amount is too large to represent")
    })?;

    Ok(DownPaymentAssessment {
        home_price,
        proposed_down_payment,
        minimum_required_down_payment: minimum,
        meets_minimum: proposed_down_payment >= minimum,
        down_payment_percent,
        requires_insurance,
        insurance_premium_rate: premium_rate,
        insurance_premium_amount: premium,
        loan_principal,
        total_financed_amount,
    })
}

/// [`assess_down_payment`] wrapped in the standard envelope, with warnings
/// for the cases a form should flag.
pub fn analyze_down_payment(
    input: &DownPaymentInput,
) -> MortgageResult<ComputationOutput<DownPaymentAssessment>> {
    let start = Instant::now();
    debug!(
        price = %input.home_price,
        down = %input.proposed_down_payment,
        "assessing down payment"
    );
    input.rules.validate()?;

    let assessment =
        assess_down_payment(input.home_price, input.proposed_down_payment, &input.rules)?;
    let mut warnings = Vec::new();

    if !assessment.meets_minimum {
        warnings.push(format!(
            "Down payment is below the legal minimum of {}",
            assessment.minimum_required_down_payment.round_dp(2)
        ));
        if assessment.requires_insurance && assessment.insurance_premium_rate.is_zero() {
            warnings.push(
                "No insurance premium tier applies below the minimum; premium reported as 0"
                    .to_string(),
            );
        }
    }
    if input.proposed_down_payment > input.home_price {
        warnings.push("Down payment exceeds the home price; nothing is financed".to_string());
    }
    if !input.rules.insurance_available(input.home_price)
        && assessment.down_payment_percent < input.rules.insurance_free_down_percent
    {
        warnings.push(format!(
            "Homes priced at {} or more cannot be insured; {}% down is required",
            input.rules.insured_price_ceiling.round_dp(0),
            input.rules.insurance_free_down_percent.normalize()
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Tiered minimum down payment with financed default insurance premium",
        input,
        warnings,
        elapsed,
        assessment,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::PremiumTier;

    fn assess(price: Decimal, down: Decimal) -> DownPaymentAssessment {
        assess_down_payment(price, down, &LendingRules::default()).unwrap()
    }

    fn analyze(price: Decimal, down: Decimal) -> ComputationOutput<DownPaymentAssessment> {
        analyze_down_payment(&DownPaymentInput {
            home_price: price,
            proposed_down_payment: down,
            rules: LendingRules::default(),
        })
        .unwrap()
    }

    // -----------------------------------------------------------------------
    // 1. Tier boundaries
    // -----------------------------------------------------------------------
    #[test]
    fn test_exactly_five_percent_at_500k() {
        let a = assess(dec!(500_000), dec!(25_000));
        assert_eq!(a.minimum_required_down_payment, dec!(25_000));
        assert!(a.meets_minimum);
        assert!(a.requires_insurance);
        assert_eq!(a.insurance_premium_rate, dec!(0.04));
        assert_eq!(a.insurance_premium_amount, dec!(19_000));
        assert_eq!(a.total_financed_amount, dec!(494_000));
    }

    #[test]
    fn test_second_tier_at_600k() {
        let a = assess(dec!(600_000), dec!(35_000));
        assert_eq!(a.minimum_required_down_payment, dec!(35_000));
        assert!(a.meets_minimum);
        assert_eq!(a.insurance_premium_rate, dec!(0.04));
        assert_eq!(a.insurance_premium_amount, dec!(22_600));
    }

    #[test]
    fn test_over_one_million_needs_twenty_percent() {
        let a = assess(dec!(1_200_000), dec!(240_000));
        assert_eq!(a.minimum_required_down_payment, dec!(240_000));
        assert!(a.meets_minimum);
        assert!(!a.requires_insurance);
        assert_eq!(a.insurance_premium_amount, Decimal::ZERO);
        assert_eq!(a.total_financed_amount, dec!(960_000));
    }

    #[test]
    fn test_over_one_million_never_insured() {
        let a = assess(dec!(1_200_000), dec!(120_000));
        assert!(!a.meets_minimum);
        assert!(!a.requires_insurance);
        assert_eq!(a.insurance_premium_rate, Decimal::ZERO);
    }

    #[test]
    fn test_exactly_one_million_is_uninsurable() {
        let a = assess(dec!(1_000_000), dec!(100_000));
        assert_eq!(a.minimum_required_down_payment, dec!(75_000));
        assert!(a.meets_minimum);
        assert!(!a.requires_insurance);
    }

    // -----------------------------------------------------------------------
    // 2. Premium tiers
    // -----------------------------------------------------------------------
    #[test]
    fn test_ten_percent_down_premium() {
        let a = assess(dec!(500_000), dec!(50_000));
        assert_eq!(a.down_payment_percent, dec!(10));
        assert_eq!(a.insurance_premium_rate, dec!(0.031));
        assert_eq!(a.insurance_premium_amount, dec!(13_950));
        assert_eq!(a.total_financed_amount, dec!(463_950));
    }

    #[test]
    fn test_fifteen_percent_down_premium() {
        let a = assess(dec!(400_000), dec!(60_000));
        assert_eq!(a.insurance_premium_rate, dec!(0.028));
        assert_eq!(a.insurance_premium_amount, dec!(9_520));
    }

    #[test]
    fn test_twenty_percent_down_no_insurance() {
        let a = assess(dec!(500_000), dec!(100_000));
        assert!(!a.requires_insurance);
        assert_eq!(a.insurance_premium_amount, Decimal::ZERO);
        assert_eq!(a.total_financed_amount, dec!(400_000));
    }

    // -----------------------------------------------------------------------
    // 3. Below the minimum
    // -----------------------------------------------------------------------
    #[test]
    fn test_below_five_percent_zero_premium_with_warning() {
        let out = analyze(dec!(400_000), dec!(10_000));
        assert!(!out.result.meets_minimum);
        assert!(out.result.requires_insurance);
        assert_eq!(out.result.insurance_premium_rate, Decimal::ZERO);
        assert_eq!(out.result.total_financed_amount, dec!(390_000));
        assert_eq!(out.warnings.len(), 2);
    }

    #[test]
    fn test_down_payment_above_price_finances_nothing() {
        let out = analyze(dec!(300_000), dec!(350_000));
        assert_eq!(out.result.loan_principal, Decimal::ZERO);
        assert_eq!(out.result.total_financed_amount, Decimal::ZERO);
        assert!(out.warnings.iter().any(|w| w.contains("exceeds")));
    }

    // -----------------------------------------------------------------------
    // 4. Validation
    // -----------------------------------------------------------------------
    #[test]
    fn test_non_positive_price_rejected() {
        let rules = LendingRules::default();
        assert!(assess_down_payment(Decimal::ZERO, dec!(1), &rules).is_err());
        assert!(assess_down_payment(dec!(-5), dec!(1), &rules).is_err());
    }

    #[test]
    fn test_negative_down_payment_rejected() {
        let result = assess_down_payment(dec!(500_000), dec!(-1), &LendingRules::default());
        assert!(matches!(result, Err(MortgageError::InvalidInput { .. })));
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let mut rules = LendingRules::default();
        rules.tds_ratio = dec!(1.5);
        let result = analyze_down_payment(&DownPaymentInput {
            home_price: dec!(500_000),
            proposed_down_payment: dec!(50_000),
            rules,
        });
        assert!(matches!(result, Err(MortgageError::InvalidRules { .. })));
    }

    #[test]
    fn test_unrepresentable_amounts_are_errors() {
        // A grid that insures zero down at 100% doubles the loan.
        let rules = LendingRules {
            insured_price_ceiling: Decimal::MAX,
            premium_tiers: vec![PremiumTier {
                min_down_percent: Decimal::ZERO,
                premium_rate: Decimal::ONE,
            }],
            ..LendingRules::default()
        };
        let financed = assess_down_payment(Decimal::MAX - Decimal::ONE, Decimal::ZERO, &rules);
        assert!(matches!(financed, Err(MortgageError::InvalidInput { .. })));

        let percent = assess_down_payment(
            dec!(0.0000000001),
            dec!(1_000_000_000_000_000_000),
            &LendingRules::default(),
        );
        assert!(matches!(percent, Err(MortgageError::InvalidInput { .. })));
    }
}

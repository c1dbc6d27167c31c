use mortgage_calc_core::affordability::{
    analyze_affordability, assess_affordability, AffordabilityInput, LimitingRatio,
};
use mortgage_calc_core::amortization::{compute_periodic_payment, PaymentFrequency};
use mortgage_calc_core::LendingRules;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn household(income: Decimal, debts: Decimal, down: Decimal) -> AffordabilityInput {
    AffordabilityInput {
        annual_household_income: income,
        monthly_debt_payments: debts,
        proposed_down_payment: down,
        annual_rate_percent: dec!(4.99),
        amortization_years: 25,
        rules: LendingRules::default(),
    }
}

// ===========================================================================
// Floors
// ===========================================================================

#[test]
fn test_zero_income_never_negative() {
    let a = assess_affordability(
        Decimal::ZERO,
        dec!(800),
        dec!(40_000),
        dec!(5),
        25,
        &LendingRules::default(),
    )
    .unwrap();
    assert_eq!(a.max_home_price, Decimal::ZERO);
    assert_eq!(a.max_principal, Decimal::ZERO);
    assert_eq!(a.limiting_ratio, LimitingRatio::None);
}

#[test]
fn test_every_derived_amount_non_negative() {
    for debts in [dec!(0), dec!(1_000), dec!(3_000), dec!(10_000)] {
        let a = analyze_affordability(&household(dec!(75_000), debts, dec!(20_000)))
            .unwrap()
            .result;
        for value in [
            a.max_gds_payment,
            a.max_tds_payment,
            a.max_mortgage_payment_from_tds,
            a.max_allowed_payment,
            a.max_principal_interest,
            a.max_principal,
            a.max_home_price,
        ] {
            assert!(value >= Decimal::ZERO);
        }
    }
}

// ===========================================================================
// Round trip through the amortization engine
// ===========================================================================

#[test]
fn test_max_price_round_trips_to_allowed_payment() {
    for (income, debts, down) in [
        (dec!(95_000), dec!(350), dec!(35_000)),
        (dec!(150_000), dec!(2_100), dec!(120_000)),
        (dec!(62_500), Decimal::ZERO, dec!(15_000)),
    ] {
        let a = analyze_affordability(&household(income, debts, down))
            .unwrap()
            .result;
        let payment = compute_periodic_payment(
            a.max_home_price - down,
            dec!(4.99),
            25,
            PaymentFrequency::Monthly,
        )
        .unwrap();
        assert!(
            payment <= a.max_allowed_payment * dec!(0.8) + dec!(0.000001),
            "payment {} exceeds {}",
            payment,
            a.max_allowed_payment * dec!(0.8)
        );
        assert!((payment - a.max_principal_interest).abs() < dec!(0.000001));
    }
}

#[test]
fn test_more_debt_never_raises_price() {
    let mut previous = Decimal::MAX;
    for debts in [dec!(0), dec!(500), dec!(1_000), dec!(1_500), dec!(2_500)] {
        let price = analyze_affordability(&household(dec!(110_000), debts, dec!(60_000)))
            .unwrap()
            .result
            .max_home_price;
        assert!(price <= previous);
        previous = price;
    }
}

#[test]
fn test_affordability_is_idempotent() {
    let input = household(dec!(130_000), dec!(640), dec!(80_000));
    let a = analyze_affordability(&input).unwrap();
    let b = analyze_affordability(&input).unwrap();
    assert_eq!(a.result, b.result);
    assert_eq!(a.warnings, b.warnings);
}

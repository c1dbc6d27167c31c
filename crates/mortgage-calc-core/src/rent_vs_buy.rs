//! Rent-vs-buy net worth projection.
//!
//! Monthly simulation over the comparison horizon. The buyer pays a fixed
//! carrying cost (mortgage, tax, insurance, maintenance, condo fees) and ends
//! with the appreciated home less the outstanding mortgage. The renter invests
//! the down payment, plus the monthly gap between the two carrying costs when
//! renting is cheaper, and pays rent that steps up once a year.
//!
//! The monthly gap is measured once against the starting rent and held
//! fixed for the whole horizon.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, trace};

use crate::amortization::{monthly_payment, monthly_rate, MAX_AMORTIZATION_YEARS};
use crate::error::MortgageError;
use crate::time_value::{amortize_period, growth_factor};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::MortgageResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyInputs {
    pub home_price: Money,
    pub down_payment: Money,
    pub annual_rate_percent: Percent,
    pub amortization_years: u32,
    #[serde(default)]
    pub annual_property_tax: Money,
    #[serde(default)]
    pub annual_home_insurance: Money,
    #[serde(default)]
    pub annual_maintenance: Money,
    #[serde(default)]
    pub monthly_condo_fees: Money,
    #[serde(default)]
    pub home_appreciation_percent: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentInputs {
    pub monthly_rent: Money,
    #[serde(default)]
    pub annual_renters_insurance: Money,
    #[serde(default)]
    pub annual_rent_increase_percent: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentVsBuyInput {
    pub buy: BuyInputs,
    pub rent: RentInputs,
    pub comparison_years: u32,
    pub investment_return_percent: Percent,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Position of both scenarios at the end of a projection year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlySnapshot {
    pub year: u32,
    pub home_value: Money,
    pub mortgage_balance: Money,
    pub home_equity: Money,
    pub total_paid_buying: Money,
    pub total_paid_renting: Money,
    pub investment_value: Money,
    pub savings_invested: Money,
    pub net_worth_buying: Money,
    pub net_worth_renting: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentVsBuyProjection {
    pub months: u32,
    pub monthly_mortgage_payment: Money,
    pub monthly_cost_buying: Money,
    /// Starting rent plus renters insurance.
    pub monthly_cost_renting: Money,
    /// Amount the renter invests each month; zero when buying is cheaper.
    pub monthly_savings_differential: Money,
    pub total_paid_buying: Money,
    pub future_home_value: Money,
    pub remaining_mortgage_balance: Money,
    pub home_equity: Money,
    pub total_paid_renting: Money,
    pub final_monthly_rent: Money,
    pub investment_value: Money,
    pub savings_invested: Money,
    pub total_investments: Money,
    pub net_worth_buying: Money,
    pub net_worth_renting: Money,
    pub buying_is_better: bool,
    pub difference_in_net_worth: Money,
    pub yearly: Vec<YearlySnapshot>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project both scenarios over `comparison_years` and pick the one that
/// ends with the higher net worth. Nonsensical inputs are rejected.
pub fn compare_rent_vs_buy(
    buy: &BuyInputs,
    rent: &RentInputs,
    comparison_years: u32,
    investment_return_percent: Percent,
) -> MortgageResult<RentVsBuyProjection> {
    validate(buy, rent, comparison_years, investment_return_percent)?;

    let months = comparison_years * 12;

    // Buy side: fixed carrying cost.
    let loan = buy.home_price - buy.down_payment;
    let mortgage_rate = monthly_rate(buy.annual_rate_percent);
    let mortgage_payment =
        monthly_payment(loan, buy.annual_rate_percent, buy.amortization_years)?;
    let monthly_cost_buying = checked(
        [
            buy.annual_property_tax / dec!(12),
            buy.annual_home_insurance / dec!(12),
            buy.annual_maintenance / dec!(12),
            buy.monthly_condo_fees,
        ]
        .into_iter()
        .try_fold(mortgage_payment, |total, cost| total.checked_add(cost)),
        "annual_property_tax",
    )?;
    let appreciation_rate = buy.home_appreciation_percent / dec!(100) / dec!(12);

    // Rent side.
    let renters_insurance = rent.annual_renters_insurance / dec!(12);
    let rent_step = Decimal::ONE + rent.annual_rent_increase_percent / dec!(100);
    let monthly_cost_renting = checked(
        rent.monthly_rent.checked_add(renters_insurance),
        "monthly_rent",
    )?;
    let investment_rate = investment_return_percent / dec!(100) / dec!(12);
    let savings_differential = (monthly_cost_buying - monthly_cost_renting).max(Decimal::ZERO);

    let mut balance = loan;
    let mut current_rent = rent.monthly_rent;
    let mut total_paid_renting = Decimal::ZERO;
    let mut savings_invested = Decimal::ZERO;
    let mut yearly = Vec::new();

    for month in 0..months {
        if month > 0 && month % 12 == 0 {
            current_rent = checked(
                current_rent.checked_mul(rent_step),
                "annual_rent_increase_percent",
            )?;
        }
        total_paid_renting = checked(
            current_rent
                .checked_add(renters_insurance)
                .and_then(|paid| total_paid_renting.checked_add(paid)),
            "annual_rent_increase_percent",
        )?;
        balance = checked(
            amortize_period(balance, mortgage_rate, mortgage_payment),
            "annual_rate_percent",
        )?;
        if savings_differential > Decimal::ZERO {
            savings_invested = checked(
                savings_invested
                    .checked_mul(Decimal::ONE + investment_rate)
                    .and_then(|grown| grown.checked_add(savings_differential)),
                "investment_return_percent",
            )?;
        }

        let elapsed = month + 1;
        if elapsed % 12 == 0 {
            let home_value = compound(
                buy.home_price,
                appreciation_rate,
                elapsed,
                "home_appreciation_percent",
            )?;
            let investment_value = compound(
                buy.down_payment,
                investment_rate,
                elapsed,
                "investment_return_percent",
            )?;
            let position = settle(
                buy,
                monthly_cost_buying,
                elapsed,
                home_value,
                balance,
                investment_value,
                savings_invested,
                total_paid_renting,
            )?;
            let snapshot = YearlySnapshot {
                year: elapsed / 12,
                home_value,
                mortgage_balance: balance,
                home_equity: position.home_equity,
                total_paid_buying: position.total_paid_buying,
                total_paid_renting,
                investment_value,
                savings_invested,
                net_worth_buying: position.net_worth_buying,
                net_worth_renting: position.net_worth_renting,
            };
            trace!(
                year = snapshot.year,
                buying = %snapshot.net_worth_buying,
                renting = %snapshot.net_worth_renting,
                "rent-vs-buy year"
            );
            yearly.push(snapshot);
        }
    }

    let future_home_value = compound(
        buy.home_price,
        appreciation_rate,
        months,
        "home_appreciation_percent",
    )?;
    let investment_value = compound(
        buy.down_payment,
        investment_rate,
        months,
        "investment_return_percent",
    )?;
    let Position {
        home_equity,
        total_paid_buying,
        total_investments,
        net_worth_buying,
        net_worth_renting,
    } = settle(
        buy,
        monthly_cost_buying,
        months,
        future_home_value,
        balance,
        investment_value,
        savings_invested,
        total_paid_renting,
    )?;

    let difference_in_net_worth = checked(
        net_worth_buying.checked_sub(net_worth_renting),
        "home_appreciation_percent",
    )?
    .abs();

    Ok(RentVsBuyProjection {
        months,
        monthly_mortgage_payment: mortgage_payment,
        monthly_cost_buying,
        monthly_cost_renting,
        monthly_savings_differential: savings_differential,
        total_paid_buying,
        future_home_value,
        remaining_mortgage_balance: balance,
        home_equity,
        total_paid_renting,
        final_monthly_rent: current_rent,
        investment_value,
        savings_invested,
        total_investments,
        net_worth_buying,
        net_worth_renting,
        buying_is_better: net_worth_buying > net_worth_renting,
        difference_in_net_worth,
        yearly,
    })
}

/// [`compare_rent_vs_buy`] wrapped in the standard envelope.
pub fn analyze_rent_vs_buy(
    input: &RentVsBuyInput,
) -> MortgageResult<ComputationOutput<RentVsBuyProjection>> {
    let start = Instant::now();
    debug!(
        price = %input.buy.home_price,
        down = %input.buy.down_payment,
        rent = %input.rent.monthly_rent,
        years = input.comparison_years,
        "comparing rent vs buy"
    );

    let projection = compare_rent_vs_buy(
        &input.buy,
        &input.rent,
        input.comparison_years,
        input.investment_return_percent,
    )?;

    let mut warnings = Vec::new();
    if input.comparison_years > input.buy.amortization_years {
        warnings.push(format!(
            "Horizon of {} years exceeds the {}-year amortization; buying cost still includes \
             the mortgage payment after payoff",
            input.comparison_years, input.buy.amortization_years
        ));
    }
    if projection.monthly_savings_differential > Decimal::ZERO
        && input.rent.annual_rent_increase_percent > Decimal::ZERO
    {
        warnings.push(
            "Renter savings are sized on the starting rent and not reduced as rent rises"
                .to_string(),
        );
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monthly rent-vs-buy net worth simulation",
        input,
        warnings,
        elapsed,
        projection,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn compound(value: Money, rate: Rate, periods: u32, field: &str) -> MortgageResult<Money> {
    growth_factor(rate, periods)
        .and_then(|factor| value.checked_mul(factor))
        .ok_or_else(|| MortgageError::invalid(field, "Projection overflows over this horizon"))
}

fn checked(value: Option<Money>, field: &str) -> MortgageResult<Money> {
    value.ok_or_else(|| MortgageError::invalid(field, "Projection overflows over this horizon"))
}

/// Both net worth positions after `months` of the projection.
struct Position {
    home_equity: Money,
    total_paid_buying: Money,
    total_investments: Money,
    net_worth_buying: Money,
    net_worth_renting: Money,
}

#[allow(clippy::too_many_arguments)]
fn settle(
    buy: &BuyInputs,
    monthly_cost_buying: Money,
    months: u32,
    home_value: Money,
    balance: Money,
    investment_value: Money,
    savings_invested: Money,
    total_paid_renting: Money,
) -> MortgageResult<Position> {
    let home_equity = home_value - balance;
    let total_paid_buying = checked(
        monthly_cost_buying
            .checked_mul(Decimal::from(months))
            .and_then(|paid| paid.checked_add(buy.down_payment)),
        "annual_property_tax",
    )?;
    let total_investments = checked(
        investment_value.checked_add(savings_invested),
        "investment_return_percent",
    )?;
    Ok(Position {
        home_equity,
        total_paid_buying,
        total_investments,
        net_worth_buying: checked(
            home_equity.checked_sub(total_paid_buying),
            "annual_property_tax",
        )?,
        net_worth_renting: checked(
            total_investments.checked_sub(total_paid_renting),
            "annual_rent_increase_percent",
        )?,
    })
}

fn validate(
    buy: &BuyInputs,
    rent: &RentInputs,
    comparison_years: u32,
    investment_return_percent: Percent,
) -> MortgageResult<()> {
    if buy.home_price <= Decimal::ZERO {
        return Err(MortgageError::invalid(
            "home_price",
            "Home price must be positive",
        ));
    }
    if comparison_years == 0 {
        return Err(MortgageError::invalid(
            "comparison_years",
            "Comparison horizon must be at least one year",
        ));
    }
    if comparison_years > MAX_AMORTIZATION_YEARS {
        return Err(MortgageError::invalid(
            "comparison_years",
            format!("Comparison horizon cannot exceed {MAX_AMORTIZATION_YEARS} years"),
        ));
    }
    if buy.amortization_years == 0 {
        return Err(MortgageError::invalid(
            "amortization_years",
            "Amortization must be at least one year",
        ));
    }
    if buy.down_payment < Decimal::ZERO || buy.down_payment > buy.home_price {
        return Err(MortgageError::invalid(
            "down_payment",
            "Down payment must be between 0 and the home price",
        ));
    }

    let rates = [
        ("annual_rate_percent", buy.annual_rate_percent),
        ("home_appreciation_percent", buy.home_appreciation_percent),
        ("annual_rent_increase_percent", rent.annual_rent_increase_percent),
        ("investment_return_percent", investment_return_percent),
    ];
    for (field, value) in rates {
        if value < Decimal::ZERO {
            return Err(MortgageError::invalid(field, "Rate cannot be negative"));
        }
    }

    let amounts = [
        ("annual_property_tax", buy.annual_property_tax),
        ("annual_home_insurance", buy.annual_home_insurance),
        ("annual_maintenance", buy.annual_maintenance),
        ("monthly_condo_fees", buy.monthly_condo_fees),
        ("monthly_rent", rent.monthly_rent),
        ("annual_renters_insurance", rent.annual_renters_insurance),
    ];
    for (field, value) in amounts {
        if value < Decimal::ZERO {
            return Err(MortgageError::invalid(field, "Amount cannot be negative"));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::remaining_balance;

    const TOL: Decimal = dec!(0.01);

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, msg: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tol,
            "{}: expected ~{}, got {} (diff = {})",
            msg,
            expected,
            actual,
            diff
        );
    }

    fn standard_buy() -> BuyInputs {
        BuyInputs {
            home_price: dec!(500_000),
            down_payment: dec!(100_000),
            annual_rate_percent: dec!(5),
            amortization_years: 25,
            annual_property_tax: dec!(4_000),
            annual_home_insurance: dec!(1_200),
            annual_maintenance: dec!(3_000),
            monthly_condo_fees: Decimal::ZERO,
            home_appreciation_percent: dec!(3),
        }
    }

    fn standard_rent() -> RentInputs {
        RentInputs {
            monthly_rent: dec!(2_000),
            annual_renters_insurance: dec!(300),
            annual_rent_increase_percent: dec!(2.5),
        }
    }

    fn run(years: u32) -> RentVsBuyProjection {
        compare_rent_vs_buy(&standard_buy(), &standard_rent(), years, dec!(6)).unwrap()
    }

    // -----------------------------------------------------------------------
    // 1. Ten-year reference projection
    // -----------------------------------------------------------------------
    #[test]
    fn test_ten_year_projection() {
        let p = run(10);
        assert_eq!(p.months, 120);
        assert_close(p.monthly_mortgage_payment, dec!(2338.36), TOL, "mortgage");
        assert_close(p.monthly_cost_buying, dec!(3021.69), TOL, "buy cost");
        assert_eq!(p.monthly_cost_renting, dec!(2025));
        assert_close(p.monthly_savings_differential, dec!(996.69), TOL, "gap");
        assert_close(p.total_paid_buying, dec!(462_603.22), TOL, "paid buying");
        assert_close(p.future_home_value, dec!(674_676.77), TOL, "home value");
        assert_close(p.remaining_mortgage_balance, dec!(295_697.90), TOL, "balance");
        assert_close(p.home_equity, dec!(378_978.87), TOL, "equity");
        assert_close(p.total_paid_renting, dec!(271_881.16), TOL, "paid renting");
        assert_close(p.investment_value, dec!(181_939.67), TOL, "down payment invested");
        assert_close(p.savings_invested, dec!(163_337.48), TOL, "savings invested");
        assert_close(p.net_worth_buying, dec!(-83_624.35), dec!(0.05), "nw buying");
        assert_close(p.net_worth_renting, dec!(73_395.99), dec!(0.05), "nw renting");
        assert!(!p.buying_is_better);
        assert_close(p.difference_in_net_worth, dec!(157_020.34), dec!(0.1), "difference");
    }

    // -----------------------------------------------------------------------
    // 2. Rent escalates once per year, after the first twelve months
    // -----------------------------------------------------------------------
    #[test]
    fn test_rent_escalation_schedule() {
        let rent = RentInputs {
            monthly_rent: dec!(2_000),
            annual_renters_insurance: Decimal::ZERO,
            annual_rent_increase_percent: dec!(10),
        };
        let one = compare_rent_vs_buy(&standard_buy(), &rent, 1, dec!(6)).unwrap();
        assert_eq!(one.total_paid_renting, dec!(24_000));
        assert_eq!(one.final_monthly_rent, dec!(2_000));

        let two = compare_rent_vs_buy(&standard_buy(), &rent, 2, dec!(6)).unwrap();
        assert_eq!(two.total_paid_renting, dec!(50_400));
        assert_eq!(two.final_monthly_rent, dec!(2_200));
    }

    // -----------------------------------------------------------------------
    // 3. Savings are invested only when renting is cheaper
    // -----------------------------------------------------------------------
    #[test]
    fn test_no_savings_when_buying_is_cheaper() {
        let rent = RentInputs {
            monthly_rent: dec!(4_000),
            annual_renters_insurance: dec!(300),
            annual_rent_increase_percent: dec!(2),
        };
        let p = compare_rent_vs_buy(&standard_buy(), &rent, 10, dec!(6)).unwrap();
        assert_eq!(p.monthly_savings_differential, Decimal::ZERO);
        assert_eq!(p.savings_invested, Decimal::ZERO);
        assert_eq!(p.total_investments, p.investment_value);
    }

    #[test]
    fn test_savings_annuity_without_growth() {
        let p = compare_rent_vs_buy(&standard_buy(), &standard_rent(), 2, Decimal::ZERO).unwrap();
        assert_eq!(p.savings_invested, p.monthly_savings_differential * dec!(24));
        assert_eq!(p.investment_value, dec!(100_000));
    }

    // -----------------------------------------------------------------------
    // 4. Balance agrees with the amortization engine
    // -----------------------------------------------------------------------
    #[test]
    fn test_balance_matches_amortization_engine() {
        let p = run(7);
        let expected = remaining_balance(
            dec!(400_000),
            dec!(5),
            p.monthly_mortgage_payment,
            84,
        )
        .unwrap();
        assert_eq!(p.remaining_mortgage_balance, expected);
    }

    // -----------------------------------------------------------------------
    // 5. Yearly snapshots
    // -----------------------------------------------------------------------
    #[test]
    fn test_final_snapshot_matches_headline() {
        let p = run(10);
        assert_eq!(p.yearly.len(), 10);
        let last = p.yearly.last().unwrap();
        assert_eq!(last.year, 10);
        assert_eq!(last.home_equity, p.home_equity);
        assert_eq!(last.net_worth_buying, p.net_worth_buying);
        assert_eq!(last.net_worth_renting, p.net_worth_renting);
        assert_eq!(last.total_paid_renting, p.total_paid_renting);
    }

    #[test]
    fn test_snapshot_balances_decline() {
        let p = run(10);
        for pair in p.yearly.windows(2) {
            assert!(pair[1].mortgage_balance < pair[0].mortgage_balance);
            assert!(pair[1].home_value > pair[0].home_value);
        }
    }

    // -----------------------------------------------------------------------
    // 6. Past the amortization period
    // -----------------------------------------------------------------------
    #[test]
    fn test_horizon_past_amortization() {
        let input = RentVsBuyInput {
            buy: standard_buy(),
            rent: standard_rent(),
            comparison_years: 30,
            investment_return_percent: dec!(6),
        };
        let out = analyze_rent_vs_buy(&input).unwrap();
        assert_eq!(out.result.remaining_mortgage_balance, Decimal::ZERO);
        assert_eq!(out.result.home_equity, out.result.future_home_value);
        assert!(out.warnings.iter().any(|w| w.contains("exceeds")));
    }

    // -----------------------------------------------------------------------
    // 7. Validation
    // -----------------------------------------------------------------------
    #[test]
    fn test_rejects_nonsensical_inputs() {
        let rent = standard_rent();

        let mut buy = standard_buy();
        buy.home_price = Decimal::ZERO;
        assert!(compare_rent_vs_buy(&buy, &rent, 10, dec!(6)).is_err());

        assert!(compare_rent_vs_buy(&standard_buy(), &rent, 0, dec!(6)).is_err());
        assert!(compare_rent_vs_buy(&standard_buy(), &rent, 10, dec!(-1)).is_err());

        let mut buy = standard_buy();
        buy.annual_rate_percent = dec!(-0.5);
        assert!(compare_rent_vs_buy(&buy, &rent, 10, dec!(6)).is_err());

        let mut buy = standard_buy();
        buy.home_appreciation_percent = dec!(-2);
        assert!(compare_rent_vs_buy(&buy, &rent, 10, dec!(6)).is_err());

        let mut buy = standard_buy();
        buy.down_payment = dec!(600_000);
        assert!(compare_rent_vs_buy(&buy, &rent, 10, dec!(6)).is_err());

        let mut bad_rent = standard_rent();
        bad_rent.annual_rent_increase_percent = dec!(-3);
        assert!(compare_rent_vs_buy(&standard_buy(), &bad_rent, 10, dec!(6)).is_err());
    }

    #[test]
    fn test_overflowing_projection_is_an_error() {
        let mut buy = standard_buy();
        buy.home_appreciation_percent = dec!(5_000);
        let result = compare_rent_vs_buy(&buy, &standard_rent(), 60, dec!(6));
        assert!(matches!(result, Err(MortgageError::InvalidInput { .. })));
    }

    #[test]
    fn test_runaway_rent_increase_is_an_error() {
        let mut buy = standard_buy();
        buy.home_appreciation_percent = Decimal::ZERO;
        let rent = RentInputs {
            monthly_rent: dec!(2_000),
            annual_renters_insurance: Decimal::ZERO,
            annual_rent_increase_percent: dec!(5_000),
        };
        let result = compare_rent_vs_buy(&buy, &rent, 30, dec!(6));
        assert!(matches!(
            result,
            Err(MortgageError::InvalidInput { ref field, .. }) if field == "annual_rent_increase_percent"
        ));
    }

    #[test]
    fn test_horizon_beyond_ceiling_is_rejected() {
        let result = compare_rent_vs_buy(
            &standard_buy(),
            &standard_rent(),
            MAX_AMORTIZATION_YEARS + 1,
            dec!(6),
        );
        assert!(matches!(
            result,
            Err(MortgageError::InvalidInput { ref field, .. }) if field == "comparison_years"
        ));
    }
}

//! Canadian lending-rule tables.
//!
//! Debt-service ratio ceilings, minimum down payment tiers and the mortgage
//! default insurance premium grid. The defaults reproduce the published
//! federal rules; deployments that track a newer regulator table deserialize
//! their own copy and pass it in with each calculator input.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::MortgageError;
use crate::types::{Money, Percent, Rate};
use crate::MortgageResult;

/// One row of the insurance premium grid: applies when the down payment is
/// at least `min_down_percent` of the price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumTier {
    pub min_down_percent: Percent,
    /// Premium as a fraction of the insured loan (0.04 = 4%).
    pub premium_rate: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LendingRules {
    /// Gross debt service ceiling, fraction of gross monthly income.
    pub gds_ratio: Rate,
    /// Total debt service ceiling, fraction of gross monthly income.
    pub tds_ratio: Rate,
    /// Share of the allowed housing payment assumed to go to principal and
    /// interest; the rest is left for taxes, heat and condo fees.
    pub principal_interest_share: Rate,
    pub min_down_first_tier_limit: Money,
    pub min_down_first_tier_rate: Rate,
    pub min_down_second_tier_rate: Rate,
    /// Purchases at or above this price cannot be insured.
    pub insured_price_ceiling: Money,
    /// Minimum down payment rate above the insured ceiling.
    pub uninsured_min_down_rate: Rate,
    /// Down payment percent at which insurance is no longer required.
    pub insurance_free_down_percent: Percent,
    /// Ordered from the highest `min_down_percent` down.
    pub premium_tiers: Vec<PremiumTier>,
}

impl Default for LendingRules {
    fn default() -> Self {
        Self {
            gds_ratio: dec!(0.35),
            tds_ratio: dec!(0.42),
            principal_interest_share: dec!(0.80),
            min_down_first_tier_limit: dec!(500_000),
            min_down_first_tier_rate: dec!(0.05),
            min_down_second_tier_rate: dec!(0.10),
            insured_price_ceiling: dec!(1_000_000),
            uninsured_min_down_rate: dec!(0.20),
            insurance_free_down_percent: dec!(20),
            premium_tiers: vec![
                PremiumTier {
                    min_down_percent: dec!(15),
                    premium_rate: dec!(0.028),
                },
                PremiumTier {
                    min_down_percent: dec!(10),
                    premium_rate: dec!(0.031),
                },
                PremiumTier {
                    min_down_percent: dec!(5),
                    premium_rate: dec!(0.040),
                },
            ],
        }
    }
}

impl LendingRules {
    /// Minimum legal down payment for a purchase price.
    ///
    /// Up to the first tier limit: 5% of the price. Up to the insured
    /// ceiling: 5% of the first tier plus 10% of the remainder. Above it: 20%
    /// of the whole price.
    pub fn minimum_down_payment(&self, price: Money) -> Money {
        if price <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        if price <= self.min_down_first_tier_limit {
            price * self.min_down_first_tier_rate
        } else if price <= self.insured_price_ceiling {
            self.min_down_first_tier_limit * self.min_down_first_tier_rate
                + (price - self.min_down_first_tier_limit) * self.min_down_second_tier_rate
        } else {
            price * self.uninsured_min_down_rate
        }
    }

    pub fn insurance_available(&self, price: Money) -> bool {
        price < self.insured_price_ceiling
    }

    /// Premium rate for a down payment percent. Zero at or above the
    /// insurance-free threshold and below the lowest tier.
    pub fn premium_rate(&self, down_percent: Percent) -> Rate {
        if down_percent >= self.insurance_free_down_percent {
            return Decimal::ZERO;
        }
        self.premium_tiers
            .iter()
            .find(|tier| down_percent >= tier.min_down_percent)
            .map(|tier| tier.premium_rate)
            .unwrap_or(Decimal::ZERO)
    }

    /// Reject tables no regulator would publish.
    pub fn validate(&self) -> MortgageResult<()> {
        let fractions = [
            ("gds_ratio", self.gds_ratio),
            ("tds_ratio", self.tds_ratio),
            ("principal_interest_share", self.principal_interest_share),
            ("min_down_first_tier_rate", self.min_down_first_tier_rate),
            ("min_down_second_tier_rate", self.min_down_second_tier_rate),
            ("uninsured_min_down_rate", self.uninsured_min_down_rate),
        ];
        for (field, value) in fractions {
            if value <= Decimal::ZERO || value > Decimal::ONE {
                return Err(rules_error(field, "Must be in (0, 1]"));
            }
        }
        if self.gds_ratio > self.tds_ratio {
            return Err(rules_error(
                "gds_ratio",
                "GDS ceiling cannot exceed the TDS ceiling",
            ));
        }
        if self.min_down_first_tier_limit <= Decimal::ZERO {
            return Err(rules_error("min_down_first_tier_limit", "Must be positive"));
        }
        if self.insured_price_ceiling < self.min_down_first_tier_limit {
            return Err(rules_error(
                "insured_price_ceiling",
                "Must be at least the first tier limit",
            ));
        }
        if self.insurance_free_down_percent <= Decimal::ZERO
            || self.insurance_free_down_percent > dec!(100)
        {
            return Err(rules_error("insurance_free_down_percent", "Must be in (0, 100]"));
        }

        let mut previous: Option<&PremiumTier> = None;
        for tier in &self.premium_tiers {
            if tier.premium_rate < Decimal::ZERO || tier.premium_rate > Decimal::ONE {
                return Err(rules_error("premium_tiers", "Premium rate must be in [0, 1]"));
            }
            if tier.min_down_percent < Decimal::ZERO
                || tier.min_down_percent >= self.insurance_free_down_percent
            {
                return Err(rules_error(
                    "premium_tiers",
                    "Tier threshold must lie below the insurance-free percent",
                ));
            }
            if let Some(prev) = previous {
                if tier.min_down_percent >= prev.min_down_percent {
                    return Err(rules_error(
                        "premium_tiers",
                        "Tiers must be ordered by descending min_down_percent",
                    ));
                }
            }
            previous = Some(tier);
        }
        Ok(())
    }
}

fn rules_error(field: &str, reason: &str) -> MortgageError {
    MortgageError::InvalidRules {
        field: field.into(),
        reason: reason.into(),
    }
}

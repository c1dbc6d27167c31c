use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_calc_core::affordability::{self, AffordabilityInput};
use mortgage_calc_core::LendingRules;

use crate::input;

#[derive(Args)]
pub struct AffordabilityArgs {
    /// Gross annual household income
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Monthly payments on other debts (car, cards, student loans)
    #[arg(long, default_value = "0")]
    pub debts: Decimal,

    /// Down payment available
    #[arg(long, default_value = "0")]
    pub down: Decimal,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Amortization period in years
    #[arg(long, default_value = "25")]
    pub years: u32,

    /// Path to a JSON file with the affordability inputs
    #[arg(long)]
    pub input: Option<String>,

    /// Lending rule tables (JSON or YAML) replacing the built-in defaults
    #[arg(long)]
    pub rules: Option<String>,
}

pub fn run_affordability(args: &AffordabilityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut aff_input: AffordabilityInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        AffordabilityInput {
            annual_household_income: args
                .income
                .ok_or("--income is required (or provide --input)")?,
            monthly_debt_payments: args.debts,
            proposed_down_payment: args.down,
            annual_rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
            amortization_years: args.years,
            rules: LendingRules::default(),
        }
    };
    if let Some(ref path) = args.rules {
        aff_input.rules = input::file::read_rules(path)?;
    }

    let result = affordability::analyze_affordability(&aff_input)?;
    Ok(serde_json::to_value(result)?)
}

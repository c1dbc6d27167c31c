use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_calc_core::down_payment::{self, DownPaymentInput};
use mortgage_calc_core::LendingRules;

use crate::input;

#[derive(Args)]
pub struct DownPaymentArgs {
    /// Purchase price of the home
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Proposed down payment
    #[arg(long)]
    pub down: Option<Decimal>,

    /// Path to a JSON file with the down payment inputs
    #[arg(long)]
    pub input: Option<String>,

    /// Lending rule tables (JSON or YAML) replacing the built-in defaults
    #[arg(long)]
    pub rules: Option<String>,
}

pub fn run_down_payment(args: &DownPaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut dp_input: DownPaymentInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        DownPaymentInput {
            home_price: args.price.ok_or("--price is required (or provide --input)")?,
            proposed_down_payment: args.down.ok_or("--down is required (or provide --input)")?,
            rules: LendingRules::default(),
        }
    };
    if let Some(ref path) = args.rules {
        dp_input.rules = input::file::read_rules(path)?;
    }

    let result = down_payment::analyze_down_payment(&dp_input)?;
    Ok(serde_json::to_value(result)?)
}

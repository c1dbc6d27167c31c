use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_calc_core::amortization::{self, LoanInputs, PaymentFrequency};

use crate::input;

#[derive(Args)]
pub struct LoanArgs {
    /// Amount financed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 4.79)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Amortization period in years
    #[arg(long, default_value = "25")]
    pub years: u32,

    /// weekly, biweekly, monthly, bimonthly, accelerated-weekly or accelerated-biweekly
    #[arg(long, default_value = "monthly")]
    pub frequency: PaymentFrequency,

    /// Path to a JSON file with the loan inputs
    #[arg(long)]
    pub input: Option<String>,
}

fn loan_inputs(args: &LoanArgs) -> Result<LoanInputs, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_json(path);
    }
    if let Some(data) = input::stdin::read_stdin()? {
        return Ok(serde_json::from_value(data)?);
    }
    Ok(LoanInputs {
        principal: args
            .principal
            .ok_or("--principal is required (or provide --input)")?,
        annual_rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
        amortization_years: args.years,
        payment_frequency: args.frequency,
    })
}

pub fn run_payment(args: &LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = loan_inputs(args)?;
    let result = amortization::calculate_payment(&loan)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: &LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = loan_inputs(args)?;
    let result = amortization::build_schedule(&loan)?;
    Ok(serde_json::to_value(result)?)
}

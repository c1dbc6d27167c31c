use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_calc_core::rent_vs_buy::{self, BuyInputs, RentInputs, RentVsBuyInput};

use crate::input;

#[derive(Args)]
pub struct RentVsBuyArgs {
    /// Purchase price of the home
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Down payment on the purchase
    #[arg(long)]
    pub down: Option<Decimal>,

    /// Mortgage rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Mortgage amortization in years
    #[arg(long, default_value = "25")]
    pub amortization: u32,

    #[arg(long, default_value = "0")]
    pub property_tax: Decimal,

    #[arg(long, default_value = "0")]
    pub home_insurance: Decimal,

    /// Annual maintenance budget
    #[arg(long, default_value = "0")]
    pub maintenance: Decimal,

    #[arg(long, default_value = "0")]
    pub condo_fees: Decimal,

    /// Annual home appreciation in percent
    #[arg(long, default_value = "0")]
    pub appreciation: Decimal,

    /// Current monthly rent
    #[arg(long)]
    pub rent: Option<Decimal>,

    #[arg(long, default_value = "0")]
    pub renters_insurance: Decimal,

    /// Annual rent increase in percent
    #[arg(long, default_value = "0")]
    pub rent_increase: Decimal,

    /// Comparison horizon in years
    #[arg(long, default_value = "10")]
    pub horizon: u32,

    /// Annual return on invested savings in percent
    #[arg(long, default_value = "0")]
    pub investment_return: Decimal,

    /// Path to a JSON file with the comparison inputs
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_rent_vs_buy(args: &RentVsBuyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rvb_input: RentVsBuyInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        RentVsBuyInput {
            buy: BuyInputs {
                home_price: args.price.ok_or("--price is required (or provide --input)")?,
                down_payment: args.down.ok_or("--down is required (or provide --input)")?,
                annual_rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
                amortization_years: args.amortization,
                annual_property_tax: args.property_tax,
                annual_home_insurance: args.home_insurance,
                annual_maintenance: args.maintenance,
                monthly_condo_fees: args.condo_fees,
                home_appreciation_percent: args.appreciation,
            },
            rent: RentInputs {
                monthly_rent: args.rent.ok_or("--rent is required (or provide --input)")?,
                annual_renters_insurance: args.renters_insurance,
                annual_rent_increase_percent: args.rent_increase,
            },
            comparison_years: args.horizon,
            investment_return_percent: args.investment_return,
        }
    };

    let result = rent_vs_buy::analyze_rent_vs_buy(&rvb_input)?;
    Ok(serde_json::to_value(result)?)
}

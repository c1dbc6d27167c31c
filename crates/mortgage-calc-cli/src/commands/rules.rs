use clap::Args;
use serde_json::Value;

use mortgage_calc_core::LendingRules;

use crate::input;

#[derive(Args)]
pub struct RulesArgs {
    /// Lending rule tables (JSON or YAML) to check and print instead of the defaults
    #[arg(long)]
    pub rules: Option<String>,
}

/// The rule tables a calculation would run with: the `--rules` file when
/// given, otherwise the built-in defaults.
pub fn run_rules(args: &RulesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rules = match args.rules {
        Some(ref path) => input::file::read_rules(path)?,
        None => LendingRules::default(),
    };
    rules.validate()?;
    Ok(serde_json::to_value(rules)?)
}

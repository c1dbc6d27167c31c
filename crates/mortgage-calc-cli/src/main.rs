mod commands;
mod input;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing::Level;

use commands::affordability::AffordabilityArgs;
use commands::down_payment::DownPaymentArgs;
use commands::payment::LoanArgs;
use commands::rent_vs_buy::RentVsBuyArgs;
use commands::rules::RulesArgs;

/// Canadian mortgage calculators
#[derive(Parser)]
#[command(
    name = "mcalc",
    version,
    about = "Canadian mortgage calculators",
    long_about = "Mortgage payment, amortization schedule, minimum down payment and \
                  default insurance, GDS/TDS affordability, and rent-vs-buy projections \
                  with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log to stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Periodic payment at any frequency, with payoff totals
    Payment(LoanArgs),
    /// Year-by-year amortization schedule
    Schedule(LoanArgs),
    /// Minimum down payment and mortgage default insurance premium
    DownPayment(DownPaymentArgs),
    /// Maximum purchase price from income and debts (GDS/TDS)
    Affordability(AffordabilityArgs),
    /// Compare net worth after renting versus buying
    RentVsBuy(RentVsBuyArgs),
    /// Print the lending rule tables in effect
    Rules(RulesArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Commands::Payment(args) => commands::payment::run_payment(args),
        Commands::Schedule(args) => commands::payment::run_schedule(args),
        Commands::DownPayment(args) => commands::down_payment::run_down_payment(args),
        Commands::Affordability(args) => commands::affordability::run_affordability(args),
        Commands::RentVsBuy(args) => commands::rent_vs_buy::run_rent_vs_buy(args),
        Commands::Rules(args) => commands::rules::run_rules(args),
        Commands::Version => {
            println!("mcalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

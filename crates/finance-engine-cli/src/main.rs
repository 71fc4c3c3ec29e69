mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::amortization::{AmortizeArgs, CompareArgs};
use commands::investment::{CashFlowArgs, CompoundArgs, IrrArgs, SavingsPlanArgs};
use commands::payroll::{EmployerCostArgs, PayrollArgs};
use commands::pricing::{BreakEvenArgs, EbitdaArgs, PricingArgs};
use output::OutputFormat;

/// Payroll, loan, investment and pricing calculations with decimal precision
#[derive(Parser)]
#[command(
    name = "fin",
    version,
    about = "Payroll, loan, investment and pricing calculations with decimal precision",
    long_about = "A CLI for personal and small-business finance calculations with exact \
                  decimal arithmetic. Supports gross-to-net payroll, employer cost, SAC and \
                  PRICE amortization, compound growth, NPV/IRR, savings plans, markup \
                  pricing, break-even and EBITDA."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Regulatory configuration file (YAML or JSON); defaults to the bundled 2026 tables
    #[arg(long, global = true)]
    config: Option<String>,

    /// Regulatory year to use from the configuration file (defaults to the latest)
    #[arg(long, global = true)]
    year: Option<i32>,

    /// Log engine diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Gross-to-net payroll: contribution, income tax and net pay
    Payroll(PayrollArgs),
    /// Total monthly employer cost of a salary
    EmployerCost(EmployerCostArgs),
    /// Loan amortization schedule (SAC or PRICE)
    Amortize(AmortizeArgs),
    /// SAC and PRICE schedules side by side
    CompareAmortization(CompareArgs),
    /// Compound growth with monthly contributions
    Compound(CompoundArgs),
    /// NPV and IRR of a cash-flow series
    Npv(CashFlowArgs),
    /// Internal rate of return (Newton-Raphson)
    Irr(IrrArgs),
    /// Year-by-year savings plan projection
    SavingsPlan(SavingsPlanArgs),
    /// Markup divisor pricing, with optional break-even and EBITDA
    Pricing(PricingArgs),
    /// Break-even revenue from fixed costs and contribution margin
    BreakEven(BreakEvenArgs),
    /// Simplified EBITDA
    Ebitda(EbitdaArgs),
    /// Print version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let regulatory = || config::load_regulatory(cli.config.as_deref(), cli.year);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payroll(args) => {
            regulatory().and_then(|cfg| commands::payroll::run_payroll(args, &cfg))
        }
        Commands::EmployerCost(args) => {
            regulatory().and_then(|cfg| commands::payroll::run_employer_cost(args, &cfg))
        }
        Commands::Amortize(args) => commands::amortization::run_amortize(args),
        Commands::CompareAmortization(args) => commands::amortization::run_compare(args),
        Commands::Compound(args) => commands::investment::run_compound(args),
        Commands::Npv(args) => commands::investment::run_cash_flows(args),
        Commands::Irr(args) => commands::investment::run_irr(args),
        Commands::SavingsPlan(args) => {
            regulatory().and_then(|cfg| commands::investment::run_savings_plan(args, &cfg))
        }
        Commands::Pricing(args) => commands::pricing::run_pricing(args),
        Commands::BreakEven(args) => commands::pricing::run_break_even(args),
        Commands::Ebitda(args) => commands::pricing::run_ebitda(args),
        Commands::Version => {
            println!("fin {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            cli.output.print(&value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

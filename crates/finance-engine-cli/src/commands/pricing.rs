use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use finance_engine_core::decimal::parse_decimal;
use finance_engine_core::pricing::break_even;
use finance_engine_core::pricing::markup::{self, PricingInput};

use crate::input;

/// Arguments for markup pricing
#[derive(Args)]
pub struct PricingArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Unit cost of the product or service
    #[arg(long, value_parser = parse_decimal)]
    pub unit_cost: Option<Decimal>,

    /// Sales taxes in percent of price
    #[arg(long, default_value = "0", value_parser = parse_decimal)]
    pub tax_pct: Decimal,

    /// Selling expenses (commissions, card fees) in percent of price
    #[arg(long, default_value = "0", value_parser = parse_decimal)]
    pub expense_pct: Decimal,

    /// Target profit margin in percent of price
    #[arg(long, value_parser = parse_decimal)]
    pub margin_pct: Option<Decimal>,

    /// Monthly fixed costs, for break-even
    #[arg(long, value_parser = parse_decimal)]
    pub fixed_costs: Option<Decimal>,

    /// Contribution margin in percent, for break-even
    #[arg(long, value_parser = parse_decimal)]
    pub contribution_margin_pct: Option<Decimal>,

    /// Monthly net revenue, for EBITDA
    #[arg(long, value_parser = parse_decimal)]
    pub net_revenue: Option<Decimal>,

    /// Monthly variable costs, for EBITDA
    #[arg(long, value_parser = parse_decimal)]
    pub variable_costs: Option<Decimal>,
}

/// Arguments for break-even revenue
#[derive(Args)]
pub struct BreakEvenArgs {
    /// Monthly fixed costs
    #[arg(long, value_parser = parse_decimal)]
    pub fixed_costs: Decimal,

    /// Contribution margin in percent
    #[arg(long, alias = "margin", value_parser = parse_decimal)]
    pub contribution_margin_pct: Decimal,
}

/// Arguments for EBITDA
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct EbitdaArgs {
    /// Net revenue
    #[arg(long, value_parser = parse_decimal)]
    pub net_revenue: Decimal,

    /// Variable costs
    #[arg(long, default_value = "0", value_parser = parse_decimal)]
    pub variable_costs: Decimal,

    /// Fixed expenses
    #[arg(long, default_value = "0", value_parser = parse_decimal)]
    pub fixed_expenses: Decimal,
}

pub fn run_pricing(args: PricingArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let pricing_input: PricingInput = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => PricingInput {
            unit_cost: args
                .unit_cost
                .ok_or("--unit-cost is required (or provide --input)")?,
            tax_pct: args.tax_pct,
            expense_pct: args.expense_pct,
            margin_pct: args
                .margin_pct
                .ok_or("--margin-pct is required (or provide --input)")?,
            fixed_costs: args.fixed_costs,
            contribution_margin_pct: args.contribution_margin_pct,
            net_revenue: args.net_revenue,
            variable_costs: args.variable_costs,
        },
    };

    let result = markup::analyze_pricing(&pricing_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_break_even(args: BreakEvenArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let revenue = break_even::break_even_revenue(args.fixed_costs, args.contribution_margin_pct)?;
    Ok(json!({
        "fixed_costs": args.fixed_costs.to_string(),
        "contribution_margin_pct": args.contribution_margin_pct.to_string(),
        "break_even_revenue": revenue.to_string(),
    }))
}

pub fn run_ebitda(args: EbitdaArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let value = break_even::ebitda(args.net_revenue, args.variable_costs, args.fixed_expenses)?;
    let margin = break_even::ebitda_margin_pct(args.net_revenue, value)?;
    Ok(json!({
        "ebitda": value.to_string(),
        "ebitda_margin_pct": margin.map(|pct| pct.to_string()),
    }))
}

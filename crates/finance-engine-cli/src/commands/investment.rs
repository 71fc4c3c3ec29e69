use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use finance_engine_core::decimal::parse_decimal;
use finance_engine_core::decimal::{quantize, Precision};
use finance_engine_core::investment::cash_flows::{self, CashFlowInput, DEFAULT_IRR_GUESS};
use finance_engine_core::investment::compound::{self, CompoundInput};
use finance_engine_core::investment::savings_plan::{self, SavingsPlanInput};
use finance_engine_core::payroll::gross_to_net::{calculate_payroll, PayrollInput};
use finance_engine_core::RegulatoryConfig;

use crate::input;

/// Arguments for compound growth
#[derive(Args)]
pub struct CompoundArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Initial amount
    #[arg(long, value_parser = parse_decimal)]
    pub principal: Option<Decimal>,

    /// Monthly rate in percent (0.8 = 0.8% a month)
    #[arg(long, alias = "rate", value_parser = parse_decimal)]
    pub monthly_rate_pct: Option<Decimal>,

    /// Number of months
    #[arg(long, alias = "months")]
    pub periods: Option<u32>,

    /// Deposit made at the end of each month
    #[arg(long, value_parser = parse_decimal)]
    pub monthly_contribution: Option<Decimal>,
}

/// Arguments for NPV / IRR analysis
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct CashFlowArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Discount rate per period in percent
    #[arg(long, alias = "rate", value_parser = parse_decimal)]
    pub discount_rate_pct: Option<Decimal>,

    /// Comma-separated cash flows, period 0 first (e.g. -1000,300,400,500)
    #[arg(long, value_delimiter = ',', value_parser = parse_decimal)]
    pub cash_flows: Vec<Decimal>,

    /// Starting rate for the IRR search as a decimal (default 0.1)
    #[arg(long, value_parser = parse_decimal)]
    pub irr_guess: Option<Decimal>,
}

/// Arguments for a standalone IRR
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct IrrArgs {
    /// Comma-separated cash flows, period 0 first
    #[arg(long, value_delimiter = ',', required = true, value_parser = parse_decimal)]
    pub cash_flows: Vec<Decimal>,

    /// Starting rate for the search as a decimal
    #[arg(long, value_parser = parse_decimal)]
    pub guess: Option<Decimal>,
}

/// Arguments for the yearly savings plan
#[derive(Args)]
pub struct SavingsPlanArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Fixed monthly deposit
    #[arg(long, conflicts_with = "gross_salary", value_parser = parse_decimal)]
    pub monthly_contribution: Option<Decimal>,

    /// Derive the deposit from the net pay of this gross salary
    #[arg(long, value_parser = parse_decimal)]
    pub gross_salary: Option<Decimal>,

    /// Share of net pay invested, in percent (used with --gross-salary)
    #[arg(long, default_value = "20", value_parser = parse_decimal)]
    pub share_pct: Decimal,

    /// Dependents for the net-pay calculation (used with --gross-salary)
    #[arg(long, default_value_t = 0)]
    pub dependents: u32,

    /// Monthly return in percent
    #[arg(long, alias = "rate", default_value = "0.8", value_parser = parse_decimal)]
    pub monthly_rate_pct: Decimal,

    /// Number of years
    #[arg(long, default_value_t = 10)]
    pub years: u32,
}

pub fn run_compound(args: CompoundArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let compound_input: CompoundInput = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => CompoundInput {
            principal: args.principal.unwrap_or_default(),
            monthly_rate_pct: args
                .monthly_rate_pct
                .ok_or("--monthly-rate-pct is required (or provide --input)")?,
            periods: args
                .periods
                .ok_or("--periods is required (or provide --input)")?,
            monthly_contribution: args.monthly_contribution.unwrap_or_default(),
        },
    };

    let result = compound::project_compound(&compound_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_cash_flows(args: CashFlowArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cf_input: CashFlowInput = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => {
            if args.cash_flows.is_empty() {
                return Err("--cash-flows is required (or provide --input)".into());
            }
            CashFlowInput {
                discount_rate_pct: args
                    .discount_rate_pct
                    .ok_or("--discount-rate-pct is required (or provide --input)")?,
                cash_flows: args.cash_flows,
                irr_guess: args.irr_guess,
            }
        }
    };

    let result = cash_flows::analyze_cash_flows(&cf_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_irr(args: IrrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let estimate = cash_flows::solve_irr(&args.cash_flows, args.guess.unwrap_or(DEFAULT_IRR_GUESS));
    Ok(serde_json::to_value(estimate)?)
}

pub fn run_savings_plan(
    args: SavingsPlanArgs,
    config: &RegulatoryConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    if let Some(parsed) = input::read_input::<SavingsPlanInput>(args.input.as_deref())? {
        let result = savings_plan::project_savings_plan(&parsed)?;
        return Ok(serde_json::to_value(result)?);
    }

    let (monthly_contribution, net_pay) = match (args.monthly_contribution, args.gross_salary) {
        (Some(contribution), _) => (contribution, None),
        (None, Some(gross)) => {
            let payroll = calculate_payroll(
                &PayrollInput {
                    dependents: args.dependents,
                    ..PayrollInput::new(gross)
                },
                config,
            )?;
            let net = payroll.result.net_pay;
            let share = quantize(net * args.share_pct / dec!(100), Precision::Currency);
            (share, Some(net))
        }
        (None, None) => {
            return Err("--monthly-contribution or --gross-salary is required (or provide --input)".into())
        }
    };

    let plan_input = SavingsPlanInput {
        monthly_contribution,
        monthly_rate_pct: args.monthly_rate_pct,
        years: args.years,
    };
    let result = savings_plan::project_savings_plan(&plan_input)?;
    let mut value = serde_json::to_value(result)?;

    if let (Some(net), Some(obj)) = (net_pay, value.as_object_mut()) {
        obj.insert(
            "source".into(),
            json!({
                "net_pay": net.to_string(),
                "share_pct": args.share_pct.to_string(),
                "monthly_contribution": monthly_contribution.to_string(),
            }),
        );
    }
    Ok(value)
}

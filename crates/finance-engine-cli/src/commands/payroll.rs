use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use finance_engine_core::decimal::parse_decimal;
use finance_engine_core::payroll::employer_cost::{self, EmployerCostInput};
use finance_engine_core::payroll::gross_to_net::{self, PayrollInput};
use finance_engine_core::RegulatoryConfig;

use crate::input;

/// Arguments for gross-to-net payroll
#[derive(Args)]
pub struct PayrollArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly gross salary
    #[arg(long, alias = "gross", value_parser = parse_decimal)]
    pub gross_salary: Option<Decimal>,

    /// Number of dependents for the income-tax allowance
    #[arg(long, default_value_t = 0)]
    pub dependents: u32,

    /// Other payroll deductions (health plan, union fees, ...)
    #[arg(long, value_parser = parse_decimal)]
    pub other_deductions: Option<Decimal>,

    /// Non-taxable benefits added to net pay
    #[arg(long, value_parser = parse_decimal)]
    pub benefits: Option<Decimal>,
}

/// Arguments for employer cost
#[derive(Args)]
pub struct EmployerCostArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly gross salary
    #[arg(long, alias = "gross", value_parser = parse_decimal)]
    pub gross_salary: Option<Decimal>,

    /// Accident-insurance rate override as a decimal (e.g. 0.03)
    #[arg(long, value_parser = parse_decimal)]
    pub accident_insurance_rate: Option<Decimal>,

    /// Sector levy rate override as a decimal (e.g. 0.058)
    #[arg(long, value_parser = parse_decimal)]
    pub sector_levy_rate: Option<Decimal>,
}

pub fn run_payroll(
    args: PayrollArgs,
    config: &RegulatoryConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let payroll_input: PayrollInput = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => PayrollInput {
            gross_salary: args
                .gross_salary
                .ok_or("--gross-salary is required (or provide --input)")?,
            dependents: args.dependents,
            other_deductions: args.other_deductions.unwrap_or_default(),
            benefits: args.benefits.unwrap_or_default(),
        },
    };

    let result = gross_to_net::calculate_payroll(&payroll_input, config)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_employer_cost(
    args: EmployerCostArgs,
    config: &RegulatoryConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let cost_input: EmployerCostInput = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => EmployerCostInput {
            gross_salary: args
                .gross_salary
                .ok_or("--gross-salary is required (or provide --input)")?,
            accident_insurance_rate: args.accident_insurance_rate,
            sector_levy_rate: args.sector_levy_rate,
        },
    };

    let result = employer_cost::calculate_employer_cost(&cost_input, config)?;
    Ok(serde_json::to_value(result)?)
}

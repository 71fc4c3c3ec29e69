use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use finance_engine_core::decimal::parse_decimal;
use finance_engine_core::amortization::comparison;
use finance_engine_core::amortization::schedule::{self, AmortizationInput, AmortizationMethod};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MethodArg {
    /// Constant principal, declining installments
    Sac,
    /// Constant installment (annuity)
    Price,
}

impl From<MethodArg> for AmortizationMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Sac => AmortizationMethod::ConstantPrincipal,
            MethodArg::Price => AmortizationMethod::ConstantInstallment,
        }
    }
}

/// Loan terms shared by both amortization commands
#[derive(Args)]
pub struct LoanArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Financed amount
    #[arg(long, value_parser = parse_decimal)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (12 = 12% a year)
    #[arg(long, alias = "rate", value_parser = parse_decimal)]
    pub annual_rate_pct: Option<Decimal>,

    /// Number of monthly installments
    #[arg(long, alias = "months")]
    pub periods: Option<u32>,
}

/// Arguments for a single amortization schedule
#[derive(Args)]
pub struct AmortizeArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Amortization method
    #[arg(long, value_enum, default_value = "price")]
    pub method: MethodArg,
}

/// Arguments for the SAC vs PRICE comparison
#[derive(Args)]
pub struct CompareArgs {
    #[command(flatten)]
    pub loan: LoanArgs,
}

fn loan_input(
    loan: &LoanArgs,
    method: AmortizationMethod,
) -> Result<AmortizationInput, Box<dyn std::error::Error>> {
    if let Some(parsed) = input::read_input(loan.input.as_deref())? {
        return Ok(parsed);
    }
    Ok(AmortizationInput {
        principal: loan
            .principal
            .ok_or("--principal is required (or provide --input)")?,
        annual_rate_pct: loan
            .annual_rate_pct
            .ok_or("--annual-rate-pct is required (or provide --input)")?,
        periods: loan
            .periods
            .ok_or("--periods is required (or provide --input)")?,
        method,
    })
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = loan_input(&args.loan, args.method.into())?;
    let result = schedule::build_schedule(&loan)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = loan_input(&args.loan, AmortizationMethod::default())?;
    let result = comparison::compare_schedules(&loan)?;
    Ok(serde_json::to_value(result)?)
}

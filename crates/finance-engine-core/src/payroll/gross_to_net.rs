use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::RegulatoryConfig;
use crate::decimal::{checked, quantize, validate_positive, Precision};
use crate::payroll::brackets::{compute_contribution, compute_income_tax};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::FinanceResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollInput {
    pub gross_salary: Money,
    #[serde(default)]
    pub dependents: u32,
    #[serde(default)]
    pub other_deductions: Money,
    #[serde(default)]
    pub benefits: Money,
}

impl PayrollInput {
    pub fn new(gross_salary: Money) -> Self {
        PayrollInput {
            gross_salary,
            dependents: 0,
            other_deductions: Decimal::ZERO,
            benefits: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollOutput {
    pub gross_salary: Money,
    pub contribution: Money,
    pub taxable_base: Money,
    pub income_tax: Money,
    pub other_deductions: Money,
    pub benefits: Money,
    /// Employer deposit; not withheld from the employee.
    pub severance_fund: Money,
    pub net_pay: Money,
    /// Contribution plus income tax over gross, as a percentage.
    pub effective_deduction_rate_pct: Percent,
}

// ---------------------------------------------------------------------------
// Gross-to-net
// ---------------------------------------------------------------------------

/// Gross-to-net payroll for one month.
///
/// Contribution comes off the gross first, the dependent allowance reduces
/// the income-tax base, and income tax is looked up on what remains. The
/// employer severance-fund deposit is reported but not withheld.
pub fn calculate_payroll(
    input: &PayrollInput,
    config: &RegulatoryConfig,
) -> FinanceResult<ComputationOutput<PayrollOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_payroll_input(input)?;

    let gross = input.gross_salary;

    // 1. Contribution (progressive, capped)
    let contribution = compute_contribution(gross, &config.contribution)?;
    if gross > config.contribution.ceiling {
        warnings.push(format!(
            "Gross salary {} exceeds the contribution ceiling {}; contribution is capped at {}",
            gross, config.contribution.ceiling, contribution
        ));
    }

    // 2. Income-tax base
    let dependent_allowance = checked(
        Decimal::from(input.dependents).checked_mul(config.dependent_deduction),
        "dependent allowance",
    )?;
    let taxable_base = (gross - contribution - dependent_allowance).max(Decimal::ZERO);

    // 3. Income tax
    let income_tax = compute_income_tax(taxable_base, &config.income_tax)?.max(Decimal::ZERO);

    // 4. Severance fund (employer side)
    let severance_fund = gross * config.severance_fund_rate;

    // 5. Net pay
    let net_pay = checked(
        (gross - contribution - income_tax - input.other_deductions).checked_add(input.benefits),
        "net pay",
    )?;
    if net_pay < Decimal::ZERO {
        warnings.push(format!(
            "Deductions exceed earnings: net pay is negative ({})",
            quantize(net_pay, Precision::Currency)
        ));
    }

    let effective_deduction_rate_pct = if gross.is_zero() {
        Decimal::ZERO
    } else {
        (contribution + income_tax) / gross * dec!(100)
    };

    let output = PayrollOutput {
        gross_salary: quantize(gross, Precision::Currency),
        contribution,
        taxable_base: quantize(taxable_base, Precision::Currency),
        income_tax,
        other_deductions: input.other_deductions,
        benefits: input.benefits,
        severance_fund: quantize(severance_fund, Precision::Currency),
        net_pay: quantize(net_pay, Precision::Currency),
        effective_deduction_rate_pct: quantize(effective_deduction_rate_pct, Precision::Rate),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Gross-to-net payroll: progressive contribution, effective-rate income tax \
         with dependent allowance, employer severance-fund deposit",
        &serde_json::json!({
            "regulatory_year": config.year,
            "gross_salary": input.gross_salary.to_string(),
            "dependents": input.dependents,
            "dependent_deduction": config.dependent_deduction.to_string(),
            "contribution_ceiling": config.contribution.ceiling.to_string(),
            "severance_fund_rate": config.severance_fund_rate.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn validate_payroll_input(input: &PayrollInput) -> FinanceResult<()> {
    validate_positive(input.gross_salary, "gross_salary")?;
    validate_positive(input.other_deductions, "other_deductions")?;
    validate_positive(input.benefits, "benefits")?;
    Ok(())
}

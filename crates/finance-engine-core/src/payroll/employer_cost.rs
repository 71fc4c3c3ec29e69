use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::RegulatoryConfig;
use crate::decimal::{checked, quantize, sum_money, validate_not_zero, validate_positive, Precision};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::FinanceResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployerCostInput {
    pub gross_salary: Money,
    /// Overrides the configured accident-insurance rate (e.g. 0.02).
    #[serde(default)]
    pub accident_insurance_rate: Option<Rate>,
    /// Overrides the configured sector-levy rate (e.g. 0.058).
    #[serde(default)]
    pub sector_levy_rate: Option<Rate>,
}

impl EmployerCostInput {
    pub fn new(gross_salary: Money) -> Self {
        EmployerCostInput {
            gross_salary,
            accident_insurance_rate: None,
            sector_levy_rate: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployerCostOutput {
    pub gross_salary: Money,
    pub severance_fund: Money,
    pub vacation_provision: Money,
    pub payroll_levy: Money,
    pub accident_insurance: Money,
    pub sector_levy: Money,
    /// Payroll levy, accident insurance and sector levy combined.
    pub social_charges: Money,
    pub total_monthly_cost: Money,
    pub pct_over_gross: Percent,
}

/// Full monthly cost of an employee to the employer.
///
/// Adds the severance-fund deposit, the vacation/13th-salary provision and
/// the employer levies to gross salary, then expresses the loading as a
/// percentage over gross.
pub fn calculate_employer_cost(
    input: &EmployerCostInput,
    config: &RegulatoryConfig,
) -> FinanceResult<ComputationOutput<EmployerCostOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let gross = input.gross_salary;
    validate_positive(gross, "gross_salary")?;
    validate_not_zero(gross, "gross_salary")?;

    let rates = &config.employer;
    let accident_rate = input
        .accident_insurance_rate
        .unwrap_or(rates.accident_insurance_rate);
    let sector_rate = input.sector_levy_rate.unwrap_or(rates.sector_levy_rate);
    validate_positive(accident_rate, "accident_insurance_rate")?;
    validate_positive(sector_rate, "sector_levy_rate")?;

    for (field, configured, applied) in [
        ("accident_insurance_rate", rates.accident_insurance_rate, accident_rate),
        ("sector_levy_rate", rates.sector_levy_rate, sector_rate),
    ] {
        if applied != configured {
            warnings.push(format!(
                "{field} {applied} overrides the {} rate of {configured}",
                config.year
            ));
        }
    }

    let severance_fund = charge(gross, config.severance_fund_rate, "severance fund")?;
    let vacation_provision = charge(gross, rates.vacation_provision_rate, "vacation provision")?;
    let payroll_levy = charge(gross, rates.payroll_levy_rate, "payroll levy")?;
    let accident_insurance = charge(gross, accident_rate, "accident insurance")?;
    let sector_levy = charge(gross, sector_rate, "sector levy")?;

    let social_charges = sum_money(
        &[payroll_levy, accident_insurance, sector_levy],
        "social charges",
    )?;
    let total_monthly_cost = sum_money(
        &[gross, severance_fund, vacation_provision, social_charges],
        "total monthly cost",
    )?;
    let pct_over_gross = checked(
        total_monthly_cost
            .checked_div(gross)
            .and_then(|ratio| (ratio - Decimal::ONE).checked_mul(dec!(100))),
        "percentage over gross",
    )?;

    let output = EmployerCostOutput {
        gross_salary: gross,
        severance_fund: quantize(severance_fund, Precision::Currency),
        vacation_provision: quantize(vacation_provision, Precision::Currency),
        payroll_levy: quantize(payroll_levy, Precision::Currency),
        accident_insurance: quantize(accident_insurance, Precision::Currency),
        sector_levy: quantize(sector_levy, Precision::Currency),
        social_charges: quantize(social_charges, Precision::Currency),
        total_monthly_cost: quantize(total_monthly_cost, Precision::Currency),
        pct_over_gross: quantize(pct_over_gross, Precision::Currency),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Employer cost: gross plus severance fund, vacation/13th provision, \
         payroll levy, accident insurance and sector levy",
        &serde_json::json!({
            "regulatory_year": config.year,
            "gross_salary": gross.to_string(),
            "severance_fund_rate": config.severance_fund_rate.to_string(),
            "vacation_provision_rate": rates.vacation_provision_rate.to_string(),
            "payroll_levy_rate": rates.payroll_levy_rate.to_string(),
            "accident_insurance_rate": accident_rate.to_string(),
            "sector_levy_rate": sector_rate.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn charge(gross: Money, rate: Rate, what: &str) -> FinanceResult<Money> {
    checked(gross.checked_mul(rate), what)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FinanceError;
    use rust_decimal_macros::dec;

    #[test]
    fn test_employer_cost_default_rates() {
        let result = calculate_employer_cost(
            &EmployerCostInput::new(dec!(5000)),
            &RegulatoryConfig::reference_2026(),
        )
        .unwrap();
        let out = &result.result;

        // 8% = 400, 11.11% = 555.50, 20% = 1000, 2% = 100, 5.8% = 290
        assert_eq!(out.severance_fund, dec!(400.00));
        assert_eq!(out.vacation_provision, dec!(555.50));
        assert_eq!(out.social_charges, dec!(1390.00));
        assert_eq!(out.total_monthly_cost, dec!(7345.50));
        // (7345.50 / 5000 - 1) * 100 = 46.91
        assert_eq!(out.pct_over_gross, dec!(46.91));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_employer_cost_override_warns_only_when_different() {
        let config = RegulatoryConfig::reference_2026();
        let input = EmployerCostInput {
            gross_salary: dec!(5000),
            accident_insurance_rate: Some(config.employer.accident_insurance_rate),
            sector_levy_rate: Some(dec!(0.03)),
        };
        let result = calculate_employer_cost(&input, &config).unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].starts_with("sector_levy_rate 0.03 overrides"));
    }

    #[test]
    fn test_employer_cost_overflow_is_financial_impossibility() {
        let input = EmployerCostInput {
            gross_salary: dec!(1_000_000),
            accident_insurance_rate: Some(Decimal::MAX),
            sector_levy_rate: None,
        };
        assert!(matches!(
            calculate_employer_cost(&input, &RegulatoryConfig::reference_2026()),
            Err(FinanceError::FinancialImpossibility(_))
        ));
    }

    #[test]
    fn test_employer_cost_rate_overrides() {
        let input = EmployerCostInput {
            gross_salary: dec!(5000),
            accident_insurance_rate: Some(dec!(0.01)),
            sector_levy_rate: Some(Decimal::ZERO),
        };
        let out = calculate_employer_cost(&input, &RegulatoryConfig::reference_2026())
            .unwrap()
            .result;
        assert_eq!(out.accident_insurance, dec!(50.00));
        assert_eq!(out.sector_levy, dec!(0.00));
        // 5000 + 400 + 555.5 + 1000 + 50 = 7005.50
        assert_eq!(out.total_monthly_cost, dec!(7005.50));
    }

    #[test]
    fn test_employer_cost_zero_gross_is_division_by_zero() {
        let result = calculate_employer_cost(
            &EmployerCostInput::new(Decimal::ZERO),
            &RegulatoryConfig::reference_2026(),
        );
        match result.unwrap_err() {
            FinanceError::DivisionByZero { context } => assert_eq!(context, "gross_salary"),
            other => panic!("Expected DivisionByZero, got {:?}", other),
        }
    }

    #[test]
    fn test_employer_cost_negative_rate_rejected() {
        let input = EmployerCostInput {
            gross_salary: dec!(5000),
            accident_insurance_rate: Some(dec!(-0.02)),
            sector_levy_rate: None,
        };
        assert!(matches!(
            calculate_employer_cost(&input, &RegulatoryConfig::reference_2026()),
            Err(FinanceError::NegativeValue { .. })
        ));
    }
}

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::decimal::{checked, percent_to_rate, quantize, validate_positive, Precision};
use crate::error::FinanceError;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::FinanceResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsPlanInput {
    pub monthly_contribution: Money,
    pub monthly_rate_pct: Percent,
    pub years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsYear {
    pub year: u32,
    pub total_balance: Money,
    pub total_contributed: Money,
    pub interest_earned: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsPlanOutput {
    pub yearly: Vec<SavingsYear>,
    pub final_balance: Money,
    pub total_contributed: Money,
    pub total_interest: Money,
}

/// Year-by-year growth of a fixed monthly deposit made at the start of each
/// month: `balance = (balance + contribution) * (1 + i)`.
pub fn project_savings_plan(
    input: &SavingsPlanInput,
) -> FinanceResult<ComputationOutput<SavingsPlanOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_positive(input.monthly_contribution, "monthly_contribution")?;
    validate_positive(input.monthly_rate_pct, "monthly_rate")?;
    if input.years == 0 {
        return Err(FinanceError::InvalidPeriod { periods: 0 });
    }
    if input.monthly_rate_pct.is_zero() {
        warnings.push("Zero monthly rate: the balance equals the deposits".into());
    }

    let growth = Decimal::ONE + percent_to_rate(input.monthly_rate_pct);
    let mut balance = Decimal::ZERO;
    let mut contributed = Decimal::ZERO;
    let mut yearly = Vec::with_capacity(input.years as usize);

    for year in 1..=input.years {
        for _ in 0..12 {
            contributed = checked(
                contributed.checked_add(input.monthly_contribution),
                "total contributed",
            )?;
            balance = balance
                .checked_add(input.monthly_contribution)
                .and_then(|deposited| deposited.checked_mul(growth))
                .ok_or_else(|| {
                    FinanceError::FinancialImpossibility(format!(
                        "savings balance overflows in year {year}"
                    ))
                })?;
        }
        yearly.push(SavingsYear {
            year,
            total_balance: quantize(balance, Precision::Currency),
            total_contributed: quantize(contributed, Precision::Currency),
            interest_earned: quantize(balance - contributed, Precision::Currency),
        });
    }

    let output = SavingsPlanOutput {
        yearly,
        final_balance: quantize(balance, Precision::Currency),
        total_contributed: quantize(contributed, Precision::Currency),
        total_interest: quantize(balance - contributed, Precision::Currency),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Savings plan: monthly deposits at the start of each month, compounded monthly",
        &serde_json::json!({
            "monthly_contribution": input.monthly_contribution.to_string(),
            "monthly_rate_pct": input.monthly_rate_pct.to_string(),
            "years": input.years,
        }),
        warnings,
        elapsed,
        output,
    ))
}

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::decimal::{
    checked, checked_growth_factor, percent_to_rate, quantize, validate_positive, Precision,
};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::FinanceResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompoundInput {
    pub principal: Money,
    /// Monthly rate as a percentage (1.5 = 1.5% a month).
    pub monthly_rate_pct: Percent,
    pub periods: u32,
    #[serde(default)]
    pub monthly_contribution: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundOutput {
    pub total_amount: Money,
    pub total_contributed: Money,
    pub interest_earned: Money,
}

/// Future value of a principal plus end-of-month contributions:
/// `P(1+i)^n + A((1+i)^n − 1)/i`, or `P + A·n` when `i == 0`.
pub fn compound_with_contributions(
    principal: Money,
    monthly_rate_pct: Percent,
    periods: u32,
    monthly_contribution: Money,
) -> FinanceResult<CompoundOutput> {
    validate_positive(principal, "principal")?;
    validate_positive(monthly_rate_pct, "monthly_rate")?;
    validate_positive(monthly_contribution, "monthly_contribution")?;

    let rate = percent_to_rate(monthly_rate_pct);
    let n = Decimal::from(periods);
    let factor = checked_growth_factor(rate, periods)?;

    let principal_value = checked(principal.checked_mul(factor), "principal future value")?;
    let contributions_value = if rate > Decimal::ZERO {
        checked(
            (factor - Decimal::ONE)
                .checked_div(rate)
                .and_then(|annuity| monthly_contribution.checked_mul(annuity)),
            "contributions future value",
        )?
    } else {
        checked(monthly_contribution.checked_mul(n), "contributions future value")?
    };

    let total = checked(principal_value.checked_add(contributions_value), "total amount")?;
    let contributed = checked(
        monthly_contribution
            .checked_mul(n)
            .and_then(|deposits| deposits.checked_add(principal)),
        "total contributed",
    )?;
    let interest = checked(total.checked_sub(contributed), "interest earned")?;

    Ok(CompoundOutput {
        total_amount: quantize(total, Precision::Currency),
        total_contributed: quantize(contributed, Precision::Currency),
        interest_earned: quantize(interest, Precision::Currency),
    })
}

/// [`compound_with_contributions`] wrapped in the standard output envelope.
pub fn project_compound(input: &CompoundInput) -> FinanceResult<ComputationOutput<CompoundOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let output = compound_with_contributions(
        input.principal,
        input.monthly_rate_pct,
        input.periods,
        input.monthly_contribution,
    )?;

    if input.periods == 0 {
        warnings.push("No compounding periods: the total equals the principal".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Compound interest with monthly contributions: P(1+i)^n + A((1+i)^n - 1)/i",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "monthly_rate_pct": input.monthly_rate_pct.to_string(),
            "periods": input.periods,
            "monthly_contribution": input.monthly_contribution.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FinanceError;
    use rust_decimal_macros::dec;

    #[test]
    fn test_compound_two_periods_exact() {
        // 1000 * 1.1 * 1.1 = 1210
        let out = compound_with_contributions(dec!(1000), dec!(10), 2, Decimal::ZERO).unwrap();
        assert_eq!(out.total_amount, dec!(1210.00));
        assert_eq!(out.total_contributed, dec!(1000.00));
        assert_eq!(out.interest_earned, dec!(210.00));
    }

    #[test]
    fn test_compound_with_contributions() {
        // 1000 * 1.01^12 = 1126.8250; 100 * (1.01^12 - 1) / 0.01 = 1268.2503
        let out = compound_with_contributions(dec!(1000), dec!(1), 12, dec!(100)).unwrap();
        assert_eq!(out.total_amount, dec!(2395.08));
        assert_eq!(out.total_contributed, dec!(2200.00));
        assert_eq!(out.interest_earned, dec!(195.08));
    }

    #[test]
    fn test_compound_zero_rate_uses_simple_sum() {
        let out = compound_with_contributions(dec!(1000), Decimal::ZERO, 12, dec!(100)).unwrap();
        assert_eq!(out.total_amount, dec!(2200.00));
        assert_eq!(out.interest_earned, dec!(0.00));
    }

    #[test]
    fn test_compound_zero_periods() {
        let result = project_compound(&CompoundInput {
            principal: dec!(500),
            monthly_rate_pct: dec!(2),
            periods: 0,
            monthly_contribution: dec!(50),
        })
        .unwrap();
        assert_eq!(result.result.total_amount, dec!(500.00));
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_compound_overflow_is_financial_impossibility() {
        // 1.1^400 fits, but the principal times it does not
        assert!(matches!(
            compound_with_contributions(dec!(10_000_000_000_000), dec!(10), 400, Decimal::ZERO),
            Err(FinanceError::FinancialImpossibility(_))
        ));
        assert!(matches!(
            compound_with_contributions(Decimal::ZERO, Decimal::ZERO, 12, Decimal::MAX),
            Err(FinanceError::FinancialImpossibility(_))
        ));
    }

    #[test]
    fn test_compound_rejects_negative_inputs() {
        for (principal, rate, contribution, expected) in [
            (dec!(-1), dec!(1), dec!(0), "principal"),
            (dec!(1), dec!(-1), dec!(0), "monthly_rate"),
            (dec!(1), dec!(1), dec!(-1), "monthly_contribution"),
        ] {
            match compound_with_contributions(principal, rate, 12, contribution).unwrap_err() {
                FinanceError::NegativeValue { field, .. } => assert_eq!(field, expected),
                other => panic!("Expected NegativeValue, got {:?}", other),
            }
        }
    }
}

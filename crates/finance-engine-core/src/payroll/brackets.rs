use rust_decimal::Decimal;

use crate::config::{BracketTable, ContributionSchedule};
use crate::decimal::{quantize, validate_positive, Precision};
use crate::types::Money;
use crate::FinanceResult;

/// Progressive (marginal) contribution on salary capped at the table ceiling.
///
/// Each bracket the capped salary passes through is charged its own rate on
/// the slice `[lower, min(salary, upper)]` only, so crossing a bracket
/// boundary never re-prices the income below it.
pub fn compute_contribution(
    gross_salary: Money,
    schedule: &ContributionSchedule,
) -> FinanceResult<Money> {
    validate_positive(gross_salary, "gross_salary")?;

    let capped = gross_salary.min(schedule.ceiling);
    let mut contribution = Decimal::ZERO;

    for bracket in &schedule.brackets.brackets {
        if capped <= bracket.lower {
            break;
        }
        let top = bracket.upper.map_or(capped, |upper| capped.min(upper));
        contribution += (top - bracket.lower) * bracket.rate;
    }

    Ok(quantize(contribution, Precision::Currency))
}

/// Income tax by single-bracket lookup: `base * rate - deduction` for the
/// first bracket whose upper bound covers the base, floored at zero.
pub fn compute_income_tax(taxable_base: Money, table: &BracketTable) -> FinanceResult<Money> {
    validate_positive(taxable_base, "taxable_base")?;

    let tax = table
        .brackets
        .iter()
        .find(|bracket| bracket.covers(taxable_base))
        .map(|bracket| taxable_base * bracket.rate - bracket.deduction)
        .unwrap_or(Decimal::ZERO);

    Ok(quantize(tax.max(Decimal::ZERO), Precision::Currency))
}

use rust_decimal::Decimal;

use crate::decimal::{checked, percent_to_rate, quantize, validate_not_zero, validate_positive, Precision};
use crate::types::{Money, Percent};
use crate::FinanceResult;

/// Revenue needed to cover fixed costs at a given contribution margin:
/// `fixed_costs / (margin / 100)`, rounded to cents.
pub fn break_even_revenue(
    fixed_costs: Money,
    contribution_margin_pct: Percent,
) -> FinanceResult<Money> {
    validate_positive(fixed_costs, "fixed_costs")?;
    validate_positive(contribution_margin_pct, "contribution_margin")?;

    let margin = percent_to_rate(contribution_margin_pct);
    validate_not_zero(margin, "contribution_margin")?;

    let revenue = checked(fixed_costs.checked_div(margin), "break-even revenue")?;
    Ok(quantize(revenue, Precision::Currency))
}

/// Simplified EBITDA: net revenue less variable costs and fixed expenses.
/// Negative results are returned as-is; a result outside the decimal range
/// is a `FinancialImpossibility`.
pub fn ebitda(
    net_revenue: Money,
    variable_costs: Money,
    fixed_expenses: Money,
) -> FinanceResult<Money> {
    let value = checked(
        net_revenue
            .checked_sub(variable_costs)
            .and_then(|margin| margin.checked_sub(fixed_expenses)),
        "EBITDA",
    )?;
    Ok(quantize(value, Precision::Currency))
}

/// EBITDA as a share of net revenue, in percent (4dp). `None` when revenue is zero.
pub fn ebitda_margin_pct(net_revenue: Money, ebitda: Money) -> FinanceResult<Option<Percent>> {
    if net_revenue.is_zero() {
        return Ok(None);
    }
    let share = checked(
        ebitda
            .checked_div(net_revenue)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED)),
        "EBITDA margin",
    )?;
    Ok(Some(quantize(share, Precision::Rate)))
}

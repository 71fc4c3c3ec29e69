use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::decimal::{checked, percent_to_rate, quantize, validate_positive, Precision};
use crate::error::FinanceError;
use crate::pricing::break_even::{break_even_revenue, ebitda, ebitda_margin_pct};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::FinanceResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkupOutput {
    pub selling_price: Money,
    pub markup_factor: Decimal,
    pub nominal_profit: Money,
}

/// Selling price by the markup divisor method:
/// `price = cost / (1 - (tax + expense + margin) / 100)`.
pub fn markup_pricing(
    unit_cost: Money,
    tax_pct: Percent,
    expense_pct: Percent,
    margin_pct: Percent,
) -> FinanceResult<MarkupOutput> {
    validate_positive(unit_cost, "unit_cost")?;
    validate_positive(tax_pct, "tax_rate")?;
    validate_positive(expense_pct, "expense_rate")?;
    validate_positive(margin_pct, "margin")?;

    let total_pct = checked(
        tax_pct
            .checked_add(expense_pct)
            .and_then(|pct| pct.checked_add(margin_pct)),
        "total percentage",
    )?;
    let divisor = Decimal::ONE - percent_to_rate(total_pct);
    if divisor <= Decimal::ZERO {
        return Err(FinanceError::MarginExceedsRevenue { total_pct });
    }

    let price = checked(unit_cost.checked_div(divisor), "selling price")?;
    let factor = checked(Decimal::ONE.checked_div(divisor), "markup factor")?;
    let profit = checked(price.checked_mul(percent_to_rate(margin_pct)), "nominal profit")?;

    Ok(MarkupOutput {
        selling_price: quantize(price, Precision::Currency),
        markup_factor: quantize(factor, Precision::Rate),
        nominal_profit: quantize(profit, Precision::Currency),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingInput {
    pub unit_cost: Money,
    pub tax_pct: Percent,
    pub expense_pct: Percent,
    pub margin_pct: Percent,
    /// Monthly fixed costs; with `contribution_margin_pct` enables break-even.
    pub fixed_costs: Option<Money>,
    pub contribution_margin_pct: Option<Percent>,
    /// Expected monthly net revenue; with `variable_costs` enables EBITDA.
    pub net_revenue: Option<Money>,
    pub variable_costs: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingAnalysis {
    pub markup: MarkupOutput,
    pub break_even_revenue: Option<Money>,
    /// Units to sell at `selling_price` to reach break-even, rounded up.
    pub break_even_units: Option<Decimal>,
    pub ebitda: Option<Money>,
    pub ebitda_margin_pct: Option<Percent>,
}

/// Markup price plus, when the inputs are present, break-even and EBITDA.
pub fn analyze_pricing(input: &PricingInput) -> FinanceResult<ComputationOutput<PricingAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let markup = markup_pricing(
        input.unit_cost,
        input.tax_pct,
        input.expense_pct,
        input.margin_pct,
    )?;

    if markup.markup_factor > Decimal::from(3) {
        warnings.push(format!(
            "Markup factor {} is above 3x; check the tax, expense and margin rates",
            markup.markup_factor
        ));
    }

    let break_even = match (input.fixed_costs, input.contribution_margin_pct) {
        (Some(fixed), Some(margin)) => Some(break_even_revenue(fixed, margin)?),
        (None, None) => None,
        _ => {
            warnings.push(
                "Break-even needs both fixed_costs and contribution_margin_pct; skipped".into(),
            );
            None
        }
    };

    let break_even_units = match break_even {
        Some(revenue) if !markup.selling_price.is_zero() => Some(
            checked(revenue.checked_div(markup.selling_price), "break-even units")?.ceil(),
        ),
        _ => None,
    };

    let (ebitda_value, ebitda_margin) = match input.net_revenue {
        Some(revenue) => {
            let value = ebitda(
                revenue,
                input.variable_costs.unwrap_or_default(),
                input.fixed_costs.unwrap_or_default(),
            )?;
            if value < Decimal::ZERO {
                warnings.push(format!("EBITDA is negative: {value}"));
            }
            (Some(value), ebitda_margin_pct(revenue, value)?)
        }
        None => (None, None),
    };

    let output = PricingAnalysis {
        markup,
        break_even_revenue: break_even,
        break_even_units,
        ebitda: ebitda_value,
        ebitda_margin_pct: ebitda_margin,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Markup divisor pricing with break-even revenue and simplified EBITDA",
        &serde_json::json!({
            "unit_cost": input.unit_cost.to_string(),
            "tax_pct": input.tax_pct.to_string(),
            "expense_pct": input.expense_pct.to_string(),
            "margin_pct": input.margin_pct.to_string(),
            "fixed_costs": input.fixed_costs.map(|v| v.to_string()),
            "contribution_margin_pct": input.contribution_margin_pct.map(|v| v.to_string()),
        }),
        warnings,
        elapsed,
        output,
    ))
}

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::schedule::{
    constant_installment_schedule, constant_principal_schedule, summarize, AmortizationInput,
    AmortizationMethod, AmortizationSchedule,
};
use crate::decimal::{effective_monthly_rate, percent_to_rate};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::FinanceResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleComparison {
    pub constant_principal: AmortizationSchedule,
    pub constant_installment: AmortizationSchedule,
    pub first_installment_constant_principal: Money,
    pub first_installment_constant_installment: Money,
    /// Positive when SAC pays less interest than PRICE over the loan.
    pub interest_saved_by_constant_principal: Money,
}

/// Both amortization conventions for the same loan, side by side.
/// `input.method` is ignored.
pub fn compare_schedules(
    input: &AmortizationInput,
) -> FinanceResult<ComputationOutput<ScheduleComparison>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let sac_rows =
        constant_principal_schedule(input.principal, input.annual_rate_pct, input.periods)?;
    let price_rows =
        constant_installment_schedule(input.principal, input.annual_rate_pct, input.periods)?;
    let monthly_rate = effective_monthly_rate(percent_to_rate(input.annual_rate_pct))?;

    let constant_principal =
        summarize(AmortizationMethod::ConstantPrincipal, monthly_rate, sac_rows)?;
    let constant_installment =
        summarize(AmortizationMethod::ConstantInstallment, monthly_rate, price_rows)?;

    let first_installment = |schedule: &AmortizationSchedule| {
        schedule
            .rows
            .first()
            .map(|r| r.installment)
            .unwrap_or_default()
    };
    let first_installment_constant_principal = first_installment(&constant_principal);
    let first_installment_constant_installment = first_installment(&constant_installment);

    let interest_saved_by_constant_principal =
        constant_installment.total_interest - constant_principal.total_interest;

    if first_installment_constant_principal > first_installment_constant_installment {
        warnings.push(format!(
            "SAC starts {} higher per month than PRICE",
            first_installment_constant_principal - first_installment_constant_installment
        ));
    }

    let output = ScheduleComparison {
        constant_principal,
        constant_installment,
        first_installment_constant_principal,
        first_installment_constant_installment,
        interest_saved_by_constant_principal,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "SAC vs PRICE amortization comparison at the same effective monthly rate",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "annual_rate_pct": input.annual_rate_pct.to_string(),
            "periods": input.periods,
        }),
        warnings,
        elapsed,
        output,
    ))
}

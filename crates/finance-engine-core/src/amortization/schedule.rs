use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::decimal::{
    checked, discount_factor, effective_monthly_rate, percent_to_rate, quantize, sum_money,
    validate_positive, Precision,
};
use crate::error::FinanceError;
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::FinanceResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmortizationMethod {
    /// SAC: fixed principal each period, declining installments.
    #[serde(alias = "sac")]
    ConstantPrincipal,
    /// PRICE: fixed installment each period (annuity).
    #[default]
    #[serde(alias = "price")]
    ConstantInstallment,
}

impl AmortizationMethod {
    pub fn label(&self) -> &'static str {
        match self {
            AmortizationMethod::ConstantPrincipal => "constant principal (SAC)",
            AmortizationMethod::ConstantInstallment => "constant installment (PRICE)",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    pub principal: Money,
    /// Annual rate as a percentage (12 = 12% a year).
    pub annual_rate_pct: Percent,
    pub periods: u32,
    #[serde(default)]
    pub method: AmortizationMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub period: u32,
    pub installment: Money,
    pub amortization: Money,
    pub interest: Money,
    pub balance: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub method: AmortizationMethod,
    /// Effective monthly rate as a percentage.
    pub monthly_rate_pct: Percent,
    pub rows: Vec<AmortizationRow>,
    pub total_paid: Money,
    pub total_interest: Money,
    pub total_amortization: Money,
}

// ---------------------------------------------------------------------------
// Schedules
// ---------------------------------------------------------------------------

/// Constant-principal (SAC) schedule: `principal / periods` repaid each
/// month, interest on the outstanding balance on top.
pub fn constant_principal_schedule(
    principal: Money,
    annual_rate_pct: Percent,
    periods: u32,
) -> FinanceResult<Vec<AmortizationRow>> {
    let monthly_rate = loan_monthly_rate(principal, annual_rate_pct, periods)?;

    let amortization = principal / Decimal::from(periods);
    let mut balance = principal;
    let mut rows = Vec::with_capacity(periods as usize);

    for period in 1..=periods {
        let interest = checked(balance.checked_mul(monthly_rate), "interest")?;
        let installment = checked(amortization.checked_add(interest), "installment")?;
        balance = checked(balance.checked_sub(amortization), "balance")?;

        rows.push(make_row(
            period,
            installment,
            amortization,
            interest,
            closing_balance(balance, period == periods),
        ));
    }

    Ok(rows)
}

/// Constant-installment (PRICE) schedule: a single annuity payment
/// `P·i / (1 − (1+i)^−n)`, split each month into interest on the balance
/// and principal repaid.
pub fn constant_installment_schedule(
    principal: Money,
    annual_rate_pct: Percent,
    periods: u32,
) -> FinanceResult<Vec<AmortizationRow>> {
    let monthly_rate = loan_monthly_rate(principal, annual_rate_pct, periods)?;
    let installment = annuity_installment(principal, monthly_rate, periods)?;

    let mut balance = principal;
    let mut rows = Vec::with_capacity(periods as usize);

    for period in 1..=periods {
        let interest = checked(balance.checked_mul(monthly_rate), "interest")?;
        let amortization = checked(installment.checked_sub(interest), "amortization")?;
        balance = checked(balance.checked_sub(amortization), "balance")?;

        rows.push(make_row(
            period,
            installment,
            amortization,
            interest,
            closing_balance(balance, period == periods),
        ));
    }

    Ok(rows)
}

/// Schedule for the requested method, with totals over the rounded rows.
pub fn build_schedule(
    input: &AmortizationInput,
) -> FinanceResult<ComputationOutput<AmortizationSchedule>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let rows = match input.method {
        AmortizationMethod::ConstantPrincipal => {
            constant_principal_schedule(input.principal, input.annual_rate_pct, input.periods)?
        }
        AmortizationMethod::ConstantInstallment => {
            constant_installment_schedule(input.principal, input.annual_rate_pct, input.periods)?
        }
    };
    let monthly_rate = effective_monthly_rate(percent_to_rate(input.annual_rate_pct))?;
    let schedule = summarize(input.method, monthly_rate, rows)?;

    let rounding_gap = schedule.total_amortization - quantize(input.principal, Precision::Currency);
    if !rounding_gap.is_zero() {
        warnings.push(format!(
            "Rounded principal portions differ from the financed amount by {rounding_gap}"
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        &format!(
            "Loan amortization, {} method, effective monthly rate (1 + annual)^(1/12) - 1",
            input.method.label()
        ),
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "annual_rate_pct": input.annual_rate_pct.to_string(),
            "periods": input.periods,
        }),
        warnings,
        elapsed,
        schedule,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) fn summarize(
    method: AmortizationMethod,
    monthly_rate: Rate,
    rows: Vec<AmortizationRow>,
) -> FinanceResult<AmortizationSchedule> {
    let total_paid = sum_money(rows.iter().map(|r| &r.installment), "total paid")?;
    let total_interest = sum_money(rows.iter().map(|r| &r.interest), "total interest")?;
    let total_amortization = sum_money(rows.iter().map(|r| &r.amortization), "total amortization")?;

    Ok(AmortizationSchedule {
        method,
        monthly_rate_pct: quantize(monthly_rate * dec!(100), Precision::Rate),
        rows,
        total_paid,
        total_interest,
        total_amortization,
    })
}

fn loan_monthly_rate(principal: Money, annual_rate_pct: Percent, periods: u32) -> FinanceResult<Rate> {
    if periods == 0 {
        return Err(FinanceError::InvalidPeriod {
            periods: i64::from(periods),
        });
    }
    validate_positive(principal, "principal")?;
    validate_positive(annual_rate_pct, "annual_rate")?;
    effective_monthly_rate(percent_to_rate(annual_rate_pct))
}

/// `(1+i)^−n` underflows to zero on long horizons, where the installment
/// tends to the interest-only payment `P·i`.
fn annuity_installment(principal: Money, monthly_rate: Rate, periods: u32) -> FinanceResult<Money> {
    let n = Decimal::from(periods);
    if monthly_rate.is_zero() {
        return Ok(principal / n);
    }
    let denominator = Decimal::ONE - discount_factor(monthly_rate, periods)?;
    if denominator.is_zero() {
        return Ok(principal / n);
    }
    checked(
        principal
            .checked_mul(monthly_rate)
            .and_then(|interest| interest.checked_div(denominator)),
        "installment",
    )
}

/// Balances never go negative; the final balance closes to exactly zero,
/// absorbing the sub-cent residue of iterative subtraction.
fn closing_balance(balance: Money, is_final: bool) -> Money {
    if is_final {
        if !balance.is_zero() {
            tracing::debug!(%balance, "closing amortization residue");
        }
        return Decimal::ZERO;
    }
    balance.max(Decimal::ZERO)
}

fn make_row(
    period: u32,
    installment: Money,
    amortization: Money,
    interest: Money,
    balance: Money,
) -> AmortizationRow {
    AmortizationRow {
        period,
        installment: quantize(installment, Precision::Currency),
        amortization: quantize(amortization, Precision::Currency),
        interest: quantize(interest, Precision::Currency),
        balance: quantize(balance, Precision::Currency),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sac_first_row() {
        let rows = constant_principal_schedule(dec!(100_000), dec!(12), 12).unwrap();
        assert_eq!(rows.len(), 12);
        // amortization 8333.33, interest 100000 * 0.0094887929 = 948.88
        assert_eq!(rows[0].period, 1);
        assert_eq!(rows[0].amortization, dec!(8333.33));
        assert_eq!(rows[0].interest, dec!(948.88));
        assert_eq!(rows[0].installment, dec!(9282.21));
        assert_eq!(rows[0].balance, dec!(91666.67));
    }

    #[test]
    fn test_sac_installments_strictly_decrease() {
        let rows = constant_principal_schedule(dec!(100_000), dec!(12), 24).unwrap();
        for pair in rows.windows(2) {
            assert!(pair[1].installment < pair[0].installment);
            assert!(pair[1].balance <= pair[0].balance);
        }
        assert_eq!(rows.last().unwrap().balance, Decimal::ZERO);
    }

    #[test]
    fn test_price_installment_constant() {
        let rows = constant_installment_schedule(dec!(100_000), dec!(12), 12).unwrap();
        // 100000 * 0.0094887929 * 1.12 / 0.12 = 8856.2067
        assert!(rows.iter().all(|r| r.installment == dec!(8856.21)));
        assert_eq!(rows.last().unwrap().balance, Decimal::ZERO);
    }

    #[test]
    fn test_price_interest_shrinks_principal_grows() {
        let rows = constant_installment_schedule(dec!(250_000), dec!(9.5), 36).unwrap();
        for pair in rows.windows(2) {
            assert!(pair[1].interest <= pair[0].interest);
            assert!(pair[1].amortization >= pair[0].amortization);
            assert!(pair[1].balance <= pair[0].balance);
        }
    }

    #[test]
    fn test_zero_rate_schedules() {
        let price = constant_installment_schedule(dec!(1200), Decimal::ZERO, 12).unwrap();
        assert!(price.iter().all(|r| r.installment == dec!(100.00)));
        assert!(price.iter().all(|r| r.interest.is_zero()));

        let sac = constant_principal_schedule(dec!(1200), Decimal::ZERO, 12).unwrap();
        assert_eq!(sac, price);
    }

    #[test]
    fn test_zero_periods_is_invalid_period() {
        for result in [
            constant_principal_schedule(dec!(1000), dec!(10), 0),
            constant_installment_schedule(dec!(1000), dec!(10), 0),
        ] {
            assert_eq!(result.unwrap_err(), FinanceError::InvalidPeriod { periods: 0 });
        }
    }

    #[test]
    fn test_negative_rate_and_principal_rejected() {
        assert!(matches!(
            constant_installment_schedule(dec!(1000), dec!(-1), 12),
            Err(FinanceError::NegativeValue { ref field, .. }) if field == "annual_rate"
        ));
        assert!(matches!(
            constant_principal_schedule(dec!(-1000), dec!(10), 12),
            Err(FinanceError::NegativeValue { ref field, .. }) if field == "principal"
        ));
    }

    #[test]
    fn test_single_period_repays_everything() {
        let rows = constant_installment_schedule(dec!(5000), dec!(12), 1).unwrap();
        assert_eq!(rows.len(), 1);
        // one month of interest at 0.94887929%: 47.44
        assert_eq!(rows[0].interest, dec!(47.44));
        assert_eq!(rows[0].amortization, dec!(5000.00));
        assert_eq!(rows[0].balance, Decimal::ZERO);
    }

    #[test]
    fn test_long_horizon_installment_tends_to_interest_only() {
        // (1 + i)^-1300 underflows; the payment is the interest on the balance
        let rows = constant_installment_schedule(dec!(100_000), dec!(100), 1300).unwrap();
        assert_eq!(rows.len(), 1300);
        assert_eq!(rows[0].installment, rows[0].interest);
        assert_eq!(rows[0].amortization, dec!(0.00));
        assert_eq!(rows.last().unwrap().balance, Decimal::ZERO);

        let rows = constant_installment_schedule(dec!(100_000_000), dec!(100), 1000).unwrap();
        assert_eq!(rows.len(), 1000);
        assert_eq!(rows[0].installment, rows[0].interest);
    }

    #[test]
    fn test_schedule_overflow_is_financial_impossibility() {
        // 1_000_000% a year is above 100% a month; interest on MAX overflows
        assert!(matches!(
            constant_installment_schedule(Decimal::MAX, dec!(1_000_000), 12),
            Err(FinanceError::FinancialImpossibility(_))
        ));
        assert!(matches!(
            constant_principal_schedule(Decimal::MAX, dec!(1_000_000), 12),
            Err(FinanceError::FinancialImpossibility(_))
        ));
    }

    #[test]
    fn test_summarize_overflow_is_financial_impossibility() {
        let row = make_row(1, Decimal::MAX, Decimal::MAX, Decimal::ZERO, Decimal::ZERO);
        let result = summarize(
            AmortizationMethod::ConstantInstallment,
            dec!(0.01),
            vec![row.clone(), row],
        );
        assert!(matches!(result, Err(FinanceError::FinancialImpossibility(_))));
    }

    #[test]
    fn test_build_schedule_totals() {
        let input = AmortizationInput {
            principal: dec!(100_000),
            annual_rate_pct: dec!(12),
            periods: 12,
            method: AmortizationMethod::ConstantInstallment,
        };
        let result = build_schedule(&input).unwrap();
        let schedule = &result.result;

        assert_eq!(schedule.monthly_rate_pct, dec!(0.9489));
        assert_eq!(schedule.total_paid, dec!(8856.21) * dec!(12));
        // total interest ≈ 12 * 8856.2067 - 100000 = 6274.48
        assert!((schedule.total_interest - dec!(6274.48)).abs() <= dec!(0.12));
        assert!((schedule.total_amortization - dec!(100_000)).abs() <= dec!(0.12));
    }

    #[test]
    fn test_method_accepts_short_names() {
        let input: AmortizationInput = serde_json::from_str(
            r#"{"principal": "1000", "annual_rate_pct": "10", "periods": 4, "method": "sac"}"#,
        )
        .unwrap();
        assert_eq!(input.method, AmortizationMethod::ConstantPrincipal);

        let input: AmortizationInput =
            serde_json::from_str(r#"{"principal": "1000", "annual_rate_pct": "10", "periods": 4}"#)
                .unwrap();
        assert_eq!(input.method, AmortizationMethod::ConstantInstallment);
    }
}

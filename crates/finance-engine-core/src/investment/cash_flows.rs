use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::decimal::{percent_to_rate, quantize, Precision};
use crate::error::FinanceError;
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::FinanceResult;

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0001);
const MAX_IRR_ITERATIONS: u32 = 100;

/// Starting point for the IRR search (10%).
pub const DEFAULT_IRR_GUESS: Rate = dec!(0.1);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowInput {
    pub discount_rate_pct: Percent,
    /// Period 0 first; outlays negative.
    pub cash_flows: Vec<Money>,
    #[serde(default)]
    pub irr_guess: Option<Rate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrEstimate {
    /// Rate as a percentage, four decimals.
    pub rate_pct: Percent,
    pub iterations: u32,
    pub converged: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowAnalysis {
    pub npv: Money,
    pub irr_pct: Percent,
    pub irr_converged: bool,
    pub irr_iterations: u32,
    pub sign_changes: u32,
}

/// Net Present Value: `Σ cf_t / (1 + i)^t`, with `i` given as a percentage.
pub fn net_present_value(discount_rate_pct: Percent, cash_flows: &[Money]) -> FinanceResult<Money> {
    let rate = percent_to_rate(discount_rate_pct);
    if rate <= dec!(-1) {
        return Err(FinanceError::InvalidInput {
            field: "discount_rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let one_plus_r = Decimal::ONE + rate;
    let mut result = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            match discount.checked_mul(one_plus_r) {
                Some(next) => discount = next,
                // Later terms are below Decimal resolution
                None => break,
            }
        }
        if discount.is_zero() {
            return Err(FinanceError::DivisionByZero {
                context: format!("NPV discount factor at period {t}"),
            });
        }
        result = cf
            .checked_div(discount)
            .and_then(|pv| result.checked_add(pv))
            .ok_or_else(|| {
                FinanceError::FinancialImpossibility(format!(
                    "present value at period {t} overflows at a {discount_rate_pct}% discount rate"
                ))
            })?;
    }

    Ok(quantize(result, Precision::Currency))
}

/// Internal Rate of Return as a percentage (4 decimals).
///
/// Best effort: see [`solve_irr`]. Never fails; an unconverged search
/// returns its last estimate.
pub fn internal_rate_of_return(cash_flows: &[Money], initial_guess: Rate) -> Percent {
    solve_irr(cash_flows, initial_guess).rate_pct
}

/// Newton-Raphson on the NPV function, at most 100 iterations.
///
/// Stops as soon as `|npv(rate)| < 0.0001`. If the derivative is exactly
/// zero, `1 + rate` reaches zero, or an intermediate value leaves the
/// Decimal range, the search stops with the current estimate and
/// `converged == false`. Series with several sign changes may have several
/// roots (the guess picks one) or none.
pub fn solve_irr(cash_flows: &[Money], initial_guess: Rate) -> IrrEstimate {
    let mut rate = initial_guess;

    for iteration in 0..MAX_IRR_ITERATIONS {
        let Some((npv_val, dnpv)) = npv_and_derivative(cash_flows, rate) else {
            tracing::warn!(%rate, iteration, "IRR search left the representable range");
            return estimate(rate, iteration, false);
        };

        if npv_val.abs() < CONVERGENCE_THRESHOLD {
            tracing::debug!(%rate, iteration, "IRR converged");
            return estimate(rate, iteration, true);
        }

        if dnpv.is_zero() {
            tracing::warn!(%rate, iteration, "IRR derivative is zero, stopping");
            return estimate(rate, iteration, false);
        }

        match npv_val.checked_div(dnpv).and_then(|step| rate.checked_sub(step)) {
            Some(next) => rate = next,
            None => {
                tracing::warn!(%rate, iteration, "IRR step overflowed, stopping");
                return estimate(rate, iteration, false);
            }
        }
    }

    tracing::warn!(%rate, iterations = MAX_IRR_ITERATIONS, "IRR did not converge");
    estimate(rate, MAX_IRR_ITERATIONS, false)
}

/// NPV and IRR for one cash-flow series.
pub fn analyze_cash_flows(
    input: &CashFlowInput,
) -> FinanceResult<ComputationOutput<CashFlowAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.cash_flows.is_empty() {
        return Err(FinanceError::InvalidInput {
            field: "cash_flows".into(),
            reason: "At least one cash flow is required".into(),
        });
    }

    let npv = net_present_value(input.discount_rate_pct, &input.cash_flows)?;
    let guess = input.irr_guess.unwrap_or(DEFAULT_IRR_GUESS);
    let irr = solve_irr(&input.cash_flows, guess);
    let sign_changes = count_sign_changes(&input.cash_flows);

    if sign_changes == 0 {
        warnings.push("Cash flows never change sign: no internal rate of return exists".into());
    } else if sign_changes > 1 {
        warnings.push(format!(
            "Cash flows change sign {sign_changes} times: several IRRs may exist, \
             the result depends on the initial guess"
        ));
    }
    if !irr.converged {
        warnings.push(format!(
            "IRR search stopped after {} iterations without converging; {}% is the last estimate",
            irr.iterations, irr.rate_pct
        ));
    }

    let output = CashFlowAnalysis {
        npv,
        irr_pct: irr.rate_pct,
        irr_converged: irr.converged,
        irr_iterations: irr.iterations,
        sign_changes,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Discounted cash flow: NPV at the given rate, IRR by Newton-Raphson",
        &serde_json::json!({
            "discount_rate_pct": input.discount_rate_pct.to_string(),
            "num_cash_flows": input.cash_flows.len(),
            "irr_guess": guess.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn npv_and_derivative(cash_flows: &[Money], rate: Rate) -> Option<(Decimal, Decimal)> {
    let one_plus_r = Decimal::ONE.checked_add(rate)?;
    if one_plus_r.is_zero() {
        return None;
    }

    let mut npv_val = Decimal::ZERO;
    let mut dnpv = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = discount.checked_mul(one_plus_r)?;
        }
        npv_val = npv_val.checked_add(cf.checked_div(discount)?)?;
        if t > 0 {
            let weighted = Decimal::from(t as u64).checked_mul(*cf)?;
            let term = weighted.checked_div(discount.checked_mul(one_plus_r)?)?;
            dnpv = dnpv.checked_sub(term)?;
        }
    }

    Some((npv_val, dnpv))
}

fn estimate(rate: Rate, iterations: u32, converged: bool) -> IrrEstimate {
    let pct = rate.checked_mul(dec!(100)).unwrap_or(if rate.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    });
    IrrEstimate {
        rate_pct: quantize(pct, Precision::Rate),
        iterations,
        converged,
    }
}

fn count_sign_changes(cash_flows: &[Money]) -> u32 {
    let mut changes = 0;
    let mut previous: Option<bool> = None;
    for cf in cash_flows.iter().filter(|cf| !cf.is_zero()) {
        let negative = cf.is_sign_negative();
        if previous.is_some_and(|p| p != negative) {
            changes += 1;
        }
        previous = Some(negative);
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_npv_basic() {
        let cfs = vec![dec!(-1000), dec!(300), dec!(400), dec!(500)];
        // -1000 + 300/1.1 + 400/1.21 + 500/1.331 = -21.0368 -> -21.04
        assert_eq!(net_present_value(dec!(10), &cfs).unwrap(), dec!(-21.04));
    }

    #[test]
    fn test_npv_zero_rate() {
        let cfs = vec![dec!(-100), dec!(50), dec!(50), dec!(50)];
        assert_eq!(net_present_value(Decimal::ZERO, &cfs).unwrap(), dec!(50.00));
    }

    #[test]
    fn test_npv_empty_series_is_zero() {
        assert_eq!(net_present_value(dec!(5), &[]).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_npv_rate_at_minus_100_rejected() {
        let cfs = vec![dec!(-100), dec!(50)];
        assert!(matches!(
            net_present_value(dec!(-100), &cfs),
            Err(FinanceError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_irr_annuity() {
        let cfs = vec![dec!(-1000), dec!(400), dec!(400), dec!(400)];
        let irr = solve_irr(&cfs, DEFAULT_IRR_GUESS);
        // IRR ≈ 9.7010%
        assert!(irr.converged);
        assert!((irr.rate_pct - dec!(9.701)).abs() < dec!(0.01));
    }

    #[test]
    fn test_irr_exact_at_guess() {
        // -100 + 110 / 1.1 = 0 at the starting guess
        let irr = solve_irr(&[dec!(-100), dec!(110)], DEFAULT_IRR_GUESS);
        assert_eq!(irr.rate_pct, dec!(10.0000));
        assert_eq!(irr.iterations, 0);
        assert!(irr.converged);
    }

    #[test]
    fn test_irr_single_period() {
        let pct = internal_rate_of_return(&[dec!(-100), dec!(121)], DEFAULT_IRR_GUESS);
        assert!((pct - dec!(21)).abs() < dec!(0.001));
    }

    #[test]
    fn test_irr_zero_derivative_returns_guess() {
        // A lone period-0 flow has no rate sensitivity
        let irr = solve_irr(&[dec!(100)], DEFAULT_IRR_GUESS);
        assert!(!irr.converged);
        assert_eq!(irr.rate_pct, dec!(10.0000));
    }

    #[test]
    fn test_irr_no_real_root_terminates() {
        // All inflows: NPV never reaches zero
        let irr = solve_irr(&[dec!(100), dec!(100), dec!(100)], DEFAULT_IRR_GUESS);
        assert!(!irr.converged);
        assert!(irr.iterations <= MAX_IRR_ITERATIONS);
    }

    #[test]
    fn test_irr_multiple_roots_follow_guess() {
        // -100 + 230/(1+r) - 132/(1+r)^2 has roots at 10% and 20%
        let cfs = vec![dec!(-100), dec!(230), dec!(-132)];
        let low = solve_irr(&cfs, dec!(0.1));
        assert_eq!(low.rate_pct, dec!(10.0000));
        let high = solve_irr(&cfs, dec!(0.25));
        assert!(high.converged);
        assert!((high.rate_pct - dec!(20)).abs() < dec!(0.01));
    }

    #[test]
    fn test_irr_idempotent() {
        let cfs = vec![dec!(-5000), dec!(1200), dec!(1800), dec!(2500), dec!(900)];
        assert_eq!(solve_irr(&cfs, dec!(0.1)), solve_irr(&cfs, dec!(0.1)));
    }

    #[test]
    fn test_analyze_cash_flows_warnings() {
        let input = CashFlowInput {
            discount_rate_pct: dec!(10),
            cash_flows: vec![dec!(-100), dec!(230), dec!(-132)],
            irr_guess: None,
        };
        let result = analyze_cash_flows(&input).unwrap();
        assert_eq!(result.result.sign_changes, 2);
        assert!(result.warnings.iter().any(|w| w.contains("several IRRs")));

        let empty = CashFlowInput {
            discount_rate_pct: dec!(10),
            cash_flows: vec![],
            irr_guess: None,
        };
        assert!(analyze_cash_flows(&empty).is_err());
    }

    #[test]
    fn test_sign_changes_skip_zero_flows() {
        assert_eq!(count_sign_changes(&[dec!(-1), dec!(0), dec!(2), dec!(3)]), 1);
        assert_eq!(count_sign_changes(&[dec!(1), dec!(2)]), 0);
    }
}

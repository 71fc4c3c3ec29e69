//! Exact decimal construction, validation and fixed-point rounding.
//!
//! Every engine rounds through [`quantize`] so that precision and rounding
//! mode are part of the call, not process-wide state. Intermediate values
//! keep the full 28 significant digits of `rust_decimal`; only final outputs
//! are quantized.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FinanceError;
use crate::types::{Money, Percent, Rate};
use crate::FinanceResult;

/// Output precision for a quantized figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Precision {
    /// Two fractional digits.
    Currency,
    /// Four fractional digits, for rates, percentages and factors.
    Rate,
}

impl Precision {
    pub const fn scale(self) -> u32 {
        match self {
            Precision::Currency => 2,
            Precision::Rate => 4,
        }
    }
}

/// Round half away from zero ("half-up" in accounting terms).
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Quantize to the given output precision, keeping trailing zeros
/// (`121.5` becomes `121.50`).
pub fn quantize(value: Decimal, precision: Precision) -> Decimal {
    let mut rounded = round_half_up(value, precision.scale());
    rounded.rescale(precision.scale());
    rounded
}

/// Convert a numeric or textual value into an exact decimal.
///
/// The value goes through its decimal text, so an `f64` such as `0.1`
/// becomes exactly `0.1` rather than its binary expansion. `None` yields
/// zero. When `scale` is given the result is rounded half-up to that many
/// fractional digits.
pub fn to_decimal<T: fmt::Display + ?Sized>(
    value: Option<&T>,
    scale: Option<u32>,
) -> FinanceResult<Decimal> {
    let Some(value) = value else {
        return Ok(Decimal::ZERO);
    };

    let text = value.to_string();
    let trimmed = text.trim();
    let parsed = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| FinanceError::InvalidNumber {
            value: trimmed.to_string(),
        })?;

    Ok(match scale {
        Some(dp) => {
            let mut rounded = round_half_up(parsed, dp);
            rounded.rescale(dp);
            rounded
        }
        None => parsed,
    })
}

/// Fails with `NegativeValue` when `value < 0`.
pub fn validate_positive(value: Decimal, label: &str) -> FinanceResult<()> {
    if value < Decimal::ZERO {
        return Err(FinanceError::NegativeValue {
            field: label.to_string(),
            value,
        });
    }
    Ok(())
}

/// Fails with `DivisionByZero` when `value == 0`.
pub fn validate_not_zero(value: Decimal, label: &str) -> FinanceResult<()> {
    if value.is_zero() {
        return Err(FinanceError::DivisionByZero {
            context: label.to_string(),
        });
    }
    Ok(())
}

/// `5` -> `0.05`
pub fn percent_to_rate(pct: Percent) -> Rate {
    pct / dec!(100)
}

/// Effective monthly rate equivalent to an annual rate:
/// `(1 + annual)^(1/12) - 1`.
pub fn effective_monthly_rate(annual_rate: Rate) -> FinanceResult<Rate> {
    if annual_rate.is_zero() {
        return Ok(Decimal::ZERO);
    }
    let base = checked(Decimal::ONE.checked_add(annual_rate), "annual rate")?;
    if base <= Decimal::ZERO {
        return Err(FinanceError::InvalidInput {
            field: "annual_rate".into(),
            reason: "Annual rate must be greater than -100%".into(),
        });
    }
    let monthly = base
        .checked_powd(Decimal::ONE / dec!(12))
        .ok_or_else(|| {
            FinanceError::FinancialImpossibility(format!(
                "monthly equivalent of annual rate {annual_rate} is not representable"
            ))
        })?;
    Ok(monthly - Decimal::ONE)
}

/// `(1 + rate)^periods` by repeated multiplication.
pub fn checked_growth_factor(rate: Rate, periods: u32) -> FinanceResult<Decimal> {
    Decimal::ONE
        .checked_add(rate)
        .and_then(|base| base.checked_powu(u64::from(periods)))
        .ok_or_else(|| {
            FinanceError::FinancialImpossibility(format!(
                "growth factor (1 + {rate})^{periods} overflows"
            ))
        })
}

/// `(1 + rate)^-periods` for `rate > -1`. Long horizons underflow towards
/// zero instead of overflowing.
pub fn discount_factor(rate: Rate, periods: u32) -> FinanceResult<Decimal> {
    let base = Decimal::ONE.checked_add(rate).filter(|b| *b > Decimal::ZERO);
    base.and_then(|b| Decimal::ONE.checked_div(b))
        .and_then(|v| v.checked_powu(u64::from(periods)))
        .ok_or_else(|| {
            FinanceError::FinancialImpossibility(format!(
                "discount factor (1 + {rate})^-{periods} is not representable"
            ))
        })
}

/// Unwraps the result of a `checked_*` operation, naming what overflowed.
pub fn checked(value: Option<Decimal>, what: &str) -> FinanceResult<Decimal> {
    value.ok_or_else(|| {
        FinanceError::FinancialImpossibility(format!("{what} overflows the decimal range"))
    })
}

/// Sum of amounts, for callers holding quantized rows.
pub fn sum_money<'a, I: IntoIterator<Item = &'a Money>>(values: I, what: &str) -> FinanceResult<Money> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
        .ok_or_else(|| {
            FinanceError::FinancialImpossibility(format!("{what} overflows the decimal range"))
        })
}

/// Parses user-supplied text (flags, form fields) into a decimal, failing
/// with `InvalidNumber`. Usable directly as a clap `value_parser`.
pub fn parse_decimal(text: &str) -> FinanceResult<Decimal> {
    to_decimal(Some(text), None)
}

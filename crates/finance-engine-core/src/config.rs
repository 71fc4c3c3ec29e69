//! Regulatory configuration: bracket tables and payroll rate constants.
//!
//! Tables are plain data handed to each payroll call, so several regulatory
//! periods can be held side by side and replaced without recompiling.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FinanceError;
use crate::types::{Money, Rate};
use crate::FinanceResult;

/// One band of a bracket table. `upper == None` means unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub lower: Money,
    pub upper: Option<Money>,
    pub rate: Rate,
    #[serde(default)]
    pub deduction: Money,
}

impl TaxBracket {
    /// True when `value` is at or below this bracket's upper bound.
    pub fn covers(&self, value: Money) -> bool {
        self.upper.map_or(true, |upper| value <= upper)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketTable {
    pub name: String,
    pub brackets: Vec<TaxBracket>,
}

impl BracketTable {
    /// Brackets must start at zero, be contiguous and ascending, and end
    /// with an unbounded bracket.
    pub fn validate(&self) -> FinanceResult<()> {
        let field = format!("{}.brackets", self.name);
        let Some(first) = self.brackets.first() else {
            return Err(FinanceError::InvalidInput {
                field,
                reason: "Bracket table must contain at least one bracket".into(),
            });
        };
        if !first.lower.is_zero() {
            return Err(FinanceError::InvalidInput {
                field,
                reason: format!("First bracket must start at 0, starts at {}", first.lower),
            });
        }

        let mut expected_lower = Decimal::ZERO;
        for (idx, bracket) in self.brackets.iter().enumerate() {
            let is_last = idx + 1 == self.brackets.len();
            if bracket.lower != expected_lower {
                return Err(FinanceError::InvalidInput {
                    field,
                    reason: format!(
                        "Bracket {idx} starts at {} but previous bracket ends at {expected_lower}",
                        bracket.lower
                    ),
                });
            }
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(FinanceError::InvalidInput {
                    field,
                    reason: format!("Bracket {idx} rate {} must be between 0 and 1", bracket.rate),
                });
            }
            if bracket.deduction < Decimal::ZERO {
                return Err(FinanceError::InvalidInput {
                    field,
                    reason: format!("Bracket {idx} deduction cannot be negative"),
                });
            }
            match (bracket.upper, is_last) {
                (None, true) => {}
                (None, false) => {
                    return Err(FinanceError::InvalidInput {
                        field,
                        reason: format!("Only the last bracket may be unbounded (bracket {idx})"),
                    });
                }
                (Some(_), true) => {
                    return Err(FinanceError::InvalidInput {
                        field,
                        reason: "Last bracket must be unbounded".into(),
                    });
                }
                (Some(upper), false) => {
                    if upper <= bracket.lower {
                        return Err(FinanceError::InvalidInput {
                            field,
                            reason: format!("Bracket {idx} upper bound must exceed its lower bound"),
                        });
                    }
                    expected_lower = upper;
                }
            }
        }
        Ok(())
    }

    pub fn max_rate(&self) -> Rate {
        self.brackets
            .iter()
            .map(|b| b.rate)
            .max()
            .unwrap_or(Decimal::ZERO)
    }
}

/// Progressive contribution table applied to salary capped at `ceiling`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionSchedule {
    pub brackets: BracketTable,
    pub ceiling: Money,
}

/// Employer-side charges expressed as fractions of gross salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerCostRates {
    /// Vacation bonus and 13th-salary provision.
    pub vacation_provision_rate: Rate,
    /// Mandatory employer payroll levy.
    pub payroll_levy_rate: Rate,
    pub accident_insurance_rate: Rate,
    pub sector_levy_rate: Rate,
}

/// Everything the payroll engine needs for one regulatory period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegulatoryConfig {
    pub year: i32,
    pub effective_from: NaiveDate,
    pub contribution: ContributionSchedule,
    pub income_tax: BracketTable,
    pub dependent_deduction: Money,
    /// Employer severance-fund deposit over gross.
    pub severance_fund_rate: Rate,
    pub employer: EmployerCostRates,
}

impl RegulatoryConfig {
    /// Provisional 2026 figures (contribution table, income-tax exemption up
    /// to 5,000.00 with estimated transition deductions). These are
    /// placeholders for demos and tests, not authoritative tax data.
    pub fn reference_2026() -> Self {
        RegulatoryConfig {
            year: 2026,
            effective_from: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default(),
            contribution: ContributionSchedule {
                brackets: BracketTable {
                    name: "contribution".into(),
                    brackets: vec![
                        bracket(dec!(0), Some(dec!(1621.00)), dec!(0.075), dec!(0)),
                        bracket(dec!(1621.00), Some(dec!(2902.84)), dec!(0.09), dec!(0)),
                        bracket(dec!(2902.84), Some(dec!(4354.27)), dec!(0.12), dec!(0)),
                        bracket(dec!(4354.27), None, dec!(0.14), dec!(0)),
                    ],
                },
                ceiling: dec!(8475.55),
            },
            income_tax: BracketTable {
                name: "income_tax".into(),
                brackets: vec![
                    bracket(dec!(0), Some(dec!(5000.00)), dec!(0), dec!(0)),
                    bracket(dec!(5000.00), Some(dec!(7350.00)), dec!(0.15), dec!(750.00)),
                    bracket(dec!(7350.00), None, dec!(0.275), dec!(896.00)),
                ],
            },
            dependent_deduction: dec!(189.59),
            severance_fund_rate: dec!(0.08),
            employer: EmployerCostRates {
                vacation_provision_rate: dec!(0.1111),
                payroll_levy_rate: dec!(0.20),
                accident_insurance_rate: dec!(0.02),
                sector_levy_rate: dec!(0.058),
            },
        }
    }

    pub fn validate(&self) -> FinanceResult<()> {
        self.contribution.brackets.validate()?;
        self.income_tax.validate()?;
        if self.contribution.ceiling <= Decimal::ZERO {
            return Err(FinanceError::InvalidInput {
                field: "contribution.ceiling".into(),
                reason: "Contribution ceiling must be positive".into(),
            });
        }
        if self.dependent_deduction < Decimal::ZERO {
            return Err(FinanceError::InvalidInput {
                field: "dependent_deduction".into(),
                reason: "Dependent deduction cannot be negative".into(),
            });
        }
        let rates = [
            ("severance_fund_rate", self.severance_fund_rate),
            ("employer.vacation_provision_rate", self.employer.vacation_provision_rate),
            ("employer.payroll_levy_rate", self.employer.payroll_levy_rate),
            ("employer.accident_insurance_rate", self.employer.accident_insurance_rate),
            ("employer.sector_levy_rate", self.employer.sector_levy_rate),
        ];
        for (field, rate) in rates {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(FinanceError::InvalidInput {
                    field: field.into(),
                    reason: "Rate must be between 0 and 1".into(),
                });
            }
        }
        Ok(())
    }
}

fn bracket(lower: Money, upper: Option<Money>, rate: Rate, deduction: Money) -> TaxBracket {
    TaxBracket {
        lower,
        upper,
        rate,
        deduction,
    }
}

/// Several regulatory periods keyed by year, for historical recomputation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigRegistry {
    periods: BTreeMap<i32, RegulatoryConfig>,
}

impl ConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and add a period, replacing any previous table for that year.
    pub fn insert(&mut self, config: RegulatoryConfig) -> FinanceResult<()> {
        config.validate()?;
        self.periods.insert(config.year, config);
        Ok(())
    }

    pub fn for_year(&self, year: i32) -> FinanceResult<&RegulatoryConfig> {
        self.periods.get(&year).ok_or_else(|| FinanceError::InvalidInput {
            field: "year".into(),
            reason: format!("No regulatory configuration for {year}"),
        })
    }

    /// Latest period whose `effective_from` is on or before `date`.
    pub fn effective_on(&self, date: NaiveDate) -> FinanceResult<&RegulatoryConfig> {
        let found = self
            .periods
            .values()
            .filter(|c| c.effective_from <= date)
            .max_by_key(|c| c.effective_from);
        tracing::debug!(%date, year = ?found.map(|c| c.year), "regulatory period lookup");
        found.ok_or_else(|| FinanceError::InvalidInput {
            field: "date".into(),
            reason: format!("No regulatory configuration effective on {date}"),
        })
    }

    pub fn latest(&self) -> Option<&RegulatoryConfig> {
        self.periods.values().next_back()
    }

    pub fn years(&self) -> Vec<i32> {
        self.periods.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

impl TryFrom<Vec<RegulatoryConfig>> for ConfigRegistry {
    type Error = FinanceError;

    fn try_from(configs: Vec<RegulatoryConfig>) -> FinanceResult<Self> {
        let mut registry = ConfigRegistry::new();
        for config in configs {
            registry.insert(config)?;
        }
        Ok(registry)
    }
}

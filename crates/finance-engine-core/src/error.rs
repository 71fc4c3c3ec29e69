use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FinanceError {
    #[error("Invalid number: '{value}' is not a base-10 number")]
    InvalidNumber { value: String },

    #[error("Negative value: {field} cannot be negative (got {value})")]
    NegativeValue { field: String, value: Decimal },

    #[error("Division by zero: {context} cannot be zero")]
    DivisionByZero { context: String },

    #[error("Invalid period count: {periods} (must be at least 1)")]
    InvalidPeriod { periods: i64 },

    #[error("Margins and taxes add up to {total_pct}% of revenue, leaving nothing to cover cost")]
    MarginExceedsRevenue { total_pct: Decimal },

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for FinanceError {
    fn from(e: serde_json::Error) -> Self {
        FinanceError::SerializationError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_messages_name_the_field() {
        let err = FinanceError::NegativeValue {
            field: "gross_salary".into(),
            value: dec!(-10),
        };
        assert_eq!(
            err.to_string(),
            "Negative value: gross_salary cannot be negative (got -10)"
        );

        let err = FinanceError::DivisionByZero {
            context: "contribution margin".into(),
        };
        assert_eq!(
            err.to_string(),
            "Division by zero: contribution margin cannot be zero"
        );
    }
}

pub mod config;
pub mod decimal;
pub mod error;
pub mod types;

#[cfg(feature = "payroll")]
pub mod payroll;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "investment")]
pub mod investment;

#[cfg(feature = "pricing")]
pub mod pricing;

pub use config::{ConfigRegistry, RegulatoryConfig};
pub use error::FinanceError;
pub use types::*;

/// Standard result type for all engine operations
pub type FinanceResult<T> = Result<T, FinanceError>;

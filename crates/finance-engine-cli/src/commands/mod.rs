pub mod amortization;
pub mod investment;
pub mod payroll;
pub mod pricing;

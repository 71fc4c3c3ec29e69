pub mod comparison;
pub mod schedule;

pub mod cash_flows;
pub mod compound;
pub mod savings_plan;

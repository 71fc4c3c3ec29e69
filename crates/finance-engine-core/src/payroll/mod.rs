pub mod brackets;
pub mod employer_cost;
pub mod gross_to_net;

pub mod break_even;
pub mod markup;

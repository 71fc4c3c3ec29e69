pub mod csv_out;
pub mod minimal;
pub mod table;

use clap::ValueEnum;
use serde_json::Value;

/// How a computation envelope is written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The whole envelope, pretty-printed; decimals stay strings
    #[default]
    Json,
    /// Result fields and schedule rows as tables, warnings underneath
    Table,
    /// Schedule rows as records, otherwise field/value pairs
    Csv,
    /// The headline figure only
    Minimal,
}

impl OutputFormat {
    pub fn print(self, value: &Value) {
        match self {
            OutputFormat::Json => match to_json(value) {
                Ok(text) => println!("{text}"),
                Err(e) => eprintln!("failed to serialise output: {e}"),
            },
            OutputFormat::Table => table::print_table(value),
            OutputFormat::Csv => csv_out::print_csv(value),
            OutputFormat::Minimal => minimal::print_minimal(value),
        }
    }
}

fn to_json(value: &Value) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

use serde::Deserialize;

use finance_engine_core::{ConfigRegistry, RegulatoryConfig};

use crate::input;

/// On-disk layout of a regulatory configuration file: one entry per year.
#[derive(Debug, Deserialize)]
struct RegulatoryFile {
    periods: Vec<RegulatoryConfig>,
}

/// The regulatory tables to run with: from `path` when given, otherwise the
/// bundled 2026 reference tables. `year` picks a period; the latest is used
/// when it is omitted.
pub fn load_regulatory(
    path: Option<&str>,
    year: Option<i32>,
) -> Result<RegulatoryConfig, Box<dyn std::error::Error>> {
    let registry = match path {
        Some(path) => {
            let file: RegulatoryFile = input::file::read_structured(path)?;
            ConfigRegistry::try_from(file.periods)?
        }
        None => ConfigRegistry::try_from(vec![RegulatoryConfig::reference_2026()])?,
    };
    select(&registry, year)
}

fn select(
    registry: &ConfigRegistry,
    year: Option<i32>,
) -> Result<RegulatoryConfig, Box<dyn std::error::Error>> {
    let config = match year {
        Some(year) => registry.for_year(year)?,
        None => registry
            .latest()
            .ok_or("Configuration file does not define any period")?,
    };
    tracing::debug!(year = config.year, effective_from = %config.effective_from, "regulatory configuration selected");
    Ok(config.clone())
}

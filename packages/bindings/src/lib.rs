use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use finance_engine_core::RegulatoryConfig;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Regulatory tables from an optional JSON document, or the bundled 2026 preset.
fn regulatory(config_json: Option<String>) -> NapiResult<RegulatoryConfig> {
    match config_json {
        Some(json) => {
            let config: RegulatoryConfig = serde_json::from_str(&json).map_err(to_napi_error)?;
            config.validate().map_err(to_napi_error)?;
            Ok(config)
        }
        None => Ok(RegulatoryConfig::reference_2026()),
    }
}

// ---------------------------------------------------------------------------
// Payroll
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_payroll(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let input: finance_engine_core::payroll::gross_to_net::PayrollInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config = regulatory(config_json)?;
    let output = finance_engine_core::payroll::gross_to_net::calculate_payroll(&input, &config)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_employer_cost(
    input_json: String,
    config_json: Option<String>,
) -> NapiResult<String> {
    let input: finance_engine_core::payroll::employer_cost::EmployerCostInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config = regulatory(config_json)?;
    let output =
        finance_engine_core::payroll::employer_cost::calculate_employer_cost(&input, &config)
            .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn build_amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: finance_engine_core::amortization::schedule::AmortizationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finance_engine_core::amortization::schedule::build_schedule(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_amortization(input_json: String) -> NapiResult<String> {
    let input: finance_engine_core::amortization::schedule::AmortizationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finance_engine_core::amortization::comparison::compare_schedules(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Investment
// ---------------------------------------------------------------------------

#[napi]
pub fn project_compound(input_json: String) -> NapiResult<String> {
    let input: finance_engine_core::investment::compound::CompoundInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finance_engine_core::investment::compound::project_compound(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_cash_flows(input_json: String) -> NapiResult<String> {
    let input: finance_engine_core::investment::cash_flows::CashFlowInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finance_engine_core::investment::cash_flows::analyze_cash_flows(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct IrrRequest {
    cash_flows: Vec<Decimal>,
    #[serde(default)]
    guess: Option<Decimal>,
}

#[napi]
pub fn internal_rate_of_return(input_json: String) -> NapiResult<String> {
    let input: IrrRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let estimate = finance_engine_core::investment::cash_flows::solve_irr(
        &input.cash_flows,
        input
            .guess
            .unwrap_or(finance_engine_core::investment::cash_flows::DEFAULT_IRR_GUESS),
    );
    serde_json::to_string(&estimate).map_err(to_napi_error)
}

#[napi]
pub fn project_savings_plan(input_json: String) -> NapiResult<String> {
    let input: finance_engine_core::investment::savings_plan::SavingsPlanInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finance_engine_core::investment::savings_plan::project_savings_plan(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_pricing(input_json: String) -> NapiResult<String> {
    let input: finance_engine_core::pricing::markup::PricingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        finance_engine_core::pricing::markup::analyze_pricing(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct MarkupRequest {
    unit_cost: Decimal,
    tax_pct: Decimal,
    expense_pct: Decimal,
    margin_pct: Decimal,
}

#[napi]
pub fn markup_pricing(input_json: String) -> NapiResult<String> {
    let input: MarkupRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finance_engine_core::pricing::markup::markup_pricing(
        input.unit_cost,
        input.tax_pct,
        input.expense_pct,
        input.margin_pct,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct BreakEvenRequest {
    fixed_costs: Decimal,
    contribution_margin_pct: Decimal,
}

#[napi]
pub fn break_even_revenue(input_json: String) -> NapiResult<String> {
    let input: BreakEvenRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let revenue = finance_engine_core::pricing::break_even::break_even_revenue(
        input.fixed_costs,
        input.contribution_margin_pct,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&serde_json::json!({ "break_even_revenue": revenue }))
        .map_err(to_napi_error)
}

#[derive(Deserialize)]
struct EbitdaRequest {
    net_revenue: Decimal,
    #[serde(default)]
    variable_costs: Decimal,
    #[serde(default)]
    fixed_expenses: Decimal,
}

#[napi]
pub fn ebitda(input_json: String) -> NapiResult<String> {
    let input: EbitdaRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let value = finance_engine_core::pricing::break_even::ebitda(
        input.net_revenue,
        input.variable_costs,
        input.fixed_expenses,
    )
    .map_err(to_napi_error)?;
    let margin =
        finance_engine_core::pricing::break_even::ebitda_margin_pct(input.net_revenue, value)
            .map_err(to_napi_error)?;
    serde_json::to_string(&serde_json::json!({
        "ebitda": value,
        "ebitda_margin_pct": margin,
    }))
    .map_err(to_napi_error)
}

use finance_engine_core::pricing::break_even::{break_even_revenue, ebitda};
use finance_engine_core::pricing::markup::{analyze_pricing, markup_pricing, PricingInput};
use finance_engine_core::FinanceError;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[test]
fn test_break_even_reference() {
    assert_eq!(break_even_revenue(dec!(1000), dec!(40)).unwrap(), dec!(2500.00));
}

#[test]
fn test_break_even_zero_margin() {
    assert!(matches!(
        break_even_revenue(dec!(1000), Decimal::ZERO),
        Err(FinanceError::DivisionByZero { .. })
    ));
}

#[test]
fn test_markup_selling_price_covers_cost_and_rates() {
    // price * (1 - 0.45) should give the cost back
    let out = markup_pricing(dec!(55), dec!(18), dec!(12), dec!(15)).unwrap();
    assert_eq!(out.selling_price, dec!(100.00));
    assert_eq!(out.markup_factor, dec!(1.8182));
    assert_eq!(out.nominal_profit, dec!(15.00));
}

#[test]
fn test_ebitda_can_be_negative() {
    assert_eq!(ebitda(dec!(10_000), dec!(7_000), dec!(4_000)).unwrap(), dec!(-1000.00));
}

#[test]
fn test_analysis_is_idempotent() {
    let input = PricingInput {
        unit_cost: dec!(37.90),
        tax_pct: dec!(9.25),
        expense_pct: dec!(6),
        margin_pct: dec!(22.5),
        fixed_costs: Some(dec!(18_000)),
        contribution_margin_pct: Some(dec!(35)),
        net_revenue: None,
        variable_costs: None,
    };
    assert_eq!(
        analyze_pricing(&input).unwrap().result,
        analyze_pricing(&input).unwrap().result
    );
}

proptest! {
    #[test]
    fn prop_markup_rejects_totals_at_or_above_100(
        tax in 0i64..100,
        expense in 0i64..100,
        margin in 0i64..100,
    ) {
        let result = markup_pricing(
            dec!(10),
            Decimal::from(tax),
            Decimal::from(expense),
            Decimal::from(margin),
        );
        if tax + expense + margin >= 100 {
            prop_assert!(
                matches!(result, Err(FinanceError::MarginExceedsRevenue { .. })),
                "expected MarginExceedsRevenue"
            );
        } else {
            let out = result.unwrap();
            prop_assert!(out.selling_price >= dec!(10));
        }
    }
}

use finance_engine_core::amortization::comparison::compare_schedules;
use finance_engine_core::amortization::schedule::{
    build_schedule, constant_installment_schedule, constant_principal_schedule,
    AmortizationInput, AmortizationMethod,
};
use finance_engine_core::FinanceError;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn loan(method: AmortizationMethod) -> AmortizationInput {
    AmortizationInput {
        principal: dec!(100_000),
        annual_rate_pct: dec!(12),
        periods: 12,
        method,
    }
}

// ===========================================================================
// SAC
// ===========================================================================

#[test]
fn test_sac_reference_loan() {
    let schedule = build_schedule(&loan(AmortizationMethod::ConstantPrincipal))
        .unwrap()
        .result;
    // (1.12)^(1/12) - 1 = 0.0094887929
    assert_eq!(schedule.monthly_rate_pct, dec!(0.9489));
    assert_eq!(schedule.rows[0].installment, dec!(9282.21));
    assert_eq!(schedule.rows[0].interest, dec!(948.88));
    assert_eq!(schedule.rows[0].amortization, dec!(8333.33));
    assert_eq!(schedule.rows.last().unwrap().balance, dec!(0.00));
}

#[test]
fn test_sac_installments_decrease() {
    let rows = constant_principal_schedule(dec!(250_000), dec!(9.5), 360).unwrap();
    for pair in rows.windows(2) {
        assert!(pair[1].installment <= pair[0].installment);
        assert!(pair[1].balance <= pair[0].balance);
    }
}

// ===========================================================================
// PRICE
// ===========================================================================

#[test]
fn test_price_reference_loan() {
    let schedule = build_schedule(&loan(AmortizationMethod::ConstantInstallment))
        .unwrap()
        .result;
    assert!(schedule.rows.iter().all(|r| r.installment == dec!(8856.21)));
    assert_eq!(schedule.rows.last().unwrap().balance, dec!(0.00));
    assert_eq!(schedule.total_paid, dec!(8856.21) * dec!(12));
}

#[test]
fn test_price_interest_share_falls() {
    let rows = constant_installment_schedule(dec!(80_000), dec!(10), 48).unwrap();
    for pair in rows.windows(2) {
        assert!(pair[1].interest <= pair[0].interest);
        assert!(pair[1].amortization >= pair[0].amortization);
    }
}

#[test]
fn test_zero_rate_splits_principal_evenly() {
    let rows = constant_installment_schedule(dec!(1200), Decimal::ZERO, 12).unwrap();
    assert!(rows.iter().all(|r| r.installment == dec!(100.00)));
    assert!(rows.iter().all(|r| r.interest == dec!(0.00)));
}

// ===========================================================================
// Validation
// ===========================================================================

#[test]
fn test_zero_periods_rejected() {
    let mut input = loan(AmortizationMethod::ConstantPrincipal);
    input.periods = 0;
    assert_eq!(
        build_schedule(&input).unwrap_err(),
        FinanceError::InvalidPeriod { periods: 0 }
    );
}

#[test]
fn test_negative_principal_rejected() {
    let mut input = loan(AmortizationMethod::ConstantInstallment);
    input.principal = dec!(-1);
    assert!(matches!(
        build_schedule(&input),
        Err(FinanceError::NegativeValue { .. })
    ));
}

#[test]
fn test_method_aliases_deserialize() {
    let sac: AmortizationMethod = serde_json::from_str("\"sac\"").unwrap();
    let price: AmortizationMethod = serde_json::from_str("\"price\"").unwrap();
    assert_eq!(sac, AmortizationMethod::ConstantPrincipal);
    assert_eq!(price, AmortizationMethod::ConstantInstallment);
}

// ===========================================================================
// Comparison
// ===========================================================================

#[test]
fn test_comparison_matches_individual_schedules() {
    let input = loan(AmortizationMethod::default());
    let cmp = compare_schedules(&input).unwrap().result;

    let sac = build_schedule(&loan(AmortizationMethod::ConstantPrincipal))
        .unwrap()
        .result;
    let price = build_schedule(&loan(AmortizationMethod::ConstantInstallment))
        .unwrap()
        .result;
    assert_eq!(cmp.constant_principal, sac);
    assert_eq!(cmp.constant_installment, price);
}

#[test]
fn test_schedule_is_idempotent() {
    let input = loan(AmortizationMethod::ConstantInstallment);
    assert_eq!(
        build_schedule(&input).unwrap().result,
        build_schedule(&input).unwrap().result
    );
}

// ===========================================================================
// Properties
// ===========================================================================

fn method_strategy() -> impl Strategy<Value = AmortizationMethod> {
    prop_oneof![
        Just(AmortizationMethod::ConstantPrincipal),
        Just(AmortizationMethod::ConstantInstallment),
    ]
}

proptest! {
    #[test]
    fn prop_amortization_repays_principal(
        principal_cents in 100i64..1_000_000_000,
        rate_bp in 0i64..5_000,
        periods in 1u32..=480,
        method in method_strategy(),
    ) {
        let input = AmortizationInput {
            principal: Decimal::new(principal_cents, 2),
            annual_rate_pct: Decimal::new(rate_bp, 2),
            periods,
            method,
        };
        let schedule = build_schedule(&input).unwrap().result;

        prop_assert_eq!(schedule.rows.len(), periods as usize);
        prop_assert_eq!(schedule.rows.last().unwrap().balance, Decimal::ZERO);

        let tolerance = dec!(0.01) * Decimal::from(periods);
        let gap = (schedule.total_amortization - input.principal).abs();
        prop_assert!(gap <= tolerance, "gap {} exceeds {}", gap, tolerance);
        prop_assert!(schedule.rows.iter().all(|r| r.balance >= Decimal::ZERO));
    }

    #[test]
    fn prop_price_installment_is_constant(
        principal_cents in 100i64..1_000_000_000,
        rate_bp in 0i64..5_000,
        periods in 1u32..=360,
    ) {
        let rows = constant_installment_schedule(
            Decimal::new(principal_cents, 2),
            Decimal::new(rate_bp, 2),
            periods,
        )
        .unwrap();
        let first = rows[0].installment;
        prop_assert!(rows.iter().all(|r| r.installment == first));
    }
}

use petro_econ_core::cashflow::evaluate;
use petro_econ_core::model::*;
use petro_econ_core::sensitivity::{
    calculate_sensitivity, calculate_sensitivity_grid, GridInput, GridVariable, ParamType,
    SensitivityInput, SensitivityParameter, SensitivitySwings,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Fixtures
// ===========================================================================

/// No royalty or tax, 10% discounting, 5% price escalation.
/// 2025: 46,000 capex, no production. 2026: 1,000 bbl at an escalated $105.
fn delayed_first_oil() -> EconomicsInput {
    EconomicsInput {
        model_settings: ModelSettings {
            start_year: 2025,
            end_year: 2026,
            frequency: Frequency::Annual,
            currency: Default::default(),
            discount_rate: dec!(0.10),
            inflation_rate: Decimal::ZERO,
            inflation_enabled: false,
            price_deck_type: PriceDeckType::Flat,
            reference_year: None,
        },
        streams: vec![Stream {
            id: "oil".into(),
            name: "Oil".into(),
            active: true,
        }],
        production_data: vec![
            ProductionRow::empty(2025),
            ProductionRow {
                year: 2026,
                oil_rate: dec!(1000),
                ..Default::default()
            },
        ],
        cost_data: CostData {
            capex_profile: vec![
                CapexRow {
                    year: 2025,
                    facilities_capex: dec!(46000),
                    ..Default::default()
                },
                CapexRow::empty(2026),
            ],
            opex_profile: vec![OpexRow::empty(2025), OpexRow::empty(2026)],
        },
        fiscal_terms: FiscalTerms::RoyaltyTax(RoyaltyTaxTerms {
            tax_rate: None,
            royalty_rate: None,
            depreciation_method: DepreciationMethod::Expensed,
            book_life_years: None,
            declining_balance_rate: None,
            ring_fence: true,
            loss_carry_forward: false,
        }),
        price_assumptions: PriceAssumptions {
            oil_price: dec!(100),
            gas_price: dec!(3),
            condensate_price: None,
            escalation: dec!(0.05),
            price_deck: vec![],
        },
        assumptions: Assumptions::default(),
    }
}

fn run(swings: SensitivitySwings) -> petro_econ_core::sensitivity::SensitivityOutput {
    calculate_sensitivity(&SensitivityInput {
        base: delayed_first_oil(),
        swings,
    })
    .unwrap()
    .result
}

// ===========================================================================
// Tornado
// ===========================================================================

#[test]
fn test_base_metrics_match_engine() {
    let out = run(SensitivitySwings::default());
    let base = evaluate(&delayed_first_oil()).unwrap();
    assert_eq!(out.base_npv, base.metrics.npv);
    assert_eq!(out.base_irr, base.metrics.irr);
}

#[test]
fn test_price_swing_deltas() {
    let out = run(SensitivitySwings::default());
    let price = out.analysis_data.iter().find(|r| r.id == "price").unwrap();
    assert_eq!(price.param_type, ParamType::Percent);
    assert_eq!(price.param_value, dec!(20));

    // 20% of 105,000 revenue discounted one year
    let expected = dec!(21000) / dec!(1.1);
    assert!((price.npv_high_delta - expected).abs() < dec!(0.0001));
    assert!((price.npv_low_delta + expected).abs() < dec!(0.0001));
    assert!((price.npv_range - expected * dec!(2)).abs() < dec!(0.0001));
    assert!(price.irr_high_delta.unwrap() > Decimal::ZERO);
    assert!(price.irr_low_delta.unwrap() < Decimal::ZERO);
}

#[test]
fn test_rows_sorted_by_range() {
    let out = run(SensitivitySwings {
        discount_rate: Some(dec!(10)),
        ..Default::default()
    });
    assert_eq!(out.analysis_data.len(), 6);
    for pair in out.analysis_data.windows(2) {
        assert!(pair[0].npv_range >= pair[1].npv_range);
    }
    // Price moves revenue of 105,000, the largest single driver here
    assert_eq!(out.analysis_data[0].id, "price");
}

#[test]
fn test_start_date_shift_can_move_npv_one_way() {
    let out = run(SensitivitySwings::default());
    let shift = out
        .analysis_data
        .iter()
        .find(|r| r.id == "start_date")
        .unwrap();
    assert_eq!(shift.param_type, ParamType::Years);

    // Earlier: capex compounds to 2024 while revenue loses a year of
    // escalation. Later: revenue gains escalation but is discounted twice.
    // Both directions lose value, so the deltas share a sign.
    assert!(shift.npv_low_delta < Decimal::ZERO, "low {}", shift.npv_low_delta);
    assert!(shift.npv_high_delta < Decimal::ZERO, "high {}", shift.npv_high_delta);
    assert_eq!(
        shift.npv_range,
        shift.npv_low_delta.abs() + shift.npv_high_delta.abs()
    );
}

#[test]
fn test_zero_swings_skip_parameters() {
    let out = run(SensitivitySwings {
        price: dec!(10),
        capex: Decimal::ZERO,
        opex: Decimal::ZERO,
        production: Decimal::ZERO,
        start_date: 0,
        discount_rate: None,
    });
    assert_eq!(out.analysis_data.len(), 1);
    assert_eq!(out.analysis_data[0].name, "Commodity Price");
}

#[test]
fn test_caller_input_untouched() {
    let base = delayed_first_oil();
    let input = SensitivityInput {
        base: base.clone(),
        swings: SensitivitySwings::default(),
    };
    calculate_sensitivity(&input).unwrap();
    assert_eq!(input.base.model_settings.start_year, 2025);
    assert_eq!(input.base.price_assumptions.oil_price, dec!(100));
    assert_eq!(input.base.production_data[1].year, 2026);
}

// ===========================================================================
// Two-way grid
// ===========================================================================

#[test]
fn test_grid_price_vs_capex() {
    let input = GridInput {
        base: delayed_first_oil(),
        variable_1: GridVariable {
            parameter: SensitivityParameter::Price,
            min: dec!(-20),
            max: dec!(20),
            step: dec!(10),
        },
        variable_2: GridVariable {
            parameter: SensitivityParameter::Capex,
            min: dec!(-10),
            max: dec!(10),
            step: dec!(10),
        },
    };
    let out = calculate_sensitivity_grid(&input).unwrap().result;

    assert_eq!(out.matrix.len(), 5);
    assert_eq!(out.matrix[0].len(), 3);
    assert_eq!(out.base_case_position, (2, 1));
    assert_eq!(out.matrix[2][1], Some(out.base_case_value));

    // Higher price raises NPV, higher capex lowers it
    for j in 0..3 {
        for i in 0..4 {
            assert!(out.matrix[i][j].unwrap() < out.matrix[i + 1][j].unwrap());
        }
    }
    for row in &out.matrix {
        assert!(row[0].unwrap() > row[1].unwrap());
        assert!(row[1].unwrap() > row[2].unwrap());
    }
}

#[test]
fn test_grid_rejects_same_parameter_twice() {
    let axis = GridVariable {
        parameter: SensitivityParameter::Opex,
        min: dec!(-10),
        max: dec!(10),
        step: dec!(5),
    };
    let input = GridInput {
        base: delayed_first_oil(),
        variable_1: axis.clone(),
        variable_2: axis,
    };
    assert!(calculate_sensitivity_grid(&input).is_err());
}

use petro_econ_core::cashflow::{calculate_economics, evaluate};
use petro_econ_core::model::*;
use petro_econ_core::PetroEconError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Fixtures
// ===========================================================================

fn settings(start_year: i32, end_year: i32, discount_rate: Decimal) -> ModelSettings {
    ModelSettings {
        start_year,
        end_year,
        frequency: Frequency::Annual,
        currency: Default::default(),
        discount_rate,
        inflation_rate: Decimal::ZERO,
        inflation_enabled: false,
        price_deck_type: PriceDeckType::Flat,
        reference_year: None,
    }
}

fn royalty_tax(depreciation_method: DepreciationMethod) -> FiscalTerms {
    FiscalTerms::RoyaltyTax(RoyaltyTaxTerms {
        tax_rate: None,
        royalty_rate: None,
        depreciation_method,
        book_life_years: None,
        declining_balance_rate: None,
        ring_fence: true,
        loss_carry_forward: false,
    })
}

fn oil_stream() -> Vec<Stream> {
    vec![Stream {
        id: "oil".into(),
        name: "Oil".into(),
        active: true,
    }]
}

/// 2025-2026 single well: 1000 bbl/yr at $70, 12.5% royalty, 30% tax.
fn flat_single_well() -> EconomicsInput {
    EconomicsInput {
        model_settings: settings(2025, 2026, dec!(0.10)),
        streams: oil_stream(),
        production_data: (2025..=2026)
            .map(|year| ProductionRow {
                year,
                oil_rate: dec!(1000),
                ..Default::default()
            })
            .collect(),
        cost_data: CostData {
            capex_profile: vec![CapexRow::empty(2025), CapexRow::empty(2026)],
            opex_profile: vec![OpexRow::empty(2025), OpexRow::empty(2026)],
        },
        fiscal_terms: royalty_tax(DepreciationMethod::StraightLine),
        price_assumptions: PriceAssumptions {
            oil_price: dec!(70),
            gas_price: dec!(3),
            condensate_price: None,
            escalation: Decimal::ZERO,
            price_deck: vec![],
        },
        assumptions: Assumptions {
            tax_rate: dec!(30),
            royalty_rate: dec!(12.5),
            ..Assumptions::default()
        },
    }
}

/// Five-year development: capex up front, oil and gas from year two.
fn development_case(fiscal_terms: FiscalTerms) -> EconomicsInput {
    let years = 2025..=2029;
    EconomicsInput {
        model_settings: settings(2025, 2029, dec!(0.10)),
        streams: vec![
            Stream {
                id: "oil".into(),
                name: "Oil".into(),
                active: true,
            },
            Stream {
                id: "gas".into(),
                name: "Gas".into(),
                active: true,
            },
        ],
        production_data: years
            .clone()
            .map(|year| {
                if year == 2025 {
                    ProductionRow::empty(year)
                } else {
                    ProductionRow {
                        year,
                        oil_rate: dec!(100000),
                        gas_rate: dec!(60000),
                        ..Default::default()
                    }
                }
            })
            .collect(),
        cost_data: CostData {
            capex_profile: years
                .clone()
                .map(|year| {
                    if year == 2025 {
                        CapexRow {
                            year,
                            drilling_capex: dec!(6000000),
                            facilities_capex: dec!(4000000),
                            ..Default::default()
                        }
                    } else {
                        CapexRow::empty(year)
                    }
                })
                .collect(),
            opex_profile: years
                .map(|year| OpexRow {
                    year,
                    fixed_opex: dec!(300000),
                    variable_oil: dec!(8),
                    ..Default::default()
                })
                .collect(),
        },
        fiscal_terms,
        price_assumptions: PriceAssumptions {
            oil_price: dec!(70),
            gas_price: dec!(3),
            condensate_price: None,
            escalation: dec!(0.02),
            price_deck: vec![],
        },
        assumptions: Assumptions {
            tax_rate: dec!(30),
            royalty_rate: dec!(12.5),
            ..Assumptions::default()
        },
    }
}

fn psc_terms() -> FiscalTerms {
    FiscalTerms::Psc(PscTerms {
        tax_rate: None,
        royalty_rate: Some(dec!(5)),
        depreciation_method: DepreciationMethod::UnitOfProduction,
        book_life_years: None,
        declining_balance_rate: None,
        ring_fence: true,
        loss_carry_forward: true,
        cost_oil_limit: dec!(50),
        profit_split: dec!(40),
        cost_recovery: CostRecoveryPolicy::default(),
    })
}

// ===========================================================================
// Scenario examples
// ===========================================================================

#[test]
fn test_flat_single_well_first_year() {
    let out = evaluate(&flat_single_well()).unwrap();
    let y = &out.annual_results[0];
    assert_eq!(y.year, 2025);
    assert_eq!(y.gross_revenue, dec!(70000));
    assert_eq!(y.royalties, dec!(8750));
    assert_eq!(y.taxable_income, dec!(61250));
    assert_eq!(y.tax, dec!(18375));
    assert_eq!(y.net_cashflow, dec!(42875));
}

#[test]
fn test_escalated_price_second_year() {
    let mut input = flat_single_well();
    input.price_assumptions.escalation = dec!(0.10);
    let out = evaluate(&input).unwrap();
    assert_eq!(out.annual_results[1].oil_price, dec!(77));
    assert_eq!(out.annual_results[1].gross_revenue, dec!(77000));
}

#[test]
fn test_zero_production_year_is_cost_only() {
    let mut input = flat_single_well();
    input.production_data[1].oil_rate = Decimal::ZERO;
    input.cost_data.opex_profile[1].fixed_opex = dec!(5000);
    input.cost_data.capex_profile[1].other_capex = dec!(2000);

    let out = evaluate(&input).unwrap();
    let y = &out.annual_results[1];
    assert_eq!(y.gross_revenue, Decimal::ZERO);
    assert_eq!(y.tax, Decimal::ZERO);
    assert_eq!(y.net_cashflow, dec!(-7000));
}

#[test]
fn test_all_positive_cashflow_has_null_irr() {
    let result = calculate_economics(&flat_single_well()).unwrap();
    assert_eq!(result.result.metrics.irr, None);
    assert_eq!(result.result.metrics.dpi, None);
    assert!(result.warnings.iter().any(|w| w.starts_with("IRR undefined")));

    let json = serde_json::to_value(&result.result.metrics).unwrap();
    assert!(json["irr"].is_null());
}

// ===========================================================================
// Invariants
// ===========================================================================

#[test]
fn test_cumulative_sum_invariant() {
    for terms in [royalty_tax(DepreciationMethod::DecliningBalance), psc_terms()] {
        let out = evaluate(&development_case(terms)).unwrap();
        let rows = &out.annual_results;
        assert_eq!(rows[0].cumulative_cashflow, rows[0].net_cashflow);
        for i in 1..rows.len() {
            assert_eq!(
                rows[i].cumulative_cashflow,
                rows[i - 1].cumulative_cashflow + rows[i].net_cashflow
            );
        }
    }
}

#[test]
fn test_net_cashflow_identity_every_regime() {
    let jv = FiscalTerms::Jv(JvTerms {
        tax_rate: Some(dec!(25)),
        royalty_rate: None,
        depreciation_method: DepreciationMethod::Expensed,
        book_life_years: None,
        declining_balance_rate: None,
        loss_carry_forward: true,
    });
    for terms in [royalty_tax(DepreciationMethod::StraightLine), psc_terms(), jv] {
        let out = evaluate(&development_case(terms)).unwrap();
        for r in &out.annual_results {
            assert_eq!(r.govt_take, r.royalties + r.tax + r.profit_share);
            assert_eq!(r.net_cashflow, r.gross_revenue - r.opex - r.capex - r.govt_take);
            assert!(r.tax >= Decimal::ZERO);
        }
    }
}

#[test]
fn test_npv_decreases_with_discount_rate() {
    let mut previous: Option<Decimal> = None;
    for rate in [dec!(0), dec!(0.05), dec!(0.10), dec!(0.15), dec!(0.25)] {
        let mut input = development_case(royalty_tax(DepreciationMethod::StraightLine));
        input.model_settings.discount_rate = rate;
        let out = evaluate(&input).unwrap();
        assert!(out.metrics.undiscounted_cashflow > Decimal::ZERO);
        if let Some(prev) = previous {
            assert!(out.metrics.npv < prev, "NPV should fall at rate {rate}");
        }
        previous = Some(out.metrics.npv);
    }
}

#[test]
fn test_zero_escalation_keeps_base_price() {
    let mut input = development_case(royalty_tax(DepreciationMethod::StraightLine));
    input.price_assumptions.escalation = Decimal::ZERO;
    let out = evaluate(&input).unwrap();
    for r in &out.annual_results {
        assert_eq!(r.oil_price, dec!(70));
        assert_eq!(r.gas_price, dec!(3));
    }
}

#[test]
fn test_total_depreciation_equals_total_capex() {
    for method in [
        DepreciationMethod::StraightLine,
        DepreciationMethod::DecliningBalance,
        DepreciationMethod::UnitOfProduction,
        DepreciationMethod::Expensed,
    ] {
        let out = evaluate(&development_case(royalty_tax(method))).unwrap();
        let dep: Decimal = out.annual_results.iter().map(|r| r.depreciation).sum();
        assert_eq!(dep, out.metrics.total_capex, "method {method:?}");
    }
}

// ===========================================================================
// Metrics
// ===========================================================================

#[test]
fn test_development_metrics_defined() {
    let result =
        calculate_economics(&development_case(royalty_tax(DepreciationMethod::StraightLine)))
            .unwrap();
    let m = &result.result.metrics;

    let irr = m.irr.unwrap();
    assert!(irr > dec!(0.10) && irr < dec!(2), "IRR {irr}");
    assert!(m.npv > Decimal::ZERO);
    assert!(m.dpi.unwrap() > Decimal::ONE);
    assert_eq!(m.payback_year, Some(2028));
    assert!(m.max_exposure < Decimal::ZERO);

    // 4 producing years of 100,000 bbl + 60,000 mcf / 6
    assert_eq!(m.total_boe, dec!(440000));
    let utc = m.unit_technical_cost.unwrap();
    assert_eq!(utc, (m.total_opex + m.total_capex) / dec!(440000));

    let breakeven = m.breakeven_price.unwrap();
    assert!(breakeven > Decimal::ZERO && breakeven < dec!(70), "breakeven {breakeven}");
}

#[test]
fn test_breakeven_gives_zero_npv() {
    let input = development_case(royalty_tax(DepreciationMethod::Expensed));
    let breakeven = evaluate(&input).unwrap().metrics.breakeven_price.unwrap();

    let mut at_breakeven = input.clone();
    at_breakeven.price_assumptions.oil_price = breakeven;
    let npv = evaluate(&at_breakeven).unwrap().metrics.npv;
    // $0.0001/bbl on 400,000 escalated barrels
    assert!(npv.abs() < dec!(100), "NPV at breakeven {npv}");
}

#[test]
fn test_breakeven_simple_closed_form() {
    // -1000 in 2025, 10 bbl in 2026, no fiscal take: NPV = -1000 + 10p/1.1
    let mut input = flat_single_well();
    input.assumptions.tax_rate = Decimal::ZERO;
    input.assumptions.royalty_rate = Decimal::ZERO;
    input.production_data[0].oil_rate = Decimal::ZERO;
    input.production_data[1].oil_rate = dec!(10);
    input.cost_data.capex_profile[0].drilling_capex = dec!(1000);

    let breakeven = evaluate(&input).unwrap().metrics.breakeven_price.unwrap();
    assert!((breakeven - dec!(110)).abs() < dec!(0.001), "breakeven {breakeven}");
}

#[test]
fn test_breakeven_undefined_without_oil() {
    let mut input = development_case(royalty_tax(DepreciationMethod::StraightLine));
    input.streams[0].active = false;
    let result = calculate_economics(&input).unwrap();
    assert_eq!(result.result.metrics.breakeven_price, None);
    assert!(result
        .warnings
        .iter()
        .any(|w| w.starts_with("Breakeven price undefined")));
}

#[test]
fn test_psc_recovers_costs_over_time() {
    let out = evaluate(&development_case(psc_terms())).unwrap();
    let rows = &out.annual_results;
    // 2026 revenue cap binds: cost oil is 50% of revenue
    assert_eq!(rows[1].recoverable_cost, rows[1].gross_revenue * dec!(0.5));
    assert!(rows[1].profit_share > Decimal::ZERO);
    let recovered: Decimal = rows.iter().map(|r| r.recoverable_cost).sum();
    let spent: Decimal = rows.iter().map(|r| r.opex + r.capex).sum();
    assert!(recovered <= spent);
}

#[test]
fn test_ring_fence_off_warns() {
    let mut input = flat_single_well();
    input.fiscal_terms = FiscalTerms::RoyaltyTax(RoyaltyTaxTerms {
        tax_rate: None,
        royalty_rate: None,
        depreciation_method: DepreciationMethod::StraightLine,
        book_life_years: None,
        declining_balance_rate: None,
        ring_fence: false,
        loss_carry_forward: false,
    });
    let result = calculate_economics(&input).unwrap();
    assert!(result.warnings.iter().any(|w| w.starts_with("Ring fence disabled")));
}

#[test]
fn test_reference_year_moves_discount_origin() {
    let mut input = flat_single_well();
    input.model_settings.reference_year = Some(2024);
    let out = evaluate(&input).unwrap();
    let df = out.annual_results[0].discount_factor;
    assert!((df - dec!(1) / dec!(1.1)).abs() < dec!(0.0000001));
}

// ===========================================================================
// Input errors
// ===========================================================================

#[test]
fn test_missing_year_is_fatal() {
    let mut input = flat_single_well();
    input.cost_data.capex_profile.remove(0);
    match evaluate(&input) {
        Err(PetroEconError::YearCoverage { profile, year, .. }) => {
            assert_eq!(profile, "capex_profile");
            assert_eq!(year, 2025);
        }
        other => panic!("expected coverage error, got {other:?}"),
    }
}

#[test]
fn test_json_input_round_trip() {
    let json = serde_json::json!({
        "model_settings": {
            "start_year": 2025,
            "end_year": 2025,
            "discount_rate": "0.1"
        },
        "streams": [{ "id": "oil", "name": "Oil", "active": true }],
        "production_data": [{ "year": 2025, "oil_rate": "1000" }],
        "cost_data": {
            "capex_profile": [{ "year": 2025 }],
            "opex_profile": [{ "year": 2025 }]
        },
        "fiscal_terms": { "template_type": "royalty_tax" },
        "price_assumptions": { "oil_price": "70", "gas_price": "3" },
        "assumptions": { "tax_rate": "30", "royalty_rate": "12.5" }
    });
    let input: EconomicsInput = serde_json::from_value(json).unwrap();
    let out = evaluate(&input).unwrap();
    assert_eq!(out.annual_results[0].net_cashflow, dec!(42875));
}

#[test]
fn test_psc_taxable_income_deducts_recovered_cost() {
    let out = evaluate(&development_case(psc_terms())).unwrap();
    for row in &out.annual_results {
        assert_eq!(
            row.taxable_income,
            row.gross_revenue - row.royalties - row.opex - row.depreciation - row.recoverable_cost,
            "taxable income for {}",
            row.year
        );
    }
}

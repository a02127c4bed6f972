use super::types::{DcaPeriod, PriceModel, PurchaseTiming, ScenarioInput};

pub fn sample_input() -> ScenarioInput {
    ScenarioInput {
        years: 10,
        btc_price: 50_000.0,
        btc_amount: 1.0,
        model: PriceModel::PowerLaw,
        model_confidence: 1.0,
        dca_amount: 0.0,
        dca_period: DcaPeriod::Monthly,
        cap_gains_tax_rate: 0.2,
        home_price: 500_000.0,
        down_pct: 0.2,
        mortgage_rate: 0.065,
        term: 30,
        property_tax_rate: 0.012,
        insurance_annual: 1_200.0,
        hoa_monthly: 0.0,
        appreciation_rate: 0.03,
        maintenance_rate: 0.01,
        closing_costs_pct: 0.03,
        monthly_rent: 2_500.0,
        rent_growth_rate: 0.03,
        renters_insurance_annual: 300.0,
        moving_frequency_years: 3,
        moving_cost_per_move: 2_000.0,
        purchase_timing: PurchaseTiming::Now,
    }
}

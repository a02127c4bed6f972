use chrono::Datelike;
use log::debug;

use super::dca::accumulate_dca_cum;
use super::models::PriceCurve;
use super::purchase::compute_buy_series;
use super::rent::compute_rent_series;
use super::types::{
    DcaDetails, FinalYearSummary, ScenarioInput, ScenarioOutput, ScenarioSummary, Strategy,
};

pub fn run_scenario(input: &ScenarioInput) -> ScenarioOutput {
    run_scenario_from_year(input, chrono::Utc::now().year())
}

pub fn run_scenario_from_year(input: &ScenarioInput, start_year: i32) -> ScenarioOutput {
    let input = sanitize(input);
    let curve = PriceCurve::new(input.model, input.btc_price, input.model_confidence);
    let price_at = |t: f64| curve.at(t);

    // one accumulation series feeds every strategy
    let dca_cum = accumulate_dca_cum(input.years, input.dca_amount, input.dca_period, &price_at);

    let hold: Vec<f64> = dca_cum
        .iter()
        .enumerate()
        .map(|(i, dca_btc)| (input.btc_amount + dca_btc) * price_at(i as f64))
        .collect();
    let rent = compute_rent_series(&input, &price_at, &dca_cum);
    let buy = compute_buy_series(&input, &price_at, &dca_cum);

    let opportunity_cost_series = hold
        .iter()
        .zip(&buy.series)
        .zip(&rent.series)
        .map(|((h, b), r)| opportunity_cost(*h, *b, *r))
        .collect();

    let last = input.years as usize;
    let final_year = final_year_summary(hold[last], buy.series[last], rent.series[last]);
    let dca_details = dca_summary(&input, dca_cum[last]);

    debug!(
        "scenario: years={} model={} purchase_year={} best={:?}",
        input.years,
        input.model.key(),
        input.purchase_timing.purchase_year(),
        final_year.best_strategy
    );

    ScenarioOutput {
        years_labels: (0..=input.years).map(|i| start_year.saturating_add(i as i32)).collect(),
        hold_all_value: hold,
        buy_house_value: buy.series,
        rent_forever_value: rent.series,
        opportunity_cost_series,
        summary: ScenarioSummary {
            model: input.model,
            purchase_year: input.purchase_timing.purchase_year(),
            final_year,
            buy_house_details: buy.details,
            rent_details: rent.details,
            dca_details,
        },
    }
}

fn opportunity_cost(hold: f64, buy: f64, rent: f64) -> f64 {
    hold - hold.max(buy).max(rent)
}

fn final_year_summary(hold: f64, buy: f64, rent: f64) -> FinalYearSummary {
    let best = hold.max(buy).max(rent);
    let best_strategy = if hold == best {
        Strategy::Hold
    } else if buy == best {
        Strategy::Buy
    } else {
        Strategy::Rent
    };
    FinalYearSummary {
        hold_all: hold,
        buy_house: buy,
        rent_forever: rent,
        best_strategy,
        opportunity_cost: hold - best,
    }
}

fn dca_summary(input: &ScenarioInput, btc_accumulated: f64) -> DcaDetails {
    let recurring = input.dca_amount
        * f64::from(input.dca_period.periods_per_year())
        * f64::from(input.years);
    let total_invested = input.btc_amount * input.btc_price + recurring;
    let final_qty = input.btc_amount + btc_accumulated;
    DcaDetails {
        total_invested,
        btc_accumulated,
        average_cost: if final_qty > 0.0 {
            total_invested / final_qty
        } else {
            input.btc_price
        },
    }
}

fn non_negative(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

fn fraction(v: f64) -> f64 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
}

fn growth_rate(v: f64) -> f64 {
    if v.is_finite() { v.max(-0.99) } else { 0.0 }
}

// clamp into ranges the calculators handle
fn sanitize(input: &ScenarioInput) -> ScenarioInput {
    ScenarioInput {
        btc_price: non_negative(input.btc_price),
        btc_amount: non_negative(input.btc_amount),
        dca_amount: non_negative(input.dca_amount),
        cap_gains_tax_rate: fraction(input.cap_gains_tax_rate),
        home_price: non_negative(input.home_price),
        down_pct: fraction(input.down_pct),
        mortgage_rate: non_negative(input.mortgage_rate),
        property_tax_rate: non_negative(input.property_tax_rate),
        insurance_annual: non_negative(input.insurance_annual),
        hoa_monthly: non_negative(input.hoa_monthly),
        appreciation_rate: growth_rate(input.appreciation_rate),
        maintenance_rate: non_negative(input.maintenance_rate),
        closing_costs_pct: fraction(input.closing_costs_pct),
        monthly_rent: non_negative(input.monthly_rent),
        rent_growth_rate: growth_rate(input.rent_growth_rate),
        renters_insurance_annual: non_negative(input.renters_insurance_annual),
        moving_cost_per_move: non_negative(input.moving_cost_per_move),
        ..input.clone()
    }
}

use super::types::{RentDetails, ScenarioInput};

#[derive(Debug, Clone)]
pub struct RentProjection {
    pub series: Vec<f64>,
    pub details: RentDetails,
}

pub fn annual_rent_cost(year_index: u32, monthly_rent: f64, annual_growth: f64) -> f64 {
    monthly_rent * (1.0 + annual_growth).powi(year_index as i32) * 12.0
}

pub fn total_rent_paid(years: u32, monthly_rent: f64, annual_growth: f64) -> f64 {
    (0..years)
        .map(|y| annual_rent_cost(y, monthly_rent, annual_growth))
        .sum()
}

pub fn compute_rent_series(
    input: &ScenarioInput,
    price_at: &impl Fn(f64) -> f64,
    dca_cum: &[f64],
) -> RentProjection {
    let mut series = Vec::with_capacity(dca_cum.len());
    let mut details = RentDetails::default();

    for (i, dca_btc) in dca_cum.iter().enumerate() {
        let year = i as u32;
        if year > 0 {
            details.total_rent_paid +=
                annual_rent_cost(year - 1, input.monthly_rent, input.rent_growth_rate);
            details.total_insurance_paid += input.renters_insurance_annual;
            if input.moving_frequency_years > 0 && year % input.moving_frequency_years == 0 {
                details.total_moving_costs += input.moving_cost_per_move;
            }
        }

        let btc_value = (input.btc_amount + dca_btc) * price_at(f64::from(year));
        let costs =
            details.total_rent_paid + details.total_insurance_paid + details.total_moving_costs;
        series.push(btc_value - costs);
    }

    RentProjection { series, details }
}

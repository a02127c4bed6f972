use super::dca::dca_dollars_invested;
use super::mortgage::{amortize_by_year, monthly_payment};
use super::types::{BuyHouseDetails, ScenarioInput};

const MIN_SALE_PRICE: f64 = 1e-9;
// Proceeds this close to the required cash count as covering it.
const CASH_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct PurchaseProjection {
    pub series: Vec<f64>,
    pub details: BuyHouseDetails,
}

#[derive(Debug, Clone, Copy)]
struct PurchaseDay {
    closing_costs: f64,
    btc_sold: f64,
    btc_remaining: f64,
    tax_owed: f64,
    external_cash_needed: f64,
    principal: f64,
    monthly_payment: f64,
}

impl PurchaseDay {
    fn one_time_costs(&self) -> f64 {
        self.closing_costs + self.tax_owed + self.external_cash_needed
    }
}

fn home_value_at(input: &ScenarioInput, year: u32) -> f64 {
    input.home_price * (1.0 + input.appreciation_rate).powi(year as i32)
}

fn btc_held_at(input: &ScenarioInput, dca_cum: &[f64], year: u32) -> f64 {
    input.btc_amount + dca_cum.get(year as usize).copied().unwrap_or(0.0)
}

fn average_cost_basis(input: &ScenarioInput, dca_cum: &[f64], year: u32) -> f64 {
    let qty = btc_held_at(input, dca_cum, year);
    if qty <= 0.0 {
        return input.btc_price;
    }
    let spent = input.btc_amount * input.btc_price
        + dca_dollars_invested(input.dca_amount, input.dca_period, year);
    spent / qty
}

fn settle_purchase(
    input: &ScenarioInput,
    price_at: &impl Fn(f64) -> f64,
    dca_cum: &[f64],
    purchase_year: u32,
) -> PurchaseDay {
    let home_price = home_value_at(input, purchase_year);
    let down_payment = home_price * input.down_pct;
    let closing_costs = home_price * input.closing_costs_pct;
    let required_cash = down_payment + closing_costs;

    let sale_price = price_at(f64::from(purchase_year));
    let btc_held = btc_held_at(input, dca_cum, purchase_year);
    let mut btc_sold = btc_held.min(required_cash / sale_price.max(MIN_SALE_PRICE));

    let gain_per_btc = (sale_price - average_cost_basis(input, dca_cum, purchase_year)).max(0.0);
    let tax_owed = gain_per_btc * btc_sold * input.cap_gains_tax_rate;
    let proceeds = btc_sold * sale_price - tax_owed;

    let mut external_cash_needed = 0.0;
    if required_cash - proceeds > CASH_TOLERANCE {
        external_cash_needed = required_cash - proceeds;
        btc_sold = btc_held;
    }

    let principal = home_price * (1.0 - input.down_pct);
    PurchaseDay {
        closing_costs,
        btc_sold,
        btc_remaining: btc_held - btc_sold,
        tax_owed,
        external_cash_needed,
        principal,
        monthly_payment: monthly_payment(principal, input.mortgage_rate, input.term),
    }
}

/// Buyer's net worth by year. Before the purchase year the series tracks the
/// full BTC stack. From the purchase year on it is home equity plus the BTC
/// left after the sale (recurring buys continue) minus cumulative
/// non-recoverable costs. A purchase year beyond the horizon never happens.
pub fn compute_buy_series(
    input: &ScenarioInput,
    price_at: &impl Fn(f64) -> f64,
    dca_cum: &[f64],
) -> PurchaseProjection {
    let years = dca_cum.len().saturating_sub(1) as u32;
    let purchase_year = input.purchase_timing.purchase_year();

    if purchase_year > years {
        let principal = home_value_at(input, purchase_year) * (1.0 - input.down_pct);
        let series = (0..=years)
            .map(|y| btc_held_at(input, dca_cum, y) * price_at(f64::from(y)))
            .collect();
        return PurchaseProjection {
            series,
            details: BuyHouseDetails {
                purchase_executed: false,
                purchase_year,
                home_equity: 0.0,
                remaining_btc: btc_held_at(input, dca_cum, years),
                btc_sold_for_down: 0.0,
                tax_owed: 0.0,
                external_cash_needed: 0.0,
                total_non_recoverable_costs: 0.0,
                monthly_payment: monthly_payment(principal, input.mortgage_rate, input.term),
            },
        };
    }

    let day = settle_purchase(input, price_at, dca_cum, purchase_year);
    let months = input
        .term
        .saturating_mul(12)
        .min((years - purchase_year).saturating_mul(12));
    let loan = amortize_by_year(
        day.principal,
        input.mortgage_rate / 12.0,
        day.monthly_payment,
        months,
    );

    let mut series = Vec::with_capacity(years as usize + 1);
    let mut total_non_recoverable = 0.0;
    let mut home_equity = 0.0;
    for y in 0..=years {
        if y < purchase_year {
            series.push(btc_held_at(input, dca_cum, y) * price_at(f64::from(y)));
            continue;
        }

        let loan_year = (y - purchase_year) as usize;
        let (balance, interest) = if loan_year == 0 {
            (day.principal, 0.0)
        } else {
            // past the end of the term the loan is paid off
            (
                loan.balance_by_year.get(loan_year - 1).copied().unwrap_or(0.0),
                loan.interest_by_year.get(loan_year - 1).copied().unwrap_or(0.0),
            )
        };

        let home_value = home_value_at(input, y);
        home_equity = (home_value - balance).max(0.0);

        let mut yearly = input.property_tax_rate * home_value
            + input.insurance_annual
            + input.hoa_monthly * 12.0
            + input.maintenance_rate * home_value
            + interest;
        if y == purchase_year {
            yearly += day.one_time_costs();
        }
        total_non_recoverable += yearly;

        let btc_qty = (btc_held_at(input, dca_cum, y) - day.btc_sold).max(0.0);
        let btc_value = btc_qty * price_at(f64::from(y));
        series.push(home_equity + btc_value - total_non_recoverable);
    }

    PurchaseProjection {
        series,
        details: BuyHouseDetails {
            purchase_executed: true,
            purchase_year,
            home_equity,
            remaining_btc: day.btc_remaining,
            btc_sold_for_down: day.btc_sold,
            tax_owed: day.tax_owed,
            external_cash_needed: day.external_cash_needed,
            total_non_recoverable_costs: total_non_recoverable,
            monthly_payment: day.monthly_payment,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::sample_input;
    use crate::core::types::PurchaseTiming;

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn flat(price: f64) -> impl Fn(f64) -> f64 {
        move |_| price
    }

    #[test]
    fn series_matches_stack_before_purchase_year() {
        let mut input = sample_input();
        input.purchase_timing = PurchaseTiming::Year3;
        let price_at = |t: f64| 40_000.0 * 1.2_f64.powf(t);
        let dca_cum = vec![0.0; input.years as usize + 1];

        let projection = compute_buy_series(&input, &price_at, &dca_cum);
        for y in 0..3 {
            assert_eq!(
                projection.series[y],
                input.btc_amount * price_at(y as f64)
            );
        }
        assert!(projection.details.purchase_executed);
        assert_eq!(projection.details.purchase_year, 3);
    }

    #[test]
    fn well_funded_purchase_at_cost_keeps_remaining_btc() {
        let mut input = sample_input();
        input.years = 5;
        input.btc_amount = 10.0;
        input.btc_price = 50_000.0;
        input.home_price = 500_000.0;
        input.down_pct = 0.2;
        input.closing_costs_pct = 0.03;
        input.purchase_timing = PurchaseTiming::Now;

        let dca_cum = vec![0.0; 6];
        let projection = compute_buy_series(&input, &flat(50_000.0), &dca_cum);
        let d = projection.details;

        // no gain at today's price, so no tax and no shortfall
        assert_approx_tol(d.btc_sold_for_down, 115_000.0 / 50_000.0, 1e-12);
        assert_approx_tol(d.remaining_btc, 10.0 - 2.3, 1e-12);
        assert_eq!(d.tax_owed, 0.0);
        assert_eq!(d.external_cash_needed, 0.0);
        assert!(d.monthly_payment > 0.0);
    }

    #[test]
    fn shortfall_sells_everything_and_books_external_cash() {
        let mut input = sample_input();
        input.years = 3;
        input.btc_amount = 1.0;
        input.btc_price = 50_000.0;
        input.cap_gains_tax_rate = 0.0;
        input.home_price = 500_000.0;
        input.down_pct = 0.2;
        input.closing_costs_pct = 0.03;
        input.appreciation_rate = 0.0;
        input.purchase_timing = PurchaseTiming::Now;

        let dca_cum = vec![0.0; 4];
        let projection = compute_buy_series(&input, &flat(50_000.0), &dca_cum);
        let d = projection.details;

        assert_eq!(d.btc_sold_for_down, 1.0);
        assert_eq!(d.remaining_btc, 0.0);
        assert_approx_tol(d.external_cash_needed, 115_000.0 - 50_000.0, 1e-6);

        let first_year_costs = 500_000.0 * (input.property_tax_rate + input.maintenance_rate)
            + input.insurance_annual
            + input.hoa_monthly * 12.0
            + 15_000.0
            + 65_000.0;
        assert_approx_tol(projection.series[0], 100_000.0 - first_year_costs, 1e-6);
    }

    #[test]
    fn capital_gains_tax_uses_average_cost_basis() {
        let mut input = sample_input();
        input.years = 2;
        input.btc_amount = 10.0;
        input.btc_price = 10_000.0;
        input.dca_amount = 0.0;
        input.cap_gains_tax_rate = 0.25;
        input.home_price = 100_000.0;
        input.down_pct = 0.2;
        input.closing_costs_pct = 0.0;
        input.appreciation_rate = 0.0;
        input.purchase_timing = PurchaseTiming::Year1;

        let dca_cum = vec![0.0; 3];
        let price_at = |t: f64| if t >= 1.0 { 20_000.0 } else { 10_000.0 };
        let d = compute_buy_series(&input, &price_at, &dca_cum).details;

        // 20k needed at 20k/BTC: sell 1 BTC with a 10k gain
        assert_approx_tol(d.tax_owed, 2_500.0, 1e-9);
        assert_approx_tol(d.external_cash_needed, 2_500.0, 1e-9);
        assert_eq!(d.btc_sold_for_down, 10.0);
    }

    #[test]
    fn gains_include_recurring_buy_dollars_in_basis() {
        let mut input = sample_input();
        input.btc_amount = 1.0;
        input.btc_price = 100.0;
        input.dca_amount = 100.0;
        input.dca_period = crate::core::DcaPeriod::Quarterly;

        // 1 BTC at 100 plus 400 dollars buying 2 BTC
        let dca_cum = vec![0.0, 2.0, 4.0];
        assert_approx_tol(average_cost_basis(&input, &dca_cum, 1), 500.0 / 3.0, 1e-12);
        assert_approx_tol(average_cost_basis(&input, &dca_cum, 2), 900.0 / 5.0, 1e-12);
    }

    #[test]
    fn empty_stack_basis_falls_back_to_todays_price() {
        let mut input = sample_input();
        input.btc_amount = 0.0;
        assert_eq!(average_cost_basis(&input, &[0.0, 0.0], 1), input.btc_price);
    }

    #[test]
    fn purchase_beyond_horizon_never_diverges() {
        let mut input = sample_input();
        input.years = 3;
        input.purchase_timing = PurchaseTiming::Year5;
        let price_at = |t: f64| 30_000.0 + 1_000.0 * t;
        let dca_cum = vec![0.0, 0.1, 0.2, 0.3];

        let projection = compute_buy_series(&input, &price_at, &dca_cum);
        assert_eq!(projection.series.len(), 4);
        for (y, value) in projection.series.iter().enumerate() {
            assert_eq!(*value, (input.btc_amount + dca_cum[y]) * price_at(y as f64));
        }
        let d = projection.details;
        assert!(!d.purchase_executed);
        assert_eq!(d.btc_sold_for_down, 0.0);
        assert_eq!(d.total_non_recoverable_costs, 0.0);
        assert_approx_tol(d.remaining_btc, input.btc_amount + 0.3, 1e-12);
    }

    #[test]
    fn zero_home_price_does_not_sell_btc() {
        let mut input = sample_input();
        input.home_price = 0.0;
        let dca_cum = vec![0.0; input.years as usize + 1];
        let projection = compute_buy_series(&input, &flat(50_000.0), &dca_cum);

        assert!(projection.series.iter().all(|v| v.is_finite()));
        assert_eq!(projection.details.btc_sold_for_down, 0.0);
        assert_eq!(projection.details.monthly_payment, 0.0);
        assert_eq!(projection.details.home_equity, 0.0);
    }

    #[test]
    fn zero_btc_price_is_guarded() {
        let mut input = sample_input();
        input.btc_price = 0.0;
        let dca_cum = vec![0.0; input.years as usize + 1];
        let projection = compute_buy_series(&input, &flat(0.0), &dca_cum);

        assert!(projection.series.iter().all(|v| v.is_finite()));
        assert_eq!(projection.details.btc_sold_for_down, input.btc_amount);
    }

    #[test]
    fn equity_at_purchase_is_the_down_payment() {
        let mut input = sample_input();
        input.years = 4;
        input.home_price = 400_000.0;
        input.down_pct = 0.25;
        input.appreciation_rate = 0.0;
        input.purchase_timing = PurchaseTiming::Year2;
        let dca_cum = vec![0.0; 5];

        let projection = compute_buy_series(&input, &flat(50_000.0), &dca_cum);
        let later = compute_buy_series(
            &ScenarioInput {
                years: 2,
                ..input.clone()
            },
            &flat(50_000.0),
            &dca_cum[..3],
        );
        assert_approx_tol(later.details.home_equity, 100_000.0, 1e-6);
        assert!(projection.details.home_equity > 100_000.0);
    }

    #[test]
    fn mortgage_interest_is_charged_after_the_purchase_year() {
        let mut input = sample_input();
        input.years = 2;
        input.btc_amount = 100.0;
        input.cap_gains_tax_rate = 0.0;
        input.home_price = 300_000.0;
        input.down_pct = 0.2;
        input.closing_costs_pct = 0.0;
        input.appreciation_rate = 0.0;
        input.property_tax_rate = 0.0;
        input.insurance_annual = 0.0;
        input.hoa_monthly = 0.0;
        input.maintenance_rate = 0.0;
        input.mortgage_rate = 0.06;
        input.term = 30;
        input.purchase_timing = PurchaseTiming::Now;

        let dca_cum = vec![0.0; 3];
        let d = compute_buy_series(&input, &flat(50_000.0), &dca_cum).details;

        let payment = monthly_payment(240_000.0, 0.06, 30);
        let loan = amortize_by_year(240_000.0, 0.005, payment, 24);
        let expected: f64 = loan.interest_by_year.iter().sum();
        assert_approx_tol(d.total_non_recoverable_costs, expected, 1e-6);
        assert_approx_tol(
            d.home_equity,
            300_000.0 - loan.balance_by_year[1],
            1e-6,
        );
    }

    #[test]
    fn loan_paid_off_within_horizon_stops_interest() {
        let mut input = sample_input();
        input.years = 6;
        input.term = 2;
        input.appreciation_rate = 0.0;
        input.purchase_timing = PurchaseTiming::Now;
        let dca_cum = vec![0.0; 7];

        let d = compute_buy_series(&input, &flat(50_000.0), &dca_cum).details;
        assert_approx_tol(d.home_equity, input.home_price, 1e-6);
    }
}

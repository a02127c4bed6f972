mod dca;
mod engine;
mod models;
mod mortgage;
mod purchase;
mod rent;
mod types;

#[cfg(test)]
mod test_support;

pub use dca::{accumulate_dca_cum, dca_dollars_invested};
pub use engine::{run_scenario, run_scenario_from_year};
pub use models::{MAX_CONFIDENCE, MIN_CONFIDENCE, PriceCurve, clamp_confidence};
pub use mortgage::{
    AmortizationRow, YearlyAmortization, amortization_schedule, amortize_by_year, monthly_payment,
};
pub use purchase::{PurchaseProjection, compute_buy_series};
pub use rent::{RentProjection, annual_rent_cost, compute_rent_series, total_rent_paid};
pub use types::{
    BuyHouseDetails, DcaDetails, DcaPeriod, FinalYearSummary, PriceModel, PurchaseTiming,
    RentDetails, ScenarioInput, ScenarioOutput, ScenarioSummary, Strategy,
};

use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriceModel {
    PowerLaw,
    Saylor,
    LogRegression,
    StockToFlow,
    Metcalfe,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DcaPeriod {
    Weekly,
    Monthly,
    Quarterly,
}

impl DcaPeriod {
    pub fn periods_per_year(self) -> u32 {
        match self {
            DcaPeriod::Weekly => 52,
            DcaPeriod::Monthly => 12,
            DcaPeriod::Quarterly => 4,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum PurchaseTiming {
    #[serde(rename = "now")]
    Now,
    #[serde(rename = "year-1")]
    Year1,
    #[serde(rename = "year-2")]
    Year2,
    #[serde(rename = "year-3")]
    Year3,
    #[serde(rename = "year-5")]
    Year5,
}

impl PurchaseTiming {
    pub const ALL: [PurchaseTiming; 5] = [
        PurchaseTiming::Now,
        PurchaseTiming::Year1,
        PurchaseTiming::Year2,
        PurchaseTiming::Year3,
        PurchaseTiming::Year5,
    ];

    pub fn purchase_year(self) -> u32 {
        match self {
            PurchaseTiming::Now => 0,
            PurchaseTiming::Year1 => 1,
            PurchaseTiming::Year2 => 2,
            PurchaseTiming::Year3 => 3,
            PurchaseTiming::Year5 => 5,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Hold,
    Buy,
    Rent,
}

// rates are decimals (0.06 = 6%)
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioInput {
    pub years: u32,
    pub btc_price: f64,
    pub btc_amount: f64,
    pub model: PriceModel,
    pub model_confidence: f64,
    pub dca_amount: f64,
    pub dca_period: DcaPeriod,
    pub cap_gains_tax_rate: f64,
    pub home_price: f64,
    pub down_pct: f64,
    pub mortgage_rate: f64,
    pub term: u32,
    pub property_tax_rate: f64,
    pub insurance_annual: f64,
    pub hoa_monthly: f64,
    pub appreciation_rate: f64,
    pub maintenance_rate: f64,
    pub closing_costs_pct: f64,
    pub monthly_rent: f64,
    pub rent_growth_rate: f64,
    pub renters_insurance_annual: f64,
    pub moving_frequency_years: u32,
    pub moving_cost_per_move: f64,
    pub purchase_timing: PurchaseTiming,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioOutput {
    pub years_labels: Vec<i32>,
    pub hold_all_value: Vec<f64>,
    pub buy_house_value: Vec<f64>,
    pub rent_forever_value: Vec<f64>,
    pub opportunity_cost_series: Vec<f64>,
    pub summary: ScenarioSummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    pub model: PriceModel,
    pub purchase_year: u32,
    pub final_year: FinalYearSummary,
    pub buy_house_details: BuyHouseDetails,
    pub rent_details: RentDetails,
    pub dca_details: DcaDetails,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalYearSummary {
    pub hold_all: f64,
    pub buy_house: f64,
    pub rent_forever: f64,
    pub best_strategy: Strategy,
    pub opportunity_cost: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyHouseDetails {
    pub purchase_executed: bool,
    pub purchase_year: u32,
    pub home_equity: f64,
    pub remaining_btc: f64,
    pub btc_sold_for_down: f64,
    pub tax_owed: f64,
    pub external_cash_needed: f64,
    pub total_non_recoverable_costs: f64,
    pub monthly_payment: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentDetails {
    pub total_rent_paid: f64,
    pub total_moving_costs: f64,
    pub total_insurance_paid: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DcaDetails {
    pub total_invested: f64,
    pub btc_accumulated: f64,
    pub average_cost: f64,
}

use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    AmortizationRow, DcaPeriod, MAX_CONFIDENCE, MIN_CONFIDENCE, PriceModel, PurchaseTiming,
    ScenarioInput, ScenarioOutput, amortization_schedule, monthly_payment, run_scenario,
    run_scenario_from_year,
};

const MAX_YEARS: u32 = 100;
const MAX_TERM_YEARS: u32 = 50;
const MIN_START_YEAR: i32 = 1900;
const MAX_START_YEAR: i32 = 9999;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliPriceModel {
    PowerLaw,
    Saylor,
    #[value(alias = "log-reg")]
    LogRegression,
    #[value(alias = "s2f")]
    StockToFlow,
    Metcalfe,
}

impl From<CliPriceModel> for PriceModel {
    fn from(value: CliPriceModel) -> Self {
        match value {
            CliPriceModel::PowerLaw => PriceModel::PowerLaw,
            CliPriceModel::Saylor => PriceModel::Saylor,
            CliPriceModel::LogRegression => PriceModel::LogRegression,
            CliPriceModel::StockToFlow => PriceModel::StockToFlow,
            CliPriceModel::Metcalfe => PriceModel::Metcalfe,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliDcaPeriod {
    Weekly,
    Monthly,
    Quarterly,
}

impl From<CliDcaPeriod> for DcaPeriod {
    fn from(value: CliDcaPeriod) -> Self {
        match value {
            CliDcaPeriod::Weekly => DcaPeriod::Weekly,
            CliDcaPeriod::Monthly => DcaPeriod::Monthly,
            CliDcaPeriod::Quarterly => DcaPeriod::Quarterly,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliPurchaseTiming {
    Now,
    #[value(name = "year-1")]
    Year1,
    #[value(name = "year-2")]
    Year2,
    #[value(name = "year-3")]
    Year3,
    #[value(name = "year-5")]
    Year5,
}

impl From<CliPurchaseTiming> for PurchaseTiming {
    fn from(value: CliPurchaseTiming) -> Self {
        match value {
            CliPurchaseTiming::Now => PurchaseTiming::Now,
            CliPurchaseTiming::Year1 => PurchaseTiming::Year1,
            CliPurchaseTiming::Year2 => PurchaseTiming::Year2,
            CliPurchaseTiming::Year3 => PurchaseTiming::Year3,
            CliPurchaseTiming::Year5 => PurchaseTiming::Year5,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiPriceModel {
    #[serde(alias = "powerLaw", alias = "power_law")]
    PowerLaw,
    Saylor,
    #[serde(alias = "log-reg", alias = "logRegression", alias = "log_regression")]
    LogRegression,
    #[serde(alias = "s2f", alias = "stockToFlow", alias = "stock_to_flow")]
    StockToFlow,
    Metcalfe,
}

impl From<ApiPriceModel> for PriceModel {
    fn from(value: ApiPriceModel) -> Self {
        match value {
            ApiPriceModel::PowerLaw => PriceModel::PowerLaw,
            ApiPriceModel::Saylor => PriceModel::Saylor,
            ApiPriceModel::LogRegression => PriceModel::LogRegression,
            ApiPriceModel::StockToFlow => PriceModel::StockToFlow,
            ApiPriceModel::Metcalfe => PriceModel::Metcalfe,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ApiDcaPeriod {
    Weekly,
    Monthly,
    Quarterly,
}

impl From<ApiDcaPeriod> for DcaPeriod {
    fn from(value: ApiDcaPeriod) -> Self {
        match value {
            ApiDcaPeriod::Weekly => DcaPeriod::Weekly,
            ApiDcaPeriod::Monthly => DcaPeriod::Monthly,
            ApiDcaPeriod::Quarterly => DcaPeriod::Quarterly,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
enum ApiPurchaseTiming {
    #[serde(rename = "now")]
    Now,
    #[serde(rename = "year-1", alias = "year1")]
    Year1,
    #[serde(rename = "year-2", alias = "year2")]
    Year2,
    #[serde(rename = "year-3", alias = "year3")]
    Year3,
    #[serde(rename = "year-5", alias = "year5")]
    Year5,
}

impl From<ApiPurchaseTiming> for PurchaseTiming {
    fn from(value: ApiPurchaseTiming) -> Self {
        match value {
            ApiPurchaseTiming::Now => PurchaseTiming::Now,
            ApiPurchaseTiming::Year1 => PurchaseTiming::Year1,
            ApiPurchaseTiming::Year2 => PurchaseTiming::Year2,
            ApiPurchaseTiming::Year3 => PurchaseTiming::Year3,
            ApiPurchaseTiming::Year5 => PurchaseTiming::Year5,
        }
    }
}

// every field optional; rates are decimals
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ScenarioPayload {
    years: Option<u32>,
    start_year: Option<i32>,

    btc_price: Option<f64>,
    btc_amount: Option<f64>,
    model: Option<ApiPriceModel>,
    model_confidence: Option<f64>,
    dca_amount: Option<f64>,
    dca_period: Option<ApiDcaPeriod>,
    cap_gains_tax_rate: Option<f64>,

    home_price: Option<f64>,
    down_pct: Option<f64>,
    mortgage_rate: Option<f64>,
    term: Option<u32>,
    property_tax_rate: Option<f64>,
    insurance_annual: Option<f64>,
    hoa_monthly: Option<f64>,
    appreciation_rate: Option<f64>,
    maintenance_rate: Option<f64>,
    closing_costs_pct: Option<f64>,

    monthly_rent: Option<f64>,
    rent_growth_rate: Option<f64>,
    renters_insurance_annual: Option<f64>,
    moving_frequency_years: Option<u32>,
    moving_cost_per_move: Option<f64>,

    purchase_timing: Option<ApiPurchaseTiming>,
}

#[derive(Parser, Debug)]
#[command(
    name = "btchome",
    about = "Projects net worth for holding bitcoin, buying a home with it, or renting"
)]
struct Cli {
    #[arg(long, default_value_t = 10, help = "Projection horizon in years")]
    years: u32,
    #[arg(long, help = "Calendar year of the first label; defaults to the current year")]
    start_year: Option<i32>,
    #[arg(long, default_value_t = 50_000.0, help = "Current BTC price in USD")]
    btc_price: f64,
    #[arg(long, default_value_t = 1.0, help = "BTC held today")]
    btc_amount: f64,
    #[arg(long, value_enum, default_value_t = CliPriceModel::PowerLaw)]
    model: CliPriceModel,
    #[arg(
        long,
        default_value_t = 1.0,
        help = "Growth dampener (<1) or amplifier (>1) between 0.5 and 1.5"
    )]
    model_confidence: f64,
    #[arg(long, default_value_t = 0.0, help = "USD bought each DCA period")]
    dca_amount: f64,
    #[arg(long, value_enum, default_value_t = CliDcaPeriod::Monthly)]
    dca_period: CliDcaPeriod,
    #[arg(
        long,
        default_value_t = 20.0,
        help = "Capital gains tax rate on BTC sold for the purchase, in percent"
    )]
    cap_gains_tax_rate: f64,
    #[arg(long, default_value_t = 500_000.0, help = "Home price today in USD")]
    home_price: f64,
    #[arg(long, default_value_t = 20.0, help = "Down payment in percent")]
    down_pct: f64,
    #[arg(long, default_value_t = 6.5, help = "Annual mortgage rate in percent")]
    mortgage_rate: f64,
    #[arg(long, default_value_t = 30, help = "Mortgage term in years")]
    term: u32,
    #[arg(
        long,
        default_value_t = 1.2,
        help = "Annual property tax in percent of home value"
    )]
    property_tax_rate: f64,
    #[arg(long, default_value_t = 1_200.0)]
    insurance_annual: f64,
    #[arg(long, default_value_t = 0.0)]
    hoa_monthly: f64,
    #[arg(long, default_value_t = 3.0, help = "Annual home appreciation in percent")]
    appreciation_rate: f64,
    #[arg(
        long,
        default_value_t = 1.0,
        help = "Annual maintenance in percent of home value"
    )]
    maintenance_rate: f64,
    #[arg(long, default_value_t = 3.0, help = "Closing costs in percent of price")]
    closing_costs_pct: f64,
    #[arg(long, default_value_t = 2_500.0)]
    monthly_rent: f64,
    #[arg(long, default_value_t = 3.0, help = "Annual rent growth in percent")]
    rent_growth_rate: f64,
    #[arg(long, default_value_t = 300.0)]
    renters_insurance_annual: f64,
    #[arg(long, default_value_t = 3, help = "Years between moves; 0 never moves")]
    moving_frequency_years: u32,
    #[arg(long, default_value_t = 2_000.0)]
    moving_cost_per_move: f64,
    #[arg(long, value_enum, default_value_t = CliPurchaseTiming::Now)]
    purchase_timing: CliPurchaseTiming,
}

#[derive(Debug, Clone)]
struct ScenarioRequest {
    inputs: ScenarioInput,
    start_year: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AmortizationQuery {
    principal: f64,
    annual_rate: f64,
    term_years: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AmortizationResponse {
    monthly_payment: f64,
    total_interest: f64,
    schedule: Vec<AmortizationRow>,
}

#[derive(Debug, Serialize)]
struct ModelInfo {
    key: &'static str,
    name: &'static str,
    description: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn inputs_from_cli(cli: &Cli) -> ScenarioInput {
    ScenarioInput {
        years: cli.years,
        btc_price: cli.btc_price,
        btc_amount: cli.btc_amount,
        model: cli.model.into(),
        model_confidence: cli.model_confidence,
        dca_amount: cli.dca_amount,
        dca_period: cli.dca_period.into(),
        cap_gains_tax_rate: cli.cap_gains_tax_rate / 100.0,
        home_price: cli.home_price,
        down_pct: cli.down_pct / 100.0,
        mortgage_rate: cli.mortgage_rate / 100.0,
        term: cli.term,
        property_tax_rate: cli.property_tax_rate / 100.0,
        insurance_annual: cli.insurance_annual,
        hoa_monthly: cli.hoa_monthly,
        appreciation_rate: cli.appreciation_rate / 100.0,
        maintenance_rate: cli.maintenance_rate / 100.0,
        closing_costs_pct: cli.closing_costs_pct / 100.0,
        monthly_rent: cli.monthly_rent,
        rent_growth_rate: cli.rent_growth_rate / 100.0,
        renters_insurance_annual: cli.renters_insurance_annual,
        moving_frequency_years: cli.moving_frequency_years,
        moving_cost_per_move: cli.moving_cost_per_move,
        purchase_timing: cli.purchase_timing.into(),
    }
}

fn build_inputs(cli: Cli) -> Result<ScenarioInput, String> {
    validate_start_year(cli.start_year)?;
    let inputs = inputs_from_cli(&cli);
    validate_inputs(&inputs)?;
    Ok(inputs)
}

fn validate_start_year(start_year: Option<i32>) -> Result<(), String> {
    match start_year {
        Some(year) if !(MIN_START_YEAR..=MAX_START_YEAR).contains(&year) => Err(format!(
            "startYear must be between {MIN_START_YEAR} and {MAX_START_YEAR}"
        )),
        _ => Ok(()),
    }
}

fn validate_inputs(inputs: &ScenarioInput) -> Result<(), String> {
    if inputs.years == 0 || inputs.years > MAX_YEARS {
        return Err(format!("years must be between 1 and {MAX_YEARS}"));
    }

    if !inputs.btc_price.is_finite() || inputs.btc_price <= 0.0 {
        return Err("btcPrice must be > 0".to_string());
    }

    if !(MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&inputs.model_confidence) {
        return Err(format!(
            "modelConfidence must be between {MIN_CONFIDENCE} and {MAX_CONFIDENCE}"
        ));
    }

    if !(0.0..=0.5).contains(&inputs.cap_gains_tax_rate) {
        return Err("capGainsTaxRate must be between 0 and 0.5".to_string());
    }

    for (name, fraction) in [
        ("downPct", inputs.down_pct),
        ("closingCostsPct", inputs.closing_costs_pct),
        ("mortgageRate", inputs.mortgage_rate),
        ("propertyTaxRate", inputs.property_tax_rate),
        ("maintenanceRate", inputs.maintenance_rate),
    ] {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(format!("{name} must be between 0 and 1"));
        }
    }

    for (name, rate) in [
        ("appreciationRate", inputs.appreciation_rate),
        ("rentGrowthRate", inputs.rent_growth_rate),
    ] {
        if !rate.is_finite() || rate <= -1.0 {
            return Err(format!("{name} must be > -1"));
        }
    }

    for (name, amount) in [
        ("btcAmount", inputs.btc_amount),
        ("dcaAmount", inputs.dca_amount),
        ("homePrice", inputs.home_price),
        ("insuranceAnnual", inputs.insurance_annual),
        ("hoaMonthly", inputs.hoa_monthly),
        ("monthlyRent", inputs.monthly_rent),
        ("rentersInsuranceAnnual", inputs.renters_insurance_annual),
        ("movingCostPerMove", inputs.moving_cost_per_move),
    ] {
        if !amount.is_finite() || amount < 0.0 {
            return Err(format!("{name} must be >= 0"));
        }
    }

    if inputs.term == 0 || inputs.term > MAX_TERM_YEARS {
        return Err(format!("term must be between 1 and {MAX_TERM_YEARS}"));
    }

    Ok(())
}

fn default_cli_for_api() -> Cli {
    Cli {
        years: 10,
        start_year: None,
        btc_price: 50_000.0,
        btc_amount: 1.0,
        model: CliPriceModel::PowerLaw,
        model_confidence: 1.0,
        dca_amount: 0.0,
        dca_period: CliDcaPeriod::Monthly,
        cap_gains_tax_rate: 20.0,
        home_price: 500_000.0,
        down_pct: 20.0,
        mortgage_rate: 6.5,
        term: 30,
        property_tax_rate: 1.2,
        insurance_annual: 1_200.0,
        hoa_monthly: 0.0,
        appreciation_rate: 3.0,
        maintenance_rate: 1.0,
        closing_costs_pct: 3.0,
        monthly_rent: 2_500.0,
        rent_growth_rate: 3.0,
        renters_insurance_annual: 300.0,
        moving_frequency_years: 3,
        moving_cost_per_move: 2_000.0,
        purchase_timing: CliPurchaseTiming::Now,
    }
}

#[cfg(test)]
fn scenario_request_from_json(json: &str) -> Result<ScenarioRequest, String> {
    let payload = serde_json::from_str::<ScenarioPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    scenario_request_from_payload(payload)
}

fn scenario_request_from_payload(payload: ScenarioPayload) -> Result<ScenarioRequest, String> {
    validate_start_year(payload.start_year)?;
    let mut inputs = inputs_from_cli(&default_cli_for_api());

    if let Some(v) = payload.years {
        inputs.years = v;
    }

    if let Some(v) = payload.btc_price {
        inputs.btc_price = v;
    }
    if let Some(v) = payload.btc_amount {
        inputs.btc_amount = v;
    }
    if let Some(v) = payload.model {
        inputs.model = v.into();
    }
    if let Some(v) = payload.model_confidence {
        inputs.model_confidence = v;
    }
    if let Some(v) = payload.dca_amount {
        inputs.dca_amount = v;
    }
    if let Some(v) = payload.dca_period {
        inputs.dca_period = v.into();
    }
    if let Some(v) = payload.cap_gains_tax_rate {
        inputs.cap_gains_tax_rate = v;
    }

    if let Some(v) = payload.home_price {
        inputs.home_price = v;
    }
    if let Some(v) = payload.down_pct {
        inputs.down_pct = v;
    }
    if let Some(v) = payload.mortgage_rate {
        inputs.mortgage_rate = v;
    }
    if let Some(v) = payload.term {
        inputs.term = v;
    }
    if let Some(v) = payload.property_tax_rate {
        inputs.property_tax_rate = v;
    }
    if let Some(v) = payload.insurance_annual {
        inputs.insurance_annual = v;
    }
    if let Some(v) = payload.hoa_monthly {
        inputs.hoa_monthly = v;
    }
    if let Some(v) = payload.appreciation_rate {
        inputs.appreciation_rate = v;
    }
    if let Some(v) = payload.maintenance_rate {
        inputs.maintenance_rate = v;
    }
    if let Some(v) = payload.closing_costs_pct {
        inputs.closing_costs_pct = v;
    }

    if let Some(v) = payload.monthly_rent {
        inputs.monthly_rent = v;
    }
    if let Some(v) = payload.rent_growth_rate {
        inputs.rent_growth_rate = v;
    }
    if let Some(v) = payload.renters_insurance_annual {
        inputs.renters_insurance_annual = v;
    }
    if let Some(v) = payload.moving_frequency_years {
        inputs.moving_frequency_years = v;
    }
    if let Some(v) = payload.moving_cost_per_move {
        inputs.moving_cost_per_move = v;
    }

    if let Some(v) = payload.purchase_timing {
        inputs.purchase_timing = v.into();
    }

    validate_inputs(&inputs)?;
    Ok(ScenarioRequest {
        inputs,
        start_year: payload.start_year,
    })
}

fn project(request: &ScenarioRequest) -> ScenarioOutput {
    match request.start_year {
        Some(year) => run_scenario_from_year(&request.inputs, year),
        None => run_scenario(&request.inputs),
    }
}

pub fn run_cli() -> Result<(), String> {
    let cli = Cli::parse();
    let start_year = cli.start_year;
    let inputs = build_inputs(cli)?;
    let output = project(&ScenarioRequest { inputs, start_year });
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| format!("failed to encode scenario: {e}"))?;
    println!("{json}");
    Ok(())
}

fn router() -> Router {
    Router::new()
        .route(
            "/api/scenario",
            get(scenario_get_handler).post(scenario_post_handler),
        )
        .route("/api/models", get(models_handler))
        .route("/api/amortization", get(amortization_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("scenario API listening on http://{addr}");
    info!("local access: http://127.0.0.1:{port}/api/scenario");

    axum::serve(listener, router()).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn scenario_get_handler(
    payload: Result<Query<ScenarioPayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => scenario_handler_impl(payload).await,
        Err(rej) => reject("scenario query", &rej.body_text()),
    }
}

async fn scenario_post_handler(payload: Result<Json<ScenarioPayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => scenario_handler_impl(payload).await,
        Err(rej) => reject("scenario payload", &rej.body_text()),
    }
}

fn reject(what: &str, msg: &str) -> Response {
    warn!("rejected {what}: {msg}");
    error_response(StatusCode::BAD_REQUEST, msg)
}

async fn scenario_handler_impl(payload: ScenarioPayload) -> Response {
    let request = match scenario_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return reject("scenario payload", &msg),
    };

    json_response(StatusCode::OK, project(&request))
}

async fn models_handler() -> Response {
    let models: Vec<ModelInfo> = PriceModel::ALL
        .iter()
        .map(|m| ModelInfo {
            key: m.key(),
            name: m.display_name(),
            description: m.description(),
        })
        .collect();
    json_response(StatusCode::OK, models)
}

async fn amortization_handler(
    query: Result<Query<AmortizationQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rej) => return reject("amortization query", &rej.body_text()),
    };
    match build_amortization(&query) {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(msg) => reject("amortization query", &msg),
    }
}

fn build_amortization(query: &AmortizationQuery) -> Result<AmortizationResponse, String> {
    if !query.principal.is_finite() || query.principal < 0.0 {
        return Err("principal must be >= 0".to_string());
    }
    if !(0.0..=1.0).contains(&query.annual_rate) {
        return Err("annualRate must be between 0 and 1".to_string());
    }
    if query.term_years == 0 || query.term_years > MAX_TERM_YEARS {
        return Err(format!("termYears must be between 1 and {MAX_TERM_YEARS}"));
    }

    let schedule = amortization_schedule(query.principal, query.annual_rate, query.term_years);
    Ok(AmortizationResponse {
        monthly_payment: monthly_payment(query.principal, query.annual_rate, query.term_years),
        total_interest: schedule.iter().map(|row| row.interest).sum(),
        schedule,
    })
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

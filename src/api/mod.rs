use axum::{
    Router,
    extract::{Json, Query},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    MonteCarloConfig, NotionalAccountBalances, PortfolioAllocation, ProjectionSummary, Province,
    SalaryStrategy, TaxYearData, UserInputs, calculate_projection, compare_strategies,
    run_monte_carlo,
};

const MAX_PLANNING_HORIZON: u32 = 60;
const MAX_TRIALS: u32 = 10_000;
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 2000..=2100;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliSalaryStrategy {
    Dynamic,
    Fixed,
    DividendsOnly,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiSalaryStrategy {
    Dynamic,
    #[serde(alias = "fixedSalary", alias = "fixed_salary")]
    Fixed,
    #[serde(alias = "dividendsOnly", alias = "dividends_only")]
    DividendsOnly,
}

impl From<ApiSalaryStrategy> for CliSalaryStrategy {
    fn from(value: ApiSalaryStrategy) -> Self {
        match value {
            ApiSalaryStrategy::Dynamic => CliSalaryStrategy::Dynamic,
            ApiSalaryStrategy::Fixed => CliSalaryStrategy::Fixed,
            ApiSalaryStrategy::DividendsOnly => CliSalaryStrategy::DividendsOnly,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectionPayload {
    required_income: Option<f64>,
    inflate_required_income: Option<bool>,
    planning_horizon: Option<u32>,
    province: Option<String>,
    starting_year: Option<i32>,
    inflation_rate: Option<f64>,
    investment_return_rate: Option<f64>,
    corporate_investment_balance: Option<f64>,
    active_business_income: Option<f64>,
    cda_start: Option<f64>,
    erdtoh_start: Option<f64>,
    nrdtoh_start: Option<f64>,
    grip_start: Option<f64>,
    canadian_equity: Option<f64>,
    us_equity: Option<f64>,
    international_equity: Option<f64>,
    fixed_income: Option<f64>,
    salary_strategy: Option<ApiSalaryStrategy>,
    fixed_salary_amount: Option<f64>,
    rrsp_room_start: Option<f64>,
    contribute_to_rrsp: Option<bool>,
    contribute_to_tfsa: Option<bool>,
    trials: Option<u32>,
    volatility: Option<f64>,
    seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TaxDataQuery {
    year: Option<i32>,
    province: Option<String>,
    inflation: Option<f64>,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "ccpc-planner project",
    about = "Project salary and dividend draws from a Canadian-controlled private corporation"
)]
struct Cli {
    #[arg(long, help = "Annual income the owner needs before personal tax")]
    required_income: f64,
    #[arg(
        long,
        default_value_t = true,
        action = clap::ArgAction::Set,
        help = "Grow the required income with inflation each year"
    )]
    inflate_required_income: bool,
    #[arg(long, default_value_t = 5)]
    planning_horizon: u32,
    #[arg(long, default_value = "ON", help = "Two-letter province or territory code")]
    province: String,
    #[arg(long, default_value_t = 2025)]
    starting_year: i32,
    #[arg(long, default_value_t = 2.0, help = "Annual inflation in percent")]
    inflation_rate: f64,
    #[arg(
        long,
        default_value_t = 5.0,
        help = "Expected annual return on corporate investments in percent"
    )]
    investment_return_rate: f64,
    #[arg(long, default_value_t = 0.0)]
    corporate_investment_balance: f64,
    #[arg(long, default_value_t = 0.0)]
    active_business_income: f64,
    #[arg(long, default_value_t = 0.0)]
    cda_start: f64,
    #[arg(long, default_value_t = 0.0)]
    erdtoh_start: f64,
    #[arg(long, default_value_t = 0.0)]
    nrdtoh_start: f64,
    #[arg(long, default_value_t = 0.0)]
    grip_start: f64,
    #[arg(long, default_value_t = 30.0, help = "Canadian equity allocation in percent")]
    canadian_equity: f64,
    #[arg(long, default_value_t = 30.0, help = "US equity allocation in percent")]
    us_equity: f64,
    #[arg(
        long,
        default_value_t = 20.0,
        help = "International equity allocation in percent"
    )]
    international_equity: f64,
    #[arg(long, default_value_t = 20.0, help = "Fixed income allocation in percent")]
    fixed_income: f64,
    #[arg(long, value_enum, default_value_t = CliSalaryStrategy::Dynamic)]
    salary_strategy: CliSalaryStrategy,
    #[arg(long, help = "Annual salary when --salary-strategy is fixed")]
    fixed_salary_amount: Option<f64>,
    #[arg(long, default_value_t = 0.0)]
    rrsp_room_start: f64,
    #[arg(long)]
    contribute_to_rrsp: bool,
    #[arg(long)]
    contribute_to_tfsa: bool,
    #[arg(long, default_value_t = 500, help = "Monte Carlo trials")]
    trials: u32,
    #[arg(
        long,
        default_value_t = 10.0,
        help = "Annual return volatility in percent for Monte Carlo"
    )]
    volatility: f64,
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Debug)]
struct ApiRequest {
    inputs: UserInputs,
    monte_carlo: MonteCarloConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionResponse {
    province: Province,
    starting_year: i32,
    planning_horizon: u32,
    salary_strategy: SalaryStrategy,
    #[serde(flatten)]
    summary: ProjectionSummary,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn non_negative(value: f64, flag: &str) -> Result<f64, String> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("{flag} must be >= 0"))
    }
}

fn percent_in(value: f64, min: f64, max: f64, flag: &str) -> Result<f64, String> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(value / 100.0)
    } else {
        Err(format!("{flag} must be between {min} and {max}"))
    }
}

fn build_inputs(cli: &Cli) -> Result<UserInputs, String> {
    let required_income = non_negative(cli.required_income, "--required-income")?;

    if !(1..=MAX_PLANNING_HORIZON).contains(&cli.planning_horizon) {
        return Err(format!(
            "--planning-horizon must be between 1 and {MAX_PLANNING_HORIZON}"
        ));
    }

    if !YEAR_RANGE.contains(&cli.starting_year) {
        return Err(format!(
            "--starting-year must be between {} and {}",
            YEAR_RANGE.start(),
            YEAR_RANGE.end()
        ));
    }

    let province = cli
        .province
        .parse::<Province>()
        .map_err(|e| format!("--province: {e}"))?;

    let inflation_rate = percent_in(cli.inflation_rate, 0.0, 20.0, "--inflation-rate")?;
    let investment_return_rate = percent_in(
        cli.investment_return_rate,
        -50.0,
        50.0,
        "--investment-return-rate",
    )?;

    let allocation = PortfolioAllocation {
        canadian_equity: non_negative(cli.canadian_equity, "--canadian-equity")?,
        us_equity: non_negative(cli.us_equity, "--us-equity")?,
        international_equity: non_negative(cli.international_equity, "--international-equity")?,
        fixed_income: non_negative(cli.fixed_income, "--fixed-income")?,
    };
    if (allocation.total() - 100.0).abs() > 1e-6 {
        return Err(format!(
            "portfolio allocation flags must sum to 100, got {}",
            allocation.total()
        ));
    }

    let salary_strategy = match cli.salary_strategy {
        CliSalaryStrategy::Dynamic => SalaryStrategy::Dynamic,
        CliSalaryStrategy::DividendsOnly => SalaryStrategy::DividendsOnly,
        CliSalaryStrategy::Fixed => {
            let Some(salary) = cli.fixed_salary_amount else {
                return Err(
                    "--fixed-salary-amount is required when --salary-strategy is fixed"
                        .to_string(),
                );
            };
            SalaryStrategy::Fixed {
                salary: non_negative(salary, "--fixed-salary-amount")?,
            }
        }
    };

    Ok(UserInputs {
        required_income,
        inflate_required_income: cli.inflate_required_income,
        planning_horizon: cli.planning_horizon,
        province,
        starting_year: cli.starting_year,
        inflation_rate,
        investment_return_rate,
        corporate_investment_balance: non_negative(
            cli.corporate_investment_balance,
            "--corporate-investment-balance",
        )?,
        active_business_income: non_negative(
            cli.active_business_income,
            "--active-business-income",
        )?,
        starting_balances: NotionalAccountBalances {
            cda: non_negative(cli.cda_start, "--cda-start")?,
            erdtoh: non_negative(cli.erdtoh_start, "--erdtoh-start")?,
            nrdtoh: non_negative(cli.nrdtoh_start, "--nrdtoh-start")?,
            grip: non_negative(cli.grip_start, "--grip-start")?,
            ..NotionalAccountBalances::default()
        },
        allocation,
        salary_strategy,
        rrsp_room_start: non_negative(cli.rrsp_room_start, "--rrsp-room-start")?,
        contribute_to_rrsp: cli.contribute_to_rrsp,
        contribute_to_tfsa: cli.contribute_to_tfsa,
    })
}

fn build_monte_carlo_config(cli: &Cli) -> Result<MonteCarloConfig, String> {
    if !(1..=MAX_TRIALS).contains(&cli.trials) {
        return Err(format!("--trials must be between 1 and {MAX_TRIALS}"));
    }
    Ok(MonteCarloConfig {
        trials: cli.trials,
        volatility: percent_in(cli.volatility, 0.0, 100.0, "--volatility")?,
        seed: cli.seed,
    })
}

/// Parses `project` arguments and returns the projection as pretty JSON.
pub fn run_projection_cli<I, T>(args: I) -> Result<String, String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let inputs = build_inputs(&cli)?;
    let summary = calculate_projection(&inputs).map_err(|e| e.to_string())?;
    let response = build_projection_response(&inputs, summary);
    serde_json::to_string_pretty(&response).map_err(|e| format!("Failed to encode JSON: {e}"))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/projection",
            get(projection_get_handler).post(projection_post_handler),
        )
        .route(
            "/api/compare",
            get(compare_get_handler).post(compare_post_handler),
        )
        .route(
            "/api/monte-carlo",
            get(monte_carlo_get_handler).post(monte_carlo_post_handler),
        )
        .route("/api/tax-data", get(tax_data_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "CCPC planner HTTP API listening");
    info!("Local access: http://127.0.0.1:{port}/api/projection");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn projection_get_handler(Query(payload): Query<ProjectionPayload>) -> Response {
    projection_handler_impl(payload)
}

async fn projection_post_handler(Json(payload): Json<ProjectionPayload>) -> Response {
    projection_handler_impl(payload)
}

async fn compare_get_handler(Query(payload): Query<ProjectionPayload>) -> Response {
    compare_handler_impl(payload)
}

async fn compare_post_handler(Json(payload): Json<ProjectionPayload>) -> Response {
    compare_handler_impl(payload)
}

async fn monte_carlo_get_handler(Query(payload): Query<ProjectionPayload>) -> Response {
    monte_carlo_handler_impl(payload)
}

async fn monte_carlo_post_handler(Json(payload): Json<ProjectionPayload>) -> Response {
    monte_carlo_handler_impl(payload)
}

async fn tax_data_handler(Query(query): Query<TaxDataQuery>) -> Response {
    match tax_data_from_query(query) {
        Ok(data) => {
            info!(year = data.year, province = %data.province, "tax data served");
            json_response(StatusCode::OK, data)
        }
        Err(msg) => rejected(&msg),
    }
}

fn projection_handler_impl(payload: ProjectionPayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return rejected(&msg),
    };

    match calculate_projection(&request.inputs) {
        Ok(summary) => {
            info!(
                province = %request.inputs.province,
                years = summary.years.len(),
                "projection served"
            );
            json_response(
                StatusCode::OK,
                build_projection_response(&request.inputs, summary),
            )
        }
        Err(e) => rejected(&e.to_string()),
    }
}

fn compare_handler_impl(payload: ProjectionPayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return rejected(&msg),
    };

    match compare_strategies(&request.inputs) {
        Ok(comparison) => {
            info!(province = %request.inputs.province, "strategy comparison served");
            json_response(StatusCode::OK, comparison)
        }
        Err(e) => rejected(&e.to_string()),
    }
}

fn monte_carlo_handler_impl(payload: ProjectionPayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return rejected(&msg),
    };

    match run_monte_carlo(&request.inputs, &request.monte_carlo) {
        Ok(result) => {
            info!(trials = result.trials, "monte carlo served");
            json_response(StatusCode::OK, result)
        }
        Err(e) => rejected(&e.to_string()),
    }
}

fn rejected(msg: &str) -> Response {
    warn!(error = msg, "request rejected");
    error_response(StatusCode::BAD_REQUEST, msg)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
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

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<ProjectionPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: ProjectionPayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.required_income {
        cli.required_income = v;
    }
    if let Some(v) = payload.inflate_required_income {
        cli.inflate_required_income = v;
    }
    if let Some(v) = payload.planning_horizon {
        cli.planning_horizon = v;
    }
    if let Some(v) = payload.province {
        cli.province = v;
    }
    if let Some(v) = payload.starting_year {
        cli.starting_year = v;
    }
    if let Some(v) = payload.inflation_rate {
        cli.inflation_rate = v;
    }
    if let Some(v) = payload.investment_return_rate {
        cli.investment_return_rate = v;
    }

    if let Some(v) = payload.corporate_investment_balance {
        cli.corporate_investment_balance = v;
    }
    if let Some(v) = payload.active_business_income {
        cli.active_business_income = v;
    }
    if let Some(v) = payload.cda_start {
        cli.cda_start = v;
    }
    if let Some(v) = payload.erdtoh_start {
        cli.erdtoh_start = v;
    }
    if let Some(v) = payload.nrdtoh_start {
        cli.nrdtoh_start = v;
    }
    if let Some(v) = payload.grip_start {
        cli.grip_start = v;
    }

    if let Some(v) = payload.canadian_equity {
        cli.canadian_equity = v;
    }
    if let Some(v) = payload.us_equity {
        cli.us_equity = v;
    }
    if let Some(v) = payload.international_equity {
        cli.international_equity = v;
    }
    if let Some(v) = payload.fixed_income {
        cli.fixed_income = v;
    }

    if let Some(v) = payload.salary_strategy {
        cli.salary_strategy = v.into();
    }
    if payload.fixed_salary_amount.is_some() {
        cli.fixed_salary_amount = payload.fixed_salary_amount;
    }
    if let Some(v) = payload.rrsp_room_start {
        cli.rrsp_room_start = v;
    }
    if let Some(v) = payload.contribute_to_rrsp {
        cli.contribute_to_rrsp = v;
    }
    if let Some(v) = payload.contribute_to_tfsa {
        cli.contribute_to_tfsa = v;
    }

    if let Some(v) = payload.trials {
        cli.trials = v;
    }
    if let Some(v) = payload.volatility {
        cli.volatility = v;
    }
    if let Some(v) = payload.seed {
        cli.seed = v;
    }

    Ok(ApiRequest {
        inputs: build_inputs(&cli)?,
        monte_carlo: build_monte_carlo_config(&cli)?,
    })
}

fn tax_data_from_query(query: TaxDataQuery) -> Result<TaxYearData, String> {
    let year = query.year.unwrap_or(2025);
    if !YEAR_RANGE.contains(&year) {
        return Err(format!(
            "year must be between {} and {}",
            YEAR_RANGE.start(),
            YEAR_RANGE.end()
        ));
    }
    let inflation = percent_in(query.inflation.unwrap_or(2.0), 0.0, 20.0, "inflation")?;
    let code = query.province.as_deref().unwrap_or("ON");
    TaxYearData::for_code(year, code, inflation).map_err(|e| format!("province: {e}"))
}

fn default_cli_for_api() -> Cli {
    Cli {
        required_income: 100_000.0,
        inflate_required_income: true,
        planning_horizon: 5,
        province: "ON".to_string(),
        starting_year: 2025,
        inflation_rate: 2.0,
        investment_return_rate: 5.0,
        corporate_investment_balance: 500_000.0,
        active_business_income: 0.0,
        cda_start: 0.0,
        erdtoh_start: 0.0,
        nrdtoh_start: 0.0,
        grip_start: 0.0,
        canadian_equity: 30.0,
        us_equity: 30.0,
        international_equity: 20.0,
        fixed_income: 20.0,
        salary_strategy: CliSalaryStrategy::Dynamic,
        fixed_salary_amount: None,
        rrsp_room_start: 0.0,
        contribute_to_rrsp: false,
        contribute_to_tfsa: false,
        trials: 500,
        volatility: 10.0,
        seed: 42,
    }
}

fn build_projection_response(inputs: &UserInputs, summary: ProjectionSummary) -> ProjectionResponse {
    ProjectionResponse {
        province: inputs.province,
        starting_year: inputs.starting_year,
        planning_horizon: inputs.planning_horizon,
        salary_strategy: inputs.salary_strategy,
        summary,
    }
}

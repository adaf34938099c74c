use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::corporate::{CorporateTax, InvestmentReturn};
use super::error::ProjectionError;
use super::ledger::{NotionalAccountBalances, NotionalAccountSnapshot};
use super::payroll::PayrollDeductions;
use super::personal::PersonalTax;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize)]
pub enum Province {
    #[serde(rename = "AB")]
    Alberta,
    #[serde(rename = "BC")]
    BritishColumbia,
    #[serde(rename = "MB")]
    Manitoba,
    #[serde(rename = "NB")]
    NewBrunswick,
    #[serde(rename = "NL")]
    NewfoundlandAndLabrador,
    #[serde(rename = "NS")]
    NovaScotia,
    #[serde(rename = "NT")]
    NorthwestTerritories,
    #[serde(rename = "NU")]
    Nunavut,
    #[serde(rename = "ON")]
    Ontario,
    #[serde(rename = "PE")]
    PrinceEdwardIsland,
    #[serde(rename = "QC")]
    Quebec,
    #[serde(rename = "SK")]
    Saskatchewan,
    #[serde(rename = "YT")]
    Yukon,
}

impl Province {
    pub const ALL: [Province; 13] = [
        Province::Alberta,
        Province::BritishColumbia,
        Province::Manitoba,
        Province::NewBrunswick,
        Province::NewfoundlandAndLabrador,
        Province::NovaScotia,
        Province::NorthwestTerritories,
        Province::Nunavut,
        Province::Ontario,
        Province::PrinceEdwardIsland,
        Province::Quebec,
        Province::Saskatchewan,
        Province::Yukon,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Province::Alberta => "AB",
            Province::BritishColumbia => "BC",
            Province::Manitoba => "MB",
            Province::NewBrunswick => "NB",
            Province::NewfoundlandAndLabrador => "NL",
            Province::NovaScotia => "NS",
            Province::NorthwestTerritories => "NT",
            Province::Nunavut => "NU",
            Province::Ontario => "ON",
            Province::PrinceEdwardIsland => "PE",
            Province::Quebec => "QC",
            Province::Saskatchewan => "SK",
            Province::Yukon => "YT",
        }
    }
}

impl FromStr for Province {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Province::ALL
            .into_iter()
            .find(|p| p.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| ProjectionError::UnknownProvince(code.to_string()))
    }
}

impl fmt::Display for Province {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SalaryStrategy {
    Dynamic,
    Fixed { salary: f64 },
    DividendsOnly,
}

/// Percentages across the four asset classes; must sum to 100.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PortfolioAllocation {
    pub canadian_equity: f64,
    pub us_equity: f64,
    pub international_equity: f64,
    pub fixed_income: f64,
}

impl PortfolioAllocation {
    pub fn total(&self) -> f64 {
        self.shares().iter().sum()
    }

    pub fn shares(&self) -> [f64; 4] {
        [
            self.canadian_equity,
            self.us_equity,
            self.international_equity,
            self.fixed_income,
        ]
    }
}

impl Default for PortfolioAllocation {
    fn default() -> Self {
        Self {
            canadian_equity: 30.0,
            us_equity: 30.0,
            international_equity: 20.0,
            fixed_income: 20.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UserInputs {
    pub required_income: f64,
    pub inflate_required_income: bool,
    pub planning_horizon: u32,
    pub province: Province,
    pub starting_year: i32,
    pub inflation_rate: f64,
    pub investment_return_rate: f64,
    pub corporate_investment_balance: f64,
    pub active_business_income: f64,
    /// Opening notional accounts. The corporate investments entry is taken
    /// from `corporate_investment_balance`.
    pub starting_balances: NotionalAccountBalances,
    pub allocation: PortfolioAllocation,
    pub salary_strategy: SalaryStrategy,
    pub rrsp_room_start: f64,
    pub contribute_to_rrsp: bool,
    pub contribute_to_tfsa: bool,
}

impl Default for UserInputs {
    fn default() -> Self {
        Self {
            required_income: 100_000.0,
            inflate_required_income: true,
            planning_horizon: 5,
            province: Province::Ontario,
            starting_year: 2025,
            inflation_rate: 0.02,
            investment_return_rate: 0.05,
            corporate_investment_balance: 500_000.0,
            active_business_income: 0.0,
            starting_balances: NotionalAccountBalances::default(),
            allocation: PortfolioAllocation::default(),
            salary_strategy: SalaryStrategy::Dynamic,
            rrsp_room_start: 0.0,
            contribute_to_rrsp: false,
            contribute_to_tfsa: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyResult {
    pub year: i32,
    pub year_index: u32,
    pub income_need: f64,
    pub salary: f64,
    pub capital_dividends: f64,
    pub eligible_dividends: f64,
    pub non_eligible_dividends: f64,
    pub total_dividends: f64,
    pub total_compensation: f64,
    pub payroll: PayrollDeductions,
    pub investment_return: InvestmentReturn,
    pub notional_accounts: NotionalAccountSnapshot,
    pub corporate_tax: CorporateTax,
    pub personal_tax: PersonalTax,
    pub total_tax: f64,
    pub after_tax_income: f64,
    pub effective_integrated_rate: f64,
    pub rrsp_room_generated: f64,
    pub rrsp_contribution: f64,
    pub tfsa_contribution: f64,
    pub corporate_balance_start: f64,
    pub corporate_balance_end: f64,
    /// Payouts and taxes the corporate investments could not cover.
    pub unfunded_draw: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub total_compensation: f64,
    pub total_salary: f64,
    pub total_dividends: f64,
    pub total_personal_tax: f64,
    pub total_corporate_tax: f64,
    pub total_tax: f64,
    pub total_after_tax_income: f64,
    pub effective_tax_rate: f64,
    pub effective_integrated_rate: f64,
    pub final_corporate_balance: f64,
    pub total_rrsp_room_generated: f64,
    pub total_unfunded_draw: f64,
    pub years: Vec<YearlyResult>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyComparison {
    pub fixed_salary: f64,
    pub dynamic: ProjectionSummary,
    pub fixed: ProjectionSummary,
    pub dividends_only: ProjectionSummary,
}

mod corporate;
mod engine;
mod error;
mod ledger;
mod monte_carlo;
mod payroll;
mod personal;
mod strategy;
mod tax_data;
mod tax_tables;
mod types;

pub use corporate::{CorporateTax, InvestmentReturn};
pub use engine::{calculate_projection, compare_strategies, summarize};
pub use error::ProjectionError;
pub use ledger::{AccountMovement, NotionalAccountBalances, NotionalAccountSnapshot};
pub use monte_carlo::{DistributionStats, MonteCarloConfig, MonteCarloResult, run_monte_carlo};
pub use payroll::{PayrollDeductions, payroll_deductions};
pub use personal::{PersonalIncome, PersonalTax, bracket_tax, personal_tax};
pub use tax_data::{
    Bracket, HealthLevy, LATEST_VERIFIED_YEAR, TaxDataCache, TaxYearData, resolve_tax_year_data,
    resolve_tax_year_data_from,
};
pub use types::{
    PortfolioAllocation, ProjectionSummary, Province, SalaryStrategy, StrategyComparison,
    UserInputs, YearlyResult,
};

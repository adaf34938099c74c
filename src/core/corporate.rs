use serde::Serialize;

use super::PortfolioAllocation;
use super::ledger::NotionalAccountBalances;
use super::tax_data::CorporateRates;

// Share of each equity class's positive return paid out as income; the rest
// is capital gain.
const CANADIAN_EQUITY_DIVIDEND_SHARE: f64 = 0.40;
const US_EQUITY_FOREIGN_INCOME_SHARE: f64 = 0.25;
const INTERNATIONAL_EQUITY_FOREIGN_INCOME_SHARE: f64 = 0.40;

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentReturn {
    pub total: f64,
    pub canadian_dividends: f64,
    pub foreign_income: f64,
    pub interest: f64,
    pub capital_gains: f64,
    pub realized_gains: f64,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct InvestmentTaxation {
    pub aggregate_investment_income: f64,
    pub investment_tax: f64,
    pub part_iv_tax: f64,
    pub additions: NotionalAccountBalances,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ActiveBusinessTax {
    pub taxable_income: f64,
    pub small_business_limit: f64,
    pub small_business_income: f64,
    pub general_rate_income: f64,
    pub tax: f64,
    pub grip_addition: f64,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorporateTax {
    pub active_income: f64,
    pub small_business_limit: f64,
    pub small_business_income: f64,
    pub general_rate_income: f64,
    pub active_tax: f64,
    pub aggregate_investment_income: f64,
    pub investment_tax: f64,
    pub part_iv_tax: f64,
    pub total: f64,
}

impl CorporateTax {
    pub fn combine(active: &ActiveBusinessTax, investment: &InvestmentTaxation) -> Self {
        Self {
            active_income: active.taxable_income,
            small_business_limit: active.small_business_limit,
            small_business_income: active.small_business_income,
            general_rate_income: active.general_rate_income,
            active_tax: active.tax,
            aggregate_investment_income: investment.aggregate_investment_income,
            investment_tax: investment.investment_tax,
            part_iv_tax: investment.part_iv_tax,
            total: active.tax + investment.investment_tax + investment.part_iv_tax,
        }
    }
}

pub fn investment_return(
    balance: f64,
    rate: f64,
    allocation: &PortfolioAllocation,
    rates: &CorporateRates,
) -> InvestmentReturn {
    let balance = balance.max(0.0);
    let class_return = |percent: f64| balance * (percent.max(0.0) / 100.0) * rate;

    let canadian = class_return(allocation.canadian_equity);
    let us = class_return(allocation.us_equity);
    let international = class_return(allocation.international_equity);
    let fixed_income = class_return(allocation.fixed_income);

    let canadian_dividends = canadian.max(0.0) * CANADIAN_EQUITY_DIVIDEND_SHARE;
    let foreign_income = us.max(0.0) * US_EQUITY_FOREIGN_INCOME_SHARE
        + international.max(0.0) * INTERNATIONAL_EQUITY_FOREIGN_INCOME_SHARE;
    let interest = fixed_income.max(0.0);
    let total = canadian + us + international + fixed_income;
    let capital_gains = total - canadian_dividends - foreign_income - interest;

    InvestmentReturn {
        total,
        canadian_dividends,
        foreign_income,
        interest,
        capital_gains,
        realized_gains: capital_gains.max(0.0) * rates.capital_gains_realization,
    }
}

pub fn tax_investment_income(ret: &InvestmentReturn, rates: &CorporateRates) -> InvestmentTaxation {
    let taxable_gains = ret.realized_gains * rates.capital_gains_inclusion;
    let aggregate_investment_income = ret.interest + ret.foreign_income + taxable_gains;
    let part_iv_tax = ret.canadian_dividends * rates.part_iv_rate;

    InvestmentTaxation {
        aggregate_investment_income,
        investment_tax: aggregate_investment_income * rates.investment_rate(),
        part_iv_tax,
        additions: NotionalAccountBalances {
            cda: ret.realized_gains - taxable_gains,
            erdtoh: part_iv_tax,
            nrdtoh: aggregate_investment_income * rates.refundable_investment_rate,
            grip: ret.canadian_dividends,
            corporate_investments: 0.0,
        },
    }
}

/// Business limit after the passive-income grind: $5 per $1 of investment
/// income over the threshold.
pub fn ground_business_limit(limit: f64, investment_income: f64, rates: &CorporateRates) -> f64 {
    let excess = (investment_income - rates.passive_grind_threshold).max(0.0);
    (limit - rates.passive_grind_factor * excess).max(0.0)
}

pub fn active_business_tax(
    taxable_income: f64,
    investment_income: f64,
    rates: &CorporateRates,
) -> ActiveBusinessTax {
    let income = taxable_income.max(0.0);

    let federal_limit = ground_business_limit(rates.federal_sbd_limit, investment_income, rates);
    let provincial_limit = if rates.provincial_grind_applies {
        ground_business_limit(rates.provincial_sbd_limit, investment_income, rates)
    } else {
        rates.provincial_sbd_limit
    };

    let federal_small = income.min(federal_limit);
    let provincial_small = income.min(provincial_limit);
    let tax = federal_small * rates.federal_small_business_rate
        + (income - federal_small) * rates.federal_general_rate
        + provincial_small * rates.provincial_small_business_rate
        + (income - provincial_small) * rates.provincial_general_rate;

    let general_rate_income = income - federal_small;
    ActiveBusinessTax {
        taxable_income: income,
        small_business_limit: federal_limit,
        small_business_income: federal_small,
        general_rate_income,
        tax,
        grip_addition: general_rate_income * rates.grip_general_rate_factor,
    }
}

use serde::Serialize;

use super::payroll::PayrollDeductions;
use super::tax_data::{Bracket, HealthPremiumBand, TaxYearData};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PersonalIncome {
    pub salary: f64,
    pub eligible_dividends: f64,
    pub non_eligible_dividends: f64,
    pub capital_dividends: f64,
    pub rrsp_deduction: f64,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalTax {
    pub taxable_income: f64,
    pub federal: f64,
    pub provincial: f64,
    pub surtax: f64,
    pub health_premium: f64,
    pub total: f64,
}

/// Marginal-bracket tax. `income` must already be clamped to >= 0.
pub fn bracket_tax(income: f64, brackets: &[Bracket]) -> f64 {
    let mut tax = 0.0;
    for (idx, bracket) in brackets.iter().enumerate() {
        if income <= bracket.threshold {
            break;
        }
        let next = brackets
            .get(idx + 1)
            .map(|b| b.threshold)
            .unwrap_or(f64::INFINITY);
        tax += bracket.rate * (income.min(next) - bracket.threshold);
        if income <= next {
            break;
        }
    }
    tax
}

pub fn surtax(provincial_tax: f64, tiers: &[Bracket]) -> f64 {
    tiers
        .iter()
        .map(|tier| tier.rate * (provincial_tax - tier.threshold).max(0.0))
        .sum()
}

pub fn health_premium(taxable_income: f64, bands: &[HealthPremiumBand]) -> f64 {
    bands
        .iter()
        .rev()
        .find(|band| taxable_income > band.income_from)
        .map(|band| {
            (band.base + band.rate * (taxable_income - band.income_from)).min(band.cap)
        })
        .unwrap_or(0.0)
}

pub fn personal_tax(
    income: &PersonalIncome,
    payroll: &PayrollDeductions,
    data: &TaxYearData,
) -> PersonalTax {
    let salary = income.salary.max(0.0);
    let grossed_eligible =
        income.eligible_dividends.max(0.0) * (1.0 + data.dividends.eligible_gross_up);
    let grossed_non_eligible =
        income.non_eligible_dividends.max(0.0) * (1.0 + data.dividends.non_eligible_gross_up);

    // Base pension contributions earn a credit; the enhanced part and the
    // second tier are deducted from income instead.
    let base_pension = if data.cpp.rate > 0.0 {
        payroll.cpp_employee * data.cpp.base_rate / data.cpp.rate
    } else {
        0.0
    };
    let enhanced_pension = payroll.cpp_employee - base_pension;
    let deductions = enhanced_pension + payroll.cpp2_employee + income.rrsp_deduction.max(0.0);

    let taxable_income =
        (salary + grossed_eligible + grossed_non_eligible - deductions).max(0.0);
    let payroll_credits = base_pension + payroll.ei_employee + payroll.qpip_employee;

    let federal_credits = data.federal_basic_personal_amount(taxable_income)
        + payroll_credits
        + data.canada_employment_amount.min(salary);
    let federal_dtc = grossed_eligible * data.federal.eligible_dividend_credit_rate
        + grossed_non_eligible * data.federal.non_eligible_dividend_credit_rate;
    let federal_basic = (bracket_tax(taxable_income, &data.federal.brackets)
        - federal_credits * data.federal.lowest_rate()
        - federal_dtc)
        .max(0.0);
    let federal = federal_basic * (1.0 - data.quebec_abatement);

    let provincial_credits = data.provincial.basic_personal_amount + payroll_credits;
    let provincial_dtc = grossed_eligible * data.provincial.eligible_dividend_credit_rate
        + grossed_non_eligible * data.provincial.non_eligible_dividend_credit_rate;
    let provincial = (bracket_tax(taxable_income, &data.provincial.brackets)
        - provincial_credits * data.provincial.lowest_rate()
        - provincial_dtc)
        .max(0.0);

    let surtax = surtax(provincial, &data.surtax);
    let health_premium = health_premium(taxable_income, &data.health_premium);

    PersonalTax {
        taxable_income,
        federal,
        provincial,
        surtax,
        health_premium,
        total: federal + provincial + surtax + health_premium,
    }
}

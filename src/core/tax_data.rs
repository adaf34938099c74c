use std::collections::BTreeMap;

use serde::Serialize;

use super::Province;
use super::error::ProjectionError;
use super::tax_tables::{
    CAPITAL_GAINS_INCLUSION, CAPITAL_GAINS_REALIZATION, EI_EMPLOYER_MULTIPLIER,
    ELIGIBLE_GROSS_UP, FEDERAL_GENERAL_RATE, FEDERAL_INVESTMENT_RATE, FEDERAL_SBD_LIMIT,
    FEDERAL_SMALL_BUSINESS_RATE, FEDERAL_TABLES, GRIP_GENERAL_RATE_FACTOR, Indexing,
    NON_ELIGIBLE_GROSS_UP, PART_IV_RATE, PASSIVE_GRIND_FACTOR, PASSIVE_GRIND_THRESHOLD,
    QUEBEC_ABATEMENT, REFUNDABLE_INVESTMENT_RATE, RRSP_EARNED_INCOME_RATE, TableBracket,
    YAMPE_FACTOR, provincial_tables,
};

pub const LATEST_VERIFIED_YEAR: i32 = 2025;

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bracket {
    pub threshold: f64,
    pub rate: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum HealthLevy {
    None,
    OverExemption {
        exemption: f64,
        rate: f64,
    },
    Notch {
        exemption: f64,
        upper_threshold: f64,
        notch_rate: f64,
        flat_rate: f64,
    },
    Flat {
        rate: f64,
    },
}

/// Premium is `min(cap, base + rate * (income - income_from))` in the highest
/// band whose `income_from` is below income.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthPremiumBand {
    pub income_from: f64,
    pub base: f64,
    pub rate: f64,
    pub cap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalSchedule {
    pub brackets: Vec<Bracket>,
    pub basic_personal_amount: f64,
    pub eligible_dividend_credit_rate: f64,
    pub non_eligible_dividend_credit_rate: f64,
}

impl PersonalSchedule {
    pub fn lowest_rate(&self) -> f64 {
        self.brackets.first().map(|b| b.rate).unwrap_or(0.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendRates {
    pub eligible_gross_up: f64,
    pub non_eligible_gross_up: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorporateRates {
    pub federal_small_business_rate: f64,
    pub federal_general_rate: f64,
    pub provincial_small_business_rate: f64,
    pub provincial_general_rate: f64,
    pub federal_investment_rate: f64,
    pub refundable_investment_rate: f64,
    pub part_iv_rate: f64,
    pub federal_sbd_limit: f64,
    pub provincial_sbd_limit: f64,
    pub provincial_grind_applies: bool,
    pub passive_grind_threshold: f64,
    pub passive_grind_factor: f64,
    pub grip_general_rate_factor: f64,
    pub capital_gains_realization: f64,
    pub capital_gains_inclusion: f64,
}

impl CorporateRates {
    pub fn investment_rate(&self) -> f64 {
        self.federal_investment_rate + self.provincial_general_rate
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PensionContribution {
    pub rate: f64,
    pub base_rate: f64,
    pub basic_exemption: f64,
    pub ceiling: f64,
    pub max_contribution: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondTierContribution {
    pub rate: f64,
    pub floor: f64,
    pub ceiling: f64,
    pub max_contribution: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsurancePremium {
    pub rate: f64,
    pub max_insurable: f64,
    pub max_contribution: f64,
    pub employer_multiplier: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentalInsurance {
    pub employee_rate: f64,
    pub employer_rate: f64,
    pub max_insurable: f64,
    pub max_employee_contribution: f64,
    pub max_employer_contribution: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsLimits {
    pub rrsp_limit: f64,
    pub rrsp_earned_income_rate: f64,
    pub tfsa_limit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxYearData {
    pub year: i32,
    pub province: Province,
    pub federal: PersonalSchedule,
    pub federal_bpa_min: f64,
    pub canada_employment_amount: f64,
    pub quebec_abatement: f64,
    pub provincial: PersonalSchedule,
    pub surtax: Vec<Bracket>,
    pub health_premium: Vec<HealthPremiumBand>,
    pub dividends: DividendRates,
    pub corporate: CorporateRates,
    pub cpp: PensionContribution,
    pub cpp2: SecondTierContribution,
    pub ei: InsurancePremium,
    pub qpip: Option<ParentalInsurance>,
    pub employer_health_levy: HealthLevy,
    pub savings: SavingsLimits,
}

impl TaxYearData {
    pub fn for_code(year: i32, code: &str, inflation: f64) -> Result<Self, ProjectionError> {
        let province = code.parse::<Province>()?;
        Ok(resolve_tax_year_data(year, province, inflation))
    }

    /// Federal BPA, phased down from the max to the min across the
    /// fourth bracket.
    pub fn federal_basic_personal_amount(&self, net_income: f64) -> f64 {
        let max = self.federal.basic_personal_amount;
        let (Some(start), Some(end)) = (self.federal.brackets.get(3), self.federal.brackets.get(4))
        else {
            return max;
        };
        let (start, end) = (start.threshold, end.threshold);
        if net_income <= start || end <= start {
            return max;
        }
        if net_income >= end {
            return self.federal_bpa_min;
        }
        let share = (net_income - start) / (end - start);
        max - (max - self.federal_bpa_min) * share
    }
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn resolve_tax_year_data(year: i32, province: Province, inflation: f64) -> TaxYearData {
    resolve_tax_year_data_from(year, province, inflation, None)
}

/// Like `resolve_tax_year_data`, but `base_year` pins the known table that
/// future years compound from.
pub fn resolve_tax_year_data_from(
    year: i32,
    province: Province,
    inflation: f64,
    base_year: Option<i32>,
) -> TaxYearData {
    let inflation = if inflation.is_finite() {
        inflation.max(0.0)
    } else {
        0.0
    };

    let (federal, federal_forward) = select_table(&FEDERAL_TABLES, |t| t.year, year, base_year);
    let (provincial, provincial_forward) =
        select_table(provincial_tables(province), |t| t.year, year, base_year);

    let fed = Indexer::new(inflation, federal_forward);
    let prov = Indexer::new(inflation, provincial_forward);
    let is_quebec = province == Province::Quebec;

    let pension = if is_quebec { federal.qpp } else { federal.cpp };
    let ympe = fed.index(pension.ympe, Indexing::Down100);
    let yampe = if fed.years_forward == 0 {
        pension.yampe
    } else {
        Indexing::Down100.apply(ympe * YAMPE_FACTOR, 1.0)
    };
    let basic_exemption = pension.basic_exemption;

    let ei_rate = if is_quebec {
        federal.ei_quebec_rate
    } else {
        federal.ei_rate
    };
    let ei_max_insurable = fed.index(federal.ei_max_insurable, Indexing::Nearest100);

    let qpip = is_quebec.then(|| {
        let max_insurable = fed.index(federal.qpip_max_insurable, Indexing::Nearest500);
        ParentalInsurance {
            employee_rate: federal.qpip_employee_rate,
            employer_rate: federal.qpip_employer_rate,
            max_insurable,
            max_employee_contribution: round_cents(federal.qpip_employee_rate * max_insurable),
            max_employer_contribution: round_cents(federal.qpip_employer_rate * max_insurable),
        }
    });

    TaxYearData {
        year,
        province,
        federal: PersonalSchedule {
            brackets: index_brackets(federal.brackets, &fed),
            basic_personal_amount: fed.index(federal.bpa_max, Indexing::NearestDollar),
            eligible_dividend_credit_rate: federal.eligible_dtc_rate,
            non_eligible_dividend_credit_rate: federal.non_eligible_dtc_rate,
        },
        federal_bpa_min: fed.index(federal.bpa_min, Indexing::NearestDollar),
        canada_employment_amount: fed.index(
            federal.canada_employment_amount,
            Indexing::NearestDollar,
        ),
        quebec_abatement: if is_quebec { QUEBEC_ABATEMENT } else { 0.0 },
        provincial: PersonalSchedule {
            brackets: index_brackets(provincial.brackets, &prov),
            basic_personal_amount: prov.index(
                provincial.basic_personal_amount,
                Indexing::NearestDollar,
            ),
            eligible_dividend_credit_rate: provincial.eligible_dtc_rate,
            non_eligible_dividend_credit_rate: provincial.non_eligible_dtc_rate,
        },
        surtax: index_brackets(provincial.surtax, &prov),
        health_premium: provincial.health_premium.to_vec(),
        dividends: DividendRates {
            eligible_gross_up: ELIGIBLE_GROSS_UP,
            non_eligible_gross_up: NON_ELIGIBLE_GROSS_UP,
        },
        corporate: CorporateRates {
            federal_small_business_rate: FEDERAL_SMALL_BUSINESS_RATE,
            federal_general_rate: FEDERAL_GENERAL_RATE,
            provincial_small_business_rate: provincial.small_business_rate,
            provincial_general_rate: provincial.general_rate,
            federal_investment_rate: FEDERAL_INVESTMENT_RATE,
            refundable_investment_rate: REFUNDABLE_INVESTMENT_RATE,
            part_iv_rate: PART_IV_RATE,
            federal_sbd_limit: FEDERAL_SBD_LIMIT,
            provincial_sbd_limit: provincial.sbd_limit,
            provincial_grind_applies: provincial.applies_passive_grind,
            passive_grind_threshold: PASSIVE_GRIND_THRESHOLD,
            passive_grind_factor: PASSIVE_GRIND_FACTOR,
            grip_general_rate_factor: GRIP_GENERAL_RATE_FACTOR,
            capital_gains_realization: CAPITAL_GAINS_REALIZATION,
            capital_gains_inclusion: CAPITAL_GAINS_INCLUSION,
        },
        cpp: PensionContribution {
            rate: pension.rate,
            base_rate: pension.base_rate,
            basic_exemption,
            ceiling: ympe,
            max_contribution: round_cents(pension.rate * (ympe - basic_exemption).max(0.0)),
        },
        cpp2: SecondTierContribution {
            rate: pension.second_tier_rate,
            floor: ympe,
            ceiling: yampe,
            max_contribution: round_cents(pension.second_tier_rate * (yampe - ympe).max(0.0)),
        },
        ei: InsurancePremium {
            rate: ei_rate,
            max_insurable: ei_max_insurable,
            max_contribution: round_cents(ei_rate * ei_max_insurable),
            employer_multiplier: EI_EMPLOYER_MULTIPLIER,
        },
        qpip,
        employer_health_levy: provincial.employer_levy,
        savings: SavingsLimits {
            rrsp_limit: fed.index(federal.rrsp_limit, Indexing::Nearest10),
            rrsp_earned_income_rate: RRSP_EARNED_INCOME_RATE,
            tfsa_limit: fed.index(federal.tfsa_limit, Indexing::Nearest500),
        },
    }
}

struct Indexer {
    factor: f64,
    years_forward: u32,
}

impl Indexer {
    fn new(inflation: f64, years_forward: u32) -> Self {
        Self {
            factor: (1.0 + inflation).powi(years_forward as i32),
            years_forward,
        }
    }

    fn index(&self, value: f64, indexing: Indexing) -> f64 {
        if self.years_forward == 0 {
            value
        } else {
            indexing.apply(value, self.factor)
        }
    }
}

fn select_table<T>(
    tables: &'static [T],
    year_of: impl Fn(&T) -> i32,
    year: i32,
    base_year: Option<i32>,
) -> (&'static T, u32) {
    let anchor = base_year.map_or(year, |base| base.min(year));
    let table = tables
        .iter()
        .rev()
        .find(|t| year_of(t) <= anchor)
        .unwrap_or(&tables[0]);
    let forward = year.saturating_sub(year_of(table)).max(0) as u32;
    (table, forward)
}

// Fixed thresholds can be overtaken by indexed ones far enough out; keep the
// schedule strictly increasing.
fn index_brackets(brackets: &[TableBracket], indexer: &Indexer) -> Vec<Bracket> {
    let mut out: Vec<Bracket> = Vec::with_capacity(brackets.len());
    for bracket in brackets {
        let mut threshold = indexer.index(bracket.threshold, bracket.indexing);
        if let Some(prev) = out.last() {
            threshold = threshold.max(prev.threshold + 1.0);
        }
        out.push(Bracket {
            threshold,
            rate: bracket.rate,
        });
    }
    out
}

/// Per-run memo of resolved years.
#[derive(Debug)]
pub struct TaxDataCache {
    province: Province,
    inflation: f64,
    entries: BTreeMap<i32, TaxYearData>,
}

impl TaxDataCache {
    pub fn new(province: Province, inflation: f64) -> Self {
        Self {
            province,
            inflation,
            entries: BTreeMap::new(),
        }
    }

    pub fn get(&mut self, year: i32) -> &TaxYearData {
        let (province, inflation) = (self.province, self.inflation);
        self.entries
            .entry(year)
            .or_insert_with(|| resolve_tax_year_data(year, province, inflation))
    }
}

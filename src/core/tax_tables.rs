//! Hand-verified statutory tables. Read-only; future years are derived from
//! the latest entry by the resolver in `tax_data`.

use super::Province;
use super::tax_data::{HealthLevy, HealthPremiumBand};

/// How a constant moves when compounded into a future year.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Indexing {
    Fixed,
    NearestDollar,
    Down100,
    Nearest100,
    Nearest10,
    Nearest500,
}

impl Indexing {
    pub(crate) fn apply(self, base: f64, factor: f64) -> f64 {
        let grown = base * factor;
        match self {
            Indexing::Fixed => base,
            Indexing::NearestDollar => grown.round(),
            Indexing::Down100 => (grown / 100.0).floor() * 100.0,
            Indexing::Nearest100 => (grown / 100.0).round() * 100.0,
            Indexing::Nearest10 => (grown / 10.0).round() * 10.0,
            Indexing::Nearest500 => (grown / 500.0).round() * 500.0,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct TableBracket {
    pub threshold: f64,
    pub rate: f64,
    pub indexing: Indexing,
}

const fn indexed(threshold: f64, rate: f64) -> TableBracket {
    TableBracket {
        threshold,
        rate,
        indexing: Indexing::NearestDollar,
    }
}

const fn fixed(threshold: f64, rate: f64) -> TableBracket {
    TableBracket {
        threshold,
        rate,
        indexing: Indexing::Fixed,
    }
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct PensionTable {
    pub rate: f64,
    pub base_rate: f64,
    pub basic_exemption: f64,
    pub ympe: f64,
    pub second_tier_rate: f64,
    pub yampe: f64,
}

#[derive(Debug)]
pub(crate) struct FederalTable {
    pub year: i32,
    pub brackets: &'static [TableBracket],
    pub bpa_max: f64,
    pub bpa_min: f64,
    pub canada_employment_amount: f64,
    pub eligible_dtc_rate: f64,
    pub non_eligible_dtc_rate: f64,
    pub cpp: PensionTable,
    pub qpp: PensionTable,
    pub ei_rate: f64,
    pub ei_quebec_rate: f64,
    pub ei_max_insurable: f64,
    pub qpip_employee_rate: f64,
    pub qpip_employer_rate: f64,
    pub qpip_max_insurable: f64,
    pub rrsp_limit: f64,
    pub tfsa_limit: f64,
}

#[derive(Debug)]
pub(crate) struct ProvincialTable {
    pub year: i32,
    pub brackets: &'static [TableBracket],
    pub basic_personal_amount: f64,
    pub eligible_dtc_rate: f64,
    pub non_eligible_dtc_rate: f64,
    pub small_business_rate: f64,
    pub general_rate: f64,
    pub sbd_limit: f64,
    pub applies_passive_grind: bool,
    pub surtax: &'static [TableBracket],
    pub health_premium: &'static [HealthPremiumBand],
    pub employer_levy: HealthLevy,
}

pub(crate) const ELIGIBLE_GROSS_UP: f64 = 0.38;
pub(crate) const NON_ELIGIBLE_GROSS_UP: f64 = 0.15;
pub(crate) const QUEBEC_ABATEMENT: f64 = 0.165;
pub(crate) const EI_EMPLOYER_MULTIPLIER: f64 = 1.4;
pub(crate) const YAMPE_FACTOR: f64 = 1.14;
pub(crate) const RRSP_EARNED_INCOME_RATE: f64 = 0.18;

pub(crate) const FEDERAL_SMALL_BUSINESS_RATE: f64 = 0.09;
pub(crate) const FEDERAL_GENERAL_RATE: f64 = 0.15;
pub(crate) const FEDERAL_INVESTMENT_RATE: f64 = 0.3867;
pub(crate) const REFUNDABLE_INVESTMENT_RATE: f64 = 0.3067;
pub(crate) const PART_IV_RATE: f64 = 0.3833;
pub(crate) const FEDERAL_SBD_LIMIT: f64 = 500_000.0;
pub(crate) const PASSIVE_GRIND_THRESHOLD: f64 = 50_000.0;
pub(crate) const PASSIVE_GRIND_FACTOR: f64 = 5.0;
pub(crate) const GRIP_GENERAL_RATE_FACTOR: f64 = 0.72;
pub(crate) const CAPITAL_GAINS_REALIZATION: f64 = 0.5;
pub(crate) const CAPITAL_GAINS_INCLUSION: f64 = 0.5;

const FEDERAL_BRACKETS_2024: [TableBracket; 5] = [
    indexed(0.0, 0.15),
    indexed(55_867.0, 0.205),
    indexed(111_733.0, 0.26),
    indexed(173_205.0, 0.29),
    indexed(246_752.0, 0.33),
];

// Lowest rate blended for the mid-year cut to 14%.
const FEDERAL_BRACKETS_2025: [TableBracket; 5] = [
    indexed(0.0, 0.145),
    indexed(57_375.0, 0.205),
    indexed(114_750.0, 0.26),
    indexed(177_882.0, 0.29),
    indexed(253_414.0, 0.33),
];

pub(crate) static FEDERAL_TABLES: [FederalTable; 2] = [
    FederalTable {
        year: 2024,
        brackets: &FEDERAL_BRACKETS_2024,
        bpa_max: 15_705.0,
        bpa_min: 14_156.0,
        canada_employment_amount: 1_433.0,
        eligible_dtc_rate: 0.150198,
        non_eligible_dtc_rate: 0.090301,
        cpp: PensionTable {
            rate: 0.0595,
            base_rate: 0.0495,
            basic_exemption: 3_500.0,
            ympe: 68_500.0,
            second_tier_rate: 0.04,
            yampe: 73_200.0,
        },
        qpp: PensionTable {
            rate: 0.064,
            base_rate: 0.054,
            basic_exemption: 3_500.0,
            ympe: 68_500.0,
            second_tier_rate: 0.04,
            yampe: 73_200.0,
        },
        ei_rate: 0.0166,
        ei_quebec_rate: 0.0132,
        ei_max_insurable: 63_200.0,
        qpip_employee_rate: 0.00494,
        qpip_employer_rate: 0.00692,
        qpip_max_insurable: 94_000.0,
        rrsp_limit: 31_560.0,
        tfsa_limit: 7_000.0,
    },
    FederalTable {
        year: 2025,
        brackets: &FEDERAL_BRACKETS_2025,
        bpa_max: 15_705.0,
        bpa_min: 14_156.0,
        canada_employment_amount: 1_471.0,
        eligible_dtc_rate: 0.150198,
        non_eligible_dtc_rate: 0.090301,
        cpp: PensionTable {
            rate: 0.0595,
            base_rate: 0.0495,
            basic_exemption: 3_500.0,
            ympe: 71_300.0,
            second_tier_rate: 0.04,
            yampe: 81_200.0,
        },
        qpp: PensionTable {
            rate: 0.064,
            base_rate: 0.054,
            basic_exemption: 3_500.0,
            ympe: 71_300.0,
            second_tier_rate: 0.04,
            yampe: 81_200.0,
        },
        ei_rate: 0.0164,
        ei_quebec_rate: 0.0131,
        ei_max_insurable: 65_700.0,
        qpip_employee_rate: 0.00494,
        qpip_employer_rate: 0.00692,
        qpip_max_insurable: 98_000.0,
        rrsp_limit: 32_490.0,
        tfsa_limit: 7_000.0,
    },
];

const NO_SURTAX: [TableBracket; 0] = [];
const NO_HEALTH_PREMIUM: [HealthPremiumBand; 0] = [];

const fn premium_band(income_from: f64, base: f64, rate: f64, cap: f64) -> HealthPremiumBand {
    HealthPremiumBand {
        income_from,
        base,
        rate,
        cap,
    }
}

const ONTARIO_SURTAX_2025: [TableBracket; 2] = [indexed(5_710.0, 0.20), indexed(7_307.0, 0.36)];

const ONTARIO_HEALTH_PREMIUM: [HealthPremiumBand; 5] = [
    premium_band(20_000.0, 0.0, 0.06, 300.0),
    premium_band(36_000.0, 300.0, 0.06, 450.0),
    premium_band(48_000.0, 450.0, 0.25, 600.0),
    premium_band(72_000.0, 600.0, 0.25, 750.0),
    premium_band(200_000.0, 750.0, 0.25, 900.0),
];

const AB_BRACKETS_2025: [TableBracket; 6] = [
    indexed(0.0, 0.08),
    indexed(60_000.0, 0.10),
    indexed(151_234.0, 0.12),
    indexed(181_481.0, 0.13),
    indexed(241_974.0, 0.14),
    indexed(362_961.0, 0.15),
];

const BC_BRACKETS_2025: [TableBracket; 7] = [
    indexed(0.0, 0.0506),
    indexed(49_279.0, 0.077),
    indexed(98_560.0, 0.105),
    indexed(113_158.0, 0.1229),
    indexed(137_407.0, 0.147),
    indexed(186_306.0, 0.168),
    indexed(259_829.0, 0.205),
];

const MB_BRACKETS_2025: [TableBracket; 3] = [
    indexed(0.0, 0.108),
    indexed(47_000.0, 0.1275),
    indexed(100_000.0, 0.174),
];

const NB_BRACKETS_2025: [TableBracket; 4] = [
    indexed(0.0, 0.094),
    indexed(51_306.0, 0.14),
    indexed(102_614.0, 0.16),
    indexed(190_060.0, 0.195),
];

const NL_BRACKETS_2025: [TableBracket; 8] = [
    indexed(0.0, 0.087),
    indexed(44_192.0, 0.145),
    indexed(88_382.0, 0.158),
    indexed(157_792.0, 0.178),
    indexed(220_910.0, 0.198),
    indexed(282_214.0, 0.208),
    indexed(564_429.0, 0.213),
    indexed(1_128_858.0, 0.218),
];

const NS_BRACKETS_2025: [TableBracket; 5] = [
    indexed(0.0, 0.0879),
    indexed(30_507.0, 0.1495),
    indexed(61_015.0, 0.1667),
    indexed(95_883.0, 0.175),
    indexed(154_650.0, 0.21),
];

const NT_BRACKETS_2025: [TableBracket; 4] = [
    indexed(0.0, 0.059),
    indexed(51_964.0, 0.086),
    indexed(103_930.0, 0.122),
    indexed(168_967.0, 0.1405),
];

const NU_BRACKETS_2025: [TableBracket; 4] = [
    indexed(0.0, 0.04),
    indexed(54_707.0, 0.07),
    indexed(109_413.0, 0.09),
    indexed(177_881.0, 0.115),
];

const ON_BRACKETS_2025: [TableBracket; 5] = [
    indexed(0.0, 0.0505),
    indexed(52_886.0, 0.0915),
    indexed(105_775.0, 0.1116),
    fixed(150_000.0, 0.1216),
    fixed(220_000.0, 0.1316),
];

const PE_BRACKETS_2025: [TableBracket; 5] = [
    indexed(0.0, 0.095),
    indexed(33_328.0, 0.1347),
    indexed(64_656.0, 0.166),
    indexed(105_000.0, 0.1762),
    indexed(140_000.0, 0.19),
];

const QC_BRACKETS_2025: [TableBracket; 4] = [
    indexed(0.0, 0.14),
    indexed(53_255.0, 0.19),
    indexed(106_495.0, 0.24),
    indexed(129_590.0, 0.2575),
];

const SK_BRACKETS_2025: [TableBracket; 3] = [
    indexed(0.0, 0.105),
    indexed(53_463.0, 0.125),
    indexed(152_750.0, 0.145),
];

const YT_BRACKETS_2025: [TableBracket; 5] = [
    indexed(0.0, 0.064),
    indexed(57_375.0, 0.09),
    indexed(114_750.0, 0.109),
    indexed(177_882.0, 0.128),
    fixed(500_000.0, 0.15),
];

static AB_TABLES: [ProvincialTable; 1] = [ProvincialTable {
    year: 2025,
    brackets: &AB_BRACKETS_2025,
    basic_personal_amount: 22_323.0,
    eligible_dtc_rate: 0.0812,
    non_eligible_dtc_rate: 0.0218,
    small_business_rate: 0.02,
    general_rate: 0.08,
    sbd_limit: 500_000.0,
    applies_passive_grind: true,
    surtax: &NO_SURTAX,
    health_premium: &NO_HEALTH_PREMIUM,
    employer_levy: HealthLevy::None,
}];

static BC_TABLES: [ProvincialTable; 1] = [ProvincialTable {
    year: 2025,
    brackets: &BC_BRACKETS_2025,
    basic_personal_amount: 12_932.0,
    eligible_dtc_rate: 0.12,
    non_eligible_dtc_rate: 0.0196,
    small_business_rate: 0.02,
    general_rate: 0.12,
    sbd_limit: 500_000.0,
    applies_passive_grind: true,
    surtax: &NO_SURTAX,
    health_premium: &NO_HEALTH_PREMIUM,
    employer_levy: HealthLevy::Notch {
        exemption: 1_000_000.0,
        upper_threshold: 1_500_000.0,
        notch_rate: 0.0585,
        flat_rate: 0.0195,
    },
}];

static MB_TABLES: [ProvincialTable; 1] = [ProvincialTable {
    year: 2025,
    brackets: &MB_BRACKETS_2025,
    basic_personal_amount: 15_780.0,
    eligible_dtc_rate: 0.08,
    non_eligible_dtc_rate: 0.007835,
    small_business_rate: 0.0,
    general_rate: 0.12,
    sbd_limit: 500_000.0,
    applies_passive_grind: true,
    surtax: &NO_SURTAX,
    health_premium: &NO_HEALTH_PREMIUM,
    employer_levy: HealthLevy::Notch {
        exemption: 2_250_000.0,
        upper_threshold: 4_500_000.0,
        notch_rate: 0.043,
        flat_rate: 0.0215,
    },
}];

static NB_TABLES: [ProvincialTable; 1] = [ProvincialTable {
    year: 2025,
    brackets: &NB_BRACKETS_2025,
    basic_personal_amount: 13_396.0,
    eligible_dtc_rate: 0.14,
    non_eligible_dtc_rate: 0.0275,
    small_business_rate: 0.025,
    general_rate: 0.14,
    sbd_limit: 500_000.0,
    applies_passive_grind: false,
    surtax: &NO_SURTAX,
    health_premium: &NO_HEALTH_PREMIUM,
    employer_levy: HealthLevy::None,
}];

static NL_TABLES: [ProvincialTable; 1] = [ProvincialTable {
    year: 2025,
    brackets: &NL_BRACKETS_2025,
    basic_personal_amount: 11_067.0,
    eligible_dtc_rate: 0.063,
    non_eligible_dtc_rate: 0.032,
    small_business_rate: 0.025,
    general_rate: 0.15,
    sbd_limit: 500_000.0,
    applies_passive_grind: true,
    surtax: &NO_SURTAX,
    health_premium: &NO_HEALTH_PREMIUM,
    employer_levy: HealthLevy::OverExemption {
        exemption: 2_000_000.0,
        rate: 0.02,
    },
}];

static NS_TABLES: [ProvincialTable; 1] = [ProvincialTable {
    year: 2025,
    brackets: &NS_BRACKETS_2025,
    basic_personal_amount: 11_744.0,
    eligible_dtc_rate: 0.0885,
    non_eligible_dtc_rate: 0.0299,
    small_business_rate: 0.015,
    general_rate: 0.14,
    sbd_limit: 500_000.0,
    applies_passive_grind: true,
    surtax: &NO_SURTAX,
    health_premium: &NO_HEALTH_PREMIUM,
    employer_levy: HealthLevy::None,
}];

static NT_TABLES: [ProvincialTable; 1] = [ProvincialTable {
    year: 2025,
    brackets: &NT_BRACKETS_2025,
    basic_personal_amount: 17_842.0,
    eligible_dtc_rate: 0.115,
    non_eligible_dtc_rate: 0.06,
    small_business_rate: 0.02,
    general_rate: 0.115,
    sbd_limit: 500_000.0,
    applies_passive_grind: true,
    surtax: &NO_SURTAX,
    health_premium: &NO_HEALTH_PREMIUM,
    employer_levy: HealthLevy::None,
}];

static NU_TABLES: [ProvincialTable; 1] = [ProvincialTable {
    year: 2025,
    brackets: &NU_BRACKETS_2025,
    basic_personal_amount: 19_274.0,
    eligible_dtc_rate: 0.0551,
    non_eligible_dtc_rate: 0.0261,
    small_business_rate: 0.03,
    general_rate: 0.12,
    sbd_limit: 500_000.0,
    applies_passive_grind: true,
    surtax: &NO_SURTAX,
    health_premium: &NO_HEALTH_PREMIUM,
    employer_levy: HealthLevy::None,
}];

static ON_TABLES: [ProvincialTable; 1] = [ProvincialTable {
    year: 2025,
    brackets: &ON_BRACKETS_2025,
    basic_personal_amount: 12_747.0,
    eligible_dtc_rate: 0.10,
    non_eligible_dtc_rate: 0.029863,
    small_business_rate: 0.032,
    general_rate: 0.115,
    sbd_limit: 500_000.0,
    applies_passive_grind: false,
    surtax: &ONTARIO_SURTAX_2025,
    health_premium: &ONTARIO_HEALTH_PREMIUM,
    employer_levy: HealthLevy::OverExemption {
        exemption: 1_000_000.0,
        rate: 0.0195,
    },
}];

static PE_TABLES: [ProvincialTable; 1] = [ProvincialTable {
    year: 2025,
    brackets: &PE_BRACKETS_2025,
    basic_personal_amount: 14_650.0,
    eligible_dtc_rate: 0.105,
    non_eligible_dtc_rate: 0.013,
    small_business_rate: 0.01,
    general_rate: 0.16,
    sbd_limit: 500_000.0,
    applies_passive_grind: true,
    surtax: &NO_SURTAX,
    health_premium: &NO_HEALTH_PREMIUM,
    employer_levy: HealthLevy::None,
}];

static QC_TABLES: [ProvincialTable; 1] = [ProvincialTable {
    year: 2025,
    brackets: &QC_BRACKETS_2025,
    basic_personal_amount: 18_571.0,
    eligible_dtc_rate: 0.117,
    non_eligible_dtc_rate: 0.0342,
    small_business_rate: 0.032,
    general_rate: 0.115,
    sbd_limit: 500_000.0,
    applies_passive_grind: true,
    surtax: &NO_SURTAX,
    health_premium: &NO_HEALTH_PREMIUM,
    employer_levy: HealthLevy::Flat { rate: 0.0165 },
}];

static SK_TABLES: [ProvincialTable; 1] = [ProvincialTable {
    year: 2025,
    brackets: &SK_BRACKETS_2025,
    basic_personal_amount: 19_491.0,
    eligible_dtc_rate: 0.11,
    non_eligible_dtc_rate: 0.02938,
    small_business_rate: 0.01,
    general_rate: 0.12,
    sbd_limit: 600_000.0,
    applies_passive_grind: true,
    surtax: &NO_SURTAX,
    health_premium: &NO_HEALTH_PREMIUM,
    employer_levy: HealthLevy::None,
}];

static YT_TABLES: [ProvincialTable; 1] = [ProvincialTable {
    year: 2025,
    brackets: &YT_BRACKETS_2025,
    basic_personal_amount: 15_705.0,
    eligible_dtc_rate: 0.1202,
    non_eligible_dtc_rate: 0.0067,
    small_business_rate: 0.0,
    general_rate: 0.12,
    sbd_limit: 500_000.0,
    applies_passive_grind: true,
    surtax: &NO_SURTAX,
    health_premium: &NO_HEALTH_PREMIUM,
    employer_levy: HealthLevy::None,
}];

/// Tables for one province, ordered by year.
pub(crate) fn provincial_tables(province: Province) -> &'static [ProvincialTable] {
    match province {
        Province::Alberta => &AB_TABLES,
        Province::BritishColumbia => &BC_TABLES,
        Province::Manitoba => &MB_TABLES,
        Province::NewBrunswick => &NB_TABLES,
        Province::NewfoundlandAndLabrador => &NL_TABLES,
        Province::NovaScotia => &NS_TABLES,
        Province::NorthwestTerritories => &NT_TABLES,
        Province::Nunavut => &NU_TABLES,
        Province::Ontario => &ON_TABLES,
        Province::PrinceEdwardIsland => &PE_TABLES,
        Province::Quebec => &QC_TABLES,
        Province::Saskatchewan => &SK_TABLES,
        Province::Yukon => &YT_TABLES,
    }
}

use serde::Serialize;

use super::tax_data::{
    HealthLevy, InsurancePremium, PensionContribution, SecondTierContribution, TaxYearData,
};

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollDeductions {
    pub cpp_employee: f64,
    pub cpp_employer: f64,
    pub cpp2_employee: f64,
    pub cpp2_employer: f64,
    pub ei_employee: f64,
    pub ei_employer: f64,
    pub qpip_employee: f64,
    pub qpip_employer: f64,
    pub employer_health_levy: f64,
}

impl PayrollDeductions {
    pub fn employee_total(&self) -> f64 {
        self.cpp_employee + self.cpp2_employee + self.ei_employee + self.qpip_employee
    }

    pub fn employer_total(&self) -> f64 {
        self.cpp_employer
            + self.cpp2_employer
            + self.ei_employer
            + self.qpip_employer
            + self.employer_health_levy
    }
}

pub fn first_tier_pension(salary: f64, plan: &PensionContribution) -> f64 {
    let pensionable = salary.max(0.0).min(plan.ceiling) - plan.basic_exemption;
    (plan.rate * pensionable)
        .max(0.0)
        .min(plan.max_contribution)
}

pub fn second_tier_pension(salary: f64, plan: &SecondTierContribution) -> f64 {
    let pensionable = salary.max(0.0).min(plan.ceiling) - plan.floor;
    (plan.rate * pensionable)
        .max(0.0)
        .min(plan.max_contribution)
}

pub fn insurance_premium(salary: f64, premium: &InsurancePremium) -> f64 {
    (premium.rate * salary.max(0.0).min(premium.max_insurable))
        .max(0.0)
        .min(premium.max_contribution)
}

pub fn employer_health_levy(payroll: f64, levy: &HealthLevy) -> f64 {
    let payroll = payroll.max(0.0);
    match *levy {
        HealthLevy::None => 0.0,
        HealthLevy::OverExemption { exemption, rate } => rate * (payroll - exemption).max(0.0),
        HealthLevy::Notch {
            exemption,
            upper_threshold,
            notch_rate,
            flat_rate,
        } => {
            if payroll <= exemption {
                0.0
            } else if payroll <= upper_threshold {
                notch_rate * (payroll - exemption)
            } else {
                flat_rate * payroll
            }
        }
        HealthLevy::Flat { rate } => rate * payroll,
    }
}

pub fn payroll_deductions(salary: f64, data: &TaxYearData) -> PayrollDeductions {
    let salary = salary.max(0.0);
    if salary == 0.0 {
        return PayrollDeductions::default();
    }

    let cpp = first_tier_pension(salary, &data.cpp);
    let cpp2 = second_tier_pension(salary, &data.cpp2);
    let ei = insurance_premium(salary, &data.ei);
    let (qpip_employee, qpip_employer) = match &data.qpip {
        Some(plan) => {
            let insurable = salary.min(plan.max_insurable);
            (
                (plan.employee_rate * insurable).min(plan.max_employee_contribution),
                (plan.employer_rate * insurable).min(plan.max_employer_contribution),
            )
        }
        None => (0.0, 0.0),
    };

    PayrollDeductions {
        cpp_employee: cpp,
        cpp_employer: cpp,
        cpp2_employee: cpp2,
        cpp2_employer: cpp2,
        ei_employee: ei,
        ei_employer: ei * data.ei.employer_multiplier,
        qpip_employee,
        qpip_employer,
        employer_health_levy: employer_health_levy(salary, &data.employer_health_levy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Province;
    use crate::core::tax_data::resolve_tax_year_data;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn very_large_salary_hits_every_maximum_exactly() {
        let data = resolve_tax_year_data(2025, Province::Ontario, 0.02);
        let d = payroll_deductions(10_000_000.0, &data);
        assert_approx(d.cpp_employee, 4_034.10);
        assert_approx(d.cpp2_employee, 396.00);
        assert_approx(d.ei_employee, 1_077.48);
        assert_approx(d.ei_employer, 1_077.48 * 1.4);
        assert_approx(d.qpip_employee, 0.0);
    }

    #[test]
    fn salary_at_ympe_pays_exact_max_cpp_and_no_cpp2() {
        let data = resolve_tax_year_data(2025, Province::Ontario, 0.02);
        let d = payroll_deductions(71_300.0, &data);
        assert_approx(d.cpp_employee, data.cpp.max_contribution);
        assert_approx(d.cpp2_employee, 0.0);
    }

    #[test]
    fn salary_below_basic_exemption_pays_no_pension() {
        let data = resolve_tax_year_data(2025, Province::Manitoba, 0.02);
        let d = payroll_deductions(3_000.0, &data);
        assert_approx(d.cpp_employee, 0.0);
        assert_approx(d.ei_employee, 3_000.0 * 0.0164);
    }

    #[test]
    fn zero_salary_has_no_deductions() {
        let data = resolve_tax_year_data(2025, Province::Quebec, 0.02);
        assert_eq!(payroll_deductions(0.0, &data), PayrollDeductions::default());
    }

    #[test]
    fn quebec_uses_qpp_and_parental_insurance() {
        let data = resolve_tax_year_data(2025, Province::Quebec, 0.02);
        let d = payroll_deductions(120_000.0, &data);
        assert_approx(d.cpp_employee, 4_339.20);
        assert_approx(d.ei_employee, 860.67);
        assert_approx(d.qpip_employee, 484.12);
        assert_approx(d.qpip_employer, 678.16);
        assert_approx(d.employer_health_levy, 120_000.0 * 0.0165);
    }

    #[test]
    fn notch_levy_is_continuous_at_upper_threshold() {
        for province in [Province::BritishColumbia, Province::Manitoba] {
            let data = resolve_tax_year_data(2025, province, 0.0);
            let HealthLevy::Notch {
                exemption,
                upper_threshold,
                notch_rate,
                flat_rate,
            } = data.employer_health_levy
            else {
                panic!("{province} should use a notch levy");
            };
            let notch = notch_rate * (upper_threshold - exemption);
            let flat = flat_rate * upper_threshold;
            assert!((notch - flat).abs() < 0.01, "{province}: {notch} vs {flat}");

            let at = employer_health_levy(upper_threshold, &data.employer_health_levy);
            let above = employer_health_levy(upper_threshold + 0.01, &data.employer_health_levy);
            assert!((above - at).abs() < 0.01);
        }
    }

    #[test]
    fn notch_levy_is_zero_below_exemption() {
        let data = resolve_tax_year_data(2025, Province::BritishColumbia, 0.0);
        assert_approx(employer_health_levy(999_999.0, &data.employer_health_levy), 0.0);
        assert_approx(
            employer_health_levy(1_200_000.0, &data.employer_health_levy),
            0.0585 * 200_000.0,
        );
        assert_approx(
            employer_health_levy(2_000_000.0, &data.employer_health_levy),
            0.0195 * 2_000_000.0,
        );
    }

    #[test]
    fn provinces_without_a_levy_resolve_to_zero() {
        for province in [Province::Alberta, Province::Saskatchewan, Province::Yukon] {
            let data = resolve_tax_year_data(2025, province, 0.0);
            assert_approx(
                employer_health_levy(5_000_000.0, &data.employer_health_levy),
                0.0,
            );
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(128))]

        #[test]
        fn prop_deductions_never_exceed_statutory_maximums(
            salary in 0u64..50_000_000,
            years_forward in 0i32..15,
            province_idx in 0usize..13
        ) {
            let data = resolve_tax_year_data(2025 + years_forward, Province::ALL[province_idx], 0.025);
            let d = payroll_deductions(salary as f64, &data);
            prop_assert!(d.cpp_employee >= 0.0 && d.cpp_employee <= data.cpp.max_contribution);
            prop_assert!(d.cpp2_employee >= 0.0 && d.cpp2_employee <= data.cpp2.max_contribution);
            prop_assert!(d.ei_employee >= 0.0 && d.ei_employee <= data.ei.max_contribution);
            prop_assert!(d.employer_health_levy >= 0.0);
        }
    }
}

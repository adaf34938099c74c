use super::SalaryStrategy;
use super::ledger::NotionalAccountBalances;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CompensationPlan {
    pub salary: f64,
    pub capital_dividends: f64,
    pub eligible_dividends: f64,
    pub non_eligible_dividends: f64,
    /// Amount each notional account is drawn down by.
    pub draws: NotionalAccountBalances,
}

impl CompensationPlan {
    pub fn total_dividends(&self) -> f64 {
        self.capital_dividends + self.eligible_dividends + self.non_eligible_dividends
    }

    pub fn total_compensation(&self) -> f64 {
        self.salary + self.total_dividends()
    }

    // CDA, then eRDTOH, nRDTOH, GRIP. Returns the need left uncovered.
    fn deplete(&mut self, need: f64, balances: &NotionalAccountBalances) -> f64 {
        let mut remaining = need;
        let mut take = |balance: f64| {
            let amount = remaining.min(balance.max(0.0));
            remaining -= amount;
            amount
        };

        let cda = take(balances.cda);
        let erdtoh = take(balances.erdtoh);
        let nrdtoh = take(balances.nrdtoh);
        let grip = take(balances.grip);

        self.capital_dividends += cda;
        self.eligible_dividends += erdtoh + grip;
        self.non_eligible_dividends += nrdtoh;
        self.draws = NotionalAccountBalances {
            cda,
            erdtoh,
            nrdtoh,
            grip,
            ..NotionalAccountBalances::default()
        };
        remaining
    }
}

pub fn resolve_compensation(
    strategy: &SalaryStrategy,
    need: f64,
    balances: &NotionalAccountBalances,
) -> CompensationPlan {
    let need = if need.is_finite() { need.max(0.0) } else { 0.0 };
    let mut plan = CompensationPlan::default();

    match *strategy {
        SalaryStrategy::Dynamic => {
            plan.salary = plan.deplete(need, balances);
        }
        SalaryStrategy::Fixed { salary } => {
            plan.salary = salary.max(0.0).min(need);
            let shortfall = plan.deplete(need - plan.salary, balances);
            plan.non_eligible_dividends += shortfall;
        }
        SalaryStrategy::DividendsOnly => {
            let shortfall = plan.deplete(need, balances);
            plan.non_eligible_dividends += shortfall;
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn balances() -> NotionalAccountBalances {
        NotionalAccountBalances {
            cda: 10_000.0,
            erdtoh: 5_000.0,
            nrdtoh: 8_000.0,
            grip: 20_000.0,
            ..NotionalAccountBalances::default()
        }
    }

    #[test]
    fn dynamic_depletes_accounts_in_order_then_pays_salary() {
        let plan = resolve_compensation(&SalaryStrategy::Dynamic, 100_000.0, &balances());
        assert_approx(plan.capital_dividends, 10_000.0);
        assert_approx(plan.eligible_dividends, 25_000.0);
        assert_approx(plan.non_eligible_dividends, 8_000.0);
        assert_approx(plan.salary, 57_000.0);
        assert_approx(plan.total_compensation(), 100_000.0);
        assert_eq!(plan.draws, balances());
    }

    #[test]
    fn dynamic_stops_at_first_sufficient_account() {
        let plan = resolve_compensation(&SalaryStrategy::Dynamic, 12_000.0, &balances());
        assert_approx(plan.capital_dividends, 10_000.0);
        assert_approx(plan.draws.erdtoh, 2_000.0);
        assert_approx(plan.draws.nrdtoh, 0.0);
        assert_approx(plan.salary, 0.0);
    }

    #[test]
    fn fixed_salary_is_capped_at_need() {
        let plan = resolve_compensation(
            &SalaryStrategy::Fixed { salary: 150_000.0 },
            100_000.0,
            &balances(),
        );
        assert_approx(plan.salary, 100_000.0);
        assert_approx(plan.total_dividends(), 0.0);
    }

    #[test]
    fn fixed_salary_remainder_falls_back_to_non_eligible() {
        let plan = resolve_compensation(
            &SalaryStrategy::Fixed { salary: 40_000.0 },
            100_000.0,
            &balances(),
        );
        assert_approx(plan.salary, 40_000.0);
        assert_approx(plan.capital_dividends, 10_000.0);
        assert_approx(plan.eligible_dividends, 25_000.0);
        assert_approx(plan.non_eligible_dividends, 8_000.0 + 17_000.0);
        assert_approx(plan.total_compensation(), 100_000.0);
    }

    #[test]
    fn dividends_only_never_pays_salary() {
        let plan = resolve_compensation(
            &SalaryStrategy::DividendsOnly,
            80_000.0,
            &NotionalAccountBalances::default(),
        );
        assert_approx(plan.salary, 0.0);
        assert_approx(plan.non_eligible_dividends, 80_000.0);
        assert_eq!(plan.draws, NotionalAccountBalances::default());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(256))]

        #[test]
        fn prop_draws_never_exceed_balances_and_need_is_met(
            need in 0u32..500_000,
            cda in 0u32..200_000,
            erdtoh in 0u32..200_000,
            nrdtoh in 0u32..200_000,
            grip in 0u32..200_000,
            kind in 0u8..3,
            fixed in 0u32..300_000
        ) {
            let b = NotionalAccountBalances {
                cda: cda as f64,
                erdtoh: erdtoh as f64,
                nrdtoh: nrdtoh as f64,
                grip: grip as f64,
                ..NotionalAccountBalances::default()
            };
            let strategy = match kind {
                0 => SalaryStrategy::Dynamic,
                1 => SalaryStrategy::Fixed { salary: fixed as f64 },
                _ => SalaryStrategy::DividendsOnly,
            };
            let plan = resolve_compensation(&strategy, need as f64, &b);
            prop_assert!(plan.draws.cda <= b.cda);
            prop_assert!(plan.draws.erdtoh <= b.erdtoh);
            prop_assert!(plan.draws.nrdtoh <= b.nrdtoh);
            prop_assert!(plan.draws.grip <= b.grip);
            prop_assert!((plan.total_compensation() - need as f64).abs() <= 1e-6);
            prop_assert!(plan.salary >= 0.0 && plan.non_eligible_dividends >= 0.0);
        }
    }
}

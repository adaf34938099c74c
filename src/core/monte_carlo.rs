use std::f64::consts::PI;

use serde::Serialize;
use tracing::debug;

use super::engine::calculate_projection;
use super::error::ProjectionError;
use super::types::UserInputs;

const MIN_SAMPLED_RETURN: f64 = -0.5;
const MAX_SAMPLED_RETURN: f64 = 1.0;

#[derive(Debug, Clone, Copy)]
pub struct MonteCarloConfig {
    pub trials: u32,
    pub volatility: f64,
    pub seed: u64,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            trials: 500,
            volatility: 0.10,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionStats {
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl DistributionStats {
    fn from_samples(mut values: Vec<f64>) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Self {
            p10: percentile(&mut values, 10.0),
            p25: percentile(&mut values, 25.0),
            p50: percentile(&mut values, 50.0),
            p75: percentile(&mut values, 75.0),
            p90: percentile(&mut values, 90.0),
            mean,
            std_dev: variance.sqrt(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonteCarloResult {
    pub trials: u32,
    pub volatility: f64,
    pub seed: u64,
    pub annualized_return: DistributionStats,
    pub total_tax: DistributionStats,
    pub final_corporate_balance: DistributionStats,
    pub total_after_tax_income: DistributionStats,
    pub effective_integrated_rate: DistributionStats,
}

pub fn run_monte_carlo(
    inputs: &UserInputs,
    config: &MonteCarloConfig,
) -> Result<MonteCarloResult, ProjectionError> {
    let trials = config.trials.max(1);
    let volatility = if config.volatility.is_finite() {
        config.volatility.max(0.0)
    } else {
        0.0
    };
    let years = inputs.planning_horizon;

    let capacity = trials as usize;
    let mut returns = Vec::with_capacity(capacity);
    let mut total_tax = Vec::with_capacity(capacity);
    let mut final_balance = Vec::with_capacity(capacity);
    let mut after_tax = Vec::with_capacity(capacity);
    let mut integrated_rate = Vec::with_capacity(capacity);

    for trial in 0..trials {
        let mut rng = Rng::new(derive_seed(config.seed, trial));
        let rate = sample_path_return(inputs.investment_return_rate, volatility, years, &mut rng);
        let summary = calculate_projection(&UserInputs {
            investment_return_rate: rate,
            ..inputs.clone()
        })?;

        returns.push(rate);
        total_tax.push(summary.total_tax);
        final_balance.push(summary.final_corporate_balance);
        after_tax.push(summary.total_after_tax_income);
        integrated_rate.push(summary.effective_integrated_rate);
    }

    debug!(trials, volatility, seed = config.seed, "monte carlo complete");

    Ok(MonteCarloResult {
        trials,
        volatility,
        seed: config.seed,
        annualized_return: DistributionStats::from_samples(returns),
        total_tax: DistributionStats::from_samples(total_tax),
        final_corporate_balance: DistributionStats::from_samples(final_balance),
        total_after_tax_income: DistributionStats::from_samples(after_tax),
        effective_integrated_rate: DistributionStats::from_samples(integrated_rate),
    })
}

/// Geometric mean of one log-normal draw per year.
fn sample_path_return(base: f64, volatility: f64, years: u32, rng: &mut Rng) -> f64 {
    let years = years.max(1);
    let growth: f64 = (0..years)
        .map(|_| 1.0 + sample_return(base, volatility, rng))
        .product();
    growth.powf(1.0 / years as f64) - 1.0
}

fn sample_return(base: f64, volatility: f64, rng: &mut Rng) -> f64 {
    let base = base.max(MIN_SAMPLED_RETURN);
    let mu = (1.0 + base).ln() - volatility * volatility / 2.0;
    let z = rng.standard_normal();
    ((mu + volatility * z).exp() - 1.0).clamp(MIN_SAMPLED_RETURN, MAX_SAMPLED_RETURN)
}

fn derive_seed(base_seed: u64, trial: u32) -> u64 {
    splitmix64(base_seed ^ ((trial as u64) << 32) ^ trial as u64)
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

struct Rng {
    state: u64,
    cached_normal: Option<f64>,
}

impl Rng {
    fn new(seed: u64) -> Self {
        let state = if seed == 0 {
            0xA5A5_A5A5_A5A5_A5A5
        } else {
            seed
        };
        Self {
            state,
            cached_normal: None,
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    fn next_f64(&mut self) -> f64 {
        const DENOM: f64 = (1_u64 << 53) as f64;
        let v = self.next_u64() >> 11;
        ((v as f64) + 0.5) / DENOM
    }

    fn standard_normal(&mut self) -> f64 {
        if let Some(z) = self.cached_normal.take() {
            return z;
        }

        let u1 = self.next_f64().max(1e-12);
        let u2 = self.next_f64();
        let r = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * PI * u2;

        self.cached_normal = Some(r * theta.sin());
        r * theta.cos()
    }
}

fn percentile(values: &mut [f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    values.sort_by(|a, b| a.total_cmp(b));

    let n = values.len();
    if n == 1 {
        return values[0];
    }

    let rank = (p / 100.0) * (n as f64 - 1.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        values[lower]
    } else {
        let w = rank - lower as f64;
        values[lower] * (1.0 - w) + values[upper] * w
    }
}

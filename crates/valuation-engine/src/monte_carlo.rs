use analysis_core::stats;
use analysis_core::{AnalysisError, Result};
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;

use crate::dcf;

/// Parameters of the DCF uncertainty simulation.
///
/// `Default` reads `VALUATION_MC_SIMULATIONS` and `VALUATION_MC_SEED` from the
/// environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    pub simulations: usize,
    pub years: usize,
    pub growth_mean: f64,
    pub growth_std: f64,
    pub terminal_growth_mean: f64,
    pub terminal_growth_std: f64,
    pub wacc_mean: f64,
    pub wacc_std: f64,
    /// Extra growth noise drawn independently for every projected year. Any
    /// standard deviation of 0 makes that input a constant.
    pub annual_noise_std: f64,
    pub net_debt: f64,
    pub shares_outstanding: f64,
    /// Fixed seed for reproducible runs; `None` draws a fresh one.
    pub seed: Option<u64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        let simulations = std::env::var("VALUATION_MC_SIMULATIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10_000usize);
        let seed = std::env::var("VALUATION_MC_SEED")
            .ok()
            .and_then(|s| s.parse().ok());

        Self {
            simulations,
            years: 5,
            growth_mean: 0.05,
            growth_std: 0.02,
            terminal_growth_mean: 0.025,
            terminal_growth_std: 0.01,
            wacc_mean: 0.10,
            wacc_std: 0.02,
            annual_noise_std: 0.01,
            net_debt: 0.0,
            shares_outstanding: 1.0,
            seed,
        }
    }
}

impl MonteCarloConfig {
    pub fn with_simulations(mut self, simulations: usize) -> Self {
        self.simulations = simulations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Distribution of per-share intrinsic values across all draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    pub simulations: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub percentile_5: f64,
    pub percentile_95: f64,
    pub confidence_interval: (f64, f64),
    /// Draws whose sampled WACC did not exceed terminal growth (terminal value 0).
    pub degenerate_draws: usize,
    pub seed: u64,
}

/// A normal draw, or a fixed value when the spread is zero.
enum Draw {
    Normal(Normal),
    Constant(f64),
}

impl Draw {
    fn new(name: &str, mean: f64, std: f64) -> Result<Self> {
        if std == 0.0 && mean.is_finite() {
            return Ok(Draw::Constant(mean));
        }
        Normal::new(mean, std)
            .map(Draw::Normal)
            .map_err(|e| AnalysisError::InvalidParameter(format!("{} distribution N({}, {}): {}", name, mean, std, e)))
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Draw::Normal(normal) => normal.sample(rng),
            Draw::Constant(value) => *value,
        }
    }
}

struct Samplers {
    growth: Draw,
    terminal_growth: Draw,
    wacc: Draw,
    annual_noise: Draw,
}

impl Samplers {
    fn new(config: &MonteCarloConfig) -> Result<Self> {
        Ok(Self {
            growth: Draw::new("growth", config.growth_mean, config.growth_std)?,
            terminal_growth: Draw::new("terminal growth", config.terminal_growth_mean, config.terminal_growth_std)?,
            wacc: Draw::new("wacc", config.wacc_mean, config.wacc_std)?,
            annual_noise: Draw::new("annual noise", 0.0, config.annual_noise_std)?,
        })
    }
}

/// Run the simulation, seeding from `config.seed` or a fresh random seed.
pub fn run_monte_carlo(base_fcf: f64, config: &MonteCarloConfig) -> Result<MonteCarloResult> {
    let seed = config.seed.unwrap_or_else(rand::random);
    simulate(base_fcf, config, seed)
}

/// Run the simulation with the base seed drawn from `rng`, ignoring
/// `config.seed`.
pub fn run_monte_carlo_with_rng<R: RngCore + ?Sized>(base_fcf: f64, config: &MonteCarloConfig, rng: &mut R) -> Result<MonteCarloResult> {
    simulate(base_fcf, config, rng.next_u64())
}

/// Every draw gets its own generator derived from the base seed and its index,
/// so results do not depend on how rayon schedules the draws.
fn draw_rng(base_seed: u64, draw: usize) -> StdRng {
    StdRng::seed_from_u64(base_seed ^ (draw as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

fn simulate(base_fcf: f64, config: &MonteCarloConfig, seed: u64) -> Result<MonteCarloResult> {
    if config.simulations == 0 {
        return Err(AnalysisError::InvalidParameter(
            "Monte Carlo needs at least one simulation".to_string(),
        ));
    }
    if config.years == 0 {
        return Err(AnalysisError::InvalidParameter(
            "Monte Carlo needs at least one projection year".to_string(),
        ));
    }
    let samplers = Samplers::new(config)?;

    tracing::info!(
        "Running {} DCF simulations over {} years (seed {})",
        config.simulations,
        config.years,
        seed
    );

    // Run simulations in parallel using rayon
    let draws: Vec<(f64, bool)> = (0..config.simulations)
        .into_par_iter()
        .map(|i| {
            let mut rng = draw_rng(seed, i);
            let growth = samplers.growth.sample(&mut rng);
            let terminal_growth = samplers.terminal_growth.sample(&mut rng);
            let wacc = samplers.wacc.sample(&mut rng);

            let mut fcf = base_fcf;
            let projection: Vec<f64> = (0..config.years)
                .map(|_| {
                    fcf *= 1.0 + growth + samplers.annual_noise.sample(&mut rng);
                    fcf
                })
                .collect();

            let result = dcf::discount(
                &projection,
                fcf,
                terminal_growth,
                wacc,
                config.net_debt,
                config.shares_outstanding,
            );
            (result.intrinsic_value_per_share, wacc <= terminal_growth)
        })
        .collect();

    // Aggregate only once every draw has finished
    let degenerate_draws = draws.iter().filter(|(_, degenerate)| *degenerate).count();
    let mut values: Vec<f64> = draws.into_iter().map(|(value, _)| value).collect();
    values.sort_by(|a, b| a.total_cmp(b));

    if degenerate_draws > 0 {
        tracing::warn!(
            "{} of {} draws had WACC at or below terminal growth; their terminal value is 0",
            degenerate_draws,
            config.simulations
        );
    }

    let percentile_5 = stats::percentile_sorted(&values, 5.0);
    let percentile_95 = stats::percentile_sorted(&values, 95.0);

    Ok(MonteCarloResult {
        simulations: config.simulations,
        mean: stats::mean(&values),
        median: stats::percentile_sorted(&values, 50.0),
        std_dev: stats::population_std_dev(&values),
        percentile_5,
        percentile_95,
        confidence_interval: (percentile_5, percentile_95),
        degenerate_draws,
        seed,
    })
}

//! Discounted cash flow valuation: WACC, terminal value, DCF decomposition,
//! Monte Carlo uncertainty and industry-derived assumptions.

pub mod assumptions;
pub mod dcf;
pub mod industry;
pub mod monte_carlo;

pub use assumptions::{project_fcf, ValuationAssumptions};
pub use dcf::{calculate_dcf_value, calculate_terminal_value, calculate_wacc, DcfResult};
pub use industry::{Industry, IndustryBenchmark, IndustryTable, LifecycleStage};
pub use monte_carlo::{run_monte_carlo, run_monte_carlo_with_rng, MonteCarloConfig, MonteCarloResult};

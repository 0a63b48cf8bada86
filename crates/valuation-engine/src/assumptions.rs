use serde::{Deserialize, Serialize};

use crate::dcf::calculate_wacc;
use crate::industry::{Industry, IndustryBenchmark, IndustryTable};

pub const DEFAULT_RISK_FREE_RATE: f64 = 0.045;
pub const MARKET_RISK_PREMIUM: f64 = 0.065;
pub const DEFAULT_COST_OF_DEBT: f64 = 0.04;
pub const DEFAULT_TAX_RATE: f64 = 0.21;
pub const DEFAULT_TERMINAL_GROWTH: f64 = 0.03;

/// Multipliers applied to the industry revenue growth in projection years
/// one through five.
pub const GROWTH_FADE: [f64; 5] = [1.2, 1.1, 1.0, 0.9, 0.8];

/// Discount-rate inputs for one valuation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationAssumptions {
    pub risk_free_rate: f64,
    pub beta: f64,
    pub market_risk_premium: f64,
    pub cost_of_debt: f64,
    pub tax_rate: f64,
    pub debt_to_equity: f64,
    pub terminal_growth: f64,
}

impl Default for ValuationAssumptions {
    fn default() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            beta: 1.0,
            market_risk_premium: MARKET_RISK_PREMIUM,
            cost_of_debt: DEFAULT_COST_OF_DEBT,
            tax_rate: DEFAULT_TAX_RATE,
            debt_to_equity: 0.0,
            terminal_growth: DEFAULT_TERMINAL_GROWTH,
        }
    }
}

impl ValuationAssumptions {
    /// Assumptions for `industry`, using the table's default entry when the
    /// industry is not listed.
    pub fn for_industry(industry: Industry, table: &IndustryTable, risk_free_rate: f64) -> Self {
        Self::from_benchmark(table.get(industry), risk_free_rate)
    }

    pub fn from_benchmark(benchmark: &IndustryBenchmark, risk_free_rate: f64) -> Self {
        Self {
            risk_free_rate,
            beta: benchmark.beta,
            debt_to_equity: benchmark.debt_to_equity(),
            ..Self::default()
        }
    }

    /// CAPM: rf + beta * MRP.
    pub fn cost_of_equity(&self) -> f64 {
        self.risk_free_rate + self.beta * self.market_risk_premium
    }

    pub fn after_tax_cost_of_debt(&self) -> f64 {
        self.cost_of_debt * (1.0 - self.tax_rate)
    }

    /// (equity weight, debt weight) implied by debt-to-equity.
    pub fn capital_weights(&self) -> (f64, f64) {
        let equity_weight = 1.0 / (1.0 + self.debt_to_equity);
        (equity_weight, 1.0 - equity_weight)
    }

    pub fn wacc(&self) -> f64 {
        let (equity_weight, debt_weight) = self.capital_weights();
        calculate_wacc(
            equity_weight,
            debt_weight,
            self.cost_of_equity(),
            self.cost_of_debt,
            self.tax_rate,
        )
    }
}

/// Five-year FCF projection growing at the industry revenue growth, scaled by
/// [`GROWTH_FADE`] year by year.
pub fn project_fcf(base_fcf: f64, benchmark: &IndustryBenchmark) -> Vec<f64> {
    GROWTH_FADE
        .iter()
        .scan(base_fcf, |fcf, fade| {
            *fcf *= 1.0 + benchmark.revenue_growth * fade;
            Some(*fcf)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_technology_assumptions() {
        let table = IndustryTable::builtin().unwrap();
        let a = ValuationAssumptions::for_industry(Industry::Technology, &table, DEFAULT_RISK_FREE_RATE);

        assert_relative_eq!(a.cost_of_equity(), 0.045 + 1.25 * 0.065, epsilon = 1e-12);
        assert_relative_eq!(a.debt_to_equity, 0.25, epsilon = 1e-12);
        let (we, wd) = a.capital_weights();
        assert_relative_eq!(we, 0.8, epsilon = 1e-12);
        assert_relative_eq!(wd, 0.2, epsilon = 1e-12);
        // 0.8 * 0.12625 + 0.2 * 0.04 * 0.79
        assert_relative_eq!(a.wacc(), 0.10732, epsilon = 1e-9);
    }

    #[test]
    fn test_all_equity_wacc_is_cost_of_equity() {
        let a = ValuationAssumptions::default();
        assert_relative_eq!(a.wacc(), a.cost_of_equity(), epsilon = 1e-12);
    }

    #[test]
    fn test_project_fcf_fades_growth() {
        let table = IndustryTable::builtin().unwrap();
        let projection = project_fcf(100.0, table.get(Industry::Technology));
        assert_eq!(projection.len(), 5);
        assert_relative_eq!(projection[0], 118.0, epsilon = 1e-9);
        assert_relative_eq!(projection[1], 118.0 * 1.165, epsilon = 1e-9);
        // Fading growth still compounds upward while positive
        assert!(projection.windows(2).all(|w| w[1] > w[0]));
    }
}

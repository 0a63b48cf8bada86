//! Valuation, quality and distress metrics.
//!
//! Every function tolerates zero or negative denominators and resolves them to
//! a fixed sentinel instead of failing.

use serde::{Deserialize, Serialize};

/// Return on invested capital: NOPAT / invested capital. 0 when invested
/// capital is not positive.
pub fn calculate_roic(ebit: f64, tax_rate: f64, invested_capital: f64) -> f64 {
    if invested_capital > 0.0 {
        ebit * (1.0 - tax_rate) / invested_capital
    } else {
        0.0
    }
}

/// Return on capital employed. 0 when capital employed is not positive.
pub fn calculate_roce(ebit: f64, capital_employed: f64) -> f64 {
    if capital_employed > 0.0 {
        ebit / capital_employed
    } else {
        0.0
    }
}

pub fn calculate_fcf_yield(free_cash_flow: f64, market_cap: f64) -> f64 {
    if market_cap > 0.0 {
        free_cash_flow / market_cap
    } else {
        0.0
    }
}

/// `f64::INFINITY` when EBITDA is not positive: the multiple is unbounded, not
/// zero.
pub fn calculate_ev_to_ebitda(enterprise_value: f64, ebitda: f64) -> f64 {
    if ebitda > 0.0 {
        enterprise_value / ebitda
    } else {
        f64::INFINITY
    }
}

/// `f64::INFINITY` when growth is not positive. A negative P/E passes through.
pub fn calculate_peg_ratio(pe_ratio: f64, growth_rate: f64) -> f64 {
    if growth_rate > 0.0 {
        pe_ratio / growth_rate
    } else {
        f64::INFINITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AltmanZone {
    Safe,
    Grey,
    Distress,
    CannotCalculate,
}

impl AltmanZone {
    pub const SAFE_THRESHOLD: f64 = 2.99;
    pub const DISTRESS_THRESHOLD: f64 = 1.81;

    /// Upper bounds are exclusive: 2.99 is grey, 1.81 is distress.
    pub fn classify(z_score: f64) -> Self {
        if z_score > Self::SAFE_THRESHOLD {
            AltmanZone::Safe
        } else if z_score > Self::DISTRESS_THRESHOLD {
            AltmanZone::Grey
        } else {
            AltmanZone::Distress
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AltmanZone::Safe => "Safe Zone",
            AltmanZone::Grey => "Grey Zone",
            AltmanZone::Distress => "Distress Zone",
            AltmanZone::CannotCalculate => "Cannot calculate",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AltmanInputs {
    pub working_capital: f64,
    pub total_assets: f64,
    pub retained_earnings: f64,
    pub ebit: f64,
    pub market_value_equity: f64,
    pub total_liabilities: f64,
    pub sales: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AltmanZScore {
    pub score: f64,
    pub zone: AltmanZone,
}

impl AltmanZScore {
    pub fn classification(&self) -> &'static str {
        self.zone.label()
    }
}

/// Z = 1.2A + 1.4B + 3.3C + 0.6D + 1.0E over total assets (D over total
/// liabilities, 0 when there are none).
pub fn calculate_altman_z_score(inputs: &AltmanInputs) -> AltmanZScore {
    if inputs.total_assets == 0.0 {
        return AltmanZScore {
            score: 0.0,
            zone: AltmanZone::CannotCalculate,
        };
    }

    let a = inputs.working_capital / inputs.total_assets;
    let b = inputs.retained_earnings / inputs.total_assets;
    let c = inputs.ebit / inputs.total_assets;
    let d = if inputs.total_liabilities > 0.0 {
        inputs.market_value_equity / inputs.total_liabilities
    } else {
        0.0
    };
    let e = inputs.sales / inputs.total_assets;

    let score = 1.2 * a + 1.4 * b + 3.3 * c + 0.6 * d + 1.0 * e;
    AltmanZScore {
        score,
        zone: AltmanZone::classify(score),
    }
}

/// Inputs for the F-score. Changes are current minus prior period; an absent
/// field fails its criterion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PiotroskiInputs {
    pub roa: Option<f64>,
    pub operating_cash_flow: Option<f64>,
    pub roa_change: Option<f64>,
    pub net_income: Option<f64>,
    pub leverage_change: Option<f64>,
    pub current_ratio_change: Option<f64>,
    pub shares_change: Option<f64>,
    pub gross_margin_change: Option<f64>,
    pub asset_turnover_change: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiotroskiCriteria {
    pub positive_roa: bool,
    pub positive_ocf: bool,
    pub increasing_roa: bool,
    pub quality_earnings: bool,
    pub decreasing_leverage: bool,
    pub increasing_liquidity: bool,
    pub no_dilution: bool,
    pub increasing_margin: bool,
    pub increasing_efficiency: bool,
}

impl PiotroskiCriteria {
    pub fn as_array(&self) -> [(&'static str, bool); 9] {
        [
            ("positive_roa", self.positive_roa),
            ("positive_ocf", self.positive_ocf),
            ("increasing_roa", self.increasing_roa),
            ("quality_earnings", self.quality_earnings),
            ("decreasing_leverage", self.decreasing_leverage),
            ("increasing_liquidity", self.increasing_liquidity),
            ("no_dilution", self.no_dilution),
            ("increasing_margin", self.increasing_margin),
            ("increasing_efficiency", self.increasing_efficiency),
        ]
    }

    pub fn passed(&self) -> u8 {
        self.as_array().iter().filter(|(_, passed)| *passed).count() as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiotroskiScore {
    pub score: u8,
    pub criteria: PiotroskiCriteria,
}

pub fn calculate_piotroski_f_score(inputs: &PiotroskiInputs) -> PiotroskiScore {
    let positive = |v: Option<f64>| v.is_some_and(|x| x > 0.0);

    let criteria = PiotroskiCriteria {
        // Profitability
        positive_roa: positive(inputs.roa),
        positive_ocf: positive(inputs.operating_cash_flow),
        increasing_roa: positive(inputs.roa_change),
        quality_earnings: matches!(
            (inputs.operating_cash_flow, inputs.net_income),
            (Some(ocf), Some(ni)) if ocf > ni
        ),
        // Leverage and liquidity
        decreasing_leverage: inputs.leverage_change.is_some_and(|x| x < 0.0),
        increasing_liquidity: positive(inputs.current_ratio_change),
        no_dilution: inputs.shares_change.is_some_and(|x| x <= 0.0),
        // Efficiency
        increasing_margin: positive(inputs.gross_margin_change),
        increasing_efficiency: positive(inputs.asset_turnover_change),
    };

    PiotroskiScore {
        score: criteria.passed(),
        criteria,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_return_metrics() {
        assert_relative_eq!(calculate_roic(100.0, 0.21, 500.0), 0.158, epsilon = 1e-12);
        assert_eq!(calculate_roic(100.0, 0.21, 0.0), 0.0);
        assert_eq!(calculate_roic(100.0, 0.21, -50.0), 0.0);
        assert_relative_eq!(calculate_roce(50.0, 200.0), 0.25);
        assert_eq!(calculate_roce(50.0, 0.0), 0.0);
        assert_relative_eq!(calculate_fcf_yield(40.0, 800.0), 0.05);
        assert_eq!(calculate_fcf_yield(40.0, -1.0), 0.0);
    }

    #[test]
    fn test_ev_to_ebitda_infinite_sentinel() {
        assert_eq!(calculate_ev_to_ebitda(1200.0, 0.0), f64::INFINITY);
        assert_eq!(calculate_ev_to_ebitda(1200.0, -10.0), f64::INFINITY);
        assert_relative_eq!(calculate_ev_to_ebitda(1200.0, 100.0), 12.0);
    }

    #[test]
    fn test_peg_ratio() {
        assert_relative_eq!(calculate_peg_ratio(20.0, 10.0), 2.0);
        assert_eq!(calculate_peg_ratio(20.0, 0.0), f64::INFINITY);
        assert_relative_eq!(calculate_peg_ratio(-15.0, 5.0), -3.0);
    }

    fn altman_with_sales(sales: f64) -> AltmanInputs {
        AltmanInputs {
            total_assets: 1.0,
            sales,
            ..Default::default()
        }
    }

    #[test]
    fn test_altman_zone_boundaries() {
        let safe = calculate_altman_z_score(&altman_with_sales(3.00));
        assert_eq!(safe.zone, AltmanZone::Safe);
        assert_eq!(safe.classification(), "Safe Zone");

        let grey = calculate_altman_z_score(&altman_with_sales(2.99));
        assert_eq!(grey.zone, AltmanZone::Grey);

        let distress = calculate_altman_z_score(&altman_with_sales(1.81));
        assert_eq!(distress.zone, AltmanZone::Distress);
        assert_eq!(distress.classification(), "Distress Zone");
    }

    #[test]
    fn test_altman_full_formula() {
        let z = calculate_altman_z_score(&AltmanInputs {
            working_capital: 50_000.0,
            total_assets: 200_000.0,
            retained_earnings: 30_000.0,
            ebit: 20_000.0,
            market_value_equity: 300_000.0,
            total_liabilities: 100_000.0,
            sales: 80_000.0,
        });
        // 0.3 + 0.21 + 0.33 + 1.8 + 0.4
        assert_relative_eq!(z.score, 3.04, epsilon = 1e-9);
        assert_eq!(z.zone, AltmanZone::Safe);
    }

    #[test]
    fn test_altman_degenerate_inputs() {
        let z = calculate_altman_z_score(&AltmanInputs::default());
        assert_eq!(z.score, 0.0);
        assert_eq!(z.classification(), "Cannot calculate");

        // No liabilities: the market-value term drops out
        let z = calculate_altman_z_score(&AltmanInputs {
            total_assets: 10.0,
            market_value_equity: 1_000.0,
            sales: 10.0,
            ..Default::default()
        });
        assert_relative_eq!(z.score, 1.0);
    }

    #[test]
    fn test_piotroski_perfect_and_empty() {
        let strong = PiotroskiInputs {
            roa: Some(0.08),
            operating_cash_flow: Some(120.0),
            roa_change: Some(0.01),
            net_income: Some(100.0),
            leverage_change: Some(-0.02),
            current_ratio_change: Some(0.1),
            shares_change: Some(0.0),
            gross_margin_change: Some(0.005),
            asset_turnover_change: Some(0.03),
        };
        let result = calculate_piotroski_f_score(&strong);
        assert_eq!(result.score, 9);

        let empty = calculate_piotroski_f_score(&PiotroskiInputs::default());
        assert_eq!(empty.score, 0);
        assert!(empty.criteria.as_array().iter().all(|(_, passed)| !passed));
    }

    #[test]
    fn test_piotroski_score_counts_true_criteria() {
        let values = [None, Some(-1.0), Some(0.0), Some(1.0)];
        for (i, &a) in values.iter().enumerate() {
            for &b in &values[i..] {
                let inputs = PiotroskiInputs {
                    roa: a,
                    operating_cash_flow: b,
                    roa_change: b,
                    net_income: a,
                    leverage_change: a,
                    current_ratio_change: b,
                    shares_change: a,
                    gross_margin_change: a,
                    asset_turnover_change: b,
                };
                let result = calculate_piotroski_f_score(&inputs);
                assert!(result.score <= 9);
                let count = result.criteria.as_array().iter().filter(|(_, p)| *p).count();
                assert_eq!(result.score as usize, count);
            }
        }
    }

    #[test]
    fn test_quality_earnings_needs_both_inputs() {
        let inputs = PiotroskiInputs {
            operating_cash_flow: Some(50.0),
            ..Default::default()
        };
        let result = calculate_piotroski_f_score(&inputs);
        assert!(result.criteria.positive_ocf);
        assert!(!result.criteria.quality_earnings);
        assert!(!result.criteria.no_dilution);
        assert_eq!(result.score, 1);
    }
}

//! Sector rotation detection
//!
//! Classifies each sector's return series by comparing short and long
//! momentum.

use std::collections::BTreeMap;

use analysis_core::stats;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

const SHORT_WINDOW: usize = 5;
const LONG_WINDOW: usize = 20;
const MIN_TREND_POINTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationSignal {
    /// Short momentum above long, and positive
    BullishAccelerating,
    /// Short momentum above long, but still negative
    RecoveryImproving,
    /// Short momentum below a positive long momentum
    CautionDecelerating,
    BearishDeteriorating,
}

impl RotationSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            RotationSignal::BullishAccelerating => "Bullish - Accelerating",
            RotationSignal::RecoveryImproving => "Recovery - Improving",
            RotationSignal::CautionDecelerating => "Caution - Decelerating",
            RotationSignal::BearishDeteriorating => "Bearish - Deteriorating",
        }
    }
}

pub fn rotation_signal(short_momentum: f64, long_momentum: f64) -> RotationSignal {
    if short_momentum > long_momentum && short_momentum > 0.0 {
        RotationSignal::BullishAccelerating
    } else if short_momentum > long_momentum && short_momentum < 0.0 {
        RotationSignal::RecoveryImproving
    } else if short_momentum < long_momentum && long_momentum > 0.0 {
        RotationSignal::CautionDecelerating
    } else {
        RotationSignal::BearishDeteriorating
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorMomentum {
    pub short_term_momentum: f64,
    pub long_term_momentum: f64,
    /// OLS slope of returns against time, in percentage points per period.
    pub trend_strength: f64,
    pub volatility: f64,
    pub risk_adjusted_momentum: f64,
    pub rotation_signal: RotationSignal,
}

impl SectorMomentum {
    /// `None` for fewer than two returns.
    pub fn from_returns(returns: &[f64]) -> Option<Self> {
        if returns.len() < 2 {
            return None;
        }

        let short_term_momentum = tail(returns, SHORT_WINDOW).mean();
        let long_term_momentum = tail(returns, LONG_WINDOW).mean();

        let trend_strength = if returns.len() >= MIN_TREND_POINTS {
            stats::linear_slope(returns) * 100.0
        } else {
            0.0
        };

        let volatility = returns.population_std_dev();
        let risk_adjusted_momentum = if volatility > 0.0 {
            short_term_momentum / volatility
        } else {
            0.0
        };

        Some(Self {
            short_term_momentum,
            long_term_momentum,
            trend_strength,
            volatility,
            risk_adjusted_momentum,
            rotation_signal: rotation_signal(short_term_momentum, long_term_momentum),
        })
    }
}

/// Last `window` points, or all of them when the series is shorter.
fn tail(returns: &[f64], window: usize) -> &[f64] {
    &returns[returns.len().saturating_sub(window)..]
}

/// Momentum profile per sector; sectors with fewer than two returns are
/// skipped.
pub fn sector_rotation_analysis(sector_returns: &BTreeMap<String, Vec<f64>>) -> BTreeMap<String, SectorMomentum> {
    sector_returns
        .iter()
        .filter_map(|(sector, returns)| {
            let momentum = SectorMomentum::from_returns(returns);
            if momentum.is_none() {
                tracing::debug!("Sector `{}` has {} return(s), skipping", sector, returns.len());
            }
            momentum.map(|m| (sector.clone(), m))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_short_series_uses_all_points() {
        let m = SectorMomentum::from_returns(&[0.01, 0.03]).unwrap();
        assert_relative_eq!(m.short_term_momentum, 0.02, epsilon = 1e-12);
        assert_relative_eq!(m.long_term_momentum, 0.02, epsilon = 1e-12);
        assert_eq!(m.trend_strength, 0.0);
        assert_relative_eq!(m.volatility, 0.01, epsilon = 1e-12);
        assert_relative_eq!(m.risk_adjusted_momentum, 2.0, epsilon = 1e-9);
        // Equal momenta with a positive long leg: neither accelerating nor decelerating
        assert_eq!(m.rotation_signal, RotationSignal::BearishDeteriorating);
    }

    #[test]
    fn test_accelerating_sector() {
        let returns: Vec<f64> = (0..25).map(|i| i as f64 * 0.001).collect();
        let m = SectorMomentum::from_returns(&returns).unwrap();
        // last 5: 0.020..0.024, last 20: 0.005..0.024
        assert_relative_eq!(m.short_term_momentum, 0.022, epsilon = 1e-12);
        assert_relative_eq!(m.long_term_momentum, 0.0145, epsilon = 1e-12);
        assert_relative_eq!(m.trend_strength, 0.1, epsilon = 1e-9);
        assert_eq!(m.rotation_signal, RotationSignal::BullishAccelerating);
    }

    #[test]
    fn test_rotation_signals() {
        assert_eq!(rotation_signal(0.02, 0.01), RotationSignal::BullishAccelerating);
        assert_eq!(rotation_signal(-0.01, -0.02), RotationSignal::RecoveryImproving);
        assert_eq!(rotation_signal(0.01, 0.02), RotationSignal::CautionDecelerating);
        assert_eq!(rotation_signal(-0.02, -0.01), RotationSignal::BearishDeteriorating);
        assert_eq!(rotation_signal(0.0, -0.01).as_str(), "Bearish - Deteriorating");
    }

    #[test]
    fn test_sector_map_skips_short_series() {
        let mut sectors = BTreeMap::new();
        sectors.insert("energy".to_string(), vec![0.01]);
        sectors.insert("tech".to_string(), vec![0.01, -0.02, 0.03]);
        let result = sector_rotation_analysis(&sectors);
        assert_eq!(result.len(), 1);
        assert!(result.contains_key("tech"));
    }

    #[test]
    fn test_flat_series_has_zero_risk_adjusted_momentum() {
        let m = SectorMomentum::from_returns(&[0.25; 12]).unwrap();
        assert_eq!(m.volatility, 0.0);
        assert_eq!(m.risk_adjusted_momentum, 0.0);
        assert_relative_eq!(m.trend_strength, 0.0, epsilon = 1e-12);
    }
}

use analysis_core::stats;
use serde::{Deserialize, Serialize};

/// Trailing window compared against the history before it.
pub const RECENT_WINDOW: usize = 20;

/// Market regime classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketRegime {
    /// Returns well above history without a volatility spike
    BullLowVolatility,

    /// Returns above history with rising volatility
    BullHighVolatility,

    /// Returns well below history with a volatility spike
    BearHighVolatility,

    /// Returns below history with falling volatility
    BearLowVolatility,

    /// Near-flat returns with falling volatility
    ConsolidationLowVolatility,

    TransitionMixedSignals,

    /// Unable to classify (insufficient data)
    InsufficientData,
}

impl MarketRegime {
    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            MarketRegime::BullLowVolatility => "Bull Market - Low Volatility",
            MarketRegime::BullHighVolatility => "Bull Market - High Volatility",
            MarketRegime::BearHighVolatility => "Bear Market - High Volatility",
            MarketRegime::BearLowVolatility => "Bear Market - Low Volatility",
            MarketRegime::ConsolidationLowVolatility => "Consolidation - Low Volatility",
            MarketRegime::TransitionMixedSignals => "Transition - Mixed Signals",
            MarketRegime::InsufficientData => "Insufficient data",
        }
    }

    /// Confidence before volume confirmation.
    pub fn base_confidence(&self) -> f64 {
        match self {
            MarketRegime::BullLowVolatility | MarketRegime::BearHighVolatility => 0.8,
            MarketRegime::BullHighVolatility | MarketRegime::BearLowVolatility => 0.7,
            MarketRegime::ConsolidationLowVolatility => 0.6,
            MarketRegime::TransitionMixedSignals => 0.5,
            MarketRegime::InsufficientData => 0.0,
        }
    }
}

/// Whether recent volume confirms the move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeConfirmation {
    High,
    Low,
    Neutral,
}

impl VolumeConfirmation {
    fn classify(recent_volume: f64, historical_volume: f64) -> Self {
        if recent_volume > historical_volume * 1.3 {
            VolumeConfirmation::High
        } else if recent_volume < historical_volume * 0.7 {
            VolumeConfirmation::Low
        } else {
            VolumeConfirmation::Neutral
        }
    }

    fn confidence_adjustment(&self) -> f64 {
        match self {
            VolumeConfirmation::High => 0.1,
            VolumeConfirmation::Low => -0.1,
            VolumeConfirmation::Neutral => 0.0,
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            VolumeConfirmation::High => " (High Volume)",
            VolumeConfirmation::Low => " (Low Volume)",
            VolumeConfirmation::Neutral => "",
        }
    }
}

/// Recent-versus-history comparison behind a classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegimeMetrics {
    pub recent_return: f64,
    pub historical_return: f64,
    pub recent_volatility: f64,
    pub historical_volatility: f64,
    pub recent_volume: f64,
    pub historical_volume: f64,

    /// Relative changes, recent versus historical (0 when history is 0)
    pub return_change: f64,
    pub volatility_change: f64,
    pub volume_change: f64,

    /// Number of returns analyzed
    pub sample_size: usize,
}

/// Regime detection result with confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeDetectionResult {
    pub regime: MarketRegime,
    pub volume_confirmation: VolumeConfirmation,
    /// Regime name with the volume suffix, e.g. "Bull Market - Low Volatility (High Volume)"
    pub label: String,
    /// Clamped to [0, 1]
    pub confidence: f64,
    pub metrics: RegimeMetrics,
}

/// Market regime detector
#[derive(Debug, Clone)]
pub struct MarketRegimeDetector {
    /// Minimum returns required for analysis
    min_observations: usize,
}

impl MarketRegimeDetector {
    pub fn new() -> Self {
        Self {
            min_observations: RECENT_WINDOW,
        }
    }

    /// Classify the last [`RECENT_WINDOW`] observations of each series against
    /// everything before them.
    ///
    /// The three series are windowed independently; a series with no history
    /// before the window has a historical mean of 0.
    pub fn detect_regime(&self, returns: &[f64], volume: &[f64], volatility: &[f64]) -> RegimeDetectionResult {
        if returns.len() < self.min_observations {
            tracing::debug!(
                "Insufficient data: {} returns (need {})",
                returns.len(),
                self.min_observations
            );
            return RegimeDetectionResult {
                regime: MarketRegime::InsufficientData,
                volume_confirmation: VolumeConfirmation::Neutral,
                label: MarketRegime::InsufficientData.name().to_string(),
                confidence: 0.0,
                metrics: RegimeMetrics {
                    sample_size: returns.len(),
                    ..Default::default()
                },
            };
        }

        let metrics = self.calculate_metrics(returns, volume, volatility);
        let regime = self.classify_regime(&metrics);
        let volume_confirmation = VolumeConfirmation::classify(metrics.recent_volume, metrics.historical_volume);

        let confidence = (regime.base_confidence() + volume_confirmation.confidence_adjustment()).clamp(0.0, 1.0);
        let label = format!("{}{}", regime.name(), volume_confirmation.suffix());

        tracing::debug!(
            "Regime {} (confidence {:.2}): return {:.4} vs {:.4}, volatility {:.4} vs {:.4}",
            label,
            confidence,
            metrics.recent_return,
            metrics.historical_return,
            metrics.recent_volatility,
            metrics.historical_volatility
        );

        RegimeDetectionResult {
            regime,
            volume_confirmation,
            label,
            confidence,
            metrics,
        }
    }

    fn calculate_metrics(&self, returns: &[f64], volume: &[f64], volatility: &[f64]) -> RegimeMetrics {
        let (recent_return, historical_return) = split_means(returns);
        let (recent_volatility, historical_volatility) = split_means(volatility);
        let (recent_volume, historical_volume) = split_means(volume);

        RegimeMetrics {
            recent_return,
            historical_return,
            recent_volatility,
            historical_volatility,
            recent_volume,
            historical_volume,
            return_change: stats::relative_change(recent_return, historical_return),
            volatility_change: stats::relative_change(recent_volatility, historical_volatility),
            volume_change: stats::relative_change(recent_volume, historical_volume),
            sample_size: returns.len(),
        }
    }

    /// First matching rule wins.
    fn classify_regime(&self, m: &RegimeMetrics) -> MarketRegime {
        let (ret, hist_ret) = (m.recent_return, m.historical_return);
        let (vol, hist_vol) = (m.recent_volatility, m.historical_volatility);

        if ret > hist_ret * 1.2 && vol < hist_vol * 1.2 {
            MarketRegime::BullLowVolatility
        } else if ret > hist_ret && vol > hist_vol {
            MarketRegime::BullHighVolatility
        } else if ret < hist_ret * 0.8 && vol > hist_vol * 1.2 {
            MarketRegime::BearHighVolatility
        } else if ret < hist_ret && vol < hist_vol {
            MarketRegime::BearLowVolatility
        } else if ret.abs() < 0.02 && vol < hist_vol {
            MarketRegime::ConsolidationLowVolatility
        } else {
            MarketRegime::TransitionMixedSignals
        }
    }
}

impl Default for MarketRegimeDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// (mean of the trailing window, mean of everything before it)
fn split_means(series: &[f64]) -> (f64, f64) {
    let split = series.len().saturating_sub(RECENT_WINDOW);
    let (history, recent) = series.split_at(split);
    (stats::mean(recent), stats::mean(history))
}

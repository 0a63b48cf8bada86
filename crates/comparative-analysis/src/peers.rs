use std::collections::BTreeMap;

use analysis_core::stats;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Where a company sits relative to its peers, bucketed by z-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeerPosition {
    SignificantlyAbove,
    Above,
    InLine,
    Below,
    SignificantlyBelow,
}

impl PeerPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeerPosition::SignificantlyAbove => "Significantly above peers",
            PeerPosition::Above => "Above peers",
            PeerPosition::InLine => "In line with peers",
            PeerPosition::Below => "Below peers",
            PeerPosition::SignificantlyBelow => "Significantly below peers",
        }
    }
}

pub fn interpret_z_score(z_score: f64) -> PeerPosition {
    if z_score > 2.0 {
        PeerPosition::SignificantlyAbove
    } else if z_score > 1.0 {
        PeerPosition::Above
    } else if z_score > -1.0 {
        PeerPosition::InLine
    } else if z_score > -2.0 {
        PeerPosition::Below
    } else {
        PeerPosition::SignificantlyBelow
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeMetric {
    pub company_value: f64,
    pub peer_count: usize,
    pub peer_mean: f64,
    pub peer_median: f64,
    /// Share of peers strictly below the company, in percent (0-100).
    pub percentile_rank: f64,
    pub z_score: f64,
    pub interpretation: PeerPosition,
}

/// Compare every company metric with the peers that report it.
///
/// Peers missing a metric are skipped for that metric; a metric no peer
/// reports is left out of the result.
pub fn calculate_relative_metrics(
    company_metrics: &BTreeMap<String, f64>,
    peer_metrics: &[BTreeMap<String, f64>],
) -> BTreeMap<String, RelativeMetric> {
    let mut results = BTreeMap::new();

    for (metric, &company_value) in company_metrics {
        let peer_values: Vec<f64> = peer_metrics
            .iter()
            .filter_map(|peer| peer.get(metric).copied())
            .collect();
        if peer_values.is_empty() {
            tracing::debug!("No peer reports `{}`, skipping", metric);
            continue;
        }

        let below = peer_values.iter().filter(|&&v| v < company_value).count();
        let percentile_rank = below as f64 / peer_values.len() as f64 * 100.0;

        let peer_mean = peer_values.iter().mean();
        let peer_std = if peer_values.len() > 1 {
            peer_values.iter().std_dev()
        } else {
            0.0
        };
        let z_score = if peer_std > 0.0 {
            (company_value - peer_mean) / peer_std
        } else {
            0.0
        };

        results.insert(
            metric.clone(),
            RelativeMetric {
                company_value,
                peer_count: peer_values.len(),
                peer_mean,
                peer_median: stats::median(&peer_values),
                percentile_rank,
                z_score,
                interpretation: interpret_z_score(z_score),
            },
        );
    }

    results
}

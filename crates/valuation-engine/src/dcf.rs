use analysis_core::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

/// WACC used when market cap and debt are both zero.
pub const DEFAULT_WACC: f64 = 0.10;

/// Enterprise-to-per-share decomposition of one DCF run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DcfResult {
    pub intrinsic_value_per_share: f64,
    pub enterprise_value: f64,
    pub equity_value: f64,
    pub pv_of_projection: f64,
    pub pv_of_terminal_value: f64,
    pub terminal_value: f64,
}

/// Weighted average cost of capital from market-value weights.
pub fn calculate_wacc(market_cap: f64, total_debt: f64, cost_of_equity: f64, cost_of_debt: f64, tax_rate: f64) -> f64 {
    let total_value = market_cap + total_debt;
    if total_value == 0.0 {
        return DEFAULT_WACC;
    }

    let equity_weight = market_cap / total_value;
    let debt_weight = total_debt / total_value;
    equity_weight * cost_of_equity + debt_weight * cost_of_debt * (1.0 - tax_rate)
}

/// Gordon growth terminal value. 0 when the discount rate does not exceed
/// growth, so composite valuations still produce a conservative number.
pub fn calculate_terminal_value(final_fcf: f64, terminal_growth: f64, wacc: f64) -> f64 {
    if wacc <= terminal_growth {
        return 0.0;
    }
    final_fcf * (1.0 + terminal_growth) / (wacc - terminal_growth)
}

/// Discount a free cash flow projection plus its terminal value.
///
/// Cash flow `t` (1-based) is discounted at `(1 + wacc)^t`; the terminal value
/// at the last projection year. Per-share value is 0 when `shares_outstanding`
/// is not positive.
pub fn calculate_dcf_value(
    fcf_projections: &[f64],
    terminal_growth: f64,
    wacc: f64,
    net_debt: f64,
    shares_outstanding: f64,
) -> Result<DcfResult> {
    let Some(&final_fcf) = fcf_projections.last() else {
        return Err(AnalysisError::InvalidParameter(
            "DCF needs at least one projected cash flow".to_string(),
        ));
    };

    if wacc <= terminal_growth {
        tracing::warn!(
            "WACC {:.4} does not exceed terminal growth {:.4}, terminal value set to 0",
            wacc,
            terminal_growth
        );
    }

    Ok(discount(fcf_projections, final_fcf, terminal_growth, wacc, net_debt, shares_outstanding))
}

/// Non-empty projection guaranteed by the caller.
pub(crate) fn discount(
    fcf_projections: &[f64],
    final_fcf: f64,
    terminal_growth: f64,
    wacc: f64,
    net_debt: f64,
    shares_outstanding: f64,
) -> DcfResult {
    let pv_of_projection: f64 = fcf_projections
        .iter()
        .enumerate()
        .map(|(i, fcf)| fcf / (1.0 + wacc).powi(i as i32 + 1))
        .sum();

    let terminal_value = calculate_terminal_value(final_fcf, terminal_growth, wacc);
    let pv_of_terminal_value = terminal_value / (1.0 + wacc).powi(fcf_projections.len() as i32);

    let enterprise_value = pv_of_projection + pv_of_terminal_value;
    let equity_value = enterprise_value - net_debt;
    let intrinsic_value_per_share = if shares_outstanding > 0.0 {
        equity_value / shares_outstanding
    } else {
        0.0
    };

    DcfResult {
        intrinsic_value_per_share,
        enterprise_value,
        equity_value,
        pv_of_projection,
        pv_of_terminal_value,
        terminal_value,
    }
}

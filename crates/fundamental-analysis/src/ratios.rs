//! Ratios derived from assembled statements.
//!
//! Inputs are paired by fiscal period end, never by position: a ratio at
//! `periods_back` uses the `periods_back`-th newest period that every one of
//! its inputs reports. A ratio is absent when no such period exists or its
//! denominator is zero.

use analysis_core::FinancialStatement;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::metrics::{AltmanInputs, PiotroskiInputs};

/// One line item of one statement.
type Input<'a> = (&'a FinancialStatement, &'a str);

/// Period ends reported by every input, newest first.
fn common_periods(inputs: &[Input<'_>]) -> Vec<NaiveDate> {
    let mut ends = inputs
        .iter()
        .map(|(statement, name)| statement.line_item(name).map(|item| item.period_ends()).unwrap_or_default());
    let Some(first) = ends.next() else {
        return Vec::new();
    };
    ends.fold(first, |common, other| common.into_iter().filter(|d| other.contains(d)).collect())
}

/// Every input's value on the `periods_back`-th period they all report.
fn aligned<const N: usize>(inputs: [Input<'_>; N], periods_back: usize) -> Option<[f64; N]> {
    let period_end = *common_periods(&inputs).get(periods_back)?;
    let mut values = [0.0; N];
    for (slot, (statement, name)) in values.iter_mut().zip(inputs) {
        *slot = statement.value_on(name, period_end)?;
    }
    Some(values)
}

fn ratio(numerator: Input<'_>, denominator: Input<'_>, periods_back: usize) -> Option<f64> {
    let [n, d] = aligned([numerator, denominator], periods_back)?;
    (d != 0.0).then(|| n / d)
}

fn change(current: Option<f64>, prior: Option<f64>) -> Option<f64> {
    Some(current? - prior?)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedRatios {
    pub net_margin: Option<f64>,
    pub gross_margin: Option<f64>,
    pub operating_margin: Option<f64>,
    pub current_ratio: Option<f64>,
    pub debt_to_assets: Option<f64>,
    pub roe: Option<f64>,
    pub roa: Option<f64>,
    pub free_cash_flow: Option<f64>,
}

impl DerivedRatios {
    pub fn from_statements(income: &FinancialStatement, balance: &FinancialStatement, cash_flow: &FinancialStatement) -> Self {
        Self::at_period(income, balance, cash_flow, 0)
    }

    pub fn at_period(income: &FinancialStatement, balance: &FinancialStatement, cash_flow: &FinancialStatement, periods_back: usize) -> Self {
        let revenues = (income, "revenues");
        let net_income = (income, "net_income");
        let total_assets = (balance, "total_assets");

        let free_cash_flow = aligned(
            [(cash_flow, "operating_cash_flow"), (cash_flow, "capital_expenditures")],
            periods_back,
        )
        .map(|[ocf, capex]| ocf - capex.abs());

        Self {
            net_margin: ratio(net_income, revenues, periods_back),
            gross_margin: gross_margin(income, periods_back),
            operating_margin: ratio((income, "operating_income"), revenues, periods_back),
            current_ratio: ratio((balance, "current_assets"), (balance, "current_liabilities"), periods_back),
            debt_to_assets: ratio((balance, "total_liabilities"), total_assets, periods_back),
            roe: ratio(net_income, (balance, "total_equity"), periods_back),
            roa: ratio(net_income, total_assets, periods_back),
            free_cash_flow,
        }
    }
}

/// Reported gross profit over revenue, else revenue less cost of revenue.
fn gross_margin(income: &FinancialStatement, periods_back: usize) -> Option<f64> {
    ratio((income, "gross_profit"), (income, "revenues"), periods_back).or_else(|| {
        let [revenue, cost] = aligned([(income, "revenues"), (income, "cost_of_revenue")], periods_back)?;
        (revenue != 0.0).then(|| (revenue - cost) / revenue)
    })
}

/// Share count source: the balance sheet, else the income statement's basic
/// weighted average.
fn shares_input<'a>(income: &'a FinancialStatement, balance: &'a FinancialStatement) -> Input<'a> {
    match balance.line_item("shares_outstanding") {
        Some(item) if !item.is_empty() => (balance, "shares_outstanding"),
        _ => (income, "shares_outstanding_basic"),
    }
}

impl PiotroskiInputs {
    /// Year-over-year inputs from the two most recent periods. Changes need
    /// both periods; levels need only the current one.
    pub fn from_statements(income: &FinancialStatement, balance: &FinancialStatement, cash_flow: &FinancialStatement) -> Self {
        let current = DerivedRatios::at_period(income, balance, cash_flow, 0);
        let prior = DerivedRatios::at_period(income, balance, cash_flow, 1);

        let leverage = |p| ratio((balance, "long_term_debt"), (balance, "total_assets"), p);
        let asset_turnover = |p| ratio((income, "revenues"), (balance, "total_assets"), p);
        let shares = shares_input(income, balance);
        let shares_at = |p| aligned([shares], p).map(|[s]| s);

        // Earnings quality compares cash flow and net income of the same year
        let (operating_cash_flow, net_income) =
            match aligned([(cash_flow, "operating_cash_flow"), (income, "net_income")], 0) {
                Some([ocf, ni]) => (Some(ocf), Some(ni)),
                None => (cash_flow.latest("operating_cash_flow"), None),
            };

        let inputs = Self {
            roa: current.roa,
            operating_cash_flow,
            roa_change: change(current.roa, prior.roa),
            net_income,
            leverage_change: change(leverage(0), leverage(1)),
            current_ratio_change: change(current.current_ratio, prior.current_ratio),
            shares_change: change(shares_at(0), shares_at(1)),
            gross_margin_change: change(current.gross_margin, prior.gross_margin),
            asset_turnover_change: change(asset_turnover(0), asset_turnover(1)),
        };

        tracing::debug!("Piotroski inputs for {}: {:?}", income.company_name, inputs);
        inputs
    }
}

impl AltmanInputs {
    /// Inputs for the latest period every line item reports. `None` when any
    /// statement input is missing, since a partial Z-score would be
    /// misleading.
    pub fn from_statements(income: &FinancialStatement, balance: &FinancialStatement, market_value_equity: f64) -> Option<Self> {
        let [current_assets, current_liabilities, total_assets, retained_earnings, total_liabilities, ebit, sales] =
            aligned(
                [
                    (balance, "current_assets"),
                    (balance, "current_liabilities"),
                    (balance, "total_assets"),
                    (balance, "retained_earnings"),
                    (balance, "total_liabilities"),
                    (income, "operating_income"),
                    (income, "revenues"),
                ],
                0,
            )?;

        Some(Self {
            working_capital: current_assets - current_liabilities,
            total_assets,
            retained_earnings,
            ebit,
            market_value_equity,
            total_liabilities,
            sales,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{calculate_altman_z_score, calculate_piotroski_f_score};
    use analysis_core::{NormalizedLineItem, PeriodKind, RawObservation, StatementType};
    use approx::assert_relative_eq;
    use std::collections::BTreeMap;

    fn statement(statement_type: StatementType, items: &[(&str, &[f64])]) -> FinancialStatement {
        statement_ending(2023, statement_type, items)
    }

    /// Values are newest first, one fiscal year apart, the first ending in
    /// `latest_year`.
    fn statement_ending(latest_year: i32, statement_type: StatementType, items: &[(&str, &[f64])]) -> FinancialStatement {
        let line_items: BTreeMap<String, Option<NormalizedLineItem>> = items
            .iter()
            .map(|(name, values)| {
                let values = values
                    .iter()
                    .enumerate()
                    .map(|(i, &value)| RawObservation {
                        value,
                        period_end: NaiveDate::from_ymd_opt(latest_year - i as i32, 12, 31).unwrap(),
                        period_start: None,
                        source_form: "10-K".to_string(),
                        filed_date: NaiveDate::from_ymd_opt(latest_year + 1 - i as i32, 2, 15).unwrap(),
                        accession_id: format!("accn-{}", i),
                    })
                    .collect();
                let item = NormalizedLineItem {
                    description: name.to_string(),
                    unit: "USD".to_string(),
                    values,
                };
                (name.to_string(), Some(item))
            })
            .collect();

        FinancialStatement {
            company_id: "0000000001".to_string(),
            company_name: "Example Corp".to_string(),
            statement_type,
            period_kind: PeriodKind::Annual,
            line_items,
        }
    }

    fn income() -> FinancialStatement {
        statement(
            StatementType::Income,
            &[
                ("revenues", &[1_000.0, 900.0]),
                ("cost_of_revenue", &[600.0, 560.0]),
                ("operating_income", &[200.0, 150.0]),
                ("net_income", &[150.0, 100.0]),
            ],
        )
    }

    fn balance() -> FinancialStatement {
        statement(
            StatementType::Balance,
            &[
                ("total_assets", &[2_000.0, 2_000.0]),
                ("current_assets", &[600.0, 500.0]),
                ("current_liabilities", &[300.0, 300.0]),
                ("total_liabilities", &[800.0, 900.0]),
                ("long_term_debt", &[400.0, 500.0]),
                ("retained_earnings", &[700.0, 600.0]),
                ("total_equity", &[1_200.0, 1_100.0]),
                ("shares_outstanding", &[100.0, 100.0]),
            ],
        )
    }

    fn cash_flow() -> FinancialStatement {
        statement(
            StatementType::CashFlow,
            &[
                ("operating_cash_flow", &[220.0, 180.0]),
                ("capital_expenditures", &[-70.0, 60.0]),
            ],
        )
    }

    #[test]
    fn test_derived_ratios() {
        let r = DerivedRatios::from_statements(&income(), &balance(), &cash_flow());
        assert_relative_eq!(r.net_margin.unwrap(), 0.15);
        // No gross_profit line: falls back to revenue - cost of revenue
        assert_relative_eq!(r.gross_margin.unwrap(), 0.4);
        assert_relative_eq!(r.operating_margin.unwrap(), 0.2);
        assert_relative_eq!(r.current_ratio.unwrap(), 2.0);
        assert_relative_eq!(r.debt_to_assets.unwrap(), 0.4);
        assert_relative_eq!(r.roe.unwrap(), 0.125);
        assert_relative_eq!(r.roa.unwrap(), 0.075);
        // Capex sign is ignored
        assert_relative_eq!(r.free_cash_flow.unwrap(), 150.0);
    }

    #[test]
    fn test_missing_or_zero_denominator_is_absent() {
        let empty = statement(StatementType::CashFlow, &[]);
        let zero_equity = statement(
            StatementType::Balance,
            &[("total_equity", &[0.0]), ("total_assets", &[100.0])],
        );
        let r = DerivedRatios::from_statements(&income(), &zero_equity, &empty);
        assert_eq!(r.roe, None);
        assert_eq!(r.current_ratio, None);
        assert_eq!(r.free_cash_flow, None);
        assert_relative_eq!(r.roa.unwrap(), 1.5);
    }

    #[test]
    fn test_piotroski_from_statements() {
        let inputs = PiotroskiInputs::from_statements(&income(), &balance(), &cash_flow());
        assert_relative_eq!(inputs.roa_change.unwrap(), 0.025, epsilon = 1e-12);
        assert_relative_eq!(inputs.leverage_change.unwrap(), -0.05, epsilon = 1e-12);
        assert_eq!(inputs.shares_change, Some(0.0));

        let score = calculate_piotroski_f_score(&inputs);
        let c = score.criteria;
        assert!(c.positive_roa && c.positive_ocf && c.increasing_roa && c.quality_earnings);
        assert!(c.decreasing_leverage && c.increasing_liquidity && c.no_dilution);
        // 0.4 vs 0.3778 gross margin, 0.5 vs 0.45 turnover
        assert!(c.increasing_margin && c.increasing_efficiency);
        assert_eq!(score.score, 9);
    }

    #[test]
    fn test_piotroski_single_period_leaves_changes_absent() {
        let income = statement(StatementType::Income, &[("revenues", &[500.0]), ("net_income", &[-10.0])]);
        let balance = statement(StatementType::Balance, &[("total_assets", &[1_000.0])]);
        let cash_flow = statement(StatementType::CashFlow, &[("operating_cash_flow", &[5.0])]);

        let inputs = PiotroskiInputs::from_statements(&income, &balance, &cash_flow);
        assert_eq!(inputs.roa_change, None);
        assert_eq!(inputs.shares_change, None);

        let score = calculate_piotroski_f_score(&inputs);
        // positive OCF and OCF above a net loss
        assert_eq!(score.score, 2);
    }

    #[test]
    fn test_altman_inputs_from_statements() {
        let inputs = AltmanInputs::from_statements(&income(), &balance(), 1_600.0).unwrap();
        assert_eq!(inputs.working_capital, 300.0);
        let z = calculate_altman_z_score(&inputs);
        // 1.2*0.15 + 1.4*0.35 + 3.3*0.1 + 0.6*2.0 + 1.0*0.5
        assert_relative_eq!(z.score, 2.7, epsilon = 1e-9);
        assert_eq!(z.classification(), "Grey Zone");

        let sparse = statement(StatementType::Balance, &[("total_assets", &[1.0])]);
        assert!(AltmanInputs::from_statements(&income(), &sparse, 1.0).is_none());
    }

    #[test]
    fn test_ratios_pair_inputs_by_fiscal_year() {
        // Net income lags: no 2023 figure yet
        let income = statement_ending(2022, StatementType::Income, &[("net_income", &[100.0, 80.0])]);
        let balance = statement(StatementType::Balance, &[("total_assets", &[2_000.0, 1_000.0])]);
        let cash_flow = statement(StatementType::CashFlow, &[]);

        let r = DerivedRatios::from_statements(&income, &balance, &cash_flow);
        // 2022 net income over 2022 assets
        assert_relative_eq!(r.roa.unwrap(), 0.1);
        // Only one common year, so no prior period
        assert_eq!(DerivedRatios::at_period(&income, &balance, &cash_flow, 1).roa, None);
    }

    #[test]
    fn test_duplicate_period_filings_do_not_shift_years() {
        let mut balance = statement(StatementType::Balance, &[("total_assets", &[2_000.0, 1_000.0])]);
        // A later filing restating 2023 sorts ahead of the original one
        let assets = balance.line_items.get_mut("total_assets").unwrap().as_mut().unwrap();
        let mut restated = assets.values[0].clone();
        restated.value = 2_500.0;
        restated.filed_date = NaiveDate::from_ymd_opt(2025, 2, 15).unwrap();
        assets.values.insert(0, restated);

        let income = statement(StatementType::Income, &[("net_income", &[250.0, 50.0])]);
        let cash_flow = statement(StatementType::CashFlow, &[]);

        assert_relative_eq!(DerivedRatios::at_period(&income, &balance, &cash_flow, 0).roa.unwrap(), 0.1);
        assert_relative_eq!(DerivedRatios::at_period(&income, &balance, &cash_flow, 1).roa.unwrap(), 0.05);
    }

    #[test]
    fn test_altman_inputs_use_one_common_year() {
        let lagging_income = statement_ending(
            2022,
            StatementType::Income,
            &[("revenues", &[900.0]), ("operating_income", &[150.0])],
        );
        let inputs = AltmanInputs::from_statements(&lagging_income, &balance(), 1_600.0).unwrap();
        // 2022 balance sheet alongside 2022 income
        assert_eq!(inputs.working_capital, 200.0);
        assert_eq!(inputs.total_liabilities, 900.0);
        assert_eq!(inputs.sales, 900.0);
    }
}

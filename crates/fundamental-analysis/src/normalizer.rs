use std::cmp::Ordering;

use analysis_core::{AnalysisError, ConceptSeries, FactsDocument, NormalizedLineItem, PeriodKind, RawObservation, Result};
use serde::{Deserialize, Serialize};

/// What kind of unit a concept is expected to be reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedUnit {
    Currency,
    CurrencyPerShare,
    Shares,
}

/// Period kind, horizon and taxonomy for one statement request.
///
/// Construction validates the horizon, so everything downstream can treat the
/// request as well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementRequest {
    pub period_kind: PeriodKind,
    pub horizon: usize,
    pub taxonomy: String,
}

impl StatementRequest {
    pub fn new(period_kind: PeriodKind, horizon: usize) -> Result<Self> {
        if horizon == 0 {
            return Err(AnalysisError::InvalidParameter(
                "horizon must be at least one year".to_string(),
            ));
        }
        Ok(Self {
            period_kind,
            horizon,
            taxonomy: FactsDocument::US_GAAP.to_string(),
        })
    }

    pub fn annual(horizon: usize) -> Result<Self> {
        Self::new(PeriodKind::Annual, horizon)
    }

    pub fn quarterly(horizon: usize) -> Result<Self> {
        Self::new(PeriodKind::Quarterly, horizon)
    }

    pub fn with_taxonomy(mut self, taxonomy: impl Into<String>) -> Self {
        self.taxonomy = taxonomy.into();
        self
    }

    /// Maximum number of observations a line item may carry.
    pub fn max_periods(&self) -> usize {
        self.horizon.saturating_mul(self.period_kind.periods_per_year())
    }
}

/// Form families and accepted units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    pub reporting_currency: String,
    pub currency_suffixes: Vec<String>,
    pub annual_forms: Vec<String>,
    pub quarterly_forms: Vec<String>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            reporting_currency: "USD".to_string(),
            currency_suffixes: ["USD", "EUR", "GBP", "JPY", "CAD", "CHF", "CNY", "AUD"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            annual_forms: vec!["10-K".to_string(), "20-F".to_string(), "40-F".to_string()],
            quarterly_forms: vec!["10-Q".to_string()],
        }
    }
}

impl NormalizerConfig {
    pub fn forms_for(&self, period_kind: PeriodKind) -> &[String] {
        match period_kind {
            PeriodKind::Annual => &self.annual_forms,
            PeriodKind::Quarterly => &self.quarterly_forms,
        }
    }

    pub fn expected_label(&self, unit: ExpectedUnit) -> String {
        match unit {
            ExpectedUnit::Currency => self.reporting_currency.clone(),
            ExpectedUnit::CurrencyPerShare => format!("{}/shares", self.reporting_currency),
            ExpectedUnit::Shares => "shares".to_string(),
        }
    }

    fn is_currency(&self, label: &str) -> bool {
        self.currency_suffixes.iter().any(|suffix| label.ends_with(suffix.as_str()))
    }

    /// Whether `label` is a stand-in of the same kind as `expected`: `shares`
    /// only for share counts, `<currency>/shares` for per-share amounts.
    fn is_accepted_unit(&self, label: &str, expected: ExpectedUnit) -> bool {
        match expected {
            ExpectedUnit::Currency => self.is_currency(label),
            ExpectedUnit::CurrencyPerShare => label
                .strip_suffix("/shares")
                .is_some_and(|currency| self.is_currency(currency)),
            ExpectedUnit::Shares => label == "shares",
        }
    }
}

/// Reduces a raw concept series to one sorted, horizon-bounded line item.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Pick the unit sub-series: the exact expected label, else the first unit
    /// of the same kind (currency-like, or `shares` for share counts), else the
    /// first unit at all.
    pub fn select_unit<'a>(&self, series: &'a ConceptSeries, expected: ExpectedUnit) -> Option<(&'a str, &'a [RawObservation])> {
        let expected_label = self.config.expected_label(expected);
        if let Some((label, values)) = series.units.get_key_value(expected_label.as_str()) {
            return Some((label.as_str(), values.as_slice()));
        }

        series
            .units
            .iter()
            .find(|(label, _)| self.config.is_accepted_unit(label, expected))
            .or_else(|| series.units.iter().next())
            .map(|(label, values)| (label.as_str(), values.as_slice()))
    }

    /// Filter by form family, sort newest first and truncate to the request's
    /// horizon. An empty result is still a line item: the concept exists, it
    /// just has no filings of this cadence.
    pub fn normalize(&self, series: &ConceptSeries, expected: ExpectedUnit, request: &StatementRequest) -> NormalizedLineItem {
        let description = series.description.clone().unwrap_or_default();

        let Some((unit, observations)) = self.select_unit(series, expected) else {
            return NormalizedLineItem {
                description,
                unit: "unknown".to_string(),
                values: Vec::new(),
            };
        };

        let forms = self.config.forms_for(request.period_kind);
        let mut values: Vec<RawObservation> = observations
            .iter()
            .filter(|obs| forms.iter().any(|form| form == &obs.source_form))
            .cloned()
            .collect();

        values.sort_by(newest_first);
        values.truncate(request.max_periods());

        NormalizedLineItem {
            description,
            unit: unit.to_string(),
            values,
        }
    }
}

/// Period end descending, then filing date descending, then accession id
/// ascending.
fn newest_first(a: &RawObservation, b: &RawObservation) -> Ordering {
    b.period_end
        .cmp(&a.period_end)
        .then_with(|| b.filed_date.cmp(&a.filed_date))
        .then_with(|| a.accession_id.cmp(&b.accession_id))
}

/// Normalize with the default configuration, expecting a currency unit.
pub fn normalize(series: &ConceptSeries, request: &StatementRequest) -> NormalizedLineItem {
    Normalizer::default().normalize(series, ExpectedUnit::Currency, request)
}

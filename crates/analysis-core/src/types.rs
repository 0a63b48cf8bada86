use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One reported value for a tag in a given unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub value: f64,
    pub period_end: NaiveDate,
    #[serde(default)]
    pub period_start: Option<NaiveDate>,
    pub source_form: String,
    pub filed_date: NaiveDate,
    pub accession_id: String,
}

/// All observations reported under a single tag, keyed by unit label
/// (`USD`, `USD/shares`, `shares`, ...).
///
/// Units iterate in lexicographic order, so "first available unit" is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptSeries {
    #[serde(default)]
    pub description: Option<String>,
    pub units: BTreeMap<String, Vec<RawObservation>>,
}

impl ConceptSeries {
    pub fn unit(&self, label: &str) -> Option<&[RawObservation]> {
        self.units.get(label).map(Vec::as_slice)
    }

    pub fn observation_count(&self) -> usize {
        self.units.values().map(Vec::len).sum()
    }
}

/// Tag name -> series, for one taxonomy (`us-gaap`, `ifrs-full`, `dei`, ...).
pub type Taxonomy = BTreeMap<String, ConceptSeries>;

/// Structured facts for one filer, already coerced to numeric observations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactsDocument {
    pub entity_name: String,
    /// Ten-digit, zero-padded CIK when the source carried one.
    #[serde(default)]
    pub cik: Option<String>,
    pub facts: BTreeMap<String, Taxonomy>,
}

impl FactsDocument {
    pub const US_GAAP: &'static str = "us-gaap";

    pub fn taxonomy(&self, name: &str) -> Option<&Taxonomy> {
        self.facts.get(name)
    }

    /// Identifier used on assembled statements: the CIK, or the entity name
    /// when no CIK was reported.
    pub fn company_id(&self) -> &str {
        self.cik.as_deref().unwrap_or(&self.entity_name)
    }
}

/// Reporting cadence of a statement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Annual,
    Quarterly,
}

impl PeriodKind {
    /// Number of reported periods per requested horizon unit.
    pub fn periods_per_year(&self) -> usize {
        match self {
            PeriodKind::Annual => 1,
            PeriodKind::Quarterly => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKind::Annual => "annual",
            PeriodKind::Quarterly => "quarterly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementType {
    Income,
    Balance,
    CashFlow,
}

impl StatementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementType::Income => "income_statement",
            StatementType::Balance => "balance_sheet",
            StatementType::CashFlow => "cash_flow_statement",
        }
    }
}

/// A resolved concept reduced to the periods a request asked for.
///
/// `values` is sorted by `period_end` descending and never longer than the
/// request's period limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedLineItem {
    pub description: String,
    pub unit: String,
    pub values: Vec<RawObservation>,
}

impl NormalizedLineItem {
    pub fn latest(&self) -> Option<f64> {
        self.values.first().map(|o| o.value)
    }

    /// Value `periods_back` periods before the latest one.
    pub fn value_at(&self, periods_back: usize) -> Option<f64> {
        self.values.get(periods_back).map(|o| o.value)
    }

    /// Value reported for the period ending on `period_end`. With duplicate
    /// filings for one period, the most recently filed one wins.
    pub fn value_on(&self, period_end: NaiveDate) -> Option<f64> {
        self.values.iter().find(|o| o.period_end == period_end).map(|o| o.value)
    }

    /// Distinct period ends, newest first.
    pub fn period_ends(&self) -> Vec<NaiveDate> {
        let mut ends: Vec<NaiveDate> = self.values.iter().map(|o| o.period_end).collect();
        ends.dedup();
        ends
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One assembled statement. A `None` slot means the concept was not disclosed
/// under any of its candidate tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatement {
    pub company_id: String,
    pub company_name: String,
    pub statement_type: StatementType,
    pub period_kind: PeriodKind,
    pub line_items: BTreeMap<String, Option<NormalizedLineItem>>,
}

impl FinancialStatement {
    pub fn line_item(&self, name: &str) -> Option<&NormalizedLineItem> {
        self.line_items.get(name).and_then(Option::as_ref)
    }

    pub fn latest(&self, name: &str) -> Option<f64> {
        self.line_item(name).and_then(NormalizedLineItem::latest)
    }

    pub fn value_at(&self, name: &str, periods_back: usize) -> Option<f64> {
        self.line_item(name).and_then(|item| item.value_at(periods_back))
    }

    pub fn value_on(&self, name: &str, period_end: NaiveDate) -> Option<f64> {
        self.line_item(name).and_then(|item| item.value_on(period_end))
    }

    /// Names of registry concepts that resolved to no tag at all.
    pub fn missing_concepts(&self) -> Vec<&str> {
        self.line_items
            .iter()
            .filter(|(_, item)| item.is_none())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

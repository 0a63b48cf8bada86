//! Ingestion boundary for company-facts documents.
//!
//! Accepts the SEC `companyfacts` JSON shape (`entityName`, `val`, `end`,
//! `form`, `filed`, `accn`) as well as the descriptive field names
//! (`entity_name`, `value`, `period_end`, `source_form`, `filed_date`,
//! `accession_id`). Every raw value is coerced to `f64` here; records whose
//! value or dates cannot be interpreted are dropped, never zero-filled.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{AnalysisError, ConceptSeries, FactsDocument, RawObservation, Result, Taxonomy};

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default, alias = "entityName")]
    entity_name: Option<String>,
    #[serde(default)]
    cik: Option<Value>,
    #[serde(default)]
    facts: Option<BTreeMap<String, Value>>,
}

/// Counts of records kept and dropped while ingesting one document.
#[derive(Default)]
struct IngestTally {
    kept: usize,
    skipped: usize,
}

impl FactsDocument {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawDocument = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    pub fn from_json_value(value: Value) -> Result<Self> {
        let raw: RawDocument = serde_json::from_value(value)?;
        Self::from_raw(raw)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    fn from_raw(raw: RawDocument) -> Result<Self> {
        let raw_facts = raw
            .facts
            .ok_or_else(|| AnalysisError::InvalidData("facts document has no `facts` object".to_string()))?;

        let entity_name = raw.entity_name.unwrap_or_else(|| "Unknown Company".to_string());
        let cik = raw.cik.as_ref().and_then(format_cik);

        let mut tally = IngestTally::default();
        let mut facts = BTreeMap::new();

        for (taxonomy_name, concepts) in raw_facts {
            let Some(concepts) = concepts.as_object() else {
                tracing::debug!("Taxonomy `{}` is not an object, skipping", taxonomy_name);
                continue;
            };

            let mut taxonomy = Taxonomy::new();
            for (tag, concept) in concepts {
                match ingest_concept(&taxonomy_name, tag, concept, &mut tally) {
                    Some(series) => {
                        taxonomy.insert(tag.clone(), series);
                    }
                    None => tracing::debug!("{}/{} is not a concept object, skipping", taxonomy_name, tag),
                }
            }
            facts.insert(taxonomy_name, taxonomy);
        }

        tracing::info!(
            "Ingested facts for {}: {} observations kept, {} skipped",
            entity_name,
            tally.kept,
            tally.skipped
        );

        Ok(FactsDocument { entity_name, cik, facts })
    }
}

fn ingest_concept(taxonomy: &str, tag: &str, concept: &Value, tally: &mut IngestTally) -> Option<ConceptSeries> {
    let concept = concept.as_object()?;
    let text = |key: &str| concept.get(key).and_then(Value::as_str).map(str::to_string);

    let mut units = BTreeMap::new();
    if let Some(raw_units) = concept.get("units").and_then(Value::as_object) {
        for (unit, records) in raw_units {
            let Some(records) = records.as_array() else {
                tracing::debug!("{}/{} [{}]: unit is not a record list, skipping", taxonomy, tag, unit);
                continue;
            };
            let observations: Vec<RawObservation> = records.iter().filter_map(into_observation).collect();

            let dropped = records.len() - observations.len();
            if dropped > 0 {
                tracing::debug!("{}/{} [{}]: dropped {} malformed observation(s)", taxonomy, tag, unit, dropped);
            }
            tally.skipped += dropped;
            tally.kept += observations.len();
            units.insert(unit.clone(), observations);
        }
    }

    Some(ConceptSeries {
        description: text("description").or_else(|| text("label")),
        units,
    })
}

/// First present field among the SEC name and the descriptive name.
fn field<'a>(record: &'a Map<String, Value>, sec_name: &str, name: &str) -> Option<&'a Value> {
    record
        .get(sec_name)
        .or_else(|| record.get(name))
        .filter(|v| !v.is_null())
}

/// One record, or `None` when the value or a required date cannot be read.
fn into_observation(record: &Value) -> Option<RawObservation> {
    let record = record.as_object()?;
    let date = |sec_name: &str, name: &str| field(record, sec_name, name).and_then(Value::as_str).and_then(parse_date);

    let value = coerce_number(field(record, "val", "value")?)?;
    let period_end = date("end", "period_end")?;
    let filed_date = date("filed", "filed_date")?;
    let source_form = field(record, "form", "source_form")?.as_str()?.trim().to_string();
    // An unreadable start date only loses the duration, not the value.
    let period_start = date("start", "period_start");
    let accession_id = match field(record, "accn", "accession_id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    Some(RawObservation {
        value,
        period_end,
        period_start,
        source_form,
        filed_date,
        accession_id,
    })
}

/// Coerce a JSON number or numeric string (thousands separators allowed) to a
/// finite `f64`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

/// Parse `YYYY-MM-DD`, tolerating a trailing time component.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| raw.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
}

/// Zero-pad a CIK (number or string) to ten digits.
pub fn format_cik(raw: &Value) -> Option<String> {
    let digits = match raw {
        Value::Number(n) => n.as_u64()?.to_string(),
        Value::String(s) if !s.trim().is_empty() && s.trim().chars().all(|c| c.is_ascii_digit()) => {
            s.trim().to_string()
        }
        _ => return None,
    };
    Some(format!("{:0>10}", digits))
}

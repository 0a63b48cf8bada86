//! Industry benchmark tables.
//!
//! The built-in table ships as `data/industry_benchmarks.json` and is versioned
//! with the crate; callers can load their own from a string or a file.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use analysis_core::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

const BUILTIN_TABLE: &str = include_str!("../data/industry_benchmarks.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Industry {
    Technology,
    Retail,
    Finance,
    Healthcare,
    Energy,
    Industrial,
    Consumer,
    Telecom,
    Utilities,
    RealEstate,
}

impl Industry {
    pub const ALL: [Industry; 10] = [
        Industry::Technology,
        Industry::Retail,
        Industry::Finance,
        Industry::Healthcare,
        Industry::Energy,
        Industry::Industrial,
        Industry::Consumer,
        Industry::Telecom,
        Industry::Utilities,
        Industry::RealEstate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Industry::Technology => "technology",
            Industry::Retail => "retail",
            Industry::Finance => "finance",
            Industry::Healthcare => "healthcare",
            Industry::Energy => "energy",
            Industry::Industrial => "industrial",
            Industry::Consumer => "consumer",
            Industry::Telecom => "telecom",
            Industry::Utilities => "utilities",
            Industry::RealEstate => "real_estate",
        }
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Industry {
    type Err = AnalysisError;

    /// Case-insensitive; spaces, dashes and underscores are ignored, so
    /// "Real Estate" and "realestate" both parse.
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        Industry::ALL
            .into_iter()
            .find(|industry| industry.as_str().replace('_', "") == key)
            .ok_or_else(|| AnalysisError::InvalidParameter(format!("unknown industry: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStage {
    Growth,
    Mature,
    Cyclical,
    Stable,
}

/// Typical capital structure, growth and margin profile for one industry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndustryBenchmark {
    pub beta: f64,
    /// Debt / (debt + equity).
    pub debt_ratio: f64,
    pub revenue_growth: f64,
    pub earnings_growth: f64,
    pub stage: LifecycleStage,
    pub gross_margin: f64,
    pub operating_margin: f64,
    pub net_margin: f64,
    /// Capex as a fraction of revenue.
    pub capex_intensity: f64,
    /// Working capital as a fraction of revenue.
    pub working_capital_intensity: f64,
}

impl IndustryBenchmark {
    /// Debt-to-equity implied by the debt ratio.
    pub fn debt_to_equity(&self) -> f64 {
        if self.debt_ratio >= 1.0 {
            return f64::INFINITY;
        }
        self.debt_ratio / (1.0 - self.debt_ratio)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryTable {
    pub version: String,
    /// Used for any industry the table does not list.
    pub default: IndustryBenchmark,
    #[serde(default)]
    pub industries: BTreeMap<Industry, IndustryBenchmark>,
}

impl IndustryTable {
    /// The table bundled with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_TABLE)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let table: IndustryTable = serde_json::from_str(json)?;
        table.validate()?;
        tracing::debug!(
            "Loaded industry table v{} with {} industries",
            table.version,
            table.industries.len()
        );
        Ok(table)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> Result<()> {
        let entries = std::iter::once(("default", &self.default))
            .chain(self.industries.iter().map(|(industry, b)| (industry.as_str(), b)));
        for (name, benchmark) in entries {
            if !(0.0..1.0).contains(&benchmark.debt_ratio) {
                return Err(AnalysisError::InvalidData(format!(
                    "industry `{}` has debt ratio {} outside [0, 1)",
                    name, benchmark.debt_ratio
                )));
            }
        }
        Ok(())
    }

    /// Benchmark for `industry`, or the default entry when it is not listed.
    pub fn get(&self, industry: Industry) -> &IndustryBenchmark {
        self.industries.get(&industry).unwrap_or(&self.default)
    }

    /// Look up by free-form name; unknown names get the default entry.
    pub fn lookup(&self, name: &str) -> &IndustryBenchmark {
        match name.parse::<Industry>() {
            Ok(industry) => self.get(industry),
            Err(_) => {
                tracing::debug!("No benchmark for industry `{}`, using default", name);
                &self.default
            }
        }
    }

    /// Replace or add one industry's benchmark.
    pub fn with_override(mut self, industry: Industry, benchmark: IndustryBenchmark) -> Self {
        self.industries.insert(industry, benchmark);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_builtin_table_covers_every_industry() {
        let table = IndustryTable::builtin().unwrap();
        for industry in Industry::ALL {
            assert!(table.industries.contains_key(&industry), "missing {}", industry);
        }
        let tech = table.get(Industry::Technology);
        assert_relative_eq!(tech.beta, 1.25);
        assert_eq!(tech.stage, LifecycleStage::Growth);
        assert_relative_eq!(table.get(Industry::Utilities).capex_intensity, 0.20);
        assert_eq!(table.get(Industry::RealEstate).stage, LifecycleStage::Cyclical);
    }

    #[test]
    fn test_industry_parsing() {
        assert_eq!("Technology".parse::<Industry>().unwrap(), Industry::Technology);
        assert_eq!("real estate".parse::<Industry>().unwrap(), Industry::RealEstate);
        assert_eq!("realestate".parse::<Industry>().unwrap(), Industry::RealEstate);
        assert!("biotech".parse::<Industry>().is_err());
    }

    #[test]
    fn test_unlisted_industry_falls_back_to_default() {
        let json = r#"{
            "version": "test",
            "default": {"beta": 1.0, "debt_ratio": 0.3, "revenue_growth": 0.05, "earnings_growth": 0.06,
                        "stage": "mature", "gross_margin": 0.4, "operating_margin": 0.15, "net_margin": 0.1,
                        "capex_intensity": 0.05, "working_capital_intensity": 0.1},
            "industries": {}
        }"#;
        let table = IndustryTable::from_json_str(json).unwrap();
        assert_eq!(table.get(Industry::Energy), &table.default);
        assert_eq!(table.lookup("biotech"), &table.default);
    }

    #[test]
    fn test_override_and_debt_to_equity() {
        let table = IndustryTable::builtin().unwrap();
        let mut custom = *table.get(Industry::Retail);
        custom.debt_ratio = 0.5;
        let table = table.with_override(Industry::Retail, custom);
        assert_relative_eq!(table.get(Industry::Retail).debt_to_equity(), 1.0);
    }

    #[test]
    fn test_invalid_debt_ratio_rejected() {
        let table = IndustryTable::builtin().unwrap();
        let mut json: serde_json::Value = serde_json::to_value(&table).unwrap();
        json["default"]["debt_ratio"] = serde_json::json!(1.5);
        let err = IndustryTable::from_json_str(&json.to_string()).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidData(_)));
    }
}

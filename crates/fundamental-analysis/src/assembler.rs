use std::collections::{BTreeMap, HashMap};

use analysis_core::{FactsDocument, FinancialStatement, NormalizedLineItem, StatementType};

use crate::normalizer::{Normalizer, NormalizerConfig, StatementRequest};
use crate::registry::{default_registry, ConceptSpec};
use crate::resolver::resolve_tag;

/// Builds statements from a facts document by running every registry concept
/// through the resolver and the normalizer.
#[derive(Debug, Clone)]
pub struct StatementAssembler {
    normalizer: Normalizer,
    registries: HashMap<StatementType, Vec<ConceptSpec>>,
}

impl StatementAssembler {
    pub fn new() -> Self {
        Self::with_config(NormalizerConfig::default())
    }

    pub fn with_config(config: NormalizerConfig) -> Self {
        let registries = [StatementType::Income, StatementType::Balance, StatementType::CashFlow]
            .into_iter()
            .map(|st| (st, default_registry(st)))
            .collect();
        Self {
            normalizer: Normalizer::new(config),
            registries,
        }
    }

    /// Replace the concept registry for one statement type.
    pub fn with_registry(mut self, statement_type: StatementType, registry: Vec<ConceptSpec>) -> Self {
        self.registries.insert(statement_type, registry);
        self
    }

    pub fn registry(&self, statement_type: StatementType) -> &[ConceptSpec] {
        self.registries
            .get(&statement_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn assemble(&self, facts: &FactsDocument, statement_type: StatementType, request: &StatementRequest) -> FinancialStatement {
        let taxonomy = facts.taxonomy(&request.taxonomy);
        if taxonomy.is_none() {
            tracing::debug!("{} has no `{}` taxonomy", facts.entity_name, request.taxonomy);
        }

        let mut line_items = BTreeMap::new();
        for concept in self.registry(statement_type) {
            let resolved = taxonomy.and_then(|t| resolve_tag(t, &concept.tags));
            let item = match resolved {
                Some((tag, series)) => {
                    let mut item = self.normalizer.normalize(series, concept.unit, request);
                    if item.description.is_empty() {
                        item.description = tag.to_string();
                    }
                    Some(item)
                }
                None => {
                    tracing::debug!(
                        "{}: `{}` not disclosed under any of {:?}",
                        facts.entity_name,
                        concept.name,
                        concept.tags
                    );
                    None
                }
            };
            line_items.insert(concept.name.clone(), item);
        }

        let populated = line_items
            .values()
            .filter(|item| item.as_ref().is_some_and(|i: &NormalizedLineItem| !i.is_empty()))
            .count();
        tracing::info!(
            "Assembled {} for {} ({}, horizon {}): {}/{} line items populated",
            statement_type.as_str(),
            facts.entity_name,
            request.period_kind.as_str(),
            request.horizon,
            populated,
            line_items.len()
        );

        FinancialStatement {
            company_id: facts.company_id().to_string(),
            company_name: facts.entity_name.clone(),
            statement_type,
            period_kind: request.period_kind,
            line_items,
        }
    }

    pub fn income_statement(&self, facts: &FactsDocument, request: &StatementRequest) -> FinancialStatement {
        self.assemble(facts, StatementType::Income, request)
    }

    pub fn balance_sheet(&self, facts: &FactsDocument, request: &StatementRequest) -> FinancialStatement {
        self.assemble(facts, StatementType::Balance, request)
    }

    pub fn cash_flow_statement(&self, facts: &FactsDocument, request: &StatementRequest) -> FinancialStatement {
        self.assemble(facts, StatementType::CashFlow, request)
    }
}

impl Default for StatementAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Assemble one statement with the built-in registries and default config.
pub fn assemble(facts: &FactsDocument, statement_type: StatementType, request: &StatementRequest) -> FinancialStatement {
    StatementAssembler::new().assemble(facts, statement_type, request)
}

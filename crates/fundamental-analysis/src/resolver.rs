use analysis_core::{ConceptSeries, FactsSource};

/// Return the series for the first candidate tag present in `facts`.
///
/// Candidates are tried strictly in order; later matches are ignored even when
/// they exist. `None` means the concept was not disclosed under any alias.
pub fn resolve<'a, S>(facts: &'a S, candidate_tags: &[impl AsRef<str>]) -> Option<&'a ConceptSeries>
where
    S: FactsSource + ?Sized,
{
    resolve_tag(facts, candidate_tags).map(|(_, series)| series)
}

/// Like [`resolve`], but also reports which tag matched.
pub fn resolve_tag<'a, 't, S, T>(facts: &'a S, candidate_tags: &'t [T]) -> Option<(&'t str, &'a ConceptSeries)>
where
    S: FactsSource + ?Sized,
    T: AsRef<str>,
{
    candidate_tags
        .iter()
        .map(|tag| tag.as_ref())
        .find_map(|tag| facts.concept(tag).map(|series| (tag, series)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::Taxonomy;
    use std::collections::HashMap;

    fn series(description: &str) -> ConceptSeries {
        ConceptSeries {
            description: Some(description.to_string()),
            units: Default::default(),
        }
    }

    fn taxonomy() -> Taxonomy {
        let mut t = Taxonomy::new();
        t.insert("SalesRevenueNet".to_string(), series("legacy"));
        t.insert(
            "RevenueFromContractWithCustomerExcludingAssessedTax".to_string(),
            series("asc606"),
        );
        t
    }

    #[test]
    fn test_first_present_candidate_wins() {
        let facts = taxonomy();
        let candidates = [
            "Revenues",
            "RevenueFromContractWithCustomerExcludingAssessedTax",
            "SalesRevenueNet",
        ];
        let (tag, found) = resolve_tag(&facts, &candidates).unwrap();
        assert_eq!(tag, "RevenueFromContractWithCustomerExcludingAssessedTax");
        assert_eq!(found.description.as_deref(), Some("asc606"));

        // Reversing the preference flips the answer even though both exist
        let reversed = [
            "SalesRevenueNet",
            "RevenueFromContractWithCustomerExcludingAssessedTax",
        ];
        let found = resolve(&facts, &reversed).unwrap();
        assert_eq!(found.description.as_deref(), Some("legacy"));
    }

    #[test]
    fn test_unresolved_concept_is_none() {
        let facts = taxonomy();
        assert!(resolve(&facts, &["Goodwill"]).is_none());
        assert!(resolve(&facts, &[] as &[&str]).is_none());
    }

    #[test]
    fn test_resolves_against_hash_map() {
        let mut facts: HashMap<String, ConceptSeries> = HashMap::new();
        facts.insert("Assets".to_string(), series("assets"));
        let candidates = vec!["Assets".to_string()];
        assert!(resolve(&facts, &candidates).is_some());
    }
}

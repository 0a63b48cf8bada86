use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use crate::ConceptSeries;

/// Lookup of raw concept series by tag name.
///
/// The resolver only needs this, so callers can hand it a parsed taxonomy or
/// any ad-hoc map they built themselves.
pub trait FactsSource {
    fn concept(&self, tag: &str) -> Option<&ConceptSeries>;
}

impl FactsSource for BTreeMap<String, ConceptSeries> {
    fn concept(&self, tag: &str) -> Option<&ConceptSeries> {
        self.get(tag)
    }
}

impl<S: BuildHasher> FactsSource for HashMap<String, ConceptSeries, S> {
    fn concept(&self, tag: &str) -> Option<&ConceptSeries> {
        self.get(tag)
    }
}

impl<T: FactsSource + ?Sized> FactsSource for &T {
    fn concept(&self, tag: &str) -> Option<&ConceptSeries> {
        (**self).concept(tag)
    }
}

//! Explainable evidence behind a verdict, for verification reports.

use crate::normalize::truncate_chars;
use crate::patterns::PatternCatalog;
use crate::record::Clause;
use crate::scoring::{StructureScore, keyword_score, structure_score};

/// Only the first few catalog categories are sampled.
const SAMPLE_CATEGORIES: usize = 5;
const MAX_SAMPLES: usize = 3;
const SAMPLE_CHARS: usize = 100;

/// Keyword and pattern evidence gathered from the normalised text.
#[derive(Debug, Clone)]
pub struct DocumentSignals {
    pub keyword_count: usize,
    pub structure: StructureScore,
    /// First clause of each of the leading catalog categories, shortened.
    pub samples: Vec<Clause>,
}

impl DocumentSignals {
    #[cfg(test)]
    fn collect(catalog: &PatternCatalog, raw: &str) -> Self {
        Self::from_normalized(catalog, &crate::normalize::normalize(raw))
    }

    pub fn from_normalized(catalog: &PatternCatalog, normalized: &str) -> Self {
        let samples = catalog
            .entries()
            .iter()
            .take(SAMPLE_CATEGORIES)
            .filter_map(|entry| {
                entry
                    .first_span(normalized)
                    .map(|span| Clause::new(truncate_chars(span, SAMPLE_CHARS), entry.category()))
            })
            .take(MAX_SAMPLES)
            .collect();

        Self {
            keyword_count: keyword_score(normalized),
            structure: structure_score(catalog, normalized),
            samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_counts_and_samples() {
        let catalog = PatternCatalog::standard();
        let signals = DocumentSignals::collect(
            &catalog,
            "WHEREAS the parties agree. The Supplier shall deliver the goods. \
             If payment is late then interest accrues. The Buyer may inspect the goods.",
        );
        assert!(signals.keyword_count >= 2); // whereas, shall
        let cats: Vec<&str> = signals.samples.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(cats, vec!["OBLIGATION", "CONDITION", "RIGHT"]);
    }

    #[test]
    fn samples_are_shortened() {
        let catalog = PatternCatalog::standard();
        let long = format!("The tenant shall {}.", "keep the yard tidy ".repeat(20));
        let signals = DocumentSignals::collect(&catalog, &long);
        assert_eq!(signals.samples[0].text.chars().count(), SAMPLE_CHARS);
    }

    #[test]
    fn empty_text_has_no_signals() {
        let catalog = PatternCatalog::standard();
        let signals = DocumentSignals::collect(&catalog, "");
        assert_eq!(signals.keyword_count, 0);
        assert_eq!(signals.structure.total(), 0);
        assert!(signals.samples.is_empty());
    }
}

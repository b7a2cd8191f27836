//! Deterministic legality signals: structural pattern counts and legal
//! vocabulary hits.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::patterns::PatternCatalog;

/// Combined catalog + header matches needed for the structural fast path.
pub const STRUCTURE_THRESHOLD: usize = 3;

/// Legal vocabulary. Each term matches at a word start, so stems such as
/// `terminat` and `indemn` cover their inflections.
pub const LEGAL_KEYWORDS: [&str; 18] = [
    "party",
    "agreement",
    "shall",
    "warrant",
    "indemn",
    "liability",
    "govern",
    "jurisdiction",
    "effective date",
    "term",
    "terminat",
    "obligat",
    "right",
    "represent",
    "notwithstand",
    "hereby",
    "whereas",
    "force majeure",
];

const KEYWORD_BASE_CONFIDENCE: f64 = 0.6;
const KEYWORD_CONFIDENCE_STEP: f64 = 0.05;

static KEYWORD_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    LEGAL_KEYWORDS
        .iter()
        .map(|kw| {
            RegexBuilder::new(&format!(r"\b{}", regex::escape(kw)))
                .case_insensitive(true)
                .build()
                .expect("keyword patterns are valid")
        })
        .collect()
});

/// Partial counts behind the structural heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StructureScore {
    /// Distinct catalog categories with at least one clause.
    pub pattern_matches: usize,
    /// Section-header patterns present.
    pub header_matches: usize,
}

impl StructureScore {
    pub fn total(&self) -> usize {
        self.pattern_matches + self.header_matches
    }

    pub fn has_legal_structure(&self) -> bool {
        self.total() >= STRUCTURE_THRESHOLD
    }
}

/// Count catalog categories and section headers present in `text`.
pub fn structure_score(catalog: &PatternCatalog, text: &str) -> StructureScore {
    StructureScore {
        pattern_matches: catalog.matching_categories(text),
        header_matches: catalog.matching_headers(text),
    }
}

/// How many distinct legal keywords appear in `text`.
pub fn keyword_score(text: &str) -> usize {
    KEYWORD_REGEXES.iter().filter(|re| re.is_match(text)).count()
}

/// Confidence for a structurally legal document: `min(1, 0.6 + 0.05 × count)`.
pub fn keyword_confidence(count: usize) -> f64 {
    (KEYWORD_BASE_CONFIDENCE + KEYWORD_CONFIDENCE_STEP * count as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_prefix_matches_inflections() {
        assert_eq!(keyword_score("Termination"), 2); // term + terminat
        assert_eq!(keyword_score("indemnification"), 1);
        assert_eq!(keyword_score("the parties"), 0); // "party" is not a prefix of "parties"
    }

    #[test]
    fn keyword_needs_word_start() {
        assert_eq!(keyword_score("copyright determinism"), 0);
    }

    #[test]
    fn keyword_counts_each_term_once() {
        assert_eq!(keyword_score("shall shall SHALL"), 1);
    }

    #[test]
    fn keyword_multi_word_terms() {
        assert_eq!(keyword_score("The Effective Date; Force Majeure"), 2);
    }

    #[test]
    fn keyword_confidence_values() {
        assert!((keyword_confidence(0) - 0.6).abs() < 1e-9);
        assert!((keyword_confidence(2) - 0.7).abs() < 1e-9);
        assert_eq!(keyword_confidence(8), 1.0);
        assert_eq!(keyword_confidence(18), 1.0);
    }

    #[test]
    fn keyword_confidence_is_monotonic_and_capped() {
        let mut prev = 0.0;
        for count in 0..=LEGAL_KEYWORDS.len() {
            let c = keyword_confidence(count);
            assert!(c >= prev, "count {count}: {c} < {prev}");
            assert!(c <= 1.0);
            prev = c;
        }
    }

    #[test]
    fn structure_counts_patterns_and_headers() {
        let catalog = PatternCatalog::standard();
        let score = structure_score(
            &catalog,
            "Section 1. The Supplier shall deliver the goods. This agreement is governed by the laws of Delaware.",
        );
        assert_eq!(score.header_matches, 1);
        assert_eq!(score.pattern_matches, 2); // OBLIGATION, GOVERNING_LAW
        assert!(score.has_legal_structure());
    }

    #[test]
    fn plain_prose_has_no_structure() {
        let catalog = PatternCatalog::standard();
        let score = structure_score(&catalog, "The quick brown fox jumps over the lazy dog.");
        assert_eq!(score, StructureScore::default());
        assert!(!score.has_legal_structure());
    }
}

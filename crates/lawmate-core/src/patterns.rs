//! The fixed catalog of clause patterns and legal section headers.
//!
//! Each catalog pattern is a clause *body*. A match of the body counts only
//! when it is immediately followed by a `.` or `;`, and the reported span is
//! the body alone, never the terminator. `.` in a body never crosses a line
//! break, so a clause cannot run past the end of its line.
//!
//! Patterns are compiled once. A pattern that fails to compile (syntax error,
//! or a program larger than [`PATTERN_SIZE_LIMIT`]) is kept in the catalog as
//! a failed entry: it never matches, and extraction reports it instead of
//! aborting.

use std::sync::{Arc, LazyLock};

use regex::{Regex, RegexBuilder};
use tracing::warn;

/// Upper bound on the compiled size of one pattern.
pub const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Catalog definition order. Earlier categories win when extraction output
/// is truncated.
const STANDARD_PATTERNS: &[(&str, &str)] = &[
    // Obligations and requirements
    (
        "OBLIGATION",
        r"shall\s.*?|must\s.*?|required to\s.*?|obligated to\s.*?",
    ),
    ("CONDITION", r"if\s.*?then.*?|in the event\s.*?"),
    // Rights and permissions
    (
        "RIGHT",
        r"entitled to\s.*?|may\s.*?|right to\s.*?|permission to\s.*?",
    ),
    ("DISCRETION", r"at the sole discretion of\s.*?"),
    // Definitions
    ("DEFINITION", r#""(.*?)"\s+(?:means|shall mean)\s+(.*?)"#),
    ("INTERPRETATION", r"for the purposes? of this\s.*?"),
    // Liabilities and indemnities
    ("LIABILITY", r"liability\s.*?|responsible for\s.*?"),
    ("INDEMNITY", r"indemnify\s.*?|hold harmless\s.*?"),
    ("LIMITATION", r"not liable for\s.*?|exclusion of liability\s.*?"),
    // Term and termination
    ("TERM", r"term\s.*?of this agreement.*?"),
    ("TERMINATION", r"terminat(?:ion|e)\s.*?(?:upon|with|after).*?"),
    ("RENEWAL", r"renew\s.*?automatically.*?"),
    // Confidentiality
    ("CONFIDENTIALITY", r"confidential\s.*?|non-disclosure\s.*?"),
    ("NON-CIRCUMVENTION", r"not circumvent\s.*?"),
    // Representations and warranties
    ("REPRESENTATION", r"represent(?:s|ations?)\s.*?(?:that|as).*?"),
    ("WARRANTY", r"warrant(?:y|ies)\s.*?"),
    // Governing law and disputes
    ("GOVERNING_LAW", r"govern(?:ed|ing)\s.*?law.*?"),
    ("JURISDICTION", r"jurisdiction\s.*?courts? of.*?"),
    ("ARBITRATION", r"arbitration\s.*?under.*?"),
    // Payment terms
    ("PAYMENT", r"pay(?:s|ment|able)?\s.*?\$?\d+.*?"),
    ("INTEREST", r"interest\s.*?\d+%.*?"),
    ("TAX", r"tax\s.*?responsib.*?"),
    // Dates and effective periods
    ("EFFECTIVE_DATE", r"effective\s.*?date.*?"),
    ("NOTICE_PERIOD", r"notice\s.*?\d+\sdays.*?"),
    // Intellectual property
    ("IP_OWNERSHIP", r"ownership of\s.*?intellectual property.*?"),
    ("LICENSE", r"license\s.*?grant.*?"),
    // Miscellaneous
    ("FORCE_MAJEURE", r"force\s.*?majeure.*?"),
    ("AMENDMENT", r"amend(?:ment|ed)\s.*?writing.*?"),
    ("ENTIRE_AGREEMENT", r"entire agreement\s.*?"),
];

/// Numbered markers, standard section titles, and recital boilerplate.
const SECTION_HEADERS: &[&str] = &[
    r"\b(article|section|clause)\s+\d+",
    r"\b(terms and conditions|governing law|jurisdiction|confidentiality)\b",
    r"\b(now therefore|in consideration of|hereinafter)\b",
];

static HEADER_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    SECTION_HEADERS
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .expect("section header patterns are valid")
        })
        .collect()
});

static STANDARD: LazyLock<Arc<PatternCatalog>> =
    LazyLock::new(|| Arc::new(PatternCatalog::from_entries(STANDARD_PATTERNS.iter().copied())));

/// One named clause pattern.
#[derive(Debug, Clone)]
pub struct PatternEntry {
    category: String,
    pattern: String,
    matcher: Result<Regex, regex::Error>,
}

impl PatternEntry {
    /// Compile a clause body. Never fails: a bad body yields a failed entry.
    pub fn new(category: impl Into<String>, pattern: impl Into<String>) -> Self {
        let category = category.into();
        let pattern = pattern.into();
        let matcher = RegexBuilder::new(&format!("(?P<span>{pattern})[.;]"))
            .case_insensitive(true)
            .size_limit(PATTERN_SIZE_LIMIT)
            .build();
        if let Err(e) = &matcher {
            warn!(category = %category, error = %e, "clause pattern failed to compile");
        }
        Self {
            category,
            pattern,
            matcher,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// The clause body as written, without the terminator suffix.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_failed(&self) -> bool {
        self.matcher.is_err()
    }

    /// The compile error of a failed entry.
    pub fn error(&self) -> Option<&regex::Error> {
        self.matcher.as_ref().err()
    }

    /// Whether the text contains at least one clause for this category.
    /// Failed entries never match.
    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.as_ref().is_ok_and(|re| re.is_match(text))
    }

    /// All non-overlapping clause spans in `text`, in position order.
    pub fn spans<'t>(&self, text: &'t str) -> Result<Vec<&'t str>, &regex::Error> {
        let re = self.matcher.as_ref()?;
        Ok(re
            .captures_iter(text)
            .filter_map(|caps| caps.name("span"))
            .map(|m| m.as_str())
            .collect())
    }

    /// The first clause span in `text`, if any.
    pub fn first_span<'t>(&self, text: &'t str) -> Option<&'t str> {
        let re = self.matcher.as_ref().ok()?;
        re.captures(text)
            .and_then(|caps| caps.name("span"))
            .map(|m| m.as_str())
    }
}

/// Ordered, read-only set of clause patterns plus the section-header set.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    entries: Vec<PatternEntry>,
}

impl PatternCatalog {
    /// The built-in catalog, compiled on first use and shared thereafter.
    pub fn standard() -> Arc<PatternCatalog> {
        Arc::clone(&STANDARD)
    }

    /// Build a catalog from `(category, body)` pairs, in the given order.
    ///
    /// Categories are unique keys: a repeated category keeps its first entry.
    pub fn from_entries<I, C, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (C, P)>,
        C: Into<String>,
        P: Into<String>,
    {
        let mut out: Vec<PatternEntry> = Vec::new();
        for (category, pattern) in entries {
            let category = category.into();
            if out.iter().any(|e| e.category == category) {
                warn!(category = %category, "duplicate clause category ignored");
                continue;
            }
            out.push(PatternEntry::new(category, pattern));
        }
        Self { entries: out }
    }

    pub fn entries(&self) -> &[PatternEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, category: &str) -> Option<&PatternEntry> {
        self.entries.iter().find(|e| e.category == category)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.category.as_str())
    }

    /// Number of distinct categories with at least one clause in `text`.
    pub fn matching_categories(&self, text: &str) -> usize {
        self.entries.iter().filter(|e| e.is_match(text)).count()
    }

    /// Number of section-header patterns found in `text`.
    pub fn matching_headers(&self, text: &str) -> usize {
        HEADER_REGEXES.iter().filter(|re| re.is_match(text)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_compiles_every_entry() {
        let catalog = PatternCatalog::standard();
        assert_eq!(catalog.len(), 29);
        for entry in catalog.entries() {
            assert!(!entry.is_failed(), "{} failed: {:?}", entry.category(), entry.error());
        }
    }

    #[test]
    fn standard_catalog_order_is_fixed() {
        let catalog = PatternCatalog::standard();
        let cats: Vec<&str> = catalog.categories().collect();
        assert_eq!(cats[0], "OBLIGATION");
        assert_eq!(cats[1], "CONDITION");
        assert_eq!(cats[16], "GOVERNING_LAW");
        assert_eq!(cats[19], "PAYMENT");
        assert_eq!(cats[28], "ENTIRE_AGREEMENT");
    }

    #[test]
    fn span_stops_before_terminator() {
        let catalog = PatternCatalog::standard();
        let entry = catalog.get("OBLIGATION").unwrap();
        let spans = entry
            .spans("The Supplier shall deliver the goods; the Buyer must pay. Done.")
            .unwrap();
        assert_eq!(spans, vec!["shall deliver the goods", "must pay"]);
    }

    #[test]
    fn match_is_case_insensitive() {
        let catalog = PatternCatalog::standard();
        let entry = catalog.get("GOVERNING_LAW").unwrap();
        assert!(entry.is_match("THIS AGREEMENT IS GOVERNED BY THE LAWS OF ENGLAND."));
    }

    #[test]
    fn clause_without_terminator_does_not_match() {
        let catalog = PatternCatalog::standard();
        let entry = catalog.get("OBLIGATION").unwrap();
        assert!(!entry.is_match("the tenant shall keep the premises clean"));
    }

    #[test]
    fn clause_does_not_cross_line_break() {
        let catalog = PatternCatalog::standard();
        let entry = catalog.get("OBLIGATION").unwrap();
        assert!(entry.spans("you shall comply\nwith this.").unwrap().is_empty());
    }

    #[test]
    fn definition_span_includes_quoted_term() {
        let catalog = PatternCatalog::standard();
        let entry = catalog.get("DEFINITION").unwrap();
        let span = entry
            .first_span(r#"In this Agreement "Services" means the consulting work described in Schedule A."#)
            .unwrap();
        assert_eq!(span, r#""Services" means the consulting work described in Schedule A"#);
    }

    #[test]
    fn payment_accepts_bare_pay() {
        let catalog = PatternCatalog::standard();
        let entry = catalog.get("PAYMENT").unwrap();
        assert_eq!(
            entry.first_span("Party A shall pay $500 within 30 days."),
            Some("pay $500 within 30 days")
        );
    }

    #[test]
    fn malformed_pattern_is_kept_as_failed_entry() {
        let catalog = PatternCatalog::from_entries([("BROKEN", r"(unclosed"), ("OK", r"shall\s.*?")]);
        assert_eq!(catalog.len(), 2);
        assert!(catalog.get("BROKEN").unwrap().is_failed());
        assert!(!catalog.get("BROKEN").unwrap().is_match("anything."));
        assert!(catalog.get("OK").unwrap().is_match("you shall pay."));
    }

    #[test]
    fn oversized_pattern_is_kept_as_failed_entry() {
        let catalog = PatternCatalog::from_entries([("HUGE", r"(?:\w{1000}){1000}")]);
        assert!(catalog.get("HUGE").unwrap().is_failed());
    }

    #[test]
    fn duplicate_category_keeps_first() {
        let catalog = PatternCatalog::from_entries([("A", "first"), ("A", "second")]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("A").unwrap().pattern(), "first");
    }

    #[test]
    fn headers_count_each_pattern_once() {
        let catalog = PatternCatalog::standard();
        assert_eq!(catalog.matching_headers("Section 1. Section 2. Article 3."), 1);
        assert_eq!(
            catalog.matching_headers(
                "NOW THEREFORE, see Section 4 (Governing Law) for the terms and conditions"
            ),
            3
        );
        assert_eq!(catalog.matching_headers("a plain sentence"), 0);
    }
}

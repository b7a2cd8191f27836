//! Clause extraction over the full, un-normalised document text.

use tracing::{debug, warn};

use crate::patterns::PatternCatalog;
use crate::record::Clause;

/// Extraction output never holds more clauses than this.
pub const MAX_CLAUSES: usize = 30;

/// A category skipped because its pattern could not run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternFailure {
    pub category: String,
    pub reason: String,
}

/// Clauses in catalog order, plus any categories that were skipped.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub clauses: Vec<Clause>,
    pub failures: Vec<PatternFailure>,
}

impl Extraction {
    /// Clauses tagged with `category`, in document order.
    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Clause> {
        self.clauses.iter().filter(move |c| c.category == category)
    }
}

/// Apply every catalog pattern, in catalog order, to `text`.
///
/// Within a category clauses follow match position. Output stops at
/// [`MAX_CLAUSES`], so earlier categories are kept when the cap bites. A
/// failed pattern is recorded and skipped; the remaining categories still
/// run.
pub fn extract_clauses(catalog: &PatternCatalog, text: &str) -> Extraction {
    let mut out = Extraction::default();

    'catalog: for entry in catalog.entries() {
        let spans = match entry.spans(text) {
            Ok(spans) => spans,
            Err(e) => {
                warn!(category = entry.category(), error = %e, "skipping clause pattern");
                out.failures.push(PatternFailure {
                    category: entry.category().to_string(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        for span in spans {
            if out.clauses.len() == MAX_CLAUSES {
                debug!(category = entry.category(), "clause cap reached");
                break 'catalog;
            }
            out.clauses.push(Clause::new(span.trim(), entry.category()));
        }
    }

    out
}

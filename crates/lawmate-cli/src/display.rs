//! Terminal rendering for analyses, verification reports, and stored records.
//!
//! Cards are vertical `label  value` lists grouped under section headers;
//! history can also be rendered as an Arrow pretty-printed table.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use lawmate_core::{AnalysisRecord, Clause, DocumentSignals, PatternFailure, VerificationResult};
use lawmate_pipeline::Analysis;

const LABEL_WIDTH: usize = 22;
const HASH_PREFIX: usize = 16;
const SUMMARY_PREVIEW: usize = 160;

const FORMATTING_HINTS: &[&str] = &[
    "Removing headers/footers",
    "Checking for OCR errors",
    "Including more contractual language",
];

const NO_CLAUSE_REASONS: &[&str] = &[
    "Document uses non-standard phrasing",
    "Contains mostly non-contractual text",
    "Uses uncommon clause structures",
];

// ── Analyze ──

pub fn print_analysis(analysis: &Analysis) {
    println!("=== Analysis {} ===", short_hash(&analysis.content_hash));
    println!();

    println!("Verification");
    print_verdict_rows(&analysis.verdict);
    field("Document", format!("{} ({} characters)", analysis.kind, analysis.chars));
    println!();

    if !analysis.is_legal() {
        println!(
            "Document not classified as legal (confidence {})",
            percent(analysis.verdict.confidence)
        );
        print_formatting_hints(&analysis.verdict);
        print_warnings(analysis.warnings.iter().map(|w| w.to_string()));
        return;
    }

    if let Some(summary) = &analysis.summary {
        println!("Summary");
        println!("  {summary}");
        println!();
    }

    print_clause_groups(&analysis.clauses);
    print_warnings(analysis.warnings.iter().map(|w| w.to_string()));

    println!(
        "{}",
        if analysis.persisted {
            "Saved to analysis history."
        } else {
            "Not saved to analysis history."
        }
    );
}

// ── Verify ──

/// Confidence above this reads as a strong verdict.
const STRONG_CONFIDENCE: f64 = 0.7;
/// Non-legal verdicts above this get formatting hints.
const HINT_CONFIDENCE: f64 = 0.3;

/// One-line reading of a verdict.
pub fn interpretation(verdict: &VerificationResult) -> &'static str {
    match (verdict.is_legal, verdict.confidence > STRONG_CONFIDENCE) {
        (true, true) => "Strong legal structure detected",
        (true, false) => "Marginal legal content, review recommended",
        (false, _) => "Lacks strong legal indicators",
    }
}

pub fn print_verification(verdict: &VerificationResult, signals: &DocumentSignals) {
    println!("=== Verification ===");
    println!();
    print_verdict_rows(verdict);
    println!();

    println!("Signals");
    field("Legal keywords", signals.keyword_count);
    field("Clause patterns", signals.structure.pattern_matches);
    field("Section headers", signals.structure.header_matches);
    println!();

    println!("Key decision factor");
    println!("  {}", interpretation(verdict));
    println!();

    if !signals.samples.is_empty() {
        println!("Sample detected clauses");
        for sample in &signals.samples {
            println!("  {}: {}...", sample.category, sample.text);
        }
        println!();
    }

    if !verdict.is_legal {
        print_formatting_hints(verdict);
    }
}

fn print_verdict_rows(verdict: &VerificationResult) {
    field("Decision", if verdict.is_legal { "LEGAL" } else { "NON-LEGAL" });
    field("Confidence", percent(verdict.confidence));
    field("Basis", verdict.basis.as_str());
    if let Some(reason) = verdict.degraded_reason() {
        field("Degraded", reason);
    }
}

fn print_formatting_hints(verdict: &VerificationResult) {
    if verdict.is_legal || verdict.confidence <= HINT_CONFIDENCE {
        return;
    }
    println!("This might be a legal document with unusual formatting. Consider:");
    for hint in FORMATTING_HINTS {
        println!("  - {hint}");
    }
    println!();
}

// ── Clauses ──

pub fn print_clauses(clauses: &[Clause], failures: &[PatternFailure]) {
    print_clause_groups(clauses);
    print_warnings(
        failures
            .iter()
            .map(|f| format!("clause category {} skipped: {}", f.category, f.reason)),
    );
}

/// Clauses under one heading per category, in the order given.
fn print_clause_groups(clauses: &[Clause]) {
    println!("Detected clauses ({})", clauses.len());
    if clauses.is_empty() {
        println!("  No standard clauses detected. Possible reasons:");
        for reason in NO_CLAUSE_REASONS {
            println!("  - {reason}");
        }
        println!();
        return;
    }

    let mut current: Option<&str> = None;
    for clause in clauses {
        if current != Some(clause.category.as_str()) {
            println!("  {}", clause.category_title());
            current = Some(clause.category.as_str());
        }
        println!("    - {}", clause.text);
    }
    println!();
}

fn print_warnings(warnings: impl Iterator<Item = String>) {
    let warnings: Vec<String> = warnings.collect();
    if warnings.is_empty() {
        return;
    }
    println!("Warnings");
    for w in &warnings {
        println!("  ! {w}");
    }
    println!();
}

// ── Stored records ──

pub fn print_record_card(record: &AnalysisRecord) {
    println!("=== Analysis {} ===", short_hash(&record.content_hash));
    println!();

    println!("Record");
    field("content_hash", &record.content_hash);
    field("created_at", record.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    field("schema_version", &record.schema_version);
    println!();

    println!("Verification");
    field("legal", if record.is_legal { "yes" } else { "no" });
    field("confidence", percent(record.confidence));
    println!();

    println!("Summary");
    println!("  {}", record.summary);
    println!();

    print_clause_groups(&record.clauses);
}

pub fn print_history(records: &[AnalysisRecord]) {
    if records.is_empty() {
        println!("No previous analyses found");
        return;
    }
    for record in records {
        println!(
            "{}  {}  {:>4}  {:>3} clauses  {}",
            short_hash(&record.content_hash),
            record.created_at.format("%Y-%m-%d %H:%M"),
            percent(record.confidence),
            record.num_clauses(),
            if record.is_legal { "legal" } else { "non-legal" },
        );
        println!("    {}", preview(&record.summary, SUMMARY_PREVIEW));
    }
}

/// History as a pretty-printed Arrow table.
pub fn print_history_table(records: &[AnalysisRecord]) -> anyhow::Result<()> {
    let batch = history_table(records)?;
    arrow::util::pretty::print_batches(&[batch])?;
    Ok(())
}

fn history_table(records: &[AnalysisRecord]) -> anyhow::Result<RecordBatch> {
    let schema = Schema::new(vec![
        Field::new("hash", DataType::Utf8, false),
        Field::new("created_at", DataType::Utf8, false),
        Field::new("legal", DataType::Utf8, false),
        Field::new("confidence", DataType::Float64, false),
        Field::new("clauses", DataType::Int64, false),
        Field::new("summary", DataType::Utf8, false),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| short_hash(&r.content_hash)),
        )),
        Arc::new(StringArray::from_iter_values(
            records
                .iter()
                .map(|r| r.created_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        )),
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| if r.is_legal { "yes" } else { "no" }),
        )),
        Arc::new(Float64Array::from_iter_values(
            records.iter().map(|r| r.confidence),
        )),
        Arc::new(Int64Array::from_iter_values(
            records.iter().map(|r| r.num_clauses() as i64),
        )),
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| preview(&r.summary, 60)),
        )),
    ];
    Ok(RecordBatch::try_new(Arc::new(schema), columns)?)
}

// ── Helpers ──

fn field(label: &str, value: impl std::fmt::Display) {
    println!("  {:<width$} {}", label, value, width = LABEL_WIDTH);
}

fn percent(confidence: f64) -> String {
    format!("{:.0}%", confidence * 100.0)
}

fn short_hash(hash: &str) -> &str {
    hash.get(..HASH_PREFIX).unwrap_or(hash)
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lawmate_core::VerificationBasis;

    fn verdict(is_legal: bool, confidence: f64) -> VerificationResult {
        VerificationResult::new(is_legal, confidence, VerificationBasis::Classifier)
    }

    #[test]
    fn interpretation_bands() {
        assert_eq!(interpretation(&verdict(true, 0.9)), "Strong legal structure detected");
        assert_eq!(
            interpretation(&verdict(true, 0.7)),
            "Marginal legal content, review recommended"
        );
        assert_eq!(interpretation(&verdict(false, 0.9)), "Lacks strong legal indicators");
    }

    #[test]
    fn percent_rounds() {
        assert_eq!(percent(0.8), "80%");
        assert_eq!(percent(0.5), "50%");
    }

    #[test]
    fn short_hash_handles_short_input() {
        assert_eq!(short_hash("abc"), "abc");
        assert_eq!(short_hash(&"a".repeat(64)).len(), HASH_PREFIX);
    }

    #[test]
    fn preview_marks_truncation() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("abcdef", 3), "abc...");
    }

    #[test]
    fn history_table_has_one_row_per_record() {
        let record = AnalysisRecord::new(
            "f".repeat(64),
            &verdict(true, 0.8),
            "A lease.",
            vec![Clause::new("shall pay rent", "OBLIGATION")],
        );
        let batch = history_table(&[record.clone(), record]).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 6);
    }
}

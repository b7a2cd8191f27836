//! Boilerplate stripping and whitespace normalisation ahead of scoring and
//! model calls.
//!
//! Removes page markers (`page 12`), copyright marks, the words
//! "confidential" and "draft", and short alphanumeric reference codes that
//! mix letters and digits (`A12`, `x4b`, `2024`). Whitespace and control
//! characters collapse to single spaces and the result is cut to the first
//! [`MAX_NORMALIZED_CHARS`] characters, where preambles and key clauses sit.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Normalised text never exceeds this many characters.
pub const MAX_NORMALIZED_CHARS: usize = 3000;

static NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)page \d+|confidential|draft|©|copyright|\b\w{1,3}\d+\w{1,3}\b")
        .expect("noise pattern is valid")
});

/// Normalise raw document text. Never fails; empty input gives empty output.
///
/// Runs to a fixed point: stripping `draft` from `draftX12` exposes the code
/// `X12`, and truncation can cut a word down to a code, so passes repeat
/// until nothing changes. Normalising the output again is a no-op.
pub fn normalize(raw: &str) -> String {
    let mut text = normalize_pass(raw);
    loop {
        let next = normalize_pass(&text);
        if next == text {
            return text;
        }
        text = next;
    }
}

fn normalize_pass(text: &str) -> String {
    // Removed tokens become spaces so neighbours never fuse into new words.
    let mut stripped = NOISE.replace_all(text, " ").into_owned();
    loop {
        let next = match NOISE.replace_all(&stripped, " ") {
            Cow::Owned(next) => next,
            Cow::Borrowed(_) => break,
        };
        stripped = next;
    }
    let collapsed = stripped
        .split(|c: char| c.is_whitespace() || c.is_control())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    truncate_chars(&collapsed, MAX_NORMALIZED_CHARS).to_string()
}

/// The first `max` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\t "), "");
    }

    #[test]
    fn collapses_whitespace_and_control_chars() {
        assert_eq!(
            normalize("This  Agreement\n\n is\tmade\u{0007}here"),
            "This Agreement is made here"
        );
    }

    #[test]
    fn strips_page_markers_and_marks() {
        assert_eq!(
            normalize("Page 3 CONFIDENTIAL DRAFT © Copyright the parties agree"),
            "the parties agree"
        );
    }

    #[test]
    fn strips_mixed_reference_codes() {
        assert_eq!(normalize("Ref AB12C see clause"), "Ref see clause");
        assert_eq!(normalize("dated 2024 onwards"), "dated onwards");
    }

    #[test]
    fn keeps_short_numbers() {
        assert_eq!(normalize("within 30 days"), "within 30 days");
    }

    #[test]
    fn removal_does_not_fuse_words() {
        assert_eq!(normalize("con©tract"), "con tract");
    }

    #[test]
    fn truncates_to_prefix() {
        let long = "word ".repeat(2000);
        let out = normalize(&long);
        assert_eq!(out.chars().count(), MAX_NORMALIZED_CHARS);
        assert!(out.starts_with("word word"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "é".repeat(10);
        assert_eq!(truncate_chars(&text, 3), "ééé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn normalising_twice_is_stable() {
        let raw = "Page 1\nTHIS AGREEMENT is made between Party A and Party B.\n\
                   Confidential. The Supplier shall deliver the goods; Ref X12.";
        let once = normalize(raw);
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn code_exposed_by_removal_is_also_stripped() {
        let once = normalize("draftX12 terms apply");
        assert_eq!(once, "terms apply");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn code_left_by_truncation_is_stripped() {
        // "x1yyyy" is not a code, but its truncated prefix "x1yy" is.
        let raw = format!("{}x1yyyy", "a ".repeat(1498));
        let once = normalize(&raw);
        assert_eq!(once, "a ".repeat(1498).trim_end());
        assert_eq!(normalize(&once), once);
    }
}

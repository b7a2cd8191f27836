//! Deterministic extractive summarizer: the document's opening sentences.
//!
//! Lengths are measured in characters. Whole sentences are taken while they
//! fit within `max_length`; if that leaves the summary shorter than
//! `min_length`, words from the following text are appended up to the limit.

use async_trait::async_trait;

use crate::backend::{Summarizer, SummaryRequest};

#[derive(Debug, Clone, Copy, Default)]
pub struct LeadSummarizer;

impl LeadSummarizer {
    pub fn lead(text: &str, min_length: usize, max_length: usize) -> String {
        let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let sentences = sentences(&flat);

        let mut out = String::new();
        let mut len = 0;
        let mut taken = 0;
        for sentence in &sentences {
            let extra = sentence.chars().count() + usize::from(len > 0);
            if len + extra > max_length {
                break;
            }
            push_piece(&mut out, sentence);
            len += extra;
            taken += 1;
        }

        if len < min_length {
            for word in sentences[taken..].iter().flat_map(|s| s.split(' ')) {
                let extra = word.chars().count() + usize::from(len > 0);
                if len + extra > max_length {
                    break;
                }
                push_piece(&mut out, word);
                len += extra;
            }
        }

        out
    }
}

#[async_trait]
impl Summarizer for LeadSummarizer {
    async fn summarize(&self, request: &SummaryRequest<'_>) -> anyhow::Result<String> {
        let summary = Self::lead(request.text, request.min_length, request.max_length);
        anyhow::ensure!(!summary.is_empty(), "no text to summarize");
        Ok(summary)
    }
}

fn push_piece(out: &mut String, piece: &str) {
    if !out.is_empty() {
        out.push(' ');
    }
    out.push_str(piece);
}

/// Split single-spaced text after `.`, `!` or `?` followed by a space.
fn sentences(flat: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = flat.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') && chars.peek().is_some_and(|&(_, next)| next == ' ') {
            out.push(&flat[start..=i]);
            start = i + 2;
        }
    }
    if start < flat.len() {
        out.push(&flat[start..]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_sentences() {
        assert_eq!(
            sentences("One. Two! Three? Four"),
            vec!["One.", "Two!", "Three?", "Four"]
        );
        assert_eq!(sentences("Pay $5.50 now."), vec!["Pay $5.50 now."]);
    }

    #[test]
    fn short_text_is_returned_whole() {
        let text = "The tenant pays rent monthly.\n\nThe lease runs two years.";
        assert_eq!(
            LeadSummarizer::lead(text, 50, 200),
            "The tenant pays rent monthly. The lease runs two years."
        );
    }

    #[test]
    fn stops_at_sentence_boundary_within_max() {
        let text = "First sentence here. Second sentence here. Third sentence here.";
        assert_eq!(
            LeadSummarizer::lead(text, 10, 45),
            "First sentence here. Second sentence here."
        );
    }

    #[test]
    fn long_first_sentence_is_cut_at_words() {
        let text = format!("The supplier {} delivers.", "really ".repeat(100));
        let summary = LeadSummarizer::lead(&text, 50, 200);
        assert!(summary.chars().count() <= 200);
        assert!(summary.chars().count() >= 50);
        assert!(summary.starts_with("The supplier really"));
    }

    #[tokio::test]
    async fn empty_text_is_an_error() {
        let request = SummaryRequest {
            text: "   ",
            min_length: 50,
            max_length: 200,
            deterministic: true,
        };
        assert!(LeadSummarizer.summarize(&request).await.is_err());
    }
}

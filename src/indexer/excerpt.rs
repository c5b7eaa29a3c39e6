//! Card excerpts: the first two sentences of an explanation.

use regex::Regex;
use std::sync::LazyLock;

static SENTENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^.!?]+[.!?]+").expect("static pattern"));

pub const EXCERPT_SENTENCES: usize = 2;

/// Naive sentence split; text without terminal punctuation yields nothing.
pub fn short_description(explanation: &str) -> String {
    SENTENCE
        .find_iter(explanation)
        .take(EXCERPT_SENTENCES)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_two_sentences() {
        assert_eq!(
            short_description("Energy is conserved. It cannot be created! Nor destroyed?"),
            "Energy is conserved.  It cannot be created!"
        );
    }

    #[test]
    fn test_edge_cases() {
        assert_eq!(short_description(""), "");
        assert_eq!(short_description("No terminal punctuation"), "");
        assert_eq!(short_description("One sentence only..."), "One sentence only...");
    }
}

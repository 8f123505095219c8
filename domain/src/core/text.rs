//! Text utilities for the domain layer.
//!
//! Scene text is plain screenplay-style prose. Character identifiers are
//! written as all-caps tokens (`HAMLET:`), which is what the scanners here
//! rely on.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Minimum length (in bytes) for a sentence to count as plot-bearing.
pub const SIGNIFICANT_SENTENCE_LEN: usize = 40;

/// Minimum length (in chars) for a word to count as distinctive.
pub const DISTINCTIVE_WORD_LEN: usize = 5;

fn character_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b[A-Z]{2,}\b").expect("valid character pattern"))
}

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
///
/// Uses byte length for max_len but ensures truncation occurs at valid
/// UTF-8 character boundaries.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len.saturating_sub(3).min(s.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

/// Distinct all-caps tokens of two or more letters, i.e. character identifiers.
pub fn character_identifiers(text: &str) -> BTreeSet<String> {
    character_pattern()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Sentences (split on `.`) longer than [`SIGNIFICANT_SENTENCE_LEN`], trimmed.
pub fn significant_sentences(text: &str) -> Vec<&str> {
    text.split('.')
        .map(str::trim)
        .filter(|s| s.len() > SIGNIFICANT_SENTENCE_LEN)
        .collect()
}

/// Lowercased distinctive words of a sentence, in order of first appearance.
pub fn distinctive_words(sentence: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    sentence
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| w.chars().count() > DISTINCTIVE_WORD_LEN)
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_multibyte() {
        // "é" is two bytes; the cut must back off to a char boundary
        assert_eq!(truncate("ééééé", 8), "éé...");
    }

    #[test]
    fn test_character_identifiers() {
        let scene = "HAMLET: To be.\n(OPHELIA enters)\nHAMLET: Or not. A note.";
        let ids = character_identifiers(scene);
        assert_eq!(
            ids.into_iter().collect::<Vec<_>>(),
            vec!["HAMLET".to_string(), "OPHELIA".to_string()]
        );
    }

    #[test]
    fn test_significant_sentences() {
        let text = "Short one. This sentence is definitely long enough to be counted as significant. Tiny.";
        let sentences = significant_sentences(text);
        assert_eq!(sentences.len(), 1);
        assert!(sentences[0].starts_with("This sentence"));
    }

    #[test]
    fn test_distinctive_words() {
        let words = distinctive_words("The lantern flickers; the LANTERN dies, silently.");
        assert_eq!(words, vec!["lantern", "flickers", "silently"]);
    }
}

//! Expansion validation - guards narrative content when a scene is lengthened.

use super::result::ExpansionRejection;
use crate::core::text::{character_identifiers, distinctive_words, significant_sentences};

/// Number of distinctive words checked per sampled sentence.
const WORDS_PER_SENTENCE: usize = 5;

/// Checks that an expanded scene still carries the original's characters and plot.
///
/// Three checks run in order and the first failure is reported:
///
/// 1. Every character identifier (all-caps token) of the original appears in
///    the candidate.
/// 2. The candidate is strictly longer than the original.
/// 3. The longest quarter (at least one) of the original's significant
///    sentences each keep a strict majority of their first five distinctive
///    words somewhere in the candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpansionValidator;

impl ExpansionValidator {
    pub fn validate(&self, original: &str, candidate: &str) -> Result<(), ExpansionRejection> {
        let present = character_identifiers(candidate);
        let missing: Vec<String> = character_identifiers(original)
            .into_iter()
            .filter(|c| !present.contains(c))
            .collect();
        if !missing.is_empty() {
            return Err(ExpansionRejection::MissingCharacters {
                characters: missing,
            });
        }

        if candidate.len() <= original.len() {
            return Err(ExpansionRejection::NotLonger {
                original: original.len(),
                candidate: candidate.len(),
            });
        }

        let haystack = candidate.to_lowercase();
        for sentence in Self::sample_sentences(original) {
            let words: Vec<String> = distinctive_words(sentence)
                .into_iter()
                .take(WORDS_PER_SENTENCE)
                .collect();
            if words.is_empty() {
                continue;
            }
            let kept = words.iter().filter(|w| haystack.contains(w.as_str())).count();
            if kept * 2 <= words.len() {
                return Err(ExpansionRejection::PlotElementsMissing {
                    sentence: sentence.to_string(),
                });
            }
        }

        Ok(())
    }

    /// The longest quarter of significant sentences, longest first.
    fn sample_sentences(original: &str) -> Vec<&str> {
        let mut sentences = significant_sentences(original);
        if sentences.is_empty() {
            return sentences;
        }
        // Stable sort keeps document order among equal lengths
        sentences.sort_by(|a, b| b.len().cmp(&a.len()));
        let sample_size = (sentences.len() / 4).max(1);
        sentences.truncate(sample_size);
        sentences
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGINAL: &str = "HAMLET: The murderous uncle poisoned my father in the orchard garden. \
OPHELIA: Then vengeance shall follow. Short line.";

    #[test]
    fn test_accepts_faithful_expansion() {
        let candidate = format!(
            "{ORIGINAL}\n(HAMLET paces, the orchard garden visible beyond the window.)\n\
HAMLET: My murderous uncle, who poisoned my father, still smiles."
        );
        assert_eq!(ExpansionValidator.validate(ORIGINAL, &candidate), Ok(()));
    }

    #[test]
    fn test_rejects_dropped_character() {
        let candidate = format!("{} and a great deal more text", ORIGINAL.replace("OPHELIA", "Ophelia"));
        assert_eq!(
            ExpansionValidator.validate(ORIGINAL, &candidate),
            Err(ExpansionRejection::MissingCharacters {
                characters: vec!["OPHELIA".into()]
            })
        );
    }

    #[test]
    fn test_rejects_shorter_candidate() {
        let candidate = "HAMLET OPHELIA";
        assert!(matches!(
            ExpansionValidator.validate(ORIGINAL, candidate),
            Err(ExpansionRejection::NotLonger { .. })
        ));
    }

    #[test]
    fn test_rejects_plot_substitution() {
        let candidate = "HAMLET: A completely different story about pirates and treasure maps unfolds. \
OPHELIA: Indeed, the galleons sail at dawn toward the southern islands, laden with cargo and hope.";
        assert!(matches!(
            ExpansionValidator.validate(ORIGINAL, candidate),
            Err(ExpansionRejection::PlotElementsMissing { .. })
        ));
    }

    #[test]
    fn test_sample_prefers_longest_sentences() {
        let text = "This is a rather long sentence that passes the threshold easily. \
This one is significantly longer than the first one and should be sampled first. \
Another sentence that is long enough to count here. Yet another sentence long enough to count here too.";
        let sample = ExpansionValidator::sample_sentences(text);
        assert_eq!(sample.len(), 1);
        assert!(sample[0].starts_with("This one is significantly longer"));
    }
}

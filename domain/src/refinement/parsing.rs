//! Section-marker parsing for generator responses.
//!
//! Revision and expansion prompts ask the model to answer in two labelled
//! sections: the new content, then an explanation of the changes. These
//! parsers pull the content section out of free-form responses. They are
//! pure text scanning, with no retry or I/O logic.
//!
//! | Markers | Use Case |
//! |---------|----------|
//! | [`SectionMarkers::REFINEMENT`] | `REFINED SCENE:` / `REFINEMENT ANALYSIS:` |
//! | [`SectionMarkers::EXPANSION`] | `EXPANDED SCENE:` / `EXPANSION ANALYSIS:` |

use thiserror::Error;

/// Reasons a response could not be split into its sections.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SectionParseError {
    #[error("response is missing the '{0}' marker")]
    MissingMarker(&'static str),

    #[error("'{content}' must appear before '{analysis}'")]
    MarkersOutOfOrder {
        content: &'static str,
        analysis: &'static str,
    },

    #[error("section between the markers is empty")]
    EmptySection,
}

/// A pair of markers delimiting the content section of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionMarkers {
    /// Marker preceding the content
    pub content: &'static str,
    /// Marker following the content (start of the analysis section)
    pub analysis: &'static str,
}

impl SectionMarkers {
    pub const REFINEMENT: SectionMarkers = SectionMarkers {
        content: "REFINED SCENE:",
        analysis: "REFINEMENT ANALYSIS:",
    };

    pub const EXPANSION: SectionMarkers = SectionMarkers {
        content: "EXPANDED SCENE:",
        analysis: "EXPANSION ANALYSIS:",
    };

    /// Extract the trimmed text between the two markers.
    ///
    /// # Examples
    ///
    /// ```
    /// use stagecraft_domain::refinement::SectionMarkers;
    ///
    /// let response = "REFINED SCENE:\nHAMLET: Hm.\n\nREFINEMENT ANALYSIS:\nTighter.";
    /// assert_eq!(SectionMarkers::REFINEMENT.extract(response).unwrap(), "HAMLET: Hm.");
    /// assert!(SectionMarkers::REFINEMENT.extract("HAMLET: Hm.").is_err());
    /// ```
    pub fn extract<'a>(&self, response: &'a str) -> Result<&'a str, SectionParseError> {
        let start = response
            .find(self.content)
            .ok_or(SectionParseError::MissingMarker(self.content))?;
        let end = response
            .find(self.analysis)
            .ok_or(SectionParseError::MissingMarker(self.analysis))?;

        let body_start = start + self.content.len();
        if body_start > end {
            return Err(SectionParseError::MarkersOutOfOrder {
                content: self.content,
                analysis: self.analysis,
            });
        }

        let body = response[body_start..end].trim();
        if body.is_empty() {
            return Err(SectionParseError::EmptySection);
        }
        Ok(body)
    }

    /// The analysis section, if present.
    pub fn analysis<'a>(&self, response: &'a str) -> Option<&'a str> {
        response
            .find(self.analysis)
            .map(|i| response[i + self.analysis.len()..].trim())
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_between_markers() {
        let response = r#"Sure, here it is.

REFINED SCENE:
SCENE 1
HAMLET: Words, words, words.

REFINEMENT ANALYSIS:
1. Sharpened the wordplay
"#;
        let body = SectionMarkers::REFINEMENT.extract(response).unwrap();
        assert_eq!(body, "SCENE 1\nHAMLET: Words, words, words.");
        assert_eq!(
            SectionMarkers::REFINEMENT.analysis(response),
            Some("1. Sharpened the wordplay")
        );
    }

    #[test]
    fn test_missing_markers() {
        assert_eq!(
            SectionMarkers::EXPANSION.extract("just prose"),
            Err(SectionParseError::MissingMarker("EXPANDED SCENE:"))
        );
        assert_eq!(
            SectionMarkers::EXPANSION.extract("EXPANDED SCENE: text only"),
            Err(SectionParseError::MissingMarker("EXPANSION ANALYSIS:"))
        );
    }

    #[test]
    fn test_markers_out_of_order() {
        let response = "REFINEMENT ANALYSIS: why\nREFINED SCENE: what";
        assert!(matches!(
            SectionMarkers::REFINEMENT.extract(response),
            Err(SectionParseError::MarkersOutOfOrder { .. })
        ));
    }

    #[test]
    fn test_empty_section() {
        let response = "REFINED SCENE:\n   \nREFINEMENT ANALYSIS: nothing";
        assert_eq!(
            SectionMarkers::REFINEMENT.extract(response),
            Err(SectionParseError::EmptySection)
        );
    }
}

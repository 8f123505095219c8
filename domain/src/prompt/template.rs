//! Prompt templates for the refinement loop
//!
//! The wording is free; the structure is the contract. Every revision prompt
//! carries the current scene, the latest scores, the round history, the focus
//! areas and the length bounds, and asks for the two-section answer format
//! that [`SectionMarkers`] parses.

use crate::core::text::truncate;
use crate::refinement::{IterationRecord, QualityVector, SceneRequirements, SectionMarkers};

/// Maximum bytes of a malformed response quoted back in a correction prompt.
pub const CORRECTION_QUOTE_LEN: usize = 1000;

/// Inputs for one revision prompt.
#[derive(Debug, Clone)]
pub struct RevisionPrompt<'a> {
    /// 1-based attempt number
    pub iteration: usize,
    pub content: &'a str,
    pub quality: &'a QualityVector,
    pub history: &'a [IterationRecord],
    pub focus_areas: &'a [String],
    pub requirements: &'a SceneRequirements,
    /// Extra guidance, e.g. an aggregated revision plan
    pub revision_context: Option<&'a str>,
}

/// Templates for generating refinement prompts
pub struct RefinementPromptTemplate;

impl RefinementPromptTemplate {
    /// Prompt asking for one revision of the current scene.
    pub fn revision(input: &RevisionPrompt<'_>) -> String {
        let markers = SectionMarkers::REFINEMENT;
        let mut prompt = format!(
            "Refine and enhance this scene based on the evaluation below. \
This is iteration {} of the refinement process.\n\nCurrent Scene:\n{}\n\nQuality Evaluation:\n",
            input.iteration, input.content
        );

        for (dimension, score) in input.quality.iter() {
            prompt.push_str(&format!("- {}: {:.2}\n", dimension, score));
        }
        prompt.push_str(&format!("Overall: {:.2}\n", input.quality.mean()));

        prompt.push_str("\nPrevious Iterations:\n");
        if input.history.is_empty() {
            prompt.push_str("(none)\n");
        } else {
            for record in input.history {
                prompt.push_str(&record.summary_line());
                prompt.push('\n');
            }
        }

        prompt.push_str("\nFocus Areas for This Iteration:\n");
        for area in input.focus_areas {
            prompt.push_str(&format!("- {}\n", area));
        }

        if let Some(context) = input.revision_context.filter(|c| !c.trim().is_empty()) {
            prompt.push_str("\nReviewer Guidance:\n");
            prompt.push_str(context.trim());
            prompt.push('\n');
        }

        prompt.push_str(&format!(
            r#"
REFINEMENT REQUIREMENTS:
1. Keep the scene's core narrative structure and key events
2. Address the issues behind the lowest scores, especially the focus areas
3. Preserve elements that already score well
4. Keep every character consistent in personality and motivation
5. Keep the scene between {}-{} characters
6. Do not introduce plot elements that break continuity

Format your response EXACTLY as follows:

{}
[Your refined scene content]

{}
1. Specific improvements made in this iteration
2. How the evaluation issues were addressed
3. Elements preserved from the current scene"#,
            input.requirements.min_length,
            input.requirements.max_length,
            markers.content,
            markers.analysis
        ));

        prompt
    }

    /// Retry prompt after a revision response could not be parsed.
    pub fn revision_correction(failed_response: &str, original_prompt: &str) -> String {
        format!(
            r#"CORRECTION NEEDED: Your previous response did not contain a properly formatted scene.

Previous response that failed:
{}

Please provide a complete refined scene with:
- Clear scene structure
- Character names, stage directions and technical cues
- The '{}' and '{}' section markers exactly as requested

{}"#,
            truncate(failed_response, CORRECTION_QUOTE_LEN),
            SectionMarkers::REFINEMENT.content,
            SectionMarkers::REFINEMENT.analysis,
            original_prompt
        )
    }

    /// Prompt asking for the scene to be lengthened to `target_length`.
    pub fn expansion(content: &str, target_length: usize) -> String {
        let markers = SectionMarkers::EXPANSION;
        format!(
            r#"Significantly expand and deepen this scene while keeping its core narrative. The current scene is {} characters; the expanded scene must be at least {} characters.

Current Scene:
{}

EXPANSION REQUIREMENTS:
1. Keep every character and every key event of the original
2. Deepen internal thoughts and emotional reactions
3. Add sensory and environmental detail to the staging
4. Extend dialogue exchanges with subtext and natural rhythm
5. Develop recurring motifs that reflect the scene's themes

Format your response EXACTLY as follows:

{}
[Your expanded scene content]

{}
1. Original vs. new length
2. Key elements expanded
3. How the expansion stays coherent with the original"#,
            content.len(),
            target_length,
            content,
            markers.content,
            markers.analysis
        )
    }

    /// Retry prompt after an expansion response could not be parsed.
    pub fn expansion_correction(
        failed_response: &str,
        target_length: usize,
        original_prompt: &str,
    ) -> String {
        format!(
            r#"CORRECTION NEEDED: Your previous response did not expand the scene properly.

Previous response that failed:
{}

Please provide an expanded scene that:
- Includes all content from the original scene
- Adds enough new material to reach {} characters
- Uses the '{}' and '{}' section markers exactly as requested

{}"#,
            truncate(failed_response, CORRECTION_QUOTE_LEN),
            target_length,
            SectionMarkers::EXPANSION.content,
            SectionMarkers::EXPANSION.analysis,
            original_prompt
        )
    }
}

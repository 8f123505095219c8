//! Heuristic quality evaluator
//!
//! Scores a scene with text scans only: no model is consulted, so the scores
//! are cheap, deterministic and coarse. Requirement fields are read from
//! [`SceneRequirements::extra`]:
//!
//! | key          | type     | dimension              |
//! |--------------|----------|------------------------|
//! | `characters` | list     | `character_consistency`|
//! | `style`      | string   | `thematic_coherence`   |
//! | `period`     | string   | `thematic_coherence`   |
//! | `props`      | list     | `technical_accuracy`   |
//! | `lighting`   | string   | `technical_accuracy`   |
//! | `sound`      | string   | `technical_accuracy`   |
//!
//! An absent requirement counts as satisfied.

use async_trait::async_trait;
use regex::Regex;
use stagecraft_application::{EvaluationError, QualityEvaluator};
use stagecraft_domain::core::text::character_identifiers;
use stagecraft_domain::{QualityVector, SceneRequirements};
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::debug;

/// Dimensions reported by [`HeuristicQualityEvaluator`], in name order.
pub const HEURISTIC_DIMENSIONS: [&str; 6] = [
    "character_consistency",
    "dialogue_quality",
    "dramatic_impact",
    "stage_direction_quality",
    "technical_accuracy",
    "thematic_coherence",
];

const DRAMATIC_ELEMENTS: [&str; 4] = ["tension", "conflict", "resolution", "climax"];
const DIALOGUE_MARKERS: [&str; 4] = ["said", ":", "\"", "'"];

fn stage_direction_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*\(.*\)\s*$").expect("valid stage direction pattern"))
}

/// Share of `needles` found in `haystack` (already lowercased); 1.0 when empty.
fn coverage<'a>(needles: impl IntoIterator<Item = &'a str>, haystack: &str) -> f64 {
    let needles: Vec<String> = needles
        .into_iter()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_lowercase)
        .collect();
    if needles.is_empty() {
        return 1.0;
    }
    let found = needles.iter().filter(|n| haystack.contains(n.as_str())).count();
    found as f64 / needles.len() as f64
}

/// `(presence + distinct share) / 2` over matching lines, 0.0 when none match.
fn presence_and_variety<'a>(lines: impl IntoIterator<Item = &'a str>) -> f64 {
    let lines: Vec<&str> = lines.into_iter().map(str::trim).collect();
    if lines.is_empty() {
        return 0.0;
    }
    let distinct: HashSet<&str> = lines.iter().copied().collect();
    (1.0 + distinct.len() as f64 / lines.len() as f64) / 2.0
}

/// Text-scan evaluator over six theatrical dimensions
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicQualityEvaluator;

impl HeuristicQualityEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Score a scene synchronously.
    pub fn score(&self, content: &str, requirements: &SceneRequirements) -> QualityVector {
        let lowered = content.to_lowercase();
        QualityVector::from_pairs([
            ("character_consistency", Self::characters(content, &lowered, requirements)),
            ("dialogue_quality", Self::dialogue(content)),
            ("dramatic_impact", Self::dramatic_impact(&lowered)),
            ("stage_direction_quality", Self::stage_directions(content)),
            ("technical_accuracy", Self::technical(&lowered, requirements)),
            ("thematic_coherence", Self::themes(&lowered, requirements)),
        ])
    }

    /// Required characters mentioned; without a list, rewards two or more speakers.
    fn characters(content: &str, lowered: &str, requirements: &SceneRequirements) -> f64 {
        let required = requirements.extra_list("characters");
        if required.is_empty() {
            let speakers = character_identifiers(content).len().min(2);
            return speakers as f64 / 2.0;
        }
        coverage(required, lowered)
    }

    fn dialogue(content: &str) -> f64 {
        presence_and_variety(
            content
                .lines()
                .filter(|line| DIALOGUE_MARKERS.iter().any(|m| line.contains(m))),
        )
    }

    fn dramatic_impact(lowered: &str) -> f64 {
        coverage(DRAMATIC_ELEMENTS, lowered)
    }

    fn stage_directions(content: &str) -> f64 {
        let pattern = stage_direction_pattern();
        presence_and_variety(content.lines().filter(|line| pattern.is_match(line)))
    }

    fn technical(lowered: &str, requirements: &SceneRequirements) -> f64 {
        let props = coverage(requirements.extra_list("props"), lowered);
        let lighting = coverage([requirements.extra_str("lighting")], lowered);
        let sound = coverage([requirements.extra_str("sound")], lowered);
        (props + lighting + sound) / 3.0
    }

    fn themes(lowered: &str, requirements: &SceneRequirements) -> f64 {
        let style = coverage([requirements.extra_str("style")], lowered);
        let period = coverage([requirements.extra_str("period")], lowered);
        (style + period) / 2.0
    }
}

#[async_trait]
impl QualityEvaluator for HeuristicQualityEvaluator {
    async fn evaluate(
        &self,
        content: &str,
        requirements: &SceneRequirements,
    ) -> Result<QualityVector, EvaluationError> {
        let scores = self.score(content, requirements);
        debug!("Heuristic scores for {}: {}", requirements.scene_label(), scores);
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCENE: &str = "\
(Lights rise on the battlements. Thunder rumbles.)
HAMLET: What tension hangs in this cold air.
HORATIO: The conflict is not ours to settle.
(A lantern gutters.)
HAMLET: Then let the climax come.";

    #[test]
    fn test_reports_every_dimension() {
        let scores = HeuristicQualityEvaluator.score(SCENE, &SceneRequirements::new());
        let dimensions: Vec<&str> = scores.dimensions().collect();
        assert_eq!(dimensions, HEURISTIC_DIMENSIONS);
        assert!(scores.iter().all(|(_, s)| (0.0..=1.0).contains(&s)));
    }

    #[test]
    fn test_dimension_set_is_stable_for_empty_scene() {
        let scores = HeuristicQualityEvaluator.score("", &SceneRequirements::new());
        assert_eq!(scores.len(), HEURISTIC_DIMENSIONS.len());
        assert_eq!(scores.get("dialogue_quality"), Some(0.0));
        assert_eq!(scores.get("stage_direction_quality"), Some(0.0));
    }

    #[test]
    fn test_scene_scans() {
        let scores = HeuristicQualityEvaluator.score(SCENE, &SceneRequirements::new());
        // Two speakers detected without a character list
        assert_eq!(scores.get("character_consistency"), Some(1.0));
        // Three dialogue lines, all distinct
        assert_eq!(scores.get("dialogue_quality"), Some(1.0));
        // tension, conflict and climax but no resolution
        assert_eq!(scores.get("dramatic_impact"), Some(0.75));
        assert_eq!(scores.get("stage_direction_quality"), Some(1.0));
    }

    #[test]
    fn test_repeated_lines_lower_variety() {
        let scene = "HAMLET: Again.\nHAMLET: Again.";
        let scores = HeuristicQualityEvaluator.score(scene, &SceneRequirements::new());
        assert_eq!(scores.get("dialogue_quality"), Some(0.75));
    }

    #[test]
    fn test_requirements_drive_scores() {
        let requirements = SceneRequirements::new()
            .with_extra("characters", json!(["Hamlet", "Ophelia"]))
            .with_extra("props", json!(["lantern", "sword"]))
            .with_extra("lighting", "lights rise")
            .with_extra("sound", "thunder")
            .with_extra("style", "gothic")
            .with_extra("period", "medieval");

        let scores = HeuristicQualityEvaluator.score(SCENE, &requirements);
        assert_eq!(scores.get("character_consistency"), Some(0.5));
        assert_eq!(scores.get("technical_accuracy"), Some((0.5 + 1.0 + 1.0) / 3.0));
        assert_eq!(scores.get("thematic_coherence"), Some(0.0));
    }

    #[tokio::test]
    async fn test_evaluate_port() {
        let scores = HeuristicQualityEvaluator::new()
            .evaluate(SCENE, &SceneRequirements::new())
            .await
            .unwrap();
        assert_eq!(scores.len(), 6);
    }
}

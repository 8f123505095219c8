//! Structured feedback schema exchanged between reviewer roles.
//!
//! Packages are plain serde data so that they can be loaded from JSON files
//! or produced by a language model. Scores are validated on construction and
//! on deserialisation through [`UnitScore`].

use crate::core::error::{DomainError, ensure_unit_score};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A score in `[0, 1]`.
///
/// Out-of-range or NaN values are rejected rather than clamped, both by
/// [`UnitScore::new`] and when deserialising.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct UnitScore(f64);

impl UnitScore {
    pub fn new(value: f64) -> Result<Self, DomainError> {
        ensure_unit_score("score", value).map(Self)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for UnitScore {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UnitScore> for f64 {
    fn from(score: UnitScore) -> Self {
        score.0
    }
}

/// Category of a feedback item.
///
/// Declaration order is the category order of the revision plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackType {
    Dialogue,
    Character,
    Pacing,
    Technical,
    Atmosphere,
    Structure,
    Continuity,
    Performance,
}

impl FeedbackType {
    pub const ALL: [FeedbackType; 8] = [
        FeedbackType::Dialogue,
        FeedbackType::Character,
        FeedbackType::Pacing,
        FeedbackType::Technical,
        FeedbackType::Atmosphere,
        FeedbackType::Structure,
        FeedbackType::Continuity,
        FeedbackType::Performance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackType::Dialogue => "dialogue",
            FeedbackType::Character => "character",
            FeedbackType::Pacing => "pacing",
            FeedbackType::Technical => "technical",
            FeedbackType::Atmosphere => "atmosphere",
            FeedbackType::Structure => "structure",
            FeedbackType::Continuity => "continuity",
            FeedbackType::Performance => "performance",
        }
    }
}

impl std::fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity of a feedback item, in fix-first order (`Blocker` sorts first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Must fix before proceeding
    Blocker,
    /// Serious issue affecting quality
    Critical,
    /// Significant improvement needed
    Major,
    /// Would be nice to fix
    Minor,
    /// Optional enhancement
    Suggestion,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Blocker => "blocker",
            Severity::Critical => "critical",
            Severity::Major => "major",
            Severity::Minor => "minor",
            Severity::Suggestion => "suggestion",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single typed critique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackItem {
    #[serde(rename = "type")]
    pub kind: FeedbackType,
    pub severity: Severity,
    pub description: String,
    /// Line number or scene location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

impl FeedbackItem {
    pub fn new(kind: FeedbackType, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            description: description.into(),
            location: None,
            suggestion: None,
            examples: Vec::new(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }

    pub fn is_blocker(&self) -> bool {
        self.severity == Severity::Blocker
    }
}

fn default_true() -> bool {
    true
}

/// Line-level dialogue critique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueFeedback {
    pub character_name: String,
    pub line_reference: String,
    pub issue: String,
    #[serde(default)]
    pub improved_version: Option<String>,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default = "default_true")]
    pub maintains_voice: bool,
    #[serde(default)]
    pub subtext_notes: Option<String>,
}

impl DialogueFeedback {
    pub fn new(
        character_name: impl Into<String>,
        line_reference: impl Into<String>,
        issue: impl Into<String>,
    ) -> Self {
        Self {
            character_name: character_name.into(),
            line_reference: line_reference.into(),
            issue: issue.into(),
            improved_version: None,
            reasoning: String::new(),
            maintains_voice: true,
            subtext_notes: None,
        }
    }

    pub fn with_improved_version(mut self, text: impl Into<String>) -> Self {
        self.improved_version = Some(text.into());
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }
}

/// Character consistency and development critique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterFeedback {
    pub character_name: String,
    pub consistency_score: UnitScore,
    #[serde(default)]
    pub arc_progression: String,
    #[serde(default)]
    pub inconsistencies: Vec<String>,
    #[serde(default)]
    pub growth_opportunities: Vec<String>,
    #[serde(default)]
    pub relationship_dynamics: BTreeMap<String, String>,
}

/// Pacing and rhythm critique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacingFeedback {
    /// slow, moderate, fast or varied
    pub overall_pace: String,
    #[serde(default)]
    pub problem_areas: Vec<BTreeMap<String, String>>,
    #[serde(default)]
    pub suggested_beats: Vec<String>,
    /// Tension levels through the scene
    #[serde(default)]
    pub tension_curve: Vec<f64>,
    #[serde(default)]
    pub recommended_adjustments: String,
}

/// Technical production critique (lighting, sound, props, costumes, set).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalFeedback {
    pub element_type: String,
    #[serde(default)]
    pub cues: Vec<Value>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub safety_concerns: Vec<String>,
    #[serde(default)]
    pub budget_impact: Option<String>,
    /// feasible, challenging or requires_adaptation
    #[serde(default = "default_feasibility")]
    pub feasibility: String,
}

fn default_feasibility() -> String {
    "feasible".to_string()
}

/// Mood and atmosphere critique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtmosphereFeedback {
    pub current_mood: String,
    pub intended_mood: String,
    pub alignment_score: UnitScore,
    #[serde(default)]
    pub enhancement_suggestions: Vec<String>,
    /// Keyed by sense: visual, auditory, tactile, olfactory
    #[serde(default)]
    pub sensory_elements: BTreeMap<String, Vec<String>>,
}

/// Scene structure critique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralFeedback {
    pub structure_type: String,
    pub current_structure: String,
    pub recommended_structure: String,
    #[serde(default)]
    pub impact_on_flow: String,
    #[serde(default)]
    pub specific_changes: Vec<BTreeMap<String, String>>,
}

/// Complete feedback package from one reviewer for one scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveFeedback {
    pub agent_name: String,
    pub agent_role: String,
    pub scene_id: String,
    #[serde(default)]
    pub overall_impression: String,
    pub quality_score: UnitScore,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dialogue_feedback: Vec<DialogueFeedback>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub character_feedback: Vec<CharacterFeedback>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pacing_feedback: Option<PacingFeedback>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub technical_feedback: Vec<TechnicalFeedback>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atmosphere_feedback: Option<AtmosphereFeedback>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structural_feedback: Option<StructuralFeedback>,

    /// Ordered as the reviewer listed them
    #[serde(default)]
    pub priority_items: Vec<FeedbackItem>,
}

impl ComprehensiveFeedback {
    /// Create an empty package; fails when `quality_score` is outside `[0, 1]`.
    pub fn try_new(
        agent_name: impl Into<String>,
        agent_role: impl Into<String>,
        scene_id: impl Into<String>,
        quality_score: f64,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            agent_name: agent_name.into(),
            agent_role: agent_role.into(),
            scene_id: scene_id.into(),
            overall_impression: String::new(),
            quality_score: ensure_unit_score("quality_score", quality_score).map(UnitScore)?,
            dialogue_feedback: Vec::new(),
            character_feedback: Vec::new(),
            pacing_feedback: None,
            technical_feedback: Vec::new(),
            atmosphere_feedback: None,
            structural_feedback: None,
            priority_items: Vec::new(),
        })
    }

    pub fn with_impression(mut self, impression: impl Into<String>) -> Self {
        self.overall_impression = impression.into();
        self
    }

    pub fn with_item(mut self, item: FeedbackItem) -> Self {
        self.priority_items.push(item);
        self
    }

    pub fn with_dialogue(mut self, feedback: DialogueFeedback) -> Self {
        self.dialogue_feedback.push(feedback);
        self
    }

    pub fn with_pacing(mut self, feedback: PacingFeedback) -> Self {
        self.pacing_feedback = Some(feedback);
        self
    }

    pub fn score(&self) -> f64 {
        self.quality_score.value()
    }

    /// Blocker-severity items, in listed order.
    pub fn blockers(&self) -> impl Iterator<Item = &FeedbackItem> {
        self.priority_items.iter().filter(|i| i.is_blocker())
    }

    pub fn items_of(&self, kind: FeedbackType) -> impl Iterator<Item = &FeedbackItem> {
        self.priority_items.iter().filter(move |i| i.kind == kind)
    }

    /// Render this package alone as revision instructions.
    pub fn to_revision_instructions(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        let blockers: Vec<_> = self.blockers().collect();
        if !blockers.is_empty() {
            lines.push("MUST FIX BEFORE PROCEEDING:".to_string());
            for item in blockers {
                lines.push(format!("- {}", item.description));
                if let Some(suggestion) = &item.suggestion {
                    lines.push(format!("  Suggestion: {}", suggestion));
                }
            }
        }

        let critical: Vec<_> = self
            .priority_items
            .iter()
            .filter(|i| i.severity == Severity::Critical)
            .collect();
        if !critical.is_empty() {
            lines.push("\nCRITICAL IMPROVEMENTS:".to_string());
            for item in critical {
                lines.push(format!("- {}", item.description));
            }
        }

        if !self.dialogue_feedback.is_empty() {
            lines.push("\nDIALOGUE REVISIONS:".to_string());
            for df in &self.dialogue_feedback {
                lines.push(format!("- {}: {}", df.character_name, df.issue));
                if let Some(improved) = &df.improved_version {
                    lines.push(format!("  Suggested: {}", improved));
                }
            }
        }

        if let Some(pacing) = &self.pacing_feedback {
            lines.push(format!("\nPACING: {}", pacing.recommended_adjustments));
        }

        lines.join("\n")
    }
}

//! Console output formatter for stagecraft results

use colored::Colorize;
use serde::Serialize;
use stagecraft_application::{ProductionResult, ReviewOutput};
use stagecraft_domain::{
    ConflictResolution, ExpansionOutcome, ExpansionResult, FeedbackAggregate, QualityVector,
    RefinementResult,
};

/// Formats refinement, expansion and review results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format a complete production run: review, refinement and expansion
    pub fn format_production(result: &ProductionResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Scene Production"));
        output.push('\n');

        if let Some(review) = &result.review {
            output.push_str(&Self::review_section(review));
        }

        output.push_str(&Self::refinement_section(&result.refinement));

        if let Some(expansion) = &result.expansion {
            output.push_str(&Self::expansion_section(expansion));
        }

        output.push_str(&Self::section_header("Final Scene"));
        output.push_str(&format!("\n{}\n", result.final_content()));
        output.push_str(&Self::footer());

        output
    }

    /// Format a standalone expansion result
    pub fn format_expansion(result: &ExpansionResult) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("Scene Expansion"));
        output.push('\n');
        output.push_str(&Self::expansion_section(result));
        output.push_str(&Self::section_header("Scene"));
        output.push_str(&format!("\n{}\n", result.content));
        output.push_str(&Self::footer());
        output
    }

    /// Format the unified revision plan for a set of packages
    pub fn format_plan(aggregate: &FeedbackAggregate) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(&format!("Revision Plan: {}", aggregate.scene_id)));
        output.push('\n');
        output.push_str(&aggregate.revision_plan());
        output.push('\n');

        let conflicts = aggregate.conflicts();
        if !conflicts.is_empty() {
            output.push_str(&Self::section_header("Dialogue Conflicts"));
            for conflict in &conflicts {
                output.push_str(&format!("\n{}\n", conflict.location().yellow().bold()));
                for proposal in &conflict.proposals {
                    let suggestion = proposal.suggestion.as_deref().unwrap_or("(no rewrite)");
                    output.push_str(&format!("  {} {}\n", format!("{}:", proposal.agent).cyan(), suggestion));
                }
            }
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format a quality vector as an aligned table
    pub fn format_quality(label: &str, quality: &QualityVector) -> String {
        let mut output = String::new();
        output.push_str(&format!("{} {}\n", "Scene:".cyan().bold(), label));
        output.push_str(&Self::quality_table(quality));
        output.push_str(&format!(
            "\n{} {:.2}\n",
            "Mean:".cyan().bold(),
            quality.mean()
        ));
        output
    }

    /// Format any result as JSON
    pub fn format_json<T: Serialize>(result: &T) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    fn review_section(review: &ReviewOutput) -> String {
        let mut output = Self::section_header("Review");
        let aggregate = &review.aggregate;

        output.push_str(&format!(
            "\n{} {:.2} from {} package(s)\n",
            "Consensus score:".cyan().bold(),
            aggregate.consensus_score(),
            aggregate.len()
        ));

        let blockers = aggregate.blockers();
        if !blockers.is_empty() {
            output.push_str(&format!("\n{}\n", "Blockers:".red().bold()));
            for (agent, item) in blockers {
                output.push_str(&format!("  * [{}] {}\n", agent, item.description));
            }
        }

        if !review.decisions.is_empty() {
            output.push_str(&format!("\n{}\n", "Dialogue decisions:".cyan().bold()));
            for decision in &review.decisions {
                let outcome = match (&decision.resolution, decision.agreed_line()) {
                    (ConflictResolution::Resolved { method, .. }, Some(line)) => {
                        format!("\"{}\" ({})", line, method.as_str()).green().to_string()
                    }
                    (ConflictResolution::Resolved { method, .. }, None) => {
                        format!("keep original ({})", method.as_str())
                    }
                    _ => "requires compromise".yellow().to_string(),
                };
                output.push_str(&format!("  * {} -> {}\n", decision.conflict.location(), outcome));
            }
        }

        if !review.failed_reviewers.is_empty() {
            output.push_str(&format!(
                "\n{} {}\n",
                "Failed reviewers:".red(),
                review.failed_reviewers.join(", ")
            ));
        }

        output
    }

    fn refinement_section(result: &RefinementResult) -> String {
        let mut output = Self::section_header("Refinement");

        output.push_str(&format!(
            "\n{} {:.2} -> {:.2} ({:+.3})\n",
            "Quality:".cyan().bold(),
            result.initial_mean(),
            result.final_mean(),
            result.total_improvement()
        ));

        if !result.iterations.is_empty() {
            output.push_str(&format!("\n{}\n", "Rounds:".cyan().bold()));
            output.push_str(&format!(
                "  {:>5}  {:>6}  {:>8}  {:>7}  {}\n",
                "round", "mean", "change", "time", "focus"
            ));
            for record in &result.iterations {
                let change = format!("{:+.3}", record.overall_improvement);
                let change = if record.overall_improvement > 0.0 {
                    change.green()
                } else {
                    change.red()
                };
                let marker = if record.adopted { "" } else { " (discarded)" };
                output.push_str(&format!(
                    "  {:>5}  {:>6.2}  {:>8}  {:>6.1}s  {}{}\n",
                    record.iteration,
                    record.quality(),
                    change,
                    record.duration.as_secs_f64(),
                    record.focus_areas.join(", "),
                    marker.dimmed()
                ));
            }
        }

        if result.skipped_rounds > 0 {
            output.push_str(&format!(
                "\n{} {}\n",
                "Skipped rounds:".yellow(),
                result.skipped_rounds
            ));
        }

        output.push_str(&format!(
            "\n{} {}\n",
            "Stopped:".cyan().bold(),
            result.stop_reason
        ));

        output.push_str(&format!("\n{}\n", "Final scores:".cyan().bold()));
        output.push_str(&Self::quality_table(&result.final_quality));

        output
    }

    fn expansion_section(result: &ExpansionResult) -> String {
        let mut output = Self::section_header("Expansion");

        let status = match &result.outcome {
            ExpansionOutcome::AlreadyLongEnough => "already long enough".to_string(),
            ExpansionOutcome::Expanded => "expanded".green().to_string(),
            ExpansionOutcome::ExtractionFailed => "response could not be parsed".red().to_string(),
            ExpansionOutcome::ValidationFailed { rejection } => {
                format!("rejected: {}", rejection).red().to_string()
            }
            ExpansionOutcome::Cancelled => "cancelled".yellow().to_string(),
        };

        output.push_str(&format!("\n{} {}\n", "Outcome:".cyan().bold(), status));
        output.push_str(&format!(
            "{} {} -> {} chars (x{:.2})\n",
            "Length:".cyan().bold(),
            result.original_length,
            result.final_length,
            result.expansion_ratio
        ));

        output
    }

    fn quality_table(quality: &QualityVector) -> String {
        let width = quality.dimensions().map(str::len).max().unwrap_or(0);
        quality
            .iter()
            .map(|(dimension, score)| format!("  {:<width$}  {:.2}\n", dimension, score, width = width))
            .collect()
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

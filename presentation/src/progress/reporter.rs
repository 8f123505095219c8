//! Progress reporting for scene runs

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use stagecraft_application::{ProgressNotifier, ProgressUpdate, Stage};
use stagecraft_domain::IterationRecord;
use std::sync::Mutex;

/// Reports progress with one progress bar per stage
pub struct ProgressReporter {
    multi: MultiProgress,
    stage_bar: Mutex<Option<(Stage, ProgressBar)>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            stage_bar: Mutex::new(None),
        }
    }

    fn stage_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn stage_display_name(stage: Stage) -> &'static str {
        match stage {
            Stage::Reviewing => "Review",
            Stage::Evaluating => "Evaluation",
            Stage::Refining => "Refinement",
            Stage::Expanding => "Expansion",
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.stage_bar.lock()
            && let Some((_, pb)) = guard.as_ref()
        {
            f(pb);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_progress(&self, update: &ProgressUpdate) {
        let Ok(mut guard) = self.stage_bar.lock() else {
            return;
        };

        let same_stage = matches!(guard.as_ref(), Some((stage, _)) if *stage == update.stage);
        if !same_stage {
            if let Some((_, previous)) = guard.take() {
                previous.finish_and_clear();
            }
            let pb = self.multi.add(ProgressBar::new(update.total_steps as u64));
            pb.set_style(Self::stage_style());
            pb.set_prefix(Self::stage_display_name(update.stage));
            *guard = Some((update.stage, pb));
        }

        if let Some((_, pb)) = guard.as_ref() {
            pb.set_position(update.current_step.saturating_sub(1) as u64);
            pb.set_message(update.message.clone());
        }
    }

    fn on_iteration_complete(&self, record: &IterationRecord) {
        let change = format!("{:+.3}", record.overall_improvement);
        let change = if record.overall_improvement > 0.0 {
            change.green()
        } else {
            change.red()
        };
        let message = format!("round {}: {:.2} ({})", record.iteration, record.quality(), change);
        self.with_bar(|pb| {
            pb.inc(1);
            pb.set_message(message);
        });
    }

    fn on_round_skipped(&self, attempt: usize) {
        self.with_bar(|pb| {
            pb.inc(1);
            pb.set_message(format!("{} round {} skipped", "x".red(), attempt));
        });
    }

    fn on_review_complete(&self, agent: &str, success: bool) {
        let status = if success {
            format!("{} {}", "v".green(), agent)
        } else {
            format!("{} {}", "x".red(), agent)
        };
        self.with_bar(|pb| {
            pb.inc(1);
            pb.set_message(status);
        });
    }

    fn on_stage_complete(&self, stage: Stage) {
        let Ok(mut guard) = self.stage_bar.lock() else {
            return;
        };
        if matches!(guard.as_ref(), Some((current, _)) if *current == stage)
            && let Some((_, pb)) = guard.take()
        {
            pb.finish_with_message(format!("{} complete", Self::stage_display_name(stage).green()));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_progress(&self, update: &ProgressUpdate) {
        eprintln!(
            "{} {} [{}/{}] {}",
            "->".cyan(),
            ProgressReporter::stage_display_name(update.stage).bold(),
            update.current_step,
            update.total_steps,
            update.message
        );
    }

    fn on_iteration_complete(&self, record: &IterationRecord) {
        eprintln!(
            "  {} round {}: {:.2} ({:+.3})",
            "v".green(),
            record.iteration,
            record.quality(),
            record.overall_improvement
        );
    }

    fn on_round_skipped(&self, attempt: usize) {
        eprintln!("  {} round {} skipped (unparsable response)", "x".red(), attempt);
    }

    fn on_review_complete(&self, agent: &str, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), agent);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), agent);
        }
    }
}

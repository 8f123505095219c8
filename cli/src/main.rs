//! CLI entrypoint for stagecraft
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use stagecraft_application::{
    InteractionCoordinator, ProduceSceneInput, ProduceSceneUseCase, ProgressNotifier,
    RefinementEngine, ReviewSceneUseCase, SceneReviewer,
};
use stagecraft_domain::{FeedbackAggregate, OutputFormat, SceneRequirements};
use stagecraft_infrastructure::{
    ChatCompletionsGenerator, ConfigLoader, FileConfig, GeneratorSettings,
    HeuristicQualityEvaluator, StaticReviewer, load_packages,
};
use stagecraft_presentation::{Cli, Command, ConsoleFormatter, ProgressReporter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };
    for issue in config.ensure_valid()? {
        warn!("{}", issue.message);
    }

    if !config.output.color {
        colored::control::set_override(false);
    }

    let format = cli
        .output
        .map(OutputFormat::from)
        .or(config.output.format)
        .unwrap_or_default();

    let Some(command) = cli.command else {
        bail!("No command given. Run `stagecraft --help` for usage.");
    };

    info!("Starting stagecraft");

    match command {
        Command::Evaluate { file, scene_id } => {
            let content = read_scene(&file)?;
            let requirements = requirements_for(&config, &file, scene_id);
            let quality = HeuristicQualityEvaluator::new().score(&content, &requirements);
            let output = match format {
                OutputFormat::Json => ConsoleFormatter::format_json(&quality),
                _ => ConsoleFormatter::format_quality(requirements.scene_label(), &quality),
            };
            println!("{}", output);
        }

        Command::Plan { packages } => {
            let aggregate = load_aggregate(&packages)?;
            let output = match format {
                OutputFormat::Json => ConsoleFormatter::format_json(&serde_json::json!({
                    "scene_id": aggregate.scene_id,
                    "consensus_score": aggregate.consensus_score(),
                    "revision_plan": aggregate.revision_plan(),
                    "conflicts": aggregate.conflicts(),
                    "packages": aggregate.packages,
                })),
                OutputFormat::Content => aggregate.revision_plan(),
                OutputFormat::Full => ConsoleFormatter::format_plan(&aggregate),
            };
            println!("{}", output);
        }

        Command::Expand { file, target } => {
            let content = read_scene(&file)?;
            let token = cancel_on_ctrl_c();
            let engine = build_engine(&config, None, token)?;
            let target = target.unwrap_or(config.expansion.to_params().target_length);

            let progress = progress_for(cli.quiet);
            let result = engine.expand(content, target, progress.as_ref()).await?;
            if result.is_failure() {
                warn!("Expansion did not produce a usable scene; the original is returned");
            }

            let output = match format {
                OutputFormat::Json => ConsoleFormatter::format_json(&result),
                OutputFormat::Content => result.content.clone(),
                OutputFormat::Full => ConsoleFormatter::format_expansion(&result),
            };
            println!("{}", output);
        }

        Command::Refine {
            file,
            expand,
            feedback,
            scene_id,
            max_iterations,
        } => {
            let content = read_scene(&file)?;
            let requirements = requirements_for(&config, &file, scene_id);
            let token = cancel_on_ctrl_c();

            // === Dependency Injection ===
            let engine = build_engine(&config, max_iterations, token.clone())?;
            let reviewers: Vec<Arc<dyn SceneReviewer>> = load_packages(feedback.as_slice())?
                .into_iter()
                .map(|package| Arc::new(StaticReviewer::new(package)) as Arc<dyn SceneReviewer>)
                .collect();
            let review = ReviewSceneUseCase::new(reviewers).with_cancellation(token);
            let use_case = ProduceSceneUseCase::new(engine).with_review(review);

            let (vote_rule, _) = config.interaction.parse_vote_rule();
            let mut coordinator = InteractionCoordinator::new().with_vote_rule(vote_rule);

            let mut input = ProduceSceneInput::new(content).with_requirements(requirements);
            if expand {
                input = input.with_expansion(config.expansion.to_params().target_length);
            }
            if !config.interaction.resolve_conflicts {
                input = input.without_conflict_resolution();
            }

            let progress = progress_for(cli.quiet);
            let result = use_case
                .execute_with_progress(input, &mut coordinator, progress.as_ref())
                .await?;

            let output = match format {
                OutputFormat::Json => ConsoleFormatter::format_json(&result),
                OutputFormat::Content => result.final_content().to_string(),
                OutputFormat::Full => ConsoleFormatter::format_production(&result),
            };
            println!("{}", output);
        }
    }

    Ok(())
}

/// Install the tracing subscriber; the returned guard flushes the log file on drop.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"), // -vvv or more
        })
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter());

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let directory = path.parent().filter(|p| !p.as_os_str().is_empty());
            let file_name = path
                .file_name()
                .with_context(|| format!("Invalid log file path: {}", path.display()))?;
            let appender =
                tracing_appender::rolling::never(directory.unwrap_or(Path::new(".")), file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

fn build_engine(
    config: &FileConfig,
    max_iterations: Option<usize>,
    token: CancellationToken,
) -> Result<RefinementEngine<ChatCompletionsGenerator, HeuristicQualityEvaluator>> {
    let settings = GeneratorSettings::from_config(&config.generator);
    if settings.api_key.is_none() {
        warn!(
            "{} is not set; requests to {} are sent without credentials",
            config.generator.api_key_env, settings.base_url
        );
    }
    let generator = Arc::new(ChatCompletionsGenerator::new(settings)?);
    let evaluator = Arc::new(HeuristicQualityEvaluator::new());

    let (mut params, _) = config.refinement.to_params();
    if let Some(max) = max_iterations {
        params = params.with_max_iterations(max);
    }

    Ok(RefinementEngine::new(generator, evaluator)
        .with_params(params)
        .with_cancellation(token))
}

/// Cancel the returned token on the first Ctrl-C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing the current step");
            trigger.cancel();
        }
    });
    token
}

fn progress_for(quiet: bool) -> Box<dyn ProgressNotifier> {
    if quiet {
        Box::new(stagecraft_application::NoProgress)
    } else {
        Box::new(ProgressReporter::new())
    }
}

fn read_scene(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read scene {}", path.display()))
}

fn requirements_for(config: &FileConfig, file: &Path, scene_id: Option<String>) -> SceneRequirements {
    let scene_id = scene_id.unwrap_or_else(|| {
        file.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "scene".to_string())
    });
    config.scene.to_requirements(scene_id)
}

fn load_aggregate(paths: &[PathBuf]) -> Result<FeedbackAggregate> {
    let packages = load_packages(paths)?;
    let Some(first) = packages.first() else {
        bail!("No feedback packages found in {} file(s)", paths.len());
    };

    let mut aggregate = FeedbackAggregate::new(first.scene_id.clone());
    for package in packages {
        if package.scene_id != aggregate.scene_id {
            warn!(
                "Package from {} targets scene '{}', aggregating under '{}'",
                package.agent_name, package.scene_id, aggregate.scene_id
            );
        }
        aggregate.add(package);
    }
    Ok(aggregate)
}

use std::path::Path;

use anyhow::Context;
use cluesmith_core::{
    GenerationError, OutputPaths, Pipeline, PipelineConfig, PipelineOutcome, RunMode,
};

use super::super::args::GenerateArgs;
use crate::exit_codes;

pub async fn run(args: GenerateArgs) -> anyhow::Result<i32> {
    let config = match build_config(&args, |name| std::env::var(name).ok()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e:#}");
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    let pipeline = if args.offline {
        Pipeline::new(config)
    } else {
        Pipeline::from_config(config).context("failed to set up content generator")?
    };

    let outputs = OutputPaths::new(&args.hints, &args.explanations);
    match pipeline.run_files(&args.game_data, &outputs).await {
        Ok(outcome) => {
            println!("{}", summary_line(&outcome));
            Ok(exit_codes::SUCCESS)
        }
        Err(e) if is_input_error(&e, &args.game_data) => {
            eprintln!("cannot read clue list: {e}");
            Ok(exit_codes::INPUT_ERROR)
        }
        Err(e) => Err(e).context("failed to write outputs"),
    }
}

/// Defaults, then the YAML file, then the environment, then flags.
fn build_config<F>(args: &GenerateArgs, env: F) -> anyhow::Result<PipelineConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let base = match &args.config {
        Some(path) => PipelineConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    let mut config = base.with_env_from(env);

    if let Some(model) = &args.model {
        config = config.with_model(model);
    }
    if let Some(version) = &args.prompt_version {
        config = config.with_prompt_version(version);
    }
    if let Some(n) = args.concurrency {
        config = config.with_concurrency(n);
    }
    if let Some(path) = &args.cache_file {
        config = config.with_cache_file(path);
    }
    if let Some(url) = &args.api_url {
        config = config.with_api_url(url);
    }
    if let Some(t) = args.temperature {
        config.temperature = t;
    }
    Ok(config)
}

fn is_input_error(err: &GenerationError, input: &Path) -> bool {
    matches!(err, GenerationError::Io { path, .. } if *path == input.display().to_string())
}

fn summary_line(outcome: &PipelineOutcome) -> String {
    match outcome.mode {
        RunMode::Replay => format!(
            "cache replay: hints={} expl={}; wrote_hints={} wrote_expl={}",
            outcome.hint_count,
            outcome.explanation_count,
            outcome.wrote_hints,
            outcome.wrote_explanations
        ),
        RunMode::Live => format!(
            "{} hints={} expl={} cache_entries={}",
            outcome.summary, outcome.hint_count, outcome.explanation_count, outcome.cache_entries
        ),
    }
}

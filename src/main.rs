// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Metrics CLI for benchmark runs
//!
//! Usage:
//!   newscheck-metrics --input run.json --threshold 0.6
//!   newscheck-metrics --synthetic 200 --mode binary --seed 42
//!   newscheck-metrics --input a.json --compare b.json --compare c.json

use anyhow::{Context, Result};
use clap::Parser;
use newscheck_eval::engine::comparison_markdown;
use newscheck_eval::{
    BenchmarkRun, BenchmarkSummary, EvaluationMode, MetricsConfig, MetricsEngine, MetricsReport,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "newscheck-metrics")]
#[command(about = "Compute benchmark metrics for a classification run")]
#[command(version)]
struct Args {
    /// Run payload (JSON) to evaluate; a synthetic run is used when absent
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Override the run's evaluation mode
    /// (score, score_with_explanation, binary, binary_with_explanation)
    #[arg(short, long)]
    mode: Option<String>,

    /// Decision threshold for score modes
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Engine configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of statements in the synthetic run
    #[arg(long, default_value_t = 200)]
    synthetic: usize,

    /// Trials per statement in the synthetic run
    #[arg(long, default_value_t = 3)]
    iterations: usize,

    /// Random seed for the synthetic run
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Additional run payloads to compare curves against
    #[arg(long)]
    compare: Vec<PathBuf>,

    /// Write the summary as JSON to this path
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match args.config {
        Some(ref path) => MetricsConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => MetricsConfig::default(),
    };
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }

    let mode_override: Option<EvaluationMode> = args
        .mode
        .as_deref()
        .map(str::parse)
        .transpose()
        .context("Invalid --mode")?;

    let (source, mut run) = match args.input {
        Some(ref path) => {
            let run = BenchmarkRun::load(path)
                .with_context(|| format!("Failed to load run: {}", path.display()))?;
            (path.display().to_string(), run)
        }
        None => {
            let mode = mode_override.unwrap_or(EvaluationMode::Score);
            tracing::info!(
                "Generating synthetic run ({} statements x {} trials, seed={})",
                args.synthetic,
                args.iterations,
                args.seed
            );
            let run = BenchmarkRun::synthetic(args.synthetic, args.iterations, mode, args.seed);
            let summary = BenchmarkSummary::from_results(&run.results, &config);
            ("synthetic".to_string(), run.with_summary(&summary))
        }
    };

    if let Some(mode) = mode_override {
        run.mode = mode;
    }

    let engine = MetricsEngine::new(config);
    let summary = engine.compute(&run);

    println!("\n{}", summary.format());

    if !args.compare.is_empty() {
        let mut runs = vec![(source.clone(), run.results.clone())];
        for path in &args.compare {
            let other = BenchmarkRun::load(path)
                .with_context(|| format!("Failed to load comparison run: {}", path.display()))?;
            runs.push((path.display().to_string(), other.results));
        }

        println!("Run Comparison:");
        println!("{}", comparison_markdown(&engine.compare_runs(&runs)));
    }

    if let Some(ref path) = args.output {
        MetricsReport::new(source, summary).save(path)?;
        println!("Metrics saved to: {}", path.display());
    }

    Ok(())
}

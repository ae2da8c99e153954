// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Run-level summary tool
//!
//! Recomputes the aggregates the job service stores with a finished run:
//! per-trial confusion matrix, score histogram and iteration accuracy.

use anyhow::{Context, Result};
use clap::Parser;
use newscheck_eval::{BenchmarkRun, BenchmarkSummary, EvaluationMode, MetricsConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "newscheck-summarize")]
#[command(about = "Summarize a benchmark run the way the job service does")]
#[command(version)]
struct Args {
    /// Run payload (JSON); a synthetic run is used when absent
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Number of histogram bins over [0, 1]
    #[arg(short, long, default_value_t = 10)]
    bins: usize,

    /// Number of statements in the synthetic run
    #[arg(short, long, default_value_t = 200)]
    num_samples: usize,

    /// Trials per statement in the synthetic run
    #[arg(long, default_value_t = 3)]
    iterations: usize,

    /// Random seed for the synthetic run
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Write the run with its summary attached to this path
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

    let run = match args.input {
        Some(ref path) => BenchmarkRun::load(path)
            .with_context(|| format!("Failed to load run: {}", path.display()))?,
        None => {
            tracing::info!(
                "Loading synthetic run ({} statements, seed={})",
                args.num_samples,
                args.seed
            );
            BenchmarkRun::synthetic(
                args.num_samples,
                args.iterations,
                EvaluationMode::Score,
                args.seed,
            )
        }
    };

    let config = MetricsConfig {
        histogram_bins: args.bins,
        ..MetricsConfig::default()
    };
    let summary = BenchmarkSummary::from_results(&run.results, &config);

    println!("\n{}", summary.format());

    if let Some(ref path) = args.output {
        let run = run.with_summary(&summary);
        let json = serde_json::to_string_pretty(&run)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write run: {}", path.display()))?;
        println!("Run with summary saved to: {}", path.display());
    }

    Ok(())
}

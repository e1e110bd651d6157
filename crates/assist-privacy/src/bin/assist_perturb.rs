//! Assist Perturb CLI Tool
//!
//! Perturb a score vector before it is shared with other organizations.
//!
//! Usage:
//!   assist-perturb truncate <scores.json>
//!   assist-perturb dp <scores.json> [--alpha <a>]
//!   assist-perturb ip <scores.json> [--thresh <t>] [--no-audit]
//!   assist-perturb perturb <scores.json> (--mode <dp|ip> [--param <p>] | --config <file>)
//!   assist-perturb stats <scores.json> [--features <n>]
//!
//! Score documents are either `{"shape": [...], "data": [...]}` or a bare JSON
//! array. Use `-` to read from stdin.

use assist_privacy::{
    differential_privacy, interval_privacy, perturb, release_intervals, seeded_rng, truncate,
    Intervals, PrivacyConfig, RunningStats, Scores, DEFAULT_ALPHA, DEFAULT_THRESH,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "assist-perturb")]
#[command(version = "0.1.0")]
#[command(about = "Perturb score vectors with differential or interval privacy", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format: json or compact
    #[arg(short, long, default_value = "json")]
    format: String,

    /// Seed for a reproducible release (OS entropy if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Clip scores to their 2.5th/97.5th percentile range
    Truncate {
        /// Score document or '-' for stdin
        input: String,
    },

    /// Laplace mechanism
    Dp {
        /// Score document or '-' for stdin
        input: String,

        /// Privacy parameter (smaller is more private)
        #[arg(short, long, default_value_t = DEFAULT_ALPHA)]
        alpha: f64,
    },

    /// Interval privacy mechanism
    Ip {
        /// Score document or '-' for stdin
        input: String,

        /// Average interval width budget
        #[arg(short, long, default_value_t = DEFAULT_THRESH)]
        thresh: f64,

        /// Skip the quadratic leakage audit
        #[arg(long)]
        no_audit: bool,
    },

    /// Dispatch on a mode tag or a configuration file
    Perturb {
        /// Score document or '-' for stdin
        input: String,

        /// Mechanism: dp or ip
        #[arg(short, long, required_unless_present = "config")]
        mode: Option<String>,

        /// alpha for dp, thresh for ip
        #[arg(short, long, default_value_t = 1.0)]
        param: f64,

        /// JSON privacy configuration ({"mode": ..., "param": ..., "seed": ...})
        #[arg(short, long, conflicts_with = "mode")]
        config: Option<PathBuf>,
    },

    /// Per-feature running mean/std of a `[rows, features]` batch
    Stats {
        /// Score document or '-' for stdin
        input: String,

        /// Number of features per row
        #[arg(long, default_value = "1")]
        features: usize,
    },
}

#[derive(Serialize)]
struct TruncateOutput {
    truncated: Scores,
    lower: f64,
    upper: f64,
}

#[derive(Serialize)]
struct IpOutput {
    scores: Scores,
    intervals: Intervals,
    #[serde(skip_serializing_if = "Option::is_none")]
    leakage: Option<f64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let value = match cli.command {
        Commands::Truncate { input } => {
            let scores = read_scores(&input)?;
            let t = truncate(&scores)?;
            serde_json::to_value(TruncateOutput {
                truncated: t.scores,
                lower: t.bounds.lower,
                upper: t.bounds.upper,
            })?
        }
        Commands::Dp { input, alpha } => {
            let scores = read_scores(&input)?;
            let mut rng = seeded_rng(cli.seed);
            serde_json::to_value(differential_privacy(&scores, alpha, &mut rng)?)?
        }
        Commands::Ip { input, thresh, no_audit } => {
            let scores = read_scores(&input)?;
            let mut rng = seeded_rng(cli.seed);
            let output = if no_audit {
                let (scores, intervals) = release_intervals(&scores, thresh, &mut rng)?;
                IpOutput { scores, intervals, leakage: None }
            } else {
                let release = interval_privacy(&scores, thresh, &mut rng)?;
                info!(leakage = release.leakage, "IP privacy leakage");
                IpOutput {
                    scores: release.scores,
                    intervals: release.intervals,
                    leakage: Some(release.leakage),
                }
            };
            serde_json::to_value(output)?
        }
        Commands::Perturb { input, mode, param, config } => {
            let scores = read_scores(&input)?;
            let perturbed = match config {
                Some(path) => {
                    let config = PrivacyConfig::from_file(&path)?;
                    info!(mode = %config.mode, param = config.param, "loaded privacy config");
                    let mut rng = seeded_rng(cli.seed.or(config.seed));
                    config.apply(&scores, &mut rng)?
                }
                None => {
                    let mode = mode.ok_or("either --mode or --config is required")?;
                    let mut rng = seeded_rng(cli.seed);
                    perturb(&scores, &mode, param, &mut rng)?
                }
            };
            serde_json::to_value(perturbed)?
        }
        Commands::Stats { input, features } => {
            let scores = read_scores(&input)?;
            let scores = if scores.shape().len() == 1 && features > 1 {
                let rows = scores.len() / features;
                scores.reshape(vec![rows, features])?
            } else {
                scores
            };
            let mut stats = RunningStats::new(features);
            stats.update(&scores)?;
            serde_json::to_value(stats)?
        }
    };

    let output_str = match cli.format.as_str() {
        "compact" => serde_json::to_string(&value)?,
        _ => serde_json::to_string_pretty(&value)?,
    };

    if let Some(output_path) = cli.output {
        fs::write(&output_path, &output_str)?;
        eprintln!("Output written to: {}", output_path.display());
    } else {
        println!("{}", output_str);
    }

    Ok(())
}

fn read_scores(input: &str) -> Result<Scores, Box<dyn std::error::Error>> {
    let text = if input == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(input)?
    };
    Ok(Scores::from_json_str(&text)?)
}

//! Assist Privacy Experiments
//!
//! Measures what the perturbation mechanisms cost in utility and what they
//! still disclose, over synthetic score vectors.

mod demo;
mod sweeps;

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "assist-experiments")]
#[command(about = "Privacy/utility experiments for DP and IP score perturbation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base seed; trial `i` uses `seed + i`
    #[arg(long, default_value = "42", global = true)]
    seed: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Perturb standard-normal scores and a [10,3,4,4] tensor with both mechanisms
    Demo {
        /// Output directory
        #[arg(short, long, default_value = "./results")]
        output: PathBuf,
    },

    /// Laplace mechanism: noise and error across privacy parameters
    DpSweep {
        /// Alphas to test (comma-separated)
        #[arg(short, long, default_value = "0.1,0.5,1,2,5")]
        alphas: String,

        /// Scores per trial
        #[arg(short, long, default_value = "1000")]
        size: usize,

        /// Trials per alpha
        #[arg(short, long, default_value = "50")]
        trials: usize,

        /// Output directory
        #[arg(short, long, default_value = "./results")]
        output: PathBuf,
    },

    /// Interval privacy: leakage and interval width across thresholds
    IpSweep {
        /// Thresholds to test (comma-separated)
        #[arg(long, default_value = "0.25,0.5,1,2,4")]
        thresholds: String,

        /// Scores per trial
        #[arg(short, long, default_value = "500")]
        size: usize,

        /// Trials per threshold
        #[arg(short, long, default_value = "20")]
        trials: usize,

        /// Output directory
        #[arg(short, long, default_value = "./results")]
        output: PathBuf,
    },

    /// Run all experiments with default settings
    All {
        /// Output directory
        #[arg(short, long, default_value = "./results")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    println!("{}", "═".repeat(60).cyan());
    println!("{}", "  ASSIST PRIVACY EXPERIMENTS".cyan().bold());
    println!("{}", "  Differential vs Interval Privacy".cyan());
    println!("{}", "═".repeat(60).cyan());
    println!();

    match cli.command {
        Commands::Demo { output } => {
            demo::run_demo(cli.seed, output)?;
        }
        Commands::DpSweep { alphas, size, trials, output } => {
            let alphas = parse_list(&alphas)?;
            sweeps::run_dp_sweep(&alphas, size, trials, cli.seed, output)?;
        }
        Commands::IpSweep { thresholds, size, trials, output } => {
            let thresholds = parse_list(&thresholds)?;
            sweeps::run_ip_sweep(&thresholds, size, trials, cli.seed, output)?;
        }
        Commands::All { output } => {
            println!("{}", "Running all experiments...".yellow().bold());
            println!();

            demo::run_demo(cli.seed, output.clone())?;
            println!();
            sweeps::run_dp_sweep(&[0.1, 0.5, 1.0, 2.0, 5.0], 1000, 50, cli.seed, output.clone())?;
            println!();
            sweeps::run_ip_sweep(&[0.25, 0.5, 1.0, 2.0, 4.0], 500, 20, cli.seed, output.clone())?;
            println!();

            println!("{}", "═".repeat(60).green());
            println!("{}", "  ALL EXPERIMENTS COMPLETE".green().bold());
            println!("  Results written to {}", output.display());
            println!("{}", "═".repeat(60).green());
        }
    }

    Ok(())
}

fn parse_list(list: &str) -> Result<Vec<f64>, std::num::ParseFloatError> {
    list.split(',').map(|s| s.trim().parse::<f64>()).collect()
}

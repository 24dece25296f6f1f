//! nbttt - naive-Bayes tic-tac-toe move selection
//!
//! Subcommands:
//! - `fit`: estimate the posterior and report MAP, posterior mean and diagnostics
//! - `decide`: choose the move maximising the mover's posterior win probability
//! - `generate`: produce labelled training games by self-play

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "nbttt")]
#[command(version, about = "Bayesian naive-Bayes tic-tac-toe move selection", long_about = None)]
struct Cli {
    /// Debug-level logging (overridden by NBTTT_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit the posterior to training data
    Fit(naive_bayes_ttt::cli::commands::fit::FitArgs),

    /// Choose a move for a board position
    Decide(naive_bayes_ttt::cli::commands::decide::DecideArgs),

    /// Generate training games by self-play
    Generate(naive_bayes_ttt::cli::commands::generate::GenerateArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    naive_bayes_ttt::cli::init_tracing(cli.verbose);

    match cli.command {
        Commands::Fit(args) => naive_bayes_ttt::cli::commands::fit::execute(args),
        Commands::Decide(args) => naive_bayes_ttt::cli::commands::decide::execute(args),
        Commands::Generate(args) => naive_bayes_ttt::cli::commands::generate::execute(args),
    }
}

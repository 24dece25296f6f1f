//! Generate command - produce a self-play training set

use std::{fs::File, io::BufWriter, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rand::{SeedableRng, rngs::StdRng};
use tracing::info;

use crate::dataset::{GamePolicy, generate_games};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyArg {
    Random,
    Greedy,
}

impl From<PolicyArg> for GamePolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Random => GamePolicy::Random,
            PolicyArg::Greedy => GamePolicy::Greedy,
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Generate labelled training games by self-play")]
pub struct GenerateArgs {
    /// Number of games
    #[arg(long, short = 'g', default_value_t = 100)]
    pub games: usize,

    /// Move policy for both sides
    #[arg(long, value_enum, default_value_t = PolicyArg::Random)]
    pub policy: PolicyArg,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output JSON file (stdout when omitted)
    #[arg(long, short = 'O')]
    pub output: Option<PathBuf>,
}

pub fn execute(args: GenerateArgs) -> Result<()> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let dataset = generate_games(args.games, args.policy.into(), &mut rng);
    info!(games = dataset.len(), policy = ?args.policy, "generated training games");

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            dataset.to_json_writer(BufWriter::new(file))?;
            eprintln!("Wrote {} games to {}", dataset.len(), path.display());
        }
        None => {
            dataset.to_json_writer(std::io::stdout().lock())?;
            println!();
        }
    }
    Ok(())
}

//! Decide command - choose a move for a board position

use anyhow::Result;
use clap::Parser;

use crate::{
    cli::{
        commands::fit_posterior,
        config::{InferenceArgs, SourceArg},
        output::{print_kv, print_section, print_subsection},
    },
    decision::decide,
    tictactoe::{Board, Player, Winner},
};

#[derive(Parser, Debug)]
#[command(about = "Choose the move with the highest posterior probability of winning")]
pub struct DecideArgs {
    /// Board as nine cells, row-major, e.g. "OO.OXXOX." ('.' for empty)
    #[arg(long, short = 'b')]
    pub board: String,

    /// Player to move (`x` or `o`)
    #[arg(long, short = 'p')]
    pub player: String,

    /// Parameter estimate used for scoring
    #[arg(long, value_enum, default_value_t = SourceArg::Mean)]
    pub source: SourceArg,

    /// Print the decision as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub inference: InferenceArgs,
}

pub fn execute(args: DecideArgs) -> Result<()> {
    let board = Board::from_string(&args.board)?;
    let player = Player::parse(&args.player)?;
    if board.empty_positions().is_empty() {
        return Err(crate::Error::NoLegalMove.into());
    }

    let posterior = fit_posterior(&args.inference)?;
    let decision = decide(&posterior, &board, player, args.source.into())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&decision)?);
        return Ok(());
    }

    print_section("Move decision");
    println!("{board}");
    print_kv("Player", &player.to_string());
    print_kv("Estimate", &format!("{:?}", decision.source));
    print_kv("Chosen position", &decision.position.to_string());

    print_subsection("Scores");
    println!(
        "  {:>8} {:>12} {:>12} {:>12} {:>10}",
        "position", "P(W=X)", "P(W=O)", "P(W=N)", "score"
    );
    for score in &decision.scores {
        println!(
            "  {:>8} {:>12.6} {:>12.6} {:>12.6} {:>10.6}",
            score.position,
            score.winner_probability(Winner::X),
            score.winner_probability(Winner::O),
            score.winner_probability(Winner::Neither),
            score.score
        );
    }
    Ok(())
}

//! Bayesian naive-Bayes move selection for tic-tac-toe
//!
//! This crate provides:
//! - A generative model `W ~ Cat(theta)`, `t_i | W ~ Cat(beta_W)` with
//!   symmetric Dirichlet priors, declared through an explicit [`ModelBuilder`]
//! - MAP estimation (Nelder-Mead on the simplex) and Hamiltonian Monte Carlo
//!   in additive log-ratio coordinates, cross-checked against the exact
//!   conjugate posterior
//! - Move scoring: the legal move maximising the mover's posterior win
//!   probability, under the MAP point, the posterior mean or the predictive
//! - Self-play data generation and CSV/SVG export of sampler traces

pub mod cli;
pub mod config;
pub mod dataset;
pub mod decision;
pub mod dirichlet;
pub mod error;
pub mod estimator;
pub mod export;
pub mod inference;
pub mod model;
pub mod params;
pub mod ports;
pub mod tictactoe;
pub mod types;

pub use config::InferenceConfig;
pub use dataset::{Dataset, Game, GamePolicy, RawGame, generate_games};
pub use decision::{EstimateSource, MoveDecision, MoveScore, best_move, decide, score_moves};
pub use dirichlet::Dirichlet;
pub use error::{Error, Result};
pub use estimator::{MapReport, Posterior, PosteriorEstimator};
pub use model::{ConjugatePosterior, Model, ModelBuilder, VariableKey};
pub use params::SimplexParams;
pub use tictactoe::{Board, Player, Token, Winner};
pub use types::{BOARD_SIZE, CATEGORIES, Position};

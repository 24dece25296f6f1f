//! Shared arguments for commands that run inference

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use crate::{config::InferenceConfig, dataset::Dataset, decision::EstimateSource};

/// Options common to `fit` and `decide`
#[derive(Args, Debug, Clone)]
pub struct InferenceArgs {
    /// Training data: JSON array of {"winner", "t1".."t9"} records.
    /// Defaults to the two built-in reference games.
    #[arg(long, short = 'd')]
    pub data: Option<PathBuf>,

    /// JSON file with inference settings; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Total sampler iterations, burn-in included
    #[arg(long)]
    pub samples: Option<usize>,

    /// Leading iterations to discard
    #[arg(long)]
    pub burn_in: Option<usize>,

    /// Symmetric Dirichlet prior concentration
    #[arg(long)]
    pub concentration: Option<f64>,

    /// Leapfrog steps per HMC proposal
    #[arg(long)]
    pub leapfrog_steps: Option<usize>,

    /// Hide the sampling progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl InferenceArgs {
    /// Load the config file (if any) and apply flag overrides.
    pub fn resolve_config(&self) -> Result<InferenceConfig> {
        let mut config = match &self.config {
            Some(path) => InferenceConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => InferenceConfig::default(),
        };
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(samples) = self.samples {
            config = config.with_samples(samples);
        }
        if let Some(burn_in) = self.burn_in {
            config = config.with_burn_in(burn_in);
        }
        if let Some(concentration) = self.concentration {
            config = config.with_prior_concentration(concentration);
        }
        if let Some(steps) = self.leapfrog_steps {
            config = config.with_leapfrog_steps(steps);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn load_dataset(&self) -> Result<Dataset> {
        match &self.data {
            Some(path) => Dataset::from_json_file(path)
                .with_context(|| format!("Failed to load training data {}", path.display())),
            None => Ok(Dataset::reference()),
        }
    }
}

/// Parameter estimate used to score moves
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceArg {
    /// MAP point (deterministic)
    Map,
    /// Mean of the retained draws
    #[default]
    Mean,
    /// Average over the retained draws
    Predictive,
}

impl From<SourceArg> for EstimateSource {
    fn from(value: SourceArg) -> Self {
        match value {
            SourceArg::Map => EstimateSource::Map,
            SourceArg::Mean => EstimateSource::PosteriorMean,
            SourceArg::Predictive => EstimateSource::Predictive,
        }
    }
}

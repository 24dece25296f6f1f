//! Subcommand implementations

pub mod decide;
pub mod fit;
pub mod generate;

use anyhow::Result;

use crate::{
    cli::{config::InferenceArgs, output::ProgressObserver},
    estimator::{Posterior, PosteriorEstimator},
    ports::NullObserver,
};

/// Load data, resolve configuration and fit the posterior.
pub(crate) fn fit_posterior(args: &InferenceArgs) -> Result<Posterior> {
    let dataset = args.load_dataset()?;
    let config = args.resolve_config()?;
    let estimator = PosteriorEstimator::new(config)?;
    let posterior = if args.no_progress {
        estimator.fit_with_observer(&dataset, &mut NullObserver)?
    } else {
        estimator.fit_with_observer(&dataset, &mut ProgressObserver::new())?
    };
    Ok(posterior)
}

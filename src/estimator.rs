//! Posterior estimation pipeline: build the model, find the MAP point, then
//! sample the posterior with HMC starting from it.

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    config::InferenceConfig,
    dataset::Dataset,
    inference::{
        HmcSampler, HmcSettings, NelderMead, ParameterSummary, SamplerDiagnostics,
        UnconstrainedPosterior,
    },
    model::{ConjugatePosterior, Model, ModelBuilder},
    params::{SimplexParams, VECTORS, component_names},
    ports::{NullObserver, SamplingObserver},
    types::CATEGORIES,
};

/// Outcome of the MAP search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapReport {
    pub params: SimplexParams,
    pub log_posterior: f64,
    pub iterations: usize,
    pub converged: bool,
    /// True when the optimizer produced no finite point and the prior mean was used
    pub fell_back_to_prior: bool,
}

/// Estimated posterior: the MAP point, retained draws, and diagnostics.
#[derive(Debug, Clone)]
pub struct Posterior {
    map: MapReport,
    samples: Vec<SimplexParams>,
    diagnostics: SamplerDiagnostics,
    exact: ConjugatePosterior,
    games: usize,
}

impl Posterior {
    pub fn map(&self) -> &MapReport {
        &self.map
    }

    /// Draws kept after burn-in, in chain order.
    pub fn samples(&self) -> &[SimplexParams] {
        &self.samples
    }

    pub fn diagnostics(&self) -> &SamplerDiagnostics {
        &self.diagnostics
    }

    /// Closed-form conjugate posterior of the same model.
    pub fn exact(&self) -> &ConjugatePosterior {
        &self.exact
    }

    /// Number of training games the posterior was fitted to.
    pub fn games(&self) -> usize {
        self.games
    }

    /// Mean of the retained draws, or the MAP point if none were kept.
    pub fn mean(&self) -> SimplexParams {
        if self.samples.is_empty() {
            return self.map.params;
        }
        let n = self.samples.len() as f64;
        let mut vectors = [[0.0; CATEGORIES]; VECTORS];
        for sample in &self.samples {
            for (acc, vector) in vectors.iter_mut().zip(sample.vectors()) {
                for (a, v) in acc.iter_mut().zip(vector) {
                    *a += v / n;
                }
            }
        }
        SimplexParams::from_vectors(vectors)
    }

    /// One trace per component, in [`component_names`] order.
    pub fn traces(&self) -> Vec<Vec<f64>> {
        let mut traces = vec![Vec::with_capacity(self.samples.len()); component_names().len()];
        for sample in &self.samples {
            for (trace, value) in traces.iter_mut().zip(sample.components()) {
                trace.push(value);
            }
        }
        traces
    }

    pub fn summaries(&self) -> Vec<ParameterSummary> {
        let exact_means = self.exact.mean().components();
        let exact_sds = self.exact.std_devs();
        component_names()
            .iter()
            .zip(self.traces())
            .zip(exact_means.into_iter().zip(exact_sds))
            .map(|((name, trace), (mean, sd))| ParameterSummary::from_trace(name, &trace, mean, sd))
            .collect()
    }
}

/// Runs MAP and MCMC for a training set.
#[derive(Debug, Clone)]
pub struct PosteriorEstimator {
    config: InferenceConfig,
}

impl PosteriorEstimator {
    /// # Errors
    ///
    /// Returns error if the configuration is invalid.
    pub fn new(config: InferenceConfig) -> Result<Self, crate::Error> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Declare the model for `dataset` with the configured prior.
    ///
    /// # Errors
    ///
    /// Returns error if the prior concentration is invalid.
    pub fn build_model(&self, dataset: &Dataset) -> Result<Model, crate::Error> {
        let model = ModelBuilder::naive_bayes(dataset, self.config.prior_concentration)?;
        info!(
            games = dataset.len(),
            observations = model.observation_count(),
            "model built"
        );
        Ok(model)
    }

    /// MAP estimate by Nelder-Mead over the free simplex coordinates.
    ///
    /// Never fails: non-convergence is logged and the best iterate returned;
    /// if no finite point was found the prior mean is used instead.
    pub fn map_estimate(&self, model: &Model) -> MapReport {
        let prior_mean = SimplexParams::uniform();
        let solver = NelderMead::new(self.config.map_max_iterations, self.config.map_tolerance);
        let objective = |free: &[f64]| match SimplexParams::from_free(free) {
            Some(params) => -model.log_posterior(&params),
            None => f64::INFINITY,
        };
        let outcome = solver.minimize(objective, &prior_mean.to_free());

        let point = SimplexParams::from_free(&outcome.point).filter(|_| outcome.value.is_finite());
        let report = match point {
            Some(params) => MapReport {
                params,
                log_posterior: -outcome.value,
                iterations: outcome.iterations,
                converged: outcome.converged,
                fell_back_to_prior: false,
            },
            None => {
                warn!(
                    iterations = outcome.iterations,
                    "MAP search found no finite point, falling back to the prior mean"
                );
                MapReport {
                    params: prior_mean,
                    log_posterior: model.log_posterior(&prior_mean),
                    iterations: outcome.iterations,
                    converged: false,
                    fell_back_to_prior: true,
                }
            }
        };

        if report.fell_back_to_prior {
            return report;
        }
        if !report.converged {
            warn!(
                iterations = report.iterations,
                log_posterior = report.log_posterior,
                last_iterate = ?report.params,
                "MAP search did not converge, continuing from best iterate"
            );
        } else {
            info!(
                iterations = report.iterations,
                log_posterior = report.log_posterior,
                "MAP estimate found"
            );
        }
        report
    }

    /// Fit the posterior to `dataset`.
    ///
    /// # Errors
    ///
    /// Returns error if the model cannot be declared.
    pub fn fit(&self, dataset: &Dataset) -> Result<Posterior, crate::Error> {
        self.fit_with_observer(dataset, &mut NullObserver)
    }

    /// Fit the posterior, reporting each sampler iteration to `observer`.
    ///
    /// # Errors
    ///
    /// Returns error if the model cannot be declared.
    pub fn fit_with_observer(
        &self,
        dataset: &Dataset,
        observer: &mut dyn SamplingObserver,
    ) -> Result<Posterior, crate::Error> {
        let model = self.build_model(dataset)?;
        let map = self.map_estimate(&model);

        let target = UnconstrainedPosterior::new(&model);
        let settings = HmcSettings::from(&self.config);
        let mut rng = self.config.build_rng();
        let run = HmcSampler::new(settings).sample(
            &target,
            &map.params.to_unconstrained(),
            &mut rng,
            observer,
        );

        let diagnostics = SamplerDiagnostics::from_run(&run, self.config.burn_in);
        if diagnostics.divergences > 0 {
            warn!(
                divergences = diagnostics.divergences,
                retained = diagnostics.retained_divergences,
                "sampler reported divergent trajectories"
            );
        }
        info!(
            retained = diagnostics.retained,
            acceptance = diagnostics.acceptance_rate,
            step_size = diagnostics.step_size,
            "sampling finished"
        );

        let samples = run
            .draws
            .iter()
            .skip(self.config.burn_in)
            .map(|z| SimplexParams::from_unconstrained(z))
            .collect();

        Ok(Posterior {
            map,
            samples,
            diagnostics,
            exact: model.exact_posterior(),
            games: dataset.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator() -> PosteriorEstimator {
        PosteriorEstimator::new(InferenceConfig::default().with_seed(42)).unwrap()
    }

    #[test]
    fn map_on_reference_data_matches_empirical_frequencies() {
        let estimator = estimator();
        let model = estimator.build_model(&Dataset::reference()).unwrap();
        let map = estimator.map_estimate(&model);
        assert!(map.params.is_valid());
        // With a flat prior the MAP point is the empirical frequency.
        assert!(map.params.theta[0] < 1e-3);
        assert!((map.params.theta[1] - 0.5).abs() < 1e-3);
        assert!((map.params.beta[1][1] - 4.0 / 9.0).abs() < 1e-3);
    }

    #[test]
    fn map_on_empty_data_is_prior_mean() {
        let estimator = estimator();
        let model = estimator.build_model(&Dataset::empty()).unwrap();
        let map = estimator.map_estimate(&model);
        assert!(map.converged);
        for p in map.params.components() {
            assert!((p - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn retained_draw_count_excludes_burn_in() {
        let config = InferenceConfig::default()
            .with_seed(3)
            .with_samples(400)
            .with_burn_in(100);
        let posterior = PosteriorEstimator::new(config)
            .unwrap()
            .fit(&Dataset::reference())
            .unwrap();
        assert_eq!(posterior.samples().len(), 300);
        assert_eq!(posterior.diagnostics().retained, 300);
        assert_eq!(posterior.traces()[0].len(), 300);
        assert_eq!(posterior.summaries().len(), 12);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = InferenceConfig::default().with_prior_concentration(-1.0);
        assert!(PosteriorEstimator::new(config).is_err());
    }
}

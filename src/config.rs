//! Configuration for a posterior-estimation run.

use std::{fs::File, io::BufReader, path::Path};

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

/// Settings for the prior, the MAP optimizer and the sampler.
///
/// Builder-style setters override the defaults; [`InferenceConfig::validate`]
/// is called by the estimator before any work is done.
///
/// # Examples
///
/// ```
/// use naive_bayes_ttt::InferenceConfig;
///
/// let config = InferenceConfig::default()
///     .with_seed(42)
///     .with_samples(1_000)
///     .with_burn_in(200);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Symmetric Dirichlet concentration for every prior
    pub prior_concentration: f64,
    /// Nelder-Mead iteration limit
    pub map_max_iterations: usize,
    /// Spread of objective values across the optimizer simplex at convergence
    pub map_tolerance: f64,
    /// Total sampler iterations, burn-in included
    pub samples: usize,
    /// Leading iterations discarded and used for step-size adaptation
    pub burn_in: usize,
    /// Leapfrog steps per HMC proposal
    pub leapfrog_steps: usize,
    /// Step size at the start of adaptation
    pub initial_step_size: f64,
    /// Mean acceptance probability targeted during burn-in
    pub target_acceptance: f64,
    /// Energy error above which a trajectory is counted as divergent
    pub max_energy_error: f64,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            prior_concentration: 1.0,
            map_max_iterations: 20_000,
            map_tolerance: 1e-10,
            samples: 2_000,
            burn_in: 500,
            leapfrog_steps: 10,
            initial_step_size: 0.1,
            target_acceptance: 0.8,
            max_energy_error: 1_000.0,
            seed: None,
        }
    }
}

impl InferenceConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_burn_in(mut self, burn_in: usize) -> Self {
        self.burn_in = burn_in;
        self
    }

    pub fn with_prior_concentration(mut self, concentration: f64) -> Self {
        self.prior_concentration = concentration;
        self
    }

    pub fn with_leapfrog_steps(mut self, steps: usize) -> Self {
        self.leapfrog_steps = steps;
        self
    }

    pub fn with_map_max_iterations(mut self, iterations: usize) -> Self {
        self.map_max_iterations = iterations;
        self
    }

    /// Number of draws kept after burn-in.
    pub fn retained(&self) -> usize {
        self.samples.saturating_sub(self.burn_in)
    }

    /// Check every setting.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfiguration`] describing the first
    /// invalid setting.
    pub fn validate(&self) -> Result<(), crate::Error> {
        let fail = |message: String| Err(crate::Error::InvalidConfiguration { message });
        if !self.prior_concentration.is_finite() || self.prior_concentration <= 0.0 {
            return fail(format!(
                "prior concentration {} must be positive",
                self.prior_concentration
            ));
        }
        if self.map_max_iterations == 0 {
            return fail("map_max_iterations must be at least 1".to_string());
        }
        if !self.map_tolerance.is_finite() || self.map_tolerance <= 0.0 {
            return fail(format!("map tolerance {} must be positive", self.map_tolerance));
        }
        if self.burn_in >= self.samples {
            return fail(format!(
                "burn-in ({}) must be smaller than the number of samples ({})",
                self.burn_in, self.samples
            ));
        }
        if self.leapfrog_steps == 0 {
            return fail("leapfrog_steps must be at least 1".to_string());
        }
        if !self.initial_step_size.is_finite() || self.initial_step_size <= 0.0 {
            return fail(format!(
                "initial step size {} must be positive",
                self.initial_step_size
            ));
        }
        if !(self.target_acceptance > 0.0 && self.target_acceptance < 1.0) {
            return fail(format!(
                "target acceptance {} must lie in (0, 1)",
                self.target_acceptance
            ));
        }
        if self.max_energy_error.is_nan() || self.max_energy_error <= 0.0 {
            return fail(format!(
                "max energy error {} must be positive",
                self.max_energy_error
            ));
        }
        Ok(())
    }

    /// Load a JSON configuration; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed, or fails validation.
    pub fn from_json_file(path: &Path) -> Result<Self, crate::Error> {
        let file = File::open(path).map_err(|source| crate::Error::Io {
            operation: format!("open config {}", path.display()),
            source,
        })?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn build_rng(&self) -> StdRng {
        if let Some(seed) = self.seed {
            StdRng::seed_from_u64(seed)
        } else {
            StdRng::from_rng(&mut rand::rng())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = InferenceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retained(), 1_500);
    }

    #[test]
    fn burn_in_must_leave_samples() {
        let config = InferenceConfig::default().with_samples(100).with_burn_in(100);
        assert!(matches!(
            config.validate(),
            Err(crate::Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: InferenceConfig = serde_json::from_str(r#"{"samples": 300, "seed": 9}"#).unwrap();
        assert_eq!(config.samples, 300);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.burn_in, 500);
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"prior_concentration": 2.0}"#).unwrap();
        let config = InferenceConfig::from_json_file(&path).unwrap();
        assert_eq!(config.prior_concentration, 2.0);
    }
}

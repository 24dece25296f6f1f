//! Explicit model builder for the plate-structured naive-Bayes model.
//!
//! Every random variable is registered under a structured [`VariableKey`]
//! in a builder that is passed to each declaration. The generative model is:
//!
//! ```text
//! Theta      ~ Dirichlet(alpha)
//! Beta[w]    ~ Dirichlet(alpha)                    for w in {X, O, Neither}
//! W_g        ~ Categorical(Theta)                  for each game g
//! T_{g,p}    ~ Categorical(Beta[W_g])              for each position p in 1..=9
//! ```
//!
//! Building the model reduces the observations to category counts, which is
//! all the likelihood depends on.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    dataset::Dataset,
    dirichlet::Dirichlet,
    params::{SimplexParams, VECTORS},
    tictactoe::{Category, Winner},
    types::{CATEGORIES, Position},
};

/// Structured name of a model variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum VariableKey {
    Theta,
    Beta(Winner),
    WinnerObs { game: usize },
    TokenObs { game: usize, position: Position },
}

/// What a variable is: a latent vector with a Dirichlet prior, or a one-trial
/// categorical observation of one of those vectors.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Prior(Dirichlet),
    Observed {
        parameter: VariableKey,
        category: usize,
    },
}

/// Collects declarations before the model is fixed.
#[derive(Debug, Clone, Default)]
pub struct ModelBuilder {
    variables: BTreeMap<VariableKey, Declaration>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, key: VariableKey, declaration: Declaration) -> Result<(), crate::Error> {
        if self.variables.contains_key(&key) {
            return Err(crate::Error::InvalidConfiguration {
                message: format!("variable {key:?} declared twice"),
            });
        }
        self.variables.insert(key, declaration);
        Ok(())
    }

    /// Declare a latent probability vector.
    ///
    /// # Errors
    ///
    /// Returns error if `key` is already declared or names an observation.
    pub fn prior(&mut self, key: VariableKey, prior: Dirichlet) -> Result<&mut Self, crate::Error> {
        if !matches!(key, VariableKey::Theta | VariableKey::Beta(_)) {
            return Err(crate::Error::InvalidConfiguration {
                message: format!("{key:?} cannot carry a prior"),
            });
        }
        self.insert(key, Declaration::Prior(prior))?;
        Ok(self)
    }

    /// Declare a one-hot observation of `parameter` at `category`.
    ///
    /// # Errors
    ///
    /// Returns error if `parameter` has no prior, `category` is out of range,
    /// or `key` is already declared.
    pub fn observe(
        &mut self,
        key: VariableKey,
        parameter: VariableKey,
        category: usize,
    ) -> Result<&mut Self, crate::Error> {
        match self.variables.get(&parameter) {
            Some(Declaration::Prior(prior)) if category < prior.k() => {}
            Some(Declaration::Prior(prior)) => {
                return Err(crate::Error::InvalidConfiguration {
                    message: format!(
                        "category {category} out of range for {parameter:?} with {} categories",
                        prior.k()
                    ),
                });
            }
            _ => {
                return Err(crate::Error::InvalidConfiguration {
                    message: format!("{key:?} observes undeclared parameter {parameter:?}"),
                });
            }
        }
        self.insert(
            key,
            Declaration::Observed {
                parameter,
                category,
            },
        )?;
        Ok(self)
    }

    /// Declare the naive-Bayes model for a training set with a symmetric prior.
    ///
    /// # Errors
    ///
    /// Returns error if `concentration` is not a valid Dirichlet concentration.
    pub fn naive_bayes(dataset: &Dataset, concentration: f64) -> Result<Model, crate::Error> {
        let prior = Dirichlet::symmetric(CATEGORIES, concentration)?;
        let mut builder = Self::new();
        builder.prior(VariableKey::Theta, prior.clone())?;
        for winner in Winner::ALL {
            builder.prior(VariableKey::Beta(winner), prior.clone())?;
        }

        for (game_idx, game) in dataset.iter().enumerate() {
            builder.observe(
                VariableKey::WinnerObs { game: game_idx },
                VariableKey::Theta,
                game.winner().index(),
            )?;
            for position in Position::all() {
                builder.observe(
                    VariableKey::TokenObs {
                        game: game_idx,
                        position,
                    },
                    VariableKey::Beta(game.winner()),
                    game.token(position).index(),
                )?;
            }
        }

        builder.build()
    }

    /// Fix the model and reduce observations to counts.
    ///
    /// # Errors
    ///
    /// Returns error unless Theta and all three Beta vectors have
    /// three-category priors.
    pub fn build(self) -> Result<Model, crate::Error> {
        let prior_for = |key: VariableKey| match self.variables.get(&key) {
            Some(Declaration::Prior(prior)) if prior.k() == CATEGORIES => Ok(prior.clone()),
            _ => Err(crate::Error::InvalidConfiguration {
                message: format!("{key:?} needs a {CATEGORIES}-category Dirichlet prior"),
            }),
        };
        let theta_prior = prior_for(VariableKey::Theta)?;
        let beta_priors = [
            prior_for(VariableKey::Beta(Winner::X))?,
            prior_for(VariableKey::Beta(Winner::O))?,
            prior_for(VariableKey::Beta(Winner::Neither))?,
        ];

        let mut counts = [[0.0; CATEGORIES]; VECTORS];
        let mut observations = 0;
        for declaration in self.variables.values() {
            if let Declaration::Observed {
                parameter,
                category,
            } = declaration
            {
                let slot = match parameter {
                    VariableKey::Theta => 0,
                    VariableKey::Beta(w) => 1 + w.index(),
                    _ => continue,
                };
                counts[slot][*category] += 1.0;
                observations += 1;
            }
        }

        Ok(Model {
            variables: self.variables,
            priors: [
                theta_prior,
                beta_priors[0].clone(),
                beta_priors[1].clone(),
                beta_priors[2].clone(),
            ],
            counts,
            observations,
        })
    }
}

/// A fixed model: priors plus the category counts of every observation.
#[derive(Debug, Clone)]
pub struct Model {
    variables: BTreeMap<VariableKey, Declaration>,
    priors: [Dirichlet; VECTORS],
    counts: [[f64; CATEGORIES]; VECTORS],
    observations: usize,
}

/// Exact posterior of every vector; the model is conjugate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConjugatePosterior {
    pub theta: Dirichlet,
    pub beta: [Dirichlet; CATEGORIES],
}

impl ConjugatePosterior {
    fn vectors(&self) -> [&Dirichlet; VECTORS] {
        [&self.theta, &self.beta[0], &self.beta[1], &self.beta[2]]
    }

    fn collect(&self, per_vector: impl Fn(&Dirichlet) -> Vec<f64>) -> [[f64; CATEGORIES]; VECTORS] {
        let mut out = [[0.0; CATEGORIES]; VECTORS];
        for (slot, dist) in out.iter_mut().zip(self.vectors()) {
            for (o, v) in slot.iter_mut().zip(per_vector(dist)) {
                *o = v;
            }
        }
        out
    }

    pub fn mean(&self) -> SimplexParams {
        SimplexParams::from_vectors(self.collect(Dirichlet::mean))
    }

    /// Closed-form MAP point, defined when every posterior concentration
    /// exceeds one.
    pub fn mode(&self) -> Option<SimplexParams> {
        let mut out = [[0.0; CATEGORIES]; VECTORS];
        for (slot, dist) in out.iter_mut().zip(self.vectors()) {
            for (o, v) in slot.iter_mut().zip(dist.mode()?) {
                *o = v;
            }
        }
        Some(SimplexParams::from_vectors(out))
    }

    /// Marginal standard deviation of every component, in
    /// [`crate::params::component_names`] order.
    pub fn std_devs(&self) -> Vec<f64> {
        self.collect(Dirichlet::variance)
            .iter()
            .flatten()
            .map(|v| v.sqrt())
            .collect()
    }
}

impl Model {
    pub fn declaration(&self, key: &VariableKey) -> Option<&Declaration> {
        self.variables.get(key)
    }

    /// Number of declared variables, latent and observed.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Number of one-hot observations.
    pub fn observation_count(&self) -> usize {
        self.observations
    }

    /// Observed winner counts indexed by [`Winner::index`].
    pub fn winner_counts(&self) -> [f64; CATEGORIES] {
        self.counts[0]
    }

    /// Observed token counts for games won by `winner`.
    pub fn token_counts(&self, winner: Winner) -> [f64; CATEGORIES] {
        self.counts[1 + winner.index()]
    }

    /// Posterior Dirichlet concentrations per vector (prior plus counts),
    /// in the order Theta, Beta[X], Beta[O], Beta[Neither].
    pub fn posterior_concentrations(&self) -> [[f64; CATEGORIES]; VECTORS] {
        let mut out = [[0.0; CATEGORIES]; VECTORS];
        for ((o, prior), counts) in out.iter_mut().zip(&self.priors).zip(&self.counts) {
            for ((slot, a), c) in o.iter_mut().zip(prior.alpha()).zip(counts) {
                *slot = a + c;
            }
        }
        out
    }

    pub fn log_prior(&self, params: &SimplexParams) -> f64 {
        self.priors
            .iter()
            .zip(params.vectors())
            .map(|(prior, vector)| prior.ln_pdf(&vector))
            .sum()
    }

    /// Sum over observations of ln p(category); zero counts contribute nothing
    /// even where the probability is zero.
    pub fn log_likelihood(&self, params: &SimplexParams) -> f64 {
        self.counts
            .iter()
            .zip(params.vectors())
            .flat_map(|(counts, vector)| counts.iter().copied().zip(vector))
            .filter(|&(count, _)| count > 0.0)
            .map(|(count, p)| if p > 0.0 { count * p.ln() } else { f64::NEG_INFINITY })
            .sum()
    }

    /// Joint log density of parameters and data, up to the evidence.
    pub fn log_posterior(&self, params: &SimplexParams) -> f64 {
        let prior = self.log_prior(params);
        if !prior.is_finite() {
            return prior;
        }
        prior + self.log_likelihood(params)
    }

    /// Closed-form posterior, used to check sampler output.
    pub fn exact_posterior(&self) -> ConjugatePosterior {
        let update = |slot: usize| self.priors[slot].posterior(&self.counts[slot]);
        ConjugatePosterior {
            theta: update(0),
            beta: [update(1), update(2), update(3)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dataset::Game, tictactoe::Token};

    #[test]
    fn reference_data_counts() {
        let model = ModelBuilder::naive_bayes(&Dataset::reference(), 1.0).unwrap();
        assert_eq!(model.observation_count(), 20);
        assert_eq!(model.variable_count(), 4 + 20);
        assert_eq!(model.winner_counts(), [0.0, 1.0, 1.0]);
        // Draw board: X O X X O O O X X
        assert_eq!(model.token_counts(Winner::Neither), [5.0, 4.0, 0.0]);
        // O win board: O O . O X X O X .
        assert_eq!(model.token_counts(Winner::O), [3.0, 4.0, 2.0]);
        assert_eq!(model.token_counts(Winner::X), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn structured_keys_identify_each_observation() {
        let model = ModelBuilder::naive_bayes(&Dataset::reference(), 1.0).unwrap();
        let key = VariableKey::TokenObs {
            game: 1,
            position: Position::new(3).unwrap(),
        };
        assert_eq!(
            model.declaration(&key),
            Some(&Declaration::Observed {
                parameter: VariableKey::Beta(Winner::O),
                category: Token::Neither.index(),
            })
        );
    }

    #[test]
    fn empty_dataset_posterior_is_prior() {
        let model = ModelBuilder::naive_bayes(&Dataset::empty(), 1.0).unwrap();
        let mean = model.exact_posterior().mean();
        for p in mean.components() {
            assert!((p - 1.0 / 3.0).abs() < 1e-12);
        }
        assert_eq!(model.log_likelihood(&SimplexParams::uniform()), 0.0);
    }

    #[test]
    fn log_posterior_is_highest_at_empirical_frequencies() {
        let dataset = Dataset::new(vec![
            Game::new(Winner::X, [Token::X; 9]),
            Game::new(Winner::X, [Token::X; 9]),
            Game::new(Winner::O, [Token::O; 9]),
        ]);
        let model = ModelBuilder::naive_bayes(&dataset, 1.0).unwrap();
        let mut best = SimplexParams::uniform();
        best.theta = [2.0 / 3.0, 1.0 / 3.0, 0.0];
        best.beta[0] = [1.0, 0.0, 0.0];
        best.beta[1] = [0.0, 1.0, 0.0];
        assert!(model.log_posterior(&best) > model.log_posterior(&SimplexParams::uniform()));

        let mut impossible = best;
        impossible.theta = [0.0, 0.5, 0.5];
        assert_eq!(model.log_posterior(&impossible), f64::NEG_INFINITY);
    }

    #[test]
    fn builder_rejects_duplicates_and_dangling_observations() {
        let mut builder = ModelBuilder::new();
        let prior = Dirichlet::symmetric(3, 1.0).unwrap();
        builder.prior(VariableKey::Theta, prior.clone()).unwrap();
        assert!(builder.prior(VariableKey::Theta, prior.clone()).is_err());
        assert!(
            builder
                .observe(
                    VariableKey::WinnerObs { game: 0 },
                    VariableKey::Beta(Winner::X),
                    0
                )
                .is_err()
        );
        assert!(
            builder
                .observe(VariableKey::WinnerObs { game: 0 }, VariableKey::Theta, 3)
                .is_err()
        );
        assert!(builder.build().is_err());
    }

    #[test]
    fn conjugate_mode_needs_every_concentration_above_one() {
        let flat = ModelBuilder::naive_bayes(&Dataset::reference(), 1.0).unwrap();
        assert!(flat.exact_posterior().mode().is_none());

        let model = ModelBuilder::naive_bayes(&Dataset::reference(), 2.0).unwrap();
        let exact = model.exact_posterior();
        let mode = exact.mode().unwrap();
        assert!(mode.is_interior());
        // Theta posterior is Dir(2, 3, 3): mode (1, 2, 2) / 5.
        assert!((mode.theta[0] - 0.2).abs() < 1e-12);
        assert!(model.log_posterior(&mode) >= model.log_posterior(&exact.mean()));
        assert_eq!(exact.std_devs().len(), 12);
        assert!(exact.std_devs().iter().all(|&sd| sd > 0.0 && sd < 0.5));
    }
}

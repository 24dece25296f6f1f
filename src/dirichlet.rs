//! Dirichlet distribution over categorical parameter vectors.
//!
//! Used as the prior for the winner distribution and for each per-winner
//! token distribution, and as the exact conjugate posterior that the sampler
//! is checked against.

use serde::{Deserialize, Serialize};
use statrs::function::gamma::ln_gamma;

/// Dirichlet over probability vectors of length `k`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dirichlet {
    alpha: Vec<f64>,
}

impl Dirichlet {
    /// Build from per-category concentrations.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfiguration`] if `alpha` is empty or
    /// any entry is not strictly positive and finite.
    pub fn new(alpha: Vec<f64>) -> Result<Self, crate::Error> {
        if alpha.is_empty() {
            return Err(crate::Error::InvalidConfiguration {
                message: "Dirichlet requires at least one category".to_string(),
            });
        }
        if let Some(bad) = alpha.iter().find(|a| !a.is_finite() || **a <= 0.0) {
            return Err(crate::Error::InvalidConfiguration {
                message: format!("Dirichlet concentration {bad} must be positive and finite"),
            });
        }
        Ok(Self { alpha })
    }

    /// Every category gets `concentration`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Dirichlet::new`].
    pub fn symmetric(k: usize, concentration: f64) -> Result<Self, crate::Error> {
        Self::new(vec![concentration; k])
    }

    pub fn alpha(&self) -> &[f64] {
        &self.alpha
    }

    pub fn k(&self) -> usize {
        self.alpha.len()
    }

    /// Total concentration.
    pub fn alpha0(&self) -> f64 {
        self.alpha.iter().sum()
    }

    pub fn mean(&self) -> Vec<f64> {
        let total = self.alpha0();
        self.alpha.iter().map(|&a| a / total).collect()
    }

    /// Marginal variance of each component.
    pub fn variance(&self) -> Vec<f64> {
        let a0 = self.alpha0();
        self.alpha
            .iter()
            .map(|&a| a * (a0 - a) / (a0 * a0 * (a0 + 1.0)))
            .collect()
    }

    /// Density mode; only defined when every concentration exceeds one.
    pub fn mode(&self) -> Option<Vec<f64>> {
        if self.alpha.iter().any(|&a| a <= 1.0) {
            return None;
        }
        let denom = self.alpha0() - self.k() as f64;
        Some(self.alpha.iter().map(|&a| (a - 1.0) / denom).collect())
    }

    /// Normalising constant `ln B(alpha)`.
    fn ln_normalizer(&self) -> f64 {
        self.alpha.iter().map(|&a| ln_gamma(a)).sum::<f64>() - ln_gamma(self.alpha0())
    }

    /// Log density at `x`; `-inf` when `x` is off the simplex.
    pub fn ln_pdf(&self, x: &[f64]) -> f64 {
        if x.len() != self.k() || !on_simplex(x) {
            return f64::NEG_INFINITY;
        }
        let kernel: f64 = self
            .alpha
            .iter()
            .zip(x)
            .filter(|&(&a, _)| a != 1.0)
            .map(|(&a, &xi)| (a - 1.0) * xi.ln())
            .sum();
        kernel - self.ln_normalizer()
    }

    /// Conjugate update with observed category counts.
    pub fn posterior(&self, counts: &[f64]) -> Dirichlet {
        debug_assert_eq!(counts.len(), self.k());
        Dirichlet {
            alpha: self.alpha.iter().zip(counts).map(|(a, c)| a + c).collect(),
        }
    }
}

/// Non-negative components summing to one, within floating-point slack.
pub fn on_simplex(x: &[f64]) -> bool {
    x.iter().all(|&v| v.is_finite() && v >= 0.0) && (x.iter().sum::<f64>() - 1.0).abs() < 1e-9
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_prior_has_flat_density() {
        let prior = Dirichlet::symmetric(3, 1.0).unwrap();
        let a = prior.ln_pdf(&[0.2, 0.3, 0.5]);
        let b = prior.ln_pdf(&[1.0, 0.0, 0.0]);
        assert!((a - b).abs() < 1e-12);
        // Volume of the 2-simplex is 1/2, so the flat density is 2.
        assert!((a - 2f64.ln()).abs() < 1e-12);
        assert_eq!(prior.ln_pdf(&[0.5, 0.6, -0.1]), f64::NEG_INFINITY);
    }

    #[test]
    fn mode_requires_concentration_above_one() {
        assert!(Dirichlet::symmetric(3, 1.0).unwrap().mode().is_none());
        let mode = Dirichlet::new(vec![3.0, 2.0, 2.0]).unwrap().mode().unwrap();
        assert!((mode[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_positive_concentration() {
        assert!(Dirichlet::new(vec![1.0, 0.0]).is_err());
        assert!(Dirichlet::new(vec![]).is_err());
    }

    #[test]
    fn posterior_adds_counts() {
        let prior = Dirichlet::symmetric(3, 1.0).unwrap();
        let posterior = prior.posterior(&[1.0, 0.0, 0.0]);
        assert_eq!(posterior.alpha(), &[2.0, 1.0, 1.0]);
        assert!((posterior.mean()[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn variance_of_concentrated_posterior_shrinks() {
        let flat = Dirichlet::symmetric(3, 1.0).unwrap();
        // Var = a (a0 - a) / (a0^2 (a0 + 1)) = 1 * 2 / (9 * 4)
        assert!((flat.variance()[0] - 2.0 / 36.0).abs() < 1e-12);
        let sharp = flat.posterior(&[40.0, 40.0, 40.0]);
        assert!(sharp.variance().iter().all(|&v| v < 0.002));
    }
}

//! Log densities the sampler can explore.

use crate::{
    model::Model,
    params::{FREE_DIM, VECTORS},
    types::CATEGORIES,
};

/// A differentiable log density on an unconstrained real space.
pub trait LogDensity {
    fn dim(&self) -> usize;

    /// Log density at `x` (up to a constant), writing its gradient into `grad`.
    fn log_density_gradient(&self, x: &[f64], grad: &mut [f64]) -> f64;
}

/// The model posterior expressed in additive log-ratio coordinates.
///
/// With `p = softmax(z_1, z_2, 0)` the change of variables contributes
/// `sum_c ln p_c`, so a Dirichlet(a) posterior becomes `sum_c a_c ln p_c`
/// with gradient `a_j - (sum_c a_c) p_j`.
#[derive(Debug, Clone)]
pub struct UnconstrainedPosterior {
    concentrations: [[f64; CATEGORIES]; VECTORS],
}

impl UnconstrainedPosterior {
    pub fn new(model: &Model) -> Self {
        Self {
            concentrations: model.posterior_concentrations(),
        }
    }
}

impl LogDensity for UnconstrainedPosterior {
    fn dim(&self) -> usize {
        FREE_DIM
    }

    fn log_density_gradient(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let mut total = 0.0;
        for ((z, g), alpha) in x
            .chunks(CATEGORIES - 1)
            .zip(grad.chunks_mut(CATEGORIES - 1))
            .zip(&self.concentrations)
        {
            let max = z.iter().copied().fold(0.0_f64, f64::max);
            let shifted_sum: f64 =
                z.iter().map(|zi| (zi - max).exp()).sum::<f64>() + (-max).exp();
            let log_norm = max + shifted_sum.ln();
            let alpha0: f64 = alpha.iter().sum();

            for (c, a) in alpha.iter().enumerate() {
                let z_c = z.get(c).copied().unwrap_or(0.0);
                total += a * (z_c - log_norm);
            }
            for ((gj, zj), aj) in g.iter_mut().zip(z).zip(alpha) {
                let pj = (zj - log_norm).exp();
                *gj = aj - alpha0 * pj;
            }
        }
        total
    }
}

//! Point values of the model parameters and their coordinate systems.
//!
//! The model has four probability vectors of length three: Theta over the
//! winner and one Beta per winner over cell tokens. They are handled in three
//! coordinate systems:
//!
//! - simplex: the vectors themselves;
//! - free: the first two components of each vector (eight numbers), used by
//!   the MAP optimizer, with the third component implied;
//! - unconstrained: additive log-ratios `ln(p_i / p_3)` (eight numbers), used
//!   by the sampler so every real vector maps inside the simplex.

use serde::{Deserialize, Serialize};

use crate::{
    dirichlet::on_simplex,
    tictactoe::{Category, Token, Winner},
    types::CATEGORIES,
};

/// Number of simplex vectors (Theta plus one Beta per winner).
pub const VECTORS: usize = 1 + CATEGORIES;

/// Free coordinates per vector once the sum-to-one constraint is applied.
const FREE_PER_VECTOR: usize = CATEGORIES - 1;

/// Dimension of the free and unconstrained coordinate systems.
pub const FREE_DIM: usize = VECTORS * FREE_PER_VECTOR;

/// Components below this are lifted before taking log-ratios.
const LOG_RATIO_FLOOR: f64 = 1e-6;

/// Theta and the three Beta vectors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimplexParams {
    pub theta: [f64; CATEGORIES],
    pub beta: [[f64; CATEGORIES]; CATEGORIES],
}

impl Default for SimplexParams {
    fn default() -> Self {
        Self::uniform()
    }
}

impl SimplexParams {
    /// Every vector at the centre of the simplex.
    pub fn uniform() -> Self {
        let third = [1.0 / CATEGORIES as f64; CATEGORIES];
        Self {
            theta: third,
            beta: [third; CATEGORIES],
        }
    }

    /// P(W = w)
    pub fn winner_probability(&self, winner: Winner) -> f64 {
        self.theta[winner.index()]
    }

    /// P(token at a position | W = w)
    pub fn token_probability(&self, winner: Winner, token: Token) -> f64 {
        self.beta[winner.index()][token.index()]
    }

    /// The four vectors in order Theta, Beta[X], Beta[O], Beta[Neither].
    pub fn vectors(&self) -> [[f64; CATEGORIES]; VECTORS] {
        [self.theta, self.beta[0], self.beta[1], self.beta[2]]
    }

    pub fn from_vectors(vectors: [[f64; CATEGORIES]; VECTORS]) -> Self {
        Self {
            theta: vectors[0],
            beta: [vectors[1], vectors[2], vectors[3]],
        }
    }

    /// True when every vector lies on the closed simplex.
    pub fn is_valid(&self) -> bool {
        self.vectors().iter().all(|v| on_simplex(v))
    }

    /// True when every component is strictly inside (0, 1).
    pub fn is_interior(&self) -> bool {
        self.is_valid()
            && self
                .vectors()
                .iter()
                .flatten()
                .all(|&p| p > 0.0 && p < 1.0)
    }

    pub fn to_free(&self) -> [f64; FREE_DIM] {
        let mut free = [0.0; FREE_DIM];
        for (chunk, vector) in free.chunks_mut(FREE_PER_VECTOR).zip(self.vectors()) {
            chunk.copy_from_slice(&vector[..FREE_PER_VECTOR]);
        }
        free
    }

    /// Rebuild from free coordinates, or `None` if any implied vector leaves the simplex.
    pub fn from_free(free: &[f64]) -> Option<Self> {
        debug_assert_eq!(free.len(), FREE_DIM);
        let mut vectors = [[0.0; CATEGORIES]; VECTORS];
        for (vector, chunk) in vectors.iter_mut().zip(free.chunks(FREE_PER_VECTOR)) {
            let (a, b) = (chunk[0], chunk[1]);
            let c = 1.0 - a - b;
            if !(a.is_finite() && b.is_finite()) || a < 0.0 || b < 0.0 || c < 0.0 {
                return None;
            }
            *vector = [a, b, c];
        }
        Some(Self::from_vectors(vectors))
    }

    /// Additive log-ratio coordinates. Components on the boundary are lifted
    /// to a small floor first so the result is finite.
    pub fn to_unconstrained(&self) -> [f64; FREE_DIM] {
        let mut z = [0.0; FREE_DIM];
        for (chunk, vector) in z.chunks_mut(FREE_PER_VECTOR).zip(self.vectors()) {
            let lifted = lift(vector);
            for (zi, p) in chunk.iter_mut().zip(&lifted[..FREE_PER_VECTOR]) {
                *zi = (p / lifted[FREE_PER_VECTOR]).ln();
            }
        }
        z
    }

    pub fn from_unconstrained(z: &[f64]) -> Self {
        debug_assert_eq!(z.len(), FREE_DIM);
        let mut vectors = [[0.0; CATEGORIES]; VECTORS];
        for (vector, chunk) in vectors.iter_mut().zip(z.chunks(FREE_PER_VECTOR)) {
            *vector = softmax_with_reference(chunk);
        }
        Self::from_vectors(vectors)
    }

    /// Flatten to the twelve components in [`component_names`] order.
    pub fn components(&self) -> Vec<f64> {
        self.vectors().iter().flatten().copied().collect()
    }
}

/// Labels for the twelve components, e.g. `theta[X]` or `beta[O][Neither]`.
pub fn component_names() -> Vec<String> {
    let mut names: Vec<String> = Winner::ALL
        .iter()
        .map(|w| format!("theta[{}]", w.name()))
        .collect();
    for winner in Winner::ALL {
        for token in Token::ALL {
            names.push(format!("beta[{}][{}]", winner.name(), token.name()));
        }
    }
    names
}

fn lift(vector: [f64; CATEGORIES]) -> [f64; CATEGORIES] {
    let mut lifted = vector.map(|p| p.max(LOG_RATIO_FLOOR));
    let total: f64 = lifted.iter().sum();
    lifted.iter_mut().for_each(|p| *p /= total);
    lifted
}

/// Softmax over `[z_1, .., z_{k-1}, 0]`.
pub(crate) fn softmax_with_reference(z: &[f64]) -> [f64; CATEGORIES] {
    let max = z.iter().copied().fold(0.0_f64, f64::max);
    let mut out = [0.0; CATEGORIES];
    for (o, &zi) in out.iter_mut().zip(z) {
        *o = (zi - max).exp();
    }
    out[CATEGORIES - 1] = (-max).exp();
    let total: f64 = out.iter().sum();
    out.iter_mut().for_each(|p| *p /= total);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_params() -> SimplexParams {
        SimplexParams {
            theta: [0.2, 0.5, 0.3],
            beta: [[0.6, 0.3, 0.1], [0.25, 0.25, 0.5], [0.4, 0.4, 0.2]],
        }
    }

    #[test]
    fn free_coordinates_round_trip() {
        let params = sample_params();
        let rebuilt = SimplexParams::from_free(&params.to_free()).unwrap();
        for (a, b) in params.components().iter().zip(rebuilt.components()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn free_coordinates_outside_simplex_are_rejected() {
        let mut free = SimplexParams::uniform().to_free();
        free[0] = 0.9;
        free[1] = 0.2;
        assert!(SimplexParams::from_free(&free).is_none());
        free[1] = -0.01;
        assert!(SimplexParams::from_free(&free).is_none());
    }

    #[test]
    fn unconstrained_coordinates_round_trip() {
        let params = sample_params();
        let rebuilt = SimplexParams::from_unconstrained(&params.to_unconstrained());
        for (a, b) in params.components().iter().zip(rebuilt.components()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn boundary_point_maps_to_finite_coordinates() {
        let mut params = SimplexParams::uniform();
        params.theta = [0.0, 0.5, 0.5];
        let z = params.to_unconstrained();
        assert!(z.iter().all(|v| v.is_finite()));
        assert!(SimplexParams::from_unconstrained(&z).is_interior());
    }

    #[test]
    fn extreme_log_ratios_stay_normalised() {
        let p = softmax_with_reference(&[800.0, -800.0]);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(p[0] > 0.999);
    }

    #[test]
    fn names_cover_every_component() {
        let names = component_names();
        assert_eq!(names.len(), sample_params().components().len());
        assert_eq!(names[0], "theta[X]");
        assert_eq!(names[11], "beta[Neither][Neither]");
    }
}

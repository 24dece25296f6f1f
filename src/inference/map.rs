//! Derivative-free MAP search with the Nelder-Mead simplex method.
//!
//! The objective is minimised; callers pass the negative log posterior and
//! return `+inf` for points outside the feasible region, which the method
//! simply never accepts.

use serde::Serialize;

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Result of a minimisation. `point` is the best iterate even when
/// `converged` is false.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapOutcome {
    pub point: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct NelderMead {
    pub max_iterations: usize,
    /// Largest allowed spread of objective values across the simplex
    pub f_tolerance: f64,
    /// Largest allowed distance (max-norm) from the best vertex
    pub x_tolerance: f64,
    /// Edge length of the initial simplex
    pub initial_step: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            max_iterations: 20_000,
            f_tolerance: 1e-10,
            x_tolerance: 1e-8,
            initial_step: 0.1,
        }
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_nan() { f64::INFINITY } else { value }
}

impl NelderMead {
    pub fn new(max_iterations: usize, f_tolerance: f64) -> Self {
        Self {
            max_iterations,
            f_tolerance,
            ..Self::default()
        }
    }

    /// Minimise `objective` starting from `start`.
    pub fn minimize<F>(&self, mut objective: F, start: &[f64]) -> MapOutcome
    where
        F: FnMut(&[f64]) -> f64,
    {
        let n = start.len();
        let mut eval = |x: &[f64]| sanitize(objective(x));

        let mut vertices: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
        let f_start = eval(start);
        vertices.push((start.to_vec(), f_start));
        for i in 0..n {
            let mut forward = start.to_vec();
            forward[i] += self.initial_step;
            let f_forward = eval(&forward);
            // Step backwards when the forward vertex is infeasible.
            if f_forward.is_finite() || !f_start.is_finite() {
                vertices.push((forward, f_forward));
            } else {
                let mut backward = start.to_vec();
                backward[i] -= self.initial_step;
                let f_backward = eval(&backward);
                vertices.push((backward, f_backward));
            }
        }

        let mut iterations = 0;
        let mut converged = false;
        while iterations < self.max_iterations {
            vertices.sort_by(|a, b| a.1.total_cmp(&b.1));
            if self.has_converged(&vertices) {
                converged = true;
                break;
            }
            iterations += 1;

            let worst = n;
            let f_best = vertices[0].1;
            let f_second_worst = vertices[n - 1].1;
            let f_worst = vertices[worst].1;
            let centroid = centroid(&vertices[..n]);

            let reflected = along(&centroid, &vertices[worst].0, -REFLECTION);
            let f_reflected = eval(&reflected);

            if f_reflected < f_best {
                let expanded = along(&centroid, &reflected, EXPANSION);
                let f_expanded = eval(&expanded);
                vertices[worst] = if f_expanded < f_reflected {
                    (expanded, f_expanded)
                } else {
                    (reflected, f_reflected)
                };
                continue;
            }
            if f_reflected < f_second_worst {
                vertices[worst] = (reflected, f_reflected);
                continue;
            }

            let (contracted, f_contracted, accept) = if f_reflected < f_worst {
                let outside = along(&centroid, &reflected, CONTRACTION);
                let f_outside = eval(&outside);
                let accept = f_outside <= f_reflected;
                (outside, f_outside, accept)
            } else {
                let inside = along(&centroid, &vertices[worst].0, CONTRACTION);
                let f_inside = eval(&inside);
                let accept = f_inside < f_worst;
                (inside, f_inside, accept)
            };
            if accept {
                vertices[worst] = (contracted, f_contracted);
                continue;
            }

            let best = vertices[0].0.clone();
            for vertex in vertices.iter_mut().skip(1) {
                let shrunk = along(&best, &vertex.0, SHRINK);
                let f_shrunk = eval(&shrunk);
                *vertex = (shrunk, f_shrunk);
            }
        }

        vertices.sort_by(|a, b| a.1.total_cmp(&b.1));
        let (point, value) = vertices.swap_remove(0);
        MapOutcome {
            point,
            value,
            iterations,
            converged,
        }
    }

    fn has_converged(&self, sorted: &[(Vec<f64>, f64)]) -> bool {
        let f_best = sorted[0].1;
        let f_worst = sorted[sorted.len() - 1].1;
        if !f_best.is_finite() || !f_worst.is_finite() {
            return false;
        }
        if f_worst - f_best > self.f_tolerance {
            return false;
        }
        let best = &sorted[0].0;
        let size = sorted[1..]
            .iter()
            .flat_map(|(x, _)| x.iter().zip(best).map(|(a, b)| (a - b).abs()))
            .fold(0.0_f64, f64::max);
        size <= self.x_tolerance
    }
}

fn centroid(vertices: &[(Vec<f64>, f64)]) -> Vec<f64> {
    let n = vertices.len() as f64;
    let mut c = vec![0.0; vertices[0].0.len()];
    for (x, _) in vertices {
        for (ci, xi) in c.iter_mut().zip(x) {
            *ci += xi / n;
        }
    }
    c
}

/// `origin + t * (target - origin)`
fn along(origin: &[f64], target: &[f64], t: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(target)
        .map(|(o, x)| o + t * (x - o))
        .collect()
}

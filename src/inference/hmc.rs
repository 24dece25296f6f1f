//! Hamiltonian Monte Carlo with leapfrog integration.
//!
//! Identity mass matrix, a fixed number of leapfrog steps, and a step size
//! tuned by dual averaging during burn-in. Trajectories whose energy error is
//! non-finite or exceeds the configured threshold are counted as divergent
//! and rejected; sampling always runs to completion.

use rand::Rng;
use rand_distr::StandardNormal;
use tracing::{debug, warn};

use super::target::LogDensity;
use crate::ports::{IterationReport, SamplingObserver};

// Dual averaging constants from Hoffman & Gelman (2014).
const ADAPT_GAMMA: f64 = 0.05;
const ADAPT_T0: f64 = 10.0;
const ADAPT_KAPPA: f64 = 0.75;

/// Each trajectory scales the step size by a uniform factor in `1 ± STEP_JITTER`
/// so fixed-length trajectories cannot lock onto a periodic orbit.
const STEP_JITTER: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HmcSettings {
    pub iterations: usize,
    pub burn_in: usize,
    pub leapfrog_steps: usize,
    pub initial_step_size: f64,
    pub target_acceptance: f64,
    pub max_energy_error: f64,
}

impl From<&crate::InferenceConfig> for HmcSettings {
    fn from(config: &crate::InferenceConfig) -> Self {
        Self {
            iterations: config.samples,
            burn_in: config.burn_in,
            leapfrog_steps: config.leapfrog_steps,
            initial_step_size: config.initial_step_size,
            target_acceptance: config.target_acceptance,
            max_energy_error: config.max_energy_error,
        }
    }
}

/// Every chain position, burn-in included, with per-iteration statistics.
#[derive(Debug, Clone)]
pub struct HmcRun {
    pub draws: Vec<Vec<f64>>,
    pub accept_probabilities: Vec<f64>,
    pub accepted: Vec<bool>,
    pub divergent: Vec<bool>,
    /// Step size in effect after adaptation
    pub step_size: f64,
}

impl HmcRun {
    pub fn divergences(&self) -> usize {
        self.divergent.iter().filter(|&&d| d).count()
    }
}

struct DualAveraging {
    mu: f64,
    h_bar: f64,
    log_step: f64,
    log_step_bar: f64,
    target: f64,
    count: f64,
}

impl DualAveraging {
    fn new(initial_step: f64, target: f64) -> Self {
        Self {
            mu: (10.0 * initial_step).ln(),
            h_bar: 0.0,
            log_step: initial_step.ln(),
            log_step_bar: 0.0,
            target,
            count: 0.0,
        }
    }

    fn update(&mut self, accept_probability: f64) -> f64 {
        self.count += 1.0;
        let m = self.count;
        let eta = 1.0 / (m + ADAPT_T0);
        self.h_bar = (1.0 - eta) * self.h_bar + eta * (self.target - accept_probability);
        self.log_step = self.mu - m.sqrt() / ADAPT_GAMMA * self.h_bar;
        let weight = m.powf(-ADAPT_KAPPA);
        self.log_step_bar = weight * self.log_step + (1.0 - weight) * self.log_step_bar;
        self.log_step.exp()
    }

    fn final_step(&self) -> f64 {
        self.log_step_bar.exp()
    }
}

pub struct HmcSampler {
    settings: HmcSettings,
}

impl HmcSampler {
    pub fn new(settings: HmcSettings) -> Self {
        Self { settings }
    }

    /// Run the chain from `start`.
    pub fn sample<T, R>(
        &self,
        target: &T,
        start: &[f64],
        rng: &mut R,
        observer: &mut dyn SamplingObserver,
    ) -> HmcRun
    where
        T: LogDensity,
        R: Rng,
    {
        let settings = &self.settings;
        let dim = target.dim();
        debug_assert_eq!(start.len(), dim);

        let mut position = start.to_vec();
        let mut grad = vec![0.0; dim];
        let mut log_density = target.log_density_gradient(&position, &mut grad);

        let mut step_size = settings.initial_step_size;
        let mut adaptation = DualAveraging::new(step_size, settings.target_acceptance);

        let mut run = HmcRun {
            draws: Vec::with_capacity(settings.iterations),
            accept_probabilities: Vec::with_capacity(settings.iterations),
            accepted: Vec::with_capacity(settings.iterations),
            divergent: Vec::with_capacity(settings.iterations),
            step_size,
        };

        let mut momentum = vec![0.0; dim];
        let mut proposal = vec![0.0; dim];
        let mut proposal_grad = vec![0.0; dim];

        observer.on_sampling_start(settings.iterations, settings.burn_in);
        for iteration in 0..settings.iterations {
            let warmup = iteration < settings.burn_in;
            for m in momentum.iter_mut() {
                *m = rng.sample(StandardNormal);
            }
            let initial_energy = -log_density + kinetic(&momentum);

            let jitter = 1.0 + STEP_JITTER * (2.0 * rng.random::<f64>() - 1.0);

            proposal.copy_from_slice(&position);
            proposal_grad.copy_from_slice(&grad);
            let proposal_density = leapfrog(
                target,
                &mut proposal,
                &mut momentum,
                &mut proposal_grad,
                step_size * jitter,
                settings.leapfrog_steps,
            );
            let energy_error = -proposal_density + kinetic(&momentum) - initial_energy;

            let divergent =
                !energy_error.is_finite() || energy_error > settings.max_energy_error;
            let accept_probability = if divergent {
                0.0
            } else {
                (-energy_error).exp().min(1.0)
            };
            let accepted = !divergent && rng.random::<f64>() < accept_probability;
            if accepted {
                position.copy_from_slice(&proposal);
                grad.copy_from_slice(&proposal_grad);
                log_density = proposal_density;
            }
            if divergent {
                warn!(iteration, step_size, energy_error, "divergent trajectory");
            } else {
                debug!(iteration, accept_probability, accepted, log_density, "hmc iteration");
            }

            observer.on_iteration(&IterationReport {
                iteration,
                warmup,
                accept_probability,
                accepted,
                divergent,
                step_size,
                log_density,
            });

            run.draws.push(position.clone());
            run.accept_probabilities.push(accept_probability);
            run.accepted.push(accepted);
            run.divergent.push(divergent);

            if warmup {
                step_size = adaptation.update(accept_probability);
                if iteration + 1 == settings.burn_in {
                    step_size = adaptation.final_step();
                    debug!(step_size, "step size adapted");
                }
            }
        }

        run.step_size = step_size;
        observer.on_sampling_end(run.divergences());
        run
    }
}

fn kinetic(momentum: &[f64]) -> f64 {
    0.5 * momentum.iter().map(|p| p * p).sum::<f64>()
}

/// Integrate `steps` leapfrog steps in place, returning the final log density.
fn leapfrog<T: LogDensity + ?Sized>(
    target: &T,
    position: &mut [f64],
    momentum: &mut [f64],
    grad: &mut [f64],
    step_size: f64,
    steps: usize,
) -> f64 {
    let mut log_density = f64::NAN;
    for (p, g) in momentum.iter_mut().zip(grad.iter()) {
        *p += 0.5 * step_size * g;
    }
    for step in 0..steps {
        for (q, p) in position.iter_mut().zip(momentum.iter()) {
            *q += step_size * p;
        }
        log_density = target.log_density_gradient(position, grad);
        if !log_density.is_finite() {
            return log_density;
        }
        let scale = if step + 1 == steps { 0.5 } else { 1.0 };
        for (p, g) in momentum.iter_mut().zip(grad.iter()) {
            *p += scale * step_size * g;
        }
    }
    log_density
}

//! Sampler diagnostics and per-parameter summaries

use serde::Serialize;

use super::hmc::HmcRun;

/// Chain-level statistics over the retained draws.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SamplerDiagnostics {
    pub iterations: usize,
    pub burn_in: usize,
    pub retained: usize,
    /// Mean acceptance probability after burn-in
    pub acceptance_rate: f64,
    /// Divergent trajectories over the whole run
    pub divergences: usize,
    /// Divergent trajectories after burn-in
    pub retained_divergences: usize,
    pub step_size: f64,
}

impl SamplerDiagnostics {
    pub fn from_run(run: &HmcRun, burn_in: usize) -> Self {
        let kept = &run.accept_probabilities[burn_in.min(run.accept_probabilities.len())..];
        let acceptance_rate = if kept.is_empty() {
            0.0
        } else {
            kept.iter().sum::<f64>() / kept.len() as f64
        };
        Self {
            iterations: run.draws.len(),
            burn_in,
            retained: kept.len(),
            acceptance_rate,
            divergences: run.divergences(),
            retained_divergences: run
                .divergent
                .iter()
                .skip(burn_in)
                .filter(|&&d| d)
                .count(),
            step_size: run.step_size,
        }
    }
}

/// Summary of one scalar parameter's retained trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSummary {
    pub name: String,
    pub mean: f64,
    pub sd: f64,
    /// 5% and 95% quantiles
    pub interval: (f64, f64),
    pub ess: f64,
    /// Closed-form posterior mean, for comparison
    pub exact_mean: f64,
    /// Closed-form posterior standard deviation
    pub exact_sd: f64,
}

impl ParameterSummary {
    pub fn from_trace(name: &str, trace: &[f64], exact_mean: f64, exact_sd: f64) -> Self {
        let n = trace.len().max(1) as f64;
        let mean = trace.iter().sum::<f64>() / n;
        let var = trace.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let mut sorted = trace.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self {
            name: name.to_string(),
            mean,
            sd: var.sqrt(),
            interval: (quantile(&sorted, 0.05), quantile(&sorted, 0.95)),
            ess: effective_sample_size(trace),
            exact_mean,
            exact_sd,
        }
    }
}

fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

/// Effective sample size using Geyer's initial positive sequence estimator.
///
/// Constant traces return their length.
pub fn effective_sample_size(trace: &[f64]) -> f64 {
    let n = trace.len();
    if n < 4 {
        return n as f64;
    }
    let mean = trace.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = trace.iter().map(|v| v - mean).collect();
    let c0 = centered.iter().map(|v| v * v).sum::<f64>() / n as f64;
    if c0 <= f64::EPSILON {
        return n as f64;
    }

    let autocorr = |lag: usize| -> f64 {
        centered[..n - lag]
            .iter()
            .zip(&centered[lag..])
            .map(|(a, b)| a * b)
            .sum::<f64>()
            / (n as f64 * c0)
    };

    let mut tau = -1.0;
    let mut lag = 0;
    while lag + 1 < n {
        let pair = autocorr(lag) + autocorr(lag + 1);
        if pair <= 0.0 {
            break;
        }
        tau += 2.0 * pair;
        lag += 2;
    }
    if tau <= 0.0 {
        return n as f64;
    }
    n as f64 / tau
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn independent_draws_have_ess_near_length() {
        let mut rng = StdRng::seed_from_u64(17);
        let trace: Vec<f64> = (0..2_000).map(|_| rng.random::<f64>()).collect();
        let ess = effective_sample_size(&trace);
        assert!(ess > 1_400.0, "ess {ess}");
    }

    #[test]
    fn sticky_chain_has_small_ess() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut value = 0.0;
        let trace: Vec<f64> = (0..2_000)
            .map(|_| {
                value = 0.98 * value + 0.1 * (rng.random::<f64>() - 0.5);
                value
            })
            .collect();
        assert!(effective_sample_size(&trace) < 200.0);
    }

    #[test]
    fn constant_trace_is_fully_effective() {
        assert_eq!(effective_sample_size(&[0.5; 10]), 10.0);
    }

    #[test]
    fn summary_interval_brackets_mean() {
        let trace: Vec<f64> = (0..101).map(|i| i as f64 / 100.0).collect();
        let summary = ParameterSummary::from_trace("p", &trace, 0.5, 0.29);
        assert!((summary.mean - 0.5).abs() < 1e-12);
        assert!((summary.interval.0 - 0.05).abs() < 1e-12);
        assert!((summary.interval.1 - 0.95).abs() < 1e-12);
    }
}

//! Observer port - abstraction for watching a sampler run
//!
//! The sampler reports every iteration through this trait so progress
//! display and custom bookkeeping stay out of the inference code.

use serde::Serialize;

/// What happened in a single sampler iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IterationReport {
    /// Iteration index (0-based, burn-in included)
    pub iteration: usize,
    /// True while the iteration belongs to the discarded burn-in prefix
    pub warmup: bool,
    /// Metropolis acceptance probability of the proposal
    pub accept_probability: f64,
    /// Whether the proposal was accepted
    pub accepted: bool,
    /// Whether the trajectory diverged
    pub divergent: bool,
    /// Step size used for this iteration
    pub step_size: f64,
    /// Log density at the chain's position after the iteration
    pub log_density: f64,
}

/// Observer trait for monitoring sampling
///
/// # Event Sequence
///
/// 1. `on_sampling_start(iterations, burn_in)` - Once at the beginning
/// 2. `on_iteration(report)` - After every transition
/// 3. `on_sampling_end(divergences)` - Once at the end
///
/// # Examples
///
/// ```
/// use naive_bayes_ttt::ports::{IterationReport, SamplingObserver};
///
/// struct AcceptanceCounter {
///     accepted: usize,
/// }
///
/// impl SamplingObserver for AcceptanceCounter {
///     fn on_iteration(&mut self, report: &IterationReport) {
///         if report.accepted {
///             self.accepted += 1;
///         }
///     }
/// }
/// ```
pub trait SamplingObserver {
    fn on_sampling_start(&mut self, _iterations: usize, _burn_in: usize) {}

    fn on_iteration(&mut self, _report: &IterationReport) {}

    fn on_sampling_end(&mut self, _divergences: usize) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SamplingObserver for NullObserver {}

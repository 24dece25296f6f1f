//! Posterior inference: MAP optimisation and Hamiltonian Monte Carlo.

pub mod diagnostics;
pub mod hmc;
pub mod map;
pub mod target;

pub use diagnostics::{ParameterSummary, SamplerDiagnostics, effective_sample_size};
pub use hmc::{HmcRun, HmcSampler, HmcSettings};
pub use map::{MapOutcome, NelderMead};
pub use target::{LogDensity, UnconstrainedPosterior};

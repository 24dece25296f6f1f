//! Ports - interfaces between inference and its surroundings

pub mod observer;

pub use observer::{IterationReport, NullObserver, SamplingObserver};

//! Export of posterior draws for analysis
//!
//! Supports CSV traces of the retained draws and an SVG trace plot with one
//! panel per parameter component.

mod trace_csv;
mod trace_plot;

pub use trace_csv::TraceCsvExporter;
pub use trace_plot::{TracePlot, TracePlotConfig};

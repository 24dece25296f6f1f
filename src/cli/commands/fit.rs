//! Fit command - estimate the posterior and report it

use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::to_writer_pretty;

use crate::{
    cli::{
        commands::fit_posterior,
        config::InferenceArgs,
        output::{print_kv, print_params, print_section, print_subsection, print_summary_table},
    },
    estimator::MapReport,
    export::{TraceCsvExporter, TracePlot, TracePlotConfig},
    inference::{ParameterSummary, SamplerDiagnostics},
    params::SimplexParams,
};

#[derive(Parser, Debug)]
#[command(about = "Fit the posterior to training data")]
pub struct FitArgs {
    #[command(flatten)]
    pub inference: InferenceArgs,

    /// Write retained draws as CSV
    #[arg(long)]
    pub trace_csv: Option<PathBuf>,

    /// Write an SVG trace plot of retained draws
    #[arg(long)]
    pub trace_plot: Option<PathBuf>,

    /// Panels per row in the trace plot
    #[arg(long, default_value_t = 3)]
    pub plot_columns: usize,

    /// Write a JSON summary of the fit
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct FitSummaryFile {
    games: usize,
    map: MapReport,
    posterior_mean: SimplexParams,
    exact_mode: Option<SimplexParams>,
    diagnostics: SamplerDiagnostics,
    parameters: Vec<ParameterSummary>,
}

pub fn execute(args: FitArgs) -> Result<()> {
    let posterior = fit_posterior(&args.inference)?;
    let map = posterior.map();
    let diagnostics = posterior.diagnostics();

    print_section("Posterior fit");
    print_kv("Training games", &posterior.games().to_string());

    print_subsection("MAP estimate");
    print_kv("Log posterior", &format!("{:.4}", map.log_posterior));
    print_kv("Iterations", &map.iterations.to_string());
    print_kv("Converged", &map.converged.to_string());
    if map.fell_back_to_prior {
        print_kv("Fallback", "prior mean");
    }
    print_params(&map.params);

    if let Some(mode) = posterior.exact().mode() {
        print_subsection("Closed-form mode");
        print_params(&mode);
    }

    print_subsection("Sampler");
    print_kv("Iterations", &diagnostics.iterations.to_string());
    print_kv("Burn-in", &diagnostics.burn_in.to_string());
    print_kv("Acceptance", &format!("{:.3}", diagnostics.acceptance_rate));
    print_kv("Step size", &format!("{:.4}", diagnostics.step_size));
    print_kv(
        "Divergences",
        &format!(
            "{} ({} after burn-in)",
            diagnostics.divergences, diagnostics.retained_divergences
        ),
    );

    print_subsection("Posterior summary");
    print_summary_table(&posterior);

    if let Some(path) = &args.trace_csv {
        TraceCsvExporter::write_to_file(&posterior, path)?;
        println!("\nTrace CSV written to {}", path.display());
    }
    if let Some(path) = &args.trace_plot {
        let plot = TracePlot::new(TracePlotConfig {
            columns: args.plot_columns,
            ..TracePlotConfig::default()
        });
        plot.write_to_file(&posterior, path)?;
        println!("Trace plot written to {}", path.display());
    }
    if let Some(path) = &args.summary {
        let summary = FitSummaryFile {
            games: posterior.games(),
            map: map.clone(),
            posterior_mean: posterior.mean(),
            exact_mode: posterior.exact().mode(),
            diagnostics: diagnostics.clone(),
            parameters: posterior.summaries(),
        };
        let file = File::create(path)
            .with_context(|| format!("Failed to create summary {}", path.display()))?;
        to_writer_pretty(file, &summary)?;
        println!("Summary written to {}", path.display());
    }
    Ok(())
}

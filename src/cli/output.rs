//! Output formatting and progress bars for CLI

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    estimator::Posterior,
    params::{SimplexParams, component_names},
    ports::{IterationReport, SamplingObserver},
};

/// Create a progress bar for sampling
pub fn create_sampling_progress(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} draws ({msg})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");
    pb.set_style(style);
    pb
}

/// Progress bar observer - shows sampler progress with warmup and divergences
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    divergences: usize,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            divergences: 0,
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl SamplingObserver for ProgressObserver {
    fn on_sampling_start(&mut self, iterations: usize, _burn_in: usize) {
        self.progress_bar = Some(create_sampling_progress(iterations as u64));
    }

    fn on_iteration(&mut self, report: &IterationReport) {
        if report.divergent {
            self.divergences += 1;
        }
        if let Some(pb) = &self.progress_bar {
            pb.inc(1);
            if report.iteration % 50 == 0 || report.divergent {
                let phase = if report.warmup { "warmup" } else { "sampling" };
                pb.set_message(format!(
                    "{phase}, step {:.3}, divergences {}",
                    report.step_size, self.divergences
                ));
            }
        }
    }

    fn on_sampling_end(&mut self, divergences: usize) {
        if let Some(pb) = self.progress_bar.take() {
            pb.finish_with_message(format!("done, divergences {divergences}"));
        }
    }
}

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Print every component of a parameter point
pub fn print_params(params: &SimplexParams) {
    for (name, value) in component_names().iter().zip(params.components()) {
        print_kv(name, &format!("{value:.4}"));
    }
}

/// Print the per-parameter posterior summary table
pub fn print_summary_table(posterior: &Posterior) {
    println!(
        "  {:24} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "parameter", "mean", "sd", "5%", "95%", "ess", "exact", "exact sd"
    );
    for summary in posterior.summaries() {
        println!(
            "  {:24} {:>8.4} {:>8.4} {:>8.4} {:>8.4} {:>8.0} {:>8.4} {:>8.4}",
            summary.name,
            summary.mean,
            summary.sd,
            summary.interval.0,
            summary.interval.1,
            summary.ess,
            summary.exact_mean,
            summary.exact_sd
        );
    }
}

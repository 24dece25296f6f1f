//! SVG trace plot of retained posterior draws

use std::{fs, path::Path};

use crate::{Result, estimator::Posterior, params::component_names};

/// Layout of the trace plot grid.
#[derive(Debug, Clone, Copy)]
pub struct TracePlotConfig {
    pub columns: usize,
    pub panel_width: f64,
    pub panel_height: f64,
    pub margin: f64,
}

impl Default for TracePlotConfig {
    fn default() -> Self {
        Self {
            columns: 3,
            panel_width: 320.0,
            panel_height: 140.0,
            margin: 24.0,
        }
    }
}

/// Renders one panel per component: the trace as a polyline over [0, 1]
/// and the closed-form posterior mean as a dashed reference line.
pub struct TracePlot {
    config: TracePlotConfig,
}

impl Default for TracePlot {
    fn default() -> Self {
        Self::new(TracePlotConfig::default())
    }
}

impl TracePlot {
    pub fn new(config: TracePlotConfig) -> Self {
        Self { config }
    }

    /// Render the plot as a standalone SVG document.
    pub fn render(&self, posterior: &Posterior) -> String {
        let cfg = &self.config;
        let names = component_names();
        let traces = posterior.traces();
        let exact = posterior.exact().mean().components();
        let columns = cfg.columns.max(1);
        let rows = names.len().div_ceil(columns);
        let cell_w = cfg.panel_width + cfg.margin;
        let cell_h = cfg.panel_height + 2.0 * cfg.margin;
        let width = columns as f64 * cell_w + cfg.margin;
        let height = rows as f64 * cell_h + cfg.margin;

        let mut svg = String::new();
        svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.0}\" height=\"{height:.0}\">\n"
        ));
        svg.push_str("  <style>\n");
        svg.push_str("    .frame { fill: none; stroke: #333; stroke-width: 1; }\n");
        svg.push_str("    .trace { fill: none; stroke: #1f77b4; stroke-width: 0.8; }\n");
        svg.push_str("    .exact { stroke: #d62728; stroke-width: 1; stroke-dasharray: 4 3; }\n");
        svg.push_str("    .label { font-family: monospace; font-size: 12px; }\n");
        svg.push_str("  </style>\n");
        svg.push_str("  <rect width=\"100%\" height=\"100%\" fill=\"#fafafa\"/>\n");

        for (idx, ((name, trace), exact_mean)) in names.iter().zip(&traces).zip(&exact).enumerate() {
            let x0 = cfg.margin + (idx % columns) as f64 * cell_w;
            let y0 = cfg.margin + (idx / columns) as f64 * cell_h + cfg.margin;
            let to_y = |v: f64| y0 + (1.0 - v.clamp(0.0, 1.0)) * cfg.panel_height;

            svg.push_str(&format!(
                "  <text class=\"label\" x=\"{x0:.1}\" y=\"{:.1}\">{name}</text>\n",
                y0 - 6.0
            ));
            svg.push_str(&format!(
                "  <rect class=\"frame\" x=\"{x0:.1}\" y=\"{y0:.1}\" width=\"{:.1}\" height=\"{:.1}\"/>\n",
                cfg.panel_width, cfg.panel_height
            ));
            svg.push_str(&format!(
                "  <line class=\"exact\" x1=\"{x0:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\"/>\n",
                x0 + cfg.panel_width,
                y = to_y(*exact_mean)
            ));

            if trace.is_empty() {
                continue;
            }
            let step = if trace.len() > 1 {
                cfg.panel_width / (trace.len() - 1) as f64
            } else {
                0.0
            };
            let points: Vec<String> = trace
                .iter()
                .enumerate()
                .map(|(i, &v)| format!("{:.1},{:.1}", x0 + i as f64 * step, to_y(v)))
                .collect();
            svg.push_str(&format!(
                "  <polyline class=\"trace\" points=\"{}\"/>\n",
                points.join(" ")
            ));
        }

        svg.push_str("</svg>\n");
        svg
    }

    /// Render and write the plot to `path`.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written.
    pub fn write_to_file(&self, posterior: &Posterior, path: &Path) -> Result<()> {
        fs::write(path, self.render(posterior)).map_err(|source| crate::Error::Io {
            operation: format!("write trace plot {}", path.display()),
            source,
        })
    }
}

//! CSV export of retained posterior draws

use std::{fs::File, io::Write, path::Path};

use crate::{Result, estimator::Posterior, params::component_names};

/// Writes one row per retained draw: the chain iteration followed by the
/// twelve parameter components.
pub struct TraceCsvExporter;

impl TraceCsvExporter {
    /// Write the trace table to any writer.
    ///
    /// # Errors
    ///
    /// Returns error if a record cannot be written.
    pub fn write<W: Write>(posterior: &Posterior, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        let mut header = vec!["iteration".to_string()];
        header.extend(component_names());
        csv.write_record(&header)?;

        let offset = posterior.diagnostics().burn_in;
        for (idx, sample) in posterior.samples().iter().enumerate() {
            let mut row = vec![(offset + idx).to_string()];
            row.extend(sample.components().iter().map(|v| format!("{v:.10}")));
            csv.write_record(&row)?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Write the trace table to `path`.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be created or written.
    pub fn write_to_file(posterior: &Posterior, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| crate::Error::Io {
            operation: format!("create trace file {}", path.display()),
            source,
        })?;
        Self::write(posterior, file)
    }
}

use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};

use common::config::Settings;
use eyre::{Context, Result};
use simple_mutex::{ReportFormat, result::parse_output};
use simple_mutex_basic::SimpleMutexBasic;
use tracing::debug;

/// Parses the report at `report_path` and writes every chart it has data for.
/// Returns the files written, in rendering order.
pub fn plot(
    report_path: &Path,
    settings: &Settings,
    format: &ReportFormat,
) -> Result<Vec<PathBuf>> {
    println!("Parsing results from {}...", report_path.display());
    let output = read_to_string(report_path)
        .wrap_err_with(|| format!("Read benchmark report {}", report_path.display()))?;

    let report = parse_output(&output, format)?;
    let written = SimpleMutexBasic::new(settings, format).plot_all(&report)?;
    debug!("Wrote {} charts", written.len());

    println!("\nAll plots generated successfully!");
    Ok(written)
}

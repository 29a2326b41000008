use crate::error::AnalyzerError;
use crate::report::ReportRow;
use csv::Writer;
use std::path::{Path, PathBuf};

pub fn export_report_csv(row: &ReportRow, path: &Path) -> Result<(), AnalyzerError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut wtr = Writer::from_path(path)?;
    wtr.serialize(row)?;
    wtr.flush()?;
    Ok(())
}

/// `reports/report_<address>.csv`, with every non-alphanumeric character of
/// the address replaced by `_`.
pub fn default_report_path(address: &str) -> PathBuf {
    let sanitized: String = address
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    PathBuf::from("reports").join(format!("report_{}.csv", sanitized))
}

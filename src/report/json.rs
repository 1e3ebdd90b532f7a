use super::types::RunReport;
use anyhow::{Context, Result};
use std::path::Path;

/// Write the run report as pretty JSON
pub fn write(report: &RunReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;

    log::info!("JSON report saved to: {}", path.display());
    Ok(())
}

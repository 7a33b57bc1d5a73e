//! Report export formats and utilities

use crate::analytics::reports::ReportOutput;
use crate::analytics::tables::Tabular;
use crate::error::{FlowError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use strum::{Display, EnumString};

/// Export format for report tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

/// Report exporter
pub struct ReportExporter;

impl ReportExporter {
    /// Render `output` and write it to `output_path`, returning the bytes written
    pub fn export(output: &ReportOutput, format: ExportFormat, output_path: &Path) -> Result<Vec<u8>> {
        let bytes = Self::render(output, format)?;
        fs::write(output_path, &bytes).map_err(|e| {
            FlowError::ExportFailed(format!(
                "Failed to write {}: {}",
                output_path.display(),
                e
            ))
        })?;
        Ok(bytes)
    }

    /// Write every output into `dir` as `<name>.<ext>`
    pub fn export_all(
        outputs: &[ReportOutput],
        format: ExportFormat,
        dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;

        outputs
            .iter()
            .map(|output| {
                let path = dir.join(format!("{}.{}", output.name, format.extension()));
                Self::export(output, format, &path)?;
                tracing::debug!(path = %path.display(), "Exported report");
                Ok(path)
            })
            .collect()
    }

    pub fn render(output: &ReportOutput, format: ExportFormat) -> Result<Vec<u8>> {
        match format {
            ExportFormat::Json => Self::render_json(output),
            ExportFormat::Csv => Ok(Self::render_csv(&output.table).into_bytes()),
        }
    }

    fn render_json(output: &ReportOutput) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(output)
            .map_err(|e| FlowError::ExportFailed(format!("JSON serialization failed: {}", e)))
    }

    /// Header row then data rows, quoting cells only where needed
    pub fn render_csv(table: &dyn Tabular) -> String {
        let mut csv_content = String::new();

        for row in std::iter::once(table.header()).chain(table.rows()) {
            let line: Vec<String> = row.iter().map(|cell| Self::escape_csv(cell)).collect();
            csv_content.push_str(&line.join(","));
            csv_content.push('\n');
        }

        csv_content
    }

    /// Escape a CSV cell
    fn escape_csv(s: &str) -> String {
        if s.contains([',', '"', '\n', '\r']) {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

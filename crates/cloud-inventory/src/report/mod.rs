//! Report rendering and atomic file output
//!
//! A [`ReportBundle`] is rendered fully in memory, then written to a
//! temporary file beside the destination and renamed over it. A failed run
//! never leaves a truncated report behind.

mod json;
mod layout;
mod xlsx;

pub use layout::SheetLayout;
pub use xlsx::{render_xlsx, sanitize_sheet_name};

use chrono::Utc;
use cloud_inventory_common::ReportBundle;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::info;

/// Output file format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, derive_more::Display)]
pub enum ReportFormat {
    #[default]
    #[display("xlsx")]
    Xlsx,
    #[display("json")]
    Json,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Xlsx => "xlsx",
            ReportFormat::Json => "json",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" | "excel" => Ok(ReportFormat::Xlsx),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown report format '{other}' (expected xlsx or json)")),
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to build workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("categories '{first}' and '{second}' both map to sheet '{sheet}'")]
    DuplicateSheet {
        sheet: String,
        first: String,
        second: String,
    },

    #[error("sheet '{sheet}' exceeds the worksheet size limit")]
    SheetTooLarge { sheet: String },
}

/// Render a bundle in the given format.
pub fn render(bundle: &ReportBundle, format: ReportFormat) -> Result<Vec<u8>, ReportError> {
    match format {
        ReportFormat::Xlsx => render_xlsx(bundle),
        ReportFormat::Json => json::render_json(bundle, Utc::now()),
    }
}

/// Render a bundle and atomically replace `path` with it.
pub fn write_report(
    bundle: &ReportBundle,
    format: ReportFormat,
    path: &Path,
) -> Result<(), ReportError> {
    let bytes = render(bundle, format)?;
    write_atomic(path, &bytes)?;
    info!(
        path = %path.display(),
        format = %format,
        sheets = bundle.len(),
        rows = bundle.total_rows(),
        "Report written"
    );
    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ReportError> {
    let io_error = |source: std::io::Error| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(io_error)?;
    tmp.write_all(bytes).map_err(io_error)?;
    tmp.as_file().sync_all().map_err(io_error)?;
    tmp.persist(path).map_err(|e| io_error(e.error))?;
    Ok(())
}

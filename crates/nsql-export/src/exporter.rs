//! Result-set export entry points.

use std::path::{Path, PathBuf};

use nsql_client::LogContext;
use nsql_query::ResultSet;
use tracing::{debug, info};

use crate::config::ExportConfig;
use crate::error::Result;
use crate::grid::ExportGrid;
use crate::xlsx::write_workbook;

/// What an export wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub path: PathBuf,
    /// Data rows, without the header.
    pub rows: usize,
    pub columns: usize,
}

/// Writes result sets as single-sheet workbooks.
#[derive(Debug, Clone, Default)]
pub struct XlsxExporter {
    config: ExportConfig,
}

impl XlsxExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Flatten `result_set` and write it to `path`, replacing any file there.
    pub fn export(
        &self,
        result_set: &ResultSet,
        path: &Path,
        ctx: &LogContext,
    ) -> Result<ExportSummary> {
        let grid = ExportGrid::from_result_set(result_set)?;
        debug!(
            parent: ctx.span(),
            rows = grid.row_count(),
            columns = grid.column_count(),
            "Built export grid"
        );

        write_workbook(&grid, &self.config, path)?;
        info!(
            parent: ctx.span(),
            path = %path.display(),
            sheet = %self.config.sheet_name,
            records = grid.rows().len(),
            "Workbook written"
        );

        Ok(ExportSummary {
            path: path.to_path_buf(),
            rows: grid.rows().len(),
            columns: grid.column_count(),
        })
    }
}

/// Delete any file at `path` ahead of a run.
///
/// Returns whether a file was removed. A missing file is not an error; a
/// file that cannot be removed is.
pub fn remove_existing(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use nsql_query::Record;
    use nsql_wsdl::FieldValue;

    fn result_set() -> ResultSet {
        ResultSet::new(vec![
            Record::new(vec![
                ("Name".into(), FieldValue::text("Acme")),
                ("Cost".into(), FieldValue::Number(100.0)),
            ]),
            Record::new(vec![
                ("Name".into(), FieldValue::text("Beta")),
                ("Cost".into(), FieldValue::Number(250.0)),
            ]),
        ])
    }

    #[test]
    fn test_export_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("PRJ001.xlsx");

        let summary = XlsxExporter::default()
            .export(&result_set(), &path, &LogContext::disabled())
            .unwrap();

        assert_eq!(summary.rows, 2);
        assert_eq!(summary.columns, 2);
        assert_eq!(summary.path, path);
        assert!(path.exists());
    }

    #[test]
    fn test_failed_export_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");

        let err = XlsxExporter::default()
            .export(&ResultSet::default(), &path, &LogContext::disabled())
            .unwrap_err();

        assert!(matches!(err.kind, ErrorKind::Schema(_)));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_remove_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.xlsx");

        assert!(!remove_existing(&path).unwrap());
        std::fs::write(&path, b"old").unwrap();
        assert!(remove_existing(&path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_remove_existing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = remove_existing(dir.path()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Io(_)));
    }
}

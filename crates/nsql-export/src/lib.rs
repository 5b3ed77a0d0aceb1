//! # nsql-export
//!
//! Turns a [`ResultSet`](nsql_query::ResultSet) into a header-plus-rows
//! [`ExportGrid`] and writes it as a single-sheet `.xlsx` workbook.
//!
//! Columns are fitted to their content and capped at
//! [`MAX_COLUMN_WIDTH`]. The workbook is written atomically: a failed
//! export leaves no partial file behind.
//!
//! ## Example
//!
//! ```rust,ignore
//! use nsql_export::{default_output_path, XlsxExporter};
//!
//! let exporter = XlsxExporter::default();
//! let summary = exporter.export(&records, &default_output_path("PRJ001"), &ctx)?;
//! println!("wrote {} rows", summary.rows);
//! ```

mod config;
mod error;
mod exporter;
mod grid;
mod xlsx;

pub use config::{
    default_output_path, ExportConfig, ExportConfigBuilder, DEFAULT_COLUMN_WIDTH, MAX_COLUMN_WIDTH,
};
pub use error::{Error, ErrorKind, Result};
pub use exporter::{remove_existing, ExportSummary, XlsxExporter};
pub use grid::ExportGrid;
pub use xlsx::{column_name, excel_serial, write_package, write_workbook};

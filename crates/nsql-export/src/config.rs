//! Export configuration.

use std::path::PathBuf;

/// Width a spreadsheet gives a column by default.
pub const DEFAULT_COLUMN_WIDTH: f64 = 8.43;

/// Widest a fitted column may be.
pub const MAX_COLUMN_WIDTH: f64 = 75.0;

/// Layout settings for the exported workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    pub sheet_name: String,
    pub max_column_width: f64,
    pub min_column_width: f64,
    /// Added to the longest cell when fitting a column.
    pub padding: f64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet1".to_string(),
            max_column_width: MAX_COLUMN_WIDTH,
            min_column_width: DEFAULT_COLUMN_WIDTH,
            padding: 2.0,
        }
    }
}

impl ExportConfig {
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.config.sheet_name = name.into();
        self
    }

    pub fn with_max_column_width(mut self, width: f64) -> Self {
        self.config.max_column_width = width;
        self
    }

    pub fn with_min_column_width(mut self, width: f64) -> Self {
        self.config.min_column_width = width;
        self
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.config.padding = padding;
        self
    }

    pub fn build(self) -> ExportConfig {
        self.config
    }
}

/// `{query_code}.xlsx`, the output path used when the caller names none.
pub fn default_output_path(query_code: &str) -> PathBuf {
    PathBuf::from(format!("{query_code}.xlsx"))
}

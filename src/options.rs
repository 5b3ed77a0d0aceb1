//! Inputs for a single pipeline run.

use std::path::PathBuf;

use nsql_auth::PpmCredentials;
use nsql_client::ClientConfig;
use nsql_export::{default_output_path, ExportConfig};

/// Everything a run needs, fixed before it starts.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub host: String,
    pub credentials: PpmCredentials,
    pub query_code: String,
    pub output: Option<PathBuf>,
    pub filter: Option<String>,
    pub client_config: ClientConfig,
    pub export_config: ExportConfig,
}

impl RunOptions {
    pub fn new(
        host: impl Into<String>,
        credentials: PpmCredentials,
        query_code: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            credentials,
            query_code: query_code.into(),
            output: None,
            filter: None,
            client_config: ClientConfig::default(),
            export_config: ExportConfig::default(),
        }
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_client_config(mut self, config: ClientConfig) -> Self {
        self.client_config = config;
        self
    }

    pub fn with_export_config(mut self, config: ExportConfig) -> Self {
        self.export_config = config;
        self
    }

    /// Target workbook path; `<code>.xlsx` in the working directory unless set.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.query_code))
    }

    /// Filter expression; unset and empty are the same thing.
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref().filter(|f| !f.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> RunOptions {
        RunOptions::new("ppm.example.com", PpmCredentials::new("admin", "s3cret"), "PRJ001")
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(options().output_path(), PathBuf::from("PRJ001.xlsx"));
        assert_eq!(
            options().with_output("/tmp/report.xlsx").output_path(),
            PathBuf::from("/tmp/report.xlsx")
        );
    }

    #[test]
    fn test_empty_filter_is_unset() {
        assert_eq!(options().filter(), None);
        assert_eq!(options().with_filter("").filter(), None);
        assert_eq!(
            options().with_filter("status = 'Active'").filter(),
            Some("status = 'Active'")
        );
    }
}

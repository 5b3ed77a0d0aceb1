//! # nsql-to-excel
//!
//! Runs a Clarity PPM NSQL query through its XOG query service and writes
//! the returned records to an `.xlsx` workbook.
//!
//! The record schema of a query is only known at runtime, so each run
//! fetches the query's WSDL, lowers it into a typed client, binds the
//! request, authentication and filter types by name, invokes the query and
//! exports whatever records come back.
//!
//! ## Security
//!
//! - The password is redacted in `Debug` output and in logged request bodies
//! - Error messages never include credential values
//!
//! ## Crates
//!
//! - **nsql-client** - HTTP transport, configuration, logging context
//! - **nsql-auth** - Username/password credentials
//! - **nsql-wsdl** - Descriptor fetch, client synthesis, type resolution
//! - **nsql-query** - SOAP invocation and record extraction
//! - **nsql-export** - Grid flattening and xlsx writing
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nsql_to_excel::{Pipeline, PpmCredentials, RunOptions};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let creds = PpmCredentials::from_env()?;
//!     let options = RunOptions::new("ppm.example.com", creds, "PRJ001")
//!         .with_filter("status = 'Active'");
//!
//!     let summary = Pipeline::new(options).run().await?;
//!     println!("{} rows written to {}", summary.rows, summary.path.display());
//!     Ok(())
//! }
//! ```

mod error;
mod options;
mod pipeline;

pub use error::{Error, PipelineErrorKind, PipelineState, Result, StageError};
pub use options::RunOptions;
pub use pipeline::Pipeline;

// Re-export all crates for convenient access
pub use nsql_auth as auth;
pub use nsql_client as client;
pub use nsql_export as export;
pub use nsql_query as query;
pub use nsql_wsdl as wsdl;

// Re-export commonly used types at the top level
pub use nsql_auth::{Credentials, PpmCredentials};
pub use nsql_client::{ClientConfig, LogContext};
pub use nsql_export::{ExportConfig, ExportSummary};

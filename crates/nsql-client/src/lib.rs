//! # nsql-client
//!
//! Transport layer shared by the NSQL query pipeline.
//!
//! This crate provides:
//! - [`HttpClient`], a thin wrapper over `reqwest` for fetching service
//!   descriptions and posting SOAP envelopes
//! - [`ClientConfig`] and its builder
//! - [`LogContext`], the logging context threaded through every stage
//! - XML escaping helpers in [`security`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use nsql_client::{ClientConfig, HttpClient, LogContext};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), nsql_client::Error> {
//!     let ctx = LogContext::new("PRJ001");
//!     let client = HttpClient::new(ClientConfig::default())?;
//!
//!     let response = client
//!         .get_text("https://ppm.example.com/niku/wsdl/Query/PRJ001?wsdl", &ctx)
//!         .await?;
//!     println!("{} bytes", response.body().len());
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod context;
mod error;
pub mod security;

pub use client::{HttpClient, Response};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use context::LogContext;
pub use error::{Error, ErrorKind, Result};

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("nsql-to-excel/", env!("CARGO_PKG_VERSION"));

//! # nsql-wsdl
//!
//! Service descriptions for Clarity PPM NSQL queries.
//!
//! A query's WSDL is fetched, parsed into a [`QueryDescriptor`], lowered
//! into a [`SynthesizedClient`] of typed definitions, and then resolved into
//! default instances of the request, authentication and service types.
//!
//! ## Example
//!
//! ```rust,ignore
//! use nsql_client::{HttpClient, LogContext};
//! use nsql_wsdl::{resolve, synthesize, DescriptorFetcher};
//!
//! let ctx = LogContext::new("PRJ001");
//! let fetcher = DescriptorFetcher::new(HttpClient::default_client()?);
//! let descriptor = fetcher.fetch("ppm.example.com", "PRJ001", &ctx).await?;
//! let client = synthesize(&descriptor, &ctx)?;
//! let resolved = resolve(client, "PRJ001", &ctx)?;
//! println!("endpoint: {:?}", resolved.service.endpoint());
//! ```

mod descriptor;
mod error;
mod fetch;
mod resolve;
mod schema;
mod synthesize;
mod value;
pub mod xml;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use descriptor::{
    BindingDecl, BindingOperationDecl, ComplexTypeDecl, ElementDecl, HeaderDecl, MaxOccurs,
    MessageDecl, OperationDecl, PartDecl, PortDecl, PortTypeDecl, QueryDescriptor, SchemaDecl,
    ServiceDecl, SimpleTypeDecl, SoapVersion,
};
pub use error::{Error, ErrorKind, Result};
pub use fetch::{description_url, DescriptorFetcher};
pub use resolve::{resolve, role_table, ResolvedClient, ServiceHandle, TypeRole};
pub use schema::{ArrayShape, ElementRef, FieldDef, FieldKind, OperationDef, ServiceDef, TypeDef};
pub use synthesize::{synthesize, DeclaredType, Diagnostic, Severity, SynthesizedClient};
pub use value::{parse_xsd_datetime, FieldBag, FieldValue, SetOutcome};

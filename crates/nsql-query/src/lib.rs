//! # nsql-query
//!
//! Authenticated invocation of a resolved NSQL query.
//!
//! The [`QueryInvoker`] copies credentials into the authentication header,
//! sets the query code and filter expression on the request, posts a SOAP
//! envelope to the service endpoint, and turns the returned `Records`
//! collection into a [`ResultSet`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use nsql_auth::PpmCredentials;
//! use nsql_query::QueryInvoker;
//!
//! let invoker = QueryInvoker::new(http);
//! let credentials = PpmCredentials::new("admin", "secret");
//! let records = invoker
//!     .invoke(&mut resolved, "PRJ001", &credentials, None, &ctx)
//!     .await?;
//! for record in &records {
//!     println!("{:?}", record.get("Name"));
//! }
//! ```

mod envelope;
mod error;
mod invoker;
mod response;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use envelope::build_envelope;
pub use error::{Error, ErrorKind, Result};
pub use invoker::{
    extract_records, prepare, QueryInvoker, CODE_FIELD, FILTER_EXPRESSION_FIELD, PASSWORD_FIELD,
    QUERY_OPERATION, RECORDS_FIELD, USERNAME_FIELD,
};
pub use response::{decode_response, parse_fault};
pub use types::{Record, ResultSet, SoapFault};

//! # nsql-auth
//!
//! Username/password credentials for Clarity PPM XOG query services.
//!
//! ## Security
//!
//! - The password is redacted in `Debug` output
//! - Error messages never include credential values
//!
//! ## Example
//!
//! ```rust
//! use nsql_auth::{Credentials, PpmCredentials};
//!
//! let creds = PpmCredentials::new("admin", "s3cret");
//! assert_eq!(creds.username(), "admin");
//! assert!(!format!("{creds:?}").contains("s3cret"));
//! ```

mod credentials;
mod error;

pub use credentials::{Credentials, PpmCredentials, PASSWORD_ENV, USER_ENV};
pub use error::{Error, ErrorKind, Result};

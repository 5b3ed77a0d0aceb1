//! Error types for nsql-wsdl.

use crate::synthesize::Diagnostic;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    pub kind: ErrorKind,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self { kind, source: Some(Box::new(source)) }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// The description could not be retrieved.
    #[error("Fetch error: {0}")]
    Fetch(String),
    /// The description was retrieved but is not a usable WSDL document.
    #[error("Parse error: {0}")]
    Parse(String),
    /// The description did not lower into an invocable client.
    #[error("Client synthesis failed with {} diagnostic(s)", diagnostics.len())]
    Compilation { diagnostics: Vec<Diagnostic> },
    /// A mandatory type was not found in the synthesized client.
    #[error("Resolution error: {0}")]
    Resolution(String),
}

impl From<nsql_client::Error> for Error {
    fn from(err: nsql_client::Error) -> Self {
        Error { kind: ErrorKind::Fetch(err.to_string()), source: Some(Box::new(err)) }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error {
            kind: ErrorKind::Fetch(format!("invalid description URL: {err}")),
            source: Some(Box::new(err)),
        }
    }
}

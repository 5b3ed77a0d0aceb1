//! Error types for nsql-query.

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
    /// The call failed or returned nothing usable.
    #[error("Invocation error: {0}")]
    Invocation(String),
    /// The service answered with a SOAP fault.
    #[error("SOAP fault: {0}")]
    SoapFault(String),
    /// The return value lacks an array-valued `Records` field.
    #[error("Schema error: {0}")]
    Schema(String),
    /// The record collection exists but is empty.
    #[error("Query returned no records: {0}")]
    EmptyResult(String),
}

impl From<nsql_client::Error> for Error {
    fn from(err: nsql_client::Error) -> Self {
        Error { kind: ErrorKind::Invocation(err.to_string()), source: Some(Box::new(err)) }
    }
}

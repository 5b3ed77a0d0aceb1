//! Pipeline error taxonomy.

use nsql_wsdl::Diagnostic;

pub type Result<T> = std::result::Result<T, Error>;

/// Where a run is, or where it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Fetching,
    Synthesizing,
    Resolving,
    Invoking,
    Exporting,
    Done,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PipelineState::Idle => "Idle",
            PipelineState::Fetching => "Fetching",
            PipelineState::Synthesizing => "Synthesizing",
            PipelineState::Resolving => "Resolving",
            PipelineState::Invoking => "Invoking",
            PipelineState::Exporting => "Exporting",
            PipelineState::Done => "Done",
            PipelineState::Failed => "Failed",
        };
        f.write_str(s)
    }
}

/// A failed run: what went wrong and the state it failed in.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    pub kind: PipelineErrorKind,
    pub state: PipelineState,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(state: PipelineState, kind: PipelineErrorKind) -> Self {
        Self { kind, state, source: None }
    }

    pub fn with_source(
        state: PipelineState,
        kind: PipelineErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self { kind, state, source: Some(Box::new(source)) }
    }

    /// Wrap a stage error raised in `state`.
    pub fn at(state: PipelineState, err: impl StageError) -> Self {
        Self { kind: err.pipeline_kind(), state, source: Some(Box::new(err)) }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PipelineErrorKind {
    #[error("Fetch error: {0}")]
    Fetch(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Compilation error: {} diagnostic(s)", diagnostics.len())]
    Compilation { diagnostics: Vec<Diagnostic> },
    #[error("Resolution error: {0}")]
    Resolution(String),
    #[error("Invocation error: {0}")]
    Invocation(String),
    #[error("Schema error: {0}")]
    Schema(String),
    #[error("Empty result: {0}")]
    EmptyResult(String),
    #[error("IO error: {0}")]
    Io(String),
    /// `run` was called on a pipeline that already reached a terminal state.
    /// Not raised by any stage.
    #[error("Pipeline already ran")]
    AlreadyRun,
}

/// An error from one of the pipeline's stage crates.
pub trait StageError: std::error::Error + Send + Sync + 'static {
    fn pipeline_kind(&self) -> PipelineErrorKind;
}

impl StageError for nsql_client::Error {
    fn pipeline_kind(&self) -> PipelineErrorKind {
        PipelineErrorKind::Fetch(self.to_string())
    }
}

impl StageError for nsql_wsdl::Error {
    fn pipeline_kind(&self) -> PipelineErrorKind {
        use nsql_wsdl::ErrorKind;
        match &self.kind {
            ErrorKind::Fetch(m) => PipelineErrorKind::Fetch(m.clone()),
            ErrorKind::Parse(m) => PipelineErrorKind::Parse(m.clone()),
            ErrorKind::Compilation { diagnostics } => PipelineErrorKind::Compilation {
                diagnostics: diagnostics.clone(),
            },
            ErrorKind::Resolution(m) => PipelineErrorKind::Resolution(m.clone()),
        }
    }
}

impl StageError for nsql_query::Error {
    fn pipeline_kind(&self) -> PipelineErrorKind {
        use nsql_query::ErrorKind;
        match &self.kind {
            ErrorKind::Invocation(m) => PipelineErrorKind::Invocation(m.clone()),
            ErrorKind::SoapFault(m) => PipelineErrorKind::Invocation(format!("SOAP fault: {m}")),
            ErrorKind::Schema(m) => PipelineErrorKind::Schema(m.clone()),
            ErrorKind::EmptyResult(m) => PipelineErrorKind::EmptyResult(m.clone()),
        }
    }
}

impl StageError for nsql_export::Error {
    fn pipeline_kind(&self) -> PipelineErrorKind {
        use nsql_export::ErrorKind;
        match &self.kind {
            ErrorKind::Schema(m) => PipelineErrorKind::Schema(m.clone()),
            ErrorKind::Io(m) | ErrorKind::Xml(m) | ErrorKind::Zip(m) => {
                PipelineErrorKind::Io(m.clone())
            }
        }
    }
}

impl StageError for nsql_auth::Error {
    fn pipeline_kind(&self) -> PipelineErrorKind {
        PipelineErrorKind::Invocation(self.to_string())
    }
}

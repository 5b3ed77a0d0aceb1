//! Logging context threaded through the pipeline.

use tracing::Span;

/// Logging context handed to every pipeline component.
///
/// Wraps a `tracing` span. Components emit events with
/// `parent: ctx.span()` instead of relying on whichever span happens to be
/// entered, so each log line carries the run and stage it belongs to.
#[derive(Debug, Clone)]
pub struct LogContext {
    span: Span,
}

impl LogContext {
    /// Root context for one run of the given query code.
    pub fn new(query_code: &str) -> Self {
        Self {
            span: tracing::info_span!("nsql", query = %query_code),
        }
    }

    /// A context that records nothing.
    pub fn disabled() -> Self {
        Self { span: Span::none() }
    }

    /// Child context for a named pipeline stage.
    pub fn stage(&self, stage: &'static str) -> Self {
        Self {
            span: tracing::info_span!(parent: &self.span, "stage", stage),
        }
    }

    /// The span events should be attached to.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Default for LogContext {
    fn default() -> Self {
        Self::disabled()
    }
}

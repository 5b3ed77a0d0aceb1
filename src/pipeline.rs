//! The fetch → synthesize → resolve → invoke → export run.

use nsql_client::{HttpClient, LogContext};
use nsql_export::{remove_existing, ExportSummary, XlsxExporter};
use nsql_query::QueryInvoker;
use nsql_wsdl::{resolve, synthesize, DescriptorFetcher};
use tracing::{debug, error, info};

use crate::error::{Error, PipelineErrorKind, PipelineState, Result};
use crate::options::RunOptions;

/// One run of a query through to a workbook.
///
/// A pipeline runs once. Stages execute strictly in order and the first
/// failure halts the run with the state it failed in.
#[derive(Debug)]
pub struct Pipeline {
    options: RunOptions,
    state: PipelineState,
    ctx: LogContext,
}

impl Pipeline {
    pub fn new(options: RunOptions) -> Self {
        let ctx = LogContext::new(&options.query_code);
        Self::with_context(options, ctx)
    }

    pub fn with_context(options: RunOptions, ctx: LogContext) -> Self {
        Self { options, state: PipelineState::Idle, ctx }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Run every stage and write the workbook.
    ///
    /// Ends in `Done` or `Failed`; either way exactly one terminal line is
    /// logged.
    pub async fn run(&mut self) -> Result<ExportSummary> {
        if self.state != PipelineState::Idle {
            return Err(Error::new(self.state, PipelineErrorKind::AlreadyRun));
        }

        match self.stages().await {
            Ok(summary) => {
                self.transition(PipelineState::Done);
                info!(
                    parent: self.ctx.span(),
                    path = %summary.path.display(),
                    rows = summary.rows,
                    columns = summary.columns,
                    "Export complete"
                );
                Ok(summary)
            }
            Err(err) => {
                self.state = PipelineState::Failed;
                error!(
                    parent: self.ctx.span(),
                    fatal = true,
                    state = %err.state,
                    error = %err,
                    "Export failed"
                );
                Err(err)
            }
        }
    }

    async fn stages(&mut self) -> Result<ExportSummary> {
        let output = self.options.output_path();
        let query_code = self.options.query_code.clone();

        // Previous workbook goes before any network call.
        if remove_existing(&output).map_err(|e| Error::at(self.state, e))? {
            debug!(parent: self.ctx.span(), path = %output.display(), "Removed previous export");
        }

        let http = HttpClient::new(self.options.client_config.clone())
            .map_err(|e| Error::at(self.state, e))?;

        self.transition(PipelineState::Fetching);
        let descriptor = DescriptorFetcher::new(http.clone())
            .fetch(&self.options.host, &query_code, &self.ctx.stage("fetch"))
            .await
            .map_err(|e| Error::at(self.state, e))?;

        self.transition(PipelineState::Synthesizing);
        let client = synthesize(&descriptor, &self.ctx.stage("synthesize"))
            .map_err(|e| Error::at(self.state, e))?;

        self.transition(PipelineState::Resolving);
        let mut resolved = resolve(client, &query_code, &self.ctx.stage("resolve"))
            .map_err(|e| Error::at(self.state, e))?;

        self.transition(PipelineState::Invoking);
        let result_set = QueryInvoker::new(http)
            .invoke(
                &mut resolved,
                &query_code,
                &self.options.credentials,
                self.options.filter(),
                &self.ctx.stage("invoke"),
            )
            .await
            .map_err(|e| Error::at(self.state, e))?;

        self.transition(PipelineState::Exporting);
        XlsxExporter::new(self.options.export_config.clone())
            .export(&result_set, &output, &self.ctx.stage("export"))
            .map_err(|e| Error::at(self.state, e))
    }

    fn transition(&mut self, next: PipelineState) {
        info!(parent: self.ctx.span(), from = %self.state, to = %next, "Pipeline state");
        self.state = next;
    }
}

//! Retrieving a query's service description.

use nsql_client::{HttpClient, LogContext};
use tracing::{debug, info};
use url::Url;

use crate::descriptor::QueryDescriptor;
use crate::error::{Error, ErrorKind, Result};

/// `https://{host}/niku/wsdl/Query/{code}?wsdl`
///
/// A host given with a scheme keeps it; a bare host gets `https`.
pub fn description_url(host: &str, query_code: &str) -> Result<Url> {
    let host = host.trim().trim_end_matches('/');
    let base = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{host}")
    };

    let mut url = Url::parse(&base)?;
    url.path_segments_mut()
        .map_err(|_| {
            Error::new(ErrorKind::Fetch(format!(
                "'{host}' cannot be used as a base URL"
            )))
        })?
        .pop_if_empty()
        .extend(["niku", "wsdl", "Query", query_code]);
    url.set_query(Some("wsdl"));

    Ok(url)
}

/// Downloads and parses query descriptions.
#[derive(Debug, Clone)]
pub struct DescriptorFetcher {
    http: HttpClient,
}

impl DescriptorFetcher {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Fetch the description of `query_code` from `host`.
    ///
    /// Network failures and non-success statuses are
    /// [`ErrorKind::Fetch`]; a body that is not a WSDL document is
    /// [`ErrorKind::Parse`].
    pub async fn fetch(
        &self,
        host: &str,
        query_code: &str,
        ctx: &LogContext,
    ) -> Result<QueryDescriptor> {
        let url = description_url(host, query_code)?;
        info!(parent: ctx.span(), url = %url, "Fetching query description");

        let response = self.http.get_text(url.as_str(), ctx).await?;
        if !response.is_success() {
            return Err(Error::new(ErrorKind::Fetch(format!(
                "HTTP {} retrieving {url}",
                response.status()
            ))));
        }

        let descriptor = QueryDescriptor::parse(response.body())?;
        debug!(
            parent: ctx.span(),
            schemas = descriptor.schemas.len(),
            services = descriptor.services.len(),
            bytes = response.body().len(),
            "Parsed query description"
        );

        Ok(descriptor)
    }
}

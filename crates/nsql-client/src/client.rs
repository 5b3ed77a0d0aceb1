//! HTTP client used for description fetches and SOAP calls.

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::context::LogContext;
use crate::error::{Error, ErrorKind, Result};

/// SOAP 1.1 request content type.
const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// HTTP client for the NSQL pipeline.
///
/// No retry policy is applied: every request is sent exactly once and the
/// first failure is reported to the caller.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    config: ClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .gzip(config.accept_compressed)
            .deflate(config.accept_compressed);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        let inner = builder
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self { inner, config })
    }

    /// Create a new HTTP client with default configuration.
    pub fn default_client() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// GET a text document.
    ///
    /// Non-success statuses are returned as a [`Response`], not as an error;
    /// only transport failures produce `Err`.
    pub async fn get_text(&self, url: &str, ctx: &LogContext) -> Result<Response> {
        if self.config.enable_tracing {
            debug!(parent: ctx.span(), method = "GET", url, "Sending request");
        }

        let response = self
            .inner
            .get(url)
            .header(ACCEPT, "text/xml, application/xml, */*")
            .send()
            .await?;

        self.read_response(response, ctx).await
    }

    /// POST a SOAP envelope with the given `SOAPAction`.
    pub async fn post_soap(
        &self,
        url: &str,
        soap_action: &str,
        envelope: String,
        ctx: &LogContext,
    ) -> Result<Response> {
        if self.config.enable_tracing {
            debug!(
                parent: ctx.span(),
                method = "POST",
                url,
                soap_action,
                body_len = envelope.len(),
                "Sending request"
            );
        }

        let response = self
            .inner
            .post(url)
            .header(CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .header("SOAPAction", format!("\"{}\"", soap_action))
            .body(envelope)
            .send()
            .await?;

        self.read_response(response, ctx).await
    }

    async fn read_response(
        &self,
        response: reqwest::Response,
        ctx: &LogContext,
    ) -> Result<Response> {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        if self.config.enable_tracing {
            if (200..300).contains(&status) {
                debug!(parent: ctx.span(), status, body_len = body.len(), "Response received");
            } else {
                info!(parent: ctx.span(), status, body_len = body.len(), "Non-success response");
            }
        }

        Ok(Response {
            status,
            content_type,
            body,
        })
    }
}

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    content_type: Option<String>,
    body: String,
}

impl Response {
    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Check if the response was successful (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Content-Type header, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Response body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Consume the response, returning the body.
    pub fn into_body(self) -> String {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client() -> HttpClient {
        HttpClient::new(ClientConfig::builder().with_tracing(false).build()).unwrap()
    }

    #[tokio::test]
    async fn test_client_creation() {
        let client = HttpClient::default_client().unwrap();
        assert!(client.config().accept_compressed);
    }

    #[tokio::test]
    async fn test_get_text() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/niku/wsdl/Query/PRJ001"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("<definitions/>", "text/xml"),
            )
            .mount(&mock_server)
            .await;

        let response = test_client()
            .get_text(
                &format!("{}/niku/wsdl/Query/PRJ001?wsdl", mock_server.uri()),
                &LogContext::disabled(),
            )
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.content_type(), Some("text/xml"));
        assert_eq!(response.body(), "<definitions/>");
    }

    #[tokio::test]
    async fn test_non_success_is_not_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
            .mount(&mock_server)
            .await;

        let response = test_client()
            .get_text(&format!("{}/missing", mock_server.uri()), &LogContext::disabled())
            .await
            .unwrap();

        assert_eq!(response.status(), 404);
        assert!(!response.is_success());
        assert_eq!(response.body(), "not here");
    }

    #[tokio::test]
    async fn test_post_soap_headers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/niku/xog"))
            .and(header("SOAPAction", "\"Query\""))
            .and(header("Content-Type", SOAP_CONTENT_TYPE))
            .and(body_string_contains("<Envelope/>"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<ok/>"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let response = test_client()
            .post_soap(
                &format!("{}/niku/xog", mock_server.uri()),
                "Query",
                "<Envelope/>".to_string(),
                &LogContext::disabled(),
            )
            .await
            .unwrap();

        assert_eq!(response.into_body(), "<ok/>");
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let err = test_client()
            .get_text("http://127.0.0.1:1/unreachable", &LogContext::disabled())
            .await
            .unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::Connection(_) | ErrorKind::Other(_)
        ));
    }
}

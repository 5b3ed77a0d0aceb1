//! Authenticated invocation of the query operation.

use nsql_auth::Credentials;
use nsql_client::security::xml;
use nsql_client::{HttpClient, LogContext};
use nsql_wsdl::{FieldBag, FieldValue, ResolvedClient, SetOutcome};
use tracing::{debug, info, trace};

use crate::envelope::build_envelope;
use crate::error::{Error, ErrorKind, Result};
use crate::response::{decode_response, parse_fault};
use crate::types::{Record, ResultSet};

/// Operation invoked on the service handle.
pub const QUERY_OPERATION: &str = "Query";
/// Record collection on the operation's return value.
pub const RECORDS_FIELD: &str = "Records";
pub const CODE_FIELD: &str = "Code";
pub const FILTER_EXPRESSION_FIELD: &str = "FilterExpression";
pub const USERNAME_FIELD: &str = "Username";
pub const PASSWORD_FIELD: &str = "Password";

/// Runs a resolved query against its service endpoint.
#[derive(Debug, Clone)]
pub struct QueryInvoker {
    http: HttpClient,
}

impl QueryInvoker {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Authenticate, call `Query`, and extract the returned records.
    ///
    /// `filter` of `None` is sent as the empty string. There are no retries.
    pub async fn invoke(
        &self,
        resolved: &mut ResolvedClient,
        query_code: &str,
        credentials: &dyn Credentials,
        filter: Option<&str>,
        ctx: &LogContext,
    ) -> Result<ResultSet> {
        prepare(resolved, query_code, credentials, filter, ctx);

        let result = self.call(resolved, ctx).await?.ok_or_else(|| {
            Error::new(ErrorKind::Invocation(format!(
                "{QUERY_OPERATION} returned no value"
            )))
        })?;

        extract_records(result, ctx)
    }

    async fn call(&self, resolved: &ResolvedClient, ctx: &LogContext) -> Result<Option<FieldBag>> {
        let service = &resolved.service;
        let operation = service.operation(QUERY_OPERATION).ok_or_else(|| {
            Error::new(ErrorKind::Invocation(format!(
                "service {} has no {QUERY_OPERATION} operation",
                service.name()
            )))
        })?;
        let endpoint = service.endpoint().ok_or_else(|| {
            Error::new(ErrorKind::Invocation(format!(
                "service {} declares no endpoint address",
                service.name()
            )))
        })?;
        if operation.input.type_name != resolved.request.type_name() {
            return Err(Error::new(ErrorKind::Invocation(format!(
                "{QUERY_OPERATION} expects {}, not {}",
                operation.input.type_name,
                resolved.request.type_name()
            ))));
        }

        let header = service.auth_header().zip(service.auth_value());
        let envelope = build_envelope(
            &resolved.client,
            header,
            (&operation.input, &resolved.request),
        );
        trace!(
            parent: ctx.span(),
            envelope = %xml::redact_element(&envelope, PASSWORD_FIELD),
            "Request envelope"
        );

        info!(parent: ctx.span(), operation = %operation.name, endpoint, "Invoking");
        let response = self
            .http
            .post_soap(endpoint, &operation.soap_action, envelope, ctx)
            .await?;
        trace!(
            parent: ctx.span(),
            status = response.status(),
            body = response.body(),
            "Response envelope"
        );

        if let Some(fault) = parse_fault(response.body()) {
            return Err(Error::with_source(ErrorKind::SoapFault(fault.to_string()), fault));
        }
        if !response.is_success() {
            return Err(Error::new(ErrorKind::Invocation(format!(
                "HTTP {} from {endpoint}",
                response.status()
            ))));
        }

        decode_response(response.body(), &operation.output, &resolved.client, ctx)
    }
}

/// Fill in authentication and request parameters.
///
/// Fields the synthesized types do not declare, or declare with another
/// kind, are skipped and logged at debug level.
pub fn prepare(
    resolved: &mut ResolvedClient,
    query_code: &str,
    credentials: &dyn Credentials,
    filter: Option<&str>,
    ctx: &LogContext,
) {
    let auth_type = resolved.auth.type_name().to_string();
    let outcome = resolved
        .auth
        .set(USERNAME_FIELD, FieldValue::text(credentials.username()));
    log_outcome(ctx, &auth_type, USERNAME_FIELD, outcome);
    let outcome = resolved
        .auth
        .set(PASSWORD_FIELD, FieldValue::text(credentials.password()));
    log_outcome(ctx, &auth_type, PASSWORD_FIELD, outcome);

    let outcome = resolved.service.attach_auth(resolved.auth.clone());
    log_outcome(ctx, resolved.service.name(), "auth header", outcome);

    let request_type = resolved.request.type_name().to_string();
    let outcome = resolved.request.set(CODE_FIELD, FieldValue::text(query_code));
    log_outcome(ctx, &request_type, CODE_FIELD, outcome);
    let outcome = resolved
        .request
        .set(FILTER_EXPRESSION_FIELD, FieldValue::text(filter.unwrap_or_default()));
    log_outcome(ctx, &request_type, FILTER_EXPRESSION_FIELD, outcome);
}

fn log_outcome(ctx: &LogContext, owner: &str, field: &str, outcome: SetOutcome) {
    match outcome {
        SetOutcome::Assigned => trace!(parent: ctx.span(), owner, field, "Assigned"),
        SetOutcome::NotPresent => {
            debug!(parent: ctx.span(), owner, field, "Field not present; assignment skipped")
        }
        SetOutcome::NotWritable => {
            debug!(parent: ctx.span(), owner, field, "Field not writable; assignment skipped")
        }
    }
}

/// Pull the record collection out of the operation's return value.
pub fn extract_records(result: FieldBag, ctx: &LogContext) -> Result<ResultSet> {
    let type_name = result.type_name().to_string();

    match result.kind_of(RECORDS_FIELD) {
        None => {
            return Err(Error::new(ErrorKind::Schema(format!(
                "{type_name} has no {RECORDS_FIELD} field"
            ))))
        }
        Some(kind) if !kind.is_array() => {
            return Err(Error::new(ErrorKind::Schema(format!(
                "{type_name}.{RECORDS_FIELD} is {kind}, not an array"
            ))))
        }
        Some(_) => {}
    }

    let items = match result
        .into_values()
        .into_iter()
        .find(|(name, _)| name == RECORDS_FIELD)
    {
        Some((_, FieldValue::Array(items))) => items,
        _ => {
            return Err(Error::new(ErrorKind::Schema(format!(
                "{type_name}.{RECORDS_FIELD} is absent from the response"
            ))))
        }
    };

    if items.is_empty() {
        return Err(Error::new(ErrorKind::EmptyResult(format!(
            "{type_name}.{RECORDS_FIELD} has no elements"
        ))));
    }

    let records = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            FieldValue::Complex(bag) => Ok(Record::from(bag)),
            _ => Err(Error::new(ErrorKind::Schema(format!(
                "{RECORDS_FIELD}[{index}] is not a structured record"
            )))),
        })
        .collect::<Result<Vec<_>>>()?;

    info!(parent: ctx.span(), records = records.len(), "Processing records");
    Ok(ResultSet::new(records))
}

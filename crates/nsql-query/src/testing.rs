//! SOAP response fixtures shaped like Clarity PPM query results.

use nsql_client::security::xml::escape;
use nsql_wsdl::xml::SOAP_ENV_NS;

const QUERY_NS: &str = "http://www.niku.com/xog/Query";

/// Wrap body content in a SOAP 1.1 envelope.
pub fn soap_response(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="{SOAP_ENV_NS}">
  <soapenv:Body>{body}</soapenv:Body>
</soapenv:Envelope>"#
    )
}

/// A `QueryResult` carrying one `Record` per entry of `records`.
///
/// An empty slice yields an empty `<Records/>` collection.
pub fn query_response(code: &str, records: &[&[(&str, &str)]]) -> String {
    let rows: String = records
        .iter()
        .map(|fields| {
            let cells: String = fields
                .iter()
                .map(|(name, value)| format!("<{name}>{}</{name}>", escape(value)))
                .collect();
            format!("<Record>{cells}</Record>")
        })
        .collect();

    soap_response(&format!(
        r#"<QueryResult xmlns="{QUERY_NS}"><Code>{}</Code><Records>{rows}</Records></QueryResult>"#,
        escape(code)
    ))
}

/// A `QueryResult` with no `Records` element at all.
pub fn query_response_without_records(code: &str) -> String {
    soap_response(&format!(
        r#"<QueryResult xmlns="{QUERY_NS}"><Code>{}</Code></QueryResult>"#,
        escape(code)
    ))
}

pub fn fault_response(code: &str, message: &str) -> String {
    soap_response(&format!(
        "<soapenv:Fault><faultcode>{}</faultcode><faultstring>{}</faultstring></soapenv:Fault>",
        escape(code),
        escape(message)
    ))
}

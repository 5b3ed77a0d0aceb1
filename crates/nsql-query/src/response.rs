//! Decoding SOAP responses into field bags.

use nsql_client::LogContext;
use nsql_wsdl::xml::{self, XmlElement, SOAP_ENV_NS};
use nsql_wsdl::{
    ArrayShape, ElementRef, FieldBag, FieldDef, FieldKind, FieldValue, SetOutcome,
    SynthesizedClient, TypeDef,
};
use tracing::{debug, warn};

use crate::error::{Error, ErrorKind, Result};
use crate::types::SoapFault;

/// Extract a SOAP fault from a response body, if it carries one.
pub fn parse_fault(body: &str) -> Option<SoapFault> {
    let root = xml::parse_document(body).ok()?;
    let fault = root.find(SOAP_ENV_NS, "Fault")?;
    Some(SoapFault {
        fault_code: fault
            .child("faultcode")
            .map(|c| c.text().trim().to_string())
            .unwrap_or_default(),
        fault_string: fault
            .child("faultstring")
            .map(|c| c.text().trim().to_string())
            .unwrap_or_else(|| "Unknown error".to_string()),
    })
}

/// Decode the `output` element of a response envelope.
///
/// `Ok(None)` if the body carries no such element.
pub fn decode_response(
    body: &str,
    output: &ElementRef,
    client: &SynthesizedClient,
    ctx: &LogContext,
) -> Result<Option<FieldBag>> {
    let root = xml::parse_document(body).map_err(|e| {
        Error::with_source(ErrorKind::Invocation(format!("response is not XML: {e}")), e)
    })?;

    if !root.is(SOAP_ENV_NS, "Envelope") {
        return Err(Error::new(ErrorKind::Invocation(format!(
            "response root is <{}>, not a SOAP envelope",
            root.local_name()
        ))));
    }
    let soap_body = root
        .children_ns(SOAP_ENV_NS, "Body")
        .next()
        .ok_or_else(|| {
            Error::new(ErrorKind::Invocation(
                "response envelope has no Body".to_string(),
            ))
        })?;

    if soap_body.children_ns(SOAP_ENV_NS, "Fault").next().is_some() {
        if let Some(fault) = parse_fault(body) {
            return Err(Error::with_source(ErrorKind::SoapFault(fault.to_string()), fault));
        }
    }

    let Some(element) = soap_body.child(&output.name) else {
        return Ok(None);
    };
    if element.is_nil() {
        return Ok(None);
    }

    let def = client.type_def(&output.type_name).ok_or_else(|| {
        Error::new(ErrorKind::Invocation(format!(
            "output type {} is not declared",
            output.type_name
        )))
    })?;

    let decoder = Decoder { client, ctx };
    Ok(Some(decoder.decode_bag(element, def)))
}

enum Decoded {
    Value(FieldValue),
    /// Wire text that did not parse as the field's kind.
    Raw(String),
}

struct Decoder<'a> {
    client: &'a SynthesizedClient,
    ctx: &'a LogContext,
}

impl Decoder<'_> {
    fn decode_bag(&self, element: &XmlElement, def: &TypeDef) -> FieldBag {
        let mut bag = FieldBag::default_for(def);

        for field in &def.fields {
            let outcome = match self.decode_field(element, field) {
                Decoded::Value(value) => bag.set(&field.name, value),
                Decoded::Raw(raw) => bag.set_raw(&field.name, raw),
            };
            if outcome != SetOutcome::Assigned {
                debug!(
                    parent: self.ctx.span(),
                    type_name = %def.name,
                    field = %field.name,
                    ?outcome,
                    "Decoded value not stored"
                );
            }
        }

        bag
    }

    fn decode_field(&self, parent: &XmlElement, field: &FieldDef) -> Decoded {
        match &field.kind {
            FieldKind::Array(shape) => {
                Decoded::Value(self.decode_array(parent, &field.name, shape))
            }
            kind => match parent.child(&field.name) {
                Some(element) => self.decode_single(element, kind, &field.name),
                None => Decoded::Value(FieldValue::Null),
            },
        }
    }

    fn decode_array(&self, parent: &XmlElement, name: &str, shape: &ArrayShape) -> FieldValue {
        match &shape.wrapper_item {
            Some(item_name) => match parent.child(name) {
                Some(wrapper) if !wrapper.is_nil() => {
                    self.decode_items(wrapper.children_named(item_name), shape, name)
                }
                _ => FieldValue::Null,
            },
            None => self.decode_items(parent.children_named(name), shape, name),
        }
    }

    fn decode_items<'e>(
        &self,
        items: impl Iterator<Item = &'e XmlElement>,
        shape: &ArrayShape,
        name: &str,
    ) -> FieldValue {
        FieldValue::Array(
            items
                .map(|item| match self.decode_single(item, &shape.item, name) {
                    Decoded::Value(value) => value,
                    // arrays stay homogeneous: unparseable items become Null
                    Decoded::Raw(_) => FieldValue::Null,
                })
                .collect(),
        )
    }

    fn decode_single(&self, element: &XmlElement, kind: &FieldKind, name: &str) -> Decoded {
        if element.is_nil() {
            return Decoded::Value(FieldValue::Null);
        }

        match kind {
            FieldKind::Complex(type_name) => match self.client.type_def(type_name) {
                Some(def) => Decoded::Value(FieldValue::Complex(self.decode_bag(element, def))),
                None => {
                    warn!(
                        parent: self.ctx.span(),
                        field = name,
                        type_name = %type_name,
                        "Undeclared type in response; value dropped"
                    );
                    Decoded::Value(FieldValue::Null)
                }
            },
            FieldKind::Array(shape) => match &shape.wrapper_item {
                Some(item_name) => Decoded::Value(self.decode_items(
                    element.children_named(item_name),
                    shape,
                    name,
                )),
                None => Decoded::Value(self.decode_items(std::iter::once(element), shape, name)),
            },
            scalar => {
                let raw = element.text();
                match FieldValue::parse_scalar(scalar, raw) {
                    Some(value) => Decoded::Value(value),
                    None if raw.trim().is_empty() => Decoded::Value(FieldValue::Null),
                    None => {
                        warn!(
                            parent: self.ctx.span(),
                            field = name,
                            kind = %scalar,
                            value = raw,
                            "Value does not parse as its declared kind; kept as text"
                        );
                        Decoded::Raw(raw.to_string())
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fault_response, query_response, soap_response};
    use nsql_wsdl::testing::{prj001_wsdl, query_wsdl, PRJ001_ENDPOINT};
    use nsql_wsdl::{synthesize, QueryDescriptor};

    fn client_for(doc: &str) -> SynthesizedClient {
        let descriptor = QueryDescriptor::parse(doc).unwrap();
        synthesize(&descriptor, &LogContext::disabled()).unwrap()
    }

    fn output_of(client: &SynthesizedClient) -> ElementRef {
        client.services()[0].operation("Query").unwrap().output.clone()
    }

    #[test]
    fn test_decode_records() {
        let client = client_for(&prj001_wsdl());
        let body = query_response(
            "PRJ001",
            &[&[("Name", "Acme"), ("Cost", "100")], &[("Name", "Beta"), ("Cost", "250")]],
        );

        let result = decode_response(&body, &output_of(&client), &client, &LogContext::disabled())
            .unwrap()
            .unwrap();

        assert_eq!(result.type_name(), "PRJ001QueryResult");
        assert_eq!(result.get("Code"), Some(&FieldValue::text("PRJ001")));

        let records = result.get("Records").unwrap().as_array().unwrap();
        assert_eq!(records.len(), 2);
        let FieldValue::Complex(first) = &records[0] else {
            panic!("record is not structured");
        };
        assert_eq!(first.get("Name"), Some(&FieldValue::text("Acme")));
        assert_eq!(first.get("Cost"), Some(&FieldValue::Number(100.0)));
    }

    #[test]
    fn test_decode_nil_and_absent_fields() {
        let client = client_for(&prj001_wsdl());
        let body = soap_response(
            r#"<QueryResult xmlns="http://www.niku.com/xog/Query"
                    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
                 <Code>PRJ001</Code>
                 <Records><Record><Name xsi:nil="true"/></Record></Records>
               </QueryResult>"#,
        );

        let result = decode_response(&body, &output_of(&client), &client, &LogContext::disabled())
            .unwrap()
            .unwrap();
        let records = result.get("Records").unwrap().as_array().unwrap();
        let FieldValue::Complex(record) = &records[0] else {
            panic!("record is not structured");
        };
        assert_eq!(record.get("Name"), Some(&FieldValue::Null));
        assert_eq!(record.get("Cost"), Some(&FieldValue::Null));
    }

    #[test]
    fn test_unparseable_scalar_kept_as_text() {
        let client = client_for(&prj001_wsdl());
        let body = query_response("PRJ001", &[&[("Name", "Acme"), ("Cost", "n/a")]]);

        let result = decode_response(&body, &output_of(&client), &client, &LogContext::disabled())
            .unwrap()
            .unwrap();
        let records = result.get("Records").unwrap().as_array().unwrap();
        let FieldValue::Complex(record) = &records[0] else {
            panic!("record is not structured");
        };
        assert_eq!(record.get("Cost"), Some(&FieldValue::text("n/a")));
    }

    #[test]
    fn test_decode_dates_and_booleans() {
        let doc = query_wsdl(
            "TSK001",
            PRJ001_ENDPOINT,
            &[("Finish", "dateTime"), ("Done", "boolean")],
        );
        let client = client_for(&doc);
        let body = query_response(
            "TSK001",
            &[&[("Finish", "2024-03-01T00:00:00"), ("Done", "true")]],
        );

        let result = decode_response(&body, &output_of(&client), &client, &LogContext::disabled())
            .unwrap()
            .unwrap();
        let records = result.get("Records").unwrap().as_array().unwrap();
        let FieldValue::Complex(record) = &records[0] else {
            panic!("record is not structured");
        };
        assert_eq!(record.get("Finish").unwrap().to_string(), "2024-03-01");
        assert_eq!(record.get("Done"), Some(&FieldValue::Boolean(true)));
    }

    #[test]
    fn test_missing_output_element() {
        let client = client_for(&prj001_wsdl());
        let body = soap_response("");
        let decoded =
            decode_response(&body, &output_of(&client), &client, &LogContext::disabled()).unwrap();
        assert!(decoded.is_none());
    }

    #[test]
    fn test_fault_is_reported() {
        let client = client_for(&prj001_wsdl());
        let body = fault_response("soapenv:Server", "Invalid NSQL: unknown column");

        let err = decode_response(&body, &output_of(&client), &client, &LogContext::disabled())
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::SoapFault(_)));
        assert!(err.to_string().contains("unknown column"));

        let fault = parse_fault(&body).unwrap();
        assert_eq!(fault.fault_code, "soapenv:Server");
    }

    #[test]
    fn test_non_envelope_is_invocation_error() {
        let client = client_for(&prj001_wsdl());
        let err = decode_response("<html/>", &output_of(&client), &client, &LogContext::disabled())
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Invocation(_)));

        let err =
            decode_response("not xml <", &output_of(&client), &client, &LogContext::disabled())
                .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Invocation(_)));
    }
}

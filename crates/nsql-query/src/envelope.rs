//! SOAP 1.1 document/literal request envelopes built from field bags.

use nsql_client::security::xml;
use nsql_wsdl::xml::SOAP_ENV_NS;
use nsql_wsdl::{ElementRef, FieldBag, FieldKind, FieldValue, SynthesizedClient};

/// Build a request envelope.
///
/// `header` goes in `soap:Header`, `body` in `soap:Body`. Fields holding
/// `Null` are omitted. Child elements take their type's namespace when the
/// declaring schema is `elementFormDefault="qualified"`.
pub fn build_envelope(
    client: &SynthesizedClient,
    header: Option<(&ElementRef, &FieldBag)>,
    body: (&ElementRef, &FieldBag),
) -> String {
    let mut writer = EnvelopeWriter {
        client,
        out: String::with_capacity(1024),
    };

    writer.out.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    writer.out.push('\n');
    writer.out.push_str(&format!(r#"<soap:Envelope xmlns:soap="{SOAP_ENV_NS}">"#));

    if let Some((element, bag)) = header {
        writer.out.push_str("<soap:Header>");
        writer.write_root(element, bag);
        writer.out.push_str("</soap:Header>");
    }

    writer.out.push_str("<soap:Body>");
    writer.write_root(body.0, body.1);
    writer.out.push_str("</soap:Body></soap:Envelope>");

    writer.out
}

struct EnvelopeWriter<'a> {
    client: &'a SynthesizedClient,
    out: String,
}

impl EnvelopeWriter<'_> {
    fn write_root(&mut self, element: &ElementRef, bag: &FieldBag) {
        let ns = element.namespace.as_deref();
        self.open(&element.name, ns, None);
        self.write_fields(bag, ns);
        self.close(&element.name);
    }

    /// `current` is the default namespace in scope at this point.
    fn write_fields(&mut self, bag: &FieldBag, current: Option<&str>) {
        let def = self.client.type_def(bag.type_name());
        let child_ns = match def {
            Some(def) if def.qualified => def.namespace.clone(),
            Some(_) => None,
            None => current.map(str::to_string),
        };

        for (name, kind, value) in bag.iter() {
            self.write_field(name, kind, value, child_ns.as_deref(), current);
        }
    }

    fn write_field(
        &mut self,
        name: &str,
        kind: &FieldKind,
        value: &FieldValue,
        ns: Option<&str>,
        current: Option<&str>,
    ) {
        match (value, kind) {
            (FieldValue::Null, _) => {}
            (FieldValue::Array(items), FieldKind::Array(shape)) => match &shape.wrapper_item {
                Some(item_name) => {
                    self.open(name, ns, current);
                    for item in items {
                        self.write_value(item_name, &shape.item, item, ns, ns);
                    }
                    self.close(name);
                }
                None => {
                    for item in items {
                        self.write_value(name, &shape.item, item, ns, current);
                    }
                }
            },
            _ => self.write_value(name, kind, value, ns, current),
        }
    }

    fn write_value(
        &mut self,
        name: &str,
        kind: &FieldKind,
        value: &FieldValue,
        ns: Option<&str>,
        current: Option<&str>,
    ) {
        match value {
            FieldValue::Null => {}
            FieldValue::Array(_) => self.write_field(name, kind, value, ns, current),
            FieldValue::Complex(bag) => {
                self.open(name, ns, current);
                self.write_fields(bag, ns);
                self.close(name);
            }
            scalar => {
                self.open(name, ns, current);
                if let Some(text) = scalar.to_wire() {
                    self.out.push_str(&xml::escape(&text));
                }
                self.close(name);
            }
        }
    }

    fn open(&mut self, name: &str, ns: Option<&str>, current: Option<&str>) {
        self.out.push('<');
        self.out.push_str(name);
        if ns != current {
            self.out.push_str(" xmlns=\"");
            self.out.push_str(&xml::escape(ns.unwrap_or("")));
            self.out.push('"');
        }
        self.out.push('>');
    }

    fn close(&mut self, name: &str) {
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }
}

//! Parsed WSDL 1.1 service description.
//!
//! A [`QueryDescriptor`] is a faithful, unvalidated picture of what the
//! document declares. Deciding whether those declarations add up to a
//! callable service is the synthesizer's job.

use crate::error::{Error, ErrorKind, Result};
use crate::xml::{self, QName, XmlElement, WSDL_NS, WSDL_SOAP12_NS, WSDL_SOAP_NS, XSD_NS};

/// The remote description of a named query's service and operation shape.
#[derive(Debug, Clone, Default)]
pub struct QueryDescriptor {
    /// `definitions/@name`, if present.
    pub name: Option<String>,
    /// `definitions/@targetNamespace`.
    pub target_namespace: String,
    /// Schemas declared under `types`.
    pub schemas: Vec<SchemaDecl>,
    pub messages: Vec<MessageDecl>,
    pub port_types: Vec<PortTypeDecl>,
    pub bindings: Vec<BindingDecl>,
    pub services: Vec<ServiceDecl>,
}

/// One `xsd:schema` block.
#[derive(Debug, Clone, Default)]
pub struct SchemaDecl {
    pub target_namespace: Option<String>,
    /// `elementFormDefault="qualified"`.
    pub qualified_elements: bool,
    pub complex_types: Vec<ComplexTypeDecl>,
    pub simple_types: Vec<SimpleTypeDecl>,
    /// Top-level element declarations.
    pub elements: Vec<ElementDecl>,
}

#[derive(Debug, Clone, Default)]
pub struct ComplexTypeDecl {
    /// Absent for anonymous types nested inside an element.
    pub name: Option<String>,
    /// `complexContent/extension/@base`.
    pub base: Option<QName>,
    /// Particles of the content model, flattened in document order.
    pub elements: Vec<ElementDecl>,
}

#[derive(Debug, Clone)]
pub struct SimpleTypeDecl {
    pub name: String,
    /// `restriction/@base`, if the type restricts another.
    pub base: Option<QName>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxOccurs {
    Bounded(u32),
    Unbounded,
}

impl MaxOccurs {
    /// True if more than one occurrence is allowed.
    pub fn is_repeated(self) -> bool {
        match self {
            MaxOccurs::Bounded(n) => n > 1,
            MaxOccurs::Unbounded => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ElementDecl {
    pub name: String,
    pub type_name: Option<QName>,
    /// `ref="tns:Other"` instead of a local declaration.
    pub reference: Option<QName>,
    pub inline_type: Option<Box<ComplexTypeDecl>>,
    pub min_occurs: u32,
    pub max_occurs: MaxOccurs,
    pub nillable: bool,
}

#[derive(Debug, Clone)]
pub struct MessageDecl {
    pub name: String,
    pub parts: Vec<PartDecl>,
}

#[derive(Debug, Clone)]
pub struct PartDecl {
    pub name: String,
    pub element: Option<QName>,
    pub type_name: Option<QName>,
}

#[derive(Debug, Clone)]
pub struct PortTypeDecl {
    pub name: String,
    pub operations: Vec<OperationDecl>,
}

#[derive(Debug, Clone)]
pub struct OperationDecl {
    pub name: String,
    /// Input message.
    pub input: Option<QName>,
    /// Output message.
    pub output: Option<QName>,
}

#[derive(Debug, Clone)]
pub struct BindingDecl {
    pub name: String,
    pub port_type: QName,
    /// SOAP version of the `soap:binding` element, if the binding has one.
    pub soap: Option<SoapVersion>,
    pub operations: Vec<BindingOperationDecl>,
}

/// Which WSDL SOAP extension a binding uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoapVersion {
    Soap11,
    Soap12,
}

#[derive(Debug, Clone)]
pub struct BindingOperationDecl {
    pub name: String,
    pub soap_action: Option<String>,
    /// `soap:header` entries of the input.
    pub input_headers: Vec<HeaderDecl>,
}

#[derive(Debug, Clone)]
pub struct HeaderDecl {
    pub message: QName,
    pub part: String,
}

#[derive(Debug, Clone)]
pub struct ServiceDecl {
    pub name: String,
    pub ports: Vec<PortDecl>,
}

#[derive(Debug, Clone)]
pub struct PortDecl {
    pub name: String,
    pub binding: QName,
    /// `soap:address/@location`.
    pub address: Option<String>,
}

impl QueryDescriptor {
    /// Parse a WSDL document.
    pub fn parse(document: &str) -> Result<Self> {
        let root = xml::parse_document(document)
            .map_err(|e| Error::with_source(ErrorKind::Parse(e.to_string()), e))?;

        if !root.is(WSDL_NS, "definitions") {
            return Err(Error::new(ErrorKind::Parse(format!(
                "expected a WSDL 1.1 definitions element, found <{}> in {}",
                root.local_name(),
                root.namespace().unwrap_or("no namespace")
            ))));
        }

        let mut descriptor = QueryDescriptor {
            name: root.attr("name").map(str::to_string),
            target_namespace: root.attr("targetNamespace").unwrap_or_default().to_string(),
            ..Default::default()
        };

        for types in root.children_ns(WSDL_NS, "types") {
            for schema in types.children_ns(XSD_NS, "schema") {
                descriptor.schemas.push(parse_schema(schema)?);
            }
        }

        for message in root.children_ns(WSDL_NS, "message") {
            descriptor.messages.push(MessageDecl {
                name: required_attr(message, "name")?,
                parts: message
                    .children_ns(WSDL_NS, "part")
                    .map(|part| {
                        Ok(PartDecl {
                            name: required_attr(part, "name")?,
                            element: part.attr("element").map(|v| part.resolve_qname(v)),
                            type_name: part.attr("type").map(|v| part.resolve_qname(v)),
                        })
                    })
                    .collect::<Result<_>>()?,
            });
        }

        for port_type in root.children_ns(WSDL_NS, "portType") {
            descriptor.port_types.push(PortTypeDecl {
                name: required_attr(port_type, "name")?,
                operations: port_type
                    .children_ns(WSDL_NS, "operation")
                    .map(|op| {
                        Ok(OperationDecl {
                            name: required_attr(op, "name")?,
                            input: message_ref(op, "input"),
                            output: message_ref(op, "output"),
                        })
                    })
                    .collect::<Result<_>>()?,
            });
        }

        for binding in root.children_ns(WSDL_NS, "binding") {
            descriptor.bindings.push(parse_binding(binding)?);
        }

        for service in root.children_ns(WSDL_NS, "service") {
            descriptor.services.push(ServiceDecl {
                name: required_attr(service, "name")?,
                ports: service
                    .children_ns(WSDL_NS, "port")
                    .map(|port| {
                        let binding = required_attr(port, "binding")?;
                        Ok(PortDecl {
                            name: required_attr(port, "name")?,
                            binding: port.resolve_qname(&binding),
                            address: soap_child(port, "address")
                                .and_then(|a| a.attr("location"))
                                .map(str::to_string),
                        })
                    })
                    .collect::<Result<_>>()?,
            });
        }

        Ok(descriptor)
    }

    /// All top-level complex types across schemas.
    pub fn complex_types(&self) -> impl Iterator<Item = &ComplexTypeDecl> {
        self.schemas.iter().flat_map(|s| s.complex_types.iter())
    }

    pub fn message(&self, name: &QName) -> Option<&MessageDecl> {
        self.messages.iter().find(|m| m.name == name.local)
    }

    pub fn port_type(&self, name: &QName) -> Option<&PortTypeDecl> {
        self.port_types.iter().find(|p| p.name == name.local)
    }

    pub fn binding(&self, name: &QName) -> Option<&BindingDecl> {
        self.bindings.iter().find(|b| b.name == name.local)
    }
}

fn parse_schema(schema: &XmlElement) -> Result<SchemaDecl> {
    let mut decl = SchemaDecl {
        target_namespace: schema.attr("targetNamespace").map(str::to_string),
        qualified_elements: schema.attr("elementFormDefault") == Some("qualified"),
        ..Default::default()
    };

    for child in schema.children() {
        if child.namespace() != Some(XSD_NS) {
            continue;
        }
        match child.local_name() {
            "complexType" => decl.complex_types.push(parse_complex_type(child)?),
            "simpleType" => decl.simple_types.push(SimpleTypeDecl {
                name: required_attr(child, "name")?,
                base: child
                    .child("restriction")
                    .and_then(|r| r.attr("base").map(|b| r.resolve_qname(b))),
            }),
            "element" => decl.elements.push(parse_element(child)?),
            _ => {}
        }
    }

    Ok(decl)
}

fn parse_complex_type(node: &XmlElement) -> Result<ComplexTypeDecl> {
    let mut decl = ComplexTypeDecl {
        name: node.attr("name").map(str::to_string),
        ..Default::default()
    };

    let content = match node.child("complexContent").and_then(|c| c.child("extension")) {
        Some(extension) => {
            decl.base = extension.attr("base").map(|b| extension.resolve_qname(b));
            extension
        }
        None => node,
    };

    collect_particles(content, &mut decl.elements)?;
    Ok(decl)
}

/// Flatten `sequence`/`all`/`choice` nesting into a single ordered list.
fn collect_particles(node: &XmlElement, out: &mut Vec<ElementDecl>) -> Result<()> {
    for child in node.children() {
        if child.namespace() != Some(XSD_NS) {
            continue;
        }
        match child.local_name() {
            "sequence" | "all" | "choice" => collect_particles(child, out)?,
            "element" => out.push(parse_element(child)?),
            _ => {}
        }
    }
    Ok(())
}

fn parse_element(node: &XmlElement) -> Result<ElementDecl> {
    let reference = node.attr("ref").map(|r| node.resolve_qname(r));
    let name = match (node.attr("name"), &reference) {
        (Some(name), _) => name.to_string(),
        (None, Some(r)) => r.local.clone(),
        (None, None) => {
            return Err(Error::new(ErrorKind::Parse(
                "xsd:element without name or ref".to_string(),
            )))
        }
    };

    let min_occurs = match node.attr("minOccurs") {
        Some(v) => v.trim().parse().map_err(|_| {
            Error::new(ErrorKind::Parse(format!("invalid minOccurs '{v}' on {name}")))
        })?,
        None => 1,
    };
    let max_occurs = match node.attr("maxOccurs").map(str::trim) {
        Some("unbounded") => MaxOccurs::Unbounded,
        Some(v) => MaxOccurs::Bounded(v.parse().map_err(|_| {
            Error::new(ErrorKind::Parse(format!("invalid maxOccurs '{v}' on {name}")))
        })?),
        None => MaxOccurs::Bounded(1),
    };

    let inline_type = node
        .children_ns(XSD_NS, "complexType")
        .next()
        .map(parse_complex_type)
        .transpose()?
        .map(Box::new);

    Ok(ElementDecl {
        type_name: node.attr("type").map(|t| node.resolve_qname(t)),
        reference,
        inline_type,
        min_occurs,
        max_occurs,
        nillable: matches!(node.attr("nillable"), Some("true") | Some("1")),
        name,
    })
}

fn parse_binding(binding: &XmlElement) -> Result<BindingDecl> {
    let port_type = required_attr(binding, "type")?;

    let operations = binding
        .children_ns(WSDL_NS, "operation")
        .map(|op| {
            let soap_action = soap_child(op, "operation")
                .and_then(|o| o.attr("soapAction"))
                .map(str::to_string);

            let input_headers = op
                .children_ns(WSDL_NS, "input")
                .flat_map(|input| input.children().iter())
                .filter(|h| is_soap(h, "header"))
                .filter_map(|h| {
                    let message = h.attr("message")?;
                    Some(HeaderDecl {
                        message: h.resolve_qname(message),
                        part: h.attr("part")?.to_string(),
                    })
                })
                .collect();

            Ok(BindingOperationDecl {
                name: required_attr(op, "name")?,
                soap_action,
                input_headers,
            })
        })
        .collect::<Result<_>>()?;

    Ok(BindingDecl {
        name: required_attr(binding, "name")?,
        port_type: binding.resolve_qname(&port_type),
        soap: soap_version(binding),
        operations,
    })
}

fn soap_version(binding: &XmlElement) -> Option<SoapVersion> {
    binding.children().iter().find_map(|c| {
        if c.is(WSDL_SOAP_NS, "binding") {
            Some(SoapVersion::Soap11)
        } else if c.is(WSDL_SOAP12_NS, "binding") {
            Some(SoapVersion::Soap12)
        } else {
            None
        }
    })
}

fn is_soap(node: &XmlElement, local: &str) -> bool {
    node.is(WSDL_SOAP_NS, local) || node.is(WSDL_SOAP12_NS, local)
}

fn soap_child<'a>(node: &'a XmlElement, local: &str) -> Option<&'a XmlElement> {
    node.children().iter().find(|c| is_soap(c, local))
}

fn message_ref(op: &XmlElement, direction: &str) -> Option<QName> {
    let io = op.children_ns(WSDL_NS, direction).next()?;
    io.attr("message").map(|m| io.resolve_qname(m))
}

fn required_attr(node: &XmlElement, name: &str) -> Result<String> {
    node.attr(name).map(str::to_string).ok_or_else(|| {
        Error::new(ErrorKind::Parse(format!(
            "<{}> is missing required attribute '{}'",
            node.local_name(),
            name
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::prj001_wsdl;

    #[test]
    fn test_parse_query_wsdl() {
        let descriptor = QueryDescriptor::parse(&prj001_wsdl()).unwrap();

        assert_eq!(descriptor.target_namespace, "http://www.niku.com/xog/Query");
        assert_eq!(descriptor.schemas.len(), 1);
        let schema = &descriptor.schemas[0];
        assert!(schema.qualified_elements);

        let names: Vec<_> = schema
            .complex_types
            .iter()
            .filter_map(|t| t.name.as_deref())
            .collect();
        assert!(names.contains(&"Auth"));
        assert!(names.contains(&"PRJ001Query"));
        assert!(names.contains(&"PRJ001Record"));

        let records = schema
            .complex_types
            .iter()
            .find(|t| t.name.as_deref() == Some("PRJ001Records"))
            .unwrap();
        assert_eq!(records.elements.len(), 1);
        assert_eq!(records.elements[0].max_occurs, MaxOccurs::Unbounded);
        assert_eq!(records.elements[0].min_occurs, 0);

        let binding = &descriptor.bindings[0];
        assert_eq!(binding.soap, Some(SoapVersion::Soap11));
        let op = &binding.operations[0];
        assert_eq!(op.name, "Query");
        assert_eq!(op.soap_action.as_deref(), Some("http://www.niku.com/xog/Query/Query"));
        assert_eq!(op.input_headers.len(), 1);
        assert_eq!(op.input_headers[0].part, "Auth");

        let service = &descriptor.services[0];
        assert_eq!(service.name, "PRJ001QueryService");
        assert_eq!(service.ports[0].address.as_deref(), Some("http://ppm.example.com/niku/xog"));
    }

    #[test]
    fn test_element_type_references_resolve() {
        let descriptor = QueryDescriptor::parse(&prj001_wsdl()).unwrap();
        let query_element = descriptor.schemas[0]
            .elements
            .iter()
            .find(|e| e.name == "Query")
            .unwrap();
        assert_eq!(
            query_element.type_name,
            Some(QName::new(Some("http://www.niku.com/xog/Query"), "PRJ001Query"))
        );
    }

    #[test]
    fn test_non_wsdl_root_is_parse_error() {
        let err = QueryDescriptor::parse("<html><body>Login</body></html>").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Parse(_)));
        assert!(err.to_string().contains("definitions"));
    }

    #[test]
    fn test_malformed_xml_is_parse_error() {
        let err = QueryDescriptor::parse("<definitions><types>").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Parse(_)));
    }

    #[test]
    fn test_invalid_occurs_is_parse_error() {
        let doc = r#"<definitions xmlns="http://schemas.xmlsoap.org/wsdl/"
                xmlns:xsd="http://www.w3.org/2001/XMLSchema">
            <types><xsd:schema><xsd:complexType name="T"><xsd:sequence>
                <xsd:element name="a" type="xsd:string" maxOccurs="many"/>
            </xsd:sequence></xsd:complexType></xsd:schema></types>
        </definitions>"#;
        let err = QueryDescriptor::parse(doc).unwrap_err();
        assert!(err.to_string().contains("maxOccurs"));
    }
}

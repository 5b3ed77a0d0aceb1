//! Client synthesis: lower a [`QueryDescriptor`] into typed definitions.
//!
//! Nothing is generated or compiled. Every named complex type becomes a
//! [`TypeDef`], every usable SOAP port becomes a [`ServiceDef`], and the
//! invoker marshals [`FieldBag`](crate::FieldBag)s against those shapes at
//! call time.

use nsql_client::LogContext;
use tracing::{error, info, warn};

use crate::descriptor::{
    ComplexTypeDecl, ElementDecl, QueryDescriptor, SchemaDecl, SimpleTypeDecl, SoapVersion,
};
use crate::error::{Error, ErrorKind, Result};
use crate::schema::{ArrayShape, ElementRef, FieldDef, FieldKind, OperationDef, ServiceDef, TypeDef};
use crate::xml::{QName, XSD_NS};

/// Nesting limit for base types, simple type chains and array wrappers.
const MAX_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A message produced while lowering the description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.severity {
            Severity::Warning => write!(f, "warning: {}", self.message),
            Severity::Error => write!(f, "error: {}", self.message),
        }
    }
}

/// A type the synthesized client declares, as seen by the resolver.
#[derive(Debug, Clone, Copy)]
pub enum DeclaredType<'a> {
    Service(&'a ServiceDef),
    Complex(&'a TypeDef),
}

impl DeclaredType<'_> {
    pub fn name(&self) -> &str {
        match self {
            DeclaredType::Service(s) => &s.name,
            DeclaredType::Complex(t) => &t.name,
        }
    }
}

/// The per-run, in-memory client built from a service description.
#[derive(Debug, Clone)]
pub struct SynthesizedClient {
    types: Vec<TypeDef>,
    services: Vec<ServiceDef>,
    warnings: Vec<Diagnostic>,
}

impl SynthesizedClient {
    pub fn types(&self) -> &[TypeDef] {
        &self.types
    }

    pub fn services(&self) -> &[ServiceDef] {
        &self.services
    }

    /// Non-fatal diagnostics from synthesis.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn type_def(&self, name: &str) -> Option<&TypeDef> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Services first, then complex types, each in declaration order.
    pub fn declared_types(&self) -> impl Iterator<Item = DeclaredType<'_>> {
        self.services
            .iter()
            .map(DeclaredType::Service)
            .chain(self.types.iter().map(DeclaredType::Complex))
    }
}

/// Lower a descriptor into an invocable client.
///
/// Warnings are logged and kept on the client. If any error-level
/// diagnostic is raised, synthesis fails with
/// [`ErrorKind::Compilation`] carrying every diagnostic.
pub fn synthesize(descriptor: &QueryDescriptor, ctx: &LogContext) -> Result<SynthesizedClient> {
    let mut synth = Synthesizer::new(descriptor);
    synth.lower_named_types();
    let services = synth.lower_services();

    for diagnostic in &synth.diagnostics {
        match diagnostic.severity {
            Severity::Warning => warn!(parent: ctx.span(), "{}", diagnostic.message),
            Severity::Error => error!(parent: ctx.span(), "{}", diagnostic.message),
        }
    }

    let failed = synth
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    if failed > 0 {
        error!(
            parent: ctx.span(),
            errors = failed,
            total = synth.diagnostics.len(),
            "Client synthesis failed"
        );
        return Err(Error::new(ErrorKind::Compilation {
            diagnostics: synth.diagnostics,
        }));
    }

    info!(
        parent: ctx.span(),
        types = synth.types.len(),
        services = services.len(),
        warnings = synth.diagnostics.len(),
        "Synthesized client"
    );

    Ok(SynthesizedClient {
        types: synth.types,
        services,
        warnings: synth.diagnostics,
    })
}

struct Synthesizer<'d> {
    descriptor: &'d QueryDescriptor,
    complex: Vec<(QName, &'d ComplexTypeDecl, &'d SchemaDecl)>,
    simple: Vec<(QName, &'d SimpleTypeDecl)>,
    elements: Vec<(QName, &'d ElementDecl, &'d SchemaDecl)>,
    types: Vec<TypeDef>,
    diagnostics: Vec<Diagnostic>,
}

impl<'d> Synthesizer<'d> {
    fn new(descriptor: &'d QueryDescriptor) -> Self {
        let mut complex = Vec::new();
        let mut simple = Vec::new();
        let mut elements = Vec::new();

        for schema in &descriptor.schemas {
            let ns = schema.target_namespace.as_deref();
            for ct in &schema.complex_types {
                if let Some(name) = &ct.name {
                    complex.push((QName::new(ns, name.clone()), ct, schema));
                }
            }
            for st in &schema.simple_types {
                simple.push((QName::new(ns, st.name.clone()), st));
            }
            for el in &schema.elements {
                elements.push((QName::new(ns, el.name.clone()), el, schema));
            }
        }

        Self {
            descriptor,
            complex,
            simple,
            elements,
            types: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn warning(&mut self, message: String) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            message,
        });
    }

    fn error(&mut self, message: String) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Error,
            message,
        });
    }

    // Exact QName first, then local name: many descriptions omit the
    // schema targetNamespace while still prefixing references.

    fn find_complex(&self, name: &QName) -> Option<(&'d ComplexTypeDecl, &'d SchemaDecl)> {
        self.complex
            .iter()
            .find(|(q, _, _)| q == name)
            .or_else(|| self.complex.iter().find(|(q, _, _)| q.local == name.local))
            .map(|&(_, decl, schema)| (decl, schema))
    }

    fn find_simple(&self, name: &QName) -> Option<&'d SimpleTypeDecl> {
        self.simple
            .iter()
            .find(|(q, _)| q == name)
            .or_else(|| self.simple.iter().find(|(q, _)| q.local == name.local))
            .map(|&(_, decl)| decl)
    }

    fn find_element(&self, name: &QName) -> Option<(&'d ElementDecl, &'d SchemaDecl)> {
        self.elements
            .iter()
            .find(|(q, _, _)| q == name)
            .or_else(|| self.elements.iter().find(|(q, _, _)| q.local == name.local))
            .map(|&(_, decl, schema)| (decl, schema))
    }

    fn lower_named_types(&mut self) {
        let named: Vec<_> = self
            .complex
            .iter()
            .map(|(q, decl, schema)| (q.local.clone(), *decl, *schema))
            .collect();

        for (name, decl, schema) in named {
            let def = self.lower_complex(name, decl, schema);
            self.types.push(def);
        }
    }

    fn lower_complex(
        &mut self,
        name: String,
        decl: &'d ComplexTypeDecl,
        schema: &'d SchemaDecl,
    ) -> TypeDef {
        let mut fields = Vec::new();
        self.collect_fields(&name, decl, schema, &mut fields, 0);
        TypeDef {
            name,
            namespace: schema.target_namespace.clone(),
            qualified: schema.qualified_elements,
            fields,
        }
    }

    fn collect_fields(
        &mut self,
        owner: &str,
        decl: &'d ComplexTypeDecl,
        schema: &'d SchemaDecl,
        out: &mut Vec<FieldDef>,
        depth: usize,
    ) {
        if let Some(base) = &decl.base {
            if depth >= MAX_DEPTH {
                self.warning(format!("{owner}: base type chain too deep at {base}"));
            } else if let Some((base_decl, base_schema)) = self.find_complex(base) {
                self.collect_fields(owner, base_decl, base_schema, out, depth + 1);
            } else {
                self.warning(format!(
                    "{owner}: base type {base} is not declared; its fields are skipped"
                ));
            }
        }

        for element in &decl.elements {
            let field = self.lower_field(owner, element, schema, depth);
            out.push(field);
        }
    }

    fn lower_field(
        &mut self,
        owner: &str,
        element: &'d ElementDecl,
        schema: &'d SchemaDecl,
        depth: usize,
    ) -> FieldDef {
        let (target, target_schema) = match &element.reference {
            Some(reference) => match self.find_element(reference) {
                Some(found) => found,
                None => {
                    self.warning(format!(
                        "{owner}.{}: referenced element {reference} is not declared; treating as text",
                        element.name
                    ));
                    return FieldDef {
                        name: element.name.clone(),
                        kind: FieldKind::Text,
                        optional: true,
                    };
                }
            },
            None => (element, schema),
        };

        let kind = self.element_kind(owner, target, target_schema, depth);
        let kind = if element.max_occurs.is_repeated() {
            FieldKind::Array(ArrayShape {
                item: Box::new(kind),
                wrapper_item: None,
            })
        } else {
            kind
        };

        FieldDef {
            name: element.name.clone(),
            kind,
            optional: element.min_occurs == 0 || target.nillable,
        }
    }

    fn element_kind(
        &mut self,
        owner: &str,
        element: &'d ElementDecl,
        schema: &'d SchemaDecl,
        depth: usize,
    ) -> FieldKind {
        if depth >= MAX_DEPTH {
            self.warning(format!(
                "{owner}.{}: type nesting too deep; treating as text",
                element.name
            ));
            return FieldKind::Text;
        }

        if let Some(inline) = &element.inline_type {
            // anonymous types are named after their owner and element
            let name = format!("{owner}{}", element.name);
            if let Some(shape) = self.array_wrapper(&name, inline, schema, depth + 1) {
                return FieldKind::Array(shape);
            }
            let def = self.lower_complex(name.clone(), inline, schema);
            self.types.push(def);
            return FieldKind::Complex(name);
        }

        let Some(type_name) = &element.type_name else {
            return FieldKind::Text;
        };

        if type_name.is_in(XSD_NS) {
            return self.builtin_kind(owner, &element.name, &type_name.local);
        }

        if let Some((decl, decl_schema)) = self.find_complex(type_name) {
            if let Some(shape) =
                self.array_wrapper(&type_name.local, decl, decl_schema, depth + 1)
            {
                return FieldKind::Array(shape);
            }
            return FieldKind::Complex(type_name.local.clone());
        }

        if let Some(simple) = self.find_simple(type_name) {
            return self.simple_kind(owner, &element.name, simple, depth + 1);
        }

        self.warning(format!(
            "{owner}.{}: type {type_name} is not declared; treating as text",
            element.name
        ));
        FieldKind::Text
    }

    /// A type whose whole content is one repeated element is an array of
    /// that element.
    fn array_wrapper(
        &mut self,
        name: &str,
        decl: &'d ComplexTypeDecl,
        schema: &'d SchemaDecl,
        depth: usize,
    ) -> Option<ArrayShape> {
        if decl.base.is_some() || decl.elements.len() != 1 {
            return None;
        }
        let item = &decl.elements[0];
        if !item.max_occurs.is_repeated() {
            return None;
        }

        let (target, target_schema) = match &item.reference {
            Some(reference) => self.find_element(reference)?,
            None => (item, schema),
        };
        let item_kind = self.element_kind(name, target, target_schema, depth);

        Some(ArrayShape {
            item: Box::new(item_kind),
            wrapper_item: Some(item.name.clone()),
        })
    }

    fn simple_kind(
        &mut self,
        owner: &str,
        field: &str,
        simple: &'d SimpleTypeDecl,
        depth: usize,
    ) -> FieldKind {
        let Some(base) = &simple.base else {
            return FieldKind::Text;
        };
        if base.is_in(XSD_NS) {
            return self.builtin_kind(owner, field, &base.local);
        }
        if depth >= MAX_DEPTH {
            return FieldKind::Text;
        }
        match self.find_simple(base) {
            Some(next) => self.simple_kind(owner, field, next, depth + 1),
            None => FieldKind::Text,
        }
    }

    fn builtin_kind(&mut self, owner: &str, field: &str, local: &str) -> FieldKind {
        match local {
            "string" | "normalizedString" | "token" | "anyURI" | "QName" | "NCName" | "Name"
            | "language" | "ID" | "IDREF" | "NMTOKEN" | "time" | "duration" | "base64Binary"
            | "hexBinary" | "gYear" | "gYearMonth" | "gMonth" | "gMonthDay" | "gDay"
            | "anyType" | "anySimpleType" => FieldKind::Text,
            "decimal" | "integer" | "int" | "long" | "short" | "byte" | "double" | "float"
            | "nonNegativeInteger" | "positiveInteger" | "negativeInteger"
            | "nonPositiveInteger" | "unsignedLong" | "unsignedInt" | "unsignedShort"
            | "unsignedByte" => FieldKind::Number,
            "date" | "dateTime" => FieldKind::Date,
            "boolean" => FieldKind::Boolean,
            other => {
                self.warning(format!(
                    "{owner}.{field}: unsupported builtin type xsd:{other}; treating as text"
                ));
                FieldKind::Text
            }
        }
    }

    fn lower_services(&mut self) -> Vec<ServiceDef> {
        let descriptor = self.descriptor;
        let mut services = Vec::new();

        if descriptor.services.is_empty() {
            self.error("the description declares no service".to_string());
        }

        for service in &descriptor.services {
            let mut lowered: Option<ServiceDef> = None;

            for port in &service.ports {
                let Some(binding) = descriptor.binding(&port.binding) else {
                    self.error(format!(
                        "port {} of service {} references undeclared binding {}",
                        port.name, service.name, port.binding
                    ));
                    continue;
                };
                match binding.soap {
                    Some(SoapVersion::Soap11) => {}
                    Some(SoapVersion::Soap12) => {
                        self.warning(format!(
                            "port {} of service {} is a SOAP 1.2 binding; skipped",
                            port.name, service.name
                        ));
                        continue;
                    }
                    None => {
                        self.warning(format!(
                            "port {} of service {} is not a SOAP binding; skipped",
                            port.name, service.name
                        ));
                        continue;
                    }
                }
                let Some(port_type) = descriptor.port_type(&binding.port_type) else {
                    self.error(format!(
                        "binding {} references undeclared port type {}",
                        binding.name, binding.port_type
                    ));
                    continue;
                };
                if lowered.is_some() {
                    continue;
                }

                if port.address.is_none() {
                    self.warning(format!(
                        "port {} of service {} has no soap:address; it cannot be invoked",
                        port.name, service.name
                    ));
                }

                let mut operations = Vec::new();
                let mut auth_header = None;

                for op in &port_type.operations {
                    let bound = binding.operations.iter().find(|b| b.name == op.name);
                    let input = self.message_element(
                        &service.name,
                        &op.name,
                        "input",
                        op.input.as_ref(),
                    );
                    let output = self.message_element(
                        &service.name,
                        &op.name,
                        "output",
                        op.output.as_ref(),
                    );

                    if auth_header.is_none() {
                        if let Some(header) = bound.and_then(|b| b.input_headers.first()) {
                            auth_header =
                                self.header_element(&op.name, &header.message, &header.part);
                        }
                    }

                    if let (Some(input), Some(output)) = (input, output) {
                        operations.push(OperationDef {
                            name: op.name.clone(),
                            soap_action: bound
                                .and_then(|b| b.soap_action.clone())
                                .unwrap_or_default(),
                            input,
                            output,
                        });
                    }
                }

                if auth_header.is_none() {
                    self.warning(format!(
                        "service {} declares no SOAP header; authentication cannot be attached",
                        service.name
                    ));
                }

                lowered = Some(ServiceDef {
                    name: service.name.clone(),
                    endpoint: port.address.clone(),
                    auth_header,
                    operations,
                });
            }

            match lowered {
                Some(def) => services.push(def),
                None => self.error(format!("service {} has no usable SOAP port", service.name)),
            }
        }

        services
    }

    fn message_element(
        &mut self,
        service: &str,
        operation: &str,
        direction: &str,
        message: Option<&QName>,
    ) -> Option<ElementRef> {
        let descriptor = self.descriptor;
        let Some(message_name) = message else {
            self.error(format!(
                "operation {operation} of {service} declares no {direction} message"
            ));
            return None;
        };
        let Some(message) = descriptor.message(message_name) else {
            self.error(format!(
                "{direction} message {message_name} of operation {operation} is not declared"
            ));
            return None;
        };
        let Some(part) = message.parts.first() else {
            self.error(format!("message {} has no parts", message.name));
            return None;
        };
        let Some(element) = &part.element else {
            self.error(format!(
                "part {} of message {} is not an element part; only document/literal is supported",
                part.name, message.name
            ));
            return None;
        };

        let resolved = self.element_ref(element);
        if resolved.is_none() {
            self.error(format!(
                "element {element} of message {} is not declared as a complex type",
                message.name
            ));
        }
        resolved
    }

    fn header_element(
        &mut self,
        operation: &str,
        message: &QName,
        part_name: &str,
    ) -> Option<ElementRef> {
        let descriptor = self.descriptor;
        let element = descriptor
            .message(message)
            .and_then(|m| m.parts.iter().find(|p| p.name == part_name))
            .and_then(|p| p.element.as_ref());

        let resolved = element.and_then(|e| self.element_ref(e));
        if resolved.is_none() {
            self.warning(format!(
                "operation {operation}: header part {part_name} of message {message} cannot be resolved"
            ));
        }
        resolved
    }

    /// A top-level element whose content is a lowered complex type.
    fn element_ref(&mut self, name: &QName) -> Option<ElementRef> {
        let (decl, schema) = self.find_element(name)?;

        let type_name = match (&decl.inline_type, &decl.type_name) {
            (Some(inline), _) => {
                if self.types.iter().all(|t| t.name != decl.name) {
                    let def = self.lower_complex(decl.name.clone(), inline, schema);
                    self.types.push(def);
                }
                decl.name.clone()
            }
            (None, Some(type_name)) if !type_name.is_in(XSD_NS) => type_name.local.clone(),
            _ => return None,
        };

        if self.types.iter().all(|t| t.name != type_name) {
            return None;
        }

        Some(ElementRef {
            name: decl.name.clone(),
            namespace: schema.target_namespace.clone(),
            type_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{query_wsdl, prj001_wsdl, wsdl_with_body};

    fn synth(doc: &str) -> Result<SynthesizedClient> {
        let descriptor = QueryDescriptor::parse(doc).unwrap();
        synthesize(&descriptor, &LogContext::disabled())
    }

    #[test]
    fn test_synthesize_query_service() {
        let client = synth(&prj001_wsdl()).unwrap();

        let service = &client.services()[0];
        assert_eq!(service.name, "PRJ001QueryService");
        assert_eq!(service.endpoint.as_deref(), Some("http://ppm.example.com/niku/xog"));
        assert_eq!(service.auth_header.as_ref().unwrap().type_name, "Auth");

        let op = service.operation("Query").unwrap();
        assert_eq!(op.input.name, "Query");
        assert_eq!(op.input.type_name, "PRJ001Query");
        assert_eq!(op.output.type_name, "PRJ001QueryResult");
        assert_eq!(op.soap_action, "http://www.niku.com/xog/Query/Query");
    }

    #[test]
    fn test_soap12_port_is_skipped_for_soap11() {
        let soap12_binding = r#"<wsdl:binding name="PRJ001QueryBinding12" type="tns:PRJ001QueryPort"
        xmlns:soap12="http://schemas.xmlsoap.org/wsdl/soap12/">
    <soap12:binding style="document" transport="http://schemas.xmlsoap.org/soap/http"/>
    <wsdl:operation name="Query">
      <soap12:operation soapAction="http://www.niku.com/xog/Query/Query" style="document"/>
    </wsdl:operation>
  </wsdl:binding>
  <wsdl:binding name="PRJ001QueryBinding" "#;
        let soap12_port = r#"<wsdl:port name="PRJ001QueryPort12" binding="tns:PRJ001QueryBinding12"
        xmlns:soap12="http://schemas.xmlsoap.org/wsdl/soap12/">
      <soap12:address location="http://ppm.example.com/niku/xog12"/>
    </wsdl:port>
    <wsdl:port name="PRJ001QueryPort" "#;
        let doc = prj001_wsdl()
            .replacen(r#"<wsdl:binding name="PRJ001QueryBinding" "#, soap12_binding, 1)
            .replacen(r#"<wsdl:port name="PRJ001QueryPort" "#, soap12_port, 1);

        let client = synth(&doc).unwrap();

        assert_eq!(
            client.services()[0].endpoint.as_deref(),
            Some("http://ppm.example.com/niku/xog")
        );
        assert!(client
            .warnings()
            .iter()
            .any(|d| d.message.contains("PRJ001QueryPort12") && d.message.contains("SOAP 1.2")));
    }

    #[test]
    fn test_soap12_only_service_has_no_usable_port() {
        let doc = prj001_wsdl().replace(
            "<soap:binding ",
            r#"<soap12:binding xmlns:soap12="http://schemas.xmlsoap.org/wsdl/soap12/" "#,
        );

        let err = synth(&doc).unwrap_err();
        let ErrorKind::Compilation { diagnostics } = err.kind else {
            panic!("expected compilation error");
        };
        assert!(diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error && d.message.contains("no usable SOAP port")));
    }

    #[test]
    fn test_records_wrapper_becomes_array() {
        let client = synth(&prj001_wsdl()).unwrap();
        let result = client.type_def("PRJ001QueryResult").unwrap();
        let records = result.field("Records").unwrap();

        assert_eq!(
            records.kind,
            FieldKind::Array(ArrayShape {
                item: Box::new(FieldKind::Complex("PRJ001Record".to_string())),
                wrapper_item: Some("Record".to_string()),
            })
        );

        let record = client.type_def("PRJ001Record").unwrap();
        let kinds: Vec<_> = record.fields.iter().map(|f| (f.name.as_str(), &f.kind)).collect();
        assert_eq!(kinds, [("Name", &FieldKind::Text), ("Cost", &FieldKind::Number)]);
        assert!(record.qualified);
    }

    #[test]
    fn test_builtin_kinds() {
        let doc = query_wsdl(
            "TYP",
            "http://ppm.example.com/niku/xog",
            &[
                ("label", "string"),
                ("amount", "decimal"),
                ("count", "int"),
                ("due", "dateTime"),
                ("day", "date"),
                ("active", "boolean"),
            ],
        );
        let client = synth(&doc).unwrap();
        let record = client.type_def("TYPRecord").unwrap();
        let kinds: Vec<_> = record.fields.iter().map(|f| f.kind.clone()).collect();
        assert_eq!(
            kinds,
            [
                FieldKind::Text,
                FieldKind::Number,
                FieldKind::Number,
                FieldKind::Date,
                FieldKind::Date,
                FieldKind::Boolean
            ]
        );
        assert!(client.warnings().is_empty());
    }

    #[test]
    fn test_unknown_types_are_warnings() {
        let doc = query_wsdl(
            "WRN",
            "http://ppm.example.com/niku/xog",
            &[("odd", "ENTITY"), ("missing", "tns:NoSuchType")],
        );
        let client = synth(&doc).unwrap();

        let record = client.type_def("WRNRecord").unwrap();
        assert!(record.fields.iter().all(|f| f.kind == FieldKind::Text));
        assert_eq!(client.warnings().len(), 2);
        assert!(client.warnings().iter().all(|d| d.severity == Severity::Warning));
        assert!(client.warnings()[0].message.contains("xsd:ENTITY"));
        assert!(client.warnings()[1].message.contains("NoSuchType"));
    }

    #[test]
    fn test_missing_service_is_compilation_error() {
        let doc = wsdl_with_body("");
        let err = synth(&doc).unwrap_err();
        match err.kind {
            ErrorKind::Compilation { diagnostics } => {
                assert_eq!(diagnostics.len(), 1);
                assert!(diagnostics[0].message.contains("no service"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_all_fatal_diagnostics_are_reported() {
        let doc = wsdl_with_body(
            r#"<wsdl:portType name="P">
                 <wsdl:operation name="Query">
                   <wsdl:input message="tns:Nope"/>
                   <wsdl:output message="tns:AlsoNope"/>
                 </wsdl:operation>
               </wsdl:portType>
               <wsdl:binding name="B" type="tns:P">
                 <soap:binding style="document" transport="http://schemas.xmlsoap.org/soap/http"/>
               </wsdl:binding>
               <wsdl:service name="XQueryService">
                 <wsdl:port name="p1" binding="tns:B"/>
                 <wsdl:port name="p2" binding="tns:Missing"/>
               </wsdl:service>"#,
        );
        let err = synth(&doc).unwrap_err();
        let ErrorKind::Compilation { diagnostics } = err.kind else {
            panic!("expected compilation error");
        };

        let errors: Vec<_> = diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| d.message.as_str())
            .collect();
        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(errors.iter().any(|m| m.contains("tns:Nope") || m.contains("Nope")));
        assert!(errors.iter().any(|m| m.contains("AlsoNope")));
        assert!(errors.iter().any(|m| m.contains("Missing")));
        // warnings travel with the errors
        assert!(diagnostics.iter().any(|d| d.severity == Severity::Warning));
    }

    #[test]
    fn test_declared_types_lists_services_first() {
        let client = synth(&prj001_wsdl()).unwrap();
        let first = client.declared_types().next().unwrap();
        assert!(matches!(first, DeclaredType::Service(_)));
        assert_eq!(first.name(), "PRJ001QueryService");
        assert!(client
            .declared_types()
            .any(|t| matches!(t, DeclaredType::Complex(def) if def.name == "Auth")));
    }
}

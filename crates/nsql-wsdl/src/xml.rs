//! Namespace-aware XML element tree.
//!
//! Both the service description and the SOAP responses are small enough to
//! hold in memory, so they are read with `quick-xml` into a tree once and
//! then walked. Prefixes are resolved while reading; QName-valued attributes
//! (`type="tns:Foo"`) are resolved on demand against the scope captured on
//! each element.

use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// XML Schema namespace.
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";
/// XML Schema instance namespace.
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
/// WSDL 1.1 namespace.
pub const WSDL_NS: &str = "http://schemas.xmlsoap.org/wsdl/";
/// WSDL 1.1 SOAP 1.1 binding namespace.
pub const WSDL_SOAP_NS: &str = "http://schemas.xmlsoap.org/wsdl/soap/";
/// WSDL 1.1 SOAP 1.2 binding namespace.
pub const WSDL_SOAP12_NS: &str = "http://schemas.xmlsoap.org/wsdl/soap12/";
/// SOAP 1.1 envelope namespace.
pub const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Error raised while reading an XML document.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct XmlError(pub String);

/// A namespace-qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub namespace: Option<String>,
    pub local: String,
}

impl QName {
    pub fn new(namespace: Option<&str>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            local: local.into(),
        }
    }

    /// True if this names something in the given namespace.
    pub fn is_in(&self, namespace: &str) -> bool {
        self.namespace.as_deref() == Some(namespace)
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

#[derive(Debug, Default)]
struct NamespaceScope {
    decls: Vec<(Option<String>, String)>,
    parent: Option<Arc<NamespaceScope>>,
}

impl NamespaceScope {
    fn lookup(&self, prefix: Option<&str>) -> Option<&str> {
        if prefix == Some("xml") {
            return Some(XML_NS);
        }
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some((_, uri)) = current.decls.iter().find(|(p, _)| p.as_deref() == prefix) {
                // xmlns="" undeclares the default namespace
                return (!uri.is_empty()).then_some(uri.as_str());
            }
            scope = current.parent.as_deref();
        }
        None
    }
}

/// An attribute with its prefix kept apart from its local name.
#[derive(Debug, Clone)]
pub struct XmlAttribute {
    pub prefix: Option<String>,
    pub name: String,
    pub value: String,
}

/// One element of a parsed document.
#[derive(Debug, Clone)]
pub struct XmlElement {
    name: String,
    namespace: Option<String>,
    attributes: Vec<XmlAttribute>,
    children: Vec<XmlElement>,
    text: String,
    scope: Arc<NamespaceScope>,
}

impl XmlElement {
    /// Local (unprefixed) element name.
    pub fn local_name(&self) -> &str {
        &self.name
    }

    /// Resolved namespace URI.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// True if the element has the given namespace and local name.
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.name == local && self.namespace.as_deref() == Some(namespace)
    }

    /// Value of an unprefixed attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.prefix.is_none() && a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Value of a namespaced attribute.
    pub fn attr_ns(&self, namespace: &str, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| {
                a.name == name && self.scope.lookup(a.prefix.as_deref()) == Some(namespace)
            })
            .map(|a| a.value.as_str())
    }

    pub fn attributes(&self) -> &[XmlAttribute] {
        &self.attributes
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// First child with the given local name, in any namespace.
    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == local)
    }

    /// All children with the given local name, in any namespace.
    pub fn children_named<'a>(
        &'a self,
        local: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == local)
    }

    /// All children with the given namespace and local name.
    pub fn children_ns<'a>(
        &'a self,
        namespace: &'a str,
        local: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.is(namespace, local))
    }

    /// Concatenated character data directly inside this element.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True if `xsi:nil="true"` is set.
    pub fn is_nil(&self) -> bool {
        matches!(self.attr_ns(XSI_NS, "nil"), Some("true") | Some("1"))
    }

    /// Resolve a QName-valued string (`tns:Foo`, `Foo`) in this element's scope.
    ///
    /// An unprefixed name takes the default namespace, as XSD does for type
    /// references. An undeclared prefix resolves to no namespace.
    pub fn resolve_qname(&self, value: &str) -> QName {
        let value = value.trim();
        match value.split_once(':') {
            Some((prefix, local)) => QName::new(self.scope.lookup(Some(prefix)), local),
            None => QName::new(self.scope.lookup(None), value),
        }
    }

    /// Depth-first search for the first descendant (or self) matching.
    pub fn find(&self, namespace: &str, local: &str) -> Option<&XmlElement> {
        if self.is(namespace, local) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(namespace, local))
    }
}

/// Parse a complete document and return its root element.
pub fn parse_document(xml: &str) -> Result<XmlElement, XmlError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<XmlElement> = Vec::new();
    let root_scope = Arc::new(NamespaceScope::default());
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| XmlError(format!("at byte {}: {}", reader.buffer_position(), e)))?;

        match event {
            Event::Start(start) => {
                let parent = stack.last().map_or(&root_scope, |p| &p.scope).clone();
                stack.push(open_element(&start, parent)?);
            }
            Event::Empty(start) => {
                let parent = stack.last().map_or(&root_scope, |p| &p.scope).clone();
                let element = open_element(&start, parent)?;
                attach(element, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| XmlError("unbalanced end tag".to_string()))?;
                attach(element, &mut stack, &mut root)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    let unescaped = text.unescape().map_err(|e| XmlError(e.to_string()))?;
                    current.text.push_str(&unescaped);
                }
            }
            Event::CData(cdata) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&String::from_utf8_lossy(&cdata.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(XmlError(format!(
            "unexpected end of document inside <{}>",
            stack.last().map_or("", |e| e.name.as_str())
        )));
    }
    root.ok_or_else(|| XmlError("document has no root element".to_string()))
}

fn attach(
    element: XmlElement,
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(XmlError("multiple root elements".to_string())),
    }
    Ok(())
}

fn open_element(
    start: &BytesStart<'_>,
    parent: Arc<NamespaceScope>,
) -> Result<XmlElement, XmlError> {
    let mut decls = Vec::new();
    let mut attributes = Vec::new();

    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError(e.to_string()))?;
        let key = utf8(attr.key.as_ref())?;
        let value = attr
            .unescape_value()
            .map_err(|e| XmlError(e.to_string()))?
            .into_owned();

        if key == "xmlns" {
            decls.push((None, value));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            decls.push((Some(prefix.to_string()), value));
        } else {
            let (prefix, name) = split_prefixed(key);
            attributes.push(XmlAttribute { prefix, name, value });
        }
    }

    let scope = if decls.is_empty() {
        parent
    } else {
        Arc::new(NamespaceScope {
            decls,
            parent: Some(parent),
        })
    };

    let (prefix, name) = split_prefixed(utf8(start.name().as_ref())?);
    let namespace = scope.lookup(prefix.as_deref()).map(str::to_string);

    Ok(XmlElement {
        name,
        namespace,
        attributes,
        children: Vec::new(),
        text: String::new(),
        scope,
    })
}

fn split_prefixed(raw: &str) -> (Option<String>, String) {
    match raw.split_once(':') {
        Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
        None => (None, raw.to_string()),
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, XmlError> {
    std::str::from_utf8(bytes).map_err(|e| XmlError(format!("invalid UTF-8 in name: {e}")))
}

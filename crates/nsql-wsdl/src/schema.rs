//! Typed shapes produced by client synthesis.

/// What a field holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Date,
    Boolean,
    /// A nested complex type, by name.
    Complex(String),
    Array(ArrayShape),
}

/// How an array field appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayShape {
    pub item: Box<FieldKind>,
    /// `Some(name)` when the items sit inside a single wrapper element as
    /// repeated `<name>` children (`<Records><Record/>…</Records>`);
    /// `None` when the field element itself repeats.
    pub wrapper_item: Option<String>,
}

impl FieldKind {
    pub fn is_array(&self) -> bool {
        matches!(self, FieldKind::Array(_))
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Text => write!(f, "text"),
            FieldKind::Number => write!(f, "number"),
            FieldKind::Date => write!(f, "date"),
            FieldKind::Boolean => write!(f, "boolean"),
            FieldKind::Complex(name) => write!(f, "{name}"),
            FieldKind::Array(shape) => write!(f, "{}[]", shape.item),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
    /// `minOccurs="0"` or `nillable="true"`.
    pub optional: bool,
}

/// A complex type of the synthesized client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    pub name: String,
    /// Namespace of the schema that declared the type.
    pub namespace: Option<String>,
    /// Whether child elements are namespace-qualified on the wire.
    pub qualified: bool,
    pub fields: Vec<FieldDef>,
}

impl TypeDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A top-level element used as a message body or header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef {
    pub name: String,
    pub namespace: Option<String>,
    /// Name of the [`TypeDef`] describing the element's content.
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDef {
    pub name: String,
    pub soap_action: String,
    pub input: ElementRef,
    pub output: ElementRef,
}

/// A callable service: one SOAP port of a WSDL service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDef {
    pub name: String,
    pub endpoint: Option<String>,
    /// SOAP header element carrying the authentication object.
    pub auth_header: Option<ElementRef>,
    pub operations: Vec<OperationDef>,
}

impl ServiceDef {
    pub fn operation(&self, name: &str) -> Option<&OperationDef> {
        self.operations.iter().find(|op| op.name == name)
    }
}

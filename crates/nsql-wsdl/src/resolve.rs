//! Binding the well-known query roles to synthesized types.
//!
//! Every Clarity query WSDL follows the same naming pattern. The roles are
//! looked up by lowercased type name through a single table, so a
//! description declaring `prj001query` still binds to the request role.

use std::collections::HashMap;

use nsql_client::LogContext;
use tracing::{debug, error};

use crate::error::{Error, ErrorKind, Result};
use crate::schema::{ElementRef, OperationDef, ServiceDef};
use crate::synthesize::{DeclaredType, SynthesizedClient};
use crate::value::{FieldBag, SetOutcome};

/// The part a synthesized type plays in a query invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeRole {
    /// `{code}QueryService`
    ServiceHandle,
    /// `{code}Query`
    Request,
    /// `Auth`
    Auth,
    /// `{code}Filter`
    Filter,
    /// `Slice`
    Slice,
    /// `Sort`
    Sort,
}

impl std::fmt::Display for TypeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TypeRole::ServiceHandle => "service",
            TypeRole::Request => "request",
            TypeRole::Auth => "authentication",
            TypeRole::Filter => "filter",
            TypeRole::Slice => "slice",
            TypeRole::Sort => "sort",
        };
        f.write_str(s)
    }
}

/// Expected type name for each role, lowercased, for a query code.
pub fn role_table(query_code: &str) -> HashMap<String, TypeRole> {
    let code = query_code.to_lowercase();
    HashMap::from([
        (format!("{code}queryservice"), TypeRole::ServiceHandle),
        (format!("{code}query"), TypeRole::Request),
        ("auth".to_string(), TypeRole::Auth),
        (format!("{code}filter"), TypeRole::Filter),
        ("slice".to_string(), TypeRole::Slice),
        ("sort".to_string(), TypeRole::Sort),
    ])
}

/// An instance of the query service, holding the header it will send.
#[derive(Debug, Clone)]
pub struct ServiceHandle {
    def: ServiceDef,
    auth_value: Option<FieldBag>,
}

impl ServiceHandle {
    pub fn new(def: ServiceDef) -> Self {
        Self { def, auth_value: None }
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn def(&self) -> &ServiceDef {
        &self.def
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.def.endpoint.as_deref()
    }

    pub fn operation(&self, name: &str) -> Option<&OperationDef> {
        self.def.operation(name)
    }

    pub fn auth_header(&self) -> Option<&ElementRef> {
        self.def.auth_header.as_ref()
    }

    pub fn auth_value(&self) -> Option<&FieldBag> {
        self.auth_value.as_ref()
    }

    /// Attach the authentication object sent as the SOAP header.
    ///
    /// `NotPresent` if the service declares no header, `NotWritable` if the
    /// header expects a different type.
    pub fn attach_auth(&mut self, auth: FieldBag) -> SetOutcome {
        match &self.def.auth_header {
            None => SetOutcome::NotPresent,
            Some(header) if header.type_name != auth.type_name() => SetOutcome::NotWritable,
            Some(_) => {
                self.auth_value = Some(auth);
                SetOutcome::Assigned
            }
        }
    }
}

/// Default instances of every role found in a synthesized client.
#[derive(Debug, Clone)]
pub struct ResolvedClient {
    pub client: SynthesizedClient,
    pub service: ServiceHandle,
    pub request: FieldBag,
    pub auth: FieldBag,
    pub filter: Option<FieldBag>,
    pub slice: Option<FieldBag>,
    pub sort: Option<FieldBag>,
}

/// Scan the client's declared types and instantiate one default value per
/// role.
///
/// Matching is case-insensitive on the full name; the first matching type
/// wins. The service role only binds to services and the other roles only
/// bind to complex types. A missing service, request or authentication type
/// is a resolution error; the others are optional.
pub fn resolve(
    client: SynthesizedClient,
    query_code: &str,
    ctx: &LogContext,
) -> Result<ResolvedClient> {
    let table = role_table(query_code);
    let mut service = None;
    let mut bags: HashMap<TypeRole, FieldBag> = HashMap::new();

    for declared in client.declared_types() {
        let Some(&role) = table.get(&declared.name().to_lowercase()) else {
            continue;
        };
        match (role, declared) {
            (TypeRole::ServiceHandle, DeclaredType::Service(def)) => {
                if service.is_none() {
                    debug!(parent: ctx.span(), role = %role, name = %def.name, "Resolved type");
                    service = Some(ServiceHandle::new(def.clone()));
                }
            }
            (TypeRole::ServiceHandle, DeclaredType::Complex(_))
            | (_, DeclaredType::Service(_)) => {}
            (role, DeclaredType::Complex(def)) => {
                bags.entry(role).or_insert_with(|| {
                    debug!(parent: ctx.span(), role = %role, name = %def.name, "Resolved type");
                    FieldBag::default_for(def)
                });
            }
        }
    }

    let Some(service) = service else {
        return Err(missing(query_code, TypeRole::ServiceHandle, ctx));
    };
    let Some(request) = bags.remove(&TypeRole::Request) else {
        return Err(missing(query_code, TypeRole::Request, ctx));
    };
    let Some(auth) = bags.remove(&TypeRole::Auth) else {
        return Err(missing(query_code, TypeRole::Auth, ctx));
    };

    Ok(ResolvedClient {
        service,
        request,
        auth,
        filter: bags.remove(&TypeRole::Filter),
        slice: bags.remove(&TypeRole::Slice),
        sort: bags.remove(&TypeRole::Sort),
        client,
    })
}

fn missing(query_code: &str, role: TypeRole, ctx: &LogContext) -> Error {
    let expected = match role {
        TypeRole::ServiceHandle => format!("{query_code}QueryService"),
        TypeRole::Request => format!("{query_code}Query"),
        TypeRole::Auth => "Auth".to_string(),
        TypeRole::Filter => format!("{query_code}Filter"),
        TypeRole::Slice => "Slice".to_string(),
        TypeRole::Sort => "Sort".to_string(),
    };
    error!(parent: ctx.span(), role = %role, expected = %expected, "Mandatory type not found");
    Error::new(ErrorKind::Resolution(format!(
        "the client declares no {role} type named {expected}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::QueryDescriptor;
    use crate::synthesize::synthesize;
    use crate::testing::{prj001_wsdl, query_wsdl, PRJ001_ENDPOINT};
    use crate::value::FieldValue;

    fn client_for(doc: &str) -> SynthesizedClient {
        let descriptor = QueryDescriptor::parse(doc).unwrap();
        synthesize(&descriptor, &LogContext::disabled()).unwrap()
    }

    #[test]
    fn test_resolve_all_roles() {
        let resolved =
            resolve(client_for(&prj001_wsdl()), "PRJ001", &LogContext::disabled()).unwrap();

        assert_eq!(resolved.service.name(), "PRJ001QueryService");
        assert_eq!(resolved.service.endpoint(), Some(PRJ001_ENDPOINT));
        assert_eq!(resolved.request.type_name(), "PRJ001Query");
        assert_eq!(resolved.auth.type_name(), "Auth");
        assert_eq!(resolved.filter.as_ref().unwrap().type_name(), "PRJ001Filter");
        assert_eq!(resolved.slice.as_ref().unwrap().type_name(), "Slice");
        assert_eq!(resolved.sort.as_ref().unwrap().type_name(), "Sort");
        assert!(resolved.request.iter().all(|(_, _, v)| v.is_null()));
    }

    #[test]
    fn test_resolution_ignores_case() {
        let doc = query_wsdl("PRJ001", PRJ001_ENDPOINT, &[("Name", "string")]);
        let resolved = resolve(client_for(&doc), "prj001", &LogContext::disabled()).unwrap();
        assert_eq!(resolved.request.type_name(), "PRJ001Query");
        assert_eq!(resolved.service.name(), "PRJ001QueryService");
    }

    #[test]
    fn test_wrong_code_is_resolution_error() {
        let err =
            resolve(client_for(&prj001_wsdl()), "PRJ002", &LogContext::disabled()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Resolution(_)));
        assert!(err.to_string().contains("PRJ002QueryService"));
    }

    #[test]
    fn test_prefix_match_does_not_resolve() {
        // PRJ001Query exists, but PRJ00 must not match it by prefix
        let err =
            resolve(client_for(&prj001_wsdl()), "PRJ00", &LogContext::disabled()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Resolution(_)));
    }

    #[test]
    fn test_missing_auth_is_resolution_error() {
        let doc = prj001_wsdl()
            .replace(r#"name="Auth" type="tns:Auth""#, r#"name="Auth" type="tns:Credentials""#)
            .replace(r#"<xsd:complexType name="Auth">"#, r#"<xsd:complexType name="Credentials">"#);
        let err = resolve(client_for(&doc), "PRJ001", &LogContext::disabled()).unwrap_err();
        assert!(err.to_string().contains("authentication"));
    }

    #[test]
    fn test_attach_auth() {
        let mut resolved =
            resolve(client_for(&prj001_wsdl()), "PRJ001", &LogContext::disabled()).unwrap();
        let mut auth = resolved.auth.clone();
        assert_eq!(auth.set("Username", FieldValue::text("admin")), SetOutcome::Assigned);

        assert_eq!(resolved.service.attach_auth(resolved.request.clone()), SetOutcome::NotWritable);
        assert!(resolved.service.auth_value().is_none());

        assert_eq!(resolved.service.attach_auth(auth), SetOutcome::Assigned);
        assert_eq!(
            resolved.service.auth_value().unwrap().get("Username"),
            Some(&FieldValue::text("admin"))
        );
    }

    #[test]
    fn test_attach_auth_without_header() {
        let client = client_for(&prj001_wsdl());
        let mut def = client.services()[0].clone();
        def.auth_header = None;
        let auth = FieldBag::default_for(client.type_def("Auth").unwrap());

        let mut handle = ServiceHandle::new(def);
        assert_eq!(handle.attach_auth(auth), SetOutcome::NotPresent);
    }
}

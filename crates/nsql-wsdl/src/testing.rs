//! WSDL fixtures shaped like the Clarity PPM query service.
//!
//! Enabled for this crate's tests and, through the `test-support` feature,
//! for downstream crates' tests.

/// Namespace every Clarity query WSDL lives in.
pub const QUERY_NS: &str = "http://www.niku.com/xog/Query";

/// Endpoint declared by [`prj001_wsdl`].
pub const PRJ001_ENDPOINT: &str = "http://ppm.example.com/niku/xog";

/// Wrap WSDL body declarations in a `definitions` element that binds the
/// usual prefixes (`wsdl`, `soap`, `xsd`, `tns`).
pub fn wsdl_with_body(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<wsdl:definitions xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"
    xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/"
    xmlns:xsd="http://www.w3.org/2001/XMLSchema"
    xmlns:tns="{QUERY_NS}"
    targetNamespace="{QUERY_NS}">
{body}
</wsdl:definitions>"#
    )
}

/// A query description for `code` whose records carry `fields`.
///
/// Each field is `(name, type)`. A bare type is an XSD builtin
/// (`"string"` becomes `xsd:string`); a prefixed type is used as written.
pub fn query_wsdl(code: &str, endpoint: &str, fields: &[(&str, &str)]) -> String {
    let record_fields: String = fields
        .iter()
        .map(|(name, ty)| {
            let ty = if ty.contains(':') {
                ty.to_string()
            } else {
                format!("xsd:{ty}")
            };
            format!(r#"<xsd:element name="{name}" type="{ty}" minOccurs="0" nillable="true"/>"#)
        })
        .collect::<Vec<_>>()
        .join("\n          ");

    wsdl_with_body(&format!(
        r#"  <wsdl:types>
    <xsd:schema targetNamespace="{QUERY_NS}" elementFormDefault="qualified">
      <xsd:complexType name="Auth">
        <xsd:sequence>
          <xsd:element name="Username" type="xsd:string" minOccurs="0"/>
          <xsd:element name="Password" type="xsd:string" minOccurs="0"/>
          <xsd:element name="SessionID" type="xsd:string" minOccurs="0"/>
        </xsd:sequence>
      </xsd:complexType>
      <xsd:complexType name="{code}Filter">
        <xsd:sequence>
          <xsd:element name="name" type="xsd:string" minOccurs="0"/>
        </xsd:sequence>
      </xsd:complexType>
      <xsd:complexType name="Slice">
        <xsd:sequence>
          <xsd:element name="Number" type="xsd:int"/>
          <xsd:element name="Size" type="xsd:int"/>
          <xsd:element name="Total" type="xsd:int" minOccurs="0"/>
        </xsd:sequence>
      </xsd:complexType>
      <xsd:complexType name="Sort">
        <xsd:sequence>
          <xsd:element name="Column" type="xsd:string" minOccurs="0" maxOccurs="unbounded"/>
        </xsd:sequence>
      </xsd:complexType>
      <xsd:complexType name="{code}Query">
        <xsd:sequence>
          <xsd:element name="Code" type="xsd:string"/>
          <xsd:element name="Filter" type="tns:{code}Filter" minOccurs="0"/>
          <xsd:element name="Slice" type="tns:Slice" minOccurs="0"/>
          <xsd:element name="Sort" type="tns:Sort" minOccurs="0"/>
          <xsd:element name="FilterExpression" type="xsd:string" minOccurs="0"/>
        </xsd:sequence>
      </xsd:complexType>
      <xsd:complexType name="{code}Record">
        <xsd:sequence>
          {record_fields}
        </xsd:sequence>
      </xsd:complexType>
      <xsd:complexType name="{code}Records">
        <xsd:sequence>
          <xsd:element name="Record" type="tns:{code}Record" minOccurs="0" maxOccurs="unbounded"/>
        </xsd:sequence>
      </xsd:complexType>
      <xsd:complexType name="{code}QueryResult">
        <xsd:sequence>
          <xsd:element name="Code" type="xsd:string"/>
          <xsd:element name="Records" type="tns:{code}Records"/>
          <xsd:element name="Slice" type="tns:Slice" minOccurs="0"/>
        </xsd:sequence>
      </xsd:complexType>
      <xsd:element name="Auth" type="tns:Auth"/>
      <xsd:element name="Query" type="tns:{code}Query"/>
      <xsd:element name="QueryResult" type="tns:{code}QueryResult"/>
    </xsd:schema>
  </wsdl:types>
  <wsdl:message name="{code}QueryRequest">
    <wsdl:part name="Query" element="tns:Query"/>
  </wsdl:message>
  <wsdl:message name="{code}QueryResponse">
    <wsdl:part name="Body" element="tns:QueryResult"/>
  </wsdl:message>
  <wsdl:message name="AuthHeader">
    <wsdl:part name="Auth" element="tns:Auth"/>
  </wsdl:message>
  <wsdl:portType name="{code}QueryPort">
    <wsdl:operation name="Query">
      <wsdl:input message="tns:{code}QueryRequest"/>
      <wsdl:output message="tns:{code}QueryResponse"/>
    </wsdl:operation>
  </wsdl:portType>
  <wsdl:binding name="{code}QueryBinding" type="tns:{code}QueryPort">
    <soap:binding style="document" transport="http://schemas.xmlsoap.org/soap/http"/>
    <wsdl:operation name="Query">
      <soap:operation soapAction="{QUERY_NS}/Query" style="document"/>
      <wsdl:input>
        <soap:header message="tns:AuthHeader" part="Auth" use="literal"/>
        <soap:body use="literal"/>
      </wsdl:input>
      <wsdl:output>
        <soap:body use="literal"/>
      </wsdl:output>
    </wsdl:operation>
  </wsdl:binding>
  <wsdl:service name="{code}QueryService">
    <wsdl:port name="{code}QueryPort" binding="tns:{code}QueryBinding">
      <soap:address location="{endpoint}"/>
    </wsdl:port>
  </wsdl:service>"#
    ))
}

/// The `PRJ001` query: project name and cost.
pub fn prj001_wsdl() -> String {
    query_wsdl("PRJ001", PRJ001_ENDPOINT, &[("Name", "string"), ("Cost", "decimal")])
}

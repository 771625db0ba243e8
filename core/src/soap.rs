//! SOAP envelope assembly and response/fault decoding.
//!
//! The envelope declares every namespace a service might use up front, so body
//! elements only ever carry prefixes. The API key travels as a WS-Security
//! `UsernameToken` password and as the `apikey` header the gateway checks.

use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::de;
use crate::error::{ApiError, CifErrorDetail};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::rest;
use crate::xml::{self, ListField, Namespace, SoapSchema, XmlElement, XmlNode};

/// Complete envelope document for `operation` with `body` inside it.
pub fn build_envelope(
    schema: &SoapSchema,
    api_key: &str,
    operation: &str,
    body: Vec<XmlNode>,
) -> Result<String, ApiError> {
    let services_uri = schema.services_uri();
    let domain_uri = schema.domain_uri();

    let mut writer = Writer::new(Cursor::new(Vec::new()));
    xml::write_event(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut envelope = BytesStart::new("soap:Envelope");
    envelope.push_attribute(("xmlns:soap", xml::ENVELOPE_URI));
    envelope.push_attribute(("xmlns:services", services_uri.as_str()));
    envelope.push_attribute(("xmlns:domain", domain_uri.as_str()));
    envelope.push_attribute(("xmlns:arr", xml::ARRAYS_URI));
    envelope.push_attribute(("xmlns:common", xml::COMMON_URI));
    envelope.push_attribute(("xmlns:schema", xml::XSI_URI));
    xml::write_event(&mut writer, Event::Start(envelope))?;

    let mut security = BytesStart::new("wsse:Security");
    security.push_attribute(("xmlns:wsse", xml::SECURITY_URI));
    xml::write_event(&mut writer, Event::Start(BytesStart::new("soap:Header")))?;
    xml::write_event(&mut writer, Event::Start(security))?;
    xml::write_node(
        &mut writer,
        &XmlNode::parent(
            Namespace::Security,
            "UsernameToken",
            vec![XmlNode::text(Namespace::Security, "Password", api_key)],
        ),
    )?;
    xml::write_event(&mut writer, Event::End(BytesEnd::new("wsse:Security")))?;
    xml::write_event(&mut writer, Event::End(BytesEnd::new("soap:Header")))?;

    xml::write_event(&mut writer, Event::Start(BytesStart::new("soap:Body")))?;
    xml::write_node(&mut writer, &XmlNode::parent(Namespace::Services, operation, body))?;
    xml::write_event(&mut writer, Event::End(BytesEnd::new("soap:Body")))?;
    xml::write_event(&mut writer, Event::End(BytesEnd::new("soap:Envelope")))?;

    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| ApiError::SerializationError(e.to_string()))
}

/// POST request invoking `operation` with the serialized `payload` as its body.
pub(crate) fn request<T: Serialize>(
    schema: &SoapSchema,
    endpoint: &str,
    api_key: &str,
    operation: &str,
    payload: &T,
) -> Result<HttpRequest, ApiError> {
    let value = serde_json::to_value(payload).map_err(|e| ApiError::SerializationError(e.to_string()))?;
    let body = schema.properties_to_nodes(&value)?;
    let envelope = build_envelope(schema, api_key, operation, body)?;
    let url = format!("{endpoint}{}", schema.endpoint);
    debug!(%url, operation, "built SOAP request");
    Ok(HttpRequest {
        method: HttpMethod::Post,
        url,
        headers: vec![
            ("apikey".to_string(), api_key.to_string()),
            ("content-type".to_string(), "text/xml; charset=utf-8".to_string()),
            ("soapaction".to_string(), format!("\"{}\"", schema.action(operation))),
        ],
        body: Some(envelope),
    })
}

#[derive(Debug, Deserialize)]
struct Fault {
    #[serde(default)]
    faultcode: Option<String>,
    #[serde(default)]
    faultstring: Option<String>,
    #[serde(default)]
    detail: Option<FaultDetail>,
}

#[derive(Debug, Deserialize)]
struct FaultDetail {
    #[serde(rename = "CifException", default)]
    cif_exception: Option<CifException>,
}

#[derive(Debug, Deserialize)]
struct CifException {
    #[serde(rename = "Errors", default, deserialize_with = "de::one_or_many")]
    errors: Vec<CifErrorDetail>,
}

const FAULT_LISTS: &[ListField] = &[ListField::domain("Errors", "ExceptionData")];

fn fault_error(fault: &XmlElement) -> ApiError {
    let parsed: Result<Fault, _> = serde_json::from_value(fault.to_value(FAULT_LISTS));
    match parsed {
        Ok(Fault {
            detail: Some(FaultDetail {
                cif_exception: Some(cif),
            }),
            ..
        }) if !cif.errors.is_empty() => {
            warn!(count = cif.errors.len(), "SOAP fault with CIF errors");
            ApiError::Cif(cif.errors)
        }
        Ok(fault) => {
            let code = fault.faultcode.unwrap_or_default();
            let message = fault.faultstring.unwrap_or_default();
            warn!(%code, %message, "SOAP fault");
            ApiError::SoapFault { code, message }
        }
        Err(e) => ApiError::DeserializationError(format!("unreadable SOAP fault: {e}")),
    }
}

/// Extracts `response_element` from the body as a JSON value.
pub(crate) fn response_value(
    schema: &SoapSchema,
    response: &HttpResponse,
    response_element: &str,
) -> Result<Value, ApiError> {
    let document = match xml::parse_document(&response.body) {
        Ok(document) => document,
        // Gateway errors (bad API key, outages) are not SOAP documents.
        Err(parse_err) => return Err(rest::response_error(response).unwrap_or(parse_err)),
    };
    let body = document
        .child("Body")
        .ok_or_else(|| ApiError::DeserializationError("SOAP response has no Body".to_string()))?;
    if let Some(fault) = body.child("Fault") {
        return Err(fault_error(fault));
    }
    if !response.is_success() {
        return Err(ApiError::HttpError {
            status: response.status,
            body: response.body.clone(),
        });
    }
    let element = body.find(response_element).ok_or_else(|| {
        ApiError::DeserializationError(format!("SOAP response has no {response_element} element"))
    })?;
    Ok(element.to_value(schema.lists))
}

/// Decodes `response_element` into `T`.
pub(crate) fn parse<T: DeserializeOwned>(
    schema: &SoapSchema,
    response: &HttpResponse,
    response_element: &str,
) -> Result<T, ApiError> {
    let value = response_value(schema, response, response_element)?;
    serde_json::from_value(value).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

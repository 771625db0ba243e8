//! Namespace-aware XML mapping for the SOAP services.
//!
//! # Design
//! Entities are not hand-mapped to XML. A request entity is serialized with
//! serde into a JSON value (the REST shape) and [`SoapSchema`] turns that value
//! into prefixed elements: every property lands in the service's domain
//! namespace, except list items, whose element name and namespace come from
//! the schema's list table (`Options` → `arr:string`).
//!
//! Responses go the other way: the document is read into a tree of
//! namespace-stripped [`XmlElement`]s, converted back to a JSON value and
//! decoded by the same DTOs that decode REST responses.

use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Map, Value};

use crate::error::ApiError;

pub const ENVELOPE_URI: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const SECURITY_URI: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";
pub const ARRAYS_URI: &str = "http://schemas.microsoft.com/2003/10/Serialization/Arrays";
pub const COMMON_URI: &str = "http://postnl.nl/cif/services/common/";
pub const XSI_URI: &str = "http://www.w3.org/2001/XMLSchema-instance";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Envelope,
    Security,
    Services,
    Domain,
    Arrays,
    Common,
    Xsi,
}

impl Namespace {
    pub fn prefix(self) -> &'static str {
        match self {
            Namespace::Envelope => "soap",
            Namespace::Security => "wsse",
            Namespace::Services => "services",
            Namespace::Domain => "domain",
            Namespace::Arrays => "arr",
            Namespace::Common => "common",
            Namespace::Xsi => "schema",
        }
    }
}

/// A property whose value is a list: written as a wrapper element holding one
/// `item` element per entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListField {
    pub property: &'static str,
    pub item: &'static str,
    pub item_ns: Namespace,
}

impl ListField {
    pub const fn domain(property: &'static str, item: &'static str) -> Self {
        Self {
            property,
            item,
            item_ns: Namespace::Domain,
        }
    }

    pub const fn strings(property: &'static str) -> Self {
        Self {
            property,
            item: "string",
            item_ns: Namespace::Arrays,
        }
    }
}

/// Per-service SOAP description: naming, endpoint and list table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoapSchema {
    pub service: &'static str,
    pub endpoint: &'static str,
    pub lists: &'static [ListField],
}

impl SoapSchema {
    pub fn services_uri(&self) -> String {
        format!("http://postnl.nl/cif/services/{}/", self.service)
    }

    pub fn domain_uri(&self) -> String {
        format!("http://postnl.nl/cif/domain/{}/", self.service)
    }

    /// `SOAPAction` for `operation`, e.g. `.../IBarcodeWebService/GenerateBarcode`.
    pub fn action(&self, operation: &str) -> String {
        format!("{}I{}/{}", self.services_uri(), self.service, operation)
    }

    pub fn list(&self, property: &str) -> Option<&ListField> {
        self.lists.iter().find(|l| l.property == property)
    }

    /// Converts a serialized entity (a JSON object) into domain elements.
    pub fn properties_to_nodes(&self, value: &Value) -> Result<Vec<XmlNode>, ApiError> {
        let map = value.as_object().ok_or_else(|| {
            ApiError::SerializationError(format!("expected an object to map to XML, got {value}"))
        })?;
        let mut keys: Vec<&String> = map.keys().collect();
        keys.sort();
        let mut nodes = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(node) = self.property_node(Namespace::Domain, key, &map[key.as_str()])? {
                nodes.push(node);
            }
        }
        Ok(nodes)
    }

    fn property_node(&self, ns: Namespace, name: &str, value: &Value) -> Result<Option<XmlNode>, ApiError> {
        let content = match value {
            Value::Null => return Ok(None),
            Value::Bool(b) => XmlContent::Text(b.to_string()),
            Value::Number(n) => XmlContent::Text(n.to_string()),
            Value::String(s) => XmlContent::Text(s.clone()),
            Value::Object(_) => XmlContent::Children(self.properties_to_nodes(value)?),
            Value::Array(items) => {
                let list = self.list(name).ok_or_else(|| {
                    ApiError::SerializationError(format!(
                        "{} has no list mapping for property '{name}'",
                        self.service
                    ))
                })?;
                let mut children = Vec::with_capacity(items.len());
                for item in items {
                    if let Some(node) = self.property_node(list.item_ns, list.item, item)? {
                        children.push(node);
                    }
                }
                XmlContent::Children(children)
            }
        };
        Ok(Some(XmlNode {
            ns,
            name: name.to_string(),
            content,
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlContent {
    Text(String),
    Children(Vec<XmlNode>),
}

/// An element to be written, with its namespace prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    pub ns: Namespace,
    pub name: String,
    pub content: XmlContent,
}

impl XmlNode {
    pub fn text(ns: Namespace, name: &str, text: impl Into<String>) -> Self {
        Self {
            ns,
            name: name.to_string(),
            content: XmlContent::Text(text.into()),
        }
    }

    pub fn parent(ns: Namespace, name: &str, children: Vec<XmlNode>) -> Self {
        Self {
            ns,
            name: name.to_string(),
            content: XmlContent::Children(children),
        }
    }

    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.ns.prefix(), self.name)
    }
}

fn write_error(e: impl std::fmt::Display) -> ApiError {
    ApiError::SerializationError(format!("XML write failed: {e}"))
}

pub(crate) fn write_event<W: std::io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), ApiError> {
    writer.write_event(event).map_err(write_error)
}

pub(crate) fn write_node<W: std::io::Write>(writer: &mut Writer<W>, node: &XmlNode) -> Result<(), ApiError> {
    let name = node.qualified_name();
    match &node.content {
        XmlContent::Text(text) => {
            write_event(writer, Event::Start(BytesStart::new(name.as_str())))?;
            write_event(writer, Event::Text(BytesText::new(text)))?;
            write_event(writer, Event::End(BytesEnd::new(name.as_str())))
        }
        XmlContent::Children(children) => {
            if children.is_empty() {
                return write_event(writer, Event::Empty(BytesStart::new(name.as_str())));
            }
            write_event(writer, Event::Start(BytesStart::new(name.as_str())))?;
            for child in children {
                write_node(writer, child)?;
            }
            write_event(writer, Event::End(BytesEnd::new(name.as_str())))
        }
    }
}

/// Serializes a single node tree without declaration; mostly for tests.
pub fn node_to_string(node: &XmlNode) -> Result<String, ApiError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    write_node(&mut writer, node)?;
    String::from_utf8(writer.into_inner().into_inner()).map_err(write_error)
}

/// A parsed element with its namespace prefix removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    fn named(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Depth-first search for the first element called `name`, including self.
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Converts the element's content into a JSON value.
    ///
    /// Leaves become strings (or `null` when empty), repeated siblings become
    /// arrays and properties named in `lists` always become arrays of their
    /// item elements.
    pub fn to_value(&self, lists: &[ListField]) -> Value {
        if self.children.is_empty() {
            let text = self.text.trim();
            return if text.is_empty() {
                Value::Null
            } else {
                Value::String(text.to_string())
            };
        }
        if let Some(list) = lists.iter().find(|l| l.property == self.name) {
            return Value::Array(
                self.children
                    .iter()
                    .filter(|c| c.name == list.item)
                    .map(|c| c.to_value(lists))
                    .collect(),
            );
        }
        let mut grouped: Vec<(&str, Vec<Value>)> = Vec::new();
        for child in &self.children {
            let value = child.to_value(lists);
            match grouped.iter_mut().find(|(name, _)| *name == child.name) {
                Some((_, values)) => values.push(value),
                None => grouped.push((child.name.as_str(), vec![value])),
            }
        }
        let mut map = Map::new();
        for (name, mut values) in grouped {
            let value = if values.len() == 1 {
                values.remove(0)
            } else {
                Value::Array(values)
            };
            map.insert(name.to_string(), value);
        }
        Value::Object(map)
    }
}

fn read_error(e: impl std::fmt::Display) -> ApiError {
    ApiError::DeserializationError(format!("invalid XML: {e}"))
}

fn local_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

/// Reads a whole document into an element tree rooted at the document element.
pub fn parse_document(xml: &str) -> Result<XmlElement, ApiError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;
    loop {
        match reader.read_event().map_err(read_error)? {
            Event::Start(start) => stack.push(XmlElement::named(local_name(&start))),
            Event::Empty(start) => {
                let element = XmlElement::named(local_name(&start));
                attach(&mut stack, &mut root, element);
            }
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text.unescape().map_err(read_error)?);
                }
            }
            Event::CData(data) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| read_error("unbalanced closing tag"))?;
                attach(&mut stack, &mut root, element);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    if !stack.is_empty() {
        return Err(read_error("document ended inside an element"));
    }
    root.ok_or_else(|| read_error("document has no root element"))
}

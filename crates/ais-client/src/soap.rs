//! SOAP 1.1 envelope encoding and decoding
//!
//! Requests and responses are nested trees (`serde_json::Value`). On the
//! wire, map keys become elements, keys prefixed with `@` become
//! attributes, and a `$text` key carries the character content of an
//! element that also has attributes. Namespace prefixes on response
//! elements are stripped while reading, so trees are probed by local
//! name only.

use crate::error::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde_json::{Map, Value};
use tracing::trace;

/// SOAP 1.1 envelope namespace
const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// OASIS DSS core namespace, the default namespace of the request body
const DSS_CORE_NS: &str = "urn:oasis:names:tc:dss:1.0:core:schema";

/// A decoded SOAP reply: either the body content or a fault
#[derive(Debug, Clone, PartialEq)]
pub enum SoapReply {
    /// Body content as a tree, keyed by local element names
    Response(Value),
    /// SOAP fault reported by the server or an intermediary
    Fault(SoapFault),
}

/// SOAP fault details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapFault {
    /// The `faultcode` value, e.g. `soap:Server`
    pub code: String,
    /// The `faultstring` value
    pub message: String,
}

/// Render a request tree as a SOAP 1.1 envelope
pub fn envelope(request: &Value) -> Result<String> {
    let mut writer = quick_xml::Writer::new(Vec::new());

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| Error::envelope(format!("failed to write XML declaration: {e}")))?;

    let mut envelope_start = BytesStart::new("soapenv:Envelope");
    envelope_start.push_attribute(("xmlns:soapenv", SOAP_ENV_NS));
    write_start(&mut writer, envelope_start)?;
    write_start(&mut writer, BytesStart::new("soapenv:Body"))?;

    let Value::Object(body) = request else {
        return Err(Error::envelope("request tree root must be a map"));
    };
    for (name, value) in body {
        let mut root = element_for(name, value);
        root.push_attribute(("xmlns", DSS_CORE_NS));
        write_value(&mut writer, root, value)?;
    }

    write_end(&mut writer, "soapenv:Body")?;
    write_end(&mut writer, "soapenv:Envelope")?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| Error::envelope(format!("envelope is not valid UTF-8: {e}")))
}

/// Parse a SOAP envelope into a reply
pub fn parse_envelope(xml: &str) -> Result<SoapReply> {
    let document = read_tree(xml)?;

    let Some(body) = document
        .get("Envelope")
        .and_then(|envelope| envelope.get("Body"))
    else {
        return Err(Error::envelope("missing Envelope/Body element"));
    };

    if let Some(fault) = body.get("Fault") {
        let code = fault
            .get("faultcode")
            .and_then(text_of)
            .unwrap_or_default()
            .to_string();
        let message = fault
            .get("faultstring")
            .and_then(text_of)
            .unwrap_or_default()
            .to_string();
        trace!("Parsed SOAP fault: code={code}, message={message}");
        return Ok(SoapReply::Fault(SoapFault { code, message }));
    }

    Ok(SoapReply::Response(body.clone()))
}

/// Character content of a tree node.
///
/// Plain text nodes are stored as strings; nodes that also carry
/// attributes keep their text under `$text`.
pub(crate) fn text_of(value: &Value) -> Option<&str> {
    match value {
        Value::String(text) => Some(text),
        Value::Object(map) => map.get("$text").and_then(Value::as_str),
        _ => None,
    }
}

fn write_start(writer: &mut quick_xml::Writer<Vec<u8>>, start: BytesStart<'_>) -> Result<()> {
    writer
        .write_event(Event::Start(start))
        .map_err(|e| Error::envelope(format!("failed to write element: {e}")))
}

fn write_end(writer: &mut quick_xml::Writer<Vec<u8>>, name: &str) -> Result<()> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(|e| Error::envelope(format!("failed to write element end: {e}")))
}

fn write_text(writer: &mut quick_xml::Writer<Vec<u8>>, text: &str) -> Result<()> {
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(|e| Error::envelope(format!("failed to write text: {e}")))
}

/// Build the start tag for a named node, attaching `@`-prefixed keys as
/// attributes
fn element_for<'a>(name: &'a str, value: &'a Value) -> BytesStart<'a> {
    let mut start = BytesStart::new(name);
    if let Value::Object(map) = value {
        for (key, attr_value) in map {
            if let Some(attr_name) = key.strip_prefix('@') {
                if let Some(text) = attr_value.as_str() {
                    start.push_attribute((attr_name, text));
                }
            }
        }
    }
    start
}

/// Write one named node: attributes from `@` keys, then children and text
fn write_value(
    writer: &mut quick_xml::Writer<Vec<u8>>,
    start: BytesStart<'_>,
    value: &Value,
) -> Result<()> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    write_start(writer, start)?;

    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key.starts_with('@') {
                    continue;
                }
                if key == "$text" {
                    if let Some(text) = child.as_str() {
                        write_text(writer, text)?;
                    }
                    continue;
                }
                if let Value::Array(items) = child {
                    for item in items {
                        write_value(writer, element_for(key, item), item)?;
                    }
                } else {
                    write_value(writer, element_for(key, child), child)?;
                }
            }
        }
        Value::String(text) => write_text(writer, text)?,
        Value::Null => {}
        other => write_text(writer, &other.to_string())?,
    }

    write_end(writer, &name)
}

/// One element being assembled while reading
struct NodeFrame {
    name: String,
    map: Map<String, Value>,
    text: String,
}

impl NodeFrame {
    fn new(name: String) -> Self {
        Self {
            name,
            map: Map::new(),
            text: String::new(),
        }
    }

    fn into_value(self) -> (String, Value) {
        let value = if self.map.is_empty() {
            Value::String(self.text)
        } else if self.text.is_empty() {
            Value::Object(self.map)
        } else {
            let mut map = self.map;
            map.insert("$text".to_string(), Value::String(self.text));
            Value::Object(map)
        };
        (self.name, value)
    }
}

/// Parse an XML document into a tree, stripping namespace prefixes and
/// collecting repeated siblings into arrays
fn read_tree(xml: &str) -> Result<Value> {
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<NodeFrame> = vec![NodeFrame::new(String::new())];

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                stack.push(frame_from_start(&start)?);
            }
            Event::Empty(start) => {
                let frame = frame_from_start(&start)?;
                let (name, value) = frame.into_value();
                attach_child(stack.last_mut(), name, value)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| Error::envelope(format!("invalid character data: {e}")))?;
                // Indentation between elements is not content.
                let text = text.trim();
                if !text.is_empty() {
                    if let Some(frame) = stack.last_mut() {
                        frame.text.push_str(text);
                    }
                }
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| Error::envelope("unbalanced end tag"))?;
                let (name, value) = frame.into_value();
                attach_child(stack.last_mut(), name, value)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let root = stack
        .pop()
        .ok_or_else(|| Error::envelope("empty document"))?;
    if !stack.is_empty() {
        return Err(Error::envelope("unclosed elements at end of document"));
    }
    Ok(Value::Object(root.map))
}

fn frame_from_start(start: &BytesStart<'_>) -> Result<NodeFrame> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut frame = NodeFrame::new(name);

    for attribute in start.attributes() {
        let attribute =
            attribute.map_err(|e| Error::envelope(format!("invalid attribute: {e}")))?;
        let key = attribute.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let local = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| Error::envelope(format!("invalid attribute value: {e}")))?;
        frame
            .map
            .insert(format!("@{local}"), Value::String(value.into_owned()));
    }

    Ok(frame)
}

/// Insert a finished child into its parent, turning repeated siblings
/// into an array
fn attach_child(parent: Option<&mut NodeFrame>, name: String, value: Value) -> Result<()> {
    let Some(parent) = parent else {
        return Err(Error::envelope("element outside of document root"));
    };
    match parent.map.get_mut(&name) {
        None => {
            parent.map.insert(name, value);
        }
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
    Ok(())
}

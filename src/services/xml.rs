// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

//! Well-formedness check that also reports the document's root element.
//!
//! The whole document is read, so a file truncated after a valid root tag is
//! still rejected. Namespaces are resolved and the root is reported in Clark
//! notation (`{uri}local`), or as a bare local name when unqualified.

use std::borrow::Cow;
use std::collections::HashMap;

use encoding_rs::{Encoding, UTF_8};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

use crate::error::{Error, Result};

/// Parse `bytes` as an XML document and return the namespace-qualified name
/// of its root element.
pub fn root_element(bytes: &[u8]) -> Result<String> {
    let text = decode(bytes)?;
    check_chars(&text, "document")?;

    let mut reader = NsReader::from_str(&text);
    let config = reader.config_mut();
    config.trim_text(true);
    config.check_end_names = true;

    let mut entities: HashMap<String, String> = HashMap::new();
    let mut root: Option<String> = None;
    let mut depth: usize = 0;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(Error::Xml(format!(
                    "{} at byte {}",
                    e,
                    reader.error_position()
                )));
            }
        };

        match event {
            Event::Start(ref start) | Event::Empty(ref start) => {
                let name = qualified_name(&reader, start)?;
                check_attributes(&reader, start, &entities)?;
                if depth == 0 {
                    if root.is_some() {
                        return Err(ill_formed(&reader, "multiple root elements"));
                    }
                    root = Some(name);
                }
                if matches!(event, Event::Start(_)) {
                    depth += 1;
                }
            }
            Event::End(_) => {
                // check_end_names already rejects an unmatched end tag
                depth = depth.saturating_sub(1);
            }
            Event::Text(_) | Event::CData(_) if depth == 0 => {
                return Err(ill_formed(&reader, "text outside the root element"));
            }
            Event::Text(ref text) => {
                let value = text
                    .unescape_with(|name| entities.get(name).map(String::as_str))
                    .map_err(|e| Error::Xml(format!("bad character data: {e}")))?;
                check_chars(&value, "character data")?;
            }
            Event::DocType(ref doctype) => {
                if root.is_some() {
                    return Err(ill_formed(&reader, "DOCTYPE after the root element"));
                }
                entities = declared_entities(&String::from_utf8_lossy(doctype));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth > 0 {
        return Err(Error::Xml(format!(
            "unexpected end of document: {depth} unclosed element(s)"
        )));
    }

    root.ok_or_else(|| Error::Xml("no root element found".into()))
}

/// Decode to UTF-8, honouring a byte-order mark first and then the
/// `encoding` of the XML declaration.
fn decode(bytes: &[u8]) -> Result<Cow<'_, str>> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => (declared_encoding(bytes)?, bytes),
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or_else(|| Error::Xml(format!("invalid {} byte sequence", encoding.name())))
}

fn declared_encoding(bytes: &[u8]) -> Result<&'static Encoding> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let Ok(Event::Decl(decl)) = reader.read_event_into(&mut buf) else {
        return Ok(UTF_8);
    };
    let Some(Ok(label)) = decl.encoding() else {
        return Ok(UTF_8);
    };

    match Encoding::for_label(&label) {
        // A declaration readable as ASCII cannot be 16-bit content without a BOM
        Some(encoding) if encoding.is_single_byte() || encoding == UTF_8 => Ok(encoding),
        Some(_) => Ok(UTF_8),
        None => Err(Error::Xml(format!(
            "unsupported encoding '{}'",
            String::from_utf8_lossy(&label)
        ))),
    }
}

fn qualified_name(reader: &NsReader<&[u8]>, start: &BytesStart<'_>) -> Result<String> {
    let (resolved, local) = reader.resolve_element(start.name());
    let local = utf8(local.as_ref())?;
    match resolved {
        ResolveResult::Bound(ns) => Ok(format!("{{{}}}{local}", utf8(ns.as_ref())?)),
        ResolveResult::Unbound => Ok(local),
        ResolveResult::Unknown(prefix) => Err(Error::Xml(format!(
            "unbound namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn check_attributes(
    reader: &NsReader<&[u8]>,
    element: &BytesStart<'_>,
    entities: &HashMap<String, String>,
) -> Result<()> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| Error::Xml(format!("malformed attribute: {e}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();

        if let (ResolveResult::Unknown(prefix), _) = reader.resolve_attribute(attr.key) {
            return Err(Error::Xml(format!(
                "unbound namespace prefix '{}' on attribute '{key}'",
                String::from_utf8_lossy(&prefix)
            )));
        }
        if attr.value.contains(&b'<') {
            return Err(Error::Xml(format!("'<' in value of attribute '{key}'")));
        }

        let value = attr
            .unescape_value_with(|name| entities.get(name).map(String::as_str))
            .map_err(|e| Error::Xml(format!("bad value of attribute '{key}': {e}")))?;
        check_chars(&value, "attribute value")?;
    }
    Ok(())
}

/// Internal-subset general entities: `<!ENTITY name "value">`. External
/// entities are recorded with an empty replacement.
fn declared_entities(doctype: &str) -> HashMap<String, String> {
    let mut entities = HashMap::new();
    let mut rest = doctype;

    while let Some(pos) = rest.find("<!ENTITY") {
        rest = rest[pos + "<!ENTITY".len()..].trim_start();
        if rest.starts_with('%') {
            continue;
        }

        let name_end = rest
            .find(|c: char| c.is_whitespace())
            .unwrap_or(rest.len());
        let name = &rest[..name_end];
        rest = rest[name_end..].trim_start();

        let value = match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let body = &rest[1..];
                let end = body.find(quote).unwrap_or(body.len());
                rest = &body[end..];
                body[..end].to_string()
            }
            _ => String::new(),
        };

        if !name.is_empty() {
            entities.entry(name.to_string()).or_insert(value);
        }
    }
    entities
}

/// Reject characters outside the XML 1.0 `Char` production.
fn check_chars(text: &str, what: &str) -> Result<()> {
    match text.chars().find(|&c| !is_xml_char(c)) {
        Some(c) => Err(Error::Xml(format!(
            "illegal character U+{:04X} in {what}",
            c as u32
        ))),
        None => Ok(()),
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..)
}

fn utf8(raw: &[u8]) -> Result<String> {
    std::str::from_utf8(raw)
        .map(str::to_owned)
        .map_err(|e| Error::Xml(format!("name is not valid UTF-8: {e}")))
}

fn ill_formed(reader: &NsReader<&[u8]>, what: &str) -> Error {
    Error::Xml(format!("{what} at byte {}", reader.buffer_position()))
}

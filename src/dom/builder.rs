//! Builds an [`XmlDom`] from XML text with quick-xml.
//!
//! The reader is strict about structure (balanced, properly nested tags and a
//! single root element) and lenient about content: DTD-declared entities that
//! cannot be resolved here are kept verbatim.

use memchr::memchr;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::arena::{Attribute, NodeId, XmlDom};
use crate::error::{Error, Result};
use crate::util::{resolve_entity, split_qualified};

/// Deepest element nesting accepted, counting the root as depth 1.
pub const MAX_DEPTH: usize = 256;

/// Parse XML text into an arena tree.
///
/// Fails with [`Error::MalformedDocument`] when the text cannot yield a
/// usable root element, or nests elements deeper than [`MAX_DEPTH`].
pub fn build_dom(text: &str) -> Result<XmlDom> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if text.trim().is_empty() {
        return Err(Error::malformed("document is empty"));
    }

    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(false);

    let mut dom = XmlDom::new();
    let mut stack: Vec<NodeId> = vec![dom.document()];
    let mut has_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let id = open_element(&mut dom, &stack, &e, &mut has_root)?;
                stack.push(id);
            }
            Ok(Event::Empty(e)) => {
                open_element(&mut dom, &stack, &e, &mut has_root)?;
            }
            Ok(Event::End(e)) => {
                if stack.len() <= 1 {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    return Err(Error::malformed(format!("unexpected closing tag </{name}>")));
                }
                stack.pop();
            }
            Ok(Event::Text(e)) => {
                let raw = String::from_utf8_lossy(e.as_ref());
                push_text(&mut dom, &stack, &raw)?;
            }
            Ok(Event::CData(e)) => {
                let raw = String::from_utf8_lossy(e.as_ref());
                push_text(&mut dom, &stack, &raw)?;
            }
            Ok(Event::GeneralRef(e)) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                let resolved = resolve_entity(&entity).unwrap_or_else(|| format!("&{entity};"));
                push_text(&mut dom, &stack, &resolved)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::malformed(format!(
                    "{e} (at byte {})",
                    reader.error_position()
                )));
            }
            // Declarations, comments, processing instructions, doctype
            _ => {}
        }
    }

    if let Some(&open) = stack.last()
        && stack.len() > 1
    {
        let name = dom.element_name(open).unwrap_or_default().to_string();
        return Err(Error::malformed(format!("unterminated element <{name}>")));
    }

    if !has_root {
        return Err(Error::malformed("no root element found"));
    }

    Ok(dom)
}

fn open_element(
    dom: &mut XmlDom,
    stack: &[NodeId],
    e: &BytesStart<'_>,
    has_root: &mut bool,
) -> Result<NodeId> {
    let qualified = std::str::from_utf8(e.name().as_ref())
        .map_err(|err| Error::malformed(format!("element name is not UTF-8: {err}")))?
        .to_string();

    let parent = stack.last().copied().unwrap_or(dom.document());
    if stack.len() > MAX_DEPTH {
        return Err(Error::malformed(format!(
            "<{qualified}> is nested deeper than {MAX_DEPTH} elements"
        )));
    }
    if stack.len() <= 1 {
        if *has_root {
            return Err(Error::malformed(format!(
                "second root element <{qualified}>"
            )));
        }
        *has_root = true;
    }

    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| {
            Error::malformed(format!("bad attribute on <{qualified}>: {err}"))
        })?;
        let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        attrs.push(Attribute {
            name,
            value: unescape_attr(&raw),
        });
    }

    let (_, local) = split_qualified(&qualified);
    let id = dom.create_element(local.to_string(), attrs);
    dom.append(parent, id);
    Ok(id)
}

fn push_text(dom: &mut XmlDom, stack: &[NodeId], text: &str) -> Result<()> {
    match stack {
        [_document] => {
            if text.trim().is_empty() {
                Ok(())
            } else {
                Err(Error::malformed("text outside the root element"))
            }
        }
        [.., parent] => {
            dom.append_text(*parent, text);
            Ok(())
        }
        [] => Err(Error::malformed("text outside the root element")),
    }
}

/// Resolve entity references in an attribute value. Unknown entities are
/// kept as written, like in text.
fn unescape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(amp) = memchr(b'&', rest.as_bytes()) {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let Some(end) = memchr(b';', after.as_bytes()) else {
            out.push_str(&rest[amp..]);
            return out;
        };
        let entity = &after[..end];
        match resolve_entity(entity) {
            Some(resolved) => out.push_str(&resolved),
            None => {
                out.push('&');
                out.push_str(entity);
                out.push(';');
            }
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

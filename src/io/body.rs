//! Body-level XML surgery on `word/document.xml`.
//!
//! The main document looks like:
//!
//! ```xml
//! <w:document xmlns:w="..." ...>
//!   <w:body>
//!     <w:p>...</w:p>
//!     <w:tbl>...</w:tbl>
//!     <w:sectPr>...</w:sectPr>
//!   </w:body>
//! </w:document>
//! ```
//!
//! Content is spliced in front of the trailing body-level `w:sectPr`, so the
//! base document keeps its page setup. Everything is done as a stream of
//! `quick_xml` events; no tree is built.

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::collections::HashMap;

use crate::error::{DocMergeError, Result};
use crate::io::package::DOCUMENT_PART;

const BODY: &[u8] = b"w:body";
const SECTION_PROPERTIES: &[u8] = b"w:sectPr";

// Header and footer references point at parts that are not carried over.
const DROPPED_ELEMENTS: [&[u8]; 2] = [b"w:headerReference", b"w:footerReference"];

// Attributes holding a relationship id of the main document part.
const RELATIONSHIP_ATTRIBUTES: [&[u8]; 4] = [b"r:id", b"r:embed", b"r:link", b"r:pict"];

/// Body content as owned events, ready to be spliced into another document.
pub type Fragment = Vec<Event<'static>>;

/// Namespace declaration on the root element, `(attribute, uri)`.
pub type Namespace = (String, String);

fn xml_err(e: impl std::fmt::Display) -> DocMergeError {
    DocMergeError::xml(DOCUMENT_PART, e)
}

/// A paragraph holding a single page break run.
pub fn page_break() -> Fragment {
    let mut br = BytesStart::new("w:br");
    br.push_attribute(("w:type", "page"));

    vec![
        Event::Start(BytesStart::new("w:p")),
        Event::Start(BytesStart::new("w:r")),
        Event::Empty(br),
        Event::End(BytesEnd::new("w:r")),
        Event::End(BytesEnd::new("w:p")),
    ]
}

/// Namespace declarations on the root element.
pub fn root_namespaces(xml: &[u8]) -> Result<Vec<Namespace>> {
    let mut reader = Reader::from_reader(xml);

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) | Event::Empty(e) => return namespaces_of(&e),
            Event::Eof => return Ok(Vec::new()),
            _ => {}
        }
    }
}

fn namespaces_of(element: &BytesStart<'_>) -> Result<Vec<Namespace>> {
    let mut namespaces = Vec::new();
    for attr in element.attributes() {
        let attr = attr.map_err(xml_err)?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            namespaces.push((
                String::from_utf8_lossy(key).into_owned(),
                attr.unescape_value().map_err(xml_err)?.into_owned(),
            ));
        }
    }
    Ok(namespaces)
}

/// Direct and nested content of `w:body`, minus the trailing body-level
/// `w:sectPr`.
///
/// Relationship id attributes are rewritten through `relationship_ids`; ids
/// without a mapping are kept as they are.
pub fn body_content(xml: &[u8], relationship_ids: &HashMap<String, String>) -> Result<Fragment> {
    let mut reader = Reader::from_reader(xml);
    let mut fragment = Vec::new();

    // Open elements; `w:document` is depth 1, `w:body` depth 2.
    let mut depth = 0usize;
    let mut in_body = false;
    let mut skip_until: Option<usize> = None;

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Eof => break,
            Event::Start(e) => {
                depth += 1;
                if skip_until.is_some() {
                    continue;
                }
                if !in_body {
                    in_body = depth == 2 && e.name().as_ref() == BODY;
                    continue;
                }
                let name = e.name();
                if (depth == 3 && name.as_ref() == SECTION_PROPERTIES)
                    || DROPPED_ELEMENTS.contains(&name.as_ref())
                {
                    skip_until = Some(depth);
                    continue;
                }
                fragment.push(Event::Start(remap_relationships(&e, relationship_ids)?));
            }
            Event::End(e) => {
                let closing = depth;
                depth = depth.saturating_sub(1);
                if let Some(until) = skip_until {
                    if closing == until {
                        skip_until = None;
                    }
                    continue;
                }
                if in_body && closing == 2 {
                    in_body = false;
                    continue;
                }
                if in_body {
                    fragment.push(Event::End(e.into_owned()));
                }
            }
            Event::Empty(e) => {
                if skip_until.is_some() || !in_body {
                    continue;
                }
                let name = e.name();
                if (depth == 2 && name.as_ref() == SECTION_PROPERTIES)
                    || DROPPED_ELEMENTS.contains(&name.as_ref())
                {
                    continue;
                }
                fragment.push(Event::Empty(remap_relationships(&e, relationship_ids)?));
            }
            other => {
                if in_body && skip_until.is_none() {
                    fragment.push(other.into_owned());
                }
            }
        }
    }

    Ok(fragment)
}

/// Relationship ids referenced by the body content [`body_content`] would
/// return, in first-use order.
pub fn referenced_relationships(xml: &[u8]) -> Result<Vec<String>> {
    let mut ids: Vec<String> = Vec::new();

    for event in body_content(xml, &HashMap::new())? {
        let (Event::Start(element) | Event::Empty(element)) = event else {
            continue;
        };
        for attr in element.attributes() {
            let attr = attr.map_err(xml_err)?;
            if RELATIONSHIP_ATTRIBUTES.contains(&attr.key.as_ref()) {
                let id = attr.unescape_value().map_err(xml_err)?.into_owned();
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
    }

    Ok(ids)
}

/// Insert `fragment` at the end of the body, before a trailing body-level
/// `w:sectPr` if there is one.
///
/// Root namespace declarations from `namespaces` that `xml` lacks are added
/// to the root element.
pub fn append_to_body(xml: &[u8], fragment: &[Event<'static>], namespaces: &[Namespace]) -> Result<Vec<u8>> {
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len() + fragment.len() * 32));

    let mut depth = 0usize;
    let mut in_body = false;
    let mut inserted = false;

    loop {
        let event = reader.read_event().map_err(xml_err)?;
        match event {
            Event::Eof => break,
            Event::Start(e) => {
                depth += 1;
                if depth == 1 {
                    writer
                        .write_event(Event::Start(with_namespaces(&e, namespaces)?))
                        .map_err(xml_err)?;
                    continue;
                }
                if depth == 2 && e.name().as_ref() == BODY {
                    in_body = true;
                } else if in_body && !inserted && depth == 3 && e.name().as_ref() == SECTION_PROPERTIES {
                    write_fragment(&mut writer, fragment)?;
                    inserted = true;
                }
                writer.write_event(Event::Start(e)).map_err(xml_err)?;
            }
            Event::Empty(e) => {
                if depth == 1 && e.name().as_ref() == BODY {
                    let name = String::from_utf8_lossy(BODY).into_owned();
                    writer.write_event(Event::Start(e)).map_err(xml_err)?;
                    write_fragment(&mut writer, fragment)?;
                    writer
                        .write_event(Event::End(BytesEnd::new(name)))
                        .map_err(xml_err)?;
                    inserted = true;
                    continue;
                }
                if in_body && !inserted && depth == 2 && e.name().as_ref() == SECTION_PROPERTIES {
                    write_fragment(&mut writer, fragment)?;
                    inserted = true;
                }
                writer.write_event(Event::Empty(e)).map_err(xml_err)?;
            }
            Event::End(e) => {
                if depth == 2 && in_body && e.name().as_ref() == BODY {
                    if !inserted {
                        write_fragment(&mut writer, fragment)?;
                        inserted = true;
                    }
                    in_body = false;
                }
                depth = depth.saturating_sub(1);
                writer.write_event(Event::End(e)).map_err(xml_err)?;
            }
            other => writer.write_event(other).map_err(xml_err)?,
        }
    }

    if !inserted {
        return Err(xml_err("document has no w:body element"));
    }

    Ok(writer.into_inner())
}

fn write_fragment(writer: &mut Writer<Vec<u8>>, fragment: &[Event<'static>]) -> Result<()> {
    for event in fragment {
        writer.write_event(event.borrow()).map_err(xml_err)?;
    }
    Ok(())
}

fn with_namespaces(root: &BytesStart<'_>, namespaces: &[Namespace]) -> Result<BytesStart<'static>> {
    let existing = namespaces_of(root)?;
    let mut root = root.to_owned().into_owned();

    for (key, uri) in namespaces {
        if !existing.iter().any(|(existing_key, _)| existing_key == key) {
            root.push_attribute((key.as_str(), uri.as_str()));
        }
    }

    Ok(root)
}

fn remap_relationships(
    element: &BytesStart<'_>,
    relationship_ids: &HashMap<String, String>,
) -> Result<BytesStart<'static>> {
    let needs_remap = !relationship_ids.is_empty()
        && element
            .attributes()
            .flatten()
            .any(|attr| RELATIONSHIP_ATTRIBUTES.contains(&attr.key.as_ref()));

    if !needs_remap {
        return Ok(element.to_owned().into_owned());
    }

    let mut remapped = BytesStart::new(String::from_utf8_lossy(element.name().as_ref()).into_owned());
    for attr in element.attributes() {
        let attr = attr.map_err(xml_err)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(xml_err)?.into_owned();

        let value = if RELATIONSHIP_ATTRIBUTES.contains(&attr.key.as_ref()) {
            relationship_ids.get(&value).cloned().unwrap_or(value)
        } else {
            value
        };
        remapped.push_attribute((key.as_str(), value.as_str()));
    }

    Ok(remapped)
}

//! In-memory OPC package.
//!
//! A `.docx` file is a zip archive of named parts. [`DocxPackage`] keeps every
//! part as raw bytes in archive order and knows how to read and rewrite the
//! two bookkeeping parts a merge touches: the main document's relationships
//! and `[Content_Types].xml`.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::path::{Path, PathBuf};

use crate::error::{DocMergeError, Result};

/// Main document part.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Relationships of the main document part.
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";

/// Content type registry.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

const IMAGE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

const HYPERLINK_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

/// One named part of a package.
#[derive(Debug, Clone)]
pub struct Part {
    /// Part name without a leading slash, e.g. `word/document.xml`.
    pub name: String,
    /// Raw part bytes.
    pub data: Vec<u8>,
}

/// One entry of a `.rels` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship id, e.g. `rId4`.
    pub id: String,
    /// Relationship type URI.
    pub kind: String,
    /// Target, relative to the `word/` directory unless external.
    pub target: String,
    /// Whether `TargetMode="External"`.
    pub external: bool,
}

impl Relationship {
    /// Whether this relationship points at an image part.
    pub fn is_image(&self) -> bool {
        self.kind == IMAGE_REL_TYPE && !self.external
    }

    /// Whether this relationship is an external hyperlink.
    pub fn is_hyperlink(&self) -> bool {
        self.kind == HYPERLINK_REL_TYPE && self.external
    }
}

/// A document package held in memory.
#[derive(Debug, Clone)]
pub struct DocxPackage {
    source: PathBuf,
    parts: Vec<Part>,
}

impl DocxPackage {
    /// Build a package from parts read out of `source`.
    pub fn new(source: impl Into<PathBuf>, parts: Vec<Part>) -> Self {
        Self {
            source: source.into(),
            parts,
        }
    }

    /// File the package was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Every part, in archive order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Whether a part with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|part| part.name == name)
    }

    /// Bytes of the named part.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|part| part.name == name)
            .map(|part| part.data.as_slice())
    }

    /// Replace the named part, or add it at the end.
    pub fn set_part(&mut self, name: impl Into<String>, data: Vec<u8>) {
        let name = name.into();
        match self.parts.iter_mut().find(|part| part.name == name) {
            Some(part) => part.data = data,
            None => self.parts.push(Part { name, data }),
        }
    }

    /// The main document XML.
    ///
    /// # Errors
    ///
    /// Returns [`DocMergeError::CorruptedDocument`] if the package has no
    /// `word/document.xml`.
    pub fn document_xml(&self) -> Result<&[u8]> {
        self.part(DOCUMENT_PART)
            .ok_or_else(|| DocMergeError::corrupted(&self.source, format!("missing part {DOCUMENT_PART}")))
    }

    /// Relationships of the main document. A package without a rels part
    /// simply has none.
    pub fn relationships(&self) -> Result<Vec<Relationship>> {
        let Some(xml) = self.part(DOCUMENT_RELS_PART) else {
            return Ok(Vec::new());
        };

        let mut reader = Reader::from_reader(xml);
        let mut relationships = Vec::new();

        loop {
            match reader.read_event().map_err(|e| DocMergeError::xml(DOCUMENT_RELS_PART, e))? {
                Event::Eof => break,
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                    relationships.push(parse_relationship(&e)?);
                }
                _ => {}
            }
        }

        Ok(relationships)
    }

    /// Rewrite the main document's relationships part.
    pub fn set_relationships(&mut self, relationships: &[Relationship]) -> Result<()> {
        let xml = write_relationships(relationships)?;
        self.set_part(DOCUMENT_RELS_PART, xml);
        Ok(())
    }

    /// Make sure `[Content_Types].xml` maps `extension` to `content_type`.
    ///
    /// An existing `Default` for the extension is left untouched.
    pub fn ensure_default_content_type(&mut self, extension: &str, content_type: &str) -> Result<()> {
        self.ensure_content_type("Default", "Extension", extension, content_type)
    }

    /// Make sure `[Content_Types].xml` has an `Override` for part `name`.
    pub fn ensure_override_content_type(&mut self, name: &str, content_type: &str) -> Result<()> {
        self.ensure_content_type("Override", "PartName", &format!("/{name}"), content_type)
    }

    /// `Override` content type registered for part `name`, if any.
    pub fn override_content_type(&self, name: &str) -> Result<Option<String>> {
        self.find_content_type(b"Override", b"PartName", &format!("/{name}"))
    }

    /// `Default` content type registered for `extension`, if any.
    pub fn default_content_type(&self, extension: &str) -> Result<Option<String>> {
        self.find_content_type(b"Default", b"Extension", extension)
    }

    fn content_types_xml(&self) -> Result<&[u8]> {
        self.part(CONTENT_TYPES_PART)
            .ok_or_else(|| DocMergeError::corrupted(&self.source, format!("missing part {CONTENT_TYPES_PART}")))
    }

    fn find_content_type(&self, tag: &[u8], key_attr: &[u8], key: &str) -> Result<Option<String>> {
        let mut reader = Reader::from_reader(self.content_types_xml()?);

        loop {
            match reader.read_event().map_err(|e| DocMergeError::xml(CONTENT_TYPES_PART, e))? {
                Event::Eof => return Ok(None),
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == tag => {
                    if let Some(value) = attribute(CONTENT_TYPES_PART, &e, key_attr)?
                        && value.eq_ignore_ascii_case(key)
                    {
                        return attribute(CONTENT_TYPES_PART, &e, b"ContentType");
                    }
                }
                _ => {}
            }
        }
    }

    // Part names and extensions compare case-insensitively.
    fn ensure_content_type(&mut self, tag: &str, key_attr: &str, key: &str, content_type: &str) -> Result<()> {
        if self
            .find_content_type(tag.as_bytes(), key_attr.as_bytes(), key)?
            .is_some()
        {
            return Ok(());
        }

        let xml = self.content_types_xml()?;
        let mut reader = Reader::from_reader(xml);
        let mut writer = Writer::new(Vec::with_capacity(xml.len() + 128));

        loop {
            let event = reader.read_event().map_err(|e| DocMergeError::xml(CONTENT_TYPES_PART, e))?;
            match event {
                Event::Eof => break,
                Event::End(ref e) if e.local_name().as_ref() == b"Types" => {
                    let mut entry = BytesStart::new(tag);
                    entry.push_attribute((key_attr, key));
                    entry.push_attribute(("ContentType", content_type));
                    writer
                        .write_event(Event::Empty(entry))
                        .map_err(|e| DocMergeError::xml(CONTENT_TYPES_PART, e))?;
                }
                _ => {}
            }
            writer
                .write_event(event)
                .map_err(|e| DocMergeError::xml(CONTENT_TYPES_PART, e))?;
        }

        let xml = writer.into_inner();
        self.set_part(CONTENT_TYPES_PART, xml);
        Ok(())
    }
}

/// Name of the relationships part belonging to part `name`, e.g.
/// `word/charts/_rels/chart1.xml.rels` for `word/charts/chart1.xml`.
pub fn relationships_part_of(name: &str) -> String {
    match name.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{name}.rels"),
    }
}

/// Content type for an image file extension.
pub fn image_content_type(extension: &str) -> String {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg".to_string(),
        "tif" | "tiff" => "image/tiff".to_string(),
        "svg" => "image/svg+xml".to_string(),
        "emf" => "image/x-emf".to_string(),
        "wmf" => "image/x-wmf".to_string(),
        other => format!("image/{other}"),
    }
}

/// Resolve a relationship target against the `word/` directory into a part
/// name, folding `..` segments.
pub fn resolve_part_name(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments = vec!["word"];
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

fn attribute(part: &str, element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| DocMergeError::xml(part, e))?;
        if attr.key.as_ref() == key {
            let value = attr
                .unescape_value()
                .map_err(|e| DocMergeError::xml(part, e))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn parse_relationship(element: &BytesStart<'_>) -> Result<Relationship> {
    let required = |key: &[u8]| -> Result<String> {
        attribute(DOCUMENT_RELS_PART, element, key)?.ok_or_else(|| {
            DocMergeError::xml(
                DOCUMENT_RELS_PART,
                format!("Relationship without {}", String::from_utf8_lossy(key)),
            )
        })
    };

    let external = attribute(DOCUMENT_RELS_PART, element, b"TargetMode")?.is_some_and(|mode| mode == "External");

    Ok(Relationship {
        id: required(b"Id")?,
        kind: required(b"Type")?,
        target: required(b"Target")?,
        external,
    })
}

fn write_relationships(relationships: &[Relationship]) -> Result<Vec<u8>> {
    let map_err = |e| DocMergeError::xml(DOCUMENT_RELS_PART, e);
    let mut writer = Writer::new(Vec::new());

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(map_err)?;

    let mut root = BytesStart::new("Relationships");
    root.push_attribute(("xmlns", RELATIONSHIPS_NS));
    writer.write_event(Event::Start(root)).map_err(map_err)?;

    for relationship in relationships {
        let mut element = BytesStart::new("Relationship");
        element.push_attribute(("Id", relationship.id.as_str()));
        element.push_attribute(("Type", relationship.kind.as_str()));
        element.push_attribute(("Target", relationship.target.as_str()));
        if relationship.external {
            element.push_attribute(("TargetMode", "External"));
        }
        writer.write_event(Event::Empty(element)).map_err(map_err)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("Relationships")))
        .map_err(map_err)?;

    Ok(writer.into_inner())
}

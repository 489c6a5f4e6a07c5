//! A loaded word-processing document that other documents can be appended to.
//!
//! Appending copies the other document's body into this one. Whatever the
//! appended body references (images, charts, hyperlinks) comes along: the
//! relationships are re-created under fresh ids and internal parts are copied
//! under fresh names. Styles, numbering, headers and footers are taken from
//! the base document.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use quick_xml::events::Event;

use crate::error::{DocMergeError, Result};
use crate::io::body;
use crate::io::package::{
    DOCUMENT_PART, DocxPackage, Relationship, image_content_type, relationships_part_of, resolve_part_name,
};
use crate::io::reader::DocxReader;
use crate::io::writer::{DocxWriter, WriteStatistics};

/// An editable document.
#[derive(Debug, Clone)]
pub struct DocxDocument {
    package: DocxPackage,
    imported_parts: usize,
}

impl DocxDocument {
    /// Load a document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let loaded = DocxReader::new().load(path)?;
        Ok(Self::from_package(loaded.package))
    }

    /// Wrap an already loaded package.
    pub fn from_package(package: DocxPackage) -> Self {
        Self {
            package,
            imported_parts: 0,
        }
    }

    /// Underlying package.
    pub fn package(&self) -> &DocxPackage {
        &self.package
    }

    /// File this document was loaded from.
    pub fn source(&self) -> &Path {
        self.package.source()
    }

    /// Append a paragraph holding a page break.
    pub fn add_page_break(&mut self) -> Result<()> {
        self.splice(&body::page_break(), &[])
    }

    /// Append the whole body of `other`.
    ///
    /// Every relationship the appended body references is re-created here
    /// under a fresh id, so no id of `other` survives in the result.
    ///
    /// # Errors
    ///
    /// - [`DocMergeError::CorruptedDocument`] if the body references a
    ///   relationship or part `other` does not have.
    /// - [`DocMergeError::UnsupportedContent`] if a referenced part has
    ///   relationships of its own (e.g. a chart with an embedded workbook).
    pub fn append(&mut self, other: &DocxDocument) -> Result<()> {
        let other_xml = other.package.document_xml()?;
        let referenced = body::referenced_relationships(other_xml)?;
        let relationship_ids = self.import_relationships(&other.package, &referenced)?;

        let fragment = body::body_content(other_xml, &relationship_ids)?;
        let namespaces = body::root_namespaces(other_xml)?;

        tracing::debug!(
            from = %other.source().display(),
            events = fragment.len(),
            relationships = relationship_ids.len(),
            "appending document body"
        );

        self.splice(&fragment, &namespaces)
    }

    /// Save to `path`, creating parent directories and replacing any
    /// existing file.
    pub fn save(&self, path: &Path) -> Result<WriteStatistics> {
        DocxWriter::new().save_with_stats(&self.package, path)
    }

    fn splice(&mut self, fragment: &[Event<'static>], namespaces: &[body::Namespace]) -> Result<()> {
        let merged = body::append_to_body(self.package.document_xml()?, fragment, namespaces)?;
        self.package.set_part(DOCUMENT_PART, merged);
        Ok(())
    }

    /// Re-create the relationships `referenced` by `other`'s body here.
    ///
    /// Returns the id mapping from `other`'s ids to the new ones.
    fn import_relationships(
        &mut self,
        other: &DocxPackage,
        referenced: &[String],
    ) -> Result<HashMap<String, String>> {
        let mut mapping = HashMap::new();
        if referenced.is_empty() {
            return Ok(mapping);
        }

        let source_relationships = other.relationships()?;
        let mut relationships = self.package.relationships()?;
        let mut taken: HashSet<String> = relationships.iter().map(|r| r.id.clone()).collect();
        let mut next_id = 1usize;

        for id in referenced {
            let relationship = source_relationships
                .iter()
                .find(|r| &r.id == id)
                .ok_or_else(|| {
                    DocMergeError::corrupted(other.source(), format!("body references unknown relationship {id}"))
                })?;

            let new_id = loop {
                let candidate = format!("rId{next_id}");
                next_id += 1;
                if !taken.contains(&candidate) {
                    break candidate;
                }
            };
            taken.insert(new_id.clone());

            let target = if relationship.external {
                relationship.target.clone()
            } else {
                self.import_part(other, &relationship.target)?
            };

            mapping.insert(id.clone(), new_id.clone());
            relationships.push(Relationship {
                id: new_id,
                kind: relationship.kind.clone(),
                target,
                external: relationship.external,
            });
        }

        self.package.set_relationships(&relationships)?;
        Ok(mapping)
    }

    /// Copy one part of `other` next to where it lived, under a name unused
    /// here; returns the new relationship target.
    fn import_part(&mut self, other: &DocxPackage, target: &str) -> Result<String> {
        let source_name = resolve_part_name(target);
        let data = other.part(&source_name).ok_or_else(|| {
            DocMergeError::corrupted(other.source(), format!("missing part {source_name}"))
        })?;

        if other.contains(&relationships_part_of(&source_name)) {
            return Err(DocMergeError::unsupported(
                other.source(),
                format!("part {source_name} has relationships of its own"),
            ));
        }

        let path = Path::new(&source_name);
        let dir = path.parent().and_then(|p| p.to_str()).unwrap_or("");
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("part");
        let extension = path.extension().and_then(|e| e.to_str());

        let new_name = loop {
            self.imported_parts += 1;
            let file = match extension {
                Some(ext) => format!("{stem}_m{}.{ext}", self.imported_parts),
                None => format!("{stem}_m{}", self.imported_parts),
            };
            let candidate = if dir.is_empty() { file } else { format!("{dir}/{file}") };
            if !self.package.contains(&candidate) {
                break candidate;
            }
        };

        self.package.set_part(new_name.clone(), data.to_vec());

        if let Some(content_type) = other.override_content_type(&source_name)? {
            self.package.ensure_override_content_type(&new_name, &content_type)?;
        } else if let Some(ext) = extension {
            let content_type = match other.default_content_type(ext)? {
                Some(content_type) => content_type,
                None => image_content_type(ext),
            };
            self.package
                .ensure_default_content_type(&ext.to_ascii_lowercase(), &content_type)?;
        }

        Ok(part_target(&new_name))
    }
}

// Targets are relative to `word/`; parts elsewhere get an absolute name.
fn part_target(name: &str) -> String {
    match name.strip_prefix("word/") {
        Some(relative) => relative.to_string(),
        None => format!("/{name}"),
    }
}

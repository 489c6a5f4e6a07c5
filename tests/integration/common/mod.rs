//! Shared helpers for docmerge integration tests.
//!
//! Every test gets a throwaway workspace laid out like a real run:
//!
//! ```text
//! <tmp>/input/docx/   source documents
//! <tmp>/input/jobs.*  manifest
//! <tmp>/output/       run log and output/docx/
//! <tmp>/error/        error log
//! ```

#![allow(dead_code)]

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use docmerge::{Config, MergeRunner, RunContext, RunSummary};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"></Relationships>"#;

/// A temporary run workspace.
pub struct Workspace {
    dir: TempDir,
    pub config: Config,
}

impl Workspace {
    /// Create the directory layout with a CSV manifest path.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = dir.path();
        fs::create_dir_all(root.join("input").join("docx")).expect("Failed to create input dir");

        let config = Config::new(
            root.join("input"),
            root.join("output"),
            root.join("error"),
            root.join("input").join("jobs.csv"),
        );

        Self { dir, config }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a one-paragraph source document under `input/docx`.
    pub fn source(&self, name: &str, text: &str) -> PathBuf {
        let path = self.config.input_dir.join("docx").join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        write_docx(&path, text);
        path
    }

    /// Write a source that is not a document package.
    pub fn corrupt_source(&self, name: &str) -> PathBuf {
        let path = self.config.input_dir.join("docx").join(name);
        fs::write(&path, "this is not a zip archive").unwrap();
        path
    }

    /// Write the CSV manifest.
    pub fn csv_manifest(&self, contents: &str) {
        fs::write(&self.config.manifest, contents).unwrap();
    }

    /// Write an xlsx manifest and point the config at it.
    pub fn xlsx_manifest(&mut self, rows: &[&[&str]]) {
        let path = self.config.input_dir.join("jobs.xlsx");
        write_xlsx(&path, rows);
        self.config.manifest = path;
    }

    pub fn context(&self) -> RunContext {
        RunContext::from_config(&self.config)
    }

    /// Run with a fresh context and return it with the summary.
    pub fn run(&self) -> (RunContext, RunSummary) {
        let ctx = self.context();
        let summary = MergeRunner::new(&ctx).run().expect("run failed");
        (ctx, summary)
    }

    pub fn output(&self, name: &str) -> PathBuf {
        self.config.output_dir.join("docx").join(name)
    }

    /// Run log lines.
    pub fn log_lines(&self, ctx: &RunContext) -> Vec<String> {
        fs::read_to_string(&ctx.log_path)
            .expect("run log missing")
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// `word/document.xml` of an output document.
    pub fn output_xml(&self, name: &str) -> String {
        document_xml(&self.output(name))
    }
}

/// Write a minimal document with one paragraph of `text`.
pub fn write_docx(path: &Path, text: &str) {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body><w:p><w:r><w:t>{text}</w:t></w:r></w:p><w:sectPr/></w:body></w:document>"#
    );

    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    let parts: [(&str, &[u8]); 4] = [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", PACKAGE_RELS.as_bytes()),
        ("word/document.xml", document.as_bytes()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS.as_bytes()),
    ];
    for (name, data) in parts {
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap();
}

/// Write a single-sheet workbook of inline strings. Empty strings leave the
/// cell out.
pub fn write_xlsx(path: &Path, rows: &[&[&str]]) {
    let mut sheet_rows = String::new();
    for (r, row) in rows.iter().enumerate() {
        sheet_rows.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let column = (b'A' + c as u8) as char;
            sheet_rows.push_str(&format!(
                r#"<c r="{column}{}" t="inlineStr"><is><t>{value}</t></is></c>"#,
                r + 1
            ));
        }
        sheet_rows.push_str("</row>");
    }

    let parts: Vec<(&str, String)> = vec![
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#.to_string(),
        ),
        (
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#.to_string(),
        ),
        (
            "xl/workbook.xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#.to_string(),
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#.to_string(),
        ),
        (
            "xl/worksheets/sheet1.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{sheet_rows}</sheetData></worksheet>"#
            ),
        ),
    ];

    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, data) in parts {
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(data.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

/// `word/document.xml` of a document on disk.
pub fn document_xml(path: &Path) -> String {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entry = archive.by_name("word/document.xml").unwrap();
    let mut xml = String::new();
    entry.read_to_string(&mut xml).unwrap();
    xml
}

/// Number of page breaks in a document body.
pub fn page_breaks(xml: &str) -> usize {
    xml.matches(r#"w:type="page""#).count()
}

/// Byte offsets of `markers` in `xml`, panicking if one is absent.
pub fn positions(xml: &str, markers: &[&str]) -> Vec<usize> {
    markers
        .iter()
        .map(|marker| {
            xml.find(&format!(">{marker}<"))
                .unwrap_or_else(|| panic!("{marker} not found in output"))
        })
        .collect()
}

//! Document fixtures written to temporary directories
//!
//! Containers carry the full package structure (content types, package and
//! part relationships) so tests exercise relationship resolution.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/comments.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.comments+xml"/>
</Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments" Target="comments.xml"/>
</Relationships>"#;

/// Builder for a word-processing document fixture
#[derive(Debug, Default, Clone)]
pub struct DocxFixture {
    paragraphs: Vec<String>,
    comments: Vec<String>,
    /// Replaces the generated comments part verbatim
    comments_xml: Option<String>,
}

impl DocxFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: &str) -> Self {
        self.paragraphs
            .push(format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", text));
        self
    }

    pub fn insertion(mut self, author: &str, text: &str) -> Self {
        let id = self.paragraphs.len();
        self.paragraphs.push(format!(
            r#"<w:p><w:ins w:id="{id}" w:author="{author}" w:date="2024-03-01T09:00:00Z"><w:r><w:t>{text}</w:t></w:r></w:ins></w:p>"#
        ));
        self
    }

    pub fn deletion(mut self, author: &str, text: &str) -> Self {
        let id = self.paragraphs.len();
        self.paragraphs.push(format!(
            r#"<w:p><w:del w:id="{id}" w:author="{author}" w:date="2024-03-01T09:05:00Z"><w:r><w:delText>{text}</w:delText></w:r></w:del></w:p>"#
        ));
        self
    }

    /// Comment anchored to a new paragraph of body text
    pub fn comment(mut self, author: &str, text: &str) -> Self {
        let id = self.comments.len();
        self.paragraphs.push(format!(
            r#"<w:p><w:commentRangeStart w:id="{id}"/><w:r><w:t>commented</w:t></w:r><w:commentRangeEnd w:id="{id}"/><w:r><w:commentReference w:id="{id}"/></w:r></w:p>"#
        ));
        self.comments.push(format!(
            r#"<w:comment w:id="{id}" w:author="{author}" w:date="2024-03-02T12:00:00Z"><w:p><w:r><w:t>{text}</w:t></w:r></w:p></w:comment>"#
        ));
        self
    }

    /// Write `xml` as the comments part instead of the generated one
    pub fn comments_xml(mut self, xml: &str) -> Self {
        self.comments_xml = Some(xml.to_string());
        self
    }

    /// Three insertions and two deletions, no comments
    pub fn five_revisions() -> Self {
        Self::new()
            .insertion("Ana", "alpha")
            .insertion("Ana", "beta")
            .insertion("Ben", "gamma")
            .deletion("Ben", "delta")
            .deletion("Ana", "epsilon")
    }

    /// Same text content with every revision accepted and comments dropped
    pub fn flattened(&self) -> Self {
        Self {
            paragraphs: vec!["<w:p><w:r><w:t>flattened text</w:t></w:r></w:p>".to_string()],
            comments: Vec::new(),
            comments_xml: None,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        let mut part = |name: &str, content: &str| {
            writer.start_file(name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        };

        part("[Content_Types].xml", CONTENT_TYPES);
        part("_rels/.rels", PACKAGE_RELS);
        part(
            "word/document.xml",
            &format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{}"><w:body>{}<w:sectPr/></w:body></w:document>"#,
                W_NS,
                self.paragraphs.concat()
            ),
        );
        let comments = match &self.comments_xml {
            Some(xml) => Some(xml.clone()),
            None if self.comments.is_empty() => None,
            None => Some(format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:comments xmlns:w="{}">{}</w:comments>"#,
                W_NS,
                self.comments.concat()
            )),
        };
        if let Some(comments) = comments {
            part("word/_rels/document.xml.rels", DOCUMENT_RELS);
            part("word/comments.xml", &comments);
        }

        writer.finish().unwrap().into_inner()
    }

    pub fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.to_bytes()).unwrap();
        path
    }
}

/// Route tracing output through the test harness
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

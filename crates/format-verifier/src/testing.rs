//! Document fixtures for unit tests

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Three insertions and two deletions
pub(crate) const INSERTIONS_AND_DELETIONS: &str = r#"
<w:p><w:ins w:id="1" w:author="Ana" w:date="2024-05-01T10:00:00Z"><w:r><w:t>first</w:t></w:r></w:ins></w:p>
<w:p><w:ins w:id="2" w:author="Ana"><w:r><w:t>second</w:t></w:r></w:ins></w:p>
<w:p><w:ins w:id="3" w:author="Ben"><w:r><w:t>third</w:t></w:r></w:ins></w:p>
<w:p><w:del w:id="4" w:author="Ben"><w:r><w:delText>gone</w:delText></w:r></w:del></w:p>
<w:p><w:del w:id="5" w:author="Ana"><w:r><w:delText>also gone</w:delText></w:r></w:del></w:p>"#;

pub(crate) fn docx(body: &str, comment_entries: Option<&str>) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    writer.start_file("word/document.xml", options).unwrap();
    write!(
        writer,
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="{W_NS}"><w:body>{body}</w:body></w:document>"#
    )
    .unwrap();

    if let Some(entries) = comment_entries {
        writer.start_file("word/comments.xml", options).unwrap();
        write!(
            writer,
            r#"<?xml version="1.0" encoding="UTF-8"?><w:comments xmlns:w="{W_NS}">{entries}</w:comments>"#
        )
        .unwrap();
    }

    writer.finish().unwrap().into_inner()
}

pub(crate) fn write_docx(
    dir: &Path,
    name: &str,
    body: &str,
    comment_entries: Option<&str>,
) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, docx(body, comment_entries)).unwrap();
    path
}

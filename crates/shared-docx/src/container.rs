//! Container opening and part resolution
//!
//! A document container is a zip archive of XML parts. The primary content
//! part is located through the package relationships (`_rels/.rels`) and the
//! comments part through the primary part's own relationships, with the
//! conventional part names as fallbacks.

use crate::error::InspectError;
use crate::xml::plain_attr;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use zip::result::ZipError;
use zip::ZipArchive;

/// Conventional name of the primary content part
pub const DEFAULT_MAIN_PART: &str = "word/document.xml";

/// Conventional name of the comments part
pub const DEFAULT_COMMENTS_PART: &str = "word/comments.xml";

const PACKAGE_RELS: &str = "_rels/.rels";
const OFFICE_DOCUMENT_REL: &str = "/officeDocument";
const COMMENTS_REL: &str = "/comments";

/// An opened document container with its relevant parts loaded
///
/// Parts are read into memory when the snapshot is created; the archive
/// itself is not kept open. Snapshots are read-only.
#[derive(Debug, Clone)]
pub struct DocxSnapshot {
    source: PathBuf,
    main_part: String,
    document_xml: Vec<u8>,
    comments_part: Option<String>,
    comments_xml: Option<Vec<u8>>,
}

impl DocxSnapshot {
    /// Open the container at `path`
    ///
    /// # Errors
    /// - `InspectError::FileNotFound` - nothing exists at `path`
    /// - `InspectError::InvalidDocument` - not a zip archive, or no primary content part
    /// - `InspectError::Io` - the file exists but could not be read
    pub fn open(path: impl AsRef<Path>) -> Result<Self, InspectError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InspectError::FileNotFound(path.to_path_buf()));
        }

        let bytes = std::fs::read(path).map_err(|source| InspectError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_bytes(&bytes, path)
    }

    /// Open a container already held in memory
    ///
    /// `source` labels the snapshot in errors and results.
    pub fn from_bytes(bytes: &[u8], source: impl Into<PathBuf>) -> Result<Self, InspectError> {
        let source = source.into();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
            InspectError::invalid(&source, format!("not a valid zip container ({})", e))
        })?;

        let main_candidate = resolve_main_part(&mut archive, &source)?;
        let (main_part, document_xml) =
            read_first(&mut archive, &[main_candidate.as_str(), DEFAULT_MAIN_PART], &source)?
                .ok_or_else(|| {
                    InspectError::invalid(
                        &source,
                        format!("missing primary content part '{}'", main_candidate),
                    )
                })?;

        let comments_candidate = resolve_comments_part(&mut archive, &main_part, &source)?;
        let mut candidates = Vec::with_capacity(2);
        if let Some(ref name) = comments_candidate {
            candidates.push(name.as_str());
        }
        candidates.push(DEFAULT_COMMENTS_PART);
        let comments = read_first(&mut archive, &candidates, &source)?;

        debug!(
            source = %source.display(),
            main_part = %main_part,
            main_part_bytes = document_xml.len(),
            comments_part = ?comments.as_ref().map(|(name, _)| name),
            "Opened document container"
        );

        let (comments_part, comments_xml) = match comments {
            Some((name, xml)) => (Some(name), Some(xml)),
            None => (None, None),
        };

        Ok(Self {
            source,
            main_part,
            document_xml,
            comments_part,
            comments_xml,
        })
    }

    /// Path (or label) the snapshot was opened from
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Name of the primary content part inside the archive
    pub fn main_part(&self) -> &str {
        &self.main_part
    }

    pub fn document_xml(&self) -> &[u8] {
        &self.document_xml
    }

    /// Name of the comments part, if the container has one
    pub fn comments_part(&self) -> Option<&str> {
        self.comments_part.as_deref()
    }

    pub fn comments_xml(&self) -> Option<&[u8]> {
        self.comments_xml.as_deref()
    }
}

/// Read the first of `names` present in the archive
fn read_first<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    names: &[&str],
    source: &Path,
) -> Result<Option<(String, Vec<u8>)>, InspectError> {
    for name in names {
        if let Some(bytes) = read_part(archive, name, source)? {
            return Ok(Some((name.to_string(), bytes)));
        }
    }
    Ok(None)
}

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
    source: &Path,
) -> Result<Option<Vec<u8>>, InspectError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => {
            return Err(InspectError::invalid(
                source,
                format!("unreadable part '{}' ({})", name, e),
            ))
        }
    };

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| {
        InspectError::invalid(source, format!("unreadable part '{}' ({})", name, e))
    })?;
    Ok(Some(bytes))
}

fn resolve_main_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    source: &Path,
) -> Result<String, InspectError> {
    let target = read_part(archive, PACKAGE_RELS, source)?
        .and_then(|rels| lookup_relationship(&rels, OFFICE_DOCUMENT_REL, PACKAGE_RELS, source));

    Ok(target
        .map(|t| resolve_target("", &t))
        .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string()))
}

fn resolve_comments_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    main_part: &str,
    source: &Path,
) -> Result<Option<String>, InspectError> {
    let (dir, file) = split_part_name(main_part);
    let rels_name = if dir.is_empty() {
        format!("_rels/{}.rels", file)
    } else {
        format!("{}/_rels/{}.rels", dir, file)
    };

    let target = read_part(archive, &rels_name, source)?
        .and_then(|rels| lookup_relationship(&rels, COMMENTS_REL, &rels_name, source));

    Ok(target.map(|t| resolve_target(dir, &t)))
}

/// Relationship lookup that degrades to the conventional part names
fn lookup_relationship(
    rels: &[u8],
    type_suffix: &str,
    rels_name: &str,
    source: &Path,
) -> Option<String> {
    match find_relationship(rels, type_suffix) {
        Ok(target) => target,
        Err(e) => {
            warn!(
                source = %source.display(),
                part = rels_name,
                error = %e,
                "Unreadable relationships part, using conventional part names"
            );
            None
        }
    }
}

/// Target of the first internal relationship whose type ends with `type_suffix`
fn find_relationship(xml: &[u8], type_suffix: &str) -> Result<Option<String>, quick_xml::Error> {
    let mut reader = Reader::from_reader(xml);

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if plain_attr(&e, "TargetMode")?.as_deref() == Some("External") {
                    continue;
                }
                let rel_type = plain_attr(&e, "Type")?;
                let target = plain_attr(&e, "Target")?;
                if let (Some(rel_type), Some(target)) = (rel_type, target) {
                    if rel_type.ends_with(type_suffix) {
                        return Ok(Some(target));
                    }
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

fn split_part_name(part: &str) -> (&str, &str) {
    part.rsplit_once('/').unwrap_or(("", part))
}

/// Resolve a relationship target against the directory of its source part
fn resolve_target(base_dir: &str, target: &str) -> String {
    let joined = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None if base_dir.is_empty() => target.to_string(),
        None => format!("{}/{}", base_dir, target),
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

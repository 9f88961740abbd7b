//! Tracked-change extraction
//!
//! Reads insertion (`ins`) and deletion (`del`) revision elements straight
//! from the primary content part. Text is taken from the `t` and `delText`
//! runs the revision encloses, never from a rendered view of the document.

use crate::container::DocxSnapshot;
use crate::error::InspectError;
use crate::xml::{is_wordml, wordml_attr, ScanError};
use quick_xml::events::{BytesStart, Event};
use quick_xml::NsReader;
use serde::{Deserialize, Serialize};
use shared_types::{ChangeKind, TrackedChange};
use tracing::debug;

/// Extract tracked changes in document order
///
/// Returns an empty list when the document carries no revision markup.
/// Paragraph-mark revisions (empty `ins`/`del` inside run properties) are
/// included with empty text.
pub fn extract_tracked_changes(snapshot: &DocxSnapshot) -> Result<Vec<TrackedChange>, InspectError> {
    let part = snapshot.main_part();
    let changes = scan_revisions(snapshot.document_xml())
        .map_err(|e| InspectError::parse(snapshot.source(), part, e))?;

    debug!(
        source = %snapshot.source().display(),
        count = changes.len(),
        "Extracted tracked changes"
    );
    Ok(changes)
}

/// Inserted and deleted text, for inspection and debugging
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionText {
    pub insertions: Vec<String>,
    pub deletions: Vec<String>,
}

/// Collect the text of every revision that has any
pub fn revision_text(snapshot: &DocxSnapshot) -> Result<RevisionText, InspectError> {
    let mut text = RevisionText::default();
    for change in extract_tracked_changes(snapshot)? {
        if change.text.is_empty() {
            continue;
        }
        match change.kind {
            ChangeKind::Insertion => text.insertions.push(change.text),
            ChangeKind::Deletion => text.deletions.push(change.text),
        }
    }
    Ok(text)
}

fn revision_kind(local_name: &[u8]) -> Option<ChangeKind> {
    match local_name {
        b"ins" => Some(ChangeKind::Insertion),
        b"del" => Some(ChangeKind::Deletion),
        _ => None,
    }
}

fn is_text_run(local_name: &[u8]) -> bool {
    matches!(local_name, b"t" | b"delText")
}

fn scan_revisions(xml: &[u8]) -> Result<Vec<TrackedChange>, ScanError> {
    let mut reader = NsReader::from_reader(xml);
    let mut changes: Vec<TrackedChange> = Vec::new();
    // (index into `changes`, element depth) for revisions still open
    let mut open: Vec<(usize, usize)> = Vec::new();
    let mut text_depth: Option<usize> = None;
    let mut depth = 0usize;

    loop {
        let (ns, event) = reader.read_resolved_event()?;
        let wordml = is_wordml(&ns);

        match event {
            Event::Start(e) => {
                depth += 1;
                if !wordml {
                    continue;
                }
                let local = e.local_name();
                if let Some(kind) = revision_kind(local.as_ref()) {
                    let index = changes.len();
                    changes.push(new_change(&reader, &e, kind, index)?);
                    open.push((index, depth));
                } else if is_text_run(local.as_ref()) {
                    text_depth = Some(depth);
                }
            }
            Event::Empty(e) => {
                if !wordml {
                    continue;
                }
                if let Some(kind) = revision_kind(e.local_name().as_ref()) {
                    let index = changes.len();
                    changes.push(new_change(&reader, &e, kind, index)?);
                }
            }
            Event::Text(t) => {
                if text_depth.is_some() && !open.is_empty() {
                    let text = t.unescape()?;
                    for (index, _) in &open {
                        changes[*index].text.push_str(&text);
                    }
                }
            }
            Event::CData(c) => {
                if text_depth.is_some() && !open.is_empty() {
                    let text = String::from_utf8_lossy(&c);
                    for (index, _) in &open {
                        changes[*index].text.push_str(&text);
                    }
                }
            }
            Event::End(_) => {
                if text_depth == Some(depth) {
                    text_depth = None;
                }
                if matches!(open.last(), Some(&(_, d)) if d == depth) {
                    open.pop();
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(ScanError::Unbalanced(depth));
    }
    Ok(changes)
}

fn new_change<R>(
    reader: &NsReader<R>,
    element: &BytesStart,
    kind: ChangeKind,
    index: usize,
) -> Result<TrackedChange, quick_xml::Error> {
    Ok(TrackedChange {
        index,
        kind,
        revision_id: wordml_attr(reader, element, "id")?,
        author: wordml_attr(reader, element, "author")?,
        date: wordml_attr(reader, element, "date")?,
        text: String::new(),
    })
}

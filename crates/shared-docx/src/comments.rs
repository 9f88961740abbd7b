//! Comment extraction from the auxiliary comments part

use crate::container::DocxSnapshot;
use crate::error::InspectError;
use crate::xml::{is_wordml, wordml_attr, ScanError};
use quick_xml::events::Event;
use quick_xml::NsReader;
use shared_types::{Anchor, Comment};
use std::collections::HashMap;
use tracing::debug;

/// Extract comments in the order they appear in the comments part
///
/// A container without a comments part yields an empty list. Each comment's
/// anchor is resolved against the range and reference marks of the primary
/// content part.
pub fn extract_comments(snapshot: &DocxSnapshot) -> Result<Vec<Comment>, InspectError> {
    let (Some(part), Some(xml)) = (snapshot.comments_part(), snapshot.comments_xml()) else {
        return Ok(Vec::new());
    };

    let mut comments =
        scan_comments(xml).map_err(|e| InspectError::parse(snapshot.source(), part, e))?;

    if !comments.is_empty() {
        let marks = scan_anchor_marks(snapshot.document_xml())
            .map_err(|e| InspectError::parse(snapshot.source(), snapshot.main_part(), e))?;
        for comment in &mut comments {
            comment.anchor = marks
                .get(&comment.id)
                .map(AnchorMarks::anchor)
                .unwrap_or(Anchor::Unanchored);
        }
    }

    debug!(
        source = %snapshot.source().display(),
        count = comments.len(),
        "Extracted comments"
    );
    Ok(comments)
}

struct PendingComment {
    comment: Comment,
    paragraphs: Vec<String>,
    in_text: bool,
}

impl PendingComment {
    fn finish(self) -> Comment {
        let text = self
            .paragraphs
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        Comment { text, ..self.comment }
    }
}

fn scan_comments(xml: &[u8]) -> Result<Vec<Comment>, ScanError> {
    let mut reader = NsReader::from_reader(xml);
    let mut comments = Vec::new();
    let mut pending: Option<PendingComment> = None;
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
                match e.local_name().as_ref() {
                    b"comment" => {
                        let comment = new_comment(&reader, &e, comments.len())?;
                        pending = Some(PendingComment {
                            comment,
                            paragraphs: Vec::new(),
                            in_text: false,
                        });
                    }
                    b"p" => {
                        if let Some(p) = pending.as_mut() {
                            p.paragraphs.push(String::new());
                        }
                    }
                    b"t" => {
                        if let Some(p) = pending.as_mut() {
                            p.in_text = true;
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(e) if wordml && e.local_name().as_ref() == b"comment" => {
                comments.push(new_comment(&reader, &e, comments.len())?);
            }
            Event::Text(t) => {
                if let Some(p) = pending.as_mut().filter(|p| p.in_text) {
                    let text = t.unescape()?;
                    match p.paragraphs.last_mut() {
                        Some(last) => last.push_str(&text),
                        None => p.paragraphs.push(text.into_owned()),
                    }
                }
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                if !wordml {
                    continue;
                }
                match e.local_name().as_ref() {
                    b"comment" => {
                        if let Some(p) = pending.take() {
                            comments.push(p.finish());
                        }
                    }
                    b"t" => {
                        if let Some(p) = pending.as_mut() {
                            p.in_text = false;
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    // A comment still open at end of input means the part was cut short
    if depth != 0 || pending.is_some() {
        return Err(ScanError::Unbalanced(depth.max(1)));
    }
    Ok(comments)
}

fn new_comment<R>(
    reader: &NsReader<R>,
    element: &quick_xml::events::BytesStart,
    position: usize,
) -> Result<Comment, quick_xml::Error> {
    Ok(Comment {
        id: wordml_attr(reader, element, "id")?.unwrap_or_else(|| position.to_string()),
        author: wordml_attr(reader, element, "author")?,
        initials: wordml_attr(reader, element, "initials")?,
        date: wordml_attr(reader, element, "date")?,
        text: String::new(),
        anchor: Anchor::Unanchored,
    })
}

#[derive(Debug, Default, Clone, Copy)]
struct AnchorMarks {
    range: bool,
    reference: bool,
}

impl AnchorMarks {
    fn anchor(&self) -> Anchor {
        if self.range {
            Anchor::Range
        } else if self.reference {
            Anchor::ReferenceOnly
        } else {
            Anchor::Unanchored
        }
    }
}

/// Comment ids referenced by `commentRangeStart` / `commentReference` marks
fn scan_anchor_marks(xml: &[u8]) -> Result<HashMap<String, AnchorMarks>, ScanError> {
    let mut reader = NsReader::from_reader(xml);
    let mut marks: HashMap<String, AnchorMarks> = HashMap::new();
    let mut depth = 0usize;

    loop {
        let (ns, event) = reader.read_resolved_event()?;
        let wordml = is_wordml(&ns);

        if matches!(event, Event::Start(_)) {
            depth += 1;
        } else if matches!(event, Event::End(_)) {
            depth = depth.saturating_sub(1);
        }

        match event {
            Event::Start(e) | Event::Empty(e) if wordml => {
                let is_range = match e.local_name().as_ref() {
                    b"commentRangeStart" => true,
                    b"commentReference" => false,
                    _ => continue,
                };
                if let Some(id) = wordml_attr(&reader, &e, "id")? {
                    let entry = marks.entry(id).or_default();
                    if is_range {
                        entry.range = true;
                    } else {
                        entry.reference = true;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(ScanError::Unbalanced(depth));
    }
    Ok(marks)
}

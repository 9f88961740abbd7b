use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Category of structural markup that can be checked for preservation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatCategory {
    /// Insertion and deletion revision ranges in the primary content part
    TrackChanges,
    /// Entries of the auxiliary comments part
    Comments,
}

/// Categories verified when the caller does not choose its own set
pub const DEFAULT_CATEGORIES: [FormatCategory; 2] =
    [FormatCategory::TrackChanges, FormatCategory::Comments];

impl FormatCategory {
    pub const ALL: [FormatCategory; 2] = [FormatCategory::TrackChanges, FormatCategory::Comments];

    /// Stable identifier, matches the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatCategory::TrackChanges => "track_changes",
            FormatCategory::Comments => "comments",
        }
    }

    /// Name used in human-readable reports
    pub fn label(&self) -> &'static str {
        match self {
            FormatCategory::TrackChanges => "Track Changes",
            FormatCategory::Comments => "Comments",
        }
    }
}

impl fmt::Display for FormatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a category name is not recognized
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown format category: '{0}' (expected one of: track_changes, comments)")]
pub struct ParseCategoryError(pub String);

impl FromStr for FormatCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(|c: char| c == '-' || c == ' ', "_").as_str() {
            "track_changes" | "tracked_changes" | "revisions" => Ok(FormatCategory::TrackChanges),
            "comments" => Ok(FormatCategory::Comments),
            _ => Err(ParseCategoryError(s.to_string())),
        }
    }
}

/// Kind of tracked change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insertion,
    Deletion,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Insertion => f.write_str("insertion"),
            ChangeKind::Deletion => f.write_str("deletion"),
        }
    }
}

/// A single insertion or deletion range read from revision markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedChange {
    /// Position in document order (0-based)
    pub index: usize,
    pub kind: ChangeKind,
    /// Revision id attribute, if present
    pub revision_id: Option<String>,
    pub author: Option<String>,
    /// Raw date attribute as written in the document
    pub date: Option<String>,
    /// Inserted text, or deleted text for deletions
    pub text: String,
}

impl TrackedChange {
    /// Parsed revision timestamp, `None` when absent or not RFC 3339
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.date.as_deref())
    }
}

/// Where a comment is attached in the primary content part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// A comment range marks the annotated content
    Range,
    /// Only a reference mark points at the comment
    ReferenceOnly,
    /// Nothing in the primary content refers to the comment
    Unanchored,
}

/// An out-of-line annotation from the comments part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: Option<String>,
    pub initials: Option<String>,
    pub date: Option<String>,
    /// Comment body, paragraphs joined by newlines
    pub text: String,
    pub anchor: Anchor,
}

impl Comment {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.date.as_deref())
    }
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|d| DateTime::parse_from_rfc3339(d).ok())
        .map(|d| d.with_timezone(&Utc))
}

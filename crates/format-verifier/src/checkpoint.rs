//! Pipeline checkpoints
//!
//! A [`CheckpointManager`] records named document snapshots in pipeline
//! order and verifies every consecutive pair, so a loss is attributed to
//! the stage that caused it. Checkpoints are append-only.
//!
//! Comparisons use the state captured when a checkpoint was added, never a
//! re-read of its file: a stage that rewrites a document in place would
//! otherwise be compared with itself.

use crate::config::VerifyConfig;
use crate::engine::{inspect_current, summarize, Verifier};
use crate::error::VerifyError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_docx::DocxSnapshot;
use shared_types::{hash_file, CategorySummary, FormatCategory, VerificationResult};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Version written into persisted checkpoint files
pub const CHECKPOINT_FORMAT_VERSION: u32 = 1;

/// Per-category state captured when a checkpoint is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CategoryState {
    Counted { summary: CategorySummary },
    Unreadable { reason: String },
}

/// A named snapshot of a document at one pipeline stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    name: String,
    path: PathBuf,
    created_at: DateTime<Utc>,
    /// SHA-256 of the file contents at capture time
    document_hash: String,
    captured: BTreeMap<FormatCategory, CategoryState>,
}

impl Checkpoint {
    /// Capture `path` under `name`, counting each of `categories`
    ///
    /// An unreadable container still yields a checkpoint; its categories are
    /// recorded as [`CategoryState::Unreadable`] and verification against it
    /// fails later with a descriptive result.
    pub fn capture(
        path: impl AsRef<Path>,
        name: impl Into<String>,
        categories: impl IntoIterator<Item = FormatCategory>,
    ) -> Result<Self, VerifyError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(VerifyError::FileNotFound(path.to_path_buf()));
        }

        let document_hash = hash_file(path)?;
        let snapshot = DocxSnapshot::open(path);
        let captured = categories
            .into_iter()
            .map(|category| {
                let state = match &snapshot {
                    Ok(snapshot) => match summarize(snapshot, category) {
                        Ok(summary) => CategoryState::Counted { summary },
                        Err(e) => CategoryState::Unreadable {
                            reason: e.to_string(),
                        },
                    },
                    Err(e) => CategoryState::Unreadable {
                        reason: e.to_string(),
                    },
                };
                (category, state)
            })
            .collect();

        Ok(Self {
            name: name.into(),
            path: path.to_path_buf(),
            created_at: Utc::now(),
            document_hash,
            captured,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn document_hash(&self) -> &str {
        &self.document_hash
    }

    pub fn captured(&self) -> &BTreeMap<FormatCategory, CategoryState> {
        &self.captured
    }

    /// Count captured for `category`, if it was counted
    pub fn captured_count(&self, category: FormatCategory) -> Option<usize> {
        match self.captured.get(&category) {
            Some(CategoryState::Counted { summary }) => Some(summary.count),
            _ => None,
        }
    }

    /// Captured summary of `category`, or why the checkpoint has none
    pub fn baseline(&self, category: FormatCategory) -> Result<CategorySummary, String> {
        match self.captured.get(&category) {
            Some(CategoryState::Counted { summary }) => Ok(summary.clone()),
            Some(CategoryState::Unreadable { reason }) => Err(format!(
                "Checkpoint '{}' was unreadable at capture: {}",
                self.name, reason
            )),
            None => Err(format!(
                "{} not in checkpoint '{}'",
                category.label(),
                self.name
            )),
        }
    }

    /// Whether the file on disk still hashes to the captured value
    pub fn is_unchanged_on_disk(&self) -> bool {
        hash_file(&self.path)
            .map(|hash| hash == self.document_hash)
            .unwrap_or(false)
    }
}

/// Results for one consecutive checkpoint pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// `"{from}→{to}"`
    pub label: String,
    pub from: String,
    pub to: String,
    pub results: Vec<VerificationResult>,
}

impl Transition {
    pub fn passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }
}

/// Results of verifying every consecutive checkpoint pair, in pipeline order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineResults {
    pub transitions: Vec<Transition>,
}

impl PipelineResults {
    /// Results for the transition labelled `label`, e.g. `"A→B"`
    pub fn get(&self, label: &str) -> Option<&[VerificationResult]> {
        self.transitions
            .iter()
            .find(|t| t.label == label)
            .map(|t| t.results.as_slice())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.transitions.iter().map(|t| t.label.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Transitions with at least one failing result
    pub fn failed_transitions(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter().filter(|t| !t.passed())
    }

    pub fn all_passed(&self) -> bool {
        self.transitions.iter().all(Transition::passed)
    }

    /// Every result across all transitions, in pipeline order
    pub fn all_results(&self) -> impl Iterator<Item = &VerificationResult> {
        self.transitions.iter().flat_map(|t| t.results.iter())
    }
}

/// Compare the document at `current` against the state captured in `previous`
pub(crate) fn compare_with_checkpoint(
    verifier: &Verifier,
    previous: &Checkpoint,
    current: &Path,
    categories: BTreeSet<FormatCategory>,
) -> Vec<VerificationResult> {
    let snapshot = DocxSnapshot::open(current);
    categories
        .into_iter()
        .map(|category| {
            verifier.decide(
                category,
                previous.baseline(category),
                inspect_current(&snapshot, category),
            )
        })
        .collect()
}

/// Label of the transition between two checkpoints
pub fn transition_label(from: &str, to: &str) -> String {
    format!("{}→{}", from, to)
}

#[derive(Serialize, Deserialize)]
struct PersistedCheckpoints {
    version: u32,
    config: VerifyConfig,
    checkpoints: Vec<Checkpoint>,
}

/// Ordered, append-only set of pipeline checkpoints
#[derive(Debug, Clone, Default)]
pub struct CheckpointManager {
    verifier: Verifier,
    checkpoints: Vec<Checkpoint>,
}

impl CheckpointManager {
    pub fn new(config: VerifyConfig) -> Self {
        Self {
            verifier: Verifier::new(config),
            checkpoints: Vec::new(),
        }
    }

    pub fn config(&self) -> &VerifyConfig {
        self.verifier.config()
    }

    /// Capture `path` as the next checkpoint
    ///
    /// # Errors
    /// - `VerifyError::DuplicateName` - a checkpoint named `name` exists
    /// - `VerifyError::FileNotFound` - nothing exists at `path`
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn add_checkpoint(
        &mut self,
        path: impl AsRef<Path>,
        name: &str,
    ) -> Result<&Checkpoint, VerifyError> {
        if self.get(name).is_some() {
            return Err(VerifyError::DuplicateName(name.to_string()));
        }

        let checkpoint = Checkpoint::capture(
            path,
            name,
            self.verifier.config().categories.iter().copied(),
        )?;
        info!(
            name = %checkpoint.name,
            hash = %checkpoint.document_hash,
            position = self.checkpoints.len(),
            "Checkpoint added"
        );

        let index = self.checkpoints.len();
        self.checkpoints.push(checkpoint);
        Ok(&self.checkpoints[index])
    }

    /// Configured categories plus every category the checkpoints captured
    fn categories_for(&self, checkpoints: &[&Checkpoint]) -> BTreeSet<FormatCategory> {
        let mut categories = self.verifier.config().categories.clone();
        for checkpoint in checkpoints {
            categories.extend(checkpoint.captured.keys().copied());
        }
        categories
    }

    /// Compare the captured states of two checkpoints
    ///
    /// A category missing from either side, or unreadable at capture,
    /// fails.
    fn verify_pair(&self, from: &Checkpoint, to: &Checkpoint) -> Vec<VerificationResult> {
        self.categories_for(&[from, to])
            .into_iter()
            .map(|category| {
                self.verifier
                    .decide(category, from.baseline(category), to.baseline(category))
            })
            .collect()
    }

    /// Verify every consecutive pair of checkpoints
    ///
    /// Fewer than two checkpoints yields no transitions.
    #[instrument(skip(self), fields(checkpoints = self.checkpoints.len()))]
    pub fn verify_all_checkpoints(&self) -> PipelineResults {
        for checkpoint in &self.checkpoints {
            if !checkpoint.is_unchanged_on_disk() {
                warn!(
                    name = %checkpoint.name,
                    path = %checkpoint.path.display(),
                    "Checkpoint document changed or vanished since capture, using captured state"
                );
            }
        }

        let transitions = self
            .checkpoints
            .windows(2)
            .map(|pair| {
                let (from, to) = (&pair[0], &pair[1]);
                let results = self.verify_pair(from, to);
                let transition = Transition {
                    label: transition_label(&from.name, &to.name),
                    from: from.name.clone(),
                    to: to.name.clone(),
                    results,
                };
                info!(
                    transition = %transition.label,
                    passed = transition.passed(),
                    "Transition verified"
                );
                transition
            })
            .collect();

        PipelineResults { transitions }
    }

    /// Verify two named checkpoints against each other
    pub fn verify_between(
        &self,
        before: &str,
        after: &str,
    ) -> Result<Vec<VerificationResult>, VerifyError> {
        let before = self
            .get(before)
            .ok_or_else(|| VerifyError::CheckpointNotFound(before.to_string()))?;
        let after = self
            .get(after)
            .ok_or_else(|| VerifyError::CheckpointNotFound(after.to_string()))?;
        Ok(self.verify_pair(before, after))
    }

    /// Compare a document against an existing checkpoint without recording it
    ///
    /// Checks every category `previous` captured plus every configured
    /// category; a configured category the checkpoint never captured fails.
    pub fn compare_checkpoints(
        &self,
        current: impl AsRef<Path>,
        previous: &Checkpoint,
    ) -> Vec<VerificationResult> {
        compare_with_checkpoint(
            &self.verifier,
            previous,
            current.as_ref(),
            self.categories_for(&[previous]),
        )
    }

    pub fn get(&self, name: &str) -> Option<&Checkpoint> {
        self.checkpoints.iter().find(|c| c.name == name)
    }

    /// Checkpoints in the order they were added
    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    /// Serialize the configuration and checkpoint list as pretty JSON
    pub fn to_json(&self) -> Result<String, VerifyError> {
        let persisted = PersistedCheckpoints {
            version: CHECKPOINT_FORMAT_VERSION,
            config: self.verifier.config().clone(),
            checkpoints: self.checkpoints.clone(),
        };
        Ok(serde_json::to_string_pretty(&persisted)?)
    }

    /// Restore a manager written by [`CheckpointManager::to_json`]
    ///
    /// # Errors
    /// - `VerifyError::Json` - malformed JSON
    /// - `VerifyError::Persistence` - unsupported format version
    /// - `VerifyError::DuplicateName` - two checkpoints share a name
    pub fn from_json(json: &str) -> Result<Self, VerifyError> {
        let persisted: PersistedCheckpoints = serde_json::from_str(json)?;
        if persisted.version != CHECKPOINT_FORMAT_VERSION {
            return Err(VerifyError::Persistence(format!(
                "unsupported checkpoint format version {} (expected {})",
                persisted.version, CHECKPOINT_FORMAT_VERSION
            )));
        }

        let mut seen = HashSet::new();
        for checkpoint in &persisted.checkpoints {
            if !seen.insert(checkpoint.name.as_str()) {
                return Err(VerifyError::DuplicateName(checkpoint.name.clone()));
            }
        }

        Ok(Self {
            verifier: Verifier::new(persisted.config),
            checkpoints: persisted.checkpoints,
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), VerifyError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, VerifyError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(VerifyError::FileNotFound(path.to_path_buf()));
        }
        Self::from_json(&fs::read_to_string(path)?)
    }
}

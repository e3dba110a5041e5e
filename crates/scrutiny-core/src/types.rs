use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Classification of a changed file within a pull request iteration.
///
/// Azure DevOps reports change types as strings; anything unrecognized is
/// treated as an edit, matching the API's own default.
///
/// # Examples
///
/// ```
/// use scrutiny_core::ChangeKind;
///
/// assert_eq!(ChangeKind::from_wire("delete"), ChangeKind::Delete);
/// assert_eq!(ChangeKind::from_wire("branchUpdate"), ChangeKind::Edit);
/// assert_eq!(format!("{}", ChangeKind::Add), "add");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// New file added by the PR.
    Add,
    /// Existing file modified in place.
    Edit,
    /// Existing file removed.
    Delete,
    /// File moved or renamed.
    Rename,
}

impl ChangeKind {
    /// Parse an Azure DevOps `changeType` string, defaulting to [`ChangeKind::Edit`].
    pub fn from_wire(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "add" => ChangeKind::Add,
            "delete" => ChangeKind::Delete,
            "rename" => ChangeKind::Rename,
            _ => ChangeKind::Edit,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Add => write!(f, "add"),
            ChangeKind::Edit => write!(f, "edit"),
            ChangeKind::Delete => write!(f, "delete"),
            ChangeKind::Rename => write!(f, "rename"),
        }
    }
}

/// A raw change record from the iteration changes endpoint.
///
/// This is the pre-filter view of a changed file: path, change kind, and the
/// tracking id Azure DevOps uses to bind inline comments to a diff region.
///
/// # Examples
///
/// ```
/// use scrutiny_core::{ChangeKind, ChangeRecord};
///
/// let record = ChangeRecord {
///     path: "/src/app.py".into(),
///     kind: ChangeKind::Edit,
///     tracking_id: 7,
/// };
/// assert_eq!(record.tracking_id, 7);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    /// Repository-rooted path of the changed file.
    pub path: String,
    /// Classification of the change.
    pub kind: ChangeKind,
    /// Azure DevOps `changeTrackingId` for this change.
    pub tracking_id: u64,
}

/// A changed file that survived filtering, with its retrieved content.
///
/// Immutable once produced by the change filter. The `tracking_id` is carried
/// verbatim from the originating [`ChangeRecord`]; it is the only key that
/// lets the annotation mapper re-associate a finding with the diff region the
/// comment API expects.
///
/// # Examples
///
/// ```
/// use scrutiny_core::{ChangeEntry, ChangeKind};
///
/// let entry = ChangeEntry {
///     path: "/src/main.rs".into(),
///     kind: ChangeKind::Add,
///     tracking_id: 3,
///     content: Some("fn main() {}".into()),
///     truncated: false,
/// };
/// assert!(!entry.truncated);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEntry {
    /// Repository-rooted path of the file.
    pub path: String,
    /// Classification of the change.
    pub kind: ChangeKind,
    /// Azure DevOps change tracking id, preserved through the pipeline.
    pub tracking_id: u64,
    /// Retrieved file content; `None` if retrieval failed.
    pub content: Option<String>,
    /// Whether the content was cut to the per-file line cap.
    pub truncated: bool,
}

/// Severity of a finding mined from the review output.
///
/// Only blocking severities become inline comments; everything else stays in
/// the summary.
///
/// # Examples
///
/// ```
/// use scrutiny_core::Severity;
///
/// let s: Severity = "critical".parse().unwrap();
/// assert_eq!(s, Severity::Critical);
/// assert_eq!(serde_json::to_string(&Severity::High).unwrap(), "\"high\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Security vulnerabilities, data integrity risks, breaking changes.
    Critical,
    /// Logic errors, null handling, error handling issues.
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::High => write!(f, "high"),
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

/// A structured claim about a problem at a specific file and line, mined from
/// the model's free-text review.
///
/// Untrusted: the path is not guaranteed to reference a file in the current
/// change set. Validation against the change set happens in the annotation
/// mapper.
///
/// # Examples
///
/// ```
/// use scrutiny_core::{Finding, Severity};
///
/// let finding = Finding {
///     file_path: "/src/app.py".into(),
///     line: 42,
///     severity: Severity::Critical,
/// };
/// assert_eq!(finding.line, 42);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// File path as reported by the model, normalized to a leading `/`.
    pub file_path: String,
    /// Line number in the new version of the file (>= 1).
    pub line: u32,
    /// Severity of the finding.
    pub severity: Severity,
}

/// A [`Finding`] enriched with the tracking id of its matching change entry,
/// ready to be posted as an inline comment.
///
/// # Examples
///
/// ```
/// use scrutiny_core::{Annotation, Severity};
///
/// let ann = Annotation {
///     file_path: "/src/app.py".into(),
///     line: 42,
///     severity: Severity::High,
///     tracking_id: 7,
/// };
/// assert_eq!(ann.tracking_id, 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    /// File path the comment anchors to.
    pub file_path: String,
    /// Line number the comment anchors to.
    pub line: u32,
    /// Severity carried over from the finding.
    pub severity: Severity,
    /// Tracking id of the matching change entry, or the best-effort fallback.
    pub tracking_id: u64,
}

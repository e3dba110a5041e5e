//! Pre-review change filtering.
//!
//! Decides which changed files are worth sending to the model: deleted files
//! are out, paths matching the deny list are out, unsupported extensions are
//! out, and files whose content cannot be retrieved are skipped without
//! failing the run. Surviving content is capped to a per-file line limit and
//! the whole set to a file-count limit.

use scrutiny_core::{ChangeEntry, ChangeKind, ChangeRecord, Config};

use crate::azure::ChangeSource;

/// Extensions eligible for review, matched as path suffixes.
pub const REVIEW_EXTENSIONS: &[&str] = &[
    ".py", ".js", ".ts", ".tsx", ".jsx", ".cs", ".java", ".go", ".rs", ".rb", ".cpp", ".c", ".h",
    ".hpp", ".swift", ".kt", ".scala", ".php", ".vue", ".svelte",
];

/// Deny list applied before the extension check.
///
/// These are plain substring matches against the whole path, not globs: a
/// path containing `migrations/` anywhere is skipped even if that directory
/// is a legitimate review target. Coarse on purpose.
pub const SKIP_PATTERNS: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    ".min.js",
    ".min.css",
    ".bundle.js",
    "dist/",
    "build/",
    "node_modules/",
    ".generated.",
    ".Designer.cs",
    "migrations/",
    "__pycache__/",
];

/// File-count and line-count limits for a review run.
///
/// # Examples
///
/// ```
/// use scrutiny_review::filter::FilterLimits;
///
/// let limits = FilterLimits {
///     max_files: 50,
///     max_lines_per_file: 1000,
/// };
/// assert_eq!(limits.max_files, 50);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FilterLimits {
    /// Maximum number of files sent for review.
    pub max_files: usize,
    /// Per-file line cap before truncation.
    pub max_lines_per_file: usize,
}

impl FilterLimits {
    /// Take the limits from the process configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_files: config.max_files,
            max_lines_per_file: config.max_lines_per_file,
        }
    }
}

/// Why a change record was excluded from review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The file was deleted by the PR.
    Deleted,
    /// The path contains a deny-list substring.
    DenyPattern(String),
    /// The extension is not in the review allow list.
    UnsupportedExtension,
    /// Content retrieval failed for this file.
    ContentUnavailable,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Deleted => write!(f, "deleted"),
            SkipReason::DenyPattern(pat) => write!(f, "matched pattern: {pat}"),
            SkipReason::UnsupportedExtension => write!(f, "unsupported extension"),
            SkipReason::ContentUnavailable => write!(f, "content not available"),
        }
    }
}

/// A change record that was excluded, with the reason. Observability only.
#[derive(Debug, Clone)]
pub struct SkippedChange {
    /// Path of the excluded file.
    pub path: String,
    /// Why it was excluded.
    pub reason: SkipReason,
}

/// Result of filtering a change set.
pub struct FilterOutcome {
    /// Entries that survived, in input order, at most `max_files` of them.
    pub entries: Vec<ChangeEntry>,
    /// Excluded records with reasons.
    pub skipped: Vec<SkippedChange>,
    /// How many surviving entries were dropped by the file-count cap.
    pub overflow_dropped: usize,
}

/// Check a path against the deny list and the extension allow list.
///
/// Returns the skip reason, or `None` if the path is reviewable.
///
/// # Examples
///
/// ```
/// use scrutiny_review::filter::{should_skip_path, SkipReason};
///
/// assert!(should_skip_path("src/app.py").is_none());
/// assert_eq!(
///     should_skip_path("docs/readme.md"),
///     Some(SkipReason::UnsupportedExtension)
/// );
/// assert!(matches!(
///     should_skip_path("web/package-lock.json"),
///     Some(SkipReason::DenyPattern(_))
/// ));
/// ```
pub fn should_skip_path(path: &str) -> Option<SkipReason> {
    for pattern in SKIP_PATTERNS {
        if path.contains(pattern) {
            return Some(SkipReason::DenyPattern(pattern.to_string()));
        }
    }
    if REVIEW_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        None
    } else {
        Some(SkipReason::UnsupportedExtension)
    }
}

/// Cap content to `max_lines` lines, keeping the head and appending a marker
/// stating how many lines were omitted.
///
/// Issue locations cluster near the top of changed regions in this usage
/// pattern, so the head is always the part worth keeping.
pub fn truncate_content(content: &str, max_lines: usize) -> (String, bool) {
    let lines: Vec<&str> = content.split('\n').collect();
    if lines.len() <= max_lines {
        return (content.to_string(), false);
    }
    let omitted = lines.len() - max_lines;
    let mut truncated = lines[..max_lines].join("\n");
    truncated.push_str(&format!("\n... (truncated, {omitted} lines omitted)"));
    (truncated, true)
}

/// Filter raw change records into reviewable [`ChangeEntry`] values.
///
/// Applies, per record in input order: the delete check, the deny list, the
/// extension allow list, content retrieval keyed by `(path, source_commit)`,
/// and per-file truncation. An empty `source_commit` disables retrieval, so
/// every surviving record is skipped as content-unavailable. Finally the
/// survivor list is cut to `max_files`, reporting the overflow as a count.
pub async fn filter_changes<S: ChangeSource + ?Sized>(
    source: &S,
    records: &[ChangeRecord],
    source_commit: &str,
    limits: &FilterLimits,
) -> FilterOutcome {
    let mut entries = Vec::new();
    let mut skipped = Vec::new();

    for record in records {
        if record.kind == ChangeKind::Delete {
            skipped.push(SkippedChange {
                path: record.path.clone(),
                reason: SkipReason::Deleted,
            });
            continue;
        }

        if let Some(reason) = should_skip_path(&record.path) {
            skipped.push(SkippedChange {
                path: record.path.clone(),
                reason,
            });
            continue;
        }

        let content = if source_commit.is_empty() {
            None
        } else {
            source.file_content(&record.path, source_commit).await
        };

        let Some(content) = content else {
            skipped.push(SkippedChange {
                path: record.path.clone(),
                reason: SkipReason::ContentUnavailable,
            });
            continue;
        };

        let (content, truncated) = truncate_content(&content, limits.max_lines_per_file);
        entries.push(ChangeEntry {
            path: record.path.clone(),
            kind: record.kind,
            tracking_id: record.tracking_id,
            content: Some(content),
            truncated,
        });
    }

    let overflow_dropped = entries.len().saturating_sub(limits.max_files);
    entries.truncate(limits.max_files);

    FilterOutcome {
        entries,
        skipped,
        overflow_dropped,
    }
}

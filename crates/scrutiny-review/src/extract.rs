//! Mining structured findings out of the model's free-text review.
//!
//! The review format (`###` subsections with ``**File**: `path:line` ``
//! references) is a convention requested of the model, not enforced, so this
//! is a tolerant scanner: it never fails, it only under-extracts. Malformed
//! output yields fewer or zero findings.

use std::sync::LazyLock;

use regex::Regex;
use scrutiny_core::{Finding, Severity};

static SECTION_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"###\s+").expect("valid section regex"));

static FILE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*File\*\*:\s*`([^`]+):(\d+)(?:-\d+)?`").expect("valid file/line regex")
});

/// Extract findings from review text.
///
/// The text is split on `###` subsection markers. A segment is in scope when
/// its heading line contains `Critical`, `High Priority`, or the bare word
/// `High` (case-sensitive substrings — deliberately permissive, so a heading
/// like "Highlights" would also match). Severity is critical when the
/// heading contains `Critical`, high otherwise. Within an in-scope segment
/// every ``**File**: `path:line` `` occurrence yields one finding; an
/// optional `-endLine` suffix is ignored and only the start line kept.
/// Paths are normalized to a leading `/`; line 0 references are dropped.
///
/// # Examples
///
/// ```
/// use scrutiny_core::Severity;
/// use scrutiny_review::extract::extract_findings;
///
/// let review = "### Critical Issues (Blocking)\n\
///               **File**: `src/app.py:42`\nSQL injection.\n\
///               #### Suggestions\n\
///               **File**: `src/app.py:50`\nRename this.\n";
/// let findings = extract_findings(review);
/// assert_eq!(findings.len(), 1);
/// assert_eq!(findings[0].file_path, "/src/app.py");
/// assert_eq!(findings[0].line, 42);
/// assert_eq!(findings[0].severity, Severity::Critical);
/// ```
pub fn extract_findings(text: &str) -> Vec<Finding> {
    let mut findings = Vec::new();

    for segment in SECTION_SPLIT.split(text) {
        let heading = segment.lines().next().unwrap_or_default();
        let in_scope = heading.contains("Critical")
            || heading.contains("High Priority")
            || heading.contains("High");
        if !in_scope {
            continue;
        }

        let severity = if heading.contains("Critical") {
            Severity::Critical
        } else {
            Severity::High
        };

        for captures in FILE_LINE.captures_iter(segment) {
            let path = &captures[1];
            let Ok(line) = captures[2].parse::<u32>() else {
                continue;
            };
            if line == 0 {
                continue;
            }
            findings.push(Finding {
                file_path: normalize_path(path),
                line,
                severity,
            });
        }
    }

    findings
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

//! Matching findings back to change entries for inline placement.
//!
//! A finding is untrusted model output; to anchor it as an inline comment we
//! need the change tracking id of the entry it refers to. Matching is exact
//! path first, then path-suffix as a fallback. The suffix fallback can bind
//! to the wrong same-named file in another directory; that ambiguity is a
//! known limitation of the path-only match, accepted rather than guessed at.

use scrutiny_core::{Annotation, ChangeEntry, Finding};

/// Upper bound on inline annotations per review cycle.
///
/// A deliberate throughput limiter on comment volume, not an error path:
/// findings beyond the cap are dropped silently, in extraction order.
pub const MAX_INLINE_ANNOTATIONS: usize = 10;

/// Tracking id used when no change entry matches a finding's path.
///
/// Best-effort fallback so the comment still posts against the first diff
/// region; not an error.
pub const FALLBACK_TRACKING_ID: u64 = 1;

/// Map findings to annotations, up to [`MAX_INLINE_ANNOTATIONS`].
///
/// For each finding in order: the first entry with an exactly equal path
/// wins; failing that, the first entry whose path ends with the finding path
/// stripped of its leading `/`; failing both, [`FALLBACK_TRACKING_ID`].
///
/// # Examples
///
/// ```
/// use scrutiny_core::{ChangeEntry, ChangeKind, Finding, Severity};
/// use scrutiny_review::annotate::map_annotations;
///
/// let entries = vec![ChangeEntry {
///     path: "a/b.py".into(),
///     kind: ChangeKind::Edit,
///     tracking_id: 7,
///     content: None,
///     truncated: false,
/// }];
/// let findings = vec![Finding {
///     file_path: "/a/b.py".into(),
///     line: 5,
///     severity: Severity::High,
/// }];
/// let annotations = map_annotations(&findings, &entries);
/// assert_eq!(annotations[0].tracking_id, 7);
/// ```
pub fn map_annotations(findings: &[Finding], entries: &[ChangeEntry]) -> Vec<Annotation> {
    findings
        .iter()
        .take(MAX_INLINE_ANNOTATIONS)
        .map(|finding| Annotation {
            file_path: finding.file_path.clone(),
            line: finding.line,
            severity: finding.severity,
            tracking_id: tracking_id_for(finding, entries),
        })
        .collect()
}

fn tracking_id_for(finding: &Finding, entries: &[ChangeEntry]) -> u64 {
    if let Some(entry) = entries.iter().find(|e| e.path == finding.file_path) {
        return entry.tracking_id;
    }
    let suffix = finding.file_path.trim_start_matches('/');
    entries
        .iter()
        .find(|e| e.path.ends_with(suffix))
        .map(|e| e.tracking_id)
        .unwrap_or(FALLBACK_TRACKING_ID)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrutiny_core::{ChangeKind, Severity};

    fn entry(path: &str, tracking_id: u64) -> ChangeEntry {
        ChangeEntry {
            path: path.into(),
            kind: ChangeKind::Edit,
            tracking_id,
            content: None,
            truncated: false,
        }
    }

    fn finding(path: &str, line: u32) -> Finding {
        Finding {
            file_path: path.into(),
            line,
            severity: Severity::High,
        }
    }

    #[test]
    fn exact_path_match_wins() {
        let entries = vec![entry("/src/app.py", 4), entry("/other/app.py", 9)];
        let annotations = map_annotations(&[finding("/src/app.py", 10)], &entries);
        assert_eq!(annotations[0].tracking_id, 4);
    }

    #[test]
    fn suffix_match_recovers_tracking_id() {
        let entries = vec![entry("a/b.py", 7)];
        let annotations = map_annotations(&[finding("/a/b.py", 5)], &entries);
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].tracking_id, 7);
        assert_eq!(annotations[0].line, 5);
    }

    #[test]
    fn exact_match_preferred_over_earlier_suffix_match() {
        // The first entry only suffix-matches; the exact match later in the
        // list must still win.
        let entries = vec![entry("vendor/a/b.py", 2), entry("/a/b.py", 8)];
        let annotations = map_annotations(&[finding("/a/b.py", 1)], &entries);
        assert_eq!(annotations[0].tracking_id, 8);
    }

    #[test]
    fn unmatched_finding_gets_fallback_id() {
        let entries = vec![entry("/src/real.py", 3)];
        let annotations = map_annotations(&[finding("/ghost.py", 1)], &entries);
        assert_eq!(annotations[0].tracking_id, FALLBACK_TRACKING_ID);
    }

    #[test]
    fn cap_enforced_in_extraction_order() {
        let entries = vec![entry("/f.py", 5)];
        let findings: Vec<Finding> = (1..=15).map(|i| finding("/f.py", i)).collect();
        let annotations = map_annotations(&findings, &entries);
        assert_eq!(annotations.len(), MAX_INLINE_ANNOTATIONS);
        assert_eq!(annotations[0].line, 1);
        assert_eq!(annotations[9].line, 10);
    }

    #[test]
    fn severity_carried_over() {
        let entries = vec![entry("/f.py", 5)];
        let findings = vec![Finding {
            file_path: "/f.py".into(),
            line: 3,
            severity: Severity::Critical,
        }];
        let annotations = map_annotations(&findings, &entries);
        assert_eq!(annotations[0].severity, Severity::Critical);
    }

    #[test]
    fn empty_inputs_produce_nothing() {
        assert!(map_annotations(&[], &[entry("/f.py", 1)]).is_empty());
        let annotations = map_annotations(&[finding("/f.py", 1)], &[]);
        assert_eq!(annotations[0].tracking_id, FALLBACK_TRACKING_ID);
    }
}

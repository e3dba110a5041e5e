//! Language and framework detection over a filtered change set.
//!
//! Languages come from a fixed extension table; frameworks from substring
//! scans over each entry's path and content. Both are coarse heuristics by
//! design: the result only steers which reference sections get appended to
//! the review prompt, so a false positive costs a few extra prompt tokens,
//! not correctness.

use std::collections::BTreeSet;
use std::path::Path;

use scrutiny_core::ChangeEntry;

/// Extension-to-language table, applied last-entry-wins.
///
/// `.tsx` and `.jsx` appear twice on purpose: the later `frontend` mapping
/// overrides the earlier `javascript` one. Treat this as a fixed, tested
/// table, not a heuristic to reorder.
const LANGUAGE_MAP: &[(&str, &str)] = &[
    ("py", "python"),
    ("pyw", "python"),
    ("js", "javascript"),
    ("jsx", "javascript"),
    ("ts", "javascript"),
    ("tsx", "javascript"),
    ("mjs", "javascript"),
    ("cjs", "javascript"),
    ("cs", "csharp"),
    ("java", "java"),
    ("kt", "java"),
    ("scala", "java"),
    ("go", "go"),
    ("rs", "rust"),
    ("c", "cpp"),
    ("cpp", "cpp"),
    ("cc", "cpp"),
    ("cxx", "cpp"),
    ("h", "cpp"),
    ("hpp", "cpp"),
    ("vue", "frontend"),
    ("svelte", "frontend"),
    ("tsx", "frontend"),
    ("jsx", "frontend"),
];

/// Framework pattern groups. A pattern hit in an entry's path
/// (case-insensitive) or content (case-sensitive) tags the group.
const FRAMEWORK_PATTERNS: &[(&str, &[&str])] = &[
    (
        "frontend",
        &[
            "Component",
            "React",
            "Vue",
            "Angular",
            "useState",
            "useEffect",
            ".vue",
            ".tsx",
            ".jsx",
        ],
    ),
    (
        "backend",
        &[
            "Controller",
            "Service",
            "Repository",
            "FastAPI",
            "Flask",
            "Express",
            "Spring",
            "app.",
            "router.",
        ],
    ),
];

/// Languages and frameworks detected in a change set.
///
/// Recomputed per invocation; never persisted. `BTreeSet` keeps iteration
/// deterministic regardless of input file order, which is what makes prompt
/// assembly reproducible.
///
/// # Examples
///
/// ```
/// use scrutiny_core::{ChangeEntry, ChangeKind};
/// use scrutiny_skill::ReviewContext;
///
/// let entries = vec![ChangeEntry {
///     path: "/src/app.py".into(),
///     kind: ChangeKind::Edit,
///     tracking_id: 1,
///     content: Some("from flask import Flask".into()),
///     truncated: false,
/// }];
/// let ctx = ReviewContext::detect(&entries);
/// assert!(ctx.languages.contains("python"));
/// assert!(ctx.frameworks.contains("backend"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewContext {
    /// Detected language tags.
    pub languages: BTreeSet<String>,
    /// Detected framework tags (`frontend` / `backend`).
    pub frameworks: BTreeSet<String>,
}

impl ReviewContext {
    /// Detect languages and frameworks from the filtered change entries.
    pub fn detect(entries: &[ChangeEntry]) -> Self {
        Self {
            languages: detect_languages(entries),
            frameworks: detect_frameworks(entries),
        }
    }

    /// Whether nothing was detected.
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty() && self.frameworks.is_empty()
    }
}

/// Map a file extension (without the dot, case-insensitive) to a language
/// tag. Later table entries win over earlier ones.
pub fn language_for_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.to_lowercase();
    LANGUAGE_MAP
        .iter()
        .rev()
        .find(|(e, _)| *e == ext)
        .map(|(_, lang)| *lang)
}

fn detect_languages(entries: &[ChangeEntry]) -> BTreeSet<String> {
    let mut languages = BTreeSet::new();
    for entry in entries {
        let ext = Path::new(&entry.path).extension().and_then(|e| e.to_str());
        if let Some(lang) = ext.and_then(language_for_extension) {
            languages.insert(lang.to_string());
        }
    }
    languages
}

fn detect_frameworks(entries: &[ChangeEntry]) -> BTreeSet<String> {
    let mut frameworks = BTreeSet::new();
    for entry in entries {
        let path = entry.path.to_lowercase();
        let content = entry.content.as_deref().unwrap_or("");

        for (group, patterns) in FRAMEWORK_PATTERNS {
            for pattern in *patterns {
                if path.contains(&pattern.to_lowercase()) || content.contains(pattern) {
                    frameworks.insert(group.to_string());
                    // First match settles this group for this entry; the
                    // next group is still checked.
                    break;
                }
            }
        }
    }
    frameworks
}

//! Review prompt assembly.
//!
//! Composes the system-level review instruction document: base policy from
//! the skill store, then fixed core topic sections, then sections for each
//! detected language and framework. When the store has no base policy the
//! embedded fallback prompt is used verbatim with no further composition.

use crate::context::ReviewContext;
use crate::store::PolicyStore;

/// Core topic sections appended to every composed prompt, in this order.
const CORE_SECTIONS: &[&str] = &["security", "architecture", "performance"];

/// Embedded review prompt used when the skill store has no base policy.
pub const FALLBACK_PROMPT: &str = r#"# Code Review

You are an expert code reviewer. Review the provided PR diff and identify issues.

## Rules
- ONLY review changed lines (+ lines in diff)
- Do NOT flag issues in unchanged code
- Be specific with file paths and line numbers
- Provide actionable solutions with code examples

## Priority Order
1. **Critical**: Security vulnerabilities, data integrity risks, breaking changes
2. **High**: Logic errors, null handling, error handling issues
3. **Medium**: Performance, code quality, best practices
4. **Low**: Style, naming, minor improvements

## Output Format
Provide your review in this markdown format:

## Code Review Summary

**Overall Assessment**: [APPROVE / REQUEST CHANGES / NEEDS DISCUSSION]

### Critical Issues (Blocking)
[List critical issues with file:line, problem, impact, solution]

### High Priority
[List high priority issues]

### Suggestions
[List suggestions and improvements]

### Positive Notes
[Acknowledge good code patterns]
"#;

/// A composed review instruction document.
///
/// `loaded_sections` records which reference sections made it into the body,
/// in append order. It exists for diagnostics only; the fallback path leaves
/// it empty.
///
/// # Examples
///
/// ```
/// use scrutiny_skill::AssembledPrompt;
///
/// let prompt = AssembledPrompt {
///     body: "# Code Review".into(),
///     loaded_sections: vec!["security".into()],
/// };
/// assert_eq!(prompt.loaded_sections.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct AssembledPrompt {
    /// The full system prompt text.
    pub body: String,
    /// Identifiers of the appended sections, in append order.
    pub loaded_sections: Vec<String>,
}

/// Assemble the review prompt from the policy store and detected context.
///
/// If the store reports no base policy, returns [`FALLBACK_PROMPT`] verbatim
/// and skips all composition. Otherwise strips a leading `---` frontmatter
/// block, then appends core topic sections, language sections, and framework
/// sections, skipping any tag the store has no reference for.
///
/// Re-running with identical store content and context produces a
/// byte-identical body.
///
/// # Examples
///
/// ```
/// use scrutiny_skill::prompt::{assemble, FALLBACK_PROMPT};
/// use scrutiny_skill::{ReviewContext, SkillDir};
/// use std::path::Path;
///
/// let store = SkillDir::new(Path::new("/nonexistent"));
/// let prompt = assemble(&store, &ReviewContext::default());
/// assert_eq!(prompt.body, FALLBACK_PROMPT);
/// assert!(prompt.loaded_sections.is_empty());
/// ```
pub fn assemble(store: &dyn PolicyStore, ctx: &ReviewContext) -> AssembledPrompt {
    let Some(policy) = store.base_policy() else {
        return AssembledPrompt {
            body: FALLBACK_PROMPT.to_string(),
            loaded_sections: Vec::new(),
        };
    };

    let mut body = strip_frontmatter(&policy).to_string();
    let mut loaded_sections = Vec::new();

    let mut append = |name: &str| {
        if let Some(content) = store.reference(name) {
            body.push_str(&format!(
                "\n\n## {} Reference\n\n{content}",
                name.to_uppercase()
            ));
            loaded_sections.push(name.to_string());
        }
    };

    for topic in CORE_SECTIONS {
        append(topic);
    }
    for lang in &ctx.languages {
        append(lang);
    }
    for framework in &ctx.frameworks {
        append(framework);
    }

    AssembledPrompt {
        body,
        loaded_sections,
    }
}

/// Strip a leading `---`-delimited metadata block, if present at the very
/// start of the document.
fn strip_frontmatter(content: &str) -> &str {
    if !content.starts_with("---") {
        return content;
    }
    let mut parts = content.splitn(3, "---");
    parts.next();
    parts.next();
    match parts.next() {
        Some(rest) => rest.trim(),
        None => content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::collections::HashMap;

    struct FakeStore {
        policy: Option<String>,
        references: HashMap<String, String>,
    }

    impl FakeStore {
        fn new(policy: Option<&str>, refs: &[(&str, &str)]) -> Self {
            Self {
                policy: policy.map(String::from),
                references: refs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            }
        }
    }

    impl PolicyStore for FakeStore {
        fn base_policy(&self) -> Option<String> {
            self.policy.clone()
        }

        fn reference(&self, name: &str) -> Option<String> {
            self.references.get(name).cloned()
        }
    }

    fn ctx(languages: &[&str], frameworks: &[&str]) -> ReviewContext {
        ReviewContext {
            languages: languages.iter().map(|s| s.to_string()).collect(),
            frameworks: frameworks.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn fallback_used_when_policy_absent() {
        let store = FakeStore::new(None, &[("security", "never loaded")]);
        let prompt = assemble(&store, &ctx(&["python"], &["backend"]));
        assert_eq!(prompt.body, FALLBACK_PROMPT);
        assert!(prompt.loaded_sections.is_empty());
    }

    #[test]
    fn sections_appended_in_fixed_order() {
        let store = FakeStore::new(
            Some("# Base"),
            &[
                ("security", "sec"),
                ("performance", "perf"),
                ("python", "py"),
                ("rust", "rs"),
                ("backend", "be"),
            ],
        );
        let prompt = assemble(&store, &ctx(&["rust", "python"], &["backend"]));
        assert_eq!(
            prompt.loaded_sections,
            vec!["security", "performance", "python", "rust", "backend"]
        );

        let sec = prompt.body.find("## SECURITY Reference").unwrap();
        let perf = prompt.body.find("## PERFORMANCE Reference").unwrap();
        let py = prompt.body.find("## PYTHON Reference").unwrap();
        let be = prompt.body.find("## BACKEND Reference").unwrap();
        assert!(sec < perf && perf < py && py < be);
        assert!(prompt.body.starts_with("# Base"));
    }

    #[test]
    fn missing_references_are_skipped() {
        let store = FakeStore::new(Some("# Base"), &[("architecture", "arch")]);
        let prompt = assemble(&store, &ctx(&["go"], &[]));
        assert_eq!(prompt.loaded_sections, vec!["architecture"]);
        assert!(!prompt.body.contains("GO Reference"));
    }

    #[test]
    fn frontmatter_is_stripped() {
        let store = FakeStore::new(Some("---\nname: review\n---\n# Policy body"), &[]);
        let prompt = assemble(&store, &ReviewContext::default());
        assert_eq!(prompt.body, "# Policy body");
    }

    #[test]
    fn unterminated_frontmatter_left_alone() {
        let store = FakeStore::new(Some("--- only one delimiter"), &[]);
        let prompt = assemble(&store, &ReviewContext::default());
        assert_eq!(prompt.body, "--- only one delimiter");
    }

    #[test]
    fn assembly_is_idempotent() {
        let store = FakeStore::new(
            Some("# Base"),
            &[("security", "sec"), ("python", "py"), ("frontend", "fe")],
        );
        let context = ctx(&["python"], &["frontend"]);
        let first = assemble(&store, &context);
        let second = assemble(&store, &context);
        assert_eq!(first.body, second.body);
        assert_eq!(first.loaded_sections, second.loaded_sections);
    }

    #[test]
    fn language_order_follows_set_iteration() {
        let store = FakeStore::new(
            Some("# Base"),
            &[("csharp", "cs"), ("java", "jv"), ("python", "py")],
        );
        let languages: BTreeSet<String> = ["python", "csharp", "java"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let context = ReviewContext {
            languages,
            frameworks: BTreeSet::new(),
        };
        let prompt = assemble(&store, &context);
        assert_eq!(prompt.loaded_sections, vec!["csharp", "java", "python"]);
    }
}

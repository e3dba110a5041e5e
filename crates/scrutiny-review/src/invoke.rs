//! Review invocation: packaging the change set for the model and shielding
//! the pipeline from generation failures.
//!
//! The invoker guarantees the pipeline always has review text to post: a
//! generator failure is converted into a fixed "needs manual review" message
//! carrying the error for diagnostics, and an empty change set short-circuits
//! to an approval message without calling the generator at all.

use scrutiny_core::ChangeEntry;

use crate::llm::TextGenerator;

/// Review text used when the change set has no reviewable files.
pub const NO_REVIEWABLE_FILES_TEXT: &str = "\
## Code Review Summary

**Overall Assessment**: APPROVE

No reviewable files found in this PR.

---
*Generated by AI Code Review*";

/// Render the change entries into a single user message, one labeled block
/// per entry in entry order.
///
/// # Examples
///
/// ```
/// use scrutiny_core::{ChangeEntry, ChangeKind};
/// use scrutiny_review::invoke::render_changes;
///
/// let entries = vec![ChangeEntry {
///     path: "/src/app.py".into(),
///     kind: ChangeKind::Edit,
///     tracking_id: 1,
///     content: Some("print('hi')".into()),
///     truncated: false,
/// }];
/// let rendered = render_changes(&entries);
/// assert!(rendered.contains("### File: /src/app.py (edit)"));
/// ```
pub fn render_changes(entries: &[ChangeEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            format!(
                "### File: {} ({})\n```diff\n{}\n```",
                entry.path,
                entry.kind,
                entry.content.as_deref().unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the user prompt wrapping the rendered change set with the reviewer
/// reminders.
pub fn build_user_prompt(entries: &[ChangeEntry]) -> String {
    format!(
        "Review the following Pull Request changes.\n\n\
         **IMPORTANT REMINDERS:**\n\
         - Review ONLY the changed lines (+ lines in diff)\n\
         - Do NOT flag issues in unchanged context lines\n\
         - Provide specific file:line references from the diff\n\
         - Include concrete code solutions for each issue\n\n\
         ## PR Diff to Review\n\n\
         {}\n\n\
         ---\n\n\
         Provide your code review following the format specified in the skill prompt.\n",
        render_changes(entries)
    )
}

/// Review text substituted when the generator fails.
pub fn manual_review_text(error: &str) -> String {
    format!(
        "## Code Review Summary\n\n\
         **Overall Assessment**: NEEDS DISCUSSION\n\n\
         AI review encountered an error: {error}\n\n\
         Please review this PR manually.\n\n\
         ---\n\
         *Generated by AI Code Review*"
    )
}

/// Run the review call. Never fails: generator errors become the fixed
/// manual-review text, and an empty change set returns the approval text
/// without invoking the generator.
pub async fn invoke_review<G: TextGenerator + ?Sized>(
    generator: &G,
    system_prompt: &str,
    entries: &[ChangeEntry],
) -> String {
    if entries.is_empty() {
        return NO_REVIEWABLE_FILES_TEXT.to_string();
    }

    let user_prompt = build_user_prompt(entries);
    match generator.generate(system_prompt, &user_prompt).await {
        Ok(text) => text,
        Err(e) => {
            eprintln!("warning: review generation failed: {e}");
            manual_review_text(&e.to_string())
        }
    }
}

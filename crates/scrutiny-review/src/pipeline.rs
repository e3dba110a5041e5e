//! The sequential review pipeline.
//!
//! One run per process: fetch the latest PR iteration, filter its change
//! set, detect context, assemble the prompt, invoke the review, post the
//! summary, then extract findings and post inline comments. Every stage's
//! output is the next stage's entire input; external calls are sequential
//! with no retries. A run always posts exactly one summary comment, even
//! when generation fails.

use std::fmt;

use scrutiny_core::{Annotation, Config, ScrutinyError, Severity};
use scrutiny_skill::{prompt, PolicyStore, ReviewContext};
use serde::Serialize;

use crate::annotate::map_annotations;
use crate::azure::{ChangeSource, CommentSink};
use crate::extract::extract_findings;
use crate::filter::{filter_changes, FilterLimits};
use crate::invoke::invoke_review;
use crate::llm::TextGenerator;

/// Summary posted when the PR has no iterations at all.
const NO_CHANGES_SUMMARY: &str = "## AI Code Review\n\nNo changes found to review.";

/// Statistics from a completed review run.
///
/// # Examples
///
/// ```
/// use scrutiny_review::pipeline::RunReport;
///
/// let report = RunReport {
///     files_reviewed: 3,
///     files_skipped: 1,
///     overflow_dropped: 0,
///     findings: 2,
///     inline_posted: 2,
///     summary_posted: true,
///     model: "gpt-4o".into(),
/// };
/// assert!(report.summary_posted);
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Files sent to the model.
    pub files_reviewed: usize,
    /// Files excluded by the change filter.
    pub files_skipped: usize,
    /// Surviving files dropped by the file-count cap.
    pub overflow_dropped: usize,
    /// Findings mined from the review text.
    pub findings: usize,
    /// Inline comments successfully posted.
    pub inline_posted: usize,
    /// Whether the summary comment was accepted.
    pub summary_posted: bool,
    /// Model identifier used for the review.
    pub model: String,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Model: {} | Files: {} (skipped: {}, over cap: {})",
            self.model, self.files_reviewed, self.files_skipped, self.overflow_dropped
        )?;
        write!(
            f,
            "Findings: {} | Inline comments posted: {} | Summary posted: {}",
            self.findings, self.inline_posted, self.summary_posted
        )
    }
}

/// Review orchestrator wiring the collaborators together.
pub struct ReviewPipeline<'a, S, P, G> {
    source: &'a S,
    sink: &'a P,
    generator: &'a G,
    store: &'a dyn PolicyStore,
    config: &'a Config,
}

impl<'a, S, P, G> ReviewPipeline<'a, S, P, G>
where
    S: ChangeSource,
    P: CommentSink,
    G: TextGenerator,
{
    /// Create a pipeline over the given collaborators and configuration.
    pub fn new(
        source: &'a S,
        sink: &'a P,
        generator: &'a G,
        store: &'a dyn PolicyStore,
        config: &'a Config,
    ) -> Self {
        Self {
            source,
            sink,
            generator,
            store,
            config,
        }
    }

    /// Run the full review, top to bottom.
    ///
    /// # Errors
    ///
    /// Returns [`ScrutinyError::Api`] only for failures fetching the change
    /// set itself. Generation and posting failures are absorbed per the
    /// pipeline contract and reflected in the returned [`RunReport`].
    pub async fn run(&self) -> Result<RunReport, ScrutinyError> {
        let Some(iteration) = self.source.latest_iteration().await? else {
            println!("No iterations found on the PR");
            let summary_posted = self.sink.post_summary(NO_CHANGES_SUMMARY).await;
            return Ok(self.report(0, 0, 0, 0, 0, summary_posted));
        };

        println!(
            "Latest iteration: {} (source commit: {})",
            iteration.id,
            if iteration.source_commit.is_empty() {
                "N/A"
            } else {
                &iteration.source_commit[..iteration.source_commit.len().min(8)]
            }
        );

        let records = self.source.iteration_changes(iteration.id).await?;
        println!("Found {} changed files", records.len());

        let limits = FilterLimits::from_config(self.config);
        let outcome = filter_changes(
            self.source,
            &records,
            &iteration.source_commit,
            &limits,
        )
        .await;

        if outcome.overflow_dropped > 0 {
            println!(
                "Limiting to {} files ({} dropped)",
                limits.max_files, outcome.overflow_dropped
            );
        }
        if !outcome.skipped.is_empty() {
            println!("Skipped {} files", outcome.skipped.len());
            if self.config.debug {
                for skip in outcome.skipped.iter().take(10) {
                    println!("  - {} ({})", skip.path, skip.reason);
                }
            }
        }

        let context = ReviewContext::detect(&outcome.entries);
        if self.config.debug {
            println!("Detected languages: {:?}", context.languages);
            println!("Detected frameworks: {:?}", context.frameworks);
        }

        let assembled = prompt::assemble(self.store, &context);
        if self.config.debug {
            println!("Loaded prompt sections: {:?}", assembled.loaded_sections);
        }

        println!(
            "Sending {} files to {} for review...",
            outcome.entries.len(),
            self.generator.model()
        );
        let review_text = invoke_review(self.generator, &assembled.body, &outcome.entries).await;

        let summary = self.with_footer(&review_text, outcome.entries.len());
        let summary_posted = self.sink.post_summary(&summary).await;

        let findings = extract_findings(&review_text);
        let annotations = map_annotations(&findings, &outcome.entries);
        println!(
            "Found {} findings, posting {} inline comments",
            findings.len(),
            annotations.len()
        );

        let mut inline_posted = 0;
        for annotation in &annotations {
            if self.post_annotation(annotation, iteration.id).await {
                inline_posted += 1;
            }
        }

        Ok(self.report(
            outcome.entries.len(),
            outcome.skipped.len(),
            outcome.overflow_dropped,
            findings.len(),
            inline_posted,
            summary_posted,
        ))
    }

    async fn post_annotation(&self, annotation: &Annotation, iteration_id: u64) -> bool {
        let label = match annotation.severity {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
        };
        let text = format!("**{label}** - See PR review comment for details.");
        self.sink
            .post_inline(
                &annotation.file_path,
                annotation.line,
                &text,
                annotation.tracking_id,
                iteration_id,
            )
            .await
    }

    fn with_footer(&self, review_text: &str, files_reviewed: usize) -> String {
        format!(
            "{review_text}\n\n---\n\
             **Files reviewed:** {files_reviewed}\n\
             **Model:** {}\n\
             *Generated by AI Code Review using code-review skill*",
            self.config.model
        )
    }

    fn report(
        &self,
        files_reviewed: usize,
        files_skipped: usize,
        overflow_dropped: usize,
        findings: usize,
        inline_posted: usize,
        summary_posted: bool,
    ) -> RunReport {
        RunReport {
            files_reviewed,
            files_skipped,
            overflow_dropped,
            findings,
            inline_posted,
            summary_posted,
            model: self.config.model.clone(),
        }
    }
}

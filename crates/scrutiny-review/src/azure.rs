//! Azure DevOps REST client and the collaborator seams it fulfils.
//!
//! The pipeline talks to the PR through two traits: [`ChangeSource`] for
//! reading the change set and [`CommentSink`] for posting comments.
//! [`AzureDevOpsClient`] implements both against the Azure DevOps Git REST
//! API (version 7.1); tests drive the pipeline with in-memory fakes instead.

use async_trait::async_trait;
use scrutiny_core::{ChangeKind, ChangeRecord, Config, ScrutinyError};
use serde::Deserialize;

const API_VERSION: &str = "7.1";

/// One PR iteration: the unit Azure DevOps versions a pull request by.
///
/// # Examples
///
/// ```
/// use scrutiny_review::azure::PrIteration;
///
/// let it = PrIteration {
///     id: 3,
///     source_commit: "abc123".into(),
/// };
/// assert_eq!(it.id, 3);
/// ```
#[derive(Debug, Clone)]
pub struct PrIteration {
    /// Iteration id; inline comments are anchored against it.
    pub id: u64,
    /// Source ref commit of the iteration; may be empty if the API omits it.
    pub source_commit: String,
}

/// Read side of the pull request: iterations, change records, file content.
#[async_trait]
pub trait ChangeSource: Send + Sync {
    /// The most recent PR iteration, or `None` when the PR has no iterations.
    async fn latest_iteration(&self) -> Result<Option<PrIteration>, ScrutinyError>;

    /// Raw change records for an iteration.
    async fn iteration_changes(&self, iteration_id: u64)
        -> Result<Vec<ChangeRecord>, ScrutinyError>;

    /// File content at a commit, or `None` when it cannot be retrieved.
    /// Retrieval failure is local to the file, never fatal to the run.
    async fn file_content(&self, path: &str, commit_id: &str) -> Option<String>;
}

/// Write side of the pull request: summary and inline comment threads.
///
/// Both operations report plain success/failure; a failed post is counted
/// and skipped, never retried or propagated.
#[async_trait]
pub trait CommentSink: Send + Sync {
    /// Post a PR-level summary comment thread.
    async fn post_summary(&self, text: &str) -> bool;

    /// Post an inline comment anchored to a file, line, and change tracking
    /// id within an iteration.
    async fn post_inline(
        &self,
        file_path: &str,
        line: u32,
        text: &str,
        tracking_id: u64,
        iteration_id: u64,
    ) -> bool;
}

/// Client for the Azure DevOps Git REST API.
pub struct AzureDevOpsClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    pr_id: String,
    debug: bool,
}

impl AzureDevOpsClient {
    /// Create a client from the process configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScrutinyError::Api`] if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, ScrutinyError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| ScrutinyError::Api(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: format!(
                "{}/{}/_apis/git/repositories/{}",
                config.org_url, config.project, config.repo_id
            ),
            token: config.access_token.clone(),
            pr_id: config.pr_id.clone(),
            debug: config.debug,
        })
    }

    async fn get_json(&self, url: &str) -> Result<String, ScrutinyError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| ScrutinyError::Api(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScrutinyError::Api(format!("HTTP {status}: {body}")));
        }
        response
            .text()
            .await
            .map_err(|e| ScrutinyError::Api(format!("failed to read response: {e}")))
    }

    async fn post_thread(&self, body: serde_json::Value) -> Result<(), ScrutinyError> {
        let url = format!(
            "{}/pullRequests/{}/threads?api-version={API_VERSION}",
            self.base_url, self.pr_id
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScrutinyError::Api(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScrutinyError::Api(format!("HTTP {status}: {body}")));
        }
        Ok(())
    }
}

#[async_trait]
impl ChangeSource for AzureDevOpsClient {
    async fn latest_iteration(&self) -> Result<Option<PrIteration>, ScrutinyError> {
        let url = format!(
            "{}/pullRequests/{}/iterations?api-version={API_VERSION}",
            self.base_url, self.pr_id
        );
        let body = self.get_json(&url).await?;
        let mut iterations = parse_iterations(&body)?;
        Ok(iterations.pop())
    }

    async fn iteration_changes(
        &self,
        iteration_id: u64,
    ) -> Result<Vec<ChangeRecord>, ScrutinyError> {
        let url = format!(
            "{}/pullRequests/{}/iterations/{iteration_id}/changes?api-version={API_VERSION}",
            self.base_url, self.pr_id
        );
        let body = self.get_json(&url).await?;
        parse_changes(&body)
    }

    async fn file_content(&self, path: &str, commit_id: &str) -> Option<String> {
        let url = format!("{}/items", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[
                ("path", path),
                ("includeContent", "true"),
                ("versionDescriptor.version", commit_id),
                ("versionDescriptor.versionType", "commit"),
                ("api-version", API_VERSION),
            ])
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            return None;
        }
        let payload: ItemPayload = response.json().await.ok()?;
        Some(payload.content.unwrap_or_default())
    }
}

#[async_trait]
impl CommentSink for AzureDevOpsClient {
    async fn post_summary(&self, text: &str) -> bool {
        let body = serde_json::json!({
            "comments": [{
                "parentCommentId": 0,
                "content": text,
                "commentType": 1,
            }],
            "status": 1,
        });
        match self.post_thread(body).await {
            Ok(()) => true,
            Err(e) => {
                eprintln!("warning: failed to post summary comment: {e}");
                false
            }
        }
    }

    async fn post_inline(
        &self,
        file_path: &str,
        line: u32,
        text: &str,
        tracking_id: u64,
        iteration_id: u64,
    ) -> bool {
        let body = serde_json::json!({
            "comments": [{
                "parentCommentId": 0,
                "content": text,
                "commentType": 1,
            }],
            "status": 1,
            "threadContext": {
                "filePath": file_path,
                "rightFileStart": { "line": line, "offset": 1 },
                "rightFileEnd": { "line": line, "offset": 1 },
            },
            "pullRequestThreadContext": {
                "changeTrackingId": tracking_id,
                "iterationContext": {
                    "firstComparingIteration": iteration_id,
                    "secondComparingIteration": iteration_id,
                },
            },
        });
        match self.post_thread(body).await {
            Ok(()) => true,
            Err(e) => {
                eprintln!("warning: failed to post inline comment on {file_path}:{line}: {e}");
                if self.debug {
                    eprintln!("  tracking id {tracking_id}, iteration {iteration_id}");
                }
                false
            }
        }
    }
}

#[derive(Deserialize)]
struct IterationList {
    #[serde(default)]
    value: Vec<IterationPayload>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IterationPayload {
    id: u64,
    source_ref_commit: Option<CommitRef>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitRef {
    commit_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangeList {
    #[serde(default)]
    change_entries: Vec<ChangePayload>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangePayload {
    #[serde(default = "default_tracking_id")]
    change_tracking_id: u64,
    change_type: Option<String>,
    item: Option<ChangeItem>,
}

fn default_tracking_id() -> u64 {
    1
}

#[derive(Deserialize)]
struct ChangeItem {
    #[serde(default)]
    path: Option<String>,
}

#[derive(Deserialize)]
struct ItemPayload {
    content: Option<String>,
}

/// Parse the iterations response body, oldest first.
fn parse_iterations(body: &str) -> Result<Vec<PrIteration>, ScrutinyError> {
    let list: IterationList = serde_json::from_str(body)?;
    Ok(list
        .value
        .into_iter()
        .map(|it| PrIteration {
            id: it.id,
            source_commit: it.source_ref_commit.map(|c| c.commit_id).unwrap_or_default(),
        })
        .collect())
}

/// Parse the iteration changes response body into raw change records.
fn parse_changes(body: &str) -> Result<Vec<ChangeRecord>, ScrutinyError> {
    let list: ChangeList = serde_json::from_str(body)?;
    Ok(list
        .change_entries
        .into_iter()
        .map(|change| ChangeRecord {
            path: change.item.and_then(|i| i.path).unwrap_or_default(),
            kind: ChangeKind::from_wire(change.change_type.as_deref().unwrap_or("edit")),
            tracking_id: change.change_tracking_id,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_iterations_extracts_source_commit() {
        let body = r#"{
            "count": 2,
            "value": [
                {"id": 1, "sourceRefCommit": {"commitId": "aaa"}},
                {"id": 2, "sourceRefCommit": {"commitId": "bbb"}}
            ]
        }"#;
        let iterations = parse_iterations(body).unwrap();
        assert_eq!(iterations.len(), 2);
        assert_eq!(iterations[1].id, 2);
        assert_eq!(iterations[1].source_commit, "bbb");
    }

    #[test]
    fn parse_iterations_tolerates_missing_commit() {
        let body = r#"{"value": [{"id": 5}]}"#;
        let iterations = parse_iterations(body).unwrap();
        assert_eq!(iterations[0].id, 5);
        assert!(iterations[0].source_commit.is_empty());
    }

    #[test]
    fn parse_iterations_empty_list() {
        let iterations = parse_iterations(r#"{"value": []}"#).unwrap();
        assert!(iterations.is_empty());
    }

    #[test]
    fn parse_changes_maps_records() {
        let body = r#"{
            "changeEntries": [
                {
                    "changeTrackingId": 7,
                    "changeType": "edit",
                    "item": {"path": "/src/app.py"}
                },
                {
                    "changeType": "delete",
                    "item": {"path": "/old.cs"}
                }
            ]
        }"#;
        let changes = parse_changes(body).unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].path, "/src/app.py");
        assert_eq!(changes[0].tracking_id, 7);
        assert_eq!(changes[0].kind, ChangeKind::Edit);
        // Missing tracking id falls back to 1.
        assert_eq!(changes[1].tracking_id, 1);
        assert_eq!(changes[1].kind, ChangeKind::Delete);
    }

    #[test]
    fn parse_changes_tolerates_missing_item() {
        let body = r#"{"changeEntries": [{"changeTrackingId": 3}]}"#;
        let changes = parse_changes(body).unwrap();
        assert_eq!(changes[0].path, "");
        assert_eq!(changes[0].kind, ChangeKind::Edit);
    }

    #[test]
    fn parse_changes_rejects_invalid_json() {
        assert!(parse_changes("not json").is_err());
    }
}

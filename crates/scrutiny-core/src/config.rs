use std::path::PathBuf;

use crate::error::ScrutinyError;

/// Required environment variables, checked together so the error names every
/// missing one at once.
const REQUIRED_VARS: &[&str] = &[
    "SYSTEM_ACCESSTOKEN",
    "OPENAI_API_KEY",
    "PR_ID",
    "ORG_URL",
    "PROJECT",
    "REPO_ID",
];

fn default_model() -> String {
    "gpt-5.2-codex".into()
}

fn default_max_files() -> usize {
    50
}

fn default_max_lines_per_file() -> usize {
    1000
}

/// Immutable process configuration, constructed once at startup and passed
/// explicitly to every component.
///
/// Loaded from environment variables; in an Azure DevOps pipeline
/// `SYSTEM_ACCESSTOKEN` is provided automatically. [`Config::from_lookup`]
/// accepts any key/value source so tests can run with synthetic
/// configurations.
///
/// # Examples
///
/// ```
/// use scrutiny_core::Config;
///
/// let config = Config::from_lookup(|key| match key {
///     "SYSTEM_ACCESSTOKEN" => Some("token".into()),
///     "OPENAI_API_KEY" => Some("sk-test".into()),
///     "PR_ID" => Some("42".into()),
///     "ORG_URL" => Some("https://dev.azure.com/acme/".into()),
///     "PROJECT" => Some("web".into()),
///     "REPO_ID" => Some("repo-guid".into()),
///     _ => None,
/// })
/// .unwrap();
/// assert_eq!(config.org_url, "https://dev.azure.com/acme");
/// assert_eq!(config.max_files, 50);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Azure DevOps organization URL, without a trailing slash.
    pub org_url: String,
    /// Project name.
    pub project: String,
    /// Repository id or name.
    pub repo_id: String,
    /// Pull request id.
    pub pr_id: String,
    /// Azure DevOps access token.
    pub access_token: String,
    /// OpenAI API key.
    pub openai_api_key: String,
    /// Root of the code-review skill directory.
    pub skill_path: PathBuf,
    /// Model identifier for the review call.
    pub model: String,
    /// Maximum number of files sent for review.
    pub max_files: usize,
    /// Per-file line cap before truncation.
    pub max_lines_per_file: usize,
    /// Verbose diagnostics toggle.
    pub debug: bool,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ScrutinyError::Config`] listing every missing required
    /// variable. This is checked before any network call is made.
    pub fn from_env() -> Result<Self, ScrutinyError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ScrutinyError::Config`] if any required variable is missing
    /// or a numeric override does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ScrutinyError> {
        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|var| lookup(var).as_deref().map_or(true, str::is_empty))
            .collect();
        if !missing.is_empty() {
            return Err(ScrutinyError::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let get = |key: &str| lookup(key).unwrap_or_default();

        let skill_path = match lookup("SKILL_PATH") {
            Some(p) if !p.is_empty() => PathBuf::from(p),
            _ => {
                let home = lookup("HOME").unwrap_or_else(|| ".".into());
                PathBuf::from(home).join(".scrutiny/skills/code-review")
            }
        };

        Ok(Self {
            org_url: get("ORG_URL").trim_end_matches('/').to_string(),
            project: get("PROJECT"),
            repo_id: get("REPO_ID"),
            pr_id: get("PR_ID"),
            access_token: get("SYSTEM_ACCESSTOKEN"),
            openai_api_key: get("OPENAI_API_KEY"),
            skill_path,
            model: lookup("OPENAI_MODEL")
                .filter(|m| !m.is_empty())
                .unwrap_or_else(default_model),
            max_files: parse_limit(&lookup, "MAX_FILES", default_max_files())?,
            max_lines_per_file: parse_limit(
                &lookup,
                "MAX_LINES_PER_FILE",
                default_max_lines_per_file(),
            )?,
            debug: lookup("DEBUG").is_some_and(|v| v.to_lowercase() == "true"),
        })
    }
}

fn parse_limit(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: usize,
) -> Result<usize, ScrutinyError> {
    match lookup(key) {
        Some(raw) if !raw.is_empty() => raw
            .parse()
            .map_err(|_| ScrutinyError::Config(format!("invalid {key}: {raw}"))),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("SYSTEM_ACCESSTOKEN", "token"),
            ("OPENAI_API_KEY", "sk-test"),
            ("PR_ID", "42"),
            ("ORG_URL", "https://dev.azure.com/acme/"),
            ("PROJECT", "web"),
            ("REPO_ID", "repo-guid"),
        ])
    }

    fn load(vars: &HashMap<&str, &str>) -> Result<Config, ScrutinyError> {
        Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn loads_with_defaults() {
        let config = load(&base_vars()).unwrap();
        assert_eq!(config.org_url, "https://dev.azure.com/acme");
        assert_eq!(config.model, "gpt-5.2-codex");
        assert_eq!(config.max_files, 50);
        assert_eq!(config.max_lines_per_file, 1000);
        assert!(!config.debug);
    }

    #[test]
    fn missing_vars_listed_in_error() {
        let mut vars = base_vars();
        vars.remove("PR_ID");
        vars.remove("OPENAI_API_KEY");

        let err = load(&vars).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("PR_ID"));
        assert!(msg.contains("OPENAI_API_KEY"));
        assert!(!msg.contains("REPO_ID"));
    }

    #[test]
    fn empty_required_var_counts_as_missing() {
        let mut vars = base_vars();
        vars.insert("PROJECT", "");
        let err = load(&vars).unwrap_err();
        assert!(err.to_string().contains("PROJECT"));
    }

    #[test]
    fn optional_overrides_applied() {
        let mut vars = base_vars();
        vars.insert("OPENAI_MODEL", "gpt-4o");
        vars.insert("MAX_FILES", "5");
        vars.insert("MAX_LINES_PER_FILE", "200");
        vars.insert("DEBUG", "TRUE");
        vars.insert("SKILL_PATH", "/opt/skills/review");

        let config = load(&vars).unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_files, 5);
        assert_eq!(config.max_lines_per_file, 200);
        assert!(config.debug);
        assert_eq!(config.skill_path, PathBuf::from("/opt/skills/review"));
    }

    #[test]
    fn invalid_numeric_override_rejected() {
        let mut vars = base_vars();
        vars.insert("MAX_FILES", "lots");
        let err = load(&vars).unwrap_err();
        assert!(err.to_string().contains("MAX_FILES"));
    }

    #[test]
    fn skill_path_defaults_under_home() {
        let mut vars = base_vars();
        vars.insert("HOME", "/home/ci");
        let config = load(&vars).unwrap();
        assert_eq!(
            config.skill_path,
            PathBuf::from("/home/ci/.scrutiny/skills/code-review")
        );
    }
}

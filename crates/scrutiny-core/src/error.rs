/// Errors that can occur across the Scrutiny pipeline.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; the binary crate converts to `miette` diagnostics at the
/// boundary.
///
/// # Examples
///
/// ```
/// use scrutiny_core::ScrutinyError;
///
/// let err = ScrutinyError::Config("missing PR_ID".into());
/// assert!(err.to_string().contains("missing PR_ID"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ScrutinyError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Azure DevOps API failure.
    #[error("Azure DevOps API error: {0}")]
    Api(String),

    /// LLM API or response error.
    #[error("LLM error: {0}")]
    Llm(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ScrutinyError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn config_error_displays_message() {
        let err = ScrutinyError::Config("bad value".into());
        assert_eq!(err.to_string(), "configuration error: bad value");
    }

    #[test]
    fn api_error_displays_message() {
        let err = ScrutinyError::Api("HTTP 403".into());
        assert!(err.to_string().contains("HTTP 403"));
    }
}

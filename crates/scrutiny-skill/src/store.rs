//! Filesystem-backed store for the code-review skill.
//!
//! A skill directory holds a `SKILL.md` base policy plus per-topic reference
//! fragments under `references/`. Absence of either is normal: the assembler
//! falls back to an embedded prompt when the base policy is missing and
//! silently skips references that do not exist.

use std::path::{Path, PathBuf};

/// Source of the base review policy and named reference sections.
///
/// Implemented by [`SkillDir`] for real runs and by in-memory fakes in tests.
pub trait PolicyStore {
    /// The base policy document, or `None` if the store has no policy.
    fn base_policy(&self) -> Option<String>;

    /// A reference section by tag (topic, language, or framework name), or
    /// `None` if no such section exists.
    fn reference(&self, name: &str) -> Option<String>;
}

/// A skill directory on disk.
///
/// # Examples
///
/// ```
/// use scrutiny_skill::SkillDir;
/// use std::path::Path;
///
/// let store = SkillDir::new(Path::new("/nonexistent"));
/// assert!(!store.exists());
/// ```
pub struct SkillDir {
    root: PathBuf,
}

impl SkillDir {
    /// Create a store rooted at `root`. The directory does not need to exist;
    /// lookups against a missing directory simply return `None`.
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Whether the skill directory exists on disk.
    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }
}

impl PolicyStore for SkillDir {
    fn base_policy(&self) -> Option<String> {
        std::fs::read_to_string(self.root.join("SKILL.md")).ok()
    }

    fn reference(&self, name: &str) -> Option<String> {
        std::fs::read_to_string(self.root.join("references").join(format!("{name}.md"))).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_yields_none() {
        let store = SkillDir::new(Path::new("/definitely/not/here"));
        assert!(!store.exists());
        assert!(store.base_policy().is_none());
        assert!(store.reference("security").is_none());
    }

    #[test]
    fn reads_policy_and_references() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("SKILL.md"), "# Policy").unwrap();
        std::fs::create_dir(dir.path().join("references")).unwrap();
        std::fs::write(
            dir.path().join("references/security.md"),
            "Check input validation.",
        )
        .unwrap();

        let store = SkillDir::new(dir.path());
        assert!(store.exists());
        assert_eq!(store.base_policy().unwrap(), "# Policy");
        assert_eq!(
            store.reference("security").unwrap(),
            "Check input validation."
        );
        assert!(store.reference("python").is_none());
    }
}

//! Bearer token lookup.

use std::path::{Path, PathBuf};

/// Source of the bearer credential attached to authenticated requests.
///
/// The token file is read on every lookup so that an external login that
/// rewrites it is picked up without restarting.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    /// Token given directly (environment), takes precedence over the file.
    fixed: Option<String>,
    /// File holding the token.
    path: Option<PathBuf>,
}

impl TokenStore {
    /// Create an empty store (no token).
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        let token = token.trim();
        self.fixed = (!token.is_empty()).then(|| token.to_string());
        self
    }

    /// Read the token from a file.
    pub fn with_file(mut self, path: &Path) -> Self {
        self.path = Some(path.to_path_buf());
        self
    }

    /// Current token, if any. Empty values count as absent.
    pub fn token(&self) -> Option<String> {
        if let Some(token) = &self.fixed {
            return Some(token.clone());
        }
        let path = self.path.as_ref()?;
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let token = content.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(e) => {
                tracing::trace!(path = %path.display(), error = %e, "no token file");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_store() {
        assert!(TokenStore::new().token().is_none());
        assert!(TokenStore::new().with_token("  ").token().is_none());
    }

    #[test]
    fn test_fixed_token_wins() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "from-file").unwrap();

        let store = TokenStore::new()
            .with_file(file.path())
            .with_token("from-env");
        assert_eq!(store.token().as_deref(), Some("from-env"));
    }

    #[test]
    fn test_file_token_is_reread() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        let store = TokenStore::new().with_file(&path);

        assert!(store.token().is_none());

        std::fs::write(&path, "abc123\n").unwrap();
        assert_eq!(store.token().as_deref(), Some("abc123"));

        std::fs::write(&path, "").unwrap();
        assert!(store.token().is_none());
    }
}

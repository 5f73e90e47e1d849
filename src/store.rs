//! Durable storage for the single credential set a client works with.
//!
//! [`TokenStore`] is the seam: [`LocalTokenStore`] keeps the token in a JSON
//! file, [`MemoryTokenStore`] keeps it in process. Other backends (an
//! encrypted file, a secret manager) only need `load` and `save`.

use crate::error::{Result, SchwabError};
use crate::token::Token;
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tempfile::NamedTempFile;

/// Default file name of the local token store
pub const DEFAULT_TOKEN_FILE: &str = "tokens.json";

/// Persistence for exactly one [`Token`].
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Last persisted token, or `None` when nothing usable is stored.
    ///
    /// Unreadable or corrupt records are reported as `None` so callers can
    /// fall through to re-authorization.
    async fn load(&self) -> Option<Token>;

    /// Overwrite the persisted token
    async fn save(&self, token: &Token) -> Result<()>;

    /// Human-readable location of the record, for diagnostics
    fn location(&self) -> String;
}

/// Token store backed by a JSON file on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalTokenStore {
    path: PathBuf,
}

impl LocalTokenStore {
    /// Create a store writing to the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LocalTokenStore { path: path.into() }
    }

    /// Path of the token file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for LocalTokenStore {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_FILE)
    }
}

#[async_trait]
impl TokenStore for LocalTokenStore {
    async fn load(&self) -> Option<Token> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "no token file to load");
                return None;
            }
        };

        match Token::from_json(&bytes) {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "ignoring unreadable token file"
                );
                None
            }
        }
    }

    async fn save(&self, token: &Token) -> Result<()> {
        let contents = serde_json::to_vec_pretty(token)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomic(&path, &contents))
            .await
            .map_err(|e| SchwabError::Other(format!("token store write task failed: {}", e)))??;

        tracing::debug!(path = %self.path.display(), "saved tokens");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Write through a temp file in the target directory, then rename over the
/// target so readers never observe a partial record.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    let mut tmp = NamedTempFile::new_in(&parent)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// In-process token store, useful for tests and for embedding
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<Token>>,
}

impl MemoryTokenStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding a token
    pub fn with_token(token: Token) -> Self {
        MemoryTokenStore {
            token: Mutex::new(Some(token)),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Option<Token> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn save(&self, token: &Token) -> Result<()> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Durable credential storage for the Xert token pair.
//!
//! The store is a flat `KEY=value` text file (the project `.env`) holding
//! `XERT_ACCESS_TOKEN` and `XERT_REFRESH_TOKEN`. Unknown keys and
//! unrelated lines are preserved on every write. A `TokenStore` is an
//! explicit instance owned by its client; nothing is loaded at module
//! import time.
//!
//! Writes are full-file rewrites without fsync or a temp-file swap;
//! callers that need crash-safe durability must add it. There is no file
//! locking, so concurrent writers are last-writer-wins.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::RwLock;
use tracing::debug;

use crate::constants::env_keys;
use crate::error::XertError;

/// The current access/refresh pair, either field possibly absent
#[derive(Debug, Clone, Default)]
pub struct TokenPair {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

/// Single source of truth for the process's Xert credentials
pub struct TokenStore {
    path: PathBuf,
    tokens: RwLock<TokenPair>,
}

impl TokenStore {
    /// Load the token pair from the credential file into memory.
    ///
    /// Keys missing from the file fall back to the process environment;
    /// values missing from both are `None`, never an error. A missing
    /// file is treated as empty.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, XertError> {
        let path = path.as_ref().to_path_buf();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let access = read_key(&content, env_keys::ACCESS_TOKEN)
            .or_else(|| std::env::var(env_keys::ACCESS_TOKEN).ok());
        let refresh = read_key(&content, env_keys::REFRESH_TOKEN)
            .or_else(|| std::env::var(env_keys::REFRESH_TOKEN).ok());

        debug!(
            path = %path.display(),
            has_access = access.is_some(),
            has_refresh = refresh.is_some(),
            "loaded token store"
        );

        Ok(Self {
            path,
            tokens: RwLock::new(TokenPair { access, refresh }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn access_token(&self) -> Option<String> {
        self.tokens.read().await.access.clone()
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.tokens.read().await.refresh.clone()
    }

    /// Persist a new token pair.
    ///
    /// Upserts both keys into the credential file (existing lines are
    /// replaced, otherwise new lines are appended), normalizes blank
    /// lines, and rewrites the file in full. The in-memory mirror and the
    /// process environment are updated so reads within this process see
    /// the new values without touching disk.
    pub async fn save(&self, access: &str, refresh: &str) -> Result<(), XertError> {
        let mut tokens = self.tokens.write().await;

        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let content = upsert_key(&content, env_keys::ACCESS_TOKEN, access);
        let content = upsert_key(&content, env_keys::REFRESH_TOKEN, refresh);
        let content = normalize(&content);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, content)?;

        tokens.access = Some(access.to_string());
        tokens.refresh = Some(refresh.to_string());
        std::env::set_var(env_keys::ACCESS_TOKEN, access);
        std::env::set_var(env_keys::REFRESH_TOKEN, refresh);

        debug!(path = %self.path.display(), "persisted refreshed token pair");
        Ok(())
    }
}

fn read_key(content: &str, key: &str) -> Option<String> {
    let prefix = format!("{key}=");
    content
        .lines()
        .find_map(|line| line.strip_prefix(prefix.as_str()))
        .map(str::to_string)
        .filter(|v| !v.is_empty())
}

/// Replace every `KEY=...` line with the new value, or append one.
fn upsert_key(content: &str, key: &str, value: &str) -> String {
    let prefix = format!("{key}=");
    if content.lines().any(|line| line.starts_with(&prefix)) {
        content
            .lines()
            .map(|line| {
                if line.starts_with(&prefix) {
                    format!("{key}={value}")
                } else {
                    line.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        format!("{content}\n{key}={value}")
    }
}

/// Collapse runs of 3+ newlines to one blank line, trim surrounding
/// whitespace, and end with exactly one trailing newline.
fn normalize(content: &str) -> String {
    let mut collapsed = String::with_capacity(content.len());
    let mut run = 0usize;
    for c in content.chars() {
        if c == '\n' {
            run += 1;
            if run <= 2 {
                collapsed.push('\n');
            }
        } else {
            run = 0;
            collapsed.push(c);
        }
    }

    let mut out = collapsed.trim().to_string();
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // save() mirrors into the process environment, so tests that touch
    // the env keys serialize on this.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn temp_store(dir: &TempDir) -> TokenStore {
        TokenStore::load(dir.path().join(".env")).unwrap()
    }

    fn count_key(content: &str, key: &str) -> usize {
        let prefix = format!("{key}=");
        content.lines().filter(|l| l.starts_with(&prefix)).count()
    }

    #[tokio::test]
    async fn test_load_missing_file_yields_none() {
        let _guard = ENV_MUTEX.lock().unwrap();
        std::env::remove_var(env_keys::ACCESS_TOKEN);
        std::env::remove_var(env_keys::REFRESH_TOKEN);

        let dir = TempDir::new().unwrap();
        let store = temp_store(&dir);
        assert!(store.access_token().await.is_none());
        assert!(store.refresh_token().await.is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let dir = TempDir::new().unwrap();
        let store = temp_store(&dir);

        store.save("at-abc", "rt-xyz").await.unwrap();

        let reloaded = temp_store(&dir);
        assert_eq!(reloaded.access_token().await.as_deref(), Some("at-abc"));
        assert_eq!(reloaded.refresh_token().await.as_deref(), Some("rt-xyz"));
    }

    #[tokio::test]
    async fn test_save_updates_in_memory_mirror_and_env() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let dir = TempDir::new().unwrap();
        let store = temp_store(&dir);

        store.save("at-1", "rt-1").await.unwrap();

        assert_eq!(store.access_token().await.as_deref(), Some("at-1"));
        assert_eq!(store.refresh_token().await.as_deref(), Some("rt-1"));
        assert_eq!(std::env::var(env_keys::ACCESS_TOKEN).unwrap(), "at-1");
        assert_eq!(std::env::var(env_keys::REFRESH_TOKEN).unwrap(), "rt-1");
    }

    #[tokio::test]
    async fn test_repeated_save_is_idempotent() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let dir = TempDir::new().unwrap();
        let store = temp_store(&dir);

        store.save("at-same", "rt-same").await.unwrap();
        store.save("at-same", "rt-same").await.unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(count_key(&content, env_keys::ACCESS_TOKEN), 1);
        assert_eq!(count_key(&content, env_keys::REFRESH_TOKEN), 1);
    }

    #[tokio::test]
    async fn test_save_preserves_unrelated_lines() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "PORT=3000\nOTHER_SECRET=keepme\n").unwrap();

        let store = TokenStore::load(&path).unwrap();
        store.save("at-new", "rt-new").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("PORT=3000"));
        assert!(content.contains("OTHER_SECRET=keepme"));
        assert!(content.contains("XERT_ACCESS_TOKEN=at-new"));
        assert!(content.contains("XERT_REFRESH_TOKEN=rt-new"));
    }

    #[tokio::test]
    async fn test_save_replaces_existing_values() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "XERT_ACCESS_TOKEN=at-old\nXERT_REFRESH_TOKEN=rt-old\n",
        )
        .unwrap();

        let store = TokenStore::load(&path).unwrap();
        store.save("at-new", "rt-new").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("at-old"));
        assert!(!content.contains("rt-old"));
        assert_eq!(count_key(&content, env_keys::ACCESS_TOKEN), 1);
        assert_eq!(count_key(&content, env_keys::REFRESH_TOKEN), 1);
    }

    #[tokio::test]
    async fn test_save_collapses_blank_line_runs() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "A=1\n\n\n\n\nB=2\n").unwrap();

        let store = TokenStore::load(&path).unwrap();
        store.save("at", "rt").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("\n\n\n"));
        assert!(content.contains("A=1\n\nB=2"));
        assert!(content.ends_with('\n'));
        assert!(!content.ends_with("\n\n"));
    }

    #[test]
    fn test_normalize_trailing_newline() {
        assert_eq!(normalize("A=1"), "A=1\n");
        assert_eq!(normalize("A=1\n\n\n\n"), "A=1\n");
        assert_eq!(normalize("\n\nA=1\n\n\nB=2"), "A=1\n\nB=2\n");
    }

    #[test]
    fn test_upsert_appends_missing_key() {
        let out = upsert_key("FOO=bar", "NEW", "val");
        assert!(out.contains("FOO=bar"));
        assert!(out.contains("NEW=val"));
    }

    #[test]
    fn test_read_key_ignores_empty_values() {
        assert_eq!(read_key("K=\n", "K"), None);
        assert_eq!(read_key("K=v\n", "K"), Some("v".to_string()));
        assert_eq!(read_key("OTHER=v\n", "K"), None);
    }
}

//! Filesystem secret store.

use crate::error::SecretResult;
use crate::traits::SecretStore;
use async_trait::async_trait;
use rand::RngCore;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use xsrf_token::Secret;

/// Secret persisted in a single file.
///
/// Creation writes the candidate to a private temporary file and hard-links
/// it into place. The link fails if the target exists, so processes sharing
/// the file converge on one secret and never read a half-written value.
/// The directory must be on a filesystem that supports hard links.
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    /// Use `path` as the secret file. Parent directories are created on the
    /// first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(
            ".{}.{:016x}.tmp",
            std::process::id(),
            rand::thread_rng().next_u64()
        ));
        self.path.with_file_name(name)
    }

    async fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(path).await?;
        let written = async {
            tokio::io::AsyncWriteExt::write_all(&mut file, contents).await?;
            file.sync_all().await
        }
        .await;
        discard_on_error(path, written).await
    }
}

/// Remove `path` when `result` is an error, then pass `result` through.
async fn discard_on_error<T>(path: &Path, result: std::io::Result<T>) -> std::io::Result<T> {
    if result.is_err() {
        let _ = fs::remove_file(path).await;
    }
    result
}

fn parse_secret(mut contents: Vec<u8>) -> SecretResult<Secret> {
    while contents.last().is_some_and(|b| b.is_ascii_whitespace()) {
        contents.pop();
    }
    Ok(Secret::new(contents)?)
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn load(&self) -> SecretResult<Option<Secret>> {
        match fs::read(&self.path).await {
            Ok(contents) => parse_secret(contents).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_if_absent(&self, candidate: Secret) -> SecretResult<Secret> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }

        let temp = self.temp_path();
        Self::write_private(&temp, candidate.as_bytes()).await?;

        let linked = fs::hard_link(&temp, &self.path).await;
        let _ = fs::remove_file(&temp).await;

        match linked {
            Ok(()) => {
                xsrf_log::info!(target: "xsrf::secret", "created XSRF secret at {}", self.path.display());
                Ok(candidate)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                xsrf_log::debug!(target: "xsrf::secret", "XSRF secret already exists at {}", self.path.display());
                let contents = fs::read(&self.path).await?;
                parse_secret(contents)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SecretError;

    #[tokio::test]
    async fn test_failed_write_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let partial = dir.path().join("secret.1.tmp");
        std::fs::write(&partial, "0123").unwrap();

        let result: std::io::Result<()> =
            discard_on_error(&partial, Err(std::io::Error::other("disk full"))).await;
        assert_eq!(result.unwrap_err().to_string(), "disk full");
        assert!(!partial.exists());

        let kept = dir.path().join("secret.2.tmp");
        std::fs::write(&kept, "0123").unwrap();
        discard_on_error(&kept, Ok(())).await.unwrap();
        assert!(kept.exists());
    }

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSecretStore::new(dir.path().join("xsrf.secret"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSecretStore::new(dir.path().join("nested/xsrf.secret"));
        let secret = Secret::generate();

        assert_eq!(store.create_if_absent(secret.clone()).await.unwrap(), secret);
        assert_eq!(store.load().await.unwrap(), Some(secret));
    }

    #[tokio::test]
    async fn test_existing_secret_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xsrf.secret");
        let first = FileSecretStore::new(&path);
        let second = FileSecretStore::new(&path);

        let winner = first.create_if_absent(Secret::generate()).await.unwrap();
        let observed = second.create_if_absent(Secret::generate()).await.unwrap();
        assert_eq!(winner, observed);
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSecretStore::new(dir.path().join("xsrf.secret"));
        store.create_if_absent(Secret::generate()).await.unwrap();
        store.create_if_absent(Secret::generate()).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("xsrf.secret")]);
    }

    #[tokio::test]
    async fn test_trailing_newline_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xsrf.secret");
        std::fs::write(&path, "0123456789abcdef\n").unwrap();

        let store = FileSecretStore::new(&path);
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.as_bytes(), b"0123456789abcdef");
    }

    #[tokio::test]
    async fn test_empty_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xsrf.secret");
        std::fs::write(&path, "").unwrap();

        let store = FileSecretStore::new(&path);
        assert!(matches!(
            store.load().await,
            Err(SecretError::InvalidSecret(_))
        ));
    }
}

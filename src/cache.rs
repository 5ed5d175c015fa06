//! Persistent download and clone cache.
//!
//! Downloads and clones land in one cache directory and are reused across
//! runs: a fetch whose destination already exists performs no network
//! transfer, and a clone whose working copy already exists is returned
//! as-is.

use crate::error::{BundlerError, Result};
use crate::tools::{ToolCommand, ToolRunner, run_checked};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Content-addressed-by-filename cache of downloaded artifacts and cloned
/// repositories.
#[derive(Clone, Debug)]
pub struct DownloadCache {
    dir: PathBuf,
}

impl DownloadCache {
    /// Creates a handle over `dir`, creating the directory if missing.
    pub async fn open(dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(dir).await?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Cache directory root.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache-local path for a named artifact.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Streams `url` to `dest` in chunks. A no-op when `dest` already
    /// exists.
    pub async fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        if dest.exists() {
            log::info!("cache hit for {}", dest.display());
            return Ok(());
        }

        log::info!("downloading {url} to {}", dest.display());
        let mut response = reqwest::get(url).await?.error_for_status()?;

        // Stream into a scratch name so an interrupted transfer never
        // shows up as a complete cached artifact on the next run.
        let part = partial_path(dest);
        let mut file = tokio::fs::File::create(&part).await?;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        drop(file);
        tokio::fs::rename(&part, dest).await?;
        Ok(())
    }

    /// Returns a cache-local working copy of `repo_url`, cloning it on
    /// first use.
    pub async fn clone_or_reuse<R: ToolRunner>(
        &self,
        runner: &R,
        repo_url: &str,
    ) -> Result<PathBuf> {
        let dest = self.dir.join(repo_name(repo_url)?);
        if dest.exists() {
            log::info!("reusing existing clone at {}", dest.display());
            return Ok(dest);
        }

        log::info!("cloning {repo_url} to {}", dest.display());
        let cmd = ToolCommand::new("git")
            .arg("clone")
            .arg(repo_url)
            .arg(dest.to_string_lossy());
        run_checked(runner, &cmd).await?;
        Ok(dest)
    }
}

/// In-progress download path for `dest`.
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// Working-copy name for a repository URL: the final path segment with a
/// trailing `.git` stripped.
pub fn repo_name(repo_url: &str) -> Result<String> {
    let parsed = url::Url::parse(repo_url).map_err(|_| BundlerError::MissingPath {
        what: "repository URL".into(),
        path: PathBuf::from(repo_url),
    })?;
    let segment = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| BundlerError::MissingPath {
            what: "repository name in URL".into(),
            path: PathBuf::from(repo_url),
        })?;
    Ok(segment.trim_end_matches(".git").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_name_strips_path_and_suffix() {
        assert_eq!(
            repo_name("https://github.com/zackelia/ghidra-dark.git").unwrap(),
            "ghidra-dark"
        );
        assert_eq!(
            repo_name("https://github.com/jpleasu/ghidraal").unwrap(),
            "ghidraal"
        );
    }

    #[tokio::test]
    async fn fetch_is_idempotent_once_cached() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DownloadCache::open(dir.path()).await.unwrap();

        let dest = cache.path("ghidra_11.1_PUBLIC.zip");
        std::fs::write(&dest, b"cached bytes").unwrap();

        // The URL is unresolvable; a cache hit must not try the network.
        cache
            .fetch("http://invalid.invalid/ghidra.zip", &dest)
            .await
            .unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"cached bytes");
    }

    #[tokio::test]
    async fn failed_download_leaves_no_cache_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DownloadCache::open(dir.path()).await.unwrap();
        let dest = cache.path("ghidra_11.1_PUBLIC.zip");

        // A scratch file from an earlier interrupted transfer is not a
        // cache hit; the fetch still goes to the network and fails.
        std::fs::write(partial_path(&dest), b"truncated bytes").unwrap();
        let result = cache.fetch("http://invalid.invalid/ghidra.zip", &dest).await;

        assert!(result.is_err());
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn clone_or_reuse_skips_existing_working_copy() {
        struct PanicRunner;
        impl crate::tools::ToolRunner for PanicRunner {
            async fn run(
                &self,
                _cmd: &ToolCommand,
            ) -> crate::error::Result<crate::tools::ToolOutput> {
                panic!("clone must not run for an existing working copy");
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let cache = DownloadCache::open(dir.path()).await.unwrap();
        std::fs::create_dir(dir.path().join("ghidra-dark")).unwrap();

        let path = cache
            .clone_or_reuse(&PanicRunner, "https://github.com/zackelia/ghidra-dark.git")
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("ghidra-dark"));
    }
}

//! File system helpers for bundle assembly.
//!
//! All creation helpers use "create if missing" semantics so every stage of
//! the pipeline can be re-run against a partially built staging tree.

use crate::error::Result;
use std::io;
use std::path::Path;
use tokio::fs;

/// Creates all of the directories of the specified path.
///
/// Already-existing directories are not an error.
pub async fn create_dir_all(path: &Path) -> Result<()> {
    Ok(fs::create_dir_all(path).await?)
}

/// Copies a regular file, creating any parent directories of the
/// destination path as necessary.
pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.is_file() {
        return Err(crate::error::BundlerError::MissingPath {
            what: "source file".into(),
            path: from.to_path_buf(),
        });
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir).await?;
    }
    fs::copy(from, to).await?;
    Ok(())
}

/// Recursively copies a directory, creating any parent directories of the
/// destination path as necessary.
///
/// Symlinks are copied as symlinks rather than followed; the embedded
/// GraalVM breaks without its internal links intact.
pub async fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    if !from.is_dir() {
        return Err(crate::error::BundlerError::MissingPath {
            what: "source directory".into(),
            path: from.to_path_buf(),
        });
    }

    let from = from.to_path_buf();
    let to = to.to_path_buf();

    // Blocking traversal belongs on the blocking pool
    tokio::task::spawn_blocking(move || -> io::Result<()> {
        if let Some(parent) = to.parent() {
            std::fs::create_dir_all(parent)?;
        }

        for entry in walkdir::WalkDir::new(&from) {
            let entry = entry.map_err(io::Error::other)?;
            let rel_path = entry
                .path()
                .strip_prefix(&from)
                .map_err(io::Error::other)?;
            let dest_path = to.join(rel_path);

            if entry.path_is_symlink() {
                let target = std::fs::read_link(entry.path())?;
                symlink(&target, &dest_path)?;
            } else if entry.file_type().is_dir() {
                std::fs::create_dir_all(&dest_path)?;
            } else {
                std::fs::copy(entry.path(), &dest_path)?;
            }
        }

        Ok(())
    })
    .await
    .map_err(|e| io::Error::other(format!("directory copy task panicked: {e}")))??;

    Ok(())
}

/// Makes a symbolic link, leaving an existing one in place.
pub fn symlink_if_missing(target: &Path, link: &Path) -> Result<()> {
    if link.symlink_metadata().is_ok() {
        return Ok(());
    }
    Ok(symlink(target, link)?)
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::other("symlinks unsupported on this platform"))
}

/// Marks a file executable (`rwxr-xr-x`).
#[cfg(unix)]
pub async fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path).await?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).await?;
    Ok(())
}

#[cfg(not(unix))]
pub async fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

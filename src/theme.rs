//! Dark-mode theme installation.
//!
//! Delegates to the third-party `ghidra-dark` installer script, run
//! against the installed release payload. Script failure propagates; there
//! is no rollback of whatever the script already changed.

use crate::cache::DownloadCache;
use crate::config::DARK_MODE_REPO_URL;
use crate::error::Result;
use crate::tools::{ToolCommand, ToolRunner, run_checked};
use std::path::Path;

/// Clones (or reuses) the theming repository and runs its installer
/// against `release_root`.
pub async fn install_dark_mode<R: ToolRunner>(
    runner: &R,
    cache: &DownloadCache,
    release_root: &Path,
) -> Result<()> {
    log::info!("installing dark mode");
    let repo = cache.clone_or_reuse(runner, DARK_MODE_REPO_URL).await?;

    let cmd = ToolCommand::new("python3")
        .arg(repo.join("install.py").to_string_lossy())
        .arg("--path")
        .arg(release_root.to_string_lossy());
    run_checked(runner, &cmd).await?;
    Ok(())
}

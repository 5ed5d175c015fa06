//! Disk image packaging.
//!
//! Wraps the assembled staging tree into a compressed, mountable image via
//! `hdiutil`. The only retry in the pipeline lives here: a failed creation
//! with a stale image already sitting at the output path gets the stale
//! file deleted and exactly one more attempt.

use crate::config::APP_NAME;
use crate::error::Result;
use crate::fsutil;
use crate::tools::{ToolCommand, ToolRunner, run_checked};
use std::path::{Path, PathBuf};

/// Packages `staging_root` into `<out_dir>/Ghidra.dmg`.
pub async fn package<R: ToolRunner>(
    runner: &R,
    staging_root: &Path,
    out_dir: &Path,
) -> Result<PathBuf> {
    let image_name = format!("{APP_NAME}.dmg");

    // A leftover image in the working directory confuses hdiutil runs that
    // use relative output paths; clear it first.
    let local = Path::new(&image_name);
    if local.exists() {
        tokio::fs::remove_file(local).await?;
    }

    fsutil::create_dir_all(out_dir).await?;
    let out_image = out_dir.join(&image_name);

    log::info!("building {}", out_image.display());
    let cmd = ToolCommand::new("hdiutil")
        .arg("create")
        .args(["-volname", APP_NAME, "-fs", "HFS+", "-srcfolder"])
        .arg(staging_root.to_string_lossy())
        .arg(out_image.to_string_lossy());

    match run_checked(runner, &cmd).await {
        Ok(_) => Ok(out_image),
        Err(e) if e.is_tool_failure() && out_image.exists() => {
            log::warn!(
                "hdiutil failed with a stale image at {}; deleting and retrying once",
                out_image.display()
            );
            tokio::fs::remove_file(&out_image).await?;
            run_checked(runner, &cmd).await?;
            Ok(out_image)
        }
        Err(e) => Err(e),
    }
}

//! Dock icon patching.
//!
//! Ghidra draws its dock icon from images packed into `Generic.jar`, so a
//! consistent icon means resizing the source PNG to every resolution the
//! framework ships and inserting each one into the jar. The `jar` tool
//! resolves member paths relative to its invocation's working directory,
//! so the whole patch runs with the release root as the process working
//! directory, restored on every exit path by [`WorkingDirGuard`].

use crate::error::Result;
use crate::fsutil;
use crate::tools::{ToolCommand, ToolRunner, run_checked};
use std::path::{Path, PathBuf};

/// Icon resolutions shipped in the Ghidra framework jar.
const ICON_RESOLUTIONS: [u32; 7] = [16, 32, 40, 48, 64, 128, 256];

/// Jar member directory the icons live under, relative to the release root.
const IMAGES_DIR: &str = "images";

/// The framework jar holding the application icons.
const GENERIC_JAR: &str = "Ghidra/Framework/Generic/lib/Generic.jar";

/// Scoped working-directory change.
///
/// Changes the process working directory on construction and restores the
/// previous one on drop, including unwinds and early error returns.
#[derive(Debug)]
pub struct WorkingDirGuard {
    original: PathBuf,
}

impl WorkingDirGuard {
    /// Switches the process working directory to `dir`.
    pub fn change_to(dir: &Path) -> Result<Self> {
        let original = std::env::current_dir()?;
        std::env::set_current_dir(dir)?;
        Ok(Self { original })
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.original) {
            // Nowhere to propagate from a destructor; later relative-path
            // operations will fail loudly anyway.
            log::error!(
                "failed to restore working directory to {}: {e}",
                self.original.display()
            );
        }
    }
}

/// Resizes the source icon to every framework resolution and inserts each
/// image into `Generic.jar` inside the release payload.
pub async fn patch_dock_icon<R: ToolRunner>(
    runner: &R,
    icon_png: &Path,
    release_root: &Path,
) -> Result<()> {
    log::info!("patching {GENERIC_JAR} with dock icons");

    // The icon path must survive the directory change below.
    let icon_png = icon_png.canonicalize()?;
    fsutil::create_dir_all(&release_root.join(IMAGES_DIR)).await?;

    let _guard = WorkingDirGuard::change_to(release_root)?;

    for res in ICON_RESOLUTIONS {
        let target = format!("{IMAGES_DIR}/GhidraIcon{res}.png");

        let convert = ToolCommand::new("convert")
            .arg(icon_png.to_string_lossy())
            .arg("-resize")
            .arg(format!("{res}x{res}"))
            .arg(target.as_str());
        run_checked(runner, &convert).await?;

        let jar = ToolCommand::new("jar")
            .args(["-u", "-f", GENERIC_JAR])
            .arg(target.as_str());
        run_checked(runner, &jar).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolOutput;
    use std::sync::Mutex;

    // Process working directory is global; serialize the tests that move it.
    static CWD_LOCK: Mutex<()> = Mutex::new(());

    struct FailingRunner;
    impl ToolRunner for FailingRunner {
        async fn run(&self, _cmd: &ToolCommand) -> Result<ToolOutput> {
            Ok(ToolOutput {
                success: false,
                code: Some(1),
                stderr: "convert: no decode delegate".into(),
            })
        }
    }

    #[test]
    fn guard_restores_working_directory_on_drop() {
        let _lock = CWD_LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let before = std::env::current_dir().unwrap();

        {
            let _guard = WorkingDirGuard::change_to(dir.path()).unwrap();
            assert_eq!(
                std::env::current_dir().unwrap().canonicalize().unwrap(),
                dir.path().canonicalize().unwrap()
            );
        }

        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    fn guard_restores_working_directory_on_unwind() {
        let _lock = CWD_LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let before = std::env::current_dir().unwrap();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = WorkingDirGuard::change_to(dir.path()).unwrap();
            panic!("mid-patch failure");
        }));

        assert!(result.is_err());
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[tokio::test]
    async fn failed_patch_still_restores_working_directory() {
        let _lock = CWD_LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let icon = dir.path().join("GhidraIcon.png");
        std::fs::write(&icon, b"png").unwrap();
        let release = dir.path().join("ghidra_11.1_PUBLIC");
        std::fs::create_dir_all(&release).unwrap();

        let before = std::env::current_dir().unwrap();
        let err = patch_dock_icon(&FailingRunner, &icon, &release)
            .await
            .unwrap_err();
        assert!(err.is_tool_failure());
        assert_eq!(std::env::current_dir().unwrap(), before);
    }
}

//! Plain JDK embedding.

use crate::bundle::BundleLayout;
use crate::error::{BundlerError, Result};
use crate::fsutil;
use crate::tools::{ToolCommand, ToolRunner, run_checked};
use std::path::Path;

/// Embeds a user-supplied JDK into `Resources/jdk`.
///
/// A zip is extracted in place; an extracted directory is copied with
/// symlinks preserved.
pub async fn embed<R: ToolRunner>(
    runner: &R,
    source: &Path,
    layout: &BundleLayout,
) -> Result<()> {
    let jdk_dir = layout.jdk_dir();

    if source.is_file() {
        log::info!("extracting JDK to {}", jdk_dir.display());
        let cmd = ToolCommand::new("unzip")
            .arg("-d")
            .arg(jdk_dir.to_string_lossy())
            .arg(source.to_string_lossy());
        run_checked(runner, &cmd).await?;
    } else if source.is_dir() {
        log::info!("copying JDK to {}", jdk_dir.display());
        fsutil::copy_dir(source, &jdk_dir).await?;
    } else {
        return Err(BundlerError::MissingPath {
            what: "JDK zip or directory".into(),
            path: source.to_path_buf(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolOutput;

    struct NoToolRunner;
    impl ToolRunner for NoToolRunner {
        async fn run(&self, _cmd: &ToolCommand) -> Result<ToolOutput> {
            panic!("directory embedding must not shell out");
        }
    }

    #[tokio::test]
    async fn directory_jdk_is_copied_and_graal_stays_absent() {
        let dir = tempfile::tempdir().unwrap();
        let jdk_src = dir.path().join("jdk-17");
        std::fs::create_dir_all(jdk_src.join("bin")).unwrap();
        std::fs::write(jdk_src.join("bin/java"), b"elf").unwrap();

        let layout = BundleLayout::new(dir.path().join("staging"), "11.1");
        layout.ensure().await.unwrap();
        embed(&NoToolRunner, &jdk_src, &layout).await.unwrap();

        assert!(layout.jdk_dir().join("bin/java").is_file());
        assert!(!layout.graal_dir().exists());
    }

    #[tokio::test]
    async fn missing_source_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let layout = BundleLayout::new(dir.path().join("staging"), "11.1");
        layout.ensure().await.unwrap();

        let err = embed(&NoToolRunner, &dir.path().join("nope"), &layout)
            .await
            .unwrap_err();
        assert!(matches!(err, BundlerError::MissingPath { .. }));
    }
}

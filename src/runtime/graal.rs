//! GraalVM embedding and the Ghidraal companion extension.
//!
//! The latest GraalVM CE release is downloaded and extracted into the
//! cache, primed there with its language components, then copied (symlinks
//! intact) into the bundle. A relative `Resources/jdk` symlink points at
//! the embedded home so the bundle stays relocatable, and `gu list` run
//! from the copied home verifies the embedding before anything builds
//! against it.

use crate::bundle::BundleLayout;
use crate::cache::DownloadCache;
use crate::config::{Config, GHIDRAAL_REPO_URL, GRAALVM_RELEASE_API_URL};
use crate::error::{BundlerError, Result};
use crate::extension;
use crate::fsutil;
use crate::release;
use crate::tools::{ToolCommand, ToolRunner, run_checked};
use std::path::{Path, PathBuf};

/// Asset filters selecting the macOS GraalVM CE archive.
const GRAAL_ASSET_FILTERS: [&str; 3] = ["tar.gz", "graalvm-ce-java11", "darwin"];

/// Language components installed into the cached copy before embedding.
const GU_COMPONENTS: [&str; 7] = [
    "llvm-toolchain",
    "native-image",
    "nodejs",
    "python",
    "ruby",
    "R",
    "wasm",
];

/// Embeds the latest GraalVM release into `Resources/graal` and links
/// `Resources/jdk` at its home directory.
///
/// Returns the absolute path of the embedded home. Fails up front when a
/// plain JDK is already embedded; the symlink would collide with it.
pub async fn embed<R: ToolRunner>(
    runner: &R,
    cache: &DownloadCache,
    layout: &BundleLayout,
) -> Result<PathBuf> {
    let jdk_dir = layout.jdk_dir();
    if jdk_dir.symlink_metadata().is_ok() {
        return Err(BundlerError::JdkConflict { path: jdk_dir });
    }

    let asset =
        release::latest_release_asset(GRAALVM_RELEASE_API_URL, &GRAAL_ASSET_FILTERS).await?;
    let archive = cache.path(&asset.name);
    cache.fetch(&asset.browser_download_url, &archive).await?;

    let dist_name = dist_dir_name(&asset.name);
    let cached_dist = cache.path(&dist_name);
    if cached_dist.exists() {
        log::info!("reusing primed GraalVM at {}", cached_dist.display());
    } else {
        log::info!("extracting {}", archive.display());
        let untar = ToolCommand::new("tar")
            .arg("-C")
            .arg(cache.dir().to_string_lossy())
            .arg("-xf")
            .arg(archive.to_string_lossy());
        run_checked(runner, &untar).await?;

        log::info!("installing GraalVM components: {}", GU_COMPONENTS.join(" "));
        let gu = cached_dist.join("Contents").join("Home").join("bin").join("gu");
        let install = ToolCommand::new(gu.to_string_lossy())
            .arg("install")
            .args(GU_COMPONENTS);
        run_checked(runner, &install).await?;
    }

    log::info!("copying GraalVM into the bundle");
    let embedded_dist = layout.graal_dir().join(&dist_name);
    if !embedded_dist.exists() {
        fsutil::copy_dir(&cached_dist, &embedded_dist).await?;
    }

    // Relative so the bundle survives relocation. The depth below the
    // dist directory is a per-release-line assumption, pinned by a test.
    fsutil::symlink_if_missing(&relative_home(&dist_name), &jdk_dir)?;

    let graal_home = embedded_dist.join("Contents").join("Home");
    verify(runner, &graal_home).await?;
    Ok(graal_home)
}

/// Checks the copied runtime answers `gu list`; a broken copy must fail
/// the run before extensions build against it.
async fn verify<R: ToolRunner>(runner: &R, graal_home: &Path) -> Result<()> {
    let gu = graal_home.join("bin").join("gu");
    let output = runner
        .run(&ToolCommand::new(gu.to_string_lossy()).arg("list"))
        .await?;
    if output.success {
        Ok(())
    } else {
        Err(BundlerError::RuntimeVerification {
            reason: format!("gu list exited non-zero: {}", output.stderr),
        })
    }
}

/// Builds the Ghidraal extension against the embedded runtime.
///
/// Ghidraal ships a broken build descriptor; the corrected copy from the
/// assets directory replaces it before the build. The returned artifact is
/// installed exactly like a user-requested extension.
pub async fn bootstrap_ghidraal<R: ToolRunner>(
    runner: &R,
    cache: &DownloadCache,
    config: &Config,
    layout: &BundleLayout,
    graal_home: &Path,
) -> Result<PathBuf> {
    log::info!("building the Ghidraal extension");
    let repo = cache.clone_or_reuse(runner, GHIDRAAL_REPO_URL).await?;

    tokio::fs::copy(config.ghidraal_build_gradle(), repo.join("build.gradle")).await?;

    extension::build(
        runner,
        &layout.release_root(),
        &repo,
        Some(graal_home),
    )
    .await
}

/// Extracted distribution directory name for a release asset:
/// `graalvm-ce-java11-darwin-amd64-21.3.0.tar.gz` unpacks as
/// `graalvm-ce-java11-21.3.0`.
fn dist_dir_name(asset_name: &str) -> String {
    asset_name
        .replace("darwin-amd64-", "")
        .trim_end_matches(".tar.gz")
        .to_string()
}

/// Symlink target for `Resources/jdk`, relative to the Resources
/// directory.
fn relative_home(dist_name: &str) -> PathBuf {
    PathBuf::from("graal")
        .join(dist_name)
        .join("Contents")
        .join("Home")
}

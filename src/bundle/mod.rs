//! Bundle layout and assembly.
//!
//! Builds the fixed `Ghidra.app` directory skeleton inside the staging
//! root, patches the Info.plist template with the resolved version,
//! installs static assets, and materializes the release payload. Every
//! step is create-if-missing, so assembly can be re-run against a
//! partially built staging tree.
//!
//! ```text
//! <staging>/
//! ├── Applications -> /Applications
//! └── Ghidra.app/Contents
//!     ├── Info.plist
//!     ├── MacOS/ghidra
//!     └── Resources
//!         ├── Ghidra.icns
//!         └── ghidra_<version>_PUBLIC
//! ```

pub mod icons;

use crate::cache::DownloadCache;
use crate::config::{APP_NAME, Config};
use crate::error::Result;
use crate::fsutil;
use crate::release::{ArtifactLocation, ReleaseArtifact};
use crate::tools::{ToolCommand, ToolRunner, run_checked};
use std::path::{Path, PathBuf};

/// Absolute paths of one bundle, all derived from the staging root and the
/// resolved release version.
#[derive(Clone, Debug)]
pub struct BundleLayout {
    root: PathBuf,
    version: String,
}

impl BundleLayout {
    /// Derives the layout from a staging root and release version.
    pub fn new(root: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            version: version.into(),
        }
    }

    /// Staging root the image is built from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/Ghidra.app`
    pub fn app_dir(&self) -> PathBuf {
        self.root.join(format!("{APP_NAME}.app"))
    }

    /// `<root>/Applications` drag-to-install symlink
    pub fn applications_link(&self) -> PathBuf {
        self.root.join("Applications")
    }

    /// `Contents` directory
    pub fn contents(&self) -> PathBuf {
        self.app_dir().join("Contents")
    }

    /// `Contents/Resources`
    pub fn resources(&self) -> PathBuf {
        self.contents().join("Resources")
    }

    /// `Contents/MacOS`
    pub fn macos_dir(&self) -> PathBuf {
        self.contents().join("MacOS")
    }

    /// `Contents/MacOS/ghidra` launcher script
    pub fn launcher(&self) -> PathBuf {
        self.macos_dir().join("ghidra")
    }

    /// `Contents/Info.plist`
    pub fn info_plist(&self) -> PathBuf {
        self.contents().join("Info.plist")
    }

    /// Root of the installed Ghidra release payload
    pub fn release_root(&self) -> PathBuf {
        self.resources()
            .join(format!("ghidra_{}_PUBLIC", self.version))
    }

    /// Extension install directory inside the payload
    pub fn extensions_dir(&self) -> PathBuf {
        self.release_root().join("Ghidra").join("Extensions")
    }

    /// Embedded plain JDK location (also the Graal compatibility symlink)
    pub fn jdk_dir(&self) -> PathBuf {
        self.resources().join("jdk")
    }

    /// Embedded GraalVM location
    pub fn graal_dir(&self) -> PathBuf {
        self.resources().join("graal")
    }

    /// Creates the directory skeleton and the `Applications` symlink.
    /// Safe to call repeatedly.
    pub async fn ensure(&self) -> Result<()> {
        fsutil::create_dir_all(&self.app_dir()).await?;
        fsutil::create_dir_all(&self.contents()).await?;
        fsutil::create_dir_all(&self.resources()).await?;
        fsutil::create_dir_all(&self.macos_dir()).await?;
        fsutil::symlink_if_missing(Path::new("/Applications"), &self.applications_link())?;
        Ok(())
    }
}

/// Assembles the bundle: skeleton, Info.plist, static assets, payload.
pub async fn assemble<R: ToolRunner>(
    runner: &R,
    config: &Config,
    layout: &BundleLayout,
    artifact: &ReleaseArtifact,
    cache: &DownloadCache,
) -> Result<()> {
    layout.ensure().await?;

    log::info!("setting bundle version to {}", artifact.version);
    write_info_plist(&config.plist_template(), &artifact.version, &layout.info_plist())?;

    log::info!("installing app icon and launcher");
    fsutil::copy_file(&config.icns(), &layout.resources().join("Ghidra.icns")).await?;
    fsutil::copy_file(&config.launcher(), &layout.launcher()).await?;
    fsutil::make_executable(&layout.launcher()).await?;

    materialize_payload(runner, layout, artifact, cache).await?;
    patch_launch_properties(&layout.release_root()).await?;
    Ok(())
}

/// Reads the Info.plist template, overwrites `CFBundleVersion` with the
/// resolved version, and writes the result into the bundle. No other field
/// is touched.
pub fn write_info_plist(template: &Path, version: &str, dest: &Path) -> Result<()> {
    let mut info = plist::Value::from_file(template)?;
    if let Some(dict) = info.as_dictionary_mut() {
        dict.insert(
            "CFBundleVersion".to_string(),
            plist::Value::String(version.to_string()),
        );
    }
    info.to_file_xml(dest)?;
    Ok(())
}

/// Materializes the release payload into `Resources/ghidra_<version>_PUBLIC`.
///
/// Skipped entirely when the target already exists; a directory artifact is
/// copied, an archive is extracted into the parent of the target path.
async fn materialize_payload<R: ToolRunner>(
    runner: &R,
    layout: &BundleLayout,
    artifact: &ReleaseArtifact,
    cache: &DownloadCache,
) -> Result<()> {
    let release_root = layout.release_root();
    if release_root.exists() {
        log::info!("payload already present at {}", release_root.display());
        return Ok(());
    }

    let archive = match &artifact.location {
        ArtifactLocation::LocalPath(path) if path.is_dir() => {
            log::info!("copying payload directory into bundle");
            return fsutil::copy_dir(path, &release_root).await;
        }
        ArtifactLocation::LocalPath(path) => path.clone(),
        ArtifactLocation::Remote { name, .. } => cache.path(name),
    };

    log::info!("extracting {} into bundle", archive.display());
    let parent = release_root
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| layout.resources());
    let cmd = ToolCommand::new("unzip")
        .arg(archive.to_string_lossy())
        .arg("-d")
        .arg(parent.to_string_lossy());
    run_checked(runner, &cmd).await?;
    Ok(())
}

/// Flips `useScreenMenuBar=false` to `true` in the payload's
/// `support/launch.properties` so the app uses the macOS menu bar.
async fn patch_launch_properties(release_root: &Path) -> Result<()> {
    let path = release_root.join("support").join("launch.properties");
    if !path.is_file() {
        log::warn!("{} missing, skipping menu bar patch", path.display());
        return Ok(());
    }

    log::info!("patching launch.properties to enable the screen menu bar");
    let contents = tokio::fs::read_to_string(&path).await?;
    let patched = contents.replace("useScreenMenuBar=false", "useScreenMenuBar=true");
    tokio::fs::write(&path, patched).await?;
    Ok(())
}

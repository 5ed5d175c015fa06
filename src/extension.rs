//! Ghidra extension resolution, building and installation.
//!
//! An extension entry is a repository URL, a zip of a project, or a local
//! project directory. Each resolves to a buildable source tree, gets built
//! by gradle against the installed payload, and contributes exactly one
//! archive out of its `dist` directory into `Ghidra/Extensions`.

use crate::bundle::BundleLayout;
use crate::cache::{DownloadCache, repo_name};
use crate::error::{BundlerError, Result};
use crate::fsutil;
use crate::tools::{ToolCommand, ToolRunner, run_checked};
use std::path::{Path, PathBuf};

/// One user-supplied extension entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtensionSource {
    /// Repository HTTPS clone URL
    RemoteUrl(String),
    /// Zip archive of an extension project
    LocalZip(PathBuf),
    /// Extension project directory
    LocalDirectory(PathBuf),
}

impl ExtensionSource {
    /// Classifies an entry. URLs win over zip paths, zip paths over
    /// directories.
    pub fn classify(entry: &str) -> Self {
        if entry.starts_with("http") {
            Self::RemoteUrl(entry.to_string())
        } else if entry.ends_with(".zip") {
            Self::LocalZip(PathBuf::from(entry))
        } else {
            Self::LocalDirectory(PathBuf::from(entry))
        }
    }

    /// Derived extension name: the final path segment, with the archive
    /// suffix stripped for URL and zip entries.
    pub fn name(&self) -> Result<String> {
        match self {
            Self::RemoteUrl(url) => repo_name(url),
            Self::LocalZip(path) | Self::LocalDirectory(path) => path
                .file_name()
                .map(|n| {
                    n.to_string_lossy()
                        .trim_end_matches(".zip")
                        .to_string()
                })
                .ok_or_else(|| BundlerError::MissingPath {
                    what: "extension name".into(),
                    path: path.clone(),
                }),
        }
    }

    /// Resolves the entry to a buildable source tree: clone for URLs,
    /// extraction into the cache for zips, pass-through for directories.
    pub async fn resolve<R: ToolRunner>(
        &self,
        runner: &R,
        cache: &DownloadCache,
    ) -> Result<PathBuf> {
        match self {
            Self::RemoteUrl(url) => cache.clone_or_reuse(runner, url).await,
            Self::LocalZip(path) => {
                let tree = cache.path(&self.name()?);
                if !tree.exists() {
                    let cmd = ToolCommand::new("unzip")
                        .arg("-d")
                        .arg(cache.dir().to_string_lossy())
                        .arg(path.to_string_lossy());
                    run_checked(runner, &cmd).await?;
                }
                Ok(tree)
            }
            Self::LocalDirectory(path) => Ok(path.clone()),
        }
    }
}

/// Builds an extension project with gradle and returns its single build
/// artifact.
///
/// The build runs inside `source_tree` with `GHIDRA_INSTALL_DIR` pointing
/// at the installed payload; when `java_home` is given, `JAVA_HOME` and a
/// `PATH` with its `bin` prepended are overlaid too. The ambient
/// environment is never modified.
pub async fn build<R: ToolRunner>(
    runner: &R,
    ghidra_home: &Path,
    source_tree: &Path,
    java_home: Option<&Path>,
) -> Result<PathBuf> {
    log::info!("building extension in {}", source_tree.display());

    let mut cmd = ToolCommand::new("gradle")
        .current_dir(source_tree)
        .env("GHIDRA_INSTALL_DIR", ghidra_home.to_string_lossy());
    if let Some(java_home) = java_home {
        let ambient_path = std::env::var("PATH").unwrap_or_default();
        cmd = cmd
            .env(
                "PATH",
                format!("{}:{ambient_path}", java_home.join("bin").display()),
            )
            .env("JAVA_HOME", java_home.to_string_lossy());
    }
    run_checked(runner, &cmd).await?;

    locate_artifact(&source_tree.join("dist"))
}

/// The one archive a successful build leaves under `dist`.
///
/// Zero matches means the build tool broke its contract; multiple matches
/// would make the installed artifact arbitrary. Both are errors.
pub fn locate_artifact(dist: &Path) -> Result<PathBuf> {
    let pattern = dist.join("*.zip");
    let mut matches: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())?
        .filter_map(std::result::Result::ok)
        .collect();
    matches.sort();

    match matches.len() {
        0 => Err(BundlerError::NoArtifact {
            dir: dist.to_path_buf(),
        }),
        1 => Ok(matches.remove(0)),
        count => Err(BundlerError::MultipleArtifacts {
            dir: dist.to_path_buf(),
            count,
        }),
    }
}

/// Copies a built artifact into the bundle's extension directory.
///
/// A same-named artifact already installed is overwritten silently.
pub async fn install_artifact(artifact: &Path, layout: &BundleLayout) -> Result<()> {
    let extensions_dir = layout.extensions_dir();
    fsutil::create_dir_all(&extensions_dir).await?;

    let file_name = artifact.file_name().ok_or_else(|| BundlerError::MissingPath {
        what: "artifact file name".into(),
        path: artifact.to_path_buf(),
    })?;
    fsutil::copy_file(artifact, &extensions_dir.join(file_name)).await?;
    log::info!("installed extension {}", Path::new(file_name).display());
    Ok(())
}

/// Resolves, builds and installs one user-supplied extension entry.
pub async fn install_entry<R: ToolRunner>(
    runner: &R,
    cache: &DownloadCache,
    layout: &BundleLayout,
    entry: &str,
) -> Result<()> {
    log::info!("installing extension from {entry}");
    let source = ExtensionSource::classify(entry);
    let tree = source.resolve(runner, cache).await?;
    let artifact = build(runner, &layout.release_root(), &tree, None).await?;
    install_artifact(&artifact, layout).await
}

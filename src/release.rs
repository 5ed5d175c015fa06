//! Release artifact resolution.
//!
//! Resolves the main Ghidra payload either from a user-supplied local path
//! or from the GitHub "latest release" endpoint, and parses the release
//! version out of the `ghidra_<version>_...` filename convention.

use crate::error::{BundlerError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One downloadable asset of a GitHub release.
#[derive(Clone, Debug, Deserialize)]
pub struct ReleaseAsset {
    /// Asset filename
    pub name: String,
    /// Direct download URL
    pub browser_download_url: String,
}

#[derive(Debug, Deserialize)]
struct Release {
    assets: Vec<ReleaseAsset>,
}

/// Where the resolved payload comes from.
#[derive(Clone, Debug)]
pub enum ArtifactLocation {
    /// User-supplied zip or extracted directory; no network involved
    LocalPath(PathBuf),
    /// Latest-release asset still to be downloaded
    Remote {
        /// Asset filename
        name: String,
        /// Download URL
        url: String,
    },
}

/// The resolved payload. Created once at pipeline start, immutable after.
#[derive(Clone, Debug)]
pub struct ReleaseArtifact {
    /// Version parsed from the artifact filename, e.g. `11.1`
    pub version: String,
    /// Payload location
    pub location: ArtifactLocation,
}

impl ReleaseArtifact {
    /// Resolves from a local zip or extracted install directory.
    pub fn from_local_path(path: &Path) -> Result<Self> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            version: parse_version(&filename)?,
            location: ArtifactLocation::LocalPath(path.to_path_buf()),
        })
    }

    /// Resolves the latest release from `api_url`.
    pub async fn from_latest_release(api_url: &str, filters: &[&str]) -> Result<Self> {
        let asset = latest_release_asset(api_url, filters).await?;
        Ok(Self {
            version: parse_version(&asset.name)?,
            location: ArtifactLocation::Remote {
                name: asset.name,
                url: asset.browser_download_url,
            },
        })
    }
}

/// Parses the version out of a `ghidra_<version>_...` filename.
///
/// `ghidra_11.1_PUBLIC.zip` parses to `11.1`. Anything not following the
/// convention is an error rather than a garbage version string.
pub fn parse_version(filename: &str) -> Result<String> {
    let version = filename
        .split_once("ghidra_")
        .map(|(_, rest)| rest)
        .and_then(|rest| rest.split('_').next())
        .filter(|v| !v.is_empty());

    match version {
        Some(v) => Ok(v.to_string()),
        None => Err(BundlerError::VersionParse {
            filename: filename.to_string(),
        }),
    }
}

/// Queries a GitHub "latest release" endpoint and picks an asset.
///
/// A non-success status is fatal; there is no fallback release source.
pub async fn latest_release_asset(api_url: &str, filters: &[&str]) -> Result<ReleaseAsset> {
    log::info!("looking up latest release at {api_url}");

    let client = reqwest::Client::new();
    let response = client
        .get(api_url)
        // GitHub rejects requests without a User-Agent
        .header(reqwest::header::USER_AGENT, "ghidra-bundler")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(BundlerError::ReleaseLookup {
            url: api_url.to_string(),
            status: status.as_u16(),
        });
    }

    let release: Release = response.json().await?;
    select_asset(release.assets, filters)
}

/// First asset whose name contains every filter string; first asset
/// unconditionally when no filter is given.
fn select_asset(assets: Vec<ReleaseAsset>, filters: &[&str]) -> Result<ReleaseAsset> {
    let chosen = if filters.is_empty() {
        assets.into_iter().next()
    } else {
        assets
            .into_iter()
            .find(|asset| filters.iter().all(|f| asset.name.contains(f)))
    };

    chosen.ok_or_else(|| BundlerError::NoMatchingAsset {
        filters: filters.iter().map(|f| f.to_string()).collect(),
    })
}

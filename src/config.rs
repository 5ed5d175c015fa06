//! Pipeline configuration.
//!
//! Every component receives its directories from a [`Config`] instead of
//! reading ambient constants, so tests can point the whole pipeline at
//! temporary directories.

use std::path::{Path, PathBuf};

/// GitHub "latest release" endpoint for Ghidra.
pub const GHIDRA_RELEASE_API_URL: &str =
    "https://api.github.com/repos/NationalSecurityAgency/ghidra/releases/latest";

/// GitHub "latest release" endpoint for GraalVM CE builds.
pub const GRAALVM_RELEASE_API_URL: &str =
    "https://api.github.com/repos/graalvm/graalvm-ce-builds/releases/latest";

/// Repository providing the dark-mode installer.
pub const DARK_MODE_REPO_URL: &str = "https://github.com/zackelia/ghidra-dark.git";

/// Repository of the Ghidraal extension (mandatory companion of the
/// embedded GraalVM).
pub const GHIDRAAL_REPO_URL: &str = "https://github.com/jpleasu/ghidraal.git";

/// Bundle and volume name. Also names the output image (`Ghidra.dmg`).
pub const APP_NAME: &str = "Ghidra";

/// Main settings for a bundler run.
///
/// All paths have working defaults; construct with [`Config::default`] and
/// override fields as needed.
#[derive(Clone, Debug)]
pub struct Config {
    /// Persistent download cache. Fetched archives and cloned repositories
    /// land here and are reused across runs.
    pub cache_dir: PathBuf,

    /// Staging root the bundle is assembled in before imaging.
    pub staging_dir: PathBuf,

    /// Directory holding static assets (Info.plist template, icon files,
    /// launcher script, corrected Ghidraal build.gradle).
    pub assets_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let base = dirs::cache_dir().unwrap_or_else(std::env::temp_dir);
        Self {
            cache_dir: base.join("ghidra-bundler").join("downloads"),
            staging_dir: base.join("ghidra-bundler").join("staging"),
            assets_dir: PathBuf::from("assets"),
        }
    }
}

impl Config {
    /// Path to the Info.plist template.
    pub fn plist_template(&self) -> PathBuf {
        self.assets_dir.join("Info.plist")
    }

    /// Path to the `.icns` bundle icon.
    pub fn icns(&self) -> PathBuf {
        self.assets_dir.join("Ghidra.icns")
    }

    /// Path to the PNG source the dock-icon patcher resizes from.
    pub fn icon_png(&self) -> PathBuf {
        self.assets_dir.join("GhidraIcon.png")
    }

    /// Path to the launcher script installed into `Contents/MacOS`.
    pub fn launcher(&self) -> PathBuf {
        self.assets_dir.join("ghidra")
    }

    /// Path to the corrected build.gradle that replaces Ghidraal's broken
    /// one.
    pub fn ghidraal_build_gradle(&self) -> PathBuf {
        self.assets_dir.join("build.gradle")
    }

    /// Rebase all directories under `root`. Test helper for isolated runs.
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            cache_dir: root.join("downloads"),
            staging_dir: root.join("staging"),
            assets_dir: root.join("assets"),
        }
    }
}

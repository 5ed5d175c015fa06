//! Error types for the bundle assembly pipeline.
//!
//! Fatal conditions abort the run; the dmg packager's stale-output retry is
//! the only recovery policy (see [`crate::dmg`]).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bundler operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for all bundler operations
#[derive(Error, Debug)]
pub enum BundlerError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport errors (release lookup, downloads)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Info.plist read/write errors
    #[error("plist error: {0}")]
    Plist(#[from] plist::Error),

    /// Release lookup returned a non-success status. No fallback release
    /// source exists, so this is fatal.
    #[error("release lookup {url} failed with status {status}")]
    ReleaseLookup {
        /// Endpoint that was queried
        url: String,
        /// HTTP status returned
        status: u16,
    },

    /// No release asset matched the requested name filters
    #[error("no release asset matched filters {filters:?}")]
    NoMatchingAsset {
        /// Substrings every matching asset name must contain
        filters: Vec<String>,
    },

    /// Payload filename did not follow the `ghidra_<version>_...` convention
    #[error("cannot parse a Ghidra version out of {filename:?}")]
    VersionParse {
        /// Offending filename
        filename: String,
    },

    /// An external tool exited non-zero (check=true semantics)
    #[error("{tool} failed with {status}: {stderr}")]
    ToolFailed {
        /// Tool that was invoked
        tool: String,
        /// Exit status description
        status: String,
        /// Captured stderr
        stderr: String,
    },

    /// An extension build produced no archive under its dist directory
    #[error("no build artifact found under {dir:?}")]
    NoArtifact {
        /// dist directory that was searched
        dir: PathBuf,
    },

    /// An extension build produced more than one archive. Picking one
    /// silently would install an arbitrary artifact, so this is an error.
    #[error("expected exactly one build artifact under {dir:?}, found {count}")]
    MultipleArtifacts {
        /// dist directory that was searched
        dir: PathBuf,
        /// Number of archives found
        count: usize,
    },

    /// The embedded runtime failed its post-install verification
    #[error("embedded runtime verification failed: {reason}")]
    RuntimeVerification {
        /// What went wrong
        reason: String,
    },

    /// Graal embedding requested while Resources/jdk already exists
    #[error("cannot embed GraalVM: {path:?} already exists")]
    JdkConflict {
        /// Conflicting jdk path
        path: PathBuf,
    },

    /// A path that must exist for a stage to run is missing
    #[error("{what} not found at {path:?}")]
    MissingPath {
        /// What the path was supposed to be
        what: String,
        /// Path that was checked
        path: PathBuf,
    },

    /// Invalid glob pattern (programming error in artifact matching)
    #[error("glob error: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl BundlerError {
    /// True for an external tool exiting non-zero. The dmg packager uses
    /// this to decide whether a stale-output retry applies.
    pub fn is_tool_failure(&self) -> bool {
        matches!(self, Self::ToolFailed { .. })
    }
}

//! Optional managed-runtime embedding.
//!
//! The bundle can carry a plain JDK or a GraalVM, never both. The choice
//! is a tagged variant so "at most one" holds by construction instead of
//! by flag checks scattered through the pipeline.

pub mod graal;
pub mod jdk;

use std::path::PathBuf;

/// Which runtime, if any, gets embedded into the bundle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuntimeEmbedding {
    /// No runtime is bundled; the launcher relies on the host's Java
    None,
    /// A user-supplied JDK (zip or extracted directory)
    Jdk(PathBuf),
    /// The latest GraalVM CE release, primed with language components
    Graal,
}

impl RuntimeEmbedding {
    /// Maps the CLI surface onto the variant. clap already rejects
    /// `--jdk` together with `--graal`; this keeps the invariant in the
    /// type for library callers too.
    pub fn from_flags(jdk: Option<PathBuf>, graal: bool) -> Self {
        match (jdk, graal) {
            (Some(path), _) => Self::Jdk(path),
            (None, true) => Self::Graal,
            (None, false) => Self::None,
        }
    }
}

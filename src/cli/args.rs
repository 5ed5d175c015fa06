//! Command line argument parsing and validation.

use crate::config::Config;
use crate::runtime::RuntimeEmbedding;
use clap::Parser;
use std::path::PathBuf;

/// Ghidra macOS bundle and disk image builder
#[derive(Parser, Debug)]
#[command(
    name = "ghidra-bundler",
    version,
    about = "Builds a redistributable Ghidra.app bundle and .dmg",
    long_about = "Assembles a Ghidra.app bundle from a local install or the latest GitHub \
release, optionally embedding a JDK or GraalVM and building Ghidra extensions, then \
packages everything into a compressed disk image.

Usage:
  ghidra-bundler --out ~/Desktop
  ghidra-bundler --out ~/Desktop --path ghidra_11.1_PUBLIC.zip --dark-mode
  ghidra-bundler --out ~/Desktop --graal --extension https://github.com/user/ext.git"
)]
pub struct Args {
    /// Directory the generated Ghidra.dmg is written to
    #[arg(short = 'o', long = "out", value_name = "DIR")]
    pub out: PathBuf,

    /// Extension to install: repository HTTPS URL, project zip, or project
    /// directory. Repeatable; installed in declaration order.
    #[arg(short = 'e', long = "extension", value_name = "SOURCE")]
    pub extension: Vec<String>,

    /// Install the ghidra-dark GUI theme
    #[arg(short = 'd', long = "dark-mode")]
    pub dark_mode: bool,

    /// Path to a Ghidra zip or extracted install; skips the release lookup
    #[arg(short = 'p', long = "path", value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Path to a JDK zip or directory to bundle
    #[arg(short = 'j', long = "jdk", value_name = "PATH", conflicts_with = "graal")]
    pub jdk: Option<PathBuf>,

    /// Bundle the latest GraalVM CE plus the Ghidraal extension
    #[arg(short = 'g', long = "graal")]
    pub graal: bool,

    /// Override the persistent download cache directory
    #[arg(long = "cache-dir", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Runtime choice implied by the flags. clap rejects `--jdk` together
    /// with `--graal` before this runs.
    pub fn runtime_embedding(&self) -> RuntimeEmbedding {
        RuntimeEmbedding::from_flags(self.jdk.clone(), self.graal)
    }

    /// Pipeline configuration with any CLI overrides applied.
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        if let Some(cache_dir) = &self.cache_dir {
            config.cache_dir = cache_dir.clone();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jdk_and_graal_conflict() {
        let result = Args::try_parse_from([
            "ghidra-bundler",
            "--out",
            "/tmp/out",
            "--jdk",
            "/opt/jdk",
            "--graal",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn extensions_accumulate_in_order() {
        let args = Args::try_parse_from([
            "ghidra-bundler",
            "--out",
            "/tmp/out",
            "-e",
            "https://github.com/user/first.git",
            "-e",
            "/tmp/second.zip",
        ])
        .unwrap();
        assert_eq!(
            args.extension,
            vec![
                "https://github.com/user/first.git".to_string(),
                "/tmp/second.zip".to_string()
            ]
        );
    }

    #[test]
    fn graal_flag_selects_graal_embedding() {
        let args =
            Args::try_parse_from(["ghidra-bundler", "--out", "/tmp/out", "--graal"]).unwrap();
        assert_eq!(args.runtime_embedding(), RuntimeEmbedding::Graal);
    }
}
